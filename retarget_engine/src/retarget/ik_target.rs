//! IK 目标重定向
//!
//! 肢体末端不做轴锁定修正。控制物体的缩放要在投影回目标静止空间之前吸收掉。

use super::{ControlTransform, SourcePose};
use crate::config::RetargetConfig;
use crate::mapping::{MappingContext, Side};
use crate::math::{Reframe, WorldMat};
use crate::Result;

/// 计算 IK 目标空物体的世界变换
pub fn retarget_ik_matrix<C: MappingContext + ?Sized>(
    context: &C,
    config: &RetargetConfig,
    limb_index: usize,
    endpoint: &SourcePose,
    control: &ControlTransform,
) -> Result<WorldMat> {
    let endpoint_mat = WorldMat::from_rotation_translation(endpoint.rotation, endpoint.translation);
    let control_mat = control.matrix();

    let limb = context.ik_limb(limb_index)?;
    if !limb.enabled {
        log::warn!("IK 肢体 {} ({}) 未启用，仍然求值", limb_index, limb.target_bone);
    }
    let mapping = context.mapping_for_target(&limb.target_bone)?;
    let (src_arma, _) = context.pose_and_arma_bone(Side::Source, &mapping.source)?;
    context.pose_and_arma_bone(Side::Target, &mapping.target)?;

    let source_world = context.armature(Side::Source).world();
    let target_world = context.armature(Side::Target).world();
    let src_rest = src_arma.rest();
    let dest_rest = mapping.rest_matrix(config.codec_width)?;

    // 源根物体的旋转 + 缩放部分
    let src_world_correction = source_world.translation_only().inverse() * source_world;
    // 源根物体放到源骨骼的静止位置
    let src_ref = source_world * src_rest.translation_only();
    let diff_rot = Reframe::between(
        source_world.rotation_only() * src_rest.rotation_only(),
        target_world.rotation_only() * dest_rest.rotation_only(),
    );

    let result = src_world_correction
        * src_ref.inverse()
        * dest_rest.translation_only()
        * control_mat
        * endpoint_mat
        * diff_rot;

    if config.debug_log {
        log::debug!(
            "[IK 重定向] 肢体 {} ({} <- {}): loc={:?}",
            limb_index,
            mapping.target,
            mapping.source,
            result.translation()
        );
    }

    Ok(result)
}
