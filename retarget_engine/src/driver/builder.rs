//! 驱动构建与清除

use super::binding::{create_vars, TransformGroup, TransformSpace};
use super::{ChannelDriver, ChannelGroup, ChannelId, DriverFunction, DriverHost, DriverOwner, DriverTarget};
use crate::mapping::{MappingContext, Side};
use crate::math::Axis;
use crate::{Result, RetargetError};

/// 构建结果统计
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// 骨骼通道驱动数（已扣除锁定通道）
    pub bone_drivers: usize,
    pub ik_drivers: usize,
    /// 因轴锁定被移除的通道数
    pub locked_channels: usize,
}

/// 移除所有映射骨骼和 IK 目标空物体上的位置/旋转驱动
pub fn clear_drivers<C, H>(context: &C, host: &mut H) -> Result<()>
where
    C: MappingContext + ?Sized,
    H: DriverHost + ?Sized,
{
    let target_name = &context.armature(Side::Target).name;

    for mapping in context.mappings() {
        context.pose_and_arma_bone(Side::Target, &mapping.target)?;
        let owner = DriverOwner::pose_bone(target_name.as_str(), mapping.target.as_str());
        host.remove_drivers(&owner, ChannelGroup::Location, None);
        host.remove_drivers(&owner, ChannelGroup::RotationEuler, None);
    }

    for limb in context.ik_limbs() {
        if let Some(ref empty) = limb.target_empty {
            let owner = DriverOwner::Object(empty.clone());
            host.remove_drivers(&owner, ChannelGroup::Location, None);
            host.remove_drivers(&owner, ChannelGroup::RotationEuler, None);
        }
    }

    Ok(())
}

/// 先清除再重新安装全部驱动
///
/// 骨骼：每个映射 3 个位置 + 3 个旋转驱动，随后移除被轴锁定的通道（由约束另行驱动）。
/// IK：每个启用的肢体在目标空物体上安装 3 + 3 个驱动。
pub fn build_drivers<C, H>(context: &C, host: &mut H) -> Result<BuildReport>
where
    C: MappingContext + ?Sized,
    H: DriverHost + ?Sized,
{
    clear_drivers(context, host)?;

    let source_name = &context.armature(Side::Source).name;
    let target_name = &context.armature(Side::Target).name;
    let mut report = BuildReport::default();

    for mapping in context.mappings() {
        context.pose_and_arma_bone(Side::Source, &mapping.source)?;
        let (_, dest_pose) = context.pose_and_arma_bone(Side::Target, &mapping.target)?;

        let owner = DriverOwner::pose_bone(target_name.as_str(), mapping.target.as_str());
        host.set_euler_xyz(&owner);

        let variables = create_vars(
            source_name,
            Some(mapping.source.as_str()),
            &[TransformGroup::Loc, TransformGroup::Rot],
            TransformSpace::LocalSpace,
            0,
        );

        for axis in Axis::ALL {
            for (group, function) in [
                (ChannelGroup::Location, DriverFunction::BoneLoc),
                (ChannelGroup::RotationEuler, DriverFunction::BoneRot),
            ] {
                host.add_driver(ChannelDriver {
                    channel: ChannelId { owner: owner.clone(), group, index: axis.index() },
                    function,
                    axis,
                    object: source_name.clone(),
                    target: DriverTarget::Bone(mapping.target.clone()),
                    variables: variables.clone(),
                });
            }
        }
        report.bone_drivers += 6;

        for axis in Axis::ALL {
            if dest_pose.locks.location_locked(axis) {
                host.remove_drivers(&owner, ChannelGroup::Location, Some(axis.index()));
                report.locked_channels += 1;
                report.bone_drivers -= 1;
            }
            if dest_pose.locks.rotation_locked(axis) {
                host.remove_drivers(&owner, ChannelGroup::RotationEuler, Some(axis.index()));
                report.locked_channels += 1;
                report.bone_drivers -= 1;
            }
        }
    }

    for (index, limb) in context.ik_limbs().iter().enumerate() {
        if !limb.enabled {
            continue;
        }

        let mapping = context.mapping_for_target(&limb.target_bone)?;
        context.pose_and_arma_bone(Side::Source, &mapping.source)?;
        context.pose_and_arma_bone(Side::Target, &mapping.target)?;

        let empty = limb
            .target_empty
            .as_ref()
            .ok_or(RetargetError::MissingIkObject { index, role: "target empty" })?;
        let control = limb
            .control_cube
            .as_ref()
            .ok_or(RetargetError::MissingIkObject { index, role: "control" })?;

        let mut variables = create_vars(
            source_name,
            Some(mapping.source.as_str()),
            &[TransformGroup::Loc, TransformGroup::Rot],
            TransformSpace::WorldSpace,
            0,
        );
        let offset = variables.len();
        variables.extend(create_vars(
            control,
            None,
            &[TransformGroup::Loc, TransformGroup::Rot, TransformGroup::Scale],
            TransformSpace::LocalSpace,
            offset,
        ));

        let owner = DriverOwner::Object(empty.clone());
        for axis in Axis::ALL {
            for (group, function) in [
                (ChannelGroup::Location, DriverFunction::IkTargetLoc),
                (ChannelGroup::RotationEuler, DriverFunction::IkTargetRot),
            ] {
                host.add_driver(ChannelDriver {
                    channel: ChannelId { owner: owner.clone(), group, index: axis.index() },
                    function,
                    axis,
                    object: target_name.clone(),
                    target: DriverTarget::Limb(index),
                    variables: variables.clone(),
                });
            }
        }
        report.ik_drivers += 6;
    }

    log::info!(
        "驱动构建完成: {} 个骨骼驱动, {} 个 IK 驱动, {} 个锁定通道 ({} -> {})",
        report.bone_drivers,
        report.ik_drivers,
        report.locked_channels,
        source_name,
        target_name
    );

    Ok(report)
}
