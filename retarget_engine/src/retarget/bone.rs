//! 骨骼重定向

use glam::Quat;

use super::SourcePose;
use crate::config::RetargetConfig;
use crate::mapping::{AxisLocks, MappingContext, Side};
use crate::math::{euler_xyz, single_axis_rotation, Axis, LocalMat, Reframe};
use crate::Result;

/// 旋转轴锁定的修正顺序（不是字母序）
pub const LOCK_ORDER: [Axis; 3] = [Axis::X, Axis::Z, Axis::Y];

/// 依次消去被锁定轴的欧拉分量
///
/// 每个轴都重新分解当前四元数，前一个轴的修正会影响后一个轴读到的角度。
pub fn apply_rotation_locks(rotation: Quat, locks: &AxisLocks, epsilon: f32) -> Quat {
    let mut quat = rotation;
    for axis in LOCK_ORDER {
        if !locks.rotation_locked(axis) {
            continue;
        }
        let angle = axis.component(euler_xyz(quat));
        if angle.abs() > epsilon {
            quat = quat * single_axis_rotation(axis, -angle);
        }
    }
    quat
}

/// 计算目标骨骼修正后的本地变换
///
/// 1. 源本地变换 = 平移 ∘ 旋转（先做轴锁定修正）
/// 2. 平移乘以源根物体缩放
/// 3. 用源/目标静止朝向的差异做共轭换基
/// 4. 左乘偏移矩阵
pub fn retarget_bone_matrix<C: MappingContext + ?Sized>(
    context: &C,
    config: &RetargetConfig,
    target_bone: &str,
    pose: &SourcePose,
) -> Result<LocalMat> {
    let mapping = context.mapping_for_target(target_bone)?;
    let (src_arma, _) = context.pose_and_arma_bone(Side::Source, &mapping.source)?;
    let (_, dest_pose) = context.pose_and_arma_bone(Side::Target, &mapping.target)?;

    let rotation = apply_rotation_locks(pose.rotation, &dest_pose.locks, config.lock_epsilon);
    let local = LocalMat::from_rotation_translation(rotation, pose.translation);

    let rest = mapping.rest_matrix(config.codec_width)?;
    let offset = mapping.offset_matrix(config.codec_width)?;

    let source = context.armature(Side::Source);
    let target = context.armature(Side::Target);
    let src_ref = source.world().rotation_only() * src_arma.rest().rotation_only();
    let dest_ref = target.world().rotation_only() * rest.rotation_only();
    let diff = Reframe::between(src_ref, dest_ref);

    let local = diff.conjugate(local.scale_translation(source.scale));
    let result = offset * local;

    if config.debug_log {
        log::debug!(
            "[骨骼重定向] {} <- {}: loc={:?} rot={:?}",
            mapping.target,
            mapping.source,
            result.translation(),
            result.rotation()
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::fixtures::identity_pair;
    use crate::mapping::BoneMapping;
    use crate::math::quat_from_euler_xyz;
    use crate::RetargetError;
    use glam::{Mat3, Mat4, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn deg(v: f32) -> f32 {
        v.to_radians()
    }

    fn config() -> RetargetConfig {
        RetargetConfig::default()
    }

    #[test]
    fn test_identity_mapping_passes_through() {
        let state = identity_pair();
        let pose = SourcePose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        let m = retarget_bone_matrix(&state, &config(), "arm", &pose).unwrap();
        assert!(m.translation().abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
        assert!(m.rotation().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_source_scale_scales_translation() {
        let mut state = identity_pair();
        state.source_mut().scale = 2.0;
        let pose = SourcePose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        let m = retarget_bone_matrix(&state, &config(), "arm", &pose).unwrap();
        assert!(m.translation().abs_diff_eq(Vec3::new(2.0, 4.0, 6.0), 1e-6));
    }

    #[test]
    fn test_rotated_target_rest_reframes_translation() {
        let mut state = identity_pair();
        state.remove_mapping("arm");
        let rest = Mat4::from_rotation_z(FRAC_PI_2);
        state
            .add_mapping(BoneMapping::from_matrices("upperarm", "arm", rest, Mat4::IDENTITY, 6).unwrap())
            .unwrap();

        let pose = SourcePose::new(Vec3::X, Quat::IDENTITY);
        let m = retarget_bone_matrix(&state, &config(), "arm", &pose).unwrap();
        assert!(m.translation().abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_rotated_source_root_cancels_matching_target_root() {
        let mut state = identity_pair();
        let turn = Mat4::from_rotation_y(0.8);
        state.source_mut().matrix_world = turn;
        state.target_mut().matrix_world = turn;

        let rotation = Quat::from_rotation_x(0.3);
        let pose = SourcePose::new(Vec3::new(0.5, 0.0, 0.0), rotation);
        let m = retarget_bone_matrix(&state, &config(), "arm", &pose).unwrap();
        assert!(m.translation().abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-5));
        assert!(m.rotation().abs_diff_eq(rotation, 1e-5));
    }

    #[test]
    fn test_offset_applied_last() {
        let mut state = identity_pair();
        state.remove_mapping("arm");
        let offset = Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0));
        state
            .add_mapping(BoneMapping::from_matrices("upperarm", "arm", Mat4::IDENTITY, offset, 6).unwrap())
            .unwrap();

        let pose = SourcePose::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY);
        let m = retarget_bone_matrix(&state, &config(), "arm", &pose).unwrap();
        assert!(m.translation().abs_diff_eq(Vec3::new(1.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn test_lock_x_then_z_clears_both() {
        let locks = AxisLocks::with_rotation([true, false, true]);
        let q = quat_from_euler_xyz(Vec3::new(deg(30.0), 0.0, deg(45.0)));
        let locked = apply_rotation_locks(q, &locks, 0.001);
        assert!(euler_xyz(locked).abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn test_lock_order_is_x_z_y() {
        let locks = AxisLocks::with_rotation([true, false, true]);
        let q = quat_from_euler_xyz(Vec3::new(deg(30.0), deg(20.0), deg(45.0)));
        let locked = euler_xyz(apply_rotation_locks(q, &locks, 0.001));

        // X 先修正，再按修正后的四元数读 Z
        let after_x = q * single_axis_rotation(Axis::X, -euler_xyz(q).x);
        let expected = after_x * single_axis_rotation(Axis::Z, -euler_xyz(after_x).z);
        assert!(locked.abs_diff_eq(euler_xyz(expected), 1e-5));

        // 交叉耦合：Y 未锁定，但读数已经改变
        assert!(locked.y.abs() > 1e-3);
        assert!((locked.y - deg(20.0)).abs() > 1e-3);

        // Z 先修正会得到不同结果
        let after_z = q * single_axis_rotation(Axis::Z, -euler_xyz(q).z);
        let other = after_z * single_axis_rotation(Axis::X, -euler_xyz(after_z).x);
        assert!(!locked.abs_diff_eq(euler_xyz(other), 1e-3));
    }

    fn large_rotation() -> Quat {
        // 同一旋转的另一组解是 (-10°, 100°, -10°)
        quat_from_euler_xyz(Vec3::new(deg(170.0), deg(80.0), deg(170.0)))
    }

    #[test]
    fn test_lock_removes_angle_of_smaller_euler_branch() {
        let locks = AxisLocks::with_rotation([true, false, false]);
        let locked = apply_rotation_locks(large_rotation(), &locks, 0.001);

        // 消去 x = -10°，剩下 Rz(-10°) * Ry(100°)
        let expected = Quat::from_rotation_z(deg(-10.0)) * Quat::from_rotation_y(deg(100.0));
        assert!(Mat3::from_quat(locked).abs_diff_eq(Mat3::from_quat(expected), 1e-5));
        assert!(euler_xyz(locked).abs_diff_eq(Vec3::new(0.0, deg(100.0), deg(-10.0)), 1e-4));

        // 按 x = 170° 消去会差半圈
        let principal = large_rotation() * single_axis_rotation(Axis::X, deg(-170.0));
        assert!(!Mat3::from_quat(locked).abs_diff_eq(Mat3::from_quat(principal), 1e-2));
    }

    #[test]
    fn test_large_rotation_lock_in_pipeline() {
        let mut state = identity_pair();
        state.target_mut().pose_mut("arm").unwrap().locks = AxisLocks::with_rotation([true, false, false]);
        let pose = SourcePose::new(Vec3::ZERO, large_rotation());
        let m = retarget_bone_matrix(&state, &config(), "arm", &pose).unwrap();

        let expected = Quat::from_rotation_z(deg(-10.0)) * Quat::from_rotation_y(deg(100.0));
        assert!(Mat3::from_quat(m.rotation()).abs_diff_eq(Mat3::from_quat(expected), 1e-5));
    }

    #[test]
    fn test_lock_ignores_angles_below_epsilon() {
        let locks = AxisLocks::with_rotation([true, true, true]);
        let q = quat_from_euler_xyz(Vec3::new(0.0005, 0.0, 0.0));
        assert_eq!(apply_rotation_locks(q, &locks, 0.001), q);
    }

    #[test]
    fn test_target_locks_applied_in_pipeline() {
        let mut state = identity_pair();
        state.target_mut().pose_mut("arm").unwrap().locks = AxisLocks::with_rotation([false, true, false]);
        let pose = SourcePose::new(Vec3::ZERO, Quat::from_rotation_y(0.6));
        let m = retarget_bone_matrix(&state, &config(), "arm", &pose).unwrap();
        assert!(m.rotation().abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn test_missing_mapping_propagates() {
        let state = identity_pair();
        let pose = SourcePose::new(Vec3::ZERO, Quat::IDENTITY);
        let err = retarget_bone_matrix(&state, &config(), "tail", &pose).unwrap_err();
        assert_eq!(err, RetargetError::MissingMapping("tail".to_string()));
    }
}
