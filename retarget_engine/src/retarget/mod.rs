//! 骨骼与 IK 目标重定向
//!
//! 每次调用都从当前输入和上下文重新计算，不保存跨调用状态。

mod bone;
mod evaluator;
mod ik_target;

pub use bone::{apply_rotation_locks, retarget_bone_matrix, LOCK_ORDER};
pub use evaluator::{Retargeter, BONE_INPUT_COUNT, IK_INPUT_COUNT};
pub use ik_target::retarget_ik_matrix;

pub use crate::math::Axis;

use glam::{Mat4, Quat, Vec3};

use crate::math::{euler_xyz, matrix_rotation, quat_from_wxyz, LocalMat};

/// 源骨骼的采样变换：平移 + 旋转
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourcePose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl SourcePose {
    /// 输入个数：loc xyz + rot wxyz
    pub const INPUT_COUNT: usize = 7;

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation }
    }

    /// 从驱动变量切片读取，调用方保证长度为 `INPUT_COUNT`
    pub(crate) fn from_inputs(inputs: &[f32], normalize: bool) -> Self {
        let translation = Vec3::new(inputs[0], inputs[1], inputs[2]);
        let rotation = quat_from_wxyz([inputs[3], inputs[4], inputs[5], inputs[6]]);
        Self {
            translation,
            rotation: if normalize { normalize_or_identity(rotation) } else { rotation },
        }
    }
}

/// 控制物体的本地变换：平移 + 旋转 + 非均匀缩放
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for ControlTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl ControlTransform {
    /// 输入个数：loc xyz + rot wxyz + scale xyz
    pub const INPUT_COUNT: usize = 10;

    pub(crate) fn from_inputs(inputs: &[f32], normalize: bool) -> Self {
        let pose = SourcePose::from_inputs(&inputs[0..SourcePose::INPUT_COUNT], normalize);
        Self {
            translation: pose.translation,
            rotation: pose.rotation,
            scale: Vec3::new(inputs[7], inputs[8], inputs[9]),
        }
    }

    /// 平移 ∘ 旋转 ∘ 缩放X ∘ 缩放Y ∘ 缩放Z
    pub fn matrix(&self) -> LocalMat {
        let scale = Mat4::from_scale(Vec3::new(self.scale.x, 1.0, 1.0))
            * Mat4::from_scale(Vec3::new(1.0, self.scale.y, 1.0))
            * Mat4::from_scale(Vec3::new(1.0, 1.0, self.scale.z));
        LocalMat::new(Mat4::from_rotation_translation(self.rotation, self.translation) * scale)
    }
}

fn normalize_or_identity(q: Quat) -> Quat {
    if q.length_squared() > f32::EPSILON {
        q.normalize()
    } else {
        Quat::IDENTITY
    }
}

/// 矩阵旋转的欧拉分量
pub fn extract_rotation(mat: Mat4, axis: Axis) -> f32 {
    axis.component(euler_xyz(matrix_rotation(mat)))
}

/// 矩阵平移分量
pub fn extract_location(mat: Mat4, axis: Axis) -> f32 {
    axis.component(mat.w_axis.truncate())
}
