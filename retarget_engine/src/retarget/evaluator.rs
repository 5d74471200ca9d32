//! 重定向求值器
//!
//! 绑定一个骨架对的上下文和一份配置，向宿主暴露五个标量函数。
//! 宿主每帧对每个通道调用一次，调用之间互不依赖。

use super::{
    extract_location, extract_rotation, retarget_bone_matrix, retarget_ik_matrix, Axis,
    ControlTransform, SourcePose,
};
use crate::config::{self, RetargetConfig};
use crate::mapping::MappingContext;
use crate::math::{LocalMat, WorldMat};
use crate::{Result, RetargetError};

/// 骨骼函数的输入个数
pub const BONE_INPUT_COUNT: usize = SourcePose::INPUT_COUNT;
/// IK 函数的输入个数：末端 7 + 控制物体 10
pub const IK_INPUT_COUNT: usize = SourcePose::INPUT_COUNT + ControlTransform::INPUT_COUNT;

/// 骨架对的重定向求值器
#[derive(Clone, Debug)]
pub struct Retargeter<C: MappingContext> {
    context: C,
    config: RetargetConfig,
}

impl<C: MappingContext> Retargeter<C> {
    /// 使用当前全局配置的快照
    pub fn new(context: C) -> Self {
        Self::with_config(context, config::get_config())
    }

    pub fn with_config(context: C, config: RetargetConfig) -> Self {
        Self { context, config }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn config(&self) -> &RetargetConfig {
        &self.config
    }

    fn check_object(&self, object_name: &str) -> Result<()> {
        if self.context.serves_object(object_name) {
            Ok(())
        } else {
            Err(RetargetError::UnknownArmature(object_name.to_string()))
        }
    }

    fn check_arity(function: &'static str, expected: usize, inputs: &[f32]) -> Result<()> {
        if inputs.len() == expected {
            Ok(())
        } else {
            Err(RetargetError::InputArity { function, expected, actual: inputs.len() })
        }
    }

    /// 目标骨骼修正后的本地矩阵
    pub fn bone_matrix(&self, object_name: &str, target_bone: &str, inputs: &[f32]) -> Result<LocalMat> {
        self.check_object(object_name)?;
        Self::check_arity("bone", BONE_INPUT_COUNT, inputs)?;
        let pose = SourcePose::from_inputs(inputs, self.config.normalize_input_rotation);
        retarget_bone_matrix(&self.context, &self.config, target_bone, &pose)
    }

    pub fn bone_rot(&self, axis: Axis, object_name: &str, target_bone: &str, inputs: &[f32]) -> Result<f32> {
        let mat = self.bone_matrix(object_name, target_bone, inputs)?;
        Ok(extract_rotation(mat.matrix(), axis))
    }

    /// 与 `bone_rot` 相同，单独命名便于在宿主里替换个别骨骼做对比
    pub fn bone_rot_test(&self, axis: Axis, object_name: &str, target_bone: &str, inputs: &[f32]) -> Result<f32> {
        self.bone_rot(axis, object_name, target_bone, inputs)
    }

    pub fn bone_loc(&self, axis: Axis, object_name: &str, target_bone: &str, inputs: &[f32]) -> Result<f32> {
        let mat = self.bone_matrix(object_name, target_bone, inputs)?;
        Ok(extract_location(mat.matrix(), axis))
    }

    /// IK 目标空物体的世界矩阵
    pub fn ik_target_matrix(&self, object_name: &str, limb_index: usize, inputs: &[f32]) -> Result<WorldMat> {
        self.check_object(object_name)?;
        Self::check_arity("ik_target", IK_INPUT_COUNT, inputs)?;
        let normalize = self.config.normalize_input_rotation;
        let (endpoint, control) = inputs.split_at(SourcePose::INPUT_COUNT);
        let endpoint = SourcePose::from_inputs(endpoint, normalize);
        let control = ControlTransform::from_inputs(control, normalize);
        retarget_ik_matrix(&self.context, &self.config, limb_index, &endpoint, &control)
    }

    pub fn ik_target_rot(&self, axis: Axis, object_name: &str, limb_index: usize, inputs: &[f32]) -> Result<f32> {
        let mat = self.ik_target_matrix(object_name, limb_index, inputs)?;
        Ok(extract_rotation(mat.matrix(), axis))
    }

    pub fn ik_target_loc(&self, axis: Axis, object_name: &str, limb_index: usize, inputs: &[f32]) -> Result<f32> {
        let mat = self.ik_target_matrix(object_name, limb_index, inputs)?;
        Ok(extract_location(mat.matrix(), axis))
    }
}
