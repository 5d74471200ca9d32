//! Retarget Engine - 骨骼动画重定向运行时
//!
//! 把源骨架的逐帧动画驱动到比例、朝向都不同的目标骨架上：
//! - 骨骼重定向（轴锁定修正 + 静止姿态换基 + 偏移矩阵）
//! - IK 目标重定向（控制物体的平移/旋转/非均匀缩放）
//! - 定宽浮点数组编解码（映射表持久化）
//! - 通道驱动注册（build / clear）

pub mod codec;
pub mod config;
pub mod driver;
pub mod mapping;
pub mod math;
pub mod retarget;

pub use codec::{decode_floats, encode_floats, matrix_from_data, matrix_to_data};
pub use config::RetargetConfig;
pub use driver::{build_drivers, clear_drivers, ChannelDriver, DriverFunction, DriverHost};
pub use mapping::{Armature, AxisLocks, BoneMapping, IkLimb, MappingContext, RetargetState, Side};
pub use math::{LocalMat, Reframe, RestMat, WorldMat};
pub use retarget::{Axis, ControlTransform, Retargeter, SourcePose};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetargetError {
    #[error("No bone mapping for target bone: {0}")]
    MissingMapping(String),

    #[error("Bone not found in {side} armature: {bone}")]
    MissingBone { side: Side, bone: String },

    #[error("IK limb index out of range: {0}")]
    MissingIkLimb(usize),

    #[error("IK limb {index} has no {role} object")]
    MissingIkObject { index: usize, role: &'static str },

    #[error("Object is not part of this retarget pair: {0}")]
    UnknownArmature(String),

    #[error("Duplicate mapping for target bone: {0}")]
    DuplicateTarget(String),

    #[error("Invalid axis: {0}")]
    InvalidAxis(String),

    #[error("{function} expects {expected} inputs, got {actual}")]
    InputArity { function: &'static str, expected: usize, actual: usize },

    #[error("Driver function {0} bound to the wrong kind of target")]
    DriverMismatch(&'static str),

    #[error("Float data format error: {0}")]
    Format(String),

    #[error("Matrix data must hold 12 or 16 floats, got {0}")]
    MatrixLength(usize),
}

/// 错误分类：配置错误（映射表过期/不一致）或格式错误（编解码）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Format,
}

impl RetargetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RetargetError::Format(_) | RetargetError::MatrixLength(_) => ErrorKind::Format,
            _ => ErrorKind::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, RetargetError>;
