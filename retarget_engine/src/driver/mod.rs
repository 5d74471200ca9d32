//! 通道驱动注册
//!
//! 每个动画通道注册一个纯标量函数和它的输入变量，宿主每帧采样变量后调用 `ChannelDriver::evaluate`。
//! 宿主侧的具体实现通过 `DriverHost` 注入。

mod binding;
mod builder;

pub use binding::{create_vars, QuatComponent, TransformGroup, TransformSpace, TransformType, VariableBinding};
pub use builder::{build_drivers, clear_drivers, BuildReport};

use std::fmt;

use crate::mapping::MappingContext;
use crate::math::Axis;
use crate::retarget::Retargeter;
use crate::{Result, RetargetError};

/// 通道组
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelGroup {
    Location,
    RotationEuler,
}

impl ChannelGroup {
    pub fn data_path(self) -> &'static str {
        match self {
            ChannelGroup::Location => "location",
            ChannelGroup::RotationEuler => "rotation_euler",
        }
    }
}

/// 被驱动的对象
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DriverOwner {
    /// 目标骨架上的姿态骨骼
    PoseBone { armature: String, bone: String },
    /// 普通物体（IK 目标空物体）
    Object(String),
}

impl DriverOwner {
    pub fn pose_bone(armature: impl Into<String>, bone: impl Into<String>) -> Self {
        DriverOwner::PoseBone { armature: armature.into(), bone: bone.into() }
    }
}

impl fmt::Display for DriverOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverOwner::PoseBone { armature, bone } => write!(f, "{}:{}", armature, bone),
            DriverOwner::Object(name) => f.write_str(name),
        }
    }
}

/// 单个动画通道
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId {
    pub owner: DriverOwner,
    pub group: ChannelGroup,
    pub index: usize,
}

/// 宿主可调用的五个标量函数
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriverFunction {
    BoneLoc,
    BoneRot,
    BoneRotTest,
    IkTargetLoc,
    IkTargetRot,
}

impl DriverFunction {
    pub fn name(self) -> &'static str {
        match self {
            DriverFunction::BoneLoc => "rt_bone_loc",
            DriverFunction::BoneRot => "rt_bone_rot",
            DriverFunction::BoneRotTest => "rt_bone_test",
            DriverFunction::IkTargetLoc => "rt_ikt_loc",
            DriverFunction::IkTargetRot => "rt_ikt_rot",
        }
    }
}

/// 函数作用的骨骼或肢体
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DriverTarget {
    Bone(String),
    Limb(usize),
}

/// 一个通道的驱动：函数 + 参数 + 输入变量
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelDriver {
    pub channel: ChannelId,
    pub function: DriverFunction,
    pub axis: Axis,
    /// 传给函数的骨架物体名
    pub object: String,
    pub target: DriverTarget,
    /// 按函数参数顺序排列
    pub variables: Vec<VariableBinding>,
}

impl ChannelDriver {
    /// 用宿主采样到的变量值求值，`values` 与 `variables` 一一对应
    pub fn evaluate<C: MappingContext>(&self, retargeter: &Retargeter<C>, values: &[f32]) -> Result<f32> {
        let result = match (self.function, &self.target) {
            (DriverFunction::BoneLoc, DriverTarget::Bone(bone)) => {
                retargeter.bone_loc(self.axis, &self.object, bone, values)
            }
            (DriverFunction::BoneRot, DriverTarget::Bone(bone)) => {
                retargeter.bone_rot(self.axis, &self.object, bone, values)
            }
            (DriverFunction::BoneRotTest, DriverTarget::Bone(bone)) => {
                retargeter.bone_rot_test(self.axis, &self.object, bone, values)
            }
            (DriverFunction::IkTargetLoc, DriverTarget::Limb(index)) => {
                retargeter.ik_target_loc(self.axis, &self.object, *index, values)
            }
            (DriverFunction::IkTargetRot, DriverTarget::Limb(index)) => {
                retargeter.ik_target_rot(self.axis, &self.object, *index, values)
            }
            (function, _) => Err(RetargetError::DriverMismatch(function.name())),
        };

        if let Err(ref e) = result {
            log::error!(
                "驱动求值失败 {}[{}] {}: {}",
                self.channel.owner,
                self.channel.group.data_path(),
                self.function.name(),
                e
            );
        }
        result
    }
}

/// 宿主动画系统的驱动接口
pub trait DriverHost {
    fn add_driver(&mut self, driver: ChannelDriver);

    /// 移除驱动；`index` 为 `None` 时移除整个通道组
    fn remove_drivers(&mut self, owner: &DriverOwner, group: ChannelGroup, index: Option<usize>);

    /// 目标姿态骨骼切换到 XYZ 欧拉旋转模式
    fn set_euler_xyz(&mut self, _owner: &DriverOwner) {}
}
