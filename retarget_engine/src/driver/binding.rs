//! 驱动输入变量

use std::fmt;

use crate::math::Axis;

/// 变换采样空间
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformSpace {
    LocalSpace,
    WorldSpace,
}

/// 四元数分量（旋转以四元数模式采样）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuatComponent {
    W,
    X,
    Y,
    Z,
}

impl QuatComponent {
    /// 标量在前
    pub const ALL: [QuatComponent; 4] = [QuatComponent::W, QuatComponent::X, QuatComponent::Y, QuatComponent::Z];
}

/// 变量采样的变换分量
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformType {
    Location(Axis),
    Rotation(QuatComponent),
    Scale(Axis),
}

impl fmt::Display for TransformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformType::Location(axis) => write!(f, "LOC_{}", axis.as_str().to_uppercase()),
            TransformType::Rotation(c) => write!(f, "ROT_{:?}", c),
            TransformType::Scale(axis) => write!(f, "SCALE_{}", axis.as_str().to_uppercase()),
        }
    }
}

/// 变换分组，按组展开成变量
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformGroup {
    Loc,
    Rot,
    Scale,
}

impl TransformGroup {
    fn components(self) -> Vec<TransformType> {
        match self {
            TransformGroup::Loc => Axis::ALL.iter().map(|&a| TransformType::Location(a)).collect(),
            TransformGroup::Rot => QuatComponent::ALL.iter().map(|&c| TransformType::Rotation(c)).collect(),
            TransformGroup::Scale => Axis::ALL.iter().map(|&a| TransformType::Scale(a)).collect(),
        }
    }
}

/// 一个驱动输入变量
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableBinding {
    /// 连续的大写字母：A, B, C ...
    pub name: String,
    pub object: String,
    /// 为 `None` 时采样物体本身
    pub bone: Option<String>,
    pub transform: TransformType,
    pub space: TransformSpace,
}

/// 按组展开变量；`offset` 是已有变量的个数，用于延续命名
pub fn create_vars(
    object: &str,
    bone: Option<&str>,
    groups: &[TransformGroup],
    space: TransformSpace,
    offset: usize,
) -> Vec<VariableBinding> {
    groups
        .iter()
        .flat_map(|group| group.components())
        .enumerate()
        .map(|(i, transform)| VariableBinding {
            name: variable_name(offset + i),
            object: object.to_string(),
            bone: bone.map(str::to_string),
            transform,
            space,
        })
        .collect()
}

fn variable_name(index: usize) -> String {
    char::from_u32(b'A' as u32 + index as u32)
        .map(String::from)
        .unwrap_or_else(|| format!("V{}", index))
}
