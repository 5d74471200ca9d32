//! 骨骼映射表与姿态上下文

mod armature;
mod state;

pub use armature::{Armature, ArmatureBone, PoseBone};
pub use state::RetargetState;

#[cfg(test)]
pub(crate) use state::fixtures;

use std::fmt;

use glam::Mat4;

use crate::codec::{
    decode_floats, encode_fields, encode_floats, matrix_from_data, matrix_to_data, DEFAULT_FIELD_WIDTH,
};
use crate::math::{Axis, LocalMat, RestMat};
use crate::Result;

/// 源骨架 / 目标骨架
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Target => f.write_str("target"),
        }
    }
}

/// 姿态骨骼的轴锁定
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisLocks {
    pub rotation: [bool; 3],
    pub location: [bool; 3],
}

impl AxisLocks {
    pub const NONE: AxisLocks = AxisLocks {
        rotation: [false; 3],
        location: [false; 3],
    };

    pub fn with_rotation(rotation: [bool; 3]) -> Self {
        Self { rotation, location: [false; 3] }
    }

    pub fn rotation_locked(&self, axis: Axis) -> bool {
        self.rotation[axis.index()]
    }

    pub fn location_locked(&self, axis: Axis) -> bool {
        self.location[axis.index()]
    }
}

/// 骨骼映射（目标骨骼 ← 源骨骼）
///
/// `rest`、`offset` 以定宽编码字符串保存，由映射编辑器写入，重定向只读。
#[derive(Clone, Debug, PartialEq)]
pub struct BoneMapping {
    pub source: String,
    pub target: String,
    /// 目标骨骼在骨架空间的静止矩阵
    pub rest: String,
    /// 手工调整的修正矩阵
    pub offset: String,
}

impl BoneMapping {
    /// 静止矩阵和偏移矩阵都为单位矩阵
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let identity = encode_fields(&matrix_to_data(Mat4::IDENTITY), DEFAULT_FIELD_WIDTH);
        Self {
            source: source.into(),
            target: target.into(),
            rest: identity.clone(),
            offset: identity,
        }
    }

    pub fn from_matrices(
        source: impl Into<String>,
        target: impl Into<String>,
        rest: Mat4,
        offset: Mat4,
        width: usize,
    ) -> Result<Self> {
        Ok(Self {
            source: source.into(),
            target: target.into(),
            rest: encode_floats(&matrix_to_data(rest), width)?,
            offset: encode_floats(&matrix_to_data(offset), width)?,
        })
    }

    pub fn rest_matrix(&self, width: usize) -> Result<RestMat> {
        let data = decode_floats(&self.rest, width)?;
        Ok(RestMat::new(matrix_from_data(&data)?))
    }

    pub fn offset_matrix(&self, width: usize) -> Result<LocalMat> {
        let data = decode_floats(&self.offset, width)?;
        Ok(LocalMat::new(matrix_from_data(&data)?))
    }
}

/// IK 肢体
#[derive(Clone, Debug, PartialEq)]
pub struct IkLimb {
    /// 末端骨骼（目标骨架）
    pub target_bone: String,
    pub enabled: bool,
    /// 用户可调的控制物体
    pub control_cube: Option<String>,
    /// 被驱动的 IK 目标空物体
    pub target_empty: Option<String>,
}

impl IkLimb {
    pub fn new(
        target_bone: impl Into<String>,
        control_cube: impl Into<String>,
        target_empty: impl Into<String>,
    ) -> Self {
        Self {
            target_bone: target_bone.into(),
            enabled: true,
            control_cube: Some(control_cube.into()),
            target_empty: Some(target_empty.into()),
        }
    }
}

/// 映射与姿态上下文（由宿主提供，求值期间只读）
pub trait MappingContext {
    /// 查找目标骨骼的映射，不存在时返回 `MissingMapping`
    fn mapping_for_target(&self, target_bone: &str) -> Result<&BoneMapping>;

    /// 骨架静止数据和姿态设置
    fn pose_and_arma_bone(&self, side: Side, bone: &str) -> Result<(&ArmatureBone, &PoseBone)>;

    /// 根物体（世界矩阵和均匀缩放）
    fn armature(&self, side: Side) -> &Armature;

    fn ik_limb(&self, index: usize) -> Result<&IkLimb>;

    fn mappings(&self) -> &[BoneMapping];

    fn ik_limbs(&self) -> &[IkLimb];

    /// 宿主物体名是否指向本骨架对（源或目标物体名都可以）
    fn serves_object(&self, name: &str) -> bool {
        self.armature(Side::Source).name == name || self.armature(Side::Target).name == name
    }
}

impl<T: MappingContext + ?Sized> MappingContext for &T {
    fn mapping_for_target(&self, target_bone: &str) -> Result<&BoneMapping> {
        (**self).mapping_for_target(target_bone)
    }

    fn pose_and_arma_bone(&self, side: Side, bone: &str) -> Result<(&ArmatureBone, &PoseBone)> {
        (**self).pose_and_arma_bone(side, bone)
    }

    fn armature(&self, side: Side) -> &Armature {
        (**self).armature(side)
    }

    fn ik_limb(&self, index: usize) -> Result<&IkLimb> {
        (**self).ik_limb(index)
    }

    fn mappings(&self) -> &[BoneMapping] {
        (**self).mappings()
    }

    fn ik_limbs(&self) -> &[IkLimb] {
        (**self).ik_limbs()
    }

    fn serves_object(&self, name: &str) -> bool {
        (**self).serves_object(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_identity_mapping_decodes_exactly() {
        let mapping = BoneMapping::new("hips", "pelvis");
        assert_eq!(mapping.rest_matrix(6).unwrap().matrix(), Mat4::IDENTITY);
        assert_eq!(mapping.offset_matrix(6).unwrap().matrix(), Mat4::IDENTITY);
        assert_eq!(mapping.rest.len(), 16 * 6);
    }

    #[test]
    fn test_encoded_rest_keeps_field_precision() {
        let rest = Mat4::from_rotation_translation(Quat::from_rotation_z(0.5), Vec3::new(0.25, 1.5, -0.5));
        let mapping = BoneMapping::from_matrices("a", "b", rest, Mat4::IDENTITY, 6).unwrap();
        let decoded = mapping.rest_matrix(6).unwrap().matrix();
        assert!(decoded.abs_diff_eq(rest, 1e-3));
    }

    #[test]
    fn test_narrow_width_rejected_on_encode() {
        let err = BoneMapping::from_matrices("a", "b", Mat4::IDENTITY, Mat4::IDENTITY, 1).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Format);
    }

    #[test]
    fn test_corrupt_rest_is_format_error() {
        let mut mapping = BoneMapping::new("a", "b");
        mapping.rest.push('1');
        assert_eq!(mapping.rest_matrix(6).unwrap_err().kind(), crate::ErrorKind::Format);
    }
}
