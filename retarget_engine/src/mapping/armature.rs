//! 骨架根物体与骨骼数据

use glam::Mat4;
use std::collections::HashMap;

use super::AxisLocks;
use crate::math::{RestMat, WorldMat};

/// 骨架骨骼的静止数据
#[derive(Clone, Debug, PartialEq)]
pub struct ArmatureBone {
    pub name: String,
    /// 骨架空间的静止矩阵
    pub matrix_local: Mat4,
}

impl ArmatureBone {
    pub fn rest(&self) -> RestMat {
        RestMat::new(self.matrix_local)
    }
}

/// 姿态骨骼设置
#[derive(Clone, Debug, PartialEq)]
pub struct PoseBone {
    pub name: String,
    pub locks: AxisLocks,
}

/// 骨架根物体
#[derive(Clone, Debug)]
pub struct Armature {
    pub name: String,
    pub matrix_world: Mat4,
    /// 物体的均匀缩放（取 X 分量）
    pub scale: f32,
    bones: Vec<ArmatureBone>,
    poses: Vec<PoseBone>,
    name_to_index: HashMap<String, usize>,
}

impl Armature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrix_world: Mat4::IDENTITY,
            scale: 1.0,
            bones: Vec::new(),
            poses: Vec::new(),
            name_to_index: HashMap::new(),
        }
    }

    pub fn with_world(mut self, matrix_world: Mat4) -> Self {
        self.matrix_world = matrix_world;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// 添加骨骼；同名骨骼会被覆盖
    pub fn add_bone(&mut self, name: impl Into<String>, matrix_local: Mat4, locks: AxisLocks) {
        let name = name.into();
        let bone = ArmatureBone { name: name.clone(), matrix_local };
        let pose = PoseBone { name: name.clone(), locks };

        if let Some(&index) = self.name_to_index.get(&name) {
            self.bones[index] = bone;
            self.poses[index] = pose;
            return;
        }

        let index = self.bones.len();
        self.name_to_index.insert(name, index);
        self.bones.push(bone);
        self.poses.push(pose);
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn bone(&self, name: &str) -> Option<(&ArmatureBone, &PoseBone)> {
        let index = self.find_bone_by_name(name)?;
        Some((&self.bones[index], &self.poses[index]))
    }

    pub fn pose_mut(&mut self, name: &str) -> Option<&mut PoseBone> {
        let index = self.find_bone_by_name(name)?;
        self.poses.get_mut(index)
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn world(&self) -> WorldMat {
        WorldMat::new(self.matrix_world)
    }
}
