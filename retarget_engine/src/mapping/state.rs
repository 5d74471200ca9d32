//! 内存中的重定向状态（映射表 + 两个骨架 + IK 肢体）

use std::collections::HashMap;

use super::{Armature, ArmatureBone, BoneMapping, IkLimb, MappingContext, PoseBone, Side};
use crate::{Result, RetargetError};

/// 一对源/目标骨架的重定向状态
#[derive(Clone, Debug)]
pub struct RetargetState {
    source: Armature,
    target: Armature,
    mappings: Vec<BoneMapping>,
    ik_limbs: Vec<IkLimb>,
    target_to_mapping: HashMap<String, usize>,
}

impl RetargetState {
    pub fn new(source: Armature, target: Armature) -> Self {
        Self {
            source,
            target,
            mappings: Vec::new(),
            ik_limbs: Vec::new(),
            target_to_mapping: HashMap::new(),
        }
    }

    /// 添加映射；每个目标骨骼只能有一条映射
    pub fn add_mapping(&mut self, mapping: BoneMapping) -> Result<()> {
        if self.target_to_mapping.contains_key(&mapping.target) {
            return Err(RetargetError::DuplicateTarget(mapping.target));
        }
        self.target_to_mapping.insert(mapping.target.clone(), self.mappings.len());
        self.mappings.push(mapping);
        Ok(())
    }

    /// 移除目标骨骼的映射
    pub fn remove_mapping(&mut self, target_bone: &str) -> Option<BoneMapping> {
        let index = self.target_to_mapping.remove(target_bone)?;
        let removed = self.mappings.remove(index);
        for slot in self.target_to_mapping.values_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// 添加 IK 肢体，返回索引
    pub fn add_ik_limb(&mut self, limb: IkLimb) -> usize {
        self.ik_limbs.push(limb);
        self.ik_limbs.len() - 1
    }

    pub fn ik_limb_mut(&mut self, index: usize) -> Option<&mut IkLimb> {
        self.ik_limbs.get_mut(index)
    }

    pub fn source(&self) -> &Armature {
        &self.source
    }

    pub fn target(&self) -> &Armature {
        &self.target
    }

    pub fn source_mut(&mut self) -> &mut Armature {
        &mut self.source
    }

    pub fn target_mut(&mut self) -> &mut Armature {
        &mut self.target
    }

    /// 检查映射表与骨架是否一致
    pub fn validate(&self) -> Result<()> {
        for mapping in &self.mappings {
            self.pose_and_arma_bone(Side::Source, &mapping.source)?;
            self.pose_and_arma_bone(Side::Target, &mapping.target)?;
        }

        for (index, limb) in self.ik_limbs.iter().enumerate() {
            if !limb.enabled {
                continue;
            }
            self.mapping_for_target(&limb.target_bone)?;
            if limb.control_cube.is_none() {
                return Err(RetargetError::MissingIkObject { index, role: "control" });
            }
            if limb.target_empty.is_none() {
                return Err(RetargetError::MissingIkObject { index, role: "target empty" });
            }
        }

        log::info!(
            "重定向状态校验通过: {} 条映射, {} 个 IK 肢体 ({} -> {})",
            self.mappings.len(),
            self.ik_limbs.len(),
            self.source.name,
            self.target.name
        );
        Ok(())
    }
}

impl MappingContext for RetargetState {
    fn mapping_for_target(&self, target_bone: &str) -> Result<&BoneMapping> {
        self.target_to_mapping
            .get(target_bone)
            .map(|&index| &self.mappings[index])
            .ok_or_else(|| RetargetError::MissingMapping(target_bone.to_string()))
    }

    fn pose_and_arma_bone(&self, side: Side, bone: &str) -> Result<(&ArmatureBone, &PoseBone)> {
        self.armature(side)
            .bone(bone)
            .ok_or_else(|| RetargetError::MissingBone { side, bone: bone.to_string() })
    }

    fn armature(&self, side: Side) -> &Armature {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    fn ik_limb(&self, index: usize) -> Result<&IkLimb> {
        self.ik_limbs.get(index).ok_or(RetargetError::MissingIkLimb(index))
    }

    fn mappings(&self) -> &[BoneMapping] {
        &self.mappings
    }

    fn ik_limbs(&self) -> &[IkLimb] {
        &self.ik_limbs
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_lookup_mapping() {
        let state = identity_pair();
        assert_eq!(state.mapping_for_target("arm").unwrap().source, "upperarm");
        assert_eq!(
            state.mapping_for_target("leg"),
            Err(RetargetError::MissingMapping("leg".to_string()))
        );
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let mut state = identity_pair();
        let err = state.add_mapping(BoneMapping::new("hand_src", "arm")).unwrap_err();
        assert_eq!(err, RetargetError::DuplicateTarget("arm".to_string()));
        assert_eq!(state.mappings().len(), 2);
    }

    #[test]
    fn test_remove_mapping_keeps_index_consistent() {
        let mut state = identity_pair();
        assert!(state.remove_mapping("arm").is_some());
        assert_eq!(state.mapping_for_target("hand").unwrap().source, "hand_src");
        assert!(state.mapping_for_target("arm").is_err());
    }

    #[test]
    fn test_validate_reports_missing_source_bone() {
        let mut state = identity_pair();
        state.target_mut().add_bone("spine", glam::Mat4::IDENTITY, crate::mapping::AxisLocks::NONE);
        state.add_mapping(BoneMapping::new("chest", "spine")).unwrap();
        assert_eq!(
            state.validate(),
            Err(RetargetError::MissingBone { side: Side::Source, bone: "chest".to_string() })
        );
    }

    #[test]
    fn test_validate_enabled_limb_objects() {
        let mut state = identity_pair();
        assert!(state.validate().is_ok());

        state.ik_limb_mut(0).unwrap().target_empty = None;
        assert_eq!(
            state.validate(),
            Err(RetargetError::MissingIkObject { index: 0, role: "target empty" })
        );

        state.ik_limb_mut(0).unwrap().enabled = false;
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_serves_either_object_name() {
        let state = identity_pair();
        assert!(state.serves_object(SOURCE_NAME));
        assert!(state.serves_object(TARGET_NAME));
        assert!(!state.serves_object("camera"));
    }

    #[test]
    fn test_missing_limb_index() {
        let state = identity_pair();
        assert_eq!(state.ik_limb(3), Err(RetargetError::MissingIkLimb(3)));
    }
}
