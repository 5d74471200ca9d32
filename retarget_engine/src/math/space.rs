//! 带空间标记的矩阵
//!
//! 世界空间、本地（姿态）空间、骨架静止空间各用一个类型，
//! 只允许语义正确的乘法组合，拼错顺序会在编译期报错。

use std::fmt;
use std::marker::PhantomData;
use std::ops::Mul;

use glam::{Mat4, Quat, Vec3};

use super::rotation::{loc_mat, matrix_rotation, rot_mat};

/// 空间标记
pub trait Space: Copy + fmt::Debug {}

/// 世界空间
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct World;

/// 骨骼本地空间（姿态通道所在空间）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Local;

/// 骨架空间的静止姿态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rest;

impl Space for World {}
impl Space for Local {}
impl Space for Rest {}

/// 标记了所在空间的 4x4 矩阵
#[derive(Clone, Copy, PartialEq)]
pub struct SpaceMat<S: Space> {
    mat: Mat4,
    _space: PhantomData<S>,
}

pub type WorldMat = SpaceMat<World>;
pub type LocalMat = SpaceMat<Local>;
pub type RestMat = SpaceMat<Rest>;

impl<S: Space> SpaceMat<S> {
    pub const IDENTITY: Self = Self::new(Mat4::IDENTITY);

    pub const fn new(mat: Mat4) -> Self {
        Self { mat, _space: PhantomData }
    }

    /// 平移 ∘ 旋转
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self::new(Mat4::from_rotation_translation(rotation, translation))
    }

    pub fn matrix(&self) -> Mat4 {
        self.mat
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.mat.inverse())
    }

    /// 只保留旋转
    pub fn rotation_only(&self) -> Self {
        Self::new(rot_mat(self.mat))
    }

    /// 只保留平移
    pub fn translation_only(&self) -> Self {
        Self::new(loc_mat(self.mat))
    }

    pub fn translation(&self) -> Vec3 {
        self.mat.w_axis.truncate()
    }

    pub fn rotation(&self) -> Quat {
        matrix_rotation(self.mat)
    }

    /// 平移分量乘以缩放系数
    pub fn scale_translation(&self, factor: f32) -> Self {
        let mut mat = self.mat;
        mat.w_axis.x *= factor;
        mat.w_axis.y *= factor;
        mat.w_axis.z *= factor;
        Self::new(mat)
    }
}

impl<S: Space> fmt::Debug for SpaceMat<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaceMat")
            .field("space", &std::any::type_name::<S>().rsplit("::").next().unwrap_or(""))
            .field("mat", &self.mat)
            .finish()
    }
}

impl<S: Space> Default for SpaceMat<S> {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl<S: Space> Mul for SpaceMat<S> {
    type Output = SpaceMat<S>;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.mat * rhs.mat)
    }
}

/// 骨架空间数据放到根物体的世界变换之下
impl Mul<RestMat> for WorldMat {
    type Output = WorldMat;

    fn mul(self, rhs: RestMat) -> Self::Output {
        WorldMat::new(self.mat * rhs.mat)
    }
}

/// 子物体本地变换挂到世界空间父级下
impl Mul<LocalMat> for WorldMat {
    type Output = WorldMat;

    fn mul(self, rhs: LocalMat) -> Self::Output {
        WorldMat::new(self.mat * rhs.mat)
    }
}

/// 两个世界朝向之间的纯旋转换基矩阵 `from⁻¹ ∘ to`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reframe {
    mat: Mat4,
}

impl Reframe {
    pub const IDENTITY: Self = Self { mat: Mat4::IDENTITY };

    /// 平移和缩放会被剥离，只比较朝向
    pub fn between(from: WorldMat, to: WorldMat) -> Self {
        let from = from.rotation_only();
        let to = to.rotation_only();
        Self { mat: from.inverse().matrix() * to.matrix() }
    }

    pub fn matrix(&self) -> Mat4 {
        self.mat
    }

    /// `diff⁻¹ ∘ local ∘ diff`：把源骨骼本地变换换到目标静止朝向下
    pub fn conjugate(&self, local: LocalMat) -> LocalMat {
        LocalMat::new(self.mat.inverse() * local.matrix() * self.mat)
    }
}

impl Mul<Reframe> for WorldMat {
    type Output = WorldMat;

    fn mul(self, rhs: Reframe) -> Self::Output {
        WorldMat::new(self.mat * rhs.mat)
    }
}
