//! 旋转分解与矩阵拆分

use std::fmt;
use std::str::FromStr;

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

use crate::RetargetError;

/// 坐标轴（驱动通道的分量选择）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// 按 X, Y, Z 顺序
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// 取向量的对应分量
    pub fn component(self, v: Vec3) -> f32 {
        v[self.index()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = RetargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            _ => Err(RetargetError::InvalidAxis(s.to_string())),
        }
    }
}

/// 从标量在前的 `[w, x, y, z]` 构造四元数
pub fn quat_from_wxyz(wxyz: [f32; 4]) -> Quat {
    Quat::from_xyzw(wxyz[1], wxyz[2], wxyz[3], wxyz[0])
}

/// 四元数 → XYZ 欧拉角（外旋 X→Y→Z），返回 `(x, y, z)`
///
/// 与宿主的分解一致：同一旋转有两组解（第二组 `y' = π - y`，x、z 各差 π），
/// 取各分量绝对值之和较小的一组，所以 `y` 可以超出 ±90°。
/// 万向锁附近 `z` 固定为 0，角度全部归到 `x`。
pub fn euler_xyz(q: Quat) -> Vec3 {
    let m = Mat3::from_quat(unit_or_identity(q));
    let cy = m.x_axis.x.hypot(m.x_axis.y);

    if cy <= 16.0 * f32::EPSILON {
        return Vec3::new((-m.z_axis.y).atan2(m.y_axis.y), (-m.x_axis.z).atan2(cy), 0.0);
    }

    let first = Vec3::new(
        m.y_axis.z.atan2(m.z_axis.z),
        (-m.x_axis.z).atan2(cy),
        m.x_axis.y.atan2(m.x_axis.x),
    );
    let second = Vec3::new(
        (-m.y_axis.z).atan2(-m.z_axis.z),
        (-m.x_axis.z).atan2(-cy),
        (-m.x_axis.y).atan2(-m.x_axis.x),
    );

    if first.abs().element_sum() > second.abs().element_sum() {
        second
    } else {
        first
    }
}

/// XYZ 欧拉角 → 四元数
pub fn quat_from_euler_xyz(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, euler.z, euler.y, euler.x)
}

/// 绕单轴旋转
pub fn single_axis_rotation(axis: Axis, angle: f32) -> Quat {
    Quat::from_axis_angle(axis.unit(), angle)
}

/// 矩阵的旋转部分（先去掉缩放）
///
/// 各基向量单位化；行列式为负（镜像）时整个 3x3 取反，而不是只翻转一个轴。
pub fn matrix_rotation(m: Mat4) -> Quat {
    let basis = Mat3::from_mat4(m);
    let (x, y, z) = (
        basis.x_axis.normalize_or_zero(),
        basis.y_axis.normalize_or_zero(),
        basis.z_axis.normalize_or_zero(),
    );
    let unit = if Mat3::from_cols(x, y, z).determinant() < 0.0 {
        Mat3::from_cols(-x, -y, -z)
    } else {
        Mat3::from_cols(x, y, z)
    };
    unit_or_identity(Quat::from_mat3(&unit))
}

fn unit_or_identity(q: Quat) -> Quat {
    if q.length_squared() > f32::EPSILON {
        q.normalize()
    } else {
        Quat::IDENTITY
    }
}

/// 只保留旋转的矩阵（去掉平移和缩放）
pub fn rot_mat(m: Mat4) -> Mat4 {
    Mat4::from_quat(matrix_rotation(m))
}

/// 只保留平移的矩阵
pub fn loc_mat(m: Mat4) -> Mat4 {
    Mat4::from_translation(m.w_axis.truncate())
}
