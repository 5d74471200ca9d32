//! 矩阵与旋转工具
//!
//! 约定：glam 列向量，`a * b` 先作用 `b`；四元数输入为标量在前 `[w, x, y, z]`；
//! 欧拉角为宿主的 "XYZ" 顺序（外旋 X→Y→Z，即 `R = Rz * Ry * Rx`）。

mod rotation;
mod space;

pub use rotation::{
    euler_xyz, loc_mat, matrix_rotation, quat_from_euler_xyz, quat_from_wxyz, rot_mat,
    single_axis_rotation, Axis,
};
pub use space::{Local, LocalMat, Reframe, Rest, RestMat, Space, SpaceMat, World, WorldMat};
