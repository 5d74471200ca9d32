//! 持久化矩阵布局：行主序平铺，每 4 个数为一行

use glam::{Mat4, Vec4};

use crate::{Result, RetargetError};

/// 12 个数（3 行，第 4 行补 `0 0 0 1`）或 16 个数 → 4x4 矩阵
pub fn matrix_from_data(data: &[f32]) -> Result<Mat4> {
    let row = |i: usize| Vec4::new(data[i * 4], data[i * 4 + 1], data[i * 4 + 2], data[i * 4 + 3]);

    let rows = match data.len() {
        12 => [row(0), row(1), row(2), Vec4::W],
        16 => [row(0), row(1), row(2), row(3)],
        n => return Err(RetargetError::MatrixLength(n)),
    };

    // glam 按列存储，行数据装进列后转置
    Ok(Mat4::from_cols(rows[0], rows[1], rows[2], rows[3]).transpose())
}

/// 4x4 矩阵 → 行主序 16 个数
pub fn matrix_to_data(m: Mat4) -> [f32; 16] {
    m.transpose().to_cols_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_row_major_translation() {
        #[rustfmt::skip]
        let data = [
            1.0, 0.0, 0.0, 4.0,
            0.0, 1.0, 0.0, 5.0,
            0.0, 0.0, 1.0, 6.0,
        ];
        let m = matrix_from_data(&data).unwrap();
        assert_eq!(m.w_axis, Vec4::new(4.0, 5.0, 6.0, 1.0));
        assert_eq!(m.row(3), Vec4::W);
    }

    #[test]
    fn test_to_data_inverts_from_data() {
        let m = Mat4::from_rotation_translation(Quat::from_rotation_y(0.4), Vec3::new(1.0, -2.0, 0.5));
        let back = matrix_from_data(&matrix_to_data(m)).unwrap();
        assert!(back.abs_diff_eq(m, 1e-6));
    }

    #[test]
    fn test_bad_length() {
        assert_eq!(matrix_from_data(&[0.0; 9]), Err(RetargetError::MatrixLength(9)));
    }
}
