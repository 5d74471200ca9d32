//! 映射表持久化编解码
//!
//! 静止/偏移矩阵以定宽十进制字符串保存，读取时按行主序还原为 4x4 矩阵。

mod float_array;
mod matrix;

pub use float_array::{decode_floats, encode_floats, MIN_FIELD_WIDTH};
pub(crate) use float_array::encode_fields;
pub use matrix::{matrix_from_data, matrix_to_data};

/// 默认字段宽度
pub const DEFAULT_FIELD_WIDTH: usize = 6;
