//! 定宽浮点数组编解码
//!
//! 每个数占 `width` 个字符，直接拼接，不用分隔符。
//! 较长的字面量（负号、多位整数部分）会被截断到 `width`，精度随之丢失。

use crate::{Result, RetargetError};

/// 最小字段宽度：负数至少要留下 "-" 之后的一位数字
pub const MIN_FIELD_WIDTH: usize = 2;

/// 编码浮点数组
pub fn encode_floats(values: &[f32], width: usize) -> Result<String> {
    if width < MIN_FIELD_WIDTH {
        return Err(RetargetError::Format(format!(
            "field width {} is below the minimum {}",
            width, MIN_FIELD_WIDTH
        )));
    }
    Ok(encode_fields(values, width))
}

/// 调用方保证 `width >= MIN_FIELD_WIDTH`
pub(crate) fn encode_fields(values: &[f32], width: usize) -> String {
    let mut out = String::with_capacity(values.len() * width);
    for &value in values {
        out.push_str(&encode_field(value, width));
    }
    out
}

/// 单个字段：四舍五入到 `width` 位小数 → 十进制字面量 → 右侧补 '0' → 截到 `width`
fn encode_field(value: f32, width: usize) -> String {
    let decimals = width.min(f64::DIGITS as usize) as i32;
    let factor = 10f64.powi(decimals);
    let rounded = ((value as f64) * factor).round() / factor;

    let mut text = format!("{}", rounded as f32);
    // 整数值也保留小数点，与浮点字面量形式一致
    if rounded.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    while text.len() < width {
        text.push('0');
    }
    text.truncate(width);
    text
}

/// 解码浮点数组
pub fn decode_floats(text: &str, width: usize) -> Result<Vec<f32>> {
    if width == 0 {
        return Err(RetargetError::Format("field width must be positive".to_string()));
    }
    if text.len() % width != 0 {
        return Err(RetargetError::Format(format!(
            "length {} is not a multiple of field width {}",
            text.len(),
            width
        )));
    }

    text.as_bytes()
        .chunks(width)
        .enumerate()
        .map(|(index, chunk)| {
            let field = std::str::from_utf8(chunk).map_err(|_| {
                RetargetError::Format(format!("field {} is not valid text", index))
            })?;
            field.trim().parse::<f32>().map_err(|_| {
                RetargetError::Format(format!("field {} is not a number: {:?}", index, field))
            })
        })
        .collect()
}
