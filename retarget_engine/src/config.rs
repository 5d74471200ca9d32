//! 重定向配置
//!
//! 参数扁平化。`Retargeter` 构造时拷贝一份快照，求值过程中不再读取全局配置。

use once_cell::sync::Lazy;
use std::sync::RwLock;

use crate::codec::DEFAULT_FIELD_WIDTH;

/// 重定向配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct RetargetConfig {
    // ========== 轴锁定 ==========
    /// 锁定轴的角度阈值（弧度），默认 0.001
    /// 低于此值的欧拉分量视为零，不做修正
    pub lock_epsilon: f32,

    // ========== 编解码 ==========
    /// 浮点数组编码的定宽字段宽度，默认 6
    pub codec_width: usize,

    // ========== 输入 ==========
    /// 是否归一化输入四元数，默认 true
    /// 驱动变量是采样得到的浮点数，长度会偏离 1
    pub normalize_input_rotation: bool,

    // ========== 调试 ==========
    /// 是否输出逐次求值的调试日志，默认 false
    pub debug_log: bool,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            lock_epsilon: 0.001,
            codec_width: DEFAULT_FIELD_WIDTH,
            normalize_input_rotation: true,
            debug_log: false,
        }
    }
}

/// 全局配置实例
static RETARGET_CONFIG: Lazy<RwLock<RetargetConfig>> = Lazy::new(|| {
    RwLock::new(RetargetConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> RetargetConfig {
    match RETARGET_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: RetargetConfig) {
    match RETARGET_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(RetargetConfig::default());
}
