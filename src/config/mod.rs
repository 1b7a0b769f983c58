// ==========================================
// 委员会席位分配系统 - 配置层
// ==========================================
// 职责: 引擎运行参数（改进上限、阈值、并行开关）
// 存储: 可选 YAML 文件
// ==========================================

pub mod engine_config;

pub use engine_config::{
    ConfigError, EngineConfig, DEFAULT_MAX_IMPROVEMENT_PASSES, DEFAULT_MIN_IMPROVEMENT,
};
