// ==========================================
// 委员会席位分配系统 - 核心库
// ==========================================
// 系统定位: 决策支持系统 (人工最终控制权)
// 流程: 导入 → 分配引擎 → 说明报告 → 导出
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 分配规则与算法
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 输出文件
pub mod export;

// 配置层 - 引擎参数
pub mod config;

// 命令行
pub mod cli;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CommitteeStatus, DecisionOutcome, HealthLabel, RuleKind};

// 领域实体
pub use domain::{
    Assignment, Committee, CoverageSnapshot, Person, RationaleCard, RuleDefinition,
    RuleEvaluation, RuleResult, Scenario,
};

// 引擎
pub use engine::{
    allocate, allocate_with_config, AllocationOrchestrator, AllocationResult, EngineError,
    EngineResult,
};

// 配置
pub use config::EngineConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "委员会席位分配系统";
