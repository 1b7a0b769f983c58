// ==========================================
// 委员会席位分配系统 - 引擎错误类型
// ==========================================
// 红线: 配置错误在任何分配变更之前抛出
// 红线: 不可行/未满员不是错误，记录在 AllocationResult.issues
// ==========================================

use crate::domain::types::RuleKind;
use crate::engine::template::TemplateError;
use thiserror::Error;

/// 引擎配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 规则编译错误 =====
    #[error("规则 '{rule}' 引用了未知实现 '{slug}'")]
    UnknownRule { rule: String, slug: String },

    #[error("规则 '{rule}' 声明为 {declared}，但实现 '{slug}' 是 {expected} 规则")]
    KindMismatch {
        rule: String,
        slug: String,
        declared: RuleKind,
        expected: RuleKind,
    },

    #[error("规则 '{rule}' 参数无效: {message}")]
    InvalidParams { rule: String, message: String },

    #[error("规则 '{rule}' 的 {field} 模板无效: {source}")]
    InvalidTemplate {
        rule: String,
        field: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("软规则 '{rule}' 缺少 weight")]
    MissingWeight { rule: String },

    #[error("规则 '{rule}' 的权重不是有限数: {weight}")]
    NonFiniteWeight { rule: String, weight: f64 },

    #[error("规则 '{rule}' 的 applies_to 引用了未知委员会 '{selector}'")]
    UnknownAppliesTo { rule: String, selector: String },

    #[error("规则名称重复: {0}")]
    DuplicateRule(String),

    // ===== 场景覆写错误 =====
    #[error("权重覆写引用了未知规则: {0}")]
    UnknownWeightOverride(String),

    #[error("硬规则 '{0}' 不接受权重覆写")]
    HardRuleWeightOverride(String),

    // ===== 输入数据错误 =====
    #[error("人员ID重复: {0}")]
    DuplicatePerson(String),

    #[error("委员会ID重复: {0}")]
    DuplicateCommittee(String),

    #[error("委员会 '{committee}' 定义无效: {message}")]
    InvalidCommittee { committee: String, message: String },

    // ===== 锁定错误 =====
    #[error("锁定引用了未知委员会: {0}")]
    UnknownLockCommittee(String),

    #[error("委员会 '{committee}' 锁定了未知人员 '{person}'")]
    UnknownLockPerson { committee: String, person: String },

    #[error("委员会 '{committee}' 锁定 {locked} 人，超过 size_max {size_max}")]
    LockOverflow {
        committee: String,
        locked: usize,
        size_max: usize,
    },

    #[error("锁定成员 '{person}' 违反委员会 '{committee}' 的硬规则 '{rule}': {reason}")]
    LockViolation {
        committee: String,
        person: String,
        rule: String,
        reason: String,
    },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
