// ==========================================
// 委员会席位分配系统 - 领域模型层
// ==========================================
// 职责: 定义人员、委员会、规则定义、场景覆写、分配结果
// 红线: 不含文件读写逻辑,不含分配引擎逻辑
// ==========================================

pub mod allocation;
pub mod committee;
pub mod person;
pub mod rule;
pub mod scenario;
pub mod types;

// 重导出核心类型
pub use allocation::{Assignment, RationaleCard, RuleEvaluation, RuleResult};
pub use committee::{Committee, CoverageSnapshot, DiversityAttribute, DiversityKey, TermRecord};
pub use person::Person;
pub use rule::{RuleDefinition, RuleParams};
pub use scenario::Scenario;
pub use types::{CommitteeStatus, DecisionOutcome, HealthLabel, RuleKind};
