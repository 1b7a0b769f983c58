// ==========================================
// 委员会席位分配系统 - 引擎层
// ==========================================
// 职责: 规则评估、可行性预检、贪心填充、局部改进、说明报告
// 红线: 引擎不做 I/O，所有排除/得分必须输出 reason
// ==========================================

pub mod context;
pub mod error;
pub mod feasibility;
pub mod greedy;
pub mod improver;
pub mod orchestrator;
pub mod reporter;
pub mod rule_engine;
pub mod rule_library;
pub mod template;

// 重导出核心引擎
pub use context::AllocationContext;
pub use error::{EngineError, EngineResult};
pub use feasibility::{BlockingRule, FeasibilityAnalyzer, FeasibilityReport};
pub use greedy::{FillOutcome, GreedyAllocator};
pub use improver::{ImprovementOutcome, LocalImprover, MoveKind, MoveRecord};
pub use orchestrator::{allocate, allocate_with_config, AllocationOrchestrator, AllocationResult};
pub use reporter::{
    health_label, AllocationIssue, CommitteeReport, IssueKind, MemberSeat, RationaleReporter,
};
pub use rule_engine::{CompiledRule, Evaluation, Exclusion, RuleEngine, RuleSet};
pub use rule_library::{registered_slugs, RuleContext, RuleSpec};
pub use template::{Template, TemplateContext, TemplateError, TemplateScope};
