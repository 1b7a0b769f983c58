// ==========================================
// 委员会席位分配系统 - 决策说明与健康报告
// ==========================================
// 红线: 纯派生，不做任何新的分配决策
// 红线: 每个 (人员, 委员会) 组合恰好一张说明卡
// ==========================================
// 职责: 席位决策说明卡 + 委员会覆盖快照/状态/健康等级
// 输入: 最终分配 + 可行性报告
// 输出: RationaleCard 列表 + CommitteeReport 列表 + 问题清单
// ==========================================

mod core;
mod report;

#[cfg(test)]
mod tests;

pub use self::core::{health_label, RationaleReporter};
pub use self::report::{AllocationIssue, CommitteeReport, IssueKind, MemberSeat};
