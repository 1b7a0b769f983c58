use crate::domain::committee::CoverageSnapshot;
use crate::domain::types::{CommitteeStatus, HealthLabel};
use crate::engine::feasibility::BlockingRule;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// MemberSeat - 最终名单中的一个席位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSeat {
    pub person_id: String,
    pub locked: bool,
    /// 相对其余成员的软得分
    pub score: f64,
}

// ==========================================
// CommitteeReport - 委员会健康报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitteeReport {
    pub committee_id: String,
    pub name: String,
    pub status: CommitteeStatus,
    pub health: HealthLabel,
    pub coverage: CoverageSnapshot,

    /// 成员（ID 升序）
    pub members: Vec<MemberSeat>,

    /// 人类可读问题描述
    pub issues: Vec<String>,
}

// ==========================================
// AllocationIssue - 非致命问题
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    Infeasible, // 预检不可行
    Unfilled,   // 可行但填充后未满员
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Infeasible => write!(f, "INFEASIBLE"),
            IssueKind::Unfilled => write!(f, "UNFILLED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationIssue {
    pub committee_id: String,
    pub kind: IssueKind,
    pub detail: String,
    /// 仅 INFEASIBLE 时非空
    pub blocking_rules: Vec<BlockingRule>,
}

impl fmt::Display for AllocationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.committee_id, self.detail)
    }
}
