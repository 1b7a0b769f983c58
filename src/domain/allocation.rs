// ==========================================
// 委员会席位分配系统 - 分配结果领域模型
// ==========================================
// Assignment: committee_id -> 成员集合
// 红线: 只由 GreedyAllocator / LocalImprover 顺序修改，不允许并发写
// ==========================================

use crate::domain::types::{DecisionOutcome, RuleKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// Assignment - 进行中的分配
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    seats: BTreeMap<String, BTreeSet<String>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为每个委员会预建空席位集合（保证输出包含空委员会）
    pub fn with_committees<'a>(committee_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let seats = committee_ids
            .into_iter()
            .map(|id| (id.to_string(), BTreeSet::new()))
            .collect();
        Self { seats }
    }

    pub fn members(&self, committee_id: &str) -> impl Iterator<Item = &str> + '_ {
        self.seats
            .get(committee_id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn size(&self, committee_id: &str) -> usize {
        self.seats.get(committee_id).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, committee_id: &str, person_id: &str) -> bool {
        self.seats
            .get(committee_id)
            .is_some_and(|set| set.contains(person_id))
    }

    /// 加入成员; 已存在时返回 false
    pub fn assign(&mut self, committee_id: &str, person_id: &str) -> bool {
        self.seats
            .entry(committee_id.to_string())
            .or_default()
            .insert(person_id.to_string())
    }

    /// 移除成员; 不存在时返回 false
    pub fn unassign(&mut self, committee_id: &str, person_id: &str) -> bool {
        self.seats
            .get_mut(committee_id)
            .is_some_and(|set| set.remove(person_id))
    }

    /// 某人拟任的全部委员会
    pub fn committees_of<'a>(&'a self, person_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.seats
            .iter()
            .filter(move |(_, members)| members.contains(person_id))
            .map(|(id, _)| id.as_str())
    }

    /// 导出为有序名单 (committee_id -> 排序后的成员ID)
    pub fn to_roster(&self) -> BTreeMap<String, Vec<String>> {
        self.seats
            .iter()
            .map(|(id, members)| (id.clone(), members.iter().cloned().collect()))
            .collect()
    }
}

// ==========================================
// RuleEvaluation - 单条规则评估记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub rule: String,
    pub kind: RuleKind,
    #[serde(flatten)]
    pub result: RuleResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleResult {
    /// 硬规则通过
    Passed,
    /// 硬规则排除（短路后续规则）
    Excluded { reason: String },
    /// 软规则加权贡献
    Scored { contribution: f64, explanation: String },
}

impl RuleEvaluation {
    pub fn is_exclusion(&self) -> bool {
        matches!(self.result, RuleResult::Excluded { .. })
    }

    pub fn contribution(&self) -> f64 {
        match self.result {
            RuleResult::Scored { contribution, .. } => contribution,
            _ => 0.0,
        }
    }
}

// ==========================================
// RationaleCard - 席位决策说明
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RationaleCard {
    pub person_id: String,
    pub committee_id: String,
    pub outcome: DecisionOutcome,

    /// 排除时的决定性硬规则
    pub deciding_rule: Option<String>,

    /// ASSIGNED: 最终得分; CONSIDERED_NOT_CHOSEN: 相对最终名单的边际得分
    pub score: Option<f64>,

    pub locked: bool,

    /// 按评估顺序排列
    pub evaluations: Vec<RuleEvaluation>,

    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_unassign() {
        let mut assignment = Assignment::with_committees(["audit", "finance"]);
        assert!(assignment.assign("finance", "alice"));
        assert!(!assignment.assign("finance", "alice"));
        assert!(assignment.contains("finance", "alice"));
        assert_eq!(assignment.size("finance"), 1);
        assert_eq!(assignment.size("audit"), 0);

        assert!(assignment.unassign("finance", "alice"));
        assert!(!assignment.unassign("finance", "alice"));
        assert!(!assignment.unassign("unknown", "alice"));
    }

    #[test]
    fn test_committees_of_and_roster_are_sorted() {
        let mut assignment = Assignment::with_committees(["strategy", "finance"]);
        assignment.assign("strategy", "carol");
        assignment.assign("strategy", "alice");
        assignment.assign("finance", "alice");

        let committees: Vec<&str> = assignment.committees_of("alice").collect();
        assert_eq!(committees, vec!["finance", "strategy"]);

        let roster = assignment.to_roster();
        assert_eq!(roster["strategy"], vec!["alice", "carol"]);
    }

    #[test]
    fn test_rule_evaluation_contribution() {
        let scored = RuleEvaluation {
            rule: "has_competency".to_string(),
            kind: RuleKind::Soft,
            result: RuleResult::Scored {
                contribution: 1.5,
                explanation: "adds finance".to_string(),
            },
        };
        let passed = RuleEvaluation {
            rule: "service_cap".to_string(),
            kind: RuleKind::Hard,
            result: RuleResult::Passed,
        };
        assert_eq!(scored.contribution(), 1.5);
        assert_eq!(passed.contribution(), 0.0);
        assert!(!passed.is_exclusion());
    }
}
