// ==========================================
// 委员会席位分配系统 - 导出文档结构
// ==========================================
// allocation.yaml: committees -> {name, status, health, members}
// rationale.yaml : seats / committee_health / issues / summary
// 红线: 纯派生，不包含任何新决策
// ==========================================

use crate::domain::allocation::RuleEvaluation;
use crate::domain::types::{CommitteeStatus, DecisionOutcome, HealthLabel};
use crate::engine::orchestrator::AllocationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// allocation.yaml
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDocument {
    pub committees: BTreeMap<String, CommitteeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitteeEntry {
    pub name: String,
    pub status: CommitteeStatus,
    pub health: HealthLabel,
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub person: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub score: f64,
}

impl AllocationDocument {
    /// committee_id → 成员ID
    pub fn roster(&self) -> BTreeMap<&str, Vec<&str>> {
        self.committees
            .iter()
            .map(|(id, entry)| {
                (
                    id.as_str(),
                    entry.members.iter().map(|m| m.person.as_str()).collect(),
                )
            })
            .collect()
    }
}

impl From<&AllocationResult> for AllocationDocument {
    fn from(result: &AllocationResult) -> Self {
        let committees = result
            .committees
            .iter()
            .map(|report| {
                let members = report
                    .members
                    .iter()
                    .map(|seat| MemberEntry {
                        person: seat.person_id.clone(),
                        locked: seat.locked,
                        score: seat.score,
                    })
                    .collect();
                (
                    report.committee_id.clone(),
                    CommitteeEntry {
                        name: report.name.clone(),
                        status: report.status,
                        health: report.health,
                        members,
                    },
                )
            })
            .collect();
        Self { committees }
    }
}

// ==========================================
// rationale.yaml
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RationaleDocument {
    /// committee_id → person_id → 说明
    pub seats: BTreeMap<String, BTreeMap<String, SeatEntry>>,
    pub committee_health: BTreeMap<String, HealthEntry>,
    pub issues: Vec<String>,
    pub summary: SummaryEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatEntry {
    pub outcome: DecisionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deciding_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub locked: bool,
    pub evaluations: Vec<RuleEvaluation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEntry {
    pub size: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub status: CommitteeStatus,
    pub health: HealthLabel,
    pub missing_competencies: BTreeMap<String, usize>,
    pub desired_gap: BTreeMap<String, usize>,
    pub diversity_deviation: BTreeMap<String, usize>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub greedy_score: f64,
    pub final_score: f64,
    pub improvement_passes: usize,
    pub moves: Vec<String>,
}

impl From<&AllocationResult> for RationaleDocument {
    fn from(result: &AllocationResult) -> Self {
        let mut seats: BTreeMap<String, BTreeMap<String, SeatEntry>> = BTreeMap::new();
        for card in &result.cards {
            seats.entry(card.committee_id.clone()).or_default().insert(
                card.person_id.clone(),
                SeatEntry {
                    outcome: card.outcome,
                    deciding_rule: card.deciding_rule.clone(),
                    score: card.score,
                    locked: card.locked,
                    evaluations: card.evaluations.clone(),
                    notes: card.notes.clone(),
                },
            );
        }

        let committee_health = result
            .committees
            .iter()
            .map(|report| {
                let coverage = &report.coverage;
                (
                    report.committee_id.clone(),
                    HealthEntry {
                        size: coverage.size,
                        min_size: coverage.size_min,
                        max_size: coverage.size_max,
                        status: report.status,
                        health: report.health,
                        missing_competencies: coverage.missing_required.clone(),
                        desired_gap: coverage.desired_gap.clone(),
                        diversity_deviation: coverage.diversity_deviation.clone(),
                        issues: report.issues.clone(),
                    },
                )
            })
            .collect();

        Self {
            seats,
            committee_health,
            issues: result.issues.iter().map(ToString::to_string).collect(),
            summary: SummaryEntry {
                greedy_score: result.greedy_score,
                final_score: result.final_score,
                improvement_passes: result.improvement_passes,
                moves: result.moves.iter().map(|m| m.describe()).collect(),
            },
        }
    }
}
