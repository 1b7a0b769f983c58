// ==========================================
// 委员会席位分配系统 - 可行性预检
// ==========================================
// 职责: 按委员会计算硬规则合格池（相对空分配）
// 红线: 只读，不修改分配
// ==========================================
// 输出: FeasibilityReport（合格池 + 排除人数最多的硬规则）
// ==========================================

use crate::domain::allocation::Assignment;
use crate::engine::context::AllocationContext;
use crate::engine::rule_engine::RuleEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// 排除某委员会候选人的硬规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingRule {
    pub rule: String,
    /// 被该规则排除的人员（ID 升序）
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub committee_id: String,
    pub size_min: usize,
    /// 合格池（ID 升序）
    pub pool: Vec<String>,
    pub feasible: bool,
    /// 按排除人数降序、规则名升序
    pub blocking_rules: Vec<BlockingRule>,
}

impl FeasibilityReport {
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// 人类可读的不可行说明
    pub fn describe(&self) -> String {
        let mut text = format!(
            "eligible pool {} is below size_min {}",
            self.pool.len(),
            self.size_min
        );
        if !self.blocking_rules.is_empty() {
            let rules: Vec<String> = self
                .blocking_rules
                .iter()
                .map(|b| format!("{} ({})", b.rule, b.excluded.len()))
                .collect();
            text.push_str(&format!("; excluded by {}", rules.join(", ")));
        }
        text
    }
}

// ==========================================
// FeasibilityAnalyzer - 可行性预检
// ==========================================
pub struct FeasibilityAnalyzer {
    rule_engine: RuleEngine,
}

impl FeasibilityAnalyzer {
    pub fn new() -> Self {
        Self {
            rule_engine: RuleEngine::new(),
        }
    }

    /// 预检全部委员会
    ///
    /// # 返回
    /// committee_id → FeasibilityReport
    #[instrument(skip(self, ctx), fields(committees = ctx.committees().len(), people = ctx.people().len()))]
    pub fn analyze(&self, ctx: &AllocationContext<'_>) -> BTreeMap<String, FeasibilityReport> {
        let empty = Assignment::with_committees(ctx.committees().iter().map(|c| c.id.as_str()));
        let mut reports = BTreeMap::new();

        for committee in ctx.committees() {
            let mut pool = Vec::new();
            let mut excluded_by: BTreeMap<String, Vec<String>> = BTreeMap::new();

            for person in ctx.people() {
                match self.rule_engine.first_exclusion(ctx, person, committee, &empty) {
                    None => pool.push(person.id.clone()),
                    Some(exclusion) => excluded_by
                        .entry(exclusion.rule)
                        .or_default()
                        .push(person.id.clone()),
                }
            }

            let mut blocking_rules: Vec<BlockingRule> = excluded_by
                .into_iter()
                .map(|(rule, excluded)| BlockingRule { rule, excluded })
                .collect();
            blocking_rules.sort_by(|a, b| {
                b.excluded
                    .len()
                    .cmp(&a.excluded.len())
                    .then_with(|| a.rule.cmp(&b.rule))
            });

            let feasible = pool.len() >= committee.size_min;
            if !feasible {
                warn!(
                    committee_id = %committee.id,
                    pool = pool.len(),
                    size_min = committee.size_min,
                    "委员会不可行: 合格池不足"
                );
            }

            reports.insert(
                committee.id.clone(),
                FeasibilityReport {
                    committee_id: committee.id.clone(),
                    size_min: committee.size_min,
                    pool,
                    feasible,
                    blocking_rules,
                },
            );
        }

        info!(
            infeasible = reports.values().filter(|r| !r.feasible).count(),
            "可行性预检完成"
        );
        reports
    }
}

impl Default for FeasibilityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
