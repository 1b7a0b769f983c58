// ==========================================
// 委员会席位分配系统 - 贪心席位填充
// ==========================================
// 红线: 锁定成员优先放置且不可移除
// 红线: 硬规则优先于软得分
// ==========================================
// 职责: 按难度排序委员会，逐席选择边际得分最高的合格候选人
// 输入: 分配上下文 + 可行性报告
// 输出: 填充后的 Assignment + 未满员委员会列表
// ==========================================

use crate::domain::allocation::Assignment;
use crate::domain::committee::Committee;
use crate::domain::person::Person;
use crate::engine::context::AllocationContext;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::feasibility::FeasibilityReport;
use crate::engine::rule_engine::RuleEngine;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// 填充阶段结果
#[derive(Debug, Clone, PartialEq)]
pub struct FillOutcome {
    /// 实际处理顺序（委员会ID）
    pub order: Vec<String>,
    /// 本阶段新增席位数（不含锁定）
    pub seats_filled: usize,
    /// 填充后仍低于 size_min 的可行委员会
    pub unfilled: Vec<String>,
}

// ==========================================
// GreedyAllocator - 贪心填充引擎
// ==========================================
pub struct GreedyAllocator {
    rule_engine: RuleEngine,
    parallel_scoring: bool,
}

impl GreedyAllocator {
    /// 构造函数
    ///
    /// # 参数
    /// - parallel_scoring: 是否使用 rayon 并行计算候选人得分
    pub fn new(parallel_scoring: bool) -> Self {
        Self {
            rule_engine: RuleEngine::new(),
            parallel_scoring,
        }
    }

    /// 委员会处理顺序
    ///
    /// # 规则
    /// 1. |pool| / size_min 升序（交叉相乘比较，size_min=0 视为无限容易）
    /// 2. size_min 降序
    /// 3. id 升序
    pub fn committee_order<'a>(
        ctx: &AllocationContext<'a>,
        reports: &BTreeMap<String, FeasibilityReport>,
    ) -> Vec<&'a Committee> {
        let pool_of = |c: &Committee| reports.get(&c.id).map_or(0, FeasibilityReport::pool_size);
        let mut order: Vec<&Committee> = ctx.committees().to_vec();
        order.sort_by(|a, b| {
            compare_difficulty(pool_of(*a), a.size_min, pool_of(*b), b.size_min)
                .then_with(|| b.size_min.cmp(&a.size_min))
                .then_with(|| a.id.cmp(&b.id))
        });
        order
    }

    /// 放置锁定成员（全部委员会，按委员会ID、人员ID顺序）
    ///
    /// # 规则
    /// 1. 锁定人数不得超过 size_max
    /// 2. 每位锁定成员相对已放置的锁定成员必须通过全部硬规则
    ///
    /// # 返回
    /// - Ok(放置人数)
    /// - Err(EngineError): 配置错误（调用方丢弃该分配）
    #[instrument(skip(self, ctx, assignment))]
    pub fn place_locks(&self, ctx: &AllocationContext<'_>, assignment: &mut Assignment) -> EngineResult<usize> {
        for committee in ctx.committees() {
            if committee.locked_members.len() > committee.size_max {
                return Err(EngineError::LockOverflow {
                    committee: committee.id.clone(),
                    locked: committee.locked_members.len(),
                    size_max: committee.size_max,
                });
            }
        }

        let mut placed = 0;
        for committee in ctx.committees() {
            for person_id in &committee.locked_members {
                let person = ctx.person(person_id).ok_or_else(|| EngineError::UnknownLockPerson {
                    committee: committee.id.clone(),
                    person: person_id.clone(),
                })?;
                if let Some(exclusion) = self.rule_engine.first_exclusion(ctx, person, committee, assignment) {
                    return Err(EngineError::LockViolation {
                        committee: committee.id.clone(),
                        person: person_id.clone(),
                        rule: exclusion.rule,
                        reason: exclusion.reason,
                    });
                }
                assignment.assign(&committee.id, person_id);
                placed += 1;
            }
        }

        debug!(placed, "锁定成员放置完成");
        Ok(placed)
    }

    /// 逐席填充
    ///
    /// # 规则
    /// 1. 不可行委员会跳过（只保留锁定成员）
    /// 2. 每席选择边际得分最高的合格候选人，同分取 ID 较小者
    /// 3. 填到 size_max 或无合格候选人为止
    /// 4. 结束时低于 size_min → 未满员
    #[instrument(skip_all, fields(committees = ctx.committees().len(), parallel = self.parallel_scoring))]
    pub fn fill(
        &self,
        ctx: &AllocationContext<'_>,
        reports: &BTreeMap<String, FeasibilityReport>,
        assignment: &mut Assignment,
    ) -> FillOutcome {
        let order = Self::committee_order(ctx, reports);
        let mut seats_filled = 0;
        let mut unfilled = Vec::new();

        for committee in &order {
            let feasible = reports.get(&committee.id).map_or(true, |r| r.feasible);
            if !feasible {
                debug!(committee_id = %committee.id, "跳过不可行委员会");
                continue;
            }

            while assignment.size(&committee.id) < committee.size_max {
                let Some((person, score)) = self.best_candidate(ctx, committee, assignment) else {
                    break;
                };
                debug!(
                    committee_id = %committee.id,
                    person_id = %person.id,
                    score,
                    "填充席位"
                );
                assignment.assign(&committee.id, &person.id);
                seats_filled += 1;
            }

            if assignment.size(&committee.id) < committee.size_min {
                info!(
                    committee_id = %committee.id,
                    size = assignment.size(&committee.id),
                    size_min = committee.size_min,
                    "委员会未满员"
                );
                unfilled.push(committee.id.clone());
            }
        }

        info!(seats_filled, unfilled = unfilled.len(), "贪心填充完成");
        FillOutcome {
            order: order.iter().map(|c| c.id.clone()).collect(),
            seats_filled,
            unfilled,
        }
    }

    /// 当前席位的最佳候选人
    fn best_candidate<'a>(
        &self,
        ctx: &AllocationContext<'a>,
        committee: &Committee,
        assignment: &Assignment,
    ) -> Option<(&'a Person, f64)> {
        let score_one = |person: &&'a Person| -> Option<f64> {
            if assignment.contains(&committee.id, &person.id)
                || !self.rule_engine.is_eligible(ctx, person, committee, assignment)
            {
                return None;
            }
            Some(self.rule_engine.marginal_score(ctx, person, committee, assignment))
        };

        // 并行只用于打分，结果按候选人顺序收集后单线程选择
        let scores: Vec<Option<f64>> = if self.parallel_scoring {
            ctx.people().par_iter().map(score_one).collect()
        } else {
            ctx.people().iter().map(score_one).collect()
        };

        ctx.people()
            .iter()
            .zip(scores)
            .filter_map(|(person, score)| score.map(|s| (*person, s)))
            .fold(None, |best, (person, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((person, score)),
            })
    }
}

/// 难度比较: pool_a/min_a 与 pool_b/min_b（Less = a 更难）
fn compare_difficulty(pool_a: usize, min_a: usize, pool_b: usize, min_b: usize) -> Ordering {
    match (min_a, min_b) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        _ => (pool_a * min_b).cmp(&(pool_b * min_a)),
    }
}
