// ==========================================
// 委员会席位分配系统 - 局部改进
// ==========================================
// 红线: 锁定成员不可移动
// 红线: 任何接受的调整都必须保持硬规则、规模约束成立
// 红线: 总得分单调不降，轮数有上限
// ==========================================
// 职责: 首次改进爬山（move / swap）
// 输入: 贪心填充后的 Assignment
// 输出: 改进后的 Assignment + 调整记录
// ==========================================

use crate::domain::allocation::Assignment;
use crate::domain::committee::Committee;
use crate::engine::context::AllocationContext;
use crate::engine::rule_engine::RuleEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, instrument};

/// 调整类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveKind {
    Move, // 单人换委员会
    Swap, // 两人互换
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveKind::Move => write!(f, "MOVE"),
            MoveKind::Swap => write!(f, "SWAP"),
        }
    }
}

/// 已接受的调整
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 第几轮（从 1 开始）
    pub pass: usize,
    pub kind: MoveKind,
    pub person: String,
    pub from: String,
    pub to: String,
    /// swap 时从 to 换回 from 的人员
    pub partner: Option<String>,
    /// 总得分增量
    pub delta: f64,
}

impl MoveRecord {
    pub fn describe(&self) -> String {
        match &self.partner {
            Some(partner) => format!(
                "{}: {} ({} -> {}) <-> {} ({} -> {}), +{:.2}",
                self.kind, self.person, self.from, self.to, partner, self.to, self.from, self.delta
            ),
            None => format!(
                "{}: {} ({} -> {}), +{:.2}",
                self.kind, self.person, self.from, self.to, self.delta
            ),
        }
    }
}

/// 改进阶段结果
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementOutcome {
    pub initial_score: f64,
    pub final_score: f64,
    /// 执行的扫描轮数
    pub passes: usize,
    pub moves: Vec<MoveRecord>,
}

struct Trial {
    kind: MoveKind,
    person: String,
    from: String,
    to: String,
    partner: Option<String>,
    assignment: Assignment,
}

// ==========================================
// LocalImprover - 局部改进引擎
// ==========================================
pub struct LocalImprover {
    rule_engine: RuleEngine,
    max_passes: usize,
    min_improvement: f64,
}

impl LocalImprover {
    /// 构造函数
    ///
    /// # 参数
    /// - max_passes: 最大扫描轮数
    /// - min_improvement: 接受调整所需的最小得分增量（严格大于）
    pub fn new(max_passes: usize, min_improvement: f64) -> Self {
        Self {
            rule_engine: RuleEngine::new(),
            max_passes,
            min_improvement,
        }
    }

    /// 总得分 = Σ委员会 Σ成员 成员相对其余成员的软得分
    pub fn total_score(&self, ctx: &AllocationContext<'_>, assignment: &Assignment) -> f64 {
        ctx.committees()
            .iter()
            .map(|c| self.committee_score(ctx, c, assignment))
            .sum()
    }

    fn committee_score(&self, ctx: &AllocationContext<'_>, committee: &Committee, assignment: &Assignment) -> f64 {
        ctx.members(&committee.id, assignment)
            .into_iter()
            .map(|member| self.rule_engine.marginal_score(ctx, member, committee, assignment))
            .sum()
    }

    /// 执行局部改进
    ///
    /// # 参数
    /// - ctx: 分配上下文
    /// - active: 参与调整的委员会ID（不可行委员会除外）
    /// - assignment: 当前分配（会被修改）
    #[instrument(skip_all, fields(active = active.len(), max_passes = self.max_passes))]
    pub fn improve(
        &self,
        ctx: &AllocationContext<'_>,
        active: &[String],
        assignment: &mut Assignment,
    ) -> ImprovementOutcome {
        let committees: Vec<&Committee> = ctx
            .committees()
            .iter()
            .copied()
            .filter(|c| active.contains(&c.id))
            .collect();

        let initial_score = self.total_score(ctx, assignment);
        let mut moves = Vec::new();
        let mut passes = 0;

        while passes < self.max_passes {
            passes += 1;
            let Some((trial, delta)) = self.first_improvement(ctx, &committees, assignment) else {
                break;
            };
            let record = MoveRecord {
                pass: passes,
                kind: trial.kind,
                person: trial.person,
                from: trial.from,
                to: trial.to,
                partner: trial.partner,
                delta,
            };
            debug!(pass = passes, change = %record.describe(), "接受调整");
            *assignment = trial.assignment;
            moves.push(record);
        }

        let final_score = self.total_score(ctx, assignment);
        info!(
            passes,
            moves = moves.len(),
            initial_score,
            final_score,
            "局部改进完成"
        );
        ImprovementOutcome {
            initial_score,
            final_score,
            passes,
            moves,
        }
    }

    /// 单轮扫描，返回第一个被接受的调整
    fn first_improvement(
        &self,
        ctx: &AllocationContext<'_>,
        committees: &[&Committee],
        assignment: &Assignment,
    ) -> Option<(Trial, f64)> {
        for from in committees {
            let movable: Vec<&str> = assignment
                .members(&from.id)
                .filter(|p| !from.locked_members.contains(*p))
                .collect();

            for to in committees {
                if from.id == to.id {
                    continue;
                }

                // (a) move: from → to
                let room_in_target = assignment.size(&to.id) < to.size_max;
                let can_leave = assignment.size(&from.id) > from.size_min;
                if room_in_target && can_leave {
                    for &person in movable.iter().filter(|p| !assignment.contains(&to.id, p)) {
                        let mut trial = assignment.clone();
                        trial.unassign(&from.id, person);
                        trial.assign(&to.id, person);
                        let trial = Trial {
                            kind: MoveKind::Move,
                            person: person.to_string(),
                            from: from.id.clone(),
                            to: to.id.clone(),
                            partner: None,
                            assignment: trial,
                        };
                        if let Some(delta) = self.accept(ctx, assignment, &trial) {
                            return Some((trial, delta));
                        }
                    }
                }

                // (b) swap: 只处理 from < to
                if from.id >= to.id {
                    continue;
                }
                let partners: Vec<&str> = assignment
                    .members(&to.id)
                    .filter(|q| !to.locked_members.contains(*q) && !assignment.contains(&from.id, q))
                    .collect();
                for &person in movable.iter().filter(|p| !assignment.contains(&to.id, p)) {
                    for &partner in &partners {
                        let mut trial = assignment.clone();
                        trial.unassign(&from.id, person);
                        trial.unassign(&to.id, partner);
                        trial.assign(&to.id, person);
                        trial.assign(&from.id, partner);
                        let trial = Trial {
                            kind: MoveKind::Swap,
                            person: person.to_string(),
                            from: from.id.clone(),
                            to: to.id.clone(),
                            partner: Some(partner.to_string()),
                            assignment: trial,
                        };
                        if let Some(delta) = self.accept(ctx, assignment, &trial) {
                            return Some((trial, delta));
                        }
                    }
                }
            }
        }
        None
    }

    /// 判定是否接受调整
    ///
    /// # 返回
    /// - Some(delta): 受影响委员会全部成员通过硬规则，且得分增量 > min_improvement
    /// - None: 拒绝
    fn accept(&self, ctx: &AllocationContext<'_>, current: &Assignment, trial: &Trial) -> Option<f64> {
        let mut affected: BTreeSet<&str> = BTreeSet::new();
        affected.insert(&trial.from);
        affected.insert(&trial.to);
        affected.extend(trial.assignment.committees_of(&trial.person));
        if let Some(partner) = &trial.partner {
            affected.extend(trial.assignment.committees_of(partner));
        }
        let affected: Vec<&Committee> = affected.into_iter().filter_map(|id| ctx.committee(id)).collect();

        let hard_ok = affected.iter().all(|committee| {
            ctx.members(&committee.id, &trial.assignment)
                .into_iter()
                .all(|member| self.rule_engine.is_eligible(ctx, member, committee, &trial.assignment))
        });
        if !hard_ok {
            return None;
        }

        let before: f64 = affected.iter().map(|c| self.committee_score(ctx, c, current)).sum();
        let after: f64 = affected
            .iter()
            .map(|c| self.committee_score(ctx, c, &trial.assignment))
            .sum();
        let delta = after - before;
        (delta > self.min_improvement).then_some(delta)
    }
}
