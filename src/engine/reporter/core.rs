// ==========================================
// 委员会席位分配系统 - 决策说明生成
// ==========================================
// 说明卡评估口径:
// - 已分配: 相对最终名单（不含本人）
// - 未分配: 相对最终名单，本人在其他委员会的拟任席位先释放
//   （容量被其他委员会占用不是排除原因，记录在 notes）
// ==========================================

use crate::domain::allocation::{Assignment, RationaleCard};
use crate::domain::committee::{Committee, CoverageSnapshot};
use crate::domain::person::Person;
use crate::domain::types::{CommitteeStatus, DecisionOutcome, HealthLabel};
use crate::engine::context::AllocationContext;
use crate::engine::feasibility::FeasibilityReport;
use crate::engine::rule_engine::RuleEngine;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use super::report::{AllocationIssue, CommitteeReport, IssueKind, MemberSeat};

/// 健康等级
///
/// # 规则
/// 1. 状态非 FILLED 或必需能力缺口 → CRITICAL
/// 2. 期望能力缺口或多样性偏差 → ATTENTION
/// 3. 否则 → HEALTHY
pub fn health_label(status: CommitteeStatus, coverage: &CoverageSnapshot) -> HealthLabel {
    if status != CommitteeStatus::Filled || !coverage.required_satisfied() {
        HealthLabel::Critical
    } else if !coverage.desired_gap.is_empty() || !coverage.diversity_deviation.is_empty() {
        HealthLabel::Attention
    } else {
        HealthLabel::Healthy
    }
}

// ==========================================
// RationaleReporter - 说明与健康报告
// ==========================================
pub struct RationaleReporter {
    rule_engine: RuleEngine,
}

impl RationaleReporter {
    pub fn new() -> Self {
        Self {
            rule_engine: RuleEngine::new(),
        }
    }

    /// 生成全部说明卡（委员会ID、人员ID升序）
    #[instrument(skip_all, fields(people = ctx.people().len(), committees = ctx.committees().len()))]
    pub fn build_cards(
        &self,
        ctx: &AllocationContext<'_>,
        assignment: &Assignment,
        feasibility: &BTreeMap<String, FeasibilityReport>,
    ) -> Vec<RationaleCard> {
        let mut cards = Vec::with_capacity(ctx.people().len() * ctx.committees().len());
        for committee in ctx.committees() {
            let report = feasibility.get(&committee.id);
            for person in ctx.people() {
                cards.push(self.build_card(ctx, person, committee, assignment, report));
            }
        }

        debug!(
            assigned = cards.iter().filter(|c| c.outcome == DecisionOutcome::Assigned).count(),
            excluded = cards.iter().filter(|c| c.outcome == DecisionOutcome::Excluded).count(),
            "说明卡生成完成"
        );
        cards
    }

    fn build_card(
        &self,
        ctx: &AllocationContext<'_>,
        person: &Person,
        committee: &Committee,
        assignment: &Assignment,
        report: Option<&FeasibilityReport>,
    ) -> RationaleCard {
        let assigned = assignment.contains(&committee.id, &person.id);
        let locked = committee.locked_members.contains(&person.id);

        let evaluation = if assigned {
            self.rule_engine.evaluate(ctx, person, committee, assignment)
        } else {
            let released = release_person(assignment, &person.id);
            self.rule_engine.evaluate(ctx, person, committee, &released)
        };

        let mut notes = Vec::new();
        if locked {
            notes.push("locked member".to_string());
        }
        if let Some(report) = report.filter(|r| !r.feasible) {
            notes.push(format!("committee infeasible: {}", report.describe()));
        }

        let (outcome, deciding_rule, score) = match (&evaluation.exclusion, assigned) {
            (Some(exclusion), true) => {
                notes.push(format!("hard rule flagged on final roster: {}", exclusion.reason));
                (DecisionOutcome::Assigned, None, Some(evaluation.score))
            }
            (None, true) => (DecisionOutcome::Assigned, None, Some(evaluation.score)),
            (Some(exclusion), false) => (DecisionOutcome::Excluded, Some(exclusion.rule.clone()), None),
            (None, false) => {
                let workload = person.workload_with(&committee.id, assignment);
                if workload > person.service_cap as usize {
                    notes.push(format!(
                        "service capacity used elsewhere: would hold {} seat(s) with service_cap {}",
                        workload, person.service_cap
                    ));
                }
                let size = assignment.size(&committee.id);
                if size >= committee.size_max {
                    notes.push(format!("no open seat: committee at size_max {}", committee.size_max));
                }
                (DecisionOutcome::ConsideredNotChosen, None, Some(evaluation.score))
            }
        };

        RationaleCard {
            person_id: person.id.clone(),
            committee_id: committee.id.clone(),
            outcome,
            deciding_rule,
            score,
            locked,
            evaluations: evaluation.evaluations,
            notes,
        }
    }

    /// 生成委员会报告（委员会ID升序）
    #[instrument(skip_all)]
    pub fn build_committee_reports(
        &self,
        ctx: &AllocationContext<'_>,
        assignment: &Assignment,
        feasibility: &BTreeMap<String, FeasibilityReport>,
    ) -> Vec<CommitteeReport> {
        let reports: Vec<CommitteeReport> = ctx
            .committees()
            .iter()
            .map(|committee| self.build_committee_report(ctx, committee, assignment, feasibility.get(&committee.id)))
            .collect();

        info!(
            critical = reports.iter().filter(|r| r.health == HealthLabel::Critical).count(),
            attention = reports.iter().filter(|r| r.health == HealthLabel::Attention).count(),
            "委员会健康报告完成"
        );
        reports
    }

    fn build_committee_report(
        &self,
        ctx: &AllocationContext<'_>,
        committee: &Committee,
        assignment: &Assignment,
        feasibility: Option<&FeasibilityReport>,
    ) -> CommitteeReport {
        let members = ctx.members(&committee.id, assignment);
        let coverage = committee.current_coverage(&members);

        let infeasible = feasibility.is_some_and(|r| !r.feasible);
        let status = if infeasible {
            CommitteeStatus::Infeasible
        } else if coverage.size_compliant() {
            CommitteeStatus::Filled
        } else {
            CommitteeStatus::Unfilled
        };
        let health = health_label(status, &coverage);

        let seats = members
            .iter()
            .map(|member| MemberSeat {
                person_id: member.id.clone(),
                locked: committee.locked_members.contains(&member.id),
                score: self.rule_engine.marginal_score(ctx, member, committee, assignment),
            })
            .collect();

        let mut issues = Vec::new();
        match (status, feasibility) {
            (CommitteeStatus::Infeasible, Some(report)) => {
                issues.push(format!("INFEASIBLE: {}", report.describe()));
            }
            (CommitteeStatus::Unfilled, _) => issues.push(format!(
                "UNFILLED: {} member(s), size_min {}",
                coverage.size, committee.size_min
            )),
            _ => {}
        }
        for (competency, short) in &coverage.missing_required {
            issues.push(format!("missing required competency {} (short {})", competency, short));
        }
        for (competency, short) in &coverage.desired_gap {
            issues.push(format!("desired competency {} short {}", competency, short));
        }
        for (target, short) in &coverage.diversity_deviation {
            issues.push(format!("diversity target {} short {}", target, short));
        }

        CommitteeReport {
            committee_id: committee.id.clone(),
            name: committee.name.clone(),
            status,
            health,
            coverage,
            members: seats,
            issues,
        }
    }

    /// 汇总不可行 / 未满员问题
    pub fn collect_issues(
        &self,
        committee_reports: &[CommitteeReport],
        feasibility: &BTreeMap<String, FeasibilityReport>,
    ) -> Vec<AllocationIssue> {
        committee_reports
            .iter()
            .filter_map(|report| match report.status {
                CommitteeStatus::Infeasible => {
                    let pre_check = feasibility.get(&report.committee_id);
                    Some(AllocationIssue {
                        committee_id: report.committee_id.clone(),
                        kind: IssueKind::Infeasible,
                        detail: pre_check.map_or_else(String::new, FeasibilityReport::describe),
                        blocking_rules: pre_check.map(|r| r.blocking_rules.clone()).unwrap_or_default(),
                    })
                }
                CommitteeStatus::Unfilled => Some(AllocationIssue {
                    committee_id: report.committee_id.clone(),
                    kind: IssueKind::Unfilled,
                    detail: format!(
                        "{} member(s) after fill, size_min {}; eligible people were placed elsewhere",
                        report.coverage.size, report.coverage.size_min
                    ),
                    blocking_rules: Vec::new(),
                }),
                CommitteeStatus::Filled => None,
            })
            .collect()
    }
}

impl Default for RationaleReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 释放某人的全部拟任席位
fn release_person<'a>(assignment: &'a Assignment, person_id: &str) -> Cow<'a, Assignment> {
    let held: Vec<String> = assignment.committees_of(person_id).map(str::to_string).collect();
    if held.is_empty() {
        return Cow::Borrowed(assignment);
    }
    let mut released = assignment.clone();
    for committee_id in &held {
        released.unassign(committee_id, person_id);
    }
    Cow::Owned(released)
}
