// ==========================================
// 委员会席位分配系统 - 引擎编排器
// ==========================================
// 用途: 协调五个核心引擎的执行顺序
// 流程: 场景覆写 → 校验 → 锁定 → 可行性预检 → 贪心填充 → 局部改进 → 说明报告
// 红线: 所有配置错误在任何分配变更之前返回
// ==========================================

use crate::config::EngineConfig;
use crate::domain::allocation::{Assignment, RationaleCard};
use crate::domain::committee::Committee;
use crate::domain::person::Person;
use crate::domain::rule::RuleDefinition;
use crate::domain::scenario::Scenario;
use crate::engine::context::AllocationContext;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::feasibility::{FeasibilityAnalyzer, FeasibilityReport};
use crate::engine::greedy::GreedyAllocator;
use crate::engine::improver::{LocalImprover, MoveRecord};
use crate::engine::reporter::{AllocationIssue, CommitteeReport, RationaleReporter};
use crate::engine::rule_engine::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

// ==========================================
// AllocationResult - 分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// committee_id → 成员ID（升序）
    pub roster: BTreeMap<String, Vec<String>>,

    /// 每个 (委员会, 人员) 一张说明卡
    pub cards: Vec<RationaleCard>,

    /// 委员会报告（ID 升序）
    pub committees: Vec<CommitteeReport>,

    /// 不可行 / 未满员
    pub issues: Vec<AllocationIssue>,

    /// 可行性预检（ID 升序）
    pub feasibility: Vec<FeasibilityReport>,

    // 得分
    pub greedy_score: f64,
    pub final_score: f64,

    // 局部改进
    pub moves: Vec<MoveRecord>,
    pub improvement_passes: usize,
}

impl AllocationResult {
    /// 某委员会的最终成员
    pub fn members(&self, committee_id: &str) -> &[String] {
        self.roster.get(committee_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn card(&self, committee_id: &str, person_id: &str) -> Option<&RationaleCard> {
        self.cards
            .iter()
            .find(|c| c.committee_id == committee_id && c.person_id == person_id)
    }

    pub fn committee(&self, committee_id: &str) -> Option<&CommitteeReport> {
        self.committees.iter().find(|c| c.committee_id == committee_id)
    }
}

/// 使用默认配置分配
///
/// # 参数
/// - people: 人员
/// - committees: 委员会
/// - rules: 规则定义
/// - scenario: 可选场景覆写（额外锁定 + 权重覆写）
///
/// # 返回
/// - Ok(AllocationResult)
/// - Err(EngineError): 配置错误
pub fn allocate(
    people: &[Person],
    committees: &[Committee],
    rules: &[RuleDefinition],
    scenario: Option<&Scenario>,
) -> EngineResult<AllocationResult> {
    allocate_with_config(people, committees, rules, scenario, &EngineConfig::default())
}

/// 使用指定引擎配置分配
pub fn allocate_with_config(
    people: &[Person],
    committees: &[Committee],
    rules: &[RuleDefinition],
    scenario: Option<&Scenario>,
    config: &EngineConfig,
) -> EngineResult<AllocationResult> {
    AllocationOrchestrator::new(config.clone()).run(people, committees, rules, scenario)
}

// ==========================================
// AllocationOrchestrator - 引擎编排器
// ==========================================
pub struct AllocationOrchestrator {
    config: EngineConfig,
    feasibility: FeasibilityAnalyzer,
    greedy: GreedyAllocator,
    improver: LocalImprover,
    reporter: RationaleReporter,
}

impl AllocationOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 引擎配置
    pub fn new(config: EngineConfig) -> Self {
        Self {
            feasibility: FeasibilityAnalyzer::new(),
            greedy: GreedyAllocator::new(config.parallel_scoring),
            improver: LocalImprover::new(config.max_improvement_passes, config.min_improvement),
            reporter: RationaleReporter::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 执行完整分配流程
    #[instrument(skip_all, fields(
        people = people.len(),
        committees = committees.len(),
        rules = rules.len(),
        scenario = scenario.is_some_and(|s| !s.is_empty())
    ))]
    pub fn run(
        &self,
        people: &[Person],
        committees: &[Committee],
        rules: &[RuleDefinition],
        scenario: Option<&Scenario>,
    ) -> EngineResult<AllocationResult> {
        info!("开始执行分配流程");

        // ==========================================
        // 步骤1: 输入校验 + 场景覆写（派生工作副本）
        // ==========================================
        ensure_unique_ids(people.iter().map(|p| p.id.as_str()), EngineError::DuplicatePerson)?;
        ensure_unique_ids(committees.iter().map(|c| c.id.as_str()), EngineError::DuplicateCommittee)?;
        for committee in committees {
            committee.validate().map_err(|message| EngineError::InvalidCommittee {
                committee: committee.id.clone(),
                message,
            })?;
        }

        let base_rules = RuleSet::compile(rules)?;
        ensure_known_selectors(&base_rules, committees)?;
        let rule_set = match scenario {
            Some(s) if !s.weights.is_empty() => base_rules.with_weight_overrides(&s.weights)?,
            _ => base_rules,
        };

        let people: Vec<Person> = people.iter().cloned().map(Person::normalized).collect();
        let committees = overlay_locks(committees, scenario, &people)?;
        debug!(rules = rule_set.len(), "规则编译完成");

        let ctx = AllocationContext::new(&people, &committees, &rule_set);

        // ==========================================
        // 步骤2: 锁定成员（锁定冲突仍属配置错误）
        // ==========================================
        let mut assignment = Assignment::with_committees(ctx.committees().iter().map(|c| c.id.as_str()));
        let locked = self.greedy.place_locks(&ctx, &mut assignment)?;

        // ==========================================
        // 步骤3: 可行性预检
        // ==========================================
        let feasibility = self.feasibility.analyze(&ctx);

        // ==========================================
        // 步骤4: 贪心填充
        // ==========================================
        let fill = self.greedy.fill(&ctx, &feasibility, &mut assignment);
        let greedy_score = self.improver.total_score(&ctx, &assignment);

        // ==========================================
        // 步骤5: 局部改进
        // ==========================================
        let (final_score, moves, improvement_passes) = if self.config.enable_local_search {
            let active: Vec<String> = feasibility
                .values()
                .filter(|r| r.feasible)
                .map(|r| r.committee_id.clone())
                .collect();
            let outcome = self.improver.improve(&ctx, &active, &mut assignment);
            (outcome.final_score, outcome.moves, outcome.passes)
        } else {
            debug!("局部改进已关闭");
            (greedy_score, Vec::new(), 0)
        };

        // ==========================================
        // 步骤6: 说明卡 + 健康报告
        // ==========================================
        let cards = self.reporter.build_cards(&ctx, &assignment, &feasibility);
        let committee_reports = self.reporter.build_committee_reports(&ctx, &assignment, &feasibility);
        let issues = self.reporter.collect_issues(&committee_reports, &feasibility);

        info!(
            locked,
            seats_filled = fill.seats_filled,
            unfilled = fill.unfilled.len(),
            issues = issues.len(),
            greedy_score,
            final_score,
            moves = moves.len(),
            "分配流程完成"
        );

        Ok(AllocationResult {
            roster: assignment.to_roster(),
            cards,
            committees: committee_reports,
            issues,
            feasibility: feasibility.into_values().collect(),
            greedy_score,
            final_score,
            moves,
            improvement_passes,
        })
    }
}

impl Default for AllocationOrchestrator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn ensure_unique_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    duplicate: fn(String) -> EngineError,
) -> EngineResult<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(duplicate(id.to_string()));
        }
    }
    Ok(())
}

/// applies_to 中的每一项必须匹配某个委员会的 ID 或名称
fn ensure_known_selectors(rules: &RuleSet, committees: &[Committee]) -> EngineResult<()> {
    for rule in rules.hard_rules().iter().chain(rules.soft_rules()) {
        if let Some(selector) = rule
            .applies_to
            .iter()
            .find(|s| !committees.iter().any(|c| c.matches(s)))
        {
            return Err(EngineError::UnknownAppliesTo {
                rule: rule.name.clone(),
                selector: selector.clone(),
            });
        }
    }
    Ok(())
}

/// 合并委员会自身锁定与场景锁定，校验引用
fn overlay_locks(
    committees: &[Committee],
    scenario: Option<&Scenario>,
    people: &[Person],
) -> EngineResult<Vec<Committee>> {
    let mut working: Vec<Committee> = committees.to_vec();

    if let Some(scenario) = scenario {
        for (committee_id, members) in &scenario.locks {
            let committee = working
                .iter_mut()
                .find(|c| &c.id == committee_id)
                .ok_or_else(|| EngineError::UnknownLockCommittee(committee_id.clone()))?;
            committee.locked_members.extend(members.iter().cloned());
        }
    }

    let known: BTreeSet<&str> = people.iter().map(|p| p.id.as_str()).collect();
    for committee in &working {
        if let Some(unknown) = committee
            .locked_members
            .iter()
            .find(|id| !known.contains(id.as_str()))
        {
            return Err(EngineError::UnknownLockPerson {
                committee: committee.id.clone(),
                person: unknown.clone(),
            });
        }
    }
    Ok(working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CommitteeStatus, DecisionOutcome};

    fn person(id: &str, cap: u32, competencies: &[&str]) -> Person {
        let mut person = Person::new(id, id, cap);
        person.competencies = competencies.iter().map(|c| c.to_string()).collect();
        person
    }

    fn sample_people() -> Vec<Person> {
        vec![
            person("alice", 2, &["finance", "strategy"]),
            person("bob", 1, &[]),
            person("carol", 1, &["strategy"]),
            person("dave", 1, &["finance"]),
        ]
    }

    fn sample_committees() -> Vec<Committee> {
        let mut finance = Committee::new("finance", "Finance", 1, 2);
        finance.required_competencies.insert("finance".to_string(), 1);
        let mut strategy = Committee::new("strategy", "Strategy", 1, 2);
        strategy.required_competencies.insert("strategy".to_string(), 1);
        vec![finance, Committee::new("operations", "Operations", 1, 1), strategy]
    }

    fn sample_rules() -> Vec<RuleDefinition> {
        vec![
            RuleDefinition::hard("service_cap", 1),
            RuleDefinition::soft("has_finance", 10, 1.0)
                .with_implementation("has_competency")
                .with_param("competency", "finance")
                .with_applies_to(&["finance"]),
            RuleDefinition::soft("has_strategy", 10, 1.0)
                .with_implementation("has_competency")
                .with_param("competency", "strategy")
                .with_applies_to(&["strategy"]),
        ]
    }

    #[test]
    fn test_sample_allocation() {
        let result = allocate(&sample_people(), &sample_committees(), &sample_rules(), None).unwrap();

        assert_eq!(result.members("finance"), ["alice", "dave"]);
        assert_eq!(result.members("operations"), ["bob"]);
        assert_eq!(result.members("strategy"), ["alice", "carol"]);
        assert_eq!(result.greedy_score, 3.0);
        assert_eq!(result.final_score, 4.0);
        assert_eq!(result.moves.len(), 1);
        assert!(result.issues.is_empty());

        let carol = result.card("finance", "carol").unwrap();
        assert_eq!(carol.outcome, DecisionOutcome::ConsideredNotChosen);
        let finance_rule = carol.evaluations.iter().find(|e| e.rule == "has_finance").unwrap();
        assert_eq!(finance_rule.contribution(), 0.0);
    }

    #[test]
    fn test_local_search_can_be_disabled() {
        let config = EngineConfig {
            enable_local_search: false,
            ..EngineConfig::default()
        };
        let result = allocate_with_config(&sample_people(), &sample_committees(), &sample_rules(), None, &config)
            .unwrap();
        assert_eq!(result.members("operations"), ["alice"]);
        assert_eq!(result.members("strategy"), ["bob", "carol"]);
        assert_eq!(result.final_score, result.greedy_score);
        assert_eq!(result.improvement_passes, 0);
        assert!(result.moves.is_empty());
    }

    #[test]
    fn test_scenario_lock_is_honoured() {
        let mut scenario = Scenario::default();
        scenario.lock("operations", "carol");
        let result =
            allocate(&sample_people(), &sample_committees(), &sample_rules(), Some(&scenario)).unwrap();
        assert_eq!(result.members("operations"), ["carol"]);
        assert!(result.card("operations", "carol").unwrap().locked);
    }

    #[test]
    fn test_configuration_errors() {
        let mut people = sample_people();
        people.push(person("alice", 1, &[]));
        assert_eq!(
            allocate(&people, &sample_committees(), &sample_rules(), None),
            Err(EngineError::DuplicatePerson("alice".to_string()))
        );

        let mut committees = sample_committees();
        committees.push(Committee::new("bad", "Bad", 3, 1));
        assert!(matches!(
            allocate(&sample_people(), &committees, &sample_rules(), None),
            Err(EngineError::InvalidCommittee { .. })
        ));

        let mut scenario = Scenario::default();
        scenario.lock("board", "alice");
        assert_eq!(
            allocate(&sample_people(), &sample_committees(), &sample_rules(), Some(&scenario)),
            Err(EngineError::UnknownLockCommittee("board".to_string()))
        );

        let mut scenario = Scenario::default();
        scenario.lock("finance", "zoe");
        assert!(matches!(
            allocate(&sample_people(), &sample_committees(), &sample_rules(), Some(&scenario)),
            Err(EngineError::UnknownLockPerson { .. })
        ));

        let mut scenario = Scenario::default();
        scenario.set_weight("service_cap", 2.0);
        assert_eq!(
            allocate(&sample_people(), &sample_committees(), &sample_rules(), Some(&scenario)),
            Err(EngineError::HardRuleWeightOverride("service_cap".to_string()))
        );

        let typo = vec![RuleDefinition::soft("has_finance", 10, 1.0)
            .with_implementation("has_competency")
            .with_param("competency", "finance")
            .with_applies_to(&["finanse"])];
        assert_eq!(
            allocate(&sample_people(), &sample_committees(), &typo, None),
            Err(EngineError::UnknownAppliesTo {
                rule: "has_finance".to_string(),
                selector: "finanse".to_string(),
            })
        );
    }

    #[test]
    fn test_lock_violation_is_configuration_error() {
        let mut scenario = Scenario::default();
        scenario.lock("finance", "bob");
        scenario.lock("operations", "bob");
        let result = allocate(&sample_people(), &sample_committees(), &sample_rules(), Some(&scenario));
        assert!(matches!(
            result,
            Err(EngineError::LockViolation { ref committee, ref rule, .. })
                if committee == "operations" && rule == "service_cap"
        ));
    }

    #[test]
    fn test_infeasible_committee_keeps_locks() {
        let people = vec![person("alice", 1, &[]), person("bob", 0, &[])];
        let mut board = Committee::new("board", "Board", 2, 3);
        board.locked_members.insert("alice".to_string());
        let result = allocate(&people, &[board], &[], None).unwrap();

        assert_eq!(result.members("board"), ["alice"]);
        assert_eq!(result.committee("board").unwrap().status, CommitteeStatus::Infeasible);
        assert_eq!(result.issues.len(), 1);
    }
}
