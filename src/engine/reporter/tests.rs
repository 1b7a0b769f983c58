use super::*;
use crate::domain::allocation::Assignment;
use crate::domain::committee::{Committee, CoverageSnapshot};
use crate::domain::person::Person;
use crate::domain::rule::RuleDefinition;
use crate::domain::types::{CommitteeStatus, DecisionOutcome, HealthLabel};
use crate::engine::context::AllocationContext;
use crate::engine::feasibility::FeasibilityAnalyzer;
use crate::engine::rule_engine::RuleSet;
use std::collections::BTreeMap;

// ==========================================
// 测试辅助函数
// ==========================================

fn skilled(id: &str, cap: u32, competencies: &[&str]) -> Person {
    let mut person = Person::new(id, id, cap);
    person.competencies = competencies.iter().map(|c| c.to_string()).collect();
    person
}

fn coverage(size: usize, size_min: usize, size_max: usize) -> CoverageSnapshot {
    CoverageSnapshot {
        size,
        size_min,
        size_max,
        competency_counts: BTreeMap::new(),
        sex_counts: BTreeMap::new(),
        branch_counts: BTreeMap::new(),
        missing_required: BTreeMap::new(),
        desired_gap: BTreeMap::new(),
        diversity_deviation: BTreeMap::new(),
    }
}

fn finance_rules() -> RuleSet {
    RuleSet::compile(&[
        RuleDefinition::hard("service_cap", 1),
        RuleDefinition::soft("has_finance", 10, 1.0)
            .with_implementation("has_competency")
            .with_param("competency", "finance")
            .with_applies_to(&["finance"]),
    ])
    .unwrap()
}

// ==========================================
// 健康等级
// ==========================================

#[test]
fn test_health_label_rules() {
    let healthy = coverage(2, 1, 3);
    assert_eq!(health_label(CommitteeStatus::Filled, &healthy), HealthLabel::Healthy);
    assert_eq!(health_label(CommitteeStatus::Unfilled, &healthy), HealthLabel::Critical);
    assert_eq!(health_label(CommitteeStatus::Infeasible, &healthy), HealthLabel::Critical);

    let mut desired = coverage(2, 1, 3);
    desired.desired_gap.insert("legal".to_string(), 1);
    assert_eq!(health_label(CommitteeStatus::Filled, &desired), HealthLabel::Attention);

    let mut diversity = coverage(2, 1, 3);
    diversity.diversity_deviation.insert("sex:f".to_string(), 1);
    assert_eq!(health_label(CommitteeStatus::Filled, &diversity), HealthLabel::Attention);

    let mut missing = coverage(2, 1, 3);
    missing.missing_required.insert("finance".to_string(), 1);
    missing.desired_gap.insert("legal".to_string(), 1);
    assert_eq!(health_label(CommitteeStatus::Filled, &missing), HealthLabel::Critical);
}

// ==========================================
// 说明卡
// ==========================================

#[test]
fn test_cards_cover_every_person_committee_pair() {
    let people = vec![
        skilled("alice", 1, &["finance"]),
        skilled("bob", 1, &[]),
        skilled("carol", 0, &[]),
    ];
    let mut finance = Committee::new("finance", "Finance", 1, 1);
    finance.locked_members.insert("alice".to_string());
    let committees = vec![finance, Committee::new("audit", "Audit", 1, 1)];
    let rules = finance_rules();
    let ctx = AllocationContext::new(&people, &committees, &rules);
    let feasibility = FeasibilityAnalyzer::new().analyze(&ctx);

    let mut assignment = Assignment::with_committees(["audit", "finance"]);
    assignment.assign("finance", "alice");
    assignment.assign("audit", "bob");

    let cards = RationaleReporter::new().build_cards(&ctx, &assignment, &feasibility);
    assert_eq!(cards.len(), 6);
    let keys: Vec<(&str, &str)> = cards
        .iter()
        .map(|c| (c.committee_id.as_str(), c.person_id.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("audit", "alice"),
            ("audit", "bob"),
            ("audit", "carol"),
            ("finance", "alice"),
            ("finance", "bob"),
            ("finance", "carol"),
        ]
    );

    let card = |committee: &str, person: &str| {
        cards
            .iter()
            .find(|c| c.committee_id == committee && c.person_id == person)
            .unwrap()
    };

    let alice_finance = card("finance", "alice");
    assert_eq!(alice_finance.outcome, DecisionOutcome::Assigned);
    assert!(alice_finance.locked);
    assert_eq!(alice_finance.score, Some(1.0));
    assert_eq!(alice_finance.notes, vec!["locked member"]);

    let carol_audit = card("audit", "carol");
    assert_eq!(carol_audit.outcome, DecisionOutcome::Excluded);
    assert_eq!(carol_audit.deciding_rule.as_deref(), Some("service_cap"));
    assert_eq!(carol_audit.score, None);

    // bob 的名额已用于 audit: 不是排除，而是未入选并附注
    let bob_finance = card("finance", "bob");
    assert_eq!(bob_finance.outcome, DecisionOutcome::ConsideredNotChosen);
    assert_eq!(bob_finance.score, Some(0.0));
    assert_eq!(
        bob_finance.notes,
        vec![
            "service capacity used elsewhere: would hold 2 seat(s) with service_cap 1",
            "no open seat: committee at size_max 1",
        ]
    );
}

// ==========================================
// 委员会报告
// ==========================================

#[test]
fn test_committee_reports_status_and_issues() {
    let people = vec![skilled("alice", 1, &["finance"]), skilled("bob", 0, &[])];
    let mut finance = Committee::new("finance", "Finance", 1, 2);
    finance.required_competencies.insert("finance".to_string(), 1);
    finance.desired_competencies.insert("legal".to_string(), 1);
    let committees = vec![
        finance,
        Committee::new("audit", "Audit", 1, 1),
        Committee::new("board", "Board", 2, 2),
    ];
    let rules = finance_rules();
    let ctx = AllocationContext::new(&people, &committees, &rules);
    let feasibility = FeasibilityAnalyzer::new().analyze(&ctx);

    let mut assignment = Assignment::with_committees(["audit", "board", "finance"]);
    assignment.assign("finance", "alice");

    let reporter = RationaleReporter::new();
    let reports = reporter.build_committee_reports(&ctx, &assignment, &feasibility);
    let ids: Vec<&str> = reports.iter().map(|r| r.committee_id.as_str()).collect();
    assert_eq!(ids, vec!["audit", "board", "finance"]);

    let audit = &reports[0];
    assert_eq!(audit.status, CommitteeStatus::Unfilled);
    assert_eq!(audit.health, HealthLabel::Critical);
    assert_eq!(audit.issues, vec!["UNFILLED: 0 member(s), size_min 1"]);

    let board = &reports[1];
    assert_eq!(board.status, CommitteeStatus::Infeasible);
    assert!(board.issues[0].starts_with("INFEASIBLE: eligible pool 1 is below size_min 2"));

    let finance = &reports[2];
    assert_eq!(finance.status, CommitteeStatus::Filled);
    assert_eq!(finance.health, HealthLabel::Attention);
    assert_eq!(finance.members.len(), 1);
    assert_eq!(finance.members[0].score, 1.0);
    assert_eq!(finance.issues, vec!["desired competency legal short 1"]);

    let issues = reporter.collect_issues(&reports, &feasibility);
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].kind, IssueKind::Unfilled);
    assert_eq!(issues[1].kind, IssueKind::Infeasible);
    assert_eq!(issues[1].blocking_rules[0].rule, "service_cap");
    assert!(issues[1].to_string().starts_with("INFEASIBLE board:"));
}
