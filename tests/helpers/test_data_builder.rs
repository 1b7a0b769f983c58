// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================
#![allow(dead_code)]

use chrono::NaiveDate;
use committee_manager::domain::{Committee, Person, RuleDefinition};
use std::path::{Path, PathBuf};

// ==========================================
// Person 构建器
// ==========================================

pub struct PersonBuilder {
    person: Person,
}

impl PersonBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            person: Person::new(id, id, 1),
        }
    }

    pub fn cap(mut self, cap: u32) -> Self {
        self.person.service_cap = cap;
        self
    }

    pub fn competencies(mut self, competencies: &[&str]) -> Self {
        self.person.competencies = competencies.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn sex(mut self, sex: &str) -> Self {
        self.person.sex = Some(sex.to_string());
        self
    }

    pub fn branch(mut self, branch: &str) -> Self {
        self.person.family_branch = Some(branch.to_string());
        self
    }

    pub fn executive(mut self) -> Self {
        self.person.executive_role = true;
        self
    }

    pub fn conflicts_with(mut self, other: &str) -> Self {
        self.person.conflicts.insert(other.to_string());
        self
    }

    pub fn sitting_on(mut self, committee: &str) -> Self {
        self.person.current_committees.insert(committee.to_string());
        self
    }

    pub fn cooling_off(mut self, committee: &str, until: NaiveDate) -> Self {
        self.person.cooling_off.insert(committee.to_string(), until);
        self
    }

    pub fn build(self) -> Person {
        self.person
    }
}

// ==========================================
// Committee 构建器
// ==========================================

pub struct CommitteeBuilder {
    committee: Committee,
}

impl CommitteeBuilder {
    pub fn new(id: &str, size_min: usize, size_max: usize) -> Self {
        let name = capitalize(id);
        Self {
            committee: Committee::new(id, name, size_min, size_max),
        }
    }

    pub fn requires(mut self, competency: &str, count: usize) -> Self {
        self.committee.required_competencies.insert(competency.to_string(), count);
        self
    }

    pub fn desires(mut self, competency: &str, count: usize) -> Self {
        self.committee.desired_competencies.insert(competency.to_string(), count);
        self
    }

    pub fn excludes(mut self, person: &str) -> Self {
        self.committee.hard_exclusions.insert(person.to_string());
        self
    }

    pub fn diversity(mut self, key: &str, count: usize) -> Self {
        self.committee.diversity_targets.insert(key.to_string(), count);
        self
    }

    pub fn locked(mut self, person: &str) -> Self {
        self.committee.locked_members.insert(person.to_string());
        self
    }

    pub fn build(self) -> Committee {
        self.committee
    }
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ==========================================
// 示例场景
// ==========================================
// Alice(cap 2, finance+strategy), Bob(cap 1), Carol(cap 1, strategy), Dave(cap 1, finance)
// Finance(1..2), Operations(1..1), Strategy(1..2)

pub fn sample_people() -> Vec<Person> {
    vec![
        PersonBuilder::new("alice").cap(2).competencies(&["finance", "strategy"]).build(),
        PersonBuilder::new("bob").cap(1).build(),
        PersonBuilder::new("carol").cap(1).competencies(&["strategy"]).build(),
        PersonBuilder::new("dave").cap(1).competencies(&["finance"]).build(),
    ]
}

pub fn sample_committees() -> Vec<Committee> {
    vec![
        CommitteeBuilder::new("finance", 1, 2).requires("finance", 1).build(),
        CommitteeBuilder::new("operations", 1, 1).build(),
        CommitteeBuilder::new("strategy", 1, 2).requires("strategy", 1).build(),
    ]
}

pub fn sample_rules() -> Vec<RuleDefinition> {
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

// ==========================================
// 示例输入文件
// ==========================================

pub const SAMPLE_PEOPLE_CSV: &str = "\
name,service_cap,competencies
alice,2,finance;strategy
bob,1,
carol,1,strategy
dave,1,finance
";

pub const SAMPLE_COMMITTEES_CSV: &str = "\
name,min_size,max_size,required_competencies
finance,1,2,finance
operations,1,1,
strategy,1,2,strategy
";

pub const SAMPLE_RULES_YAML: &str = "\
- name: service_cap
  kind: hard
  priority: 1
  params: {}
- name: has_finance
  rule: has_competency
  kind: soft
  priority: 10
  weight: 1.0
  applies_to: [finance]
  params:
    competency: finance
- name: has_strategy
  rule: has_competency
  kind: soft
  priority: 10
  weight: 1.0
  applies_to: [strategy]
  params:
    competency: strategy
";

/// 写入示例输入文件，返回 (people, committees, rules) 路径
pub fn write_sample_inputs(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let people = dir.join("people.csv");
    let committees = dir.join("committees.csv");
    let rules = dir.join("rules.yaml");
    std::fs::write(&people, SAMPLE_PEOPLE_CSV).unwrap();
    std::fs::write(&committees, SAMPLE_COMMITTEES_CSV).unwrap();
    std::fs::write(&rules, SAMPLE_RULES_YAML).unwrap();
    (people, committees, rules)
}
