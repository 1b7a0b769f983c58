// ==========================================
// 导入层集成测试
// ==========================================
// 覆盖: 示例文件导入 → 分配，以及引用/格式错误
// ==========================================

#[path = "helpers/test_data_builder.rs"]
mod test_data_builder;

use committee_manager::cli::{run_allocation, AllocateRequest};
use committee_manager::domain::types::RuleKind;
use committee_manager::importer::{load_committees, load_people, load_rules, ImportError};
use std::fs;
use tempfile::tempdir;
use test_data_builder::*;

#[test]
fn test_sample_files_match_builders() {
    let dir = tempdir().unwrap();
    let (people_path, committees_path, rules_path) = write_sample_inputs(dir.path());

    let people = load_people(&people_path).unwrap();
    assert_eq!(people, sample_people());

    let committees = load_committees(&committees_path, &people).unwrap();
    let ids: Vec<&str> = committees.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["finance", "operations", "strategy"]);
    assert_eq!(committees[0].required_competencies["finance"], 1);
    assert!(committees[1].required_competencies.is_empty());
    assert_eq!(committees[2].size_max, 2);

    let rules = load_rules(&rules_path).unwrap();
    assert_eq!(rules.len(), 3);
    assert_eq!(rules[0].kind, RuleKind::Hard);
    assert_eq!(rules[1].slug(), "has_competency");
    assert_eq!(rules[2].applies_to, vec!["strategy"]);
}

#[test]
fn test_allocation_from_files() {
    let dir = tempdir().unwrap();
    let (people, committees, rules) = write_sample_inputs(dir.path());

    let result = run_allocation(&AllocateRequest {
        people: &people,
        committees: &committees,
        rules: Some(rules.as_path()),
        scenario: None,
        config: None,
    })
    .unwrap();

    assert_eq!(result.members("finance"), ["alice", "dave"]);
    assert_eq!(result.members("operations"), ["bob"]);
    assert_eq!(result.members("strategy"), ["alice", "carol"]);
    assert_eq!(result.final_score, 4.0);
}

#[test]
fn test_allocation_without_rules_file_uses_builtins() {
    let dir = tempdir().unwrap();
    let (people, committees, _) = write_sample_inputs(dir.path());

    let result = run_allocation(&AllocateRequest {
        people: &people,
        committees: &committees,
        rules: None,
        scenario: None,
        config: None,
    })
    .unwrap();

    // 无软规则: 总分为 0，但硬规则仍约束容量
    assert_eq!(result.final_score, 0.0);
    for person in sample_people() {
        let seats = result
            .roster
            .values()
            .filter(|members| members.contains(&person.id))
            .count();
        assert!(seats <= person.service_cap as usize, "{}", person.id);
    }
}

#[test]
fn test_missing_scenario_file_is_empty_scenario() {
    let dir = tempdir().unwrap();
    let (people, committees, rules) = write_sample_inputs(dir.path());
    let scenario = dir.path().join("missing.yaml");

    let result = run_allocation(&AllocateRequest {
        people: &people,
        committees: &committees,
        rules: Some(rules.as_path()),
        scenario: Some(scenario.as_path()),
        config: None,
    })
    .unwrap();
    assert_eq!(result.members("operations"), ["bob"]);
}

#[test]
fn test_committee_file_with_unknown_exclusion() {
    let dir = tempdir().unwrap();
    let (people_path, _, _) = write_sample_inputs(dir.path());
    let committees_path = dir.path().join("bad_committees.csv");
    fs::write(
        &committees_path,
        "name,min_size,max_size,exclusions\nfinance,1,2,zoe\n",
    )
    .unwrap();

    let people = load_people(&people_path).unwrap();
    let err = load_committees(&committees_path, &people).unwrap_err();
    assert!(matches!(
        err,
        ImportError::UnknownPerson { ref person, .. } if person == "zoe"
    ));
}

#[test]
fn test_people_file_missing_name_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("people.csv");
    fs::write(&path, "id,service_cap\np1,1\n").unwrap();

    let err = load_people(&path).unwrap_err();
    match err {
        ImportError::MissingColumns { columns, .. } => assert_eq!(columns, "name"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_bad_config_file_is_reported() {
    let dir = tempdir().unwrap();
    let (people, committees, rules) = write_sample_inputs(dir.path());
    let config = dir.path().join("engine.yaml");
    fs::write(&config, "max_improvement_passes: [1, 2]\n").unwrap();

    let err = run_allocation(&AllocateRequest {
        people: &people,
        committees: &committees,
        rules: Some(rules.as_path()),
        scenario: None,
        config: Some(config.as_path()),
    })
    .unwrap_err();
    assert!(format!("{:#}", err).contains("engine.yaml"));
}
