// ==========================================
// 委员会席位分配系统 - 委员会导入
// ==========================================
// 输入: committees.csv（必需列 name, min_size, max_size）
// 可选列: id, required_competencies, desired_competencies, exclusions,
//         diversity_targets, rotation_years, current_members, locked_members
// 红线: exclusions / locked_members 必须引用已导入人员
// ==========================================

use crate::domain::committee::{Committee, TermRecord};
use crate::domain::person::Person;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{split_list, FieldReader};
use crate::importer::file_parser::{CsvParser, RawRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, instrument};

const REQUIRED_COLUMNS: &[&str] = &["name", "min_size", "max_size"];

/// 从 CSV 加载委员会（保持文件顺序）
///
/// # 参数
/// - path: 文件路径
/// - people: 已导入人员（校验引用）
#[instrument(skip_all, fields(path = %path.as_ref().display(), people = people.len()))]
pub fn load_committees(path: impl AsRef<Path>, people: &[Person]) -> ImportResult<Vec<Committee>> {
    let records = CsvParser.parse_to_raw_records(path.as_ref(), REQUIRED_COLUMNS)?;
    let known: BTreeSet<&str> = people.iter().map(|p| p.id.as_str()).collect();

    let mut seen = BTreeSet::new();
    let mut committees = Vec::with_capacity(records.len());
    for record in &records {
        let committee = map_committee(record, &known)?;
        if !seen.insert(committee.id.clone()) {
            return Err(ImportError::DuplicateId {
                row: record.row,
                id: committee.id,
            });
        }
        committees.push(committee);
    }

    info!(count = committees.len(), "委员会导入完成");
    Ok(committees)
}

fn map_committee(record: &RawRecord, known: &BTreeSet<&str>) -> ImportResult<Committee> {
    let fields = FieldReader::new(record);
    let name = fields.require_string("name")?;
    let id = fields.get_string("id").unwrap_or_else(|| name.clone());
    let size_min = fields.require_usize("min_size")?;
    let size_max = fields.require_usize("max_size")?;
    if size_max < size_min {
        return Err(fields.invalid(
            "max_size",
            &size_max.to_string(),
            "max_size cannot be less than min_size",
        ));
    }

    let mut committee = Committee::new(id, name, size_min, size_max);
    committee.required_competencies = fields.parse_count_map("required_competencies")?;
    committee.desired_competencies = fields.parse_count_map("desired_competencies")?;
    committee.hard_exclusions = known_people(&fields, "exclusions", known)?;
    committee.diversity_targets = parse_diversity_targets(&fields)?;
    committee.rotation_years = fields.parse_u32("rotation_years")?;
    committee.current_members = parse_terms(&fields)?;
    committee.locked_members = known_people(&fields, "locked_members", known)?;

    // 多样性 key 无法解析
    committee.validate().map_err(|message| {
        let raw = fields.get_string("diversity_targets").unwrap_or_default();
        fields.invalid("diversity_targets", &raw, &message)
    })?;
    Ok(committee)
}

fn known_people(fields: &FieldReader<'_>, key: &str, known: &BTreeSet<&str>) -> ImportResult<BTreeSet<String>> {
    let mut ids = BTreeSet::new();
    for person in fields.parse_list(key) {
        if !known.contains(person.as_str()) {
            return Err(ImportError::UnknownPerson {
                row: fields.row(),
                field: key.to_string(),
                person,
            });
        }
        ids.insert(person);
    }
    Ok(ids)
}

/// JSON 对象 或 "key=value;…"
fn parse_diversity_targets(fields: &FieldReader<'_>) -> ImportResult<BTreeMap<String, usize>> {
    const KEY: &str = "diversity_targets";
    let Some(raw) = fields.get_string(KEY) else {
        return Ok(BTreeMap::new());
    };
    if let Ok(targets) = serde_json::from_str::<BTreeMap<String, usize>>(&raw) {
        return Ok(targets);
    }

    let mut targets = BTreeMap::new();
    for pair in split_list(&raw) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| fields.invalid(KEY, pair, "entry missing '='"))?;
        let count = value
            .trim()
            .parse::<usize>()
            .map_err(|_| fields.invalid(KEY, pair, "value must be a non-negative integer"))?;
        targets.insert(key.trim().to_string(), count);
    }
    Ok(targets)
}

/// "person|start|end;…"（end 可省略）
fn parse_terms(fields: &FieldReader<'_>) -> ImportResult<Vec<TermRecord>> {
    const KEY: &str = "current_members";
    let mut terms = Vec::new();
    for entry in fields.parse_list(KEY) {
        let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
        let (person_id, start, end) = match parts.as_slice() {
            [person, start] => (*person, *start, None),
            [person, start, end] => (*person, *start, Some(*end).filter(|e| !e.is_empty())),
            _ => return Err(fields.invalid(KEY, &entry, "expected person|start|end")),
        };
        if person_id.is_empty() {
            return Err(fields.invalid(KEY, &entry, "empty person id"));
        }
        terms.push(TermRecord {
            person_id: person_id.to_string(),
            start: fields.parse_date_value(KEY, start)?,
            end: end.map(|e| fields.parse_date_value(KEY, e)).transpose()?,
        });
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    fn people() -> Vec<Person> {
        vec![Person::new("alice", "alice", 2), Person::new("bob", "bob", 1)]
    }

    #[test]
    fn test_load_committees_full_row() {
        let file = write_csv(&[
            "name,min_size,max_size,required_competencies,exclusions,diversity_targets,current_members,locked_members",
            "Finance,1,3,finance;legal=2,bob,sex:f=1;north=1,alice|2020-01-01;bob|2018-01-01|2022-12-31,alice",
        ]);
        let committees = load_committees(file.path(), &people()).unwrap();
        let finance = &committees[0];

        assert_eq!(finance.id, "Finance");
        assert_eq!(finance.size_min, 1);
        assert_eq!(finance.required_competencies["legal"], 2);
        assert!(finance.hard_exclusions.contains("bob"));
        assert_eq!(finance.diversity_targets["north"], 1);
        assert_eq!(finance.current_members.len(), 2);
        assert!(finance.current_members[1].end.is_some());
        assert!(finance.locked_members.contains("alice"));
    }

    #[test]
    fn test_diversity_targets_json() {
        let file = write_csv(&[
            "name,min_size,max_size,diversity_targets",
            r#"Audit,1,2,"{""sex:m"": 1}""#,
        ]);
        let committees = load_committees(file.path(), &people()).unwrap();
        assert_eq!(committees[0].diversity_targets["sex:m"], 1);
    }

    #[test]
    fn test_size_bounds_checked() {
        let file = write_csv(&["name,min_size,max_size", "Finance,3,1"]);
        assert!(matches!(
            load_committees(file.path(), &people()),
            Err(ImportError::InvalidValue { row: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_exclusion_rejected() {
        let file = write_csv(&["name,min_size,max_size,exclusions", "Finance,1,2,zoe"]);
        match load_committees(file.path(), &people()) {
            Err(ImportError::UnknownPerson { row, person, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(person, "zoe");
            }
            other => panic!("expected UnknownPerson, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_diversity_entry() {
        let file = write_csv(&["name,min_size,max_size,diversity_targets", "Finance,1,2,north"]);
        assert!(matches!(
            load_committees(file.path(), &people()),
            Err(ImportError::InvalidValue { .. })
        ));
    }
}
