// ==========================================
// 委员会席位分配系统 - 人员导入
// ==========================================
// 输入: people.csv（必需列 name）
// 可选列: id, service_cap, competencies, age, sex, family_branch,
//         executive_role, conflicts, current_committees, cooling_off, notes
// ==========================================

use crate::domain::person::Person;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldReader;
use crate::importer::file_parser::{CsvParser, RawRecord};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, instrument};

const REQUIRED_COLUMNS: &[&str] = &["name"];

/// 从 CSV 加载人员（保持文件顺序）
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_people(path: impl AsRef<Path>) -> ImportResult<Vec<Person>> {
    let records = CsvParser.parse_to_raw_records(path.as_ref(), REQUIRED_COLUMNS)?;

    let mut seen = BTreeSet::new();
    let mut people = Vec::with_capacity(records.len());
    for record in &records {
        let person = map_person(record)?;
        if !seen.insert(person.id.clone()) {
            return Err(ImportError::DuplicateId {
                row: record.row,
                id: person.id,
            });
        }
        people.push(person);
    }

    info!(count = people.len(), "人员导入完成");
    Ok(people)
}

fn map_person(record: &RawRecord) -> ImportResult<Person> {
    let fields = FieldReader::new(record);
    let name = fields.require_string("name")?;
    let id = fields.get_string("id").unwrap_or_else(|| name.clone());
    let service_cap = fields.parse_u32("service_cap")?.unwrap_or(0);

    let mut person = Person::new(id, name, service_cap);
    person.competencies = fields.parse_list("competencies").into_iter().collect();
    person.age = fields.parse_u32("age")?;
    person.sex = fields.get_string("sex");
    person.family_branch = fields.get_string("family_branch");
    person.executive_role = fields.parse_bool("executive_role")?;
    person.conflicts = fields.parse_list("conflicts").into_iter().collect();
    person.current_committees = fields.parse_list("current_committees").into_iter().collect();
    person.cooling_off = fields.parse_date_map("cooling_off")?;
    person.notes = fields.get_string("notes");
    Ok(person.normalized())
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

    #[test]
    fn test_load_people_with_optional_columns() {
        let file = write_csv(&[
            "name,service_cap,competencies,sex,executive_role,cooling_off",
            "Alice,2,finance;strategy, F ,no,audit=2026-06-30",
            "Bob,,,,,",
        ]);
        let people = load_people(file.path()).unwrap();
        assert_eq!(people.len(), 2);

        let alice = &people[0];
        assert_eq!(alice.id, "Alice");
        assert_eq!(alice.service_cap, 2);
        assert!(alice.has_competency("strategy"));
        assert_eq!(alice.sex.as_deref(), Some("f"));
        assert!(!alice.executive_role);
        assert_eq!(alice.cooling_off.len(), 1);

        let bob = &people[1];
        assert_eq!(bob.service_cap, 0);
        assert!(bob.competencies.is_empty());
    }

    #[test]
    fn test_missing_name_reports_row() {
        let file = write_csv(&["name,service_cap", "Alice,1", ",2"]);
        match load_people(file.path()) {
            Err(ImportError::MissingField { row, field }) => {
                assert_eq!(row, 3);
                assert_eq!(field, "name");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_service_cap_rejected() {
        let file = write_csv(&["name,service_cap", "Alice,-1"]);
        assert!(matches!(
            load_people(file.path()),
            Err(ImportError::InvalidValue { row: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let file = write_csv(&["id,name", "p1,Alice", "p1,Bob"]);
        assert!(matches!(
            load_people(file.path()),
            Err(ImportError::DuplicateId { row: 3, .. })
        ));
    }

    #[test]
    fn test_missing_name_column() {
        let file = write_csv(&["id,service_cap", "p1,1"]);
        assert!(matches!(load_people(file.path()), Err(ImportError::MissingColumns { .. })));
    }
}
