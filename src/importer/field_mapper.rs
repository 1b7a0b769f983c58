// ==========================================
// 委员会席位分配系统 - 字段映射器
// ==========================================
// 职责: 原始字符串字段 → 强类型值（带行号的错误）
// 约定: 列表以 ';' 分隔; 空串视为缺失
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub struct FieldReader<'a> {
    record: &'a RawRecord,
}

impl<'a> FieldReader<'a> {
    pub fn new(record: &'a RawRecord) -> Self {
        Self { record }
    }

    pub fn row(&self) -> usize {
        self.record.row
    }

    /// 提取字符串字段（空串 → None）
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.record
            .fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 必填字符串字段
    pub fn require_string(&self, key: &str) -> ImportResult<String> {
        self.get_string(key).ok_or_else(|| ImportError::MissingField {
            row: self.row(),
            field: key.to_string(),
        })
    }

    pub fn parse_u32(&self, key: &str) -> ImportResult<Option<u32>> {
        self.get_string(key)
            .map(|v| {
                v.parse::<u32>()
                    .map_err(|_| self.invalid(key, &v, "must be a non-negative integer"))
            })
            .transpose()
    }

    pub fn parse_usize(&self, key: &str) -> ImportResult<Option<usize>> {
        self.get_string(key)
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|_| self.invalid(key, &v, "must be a non-negative integer"))
            })
            .transpose()
    }

    /// 必填非负整数
    pub fn require_usize(&self, key: &str) -> ImportResult<usize> {
        self.parse_usize(key)?.ok_or_else(|| ImportError::MissingField {
            row: self.row(),
            field: key.to_string(),
        })
    }

    /// 布尔值: true/false/yes/no/1/0/y/n（缺失 = false）
    pub fn parse_bool(&self, key: &str) -> ImportResult<bool> {
        match self.get_string(key) {
            None => Ok(false),
            Some(v) => match v.to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Ok(true),
                "false" | "no" | "n" | "0" => Ok(false),
                _ => Err(self.invalid(key, &v, "expected true/false/yes/no/1/0/y/n")),
            },
        }
    }

    /// ';' 分隔列表（去空白、去空项）
    pub fn parse_list(&self, key: &str) -> Vec<String> {
        self.get_string(key)
            .map(|v| split_list(&v).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// "comp" 或 "comp=count"，';' 分隔，裸值计为 1
    pub fn parse_count_map(&self, key: &str) -> ImportResult<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        let Some(raw) = self.get_string(key) else {
            return Ok(counts);
        };
        for item in split_list(&raw) {
            let (name, count) = match item.split_once('=') {
                Some((name, count)) => {
                    let count = count
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| self.invalid(key, item, "count must be a non-negative integer"))?;
                    (name.trim(), count)
                }
                None => (item, 1),
            };
            if name.is_empty() {
                return Err(self.invalid(key, item, "empty name"));
            }
            counts.insert(name.to_string(), count);
        }
        Ok(counts)
    }

    /// "key=YYYY-MM-DD"，';' 分隔
    pub fn parse_date_map(&self, key: &str) -> ImportResult<BTreeMap<String, NaiveDate>> {
        let mut dates = BTreeMap::new();
        for item in self.parse_list(key) {
            let (name, date) = item
                .split_once('=')
                .ok_or_else(|| self.invalid(key, &item, "expected key=YYYY-MM-DD"))?;
            let date = self.parse_date_value(key, date.trim())?;
            dates.insert(name.trim().to_string(), date);
        }
        Ok(dates)
    }

    pub fn parse_date_value(&self, key: &str, value: &str) -> ImportResult<NaiveDate> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| self.invalid(key, value, "expected YYYY-MM-DD"))
    }

    pub fn invalid(&self, key: &str, value: &str, message: &str) -> ImportError {
        ImportError::InvalidValue {
            row: self.row(),
            field: key.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        }
    }
}

/// ';' 分隔（去空白、去空项）
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            row: 7,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_count_map_bare_and_counted() {
        let rec = record(&[("required", "finance; legal=2 ;;")]);
        let counts = FieldReader::new(&rec).parse_count_map("required").unwrap();
        assert_eq!(counts["finance"], 1);
        assert_eq!(counts["legal"], 2);
    }

    #[test]
    fn test_bool_variants() {
        let rec = record(&[("a", "Yes"), ("b", "0"), ("c", "maybe")]);
        let reader = FieldReader::new(&rec);
        assert!(reader.parse_bool("a").unwrap());
        assert!(!reader.parse_bool("b").unwrap());
        assert!(!reader.parse_bool("missing").unwrap());
        assert!(matches!(
            reader.parse_bool("c"),
            Err(ImportError::InvalidValue { row: 7, .. })
        ));
    }

    #[test]
    fn test_negative_integer_rejected() {
        let rec = record(&[("service_cap", "-1")]);
        let result = FieldReader::new(&rec).parse_u32("service_cap");
        assert!(matches!(result, Err(ImportError::InvalidValue { ref field, .. }) if field == "service_cap"));
    }

    #[test]
    fn test_date_map() {
        let rec = record(&[("cooling_off", "finance=2026-01-31")]);
        let dates = FieldReader::new(&rec).parse_date_map("cooling_off").unwrap();
        assert_eq!(dates["finance"], NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());

        let bad = record(&[("cooling_off", "finance=31/01/2026")]);
        assert!(FieldReader::new(&bad).parse_date_map("cooling_off").is_err());
    }
}
