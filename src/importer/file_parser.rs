// ==========================================
// 委员会席位分配系统 - CSV 文件解析器
// ==========================================
// 职责: 文件 → 原始记录（表头 → 去空白的字符串值）
// 红线: 不做类型转换，类型转换由 FieldReader 负责
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 一行原始记录
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 文件行号（表头为第 1 行）
    pub row: usize,
    pub fields: HashMap<String, String>,
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 解析 CSV 文件
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - required: 必需列（缺失时整体报错）
    pub fn parse_to_raw_records(&self, file_path: &Path, required: &[&str]) -> ImportResult<Vec<RawRecord>> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == column))
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            return Err(ImportError::MissingColumns {
                file: path.display().to_string(),
                columns: missing.join(", "),
            });
        }

        // 读取所有行
        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row = record.position().map_or(records.len() + 2, |p| p.line() as usize);
            let mut fields = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord { row, fields });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "name, service_cap ,competencies").unwrap();
        writeln!(temp_file, " Alice ,2,finance;strategy").unwrap();
        writeln!(temp_file, ",,").unwrap();
        writeln!(temp_file, "Bob,1,").unwrap();

        let records = CsvParser
            .parse_to_raw_records(temp_file.path(), &["name"])
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, 2);
        assert_eq!(records[0].fields["name"], "Alice");
        assert_eq!(records[0].fields["service_cap"], "2");
        assert_eq!(records[1].row, 4);
        assert_eq!(records[1].fields["competencies"], "");
    }

    #[test]
    fn test_csv_parser_missing_columns() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "name").unwrap();
        writeln!(temp_file, "Finance").unwrap();

        let result = CsvParser.parse_to_raw_records(temp_file.path(), &["name", "min_size", "max_size"]);
        match result {
            Err(ImportError::MissingColumns { columns, .. }) => assert_eq!(columns, "max_size, min_size"),
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_records(Path::new("/nonexistent/people.csv"), &[]);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }
}
