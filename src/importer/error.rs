// ==========================================
// 委员会席位分配系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 行号: CSV 为文件行号（表头为第 1 行）; 规则为 1 起始序号
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("文件写入失败: {0}")]
    FileWriteError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("YAML 解析失败: {0}")]
    YamlParseError(String),

    // ===== 数据映射错误 =====
    #[error("{file} 缺少必需列: {columns}")]
    MissingColumns { file: String, columns: String },

    #[error("必填字段为空 (行 {row}, 字段 {field})")]
    MissingField { row: usize, field: String },

    #[error("字段值无效 (行 {row}, 字段 {field}, 值 '{value}'): {message}")]
    InvalidValue {
        row: usize,
        field: String,
        value: String,
        message: String,
    },

    // ===== 引用完整性错误 =====
    #[error("未知人员 (行 {row}, 字段 {field}): {person}")]
    UnknownPerson {
        row: usize,
        field: String,
        person: String,
    },

    #[error("ID 重复 (行 {row}): {id}")]
    DuplicateId { row: usize, id: String },

    // ===== 规则文件错误 =====
    #[error("规则 {index}: {message}")]
    RuleDefinitionError { index: usize, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<serde_yaml::Error>
impl From<serde_yaml::Error> for ImportError {
    fn from(err: serde_yaml::Error) -> Self {
        ImportError::YamlParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
