// ==========================================
// 委员会席位分配系统 - 导出模块错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("目录创建失败 {path}: {message}")]
    CreateDir { path: String, message: String },

    #[error("文件写入失败 {path}: {message}")]
    Write { path: String, message: String },

    #[error("分配文件不存在: {0}")]
    AllocationNotFound(String),

    #[error("文件读取失败 {path}: {message}")]
    Read { path: String, message: String },

    #[error("YAML 序列化失败: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
