// ==========================================
// 委员会席位分配系统 - 引擎配置
// ==========================================
// 职责: 局部改进上限/阈值、并行评分开关
// 来源: 默认值 或 YAML 文件（缺失字段取默认值）
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 默认最大改进轮数
pub const DEFAULT_MAX_IMPROVEMENT_PASSES: usize = 100;

/// 默认最小改进增量
pub const DEFAULT_MIN_IMPROVEMENT: f64 = 1e-9;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败 {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("配置值无效: {0}")]
    Invalid(String),
}

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_improvement_passes: usize, // 局部改进最大轮数: 100
    pub min_improvement: f64,          // 接受调整的最小增量: 1e-9
    pub enable_local_search: bool,     // 是否执行局部改进: true
    pub parallel_scoring: bool,        // 候选人并行评分: false
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_improvement_passes: DEFAULT_MAX_IMPROVEMENT_PASSES,
            min_improvement: DEFAULT_MIN_IMPROVEMENT,
            enable_local_search: true,
            parallel_scoring: false,
        }
    }
}

impl EngineConfig {
    /// 从 YAML 文件加载
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), ?config, "引擎配置已加载");
        Ok(config)
    }

    /// 从 YAML 文本解析（空文档 = 默认配置）
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Self>(text).map_err(|source| ConfigError::Parse {
                path: "<inline>".to_string(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_improvement.is_finite() || self.min_improvement < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_improvement 必须是非负有限数: {}",
                self.min_improvement
            )));
        }
        Ok(())
    }
}
