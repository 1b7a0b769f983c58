// ==========================================
// 委员会席位分配系统 - 规则定义
// ==========================================
// 职责: 规则文件中的松散定义（编译前）
// 红线: 运行期间不可变; 场景覆写只作用于编译后的副本
// ==========================================

use crate::domain::types::RuleKind;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// 规则参数（自由键值，编译时转换为强类型参数）
pub type RuleParams = BTreeMap<String, JsonValue>;

// ==========================================
// RuleDefinition - 规则定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// 规则名称（用于解释、权重覆写）
    pub name: String,

    pub kind: RuleKind,

    /// 实现标识（缺省与 name 相同）
    #[serde(default, rename = "rule", skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,

    /// 越小越先评估
    pub priority: i32,

    /// 软规则权重
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// 适用委员会（空 = 全部）
    #[serde(default)]
    pub applies_to: Vec<String>,

    #[serde(default)]
    pub params: RuleParams,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain_exclude: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain_score: Option<String>,
}

impl RuleDefinition {
    /// 构造硬规则定义
    pub fn hard(name: impl Into<String>, priority: i32) -> Self {
        Self::base(name.into(), RuleKind::Hard, priority, None)
    }

    /// 构造软规则定义
    pub fn soft(name: impl Into<String>, priority: i32, weight: f64) -> Self {
        Self::base(name.into(), RuleKind::Soft, priority, Some(weight))
    }

    fn base(name: String, kind: RuleKind, priority: i32, weight: Option<f64>) -> Self {
        Self {
            name,
            kind,
            implementation: None,
            priority,
            weight,
            applies_to: Vec::new(),
            params: RuleParams::new(),
            explain_exclude: None,
            explain_score: None,
        }
    }

    pub fn with_implementation(mut self, slug: impl Into<String>) -> Self {
        self.implementation = Some(slug.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_applies_to(mut self, committees: &[&str]) -> Self {
        self.applies_to = committees.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_explain_exclude(mut self, template: impl Into<String>) -> Self {
        self.explain_exclude = Some(template.into());
        self
    }

    pub fn with_explain_score(mut self, template: impl Into<String>) -> Self {
        self.explain_score = Some(template.into());
        self
    }

    /// 实现标识
    pub fn slug(&self) -> &str {
        self.implementation.as_deref().unwrap_or(&self.name)
    }
}
