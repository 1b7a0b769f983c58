// ==========================================
// 委员会席位分配系统 - 领域类型定义
// ==========================================
// 职责: 规则种类、决策结果、委员会状态、健康等级
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 规则种类 (Rule Kind)
// ==========================================
// 硬规则: 违反即排除
// 软规则: 加权评分
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Hard, // 硬约束
    Soft, // 软评分
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Hard => write!(f, "hard"),
            RuleKind::Soft => write!(f, "soft"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hard" => Ok(RuleKind::Hard),
            "soft" => Ok(RuleKind::Soft),
            other => Err(format!("kind must be 'hard' or 'soft', got '{}'", other)),
        }
    }
}

// ==========================================
// 席位决策结果 (Decision Outcome)
// ==========================================
// 每个 (人员, 委员会) 组合恰好一个结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionOutcome {
    Assigned,            // 已分配
    Excluded,            // 硬规则排除
    ConsideredNotChosen, // 合格但未入选
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionOutcome::Assigned => write!(f, "ASSIGNED"),
            DecisionOutcome::Excluded => write!(f, "EXCLUDED"),
            DecisionOutcome::ConsideredNotChosen => write!(f, "CONSIDERED_NOT_CHOSEN"),
        }
    }
}

// ==========================================
// 委员会状态 (Committee Status)
// ==========================================
// INFEASIBLE: 预检阶段合格人数 < size_min
// UNFILLED: 预检可行,但填充后仍 < size_min（容量被其他委员会消耗）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitteeStatus {
    Filled,     // 满足规模约束
    Unfilled,   // 未达最小规模
    Infeasible, // 预检不可行
}

impl fmt::Display for CommitteeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitteeStatus::Filled => write!(f, "FILLED"),
            CommitteeStatus::Unfilled => write!(f, "UNFILLED"),
            CommitteeStatus::Infeasible => write!(f, "INFEASIBLE"),
        }
    }
}

// ==========================================
// 健康等级 (Health Label)
// ==========================================
// 顺序: Healthy < Attention < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthLabel {
    Healthy,   // 正常
    Attention, // 关注（软目标缺口）
    Critical,  // 严重（规模/必需能力不满足）
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthLabel::Healthy => write!(f, "HEALTHY"),
            HealthLabel::Attention => write!(f, "ATTENTION"),
            HealthLabel::Critical => write!(f, "CRITICAL"),
        }
    }
}
