// ==========================================
// 委员会席位分配系统 - 场景覆写
// ==========================================
// 用途: What-if 试算（额外锁定 + 软规则权重覆写）
// 红线: 不修改基础规则/委员会定义，运行前派生工作副本
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// committee_id -> 锁定人员ID列表
    #[serde(default)]
    pub locks: BTreeMap<String, Vec<String>>,

    /// 规则名称 -> 新权重
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl Scenario {
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty() && self.weights.is_empty()
    }

    /// 添加锁定（重复添加无副作用）
    pub fn lock(&mut self, committee_id: &str, person_id: &str) {
        let members = self.locks.entry(committee_id.to_string()).or_default();
        if !members.iter().any(|m| m == person_id) {
            members.push(person_id.to_string());
        }
    }

    pub fn set_weight(&mut self, rule_name: &str, weight: f64) {
        self.weights.insert(rule_name.to_string(), weight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_idempotent() {
        let mut scenario = Scenario::default();
        scenario.lock("finance", "alice");
        scenario.lock("finance", "alice");
        scenario.lock("finance", "bob");
        assert_eq!(scenario.locks["finance"], vec!["alice", "bob"]);
        assert!(!scenario.is_empty());
    }

    #[test]
    fn test_set_weight_overwrites() {
        let mut scenario = Scenario::default();
        scenario.set_weight("has_competency", 2.0);
        scenario.set_weight("has_competency", 3.5);
        assert_eq!(scenario.weights["has_competency"], 3.5);
    }
}
