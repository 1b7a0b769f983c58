// ==========================================
// 委员会席位分配系统 - 人员领域模型
// ==========================================
// 红线: 单次分配运行期间不可变
// ==========================================

use crate::domain::allocation::Assignment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// Person - 候选人员
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    // ===== 标识 =====
    pub id: String,   // 人员ID（默认与姓名一致）
    pub name: String, // 姓名

    // ===== 规则使用的属性 =====
    pub age: Option<u32>,
    pub sex: Option<String>,           // 小写规范化
    pub family_branch: Option<String>, // 小写规范化
    pub competencies: BTreeSet<String>,
    pub executive_role: bool,
    pub conflicts: BTreeSet<String>,          // 利益冲突人员ID
    pub current_committees: BTreeSet<String>, // 现任委员会ID

    // ===== 容量 =====
    pub service_cap: u32, // 最多可任职委员会数

    // ===== 冷却期 (committee_id -> 可再次加入的日期) =====
    pub cooling_off: BTreeMap<String, NaiveDate>,

    pub notes: Option<String>,
}

impl Person {
    /// 构造最小人员（其余属性为空）
    pub fn new(id: impl Into<String>, name: impl Into<String>, service_cap: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age: None,
            sex: None,
            family_branch: None,
            competencies: BTreeSet::new(),
            executive_role: false,
            conflicts: BTreeSet::new(),
            current_committees: BTreeSet::new(),
            service_cap,
            cooling_off: BTreeMap::new(),
            notes: None,
        }
    }

    /// 规范化自由文本属性（去空白、小写、空串视为缺失）
    pub fn normalized(mut self) -> Self {
        self.sex = normalize_attr(self.sex.take());
        self.family_branch = normalize_attr(self.family_branch.take());
        self
    }

    pub fn has_competency(&self, competency: &str) -> bool {
        self.competencies.contains(competency)
    }

    /// 当前任职 + 本次拟分配的委员会数（同一委员会只计一次）
    pub fn workload(&self, assignment: &Assignment) -> usize {
        self.committee_set(assignment).len()
    }

    /// 假设加入 committee_id 后的工作量
    pub fn workload_with(&self, committee_id: &str, assignment: &Assignment) -> usize {
        let mut set = self.committee_set(assignment);
        set.insert(committee_id);
        set.len()
    }

    /// 是否与 other 存在利益冲突（任一方声明即成立）
    pub fn conflicts_with(&self, other: &Person) -> bool {
        self.conflicts.contains(&other.id) || other.conflicts.contains(&self.id)
    }

    fn committee_set<'a>(&'a self, assignment: &'a Assignment) -> BTreeSet<&'a str> {
        let mut set: BTreeSet<&str> = self.current_committees.iter().map(String::as_str).collect();
        set.extend(assignment.committees_of(&self.id));
        set
    }
}

fn normalize_attr(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}
