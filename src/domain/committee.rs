// ==========================================
// 委员会席位分配系统 - 委员会领域模型
// ==========================================
// 红线: size_min <= size_max（加载时校验）
// 用途: 规模约束、能力要求、多样性目标、锁定成员
// ==========================================

use crate::domain::person::Person;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ==========================================
// TermRecord - 现任成员任期记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub person_id: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl TermRecord {
    fn is_active(&self, as_of: Option<NaiveDate>) -> bool {
        match (self.end, as_of) {
            (None, _) => true,
            (Some(end), Some(as_of)) => end >= as_of,
            (Some(_), None) => false,
        }
    }
}

// ==========================================
// Committee - 委员会
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Committee {
    // ===== 标识 =====
    pub id: String,
    pub name: String,

    // ===== 规模 =====
    pub size_min: usize,
    pub size_max: usize,

    // ===== 能力要求 (competency -> 最少人数) =====
    pub required_competencies: BTreeMap<String, usize>,
    pub desired_competencies: BTreeMap<String, usize>,

    // ===== 硬排除 =====
    pub hard_exclusions: BTreeSet<String>,

    // ===== 多样性目标 ("sex:f" / "family_branch:north" -> 最少人数) =====
    pub diversity_targets: BTreeMap<String, usize>,

    // ===== 轮换 =====
    pub rotation_years: Option<u32>,
    pub current_members: Vec<TermRecord>,

    // ===== 锁定成员（无条件进入最终名单） =====
    pub locked_members: BTreeSet<String>,
}

impl Committee {
    /// 构造最小委员会（其余属性为空）
    pub fn new(id: impl Into<String>, name: impl Into<String>, size_min: usize, size_max: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size_min,
            size_max,
            required_competencies: BTreeMap::new(),
            desired_competencies: BTreeMap::new(),
            hard_exclusions: BTreeSet::new(),
            diversity_targets: BTreeMap::new(),
            rotation_years: None,
            current_members: Vec::new(),
            locked_members: BTreeSet::new(),
        }
    }

    /// 校验委员会定义
    ///
    /// # 规则
    /// 1. size_min <= size_max
    /// 2. 多样性目标 key 可解析
    pub fn validate(&self) -> Result<(), String> {
        if self.size_min > self.size_max {
            return Err(format!(
                "size_min ({}) cannot exceed size_max ({})",
                self.size_min, self.size_max
            ));
        }
        for key in self.diversity_targets.keys() {
            DiversityKey::parse(key)?;
        }
        Ok(())
    }

    /// applies_to 过滤: 允许按 id 或名称匹配
    pub fn matches(&self, selector: &str) -> bool {
        self.id == selector || self.name == selector
    }

    /// 截至 as_of 是否为现任成员
    ///
    /// # 规则
    /// - 任期在 as_of 之前结束（end < as_of）不计
    /// - as_of 缺省时只有未设结束日期的任期计为现任
    pub fn is_incumbent(&self, person_id: &str, as_of: Option<NaiveDate>) -> bool {
        self.terms_of(person_id).any(|t| t.is_active(as_of))
    }

    /// 截至 as_of 的任职年数（取现任任期中最早的起始日，结束日封顶）
    pub fn tenure_years(&self, person_id: &str, as_of: NaiveDate) -> Option<i64> {
        self.terms_of(person_id)
            .filter(|t| t.is_active(Some(as_of)))
            .map(|t| {
                let until = t.end.map_or(as_of, |end| end.min(as_of));
                (until - t.start).num_days().max(0) / 365
            })
            .max()
    }

    fn terms_of<'a>(&'a self, person_id: &'a str) -> impl Iterator<Item = &'a TermRecord> + 'a {
        self.current_members.iter().filter(move |t| t.person_id == person_id)
    }

    /// 计算给定成员集合的覆盖快照
    pub fn current_coverage(&self, assignees: &[&Person]) -> CoverageSnapshot {
        let mut competency_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut sex_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut branch_counts: BTreeMap<String, usize> = BTreeMap::new();

        for person in assignees {
            for competency in &person.competencies {
                *competency_counts.entry(competency.clone()).or_insert(0) += 1;
            }
            if let Some(sex) = &person.sex {
                *sex_counts.entry(sex.clone()).or_insert(0) += 1;
            }
            if let Some(branch) = &person.family_branch {
                *branch_counts.entry(branch.clone()).or_insert(0) += 1;
            }
        }

        let shortfall = |targets: &BTreeMap<String, usize>| -> BTreeMap<String, usize> {
            targets
                .iter()
                .filter_map(|(competency, &needed)| {
                    let have = competency_counts.get(competency).copied().unwrap_or(0);
                    (have < needed).then(|| (competency.clone(), needed - have))
                })
                .collect()
        };
        let missing_required = shortfall(&self.required_competencies);
        let desired_gap = shortfall(&self.desired_competencies);

        let diversity_deviation = self
            .diversity_targets
            .iter()
            .filter_map(|(key, &needed)| {
                // 无法解析的 key 已在加载时拒绝
                let parsed = DiversityKey::parse(key).ok()?;
                let have = assignees.iter().filter(|p| parsed.matches(p)).count();
                (have < needed).then(|| (key.clone(), needed - have))
            })
            .collect();

        CoverageSnapshot {
            size: assignees.len(),
            size_min: self.size_min,
            size_max: self.size_max,
            competency_counts,
            sex_counts,
            branch_counts,
            missing_required,
            desired_gap,
            diversity_deviation,
        }
    }
}

// ==========================================
// CoverageSnapshot - 覆盖快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSnapshot {
    pub size: usize,
    pub size_min: usize,
    pub size_max: usize,

    /// 成员持有的全部能力计数
    pub competency_counts: BTreeMap<String, usize>,
    pub sex_counts: BTreeMap<String, usize>,
    pub branch_counts: BTreeMap<String, usize>,

    /// 必需能力缺口 (competency -> 缺少人数)
    pub missing_required: BTreeMap<String, usize>,
    /// 期望能力缺口
    pub desired_gap: BTreeMap<String, usize>,
    /// 多样性目标缺口 (target key -> 缺少人数)
    pub diversity_deviation: BTreeMap<String, usize>,
}

impl CoverageSnapshot {
    pub fn size_compliant(&self) -> bool {
        self.size_min <= self.size && self.size <= self.size_max
    }

    pub fn required_satisfied(&self) -> bool {
        self.missing_required.is_empty()
    }
}

// ==========================================
// 多样性目标 key
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiversityAttribute {
    Sex,
    FamilyBranch,
}

impl fmt::Display for DiversityAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiversityAttribute::Sex => write!(f, "sex"),
            DiversityAttribute::FamilyBranch => write!(f, "family_branch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiversityKey {
    pub attribute: DiversityAttribute,
    pub value: String,
}

impl DiversityKey {
    /// 解析 "sex:f" / "family_branch:north" / "branch:north" / "north"
    pub fn parse(key: &str) -> Result<Self, String> {
        let (attribute, value) = match key.split_once(':') {
            Some((attr, value)) => {
                let attribute = match attr.trim().to_lowercase().as_str() {
                    "sex" | "gender" => DiversityAttribute::Sex,
                    "family_branch" | "branch" => DiversityAttribute::FamilyBranch,
                    other => {
                        return Err(format!(
                            "unknown diversity attribute '{}' in target '{}'",
                            other, key
                        ))
                    }
                };
                (attribute, value)
            }
            None => (DiversityAttribute::FamilyBranch, key),
        };

        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return Err(format!("diversity target '{}' has an empty value", key));
        }
        Ok(Self { attribute, value })
    }

    pub fn matches(&self, person: &Person) -> bool {
        let attr = match self.attribute {
            DiversityAttribute::Sex => person.sex.as_deref(),
            DiversityAttribute::FamilyBranch => person.family_branch.as_deref(),
        };
        attr == Some(self.value.as_str())
    }
}
