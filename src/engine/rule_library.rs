// ==========================================
// 委员会席位分配系统 - 规则库（纯函数）
// ==========================================
// 职责: 规则实现注册表 + 强类型参数编译 + 单条规则判定/评分
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: 注册表为进程级只读静态表，运行期间不修改
// ==========================================

use crate::domain::allocation::Assignment;
use crate::domain::committee::{Committee, DiversityAttribute, DiversityKey};
use crate::domain::person::Person;
use crate::domain::rule::RuleParams;
use crate::domain::types::RuleKind;
use chrono::NaiveDate;
use serde_json::Value as JsonValue;

// ==========================================
// RuleContext - 单次判定输入
// ==========================================
pub struct RuleContext<'a> {
    pub person: &'a Person,
    pub committee: &'a Committee,
    pub assignment: &'a Assignment,
    /// 委员会当前成员（不含候选人本人）
    pub peers: &'a [&'a Person],
}

// ==========================================
// RuleSpec - 已编译的规则实现（封闭枚举）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RuleSpec {
    // ===== 硬规则 =====
    CommitteeExclusion,
    ServiceCap,
    ExecutiveExclusion,
    SiblingExclusion { max_per_branch: usize },
    CoolingOff { as_of: NaiveDate },
    ConflictOfInterest,
    AgeRange { min: Option<u32>, max: Option<u32> },

    // ===== 软规则 =====
    HasCompetency { competency: String },
    CompetencyCoverage { desired_factor: f64 },
    BranchDiversity,
    GenderBalance { min_share: f64, max_share: f64 },
    TenureMix {
        target_incumbent_share: f64,
        as_of: Option<NaiveDate>,
    },
    ConflictOverlap { penalty: f64 },
    WorkloadBalance,
}

impl RuleSpec {
    /// 硬规则判定
    ///
    /// # 返回
    /// - None: 通过
    /// - Some(detail): 排除原因代码（如 "SERVICE_CAP: workload=2, service_cap=1"）
    pub fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let person = ctx.person;
        let committee = ctx.committee;
        match self {
            RuleSpec::CommitteeExclusion => committee
                .hard_exclusions
                .contains(&person.id)
                .then(|| format!("COMMITTEE_EXCLUSION: committee={}", committee.id)),

            RuleSpec::ServiceCap => {
                let workload = person.workload_with(&committee.id, ctx.assignment);
                (workload > person.service_cap as usize).then(|| {
                    format!(
                        "SERVICE_CAP: workload={}, service_cap={}",
                        workload, person.service_cap
                    )
                })
            }

            RuleSpec::ExecutiveExclusion => person
                .executive_role
                .then(|| "EXECUTIVE_ROLE: executive_role=true".to_string()),

            RuleSpec::SiblingExclusion { max_per_branch } => {
                let branch = person.family_branch.as_deref()?;
                let same_branch = ctx
                    .peers
                    .iter()
                    .filter(|p| p.family_branch.as_deref() == Some(branch))
                    .count();
                (same_branch >= *max_per_branch).then(|| {
                    format!(
                        "SIBLING_LIMIT: family_branch={}, members={}, max_per_branch={}",
                        branch, same_branch, max_per_branch
                    )
                })
            }

            RuleSpec::CoolingOff { as_of } => {
                let until = person.cooling_off.get(&committee.id)?;
                (until > as_of).then(|| format!("COOLING_OFF: until={}, as_of={}", until, as_of))
            }

            RuleSpec::ConflictOfInterest => {
                let conflicted: Vec<&str> = ctx
                    .peers
                    .iter()
                    .filter(|p| person.conflicts_with(p))
                    .map(|p| p.id.as_str())
                    .collect();
                (!conflicted.is_empty())
                    .then(|| format!("CONFLICT_OF_INTEREST: with={}", conflicted.join(",")))
            }

            RuleSpec::AgeRange { min, max } => match person.age {
                None => Some("AGE_UNKNOWN: age missing".to_string()),
                Some(age) => {
                    let below = min.is_some_and(|m| age < m);
                    let above = max.is_some_and(|m| age > m);
                    (below || above).then(|| {
                        format!(
                            "AGE_RANGE: age={}, min={}, max={}",
                            age,
                            min.map_or("-".to_string(), |m| m.to_string()),
                            max.map_or("-".to_string(), |m| m.to_string())
                        )
                    })
                }
            },

            // 软规则永不排除
            _ => None,
        }
    }

    /// 软规则原始得分（未乘权重）
    pub fn score(&self, ctx: &RuleContext<'_>) -> f64 {
        let person = ctx.person;
        let committee = ctx.committee;
        match self {
            RuleSpec::HasCompetency { competency } => {
                if person.has_competency(competency) {
                    1.0
                } else {
                    0.0
                }
            }

            RuleSpec::CompetencyCoverage { desired_factor } => {
                let shortfall = |competency: &str, needed: usize| {
                    let have = ctx.peers.iter().filter(|p| p.has_competency(competency)).count();
                    have < needed
                };
                let required = committee
                    .required_competencies
                    .iter()
                    .filter(|&(c, &n)| person.has_competency(c) && shortfall(c.as_str(), n))
                    .count() as f64;
                let desired = committee
                    .desired_competencies
                    .iter()
                    .filter(|&(c, &n)| person.has_competency(c) && shortfall(c.as_str(), n))
                    .count() as f64;
                required + desired * desired_factor
            }

            RuleSpec::BranchDiversity => {
                let Some(branch) = person.family_branch.as_deref() else {
                    return 0.0;
                };
                let present = ctx
                    .peers
                    .iter()
                    .filter(|p| p.family_branch.as_deref() == Some(branch))
                    .count();
                if present == 0 {
                    return 1.0;
                }
                let below_target = committee.diversity_targets.iter().any(|(key, &needed)| {
                    DiversityKey::parse(key).is_ok_and(|k| {
                        k.attribute == DiversityAttribute::FamilyBranch
                            && k.value == branch
                            && present < needed
                    })
                });
                if below_target {
                    1.0
                } else {
                    0.0
                }
            }

            RuleSpec::GenderBalance {
                min_share,
                max_share,
            } => {
                let Some(sex) = person.sex.as_deref() else {
                    return 0.0;
                };
                if ctx.peers.is_empty() {
                    return 0.0;
                }
                let same = ctx
                    .peers
                    .iter()
                    .filter(|p| p.sex.as_deref() == Some(sex))
                    .count() as f64;
                let size = ctx.peers.len() as f64;
                let share_before = same / size;
                let share_after = (same + 1.0) / (size + 1.0);
                if share_after > *max_share {
                    -1.0
                } else if share_before < *min_share {
                    1.0
                } else {
                    0.0
                }
            }

            RuleSpec::TenureMix {
                target_incumbent_share,
                as_of,
            } => {
                let incumbents = ctx
                    .peers
                    .iter()
                    .filter(|p| committee.is_incumbent(&p.id, *as_of))
                    .count() as f64;
                let share = if ctx.peers.is_empty() {
                    0.0
                } else {
                    incumbents / ctx.peers.len() as f64
                };

                if committee.is_incumbent(&person.id, *as_of) {
                    let overstayed = match (as_of, committee.rotation_years) {
                        (Some(as_of), Some(limit)) => committee
                            .tenure_years(&person.id, *as_of)
                            .is_some_and(|years| years >= limit as i64),
                        _ => false,
                    };
                    if overstayed {
                        -1.0
                    } else if share < *target_incumbent_share {
                        1.0
                    } else {
                        0.0
                    }
                } else if share >= *target_incumbent_share {
                    1.0
                } else {
                    0.0
                }
            }

            RuleSpec::ConflictOverlap { penalty } => {
                let conflicts = ctx.peers.iter().filter(|p| person.conflicts_with(p)).count();
                -(conflicts as f64) * penalty
            }

            RuleSpec::WorkloadBalance => {
                if person.service_cap == 0 {
                    return 0.0;
                }
                let workload = person.workload_with(&committee.id, ctx.assignment) as f64;
                1.0 - workload / person.service_cap as f64
            }

            // 硬规则不参与评分
            _ => 0.0,
        }
    }
}

// ==========================================
// 注册表
// ==========================================
pub struct RuleRegistration {
    pub slug: &'static str,
    pub kind: RuleKind,
    compiler: fn(&RuleParams) -> Result<RuleSpec, String>,
}

impl RuleRegistration {
    /// 将松散参数转换为强类型 RuleSpec
    pub fn compile(&self, params: &RuleParams) -> Result<RuleSpec, String> {
        (self.compiler)(params)
    }
}

static REGISTRY: &[RuleRegistration] = &[
    RuleRegistration { slug: "committee_exclusion", kind: RuleKind::Hard, compiler: compile_committee_exclusion },
    RuleRegistration { slug: "service_cap", kind: RuleKind::Hard, compiler: compile_service_cap },
    RuleRegistration { slug: "executive_exclusion", kind: RuleKind::Hard, compiler: compile_executive_exclusion },
    RuleRegistration { slug: "sibling_exclusion", kind: RuleKind::Hard, compiler: compile_sibling_exclusion },
    RuleRegistration { slug: "cooling_off", kind: RuleKind::Hard, compiler: compile_cooling_off },
    RuleRegistration { slug: "conflict_of_interest", kind: RuleKind::Hard, compiler: compile_conflict_of_interest },
    RuleRegistration { slug: "age_range", kind: RuleKind::Hard, compiler: compile_age_range },
    RuleRegistration { slug: "has_competency", kind: RuleKind::Soft, compiler: compile_has_competency },
    RuleRegistration { slug: "competency_coverage", kind: RuleKind::Soft, compiler: compile_competency_coverage },
    RuleRegistration { slug: "branch_diversity", kind: RuleKind::Soft, compiler: compile_branch_diversity },
    RuleRegistration { slug: "gender_balance", kind: RuleKind::Soft, compiler: compile_gender_balance },
    RuleRegistration { slug: "tenure_mix", kind: RuleKind::Soft, compiler: compile_tenure_mix },
    RuleRegistration { slug: "conflict_overlap", kind: RuleKind::Soft, compiler: compile_conflict_overlap },
    RuleRegistration { slug: "workload_balance", kind: RuleKind::Soft, compiler: compile_workload_balance },
];

/// 按实现标识查找注册项
pub fn lookup(slug: &str) -> Option<&'static RuleRegistration> {
    REGISTRY.iter().find(|r| r.slug == slug)
}

/// 全部已注册实现标识
pub fn registered_slugs() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|r| r.slug)
}

// ==========================================
// 参数编译
// ==========================================

fn compile_committee_exclusion(_: &RuleParams) -> Result<RuleSpec, String> {
    Ok(RuleSpec::CommitteeExclusion)
}

fn compile_service_cap(_: &RuleParams) -> Result<RuleSpec, String> {
    Ok(RuleSpec::ServiceCap)
}

fn compile_executive_exclusion(_: &RuleParams) -> Result<RuleSpec, String> {
    Ok(RuleSpec::ExecutiveExclusion)
}

fn compile_sibling_exclusion(params: &RuleParams) -> Result<RuleSpec, String> {
    let max_per_branch = param_u64(params, "max_per_branch")?.unwrap_or(1) as usize;
    if max_per_branch == 0 {
        return Err("max_per_branch must be at least 1".to_string());
    }
    Ok(RuleSpec::SiblingExclusion { max_per_branch })
}

fn compile_cooling_off(params: &RuleParams) -> Result<RuleSpec, String> {
    let as_of = param_date(params, "as_of")?.ok_or_else(|| "missing required param 'as_of'".to_string())?;
    Ok(RuleSpec::CoolingOff { as_of })
}

fn compile_conflict_of_interest(_: &RuleParams) -> Result<RuleSpec, String> {
    Ok(RuleSpec::ConflictOfInterest)
}

fn compile_age_range(params: &RuleParams) -> Result<RuleSpec, String> {
    let min = param_u64(params, "min")?.map(|v| v as u32);
    let max = param_u64(params, "max")?.map(|v| v as u32);
    match (min, max) {
        (None, None) => Err("age_range needs at least one of 'min' or 'max'".to_string()),
        (Some(lo), Some(hi)) if lo > hi => Err(format!("min ({}) cannot exceed max ({})", lo, hi)),
        _ => Ok(RuleSpec::AgeRange { min, max }),
    }
}

fn compile_has_competency(params: &RuleParams) -> Result<RuleSpec, String> {
    let competency = param_str(params, "competency")?
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| "missing required param 'competency'".to_string())?;
    Ok(RuleSpec::HasCompetency { competency })
}

fn compile_competency_coverage(params: &RuleParams) -> Result<RuleSpec, String> {
    let desired_factor = param_f64(params, "desired_factor")?.unwrap_or(0.5);
    Ok(RuleSpec::CompetencyCoverage { desired_factor })
}

fn compile_branch_diversity(_: &RuleParams) -> Result<RuleSpec, String> {
    Ok(RuleSpec::BranchDiversity)
}

fn compile_gender_balance(params: &RuleParams) -> Result<RuleSpec, String> {
    let min_share = param_f64(params, "min_share")?.unwrap_or(0.4);
    let max_share = param_f64(params, "max_share")?.unwrap_or(0.6);
    if !(0.0..=1.0).contains(&min_share) || !(0.0..=1.0).contains(&max_share) || min_share > max_share {
        return Err(format!(
            "shares must satisfy 0 <= min_share <= max_share <= 1, got {} / {}",
            min_share, max_share
        ));
    }
    Ok(RuleSpec::GenderBalance {
        min_share,
        max_share,
    })
}

fn compile_tenure_mix(params: &RuleParams) -> Result<RuleSpec, String> {
    let target_incumbent_share = param_f64(params, "target_incumbent_share")?.unwrap_or(0.5);
    if !(0.0..=1.0).contains(&target_incumbent_share) {
        return Err(format!(
            "target_incumbent_share must be within [0, 1], got {}",
            target_incumbent_share
        ));
    }
    let as_of = param_date(params, "as_of")?;
    Ok(RuleSpec::TenureMix {
        target_incumbent_share,
        as_of,
    })
}

fn compile_conflict_overlap(params: &RuleParams) -> Result<RuleSpec, String> {
    let penalty = param_f64(params, "penalty")?.unwrap_or(1.0);
    Ok(RuleSpec::ConflictOverlap { penalty })
}

fn compile_workload_balance(_: &RuleParams) -> Result<RuleSpec, String> {
    Ok(RuleSpec::WorkloadBalance)
}

// ==========================================
// 参数读取辅助
// ==========================================

fn param_str<'p>(params: &'p RuleParams, key: &str) -> Result<Option<&'p str>, String> {
    match params.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(format!("param '{}' must be a string, got {}", key, other)),
    }
}

fn param_f64(params: &RuleParams, key: &str) -> Result<Option<f64>, String> {
    let value = match params.get(key) {
        None | Some(JsonValue::Null) => return Ok(None),
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match value {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("param '{}' must be a finite number", key)),
    }
}

fn param_u64(params: &RuleParams, key: &str) -> Result<Option<u64>, String> {
    let value = match params.get(key) {
        None | Some(JsonValue::Null) => return Ok(None),
        Some(JsonValue::Number(n)) => n.as_u64(),
        Some(JsonValue::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    value
        .filter(|v| *v <= u32::MAX as u64)
        .map(Some)
        .ok_or_else(|| format!("param '{}' must be a non-negative integer", key))
}

fn param_date(params: &RuleParams, key: &str) -> Result<Option<NaiveDate>, String> {
    match param_str(params, key)? {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("param '{}' must be a date (YYYY-MM-DD), got '{}'", key, raw)),
    }
}
