// ==========================================
// 委员会席位分配系统 - 规则引擎
// ==========================================
// 职责: 规则编译（RuleDefinition → CompiledRule）+ 单个候选人评估
// 红线: 硬规则按优先级顺序执行，首个违反即短路
// 红线: 所有排除必须输出 reason
// ==========================================
// 输入: 人员 + 委员会 + 当前分配 + 规则集
// 输出: Evaluation（逐条规则记录 + 排除原因 / 边际得分）
// ==========================================

use crate::domain::allocation::{Assignment, RuleEvaluation, RuleResult};
use crate::domain::committee::Committee;
use crate::domain::person::Person;
use crate::domain::rule::{RuleDefinition, RuleParams};
use crate::domain::types::RuleKind;
use crate::engine::context::AllocationContext;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rule_library::{self, RuleContext, RuleSpec};
use crate::engine::template::{Template, TemplateContext, TemplateError, TemplateScope};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const DEFAULT_EXCLUDE_TEMPLATE: &str = "{person.name} excluded from {committee.name} by {rule}";
const DEFAULT_SCORE_TEMPLATE: &str = "{rule} score {score}";

/// 未声明时自动注入的内置硬规则
const BUILTIN_HARD_RULES: [&str; 2] = ["committee_exclusion", "service_cap"];

// ==========================================
// CompiledRule - 已编译规则
// ==========================================
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub kind: RuleKind,
    pub priority: i32,
    /// 软规则权重（硬规则为 0）
    pub weight: f64,
    pub applies_to: Vec<String>,
    pub params: RuleParams,
    spec: RuleSpec,
    /// 自定义排除模板（缺省时使用默认模板并附加原因代码）
    exclude_template: Option<Template>,
    default_exclude_template: Template,
    score_template: Template,
}

impl CompiledRule {
    /// 编译单条规则定义
    fn compile(definition: &RuleDefinition) -> EngineResult<Self> {
        let rule = definition.name.clone();
        let slug = definition.slug();
        let registration = rule_library::lookup(slug).ok_or_else(|| EngineError::UnknownRule {
            rule: rule.clone(),
            slug: slug.to_string(),
        })?;

        if registration.kind != definition.kind {
            return Err(EngineError::KindMismatch {
                rule,
                slug: slug.to_string(),
                declared: definition.kind,
                expected: registration.kind,
            });
        }

        let weight = match definition.kind {
            RuleKind::Soft => {
                let weight = definition
                    .weight
                    .ok_or_else(|| EngineError::MissingWeight { rule: rule.clone() })?;
                if !weight.is_finite() {
                    return Err(EngineError::NonFiniteWeight { rule, weight });
                }
                weight
            }
            RuleKind::Hard => 0.0,
        };

        let spec = registration
            .compile(&definition.params)
            .map_err(|message| EngineError::InvalidParams {
                rule: rule.clone(),
                message,
            })?;

        let template_error = |field: &'static str| {
            let rule = rule.clone();
            move |source: TemplateError| EngineError::InvalidTemplate { rule, field, source }
        };
        let exclude_template = definition
            .explain_exclude
            .as_deref()
            .map(|src| Template::compile(src, TemplateScope::Exclude, &definition.params))
            .transpose()
            .map_err(template_error("explain_exclude"))?;
        let score_template = Template::compile(
            definition.explain_score.as_deref().unwrap_or(DEFAULT_SCORE_TEMPLATE),
            TemplateScope::Score,
            &definition.params,
        )
        .map_err(template_error("explain_score"))?;
        let default_exclude_template =
            Template::compile(DEFAULT_EXCLUDE_TEMPLATE, TemplateScope::Exclude, &definition.params)
                .map_err(template_error("explain_exclude"))?;

        Ok(Self {
            name: rule,
            kind: definition.kind,
            priority: definition.priority,
            weight,
            applies_to: definition.applies_to.clone(),
            params: definition.params.clone(),
            spec,
            exclude_template,
            default_exclude_template,
            score_template,
        })
    }

    /// applies_to 为空时适用全部委员会
    pub fn applies(&self, committee: &Committee) -> bool {
        self.applies_to.is_empty() || self.applies_to.iter().any(|s| committee.matches(s))
    }

    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    fn exclusion_reason(&self, person: &Person, committee: &Committee, detail: &str) -> String {
        let ctx = self.template_context(person, committee, None);
        match &self.exclude_template {
            Some(template) => template.render(&ctx),
            None => format!("{} ({})", self.default_exclude_template.render(&ctx), detail),
        }
    }

    fn score_explanation(&self, person: &Person, committee: &Committee, contribution: f64) -> String {
        self.score_template
            .render(&self.template_context(person, committee, Some(contribution)))
    }

    fn template_context<'a>(
        &'a self,
        person: &'a Person,
        committee: &'a Committee,
        score: Option<f64>,
    ) -> TemplateContext<'a> {
        TemplateContext {
            rule: &self.name,
            person,
            committee,
            params: &self.params,
            score,
        }
    }
}

// ==========================================
// RuleSet - 已编译规则集
// ==========================================
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// 硬规则（按 priority 升序，同优先级保持定义顺序）
    hard: Vec<CompiledRule>,
    /// 软规则（同上）
    soft: Vec<CompiledRule>,
}

impl RuleSet {
    /// 编译规则定义
    ///
    /// # 规则
    /// 1. 规则名唯一
    /// 2. 实现标识必须已注册，声明种类必须与实现一致
    /// 3. 软规则必须有有限权重
    /// 4. 参数、模板在此阶段全部校验
    /// 5. committee_exclusion / service_cap 未以全局（applies_to 为空）形式声明时追加到末尾
    pub fn compile(definitions: &[RuleDefinition]) -> EngineResult<Self> {
        let mut names = BTreeSet::new();
        let mut compiled = Vec::with_capacity(definitions.len() + BUILTIN_HARD_RULES.len());
        for definition in definitions {
            if !names.insert(definition.name.as_str()) {
                return Err(EngineError::DuplicateRule(definition.name.clone()));
            }
            compiled.push(CompiledRule::compile(definition)?);
        }

        // 仅未限定 applies_to 的声明可替代内置规则
        let declared_slugs: BTreeSet<&str> = definitions
            .iter()
            .filter(|d| d.applies_to.is_empty())
            .map(|d| d.slug())
            .collect();
        let mut next_priority = compiled.iter().map(|r| r.priority).max().unwrap_or(0);
        for slug in BUILTIN_HARD_RULES {
            if declared_slugs.contains(slug) {
                continue;
            }
            let name = if names.contains(slug) {
                format!("builtin_{}", slug)
            } else {
                slug.to_string()
            };
            next_priority = next_priority.saturating_add(1);
            debug!(rule = %name, priority = next_priority, "注入内置硬规则");
            let definition = RuleDefinition::hard(name, next_priority).with_implementation(slug);
            compiled.push(CompiledRule::compile(&definition)?);
        }

        // 稳定排序: 同优先级保持定义顺序
        compiled.sort_by_key(|r| r.priority);
        let (hard, soft) = compiled.into_iter().partition(|r| r.kind == RuleKind::Hard);
        Ok(Self { hard, soft })
    }

    /// 派生应用了权重覆写的副本（原规则集不变）
    pub fn with_weight_overrides(&self, overrides: &BTreeMap<String, f64>) -> EngineResult<Self> {
        let mut derived = self.clone();
        for (name, &weight) in overrides {
            if self.hard.iter().any(|r| &r.name == name) {
                return Err(EngineError::HardRuleWeightOverride(name.clone()));
            }
            let rule = derived
                .soft
                .iter_mut()
                .find(|r| &r.name == name)
                .ok_or_else(|| EngineError::UnknownWeightOverride(name.clone()))?;
            if !weight.is_finite() {
                return Err(EngineError::NonFiniteWeight {
                    rule: name.clone(),
                    weight,
                });
            }
            rule.weight = weight;
        }
        Ok(derived)
    }

    pub fn hard_rules(&self) -> &[CompiledRule] {
        &self.hard
    }

    pub fn soft_rules(&self) -> &[CompiledRule] {
        &self.soft
    }

    pub fn len(&self) -> usize {
        self.hard.len() + self.soft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==========================================
// Evaluation - 单个候选人评估结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub rule: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// 按执行顺序的逐条规则记录
    pub evaluations: Vec<RuleEvaluation>,
    /// 首个硬规则排除
    pub exclusion: Option<Exclusion>,
    /// 软规则加权得分之和（被排除时为 0）
    pub score: f64,
}

impl Evaluation {
    pub fn is_eligible(&self) -> bool {
        self.exclusion.is_none()
    }
}

// ==========================================
// RuleEngine - 规则引擎
// ==========================================
pub struct RuleEngine {
    // 无状态引擎，规则集由调用方传入
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 完整评估（含解释文本，用于决策说明）
    ///
    /// # 参数
    /// - ctx: 分配上下文
    /// - person: 候选人
    /// - committee: 目标委员会
    /// - assignment: 当前分配（候选人若已在该委员会内，会被视为同事之外的本人）
    pub fn evaluate(
        &self,
        ctx: &AllocationContext<'_>,
        person: &Person,
        committee: &Committee,
        assignment: &Assignment,
    ) -> Evaluation {
        let peers = ctx.peers(&committee.id, assignment, &person.id);
        let rule_ctx = RuleContext {
            person,
            committee,
            assignment,
            peers: &peers,
        };
        let rules = ctx.rules();
        let mut evaluations = Vec::new();

        for rule in rules.hard_rules().iter().filter(|r| r.applies(committee)) {
            match rule.spec().check(&rule_ctx) {
                Some(detail) => {
                    let reason = rule.exclusion_reason(person, committee, &detail);
                    evaluations.push(RuleEvaluation {
                        rule: rule.name.clone(),
                        kind: RuleKind::Hard,
                        result: RuleResult::Excluded {
                            reason: reason.clone(),
                        },
                    });
                    return Evaluation {
                        evaluations,
                        exclusion: Some(Exclusion {
                            rule: rule.name.clone(),
                            reason,
                        }),
                        score: 0.0,
                    };
                }
                None => evaluations.push(RuleEvaluation {
                    rule: rule.name.clone(),
                    kind: RuleKind::Hard,
                    result: RuleResult::Passed,
                }),
            }
        }

        let mut score = 0.0;
        for rule in rules.soft_rules().iter().filter(|r| r.applies(committee)) {
            let contribution = rule.spec().score(&rule_ctx) * rule.weight;
            score += contribution;
            evaluations.push(RuleEvaluation {
                rule: rule.name.clone(),
                kind: RuleKind::Soft,
                result: RuleResult::Scored {
                    contribution,
                    explanation: rule.score_explanation(person, committee, contribution),
                },
            });
        }

        Evaluation {
            evaluations,
            exclusion: None,
            score,
        }
    }

    /// 仅硬规则判定（不生成解释文本）
    ///
    /// # 返回
    /// - None: 全部通过
    /// - Some(Exclusion): 首个违反的硬规则
    pub fn first_exclusion(
        &self,
        ctx: &AllocationContext<'_>,
        person: &Person,
        committee: &Committee,
        assignment: &Assignment,
    ) -> Option<Exclusion> {
        let peers = ctx.peers(&committee.id, assignment, &person.id);
        let rule_ctx = RuleContext {
            person,
            committee,
            assignment,
            peers: &peers,
        };
        ctx.rules()
            .hard_rules()
            .iter()
            .filter(|r| r.applies(committee))
            .find_map(|rule| {
                rule.spec().check(&rule_ctx).map(|detail| Exclusion {
                    rule: rule.name.clone(),
                    reason: rule.exclusion_reason(person, committee, &detail),
                })
            })
    }

    pub fn is_eligible(
        &self,
        ctx: &AllocationContext<'_>,
        person: &Person,
        committee: &Committee,
        assignment: &Assignment,
    ) -> bool {
        let peers = ctx.peers(&committee.id, assignment, &person.id);
        let rule_ctx = RuleContext {
            person,
            committee,
            assignment,
            peers: &peers,
        };
        ctx.rules()
            .hard_rules()
            .iter()
            .filter(|r| r.applies(committee))
            .all(|rule| rule.spec().check(&rule_ctx).is_none())
    }

    /// 边际软得分（不做硬规则判定）
    pub fn marginal_score(
        &self,
        ctx: &AllocationContext<'_>,
        person: &Person,
        committee: &Committee,
        assignment: &Assignment,
    ) -> f64 {
        let peers = ctx.peers(&committee.id, assignment, &person.id);
        let rule_ctx = RuleContext {
            person,
            committee,
            assignment,
            peers: &peers,
        };
        ctx.rules()
            .soft_rules()
            .iter()
            .filter(|r| r.applies(committee))
            .map(|rule| rule.spec().score(&rule_ctx) * rule.weight)
            .sum()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}
