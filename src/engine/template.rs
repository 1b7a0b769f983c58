// ==========================================
// 委员会席位分配系统 - 解释模板
// ==========================================
// 职责: explain_exclude / explain_score 模板的编译与渲染
// 红线: 模板错误必须在规则编译阶段暴露，渲染阶段不允许失败
// ==========================================
// 占位符: {rule} {person.*} {committee.*} {params[key]} {params.key} {score}
// 转义: {{ → {   }} → }
// ==========================================

use crate::domain::committee::Committee;
use crate::domain::person::Person;
use crate::domain::rule::RuleParams;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// 模板错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("花括号不匹配 (位置 {0})")]
    UnbalancedBrace(usize),

    #[error("空占位符 (位置 {0})")]
    EmptyPlaceholder(usize),

    #[error("未知占位符: {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("参数 '{0}' 未在规则 params 中定义")]
    UnknownParam(String),

    #[error("{{score}} 只能用于 explain_score 模板")]
    ScoreNotAllowed,
}

/// 模板用途（决定 {score} 是否可用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateScope {
    Exclude,
    Score,
}

#[derive(Debug, Clone, PartialEq)]
enum Field {
    Rule,
    PersonId,
    PersonName,
    PersonAge,
    PersonSex,
    PersonBranch,
    PersonServiceCap,
    PersonCompetencies,
    CommitteeId,
    CommitteeName,
    CommitteeSizeMin,
    CommitteeSizeMax,
    Param(String),
    Score,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// 渲染上下文
pub struct TemplateContext<'a> {
    pub rule: &'a str,
    pub person: &'a Person,
    pub committee: &'a Committee,
    pub params: &'a RuleParams,
    pub score: Option<f64>,
}

// ==========================================
// Template - 已编译模板
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// 编译模板
    ///
    /// # 参数
    /// - source: 模板原文
    /// - scope: 模板用途
    /// - params: 规则参数（校验 {params.key} 是否存在）
    ///
    /// # 返回
    /// - Err(TemplateError): 未知占位符/参数、花括号不匹配、{score} 用错位置
    pub fn compile(
        source: &str,
        scope: TemplateScope,
        params: &RuleParams,
    ) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::UnbalancedBrace(pos)),
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (inner_pos, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(TemplateError::UnbalancedBrace(inner_pos)),
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace(pos));
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder(pos));
                    }
                    let field = parse_field(name, scope, params)?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// 渲染（不会失败）
    pub fn render(&self, ctx: &TemplateContext<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(&render_field(field, ctx)),
            }
        }
        out
    }
}

fn parse_field(name: &str, scope: TemplateScope, params: &RuleParams) -> Result<Field, TemplateError> {
    let field = match name {
        "rule" => Field::Rule,
        "person.id" => Field::PersonId,
        "person.name" => Field::PersonName,
        "person.age" => Field::PersonAge,
        "person.sex" => Field::PersonSex,
        "person.family_branch" => Field::PersonBranch,
        "person.service_cap" => Field::PersonServiceCap,
        "person.competencies" => Field::PersonCompetencies,
        "committee.id" => Field::CommitteeId,
        "committee.name" => Field::CommitteeName,
        "committee.size_min" => Field::CommitteeSizeMin,
        "committee.size_max" => Field::CommitteeSizeMax,
        "score" => {
            if scope != TemplateScope::Score {
                return Err(TemplateError::ScoreNotAllowed);
            }
            Field::Score
        }
        other => {
            let key = other
                .strip_prefix("params[")
                .and_then(|rest| rest.strip_suffix(']'))
                .or_else(|| other.strip_prefix("params."))
                .map(|key| key.trim().trim_matches(|c| c == '\'' || c == '"'));
            match key {
                Some(key) if params.contains_key(key) => Field::Param(key.to_string()),
                Some(key) => return Err(TemplateError::UnknownParam(key.to_string())),
                None => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
            }
        }
    };
    Ok(field)
}

fn render_field(field: &Field, ctx: &TemplateContext<'_>) -> String {
    const UNKNOWN: &str = "unknown";
    let person = ctx.person;
    let committee = ctx.committee;
    match field {
        Field::Rule => ctx.rule.to_string(),
        Field::PersonId => person.id.clone(),
        Field::PersonName => person.name.clone(),
        Field::PersonAge => person
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        Field::PersonSex => person.sex.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        Field::PersonBranch => person
            .family_branch
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        Field::PersonServiceCap => person.service_cap.to_string(),
        Field::PersonCompetencies => person
            .competencies
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", "),
        Field::CommitteeId => committee.id.clone(),
        Field::CommitteeName => committee.name.clone(),
        Field::CommitteeSizeMin => committee.size_min.to_string(),
        Field::CommitteeSizeMax => committee.size_max.to_string(),
        Field::Param(key) => match ctx.params.get(key) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(value) => value.to_string(),
            None => UNKNOWN.to_string(),
        },
        Field::Score => format!("{:.2}", ctx.score.unwrap_or(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RuleParams {
        let mut params = RuleParams::new();
        params.insert("competency".to_string(), JsonValue::from("finance"));
        params.insert("penalty".to_string(), JsonValue::from(1.5));
        params
    }

    fn render(source: &str, scope: TemplateScope, score: Option<f64>) -> String {
        let params = params();
        let mut person = Person::new("alice", "Alice", 2);
        person.competencies.insert("finance".to_string());
        person.competencies.insert("legal".to_string());
        let committee = Committee::new("fin", "Finance", 1, 3);
        let template = Template::compile(source, scope, &params).unwrap();
        template.render(&TemplateContext {
            rule: "has_finance",
            person: &person,
            committee: &committee,
            params: &params,
            score,
        })
    }

    #[test]
    fn test_render_person_and_committee_fields() {
        let text = render(
            "{person.name} ({person.id}) -> {committee.name} [{committee.size_min}..{committee.size_max}] by {rule}",
            TemplateScope::Exclude,
            None,
        );
        assert_eq!(text, "Alice (alice) -> Finance [1..3] by has_finance");
    }

    #[test]
    fn test_render_params_and_score() {
        let text = render(
            "{params[competency]} / {params.penalty}: {score}",
            TemplateScope::Score,
            Some(1.0 / 3.0),
        );
        assert_eq!(text, "finance / 1.5: 0.33");
    }

    #[test]
    fn test_optional_fields_render_unknown() {
        let text = render("{person.age}|{person.sex}|{person.family_branch}", TemplateScope::Exclude, None);
        assert_eq!(text, "unknown|unknown|unknown");
    }

    #[test]
    fn test_escaped_braces_and_competency_list() {
        let text = render("{{{person.competencies}}}", TemplateScope::Exclude, None);
        assert_eq!(text, "{finance, legal}");
    }

    #[test]
    fn test_compile_errors() {
        let params = params();
        assert_eq!(
            Template::compile("{person.height}", TemplateScope::Exclude, &params),
            Err(TemplateError::UnknownPlaceholder("person.height".to_string()))
        );
        assert_eq!(
            Template::compile("{params.missing}", TemplateScope::Score, &params),
            Err(TemplateError::UnknownParam("missing".to_string()))
        );
        assert_eq!(
            Template::compile("score {score}", TemplateScope::Exclude, &params),
            Err(TemplateError::ScoreNotAllowed)
        );
        assert!(matches!(
            Template::compile("open {rule", TemplateScope::Exclude, &params),
            Err(TemplateError::UnbalancedBrace(_))
        ));
        assert!(matches!(
            Template::compile("stray } brace", TemplateScope::Exclude, &params),
            Err(TemplateError::UnbalancedBrace(_))
        ));
        assert!(matches!(
            Template::compile("{}", TemplateScope::Exclude, &params),
            Err(TemplateError::EmptyPlaceholder(_))
        ));
    }
}
