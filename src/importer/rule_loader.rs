// ==========================================
// 委员会席位分配系统 - 规则文件导入
// ==========================================
// 输入: rules.yaml（规则定义序列）
// 必需字段: name, kind, priority, params; 软规则还需 weight
// 错误: 携带 1 起始的规则序号
// ==========================================

use crate::domain::rule::RuleDefinition;
use crate::importer::error::{ImportError, ImportResult};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{info, instrument};

const REQUIRED_FIELDS: &[&str] = &["kind", "name", "params", "priority"];

/// 从 YAML 文件加载规则定义
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_rules(path: impl AsRef<Path>) -> ImportResult<Vec<RuleDefinition>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    let rules = parse_rules(&text)?;
    info!(count = rules.len(), "规则导入完成");
    Ok(rules)
}

/// 解析规则 YAML 文本
pub fn parse_rules(text: &str) -> ImportResult<Vec<RuleDefinition>> {
    let document: Value = serde_yaml::from_str(text)?;
    let Value::Sequence(items) = document else {
        return Err(ImportError::YamlParseError(
            "rule file must contain a list of rule definitions".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| parse_rule(i + 1, item))
        .collect()
}

fn parse_rule(index: usize, item: Value) -> ImportResult<RuleDefinition> {
    let error = |message: String| ImportError::RuleDefinitionError { index, message };

    let Value::Mapping(map) = &item else {
        return Err(error(format!("expected mapping but found {}", type_name(&item))));
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !map.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(error(format!("missing required fields: {}", missing.join(", "))));
    }

    match field(map, "kind").and_then(Value::as_str) {
        Some("hard") | Some("soft") => {}
        _ => return Err(error("kind must be 'hard' or 'soft'".to_string())),
    }
    if !field(map, "priority").is_some_and(Value::is_i64) {
        return Err(error("priority must be an integer".to_string()));
    }
    if !field(map, "params").is_some_and(|p| p.is_mapping() || p.is_null()) {
        return Err(error("params must be a mapping".to_string()));
    }
    if field(map, "applies_to").is_some_and(|a| !a.is_sequence() && !a.is_null()) {
        return Err(error("applies_to must be a list if provided".to_string()));
    }
    let is_soft = field(map, "kind").and_then(Value::as_str) == Some("soft");
    match field(map, "weight") {
        None | Some(Value::Null) if is_soft => {
            return Err(error("soft rules require a weight".to_string()));
        }
        Some(w) if !w.is_null() && !w.is_number() => {
            return Err(error("weight must be a number if provided".to_string()));
        }
        _ => {}
    }

    let mut normalized = map.clone();
    for key in ["params", "applies_to"] {
        if field(&normalized, key).is_some_and(Value::is_null) {
            normalized.remove(key);
        }
    }
    serde_yaml::from_value(Value::Mapping(normalized)).map_err(|e| error(e.to_string()))
}

fn field<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RuleKind;

    const RULES: &str = r#"
- name: service_cap
  kind: hard
  priority: 1
  params: {}
- name: has_finance
  rule: has_competency
  kind: soft
  priority: 10
  weight: 2
  applies_to: [finance]
  params:
    competency: finance
  explain_score: "{person.name} brings finance ({score})"
"#;

    #[test]
    fn test_parse_rules() {
        let rules = parse_rules(RULES).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind, RuleKind::Hard);
        assert_eq!(rules[0].weight, None);

        let finance = &rules[1];
        assert_eq!(finance.slug(), "has_competency");
        assert_eq!(finance.weight, Some(2.0));
        assert_eq!(finance.applies_to, vec!["finance"]);
        assert_eq!(finance.params["competency"], "finance");
        assert!(finance.explain_score.is_some());
    }

    fn rule_error(text: &str) -> (usize, String) {
        match parse_rules(text) {
            Err(ImportError::RuleDefinitionError { index, message }) => (index, message),
            other => panic!("expected RuleDefinitionError, got {:?}", other),
        }
    }

    #[test]
    fn test_errors_carry_rule_index() {
        let (index, message) = rule_error(
            "- {name: a, kind: hard, priority: 1, params: {}}\n- {name: b, kind: soft, priority: 2, params: {}}\n",
        );
        assert_eq!(index, 2);
        assert!(message.contains("weight"));

        let (index, message) = rule_error("- {name: a, kind: hard}\n");
        assert_eq!(index, 1);
        assert_eq!(message, "missing required fields: params, priority");

        let (_, message) = rule_error("- {name: a, kind: maybe, priority: 1, params: {}}\n");
        assert!(message.contains("kind"));

        let (_, message) = rule_error("- {name: a, kind: hard, priority: high, params: {}}\n");
        assert!(message.contains("priority"));

        let (_, message) = rule_error("- just a string\n");
        assert!(message.contains("string"));
    }

    #[test]
    fn test_top_level_must_be_list() {
        assert!(matches!(
            parse_rules("name: a\n"),
            Err(ImportError::YamlParseError(_))
        ));
    }
}
