//! The rule cascade.
//!
//! Starting from `baseStyle`, every rule is applied in array order. A rule
//! reads one feature property and looks it up in its `values` table, first
//! exactly, then case-insensitively. A match either overwrites a single style
//! property (`styleProperty`) or shallow-merges the whole override object.
//! Later rules overwrite earlier ones key by key; there is no conflict
//! detection.

use serde_json::{Map, Value};

use layer_common::{GeoFeature, StyleProps, StyleRule, VisualConfig};

/// The cascade output has the same shape as the base style.
pub type ResolvedStyle = StyleProps;

/// Resolve the style of one feature.
pub fn resolve_style(config: &VisualConfig, feature: &GeoFeature) -> ResolvedStyle {
    resolve_properties(config, &feature.properties)
}

/// Resolve a style from a bare property map.
pub fn resolve_properties(config: &VisualConfig, properties: &Map<String, Value>) -> ResolvedStyle {
    let mut style = config.base_style.clone().unwrap_or_default();

    for rule in &config.rules {
        if let Some(matched) = match_rule(rule, properties) {
            apply_override(&mut style, rule, matched);
        }
    }

    style
}

/// Find the override a rule selects for these properties, if any.
pub fn match_rule<'r>(rule: &'r StyleRule, properties: &Map<String, Value>) -> Option<&'r Value> {
    let key = properties.get(&rule.field).and_then(property_key)?;

    if let Some(exact) = rule.values.get(&key) {
        return Some(exact);
    }

    let folded = key.to_lowercase();
    rule.values
        .iter()
        .find(|(candidate, _)| candidate.to_lowercase() == folded)
        .map(|(_, value)| value)
}

/// The string form a property value is matched by.
///
/// Strings match as-is; booleans by their JSON rendering. Numbers render the
/// way the map client stringifies them, so an integral float such as `3.0`
/// keys as `"3"`. Null never matches.
pub fn property_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_key(n)),
        other => Some(other.to_string()),
    }
}

// Integral floats below 1e21 print without a fractional part; beyond that
// the client switches to exponent notation.
fn number_key(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}

/// The icon a layer's rules assign to `value` of `field`, if any.
///
/// Only rules on `field` take part, applied with the same cascade semantics
/// as [`resolve_properties`], so legends agree with the map.
pub fn configured_icon(config: &VisualConfig, field: &str, value: &str) -> Option<String> {
    let mut properties = Map::new();
    properties.insert(field.to_string(), Value::String(value.to_string()));

    let mut style = StyleProps::default();
    for rule in config.rules.iter().filter(|r| r.field == field) {
        if let Some(matched) = match_rule(rule, &properties) {
            apply_override(&mut style, rule, matched);
        }
    }
    style.icon_name
}

fn apply_override(style: &mut StyleProps, rule: &StyleRule, matched: &Value) {
    match (&rule.style_property, matched) {
        (Some(property), Value::Object(object)) => {
            if let Some(value) = object.get(property) {
                style.set_property(property, value);
            }
        }
        (Some(property), scalar) => style.set_property(property, scalar),
        (None, Value::Object(_)) => {
            // Malformed overrides are ignored rather than aborting the cascade
            if let Ok(props) = serde_json::from_value::<StyleProps>(matched.clone()) {
                style.merge(&props);
            }
        }
        (None, _) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn rule(value: Value) -> StyleRule {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numeric_property_matches_string_key() {
        let r = rule(json!({"field": "nivel", "values": {"3": {"color": "#f00"}}}));
        assert!(match_rule(&r, &props(json!({"nivel": 3}))).is_some());
        assert!(match_rule(&r, &props(json!({"nivel": 4}))).is_none());
    }

    #[test]
    fn test_integral_float_matches_integer_key() {
        let r = rule(json!({"field": "nivel", "values": {"3": {"color": "#f00"}}}));
        let parsed: Value = serde_json::from_str(r#"{"nivel": 3.0}"#).unwrap();
        assert!(match_rule(&r, &props(parsed)).is_some());

        let config: VisualConfig = serde_json::from_value(json!({
            "rules": [{"field": "nivel", "values": {"3": {"color": "#f00"}}}]
        }))
        .unwrap();
        let parsed: Value = serde_json::from_str(r#"{"nivel": 3.0}"#).unwrap();
        let style = resolve_properties(&config, &props(parsed));
        assert_eq!(style.color.as_deref(), Some("#f00"));
    }

    #[test]
    fn test_number_keys() {
        assert_eq!(property_key(&json!(3.0)).as_deref(), Some("3"));
        assert_eq!(property_key(&json!(-0.0)).as_deref(), Some("0"));
        assert_eq!(property_key(&json!(2.5)).as_deref(), Some("2.5"));
        assert_eq!(property_key(&json!(42)).as_deref(), Some("42"));
        assert_eq!(property_key(&json!(-7)).as_deref(), Some("-7"));
    }

    #[test]
    fn test_null_and_missing_skip() {
        let r = rule(json!({"field": "nivel", "values": {"null": {"color": "#f00"}}}));
        assert!(match_rule(&r, &props(json!({"nivel": null}))).is_none());
        assert!(match_rule(&r, &props(json!({}))).is_none());
    }

    #[test]
    fn test_exact_match_preferred_over_case_fold() {
        let r = rule(json!({"field": "tipo", "values": {
            "ALTA": {"color": "#000"},
            "alta": {"color": "#fff"}
        }}));
        let matched = match_rule(&r, &props(json!({"tipo": "alta"}))).unwrap();
        assert_eq!(matched["color"], "#fff");
    }

    #[test]
    fn test_style_property_with_scalar() {
        let config: VisualConfig = serde_json::from_value(json!({
            "baseStyle": {"color": "#3388ff", "weight": 2},
            "rules": [{"field": "risco", "styleProperty": "weight", "values": {"alto": 5}}]
        }))
        .unwrap();
        let style = resolve_properties(&config, &props(json!({"risco": "Alto"})));
        assert_eq!(style.weight, Some(5.0));
        assert_eq!(style.color.as_deref(), Some("#3388ff"));
    }

    #[test]
    fn test_style_property_bad_value_keeps_base() {
        let config: VisualConfig = serde_json::from_value(json!({
            "baseStyle": {"weight": 4},
            "rules": [{"field": "risco", "styleProperty": "weight", "values": {"alto": "thick"}}]
        }))
        .unwrap();
        let style = resolve_properties(&config, &props(json!({"risco": "alto"})));
        assert_eq!(style.weight, Some(4.0));
    }

    #[test]
    fn test_style_property_with_object_takes_member_only() {
        let config: VisualConfig = serde_json::from_value(json!({
            "rules": [{"field": "risco", "styleProperty": "color",
                       "values": {"alto": {"color": "#b91c1c", "weight": 9}}}]
        }))
        .unwrap();
        let style = resolve_properties(&config, &props(json!({"risco": "alto"})));
        assert_eq!(style.color.as_deref(), Some("#b91c1c"));
        assert_eq!(style.weight, None);
    }

    #[test]
    fn test_configured_icon_ignores_other_fields() {
        let config: VisualConfig = serde_json::from_value(json!({
            "baseStyle": {"iconName": "map-pin"},
            "rules": [
                {"field": "categoria", "values": {"Fiscalização": {"iconName": "shield"}}},
                {"field": "status", "values": {"Fiscalização": {"iconName": "flag"}}}
            ]
        }))
        .unwrap();
        assert_eq!(
            configured_icon(&config, "categoria", "fiscalização").as_deref(),
            Some("shield")
        );
        assert_eq!(configured_icon(&config, "categoria", "Outro"), None);
    }
}
