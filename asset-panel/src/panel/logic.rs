//! Asset panel pure logic functions. No RSX, no signals.

use asset_editor::{AttributeRow, EditError, InputKind, MetaChange};
use serde_json::{json, Value};
use shared_types::ValidatorResult;

/// Value types offered by the "add attribute" form
pub const VALUE_TYPES: &[&str] = &[
    "text",
    "number",
    "integer",
    "positiveNumber",
    "positiveInteger",
    "boolean",
    "email",
    "colourRGB",
    "JSON",
    "JSONObject",
    "JSONArray",
    "GEO_JSONPoint",
];

pub fn row_class(row: &AttributeRow) -> String {
    let mut classes = vec!["attribute-row"];
    classes.extend(row.row_classes());
    if row.status.user_overrides {
        classes.push("user-overrides");
    }
    classes.join(" ")
}

/// Parse meta item input; clearing the field leaves the item without a value
pub fn meta_change_from_text(kind: InputKind, raw: &str) -> Result<MetaChange, EditError> {
    if raw.trim().is_empty() {
        return Ok(MetaChange::Unset);
    }
    kind.parse(raw).map(MetaChange::Set)
}

/// `power` or `power.label` for every failing attribute and meta item
pub fn invalid_fields(results: &[ValidatorResult]) -> Vec<String> {
    let mut fields = Vec::new();
    for result in results {
        let failing_meta: Vec<&ValidatorResult> = result
            .meta_results
            .iter()
            .flatten()
            .filter(|m| !m.valid)
            .collect();
        if failing_meta.is_empty() {
            if !result.valid {
                fields.push(result.name.clone());
            }
            continue;
        }
        for meta in failing_meta {
            fields.push(format!("{}.{}", result.name, meta.name));
        }
    }
    fields
}

pub fn validation_summary(results: &[ValidatorResult]) -> String {
    let invalid = invalid_fields(results);
    if invalid.is_empty() {
        return "All fields valid".to_string();
    }
    format!("{} invalid: {}", invalid.len(), invalid.join(", "))
}

/// Value pushed by the demo feed on its `tick`th update: power ramps, the
/// alarm toggles every third tick.
pub fn demo_push(tick: u64) -> (&'static str, Value) {
    if tick % 3 == 2 {
        ("Alarm", json!(tick % 2 == 0))
    } else {
        ("power", json!(10 + (tick % 7) * 5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, valid: bool, meta: Option<Vec<ValidatorResult>>) -> ValidatorResult {
        ValidatorResult {
            name: name.to_string(),
            valid,
            meta_results: meta,
        }
    }

    #[test]
    fn cleared_meta_input_is_unset() {
        assert_eq!(
            meta_change_from_text(InputKind::Text, "  ").unwrap(),
            MetaChange::Unset
        );
        assert_eq!(
            meta_change_from_text(InputKind::Number, "2.5").unwrap(),
            MetaChange::Set(json!(2.5))
        );
        assert!(meta_change_from_text(InputKind::Json, "{oops").is_err());
    }

    #[test]
    fn invalid_meta_items_are_named_individually() {
        let results = vec![
            result("notes", true, None),
            result(
                "power",
                false,
                Some(vec![result("label", true, None), result("units", false, None)]),
            ),
            result("email", false, None),
        ];
        assert_eq!(invalid_fields(&results), vec!["power.units", "email"]);
        assert_eq!(validation_summary(&results), "2 invalid: power.units, email");
        assert_eq!(validation_summary(&results[..1]), "All fields valid");
    }

    #[test]
    fn demo_feed_alternates_attributes() {
        assert_eq!(demo_push(0), ("power", json!(10)));
        assert_eq!(demo_push(1), ("power", json!(15)));
        assert_eq!(demo_push(2), ("Alarm", json!(true)));
        assert_eq!(demo_push(5).0, "Alarm");
    }
}
