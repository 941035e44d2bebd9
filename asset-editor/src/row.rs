//! Render description of one attribute row.
//!
//! This is what the template cache stores. It carries everything the host
//! needs to draw the row without reaching back into the controller.

use serde_json::Value;
use shared_types::{
    Attribute, ValidatorResult, META_FORMAT, META_FORMAT_AS_MOMENTARY, META_MOMENTARY,
    META_READ_ONLY,
};
use tracing::debug;

use crate::descriptors::AssetModel;
use crate::edit_state::{EditState, MetaChange};
use crate::inputs::{InputProvider, InputRegistry};
use crate::template::compare_names;
use crate::value::format_value;

/// Visual status of a row, mirrored as CSS classes by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowStatus {
    /// Pending user value or meta edit
    pub user_modified: bool,
    pub has_conflict: bool,
    /// Update flash, never shown together with a conflict
    pub server_updated: bool,
    pub newly_added: bool,
    /// User kept their value over a newer server value
    pub user_overrides: bool,
}

#[derive(Debug, Clone)]
pub struct MetaItemRow {
    pub name: String,
    pub display_value: Option<Value>,
    pub input: InputProvider,
    /// False when no meta item descriptor exists and the JSON fallback is used
    pub has_descriptor: bool,
    pub user_modified: bool,
}

impl MetaItemRow {
    pub fn validate(&self) -> ValidatorResult {
        ValidatorResult {
            name: self.name.clone(),
            valid: self.input.validate(self.display_value.as_ref()),
            meta_results: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttributeRow {
    pub name: String,
    pub value_type: String,
    /// Pending user value if any, else the server value
    pub display_value: Option<Value>,
    pub server_value: Option<Value>,
    pub input: InputProvider,
    pub readonly: bool,
    pub can_delete: bool,
    pub status: RowStatus,
    pub meta: Vec<MetaItemRow>,
}

impl AttributeRow {
    pub fn row_classes(&self) -> Vec<&'static str> {
        let mut classes = Vec::new();
        if self.status.user_modified {
            classes.push("user-modified");
        }
        if self.status.has_conflict {
            classes.push("has-conflict");
        }
        if self.status.server_updated {
            classes.push("server-updated");
        }
        if self.status.newly_added {
            classes.push("newly-added");
        }
        classes
    }

    /// Text shown next to the Accept / Keep mine actions
    pub fn conflict_notice(&self) -> Option<String> {
        self.status.has_conflict.then(|| {
            format!(
                "Server value changed to {}",
                format_value(self.server_value.as_ref())
            )
        })
    }

    pub fn validate(&self) -> ValidatorResult {
        let meta_results: Vec<ValidatorResult> =
            self.meta.iter().map(MetaItemRow::validate).collect();
        let valid = self.input.validate(self.display_value.as_ref())
            && meta_results.iter().all(|r| r.valid);
        ValidatorResult {
            name: self.name.clone(),
            valid,
            meta_results: (!meta_results.is_empty()).then_some(meta_results),
        }
    }
}

/// Everything known about one visible attribute at render time
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowSource<'a> {
    pub server: Option<&'a Attribute>,
    pub added: Option<&'a Attribute>,
    pub state: Option<&'a EditState>,
}

pub(crate) struct RowContext<'a> {
    pub model: &'a AssetModel,
    pub inputs: &'a InputRegistry,
    pub asset_type: &'a str,
}

pub(crate) fn is_momentary(attribute: &Attribute) -> bool {
    let flag = |v: Option<&Value>| v.and_then(Value::as_bool).unwrap_or(false);
    flag(attribute.meta.get(META_MOMENTARY))
        || flag(
            attribute
                .meta
                .get(META_FORMAT)
                .and_then(|format| format.get(META_FORMAT_AS_MOMENTARY)),
        )
}

fn is_read_only(attribute: &Attribute) -> bool {
    attribute.meta.get(META_READ_ONLY).and_then(Value::as_bool) == Some(true)
        || is_momentary(attribute)
}

pub(crate) fn build_attribute_row(
    ctx: &RowContext<'_>,
    name: &str,
    source: RowSource<'_>,
) -> AttributeRow {
    let base = source.added.or(source.server);
    let state = source.state;
    let value_type = base.map(|a| a.value_type.clone()).unwrap_or_default();
    let server_value = base.and_then(|a| a.value.clone());
    let display_value = state
        .and_then(EditState::pending_value)
        .cloned()
        .or_else(|| server_value.clone());

    let can_delete = source.added.is_some()
        || ctx
            .model
            .attribute_descriptor(ctx.asset_type, name)
            .map_or(true, |d| d.optional);

    let has_conflict = state.is_some_and(|s| s.has_conflict);
    let status = RowStatus {
        user_modified: state.is_some_and(EditState::is_user_modified),
        has_conflict,
        server_updated: state.is_some_and(|s| s.show_update_flash) && !has_conflict,
        newly_added: source.added.is_some(),
        user_overrides: state.is_some_and(|s| s.user_chose_to_keep) && !has_conflict,
    };

    AttributeRow {
        name: name.to_string(),
        input: ctx.inputs.resolve(&value_type, ctx.model),
        readonly: base.is_some_and(is_read_only),
        meta: build_meta_rows(ctx, name, base, state),
        value_type,
        display_value,
        server_value,
        can_delete,
        status,
    }
}

fn build_meta_rows(
    ctx: &RowContext<'_>,
    attribute_name: &str,
    base: Option<&Attribute>,
    state: Option<&EditState>,
) -> Vec<MetaItemRow> {
    let changes = state.and_then(|s| s.user_change.as_ref()).map(|c| &c.meta);

    let mut names: Vec<&String> = base
        .into_iter()
        .flat_map(|a| a.meta.keys())
        .chain(changes.into_iter().flat_map(|m| m.keys()))
        .collect();
    names.sort_by(|a, b| compare_names(a, b));
    names.dedup();

    names
        .into_iter()
        .filter_map(|meta_name| {
            let change = changes.and_then(|m| m.get(meta_name));
            if change.is_some_and(MetaChange::is_deleted) {
                return None;
            }
            let display_value = match change {
                Some(change) => change.display_value().cloned(),
                None => base.and_then(|a| a.meta.get(meta_name)).cloned(),
            };
            let descriptor = ctx.model.meta_item_descriptor(meta_name);
            let input = match descriptor {
                Some(d) => ctx.inputs.resolve(&d.value_type, ctx.model),
                None => {
                    debug!(
                        attribute = %attribute_name,
                        meta_item = %meta_name,
                        "No meta item descriptor, using JSON input"
                    );
                    InputRegistry::fallback()
                }
            };
            Some(MetaItemRow {
                name: meta_name.clone(),
                display_value,
                input,
                has_descriptor: descriptor.is_some(),
                user_modified: change.is_some(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::InputKind;
    use serde_json::json;
    use shared_types::{
        AssetModelInfo, AssetTypeInfo, AttributeDescriptor, MetaItemDescriptor,
    };

    fn model() -> AssetModel {
        AssetModel::from_info(AssetModelInfo {
            asset_types: vec![AssetTypeInfo {
                asset_type: "ThingAsset".to_string(),
                attribute_descriptors: vec![
                    AttributeDescriptor {
                        name: "power".to_string(),
                        value_type: "number".to_string(),
                        optional: false,
                    },
                    AttributeDescriptor {
                        name: "notes".to_string(),
                        value_type: "text".to_string(),
                        optional: true,
                    },
                ],
                meta_item_descriptors: vec![],
            }],
            meta_item_descriptors: vec![MetaItemDescriptor {
                name: "readOnly".to_string(),
                value_type: "boolean".to_string(),
            }],
            value_descriptors: vec![],
        })
    }

    fn build(name: &str, source: RowSource<'_>) -> AttributeRow {
        let model = model();
        let inputs = InputRegistry::standard();
        let ctx = RowContext {
            model: &model,
            inputs: &inputs,
            asset_type: "ThingAsset",
        };
        build_attribute_row(&ctx, name, source)
    }

    fn source<'a>(server: Option<&'a Attribute>, state: Option<&'a EditState>) -> RowSource<'a> {
        RowSource {
            server,
            added: None,
            state,
        }
    }

    #[test]
    fn idle_row_shows_server_value() {
        let power = Attribute::new("power", "number").with_value(json!(10));
        let row = build("power", source(Some(&power), None));
        assert_eq!(row.display_value, Some(json!(10)));
        assert_eq!(row.input.kind, InputKind::Number);
        assert!(!row.can_delete);
        assert!(row.row_classes().is_empty());
        assert_eq!(row.conflict_notice(), None);
    }

    #[test]
    fn conflict_row_shows_user_value_and_notice() {
        let power = Attribute::new("power", "number").with_value(json!(20));
        let mut state = EditState::default();
        crate::conflict::set_user_value(&mut state, json!(15));
        state.has_conflict = true;
        state.show_update_flash = true;

        let row = build("power", source(Some(&power), Some(&state)));
        assert_eq!(row.display_value, Some(json!(15)));
        assert_eq!(row.server_value, Some(json!(20)));
        assert_eq!(row.row_classes(), vec!["user-modified", "has-conflict"]);
        assert_eq!(
            row.conflict_notice().as_deref(),
            Some("Server value changed to 20")
        );
    }

    #[test]
    fn kept_value_shows_override_notice() {
        let power = Attribute::new("power", "number").with_value(json!(25));
        let mut state = EditState::default();
        crate::conflict::set_user_value(&mut state, json!(15));
        crate::conflict::resolve_server_update(&mut state);
        crate::conflict::keep_user_value(&mut state);
        let row = build("power", source(Some(&power), Some(&state)));
        assert!(row.status.user_overrides);
        assert!(!row.status.has_conflict);
    }

    #[test]
    fn momentary_attributes_are_read_only() {
        let button = Attribute::new("trigger", "boolean").with_meta("momentary", json!(true));
        assert!(build("trigger", source(Some(&button), None)).readonly);

        let formatted = Attribute::new("trigger", "boolean")
            .with_meta("format", json!({"asMomentary": true}));
        assert!(build("trigger", source(Some(&formatted), None)).readonly);

        let plain = Attribute::new("trigger", "boolean");
        assert!(!build("trigger", source(Some(&plain), None)).readonly);
    }

    #[test]
    fn meta_rows_layer_user_changes() {
        let power = Attribute::new("power", "number")
            .with_value(json!(10))
            .with_meta("readOnly", json!(false))
            .with_meta("label", json!("Power"))
            .with_meta("units", json!(["W"]));
        let mut state = EditState::default();
        let change = state.change_mut();
        change
            .meta
            .insert("label".to_string(), MetaChange::Set(json!("Output")));
        change.meta.insert("units".to_string(), MetaChange::Deleted);
        change.meta.insert("Agent".to_string(), MetaChange::Unset);

        let row = build("power", source(Some(&power), Some(&state)));
        let names: Vec<&str> = row.meta.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Agent", "label", "readOnly"]);

        assert_eq!(row.meta[0].display_value, None);
        assert!(row.meta[0].user_modified);
        assert_eq!(row.meta[1].display_value, Some(json!("Output")));
        assert!(!row.meta[1].has_descriptor);
        assert_eq!(row.meta[1].input.kind, InputKind::Json);
        assert!(row.meta[2].has_descriptor);
        assert_eq!(row.meta[2].input.kind, InputKind::Checkbox);
    }

    #[test]
    fn added_attributes_are_deletable_and_flagged() {
        let extra = Attribute::new("extra", "text").with_value(json!("hi"));
        let row = build(
            "extra",
            RowSource {
                server: None,
                added: Some(&extra),
                state: None,
            },
        );
        assert!(row.can_delete);
        assert_eq!(row.row_classes(), vec!["newly-added"]);
        assert_eq!(row.display_value, Some(json!("hi")));
    }

    #[test]
    fn undescribed_and_optional_attributes_are_deletable() {
        let notes = Attribute::new("notes", "text");
        assert!(build("notes", source(Some(&notes), None)).can_delete);
        let custom = Attribute::new("custom", "JSON");
        assert!(build("custom", source(Some(&custom), None)).can_delete);
    }

    #[test]
    fn validation_covers_meta_items() {
        let power = Attribute::new("power", "number")
            .with_value(json!("not a number"))
            .with_meta("readOnly", json!(true));
        let result = build("power", source(Some(&power), None)).validate();
        assert!(!result.valid);
        assert_eq!(result.meta_results.as_ref().map(Vec::len), Some(1));

        let fine = Attribute::new("power", "number").with_value(json!(1));
        let result = build("power", source(Some(&fine), None)).validate();
        assert!(result.valid);
        assert_eq!(result.meta_results, None);
    }
}
