//! Shared types between the asset edit panel and the asset service
//!
//! These types are used by both:
//! - The edit-state core (native Rust, unit tested off-browser)
//! - The Dioxus panel (WASM)
//!
//! Serializable with serde for JSON over WebSocket/HTTP. Field names follow the
//! asset service's camelCase JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Attributes of an asset keyed by attribute name
pub type AttributeMap = BTreeMap<String, Attribute>;

/// Meta items of an attribute keyed by meta item name
pub type MetaMap = BTreeMap<String, serde_json::Value>;

// ============================================================================
// Asset Model
// ============================================================================

/// Asset - the server-owned entity edited by the panel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct Asset {
    pub id: String,

    #[serde(default)]
    pub version: i64,

    /// Creation time, epoch milliseconds on the wire
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    #[ts(type = "number | null")]
    pub created_on: Option<DateTime<Utc>>,

    pub name: String,

    #[serde(default)]
    pub access_public_read: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,

    /// Asset type name (e.g. "ThingAsset")
    #[serde(rename = "type")]
    pub asset_type: String,

    /// Ancestor ids from the root down to (and including) this asset
    #[serde(default)]
    pub path: Vec<String>,

    #[serde(default)]
    pub attributes: AttributeMap,
}

/// Named, typed value of an asset with its meta items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, TS)]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct Attribute {
    #[serde(default)]
    pub name: String,

    /// Value type name (e.g. "number", "text", "JSONObject")
    #[serde(rename = "type", default)]
    pub value_type: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[ts(type = "Record<string, unknown>")]
    pub meta: MetaMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub value: Option<serde_json::Value>,

    /// When the server observed `value`, epoch milliseconds on the wire
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    #[ts(type = "number | null")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_meta(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(name.into(), value);
        self
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Attribute descriptor declared by an asset type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct AttributeDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    /// Optional attributes may be removed from an asset
    #[serde(default)]
    pub optional: bool,
}

/// Meta item descriptor (e.g. "readOnly" of type "boolean")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct MetaItemDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

/// Value descriptor: maps a value type name onto its JSON representation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct ValueDescriptor {
    pub name: String,
    /// JSON type: "boolean", "number", "integer", "string", "object" or "array"
    pub json_type: String,
}

/// Descriptors available to one asset type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct AssetTypeInfo {
    pub asset_type: String,
    #[serde(default)]
    pub attribute_descriptors: Vec<AttributeDescriptor>,
    /// Names of the meta items that may be added to this type's attributes
    #[serde(default)]
    pub meta_item_descriptors: Vec<String>,
}

/// The asset model as served by the asset service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct AssetModelInfo {
    #[serde(default)]
    pub asset_types: Vec<AssetTypeInfo>,
    #[serde(default)]
    pub meta_item_descriptors: Vec<MetaItemDescriptor>,
    #[serde(default)]
    pub value_descriptors: Vec<ValueDescriptor>,
}

// ============================================================================
// Live Updates
// ============================================================================

/// Reference to a single attribute of an asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct AttributeRef {
    pub id: String,
    pub name: String,
}

/// Server push: an attribute of a live asset changed value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct AttributeEvent {
    #[serde(rename = "ref")]
    pub attribute_ref: AttributeRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub value: Option<serde_json::Value>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    #[ts(type = "number | null")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub old_value: Option<serde_json::Value>,
}

/// Panel push protocol
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub enum PanelMsg {
    /// Server → Panel: full snapshot of the edited asset
    AssetLoaded { asset: Asset },

    /// Server → Panel: a single attribute changed
    AttributeUpdated { event: AttributeEvent },

    /// Server → Panel: loading or subscribing failed
    Error { message: String },
}

// ============================================================================
// Validation
// ============================================================================

/// Validation outcome of one attribute (or one meta item of an attribute)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../asset-panel/src/types/generated.ts")]
pub struct ValidatorResult {
    pub name: String,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_results: Option<Vec<ValidatorResult>>,
}

// ============================================================================
// Constants
// ============================================================================

pub const META_MOMENTARY: &str = "momentary";
pub const META_FORMAT: &str = "format";
pub const META_FORMAT_AS_MOMENTARY: &str = "asMomentary";
pub const META_READ_ONLY: &str = "readOnly";
pub const META_LABEL: &str = "label";

pub const VALUE_TYPE_BOOLEAN: &str = "boolean";
pub const VALUE_TYPE_JSON: &str = "JSON";

// ============================================================================
// Tests
// ============================================================================
