//! Input capabilities keyed by value type.
//!
//! A provider tells the host which input widget to draw for a value type and
//! how to validate what the user entered. Unknown types get the JSON input.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use crate::descriptors::AssetModel;
use crate::error::{EditError, Result};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static COLOUR_RGB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid colour regex"));

/// Widget family used to edit a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Checkbox,
    Number,
    Integer,
    Text,
    Json,
}

impl InputKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Checkbox => "checkbox",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    /// Parse the raw text of an input element into a value.
    ///
    /// Empty numeric and JSON inputs mean `null`.
    pub fn parse(self, raw: &str) -> Result<Value> {
        let trimmed = raw.trim();
        match self {
            Self::Checkbox => match trimmed {
                "true" | "on" => Ok(Value::Bool(true)),
                "false" | "off" | "" => Ok(Value::Bool(false)),
                other => Err(self.invalid(format!("'{other}' is not a boolean"))),
            },
            Self::Number => {
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Ok(Value::from(i));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| self.invalid(format!("'{trimmed}' is not a number")))
            }
            Self::Integer => {
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                trimmed
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|e| self.invalid(format!("'{trimmed}': {e}")))
            }
            Self::Text => Ok(Value::String(raw.to_string())),
            Self::Json => {
                if trimmed.is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(trimmed).map_err(|e| self.invalid(e.to_string()))
            }
        }
    }

    /// Text to put into an input element for `value`
    pub fn format(self, value: Option<&Value>) -> String {
        match (self, value) {
            (_, None | Some(Value::Null)) => String::new(),
            (Self::Checkbox, Some(v)) => (v.as_bool() == Some(true)).to_string(),
            (Self::Text, Some(Value::String(s))) => s.clone(),
            (_, Some(v)) => v.to_string(),
        }
    }

    fn invalid(self, reason: String) -> EditError {
        EditError::InvalidInput {
            kind: self.label(),
            reason,
        }
    }
}

pub type Validator = fn(Option<&Value>) -> bool;

/// Renderer + validator pair for one value type
#[derive(Debug, Clone, Copy)]
pub struct InputProvider {
    pub kind: InputKind,
    pub validator: Validator,
}

impl InputProvider {
    pub const fn new(kind: InputKind, validator: Validator) -> Self {
        Self { kind, validator }
    }

    pub fn validate(&self, value: Option<&Value>) -> bool {
        (self.validator)(value)
    }
}

fn is_null(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn any_value(_: Option<&Value>) -> bool {
    true
}

fn boolean(value: Option<&Value>) -> bool {
    is_null(value) || matches!(value, Some(Value::Bool(_)))
}

fn number(value: Option<&Value>) -> bool {
    is_null(value) || matches!(value, Some(Value::Number(_)))
}

fn positive_number(value: Option<&Value>) -> bool {
    is_null(value) || value.and_then(Value::as_f64).is_some_and(|n| n >= 0.0)
}

fn as_whole_number(value: &Value) -> Option<f64> {
    let n = value.as_f64()?;
    (n.fract() == 0.0).then_some(n)
}

fn integer(value: Option<&Value>) -> bool {
    is_null(value) || value.and_then(as_whole_number).is_some()
}

fn positive_integer(value: Option<&Value>) -> bool {
    is_null(value) || value.and_then(as_whole_number).is_some_and(|n| n >= 0.0)
}

fn text(value: Option<&Value>) -> bool {
    is_null(value) || matches!(value, Some(Value::String(_)))
}

fn email(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty() || EMAIL_RE.is_match(s),
        _ => false,
    }
}

fn colour_rgb(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => COLOUR_RGB_RE.is_match(s),
        _ => false,
    }
}

fn json_object(value: Option<&Value>) -> bool {
    is_null(value) || matches!(value, Some(Value::Object(_)))
}

fn json_array(value: Option<&Value>) -> bool {
    is_null(value) || matches!(value, Some(Value::Array(_)))
}

const FALLBACK: InputProvider = InputProvider::new(InputKind::Json, any_value);

/// Value type name → input provider
#[derive(Debug, Clone, Default)]
pub struct InputRegistry {
    providers: HashMap<String, InputProvider>,
}

impl InputRegistry {
    /// Empty registry: everything resolves through value descriptors or the fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the common value types pre-registered
    pub fn standard() -> Self {
        let mut registry = Self::new();
        let entries: [(&str, InputKind, Validator); 15] = [
            ("boolean", InputKind::Checkbox, boolean),
            ("number", InputKind::Number, number),
            ("bigNumber", InputKind::Number, number),
            ("positiveNumber", InputKind::Number, positive_number),
            ("integer", InputKind::Integer, integer),
            ("long", InputKind::Integer, integer),
            ("bigInteger", InputKind::Integer, integer),
            ("positiveInteger", InputKind::Integer, positive_integer),
            ("text", InputKind::Text, text),
            ("email", InputKind::Text, email),
            ("colourRGB", InputKind::Text, colour_rgb),
            ("JSON", InputKind::Json, any_value),
            ("JSONObject", InputKind::Json, json_object),
            ("JSONArray", InputKind::Json, json_array),
            ("GEO_JSONPoint", InputKind::Json, json_object),
        ];
        for (name, kind, validator) in entries {
            registry.register(name, InputProvider::new(kind, validator));
        }
        registry
    }

    pub fn register(&mut self, value_type: impl Into<String>, provider: InputProvider) {
        self.providers.insert(value_type.into(), provider);
    }

    /// Explicit registration, else the value descriptor's JSON type, else the
    /// JSON fallback.
    pub fn resolve(&self, value_type: &str, model: &AssetModel) -> InputProvider {
        if let Some(provider) = self.providers.get(value_type) {
            return *provider;
        }
        model
            .value_descriptor(value_type)
            .map(|d| Self::for_json_type(&d.json_type))
            .unwrap_or(FALLBACK)
    }

    pub fn fallback() -> InputProvider {
        FALLBACK
    }

    fn for_json_type(json_type: &str) -> InputProvider {
        match json_type {
            "boolean" => InputProvider::new(InputKind::Checkbox, boolean),
            "number" => InputProvider::new(InputKind::Number, number),
            "integer" => InputProvider::new(InputKind::Integer, integer),
            "string" => InputProvider::new(InputKind::Text, text),
            "object" => InputProvider::new(InputKind::Json, json_object),
            "array" => InputProvider::new(InputKind::Json, json_array),
            _ => FALLBACK,
        }
    }
}
