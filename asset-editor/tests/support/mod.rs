//! Shared fixtures for the asset-editor integration tests: a host that records
//! every request the panel makes, and a small pump asset to edit.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use asset_editor::{AssetEditPanel, AssetModel, AttributeRow, EditorConfig, PanelHost, TimerId};
use serde_json::{json, Value};
use shared_types::{Asset, Attribute, AttributeEvent, AttributeRef, ValidatorResult};

pub const ASSET_ID: &str = "pump1";

#[derive(Default)]
pub struct RecordingHost {
    pub frames: Cell<usize>,
    pub started: RefCell<Vec<(TimerId, Duration)>>,
    pub cancelled: RefCell<Vec<TimerId>>,
    pub repaints: RefCell<Vec<Vec<Rc<AttributeRow>>>>,
    pub modified: RefCell<Vec<Vec<ValidatorResult>>>,
    pub errors: RefCell<Vec<String>>,
}

impl PanelHost for RecordingHost {
    fn request_frame(&self) {
        self.frames.set(self.frames.get() + 1);
    }

    fn start_timer(&self, id: TimerId, delay: Duration) {
        self.started.borrow_mut().push((id, delay));
    }

    fn cancel_timer(&self, id: TimerId) {
        self.cancelled.borrow_mut().push(id);
    }

    fn repaint(&self, rows: &[Rc<AttributeRow>]) {
        self.repaints.borrow_mut().push(rows.to_vec());
    }

    fn modified(&self, results: &[ValidatorResult]) {
        self.modified.borrow_mut().push(results.to_vec());
    }

    fn load_failed(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

impl RecordingHost {
    pub fn modified_count(&self) -> usize {
        self.modified.borrow().len()
    }

    pub fn repaint_count(&self) -> usize {
        self.repaints.borrow().len()
    }

    pub fn last_repaint(&self) -> Vec<Rc<AttributeRow>> {
        self.repaints.borrow().last().cloned().unwrap_or_default()
    }

    pub fn last_modified(&self) -> Vec<ValidatorResult> {
        self.modified.borrow().last().cloned().unwrap_or_default()
    }

    /// Timers started and not cancelled, oldest first
    pub fn live_timers(&self) -> Vec<TimerId> {
        let cancelled = self.cancelled.borrow();
        self.started
            .borrow()
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !cancelled.contains(id))
            .collect()
    }
}

pub type Panel = AssetEditPanel<RecordingHost>;

pub fn model() -> AssetModel {
    AssetModel::from_json(
        r#"{
            "assetTypes": [{
                "assetType": "ThingAsset",
                "attributeDescriptors": [
                    {"name": "power", "type": "number", "optional": false},
                    {"name": "notes", "type": "text", "optional": true},
                    {"name": "location", "type": "GEO_JSONPoint", "optional": false}
                ],
                "metaItemDescriptors": ["label", "readOnly", "storeDataPoints", "units"]
            }],
            "metaItemDescriptors": [
                {"name": "label", "type": "text"},
                {"name": "readOnly", "type": "boolean"},
                {"name": "storeDataPoints", "type": "boolean"},
                {"name": "units", "type": "JSON"}
            ],
            "valueDescriptors": [
                {"name": "GEO_JSONPoint", "jsonType": "object"}
            ]
        }"#,
    )
    .expect("fixture model parses")
}

pub fn pump_asset() -> Asset {
    let mut asset = Asset {
        id: ASSET_ID.to_string(),
        version: 3,
        name: "Pump 1".to_string(),
        access_public_read: false,
        parent_id: Some("site".to_string()),
        asset_type: "ThingAsset".to_string(),
        path: vec!["site".to_string(), ASSET_ID.to_string()],
        ..Default::default()
    };
    let attributes = [
        Attribute::new("power", "number")
            .with_value(json!(10))
            .with_meta("label", json!("Power")),
        Attribute::new("notes", "text").with_value(json!("checked")),
        Attribute::new("location", "GEO_JSONPoint")
            .with_value(json!({"type": "Point", "coordinates": [4.9, 52.3]})),
        Attribute::new("Alarm", "boolean").with_value(json!(false)),
        Attribute::new("manufacturer", "text"),
    ];
    for mut attribute in attributes {
        attribute.timestamp = chrono::DateTime::from_timestamp_millis(1_700_000_000_000);
        asset.attributes.insert(attribute.name.clone(), attribute);
    }
    asset
}

/// Panel with the pump loaded and the initial frame painted
pub fn panel() -> Panel {
    panel_with_config(EditorConfig::default())
}

pub fn panel_with_config(config: EditorConfig) -> Panel {
    let mut panel = AssetEditPanel::new(RecordingHost::default(), model(), config);
    panel.load_asset(pump_asset());
    panel.on_frame();
    panel
}

pub fn event(name: &str, value: Value) -> AttributeEvent {
    AttributeEvent {
        attribute_ref: AttributeRef {
            id: ASSET_ID.to_string(),
            name: name.to_string(),
        },
        value: Some(value),
        timestamp: chrono::DateTime::from_timestamp_millis(1_700_000_100_000),
        old_value: None,
    }
}

/// Server push of a new value for `name`
pub fn push(panel: &mut Panel, name: &str, value: Value) {
    panel
        .apply_attribute_event(&event(name, value))
        .expect("push applies");
}

/// Fire every timer that is still live
pub fn fire_timers(panel: &mut Panel) {
    let ids = panel.host().live_timers();
    for id in ids {
        panel.on_timer(id);
    }
    panel.host().started.borrow_mut().clear();
}

pub fn row(panel: &Panel, name: &str) -> Rc<AttributeRow> {
    panel
        .rows()
        .iter()
        .find(|row| row.name == name)
        .cloned()
        .unwrap_or_else(|| panic!("no row for {name}"))
}

pub fn row_names(panel: &Panel) -> Vec<String> {
    panel.rows().iter().map(|row| row.name.clone()).collect()
}
