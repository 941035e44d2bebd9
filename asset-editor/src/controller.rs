//! Panel controller.
//!
//! Owns the live snapshot and the layered local changes, routes host events
//! (focus, blur, input, server push, clicks) through the conflict resolver and
//! batches re-renders through the host.

use std::collections::BTreeSet;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Asset, Attribute, AttributeEvent, PanelMsg, ValidatorResult, VALUE_TYPE_BOOLEAN};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::conflict::{self, ServerUpdateOutcome};
use crate::descriptors::AssetModel;
use crate::edit_state::{
    self, AddedAttributes, AssetLevelChanges, EditState, EditStateStore, MetaChange,
};
use crate::error::{EditError, Result};
use crate::inputs::InputRegistry;
use crate::merge::build_save_payload;
use crate::row::{build_attribute_row, AttributeRow, RowContext, RowSource};
use crate::scheduler::{FlashTimers, PanelHost, RenderBatch, TimerId};
use crate::template::{compare_names, RenderStats, TemplateCache};
use crate::value::values_equal;

static ATTRIBUTE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid attribute name regex"));

/// Result of the external parent picker dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSelection {
    pub parent_id: String,
    /// Path of the asset once moved under the new parent
    pub path: Vec<String>,
}

pub struct AssetEditPanel<H: PanelHost> {
    config: EditorConfig,
    host: H,
    model: AssetModel,
    inputs: InputRegistry,
    live: Option<Rc<Asset>>,
    states: EditStateStore,
    asset_changes: AssetLevelChanges,
    added: AddedAttributes,
    cache: TemplateCache<AttributeRow>,
    rows: Vec<Rc<AttributeRow>>,
    last_render: RenderStats,
    batch: RenderBatch,
    flash_timers: FlashTimers,
}

impl<H: PanelHost> AssetEditPanel<H> {
    pub fn new(host: H, model: AssetModel, config: EditorConfig) -> Self {
        Self {
            config,
            host,
            model,
            inputs: InputRegistry::standard(),
            live: None,
            states: EditStateStore::new(),
            asset_changes: AssetLevelChanges::default(),
            added: AddedAttributes::new(),
            cache: TemplateCache::new(),
            rows: Vec::new(),
            last_render: RenderStats::default(),
            batch: RenderBatch::default(),
            flash_timers: FlashTimers::default(),
        }
    }

    pub fn with_inputs(mut self, inputs: InputRegistry) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn model(&self) -> &AssetModel {
        &self.model
    }

    pub fn live_asset(&self) -> Option<&Rc<Asset>> {
        self.live.as_ref()
    }

    // ------------------------------------------------------------------
    // Snapshot and server push
    // ------------------------------------------------------------------

    /// Replace the server snapshot wholesale.
    ///
    /// A different asset id resets all edit state. For the same asset only the
    /// attributes whose server representation changed are re-rendered.
    pub fn load_asset(&mut self, asset: impl Into<Rc<Asset>>) {
        let asset = asset.into();
        let same_asset = self.live.as_ref().is_some_and(|live| live.id == asset.id);

        let mut value_changed = Vec::new();
        if same_asset {
            if let Some(previous) = self.live.take() {
                let changed: BTreeSet<&String> = previous
                    .attributes
                    .keys()
                    .chain(asset.attributes.keys())
                    .filter(|name| previous.attributes.get(*name) != asset.attributes.get(*name))
                    .collect();
                debug!(asset = %asset.id, changed = changed.len(), "Snapshot replaced");
                for name in changed {
                    self.cache.mark_dirty(name);
                    let before = previous.attributes.get(name).and_then(|a| a.value.as_ref());
                    let after = asset.attributes.get(name);
                    if after.is_some_and(|a| !values_equal(before, a.value.as_ref())) {
                        value_changed.push(name.clone());
                    }
                }
            }
        } else {
            info!(asset = %asset.id, asset_type = %asset.asset_type, "Loading asset");
            self.reset_edit_state();
        }

        self.live = Some(asset);
        // New server values are reconciled like pushes: flash or conflict
        for name in value_changed {
            self.attribute_updated(&name);
        }
        self.schedule_render();
    }

    /// Apply a pushed attribute value to the held snapshot, then reconcile it.
    ///
    /// The snapshot is copied on write if the host still shares it.
    pub fn apply_attribute_event(&mut self, event: &AttributeEvent) -> Result<()> {
        let live = self.live.as_mut().ok_or(EditError::NoAsset)?;
        let name = &event.attribute_ref.name;

        if event.attribute_ref.id != live.id {
            warn!(
                expected = %live.id,
                actual = %event.attribute_ref.id,
                "Attribute event for another asset"
            );
            return Err(EditError::AssetMismatch {
                expected: live.id.clone(),
                actual: event.attribute_ref.id.clone(),
            });
        }
        if !live.attributes.contains_key(name) {
            warn!(attribute = %name, "Attribute event for unknown attribute");
            return Err(EditError::UnknownAttribute(name.clone()));
        }

        let asset = Rc::make_mut(live);
        if let Some(attribute) = asset.attributes.get_mut(name) {
            attribute.value = event.value.clone();
            attribute.timestamp = event.timestamp;
        }

        self.attribute_updated(name);
        Ok(())
    }

    /// Dispatch one message of the push protocol
    pub fn apply_message(&mut self, msg: PanelMsg) -> Result<()> {
        match msg {
            PanelMsg::AssetLoaded { asset } => {
                self.load_asset(asset);
                Ok(())
            }
            PanelMsg::AttributeUpdated { event } => self.apply_attribute_event(&event),
            PanelMsg::Error { message } => {
                warn!(%message, "Asset service error");
                self.host.load_failed(&message);
                Ok(())
            }
        }
    }

    /// Server pushed a new value for `name`; the snapshot already holds it.
    pub fn attribute_updated(&mut self, name: &str) {
        let Some(live) = &self.live else {
            debug!(attribute = %name, "Push before an asset was loaded, ignoring");
            return;
        };
        if !live.attributes.contains_key(name) {
            debug!(attribute = %name, "Push for an attribute not in the snapshot, ignoring");
            return;
        }

        let outcome = conflict::resolve_server_update(self.states.entry(name));
        debug!(attribute = %name, ?outcome, "Server update reconciled");

        match outcome {
            ServerUpdateOutcome::Flash => {
                let (id, replaced) = self.flash_timers.start(name);
                if let Some(old) = replaced {
                    self.host.cancel_timer(old);
                }
                self.host.start_timer(id, self.config.flash_duration);
            }
            ServerUpdateOutcome::Conflict => {
                if let Some(id) = self.flash_timers.cancel(name) {
                    self.host.cancel_timer(id);
                }
            }
            ServerUpdateOutcome::ConflictSuppressed => {}
        }

        self.cache.mark_dirty(name);
        self.schedule_render();
    }

    // ------------------------------------------------------------------
    // Focus and input
    // ------------------------------------------------------------------

    pub fn on_focus(&mut self, name: &str) {
        if self.live.is_none() {
            return;
        }
        let server_value = self.server_value(name).cloned();
        conflict::begin_editing(self.states.entry(name), server_value.as_ref());
        debug!(attribute = %name, "Editing started");
    }

    pub fn on_blur(&mut self, name: &str) {
        let server_value = self.server_value(name).cloned();
        let Some(state) = self.states.get_mut(name) else {
            return;
        };
        let reverted = conflict::end_editing(state, server_value.as_ref());
        debug!(attribute = %name, reverted, "Editing finished");
        if reverted {
            self.cache.mark_dirty(name);
            self.notify_modified();
        }
    }

    /// The attribute's input produced a new value.
    ///
    /// A value equal to the server value is ignored unless it undoes an
    /// earlier diverging edit.
    pub fn on_value_changed(&mut self, name: &str, value: Value) {
        if self.live.is_none() {
            return;
        }
        let server_value = self.server_value(name).cloned();

        if values_equal(Some(&value), server_value.as_ref()) {
            let Some(state) = self.states.get_mut(name) else {
                return;
            };
            let diverging = state
                .pending_value()
                .is_some_and(|pending| !values_equal(Some(pending), server_value.as_ref()));
            if !diverging {
                return;
            }
            conflict::set_user_value(state, value);
            if !state.is_editing {
                conflict::end_editing(state, server_value.as_ref());
            }
        } else {
            conflict::set_user_value(self.states.entry(name), value);
        }

        self.cache.mark_dirty(name);
        self.notify_modified();
    }

    /// Parse raw input text with the attribute's input kind, then apply it
    pub fn on_input_text(&mut self, name: &str, raw: &str) -> Result<()> {
        let value_type = self
            .attribute(name)
            .map(|a| a.value_type.clone())
            .ok_or_else(|| EditError::UnknownAttribute(name.to_string()))?;
        let value = self.inputs.resolve(&value_type, &self.model).kind.parse(raw)?;
        self.on_value_changed(name, value);
        Ok(())
    }

    pub fn on_meta_changed(&mut self, name: &str, meta_name: &str, change: MetaChange) {
        self.states
            .entry(name)
            .change_mut()
            .meta
            .insert(meta_name.to_string(), change);
        self.cache.mark_dirty(name);
        self.notify_modified();
    }

    /// Remove a meta item. Items the user added themselves are simply dropped.
    pub fn remove_meta_item(&mut self, name: &str, meta_name: &str) {
        let on_server = self
            .attribute(name)
            .is_some_and(|a| a.meta.contains_key(meta_name));
        if on_server {
            self.on_meta_changed(name, meta_name, MetaChange::Deleted);
            return;
        }
        if let Some(state) = self.states.get_mut(name) {
            if let Some(change) = state.user_change.as_mut() {
                change.meta.remove(meta_name);
            }
            state.prune_change();
        }
        self.cache.mark_dirty(name);
        self.notify_modified();
    }

    /// Add meta items chosen in the meta item picker
    pub fn add_meta_items(&mut self, name: &str, meta_names: &[String]) {
        if meta_names.is_empty() {
            return;
        }
        let existing: Vec<String> = self
            .attribute(name)
            .map(|a| a.meta.keys().cloned().collect())
            .unwrap_or_default();

        let defaults: Vec<(String, MetaChange)> = meta_names
            .iter()
            .filter(|meta_name| !existing.contains(meta_name))
            .map(|meta_name| {
                let is_boolean = self
                    .model
                    .meta_item_descriptor(meta_name)
                    .is_some_and(|d| d.value_type == VALUE_TYPE_BOOLEAN);
                let default = if is_boolean {
                    MetaChange::Set(Value::Bool(true))
                } else {
                    MetaChange::Unset
                };
                (meta_name.clone(), default)
            })
            .collect();

        let change = self.states.entry(name).change_mut();
        change.meta.extend(defaults);
        self.states.entry(name).prune_change();
        self.cache.mark_dirty(name);
        self.notify_modified();
    }

    /// Meta items the asset type allows that the attribute does not have yet
    pub fn available_meta_items(&self, name: &str) -> Vec<String> {
        let Some(live) = &self.live else {
            return Vec::new();
        };
        let Some(attribute) = self.attribute(name) else {
            return Vec::new();
        };
        let state = self.states.get(name);
        self.model
            .meta_item_names(&live.asset_type)
            .into_iter()
            .filter(|meta_name| !attribute.meta.contains_key(meta_name))
            .filter(|meta_name| {
                state
                    .and_then(|s| s.meta_change(meta_name))
                    .map_or(true, MetaChange::is_deleted)
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Adding and deleting attributes
    // ------------------------------------------------------------------

    /// Precondition check for the add-attribute dialog
    pub fn check_new_attribute(&self, name: &str, value_type: &str) -> Result<()> {
        let live = self.live.as_ref().ok_or(EditError::NoAsset)?;
        if !ATTRIBUTE_NAME_RE.is_match(name) {
            return Err(EditError::InvalidAttributeName(name.to_string()));
        }
        if live.attributes.contains_key(name) || self.added.contains_key(name) {
            return Err(EditError::DuplicateAttribute(name.to_string()));
        }
        if value_type.trim().is_empty() {
            return Err(EditError::MissingAttributeType(name.to_string()));
        }
        Ok(())
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> Result<()> {
        self.check_new_attribute(&attribute.name, &attribute.value_type)?;
        let name = attribute.name.clone();
        info!(attribute = %name, value_type = %attribute.value_type, "Attribute added");

        self.states.remove(&name);
        self.added.insert(name.clone(), attribute);
        self.cache.mark_dirty(&name);
        self.notify_modified();
        Ok(())
    }

    pub fn can_delete_attribute(&self, name: &str) -> bool {
        if self.added.contains_key(name) {
            return true;
        }
        let Some(live) = &self.live else {
            return false;
        };
        if !live.attributes.contains_key(name) {
            return false;
        }
        self.model
            .attribute_descriptor(&live.asset_type, name)
            .map_or(true, |d| d.optional)
    }

    pub fn delete_attribute(&mut self, name: &str) -> Result<()> {
        if self.added.remove(name).is_some() {
            self.states.remove(name);
            if let Some(id) = self.flash_timers.cancel(name) {
                self.host.cancel_timer(id);
            }
        } else {
            let known = self
                .live
                .as_ref()
                .is_some_and(|live| live.attributes.contains_key(name));
            if !known {
                return Err(EditError::UnknownAttribute(name.to_string()));
            }
            if !self.can_delete_attribute(name) {
                return Err(EditError::NotDeletable(name.to_string()));
            }
            self.states.entry(name).change_mut().deleted = true;
        }

        debug!(attribute = %name, "Attribute deleted");
        self.cache.mark_dirty(name);
        self.notify_modified();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Conflict actions
    // ------------------------------------------------------------------

    /// Drop the pending change and show the server value. Repaints immediately.
    pub fn accept_server_value(&mut self, name: &str) {
        let Some(state) = self.states.get_mut(name) else {
            return;
        };
        conflict::accept_server_value(state);
        debug!(attribute = %name, "Server value accepted");

        self.cache.mark_dirty(name);
        self.render_now();
        let results = self.collect_validation();
        self.host.modified(&results);
    }

    /// Dismiss the conflict and keep the pending value. Ignored unless a
    /// conflict is showing.
    pub fn keep_user_value(&mut self, name: &str) {
        let Some(state) = self.states.get_mut(name) else {
            return;
        };
        if !conflict::keep_user_value(state) {
            debug!(attribute = %name, "No conflict to dismiss");
            return;
        }
        debug!(attribute = %name, "User value kept");

        self.cache.mark_dirty(name);
        self.schedule_render();
    }

    // ------------------------------------------------------------------
    // Asset level edits
    // ------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.asset_changes.name = Some(name.into());
        self.notify_modified();
    }

    pub fn set_access_public_read(&mut self, public_read: bool) {
        self.asset_changes.access_public_read = Some(public_read);
        self.notify_modified();
    }

    /// Apply the outcome of the parent picker; `None` means the dialog was cancelled
    pub fn set_parent(&mut self, selection: Option<ParentSelection>) -> Result<()> {
        let Some(selection) = selection else {
            return Ok(());
        };
        if self.live.is_none() {
            return Err(EditError::NoAsset);
        }
        if !self.is_valid_parent(&selection.parent_id) {
            return Err(EditError::InvalidParent(selection.parent_id));
        }
        self.asset_changes.parent_id = Some(Some(selection.parent_id));
        self.asset_changes.path = Some(selection.path);
        self.notify_modified();
        Ok(())
    }

    /// Detach the asset from its parent, making it a root asset
    pub fn clear_parent(&mut self) -> Result<()> {
        let id = self.live.as_ref().ok_or(EditError::NoAsset)?.id.clone();
        self.asset_changes.parent_id = Some(None);
        self.asset_changes.path = Some(vec![id]);
        self.notify_modified();
        Ok(())
    }

    pub fn is_valid_parent(&self, parent_id: &str) -> bool {
        self.live.as_ref().is_some_and(|live| live.id != parent_id)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.asset_changes
            .name
            .as_deref()
            .or_else(|| self.live.as_ref().map(|live| live.name.as_str()))
    }

    pub fn current_parent_id(&self) -> Option<&str> {
        match &self.asset_changes.parent_id {
            Some(parent_id) => parent_id.as_deref(),
            None => self.live.as_ref().and_then(|live| live.parent_id.as_deref()),
        }
    }

    pub fn current_path(&self) -> &[String] {
        match &self.asset_changes.path {
            Some(path) => path,
            None => self
                .live
                .as_ref()
                .map(|live| live.path.as_slice())
                .unwrap_or_default(),
        }
    }

    pub fn current_access_public_read(&self) -> bool {
        self.asset_changes
            .access_public_read
            .or_else(|| self.live.as_ref().map(|live| live.access_public_read))
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.added
            .get(name)
            .or_else(|| self.live.as_ref()?.attributes.get(name))
    }

    /// The value last confirmed by the server (or the definition of an added attribute)
    pub fn server_value(&self, name: &str) -> Option<&Value> {
        self.attribute(name)?.value.as_ref()
    }

    /// What the attribute's input shows: the pending value, else the server value
    pub fn display_value(&self, name: &str) -> Option<&Value> {
        self.states
            .get(name)
            .and_then(EditState::pending_value)
            .or_else(|| self.server_value(name))
    }

    pub fn edit_state(&self, name: &str) -> Option<&EditState> {
        self.states.get(name)
    }

    pub fn added_attributes(&self) -> &AddedAttributes {
        &self.added
    }

    pub fn asset_changes(&self) -> &AssetLevelChanges {
        &self.asset_changes
    }

    pub fn has_modifications(&self) -> bool {
        edit_state::has_modifications(&self.states, &self.added, &self.asset_changes)
    }

    /// The full asset to persist
    pub fn asset_to_save(&self) -> Result<Asset> {
        let live = self.live.as_ref().ok_or(EditError::NoAsset)?;
        let asset = build_save_payload(live, &self.asset_changes, &self.states, &self.added);
        info!(
            asset = %asset.id,
            attributes = asset.attributes.len(),
            "Save payload built"
        );
        Ok(asset)
    }

    /// Forget every local change and cancel pending timers
    pub fn reset_edit_state(&mut self) {
        for id in self.flash_timers.drain() {
            self.host.cancel_timer(id);
        }
        self.states.reset();
        self.asset_changes = AssetLevelChanges::default();
        self.added.clear();
        self.cache.clear();
        self.rows.clear();
        info!("Edit state reset");
        self.schedule_render();
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Host callback for a frame requested through [`PanelHost::request_frame`]
    pub fn on_frame(&mut self) {
        if !self.batch.take() {
            return;
        }
        self.refresh_rows();
        self.host.repaint(&self.rows);
    }

    /// Host callback for a timer started through [`PanelHost::start_timer`]
    pub fn on_timer(&mut self, id: TimerId) {
        let Some(name) = self.flash_timers.complete(id) else {
            debug!(?id, "Stale timer fired");
            return;
        };
        let Some(state) = self.states.get_mut(&name) else {
            return;
        };
        if state.show_update_flash {
            state.show_update_flash = false;
            self.cache.mark_dirty(&name);
            self.schedule_render();
        }
    }

    /// Render and repaint synchronously, bypassing the batch
    pub fn render_now(&mut self) {
        self.batch.take();
        self.refresh_rows();
        self.host.repaint(&self.rows);
    }

    /// Rows of the last render pass in display order
    pub fn rows(&self) -> &[Rc<AttributeRow>] {
        &self.rows
    }

    pub fn last_render(&self) -> RenderStats {
        self.last_render
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.cache.is_dirty(name)
    }

    pub fn cached_row(&self, name: &str) -> Option<&Rc<AttributeRow>> {
        self.cache.get(name)
    }

    pub fn render_pending(&self) -> bool {
        self.batch.is_pending()
    }

    /// Validation results of the visible rows
    pub fn validate(&mut self) -> Vec<ValidatorResult> {
        self.refresh_rows();
        self.collect_validation()
    }

    fn collect_validation(&self) -> Vec<ValidatorResult> {
        self.rows.iter().map(|row| row.validate()).collect()
    }

    fn schedule_render(&mut self) {
        if self.batch.arm() {
            self.host.request_frame();
        }
    }

    fn notify_modified(&mut self) {
        self.refresh_rows();
        let results = self.collect_validation();
        self.host.modified(&results);
        self.schedule_render();
    }

    /// Cached render pass over the visible attributes
    fn refresh_rows(&mut self) {
        let Some(live) = self.live.clone() else {
            self.cache.clear();
            self.rows.clear();
            return;
        };

        let states = &self.states;
        let added = &self.added;
        let mut visible: Vec<(String, RowSource<'_>)> = live
            .attributes
            .iter()
            .filter(|(name, _)| !added.contains_key(*name))
            .filter(|(name, _)| !states.get(name).is_some_and(EditState::is_deleted))
            .map(|(name, attribute)| {
                let source = RowSource {
                    server: Some(attribute),
                    added: None,
                    state: states.get(name),
                };
                (name.clone(), source)
            })
            .chain(added.iter().map(|(name, attribute)| {
                let source = RowSource {
                    server: None,
                    added: Some(attribute),
                    state: states.get(name),
                };
                (name.clone(), source)
            }))
            .collect();
        visible.sort_by(|a, b| compare_names(&a.0, &b.0));

        let ctx = RowContext {
            model: &self.model,
            inputs: &self.inputs,
            asset_type: &live.asset_type,
        };
        let (rows, stats) = self
            .cache
            .render_pass(&visible, |name, source| build_attribute_row(&ctx, name, *source));
        debug!(
            visible = stats.visible,
            regenerated = stats.regenerated,
            evicted = stats.evicted,
            "Render pass"
        );

        self.rows = rows;
        self.last_render = stats;
    }
}
