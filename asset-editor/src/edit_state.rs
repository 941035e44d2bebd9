//! Per-attribute edit state and the layered local changes.
//!
//! The server snapshot is never written by the panel. Everything the user does
//! lives here until the save payload is built.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use shared_types::{Asset, Attribute};

/// A user's change to one meta item of an attribute.
///
/// Meta items without an entry in [`UserChange::meta`] are unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaChange {
    /// The user set this value
    Set(Value),
    /// The user added the item but has not given it a value yet (saved as `null`)
    Unset,
    /// The user removed the item
    Deleted,
}

impl MetaChange {
    /// Value shown in the meta item input. `None` for unset or deleted items.
    pub fn display_value(&self) -> Option<&Value> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset | Self::Deleted => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// A user's pending change to an attribute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserChange {
    /// Present if the user overrode the value
    pub value: Option<Value>,
    pub meta: BTreeMap<String, MetaChange>,
    /// Attribute marked for removal on save
    pub deleted: bool,
}

impl UserChange {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.meta.is_empty() && !self.deleted
    }

    /// Layer this change onto an attribute that is about to be saved.
    pub(crate) fn apply_to(&self, attribute: &mut Attribute) {
        if let Some(value) = &self.value {
            attribute.value = Some(value.clone());
            // The server timestamp described the value we just replaced
            attribute.timestamp = None;
        }
        for (name, change) in &self.meta {
            match change {
                MetaChange::Set(value) => {
                    attribute.meta.insert(name.clone(), value.clone());
                }
                MetaChange::Unset => {
                    attribute.meta.insert(name.clone(), Value::Null);
                }
                MetaChange::Deleted => {
                    attribute.meta.remove(name);
                }
            }
        }
    }
}

/// Edit state of a single attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditState {
    pub user_change: Option<UserChange>,
    /// Server updated the value while the user had a pending value
    pub has_conflict: bool,
    /// User dismissed the conflict and keeps their value; suppresses further conflicts
    pub user_chose_to_keep: bool,
    /// Input has focus
    pub is_editing: bool,
    /// Transient "server updated" cue, cleared by the flash timer
    pub show_update_flash: bool,
    /// The pending value was captured from the server on focus and not typed over yet
    pub seeded_from_server: bool,
}

impl EditState {
    pub fn pending_value(&self) -> Option<&Value> {
        self.user_change.as_ref().and_then(|c| c.value.as_ref())
    }

    pub fn is_deleted(&self) -> bool {
        self.user_change.as_ref().is_some_and(|c| c.deleted)
    }

    pub fn meta_change(&self, name: &str) -> Option<&MetaChange> {
        self.user_change.as_ref().and_then(|c| c.meta.get(name))
    }

    /// Whether the row shows the "pending changes" marker. A value seeded on
    /// focus alone does not count.
    pub fn is_user_modified(&self) -> bool {
        self.user_change.as_ref().is_some_and(|c| {
            !c.deleted && (!c.meta.is_empty() || (c.value.is_some() && !self.seeded_from_server))
        })
    }

    pub(crate) fn change_mut(&mut self) -> &mut UserChange {
        self.user_change.get_or_insert_with(UserChange::default)
    }

    /// Drop the user change once nothing is left in it
    pub(crate) fn prune_change(&mut self) {
        if self.user_change.as_ref().is_some_and(UserChange::is_empty) {
            self.user_change = None;
        }
    }
}

/// Map from attribute name to its edit state.
///
/// Entries are created lazily on first interaction; `get` never invents one.
#[derive(Debug, Clone, Default)]
pub struct EditStateStore {
    states: HashMap<String, EditState>,
}

impl EditStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&EditState> {
        self.states.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut EditState> {
        self.states.get_mut(name)
    }

    pub fn set(&mut self, name: impl Into<String>, state: EditState) {
        self.states.insert(name.into(), state);
    }

    /// The state for `name`, created zero-valued on first write
    pub fn entry(&mut self, name: &str) -> &mut EditState {
        self.states.entry(name.to_string()).or_default()
    }

    pub fn remove(&mut self, name: &str) -> Option<EditState> {
        self.states.remove(name)
    }

    /// Forget everything; called when a different asset is loaded
    pub fn reset(&mut self) {
        self.states.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EditState)> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Any attribute with a pending user change
    pub fn has_user_changes(&self) -> bool {
        self.states.values().any(|s| s.user_change.is_some())
    }
}

/// Overrides of whole-asset properties. `Some` means "user set this".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetLevelChanges {
    /// `Some(None)` detaches the asset from its parent
    pub parent_id: Option<Option<String>>,
    pub path: Option<Vec<String>>,
    pub access_public_read: Option<bool>,
    pub name: Option<String>,
}

impl AssetLevelChanges {
    pub fn is_empty(&self) -> bool {
        self.parent_id.is_none()
            && self.path.is_none()
            && self.access_public_read.is_none()
            && self.name.is_none()
    }

    pub(crate) fn apply_to(&self, asset: &mut Asset) {
        if let Some(parent_id) = &self.parent_id {
            asset.parent_id = parent_id.clone();
        }
        if let Some(path) = &self.path {
            asset.path = path.clone();
        }
        if let Some(public_read) = self.access_public_read {
            asset.access_public_read = public_read;
        }
        if let Some(name) = &self.name {
            asset.name = name.clone();
        }
    }
}

/// Attributes added by the user that do not exist on the server yet
pub type AddedAttributes = BTreeMap<String, Attribute>;

/// True iff anything would be saved.
pub fn has_modifications(
    states: &EditStateStore,
    added: &AddedAttributes,
    asset_changes: &AssetLevelChanges,
) -> bool {
    states.has_user_changes() || !added.is_empty() || !asset_changes.is_empty()
}
