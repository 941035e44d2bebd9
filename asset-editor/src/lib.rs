//! Edit-state reconciliation core of the asset edit panel.
//!
//! Layers a user's in-progress edits over a server-owned asset that keeps
//! receiving live updates: per-attribute conflict detection, focus-aware
//! lock-in of values, a dirty-tracked template cache and the save-time merge.
//! Framework-free; a host (see the `asset-panel` crate) supplies timers,
//! frames and painting through [`PanelHost`].

pub mod config;
pub mod conflict;
pub mod controller;
pub mod descriptors;
pub mod edit_state;
pub mod error;
pub mod inputs;
pub mod merge;
pub mod row;
pub mod scheduler;
pub mod template;
pub mod value;

pub use config::EditorConfig;
pub use conflict::ServerUpdateOutcome;
pub use controller::{AssetEditPanel, ParentSelection};
pub use descriptors::AssetModel;
pub use edit_state::{
    AddedAttributes, AssetLevelChanges, EditState, EditStateStore, MetaChange, UserChange,
};
pub use error::{EditError, Result};
pub use inputs::{InputKind, InputProvider, InputRegistry};
pub use merge::build_save_payload;
pub use row::{AttributeRow, MetaItemRow, RowStatus};
pub use scheduler::{PanelHost, TimerId};
pub use template::{RenderStats, TemplateCache};
pub use value::{format_value, values_equal};
