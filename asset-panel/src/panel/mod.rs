//! Asset edit panel
//!
//! `use_asset_panel` owns the panel core for the lifetime of the calling
//! component; `AssetPanel` renders it.

mod logic;
mod styles;
mod view;

use asset_editor::{AssetModel, EditorConfig};
use dioxus::prelude::*;

use crate::host::{PanelHandle, PanelSignals};

pub use logic::{demo_push, validation_summary, VALUE_TYPES};
pub use view::AssetPanel;

/// Create the panel core once and wire its host to fresh signals.
pub fn use_asset_panel(model: impl FnOnce() -> AssetModel, config: EditorConfig) -> PanelHandle {
    let signals = PanelSignals {
        rows: use_signal(Vec::new),
        validation: use_signal(Vec::new),
        has_modifications: use_signal(|| false),
        error: use_signal(|| None),
    };
    use_hook(move || PanelHandle::new(model(), config, signals))
}
