pub mod host;
pub mod panel;

pub use host::{DioxusHost, Panel, PanelHandle, PanelSignals, RowHandle};
pub use panel::{use_asset_panel, AssetPanel};
