use asset_editor::{AssetModel, EditorConfig};
use asset_panel::panel::demo_push;
use asset_panel::{use_asset_panel, AssetPanel, PanelHandle};
use chrono::DateTime;
use dioxus::launch;
use dioxus::prelude::*;
use dioxus_logger::tracing::{error, warn, Level};
use gloo_timers::future::TimeoutFuture;
use serde::Deserialize;
use shared_types::{Asset, AssetModelInfo, AttributeEvent, AttributeRef, PanelMsg};

const DEMO_FIXTURE: &str = include_str!("../assets/demo.json");
const DEMO_PUSH_INTERVAL_MS: u32 = 4_000;

#[derive(Debug, Clone, Deserialize)]
struct DemoFixture {
    model: AssetModelInfo,
    asset: Asset,
}

fn main() {
    // Initialize logging for WASM
    wasm_logger::init(wasm_logger::Config::default());
    dioxus_logger::init(Level::INFO).ok();

    launch(App);
}

#[component]
fn App() -> Element {
    let fixture = use_hook(load_fixture);
    let config = use_hook(editor_config);
    let handle = use_asset_panel(
        {
            let fixture = fixture.clone();
            move || {
                fixture
                    .map(|f| AssetModel::from_info(f.model))
                    .unwrap_or_default()
            }
        },
        config,
    );

    use_hook({
        let handle = handle.clone();
        move || {
            let msg = match fixture {
                Some(f) => PanelMsg::AssetLoaded { asset: f.asset },
                None => PanelMsg::Error {
                    message: "Demo asset could not be loaded".to_string(),
                },
            };
            handle.update(|panel| panel.apply_message(msg));
            spawn(demo_feed(handle))
        }
    });

    rsx! {
        AssetPanel { handle }
    }
}

fn load_fixture() -> Option<DemoFixture> {
    serde_json::from_str(DEMO_FIXTURE)
        .map_err(|e| error!("Invalid demo fixture: {e}"))
        .ok()
}

/// Tuning comes from the query string, e.g. `?ASSET_EDITOR_FLASH_MS=1500`
fn editor_config() -> EditorConfig {
    let search = web_sys::window()
        .and_then(|window| window.location().search().ok())
        .unwrap_or_default();
    let lookup = |key: &str| {
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    };
    EditorConfig::from_lookup(lookup).unwrap_or_else(|e| {
        warn!("Ignoring editor config: {e}");
        EditorConfig::default()
    })
}

/// Simulated server feed pushing attribute updates at a fixed interval
async fn demo_feed(handle: PanelHandle) {
    let mut tick = 0u64;
    loop {
        TimeoutFuture::new(DEMO_PUSH_INTERVAL_MS).await;
        let Some(asset_id) = handle
            .read(|panel| panel.live_asset().map(|asset| asset.id.clone()))
            .flatten()
        else {
            continue;
        };

        let (name, value) = demo_push(tick);
        tick += 1;
        let event = AttributeEvent {
            attribute_ref: AttributeRef {
                id: asset_id,
                name: name.to_string(),
            },
            value: Some(value),
            timestamp: DateTime::from_timestamp_millis(js_sys::Date::now() as i64),
            old_value: None,
        };
        if let Some(Err(e)) =
            handle.update(|panel| panel.apply_message(PanelMsg::AttributeUpdated { event }))
        {
            warn!("Demo push rejected: {e}");
        }
    }
}
