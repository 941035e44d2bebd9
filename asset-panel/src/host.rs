//! Browser host for the edit panel core.
//!
//! Frames come from `requestAnimationFrame` (or a fixed batching delay),
//! timers from `gloo-timers`, and repaints land in Dioxus signals that the
//! panel components read.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use asset_editor::{AssetEditPanel, AssetModel, AttributeRow, EditorConfig, PanelHost, TimerId};
use dioxus::prelude::*;
use dioxus_logger::tracing::{debug, warn};
use futures_util::future::{AbortHandle, Abortable};
use gloo_timers::future::TimeoutFuture;
use shared_types::ValidatorResult;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

pub type Panel = AssetEditPanel<DioxusHost>;

/// Cached row template; equal only to the very same template, so Dioxus skips
/// re-rendering rows the core did not regenerate.
#[derive(Clone)]
pub struct RowHandle(pub Rc<AttributeRow>);

impl PartialEq for RowHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for RowHandle {
    type Target = AttributeRow;

    fn deref(&self) -> &AttributeRow {
        &self.0
    }
}

/// Signals the host writes and the components read
#[derive(Clone, Copy)]
pub struct PanelSignals {
    pub rows: Signal<Vec<RowHandle>>,
    pub validation: Signal<Vec<ValidatorResult>>,
    pub has_modifications: Signal<bool>,
    pub error: Signal<Option<String>>,
}

pub struct DioxusHost {
    panel: RefCell<Weak<RefCell<Panel>>>,
    render_delay: Option<Duration>,
    signals: PanelSignals,
    timers: RefCell<HashMap<TimerId, AbortHandle>>,
}

impl DioxusHost {
    fn new(signals: PanelSignals, render_delay: Option<Duration>) -> Self {
        Self {
            panel: RefCell::new(Weak::new()),
            render_delay,
            signals,
            timers: RefCell::new(HashMap::new()),
        }
    }

    fn panel(&self) -> Weak<RefCell<Panel>> {
        self.panel.borrow().clone()
    }

    fn spawn_frame_after(&self, delay: Duration) {
        let panel = self.panel();
        wasm_bindgen_futures::spawn_local(async move {
            TimeoutFuture::new(millis(delay)).await;
            with_panel(&panel, Panel::on_frame);
        });
    }
}

fn millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

/// Run `f` on the panel if it is still alive and not already borrowed
fn with_panel(panel: &Weak<RefCell<Panel>>, f: impl FnOnce(&mut Panel)) {
    let Some(panel) = panel.upgrade() else {
        return;
    };
    match panel.try_borrow_mut() {
        Ok(mut panel) => f(&mut panel),
        Err(_) => warn!("Asset panel busy, dropping host callback"),
    };
}

impl PanelHost for DioxusHost {
    fn request_frame(&self) {
        if let Some(delay) = self.render_delay {
            self.spawn_frame_after(delay);
            return;
        }

        let Some(window) = web_sys::window() else {
            self.spawn_frame_after(Duration::ZERO);
            return;
        };
        let panel = self.panel();
        let callback = Closure::once_into_js(move || {
            with_panel(&panel, Panel::on_frame);
        });
        if window
            .request_animation_frame(callback.unchecked_ref())
            .is_err()
        {
            warn!("requestAnimationFrame failed, falling back to a timeout");
            self.spawn_frame_after(Duration::ZERO);
        }
    }

    fn start_timer(&self, id: TimerId, delay: Duration) {
        let (handle, registration) = AbortHandle::new_pair();
        self.timers.borrow_mut().insert(id, handle);

        let panel = self.panel();
        let sleep = Abortable::new(TimeoutFuture::new(millis(delay)), registration);
        wasm_bindgen_futures::spawn_local(async move {
            if sleep.await.is_err() {
                return;
            }
            with_panel(&panel, |panel| {
                panel.host().timers.borrow_mut().remove(&id);
                panel.on_timer(id);
            });
        });
    }

    fn cancel_timer(&self, id: TimerId) {
        if let Some(handle) = self.timers.borrow_mut().remove(&id) {
            handle.abort();
        }
    }

    fn repaint(&self, rows: &[Rc<AttributeRow>]) {
        debug!(rows = rows.len(), "Repainting asset panel");
        let mut signal = self.signals.rows;
        signal.set(rows.iter().cloned().map(RowHandle).collect());
    }

    fn modified(&self, results: &[ValidatorResult]) {
        let mut validation = self.signals.validation;
        validation.set(results.to_vec());

        // Called from inside a panel mutation, so read the flag once it finished
        let panel = self.panel();
        let mut has_modifications = self.signals.has_modifications;
        wasm_bindgen_futures::spawn_local(async move {
            if let Some(panel) = panel.upgrade() {
                if let Ok(panel) = panel.try_borrow() {
                    has_modifications.set(panel.has_modifications());
                }
            }
        });
    }

    fn load_failed(&self, message: &str) {
        let mut error = self.signals.error;
        error.set(Some(message.to_string()));
    }
}

/// Shared handle to the panel core, passed to the components as a prop
#[derive(Clone)]
pub struct PanelHandle {
    panel: Rc<RefCell<Panel>>,
    pub signals: PanelSignals,
}

impl PartialEq for PanelHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.panel, &other.panel)
    }
}

impl PanelHandle {
    pub fn new(model: AssetModel, config: EditorConfig, signals: PanelSignals) -> Self {
        let host = DioxusHost::new(signals, config.render_delay);
        let panel = Rc::new(RefCell::new(AssetEditPanel::new(host, model, config)));
        if let Ok(core) = panel.try_borrow() {
            *core.host().panel.borrow_mut() = Rc::downgrade(&panel);
        }
        Self { panel, signals }
    }

    /// Mutate the panel from an event handler
    pub fn update<R>(&self, f: impl FnOnce(&mut Panel) -> R) -> Option<R> {
        match self.panel.try_borrow_mut() {
            Ok(mut panel) => Some(f(&mut panel)),
            Err(_) => {
                warn!("Asset panel busy, ignoring event");
                None
            }
        }
    }

    /// Read the panel during render
    pub fn read<R>(&self, f: impl FnOnce(&Panel) -> R) -> Option<R> {
        self.panel.try_borrow().ok().map(|panel| f(&panel))
    }
}
