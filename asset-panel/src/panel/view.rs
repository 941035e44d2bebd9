//! Asset edit panel components

use asset_editor::{InputKind, ParentSelection};
use dioxus::prelude::*;
use dioxus_logger::tracing::warn;
use serde_json::Value;
use shared_types::Attribute;

use crate::host::{PanelHandle, RowHandle};

use super::logic::*;
use super::styles::PANEL_STYLES;

#[derive(Debug, Clone, Default, PartialEq)]
struct HeaderInfo {
    id: String,
    name: String,
    parent_id: Option<String>,
    path: String,
    public_read: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct MetaView {
    name: String,
    text: String,
    kind: InputKind,
    class: &'static str,
    valid: bool,
}

#[component]
pub fn AssetPanel(handle: PanelHandle) -> Element {
    let signals = handle.signals;
    let rows = signals.rows.read().clone();
    let validation = signals.validation.read().clone();
    let has_modifications = *signals.has_modifications.read();
    let error = signals.error.read().clone();
    let mut parent_input = use_signal(String::new);

    let header = handle
        .read(|panel| HeaderInfo {
            id: panel
                .live_asset()
                .map(|asset| asset.id.clone())
                .unwrap_or_default(),
            name: panel.current_name().unwrap_or_default().to_string(),
            parent_id: panel.current_parent_id().map(str::to_string),
            path: panel.current_path().join(" / "),
            public_read: panel.current_access_public_read(),
        })
        .unwrap_or_default();
    let summary = validation_summary(&validation);

    rsx! {
        style { {PANEL_STYLES} }
        div { class: "asset-panel",
            if let Some(message) = error {
                div { class: "asset-panel-error", "{message}" }
            }

            div { class: "asset-header",
                label { "Name" }
                input {
                    class: "attribute-input",
                    value: "{header.name}",
                    oninput: {
                        let handle = handle.clone();
                        move |e: FormEvent| {
                            handle.update(|panel| panel.set_name(e.value()));
                        }
                    },
                }

                label { "Public read" }
                input {
                    r#type: "checkbox",
                    checked: header.public_read,
                    onclick: {
                        let handle = handle.clone();
                        let public_read = header.public_read;
                        move |_| {
                            handle.update(|panel| panel.set_access_public_read(!public_read));
                        }
                    },
                }

                label { "Parent" }
                div {
                    span { class: "asset-path", "{header.path}" }
                    input {
                        class: "attribute-input",
                        placeholder: "New parent id",
                        value: "{parent_input}",
                        oninput: move |e: FormEvent| parent_input.set(e.value()),
                    }
                    button {
                        class: "panel-button",
                        disabled: parent_input().trim().is_empty(),
                        onclick: {
                            let handle = handle.clone();
                            let id = header.id.clone();
                            move |_| {
                                let parent_id = parent_input().trim().to_string();
                                let selection = ParentSelection {
                                    path: vec![parent_id.clone(), id.clone()],
                                    parent_id,
                                };
                                match handle.update(|panel| panel.set_parent(Some(selection))) {
                                    Some(Err(e)) => warn!("Move failed: {e}"),
                                    _ => parent_input.set(String::new()),
                                }
                            }
                        },
                        "Move"
                    }
                    button {
                        class: "panel-button",
                        disabled: header.parent_id.is_none(),
                        onclick: {
                            let handle = handle.clone();
                            move |_| {
                                if let Some(Err(e)) = handle.update(|panel| panel.clear_parent()) {
                                    warn!("Detach failed: {e}");
                                }
                            }
                        },
                        "Detach"
                    }
                }
            }

            table { class: "attribute-table",
                tbody {
                    for row in rows {
                        AttributeRowView {
                            key: "{row.name}",
                            handle: handle.clone(),
                            row: row.clone(),
                        }
                    }
                }
            }

            AddAttributeForm { handle: handle.clone() }
            SaveBar { handle: handle.clone(), has_modifications, summary }
        }
    }
}

#[component]
fn AttributeRowView(handle: PanelHandle, row: RowHandle) -> Element {
    let name = row.name.clone();
    let mut input_error = use_signal(|| None::<String>);

    let kind = row.input.kind;
    let text = kind.format(row.display_value.as_ref());
    let checked = row
        .display_value
        .as_ref()
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let valid = row.input.validate(row.display_value.as_ref()) && input_error().is_none();
    let input_class = if valid {
        "attribute-input"
    } else {
        "attribute-input invalid"
    };
    let readonly = row.readonly;
    let notice = row.conflict_notice();
    let available = handle
        .read(|panel| panel.available_meta_items(&name))
        .unwrap_or_default();
    let meta_views: Vec<MetaView> = row
        .meta
        .iter()
        .map(|meta| MetaView {
            name: meta.name.clone(),
            text: meta.input.kind.format(meta.display_value.as_ref()),
            kind: meta.input.kind,
            class: match (meta.user_modified, meta.has_descriptor) {
                (true, _) => "meta-item user-modified",
                (false, false) => "meta-item no-descriptor",
                (false, true) => "meta-item",
            },
            valid: meta.input.validate(meta.display_value.as_ref()),
        })
        .collect();

    let on_focus = {
        let handle = handle.clone();
        let name = name.clone();
        move |_: FocusEvent| {
            handle.update(|panel| panel.on_focus(&name));
        }
    };
    let on_blur = {
        let handle = handle.clone();
        let name = name.clone();
        move |_: FocusEvent| {
            input_error.set(None);
            handle.update(|panel| panel.on_blur(&name));
        }
    };
    let on_input = {
        let handle = handle.clone();
        let name = name.clone();
        move |e: FormEvent| match handle.update(|panel| panel.on_input_text(&name, &e.value())) {
            Some(Err(err)) => input_error.set(Some(err.to_string())),
            _ => input_error.set(None),
        }
    };

    rsx! {
        tr { class: row_class(&row),
            td {
                div { class: "attribute-name", "{row.name}" }
                div { class: "attribute-type", "{row.value_type}" }
            }
            td {
                match kind {
                    InputKind::Checkbox => rsx! {
                        input {
                            r#type: "checkbox",
                            checked,
                            disabled: readonly,
                            onclick: {
                                let handle = handle.clone();
                                let name = name.clone();
                                move |_| {
                                    handle.update(|panel| {
                                        panel.on_value_changed(&name, Value::Bool(!checked))
                                    });
                                }
                            },
                        }
                    },
                    InputKind::Json => rsx! {
                        textarea {
                            class: input_class,
                            rows: "3",
                            readonly,
                            value: "{text}",
                            onfocus: on_focus,
                            onblur: on_blur,
                            oninput: on_input,
                        }
                    },
                    InputKind::Number | InputKind::Integer | InputKind::Text => rsx! {
                        input {
                            class: input_class,
                            r#type: if kind == InputKind::Text { "text" } else { "number" },
                            readonly,
                            value: "{text}",
                            onfocus: on_focus,
                            onblur: on_blur,
                            oninput: on_input,
                        }
                    },
                }

                if let Some(message) = input_error() {
                    div { class: "conflict-notice", "{message}" }
                }

                if let Some(notice) = notice {
                    div { class: "conflict-notice",
                        span { "{notice}" }
                        button {
                            class: "panel-button",
                            onclick: {
                                let handle = handle.clone();
                                let name = name.clone();
                                move |_| {
                                    handle.update(|panel| panel.accept_server_value(&name));
                                }
                            },
                            "Accept"
                        }
                        button {
                            class: "panel-button",
                            onclick: {
                                let handle = handle.clone();
                                let name = name.clone();
                                move |_| {
                                    handle.update(|panel| panel.keep_user_value(&name));
                                }
                            },
                            "Keep mine"
                        }
                    }
                }

                div { class: "meta-items",
                    for meta in meta_views {
                        div { key: "{meta.name}", class: meta.class,
                            span { class: "meta-name", "{meta.name}" }
                            input {
                                class: if meta.valid { "attribute-input" } else { "attribute-input invalid" },
                                value: "{meta.text}",
                                onchange: {
                                    let handle = handle.clone();
                                    let name = name.clone();
                                    let meta_name = meta.name.clone();
                                    let kind = meta.kind;
                                    move |e: FormEvent| match meta_change_from_text(kind, &e.value()) {
                                        Ok(change) => {
                                            handle.update(|panel| {
                                                panel.on_meta_changed(&name, &meta_name, change)
                                            });
                                        }
                                        Err(err) => warn!("Ignoring meta input for {meta_name}: {err}"),
                                    }
                                },
                            }
                            button {
                                class: "panel-button",
                                onclick: {
                                    let handle = handle.clone();
                                    let name = name.clone();
                                    let meta_name = meta.name.clone();
                                    move |_| {
                                        handle.update(|panel| panel.remove_meta_item(&name, &meta_name));
                                    }
                                },
                                "Remove"
                            }
                        }
                    }

                    if !available.is_empty() {
                        select {
                            class: "attribute-input",
                            onchange: {
                                let handle = handle.clone();
                                let name = name.clone();
                                move |e: FormEvent| {
                                    let item = e.value();
                                    if !item.is_empty() {
                                        handle.update(|panel| panel.add_meta_items(&name, &[item]));
                                    }
                                }
                            },
                            option { value: "", "Add meta item" }
                            for item in available {
                                option { key: "{item}", value: "{item}", "{item}" }
                            }
                        }
                    }
                }
            }
            td {
                if row.can_delete {
                    button {
                        class: "panel-button",
                        onclick: {
                            let handle = handle.clone();
                            let name = name.clone();
                            move |_| {
                                if let Some(Err(e)) = handle.update(|panel| panel.delete_attribute(&name)) {
                                    warn!("Delete failed: {e}");
                                }
                            }
                        },
                        "Delete"
                    }
                }
            }
        }
    }
}

#[component]
fn AddAttributeForm(handle: PanelHandle) -> Element {
    let mut name = use_signal(String::new);
    let mut value_type = use_signal(|| VALUE_TYPES[0].to_string());
    let mut error = use_signal(|| None::<String>);

    rsx! {
        div { class: "add-attribute-form",
            input {
                class: "attribute-input",
                placeholder: "Attribute name",
                value: "{name}",
                oninput: move |e: FormEvent| {
                    name.set(e.value());
                    error.set(None);
                },
            }
            select {
                class: "attribute-input",
                value: "{value_type}",
                onchange: move |e: FormEvent| value_type.set(e.value()),
                for option_type in VALUE_TYPES.iter() {
                    option { key: "{option_type}", value: "{option_type}", "{option_type}" }
                }
            }
            button {
                class: "panel-button",
                disabled: name().trim().is_empty(),
                onclick: {
                    let handle = handle.clone();
                    move |_| {
                        let attribute = Attribute::new(name().trim(), value_type());
                        match handle.update(|panel| panel.add_attribute(attribute)) {
                            Some(Err(e)) => error.set(Some(e.to_string())),
                            _ => name.set(String::new()),
                        }
                    }
                },
                "Add"
            }
            if let Some(message) = error() {
                span { class: "conflict-notice", "{message}" }
            }
        }
    }
}

#[component]
fn SaveBar(handle: PanelHandle, has_modifications: bool, summary: String) -> Element {
    let mut preview = use_signal(|| None::<String>);

    rsx! {
        div { class: "save-bar",
            span { "{summary}" }
            div {
                button {
                    class: "panel-button",
                    disabled: !has_modifications,
                    onclick: {
                        let handle = handle.clone();
                        move |_| {
                            let mut has_modifications = handle.signals.has_modifications;
                            handle.update(|panel| panel.reset_edit_state());
                            has_modifications.set(false);
                            preview.set(None);
                        }
                    },
                    "Discard"
                }
                button {
                    class: "panel-button",
                    disabled: !has_modifications,
                    onclick: {
                        let handle = handle.clone();
                        move |_| match handle.read(|panel| panel.asset_to_save()) {
                            Some(Ok(asset)) => match serde_json::to_string_pretty(&asset) {
                                Ok(json) => preview.set(Some(json)),
                                Err(e) => warn!("Failed to serialize save payload: {e}"),
                            },
                            Some(Err(e)) => warn!("Nothing to save: {e}"),
                            None => {}
                        }
                    },
                    "Save"
                }
            }
        }
        if let Some(json) = preview() {
            pre { class: "save-preview", "{json}" }
        }
    }
}
