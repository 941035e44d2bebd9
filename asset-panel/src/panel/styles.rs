pub const PANEL_STYLES: &str = r#"
/* ── Panel shell ── */
.asset-panel {
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
    padding: 1rem;
    font-family: system-ui, sans-serif;
    font-size: 0.85rem;
    color: #e2e8f0;
    background: #0f172a;
}

.asset-panel-error {
    background: #450a0a;
    border: 1px solid #b91c1c;
    border-radius: 0.4rem;
    padding: 0.5rem 0.75rem;
    color: #fecaca;
}

.asset-header {
    display: grid;
    grid-template-columns: 8rem 1fr;
    gap: 0.4rem 0.75rem;
    align-items: center;
}

.asset-path {
    color: #94a3b8;
    font-family: ui-monospace, monospace;
}

/* ── Attribute table ── */
.attribute-table {
    width: 100%;
    border-collapse: collapse;
}

.attribute-row > td {
    padding: 0.35rem 0.5rem;
    border-bottom: 1px solid #1e293b;
    vertical-align: top;
    transition: background 0.3s ease;
}

.attribute-row.user-modified > td {
    background: #1e3a5f;
}

.attribute-row.has-conflict > td {
    background: #4a2511;
}

.attribute-row.server-updated > td {
    background: #14532d;
}

.attribute-row.newly-added .attribute-name::after {
    content: " (new)";
    color: #a5b4fc;
}

.attribute-row.user-overrides .attribute-name::after {
    content: " (kept)";
    color: #fcd34d;
}

.attribute-name {
    font-weight: 600;
    white-space: nowrap;
}

.attribute-type {
    color: #64748b;
    font-size: 0.72rem;
}

.attribute-input {
    width: 100%;
    background: #0b1220;
    border: 1px solid #334155;
    border-radius: 0.3rem;
    color: inherit;
    padding: 0.25rem 0.4rem;
}

.attribute-input.invalid {
    border-color: #ef4444;
}

.conflict-notice {
    display: flex;
    gap: 0.5rem;
    align-items: center;
    margin-top: 0.3rem;
    color: #fdba74;
}

/* ── Meta items ── */
.meta-items {
    margin: 0.35rem 0 0 0.75rem;
    display: flex;
    flex-direction: column;
    gap: 0.25rem;
}

.meta-item {
    display: grid;
    grid-template-columns: 9rem 1fr auto;
    gap: 0.4rem;
    align-items: center;
}

.meta-item.user-modified .meta-name {
    color: #93c5fd;
}

.meta-item.no-descriptor .meta-name {
    font-style: italic;
}

/* ── Buttons and footer ── */
.panel-button {
    background: #13213d;
    border: 1px solid #2f4f7a;
    color: #dbeafe;
    border-radius: 0.4rem;
    padding: 0.25rem 0.55rem;
    font-size: 0.75rem;
    cursor: pointer;
}

.panel-button:disabled {
    opacity: 0.45;
    cursor: default;
}

.add-attribute-form {
    display: flex;
    gap: 0.5rem;
    align-items: center;
}

.save-bar {
    display: flex;
    justify-content: space-between;
    align-items: center;
    border-top: 1px solid #1e293b;
    padding-top: 0.6rem;
}

.save-preview {
    max-height: 18rem;
    overflow: auto;
    background: #020617;
    border-radius: 0.4rem;
    padding: 0.6rem;
    font-family: ui-monospace, monospace;
    font-size: 0.72rem;
}
"#;
