use std::time::Duration;

/// Presentation tuning for the edit panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// How long a field keeps its "server updated" flash after a push
    pub flash_duration: Duration,
    /// Batching window for re-renders. `None` coalesces into the next animation frame.
    pub render_delay: Option<Duration>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            flash_duration: Duration::from_millis(DEFAULT_FLASH_MS),
            render_delay: None,
        }
    }
}

const DEFAULT_FLASH_MS: u64 = 800;

impl EditorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (environment, query string, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let flash_ms = lookup_parse(&lookup, "ASSET_EDITOR_FLASH_MS", DEFAULT_FLASH_MS)?;
        let render_delay_ms = lookup_parse(&lookup, "ASSET_EDITOR_RENDER_DELAY_MS", 0u64)?;

        Ok(Self {
            flash_duration: Duration::from_millis(flash_ms),
            render_delay: (render_delay_ms > 0).then(|| Duration::from_millis(render_delay_ms)),
        })
    }
}

fn lookup_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {key}={val}: {e}")),
        None => Ok(default),
    }
}
