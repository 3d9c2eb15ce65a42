//! Service configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Origin used to build share links, without a trailing slash.
    pub public_base_url: String,
    pub flush_interval_ms: u64,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATA_DIR`: directory holding the stored documents, default `data`
    /// - `PUBLIC_BASE_URL`: default `http://localhost:{PORT}`
    /// - `FLUSH_INTERVAL_MS`: persistence flush period, default 500
    ///
    /// Unparseable numbers fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let port = env_parse("PORT", DEFAULT_PORT);
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|raw| raw.trim().trim_end_matches('/').to_owned())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let flush_interval_ms = env_parse("FLUSH_INTERVAL_MS", DEFAULT_FLUSH_INTERVAL_MS).max(1);

        Self { port, data_dir, public_base_url, flush_interval_ms }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
