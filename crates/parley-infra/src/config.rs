//! Gateway configuration file loader.
//!
//! Reads an optional TOML file and deserializes it into [`GatewayConfig`].
//! Falls back to defaults when the file is missing or malformed; CLI and
//! environment overrides are applied on top by the caller.

use std::path::Path;

use parley_types::config::GatewayConfig;

/// Load gateway configuration from `path`.
///
/// - If the file does not exist, returns [`GatewayConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_gateway_config(path: &Path) -> GatewayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return GatewayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return GatewayConfig::default();
        }
    };

    match toml::from_str::<GatewayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            GatewayConfig::default()
        }
    }
}

/// Split a newline-separated prompt list, dropping empty lines.
///
/// Environment variables carry prompt lists this way.
pub fn split_prompt_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
