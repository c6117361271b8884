/// Configuration for the block operations engine
use serde::{Deserialize, Serialize};

/// Hard ceiling for a single Markdown import, regardless of configuration
const MAX_SUPPORTED_MARKDOWN_BYTES: usize = 10_000_000;

pub const ENV_WORKSPACE_ID: &str = "BLOCKDOC_WORKSPACE_ID";
pub const ENV_STRICT: &str = "BLOCKDOC_STRICT";
pub const ENV_MAX_MARKDOWN_BYTES: &str = "BLOCKDOC_MAX_MARKDOWN_BYTES";
pub const ENV_MAX_BLOCKS_PER_IMPORT: &str = "BLOCKDOC_MAX_BLOCKS_PER_IMPORT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Workspace used when a request does not name one
    pub default_workspace_id: Option<String>,

    /// Whether `append_block` validates fields strictly when the request is silent
    pub strict_by_default: bool,

    /// Largest Markdown input accepted by `append_markdown`, in bytes
    pub max_markdown_bytes: usize,

    /// Most blocks a single `append_markdown` call may create
    pub max_blocks_per_import: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_workspace_id: None,
            strict_by_default: true,
            max_markdown_bytes: 1_000_000,
            max_blocks_per_import: 1000,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `BLOCKDOC_*` environment variables
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(workspace) = lookup(ENV_WORKSPACE_ID).filter(|w| !w.trim().is_empty()) {
            config.default_workspace_id = Some(workspace.trim().to_string());
        }

        if let Some(raw) = lookup(ENV_STRICT) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.strict_by_default = true,
                "0" | "false" | "no" | "off" => config.strict_by_default = false,
                other => tracing::warn!("Ignoring {}={:?}: expected a boolean", ENV_STRICT, other),
            }
        }

        if let Some(bytes) = parse_usize(&lookup, ENV_MAX_MARKDOWN_BYTES) {
            config.max_markdown_bytes = bytes;
        }
        if let Some(blocks) = parse_usize(&lookup, ENV_MAX_BLOCKS_PER_IMPORT) {
            config.max_blocks_per_import = blocks;
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self
            .default_workspace_id
            .as_ref()
            .is_some_and(|w| w.trim().is_empty())
        {
            return Err("default_workspace_id cannot be blank".to_string());
        }

        if self.max_markdown_bytes == 0 {
            return Err("max_markdown_bytes must be greater than 0".to_string());
        }

        if self.max_markdown_bytes > MAX_SUPPORTED_MARKDOWN_BYTES {
            return Err(format!(
                "max_markdown_bytes cannot exceed {}",
                MAX_SUPPORTED_MARKDOWN_BYTES
            ));
        }

        if self.max_blocks_per_import == 0 {
            return Err("max_blocks_per_import must be greater than 0".to_string());
        }

        Ok(())
    }
}

fn parse_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: expected a non-negative integer", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.default_workspace_id.is_none());
        assert!(config.strict_by_default);
        assert_eq!(config.max_markdown_bytes, 1_000_000);
        assert_eq!(config.max_blocks_per_import, 1000);
    }

    #[test]
    fn test_lookup_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_WORKSPACE_ID, " ws-1 "),
            (ENV_STRICT, "false"),
            (ENV_MAX_MARKDOWN_BYTES, "2048"),
            (ENV_MAX_BLOCKS_PER_IMPORT, "10"),
        ]));
        assert_eq!(config.default_workspace_id.as_deref(), Some("ws-1"));
        assert!(!config.strict_by_default);
        assert_eq!(config.max_markdown_bytes, 2048);
        assert_eq!(config.max_blocks_per_import, 10);
    }

    #[test]
    fn test_unparseable_values_keep_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_WORKSPACE_ID, "  "),
            (ENV_STRICT, "maybe"),
            (ENV_MAX_MARKDOWN_BYTES, "-5"),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        assert!(config.validate().is_ok());

        config.max_markdown_bytes = 0;
        assert!(config.validate().is_err());

        config.max_markdown_bytes = MAX_SUPPORTED_MARKDOWN_BYTES + 1;
        assert!(config.validate().is_err());

        config.max_markdown_bytes = 1024;
        config.max_blocks_per_import = 0;
        assert!(config.validate().is_err());

        config.max_blocks_per_import = 1;
        config.default_workspace_id = Some(" ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: EngineConfig =
            serde_json::from_value(serde_json::json!({"strictByDefault": false})).unwrap();
        assert!(!config.strict_by_default);
        assert_eq!(config.max_blocks_per_import, 1000);
    }
}
