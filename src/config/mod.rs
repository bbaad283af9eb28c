use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Z-index given to the first dialog opened on an empty stack
pub const DEFAULT_FIRST_Z_INDEX: i32 = 10000;

/// Element id of the shared modal overlay
pub const DEFAULT_OVERLAY_ELEMENT_ID: &str = "DialogModalCoverDiv";

const CONFIG_FILE_NAME: &str = "dialogs.json";

/// Runtime configuration for a dialog context
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeConfig {
    /// Z-index of the first dialog on an empty stack
    pub first_z_index: i32,

    /// Element id used for the modal overlay
    pub overlay_element_id: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            first_z_index: DEFAULT_FIRST_Z_INDEX,
            overlay_element_id: DEFAULT_OVERLAY_ELEMENT_ID.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Initialize configuration from the default sources.
    ///
    /// Priority, lowest first: defaults, the first config file found, the
    /// environment.
    pub async fn init(explicit_path: Option<&Path>) -> Result<Self> {
        debug!("Initializing dialog runtime configuration");

        let mut config = Self::default();

        for path in Self::candidate_paths(explicit_path) {
            if path.exists() {
                config.merge_with(Self::load_from_file(&path).await?);
                break;
            }
        }

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    fn candidate_paths(explicit_path: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = explicit_path {
            paths.push(path.to_path_buf());
        }
        paths.push(PathBuf::from(".").join(CONFIG_FILE_NAME));
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("dialog-stack").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Load configuration from a JSON file
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading dialog configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load overrides from environment variables
    pub fn load_from_env(&mut self) {
        if let Ok(first_z) = std::env::var("DIALOG_FIRST_Z_INDEX") {
            if let Ok(first_z) = first_z.parse() {
                self.first_z_index = first_z;
            }
        }

        if let Ok(overlay_id) = std::env::var("DIALOG_OVERLAY_ID") {
            self.overlay_element_id = overlay_id;
        }
    }

    /// Merge another configuration into this one
    pub fn merge_with(&mut self, other: Self) {
        if other.first_z_index != DEFAULT_FIRST_Z_INDEX {
            self.first_z_index = other.first_z_index;
        }
        if !other.overlay_element_id.is_empty()
            && other.overlay_element_id != DEFAULT_OVERLAY_ELEMENT_ID
        {
            self.overlay_element_id = other.overlay_element_id;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.first_z_index < 1 {
            return Err(anyhow::anyhow!(
                "first_z_index must be at least 1 so the overlay slot below it stays non-negative"
            ));
        }

        if self.overlay_element_id.trim().is_empty() {
            return Err(anyhow::anyhow!("overlay_element_id is required"));
        }

        Ok(())
    }
}
