//! Client configuration.
//!
//! Loaded from JSON strings/files (file IO left to the binary).

use serde::{Deserialize, Serialize};

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Directory holding raw asset blobs, one `<key>.bin` file per key.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Structure keys to load at startup (raw 32-bit values).
    #[serde(default)]
    pub cell_keys: Vec<u32>,
    /// Default tracing filter when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cell_keys: Vec::new(),
            log_filter: default_log_filter(),
        }
    }
}

impl ClientConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
