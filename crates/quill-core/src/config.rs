use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{QuillError, Result};

/// Top-level configuration for the Quill application.
///
/// Loaded from `~/.quill/config.toml` by default. Each section corresponds
/// to one component or cross-cutting concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            ai: AiConfig::default(),
            reveal: RevealConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl QuillConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: QuillConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| QuillError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the history file and exported PDFs.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.quill/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// AI text service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Model name sent to the generateContent endpoint.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Typewriter reveal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Delay between revealed characters, in milliseconds.
    pub speed_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { speed_ms: 20 }
    }
}

/// PDF export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Page margin for the text-flow document, in millimeters.
    pub margin_mm: f32,
    /// Fit margin for the snapshot document, in millimeters.
    pub snapshot_margin_mm: f32,
    /// Upscale factor applied when rasterizing the conversation view.
    pub raster_scale: u32,
    /// Watermark stamped near the bottom of snapshot pages.
    pub watermark: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            margin_mm: 15.0,
            snapshot_margin_mm: 10.0,
            raster_scale: 4,
            watermark: "Generated by quill".to_string(),
        }
    }
}
