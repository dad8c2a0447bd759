use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};

pub const OAI_DC_SCHEMA: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";
pub const WILEY_SCHEMAS: [&str; 2] = [
    "http://www.wiley.com/namespaces/wiley",
    "http://www.wiley.com/namespaces/wiley/wiley",
];

/// Root configuration, loaded from `~/.config/ingestscope/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub chunking: ChunkingConfig,
    pub arxiv: ArxivConfig,
    pub wiley: WileyConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Element name that delimits one record in a multi-record document.
    pub record_tag: String,
    /// Wrap every fragment in the shared document header/footer.
    pub keep_header: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArxivConfig {
    pub schemas: Vec<String>,
    pub collaboration_keywords: Vec<String>,
    pub remove_the: bool,
    pub fix_mixed_collaboration: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WileyConfig {
    pub schemas: Vec<String>,
    /// eLocator ids keep only this many trailing characters.
    pub elocator_digits: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            record_tag: "record".to_string(),
            keep_header: false,
        }
    }
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            schemas: vec![OAI_DC_SCHEMA.to_string()],
            collaboration_keywords: vec![
                "group".to_string(),
                "team".to_string(),
                "collaboration".to_string(),
            ],
            remove_the: false,
            fix_mixed_collaboration: true,
        }
    }
}

impl Default for WileyConfig {
    fn default() -> Self {
        Self {
            schemas: WILEY_SCHEMAS.iter().map(|s| s.to_string()).collect(),
            elocator_digits: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl IngestConfig {
    /// Standard config file path: `~/.config/ingestscope/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("INGESTSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("ingestscope")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let tag = self.chunking.record_tag.trim();
        if tag.is_empty() || tag.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
            return Err(IngestError::ConfigError(format!(
                "invalid chunking.record_tag: {:?}",
                self.chunking.record_tag
            )));
        }
        if self.wiley.elocator_digits == 0 {
            return Err(IngestError::ConfigError(
                "wiley.elocator_digits must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}
