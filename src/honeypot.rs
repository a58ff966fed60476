//! Honeypot registry persisted next to the decoy templates.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One registered honeypot. `template_html_file` names the mirrored page it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoneypotConfig {
    pub id: u32,
    pub name: String,

    #[serde(default)]
    pub cve: String,

    pub application: String,
    pub port: u16,
    pub template_html_file: String,
    pub detection_endpoint: String,
    pub request_regex: String,
    pub date_created: String,
    pub date_updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub honeypots: Vec<HoneypotConfig>,
}

impl ConfigFile {
    /// Load the registry (JSON or YAML). A missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = match extension(path) {
            "json" => serde_json::from_str(&content).context("Failed to parse JSON")?,
            _ if content.trim().is_empty() => Self::default(),
            _ => serde_yaml::from_str(&content).context("Failed to parse YAML")?,
        };

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path) {
            "json" => serde_json::to_string_pretty(self)?,
            _ => serde_yaml::to_string(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Append `honeypot`, numbering it after the existing records.
    pub fn register(&mut self, mut honeypot: HoneypotConfig) -> u32 {
        honeypot.id = self.honeypots.len() as u32 + 1;
        let id = honeypot.id;
        self.honeypots.push(honeypot);
        id
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}
