use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = ".contract-bindgen.toml";

/// Configuration for contract-bindgen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindgenConfig {
    /// Name used in the header and for the `{Contract}Errors` enum.
    pub contract_name: Option<String>,
    /// Path generated code uses to reach the runtime crate.
    pub runtime_crate: String,
    /// Derives added after `Debug, Clone, PartialEq, Eq`.
    pub extra_derives: Vec<String>,
    pub error_enum: bool,
    pub error_info: bool,
}

impl Default for BindgenConfig {
    fn default() -> Self {
        Self {
            contract_name: None,
            runtime_crate: "contract_abi".to_string(),
            extra_derives: Vec::new(),
            error_enum: true,
            error_info: true,
        }
    }
}

impl BindgenConfig {
    /// Load `path`, else `.contract-bindgen.toml` from the working directory
    /// when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_in(Path::new("."), path)
    }

    /// Like [`BindgenConfig::load`], looking for the default file in `dir`.
    pub fn load_in(dir: &Path, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    debug!(dir = %dir.display(), "no bindgen config found, using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read bindgen config: {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Failed to parse bindgen config: {}", path.display()))?;
        debug!(path = %path.display(), "loaded bindgen config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write bindgen config: {}", path.display()))
    }

    pub fn with_contract_name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = Some(name.into());
        self
    }
}
