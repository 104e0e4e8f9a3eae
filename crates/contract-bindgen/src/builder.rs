//! Build-script entry point.
//!
//! ```no_run
//! // build.rs
//! fn main() -> anyhow::Result<()> {
//!     let out = std::path::PathBuf::from(std::env::var("OUT_DIR")?).join("registry.rs");
//!     contract_bindgen::Builder::new("abi/IHyperdriveRegistry.json")
//!         .emit_rerun_if_changed(true)
//!         .write_to_file(out)?;
//!     Ok(())
//! }
//! ```

use crate::config::BindgenConfig;
use crate::generator::{generate, GeneratedBindings};
use anyhow::{Context, Result};
use contract_abi::Schema;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Builder {
    abi_path: PathBuf,
    config: Option<BindgenConfig>,
    config_file: Option<PathBuf>,
    contract_name: Option<String>,
    rerun_if_changed: bool,
}

impl Builder {
    pub fn new(abi_path: impl Into<PathBuf>) -> Self {
        Self {
            abi_path: abi_path.into(),
            config: None,
            config_file: None,
            contract_name: None,
            rerun_if_changed: false,
        }
    }

    /// Use `config` as is instead of loading one from disk.
    pub fn config(mut self, config: BindgenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the config from `path` instead of `.contract-bindgen.toml` in
    /// the working directory.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Overrides the contract name from any config.
    pub fn contract_name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = Some(name.into());
        self
    }

    /// Print `cargo:rerun-if-changed` for the ABI and config files.
    pub fn emit_rerun_if_changed(mut self, enabled: bool) -> Self {
        self.rerun_if_changed = enabled;
        self
    }

    /// Contract name from the builder, then the config, else the ABI file
    /// stem.
    fn effective_config(&self) -> Result<BindgenConfig> {
        let mut config = match &self.config {
            Some(config) => config.clone(),
            None => BindgenConfig::load(self.config_file.as_deref())?,
        };
        if let Some(name) = &self.contract_name {
            config.contract_name = Some(name.clone());
        }
        if config.contract_name.is_none() {
            config.contract_name = self
                .abi_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string);
        }
        Ok(config)
    }

    pub fn generate(&self) -> Result<GeneratedBindings> {
        if self.rerun_if_changed {
            println!("cargo:rerun-if-changed={}", self.abi_path.display());
            if let Some(path) = &self.config_file {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
        let config = self.effective_config()?;
        let json = fs::read_to_string(&self.abi_path)
            .context(format!("Failed to read ABI file: {}", self.abi_path.display()))?;
        let schema = Schema::from_json(&json)
            .context(format!("Failed to parse ABI file: {}", self.abi_path.display()))?;
        generate(&schema, &config)
            .context(format!("Failed to generate bindings for {}", self.abi_path.display()))
    }

    /// Generate and write to `path`, leaving the file untouched when its
    /// content is already current. Returns whether the file was written.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        let generated = self.generate()?;

        if let Ok(existing) = fs::read_to_string(path) {
            if existing == generated.source {
                debug!(path = %path.display(), "bindings unchanged");
                return Ok(false);
            }
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create output directory: {}", parent.display()))?;
        }
        fs::write(path, &generated.source)
            .context(format!("Failed to write bindings: {}", path.display()))?;
        info!(
            path = %path.display(),
            contract = %generated.contract,
            bindings = generated.bindings.len(),
            "wrote bindings"
        );
        Ok(true)
    }
}
