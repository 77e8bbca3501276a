//! Tool configuration.
//!
//! Settings are read from an optional TOML file, `.prebuild.toml` in the
//! app root by default. Every field is optional and command-line flags take
//! precedence.
//!
//! # Configuration File Format
//!
//! ```toml
//! app_config = "${workspaceFolder}/config.json"
//! profile_template = "${env:PREBUILD_TEMPLATES}/app.profile.js"
//! resource_modules = true
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ctx::SetupInfo, utils};

/// File name looked up in the app root when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".prebuild.toml";

/// Contents of `.prebuild.toml`.
#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PrebuildConfig {
    /// App config file. Defaults to `config.json` in the app root.
    pub app_config: Option<String>,
    /// Bundler profile template. Defaults to the built-in template.
    pub profile_template: Option<String>,
    /// Whether to write `_build-generate_module.js` files. Defaults to true.
    pub resource_modules: Option<bool>,
}

impl PrebuildConfig {
    pub fn default_path(app_root: &Path) -> PathBuf {
        app_root.join(DEFAULT_CONFIG_FILE)
    }

    /// Loads the file at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Expands placeholders and fills in defaults.
    pub fn resolve(&self, app_root: &Path) -> SetupInfo {
        SetupInfo {
            app_config_file: self
                .app_config
                .as_deref()
                .map(|raw| utils::expand_path(raw, app_root)),
            profile_template: self
                .profile_template
                .as_deref()
                .map(|raw| utils::expand_path(raw, app_root)),
            resource_modules: self.resource_modules.unwrap_or(true),
        }
    }
}

/// Schema path for a config file: `.prebuild.toml` maps to
/// `.prebuild-schema.json` in the same directory.
pub fn schema_path(config: &Path) -> PathBuf {
    let file_name = config
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name,
    };
    let name = format!("{stem}-schema.json");
    match config.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Writes the JSON schema of [`PrebuildConfig`] next to `config`.
pub fn write_schema(config: &Path) -> anyhow::Result<PathBuf> {
    let schema = schemars::schema_for!(PrebuildConfig);
    let path = schema_path(config);
    utils::write_json(&path, &schema)?;
    Ok(path)
}
