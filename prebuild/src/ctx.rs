//! Build context and state management.
//!
//! This module provides the [`BuildContext`] type which holds the state of
//! one preparation run: paths, the loaded app config, the profile being
//! assembled, the manifest cache and the collaborators the build passes
//! use.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use crate::{
    manifest::i18n::{Localizer, NlsLocalizer},
    profile::Profile,
    widget::{
        ConfigWalker, SectionWalker,
        panel::ManifestStore,
        uri::{FolderModuleResolver, ModuleResolver},
    },
};

/// Directory under the app root holding sources and generated files.
pub const BUILD_SRC: &str = "build-src";

/// Path configuration grouping all path-related fields.
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Root directory of the app.
    pub app_root: PathBuf,
    /// `<app_root>/build-src`, the base of every widget folder.
    pub base: PathBuf,
    /// The app config file that was loaded.
    pub app_config_file: PathBuf,
}

impl PathConfig {
    /// Directory holding the app config file.
    pub fn config_dir(&self) -> &Path {
        self.app_config_file.parent().unwrap_or(Path::new(""))
    }
}

/// Inputs of a run, resolved from the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct SetupInfo {
    /// App config file. Defaults to `<app_root>/config.json`.
    pub app_config_file: Option<PathBuf>,
    /// Profile template. Defaults to the built-in template.
    pub profile_template: Option<PathBuf>,
    pub resource_modules: bool,
}

impl Default for SetupInfo {
    fn default() -> Self {
        Self {
            app_config_file: None,
            profile_template: None,
            resource_modules: true,
        }
    }
}

/// State of one preparation run.
pub struct BuildContext {
    pub paths: PathConfig,
    /// Loaded app config, stamped with `_buildInfo`.
    pub app_config: Value,
    pub profile: Profile,
    pub manifests: ManifestStore,
    /// Whether to write `_build-generate_module.js` files.
    pub resource_modules: bool,
    pub(crate) walker: Box<dyn ConfigWalker>,
    pub(crate) modules: Box<dyn ModuleResolver>,
    pub(crate) localizer: Box<dyn Localizer>,
}

impl BuildContext {
    /// Loads the app config and the profile template for `app_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the app config is unreadable or not a JSON
    /// object, or if the profile template cannot be parsed.
    pub fn new(app_root: impl Into<PathBuf>, info: SetupInfo) -> anyhow::Result<Self> {
        let app_root = app_root.into();
        let base = app_root.join(BUILD_SRC);
        let app_config_file = info
            .app_config_file
            .unwrap_or_else(|| app_root.join("config.json"));

        let app_config = load_app_config(&app_config_file)?;
        let profile = match &info.profile_template {
            Some(path) => Profile::load(path)?,
            None => Profile::default_template()?,
        };
        info!("loaded app config {}", app_config_file.display());

        Ok(Self {
            manifests: ManifestStore::new(base.clone()),
            paths: PathConfig {
                app_root,
                base,
                app_config_file,
            },
            app_config,
            profile,
            resource_modules: info.resource_modules,
            walker: Box::new(SectionWalker),
            modules: Box::new(FolderModuleResolver),
            localizer: Box::new(NlsLocalizer),
        })
    }

    pub fn with_walker(mut self, walker: impl ConfigWalker + 'static) -> Self {
        self.walker = Box::new(walker);
        self
    }

    pub fn with_module_resolver(mut self, modules: impl ModuleResolver + 'static) -> Self {
        self.modules = Box::new(modules);
        self
    }

    pub fn with_localizer(mut self, localizer: impl Localizer + 'static) -> Self {
        self.localizer = Box::new(localizer);
        self
    }

    /// Sets `_buildInfo.<key>` on the app config.
    pub fn stamp_build_info(&mut self, key: &str, value: Value) {
        if let Some(info) = self
            .app_config
            .get_mut("_buildInfo")
            .and_then(Value::as_object_mut)
        {
            info.insert(key.to_string(), value);
        }
    }
}

fn load_app_config(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read app config {}", path.display()))?;
    let mut config: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse app config {}", path.display()))?;
    let Some(obj) = config.as_object_mut() else {
        bail!("app config {} must be a JSON object", path.display());
    };
    obj.insert("_buildInfo".into(), Value::Object(Map::new()));
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn app_root(config: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.json"), config).unwrap();
        tmp
    }

    #[test]
    fn test_new_stamps_build_info() {
        let tmp = app_root(r#"{"theme": {"name": "T"}, "_buildInfo": {"stale": true}}"#);
        let mut ctx = BuildContext::new(tmp.path(), SetupInfo::default()).unwrap();

        assert_eq!(ctx.paths.base, tmp.path().join(BUILD_SRC));
        assert_eq!(ctx.paths.app_config_file, tmp.path().join("config.json"));
        assert_eq!(ctx.paths.config_dir(), tmp.path());
        assert_eq!(ctx.app_config["_buildInfo"], json!({}));
        assert!(ctx.resource_modules);

        ctx.stamp_build_info("widgetManifestsMerged", true.into());
        assert_eq!(ctx.app_config["_buildInfo"], json!({"widgetManifestsMerged": true}));
    }

    #[test]
    fn test_custom_app_config_and_template() {
        let tmp = app_root("{}");
        let custom = tmp.path().join("other.json");
        fs::write(&custom, r#"{"theme": {"name": "Custom"}}"#).unwrap();
        let template = tmp.path().join("app.profile.js");
        fs::write(&template, "var profile = { layers: {} };").unwrap();

        let ctx = BuildContext::new(
            tmp.path(),
            SetupInfo {
                app_config_file: Some(custom.clone()),
                profile_template: Some(template),
                resource_modules: false,
            },
        )
        .unwrap();
        assert_eq!(ctx.paths.app_config_file, custom);
        assert_eq!(ctx.app_config["theme"]["name"], "Custom");
        assert!(ctx.profile.root().contains_key("layers"));
        assert!(!ctx.resource_modules);
    }

    #[test]
    fn test_app_config_must_be_object() {
        let tmp = app_root("[1, 2]");
        let err = BuildContext::new(tmp.path(), SetupInfo::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("must be a JSON object"));

        let missing = TempDir::new().unwrap();
        let err = BuildContext::new(missing.path(), SetupInfo::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read app config"));
    }
}
