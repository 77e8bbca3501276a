//! Build preparation passes.
//!
//! [`BuildContext::prepare`] runs every pass in order:
//!
//! 1. add one layer per active widget plus the theme layer, and fill the
//!    preload/postload umbrella layers
//! 2. add the copy directives for the generated files
//! 3. write the theme and widget resource modules
//! 4. merge and write the widget manifests
//! 5. write the stamped app config
//! 6. write the profile
//!
//! The first fatal error aborts the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use prebuild::ctx::{BuildContext, SetupInfo};
//!
//! let mut ctx = BuildContext::new("./my-app", SetupInfo::default())?;
//! let report = ctx.prepare()?;
//! println!("preload: {:?}", report.preload);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::PathBuf;

use crate::{
    ctx::BuildContext,
    manifest,
    utils,
    widget::classify::{self, WidgetPurpose},
};

/// Bundle layers derived from widget placements.
pub mod layers;

/// Generated `_build-generate_module.js` files.
pub mod resource_module;

use layers::{POSTLOAD_LAYER, PRELOAD_LAYER};

/// Merged manifest path, relative to the base path.
pub const WIDGETS_MANIFEST_FILE: &str = "widgets/_build-generate_widgets-manifest.json";

/// Stamped app config file name, written to `<configDir>/build-src`.
pub const APP_CONFIG_FILE: &str = "_build-generate_config.json";

/// Rendered profile path, relative to the base path.
pub const PROFILE_FILE: &str = "app.profile.js";

/// Copy directives mapping generated files to their runtime names.
pub const BUILD_FILES: [(&str, &str); 2] = [
    (
        "./widgets/_build-generate_widgets-manifest.json",
        "./widgets/widgets-manifest.json",
    ),
    ("./_build-generate_config.json", "./config.json"),
];

/// Outcome of a full preparation run.
#[derive(Debug, Clone, Default)]
pub struct PrepareReport {
    /// Every file written, in write order.
    pub written: Vec<PathBuf>,
    /// Layers added to the preload umbrella layer.
    pub preload: Vec<String>,
    /// Layers added to the postload umbrella layer.
    pub postload: Vec<String>,
}

impl BuildContext {
    /// Runs all passes and writes every artifact.
    pub fn prepare(&mut self) -> anyhow::Result<PrepareReport> {
        let mut report = PrepareReport::default();
        let (preload, postload) = self.add_build_layers()?;
        report.preload = preload;
        report.postload = postload;
        self.add_build_files()?;

        if self.resource_modules {
            report.written.extend(self.write_resource_modules()?);
        }

        report.written.push(self.merge_and_write_widget_manifests()?);
        report.written.push(self.write_app_config()?);
        report.written.push(self.write_profile()?);
        Ok(report)
    }

    /// URIs of the placements matching `purpose`, in walk order.
    pub fn widget_uris(&mut self, purpose: WidgetPurpose) -> anyhow::Result<Vec<String>> {
        let selected = classify::select(
            self.walker.as_ref(),
            &self.app_config,
            purpose,
            &mut self.manifests,
        )?;
        Ok(selected
            .into_iter()
            .filter_map(|p| p.node.uri().map(str::to_string))
            .collect())
    }

    /// Adds the widget and theme layers to the profile and appends them to
    /// the umbrella layers. Returns the preload and postload names.
    pub fn add_build_layers(&mut self) -> anyhow::Result<(Vec<String>, Vec<String>)> {
        let plan = layers::plan_layers(
            self.walker.as_ref(),
            self.modules.as_ref(),
            &self.app_config,
            &mut self.manifests,
        )?;

        for layer in &plan.layers {
            self.profile.insert_layer(layer)?;
        }
        for name in &plan.preload {
            self.profile.push_umbrella_include(PRELOAD_LAYER, name)?;
        }
        for name in &plan.postload {
            self.profile.push_umbrella_include(POSTLOAD_LAYER, name)?;
        }
        Ok((plan.preload, plan.postload))
    }

    /// Adds the copy directives for the merged manifest and app config.
    pub fn add_build_files(&mut self) -> anyhow::Result<()> {
        for (source, destination) in BUILD_FILES {
            self.profile.push_file(source, destination)?;
        }
        Ok(())
    }

    /// Writes the theme resource module, then one per active widget.
    pub fn write_resource_modules(&mut self) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let theme = layers::theme_name(&self.app_config)?;
        let theme_dir = self.paths.base.join("themes").join(theme);
        written.extend(resource_module::write_theme_module(&theme_dir)?);

        let widgets = classify::select(
            self.walker.as_ref(),
            &self.app_config,
            WidgetPurpose::Widget,
            &mut self.manifests,
        )?;
        for placement in widgets {
            let Some(uri) = placement.node.uri() else {
                continue;
            };
            let folder = self.paths.base.join(self.modules.amd_folder(uri));
            written.extend(resource_module::write_widget_module(&folder)?);
        }
        info!("wrote {} resource module(s)", written.len());
        Ok(written)
    }

    /// Merges every widget manifest into
    /// `<base>/widgets/_build-generate_widgets-manifest.json`.
    pub fn merge_and_write_widget_manifests(&mut self) -> anyhow::Result<PathBuf> {
        let merged = manifest::merge_manifests(
            self.walker.as_ref(),
            &self.app_config,
            &mut self.manifests,
            self.localizer.as_ref(),
        )?;
        self.stamp_build_info("widgetManifestsMerged", true.into());

        let path = self.paths.base.join(WIDGETS_MANIFEST_FILE);
        utils::write_json(&path, &merged)?;
        utils::print_written("widget manifests", &path);
        Ok(path)
    }

    /// Writes the stamped app config to `<configDir>/build-src`.
    ///
    /// With the default app config at `<app_root>/config.json` this is the
    /// base path, next to the profile whose `files` directive copies it.
    pub fn write_app_config(&self) -> anyhow::Result<PathBuf> {
        let path = self
            .paths
            .config_dir()
            .join(crate::ctx::BUILD_SRC)
            .join(APP_CONFIG_FILE);
        utils::write_json(&path, &self.app_config)?;
        utils::print_written("app config", &path);
        Ok(path)
    }

    /// Renders the profile to `<base>/app.profile.js`.
    pub fn write_profile(&self) -> anyhow::Result<PathBuf> {
        let path = self.paths.base.join(PROFILE_FILE);
        self.profile.write(&path)?;
        utils::print_written("profile", &path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::ctx::{BUILD_SRC, SetupInfo};
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn read_json(path: &std::path::Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_write_app_config_default_location() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.json"), r#"{"theme": {"name": "T"}}"#).unwrap();

        let mut ctx = BuildContext::new(tmp.path(), SetupInfo::default()).unwrap();
        ctx.stamp_build_info("widgetManifestsMerged", true.into());
        let path = ctx.write_app_config().unwrap();

        // lands next to the profile, where the `files` directive copies it from
        assert_eq!(path, ctx.paths.base.join(APP_CONFIG_FILE));
        assert_eq!(path, tmp.path().join(BUILD_SRC).join(APP_CONFIG_FILE));
        let written = read_json(&path);
        assert_eq!(written["_buildInfo"]["widgetManifestsMerged"], json!(true));
        assert_eq!(written["theme"]["name"], "T");
    }

    #[test]
    fn test_write_app_config_custom_location() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join("site");
        fs::create_dir_all(&site).unwrap();
        let app_config = site.join("app.json");
        fs::write(&app_config, r#"{"theme": {"name": "T"}}"#).unwrap();

        let mut ctx = BuildContext::new(
            tmp.path(),
            SetupInfo {
                app_config_file: Some(app_config),
                ..SetupInfo::default()
            },
        )
        .unwrap();
        ctx.stamp_build_info("widgetManifestsMerged", true.into());
        let path = ctx.write_app_config().unwrap();

        assert_eq!(path, site.join(BUILD_SRC).join(APP_CONFIG_FILE));
        assert_eq!(
            read_json(&path)["_buildInfo"],
            json!({"widgetManifestsMerged": true})
        );
    }
}
