//! Localized labels for widget manifests.
//!
//! Labels come from the widget's AMD `nls` bundle:
//!
//! ```text
//! widgets/Legend/nls/strings.js        define({ root: {...}, "fr": true })
//! widgets/Legend/nls/fr/strings.js     define({ _widgetLabel: "Légende" })
//! ```
//!
//! The resolved strings are written to an `i18nLabels` object holding a
//! `defaultLabel` plus one entry per locale.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde_json::{Map, Value};

/// Injects resolved display strings into a manifest in place.
pub trait Localizer {
    /// Sets the manifest's own `i18nLabels`.
    fn inject_label(&self, manifest: &mut Value) -> anyhow::Result<()>;

    /// Sets `i18nLabels` on each entry of the manifest's `featureActions`.
    fn inject_feature_action_labels(&self, manifest: &mut Value) -> anyhow::Result<()>;
}

/// Reads labels from `<location>/nls/strings.js` bundles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NlsLocalizer;

/// A parsed root bundle with its locale bundles.
#[derive(Debug, Default)]
struct NlsBundle {
    root: Map<String, Value>,
    locales: Vec<(String, Map<String, Value>)>,
}

fn read_define(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("Failed to read nls bundle {}", path.display()))?;
    let value = jsliteral::parse_amd_define(&src)
        .with_context(|| format!("Failed to parse nls bundle {}", path.display()))?;
    match value.to_json() {
        Value::Object(map) => Ok(map),
        _ => bail!("nls bundle {} must define an object", path.display()),
    }
}

impl NlsBundle {
    /// Loads the bundle of the widget folder, if it has one.
    fn load(location: &Path) -> anyhow::Result<Option<Self>> {
        let nls = location.join("nls");
        let root_file = nls.join("strings.js");
        if !root_file.is_file() {
            return Ok(None);
        }
        let mut bundle = read_define(&root_file)?;
        let root = match bundle.remove("root") {
            Some(Value::Object(root)) => root,
            _ => Map::new(),
        };

        let mut locales = Vec::new();
        for (locale, enabled) in bundle {
            if enabled != Value::Bool(true) {
                continue;
            }
            let file = nls.join(&locale).join("strings.js");
            if !file.is_file() {
                warn!("locale {locale} listed but {} is missing", file.display());
                continue;
            }
            locales.push((locale, read_define(&file)?));
        }
        Ok(Some(Self { root, locales }))
    }

    fn labels(&self, key: &str, fallback: Option<&str>) -> Map<String, Value> {
        let mut labels = Map::new();
        let default = self.root.get(key).and_then(Value::as_str).or(fallback);
        if let Some(default) = default {
            labels.insert("defaultLabel".into(), default.into());
        }
        for (locale, strings) in &self.locales {
            if let Some(label) = strings.get(key).and_then(Value::as_str) {
                labels.insert(locale.clone(), label.into());
            }
        }
        labels
    }
}

fn location(manifest: &Value) -> anyhow::Result<PathBuf> {
    manifest
        .get("location")
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("manifest has no `location` to resolve labels from"))
}

fn fallback_label(obj: &Value) -> Option<&str> {
    obj.get("label")
        .and_then(Value::as_str)
        .or_else(|| obj.get("name").and_then(Value::as_str))
}

impl Localizer for NlsLocalizer {
    fn inject_label(&self, manifest: &mut Value) -> anyhow::Result<()> {
        let bundle = NlsBundle::load(&location(manifest)?)?.unwrap_or_default();
        let key = match manifest.get("category").and_then(Value::as_str) {
            Some("theme") => "_themeLabel",
            _ => "_widgetLabel",
        };
        let labels = bundle.labels(key, fallback_label(manifest));
        let obj = manifest
            .as_object_mut()
            .ok_or_else(|| anyhow!("manifest must be an object"))?;
        obj.insert("i18nLabels".into(), Value::Object(labels));
        Ok(())
    }

    fn inject_feature_action_labels(&self, manifest: &mut Value) -> anyhow::Result<()> {
        let bundle = NlsBundle::load(&location(manifest)?)?.unwrap_or_default();
        let Some(actions) = manifest
            .get_mut("featureActions")
            .and_then(Value::as_array_mut)
        else {
            return Ok(());
        };
        for action in actions {
            let Some(name) = action.get("name").and_then(Value::as_str) else {
                continue;
            };
            let labels = bundle.labels(&format!("_featureAction_{name}"), fallback_label(action));
            if let Some(obj) = action.as_object_mut() {
                obj.insert("i18nLabels".into(), Value::Object(labels));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn widget_dir() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let nls = tmp.path().join("nls");
        fs::create_dir_all(nls.join("fr")).unwrap();
        fs::write(
            nls.join("strings.js"),
            r#"define({
                root: ({
                    _widgetLabel: "Legend",
                    _featureAction_ZoomTo: "Zoom to"
                }),
                "fr": true,
                "de": false,
                "ja": true
            });"#,
        )
        .unwrap();
        fs::write(
            nls.join("fr").join("strings.js"),
            r#"define({ _widgetLabel: "Légende", _featureAction_ZoomTo: 'Zoomer' });"#,
        )
        .unwrap();
        tmp
    }

    #[test]
    fn test_inject_label() {
        let tmp = widget_dir();
        let mut manifest = json!({
            "name": "Legend",
            "location": tmp.path().display().to_string()
        });
        NlsLocalizer.inject_label(&mut manifest).unwrap();
        // "ja" is enabled but has no bundle on disk
        assert_eq!(
            manifest["i18nLabels"],
            json!({"defaultLabel": "Legend", "fr": "Légende"})
        );
    }

    #[test]
    fn test_inject_feature_action_labels() {
        let tmp = widget_dir();
        let mut manifest = json!({
            "location": tmp.path().display().to_string(),
            "featureActions": [
                {"name": "ZoomTo", "uri": "ZoomTo"},
                {"name": "Export", "label": "Export data"},
                {"uri": "nameless"}
            ]
        });
        NlsLocalizer
            .inject_feature_action_labels(&mut manifest)
            .unwrap();

        let actions = manifest["featureActions"].as_array().unwrap();
        assert_eq!(
            actions[0]["i18nLabels"],
            json!({"defaultLabel": "Zoom to", "fr": "Zoomer"})
        );
        assert_eq!(actions[1]["i18nLabels"], json!({"defaultLabel": "Export data"}));
        assert!(actions[2].get("i18nLabels").is_none());
    }

    #[test]
    fn test_without_nls_bundle() {
        let tmp = TempDir::new().unwrap();
        let mut manifest = json!({
            "name": "Plain",
            "label": "Plain widget",
            "location": tmp.path().display().to_string()
        });
        NlsLocalizer.inject_label(&mut manifest).unwrap();
        assert_eq!(manifest["i18nLabels"], json!({"defaultLabel": "Plain widget"}));
    }

    #[test]
    fn test_requires_location() {
        let mut manifest = json!({"name": "X"});
        let err = NlsLocalizer.inject_label(&mut manifest).unwrap_err();
        assert!(err.to_string().contains("location"));
    }
}
