//! The bundler build profile.
//!
//! A profile is loaded once from a template script (`profile = {...};`),
//! mutated in memory by the build passes, and rendered exactly once. Any
//! field the passes do not touch, regular expressions included, is written
//! back as it was read.

use std::path::Path;

use anyhow::Context;
use jsliteral::{JsObject, JsValue};

use crate::{build::layers::Layer, error::PrepareError, utils};

/// Template shipped with the tool, used when no template is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/app.profile.js");

/// Name of the variable the rendered script assigns.
pub const PROFILE_VARIABLE: &str = "profile";

#[derive(Debug, Clone)]
pub struct Profile {
    root: JsObject,
}

impl Profile {
    /// Parses template source text.
    pub fn from_source(src: &str) -> anyhow::Result<Self> {
        let (_, value) = jsliteral::parse_assignment(src)?;
        match value {
            JsValue::Object(root) => Ok(Self { root }),
            other => Err(PrepareError::InvalidProfile {
                found: other.kind(),
            }
            .into()),
        }
    }

    /// Loads a template script from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile template {}", path.display()))?;
        Self::from_source(&src)
            .with_context(|| format!("Failed to parse profile template {}", path.display()))
    }

    pub fn default_template() -> anyhow::Result<Self> {
        Self::from_source(DEFAULT_TEMPLATE).context("Failed to parse built-in profile template")
    }

    pub fn root(&self) -> &JsObject {
        &self.root
    }

    /// The entry stored under `layers[name]`.
    pub fn layer(&self, name: &str) -> Option<&JsValue> {
        self.root
            .get("layers")
            .and_then(JsValue::as_object)
            .and_then(|layers| layers.get(name))
    }

    /// Adds `layer` under its name.
    ///
    /// An identical entry already in the template is left alone; an entry
    /// with different contents is a [`PrepareError::DuplicateLayer`].
    pub fn insert_layer(&mut self, layer: &Layer) -> anyhow::Result<()> {
        let layers = self
            .root
            .entry_or_insert_with("layers", || JsValue::Object(JsObject::new()))
            .as_object_mut()
            .ok_or_else(|| anyhow!("profile `layers` must be an object"))?;

        let value = layer.to_js();
        match layers.get(&layer.name) {
            Some(existing) if *existing != value => Err(PrepareError::DuplicateLayer {
                name: layer.name.clone(),
            }
            .into()),
            Some(_) => {
                debug!("layer {} already present in template", layer.name);
                Ok(())
            }
            None => {
                layers.insert(layer.name.clone(), value);
                Ok(())
            }
        }
    }

    fn umbrella_include_mut(&mut self, umbrella: &str) -> Option<&mut Vec<JsValue>> {
        self.root
            .get_mut("layers")?
            .as_object_mut()?
            .get_mut(umbrella)?
            .as_object_mut()?
            .get_mut("include")?
            .as_array_mut()
    }

    /// Appends a layer name to the `include` list of an umbrella layer.
    pub fn push_umbrella_include(&mut self, umbrella: &str, layer: &str) -> anyhow::Result<()> {
        let include =
            self.umbrella_include_mut(umbrella)
                .ok_or_else(|| PrepareError::MissingUmbrellaLayer {
                    name: umbrella.to_string(),
                })?;
        include.push(JsValue::from(layer));
        Ok(())
    }

    /// String entries of an umbrella layer's `include` list.
    pub fn umbrella_includes(&self, umbrella: &str) -> Vec<String> {
        self.layer(umbrella)
            .and_then(JsValue::as_object)
            .and_then(|layer| layer.get("include"))
            .and_then(JsValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Appends a `[source, destination]` copy directive to `files`.
    pub fn push_file(&mut self, source: &str, destination: &str) -> anyhow::Result<()> {
        let files = self
            .root
            .entry_or_insert_with("files", || JsValue::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| anyhow!("profile `files` must be an array"))?;
        files.push(JsValue::from(vec![source, destination]));
        Ok(())
    }

    /// Renders the `profile = {...};` script.
    pub fn render(&self) -> anyhow::Result<String> {
        let root = JsValue::Object(self.root.clone());
        Ok(jsliteral::to_assignment_string(PROFILE_VARIABLE, &root)?)
    }

    /// Renders the script to `path`.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        utils::write_text(path, &self.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::layers::{POSTLOAD_LAYER, PRELOAD_LAYER, theme_layer};
    use jsliteral::RegExpLiteral;
    use serde_json::json;

    #[test]
    fn test_default_template_has_umbrellas() {
        let profile = Profile::default_template().unwrap();
        assert!(profile.layer(PRELOAD_LAYER).is_some());
        assert!(profile.layer(POSTLOAD_LAYER).is_some());
        assert!(profile.umbrella_includes(PRELOAD_LAYER).is_empty());
    }

    #[test]
    fn test_insert_layer_clobber_rules() {
        let mut profile = Profile::from_source("profile = { layers: {} };").unwrap();
        let layer = theme_layer("T");
        profile.insert_layer(&layer).unwrap();
        // same shape again is accepted
        profile.insert_layer(&layer).unwrap();

        let mut other = layer.clone();
        other.include.push("extra".into());
        let err = profile.insert_layer(&other).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepareError>(),
            Some(PrepareError::DuplicateLayer { name }) if name == "themes/T/main"
        ));
    }

    #[test]
    fn test_umbrella_and_files() {
        let mut profile = Profile::from_source(
            "profile = { layers: { 'dynamic-modules/preload': { include: ['x'] } } };",
        )
        .unwrap();
        profile.push_umbrella_include(PRELOAD_LAYER, "a").unwrap();
        assert_eq!(profile.umbrella_includes(PRELOAD_LAYER), vec!["x", "a"]);

        let err = profile.push_umbrella_include(POSTLOAD_LAYER, "b").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepareError>(),
            Some(PrepareError::MissingUmbrellaLayer { .. })
        ));

        profile.push_file("./a.json", "./b.json").unwrap();
        assert_eq!(
            profile.root().get("files").unwrap().to_json(),
            json!([["./a.json", "./b.json"]])
        );
    }

    #[test]
    fn test_template_must_be_object() {
        let err = Profile::from_source("profile = [];").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepareError>(),
            Some(PrepareError::InvalidProfile { found: "array" })
        ));
    }

    #[test]
    fn test_render_keeps_regexp() {
        let profile = Profile::from_source(
            r"profile = { trees: [['../widgets', './widgets', /\/tests\//i]] };",
        )
        .unwrap();
        let text = profile.render().unwrap();
        assert!(text.starts_with("profile = {"));
        assert!(text.contains(r"/\/tests\//i"));

        let again = Profile::from_source(&text).unwrap();
        let tree = again.root().get("trees").unwrap().as_array().unwrap()[0]
            .as_array()
            .unwrap();
        assert_eq!(
            tree[2].as_regexp(),
            Some(&RegExpLiteral::new(r"\/tests\/", "i"))
        );
    }

    #[test]
    fn test_write() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("build-src/app.profile.js");
        let profile = Profile::default_template().unwrap();
        profile.write(&path).unwrap();

        let again = Profile::load(&path).unwrap();
        assert_eq!(again.root(), profile.root());
    }
}
