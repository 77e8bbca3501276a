//! Merged widget manifest.
//!
//! Every node of the app config that carries a URI contributes its
//! manifest, hidden and theme widgets included. Entries are keyed by URI,
//! stamped with `category: "widget"` and localized through a
//! [`Localizer`](i18n::Localizer).

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::{
    error::PrepareError,
    widget::{ConfigWalker, panel::ManifestStore},
};

/// Localized labels from AMD `nls` bundles.
pub mod i18n;

use i18n::Localizer;

/// Category stamped on every merged manifest.
pub const WIDGET_CATEGORY: &str = "widget";

/// Builds the `uri -> manifest` map for `app_config`.
///
/// A referenced widget without a manifest is a
/// [`PrepareError::ManifestNotFound`]; a URI placed twice is a
/// [`PrepareError::DuplicateManifest`].
pub fn merge_manifests(
    walker: &dyn ConfigWalker,
    app_config: &Value,
    store: &mut ManifestStore,
    localizer: &dyn Localizer,
) -> anyhow::Result<Map<String, Value>> {
    let mut seen = HashSet::new();
    let mut uris = Vec::new();
    walker.visit(app_config, &mut |placement| {
        if let Some(uri) = placement.node.uri() {
            if !seen.insert(uri) {
                return Err(PrepareError::DuplicateManifest {
                    uri: uri.to_string(),
                }
                .into());
            }
            uris.push(uri);
        }
        Ok(())
    })?;

    let mut merged = Map::new();
    for uri in uris {
        let mut manifest = store.require(uri)?.clone();
        let location = store.widget_dir(uri);
        let obj = manifest
            .as_object_mut()
            .ok_or_else(|| anyhow!("manifest of {uri} must be an object"))?;
        obj.insert("location".into(), location.display().to_string().into());
        obj.insert("category".into(), WIDGET_CATEGORY.into());

        if manifest.get("featureActions").is_some() {
            localizer.inject_feature_action_labels(&mut manifest)?;
        }
        localizer.inject_label(&mut manifest)?;

        if let Some(obj) = manifest.as_object_mut() {
            obj.remove("location");
        }
        merged.insert(uri.to_string(), manifest);
    }
    info!("merged {} widget manifest(s)", merged.len());
    Ok(merged)
}
