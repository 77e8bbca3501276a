//! Bundle layers derived from widget placements.
//!
//! Every active widget and the active theme get a layer of their own that
//! includes the generated resource module and excludes the framework roots.
//! Off-panel widgets and the theme are loaded by the preload umbrella layer;
//! in-panel widgets by the postload one.

use std::collections::HashSet;

use jsliteral::JsValue;
use serde_json::Value;

use crate::{
    error::PrepareError,
    widget::{
        ConfigWalker, Placement,
        classify::{self, PanelResolver, WidgetPurpose},
        uri::{GENERATED_MODULE, ModuleResolver},
    },
};

/// Modules every feature layer excludes, so framework code is bundled once.
pub const FRAMEWORK_ROOTS: [&str; 3] = ["jimu/main", "libs/main", "esri/main"];

/// Umbrella layer loaded before the application shell starts.
pub const PRELOAD_LAYER: &str = "dynamic-modules/preload";

/// Umbrella layer loaded after the application shell starts.
pub const POSTLOAD_LAYER: &str = "dynamic-modules/postload";

/// A named bundle definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Layer {
    /// A feature layer excluding [`FRAMEWORK_ROOTS`].
    pub fn feature(name: impl Into<String>, include: Vec<String>) -> Self {
        Self {
            name: name.into(),
            include,
            exclude: FRAMEWORK_ROOTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The `{ include, exclude }` entry stored under the layer name.
    pub fn to_js(&self) -> JsValue {
        let mut obj = jsliteral::JsObject::new();
        obj.insert("include", JsValue::from(self.include.clone()));
        obj.insert("exclude", JsValue::from(self.exclude.clone()));
        JsValue::Object(obj)
    }
}

/// Layers and load order computed for one app config.
#[derive(Debug, Clone, Default)]
pub struct LayerPlan {
    /// Widget layers in walk order, followed by the theme layer.
    pub layers: Vec<Layer>,
    /// Theme layer name, then off-panel widgets in walk order.
    pub preload: Vec<String>,
    /// In-panel, non-theme widgets in walk order.
    pub postload: Vec<String>,
}

/// The active theme name from `theme.name`.
pub fn theme_name(app_config: &Value) -> Result<&str, PrepareError> {
    app_config
        .pointer("/theme/name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(PrepareError::MissingTheme)
}

pub fn theme_layer(theme: &str) -> Layer {
    Layer::feature(
        format!("themes/{theme}/main"),
        vec![format!("themes/{theme}/{GENERATED_MODULE}")],
    )
}

fn uris(placements: Vec<Placement<'_>>) -> Vec<String> {
    placements
        .into_iter()
        .filter_map(|p| p.node.uri().map(str::to_string))
        .collect()
}

/// Computes all layers plus the preload and postload lists.
///
/// Fails with [`PrepareError::MissingTheme`] before touching any manifest,
/// and with [`PrepareError::DuplicateLayer`] when two active widgets share
/// a URI.
pub fn plan_layers(
    walker: &dyn ConfigWalker,
    modules: &dyn ModuleResolver,
    app_config: &Value,
    panels: &mut dyn PanelResolver,
) -> anyhow::Result<LayerPlan> {
    let theme = theme_layer(theme_name(app_config)?);

    let mut seen = HashSet::new();
    let mut layers = Vec::new();
    for uri in uris(classify::select(walker, app_config, WidgetPurpose::Widget, panels)?) {
        if !seen.insert(uri.clone()) {
            return Err(PrepareError::DuplicateLayer { name: uri }.into());
        }
        let include = vec![modules.generated_module(&uri)];
        layers.push(Layer::feature(uri, include));
    }
    if seen.contains(&theme.name) {
        return Err(PrepareError::DuplicateLayer { name: theme.name }.into());
    }

    let mut preload = vec![theme.name.clone()];
    preload.extend(uris(classify::select(
        walker,
        app_config,
        WidgetPurpose::OffPanelWidget,
        panels,
    )?));

    let postload = uris(classify::select(
        walker,
        app_config,
        WidgetPurpose::InPanelWidget,
        panels,
    )?);

    layers.push(theme);
    info!(
        "planned {} layer(s): {} preload, {} postload",
        layers.len(),
        preload.len(),
        postload.len()
    );
    Ok(LayerPlan {
        layers,
        preload,
        postload,
    })
}
