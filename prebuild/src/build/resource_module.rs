//! Generated resource modules.
//!
//! Each widget and theme layer includes a `_build-generate_module` AMD
//! module whose only job is to pull the folder's resources (template, css,
//! nls bundle, config, manifest) into the layer:
//!
//! ```text
//! define([
//!   "./Widget",
//!   "dojo/text!./Widget.html",
//!   "dojo/i18n!./nls/strings"
//! ], function(){});
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::widget::uri::GENERATED_MODULE;

/// Files probed in a widget folder, with the dependency each one adds.
const WIDGET_RESOURCES: [(&str, &str); 6] = [
    ("Widget.js", "./Widget"),
    ("Widget.html", "dojo/text!./Widget.html"),
    ("css/style.css", "dojo/text!./css/style.css"),
    ("nls/strings.js", "dojo/i18n!./nls/strings"),
    ("config.json", "dojo/text!./config.json"),
    ("manifest.json", "dojo/text!./manifest.json"),
];

/// Dependencies of the resource module for the widget in `folder`.
pub fn widget_deps(folder: &Path) -> Vec<String> {
    WIDGET_RESOURCES
        .iter()
        .filter(|(file, _)| folder.join(file).is_file())
        .map(|(_, dep)| dep.to_string())
        .collect()
}

/// Sorted names of the subdirectories of `dir`; empty if `dir` is absent.
fn subdirs(dir: &Path) -> anyhow::Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Dependencies of the resource module for the theme in `folder`.
pub fn theme_deps(folder: &Path) -> anyhow::Result<Vec<String>> {
    let mut deps = Vec::new();
    if folder.join("manifest.json").is_file() {
        deps.push("dojo/text!./manifest.json".to_string());
    }
    if folder.join("common.css").is_file() {
        deps.push("dojo/text!./common.css".to_string());
    }
    for style in subdirs(&folder.join("styles"))? {
        if folder.join("styles").join(&style).join("style.css").is_file() {
            deps.push(format!("dojo/text!./styles/{style}/style.css"));
        }
    }
    if folder.join("nls/strings.js").is_file() {
        deps.push("dojo/i18n!./nls/strings".to_string());
    }
    for panel in subdirs(&folder.join("panels"))? {
        if folder.join("panels").join(&panel).join("Panel.js").is_file() {
            deps.push(format!("./panels/{panel}/Panel"));
        }
    }
    Ok(deps)
}

/// Renders `define([deps...], function(){});`.
pub fn render_module(deps: &[String]) -> String {
    if deps.is_empty() {
        return "define([], function(){});\n".to_string();
    }
    let lines: Vec<String> = deps
        .iter()
        .map(|dep| format!("  {}", serde_json::Value::from(dep.as_str())))
        .collect();
    format!("define([\n{}\n], function(){{}});\n", lines.join(",\n"))
}

/// Path of the generated module inside `folder`.
pub fn module_path(folder: &Path) -> PathBuf {
    folder.join(format!("{GENERATED_MODULE}.js"))
}

/// Writes the module for the widget folder. A missing folder is skipped.
pub fn write_widget_module(folder: &Path) -> anyhow::Result<Option<PathBuf>> {
    if !folder.is_dir() {
        warn!("widget folder {} not found, skipping resource module", folder.display());
        return Ok(None);
    }
    write_module(folder, &widget_deps(folder)).map(Some)
}

/// Writes the module for the theme folder. A missing folder is skipped.
pub fn write_theme_module(folder: &Path) -> anyhow::Result<Option<PathBuf>> {
    if !folder.is_dir() {
        warn!("theme folder {} not found, skipping resource module", folder.display());
        return Ok(None);
    }
    write_module(folder, &theme_deps(folder)?).map(Some)
}

fn write_module(folder: &Path, deps: &[String]) -> anyhow::Result<PathBuf> {
    let path = module_path(folder);
    fs::write(&path, render_module(deps))
        .with_context(|| format!("Failed to write resource module {}", path.display()))?;
    debug!("wrote {} ({} deps)", path.display(), deps.len());
    Ok(path)
}
