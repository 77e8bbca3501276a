//! Manifest cache and in-panel resolution.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde_json::Value;

use crate::{error::PrepareError, widget::uri::widget_folder};

/// File name of a widget manifest inside its folder.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Read-through cache of widget manifests for one build run.
///
/// Every manifest is read from disk at most once, so all passes over the
/// app config see the same contents. A missing file is cached as `None`.
/// Malformed files are not cached; they abort the run.
#[derive(Debug)]
pub struct ManifestStore {
    base_path: PathBuf,
    cache: HashMap<PathBuf, Option<Value>>,
    reads: usize,
}

impl ManifestStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: HashMap::new(),
            reads: 0,
        }
    }

    /// Absolute folder of the widget behind `uri`.
    pub fn widget_dir(&self, uri: &str) -> PathBuf {
        self.base_path.join(widget_folder(uri))
    }

    pub fn manifest_path(&self, uri: &str) -> PathBuf {
        self.widget_dir(uri).join(MANIFEST_FILE)
    }

    /// Number of manifest files actually read from disk.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Returns the manifest for `uri`, or `None` if the file does not exist.
    pub fn lookup(&mut self, uri: &str) -> anyhow::Result<Option<&Value>> {
        let path = self.manifest_path(uri);
        if !self.cache.contains_key(&path) {
            let loaded = read_manifest(&path)?;
            if loaded.is_some() {
                self.reads += 1;
            }
            self.cache.insert(path.clone(), loaded);
        }
        Ok(self.cache.get(&path).and_then(Option::as_ref))
    }

    /// Like [`ManifestStore::lookup`], but a missing manifest is fatal.
    pub fn require(&mut self, uri: &str) -> anyhow::Result<&Value> {
        let path = self.manifest_path(uri);
        match self.lookup(uri)? {
            Some(manifest) => Ok(manifest),
            None => Err(PrepareError::ManifestNotFound {
                uri: uri.to_string(),
                path,
            }
            .into()),
        }
    }

    /// Whether the widget renders inside an always-loaded panel.
    ///
    /// Only an explicit `properties.inPanel: false` makes a widget off-panel.
    /// A widget without a manifest is treated as in-panel so that it never
    /// lands in the eagerly loaded preload bundle.
    pub fn is_in_panel(&mut self, uri: &str) -> anyhow::Result<bool> {
        let in_panel = match self.lookup(uri)? {
            None => {
                debug!("no manifest for {uri}, assuming in-panel");
                true
            }
            Some(manifest) => {
                manifest.pointer("/properties/inPanel") != Some(&Value::Bool(false))
            }
        };
        Ok(in_panel)
    }
}

fn read_manifest(path: &Path) -> anyhow::Result<Option<Value>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest: Value =
        serde_json::from_str(&content).map_err(|e| PrepareError::MalformedManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if !manifest.is_object() {
        return Err(PrepareError::MalformedManifest {
            path: path.to_path_buf(),
            reason: "expected a JSON object".to_string(),
        }
        .into());
    }
    debug!("loaded manifest {}", path.display());
    Ok(Some(manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(root: &Path, folder: &str, content: &str) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), content).unwrap();
    }

    #[test]
    fn test_in_panel_resolution() {
        let tmp = TempDir::new().unwrap();
        write_manifest(tmp.path(), "widgets/Off", r#"{"properties": {"inPanel": false}}"#);
        write_manifest(tmp.path(), "widgets/On", r#"{"properties": {"inPanel": true}}"#);
        write_manifest(tmp.path(), "widgets/NoProps", r#"{"name": "NoProps"}"#);
        write_manifest(tmp.path(), "widgets/Str", r#"{"properties": {"inPanel": "false"}}"#);

        let mut store = ManifestStore::new(tmp.path());
        assert!(!store.is_in_panel("widgets/Off/Widget").unwrap());
        assert!(store.is_in_panel("widgets/On/Widget").unwrap());
        assert!(store.is_in_panel("widgets/NoProps/Widget").unwrap());
        assert!(store.is_in_panel("widgets/Str/Widget").unwrap());
        assert!(store.is_in_panel("widgets/Missing/Widget").unwrap());
    }

    #[test]
    fn test_manifest_read_once() {
        let tmp = TempDir::new().unwrap();
        write_manifest(tmp.path(), "widgets/A", r#"{"properties": {"inPanel": false}}"#);

        let mut store = ManifestStore::new(tmp.path());
        for _ in 0..4 {
            assert!(!store.is_in_panel("widgets/A/Widget").unwrap());
        }
        // a second widget module in the same folder shares the entry
        store.require("widgets/A/Other").unwrap();
        assert_eq!(store.reads(), 1);

        // later changes on disk are not observed within the run
        write_manifest(tmp.path(), "widgets/A", r#"{"properties": {"inPanel": true}}"#);
        assert!(!store.is_in_panel("widgets/A/Widget").unwrap());
    }

    #[test]
    fn test_require_missing_and_malformed() {
        let tmp = TempDir::new().unwrap();
        write_manifest(tmp.path(), "widgets/Bad", "{not json");
        write_manifest(tmp.path(), "widgets/List", "[1, 2]");

        let mut store = ManifestStore::new(tmp.path());

        let err = store.require("widgets/Gone/Widget").unwrap_err();
        match err.downcast_ref::<PrepareError>() {
            Some(PrepareError::ManifestNotFound { uri, path }) => {
                assert_eq!(uri, "widgets/Gone/Widget");
                assert!(path.ends_with("widgets/Gone/manifest.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = store.is_in_panel("widgets/Bad/Widget").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepareError>(),
            Some(PrepareError::MalformedManifest { .. })
        ));
        assert!(err.to_string().contains("widgets/Bad/manifest.json"));

        let err = store.require("widgets/List/Widget").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }
}
