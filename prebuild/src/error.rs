//! Fatal preparation errors.
//!
//! Operations return `anyhow::Result`; these variants travel inside the
//! `anyhow::Error` so callers can tell configuration and resource problems
//! apart with `downcast_ref::<PrepareError>()`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepareError {
    /// `theme.name` is missing from the app config.
    #[error("app config has no theme name (`theme.name`)")]
    MissingTheme,

    /// Two layers with the same name but different contents.
    #[error("layer `{name}` is defined more than once")]
    DuplicateLayer { name: String },

    /// Two widget placements with the same URI.
    #[error("widget uri `{uri}` appears more than once in the app config")]
    DuplicateManifest { uri: String },

    /// A widget referenced by the app config has no manifest.
    #[error("manifest for widget `{uri}` not found at {}", path.display())]
    ManifestNotFound { uri: String, path: PathBuf },

    /// A manifest exists but is not a JSON object.
    #[error("malformed manifest {}: {reason}", path.display())]
    MalformedManifest { path: PathBuf, reason: String },

    /// The profile template lacks one of the umbrella layers.
    #[error("profile template has no `{name}` layer with an `include` list")]
    MissingUmbrellaLayer { name: String },

    /// The profile template is not an object literal.
    #[error("profile template must evaluate to an object, found {found}")]
    InvalidProfile { found: &'static str },

    /// A classification purpose name that does not exist.
    #[error("unknown widget purpose `{0}`")]
    UnknownPurpose(String),
}
