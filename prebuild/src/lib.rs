//! # prebuild
//!
//! Prepares a widget-based web application for the AMD bundler.
//!
//! Given the app config (`config.json` in the app root) and the manifest of every
//! placed widget, `prebuild` writes:
//!
//! - `build-src/app.profile.js`: the bundler profile, with one layer per
//!   active widget and one for the theme, split into preload and postload
//!   umbrella layers
//! - `build-src/widgets/_build-generate_widgets-manifest.json`: all widget
//!   manifests merged and localized
//! - `build-src/_build-generate_config.json`: the stamped app config
//! - `_build-generate_module.js` resource modules in each widget and theme
//!   folder
//!
//! ## Modules
//!
//! - [`build`] - Preparation passes and layer planning
//! - [`config`] - `.prebuild.toml` handling
//! - [`ctx`] - Build context and state management
//! - [`error`] - Fatal preparation errors
//! - [`manifest`] - Manifest merging and localization
//! - [`profile`] - The bundler build profile
//! - [`utils`] - Common utilities and helper functions
//! - [`widget`] - Widget placements, classification and panel resolution
//!
//! ## Example
//!
//! ```rust,no_run
//! use prebuild::ctx::{BuildContext, SetupInfo};
//!
//! let mut ctx = BuildContext::new("./my-app", SetupInfo::default())?;
//! ctx.prepare()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Preparation passes and layer planning.
pub mod build;

/// `.prebuild.toml` handling.
pub mod config;

/// Build context and state management.
pub mod ctx;

/// Fatal preparation errors.
pub mod error;

/// Manifest merging and localization.
pub mod manifest;

/// The bundler build profile.
pub mod profile;

/// Common utilities and helper functions.
pub mod utils;

/// Widget placements, classification and panel resolution.
pub mod widget;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub use error::PrepareError;
