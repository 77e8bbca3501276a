//! # jsliteral
//!
//! Read and write JavaScript object literals that carry regular expressions.
//!
//! Dojo-style build profiles and AMD `nls` bundles are scripts rather than
//! data: they may contain comments, unquoted keys, single-quoted strings and
//! regular-expression literals such as `/\.js$/`. This crate parses that
//! subset into a [`JsValue`] tree without evaluating anything, and renders a
//! tree back to script text with regular expressions kept as literals.
//!
//! ## Quick Start
//!
//! ```rust
//! use jsliteral::{JsValue, parse_assignment, to_assignment_string};
//!
//! let (_, mut profile) = parse_assignment("profile = { amd: /\\.js$/ };").unwrap();
//! profile
//!     .expect_object_mut()
//!     .unwrap()
//!     .insert("basePath", JsValue::from("./"));
//!
//! let text = to_assignment_string("profile", &profile).unwrap();
//! assert!(text.contains(r#""amd": /\.js$/"#));
//! ```
//!
//! ## Modules
//!
//! - [`value`] - The value tree and regular-expression literals
//! - [`parse`] - Parsing script text
//! - [`render`] - Rendering script text
//! - [`error`] - Error types

/// Error types for parsing and rendering.
pub mod error;

/// Parsing of literal scripts.
pub mod parse;

/// Rendering of value trees to script text.
pub mod render;

/// The literal value tree.
pub mod value;

pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use parse::{parse, parse_amd_define, parse_assignment};
pub use render::{to_assignment_string, to_literal_string};
pub use value::{JsObject, JsValue, RegExpLiteral};
