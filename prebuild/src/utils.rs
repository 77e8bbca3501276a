//! Common utilities and helper functions.
//!
//! Placeholder expansion for configured paths and the writers used for
//! every generated artifact.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::Context;
use colored::Colorize;
use regex::{Captures, Regex};
use serde::Serialize;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{env:([^}]*)\}").expect("valid placeholder regex"));

/// Replaces environment variable placeholders in a string.
///
/// Placeholders use the format `${env:VAR_NAME}` where `VAR_NAME` is the
/// name of an environment variable. If the variable is not set, the
/// placeholder is replaced with an empty string.
///
/// # Example
///
/// ```rust
/// use prebuild::utils::replace_env_placeholders;
///
/// unsafe { std::env::set_var("PREBUILD_DOC_VAR", "hello"); }
/// let result = replace_env_placeholders("Value: ${env:PREBUILD_DOC_VAR}");
/// assert_eq!(result, "Value: hello");
/// ```
pub fn replace_env_placeholders(input: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(input, |caps: &Captures<'_>| match std::env::var(&caps[1]) {
            Ok(value) => {
                debug!("Using {}={value}", &caps[1]);
                value
            }
            Err(_) => String::new(),
        })
        .into_owned()
}

/// Expands `${workspaceFolder}` (the app root) and `${env:VAR}` in a
/// configured path. Relative results are resolved against `app_root`.
pub fn expand_path(raw: &str, app_root: &Path) -> PathBuf {
    let value = raw.replace("${workspaceFolder}", &app_root.display().to_string());
    let path = PathBuf::from(replace_env_placeholders(&value));
    if path.is_relative() {
        app_root.join(path)
    } else {
        path
    }
}

/// Prints a generated artifact path the way commands are echoed.
pub fn print_written(kind: &str, path: &Path) {
    println!("{}", format!("{kind}: {}", path.display()).bold().purple());
}

/// Writes `content`, creating missing parent directories.
pub fn write_text(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Writes `value` as pretty JSON, creating missing parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    write_text(path, &content)
}
