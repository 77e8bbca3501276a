//! Purpose predicates over widget placements.
//!
//! Each build pass asks one question of every placement: "is this a widget
//! for purpose X?". All purposes share the same base requirement, an
//! active leaf (no nested widgets, a URI, not hidden), and add at most a
//! theme, on-screen or in-panel condition on top.

use std::{collections::HashMap, fmt, str::FromStr};

use clap::ValueEnum;
use serde_json::Value;

use crate::{
    error::PrepareError,
    widget::{ConfigWalker, Placement, panel::ManifestStore},
};

/// The questions the build passes ask about a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum WidgetPurpose {
    /// Any active leaf widget.
    Widget,
    /// An active leaf widget that belongs to the theme.
    ThemeWidget,
    /// An active leaf widget not rendered in a panel, theme or not.
    OffPanelWidget,
    /// A non-theme widget rendered in a panel.
    InPanelWidget,
    /// A theme widget not rendered in a panel.
    ThemeOffPanelWidget,
    /// A non-theme, on-screen widget not rendered in a panel.
    OnScreenOffPanelWidget,
}

impl WidgetPurpose {
    pub const ALL: [WidgetPurpose; 6] = [
        WidgetPurpose::Widget,
        WidgetPurpose::ThemeWidget,
        WidgetPurpose::OffPanelWidget,
        WidgetPurpose::InPanelWidget,
        WidgetPurpose::ThemeOffPanelWidget,
        WidgetPurpose::OnScreenOffPanelWidget,
    ];

    /// The name used in app-builder configuration and logs.
    pub fn name(self) -> &'static str {
        match self {
            WidgetPurpose::Widget => "widget",
            WidgetPurpose::ThemeWidget => "themeWidget",
            WidgetPurpose::OffPanelWidget => "offPanelWidget",
            WidgetPurpose::InPanelWidget => "inPanelWidget",
            WidgetPurpose::ThemeOffPanelWidget => "themeOffPanelWidget",
            WidgetPurpose::OnScreenOffPanelWidget => "onScreenOffPanelWidget",
        }
    }
}

impl fmt::Display for WidgetPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WidgetPurpose {
    type Err = PrepareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetPurpose::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| PrepareError::UnknownPurpose(s.to_string()))
    }
}

/// Answers whether a widget renders inside an always-loaded panel.
pub trait PanelResolver {
    fn is_in_panel(&mut self, uri: &str) -> anyhow::Result<bool>;
}

impl PanelResolver for ManifestStore {
    fn is_in_panel(&mut self, uri: &str) -> anyhow::Result<bool> {
        ManifestStore::is_in_panel(self, uri)
    }
}

/// Fixed answers keyed by URI; unknown URIs are in-panel.
impl PanelResolver for HashMap<String, bool> {
    fn is_in_panel(&mut self, uri: &str) -> anyhow::Result<bool> {
        Ok(self.get(uri).copied().unwrap_or(true))
    }
}

/// Whether `placement` is a widget for `purpose`.
///
/// The panel resolver is only consulted for active leaves whose other
/// conditions already hold.
pub fn matches(
    purpose: WidgetPurpose,
    placement: &Placement<'_>,
    panels: &mut dyn PanelResolver,
) -> anyhow::Result<bool> {
    let node = placement.node;
    let Some(uri) = node.uri() else {
        return Ok(false);
    };
    if !node.is_active_leaf() {
        return Ok(false);
    }
    let theme = placement.is_theme_widget;

    let matched = match purpose {
        WidgetPurpose::Widget => true,
        WidgetPurpose::ThemeWidget => theme,
        WidgetPurpose::OffPanelWidget => !panels.is_in_panel(uri)?,
        WidgetPurpose::InPanelWidget => !theme && panels.is_in_panel(uri)?,
        WidgetPurpose::ThemeOffPanelWidget => theme && !panels.is_in_panel(uri)?,
        WidgetPurpose::OnScreenOffPanelWidget => {
            !theme && placement.is_on_screen && !panels.is_in_panel(uri)?
        }
    };
    Ok(matched)
}

/// All placements matching `purpose`, in walk order.
pub fn select<'a>(
    walker: &dyn ConfigWalker,
    app_config: &'a Value,
    purpose: WidgetPurpose,
    panels: &mut dyn PanelResolver,
) -> anyhow::Result<Vec<Placement<'a>>> {
    let mut selected = Vec::new();
    walker.visit(app_config, &mut |placement| {
        if matches(purpose, &placement, panels)? {
            selected.push(placement);
        }
        Ok(())
    })?;
    debug!("{} {purpose} placement(s) selected", selected.len());
    Ok(selected)
}
