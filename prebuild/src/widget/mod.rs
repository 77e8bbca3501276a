//! Widget placements in the app config tree.
//!
//! The app config is kept as a raw `serde_json::Value`: only the handful of
//! fields the classifier needs are read through [`WidgetNode`], and the rest
//! is written back untouched.
//!
//! - [`classify`] - Purpose predicates over placements
//! - [`panel`] - Manifest cache and in-panel resolution
//! - [`uri`] - URI to folder and module id helpers

use serde_json::Value;

/// Purpose predicates over placements.
pub mod classify;

/// Manifest cache and in-panel resolution.
pub mod panel;

/// URI to folder and module id helpers.
pub mod uri;

/// Read-only view of one node of the app config tree.
#[derive(Debug, Clone, Copy)]
pub struct WidgetNode<'a>(&'a Value);

impl<'a> WidgetNode<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &'a Value {
        self.0
    }

    /// The widget URI, when present and non-empty.
    pub fn uri(&self) -> Option<&'a str> {
        self.0
            .get("uri")
            .and_then(Value::as_str)
            .filter(|uri| !uri.is_empty())
    }

    /// Only an explicit `"visible": false` hides a widget.
    pub fn visible(&self) -> bool {
        self.0.get("visible") != Some(&Value::Bool(false))
    }

    /// Whether the node nests further placements (a group or controller).
    pub fn has_child_widgets(&self) -> bool {
        self.0.get("widgets").is_some_and(is_truthy)
    }

    /// An active leaf: no nested widgets, a URI, and not hidden.
    pub fn is_active_leaf(&self) -> bool {
        !self.has_child_widgets() && self.uri().is_some() && self.visible()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One visited node plus the context the walker derived for it.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub node: WidgetNode<'a>,
    /// Position of the node within its parent list.
    pub index: usize,
    pub is_theme_widget: bool,
    pub is_on_screen: bool,
}

/// Visits every placement node of an app config in document order.
pub trait ConfigWalker {
    fn visit<'a>(
        &self,
        app_config: &'a Value,
        visitor: &mut dyn FnMut(Placement<'a>) -> anyhow::Result<()>,
    ) -> anyhow::Result<()>;

    /// Collects all placements, in visit order.
    fn placements<'a>(&self, app_config: &'a Value) -> anyhow::Result<Vec<Placement<'a>>> {
        let mut out = Vec::new();
        self.visit(app_config, &mut |p| {
            out.push(p);
            Ok(())
        })?;
        Ok(out)
    }
}

/// Walks `widgetOnScreen` then `widgetPool`.
///
/// Within a section the `widgets` list comes before `groups`, and every
/// node is followed by its own nested `widgets`, depth first. Group and
/// controller nodes are visited too.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionWalker;

const SECTIONS: [(&str, bool); 2] = [("widgetOnScreen", true), ("widgetPool", false)];

impl SectionWalker {
    fn visit_list<'a>(
        nodes: &'a [Value],
        is_on_screen: bool,
        visitor: &mut dyn FnMut(Placement<'a>) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        for (index, value) in nodes.iter().enumerate() {
            let node = WidgetNode::new(value);
            visitor(Placement {
                node,
                index,
                is_theme_widget: node.uri().is_some_and(|uri| uri.starts_with("themes/")),
                is_on_screen,
            })?;
            if let Some(children) = value.get("widgets").and_then(Value::as_array) {
                Self::visit_list(children, is_on_screen, visitor)?;
            }
        }
        Ok(())
    }
}

impl ConfigWalker for SectionWalker {
    fn visit<'a>(
        &self,
        app_config: &'a Value,
        visitor: &mut dyn FnMut(Placement<'a>) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        for (name, is_on_screen) in SECTIONS {
            let Some(section) = app_config.get(name) else {
                continue;
            };
            for list in ["widgets", "groups"] {
                if let Some(nodes) = section.get(list).and_then(Value::as_array) {
                    Self::visit_list(nodes, is_on_screen, visitor)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_fields() {
        let v = json!({"uri": "widgets/A/Widget"});
        let n = WidgetNode::new(&v);
        assert_eq!(n.uri(), Some("widgets/A/Widget"));
        assert!(n.visible());
        assert!(n.is_active_leaf());

        let v = json!({"uri": "", "visible": false, "widgets": []});
        let n = WidgetNode::new(&v);
        assert_eq!(n.uri(), None);
        assert!(!n.visible());
        // an empty list still counts, as it would in a truthiness check
        assert!(n.has_child_widgets());

        let v = json!({"uri": "widgets/A/Widget", "visible": null, "widgets": null});
        assert!(WidgetNode::new(&v).is_active_leaf());
    }

    #[test]
    fn test_walk_order_and_flags() {
        let config = json!({
            "theme": {"name": "FoldableTheme"},
            "widgetOnScreen": {
                "widgets": [
                    {"uri": "widgets/A/Widget"},
                    {"uri": "themes/FoldableTheme/widgets/Header/Widget"}
                ],
                "groups": [
                    {"label": "g", "widgets": [{"uri": "widgets/C/Widget"}]}
                ]
            },
            "widgetPool": {
                "widgets": [
                    {"uri": "widgets/Ctrl/Widget", "widgets": [{"uri": "widgets/D/Widget"}]}
                ]
            }
        });

        let seen: Vec<_> = SectionWalker
            .placements(&config)
            .unwrap()
            .into_iter()
            .map(|p| (p.node.uri().unwrap_or("<group>"), p.index, p.is_theme_widget, p.is_on_screen))
            .collect();

        assert_eq!(
            seen,
            vec![
                ("widgets/A/Widget", 0, false, true),
                ("themes/FoldableTheme/widgets/Header/Widget", 1, true, true),
                ("<group>", 0, false, true),
                ("widgets/C/Widget", 0, false, true),
                ("widgets/Ctrl/Widget", 0, false, false),
                ("widgets/D/Widget", 0, false, false),
            ]
        );
    }

    #[test]
    fn test_visitor_error_stops_walk() {
        let config = json!({"widgetPool": {"widgets": [{"uri": "a/W"}, {"uri": "b/W"}]}});
        let mut count = 0;
        let res = SectionWalker.visit(&config, &mut |_| {
            count += 1;
            anyhow::bail!("stop")
        });
        assert!(res.is_err());
        assert_eq!(count, 1);
    }
}
