use std::collections::HashMap;

use crate::engine::{FULL_OPACITY, LinkId, RenderTarget};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct NodeStyle {
    pub(super) visible: bool,
    pub(super) label_visible: bool,
    pub(super) opacity: f32,
    pub(super) highlighted: bool,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            visible: true,
            label_visible: true,
            opacity: FULL_OPACITY,
            highlighted: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct LinkStyle {
    pub(super) visible: bool,
    pub(super) opacity: f32,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: FULL_OPACITY,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct VisualStyles {
    nodes: HashMap<String, NodeStyle>,
    links: HashMap<LinkId, LinkStyle>,
}

impl VisualStyles {
    pub(super) fn node(&self, id: &str) -> NodeStyle {
        self.nodes.get(id).copied().unwrap_or_default()
    }

    pub(super) fn link(&self, link: LinkId) -> LinkStyle {
        self.links.get(&link).copied().unwrap_or_default()
    }

    fn node_mut(&mut self, id: &str) -> &mut NodeStyle {
        self.nodes.entry(id.to_owned()).or_default()
    }
}

impl RenderTarget for VisualStyles {
    fn set_node_display(&mut self, id: &str, visible: bool) {
        self.node_mut(id).visible = visible;
    }

    fn set_label_display(&mut self, id: &str, visible: bool) {
        self.node_mut(id).label_visible = visible;
    }

    fn set_node_opacity(&mut self, id: &str, opacity: f32) {
        self.node_mut(id).opacity = opacity;
    }

    fn set_node_highlight(&mut self, id: &str, highlighted: bool) {
        self.node_mut(id).highlighted = highlighted;
    }

    fn set_link_display(&mut self, link: LinkId, visible: bool) {
        self.links.entry(link).or_default().visible = visible;
    }

    fn set_link_opacity(&mut self, link: LinkId, opacity: f32) {
        self.links.entry(link).or_default().opacity = opacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_entities_fall_back_to_fully_visible() {
        let styles = VisualStyles::default();
        assert_eq!(styles.node("APP-1"), NodeStyle::default());
        assert!(styles.link(LinkId(3)).visible);
    }

    #[test]
    fn target_writes_are_kept_per_entity() {
        let mut styles = VisualStyles::default();
        styles.set_node_display("APP-1", false);
        styles.set_node_opacity("APP-2", 0.15);
        styles.set_link_display(LinkId(0), false);

        assert!(!styles.node("APP-1").visible);
        assert!(styles.node("APP-1").label_visible);
        assert_eq!(styles.node("APP-2").opacity, 0.15);
        assert!(!styles.link(LinkId(0)).visible);
    }
}
