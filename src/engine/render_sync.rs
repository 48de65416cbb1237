use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::filter::{FilterComposer, FilterSubject};
use super::hover::HoverState;

pub const FULL_OPACITY: f32 = 1.0;
pub const CURTAIN_OPACITY: f32 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LinkEndpoint {
    Id(String),
    Node {
        #[serde(alias = "key")]
        id: String,
    },
}

impl LinkEndpoint {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Node { id } => id,
        }
    }
}

pub trait GraphModel {
    type Node: FilterSubject;

    fn node(&self, id: &str) -> Option<&Self::Node>;
    fn nodes(&self) -> impl Iterator<Item = (&str, &Self::Node)>;
    fn links(&self) -> impl Iterator<Item = (LinkId, &LinkEndpoint, &LinkEndpoint)>;
}

pub trait RenderTarget {
    fn set_node_display(&mut self, id: &str, visible: bool);
    fn set_label_display(&mut self, id: &str, visible: bool);
    fn set_node_opacity(&mut self, id: &str, opacity: f32);
    fn set_node_highlight(&mut self, id: &str, highlighted: bool);
    fn set_link_display(&mut self, link: LinkId, visible: bool);
    fn set_link_opacity(&mut self, link: LinkId, opacity: f32);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub visible_nodes: usize,
    pub dimmed_nodes: usize,
    pub highlighted_nodes: usize,
    pub visible_links: usize,
    pub dimmed_links: usize,
}

pub(crate) struct SyncInputs<'a> {
    pub filters: &'a FilterComposer,
    pub curtain: &'a HashSet<String>,
    pub hover: &'a HoverState,
}

struct NodeState {
    visible: bool,
    curtained: bool,
}

pub(crate) fn resync<G, T>(graph: &G, inputs: &SyncInputs<'_>, target: &mut T) -> SyncSummary
where
    G: GraphModel,
    T: RenderTarget + ?Sized,
{
    let mut summary = SyncSummary::default();
    let mut states = HashMap::new();

    for (id, node) in graph.nodes() {
        let visible = inputs.filters.is_visible(node);
        let code = inputs.filters.status_code(node);
        let curtained = code
            .as_deref()
            .is_some_and(|code| inputs.curtain.contains(code));

        target.set_node_display(id, visible);
        target.set_label_display(id, visible);

        let highlighted = visible && inputs.hover.matches(code.as_deref(), node);
        target.set_node_highlight(id, highlighted);

        if visible {
            summary.visible_nodes += 1;
            summary.highlighted_nodes += usize::from(highlighted);
            let opacity = if curtained {
                summary.dimmed_nodes += 1;
                CURTAIN_OPACITY
            } else {
                FULL_OPACITY
            };
            target.set_node_opacity(id, opacity);
        }

        states.insert(id, NodeState { visible, curtained });
    }

    for (link, source, target_end) in graph.links() {
        let endpoints = [source, target_end].map(|endpoint| {
            graph
                .node(endpoint.id())
                .and(states.get(endpoint.id()))
        });
        let [Some(from), Some(to)] = endpoints else {
            target.set_link_display(link, false);
            continue;
        };

        let visible = from.visible && to.visible;
        target.set_link_display(link, visible);
        if visible {
            summary.visible_links += 1;
            let opacity = if from.curtained || to.curtained {
                summary.dimmed_links += 1;
                CURTAIN_OPACITY
            } else {
                FULL_OPACITY
            };
            target.set_link_opacity(link, opacity);
        }
    }

    summary
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::{BTreeMap, HashMap};

    use super::{GraphModel, LinkEndpoint, LinkId, RenderTarget};
    use crate::engine::filter::fixtures::Item;

    #[derive(Debug, Default)]
    pub struct MemoryGraph {
        pub nodes: BTreeMap<String, Item>,
        pub links: Vec<(LinkEndpoint, LinkEndpoint)>,
    }

    impl MemoryGraph {
        pub fn with_node(mut self, id: &str, status: &str, assignee: &str, issue_type: &str) -> Self {
            self.nodes
                .insert(id.to_owned(), Item::new(status, assignee, issue_type));
            self
        }

        pub fn with_link(mut self, source: LinkEndpoint, target: LinkEndpoint) -> Self {
            self.links.push((source, target));
            self
        }
    }

    impl GraphModel for MemoryGraph {
        type Node = Item;

        fn node(&self, id: &str) -> Option<&Item> {
            self.nodes.get(id)
        }

        fn nodes(&self) -> impl Iterator<Item = (&str, &Item)> {
            self.nodes.iter().map(|(id, node)| (id.as_str(), node))
        }

        fn links(&self) -> impl Iterator<Item = (LinkId, &LinkEndpoint, &LinkEndpoint)> {
            self.links
                .iter()
                .enumerate()
                .map(|(index, (source, target))| (LinkId(index), source, target))
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingTarget {
        pub node_display: HashMap<String, bool>,
        pub label_display: HashMap<String, bool>,
        pub node_opacity: HashMap<String, f32>,
        pub highlighted: HashMap<String, bool>,
        pub link_display: HashMap<LinkId, bool>,
        pub link_opacity: HashMap<LinkId, f32>,
    }

    impl RenderTarget for RecordingTarget {
        fn set_node_display(&mut self, id: &str, visible: bool) {
            self.node_display.insert(id.to_owned(), visible);
        }

        fn set_label_display(&mut self, id: &str, visible: bool) {
            self.label_display.insert(id.to_owned(), visible);
        }

        fn set_node_opacity(&mut self, id: &str, opacity: f32) {
            self.node_opacity.insert(id.to_owned(), opacity);
        }

        fn set_node_highlight(&mut self, id: &str, highlighted: bool) {
            self.highlighted.insert(id.to_owned(), highlighted);
        }

        fn set_link_display(&mut self, link: LinkId, visible: bool) {
            self.link_display.insert(link, visible);
        }

        fn set_link_opacity(&mut self, link: LinkId, opacity: f32) {
            self.link_opacity.insert(link, opacity);
        }
    }
}
