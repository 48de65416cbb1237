use std::collections::{BTreeMap, HashMap};

use crate::engine::{
    FilterSubject, GraphModel, LinkEndpoint, LinkId, StatusVocabulary, UNASSIGNED_KEY,
    UNKNOWN_TYPE_KEY, subject_assignee_key, subject_type_key,
};

#[derive(Clone, Debug)]
pub struct IssueNode {
    pub key: String,
    pub summary: String,
    pub status: Option<String>,
    pub assignee_id: Option<String>,
    pub assignee: Option<String>,
    pub issue_type: Option<String>,
    pub blocks: Vec<String>,
    pub blocked_by: Vec<String>,
}

impl FilterSubject for IssueNode {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn assignee_id(&self) -> Option<&str> {
        self.assignee_id.as_deref()
    }

    fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    fn issue_type(&self) -> Option<&str> {
        self.issue_type.as_deref()
    }
}

#[derive(Clone, Debug)]
pub struct IssueLink {
    pub source: LinkEndpoint,
    pub target: LinkEndpoint,
    pub kind: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SimilarPair {
    pub source: String,
    pub target: String,
    pub score: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisEntry {
    pub key: String,
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug)]
pub struct IssueGraph {
    pub source: String,
    pub nodes_by_key: HashMap<String, IssueNode>,
    pub order: Vec<String>,
    pub links: Vec<IssueLink>,
    pub similar: Vec<SimilarPair>,
}

impl IssueGraph {
    pub fn node_count(&self) -> usize {
        self.nodes_by_key.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn assignee_entries(&self) -> Vec<AxisEntry> {
        let mut entries: BTreeMap<String, AxisEntry> = BTreeMap::new();
        for node in self.nodes_by_key.values() {
            let key = subject_assignee_key(node);
            let label = if key == UNASSIGNED_KEY {
                "Unassigned".to_owned()
            } else {
                node.assignee
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(key.as_str())
                    .to_owned()
            };
            entries
                .entry(key.clone())
                .or_insert_with(|| AxisEntry {
                    key,
                    label,
                    count: 0,
                })
                .count += 1;
        }
        sorted_entries(entries)
    }

    pub fn type_entries(&self) -> Vec<AxisEntry> {
        let mut entries: BTreeMap<String, AxisEntry> = BTreeMap::new();
        for node in self.nodes_by_key.values() {
            let key = subject_type_key(node);
            let label = if key == UNKNOWN_TYPE_KEY {
                "Unknown type".to_owned()
            } else {
                key.clone()
            };
            entries
                .entry(key.clone())
                .or_insert_with(|| AxisEntry {
                    key,
                    label,
                    count: 0,
                })
                .count += 1;
        }
        sorted_entries(entries)
    }

    pub fn status_counts(&self, vocabulary: &StatusVocabulary) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for node in self.nodes_by_key.values() {
            if let Some(code) = node
                .status
                .as_deref()
                .and_then(|status| vocabulary.resolve(status))
            {
                *counts.entry(code.to_owned()).or_insert(0) += 1;
            }
        }
        counts
    }
}

fn sorted_entries(entries: BTreeMap<String, AxisEntry>) -> Vec<AxisEntry> {
    let mut entries = entries.into_values().collect::<Vec<_>>();
    entries.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.key.cmp(&b.key))
    });
    entries
}

impl GraphModel for IssueGraph {
    type Node = IssueNode;

    fn node(&self, id: &str) -> Option<&IssueNode> {
        self.nodes_by_key.get(id)
    }

    fn nodes(&self) -> impl Iterator<Item = (&str, &IssueNode)> {
        self.order.iter().filter_map(|key| {
            self.nodes_by_key
                .get(key)
                .map(|node| (key.as_str(), node))
        })
    }

    fn links(&self) -> impl Iterator<Item = (LinkId, &LinkEndpoint, &LinkEndpoint)> {
        self.links
            .iter()
            .enumerate()
            .map(|(index, link)| (LinkId(index), &link.source, &link.target))
    }
}
