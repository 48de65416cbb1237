use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::engine::LinkEndpoint;

use super::graph::{IssueGraph, IssueLink, IssueNode, SimilarPair};
use super::parse::{RawLink, normalize_key, parse_issue_document};

pub fn load_issue_graph(path: &Path) -> Result<IssueGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read issue graph from {}", path.display()))?;
    let graph = build_issue_graph(&raw, &path.display().to_string())
        .with_context(|| format!("failed to build issue graph from {}", path.display()))?;

    info!(
        path = %path.display(),
        issues = graph.node_count(),
        links = graph.link_count(),
        similar = graph.similar.len(),
        "issue graph loaded"
    );
    Ok(graph)
}

fn normalize_endpoint(endpoint: LinkEndpoint) -> LinkEndpoint {
    match endpoint {
        LinkEndpoint::Id(id) => LinkEndpoint::Id(normalize_key(&id)),
        LinkEndpoint::Node { id } => LinkEndpoint::Node {
            id: normalize_key(&id),
        },
    }
}

pub fn build_issue_graph(raw: &str, source: &str) -> Result<IssueGraph> {
    let document = parse_issue_document(raw)?;

    let mut nodes_by_key = HashMap::with_capacity(document.issues.len());
    let mut order = Vec::with_capacity(document.issues.len());

    for raw_issue in document.issues {
        let key = normalize_key(&raw_issue.key);
        if key.is_empty() {
            continue;
        }
        if nodes_by_key.contains_key(&key) {
            warn!(key = %key, "duplicate issue key, keeping the first entry");
            continue;
        }

        order.push(key.clone());
        nodes_by_key.insert(
            key.clone(),
            IssueNode {
                key,
                summary: raw_issue.summary.trim().to_owned(),
                status: raw_issue.status,
                assignee_id: raw_issue.assignee_id,
                assignee: raw_issue.assignee,
                issue_type: raw_issue.issue_type,
                blocks: Vec::new(),
                blocked_by: Vec::new(),
            },
        );
    }

    let mut seen = HashSet::new();
    let mut links = Vec::with_capacity(document.links.len());
    for RawLink {
        source: link_source,
        target,
        kind,
    } in document.links
    {
        let link_source = normalize_endpoint(link_source);
        let target = normalize_endpoint(target);
        let (from, to) = (link_source.id().to_owned(), target.id().to_owned());

        if from.is_empty() || to.is_empty() || from == to {
            continue;
        }
        if !seen.insert((from.clone(), to.clone())) {
            continue;
        }
        if !nodes_by_key.contains_key(&from) || !nodes_by_key.contains_key(&to) {
            warn!(from = %from, to = %to, "link endpoint not found among issues");
        }

        let blocking = kind
            .as_deref()
            .is_none_or(|kind| kind.trim().eq_ignore_ascii_case("blocks"));
        if blocking {
            if let Some(node) = nodes_by_key.get_mut(&from) {
                node.blocks.push(to.clone());
            }
            if let Some(node) = nodes_by_key.get_mut(&to) {
                node.blocked_by.push(from);
            }
        }

        links.push(IssueLink {
            source: link_source,
            target,
            kind,
        });
    }

    let similar = document
        .similar
        .into_iter()
        .filter(|pair| pair.score.is_finite())
        .map(|pair| SimilarPair {
            source: normalize_key(pair.source.id()),
            target: normalize_key(pair.target.id()),
            score: pair.score.clamp(0.0, 1.0),
        })
        .filter(|pair| pair.source != pair.target)
        .collect();

    Ok(IssueGraph {
        source: source.to_owned(),
        nodes_by_key,
        order,
        links,
        similar,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GraphModel, StatusVocabulary, UNASSIGNED_KEY};

    const SAMPLE: &str = r#"{
        "issues": [
            {"key": "APP-1", "status": "In Progress", "assigneeId": "u1", "assignee": "Ada", "issuetype": "Story"},
            {"key": " APP-2 ", "status": "Done", "issuetype": "Bug"},
            {"key": "APP-3", "status": "Parked", "assignee": "Lin"},
            {"key": "APP-1", "status": "Closed"}
        ],
        "links": [
            {"source": "APP-1", "target": {"id": "APP-2"}},
            {"source": {"key": "APP-1"}, "target": "APP-2"},
            {"source": "APP-2", "target": "APP-2"},
            {"source": "APP-3", "target": "APP-404"}
        ],
        "similar": [
            {"source": "APP-1", "target": "APP-3", "score": 1.7},
            {"source": "APP-2", "target": "APP-2", "score": 0.5}
        ]
    }"#;

    #[test]
    fn builds_nodes_in_document_order_and_dedupes_links() {
        let graph = build_issue_graph(SAMPLE, "sample").unwrap();
        assert_eq!(graph.order, ["APP-1", "APP-2", "APP-3"]);
        assert_eq!(graph.nodes_by_key["APP-1"].status.as_deref(), Some("In Progress"));
        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.nodes_by_key["APP-1"].blocks, ["APP-2"]);
        assert_eq!(graph.nodes_by_key["APP-2"].blocked_by, ["APP-1"]);

        let resolved = graph
            .links()
            .map(|(_, source, target)| {
                (
                    graph.node(source.id()).is_some(),
                    graph.node(target.id()).is_some(),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(resolved, [(true, true), (true, false)]);
    }

    #[test]
    fn only_blocking_links_fill_the_relation_lists() {
        let graph = build_issue_graph(
            r#"{
                "issues": [{"key": "A"}, {"key": "B"}, {"key": "C"}],
                "links": [
                    {"source": "A", "target": "B", "kind": "Blocks"},
                    {"source": "A", "target": "C", "kind": "relates"}
                ]
            }"#,
            "kinds",
        )
        .unwrap();
        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.nodes_by_key["A"].blocks, ["B"]);
        assert!(graph.nodes_by_key["C"].blocked_by.is_empty());
    }

    #[test]
    fn similarity_scores_are_clamped_and_self_pairs_dropped() {
        let graph = build_issue_graph(SAMPLE, "sample").unwrap();
        assert_eq!(graph.similar.len(), 1);
        assert_eq!(graph.similar[0].score, 1.0);
    }

    #[test]
    fn axis_entries_use_names_and_sentinels() {
        let graph = build_issue_graph(SAMPLE, "sample").unwrap();
        let assignees = graph.assignee_entries();
        let labels = assignees
            .iter()
            .map(|entry| entry.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["Ada", "Lin", "Unassigned"]);
        assert_eq!(assignees[0].key, "u1");
        assert_eq!(assignees[2].key, UNASSIGNED_KEY);

        let types = graph
            .type_entries()
            .into_iter()
            .map(|entry| entry.label)
            .collect::<Vec<_>>();
        assert_eq!(types, ["Bug", "Story", "Unknown type"]);
    }

    #[test]
    fn status_counts_skip_unknown_statuses() {
        let graph = build_issue_graph(SAMPLE, "sample").unwrap();
        let counts = graph.status_counts(&StatusVocabulary::lifecycle());
        assert_eq!(counts.get("IN_PROGRESS"), Some(&1));
        assert_eq!(counts.get("DONE"), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 2);
    }

    #[test]
    fn missing_files_report_the_path() {
        let error = load_issue_graph(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(error.to_string().contains("/definitely/not/here.json"));
    }
}
