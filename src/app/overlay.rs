use tracing::trace;

use crate::engine::{DEFAULT_SIMILARITY_PERCENT, RedrawRequest};
use crate::issues::IssueGraph;

use super::styles::VisualStyles;

/// The engine only tells the overlay *when* to redraw; pairs are recomputed
/// lazily on the next paint against the current style table.
#[derive(Debug)]
pub(super) struct SimilarityOverlay {
    threshold: f32,
    stale: bool,
    visible_pairs: Vec<usize>,
    redraws: u64,
}

impl Default for SimilarityOverlay {
    fn default() -> Self {
        Self {
            threshold: f32::from(DEFAULT_SIMILARITY_PERCENT) / 100.0,
            stale: true,
            visible_pairs: Vec::new(),
            redraws: 0,
        }
    }
}

impl SimilarityOverlay {
    pub(super) fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    pub(super) fn request(&mut self, request: RedrawRequest) {
        if let RedrawRequest::Threshold(threshold) = request {
            self.threshold = threshold.clamp(0.0, 1.0);
        }
        self.stale = true;
        self.redraws += 1;
    }

    pub(super) fn threshold(&self) -> f32 {
        self.threshold
    }

    pub(super) fn redraws(&self) -> u64 {
        self.redraws
    }

    pub(super) fn visible_pairs(&mut self, graph: &IssueGraph, styles: &VisualStyles) -> &[usize] {
        if self.stale {
            self.visible_pairs = graph
                .similar
                .iter()
                .enumerate()
                .filter(|(_, pair)| {
                    pair.score >= self.threshold
                        && graph.nodes_by_key.contains_key(&pair.source)
                        && graph.nodes_by_key.contains_key(&pair.target)
                        && styles.node(&pair.source).visible
                        && styles.node(&pair.target).visible
                })
                .map(|(index, _)| index)
                .collect();
            self.stale = false;
            trace!(
                pairs = self.visible_pairs.len(),
                threshold = self.threshold,
                "similarity overlay recomputed"
            );
        }
        &self.visible_pairs
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::engine::RenderTarget;
    use crate::issues::{IssueNode, SimilarPair};

    fn node(key: &str) -> IssueNode {
        IssueNode {
            key: key.to_owned(),
            summary: String::new(),
            status: Some("Done".to_owned()),
            assignee_id: None,
            assignee: None,
            issue_type: None,
            blocks: Vec::new(),
            blocked_by: Vec::new(),
        }
    }

    fn graph() -> IssueGraph {
        let keys = ["A", "B", "C"];
        IssueGraph {
            source: "memory".to_owned(),
            nodes_by_key: keys
                .iter()
                .map(|key| ((*key).to_owned(), node(key)))
                .collect::<HashMap<_, _>>(),
            order: keys.iter().map(|key| (*key).to_owned()).collect(),
            links: Vec::new(),
            similar: vec![
                SimilarPair {
                    source: "A".to_owned(),
                    target: "B".to_owned(),
                    score: 0.05,
                },
                SimilarPair {
                    source: "A".to_owned(),
                    target: "C".to_owned(),
                    score: 0.6,
                },
                SimilarPair {
                    source: "B".to_owned(),
                    target: "Z".to_owned(),
                    score: 0.9,
                },
            ],
        }
    }

    #[test]
    fn threshold_requests_change_the_pair_set() {
        let graph = graph();
        let styles = VisualStyles::default();
        let mut overlay = SimilarityOverlay::with_threshold(0.1);
        assert_eq!(overlay.visible_pairs(&graph, &styles), [1]);

        overlay.request(RedrawRequest::Threshold(0.01));
        assert_eq!(overlay.threshold(), 0.01);
        assert_eq!(overlay.visible_pairs(&graph, &styles), [0, 1]);
    }

    #[test]
    fn hidden_endpoints_drop_pairs_after_a_full_redraw() {
        let graph = graph();
        let mut styles = VisualStyles::default();
        let mut overlay = SimilarityOverlay::with_threshold(0.0);
        assert_eq!(overlay.visible_pairs(&graph, &styles), [0, 1]);

        styles.set_node_display("C", false);
        assert_eq!(overlay.visible_pairs(&graph, &styles), [0, 1]);
        overlay.request(RedrawRequest::Full);
        assert_eq!(overlay.visible_pairs(&graph, &styles), [0]);
        assert_eq!(overlay.redraws(), 1);
    }
}
