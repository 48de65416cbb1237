use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::engine::{GraphModel, StatusVocabulary};
use crate::issues::IssueGraph;
use crate::util::stable_pair;

use super::super::{RenderEdge, RenderGraph, RenderNode};

const LANE_SPACING: f32 = 150.0;
const ROW_SPACING: f32 = 54.0;
const JITTER: f32 = 14.0;

pub(in crate::app) fn node_radius(degree: usize) -> f32 {
    (7.0 + (degree as f32).sqrt() * 2.5).min(20.0)
}

impl RenderGraph {
    pub(in crate::app) fn build(graph: &IssueGraph, vocabulary: &StatusVocabulary) -> Self {
        let known_lanes = vocabulary.len();

        let mut index_by_key = HashMap::with_capacity(graph.node_count());
        let mut lanes = Vec::with_capacity(graph.node_count());
        for (key, node) in graph.nodes() {
            let lane = node
                .status
                .as_deref()
                .and_then(|status| vocabulary.index_of(status))
                .unwrap_or(known_lanes);
            index_by_key.insert(key.to_owned(), lanes.len());
            lanes.push((key.to_owned(), lane));
        }

        let mut degree = vec![0usize; lanes.len()];
        let mut edges = Vec::new();
        for (link, source, target) in graph.links() {
            let (Some(&source), Some(&target)) =
                (index_by_key.get(source.id()), index_by_key.get(target.id()))
            else {
                continue;
            };
            degree[source] += 1;
            degree[target] += 1;
            edges.push(RenderEdge {
                link,
                source,
                target,
            });
        }

        let mut lane_sizes = vec![0usize; known_lanes + 1];
        for (_, lane) in &lanes {
            lane_sizes[*lane] += 1;
        }
        let lane_offset = known_lanes as f32 * 0.5;

        let mut lane_fill = vec![0usize; known_lanes + 1];
        let nodes = lanes
            .into_iter()
            .enumerate()
            .map(|(index, (key, lane))| {
                let row = lane_fill[lane];
                lane_fill[lane] += 1;

                let column_height = lane_sizes[lane].saturating_sub(1) as f32 * ROW_SPACING;
                let (jx, jy) = stable_pair(&key);
                let world_pos = vec2(
                    (lane as f32 - lane_offset) * LANE_SPACING,
                    (row as f32 * ROW_SPACING) - (column_height * 0.5),
                ) + vec2(jx, jy) * JITTER;

                RenderNode {
                    key,
                    world_pos,
                    lane,
                    radius: node_radius(degree[index]),
                }
            })
            .collect();

        Self {
            nodes,
            edges,
            index_by_key,
            known_lanes,
        }
    }

    pub(in crate::app) fn position_of(&self, key: &str) -> Option<Vec2> {
        self.index_by_key
            .get(key)
            .and_then(|&index| self.nodes.get(index))
            .map(|node| node.world_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::build_issue_graph;

    fn graph() -> IssueGraph {
        build_issue_graph(
            r#"{
                "issues": [
                    {"key": "APP-1", "status": "Backlog"},
                    {"key": "APP-2", "status": "Backlog"},
                    {"key": "APP-3", "status": "Done"},
                    {"key": "APP-4", "status": "Parked"}
                ],
                "links": [
                    {"source": "APP-1", "target": "APP-3"},
                    {"source": "APP-2", "target": {"id": "APP-3"}},
                    {"source": "APP-2", "target": "APP-99"}
                ]
            }"#,
            "memory",
        )
        .unwrap()
    }

    #[test]
    fn lanes_follow_the_lifecycle_order() {
        let vocabulary = StatusVocabulary::lifecycle();
        let render = RenderGraph::build(&graph(), &vocabulary);

        let lane = |key: &str| render.nodes[render.index_by_key[key]].lane;
        assert_eq!(lane("APP-1"), 0);
        assert_eq!(lane("APP-3"), vocabulary.index_of("DONE").unwrap());
        assert_eq!(lane("APP-4"), render.known_lanes);

        let backlog = render.position_of("APP-1").unwrap();
        let done = render.position_of("APP-3").unwrap();
        assert!(backlog.x < done.x);
    }

    #[test]
    fn dangling_links_are_not_drawn_and_degree_grows_radius() {
        let render = RenderGraph::build(&graph(), &StatusVocabulary::lifecycle());
        assert_eq!(render.edges.len(), 2);

        let radius = |key: &str| render.nodes[render.index_by_key[key]].radius;
        assert!(radius("APP-3") > radius("APP-1"));
        assert_eq!(radius("APP-4"), node_radius(0));
    }
}
