mod graph;
mod load;
mod parse;

pub use graph::{AxisEntry, IssueGraph, IssueLink, IssueNode, SimilarPair};
pub use load::{build_issue_graph, load_issue_graph};
