use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::engine::LinkEndpoint;

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawDocument {
    #[serde(default)]
    pub(super) issues: Vec<RawIssue>,
    #[serde(default)]
    pub(super) links: Vec<RawLink>,
    #[serde(default)]
    pub(super) similar: Vec<RawSimilar>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawIssue {
    #[serde(alias = "id")]
    pub(super) key: String,
    #[serde(default)]
    pub(super) summary: String,
    #[serde(default)]
    pub(super) status: Option<String>,
    #[serde(default, rename = "assigneeId")]
    pub(super) assignee_id: Option<String>,
    #[serde(default)]
    pub(super) assignee: Option<String>,
    #[serde(default, rename = "issuetype", alias = "issueType")]
    pub(super) issue_type: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawLink {
    pub(super) source: LinkEndpoint,
    pub(super) target: LinkEndpoint,
    #[serde(default)]
    pub(super) kind: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawSimilar {
    pub(super) source: LinkEndpoint,
    pub(super) target: LinkEndpoint,
    pub(super) score: f32,
}

pub(super) fn parse_issue_document(raw: &str) -> Result<RawDocument> {
    let document: RawDocument =
        serde_json::from_str(raw).context("invalid issue graph JSON")?;

    if document.issues.is_empty() {
        return Err(anyhow!("issue graph JSON contains no issues"));
    }

    Ok(document)
}

pub(super) fn normalize_key(value: &str) -> String {
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_issues_links_and_similarity() {
        let document = parse_issue_document(
            r#"{
                "issues": [
                    {"key": "APP-1", "status": "Done", "assigneeId": "u1", "issuetype": "Bug"},
                    {"id": "APP-2", "summary": "Second"}
                ],
                "links": [{"source": "APP-1", "target": {"id": "APP-2"}, "kind": "blocks"}],
                "similar": [{"source": {"key": "APP-1"}, "target": "APP-2", "score": 0.4}]
            }"#,
        )
        .unwrap();

        assert_eq!(document.issues.len(), 2);
        assert_eq!(document.issues[1].key, "APP-2");
        assert_eq!(document.issues[0].issue_type.as_deref(), Some("Bug"));
        assert_eq!(document.links[0].target.id(), "APP-2");
        assert_eq!(document.links[0].kind.as_deref(), Some("blocks"));
        assert_eq!(document.similar[0].source.id(), "APP-1");
    }

    #[test]
    fn empty_documents_are_rejected() {
        let error = parse_issue_document(r#"{"issues": []}"#).unwrap_err();
        assert!(error.to_string().contains("no issues"));
        assert!(parse_issue_document("not json").is_err());
    }
}
