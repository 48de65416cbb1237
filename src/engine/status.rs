use std::collections::HashMap;

const LIFECYCLE: [(&str, &str); 14] = [
    ("BACKLOG", "Backlog"),
    ("TO_DO", "To Do"),
    ("SELECTED", "Selected"),
    ("ANALYSIS", "Analysis"),
    ("READY", "Ready"),
    ("IN_PROGRESS", "In Progress"),
    ("BLOCKED", "Blocked"),
    ("CODE_REVIEW", "Code Review"),
    ("TESTING", "Testing"),
    ("VERIFIED", "Verified"),
    ("READY_FOR_RELEASE", "Ready for Release"),
    ("RELEASED", "Released"),
    ("DONE", "Done"),
    ("CLOSED", "Closed"),
];

#[derive(Clone, Debug)]
pub struct StatusVocabulary {
    entries: Vec<(String, String)>,
    index_by_code: HashMap<String, usize>,
}

impl StatusVocabulary {
    pub fn lifecycle() -> Self {
        Self::from_entries(
            LIFECYCLE
                .iter()
                .map(|(code, label)| ((*code).to_owned(), (*label).to_owned())),
        )
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut ordered = Vec::new();
        let mut index_by_code = HashMap::new();
        for (code, label) in entries {
            let code = normalize_status(&code);
            if code.is_empty() || index_by_code.contains_key(&code) {
                continue;
            }
            index_by_code.insert(code.clone(), ordered.len());
            ordered.push((code, label));
        }

        Self {
            entries: ordered,
            index_by_code,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(code, _)| code.as_str())
    }

    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
        self.index_by_code
            .get(code)
            .map(|&index| self.entries[index].1.as_str())
            .unwrap_or(code)
    }

    pub fn index_of(&self, raw: &str) -> Option<usize> {
        self.index_by_code.get(&normalize_status(raw)).copied()
    }

    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.index_of(raw)
            .map(|index| self.entries[index].0.as_str())
    }
}

/// `" In progress "` and `"in-progress"` both become `IN_PROGRESS`.
pub fn normalize_status(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|ch| match ch {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}
