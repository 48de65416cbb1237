use std::collections::HashSet;

use tracing::debug;

use super::status::{StatusVocabulary, normalize_status};

pub const UNASSIGNED_KEY: &str = "__unassigned__";
pub const UNKNOWN_TYPE_KEY: &str = "__unknown__";

pub trait FilterSubject {
    fn status(&self) -> Option<&str>;
    fn assignee_id(&self) -> Option<&str>;
    fn assignee(&self) -> Option<&str> {
        None
    }
    fn issue_type(&self) -> Option<&str>;
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub fn assignee_key(id: Option<&str>, name: Option<&str>) -> String {
    non_blank(id)
        .or_else(|| non_blank(name))
        .unwrap_or(UNASSIGNED_KEY)
        .to_owned()
}

pub fn type_key(issue_type: Option<&str>) -> String {
    non_blank(issue_type).unwrap_or(UNKNOWN_TYPE_KEY).to_owned()
}

pub fn subject_assignee_key(subject: &impl FilterSubject) -> String {
    assignee_key(subject.assignee_id(), subject.assignee())
}

pub fn subject_type_key(subject: &impl FilterSubject) -> String {
    type_key(subject.issue_type())
}

/// `None` leaves the axis unrestricted; an empty set hides everything on it.
fn axis_allows(filter: Option<&HashSet<String>>, key: &str) -> bool {
    match filter {
        None => true,
        Some(keys) => keys.contains(key),
    }
}

fn toggle_key(filter: &mut Option<HashSet<String>>, key: String) {
    match filter {
        None => *filter = Some(HashSet::from([key])),
        Some(keys) => {
            if !keys.remove(&key) {
                keys.insert(key);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct FilterComposer {
    vocabulary: StatusVocabulary,
    statuses: HashSet<String>,
    assignees: Option<HashSet<String>>,
    types: Option<HashSet<String>>,
}

impl FilterComposer {
    pub fn new(vocabulary: StatusVocabulary) -> Self {
        let statuses = vocabulary.codes().map(str::to_owned).collect();
        Self {
            vocabulary,
            statuses,
            assignees: None,
            types: None,
        }
    }

    pub fn vocabulary(&self) -> &StatusVocabulary {
        &self.vocabulary
    }

    pub fn active_statuses(&self) -> &HashSet<String> {
        &self.statuses
    }

    pub fn assignee_filter(&self) -> Option<&HashSet<String>> {
        self.assignees.as_ref()
    }

    pub fn type_filter(&self) -> Option<&HashSet<String>> {
        self.types.as_ref()
    }

    /// Values outside the vocabulary always pass.
    pub fn status_allowed(&self, status: &str) -> bool {
        match self.vocabulary.resolve(status) {
            Some(code) => self.statuses.contains(code),
            None => true,
        }
    }

    pub fn assignee_allowed(&self, assignee: Option<&str>) -> bool {
        axis_allows(self.assignees.as_ref(), &assignee_key(assignee, None))
    }

    pub fn type_allowed(&self, issue_type: Option<&str>) -> bool {
        axis_allows(self.types.as_ref(), &type_key(issue_type))
    }

    pub fn is_visible(&self, subject: &impl FilterSubject) -> bool {
        self.status_allowed(subject.status().unwrap_or_default())
            && axis_allows(self.assignees.as_ref(), &subject_assignee_key(subject))
            && axis_allows(self.types.as_ref(), &subject_type_key(subject))
    }

    pub fn select_all_statuses(&mut self) -> bool {
        let all = self
            .vocabulary
            .codes()
            .map(str::to_owned)
            .collect::<HashSet<_>>();
        self.replace_statuses(all)
    }

    pub fn select_no_statuses(&mut self) -> bool {
        self.replace_statuses(HashSet::new())
    }

    pub fn toggle_status(&mut self, status: &str) -> bool {
        let Some(code) = self.vocabulary.resolve(status).map(str::to_owned) else {
            debug!(status, "toggle ignored for unknown status");
            return false;
        };
        let enabled = !self.statuses.contains(&code);
        self.set_status(&code, enabled)
    }

    pub fn set_status(&mut self, status: &str, enabled: bool) -> bool {
        let Some(code) = self.vocabulary.resolve(status).map(str::to_owned) else {
            return false;
        };
        let changed = if enabled {
            self.statuses.insert(code.clone())
        } else {
            self.statuses.remove(&code)
        };
        if changed {
            debug!(status = %code, enabled, "status filter changed");
        }
        changed
    }

    fn replace_statuses(&mut self, next: HashSet<String>) -> bool {
        if next == self.statuses {
            return false;
        }
        debug!(active = next.len(), "status filter replaced");
        self.statuses = next;
        true
    }

    pub fn set_assignee_filter(&mut self, keys: Option<HashSet<String>>) -> bool {
        let keys = keys.map(|keys| {
            keys.iter()
                .map(|key| assignee_key(Some(key), None))
                .collect::<HashSet<_>>()
        });
        if keys == self.assignees {
            return false;
        }
        debug!(restricted = keys.as_ref().map(HashSet::len), "assignee filter replaced");
        self.assignees = keys;
        true
    }

    pub fn toggle_assignee(&mut self, key: &str) -> bool {
        toggle_key(&mut self.assignees, assignee_key(Some(key), None));
        true
    }

    pub fn set_type_filter(&mut self, keys: Option<HashSet<String>>) -> bool {
        let keys = keys.map(|keys| {
            keys.iter()
                .map(|key| type_key(Some(key)))
                .collect::<HashSet<_>>()
        });
        if keys == self.types {
            return false;
        }
        debug!(restricted = keys.as_ref().map(HashSet::len), "type filter replaced");
        self.types = keys;
        true
    }

    pub fn toggle_type(&mut self, key: &str) -> bool {
        toggle_key(&mut self.types, type_key(Some(key)));
        true
    }

    pub fn status_code(&self, subject: &impl FilterSubject) -> Option<String> {
        let status = subject.status()?;
        Some(
            self.vocabulary
                .resolve(status)
                .map(str::to_owned)
                .unwrap_or_else(|| normalize_status(status)),
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::FilterSubject;

    #[derive(Clone, Debug, Default)]
    pub struct Item {
        pub status: Option<String>,
        pub assignee_id: Option<String>,
        pub assignee: Option<String>,
        pub issue_type: Option<String>,
    }

    impl Item {
        pub fn new(status: &str, assignee_id: &str, issue_type: &str) -> Self {
            Self {
                status: Some(status.to_owned()),
                assignee_id: Some(assignee_id.to_owned()),
                assignee: None,
                issue_type: Some(issue_type.to_owned()),
            }
        }
    }

    impl FilterSubject for Item {
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
}
