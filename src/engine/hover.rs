use super::filter::{FilterSubject, assignee_key, subject_assignee_key, subject_type_key, type_key};
use super::status::normalize_status;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Status,
    Assignee,
    Type,
}

/// At most one hovered value per axis. Emphasis only, never visibility.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    status: Option<String>,
    assignee: Option<String>,
    issue_type: Option<String>,
}

impl HoverState {
    pub fn get(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::Status => self.status.as_deref(),
            Axis::Assignee => self.assignee.as_deref(),
            Axis::Type => self.issue_type.as_deref(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_some() || self.assignee.is_some() || self.issue_type.is_some()
    }

    pub fn set(&mut self, axis: Axis, value: &str) -> bool {
        let key = match axis {
            Axis::Status => normalize_status(value),
            Axis::Assignee => assignee_key(Some(value), None),
            Axis::Type => type_key(Some(value)),
        };
        let slot = self.slot_mut(axis);
        if slot.as_deref() == Some(key.as_str()) {
            return false;
        }
        *slot = Some(key);
        true
    }

    pub fn clear(&mut self, axis: Axis) -> bool {
        self.slot_mut(axis).take().is_some()
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut Option<String> {
        match axis {
            Axis::Status => &mut self.status,
            Axis::Assignee => &mut self.assignee,
            Axis::Type => &mut self.issue_type,
        }
    }

    pub fn matches(&self, status_code: Option<&str>, subject: &impl FilterSubject) -> bool {
        if let (Some(hovered), Some(code)) = (&self.status, status_code)
            && hovered == code
        {
            return true;
        }
        if let Some(hovered) = &self.assignee
            && *hovered == subject_assignee_key(subject)
        {
            return true;
        }
        if let Some(hovered) = &self.issue_type
            && *hovered == subject_type_key(subject)
        {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::filter::UNASSIGNED_KEY;
    use crate::engine::filter::fixtures::Item;

    #[test]
    fn axes_are_tracked_independently() {
        let mut hover = HoverState::default();
        assert!(hover.set(Axis::Status, "Done"));
        assert!(hover.set(Axis::Type, "Bug"));
        assert!(!hover.set(Axis::Type, " Bug "));
        assert_eq!(hover.get(Axis::Status), Some("DONE"));

        assert!(hover.clear(Axis::Type));
        assert!(!hover.clear(Axis::Type));
        assert_eq!(hover.get(Axis::Status), Some("DONE"));
        assert!(hover.is_active());
    }

    #[test]
    fn any_matching_axis_highlights() {
        let mut hover = HoverState::default();
        let item = Item::new("TESTING", "u1", "Story");
        assert!(!hover.matches(Some("TESTING"), &item));

        hover.set(Axis::Type, "Story");
        assert!(hover.matches(Some("TESTING"), &item));

        hover.clear(Axis::Type);
        hover.set(Axis::Status, "DONE");
        hover.set(Axis::Assignee, "u2");
        assert!(!hover.matches(Some("TESTING"), &item));
        assert!(hover.matches(Some("DONE"), &item));
    }

    #[test]
    fn blank_assignee_hover_targets_unassigned_items() {
        let mut hover = HoverState::default();
        hover.set(Axis::Assignee, "");
        assert_eq!(hover.get(Axis::Assignee), Some(UNASSIGNED_KEY));
        let item = Item::new("DONE", " ", "Task");
        assert!(hover.matches(Some("DONE"), &item));
    }
}
