use std::collections::HashSet;

use eframe::egui::{self, Key, Response, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::engine::Axis;
use crate::issues::AxisEntry;

use super::super::ViewModel;

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;
const AXIS_LIST_HEIGHT: f32 = 180.0;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f32,
    negative_secs: f32,
    integer_carry: f32,
}

fn slider_key_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

fn apply_slider_arrow_acceleration_u8(
    ui: &Ui,
    response: &Response,
    value: &mut u8,
    min: u8,
    max: u8,
) -> bool {
    let state_id = response.id.with("arrow_key_hold_state");
    let mut hold_state = ui.ctx().data(|data| {
        data.get_temp::<SliderKeyHoldState>(state_id)
            .unwrap_or_default()
    });

    if !response.has_focus() {
        hold_state = SliderKeyHoldState::default();
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, hold_state));
        return false;
    }

    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    if increase_down {
        hold_state.positive_secs += delta_time;
    } else {
        hold_state.positive_secs = 0.0;
    }

    if decrease_down {
        hold_state.negative_secs += delta_time;
    } else {
        hold_state.negative_secs = 0.0;
    }

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        hold_state.integer_carry = 0.0;
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, hold_state));
        return false;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);
    hold_state.integer_carry += direction as f32 * speed * delta_time;

    let whole_delta = hold_state.integer_carry.trunc() as i32;
    hold_state.integer_carry -= whole_delta as f32;

    let old_value = *value;
    if whole_delta != 0 {
        *value = (i32::from(*value) + whole_delta).clamp(i32::from(min), i32::from(max)) as u8;
    }

    ui.ctx().request_repaint();
    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));
    *value != old_value
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn matching_entries<'a>(entries: &'a [AxisEntry], query: &str) -> Vec<&'a AxisEntry> {
    let query = query.trim();
    if query.is_empty() {
        return entries.iter().collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut ranked = entries
        .iter()
        .filter_map(|entry| {
            fuzzy_match_score(&matcher, &entry.label, query)
                .or_else(|| fuzzy_match_score(&matcher, &entry.key, query))
                .map(|score| (score, entry))
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().map(|(_, entry)| entry).collect()
}

enum AxisAction {
    Any,
    Nothing,
    Toggle(String),
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.separator();
        ui.add_space(4.0);

        self.draw_status_list(ui);
        ui.separator();

        ui.label("Search assignees and types")
            .on_hover_text("Fuzzy-filter the lists below without changing the graph.");
        ui.text_edit_singleline(&mut self.axis_search);
        ui.add_space(4.0);

        egui::CollapsingHeader::new("Assignees")
            .default_open(true)
            .show(ui, |ui| self.draw_axis_filter(ui, Axis::Assignee));
        egui::CollapsingHeader::new("Issue types")
            .default_open(true)
            .show(ui, |ui| self.draw_axis_filter(ui, Axis::Type));

        ui.separator();
        self.draw_similarity_controls(ui);
    }

    fn axis_filter(&self, axis: Axis) -> Option<&HashSet<String>> {
        match axis {
            Axis::Assignee => self.session.filters().assignee_filter(),
            Axis::Type => self.session.filters().type_filter(),
            Axis::Status => None,
        }
    }

    fn axis_entries(&self, axis: Axis) -> &[AxisEntry] {
        match axis {
            Axis::Assignee => &self.assignee_entries,
            Axis::Type => &self.type_entries,
            Axis::Status => &[],
        }
    }

    fn draw_axis_filter(&mut self, ui: &mut Ui, axis: Axis) {
        let filter = self.axis_filter(axis);
        let summary = match filter {
            None => "any".to_owned(),
            Some(keys) => format!("{} selected", keys.len()),
        };

        let mut action = None;
        let mut hovered = None;
        ui.horizontal(|ui| {
            if ui.small_button("Any").clicked() {
                action = Some(AxisAction::Any);
            }
            if ui.small_button("None").clicked() {
                action = Some(AxisAction::Nothing);
            }
            ui.small(summary);
        });

        let entries = matching_entries(self.axis_entries(axis), &self.axis_search);
        if entries.is_empty() {
            ui.small("No matches.");
        }
        egui::ScrollArea::vertical()
            .id_salt(("axis_filter", axis))
            .max_height(AXIS_LIST_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for entry in entries {
                    let mut checked = filter.is_none_or(|keys| keys.contains(&entry.key));
                    let text = RichText::new(format!("{} ({})", entry.label, entry.count));
                    let response = ui.checkbox(&mut checked, text);
                    if response.changed() {
                        action = Some(AxisAction::Toggle(entry.key.clone()));
                    }
                    if response.hovered() {
                        hovered = Some(entry.key.clone());
                    }
                }
            });

        match action {
            Some(AxisAction::Any) => {
                self.set_axis_filter(axis, None);
            }
            Some(AxisAction::Nothing) => {
                self.set_axis_filter(axis, Some(HashSet::new()));
            }
            Some(AxisAction::Toggle(key)) => self.toggle_axis_entry(axis, &key),
            None => {}
        }

        match hovered {
            Some(key) => self.session.set_hover(axis, &key),
            None => self.session.clear_hover(axis),
        };
    }

    fn set_axis_filter(&mut self, axis: Axis, keys: Option<HashSet<String>>) -> bool {
        match axis {
            Axis::Assignee => self.session.set_assignee_filter(keys),
            Axis::Type => self.session.set_type_filter(keys),
            Axis::Status => false,
        }
    }

    /// Unchecking while the axis is unrestricted keeps every other value selected.
    fn toggle_axis_entry(&mut self, axis: Axis, key: &str) {
        if self.axis_filter(axis).is_none() {
            let rest = self
                .axis_entries(axis)
                .iter()
                .filter(|entry| entry.key != key)
                .map(|entry| entry.key.clone())
                .collect::<HashSet<_>>();
            self.set_axis_filter(axis, Some(rest));
            return;
        }

        match axis {
            Axis::Assignee => self.session.toggle_assignee(key),
            Axis::Type => self.session.toggle_type(key),
            Axis::Status => self.session.toggle_status(key),
        };
    }

    fn draw_similarity_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Similarity").strong());
        ui.checkbox(&mut self.show_similarity, "Show similar issues")
            .on_hover_text("Draw dashed links between issues with similar text.");

        let mut percent = self.session.similarity_percent();
        let slider = ui
            .add_enabled(
                self.show_similarity,
                egui::Slider::new(&mut percent, 1..=100)
                    .suffix("%")
                    .text("Minimum score"),
            )
            .on_hover_text("Hide similarity links scoring below this threshold.");
        if slider.hovered() {
            slider.request_focus();
        }
        apply_slider_arrow_acceleration_u8(ui, &slider, &mut percent, 1, 100);
        self.session.set_similarity_percent(percent);

        let mut epsilon = self.session.cursors().curtain_epsilon();
        let epsilon_slider = ui
            .add(
                egui::Slider::new(&mut epsilon, 0.0..=6.0)
                    .step_by(0.5)
                    .text("Curtain tolerance (px)"),
            )
            .on_hover_text("How far a row may reach into a curtain before it counts as covered.");
        if epsilon_slider.changed() {
            self.session.set_curtain_epsilon(epsilon);
        }

        ui.small(format!("{} overlay redraws", self.overlay.borrow().redraws()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, label: &str) -> AxisEntry {
        AxisEntry {
            key: key.to_owned(),
            label: label.to_owned(),
            count: 1,
        }
    }

    #[test]
    fn empty_queries_keep_every_entry_in_order() {
        let entries = [entry("u2", "Lin"), entry("u1", "Ada")];
        let keys = matching_entries(&entries, "  ")
            .into_iter()
            .map(|entry| entry.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, ["u2", "u1"]);
    }

    #[test]
    fn fuzzy_queries_match_labels_or_keys_case_insensitively() {
        let entries = [
            entry("u1", "Ada Lovelace"),
            entry("u2", "Grace Hopper"),
            entry("svc-bot", "Release Bot"),
        ];
        let keys = |query: &str| {
            matching_entries(&entries, query)
                .into_iter()
                .map(|entry| entry.key.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(keys("grace"), ["u2"]);
        assert_eq!(keys("svc"), ["svc-bot"]);
        assert!(keys("zzz").is_empty());
    }
}
