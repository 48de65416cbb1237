use eframe::egui::{self, RichText, Ui};

use crate::engine::{CURTAIN_OPACITY, subject_assignee_key, subject_type_key};
use crate::util::truncate_label;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Issue Details");
        ui.add_space(6.0);

        let Some(selected_key) = self.selected.clone() else {
            ui.label("Select an issue in the graph.");
            return;
        };

        let Some(node) = self.graph.nodes_by_key.get(&selected_key) else {
            ui.label("Selected issue no longer exists in the graph.");
            return;
        };

        let style = self.session.target().node(&selected_key);
        let vocabulary = self.session.filters().vocabulary();
        let status_text = match node.status.as_deref() {
            Some(status) => match vocabulary.resolve(status) {
                Some(code) => vocabulary.label(code).to_owned(),
                None => format!("{status} (outside the lifecycle)"),
            },
            None => "none".to_owned(),
        };
        let assignee_text = match (node.assignee.as_deref(), node.assignee_id.as_deref()) {
            (Some(name), Some(id)) => format!("{name} ({id})"),
            (Some(name), None) => name.to_owned(),
            (None, Some(id)) => id.to_owned(),
            (None, None) => "Unassigned".to_owned(),
        };

        ui.label(RichText::new(node.key.as_str()).strong());
        if !node.summary.is_empty() {
            ui.label(node.summary.as_str());
        }
        ui.add_space(6.0);

        ui.label(format!("Status: {status_text}"));
        ui.label(format!("Assignee: {assignee_text}"));
        ui.label(format!(
            "Type: {}",
            node.issue_type.as_deref().unwrap_or("unknown")
        ));
        ui.small(format!(
            "filter keys: {} / {}",
            subject_assignee_key(node),
            subject_type_key(node)
        ));

        ui.separator();
        ui.label(RichText::new("Visibility").strong());
        if !style.visible {
            ui.label("- hidden by the current filters");
        } else if style.opacity <= CURTAIN_OPACITY {
            ui.label("- dimmed, its status is outside the window");
        } else {
            ui.label("- shown at full strength");
        }
        if style.highlighted {
            ui.label("- highlighted by the hovered filter value");
        }

        let mut pending_focus = None;
        let blocks = node.blocks.clone();
        let blocked_by = node.blocked_by.clone();
        for (title, keys) in [("Blocks", &blocks), ("Blocked by", &blocked_by)] {
            ui.separator();
            ui.label(RichText::new(format!("{title} ({})", keys.len())).strong());
            if keys.is_empty() {
                ui.small("none");
                continue;
            }

            egui::ScrollArea::vertical()
                .id_salt(("issue_relations", title))
                .max_height(180.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for key in keys {
                        let summary = self
                            .graph
                            .nodes_by_key
                            .get(key)
                            .map(|related| truncate_label(&related.summary, 48))
                            .unwrap_or_else(|| "not in this graph".to_owned());
                        let hidden = !self.session.target().node(key).visible;
                        let label = if hidden {
                            format!("{key}  {summary}  [hidden]")
                        } else {
                            format!("{key}  {summary}")
                        };
                        if ui.link(label).clicked() {
                            pending_focus = Some(key.clone());
                        }
                    }
                });
        }

        let similar = self
            .graph
            .similar
            .iter()
            .filter_map(|pair| {
                let other = if pair.source == selected_key {
                    &pair.target
                } else if pair.target == selected_key {
                    &pair.source
                } else {
                    return None;
                };
                Some((other.clone(), pair.score))
            })
            .collect::<Vec<_>>();
        if !similar.is_empty() {
            ui.separator();
            ui.label(RichText::new("Similar issues").strong());
            for (key, score) in similar {
                let text = format!("{key}  {:.0}%", score * 100.0);
                if ui.link(text).clicked() {
                    pending_focus = Some(key);
                }
            }
        }

        if let Some(key) = pending_focus
            && self.graph.nodes_by_key.contains_key(&key)
        {
            self.focus_issue(&key);
        }
    }
}
