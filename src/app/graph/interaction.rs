use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::{circle_visible, screen_to_world};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn on_screen_indices(
        rect: Rect,
        drawable: &[bool],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Vec<usize> {
        (0..screen_positions.len())
            .filter(|&index| {
                drawable[index] && circle_visible(rect, screen_positions[index], screen_radii[index])
            })
            .collect()
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        on_screen: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        on_screen
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        if let Some(key) = &selected {
            tracing::debug!(key = %key, "issue selected");
        }
        self.selected = selected;
    }

    pub(in crate::app) fn focus_issue(&mut self, key: &str) {
        if let Some(world) = self.render_graph.position_of(key) {
            self.pan = -(world * self.zoom);
        }
        self.set_selected(Some(key.to_owned()));
    }
}
