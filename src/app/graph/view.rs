use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};

use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, draw_background, lane_color, with_opacity, world_to_screen,
};

const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const SIMILAR_COLOR: Color32 = Color32::from_rgb(196, 132, 252);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        if response.dragged() {
            ui.ctx().request_repaint();
        }

        if self.render_graph.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The issue graph is empty.",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let (pan, zoom) = (self.pan, self.zoom);
        let styles = self.session.target();
        let screen_positions = self
            .render_graph
            .nodes
            .iter()
            .map(|node| world_to_screen(rect, pan, zoom, node.world_pos))
            .collect::<Vec<_>>();
        let screen_radii = self
            .render_graph
            .nodes
            .iter()
            .map(|node| (node.radius * zoom.powf(0.4)).clamp(2.5, 40.0))
            .collect::<Vec<_>>();
        let drawable = self
            .render_graph
            .nodes
            .iter()
            .map(|node| styles.node(&node.key).visible)
            .collect::<Vec<_>>();

        let on_screen = Self::on_screen_indices(rect, &drawable, &screen_positions, &screen_radii);
        let hovered = Self::hovered_index(ui, &on_screen, &screen_positions, &screen_radii);
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let zoom_sqrt = zoom.sqrt();
        let link_width = (1.2 * zoom_sqrt).clamp(0.6, 3.4);
        for edge in &self.render_graph.edges {
            let style = styles.link(edge.link);
            if !style.visible {
                continue;
            }

            let start = screen_positions[edge.source];
            let end = screen_positions[edge.target];
            let touches_selection = self.selected.as_deref().is_some_and(|selected| {
                self.render_graph.nodes[edge.source].key == selected
                    || self.render_graph.nodes[edge.target].key == selected
            });
            let base = if touches_selection {
                Color32::from_rgb(241, 146, 94)
            } else {
                Color32::from_rgb(120, 128, 140)
            };
            let color = with_opacity(base, style.opacity);
            painter.line_segment([start, end], Stroke::new(link_width, color));
            draw_arrow_head(&painter, start, end, screen_radii[edge.target], color);
        }

        if self.show_similarity {
            let mut overlay = self.overlay.borrow_mut();
            for &index in overlay.visible_pairs(&self.graph, styles) {
                let pair = &self.graph.similar[index];
                let (Some(&source), Some(&target)) = (
                    self.render_graph.index_by_key.get(&pair.source),
                    self.render_graph.index_by_key.get(&pair.target),
                ) else {
                    continue;
                };
                let opacity = styles
                    .node(&pair.source)
                    .opacity
                    .min(styles.node(&pair.target).opacity);
                let color = with_opacity(SIMILAR_COLOR, opacity * (0.35 + pair.score * 0.65));
                painter.extend(egui::Shape::dashed_line(
                    &[screen_positions[source], screen_positions[target]],
                    Stroke::new(1.0 + pair.score * 1.5, color),
                    6.0,
                    4.0,
                ));
            }
        }

        for &index in &on_screen {
            let node = &self.render_graph.nodes[index];
            let style = styles.node(&node.key);
            let position = screen_positions[index];
            let radius = screen_radii[index];
            let is_selected = self.selected.as_deref() == Some(node.key.as_str());
            let is_hovered = hovered == Some(index);

            if style.highlighted {
                painter.circle_filled(
                    position,
                    radius + 5.0,
                    with_opacity(HIGHLIGHT_COLOR, 0.45 * style.opacity.max(0.4)),
                );
            }

            let base = lane_color(node.lane, self.render_graph.known_lanes);
            let color = if is_selected {
                blend_color(base, SELECTED_COLOR, 0.8)
            } else if is_hovered {
                blend_color(base, Color32::WHITE, 0.35)
            } else {
                base
            };
            painter.circle_filled(position, radius, with_opacity(color, style.opacity));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if is_selected { 2.2 } else { 1.0 },
                    with_opacity(Color32::from_rgba_unmultiplied(15, 15, 15, 190), style.opacity),
                ),
            );

            let should_draw_label = style.label_visible
                && (is_selected || is_hovered || style.highlighted || zoom > 0.8);
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.key,
                    FontId::proportional(12.0),
                    with_opacity(Color32::from_gray(238), style.opacity.max(0.35)),
                );
            }
        }

        if let Some(index) = hovered
            && let Some(node) = self.graph.nodes_by_key.get(&self.render_graph.nodes[index].key)
        {
            let status = node.status.as_deref().unwrap_or("no status");
            let panel_text = format!(
                "{}  |  {}  |  {}",
                node.key,
                status,
                truncate_label(&node.summary, 60)
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let selected = hovered.map(|index| self.render_graph.nodes[index].key.clone());
            self.set_selected(selected);
        }
    }
}

fn draw_arrow_head(painter: &egui::Painter, start: Pos2, end: Pos2, inset: f32, color: Color32) {
    let direction = end - start;
    let length = direction.length();
    if length <= inset + 4.0 {
        return;
    }

    let unit = direction / length;
    let tip = end - unit * inset;
    let normal = vec2(-unit.y, unit.x);
    let size = 6.0;
    let back = tip - unit * size;
    painter.add(egui::Shape::convex_polygon(
        vec![tip, back + normal * (size * 0.5), back - normal * (size * 0.5)],
        color,
        Stroke::NONE,
    ));
}
