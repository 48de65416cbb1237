use eframe::egui::{self, Color32, Key, Rect, RichText, Sense, Stroke, Ui, pos2, vec2};

use crate::engine::{
    Axis, Band, CursorElements, CursorInput, CursorRole, ListSnapshot, PointerId, RowGeometry,
    StepKey, WindowInput,
};

use super::super::render_utils::{lane_color, with_opacity};
use super::super::{StatusListIds, ViewModel};

const ROW_HEIGHT: f32 = 24.0;
const HANDLE_WIDTH: f32 = 14.0;
const HANDLE_HEIGHT: f32 = 12.0;
const WINDOW_BAR_WIDTH: f32 = 8.0;
const LIST_MAX_HEIGHT: f32 = 360.0;
const MOUSE: PointerId = PointerId(0);

struct StatusRow {
    code: String,
    label: String,
    count: usize,
    active: bool,
    curtained: bool,
    lane: usize,
}

enum RowAction {
    Toggle(String),
    Place(CursorRole, isize),
}

fn role_color(role: CursorRole) -> Color32 {
    match role {
        CursorRole::Start => Color32::from_rgb(103, 196, 255),
        CursorRole::End => Color32::from_rgb(241, 146, 94),
    }
}

fn pressed_step(ui: &Ui) -> Option<StepKey> {
    ui.input(|input| {
        if input.key_pressed(Key::ArrowUp) {
            Some(StepKey::Up)
        } else if input.key_pressed(Key::ArrowDown) {
            Some(StepKey::Down)
        } else {
            None
        }
    })
}

fn lock_vertical_arrows(ui: &Ui, id: egui::Id) {
    ui.memory_mut(|memory| {
        memory.set_focus_lock_filter(
            id,
            egui::EventFilter {
                vertical_arrows: true,
                ..Default::default()
            },
        );
    });
}

fn band_rect(snapshot: &ListSnapshot, band: Band, x_range: egui::Rangef) -> Rect {
    Rect::from_x_y_ranges(
        x_range,
        snapshot.to_client(band.top)..=snapshot.to_client(band.bottom()),
    )
}

impl ViewModel {
    pub(in crate::app) fn draw_status_list(&mut self, ui: &mut Ui) {
        self.mount_status_cursors();

        ui.horizontal(|ui| {
            ui.label(RichText::new("Statuses").strong());
            if ui.small_button("All").clicked() {
                self.session.select_all_statuses();
            }
            if ui.small_button("None").clicked() {
                self.session.select_no_statuses();
            }
        });
        match self.session.cursors().window_codes() {
            Some((start, end)) => {
                let vocabulary = self.session.filters().vocabulary();
                ui.small(format!(
                    "Window: {} to {}",
                    vocabulary.label(start),
                    vocabulary.label(end)
                ));
            }
            None => {
                ui.small("Window: not measured yet");
            }
        }

        let rows = self.status_rows();
        let known_lanes = rows.len();
        let mut actions = Vec::new();
        let mut hovered_code = None;

        let output = egui::ScrollArea::vertical()
            .id_salt(self.status_list.list)
            .max_height(LIST_MAX_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = 0.0;
                rows.iter()
                    .enumerate()
                    .map(|(index, row)| {
                        let line = ui.horizontal(|ui| {
                            ui.set_min_height(ROW_HEIGHT);
                            ui.add_space(2.0);
                            let (swatch, _) = ui.allocate_exact_size(vec2(6.0, 14.0), Sense::hover());
                            ui.painter()
                                .rect_filled(swatch, 1.0, lane_color(row.lane, known_lanes));

                            let mut text = RichText::new(format!("{} ({})", row.label, row.count));
                            if row.curtained {
                                text = text.color(Color32::from_gray(120));
                            }
                            let mut checked = row.active;
                            let response = ui.checkbox(&mut checked, text);
                            if response.changed() {
                                actions.push(RowAction::Toggle(row.code.clone()));
                            }
                            if response.hovered() {
                                hovered_code = Some(row.code.clone());
                            }
                            response.context_menu(|ui| {
                                if ui.button("Start window here").clicked() {
                                    actions.push(RowAction::Place(CursorRole::Start, index as isize));
                                    ui.close();
                                }
                                if ui.button("End window here").clicked() {
                                    actions.push(RowAction::Place(CursorRole::End, index as isize));
                                    ui.close();
                                }
                            });
                        });
                        let rect = line.response.rect;
                        RowGeometry {
                            code: row.code.clone(),
                            client_top: rect.top(),
                            height: rect.height(),
                        }
                    })
                    .collect::<Vec<_>>()
            });

        let list_rect = output.inner_rect;
        self.sync_list_snapshot(ListSnapshot {
            list_top: list_rect.top(),
            scroll_top: output.state.offset.y,
            rows: output.inner,
        });

        for action in actions {
            match action {
                RowAction::Toggle(code) => {
                    self.session.toggle_status(&code);
                }
                RowAction::Place(role, index) => {
                    self.session.set_cursor_index(role, index);
                }
            }
        }

        match hovered_code {
            Some(code) => self.session.set_hover(Axis::Status, &code),
            None => self.session.clear_hover(Axis::Status),
        };

        self.paint_cursors(ui, list_rect);
        self.handle_cursor(ui, list_rect, CursorRole::Start);
        self.handle_cursor(ui, list_rect, CursorRole::End);
        self.handle_window_bar(ui, list_rect);

        let unlisted = self
            .graph
            .node_count()
            .saturating_sub(self.status_counts.values().sum::<usize>());
        if unlisted > 0 {
            ui.small(format!("{unlisted} issues with other statuses are always shown"));
        }
    }

    fn mount_status_cursors(&mut self) {
        if self.session.cursors().cursor(CursorRole::Start).is_mounted() {
            return;
        }

        let ids = &self.status_list;
        let list = Some(StatusListIds::element(ids.list));
        let start = CursorElements {
            list,
            marker: Some(StatusListIds::element(ids.start_marker)),
            handle: Some(StatusListIds::element(ids.start_handle)),
        };
        let end = CursorElements {
            list,
            marker: Some(StatusListIds::element(ids.end_marker)),
            handle: Some(StatusListIds::element(ids.end_handle)),
        };
        self.session.mount_cursors(start, end);
    }

    fn status_rows(&self) -> Vec<StatusRow> {
        let filters = self.session.filters();
        let cursors = self.session.cursors();
        filters
            .vocabulary()
            .codes()
            .enumerate()
            .map(|(lane, code)| StatusRow {
                code: code.to_owned(),
                label: filters.vocabulary().label(code).to_owned(),
                count: self.status_counts.get(code).copied().unwrap_or(0),
                active: filters.active_statuses().contains(code),
                curtained: cursors.in_curtain(code),
                lane,
            })
            .collect()
    }

    /// A changed layout re-measures both cursors; a pure scroll only moves their viewport.
    fn sync_list_snapshot(&mut self, snapshot: ListSnapshot) {
        match &self.list_snapshot {
            Some(previous) if *previous == snapshot => return,
            Some(previous) if previous.measure() == snapshot.measure() => {
                self.session
                    .cursor_input(CursorRole::Start, CursorInput::Scroll(snapshot.clone()));
                self.session
                    .cursor_input(CursorRole::End, CursorInput::Scroll(snapshot.clone()));
            }
            Some(_) => {
                self.session
                    .cursor_input(CursorRole::Start, CursorInput::Resize(snapshot.clone()));
                self.session
                    .cursor_input(CursorRole::End, CursorInput::Resize(snapshot.clone()));
            }
            None => {
                self.session.refresh_list(&snapshot);
            }
        }
        self.list_snapshot = Some(snapshot);
    }

    fn paint_cursors(&self, ui: &Ui, list_rect: Rect) {
        let Some(snapshot) = &self.list_snapshot else {
            return;
        };
        let painter = ui.painter_at(list_rect.expand2(vec2(0.0, HANDLE_HEIGHT * 0.5)));
        let cursors = self.session.cursors();

        for role in [CursorRole::Start, CursorRole::End] {
            let Some(visual) = cursors.cursor(role).visual() else {
                continue;
            };
            painter.rect_filled(
                band_rect(snapshot, visual.curtain, list_rect.x_range()).intersect(list_rect),
                0.0,
                Color32::from_black_alpha(120),
            );

            let y = snapshot.to_client(visual.marker_y);
            painter.line_segment(
                [pos2(list_rect.left(), y), pos2(list_rect.right(), y)],
                Stroke::new(1.5, with_opacity(role_color(role), 0.85)),
            );
        }

        if let Some(window) = cursors.window() {
            let bar = band_rect(snapshot, window, self.window_bar_x(list_rect));
            let fill = if cursors.is_window_dragging() { 0.75 } else { 0.45 };
            painter.rect_filled(bar, 3.0, with_opacity(Color32::from_gray(200), fill));
        }
    }

    fn window_bar_x(&self, list_rect: Rect) -> egui::Rangef {
        let right = list_rect.right() - HANDLE_WIDTH - 4.0;
        egui::Rangef::new(right - WINDOW_BAR_WIDTH, right)
    }

    fn handle_cursor(&mut self, ui: &mut Ui, list_rect: Rect, role: CursorRole) {
        let Some(snapshot) = self.list_snapshot.clone() else {
            return;
        };
        let cursor = self.session.cursors().cursor(role);
        let Some(visual) = cursor.visual() else {
            return;
        };
        let id = match role {
            CursorRole::Start => self.status_list.start_handle,
            CursorRole::End => self.status_list.end_handle,
        };
        let target = StatusListIds::element(id);
        let was_dragging = cursor.is_dragging();

        let center = pos2(
            list_rect.right() - (HANDLE_WIDTH * 0.5),
            snapshot.to_client(visual.marker_y),
        );
        let rect = Rect::from_center_size(center, vec2(HANDLE_WIDTH, HANDLE_HEIGHT));
        let response = ui
            .interact(rect, id, Sense::click_and_drag())
            .on_hover_text(format!("{} of the status window", role.label()));

        let focused = response.has_focus();
        let color = role_color(role);
        let fill = if response.hovered() || was_dragging || focused {
            color
        } else {
            with_opacity(color, 0.7)
        };
        ui.painter().rect_filled(rect, 3.0, fill);
        if focused {
            ui.painter().rect_stroke(
                rect.expand(1.5),
                3.0,
                Stroke::new(1.0, Color32::WHITE),
                egui::StrokeKind::Outside,
            );
        }

        let pointer_y = ui.input(|input| input.pointer.interact_pos()).map(|pos| pos.y);
        if response.drag_started()
            && let Some(client_y) = pointer_y
        {
            response.request_focus();
            self.session.cursor_input(
                role,
                CursorInput::PointerDown {
                    target,
                    pointer: MOUSE,
                    client_y,
                },
            );
        }
        if response.dragged()
            && let Some(client_y) = pointer_y
        {
            self.session
                .cursor_input(role, CursorInput::PointerMove { pointer: MOUSE, client_y });
            ui.ctx().request_repaint();
        }
        if response.drag_stopped() {
            self.session
                .cursor_input(role, CursorInput::PointerUp { pointer: MOUSE });
        }

        let escaped = ui.input(|input| input.key_pressed(Key::Escape));
        let lost = !response.dragged() && !response.drag_stopped();
        if self.session.cursors().cursor(role).is_dragging() && (escaped || lost) {
            self.session
                .cursor_input(role, CursorInput::PointerCancel { pointer: MOUSE });
        }

        if response.clicked() {
            response.request_focus();
        }
        if focused {
            lock_vertical_arrows(ui, id);
            if let Some(key) = pressed_step(ui) {
                self.session.cursor_input(role, CursorInput::Key { target, key });
            }
        }
    }

    fn handle_window_bar(&mut self, ui: &mut Ui, list_rect: Rect) {
        let Some(snapshot) = self.list_snapshot.clone() else {
            return;
        };
        let Some(window) = self.session.cursors().window() else {
            return;
        };
        let id = self.status_list.window;
        let rect = band_rect(&snapshot, window, self.window_bar_x(list_rect));
        let response = ui
            .interact(rect, id, Sense::click_and_drag())
            .on_hover_text("Drag to move the whole window");
        if response.hovered() || response.dragged() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::ResizeVertical);
        }

        let pointer_y = ui.input(|input| input.pointer.interact_pos()).map(|pos| pos.y);
        if response.drag_started()
            && let Some(client_y) = pointer_y
        {
            response.request_focus();
            self.session.window_input(WindowInput::PointerDown {
                pointer: MOUSE,
                client_y,
            });
        }
        if response.dragged()
            && let Some(client_y) = pointer_y
        {
            self.session.window_input(WindowInput::PointerMove {
                pointer: MOUSE,
                client_y,
            });
            ui.ctx().request_repaint();
        }
        if response.drag_stopped() {
            self.session
                .window_input(WindowInput::PointerUp { pointer: MOUSE });
        }

        let escaped = ui.input(|input| input.key_pressed(Key::Escape));
        let lost = !response.dragged() && !response.drag_stopped();
        if self.session.cursors().is_window_dragging() && (escaped || lost) {
            self.session
                .window_input(WindowInput::PointerCancel { pointer: MOUSE });
        }

        if response.clicked() {
            response.request_focus();
        }
        if response.has_focus() {
            lock_vertical_arrows(ui, id);
            if let Some(key) = pressed_step(ui) {
                self.session.window_input(WindowInput::Key(key));
            }
        }
    }
}
