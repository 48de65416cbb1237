use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, trace};

use super::cursor::{
    CursorElements, CursorInput, CurtainMode, CursorRole, LimitStrategy, RangeCursor, StepKey,
};
use super::geometry::{Band, Limits, ListItem, ListSnapshot, PointerId};

pub const WINDOW_MIN_HEIGHT: f32 = 32.0;
pub const DEFAULT_CURTAIN_EPSILON: f32 = 0.5;

/// Guard against the coordinator reacting to its own corrective moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdjustPhase {
    #[default]
    Idle,
    Adjusting,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WindowInput {
    PointerDown { pointer: PointerId, client_y: f32 },
    PointerMove { pointer: PointerId, client_y: f32 },
    PointerUp { pointer: PointerId },
    PointerCancel { pointer: PointerId },
    Key(StepKey),
}

#[derive(Clone, Copy, Debug)]
struct WindowDrag {
    pointer: PointerId,
    origin_y: f32,
    start: f32,
    end: f32,
    limits: Limits,
}

pub fn center_limits() -> LimitStrategy {
    Rc::new(|items: &[ListItem]| match (items.first(), items.last()) {
        (Some(first), Some(last)) => Limits {
            min: first.center(),
            max: last.center(),
        },
        _ => Limits {
            min: f32::NAN,
            max: f32::NAN,
        },
    })
}

#[derive(Debug)]
pub struct CursorPair {
    start: RangeCursor,
    end: RangeCursor,
    phase: AdjustPhase,
    curtain_epsilon: f32,
    curtain: HashSet<String>,
    window: Option<Band>,
    window_drag: Option<WindowDrag>,
    corrections: u64,
}

impl CursorPair {
    pub fn new(curtain_epsilon: f32) -> Self {
        let strategy = center_limits();
        let mut start = RangeCursor::new(CursorRole::Start, CurtainMode::From);
        let mut end = RangeCursor::new(CursorRole::End, CurtainMode::To);
        start.set_limit_strategy(Some(Rc::clone(&strategy)));
        end.set_limit_strategy(Some(strategy));

        Self {
            start,
            end,
            phase: AdjustPhase::Idle,
            curtain_epsilon: sanitize_epsilon(curtain_epsilon),
            curtain: HashSet::new(),
            window: None,
            window_drag: None,
            corrections: 0,
        }
    }

    pub fn mount(&mut self, start: CursorElements, end: CursorElements) -> bool {
        let start_mounted = self.start.mount(start);
        let end_mounted = self.end.mount(end);
        start_mounted && end_mounted
    }

    pub fn cursor(&self, role: CursorRole) -> &RangeCursor {
        match role {
            CursorRole::Start => &self.start,
            CursorRole::End => &self.end,
        }
    }

    fn cursor_mut(&mut self, role: CursorRole) -> &mut RangeCursor {
        match role {
            CursorRole::Start => &mut self.start,
            CursorRole::End => &mut self.end,
        }
    }

    pub fn phase(&self) -> AdjustPhase {
        self.phase
    }

    pub fn corrections(&self) -> u64 {
        self.corrections
    }

    pub fn positions(&self) -> Option<(f32, f32)> {
        Some((self.start.position()?, self.end.position()?))
    }

    pub fn items(&self) -> &[ListItem] {
        self.start.items()
    }

    pub fn curtain(&self) -> &HashSet<String> {
        &self.curtain
    }

    pub fn in_curtain(&self, code: &str) -> bool {
        self.curtain.contains(code)
    }

    pub fn window(&self) -> Option<Band> {
        self.window
    }

    pub fn is_window_dragging(&self) -> bool {
        self.window_drag.is_some()
    }

    pub fn curtain_epsilon(&self) -> f32 {
        self.curtain_epsilon
    }

    pub fn set_curtain_epsilon(&mut self, epsilon: f32) -> bool {
        let epsilon = sanitize_epsilon(epsilon);
        if epsilon == self.curtain_epsilon {
            return false;
        }
        self.curtain_epsilon = epsilon;
        self.recompute_curtain()
    }

    pub fn window_codes(&self) -> Option<(&str, &str)> {
        let items = self.items();
        let start = items.get(self.start.index()?)?;
        let end = items.get(self.end.index()?)?;
        Some((start.code.as_str(), end.code.as_str()))
    }

    pub fn refresh(&mut self, snapshot: &ListSnapshot) -> bool {
        let before = self.positions();
        let end_was_unset = self.end.position().is_none();

        if self.start.refresh(snapshot).is_some() {
            self.on_cursor_moved(CursorRole::Start);
        }
        if self.end.refresh(snapshot).is_some() {
            if end_was_unset {
                self.end.set_position_from_index(isize::MAX);
            }
            self.on_cursor_moved(CursorRole::End);
        }

        let curtain_changed = self.recompute_curtain();
        self.sync_window();
        curtain_changed || before != self.positions()
    }

    pub fn set_position(&mut self, role: CursorRole, y: f32) -> bool {
        let before = self.positions();
        if self.cursor_mut(role).set_position(y).is_some() {
            self.on_cursor_moved(role);
        }
        before != self.positions()
    }

    pub fn set_position_from_index(&mut self, role: CursorRole, index: isize) -> bool {
        let before = self.positions();
        if self.cursor_mut(role).set_position_from_index(index).is_some() {
            self.on_cursor_moved(role);
        }
        before != self.positions()
    }

    pub fn handle(&mut self, role: CursorRole, input: CursorInput) -> bool {
        let before = self.positions();
        let curtain_before = self.curtain.clone();
        let remeasured = matches!(input, CursorInput::Scroll(_) | CursorInput::Resize(_));
        if self.cursor_mut(role).handle_input(input).is_some() {
            self.on_cursor_moved(role);
        }
        if remeasured {
            self.recompute_curtain();
            self.sync_window();
        }
        before != self.positions() || curtain_before != self.curtain
    }

    pub fn handle_window(&mut self, input: WindowInput) -> bool {
        match input {
            WindowInput::PointerDown { pointer, client_y } => {
                if self.window_drag.is_some() {
                    return false;
                }
                let (Some((start, end)), Some(limits)) = (self.positions(), self.combined_limits())
                else {
                    return false;
                };
                self.window_drag = Some(WindowDrag {
                    pointer,
                    origin_y: self.start.viewport().to_local(client_y),
                    start,
                    end,
                    limits,
                });
                trace!(?pointer, "window drag captured");
                false
            }
            WindowInput::PointerMove { pointer, client_y } => {
                let Some(drag) = self.window_drag.filter(|drag| drag.pointer == pointer) else {
                    return false;
                };
                let delta = self.start.viewport().to_local(client_y) - drag.origin_y;
                self.shift_window(drag.start, drag.end, delta, drag.limits)
            }
            WindowInput::PointerUp { pointer } | WindowInput::PointerCancel { pointer } => {
                if self.window_drag.is_some_and(|drag| drag.pointer == pointer) {
                    self.window_drag = None;
                    trace!(?pointer, "window drag released");
                }
                false
            }
            WindowInput::Key(key) => {
                let (Some((start, end)), Some(limits)) = (self.positions(), self.combined_limits())
                else {
                    return false;
                };
                self.shift_window(start, end, key.delta(), limits)
            }
        }
    }

    fn combined_limits(&self) -> Option<Limits> {
        let start = self.start.bounds()?;
        let end = self.end.bounds()?;
        Some(Limits {
            min: start.min.min(end.min),
            max: start.max.max(end.max),
        })
    }

    fn shift_window(&mut self, start: f32, end: f32, delta: f32, limits: Limits) -> bool {
        let before = self.positions();
        let low = start.min(end);
        let high = start.max(end);
        let room_up = limits.min - low;
        let room_down = limits.max - high;
        let delta = if room_up > room_down {
            0.0
        } else {
            delta.clamp(room_up, room_down)
        };

        self.phase = AdjustPhase::Adjusting;
        if self.start.set_position(start + delta).is_some() {
            self.on_cursor_moved(CursorRole::Start);
        }
        if self.end.set_position(end + delta).is_some() {
            self.on_cursor_moved(CursorRole::End);
        }
        self.phase = AdjustPhase::Idle;

        self.settle(CursorRole::End);
        before != self.positions()
    }

    fn on_cursor_moved(&mut self, role: CursorRole) {
        if self.phase == AdjustPhase::Adjusting {
            return;
        }
        self.settle(role);
    }

    fn settle(&mut self, moved: CursorRole) {
        self.enforce_order(moved);
        self.recompute_curtain();
        self.sync_window();
    }

    fn enforce_order(&mut self, moved: CursorRole) {
        let Some((start, end)) = self.positions() else {
            return;
        };
        if start <= end {
            return;
        }

        let anchor = self.cursor(moved.other()).position().unwrap_or(start);
        self.phase = AdjustPhase::Adjusting;
        if self.cursor_mut(moved).set_position(anchor).is_some() {
            self.on_cursor_moved(moved);
        }
        self.phase = AdjustPhase::Idle;
        self.corrections += 1;
        debug!(cursor = moved.label(), anchor, "cursor snapped to keep start <= end");
    }

    fn recompute_curtain(&mut self) -> bool {
        let next = match self.positions() {
            Some((start, end)) => {
                let low = start.min(end);
                let high = start.max(end);
                let epsilon = self.curtain_epsilon;
                self.start
                    .items()
                    .iter()
                    .filter(|item| item.bottom() <= low || item.top >= high - epsilon)
                    .map(|item| item.code.clone())
                    .collect()
            }
            None => HashSet::new(),
        };

        if next == self.curtain {
            return false;
        }
        self.curtain = next;
        true
    }

    fn sync_window(&mut self) {
        self.window = self.positions().map(|(start, end)| {
            let span = Band::between(start, end);
            let height = span.height.max(WINDOW_MIN_HEIGHT);
            let middle = span.top + (span.height * 0.5);
            Band {
                top: middle - (height * 0.5),
                height,
            }
        });
    }
}

fn sanitize_epsilon(epsilon: f32) -> f32 {
    if epsilon.is_finite() {
        epsilon.max(0.0)
    } else {
        DEFAULT_CURTAIN_EPSILON
    }
}
