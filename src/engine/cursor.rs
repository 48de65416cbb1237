use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::geometry::{Band, ElementId, Limits, ListItem, ListSnapshot, PointerId};

pub const KEY_STEP: f32 = 12.0;

pub type LimitStrategy = Rc<dyn Fn(&[ListItem]) -> Limits>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorRole {
    Start,
    End,
}

impl CursorRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurtainMode {
    From,
    To,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorElements {
    pub list: Option<ElementId>,
    pub marker: Option<ElementId>,
    pub handle: Option<ElementId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BoundElements {
    list: ElementId,
    marker: ElementId,
    handle: ElementId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKey {
    Up,
    Down,
}

impl StepKey {
    pub fn delta(self) -> f32 {
        match self {
            Self::Up => -KEY_STEP,
            Self::Down => KEY_STEP,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CursorInput {
    PointerDown {
        target: ElementId,
        pointer: PointerId,
        client_y: f32,
    },
    PointerMove {
        pointer: PointerId,
        client_y: f32,
    },
    PointerUp {
        pointer: PointerId,
    },
    PointerCancel {
        pointer: PointerId,
    },
    Key {
        target: ElementId,
        key: StepKey,
    },
    Scroll(ListSnapshot),
    Resize(ListSnapshot),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorVisual {
    pub marker_y: f32,
    pub curtain: Band,
}

pub struct RangeCursor {
    role: CursorRole,
    mode: CurtainMode,
    elements: Option<BoundElements>,
    viewport: ListSnapshot,
    items: Vec<ListItem>,
    position: Option<f32>,
    min_limit: Option<f32>,
    max_limit: Option<f32>,
    limit_strategy: Option<LimitStrategy>,
    drag: Option<PointerId>,
    visual: Option<CursorVisual>,
}

impl fmt::Debug for RangeCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeCursor")
            .field("role", &self.role)
            .field("mode", &self.mode)
            .field("mounted", &self.elements.is_some())
            .field("items", &self.items.len())
            .field("position", &self.position)
            .field("min_limit", &self.min_limit)
            .field("max_limit", &self.max_limit)
            .field("dragging", &self.drag.is_some())
            .finish()
    }
}

impl RangeCursor {
    pub fn new(role: CursorRole, mode: CurtainMode) -> Self {
        Self {
            role,
            mode,
            elements: None,
            viewport: ListSnapshot::default(),
            items: Vec::new(),
            position: None,
            min_limit: None,
            max_limit: None,
            limit_strategy: None,
            drag: None,
            visual: None,
        }
    }

    pub fn role(&self) -> CursorRole {
        self.role
    }

    pub fn position(&self) -> Option<f32> {
        self.position
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn visual(&self) -> Option<CursorVisual> {
        self.visual
    }

    pub fn min_limit(&self) -> Option<f32> {
        self.min_limit
    }

    pub fn max_limit(&self) -> Option<f32> {
        self.max_limit
    }

    pub fn is_mounted(&self) -> bool {
        self.elements.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn handle(&self) -> Option<ElementId> {
        self.elements.map(|elements| elements.handle)
    }

    pub fn marker(&self) -> Option<ElementId> {
        self.elements.map(|elements| elements.marker)
    }

    pub fn list(&self) -> Option<ElementId> {
        self.elements.map(|elements| elements.list)
    }

    pub fn viewport(&self) -> &ListSnapshot {
        &self.viewport
    }

    pub fn mount(&mut self, elements: CursorElements) -> bool {
        if self.elements.is_some() {
            return true;
        }

        let (Some(list), Some(marker), Some(handle)) =
            (elements.list, elements.marker, elements.handle)
        else {
            trace!(cursor = self.role.label(), "mount skipped, missing host element");
            return false;
        };

        self.elements = Some(BoundElements {
            list,
            marker,
            handle,
        });
        debug!(cursor = self.role.label(), ?handle, "cursor mounted");
        true
    }

    pub fn bounds(&self) -> Option<Limits> {
        let first = self.items.first()?;
        let last = self.items.last()?;
        Some(Limits {
            min: self.min_limit.unwrap_or(first.top),
            max: self.max_limit.unwrap_or(last.bottom()),
        })
    }

    pub fn refresh(&mut self, snapshot: &ListSnapshot) -> Option<f32> {
        self.viewport = ListSnapshot {
            list_top: snapshot.list_top,
            scroll_top: snapshot.scroll_top,
            rows: Vec::new(),
        };
        self.items = snapshot.measure();

        if self.items.is_empty() {
            self.visual = None;
            return None;
        }

        self.apply_limit_strategy();

        let target = match self.position {
            Some(position) => position,
            None => self.items[0].center(),
        };
        self.set_position(target)
    }

    /// Clamps `y` into the legal range and stores it. `None` while nothing is measured.
    pub fn set_position(&mut self, y: f32) -> Option<f32> {
        let bounds = self.bounds()?;
        if !y.is_finite() {
            return None;
        }

        let clamped = y.max(bounds.min).min(bounds.max);
        self.position = Some(clamped);
        self.render();
        Some(clamped)
    }

    pub fn set_position_from_index(&mut self, index: isize) -> Option<f32> {
        let last = self.items.len().checked_sub(1)?;
        let index = index.clamp(0, last as isize) as usize;
        let center = self.items[index].center();
        self.set_position(center)
    }

    pub fn index(&self) -> Option<usize> {
        let position = self.position?;
        self.items
            .iter()
            .position(|item| position >= item.top && position < item.bottom())
            .or_else(|| self.items.len().checked_sub(1))
    }

    pub fn set_limits(&mut self, min: Option<f32>, max: Option<f32>) -> Option<f32> {
        self.min_limit = min.filter(|value| value.is_finite());
        self.max_limit = max.filter(|value| value.is_finite());
        self.reclamp()
    }

    pub fn set_limit_strategy(&mut self, strategy: Option<LimitStrategy>) -> Option<f32> {
        self.limit_strategy = strategy;
        self.apply_limit_strategy();
        self.reclamp()
    }

    pub fn handle_input(&mut self, input: CursorInput) -> Option<f32> {
        let elements = self.elements?;

        match input {
            CursorInput::PointerDown {
                target,
                pointer,
                client_y: _,
            } => {
                if target == elements.handle && self.drag.is_none() {
                    self.drag = Some(pointer);
                    trace!(cursor = self.role.label(), ?pointer, "drag captured");
                }
                None
            }
            CursorInput::PointerMove { pointer, client_y } => {
                if self.drag != Some(pointer) {
                    return None;
                }
                let local = self.viewport.to_local(client_y);
                self.set_position(local)
            }
            CursorInput::PointerUp { pointer } | CursorInput::PointerCancel { pointer } => {
                if self.drag == Some(pointer) {
                    self.drag = None;
                    trace!(cursor = self.role.label(), ?pointer, "drag released");
                }
                None
            }
            CursorInput::Key { target, key } => {
                if target != elements.handle {
                    return None;
                }
                let position = self.position?;
                self.set_position(position + key.delta())
            }
            CursorInput::Scroll(snapshot) | CursorInput::Resize(snapshot) => {
                self.refresh(&snapshot)
            }
        }
    }

    fn apply_limit_strategy(&mut self) {
        let Some(strategy) = &self.limit_strategy else {
            return;
        };
        if self.items.is_empty() {
            return;
        }

        let limits = strategy(&self.items);
        if !limits.is_finite() {
            warn!(
                cursor = self.role.label(),
                ?limits,
                "ignoring non-finite limits from strategy"
            );
            return;
        }

        self.min_limit = Some(limits.min);
        self.max_limit = Some(limits.max);
    }

    fn reclamp(&mut self) -> Option<f32> {
        let position = self.position?;
        self.set_position(position)
    }

    fn render(&mut self) {
        let (Some(position), Some(bounds)) = (self.position, self.bounds()) else {
            self.visual = None;
            return;
        };

        let curtain = match self.mode {
            CurtainMode::From => Band::between(bounds.min, position),
            CurtainMode::To => Band::between(position, bounds.max),
        };

        self.visual = Some(CursorVisual {
            marker_y: position,
            curtain,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geometry::fixtures::{ROW_HEIGHT, scrolled_snapshot, snapshot};
    use proptest::prelude::*;

    const CODES: [&str; 5] = ["A", "B", "C", "D", "E"];
    const LIST: ElementId = ElementId(1);
    const MARKER: ElementId = ElementId(2);
    const HANDLE: ElementId = ElementId(3);
    const MOUSE: PointerId = PointerId(7);

    fn elements() -> CursorElements {
        CursorElements {
            list: Some(LIST),
            marker: Some(MARKER),
            handle: Some(HANDLE),
        }
    }

    fn mounted(mode: CurtainMode) -> RangeCursor {
        let mut cursor = RangeCursor::new(CursorRole::Start, mode);
        assert!(cursor.mount(elements()));
        cursor.refresh(&snapshot(&CODES));
        cursor
    }

    #[test]
    fn mount_requires_every_element() {
        let mut cursor = RangeCursor::new(CursorRole::Start, CurtainMode::From);
        let missing_handle = CursorElements {
            handle: None,
            ..elements()
        };
        assert!(!cursor.mount(missing_handle));
        assert!(!cursor.is_mounted());
        assert_eq!(
            cursor.handle_input(CursorInput::Resize(snapshot(&CODES))),
            None
        );

        assert!(cursor.mount(elements()));
        assert!(cursor.mount(CursorElements::default()));
        assert_eq!(cursor.handle(), Some(HANDLE));
    }

    #[test]
    fn refresh_initializes_position_to_first_center() {
        let cursor = mounted(CurtainMode::From);
        assert_eq!(cursor.position(), Some(ROW_HEIGHT * 0.5));
        assert_eq!(cursor.index(), Some(0));
    }

    #[test]
    fn set_position_is_a_no_op_without_items() {
        let mut cursor = RangeCursor::new(CursorRole::End, CurtainMode::To);
        assert_eq!(cursor.role(), CursorRole::End);
        assert_eq!(cursor.set_position(10.0), None);
        assert_eq!(cursor.refresh(&snapshot(&[])), None);
        assert_eq!(cursor.position(), None);
        assert_eq!(cursor.visual(), None);
    }

    #[test]
    fn set_position_clamps_to_item_extent_without_limits() {
        let mut cursor = mounted(CurtainMode::From);
        assert_eq!(cursor.set_position(-50.0), Some(0.0));
        assert_eq!(cursor.set_position(10_000.0), Some(ROW_HEIGHT * 5.0));
    }

    #[test]
    fn explicit_limits_reclamp_immediately() {
        let mut cursor = mounted(CurtainMode::From);
        cursor.set_position(100.0);
        assert_eq!(cursor.set_limits(Some(30.0), Some(60.0)), Some(60.0));
        assert_eq!(cursor.position(), Some(60.0));
        assert_eq!(cursor.set_position(0.0), Some(30.0));
    }

    #[test]
    fn limit_strategy_is_reapplied_on_refresh() {
        let mut cursor = mounted(CurtainMode::From);
        let strategy: LimitStrategy = Rc::new(|items: &[ListItem]| Limits {
            min: items[1].top,
            max: items[items.len() - 2].bottom(),
        });
        cursor.set_limit_strategy(Some(strategy));
        assert_eq!(cursor.min_limit(), Some(ROW_HEIGHT));
        assert_eq!(cursor.position(), Some(ROW_HEIGHT));

        cursor.refresh(&snapshot(&["A", "B", "C"]));
        assert_eq!(cursor.max_limit(), Some(ROW_HEIGHT * 2.0));
    }

    #[test]
    fn non_finite_strategy_output_keeps_previous_limits() {
        let mut cursor = mounted(CurtainMode::From);
        cursor.set_limits(Some(10.0), Some(90.0));
        let broken: LimitStrategy = Rc::new(|_: &[ListItem]| Limits {
            min: f32::NAN,
            max: f32::INFINITY,
        });
        cursor.set_limit_strategy(Some(broken));
        assert_eq!(cursor.min_limit(), Some(10.0));
        assert_eq!(cursor.max_limit(), Some(90.0));
    }

    #[test]
    fn set_position_from_index_clamps_the_index() {
        let mut cursor = mounted(CurtainMode::To);
        assert_eq!(cursor.set_position_from_index(-3), Some(ROW_HEIGHT * 0.5));
        assert_eq!(cursor.set_position_from_index(99), Some(ROW_HEIGHT * 4.5));
        assert_eq!(cursor.index(), Some(4));
    }

    #[test]
    fn drag_translates_client_coordinates_and_releases_on_cancel() {
        let mut cursor = RangeCursor::new(CursorRole::Start, CurtainMode::From);
        cursor.mount(elements());
        cursor.refresh(&scrolled_snapshot(&CODES, 100.0, 20.0));

        let down = CursorInput::PointerDown {
            target: HANDLE,
            pointer: MOUSE,
            client_y: 110.0,
        };
        assert_eq!(cursor.handle_input(down), None);
        assert!(cursor.is_dragging());

        let moved = cursor.handle_input(CursorInput::PointerMove {
            pointer: MOUSE,
            client_y: 140.0,
        });
        assert_eq!(moved, Some(60.0));

        cursor.handle_input(CursorInput::PointerCancel { pointer: MOUSE });
        assert!(!cursor.is_dragging());
        let ignored = cursor.handle_input(CursorInput::PointerMove {
            pointer: MOUSE,
            client_y: 180.0,
        });
        assert_eq!(ignored, None);
        assert_eq!(cursor.position(), Some(60.0));
    }

    #[test]
    fn pointer_down_outside_the_handle_does_not_capture() {
        let mut cursor = mounted(CurtainMode::From);
        cursor.handle_input(CursorInput::PointerDown {
            target: MARKER,
            pointer: MOUSE,
            client_y: 120.0,
        });
        assert!(!cursor.is_dragging());
    }

    #[test]
    fn arrow_keys_step_by_fixed_amount() {
        let mut cursor = mounted(CurtainMode::From);
        cursor.set_position(50.0);
        let down = cursor.handle_input(CursorInput::Key {
            target: HANDLE,
            key: StepKey::Down,
        });
        assert_eq!(down, Some(50.0 + KEY_STEP));
        let up = cursor.handle_input(CursorInput::Key {
            target: HANDLE,
            key: StepKey::Up,
        });
        assert_eq!(up, Some(50.0));
    }

    #[test]
    fn curtain_modes_shade_opposite_sides() {
        let mut from = mounted(CurtainMode::From);
        from.set_position(40.0);
        let band = from.visual().map(|visual| visual.curtain);
        assert_eq!(band, Some(Band::between(0.0, 40.0)));

        let mut to = mounted(CurtainMode::To);
        to.set_limits(None, Some(100.0));
        to.set_position(40.0);
        let band = to.visual().map(|visual| visual.curtain);
        assert_eq!(band, Some(Band::between(40.0, 100.0)));
    }

    proptest! {
        #[test]
        fn set_position_is_idempotent(y in -500.0f32..500.0) {
            let mut cursor = mounted(CurtainMode::From);
            let once = cursor.set_position(y);
            let twice = cursor.set_position(y);
            prop_assert_eq!(once, twice);
            let bounds = cursor.bounds().unwrap();
            let position = cursor.position().unwrap();
            prop_assert!(position >= bounds.min && position <= bounds.max);
        }
    }
}
