use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

mod coordinator;
mod cursor;
mod filter;
mod geometry;
mod hover;
mod render_sync;
mod status;

pub use coordinator::{DEFAULT_CURTAIN_EPSILON, WindowInput};
pub use cursor::{CursorElements, CursorInput, CursorRole, StepKey};
pub use filter::{
    FilterSubject, UNASSIGNED_KEY, UNKNOWN_TYPE_KEY, subject_assignee_key, subject_type_key,
};
pub use geometry::{Band, ElementId, ListSnapshot, PointerId, RowGeometry};
pub use hover::Axis;
pub use render_sync::{
    CURTAIN_OPACITY, FULL_OPACITY, GraphModel, LinkEndpoint, LinkId, RenderTarget,
};
pub use status::StatusVocabulary;

use coordinator::CursorPair;
use filter::FilterComposer;
use hover::HoverState;
use render_sync::{SyncInputs, SyncSummary};

pub const DEFAULT_SIMILARITY_PERCENT: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RedrawRequest {
    Full,
    Threshold(f32),
}

pub type RedrawHook = Box<dyn FnMut(RedrawRequest)>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub curtain_epsilon: f32,
    pub similarity_percent: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            curtain_epsilon: DEFAULT_CURTAIN_EPSILON,
            similarity_percent: DEFAULT_SIMILARITY_PERCENT,
        }
    }
}

pub struct Session<G: GraphModel, T: RenderTarget> {
    graph: Rc<G>,
    target: T,
    cursors: CursorPair,
    filters: FilterComposer,
    hover: HoverState,
    similarity_percent: u8,
    redraw_hook: Option<RedrawHook>,
    summary: SyncSummary,
    resyncs: u64,
}

impl<G: GraphModel, T: RenderTarget> fmt::Debug for Session<G, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cursors", &self.cursors)
            .field("filters", &self.filters)
            .field("hover", &self.hover)
            .field("similarity_percent", &self.similarity_percent)
            .field("summary", &self.summary)
            .field("resyncs", &self.resyncs)
            .finish_non_exhaustive()
    }
}

impl<G: GraphModel, T: RenderTarget> Session<G, T> {
    pub fn new(
        graph: Rc<G>,
        target: T,
        vocabulary: StatusVocabulary,
        config: SessionConfig,
    ) -> Self {
        let mut session = Self {
            graph,
            target,
            cursors: CursorPair::new(config.curtain_epsilon),
            filters: FilterComposer::new(vocabulary),
            hover: HoverState::default(),
            similarity_percent: clamp_percent(config.similarity_percent),
            redraw_hook: None,
            summary: SyncSummary::default(),
            resyncs: 0,
        };
        session.resync();
        session
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn cursors(&self) -> &CursorPair {
        &self.cursors
    }

    pub fn filters(&self) -> &FilterComposer {
        &self.filters
    }

    pub fn summary(&self) -> SyncSummary {
        self.summary
    }

    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    pub fn curtain(&self) -> &HashSet<String> {
        self.cursors.curtain()
    }

    pub fn similarity_percent(&self) -> u8 {
        self.similarity_percent
    }

    pub fn similarity_fraction(&self) -> f32 {
        f32::from(self.similarity_percent) / 100.0
    }

    pub fn set_redraw_hook(&mut self, hook: Option<RedrawHook>) {
        self.redraw_hook = hook;
    }

    /// Recomputes everything from scratch and pushes it to the target.
    pub fn resync(&mut self) {
        let inputs = SyncInputs {
            filters: &self.filters,
            curtain: self.cursors.curtain(),
            hover: &self.hover,
        };
        self.summary = render_sync::resync(self.graph.as_ref(), &inputs, &mut self.target);
        self.resyncs += 1;
        trace!(resyncs = self.resyncs, summary = ?self.summary, "visibility resynced");

        if let Some(hook) = self.redraw_hook.as_mut() {
            hook(RedrawRequest::Full);
        }
    }

    fn settle(&mut self, changed: bool) -> bool {
        if changed {
            self.resync();
        }
        changed
    }

    pub fn mount_cursors(&mut self, start: CursorElements, end: CursorElements) -> bool {
        self.cursors.mount(start, end)
    }

    pub fn refresh_list(&mut self, snapshot: &ListSnapshot) -> bool {
        let changed = self.cursors.refresh(snapshot);
        self.settle(changed)
    }

    pub fn cursor_input(&mut self, role: CursorRole, input: CursorInput) -> bool {
        let changed = self.cursors.handle(role, input);
        self.settle(changed)
    }

    pub fn window_input(&mut self, input: WindowInput) -> bool {
        let changed = self.cursors.handle_window(input);
        self.settle(changed)
    }

    pub fn set_cursor_index(&mut self, role: CursorRole, index: isize) -> bool {
        let changed = self.cursors.set_position_from_index(role, index);
        self.settle(changed)
    }

    pub fn set_curtain_epsilon(&mut self, epsilon: f32) -> bool {
        let changed = self.cursors.set_curtain_epsilon(epsilon);
        self.settle(changed)
    }

    pub fn select_all_statuses(&mut self) -> bool {
        let changed = self.filters.select_all_statuses();
        self.settle(changed)
    }

    pub fn select_no_statuses(&mut self) -> bool {
        let changed = self.filters.select_no_statuses();
        self.settle(changed)
    }

    pub fn toggle_status(&mut self, status: &str) -> bool {
        let changed = self.filters.toggle_status(status);
        self.settle(changed)
    }

    pub fn set_assignee_filter(&mut self, keys: Option<HashSet<String>>) -> bool {
        let changed = self.filters.set_assignee_filter(keys);
        self.settle(changed)
    }

    pub fn toggle_assignee(&mut self, key: &str) -> bool {
        let changed = self.filters.toggle_assignee(key);
        self.settle(changed)
    }

    pub fn set_type_filter(&mut self, keys: Option<HashSet<String>>) -> bool {
        let changed = self.filters.set_type_filter(keys);
        self.settle(changed)
    }

    pub fn toggle_type(&mut self, key: &str) -> bool {
        let changed = self.filters.toggle_type(key);
        self.settle(changed)
    }

    pub fn set_hover(&mut self, axis: Axis, value: &str) -> bool {
        let changed = self.hover.set(axis, value);
        self.settle(changed)
    }

    pub fn clear_hover(&mut self, axis: Axis) -> bool {
        let changed = self.hover.clear(axis);
        self.settle(changed)
    }

    pub fn set_similarity_percent(&mut self, percent: u8) -> bool {
        let percent = clamp_percent(percent);
        if percent == self.similarity_percent {
            return false;
        }

        self.similarity_percent = percent;
        debug!(percent, "similarity threshold changed");
        let fraction = self.similarity_fraction();
        if let Some(hook) = self.redraw_hook.as_mut() {
            hook(RedrawRequest::Threshold(fraction));
        }
        true
    }
}

fn clamp_percent(percent: u8) -> u8 {
    percent.clamp(1, 100)
}
