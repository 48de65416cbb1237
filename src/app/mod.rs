use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{error, info};

use crate::engine::{ElementId, LinkId, ListSnapshot, Session, SessionConfig};
use crate::issues::{AxisEntry, IssueGraph, load_issue_graph};

mod graph;
mod overlay;
mod render_utils;
mod styles;
mod ui;

use overlay::SimilarityOverlay;
use styles::VisualStyles;

pub struct IssueLensApp {
    graph_path: PathBuf,
    config: SessionConfig,
    state: AppState,
    reload_rx: Option<Receiver<Result<IssueGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<IssueGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: Rc<IssueGraph>,
    session: Session<IssueGraph, VisualStyles>,
    overlay: Rc<RefCell<SimilarityOverlay>>,
    render_graph: RenderGraph,
    status_counts: HashMap<String, usize>,
    assignee_entries: Vec<AxisEntry>,
    type_entries: Vec<AxisEntry>,
    axis_search: String,
    show_similarity: bool,
    selected: Option<String>,
    pan: Vec2,
    zoom: f32,
    status_list: StatusListIds,
    list_snapshot: Option<ListSnapshot>,
}

struct StatusListIds {
    list: egui::Id,
    start_marker: egui::Id,
    start_handle: egui::Id,
    end_marker: egui::Id,
    end_handle: egui::Id,
    window: egui::Id,
}

impl StatusListIds {
    fn new() -> Self {
        let list = egui::Id::new("status_list");
        Self {
            list,
            start_marker: list.with("start_marker"),
            start_handle: list.with("start_handle"),
            end_marker: list.with("end_marker"),
            end_handle: list.with("end_handle"),
            window: list.with("window_handle"),
        }
    }

    fn element(id: egui::Id) -> ElementId {
        ElementId(id.value())
    }
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    index_by_key: HashMap<String, usize>,
    known_lanes: usize,
}

struct RenderNode {
    key: String,
    world_pos: Vec2,
    lane: usize,
    radius: f32,
}

struct RenderEdge {
    link: LinkId,
    source: usize,
    target: usize,
}

impl IssueLensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, graph_path: PathBuf, config: SessionConfig) -> Self {
        let state = Self::start_load(graph_path.clone());
        Self {
            graph_path,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(graph_path: PathBuf) -> Receiver<Result<IssueGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_issue_graph(&graph_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(graph_path: PathBuf) -> AppState {
        info!(path = %graph_path.display(), "loading issue graph");
        AppState::Loading {
            rx: Self::spawn_load(graph_path),
        }
    }

    fn ready_or_error(&self, result: Result<IssueGraph, String>) -> AppState {
        match result {
            Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph, self.config))),
            Err(message) => {
                error!(%message, "issue graph failed to load");
                AppState::Error(message)
            }
        }
    }
}

impl eframe::App for IssueLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(result);
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading issue graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(message) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the issue graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.graph_path.clone());
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.graph_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready_or_error(result);
        }
    }
}
