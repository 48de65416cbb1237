use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui::{self, Align, Context, Layout, Vec2};
use tracing::debug;

use crate::engine::{Session, SessionConfig, StatusVocabulary};
use crate::issues::IssueGraph;

use super::super::overlay::SimilarityOverlay;
use super::super::styles::VisualStyles;
use super::super::{RenderGraph, StatusListIds, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(graph: IssueGraph, config: SessionConfig) -> Self {
        let graph = Rc::new(graph);
        let vocabulary = StatusVocabulary::lifecycle();
        let render_graph = RenderGraph::build(&graph, &vocabulary);
        let status_counts = graph.status_counts(&vocabulary);
        let assignee_entries = graph.assignee_entries();
        let type_entries = graph.type_entries();

        let mut session = Session::new(
            Rc::clone(&graph),
            VisualStyles::default(),
            vocabulary,
            config,
        );
        let overlay = Rc::new(RefCell::new(SimilarityOverlay::with_threshold(
            session.similarity_fraction(),
        )));
        let sink = Rc::clone(&overlay);
        session.set_redraw_hook(Some(Box::new(move |request| {
            sink.borrow_mut().request(request);
        })));
        debug!(
            issues = graph.node_count(),
            lanes = render_graph.known_lanes,
            "view model ready"
        );

        Self {
            graph,
            session,
            overlay,
            render_graph,
            status_counts,
            assignee_entries,
            type_entries,
            axis_search: String::new(),
            show_similarity: true,
            selected: None,
            pan: Vec2::ZERO,
            zoom: 0.8,
            status_list: StatusListIds::new(),
            list_snapshot: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("issue-lens");
                    ui.separator();
                    ui.label(format!("source: {}", self.graph.source));
                    ui.label(format!("issues: {}", self.graph.node_count()));
                    ui.label(format!("links: {}", self.graph.link_count()));
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload issues"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_reloading {
                        ui.spinner();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                        if let Some(window) = self.window_text() {
                            ui.separator();
                            ui.label(window);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("controls_scroll")
                    .show(ui, |ui| self.draw_controls(ui));
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    fn window_text(&self) -> Option<String> {
        let (start, end) = self.session.cursors().window_codes()?;
        let vocabulary = self.session.filters().vocabulary();
        Some(format!(
            "window: {} to {}",
            vocabulary.label(start),
            vocabulary.label(end)
        ))
    }

    fn visible_graph_text(&self) -> String {
        let summary = self.session.summary();
        format!(
            "visible: {} issues ({} dimmed), {} links",
            summary.visible_nodes, summary.dimmed_nodes, summary.visible_links
        )
    }
}
