use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use log::{debug, error, info};

use crate::config::LayoutConfig;
use crate::engine::{
    CirclePlacement, FragmentHistory, GuideCircle, NavigationMode, Projection, RenderSurface,
    SelectionMachine, decode, encode,
};
use crate::model::{TopicModelData, load_topic_model};

mod animation;
mod plots;
mod render_utils;
mod ui;

use animation::Canvas;

pub struct LaunchSettings {
    pub payload_path: PathBuf,
    pub initial_fragment: Option<String>,
    pub layout: LayoutConfig,
}

pub struct TopicAtlasApp {
    settings: LaunchSettings,
    state: AppState,
    reload_rx: Option<Receiver<Result<TopicModelData, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<TopicModelData, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    machine: SelectionMachine,
    canvas: Canvas,
    layout: LayoutConfig,
    scatter: Vec<CirclePlacement>,
    guides: [GuideCircle; 3],
    known_terms: Arc<Vec<String>>,
    lambda_input: f64,
    topic_input: String,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    history: FragmentHistory,
    fragment: String,
    hovered_topic: Option<usize>,
    hovered_term: Option<String>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<Vec<String>>,
}

/// Pointer events collected while drawing the canvas, applied once drawing is done.
#[derive(Clone, Debug, PartialEq)]
enum CanvasEvent {
    PreviewTopic(usize),
    EndPreview,
    SelectTopic(usize),
    Reset,
    HoverTerm(String),
    ReleaseTerm,
    SelectTerm(String),
}

impl TopicAtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: LaunchSettings) -> Self {
        let state = Self::start_load(settings.payload_path.clone());
        Self {
            settings,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(payload_path: PathBuf) -> Receiver<Result<TopicModelData, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_topic_model(&payload_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(payload_path: PathBuf) -> AppState {
        info!("loading topic model from {}", payload_path.display());
        AppState::Loading {
            rx: Self::spawn_load(payload_path),
        }
    }

    fn ready(&self, data: TopicModelData, fragment: Option<&str>) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            data,
            self.settings.layout.clone(),
            fragment,
        )))
    }

    fn failed(message: String) -> AppState {
        error!("{message}");
        AppState::Error(message)
    }
}

impl eframe::App for TopicAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(data)) => {
                        transition =
                            Some(self.ready(data, self.settings.initial_fragment.as_deref()));
                    }
                    Ok(Err(error)) => transition = Some(Self::failed(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Self::failed(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading topic model...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load topic model");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.settings.payload_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.settings.payload_path.display().to_string(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    info!("reloading {}", self.settings.payload_path.display());
                    self.reload_rx = Some(Self::spawn_load(self.settings.payload_path.clone()));
                }

                let current_fragment = model.fragment.clone();
                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(data)) => {
                            transition = Some(self.ready(data, Some(&current_fragment)));
                        }
                        Ok(Err(error)) => transition = Some(Self::failed(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(Self::failed(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(data: TopicModelData, layout: LayoutConfig, fragment: Option<&str>) -> Self {
        let data = Arc::new(data);
        let mut machine = SelectionMachine::new(Arc::clone(&data), layout.clone());
        let projection = match fragment {
            Some(fragment) => {
                let decoded = decode(fragment, data.topic_count());
                machine.restore(decoded.state)
            }
            None => machine.initialize(),
        };

        let mut canvas = Canvas::new(&layout, data.topic_count());
        canvas.apply(&projection);

        let state = machine.state();
        let fragment = encode(state);
        let model = Self {
            scatter: machine.synchronizer().scatter_layout(&data),
            guides: machine.synchronizer().guide_circles(),
            known_terms: Arc::new(data.known_terms()),
            lambda_input: state.lambda,
            topic_input: state.topic.to_string(),
            search: String::new(),
            search_match_cache: None,
            history: FragmentHistory::new(fragment.clone()),
            fragment,
            hovered_topic: None,
            hovered_term: None,
            canvas,
            layout,
            machine,
        };
        debug!("view ready at {}", model.fragment);
        model
    }

    /// Pushes a transition's draw commands to the canvas and mirrors the new state into the
    /// controls and the session history.
    fn dispatch(&mut self, projection: Projection) {
        if projection.is_empty() {
            return;
        }
        self.canvas.apply(&projection);

        let state = self.machine.state();
        self.lambda_input = state.lambda;
        let fragment = encode(state);
        if fragment != self.fragment {
            self.history.record(fragment.clone(), NavigationMode::Replace);
            self.fragment = fragment;
        }
    }

    fn handle_canvas_event(&mut self, event: CanvasEvent) {
        debug!("canvas event {event:?}");
        let projection = match event {
            CanvasEvent::PreviewTopic(topic) => self.machine.preview_topic(topic),
            CanvasEvent::EndPreview => self.machine.end_preview(),
            CanvasEvent::SelectTopic(topic) => self.machine.select_topic(topic as i64),
            CanvasEvent::Reset => self.machine.reset(),
            CanvasEvent::HoverTerm(term) => self.machine.hover_term(&term),
            CanvasEvent::ReleaseTerm => self.machine.release_hover(),
            CanvasEvent::SelectTerm(term) => self.machine.select_term(&term),
        };
        self.dispatch(projection);
    }

    fn bookmark(&mut self) {
        self.history.record(self.fragment.clone(), NavigationMode::Push);
    }

    /// Restores the state stored in a history entry.
    fn navigate(&mut self, fragment: String) {
        let decoded = decode(&fragment, self.machine.data().topic_count());
        let projection = self.machine.restore(decoded.state);
        self.dispatch(projection);
        self.topic_input = self.machine.state().topic.to_string();
    }

    fn go_back(&mut self) {
        if let Some(fragment) = self.history.back().map(str::to_owned) {
            self.navigate(fragment);
        }
    }

    fn go_forward(&mut self) {
        if let Some(fragment) = self.history.forward().map(str::to_owned) {
            self.navigate(fragment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::sample_model;

    fn model(fragment: Option<&str>) -> ViewModel {
        ViewModel::new(sample_model(), LayoutConfig::default(), fragment)
    }

    #[test]
    fn initial_fragment_restores_selection() {
        let model = model(Some("#topic=2&lambda=0.4&term=bank"));
        assert_eq!(model.machine.state().topic, 2);
        assert_eq!(model.lambda_input, 0.4);
        assert_eq!(model.fragment, "topic=2&lambda=0.4&term=bank");
        assert_eq!(model.canvas.highlighted_term.as_deref(), Some("bank"));
    }

    #[test]
    fn events_update_fragment_in_place() {
        let mut model = model(None);
        model.handle_canvas_event(CanvasEvent::SelectTopic(1));
        model.handle_canvas_event(CanvasEvent::HoverTerm("apple".to_owned()));

        assert_eq!(model.fragment, "topic=1&lambda=1&term=apple");
        assert_eq!(model.history.current(), model.fragment);
        assert_eq!(model.history.len(), 1);

        model.handle_canvas_event(CanvasEvent::ReleaseTerm);
        assert_eq!(model.fragment, "topic=1&lambda=1&term=");
    }

    #[test]
    fn preview_leaves_fragment_alone() {
        let mut model = model(None);
        model.handle_canvas_event(CanvasEvent::PreviewTopic(3));
        assert_eq!(model.fragment, "topic=0&lambda=1&term=");
        assert_eq!(model.machine.displayed_topic(), 3);

        model.handle_canvas_event(CanvasEvent::EndPreview);
        assert_eq!(model.machine.displayed_topic(), 0);
    }

    #[test]
    fn bookmarks_allow_going_back() {
        let mut model = model(None);
        model.handle_canvas_event(CanvasEvent::SelectTopic(2));
        model.bookmark();
        model.handle_canvas_event(CanvasEvent::SelectTopic(3));

        model.go_back();
        assert_eq!(model.machine.state().topic, 2);
        assert_eq!(model.topic_input, "2");

        model.go_forward();
        assert_eq!(model.machine.state().topic, 3);
    }
}
