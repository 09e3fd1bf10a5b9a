use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Result;
use eframe::egui::{self, Context};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cloud::{
    HoverTracker, InspectedTerm, LayoutParams, LayoutSession, QuadtreeCell, load_layout_params,
};
use crate::terms::{Category, TermSet, generate_term_set, load_term_set};

mod canvas;
mod render_utils;
mod ui;

/// Where the dashboard gets its data from, as given on the command line.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub terms_path: Option<PathBuf>,
    pub params_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub start_expanded: bool,
}

impl LoadOptions {
    fn source_label(&self) -> String {
        match &self.terms_path {
            Some(path) => path.display().to_string(),
            None => match self.seed {
                Some(seed) => format!("demo corpus (seed {seed})"),
                None => "demo corpus".to_owned(),
            },
        }
    }
}

struct LoadedData {
    terms: TermSet,
    params: LayoutParams,
    source_label: String,
}

pub struct ReviewCloudApp {
    options: LoadOptions,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedData, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedData, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    source_label: String,
    cards: Vec<CloudCard>,
    expanded: Option<usize>,
    active_card: usize,
    show_quadtree_overlay: bool,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

/// One category's cloud: its layout session plus the hover state drawn on top.
struct CloudCard {
    category: Category,
    session: LayoutSession,
    hover: HoverTracker,
    inspected: Option<InspectedTerm>,
    word_limit: usize,
    filter: String,
    finder_query: String,
    overlay_cells: Vec<QuadtreeCell>,
}

fn load_data(options: &LoadOptions) -> Result<LoadedData> {
    let params = match &options.params_path {
        Some(path) => load_layout_params(path)?,
        None => LayoutParams::default(),
    };

    let terms = match &options.terms_path {
        Some(path) => load_term_set(path)?,
        None => {
            let mut rng = match options.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            generate_term_set(&mut rng)
        }
    };

    tracing::info!(
        source = %options.source_label(),
        terms = terms.len(),
        "loaded review terms"
    );

    Ok(LoadedData {
        terms,
        params,
        source_label: options.source_label(),
    })
}

impl ReviewCloudApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: LoadOptions) -> Self {
        let state = Self::start_load(options.clone());
        Self {
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(options: LoadOptions) -> Receiver<Result<LoadedData, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_data(&options).map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                tracing::warn!(%error, "failed to load review terms");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(options: LoadOptions) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(options),
        }
    }

    fn ready_state(&self, data: LoadedData) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(data, &self.options)))
    }
}

impl eframe::App for ReviewCloudApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading review terms...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load review terms");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.options.clone()));
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

        if retry {
            self.state = Self::start_load(self.options.clone());
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(data) => self.ready_state(data),
                Err(error) => AppState::Error(error),
            };
        }
    }
}
