use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::terms::{Category, Term};

use super::build::{LayoutNode, build_nodes, select_terms};
use super::metric::{MetricMapper, WeightClass};
use super::physics::ForceSolver;
use super::{LayoutParams, SelectionConfig, ViewMode, ViewportConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Idle,
    /// Transient; only held inside a rebuild, never seen between calls.
    Building,
    /// The viewport has a zero or invalid side; nothing is laid out.
    NotReady,
    Empty,
    Ticking,
    Settled,
}

impl SessionPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Building => "building",
            Self::NotReady => "waiting for size",
            Self::Empty => "no data",
            Self::Ticking => "settling",
            Self::Settled => "settled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RebuildReason {
    Terms,
    Viewport,
    Selection,
    ViewMode,
    Params,
    Restart,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    pub text: String,
    pub category: Category,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub weight_class: WeightClass,
}

impl NodeSnapshot {
    fn from_node(node: &LayoutNode) -> Self {
        Self {
            text: node.text.clone(),
            category: node.category,
            x: node.pos.x,
            y: node.pos.y,
            font_size: node.font_size,
            weight_class: node.weight_class,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutFrame<'a> {
    pub generation: u64,
    pub tick: u32,
    pub nodes: &'a [NodeSnapshot],
}

#[derive(Clone, Copy, Debug)]
pub enum SessionEvent<'a> {
    Frame(LayoutFrame<'a>),
    Settled { generation: u64, ticks: u32 },
    Empty { generation: u64 },
    NotReady { generation: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced { tick: u32, settled: bool },
    Settled,
    Empty,
    NotReady,
    Idle,
    /// The tick was scheduled for a session that has since been rebuilt.
    Stale,
}

type Observer = Box<dyn FnMut(SessionEvent<'_>) + Send>;

/// Owns one solve. Every reconfiguration discards the node set and starts
/// over under a new generation; ticks are driven by the host.
pub struct LayoutSession {
    params: LayoutParams,
    terms: Vec<Term>,
    has_terms: bool,
    viewport: ViewportConfig,
    selection: SelectionConfig,
    phase: SessionPhase,
    generation: u64,
    nodes: Vec<LayoutNode>,
    solver: Option<ForceSolver>,
    snapshot: Vec<NodeSnapshot>,
    published_tick: u32,
    rng: StdRng,
    observer: Option<Observer>,
}

impl LayoutSession {
    pub fn new(params: LayoutParams, mode: ViewMode) -> Self {
        Self::with_rng(params, mode, StdRng::from_os_rng())
    }

    pub fn seeded(params: LayoutParams, mode: ViewMode, seed: u64) -> Self {
        Self::with_rng(params, mode, StdRng::seed_from_u64(seed))
    }

    fn with_rng(params: LayoutParams, mode: ViewMode, rng: StdRng) -> Self {
        let params = params.sanitized();
        let selection = SelectionConfig::for_mode(mode, &params);
        Self {
            params,
            terms: Vec::new(),
            has_terms: false,
            viewport: ViewportConfig::new(0.0, 0.0, mode),
            selection,
            phase: SessionPhase::Idle,
            generation: 0,
            nodes: Vec::new(),
            solver: None,
            snapshot: Vec::new(),
            published_tick: 0,
            rng,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: impl FnMut(SessionEvent<'_>) + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn viewport(&self) -> ViewportConfig {
        self.viewport
    }

    pub fn selection(&self) -> &SelectionConfig {
        &self.selection
    }

    pub fn view_mode(&self) -> ViewMode {
        self.viewport.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn ticks(&self) -> u32 {
        self.solver.as_ref().map_or(0, ForceSolver::ticks)
    }

    pub fn activity(&self) -> f32 {
        self.solver.as_ref().map_or(0.0, ForceSolver::activity)
    }

    pub fn frame(&self) -> Option<LayoutFrame<'_>> {
        if self.published_tick == 0 {
            return None;
        }
        Some(LayoutFrame {
            generation: self.generation,
            tick: self.published_tick,
            nodes: &self.snapshot,
        })
    }

    pub fn set_terms(&mut self, terms: Vec<Term>) {
        self.terms = terms;
        self.has_terms = true;
        self.rebuild(RebuildReason::Terms);
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let next = ViewportConfig::new(width, height, self.viewport.mode);
        if next == self.viewport {
            return;
        }
        self.viewport = next;
        self.rebuild(RebuildReason::Viewport);
    }

    pub fn set_selection(&mut self, selection: SelectionConfig) {
        if selection == self.selection {
            return;
        }
        self.selection = selection;
        self.rebuild(RebuildReason::Selection);
    }

    pub fn set_word_limit(&mut self, word_limit: usize) {
        let selection = SelectionConfig {
            word_limit,
            ..self.selection.clone()
        };
        self.set_selection(selection);
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        let selection = SelectionConfig {
            filter: filter.into(),
            ..self.selection.clone()
        };
        self.set_selection(selection);
    }

    /// Switching modes also resets the word limit to the new mode's default.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == self.viewport.mode {
            return;
        }
        self.viewport.mode = mode;
        self.selection.word_limit = self.params.mode(mode).default_word_limit;
        self.rebuild(RebuildReason::ViewMode);
    }

    pub fn set_params(&mut self, params: LayoutParams) {
        self.params = params.sanitized();
        self.rebuild(RebuildReason::Params);
    }

    pub fn restart(&mut self) {
        self.rebuild(RebuildReason::Restart);
    }

    fn rebuild(&mut self, reason: RebuildReason) {
        self.generation = self.generation.wrapping_add(1);
        self.nodes.clear();
        self.snapshot.clear();
        self.solver = None;
        self.published_tick = 0;

        if !self.has_terms {
            self.phase = SessionPhase::Idle;
            return;
        }

        self.phase = SessionPhase::Building;

        if !self.viewport.is_ready() {
            tracing::debug!(
                generation = self.generation,
                ?reason,
                width = self.viewport.width,
                height = self.viewport.height,
                "viewport not ready; layout suspended"
            );
            self.phase = SessionPhase::NotReady;
            self.emit(SessionEvent::NotReady {
                generation: self.generation,
            });
            return;
        }

        let selected = select_terms(&self.terms, &self.selection, &self.params);
        if selected.is_empty() {
            tracing::debug!(generation = self.generation, ?reason, "working set is empty");
            self.phase = SessionPhase::Empty;
            self.emit(SessionEvent::Empty {
                generation: self.generation,
            });
            return;
        }

        let mapper = MetricMapper::new(
            selected.iter().map(|term| term.weight),
            &self.viewport,
            &self.params,
        );
        let nodes = build_nodes(
            &selected,
            &mapper,
            &self.viewport,
            &self.params,
            &mut self.rng,
        );
        self.nodes = nodes;
        self.solver = Some(ForceSolver::new(&self.viewport, &self.params));
        self.phase = SessionPhase::Ticking;

        tracing::debug!(
            generation = self.generation,
            ?reason,
            nodes = self.nodes.len(),
            mode = ?self.viewport.mode,
            width = self.viewport.width,
            height = self.viewport.height,
            "rebuilt layout session"
        );
    }

    pub fn tick(&mut self) -> TickOutcome {
        match self.phase {
            SessionPhase::Ticking => {}
            SessionPhase::Settled => return TickOutcome::Settled,
            SessionPhase::Empty => return TickOutcome::Empty,
            SessionPhase::NotReady => return TickOutcome::NotReady,
            SessionPhase::Idle | SessionPhase::Building => return TickOutcome::Idle,
        }

        let Some(solver) = self.solver.as_mut() else {
            self.phase = SessionPhase::Idle;
            return TickOutcome::Idle;
        };

        let outcome = solver.step(&mut self.nodes);
        tracing::trace!(
            generation = self.generation,
            tick = outcome.tick,
            activity = outcome.activity,
            "layout tick"
        );

        self.snapshot.clear();
        self.snapshot
            .extend(self.nodes.iter().map(NodeSnapshot::from_node));
        self.published_tick = outcome.tick;

        if let Some(observer) = self.observer.as_mut() {
            observer(SessionEvent::Frame(LayoutFrame {
                generation: self.generation,
                tick: outcome.tick,
                nodes: &self.snapshot,
            }));
        }

        if outcome.settled {
            self.phase = SessionPhase::Settled;
            tracing::debug!(
                generation = self.generation,
                ticks = outcome.tick,
                activity = outcome.activity,
                "layout settled"
            );
            self.emit(SessionEvent::Settled {
                generation: self.generation,
                ticks: outcome.tick,
            });
        }

        TickOutcome::Advanced {
            tick: outcome.tick,
            settled: outcome.settled,
        }
    }

    /// Ticks only if `generation` is still current, so a tick scheduled
    /// before a rebuild cannot publish anything.
    pub fn tick_generation(&mut self, generation: u64) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Stale;
        }
        self.tick()
    }

    pub fn run_to_settle(&mut self) -> TickOutcome {
        loop {
            match self.tick() {
                TickOutcome::Advanced { settled: false, .. } => continue,
                outcome => return outcome,
            }
        }
    }

    fn emit(&mut self, event: SessionEvent<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }
}
