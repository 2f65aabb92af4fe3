//! Simulation view controller.
//!
//! The controller never performs I/O. Each operation hands back a [`Ticket`]
//! naming the HTTP request to make; the host sends it and passes the result
//! to [`SimulationView::complete`]. This keeps the play/pause machine, the
//! auto-stop rule and the stale-response guard testable without a browser.
//!
//! Snapshot-producing requests carry a generation number. A response is only
//! applied if it is newer than the last applied snapshot, so a slow `/state`
//! cannot overwrite the result of a later `/step`.

use tracing::{debug, info, warn};

use crate::animation::{AnimationTiming, ArrowAnimator};
use crate::api::{ApiRequest, ApiResponse};
use crate::config::ViewConfig;
use crate::error::Result;
use crate::geometry::CellMapper;
use crate::hover::{self, HoverInfo};
use crate::palette::Palette;
use crate::render::Scene;
use crate::resources::ResourceIndex;
use crate::snapshot::{GridSnapshot, SimulationSnapshot};
use crate::status::{agent_status_rows, AgentStatusRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Available,
    /// Last request failed; the last good data is still shown.
    Unavailable(String),
}

/// An issued request awaiting its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    request: ApiRequest,
    generation: Option<u64>,
    initial: bool,
}

impl Ticket {
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }
}

/// What changed when a response was applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    pub grid_changed: bool,
    pub snapshot_changed: bool,
    pub models_changed: bool,
    /// Play was switched off because every active agent reached its goal.
    pub auto_stopped: bool,
    /// The response was superseded and ignored.
    pub stale: bool,
    /// Request the host must send next.
    pub follow_up: Option<Ticket>,
}

impl Applied {
    pub fn needs_redraw(&self) -> bool {
        self.grid_changed || self.snapshot_changed
    }
}

const INITIAL_REQUESTS: u8 = 3;

#[derive(Debug, Clone)]
pub struct SimulationView {
    config: ViewConfig,
    palette: Palette,
    grid: GridSnapshot,
    resources: ResourceIndex,
    sim: SimulationSnapshot,
    models: Vec<String>,
    selected: Vec<String>,
    play: PlayState,
    backend: BackendStatus,
    issued_generation: u64,
    applied_generation: u64,
    pending_initial: u8,
}

impl SimulationView {
    pub fn new(config: ViewConfig) -> Self {
        let grid = GridSnapshot::default();
        Self {
            config,
            palette: Palette::default(),
            resources: grid.index(),
            grid,
            sim: SimulationSnapshot::default(),
            models: Vec::new(),
            selected: Vec::new(),
            play: PlayState::Stopped,
            backend: BackendStatus::Available,
            issued_generation: 0,
            applied_generation: 0,
            pending_initial: 0,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn grid(&self) -> &GridSnapshot {
        &self.grid
    }

    pub fn resources(&self) -> &ResourceIndex {
        &self.resources
    }

    pub fn snapshot(&self) -> &SimulationSnapshot {
        &self.sim
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn selected_models(&self) -> &[String] {
        &self.selected
    }

    pub fn play_state(&self) -> PlayState {
        self.play
    }

    pub fn is_playing(&self) -> bool {
        self.play == PlayState::Playing
    }

    /// Manual stepping is disabled while playing.
    pub fn can_step(&self) -> bool {
        !self.is_playing()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_initial > 0
    }

    pub fn backend_status(&self) -> &BackendStatus {
        &self.backend
    }

    pub fn mapper(&self) -> CellMapper {
        self.config.mapper(self.grid.width, self.grid.height)
    }

    pub fn animation_timing(&self) -> AnimationTiming {
        AnimationTiming::from_config(&self.config)
    }

    pub fn status_rows(&self) -> Vec<AgentStatusRow> {
        agent_status_rows(&self.sim, &self.palette)
    }

    pub fn hover(&self, px: f64, py: f64) -> Option<HoverInfo> {
        hover::inspect(&self.mapper(), &self.resources, px, py)
    }

    /// Let `animator` react to the current snapshot.
    pub fn observe(&self, animator: &mut ArrowAnimator, now_ms: f64) -> usize {
        animator.observe(&self.sim, &self.resources, &self.mapper(), &self.palette, now_ms)
    }

    pub fn scene<'a>(&'a self, animator: &'a ArrowAnimator) -> Scene<'a> {
        Scene {
            grid: &self.grid,
            sim: &self.sim,
            arrows: animator.arrows(),
            highlights: animator.highlights(),
            config: &self.config,
            palette: &self.palette,
        }
    }

    fn issue(&mut self, request: ApiRequest) -> Ticket {
        let generation = if request.yields_snapshot() {
            self.issued_generation += 1;
            Some(self.issued_generation)
        } else {
            None
        };
        debug!(path = request.path(), ?generation, "request issued");
        Ticket {
            request,
            generation,
            initial: false,
        }
    }

    /// Fetch grid, snapshot and model list. The view reports loading until
    /// all three have answered.
    pub fn load_initial(&mut self) -> Vec<Ticket> {
        self.pending_initial = INITIAL_REQUESTS;
        [ApiRequest::Grid, ApiRequest::State, ApiRequest::Models]
            .into_iter()
            .map(|r| Ticket {
                initial: true,
                ..self.issue(r)
            })
            .collect()
    }

    /// Manual single step. `None` while playing.
    pub fn step(&mut self) -> Option<Ticket> {
        if self.is_playing() {
            return None;
        }
        Some(self.issue(ApiRequest::Step))
    }

    /// Step driven by the play timer. `None` unless playing.
    pub fn play_tick(&mut self) -> Option<Ticket> {
        if !self.is_playing() {
            return None;
        }
        Some(self.issue(ApiRequest::Step))
    }

    pub fn reset(&mut self) -> Ticket {
        self.issue(ApiRequest::Reset)
    }

    pub fn refresh(&mut self) -> Ticket {
        self.issue(ApiRequest::State)
    }

    /// Ask the backend to activate exactly `names`.
    pub fn set_active_models(&mut self, names: Vec<String>) -> Ticket {
        info!(models = ?names, "selecting active models");
        self.selected = names.clone();
        self.issue(ApiRequest::SetActiveModels(names))
    }

    /// Flip one model in or out of the selection, keeping the order of the
    /// known model list.
    pub fn toggle_model(&mut self, name: &str) -> Ticket {
        let was_selected = self.selected.iter().any(|m| m == name);
        let mut next: Vec<String> = self
            .models
            .iter()
            .filter(|m| {
                let on = self.selected.contains(m);
                if m.as_str() == name {
                    !was_selected
                } else {
                    on
                }
            })
            .cloned()
            .collect();
        // Selected names the model list does not know (yet) stay at the end.
        for m in &self.selected {
            if m != name && !self.models.contains(m) {
                next.push(m.clone());
            }
        }
        if !was_selected && !self.models.iter().any(|m| m == name) {
            next.push(name.to_string());
        }
        self.set_active_models(next)
    }

    /// Legacy single-model selection (`POST /set_model`, then `GET /state`).
    pub fn select_single_model(&mut self, name: &str) -> Ticket {
        self.selected = vec![name.to_string()];
        self.issue(ApiRequest::SetModel(name.to_string()))
    }

    /// Flip play/pause. Play does not start while every active model already
    /// stands on its goal.
    pub fn toggle_play(&mut self) -> PlayState {
        self.play = match self.play {
            PlayState::Stopped if self.sim.all_active_arrived() => {
                info!("every agent has arrived; not starting play");
                PlayState::Stopped
            }
            PlayState::Stopped => PlayState::Playing,
            PlayState::Playing => PlayState::Stopped,
        };
        info!(state = ?self.play, "play toggled");
        self.play
    }

    pub fn stop(&mut self) {
        self.play = PlayState::Stopped;
    }

    /// Apply the outcome of `ticket`. Failures never propagate: they flip the
    /// backend status to unavailable and keep the last good data.
    pub fn complete(&mut self, ticket: Ticket, result: Result<ApiResponse>) -> Applied {
        if ticket.initial {
            self.pending_initial = self.pending_initial.saturating_sub(1);
        }

        let mut applied = Applied::default();
        if let Some(generation) = ticket.generation {
            if generation <= self.applied_generation {
                debug!(
                    path = ticket.request.path(),
                    generation,
                    latest = self.applied_generation,
                    "dropping stale response"
                );
                applied.stale = true;
                return applied;
            }
        }

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(path = ticket.request.path(), "backend request failed: {e}");
                self.backend = BackendStatus::Unavailable(e.to_string());
                return applied;
            }
        };
        self.backend = BackendStatus::Available;

        match response {
            ApiResponse::Grid(grid) => {
                self.resources = grid.index();
                self.grid = grid;
                applied.grid_changed = true;
            }
            ApiResponse::Snapshot(sim) => {
                if let Some(generation) = ticket.generation {
                    self.applied_generation = generation;
                }
                self.sim = sim;
                applied.snapshot_changed = true;
                if self.is_playing() && self.sim.all_active_arrived() {
                    info!("every active agent reached its goal; stopping play");
                    self.play = PlayState::Stopped;
                    applied.auto_stopped = true;
                }
            }
            ApiResponse::Models(models) => {
                self.models = models;
                applied.models_changed = true;
                if let Some(first) = self.models.first().cloned() {
                    applied.follow_up = Some(self.set_active_models(vec![first]));
                }
            }
            ApiResponse::Ack => {
                if matches!(ticket.request, ApiRequest::SetModel(_)) {
                    applied.follow_up = Some(self.refresh());
                }
            }
        }
        applied
    }
}

impl Default for SimulationView {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}
