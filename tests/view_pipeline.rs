//! End-to-end: controller ↔ in-memory backend, animation, rendering.

use std::cell::RefCell;
use std::collections::VecDeque;

use gridview::api::{exchange, ApiRequest, Backend};
use gridview::controller::Ticket;
use gridview::error::{Result, ViewError};
use gridview::palette::{ENSEMBLE_COLOR, MODEL_COLORS};
use gridview::render::DrawCommand;
use gridview::{render, ArrowAnimator, BackendStatus, RecordingSurface, SimulationView, ViewConfig};

const GRID: &str = r#"{
    "grid_size_x": 2,
    "grid_size_y": 2,
    "resources": [[0,0],[1,1]],
    "resource_map": {"0,0": "Book", "1,1": "Pen"}
}"#;

const STATE: &str = r#"{
    "active_models": ["m1"],
    "states": {
        "ensemble": {"agent_pos": [0,0], "path": [[0,0],[1,1]], "reward": 5},
        "m1": {"agent_pos": [1,1], "path": [[1,1]], "reward": 2}
    }
}"#;

/// Answers from canned bodies and records every request path.
struct FakeBackend {
    log: RefCell<Vec<String>>,
    steps: RefCell<VecDeque<String>>,
    down: bool,
}

impl FakeBackend {
    fn new(steps: &[&str]) -> Self {
        Self {
            log: RefCell::new(Vec::new()),
            steps: RefCell::new(steps.iter().map(|s| s.to_string()).collect()),
            down: false,
        }
    }
}

impl Backend for FakeBackend {
    async fn send(&self, request: &ApiRequest) -> Result<String> {
        self.log.borrow_mut().push(request.path().to_string());
        if self.down {
            return Err(ViewError::Network("connection refused".into()));
        }
        Ok(match request {
            ApiRequest::Grid => GRID.to_string(),
            ApiRequest::Models => r#"["m1","m2"]"#.to_string(),
            ApiRequest::Step => self
                .steps
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| STATE.to_string()),
            _ => STATE.to_string(),
        })
    }
}

fn run(view: &mut SimulationView, backend: &FakeBackend, ticket: Ticket) {
    let mut next = Some(ticket);
    while let Some(t) = next.take() {
        let result = pollster::block_on(exchange(backend, t.request()));
        next = view.complete(t, result).follow_up;
    }
}

fn load(view: &mut SimulationView, backend: &FakeBackend) {
    for t in view.load_initial() {
        run(view, backend, t);
    }
}

#[test]
fn initial_load_activates_first_model() {
    let backend = FakeBackend::new(&[]);
    let mut view = SimulationView::new(ViewConfig::default());
    load(&mut view, &backend);

    assert!(!view.is_loading());
    assert_eq!(
        *backend.log.borrow(),
        ["/grid", "/state", "/models", "/set_active_models"]
    );
    assert_eq!(view.models(), ["m1", "m2"]);
    assert_eq!(view.selected_models(), ["m1"]);
    assert_eq!(view.grid().width, 2);
    assert_eq!(view.status_rows().len(), 2);
}

#[test]
fn ensemble_arrow_animates_and_renders() {
    let backend = FakeBackend::new(&[]);
    let mut view = SimulationView::new(ViewConfig::default());
    load(&mut view, &backend);

    let mut anim = ArrowAnimator::new(view.animation_timing());
    assert_eq!(view.observe(&mut anim, 0.0), 1, "only the ensemble has two resource visits");
    assert_eq!(view.observe(&mut anim, 16.0), 0);

    anim.advance(100.0);
    let mut surface = RecordingSurface::new();
    render(&mut surface, &view.scene(&anim));
    let heads = surface.count(|c| matches!(c, DrawCommand::Polygon { .. }));
    assert_eq!(heads, 0, "arrowhead hidden early in the animation");

    anim.advance(700.0);
    render(&mut surface, &view.scene(&anim));
    let polys: Vec<_> = surface
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Polygon { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(polys, vec![ENSEMBLE_COLOR]);
    let bodies = surface.count(|c| matches!(c, DrawCommand::FillCircle { color, .. } if *color == MODEL_COLORS[0]));
    assert_eq!(bodies, 1);
    assert_eq!(anim.highlights().len(), 1);
}

#[test]
fn playing_until_every_agent_arrives() {
    let not_yet = r#"{"active_models":["a","b"],"states":{
        "a":{"agent_pos":[1,1],"goal_pos":[1,1],"path":[[0,0],[1,1]]},
        "b":{"agent_pos":[0,1],"goal_pos":[1,1],"path":[[0,0],[0,1]]}}}"#;
    let done = r#"{"active_models":["a","b"],"states":{
        "a":{"agent_pos":[1,1],"goal_pos":[1,1],"path":[[0,0],[1,1]]},
        "b":{"agent_pos":[1,1],"goal_pos":[1,1],"path":[[0,0],[0,1],[1,1]]}}}"#;
    let backend = FakeBackend::new(&[not_yet, done]);
    let mut view = SimulationView::new(ViewConfig::default());
    load(&mut view, &backend);

    view.toggle_play();
    let mut ticks = 0;
    while let Some(t) = view.play_tick() {
        run(&mut view, &backend, t);
        ticks += 1;
        assert!(ticks < 10, "play never stopped");
    }
    assert_eq!(ticks, 2);
    assert!(view.can_step());
}

#[test]
fn backend_outage_keeps_last_snapshot() {
    let mut backend = FakeBackend::new(&[]);
    let mut view = SimulationView::new(ViewConfig::default());
    load(&mut view, &backend);
    let before = view.snapshot().clone();

    backend.down = true;
    let t = view.step().expect("stopped view can step");
    run(&mut view, &backend, t);

    assert!(matches!(view.backend_status(), BackendStatus::Unavailable(_)));
    assert_eq!(view.snapshot(), &before);
}

#[test]
fn hover_names_resources() {
    let backend = FakeBackend::new(&[]);
    let mut view = SimulationView::new(ViewConfig::default());
    load(&mut view, &backend);

    // Bottom-left cell (0,0) is drawn in the lower pixel row.
    assert_eq!(view.hover(10.0, 40.0).map(|h| h.name), Some("Book".to_string()));
    assert_eq!(view.hover(40.0, 10.0).map(|h| h.name), Some("Pen".to_string()));
    assert_eq!(view.hover(10.0, 10.0), None);
}
