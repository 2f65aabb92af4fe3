use gridview::api::exchange;
use gridview::controller::{PlayState, Ticket};
use gridview::error::Result as ViewResult;
use gridview::{render, ApiResponse, ArrowAnimator, SimulationView, ViewConfig};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::{debug, info, warn};

use crate::ui_model::{
    backend_banner, model_checklist, play_button_label, swatch_style, APP_TITLE, LOADING_TEXT,
};

mod canvas;
mod http;
mod logging;
mod storage;
mod timers;
mod tooltip;

use canvas::CanvasSurface;
use http::FetchBackend;
use timers::{AnimationFrameLoop, IntervalHandle};
use tooltip::{TooltipPortal, TooltipStore};

pub fn start() {
    logging::init();
    mount_to_body(|| view! { <App /> });
}

struct ViewRuntime {
    view: SimulationView,
    animator: ArrowAnimator,
    /// Bumped whenever the view is rebuilt; responses from an older epoch are dropped.
    epoch: u64,
}

impl ViewRuntime {
    fn new(config: ViewConfig, epoch: u64) -> Self {
        let view = SimulationView::new(config);
        let animator = ArrowAnimator::new(view.animation_timing());
        Self {
            view,
            animator,
            epoch,
        }
    }
}

#[derive(Default)]
struct Timers {
    play: Option<IntervalHandle>,
    frames: Option<AnimationFrameLoop>,
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Copyable handles shared by every callback of the app.
#[derive(Clone, Copy)]
struct Handles {
    runtime: StoredValue<ViewRuntime>,
    timers: StoredValue<Timers, LocalStorage>,
    canvas: NodeRef<html::Canvas>,
    revision: RwSignal<u64>,
}

impl Handles {
    /// Mark controller state as changed for the reactive UI.
    fn bump(self) {
        self.revision.update(|r| *r += 1);
    }

    /// Read controller state, tracking `revision`.
    fn read<U>(self, f: impl FnOnce(&SimulationView) -> U) -> U {
        self.revision.track();
        self.runtime.with_value(|r| f(&r.view))
    }

    fn load(self) {
        let tickets = self
            .runtime
            .try_update_value(|r| r.view.load_initial())
            .unwrap_or_default();
        self.bump();
        for t in tickets {
            self.dispatch(t);
        }
    }

    fn dispatch(self, ticket: Ticket) {
        let Some((backend, epoch)) = self
            .runtime
            .try_with_value(|r| (FetchBackend::new(r.view.config().clone()), r.epoch))
        else {
            return;
        };
        spawn_local(async move {
            let mut next = Some(ticket);
            while let Some(ticket) = next.take() {
                let result = exchange(&backend, ticket.request()).await;
                next = self.apply(epoch, ticket, result);
            }
        });
    }

    fn apply(self, epoch: u64, ticket: Ticket, result: ViewResult<ApiResponse>) -> Option<Ticket> {
        let now = now_ms();
        let (applied, animating) = self.runtime.try_update_value(|r| {
            if r.epoch != epoch {
                debug!(path = ticket.request().path(), "dropping response for a replaced view");
                return None;
            }
            let applied = r.view.complete(ticket, result);
            if applied.grid_changed {
                r.animator.clear();
            }
            if applied.needs_redraw() {
                r.view.observe(&mut r.animator, now);
            }
            Some((applied, r.animator.is_active()))
        })??;

        if applied.auto_stopped {
            self.timers.update_value(|t| t.play = None);
        }
        if applied.needs_redraw() {
            self.redraw();
            if animating {
                self.kick_frames();
            }
        }
        self.bump();
        applied.follow_up
    }

    fn redraw(self) {
        let Some(canvas) = self.canvas.get_untracked() else {
            return;
        };
        match CanvasSurface::new(canvas) {
            Ok(mut surface) => self
                .runtime
                .with_value(|r| render(&mut surface, &r.view.scene(&r.animator))),
            Err(e) => warn!("cannot draw: {e}"),
        }
    }

    fn on_frame(self, ts: f64) -> bool {
        let Some(outcome) = self.runtime.try_update_value(|r| r.animator.advance(ts)) else {
            return false;
        };
        if outcome.redraw {
            self.redraw();
        }
        outcome.active
    }

    /// Make sure the animation loop is running.
    fn kick_frames(self) {
        let resumed = self
            .timers
            .with_value(|t| t.frames.as_ref().map(AnimationFrameLoop::resume));
        match resumed {
            Some(Ok(())) => {}
            Some(Err(e)) => warn!("animation loop: {e}"),
            None => match AnimationFrameLoop::start(move |ts| self.on_frame(ts)) {
                Ok(frames) => self.timers.update_value(|t| t.frames = Some(frames)),
                Err(e) => warn!("animation loop: {e}"),
            },
        }
    }

    fn step(self) {
        if let Some(t) = self.runtime.try_update_value(|r| r.view.step()).flatten() {
            self.dispatch(t);
        }
    }

    fn reset(self) {
        if let Some(t) = self.runtime.try_update_value(|r| r.view.reset()) {
            self.dispatch(t);
        }
    }

    fn toggle_model(self, name: &str) {
        if let Some(t) = self.runtime.try_update_value(|r| r.view.toggle_model(name)) {
            self.bump();
            self.dispatch(t);
        }
    }

    fn toggle_play(self) {
        match self.runtime.try_update_value(|r| r.view.toggle_play()) {
            Some(PlayState::Playing) => self.start_play(),
            Some(PlayState::Stopped) => self.timers.update_value(|t| t.play = None),
            None => return,
        }
        self.bump();
    }

    fn start_play(self) {
        let period = self.runtime.with_value(|r| r.view.config().play_interval_ms);
        let tick = move || {
            if let Some(t) = self.runtime.try_update_value(|r| r.view.play_tick()).flatten() {
                self.dispatch(t);
            }
        };
        match IntervalHandle::start(period, tick) {
            Ok(handle) => self.timers.update_value(|t| t.play = Some(handle)),
            Err(e) => {
                warn!("cannot start play timer: {e}");
                self.runtime.update_value(|r| r.view.stop());
            }
        }
    }

    fn stop_timers(self) {
        self.timers.update_value(|t| {
            t.play = None;
            t.frames = None;
        });
    }

    /// Point the viewer at another backend and load from scratch.
    fn reconnect(self, backend_url: String) {
        let Some((mut cfg, epoch)) = self
            .runtime
            .try_with_value(|r| (r.view.config().clone(), r.epoch))
        else {
            return;
        };
        cfg.backend_url = backend_url;
        let cfg = cfg.sanitized();
        storage::save_settings(&cfg);
        info!(backend = %cfg.backend_url, "reconnecting");

        self.stop_timers();
        self.runtime.set_value(ViewRuntime::new(cfg, epoch + 1));
        self.redraw();
        self.load();
    }
}

#[component]
fn App() -> impl IntoView {
    let config = storage::load_settings();
    let backend_draft = RwSignal::new(config.backend_url.clone());
    let (initial_w, initial_h) = SimulationView::new(config.clone()).mapper().canvas_size();

    let handles = Handles {
        runtime: StoredValue::new(ViewRuntime::new(config, 0)),
        timers: StoredValue::new_local(Timers::default()),
        canvas: NodeRef::new(),
        revision: RwSignal::new(0),
    };
    let tooltip: TooltipStore = RwSignal::new(None);

    let play_label = move || handles.read(|v| play_button_label(v.play_state()));
    let can_step = move || handles.read(|v| v.can_step());
    let loading = move || handles.read(|v| v.is_loading());
    let banner = move || handles.read(|v| backend_banner(v.backend_status()));
    let checklist = move || handles.read(|v| model_checklist(v.models(), v.selected_models()));
    let rows = move || handles.read(|v| v.status_rows());

    Effect::new(move |_| {
        if handles.canvas.get().is_some() {
            handles.redraw();
        }
    });

    handles.load();

    on_cleanup(move || handles.stop_timers());

    let on_hover = move |ev: web_sys::MouseEvent| {
        let info = handles
            .runtime
            .with_value(|r| r.view.hover(ev.offset_x() as f64, ev.offset_y() as f64));
        if tooltip.get_untracked() != info {
            tooltip.set(info);
        }
    };

    view! {
        <main style="font-family: system-ui, -apple-system, Segoe UI, Roboto, sans-serif; padding: 18px; max-width: 960px; margin: 0 auto;">
            <h1 style="margin: 0 0 12px 0;">{APP_TITLE}</h1>

            {move || banner().map(|b| view! {
                <div class="banner" role="status" style="background: #fff4e5; color: #8a4b00; padding: 8px 12px; border-radius: 6px; margin-bottom: 12px;">
                    {b}
                </div>
            })}

            <section style="display: flex; gap: 10px; flex-wrap: wrap; margin-bottom: 14px; align-items: center;">
                <button on:click=move |_| handles.toggle_play()>
                    {play_label}
                </button>
                <button prop:disabled=move || !can_step() on:click=move |_| handles.step()>
                    "Step"
                </button>
                <button on:click=move |_| handles.reset()>
                    "Reset"
                </button>

                <label style="display: flex; gap: 8px; align-items: center; margin-left: auto;">
                    <span style="color: #333;">"Backend"</span>
                    <input
                        type="text"
                        prop:value=move || backend_draft.get()
                        on:input=move |ev| backend_draft.set(event_target_value(&ev))
                    />
                </label>
                <button on:click=move |_| handles.reconnect(backend_draft.get_untracked())>
                    "Connect"
                </button>
            </section>

            <section style="display: flex; gap: 24px; align-items: flex-start; flex-wrap: wrap;">
                <div style="position: relative; display: inline-block;">
                    <canvas
                        node_ref=handles.canvas
                        width=initial_w.to_string()
                        height=initial_h.to_string()
                        on:mousemove=on_hover
                        on:mouseleave=move |_| tooltip.set(None)
                    ></canvas>
                    <TooltipPortal store=tooltip />
                    <Show when=loading fallback=|| ()>
                        <div class="loading-overlay" style="position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; background: rgba(255, 255, 255, 0.8);">
                            {LOADING_TEXT}
                        </div>
                    </Show>
                </div>

                <aside style="min-width: 220px;">
                    <h3 style="margin: 0 0 6px 0;">"Models"</h3>
                    <div style="display: flex; flex-direction: column; gap: 4px; margin-bottom: 16px;">
                        {move || checklist().into_iter().map(|opt| {
                            let name = opt.name.clone();
                            view! {
                                <label style="display: flex; gap: 6px; align-items: center;">
                                    <input
                                        type="checkbox"
                                        prop:checked=opt.checked
                                        on:change=move |_| handles.toggle_model(&name)
                                    />
                                    {opt.name}
                                </label>
                            }
                        }).collect_view()}
                    </div>

                    <h3 style="margin: 0 0 6px 0;">"Agents"</h3>
                    <ul style="list-style: none; padding: 0; margin: 0; display: flex; flex-direction: column; gap: 4px;">
                        {move || rows().into_iter().map(|row| {
                            let position = row.position_label();
                            let reward = row.reward_label();
                            view! {
                                <li style="display: flex; gap: 6px; align-items: center;">
                                    <span style=swatch_style(row.color)></span>
                                    <strong>{row.name}</strong>
                                    <span style="color: #555;">{position}" · "{reward}</span>
                                    {row.arrived.then_some("✓")}
                                </li>
                            }
                        }).collect_view()}
                    </ul>
                </aside>
            </section>
        </main>
    }
}
