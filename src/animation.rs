//! Arrow animation between consecutive resource visits.
//!
//! Per agent: `Idle -> Animating -> Idle` with a highlight ring fading out at
//! the arrow's destination once the arrow lands. The engine is time-driven:
//! callers pass a monotonic millisecond clock to [`ArrowAnimator::observe`]
//! and [`ArrowAnimator::advance`], so it runs identically under
//! `requestAnimationFrame` and in tests.

use hashbrown::HashMap;
use tracing::debug;

use crate::config::ViewConfig;
use crate::easing::EASE_IN_OUT;
use crate::geometry::{CellMapper, Pixel};
use crate::palette::{Color, Palette};
use crate::resources::ResourceIndex;
use crate::snapshot::SimulationSnapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTiming {
    pub arrow_ms: f64,
    pub highlight_ms: f64,
    pub highlight_alpha: f64,
    pub highlight_radius: f64,
}

impl AnimationTiming {
    pub fn from_config(cfg: &ViewConfig) -> Self {
        Self {
            arrow_ms: cfg.arrow_duration_ms,
            highlight_ms: cfg.highlight_duration_ms,
            highlight_alpha: cfg.highlight_alpha,
            highlight_radius: cfg.cell_size * 0.6,
        }
    }
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self::from_config(&ViewConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Animating,
    Landed,
}

/// Endpoints of the last resource-to-resource segment, in pixel centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentKey {
    pub from: Pixel,
    pub to: Pixel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowAnimation {
    pub from: Pixel,
    pub to: Pixel,
    /// Eased progress in `[0, 1]`; stays at 1 once landed.
    pub progress: f64,
    pub color: Color,
    started_at: f64,
    phase: Phase,
}

impl ArrowAnimation {
    pub fn is_animating(&self) -> bool {
        self.phase == Phase::Animating
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub agent: String,
    pub center: Pixel,
    pub radius: f64,
    pub color: Color,
    pub alpha: f64,
    started_at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    /// Something visible changed since the previous frame.
    pub redraw: bool,
    /// Another frame is needed.
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ArrowAnimator {
    timing: AnimationTiming,
    arrows: HashMap<String, ArrowAnimation>,
    last_segment: HashMap<String, SegmentKey>,
    highlights: Vec<Highlight>,
}

impl ArrowAnimator {
    pub fn new(timing: AnimationTiming) -> Self {
        Self {
            timing,
            ..Self::default()
        }
    }

    pub fn timing(&self) -> AnimationTiming {
        self.timing
    }

    pub fn arrows(&self) -> &HashMap<String, ArrowAnimation> {
        &self.arrows
    }

    pub fn arrow(&self, agent: &str) -> Option<&ArrowAnimation> {
        self.arrows.get(agent)
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn is_active(&self) -> bool {
        !self.highlights.is_empty() || self.arrows.values().any(ArrowAnimation::is_animating)
    }

    /// Forget all arrows, segment history and highlights (e.g. new grid).
    pub fn clear(&mut self) {
        self.arrows.clear();
        self.last_segment.clear();
        self.highlights.clear();
    }

    /// Compare each drawn agent's latest segment with the one last animated
    /// and start an animation where it changed. Returns how many started.
    ///
    /// Feeding the same snapshot again is a no-op. An agent whose path has
    /// dropped below two resource visits (after a reset) loses its arrow and
    /// history, so the same segment animates again when it reappears.
    pub fn observe(
        &mut self,
        snapshot: &SimulationSnapshot,
        resources: &ResourceIndex,
        mapper: &CellMapper,
        palette: &Palette,
        now_ms: f64,
    ) -> usize {
        let drawn = snapshot.drawn_agents();
        self.arrows
            .retain(|name, _| drawn.iter().any(|(n, _, _)| *n == name.as_str()));
        self.last_segment
            .retain(|name, _| drawn.iter().any(|(n, _, _)| *n == name.as_str()));

        let mut started = 0;
        for (name, role, state) in drawn {
            let Some((a, b)) = state.latest_segment(resources) else {
                self.arrows.remove(name);
                self.last_segment.remove(name);
                continue;
            };
            let key = SegmentKey {
                from: mapper.cell_center(a),
                to: mapper.cell_center(b),
            };
            if self.last_segment.get(name) == Some(&key) {
                continue;
            }

            debug!(agent = name, from = ?a, to = ?b, "arrow animation scheduled");
            self.last_segment.insert(name.to_string(), key);
            self.arrows.insert(
                name.to_string(),
                ArrowAnimation {
                    from: key.from,
                    to: key.to,
                    progress: 0.0,
                    color: palette.color_for(role),
                    started_at: now_ms,
                    phase: Phase::Animating,
                },
            );
            started += 1;
        }
        started
    }

    /// Advance every in-flight arrow and highlight to `now_ms`.
    pub fn advance(&mut self, now_ms: f64) -> FrameOutcome {
        let timing = self.timing;
        let mut redraw = false;

        for (name, arrow) in self.arrows.iter_mut() {
            if arrow.phase != Phase::Animating {
                continue;
            }
            redraw = true;
            let t = (now_ms - arrow.started_at) / timing.arrow_ms;
            if t >= 1.0 {
                arrow.progress = 1.0;
                arrow.phase = Phase::Landed;
                self.highlights.push(Highlight {
                    agent: name.clone(),
                    center: arrow.to,
                    radius: timing.highlight_radius,
                    color: arrow.color,
                    alpha: timing.highlight_alpha,
                    started_at: now_ms,
                });
            } else {
                arrow.progress = EASE_IN_OUT.ease(t);
            }
        }

        for h in self.highlights.iter_mut() {
            redraw = true;
            let t = (now_ms - h.started_at) / timing.highlight_ms;
            h.alpha = timing.highlight_alpha * (1.0 - EASE_IN_OUT.ease(t));
        }
        self.highlights.retain(|h| h.alpha > 0.0);

        FrameOutcome {
            redraw,
            active: self.is_active(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CellPos;
    use crate::snapshot::AgentState;

    fn world() -> (ResourceIndex, CellMapper) {
        let res = ResourceIndex::new(
            [CellPos::new(0, 0), CellPos::new(1, 1), CellPos::new(2, 2)],
            [],
        );
        (res, CellMapper::new(4, 4, 32.0, 2.0))
    }

    fn snap_with_path(name: &str, path: &[(i32, i32)]) -> SimulationSnapshot {
        let mut s = SimulationSnapshot {
            active_models: vec![name.to_string()],
            ..Default::default()
        };
        s.states.insert(
            name.to_string(),
            AgentState {
                path: path.iter().map(|&(x, y)| CellPos::new(x, y)).collect(),
                ..AgentState::default()
            },
        );
        s
    }

    #[test]
    fn same_snapshot_twice_schedules_once() {
        let (res, m) = world();
        let mut anim = ArrowAnimator::new(AnimationTiming::default());
        let snap = snap_with_path("a", &[(0, 0), (0, 1), (1, 1)]);

        assert_eq!(anim.observe(&snap, &res, &m, &Palette::default(), 0.0), 1);
        anim.advance(100.0);
        let progress = anim.arrow("a").unwrap().progress;
        assert_eq!(anim.observe(&snap, &res, &m, &Palette::default(), 100.0), 0);
        assert_eq!(anim.arrow("a").unwrap().progress, progress);
    }

    #[test]
    fn landed_and_faded_segment_is_not_replayed() {
        let (res, m) = world();
        let pal = Palette::default();
        let mut anim = ArrowAnimator::new(AnimationTiming::default());
        let snap = snap_with_path("a", &[(0, 0), (0, 1), (1, 1)]);

        assert_eq!(anim.observe(&snap, &res, &m, &pal, 0.0), 1);
        anim.advance(700.0);
        anim.advance(1200.0);
        assert!(anim.highlights().is_empty());
        assert!(!anim.is_active());

        assert_eq!(anim.observe(&snap, &res, &m, &pal, 1300.0), 0);
        assert!(anim.highlights().is_empty());
        assert_eq!(anim.advance(1400.0), FrameOutcome::default());
        assert_eq!(anim.arrow("a").unwrap().progress, 1.0);
    }

    #[test]
    fn arrow_lands_then_highlight_fades_out() {
        let (res, m) = world();
        let mut anim = ArrowAnimator::new(AnimationTiming::default());
        let snap = snap_with_path("a", &[(0, 0), (1, 1)]);
        anim.observe(&snap, &res, &m, &Palette::default(), 1000.0);

        let out = anim.advance(1350.0);
        assert!(out.redraw && out.active);
        let p = anim.arrow("a").unwrap().progress;
        assert!(p > 0.0 && p < 1.0);
        assert!(anim.highlights().is_empty());

        anim.advance(1700.0);
        let arrow = anim.arrow("a").unwrap();
        assert_eq!(arrow.progress, 1.0);
        assert!(!arrow.is_animating());
        assert_eq!(anim.highlights().len(), 1);
        assert_eq!(anim.highlights()[0].alpha, 0.6);
        assert_eq!(anim.highlights()[0].center, m.cell_center(CellPos::new(1, 1)));

        anim.advance(1900.0);
        let a = anim.highlights()[0].alpha;
        assert!(a > 0.0 && a < 0.6);

        // Removal frame still asks for one redraw to erase the ring.
        let out = anim.advance(2100.0);
        assert!(anim.highlights().is_empty());
        assert_eq!(out, FrameOutcome { redraw: true, active: false });

        assert_eq!(anim.advance(2200.0), FrameOutcome::default());
        assert_eq!(anim.arrow("a").unwrap().progress, 1.0);
    }

    #[test]
    fn new_segment_does_not_cancel_a_fading_highlight() {
        let (res, m) = world();
        let timing = AnimationTiming {
            highlight_ms: 2000.0,
            ..AnimationTiming::default()
        };
        let mut anim = ArrowAnimator::new(timing);
        anim.observe(&snap_with_path("a", &[(0, 0), (1, 1)]), &res, &m, &Palette::default(), 0.0);
        anim.advance(700.0);
        assert_eq!(anim.highlights().len(), 1);

        let n = anim.observe(
            &snap_with_path("a", &[(0, 0), (1, 1), (2, 2)]),
            &res,
            &m,
            &Palette::default(),
            750.0,
        );
        assert_eq!(n, 1);
        anim.advance(1450.0);
        assert_eq!(anim.highlights().len(), 2);
        assert!(anim.highlights().iter().all(|h| h.agent == "a" && h.alpha > 0.0));

        anim.advance(5000.0);
        assert!(anim.highlights().is_empty());
        assert!(!anim.is_active());
    }

    #[test]
    fn reset_path_clears_history() {
        let (res, m) = world();
        let pal = Palette::default();
        let mut anim = ArrowAnimator::new(AnimationTiming::default());
        let full = snap_with_path("a", &[(0, 0), (1, 1)]);
        anim.observe(&full, &res, &m, &pal, 0.0);
        anim.advance(800.0);

        anim.observe(&snap_with_path("a", &[(0, 0)]), &res, &m, &pal, 900.0);
        assert!(anim.arrow("a").is_none());

        assert_eq!(anim.observe(&full, &res, &m, &pal, 1000.0), 1);
    }

    #[test]
    fn zero_length_segment_animates_without_panicking() {
        let (res, m) = world();
        let mut anim = ArrowAnimator::new(AnimationTiming::default());
        let snap = snap_with_path("a", &[(0, 0), (0, 1), (1, 1), (1, 1)]);
        assert_eq!(anim.observe(&snap, &res, &m, &Palette::default(), 0.0), 1);
        let arrow = anim.arrow("a").unwrap();
        assert_eq!(arrow.from, arrow.to);
        anim.advance(800.0);
        assert_eq!(anim.highlights().len(), 1);
    }

    #[test]
    fn deselected_agents_drop_their_arrows() {
        let (res, m) = world();
        let mut anim = ArrowAnimator::new(AnimationTiming::default());
        anim.observe(&snap_with_path("a", &[(0, 0), (1, 1)]), &res, &m, &Palette::default(), 0.0);
        anim.observe(&snap_with_path("b", &[(0, 0)]), &res, &m, &Palette::default(), 10.0);
        assert!(anim.arrow("a").is_none());
        assert!(anim.arrows().is_empty());
    }
}
