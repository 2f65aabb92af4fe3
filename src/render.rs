//! Scene rendering onto an abstract 2D [`Surface`].
//!
//! Draw order is fixed; later layers occlude earlier ones:
//! clear, cells, resource markers, path trails, goal cells, highlight rings, the ensemble
//! arrow, then per active model its arrow and its body, then labels.
//!
//! [`render`] reads only its [`Scene`] argument, so the same inputs always
//! produce the same command stream.

use std::f64::consts::PI;

use hashbrown::HashMap;

use crate::animation::{ArrowAnimation, Highlight};
use crate::config::ViewConfig;
use crate::geometry::{CellPos, Pixel, Rect};
use crate::palette::{Color, Palette};
use crate::snapshot::{AgentRole, GridSnapshot, SimulationSnapshot};

pub const CELL_FILL: Color = Color::rgb(0xff, 0xff, 0xff);
pub const CELL_BORDER: Color = Color::rgb(0xcc, 0xcc, 0xcc);
pub const RESOURCE_INK: Color = Color::rgb(0x22, 0x22, 0x22);
pub const GOAL_FILL: Color = Color {
    r: 0x00,
    g: 0xaa,
    b: 0x00,
    a: 0.75,
};
pub const LABEL_INK: Color = Color::rgb(0x00, 0x00, 0x00);
pub const RESOURCE_GLYPH: &str = "📚";

const ARROW_WIDTH: f64 = 3.0;
const ARROWHEAD_LEN: f64 = 10.0;
const ARROWHEAD_SPREAD: f64 = PI / 7.0;
const HIGHLIGHT_WIDTH: f64 = 3.0;
const LABEL_FONT_PX: f64 = 10.0;

pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64);
    fn fill_circle(&mut self, center: Pixel, radius: f64, color: Color);
    fn stroke_circle(&mut self, center: Pixel, radius: f64, color: Color, line_width: f64);
    fn line(&mut self, from: Pixel, to: Pixel, color: Color, line_width: f64);
    fn fill_polygon(&mut self, points: &[Pixel], color: Color);
    fn text(&mut self, text: &str, at: Pixel, color: Color, font_px: f64);
}

/// Everything a frame depends on.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub grid: &'a GridSnapshot,
    pub sim: &'a SimulationSnapshot,
    pub arrows: &'a HashMap<String, ArrowAnimation>,
    pub highlights: &'a [Highlight],
    pub config: &'a ViewConfig,
    pub palette: &'a Palette,
}

pub fn render<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>) {
    let cfg = scene.config;
    let mapper = cfg.mapper(scene.grid.width, scene.grid.height);
    let (w, h) = mapper.canvas_size();
    surface.clear(w as f64, h as f64);

    for x in 0..scene.grid.width as i32 {
        for y in 0..scene.grid.height as i32 {
            let rect = mapper.cell_rect(CellPos::new(x, y));
            surface.fill_rect(rect, CELL_FILL);
            surface.stroke_rect(rect, CELL_BORDER, 1.0);
        }
    }

    let glyph_px = cfg.cell_size * 0.625;
    for &cell in &scene.grid.resources {
        let o = mapper.cell_origin(cell);
        surface.text(
            RESOURCE_GLYPH,
            o.offset(cfg.cell_size * 0.19, cfg.cell_size * 0.75),
            RESOURCE_INK,
            glyph_px,
        );
    }

    let drawn = scene.sim.drawn_agents();

    for (_, role, state) in &drawn {
        if *role == AgentRole::Ensemble {
            continue;
        }
        let color = scene.palette.color_for(*role);
        let len = state.path.len().max(1) as f64;
        for (step, cell) in state.path.iter().enumerate() {
            if scene.grid.in_bounds(*cell) {
                surface.fill_rect(mapper.cell_rect(*cell), color.with_alpha(trail_alpha(step, len)));
            }
        }
    }

    let mut goals: Vec<CellPos> = drawn.iter().filter_map(|(_, _, s)| s.goal).collect();
    goals.sort_unstable();
    goals.dedup();
    for goal in goals.into_iter().filter(|g| scene.grid.in_bounds(*g)) {
        surface.fill_rect(mapper.cell_rect(goal), GOAL_FILL);
    }

    for h in scene.highlights {
        if h.alpha > 0.0 {
            surface.stroke_circle(h.center, h.radius, h.color.with_alpha(h.alpha), HIGHLIGHT_WIDTH);
        }
    }

    let body_radius = (cfg.cell_size / 2.0 - 4.0).max(1.0);
    for (name, role, state) in &drawn {
        let color = scene.palette.color_for(*role);
        if let Some(arrow) = scene.arrows.get(*name) {
            draw_arrow(
                surface,
                arrow.from,
                arrow.to,
                color,
                arrow.progress,
                cfg.arrowhead_threshold,
            );
        }
        if *role == AgentRole::Ensemble {
            continue;
        }
        if let Some(pos) = state.position {
            surface.fill_circle(mapper.cell_center(pos), body_radius, color);
        }
    }

    if cfg.show_labels {
        for (name, role, state) in &drawn {
            if *role == AgentRole::Ensemble {
                continue;
            }
            let Some(pos) = state.position else {
                continue;
            };
            let label: String = name.chars().take(cfg.label_chars).collect();
            surface.text(
                &label,
                mapper.cell_origin(pos).offset(0.0, -2.0),
                LABEL_INK,
                LABEL_FONT_PX,
            );
        }
    }
}

/// Older steps of a path fade towards 0.3, the newest approaches opaque.
fn trail_alpha(step: usize, len: f64) -> f64 {
    0.3 + 0.7 * step as f64 / len
}

/// Draw the first `progress` of the line `from -> to`. The arrowhead only
/// appears once `progress > head_threshold`, oriented along the line.
pub fn draw_arrow<S: Surface + ?Sized>(
    surface: &mut S,
    from: Pixel,
    to: Pixel,
    color: Color,
    progress: f64,
    head_threshold: f64,
) {
    let progress = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let tip = from.lerp(to, progress);
    surface.line(from, tip, color, ARROW_WIDTH);

    if progress > head_threshold {
        let angle = (to.y - from.y).atan2(to.x - from.x);
        let left = Pixel::new(
            tip.x - ARROWHEAD_LEN * (angle - ARROWHEAD_SPREAD).cos(),
            tip.y - ARROWHEAD_LEN * (angle - ARROWHEAD_SPREAD).sin(),
        );
        let right = Pixel::new(
            tip.x - ARROWHEAD_LEN * (angle + ARROWHEAD_SPREAD).cos(),
            tip.y - ARROWHEAD_LEN * (angle + ARROWHEAD_SPREAD).sin(),
        );
        surface.fill_polygon(&[tip, left, right], color);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { width: f64, height: f64 },
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, color: Color, line_width: f64 },
    FillCircle { center: Pixel, radius: f64, color: Color },
    StrokeCircle { center: Pixel, radius: f64, color: Color, line_width: f64 },
    Line { from: Pixel, to: Pixel, color: Color, line_width: f64 },
    Polygon { points: Vec<Pixel>, color: Color },
    Text { text: String, at: Pixel, color: Color, font_px: f64 },
}

/// A [`Surface`] that records commands instead of drawing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn fill_circle(&mut self, center: Pixel, radius: f64, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Pixel, radius: f64, color: Color, line_width: f64) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            line_width,
        });
    }

    fn line(&mut self, from: Pixel, to: Pixel, color: Color, line_width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            line_width,
        });
    }

    fn fill_polygon(&mut self, points: &[Pixel], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn text(&mut self, text: &str, at: Pixel, color: Color, font_px: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            color,
            font_px,
        });
    }
}
