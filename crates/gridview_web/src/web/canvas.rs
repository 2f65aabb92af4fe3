use std::f64::consts::PI;

use gridview::fmt::fmt_f64_fixed;
use gridview::geometry::{Pixel, Rect};
use gridview::palette::Color;
use gridview::Surface;
use wasm_bindgen::JsCast;

/// [`Surface`] backed by a 2D canvas context.
pub(super) struct CanvasSurface {
    canvas: web_sys::HtmlCanvasElement,
    ctx: web_sys::CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub(super) fn new(canvas: web_sys::HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| "canvas: get_context threw".to_string())?
            .ok_or("canvas: missing 2d context".to_string())?
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .map_err(|_| "canvas: context is not 2d".to_string())?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        let (w, h) = (width.max(1.0) as u32, height.max(1.0) as u32);
        // Resizing a canvas wipes it, so only do it when the grid changed.
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn fill_circle(&mut self, center: Pixel, radius: f64, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        let _ = self.ctx.arc(center.x, center.y, radius, 0.0, PI * 2.0);
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Pixel, radius: f64, color: Color, line_width: f64) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(line_width);
        self.ctx.begin_path();
        let _ = self.ctx.arc(center.x, center.y, radius, 0.0, PI * 2.0);
        self.ctx.stroke();
    }

    fn line(&mut self, from: Pixel, to: Pixel, color: Color, line_width: f64) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(line_width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Pixel], color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn text(&mut self, text: &str, at: Pixel, color: Color, font_px: f64) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .set_font(&format!("{}px sans-serif", fmt_f64_fixed(font_px, 0)));
        let _ = self.ctx.fill_text(text, at.x, at.y);
    }
}
