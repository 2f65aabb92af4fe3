//! Grid ↔ pixel coordinate mapping.
//!
//! Grid cells use a bottom-left origin (row 0 is the bottom row), the drawing
//! surface uses a top-left origin. Every conversion in the crate goes through
//! [`CellMapper`] so the Y flip lives in exactly one place.

use serde::{Deserialize, Serialize};

/// Integer grid cell coordinate, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Canonical `"x,y"` key as used by the backend's `resource_map`.
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Parse a `"x,y"` key. Whitespace around either number is tolerated.
    pub fn parse_key(key: &str) -> Option<Self> {
        let (x, y) = key.split_once(',')?;
        Some(Self::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
    }
}

impl From<[i32; 2]> for CellPos {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

/// Point on the drawing surface, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point `t` of the way from `self` to `to` (`t` is not clamped).
    pub fn lerp(self, to: Pixel, t: f64) -> Pixel {
        Pixel::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Pixel {
        Pixel::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Maps cells of a `width × height` grid to pixels for a given cell size and margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMapper {
    pub width: u32,
    pub height: u32,
    pub cell_size: f64,
    pub margin: f64,
}

impl CellMapper {
    pub fn new(width: u32, height: u32, cell_size: f64, margin: f64) -> Self {
        Self {
            width,
            height,
            cell_size,
            margin,
        }
    }

    #[inline]
    pub fn pitch(&self) -> f64 {
        self.cell_size + self.margin
    }

    /// Canvas size in pixels needed to show the whole grid.
    pub fn canvas_size(&self) -> (u32, u32) {
        let p = self.pitch();
        (
            (self.width as f64 * p).ceil() as u32,
            (self.height as f64 * p).ceil() as u32,
        )
    }

    pub fn cell_origin(&self, cell: CellPos) -> Pixel {
        let p = self.pitch();
        Pixel::new(
            cell.x as f64 * p,
            (self.height as f64 - 1.0 - cell.y as f64) * p,
        )
    }

    pub fn cell_center(&self, cell: CellPos) -> Pixel {
        let half = self.cell_size / 2.0;
        self.cell_origin(cell).offset(half, half)
    }

    pub fn cell_rect(&self, cell: CellPos) -> Rect {
        let o = self.cell_origin(cell);
        Rect {
            x: o.x,
            y: o.y,
            w: self.cell_size,
            h: self.cell_size,
        }
    }

    /// Inverse of [`CellMapper::cell_origin`]. Pixels in the margin belong to
    /// the cell on their left/top. Returns `None` outside the grid.
    pub fn pixel_to_cell(&self, px: f64, py: f64) -> Option<CellPos> {
        if !px.is_finite() || !py.is_finite() || px < 0.0 || py < 0.0 {
            return None;
        }
        let p = self.pitch();
        if p <= 0.0 {
            return None;
        }
        let col = (px / p).floor() as i64;
        let row = (py / p).floor() as i64;
        let x = col;
        let y = self.height as i64 - 1 - row;
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(CellPos::new(x as i32, y as i32))
    }
}
