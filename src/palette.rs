//! Agent colours.
//!
//! Colour follows an agent's *position* in the active-model list, not its
//! name: reordering the list reassigns colours. The ensemble is the exception
//! and always gets [`ENSEMBLE_COLOR`].

use crate::fmt::fmt_f64_fixed;
use crate::snapshot::AgentRole;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS colour string (`#rrggbb` when opaque, `rgba(...)` otherwise).
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                fmt_f64_fixed(self.a.max(0.0), 3)
            )
        }
    }
}

pub const ENSEMBLE_COLOR: Color = Color::rgb(0xff, 0xd7, 0x00);

pub const MODEL_COLORS: [Color; 10] = [
    Color::rgb(0xff, 0x00, 0x00), // red
    Color::rgb(0x00, 0x00, 0xff), // blue
    Color::rgb(0x00, 0xff, 0x00), // green
    Color::rgb(0xff, 0x00, 0xff), // magenta
    Color::rgb(0x00, 0xff, 0xff), // cyan
    Color::rgb(0xff, 0xa5, 0x00), // orange
    Color::rgb(0x80, 0x00, 0x80), // purple
    Color::rgb(0x00, 0x80, 0x00), // dark green
    Color::rgb(0x00, 0x00, 0x80), // navy
    Color::rgb(0x80, 0x00, 0x00), // maroon
];

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub ensemble: Color,
    pub models: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ensemble: ENSEMBLE_COLOR,
            models: MODEL_COLORS.to_vec(),
        }
    }
}

impl Palette {
    pub fn color_for(&self, role: AgentRole) -> Color {
        match role {
            AgentRole::Ensemble => self.ensemble,
            AgentRole::Active(_) if self.models.is_empty() => self.ensemble,
            AgentRole::Active(i) => self.models[i % self.models.len()],
        }
    }
}
