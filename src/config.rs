use serde::{Deserialize, Serialize};

use crate::geometry::CellMapper;

/// View settings. Every field has a default so partial or stale stored JSON
/// still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_play_interval_ms")]
    pub play_interval_ms: u32,
    #[serde(default = "default_arrow_duration_ms")]
    pub arrow_duration_ms: f64,
    #[serde(default = "default_highlight_duration_ms")]
    pub highlight_duration_ms: f64,
    #[serde(default = "default_highlight_alpha")]
    pub highlight_alpha: f64,
    /// Arrowheads appear once progress is strictly above this.
    #[serde(default = "default_arrowhead_threshold")]
    pub arrowhead_threshold: f64,
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default = "default_label_chars")]
    pub label_chars: usize,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_cell_size() -> f64 {
    32.0
}

fn default_margin() -> f64 {
    2.0
}

fn default_play_interval_ms() -> u32 {
    400
}

fn default_arrow_duration_ms() -> f64 {
    700.0
}

fn default_highlight_duration_ms() -> f64 {
    400.0
}

fn default_highlight_alpha() -> f64 {
    0.6
}

fn default_arrowhead_threshold() -> f64 {
    0.85
}

fn default_true() -> bool {
    true
}

fn default_label_chars() -> usize {
    8
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            cell_size: default_cell_size(),
            margin: default_margin(),
            play_interval_ms: default_play_interval_ms(),
            arrow_duration_ms: default_arrow_duration_ms(),
            highlight_duration_ms: default_highlight_duration_ms(),
            highlight_alpha: default_highlight_alpha(),
            arrowhead_threshold: default_arrowhead_threshold(),
            show_labels: default_true(),
            label_chars: default_label_chars(),
        }
    }
}

impl ViewConfig {
    /// Parse stored JSON, falling back to defaults when it is unusable.
    pub fn from_json_or_default(raw: &str) -> Self {
        match serde_json::from_str::<ViewConfig>(raw) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                tracing::warn!("ignoring stored settings: {e}");
                Self::default()
            }
        }
    }

    /// Clamp values that would break geometry or timing.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !(self.cell_size.is_finite() && self.cell_size >= 4.0) {
            self.cell_size = d.cell_size;
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            self.margin = d.margin;
        }
        self.play_interval_ms = self.play_interval_ms.clamp(16, 60_000);
        if !(self.arrow_duration_ms.is_finite() && self.arrow_duration_ms > 0.0) {
            self.arrow_duration_ms = d.arrow_duration_ms;
        }
        if !(self.highlight_duration_ms.is_finite() && self.highlight_duration_ms > 0.0) {
            self.highlight_duration_ms = d.highlight_duration_ms;
        }
        self.highlight_alpha = if self.highlight_alpha.is_finite() {
            self.highlight_alpha.clamp(0.0, 1.0)
        } else {
            d.highlight_alpha
        };
        self.arrowhead_threshold = if self.arrowhead_threshold.is_finite() {
            self.arrowhead_threshold.clamp(0.0, 1.0)
        } else {
            d.arrowhead_threshold
        };
        self.backend_url = self.backend_url.trim().trim_end_matches('/').to_string();
        if self.backend_url.is_empty() {
            self.backend_url = d.backend_url;
        }
        self
    }

    pub fn mapper(&self, width: u32, height: u32) -> CellMapper {
        CellMapper::new(width, height, self.cell_size, self.margin)
    }

    /// `backend_url` joined with an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.backend_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
