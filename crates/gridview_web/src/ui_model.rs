//! UI text and small view models that should be available on both wasm and
//! native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! labels and the model checklist on the host.

use gridview::controller::{BackendStatus, PlayState};
use gridview::fmt::fmt_f64_fixed;
use gridview::palette::Color;

pub const LOADING_TEXT: &str = "Loading simulation...";
pub const APP_TITLE: &str = "Grid World Simulation";

/// Label of the button that toggles continuous play.
pub fn play_button_label(state: PlayState) -> &'static str {
    match state {
        PlayState::Stopped => "Play",
        PlayState::Playing => "Pause",
    }
}

/// Non-blocking banner text, shown only while the backend is failing.
pub fn backend_banner(status: &BackendStatus) -> Option<String> {
    match status {
        BackendStatus::Available => None,
        BackendStatus::Unavailable(reason) => {
            Some(format!("Backend unavailable, showing last known state ({reason})"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub name: String,
    pub checked: bool,
}

/// One checkbox per known model, in `/models` order.
pub fn model_checklist(models: &[String], selected: &[String]) -> Vec<ModelOption> {
    models
        .iter()
        .map(|name| ModelOption {
            name: name.clone(),
            checked: selected.contains(name),
        })
        .collect()
}

/// Inline style for a colour swatch next to an agent name.
pub fn swatch_style(color: Color) -> String {
    format!(
        "display: inline-block; width: 12px; height: 12px; border-radius: 50%; background: {};",
        color.css()
    )
}

/// Absolute position of the hover tooltip, relative to the canvas wrapper.
pub fn tooltip_style(left_px: f64, top_px: f64) -> String {
    let left = fmt_f64_fixed(left_px, 0);
    let top = fmt_f64_fixed(top_px, 0);
    format!("position: absolute; left: {left}px; top: {top}px; pointer-events: none;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_label_follows_state() {
        assert_eq!(play_button_label(PlayState::Stopped), "Play");
        assert_eq!(play_button_label(PlayState::Playing), "Pause");
    }

    #[test]
    fn banner_only_when_unavailable() {
        assert_eq!(backend_banner(&BackendStatus::Available), None);
        let b = backend_banner(&BackendStatus::Unavailable("connection refused".into())).unwrap();
        assert!(b.contains("connection refused"));
    }

    #[test]
    fn checklist_keeps_model_order() {
        let models = vec!["m1".to_string(), "m2".to_string(), "m3".to_string()];
        let selected = vec!["m3".to_string(), "m1".to_string()];
        let list = model_checklist(&models, &selected);
        let names: Vec<&str> = list.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["m1", "m2", "m3"]);
        let checked: Vec<bool> = list.iter().map(|o| o.checked).collect();
        assert_eq!(checked, [true, false, true]);
    }

    #[test]
    fn tooltip_style_rounds_to_pixels() {
        assert_eq!(
            tooltip_style(22.4, 51.6),
            "position: absolute; left: 22px; top: 52px; pointer-events: none;"
        );
    }

    #[test]
    fn swatch_uses_css_color() {
        assert!(swatch_style(Color::rgb(0xff, 0xd7, 0x00)).contains("#ffd700"));
    }
}
