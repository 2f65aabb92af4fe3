//! Core of the grid-world simulation viewer.
//!
//! Everything here is plain Rust with no browser dependency, so the view
//! logic (coordinate mapping, rendering, arrow animation, play/pause and
//! request ordering) runs and is tested on the host. The browser app in
//! `crates/gridview_web` supplies the canvas, timers and `fetch`.
//!
//! A frame is produced by:
//! 1. [`controller::SimulationView`] issuing requests and applying responses,
//! 2. [`animation::ArrowAnimator`] observing each new snapshot and advancing
//!    on animation frames,
//! 3. [`render::render`] drawing the resulting [`render::Scene`] onto a
//!    [`render::Surface`].

pub mod animation;
pub mod api;
pub mod config;
pub mod controller;
pub mod easing;
pub mod error;
pub mod fmt;
pub mod geometry;
pub mod hover;
pub mod palette;
pub mod render;
pub mod resources;
pub mod snapshot;
pub mod status;

pub use animation::{ArrowAnimator, FrameOutcome};
pub use api::{ApiRequest, ApiResponse, Backend};
pub use config::ViewConfig;
pub use controller::{Applied, BackendStatus, PlayState, SimulationView, Ticket};
pub use error::ViewError;
pub use geometry::{CellMapper, CellPos, Pixel};
pub use render::{render, RecordingSurface, Scene, Surface};
