//! Browser timers owned by Rust values: dropping the handle clears the timer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// `setInterval` that is cleared on drop.
pub(super) struct IntervalHandle {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl IntervalHandle {
    pub(super) fn start(period_ms: u32, tick: impl FnMut() + 'static) -> Result<Self, String> {
        let window = web_sys::window().ok_or("no window".to_string())?;
        let callback = Closure::wrap(Box::new(tick) as Box<dyn FnMut()>);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                period_ms.min(i32::MAX as u32) as i32,
            )
            .map_err(|_| "failed to start interval".to_string())?;
        Ok(Self {
            id,
            _callback: callback,
        })
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        if let Some(w) = web_sys::window() {
            w.clear_interval_with_handle(self.id);
        }
    }
}

struct FrameState {
    pending: Option<i32>,
    callback: Option<Closure<dyn FnMut(f64)>>,
}

/// A `requestAnimationFrame` loop.
///
/// `on_frame` receives the frame timestamp and returns whether another frame
/// is wanted. Once it returns `false` the loop idles until [`resume`] is
/// called. Dropping the loop cancels any pending frame.
///
/// [`resume`]: AnimationFrameLoop::resume
pub(super) struct AnimationFrameLoop {
    state: Rc<RefCell<FrameState>>,
}

impl AnimationFrameLoop {
    pub(super) fn start(mut on_frame: impl FnMut(f64) -> bool + 'static) -> Result<Self, String> {
        let state = Rc::new(RefCell::new(FrameState {
            pending: None,
            callback: None,
        }));
        let weak: Weak<RefCell<FrameState>> = Rc::downgrade(&state);
        let callback = Closure::wrap(Box::new(move |ts: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.borrow_mut().pending = None;
            if on_frame(ts) {
                let _ = schedule(&state);
            }
        }) as Box<dyn FnMut(f64)>);
        state.borrow_mut().callback = Some(callback);

        let frames = Self { state };
        frames.resume()?;
        Ok(frames)
    }

    pub(super) fn is_running(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Request the next frame unless one is already pending.
    pub(super) fn resume(&self) -> Result<(), String> {
        if self.is_running() {
            return Ok(());
        }
        schedule(&self.state)
    }
}

fn schedule(state: &Rc<RefCell<FrameState>>) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window".to_string())?;
    let mut s = state.borrow_mut();
    let Some(callback) = s.callback.as_ref() else {
        return Err("animation loop already torn down".to_string());
    };
    let id = window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|_| "requestAnimationFrame failed".to_string())?;
    s.pending = Some(id);
    Ok(())
}

impl Drop for AnimationFrameLoop {
    fn drop(&mut self) {
        let mut s = self.state.borrow_mut();
        if let Some(id) = s.pending.take() {
            if let Some(w) = web_sys::window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
        s.callback = None;
    }
}
