//! Browser bindings: `requestAnimationFrame` scheduling and keyboard listeners

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, KeyboardEvent};

use super::frame::{FrameHandle, FrameScheduler};

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Frame scheduler backed by `window.requestAnimationFrame`
///
/// The callback slot is shared between clones so the callback can be
/// installed after the scheduler has been moved into its owner.
#[derive(Clone, Default)]
pub struct WebScheduler {
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl WebScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the function run on every animation frame
    pub fn set_callback(&self, callback: impl FnMut(f64) + 'static) {
        *self.callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(callback));
    }
}

impl FrameScheduler for WebScheduler {
    fn request(&mut self) -> FrameHandle {
        let slot = self.callback.borrow();
        let (Some(window), Some(callback)) = (web_sys::window(), slot.as_ref()) else {
            log::warn!("Frame requested before the frame callback was installed");
            return FrameHandle(0);
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => FrameHandle(id as u32),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                FrameHandle(0)
            }
        }
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.cancel_animation_frame(handle.0 as i32) {
                log::warn!("cancelAnimationFrame failed: {:?}", e);
            }
        }
    }
}

/// Window keydown/keyup listeners, removed again on drop
pub struct KeyListeners {
    target: EventTarget,
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
    keyup: Closure<dyn FnMut(KeyboardEvent)>,
}

impl KeyListeners {
    pub fn attach(
        on_down: impl FnMut(KeyboardEvent) + 'static,
        on_up: impl FnMut(KeyboardEvent) + 'static,
    ) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let target: EventTarget = window.into();

        let keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(on_down);
        let keyup = Closure::<dyn FnMut(KeyboardEvent)>::new(on_up);
        target.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        target.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        log::debug!("Key listeners attached");

        Ok(Self {
            target,
            keydown,
            keyup,
        })
    }
}

impl Drop for KeyListeners {
    fn drop(&mut self) {
        for (kind, callback) in [("keydown", &self.keydown), ("keyup", &self.keyup)] {
            if let Err(e) = self
                .target
                .remove_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove {} listener: {:?}", kind, e);
            }
        }
        log::debug!("Key listeners removed");
    }
}
