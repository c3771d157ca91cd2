//! Frame scheduling
//!
//! The render loop never calls `requestAnimationFrame` directly. It goes
//! through a [`FrameScheduler`] so the browser, the headless native runner and
//! tests can all drive it. [`FrameLoop`] enforces that at most one frame
//! request is outstanding: any pending request is cancelled before a new one
//! is made.

/// Opaque id of a scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u32);

/// Something that can call us back on the next display frame
pub trait FrameScheduler {
    /// Ask for one callback on the next frame
    fn request(&mut self) -> FrameHandle;
    /// Revoke a request. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);
}

/// Scheduler that fires only when told to. Used by tests and the native runner.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u32,
    queued: Vec<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the oldest queued request, if any
    pub fn fire(&mut self) -> Option<FrameHandle> {
        if self.queued.is_empty() {
            None
        } else {
            Some(self.queued.remove(0))
        }
    }

    /// Requests neither fired nor cancelled yet
    pub fn outstanding(&self) -> usize {
        self.queued.len()
    }

    /// Total requests ever made
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total requests revoked before firing
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request(&mut self) -> FrameHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = FrameHandle(self.next_id);
        self.queued.push(handle);
        self.requested += 1;
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if let Some(index) = self.queued.iter().position(|h| *h == handle) {
            self.queued.remove(index);
            self.cancelled += 1;
        }
    }
}

/// The single self-rescheduling loop
#[derive(Debug)]
pub struct FrameLoop<S: FrameScheduler> {
    scheduler: S,
    pending: Option<FrameHandle>,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: None,
        }
    }

    /// Request the next frame, invalidating any request still pending
    pub fn schedule(&mut self) -> FrameHandle {
        self.cancel();
        let handle = self.scheduler.request();
        self.pending = Some(handle);
        handle
    }

    /// Invalidate the pending request, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Called when a frame fires. Returns false for a handle that is no longer
    /// current; the caller must then do nothing.
    pub fn accept(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
