//! Rate limiting for owner-callback publishes during continuous drags.
//!
//! The working zone list is updated synchronously on every drag move; this
//! gate only decides when the owning application hears about it. Changes are
//! coalesced trailing-edge: `mark` records that a publish is owed, `poll`
//! (driven by the host on frame boundaries) fires it at most once per
//! window, and the drag-end flush is unconditional so the owner is never
//! left stale.

/// Minimum spacing between throttled publishes while a drag is in progress.
pub const PUBLISH_WINDOW_MS: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct PublishGate {
    next_allowed_ms: f64,
    pending: bool,
}

impl PublishGate {
    pub fn new() -> PublishGate {
        PublishGate::default()
    }

    /// A committable change happened; only the latest one is kept pending.
    pub fn mark(&mut self) {
        self.pending = true;
    }

    /// Fire the coalesced publish once the window allows it.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if self.pending && now_ms >= self.next_allowed_ms {
            self.pending = false;
            self.next_allowed_ms = now_ms + PUBLISH_WINDOW_MS;
            return true;
        }
        false
    }

    /// Drag ended: the caller publishes unconditionally; reset the window so
    /// the next interaction is not penalized by this one's cadence.
    pub fn flush(&mut self) {
        self.pending = false;
        self.next_allowed_ms = 0.0;
    }

    /// Teardown or wholesale list replacement: drop any owed publish.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.next_allowed_ms = 0.0;
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }
}
