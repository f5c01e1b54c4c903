//! Millisecond tick timer.
//!
//! Time only advances when [`Timer::clock`] is called, so everything built on
//! it is deterministic under test.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    timeout_ms: u64,
    elapsed_ms: u64,
    running: bool,
}

impl Timer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            elapsed_ms: 0,
            running: false,
        }
    }

    /// (Re)start from zero.
    pub fn start(&mut self) {
        self.elapsed_ms = 0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.elapsed_ms = 0;
        self.running = false;
    }

    pub fn clock(&mut self, ms: u64) {
        if self.running {
            self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// A stopped timer never reports expiry.
    pub fn has_expired(&self) -> bool {
        self.running && self.elapsed_ms >= self.timeout_ms
    }
}
