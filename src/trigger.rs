use tracing::debug;

/// One-way latch that tells the downstream instrumentation something is marked.
/// Firing is monotonic: once armed, the latch never resets, and firing again is a
/// no-op. The external analysis polls [Trigger::is_armed] to decide whether
/// instruction-level instrumentation is worth paying for yet.
#[derive(Debug, Default)]
pub struct Trigger {
    armed: bool,
}

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the latch. Idempotent.
    pub fn fire(&mut self) {
        if !self.armed {
            self.armed = true;
            debug!("analysis trigger armed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
