//! Elapsed-time logging for the heavier passes (sweeps, imports).

use std::time::Instant;

/// Scope guard that logs how long the enclosing pass took when dropped.
pub struct Timed {
    name: &'static str,
    start: Instant,
    level: log::Level,
}

impl Timed {
    fn start(name: &'static str, level: log::Level) -> Self {
        Self {
            name,
            start: Instant::now(),
            level,
        }
    }

    /// Report the elapsed time at INFO.
    pub fn info(name: &'static str) -> Self {
        log::debug!("{}...", name);
        Self::start(name, log::Level::Info)
    }

    /// Report the elapsed time at DEBUG.
    pub fn debug(name: &'static str) -> Self {
        log::trace!("{}...", name);
        Self::start(name, log::Level::Debug)
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}
