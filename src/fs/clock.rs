//! Creation timestamp providers.

use chrono::Local;

/// Supplies creation-date strings at node construction time.
pub trait Clock {
    fn now(&self) -> String;
}

/// Local wall clock, formatted as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Always returns the same timestamp.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
