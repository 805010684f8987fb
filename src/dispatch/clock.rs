use chrono::{Datelike, Local};

/// Source of the calendar period assigned to records created without one.
pub trait Clock: Send + Sync {
    /// Current `(year, month)`, month in 1..=12.
    fn current_period(&self) -> (i32, u32);
}

/// Wall clock in the server's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_period(&self) -> (i32, u32) {
        let now = Local::now();
        (now.year(), now.month())
    }
}

/// Always reports the same period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub year: i32,
    pub month: u32,
}

impl FixedClock {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl Clock for FixedClock {
    fn current_period(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}
