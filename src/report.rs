use std::fmt;

/// Outcome of a directory run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub written: usize,
}

impl BatchSummary {
    /// Every item starts out counted as written; failures are subtracted.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            written: total,
        }
    }

    pub fn record_failure(&mut self) {
        self.written = self.written.saturating_sub(1);
    }

    pub fn failed(&self) -> usize {
        self.total - self.written
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Files Written: {}, Failed: {}.",
            self.written,
            self.failed()
        )
    }
}
