//! Per-run import timings.
//!
//! Each import run owns an [`ImportMetrics`] value and returns it in its
//! report; nothing is accumulated in shared state.

use std::fmt;
use std::time::{Duration, Instant};

/// Time spent in each import phase, plus row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportMetrics {
    /// Reading and parsing interchange files.
    pub parse: Duration,
    /// Resolving (or creating) strings.
    pub resolve_strings: Duration,
    /// Looking up existing translations and writing them.
    pub upsert: Duration,
    /// Translations inserted.
    pub inserted: u64,
    /// Translations updated in place.
    pub updated: u64,
}

impl ImportMetrics {
    /// Total time across all phases.
    pub fn total(&self) -> Duration {
        self.parse + self.resolve_strings + self.upsert
    }

    /// Translations written.
    pub fn translations(&self) -> u64 {
        self.inserted + self.updated
    }
}

impl fmt::Display for ImportMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parsing files took: {:?}", self.parse)?;
        writeln!(f, "Resolving strings took: {:?}", self.resolve_strings)?;
        writeln!(f, "Writing translations took: {:?}", self.upsert)?;
        write!(
            f,
            "Translations inserted: {}, updated: {}",
            self.inserted, self.updated
        )
    }
}

/// Run `f` and add its wall time to `slot`.
pub(crate) fn timed<T>(slot: &mut Duration, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    *slot += start.elapsed();
    out
}
