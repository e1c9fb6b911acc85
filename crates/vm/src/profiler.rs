//! PRF/PRFE interval timing.

use std::time::{Duration, Instant};

/// One measured PRF..PRFE interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileReport {
    /// Wall-clock time between the PRF and the PRFE.
    pub elapsed: Duration,
    /// Instructions executed after the PRF, up to and including the PRFE.
    pub instructions: u64,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Profiler {
    started: Option<(Instant, u64)>,
    last: Option<ProfileReport>,
}

impl Profiler {
    pub(crate) fn reset(&mut self) {
        self.started = None;
        self.last = None;
    }

    /// Open an interval at executed-instruction count `executed`.
    pub(crate) fn start(&mut self, executed: u64) {
        self.started = Some((Instant::now(), executed));
    }

    /// Close the open interval. Returns `None` if none was started.
    pub(crate) fn finish(&mut self, executed: u64) -> Option<ProfileReport> {
        let (at, count) = self.started.take()?;
        let report = ProfileReport {
            elapsed: at.elapsed(),
            instructions: executed.saturating_sub(count),
        };
        self.last = Some(report);
        Some(report)
    }

    pub(crate) fn last(&self) -> Option<ProfileReport> {
        self.last
    }
}
