//! # Result Aggregation
//!
//! Shared state that chunk workers merge into. One mutex guards both the
//! port map and the error marker; workers take the lock only to merge a
//! finished probe, never while probing.
//!
//! When every worker has joined, [`ResultAggregator::finish`] hands the frozen
//! state to a [`FailurePolicy`], which decides what the scan returns.

use crate::error::{Result, SurfaceScanError};
use crate::models::PortMap;
use crate::probe::ProbeReport;
use std::sync::{Mutex, PoisonError};

/// Everything the workers produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AggregateState {
    pub ports: PortMap,
    /// Last failure recorded by any worker
    pub error: Option<String>,
}

/// Turns the final aggregate into the scan result
pub type FailurePolicy = fn(AggregateState) -> Result<PortMap>;

/// Any chunk failure fails the whole scan and the partial map is discarded.
pub fn fail_fast(state: AggregateState) -> Result<PortMap> {
    match state.error {
        Some(error) => Err(SurfaceScanError::scan(error)),
        None => Ok(state.ports),
    }
}

#[derive(Debug, Default)]
pub struct ResultAggregator {
    state: Mutex<AggregateState>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one chunk's report. Chunks are disjoint, so keys never collide
    /// and merge order does not affect the result.
    pub fn merge(&self, report: ProbeReport) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.ports.extend(report);
    }

    /// Overwrite the error marker
    pub fn record_failure(&self, error: impl Into<String>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.error = Some(error.into());
    }

    pub fn finish(self, policy: FailurePolicy) -> Result<PortMap> {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        policy(state)
    }
}
