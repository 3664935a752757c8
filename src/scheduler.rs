//! # Chunked Port Scan Scheduler
//!
//! Splits a port range into chunks and probes them in parallel on a bounded
//! Rayon pool. Every chunk runs to completion; the call returns only after
//! all of them have been merged into the shared [`ResultAggregator`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use surfacescan::external::nmap::NmapProber;
//! use surfacescan::scheduler::ChunkScheduler;
//! use surfacescan::target::Target;
//!
//! let target = Target::resolve("127.0.0.1")?;
//! let scheduler = ChunkScheduler::new(NmapProber::new()?).chunk_size(1000);
//! let ports = scheduler.schedule(&target, "1-10000".parse()?)?;
//! println!("{} ports reported", ports.len());
//! # Ok::<(), surfacescan::error::SurfaceScanError>(())
//! ```

use crate::aggregator::{self, FailurePolicy, ResultAggregator};
use crate::constants;
use crate::error::{Result, SurfaceScanError};
use crate::logging;
use crate::models::PortMap;
use crate::ports::{PortRange, ScanChunk};
use crate::probe::{ProbeOptions, Prober};
use crate::target::Target;
use crate::utils;
use crate::validation;
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, info};

pub struct ChunkScheduler<P> {
    prober: P,
    workers: usize,
    chunk_size: usize,
    os_detection: bool,
    policy: FailurePolicy,
}

impl<P: Prober> ChunkScheduler<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober,
            workers: utils::default_workers(),
            chunk_size: constants::DEFAULT_CHUNK_SIZE,
            os_detection: true,
            policy: aggregator::fail_fast,
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn os_detection(mut self, enabled: bool) -> Self {
        self.os_detection = enabled;
        self
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Probe every port of `range` on `target` and return the merged map.
    ///
    /// Blocks until every chunk has finished. With the default policy any
    /// chunk failure fails the scan.
    pub fn schedule(&self, target: &Target, range: PortRange) -> Result<PortMap> {
        let workers = validation::validate_workers(self.workers)?;
        let chunks = range.chunks(self.chunk_size)?;

        let span = logging::scan_span(target.as_str(), range.len(), chunks.len());
        let _enter = span.enter();
        info!(range = %range, workers = workers, chunk_size = self.chunk_size, "Starting chunked scan");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.min(chunks.len()).max(1))
            .thread_name(|i| format!("scan-worker-{}", i))
            .build()
            .map_err(|e| SurfaceScanError::scan(format!("Failed to build worker pool: {}", e)))?;

        let options = ProbeOptions::port_scan(self.os_detection);
        let aggregator = ResultAggregator::new();
        let started = Instant::now();

        pool.install(|| {
            chunks
                .into_par_iter()
                .for_each(|chunk| self.run_chunk(target, chunk, &options, &aggregator));
        });

        debug!(
            duration_ms = started.elapsed().as_millis() as u64,
            "All chunks joined"
        );
        aggregator.finish(self.policy)
    }

    fn run_chunk(
        &self,
        target: &Target,
        chunk: ScanChunk,
        options: &ProbeOptions,
        aggregator: &ResultAggregator,
    ) {
        let expr = chunk.to_string();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.prober.probe(target, &expr, options)
        }))
        .unwrap_or_else(|payload| {
            Err(SurfaceScanError::probe(format!(
                "Probe panicked on chunk {}: {}",
                expr,
                panic_message(payload.as_ref())
            )))
        });

        match outcome {
            Ok(report) => {
                // the engine may only report ports it was asked about
                let report: PortMap = report
                    .into_iter()
                    .filter(|(port, _)| chunk.contains(*port))
                    .collect();
                logging::log_chunk_result(&expr, report.len(), None);
                aggregator.merge(report);
            }
            Err(e) => {
                let message = e.to_string();
                logging::log_chunk_result(&expr, 0, Some(&message));
                aggregator.record_failure(message);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
