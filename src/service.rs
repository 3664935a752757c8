//! # Scan Service
//!
//! Async entry points for the scan pipeline. Each operation validates its
//! input, runs the blocking work (name resolution, probes) on Tokio's
//! blocking pool and records its response in the [`ScanResultStore`].
//!
//! ## Operations
//!
//! | Operation              | Store label             |
//! |------------------------|-------------------------|
//! | `scan_target`          | `scan_target`           |
//! | `open_ports`           | `get_open_ports`        |
//! | `check_ssl_security`   | `check_ssl_security`    |
//! | `check_http_security`  | `check_http_security`   |
//! | `full_scan`            | `full_scan`             |
//!
//! ## Example
//!
//! ```rust,no_run
//! use surfacescan::external::nmap::NmapProber;
//! use surfacescan::service::{ScanRequest, ScanService};
//!
//! #[tokio::main]
//! async fn main() -> surfacescan::error::Result<()> {
//!     let service = ScanService::new(NmapProber::new()?);
//!     let report = service
//!         .full_scan(ScanRequest::new("127.0.0.1").ports("1-1024"))
//!         .await?;
//!     println!("{} open ports, {} findings", report.open_ports.len(), report.finding_count());
//!     Ok(())
//! }
//! ```

use crate::audit::{http::HttpAudit, run_audit, tls::TlsAudit, SecurityAudit};
use crate::classifier;
use crate::config::Config;
use crate::constants;
use crate::error::{Result, SurfaceScanError};
use crate::logging;
use crate::models::{AuditOutcome, OpenPortMap, PortScanOutcome, ScanReport};
use crate::ports::PortRange;
use crate::probe::Prober;
use crate::scheduler::ChunkScheduler;
use crate::store::{ScanResultStore, StoredResult};
use crate::target::Target;
use crate::utils;
use crate::validation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Parameters of a port scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub target: Option<String>,
    /// `"start-end"`, defaults to the full port range
    pub ports: Option<String>,
    pub chunk_size: Option<usize>,
}

impl ScanRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn ports(mut self, ports: impl Into<String>) -> Self {
        self.ports = Some(ports.into());
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
}

pub struct ScanService<P> {
    prober: Arc<P>,
    workers: usize,
    os_detection: bool,
    store: Arc<ScanResultStore>,
}

impl<P> Clone for ScanService<P> {
    fn clone(&self) -> Self {
        Self {
            prober: Arc::clone(&self.prober),
            workers: self.workers,
            os_detection: self.os_detection,
            store: Arc::clone(&self.store),
        }
    }
}

impl<P: Prober + 'static> ScanService<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            workers: utils::default_workers(),
            os_detection: true,
            store: Arc::new(ScanResultStore::new()),
        }
    }

    /// Service using the worker count and OS detection setting of `config`
    pub fn from_config(prober: P, config: &Config) -> Self {
        Self::new(prober)
            .workers(config.workers)
            .os_detection(config.os_detection)
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn os_detection(mut self, enabled: bool) -> Self {
        self.os_detection = enabled;
        self
    }

    /// Share `store` instead of the service's own
    pub fn with_store(mut self, store: Arc<ScanResultStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Arc<ScanResultStore> {
        &self.store
    }

    /// Chunked port scan of the requested range
    pub async fn scan_target(&self, request: ScanRequest) -> Result<PortScanOutcome> {
        let (_, outcome) = self.port_scan(request).await?;
        self.record("scan_target", &outcome).await?;
        Ok(outcome)
    }

    /// Open ports of a finished port scan. A failed scan has none.
    pub async fn open_ports(&self, target: &str, scan: &PortScanOutcome) -> Result<OpenPortMap> {
        if target.trim().is_empty() {
            return Err(SurfaceScanError::validation(
                "Missing target or invalid scan_result JSON",
            ));
        }

        let open_ports = scan.ports().map(classifier::classify).unwrap_or_default();
        self.record("get_open_ports", &open_ports).await?;
        Ok(open_ports)
    }

    pub async fn check_ssl_security(&self, target: &str, open_ports: &OpenPortMap) -> Result<AuditOutcome> {
        self.check_security("check_ssl_security", TlsAudit, target, open_ports)
            .await
    }

    pub async fn check_http_security(&self, target: &str, open_ports: &OpenPortMap) -> Result<AuditOutcome> {
        self.check_security("check_http_security", HttpAudit, target, open_ports)
            .await
    }

    /// Port scan, classification and both audits. The audits run
    /// concurrently; a failing audit only marks its own section.
    pub async fn full_scan(&self, request: ScanRequest) -> Result<ScanReport> {
        let started = Instant::now();
        let (target, port_scan) = self.port_scan(request).await?;

        let mut report = ScanReport::new(target.as_str());

        if let Some(error) = port_scan.error() {
            report.errors.push(format!("Port Scan Error: {}", error));
            report.port_scan = port_scan;
            self.record("full_scan", &report).await?;
            return Ok(report);
        }

        let open_ports = Arc::new(
            port_scan
                .ports()
                .map(classifier::classify)
                .unwrap_or_default(),
        );
        info!(target = %target, open_ports = open_ports.len(), "Port scan finished");

        let (ssl, http) = tokio::join!(
            self.run_stage(TlsAudit, target.clone(), Arc::clone(&open_ports)),
            self.run_stage(HttpAudit, target.clone(), Arc::clone(&open_ports)),
        );

        if let Some(error) = ssl.error() {
            report.errors.push(format!("SSL Scan Error: {}", error));
        }
        if let Some(error) = http.error() {
            report.errors.push(format!("HTTP Scan Error: {}", error));
        }

        report.port_scan = port_scan;
        report.open_ports = Arc::unwrap_or_clone(open_ports);
        report.ssl_security_findings = ssl;
        report.http_security_findings = http;

        logging::log_scan_completion(
            target.as_str(),
            started.elapsed().as_millis() as u64,
            report.open_ports.len(),
            report.finding_count(),
        );

        self.record("full_scan", &report).await?;
        Ok(report)
    }

    /// Every recorded response, oldest first
    pub async fn final_results(&self) -> Vec<StoredResult> {
        self.store.list_all().await
    }

    pub async fn clear_results(&self) {
        self.store.clear().await;
        info!("Stored results cleared");
    }

    async fn port_scan(&self, request: ScanRequest) -> Result<(Target, PortScanOutcome)> {
        let raw = request
            .target
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SurfaceScanError::validation("Missing target IP or hostname"))?;
        let range: PortRange = request
            .ports
            .as_deref()
            .unwrap_or(constants::DEFAULT_PORT_RANGE)
            .parse()?;
        let chunk_size = validation::validate_chunk_size(
            request.chunk_size.unwrap_or(constants::DEFAULT_CHUNK_SIZE),
        )?;
        let workers = validation::validate_workers(self.workers)?;

        let scheduler = ChunkScheduler::new(Arc::clone(&self.prober))
            .workers(workers)
            .chunk_size(chunk_size)
            .os_detection(self.os_detection);

        let (target, result) = tokio::task::spawn_blocking(move || {
            let target = Target::resolve(&raw)?;
            let result = scheduler.schedule(&target, range);
            Ok::<_, SurfaceScanError>((target, result))
        })
        .await
        .map_err(|e| SurfaceScanError::scan(format!("Port scan task failed: {}", e)))??;

        let outcome = match result {
            Ok(tcp) => PortScanOutcome::Completed { tcp },
            Err(e) if e.is_client_error() => return Err(e),
            Err(e) => {
                warn!(target = %target, error = %e, "Port scan failed");
                PortScanOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        Ok((target, outcome))
    }

    async fn check_security<A>(
        &self,
        route: &str,
        audit: A,
        target: &str,
        open_ports: &OpenPortMap,
    ) -> Result<AuditOutcome>
    where
        A: SecurityAudit + Send + 'static,
    {
        if target.trim().is_empty() || open_ports.is_empty() {
            return Err(SurfaceScanError::validation("Missing target or open_ports"));
        }

        let raw = target.to_string();
        let target = tokio::task::spawn_blocking(move || Target::resolve(&raw))
            .await
            .map_err(|e| SurfaceScanError::scan(format!("Target resolution task failed: {}", e)))??;

        let outcome = self
            .run_stage(audit, target, Arc::new(open_ports.clone()))
            .await;
        self.record(route, &outcome).await?;
        Ok(outcome)
    }

    async fn run_stage<A>(&self, audit: A, target: Target, open_ports: Arc<OpenPortMap>) -> AuditOutcome
    where
        A: SecurityAudit + Send + 'static,
    {
        let stage = audit.stage();
        let prober = Arc::clone(&self.prober);

        tokio::task::spawn_blocking(move || run_audit(&audit, &prober, &target, &open_ports))
            .await
            .unwrap_or_else(|e| AuditOutcome::Failed {
                error: format!("{} security scan failed: {}", stage, e),
            })
    }

    async fn record<T: Serialize>(&self, route: &str, result: &T) -> Result<()> {
        let value = serde_json::to_value(result)
            .map_err(|e| SurfaceScanError::parse(format!("Failed to serialize {} result: {}", route, e)))?;
        self.store.append(route, value).await;
        Ok(())
    }
}
