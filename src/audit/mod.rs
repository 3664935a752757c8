//! # Security Audits
//!
//! Audit stages that run after the port scan against the open-port map.
//! Each stage selects the ports it cares about, probes each of them with a
//! set of diagnostic checks and classifies the diagnostic text through a
//! static rule catalog.
//!
//! ## Stages
//!
//! - [`tls::TlsAudit`]: cipher suites, protocol versions, certificates, known keys, Heartbleed
//! - [`http::HttpAudit`]: security headers, unsafe methods, Struts CVE-2017-5638, Slowloris
//!
//! Per-port probes run in parallel on the Rayon pool and the stage waits for
//! all of them. A single failing probe fails the whole stage; the error is
//! returned inline as the stage outcome.
//!
//! ## Example
//!
//! ```rust,no_run
//! use surfacescan::audit::{tls::TlsAudit, SecurityAudit};
//! use surfacescan::classifier::classify;
//! use surfacescan::external::nmap::NmapProber;
//! use surfacescan::scheduler::ChunkScheduler;
//! use surfacescan::target::Target;
//!
//! let target = Target::resolve("127.0.0.1")?;
//! let prober = NmapProber::new()?;
//! let ports = ChunkScheduler::new(&prober).schedule(&target, "1-1024".parse()?)?;
//! let outcome = TlsAudit.audit(&prober, &target, &classify(&ports));
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod http;
pub mod rules;
pub mod tls;

use crate::error::Result;
use crate::logging;
use crate::models::{AuditOutcome, OpenPortEntry, OpenPortMap, PortAudit};
use crate::probe::{ProbeOptions, Prober};
use crate::target::Target;
use rayon::prelude::*;
use rules::Rule;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One audit stage
pub trait SecurityAudit: Sync {
    /// Stage label used in error messages (`SSL`, `HTTP`)
    fn stage(&self) -> &'static str;

    /// Whether the stage audits `port`
    fn selects(&self, port: u16, entry: &OpenPortEntry) -> bool;

    /// Diagnostic checks requested for every selected port
    fn checks(&self) -> &'static [&'static str];

    fn catalog(&self) -> &'static [Rule];

    fn audit<P: Prober>(&self, prober: &P, target: &Target, open_ports: &OpenPortMap) -> AuditOutcome
    where
        Self: Sized,
    {
        run_audit(self, prober, target, open_ports)
    }
}

/// Run `audit` against every selected port of `open_ports`
pub fn run_audit<A, P>(audit: &A, prober: &P, target: &Target, open_ports: &OpenPortMap) -> AuditOutcome
where
    A: SecurityAudit + ?Sized,
    P: Prober,
{
    let selected: Vec<(u16, &OpenPortEntry)> = open_ports
        .iter()
        .filter(|(port, entry)| audit.selects(*port, entry))
        .collect();

    let span = logging::audit_span(audit.stage(), selected.len());
    let _enter = span.enter();

    let options = ProbeOptions::diagnostics(audit.checks());

    let results: Vec<(u16, Result<PortAudit>)> = selected
        .into_par_iter()
        .map(|(port, entry)| (port, audit_port(audit, prober, target, port, entry, &options)))
        .collect();

    let mut findings = BTreeMap::new();
    for (port, result) in results {
        match result {
            Ok(port_audit) => {
                findings.insert(port, port_audit);
            }
            Err(e) => {
                warn!(stage = audit.stage(), port = port, error = %e, "Audit probe failed");
                return AuditOutcome::Failed {
                    error: format!("{} security scan failed: {}", audit.stage(), e),
                };
            }
        }
    }

    debug!(stage = audit.stage(), ports = findings.len(), "Audit stage finished");
    AuditOutcome::Findings(findings)
}

fn audit_port<A, P>(
    audit: &A,
    prober: &P,
    target: &Target,
    port: u16,
    entry: &OpenPortEntry,
    options: &ProbeOptions,
) -> Result<PortAudit>
where
    A: SecurityAudit + ?Sized,
    P: Prober,
{
    let mut port_audit = PortAudit::for_entry(entry);
    let report = prober.probe(target, &port.to_string(), options)?;

    // an unreported port keeps an empty audit
    if let Some(record) = report.get(&port) {
        for finding in rules::evaluate_all(audit.catalog(), record) {
            port_audit.push(finding);
        }
    }

    Ok(port_audit)
}
