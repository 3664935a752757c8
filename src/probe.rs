//! # Probe Adapter
//!
//! The narrow contract between the scan core and the external probing
//! engine. The core never talks to nmap directly; it calls a [`Prober`],
//! which makes it possible to drive the scheduler and the audits with a
//! scripted prober in tests.
//!
//! A prober must satisfy three properties:
//!
//! - ports in the report are a subset of the requested port expression
//! - a port missing from the report is unreported, neither open nor closed
//! - calls block until the engine has finished

use crate::constants;
use crate::error::Result;
use crate::models::PortMap;
use crate::target::Target;

/// Ports reported by a single probe call
pub type ProbeReport = PortMap;

/// Flags for a probe call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Identify service name, product and version (`-sV`)
    pub service_detection: bool,
    /// Fingerprint the operating system (`-O`, needs privileges)
    pub os_detection: bool,
    /// Treat the host as up without a discovery ping (`-Pn`)
    pub skip_host_discovery: bool,
    /// Timing template 0-5 (`-T<n>`)
    pub timing: Option<u8>,
    /// Diagnostic checks (NSE scripts) whose output is returned per port
    pub scripts: Vec<String>,
}

impl ProbeOptions {
    /// Options used for each port-range chunk
    pub fn port_scan(os_detection: bool) -> Self {
        Self {
            service_detection: true,
            os_detection,
            skip_host_discovery: true,
            timing: Some(constants::NMAP_TIMING_TEMPLATE),
            scripts: Vec::new(),
        }
    }

    /// Options for a targeted diagnostic probe running `scripts`
    pub fn diagnostics(scripts: &[&str]) -> Self {
        Self {
            service_detection: true,
            os_detection: false,
            skip_host_discovery: true,
            timing: Some(constants::NMAP_TIMING_TEMPLATE),
            scripts: scripts.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn requests_script(&self, script: &str) -> bool {
        self.scripts.iter().any(|s| s == script)
    }
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self::port_scan(true)
    }
}

/// Capability to probe a target's ports
pub trait Prober: Send + Sync {
    /// Probe `ports` (an nmap-style port expression such as `"1-1000"` or
    /// `"443"`) on `target`.
    fn probe(&self, target: &Target, ports: &str, options: &ProbeOptions) -> Result<ProbeReport>;
}

impl<P: Prober + ?Sized> Prober for std::sync::Arc<P> {
    fn probe(&self, target: &Target, ports: &str, options: &ProbeOptions) -> Result<ProbeReport> {
        (**self).probe(target, ports, options)
    }
}

impl<P: Prober + ?Sized> Prober for &P {
    fn probe(&self, target: &Target, ports: &str, options: &ProbeOptions) -> Result<ProbeReport> {
        (**self).probe(target, ports, options)
    }
}
