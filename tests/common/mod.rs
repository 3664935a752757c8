#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use surfacescan::error::{Result, SurfaceScanError};
use surfacescan::models::{PortMap, PortRecord, PortState};
use surfacescan::ports::PortRange;
use surfacescan::probe::{ProbeOptions, ProbeReport, Prober};
use surfacescan::target::Target;

/// One recorded probe call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCall {
    pub ports: String,
    pub scripts: Vec<String>,
    pub os_detection: bool,
}

/// Deterministic prober serving a scripted host.
///
/// A probe returns the scripted records inside the requested port
/// expression, with diagnostics limited to the checks the call asked for.
#[derive(Debug, Default)]
pub struct ScriptedProber {
    host: PortMap,
    diagnostics: BTreeMap<u16, BTreeMap<String, String>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    unreported: HashSet<u16>,
    calls: Mutex<Vec<ProbeCall>>,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(mut self, port: u16, service: &str) -> Self {
        self.host.insert(
            port,
            PortRecord::new(PortState::Open).with_service(service, "", ""),
        );
        self
    }

    pub fn record(mut self, port: u16, record: PortRecord) -> Self {
        self.host.insert(port, record);
        self
    }

    pub fn diagnostic(mut self, port: u16, check: &str, output: &str) -> Self {
        self.diagnostics
            .entry(port)
            .or_default()
            .insert(check.to_string(), output.to_string());
        self
    }

    /// Fail every call whose port expression is `ports`
    pub fn fail_on(mut self, ports: &str) -> Self {
        self.failing.insert(ports.to_string());
        self
    }

    /// Panic inside every call whose port expression is `ports`
    pub fn panic_on(mut self, ports: &str) -> Self {
        self.panicking.insert(ports.to_string());
        self
    }

    /// Leave `port` out of diagnostic probe reports
    pub fn unreported_in_audits(mut self, port: u16) -> Self {
        self.unreported.insert(port);
        self
    }

    pub fn calls(&self) -> Vec<ProbeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Port expressions of the plain port-scan calls, sorted
    pub fn chunk_calls(&self) -> Vec<String> {
        let mut chunks: Vec<String> = self
            .calls()
            .into_iter()
            .filter(|call| call.scripts.is_empty())
            .map(|call| call.ports)
            .collect();
        chunks.sort_by_key(|expr| expr.parse::<PortRange>().map(|r| r.start()).unwrap_or(0));
        chunks
    }

    /// Ports that received a diagnostic probe, sorted
    pub fn audited_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self
            .calls()
            .into_iter()
            .filter(|call| !call.scripts.is_empty())
            .filter_map(|call| call.ports.parse().ok())
            .collect();
        ports.sort_unstable();
        ports
    }
}

impl Prober for ScriptedProber {
    fn probe(&self, _target: &Target, ports: &str, options: &ProbeOptions) -> Result<ProbeReport> {
        self.calls.lock().unwrap().push(ProbeCall {
            ports: ports.to_string(),
            scripts: options.scripts.clone(),
            os_detection: options.os_detection,
        });

        if self.panicking.contains(ports) {
            panic!("engine crashed on {}", ports);
        }
        if self.failing.contains(ports) {
            return Err(SurfaceScanError::probe(format!("scripted failure for {}", ports)));
        }

        let range: PortRange = ports.parse()?;
        let diagnostic_call = !options.scripts.is_empty();

        let report = self
            .host
            .range(range.start()..=range.end())
            .filter(|(port, _)| !(diagnostic_call && self.unreported.contains(*port)))
            .map(|(port, record)| {
                let mut record = record.clone();
                if let Some(outputs) = self.diagnostics.get(port) {
                    for (check, output) in outputs {
                        if options.requests_script(check) {
                            record.diagnostics.insert(check.clone(), output.clone());
                        }
                    }
                }
                (*port, record)
            })
            .collect();

        Ok(report)
    }
}

pub fn localhost() -> Target {
    Target::resolve("127.0.0.1").unwrap()
}
