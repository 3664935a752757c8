//! # Scan Data Model
//!
//! Records produced by the probing engine and the structures the scan
//! pipeline assembles from them. The JSON shapes here are the external
//! contract of a scan:
//!
//! ```text
//! { target,
//!   port_scan: { tcp: { "<port>": PortRecord } } | { error },
//!   open_ports: { "tcp/<port>": OpenPortEntry },
//!   ssl_security_findings: { "tcp/<port>": PortAudit } | { error },
//!   http_security_findings: { "tcp/<port>": PortAudit } | { error },
//!   errors: [string] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State reported by the probing engine for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PortState {
    /// Map an nmap state string. Compound states such as `open|filtered`
    /// are not open.
    pub fn from_nmap(state: &str) -> Self {
        match state {
            "open" => Self::Open,
            "closed" => Self::Closed,
            "filtered" => Self::Filtered,
            _ => Self::Unknown,
        }
    }
}

/// One port as reported by the probing engine
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortRecord {
    #[serde(default)]
    pub state: PortState,
    #[serde(
        rename = "name",
        alias = "service",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extrainfo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpe: Option<String>,
    /// Diagnostic text keyed by check (NSE script) id
    #[serde(
        rename = "script",
        alias = "diagnostics",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub diagnostics: BTreeMap<String, String>,
}

impl PortRecord {
    pub fn new(state: PortState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn with_service(mut self, service: &str, product: &str, version: &str) -> Self {
        self.service = Some(service.to_string());
        self.product = Some(product.to_string());
        self.version = Some(version.to_string());
        self
    }

    pub fn with_diagnostic(mut self, check: &str, output: &str) -> Self {
        self.diagnostics.insert(check.to_string(), output.to_string());
        self
    }

    /// Diagnostic text for a check, if the engine returned any
    pub fn diagnostic(&self, check: &str) -> Option<&str> {
        self.diagnostics.get(check).map(String::as_str)
    }

    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// Port number to record. Keys are unique; iteration is in port order.
pub type PortMap = BTreeMap<u16, PortRecord>;

/// Service identity of an open port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPortEntry {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub version: String,
}

/// Open ports keyed by number, serialized with `"tcp/<port>"` keys
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenPortMap(#[serde(with = "tcp_keys")] pub BTreeMap<u16, OpenPortEntry>);

impl OpenPortMap {
    pub fn get(&self, port: u16) -> Option<&OpenPortEntry> {
        self.0.get(&port)
    }

    pub fn contains(&self, port: u16) -> bool {
        self.0.contains_key(&port)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &OpenPortEntry)> {
        self.0.iter().map(|(port, entry)| (*port, entry))
    }

    pub fn ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(u16, OpenPortEntry)> for OpenPortMap {
    fn from_iter<I: IntoIterator<Item = (u16, OpenPortEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Rebuild a raw port map from open-port entries. Every record is open.
impl From<&OpenPortMap> for PortMap {
    fn from(open: &OpenPortMap) -> Self {
        open.iter()
            .map(|(port, entry)| {
                let record = PortRecord::new(PortState::Open).with_service(
                    &entry.service,
                    &entry.product,
                    &entry.version,
                );
                (port, record)
            })
            .collect()
    }
}

/// A single security weakness and how to fix it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub description: String,
    pub remediation: String,
}

impl SecurityFinding {
    pub fn new(description: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            remediation: remediation.into(),
        }
    }
}

/// Audit result for one port. `security_issues[i]` is remedied by
/// `remediations[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortAudit {
    pub service: String,
    pub product: String,
    pub version: String,
    pub security_issues: Vec<String>,
    pub remediations: Vec<String>,
}

impl PortAudit {
    pub fn for_entry(entry: &OpenPortEntry) -> Self {
        Self {
            service: entry.service.to_lowercase(),
            product: entry.product.clone(),
            version: entry.version.clone(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, finding: SecurityFinding) {
        self.security_issues.push(finding.description);
        self.remediations.push(finding.remediation);
    }

    pub fn findings(&self) -> impl Iterator<Item = SecurityFinding> + '_ {
        self.security_issues
            .iter()
            .zip(&self.remediations)
            .map(|(issue, fix)| SecurityFinding::new(issue.clone(), fix.clone()))
    }

    pub fn has_findings(&self) -> bool {
        !self.security_issues.is_empty()
    }
}

/// Outcome of one audit stage: per-port results, or the stage's error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditOutcome {
    Failed {
        error: String,
    },
    Findings(#[serde(with = "tcp_keys")] BTreeMap<u16, PortAudit>),
}

impl AuditOutcome {
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Findings(_) => None,
        }
    }

    pub fn findings(&self) -> Option<&BTreeMap<u16, PortAudit>> {
        match self {
            Self::Findings(map) => Some(map),
            Self::Failed { .. } => None,
        }
    }
}

impl Default for AuditOutcome {
    fn default() -> Self {
        Self::Findings(BTreeMap::new())
    }
}

/// Outcome of the chunked port scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortScanOutcome {
    Failed {
        error: String,
    },
    Completed {
        #[serde(with = "port_keys")]
        tcp: PortMap,
    },
}

impl PortScanOutcome {
    pub fn ports(&self) -> Option<&PortMap> {
        match self {
            Self::Completed { tcp } => Some(tcp),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Completed { .. } => None,
        }
    }
}

impl Default for PortScanOutcome {
    fn default() -> Self {
        Self::Completed {
            tcp: PortMap::new(),
        }
    }
}

/// Overall status of a full scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// No errors
    Complete,
    /// Port scan succeeded, at least one audit stage failed
    Partial,
    /// Port scan failed; no open ports or audits
    Failed,
}

impl ScanStatus {
    /// Status code the scan API answers with
    pub fn http_status(self) -> u16 {
        match self {
            Self::Complete => 200,
            Self::Partial => 207,
            Self::Failed => 500,
        }
    }
}

/// Composed result of a full scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: String,
    pub port_scan: PortScanOutcome,
    pub open_ports: OpenPortMap,
    pub ssl_security_findings: AuditOutcome,
    pub http_security_findings: AuditOutcome,
    pub errors: Vec<String>,
}

impl ScanReport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            port_scan: PortScanOutcome::default(),
            open_ports: OpenPortMap::default(),
            ssl_security_findings: AuditOutcome::default(),
            http_security_findings: AuditOutcome::default(),
            errors: Vec::new(),
        }
    }

    pub fn status(&self) -> ScanStatus {
        if self.port_scan.error().is_some() {
            ScanStatus::Failed
        } else if self.errors.is_empty() {
            ScanStatus::Complete
        } else {
            ScanStatus::Partial
        }
    }

    /// Total number of findings across both audit stages
    pub fn finding_count(&self) -> usize {
        [&self.ssl_security_findings, &self.http_security_findings]
            .into_iter()
            .filter_map(AuditOutcome::findings)
            .flat_map(|map| map.values())
            .map(|audit| audit.security_issues.len())
            .sum()
    }
}

/// (De)serialize a port-keyed map with `"tcp/<port>"` keys
pub mod tcp_keys {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub const PREFIX: &str = "tcp/";

    pub fn key(port: u16) -> String {
        format!("{}{}", PREFIX, port)
    }

    /// Parse `"tcp/<port>"` or a bare port number
    pub fn parse_key(key: &str) -> Option<u16> {
        key.strip_prefix(PREFIX)
            .unwrap_or(key)
            .parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
    }

    pub fn serialize<S, V>(map: &BTreeMap<u16, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (port, value) in map {
            out.serialize_entry(&key(*port), value)?;
        }
        out.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<u16, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        super::port_keys::deserialize(deserializer)
    }
}

/// (De)serialize a port-keyed map with bare `"<port>"` keys.
///
/// Keys go through `String` so the map also deserializes inside untagged
/// enums, where integer keys are not recovered from buffered content.
pub mod port_keys {
    use serde::de::{Error as _, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, V>(map: &BTreeMap<u16, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (port, value) in map {
            out.serialize_entry(&port.to_string(), value)?;
        }
        out.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<u16, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct PortKeyVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for PortKeyVisitor<V> {
            type Value = BTreeMap<u16, V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map keyed by port number")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = BTreeMap::new();
                while let Some((raw, value)) = access.next_entry::<String, V>()? {
                    let port = super::tcp_keys::parse_key(&raw)
                        .ok_or_else(|| A::Error::custom(format!("invalid port key '{}'", raw)))?;
                    map.insert(port, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(PortKeyVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_state_from_nmap() {
        assert_eq!(PortState::from_nmap("open"), PortState::Open);
        assert_eq!(PortState::from_nmap("filtered"), PortState::Filtered);
        assert_eq!(PortState::from_nmap("open|filtered"), PortState::Unknown);
    }

    #[test]
    fn test_port_record_json_uses_engine_names() {
        let record = PortRecord::new(PortState::Open)
            .with_service("https", "nginx", "1.25")
            .with_diagnostic("ssl-cert", "Subject: commonName=example");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["state"], "open");
        assert_eq!(json["name"], "https");
        assert_eq!(json["script"]["ssl-cert"], "Subject: commonName=example");
        assert!(json.get("extrainfo").is_none());
    }

    #[test]
    fn test_port_record_accepts_aliases_and_unknown_states() {
        let record: PortRecord = serde_json::from_str(
            r#"{"state": "open|filtered", "service": "ssh", "diagnostics": {"a": "b"}}"#,
        )
        .unwrap();
        assert_eq!(record.state, PortState::Unknown);
        assert_eq!(record.service.as_deref(), Some("ssh"));
        assert_eq!(record.diagnostic("a"), Some("b"));
    }

    #[test]
    fn test_open_port_map_keys() {
        let map: OpenPortMap = [(
            7,
            OpenPortEntry {
                service: "https".into(),
                product: String::new(),
                version: String::new(),
            },
        )]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"tcp/7":{"service":"https","product":"","version":""}}"#);

        let back: OpenPortMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert!(serde_json::from_str::<OpenPortMap>(r#"{"udp/x": {"service": "a"}}"#).is_err());
    }

    #[test]
    fn test_open_port_entry_fields_are_optional() {
        let map: OpenPortMap =
            serde_json::from_str(r#"{"tcp/22": {"product": "OpenSSH"}, "tcp/80": {}}"#).unwrap();
        let ssh = map.get(22).unwrap();
        assert_eq!(ssh.service, "");
        assert_eq!(ssh.product, "OpenSSH");
        assert_eq!(map.get(80).unwrap().version, "");
    }

    #[test]
    fn test_audit_outcome_shapes() {
        let failed = AuditOutcome::Failed {
            error: "SSL security scan failed: boom".into(),
        };
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"error":"SSL security scan failed: boom"}"#
        );

        let parsed: AuditOutcome = serde_json::from_str(
            r#"{"tcp/443": {"service": "https", "product": "", "version": "",
                "security_issues": ["x"], "remediations": ["y"]}}"#,
        )
        .unwrap();
        let findings = parsed.findings().unwrap();
        assert_eq!(findings[&443].security_issues, vec!["x".to_string()]);
    }

    #[test]
    fn test_port_scan_outcome_shapes() {
        let mut tcp = PortMap::new();
        tcp.insert(22, PortRecord::new(PortState::Open));
        let done = PortScanOutcome::Completed { tcp };
        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["tcp"]["22"]["state"], "open");

        let back: PortScanOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, done);

        let failed: PortScanOutcome = serde_json::from_str(r#"{"error": "nmap missing"}"#).unwrap();
        assert_eq!(failed.error(), Some("nmap missing"));
    }

    #[test]
    fn test_report_status() {
        let mut report = ScanReport::new("127.0.0.1");
        assert_eq!(report.status(), ScanStatus::Complete);

        report.errors.push("SSL Scan Error: x".into());
        assert_eq!(report.status(), ScanStatus::Partial);
        assert_eq!(report.status().http_status(), 207);

        report.port_scan = PortScanOutcome::Failed { error: "x".into() };
        assert_eq!(report.status(), ScanStatus::Failed);
    }
}
