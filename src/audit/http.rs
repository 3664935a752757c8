//! HTTP hardening audit.

use super::rules::{Matcher, Rule};
use super::SecurityAudit;
use crate::constants::scripts;
use crate::models::OpenPortEntry;

pub const HTTP_SERVICES: &[&str] = &["http", "https", "ssl"];
pub const HTTP_PORTS: &[u16] = &[80, 443, 8080, 8443];

pub static HTTP_RULES: &[Rule] = &[
    Rule {
        checks: &[scripts::HTTP_HEADERS, scripts::HTTP_SECURITY_HEADERS],
        tokens: &[
            "Content-Security-Policy",
            "Strict-Transport-Security",
            "X-Frame-Options",
            "X-Content-Type-Options",
        ],
        matcher: Matcher::Missing,
        issue: "Missing HTTP header: {token}",
        remediation: "Add {token} to HTTP responses",
    },
    Rule {
        checks: &[scripts::HTTP_METHODS],
        tokens: &["TRACE", "DELETE", "PUT"],
        matcher: Matcher::Contains,
        issue: "Unsafe HTTP method enabled: {token}",
        remediation: "Disable unsafe HTTP method {token}",
    },
    Rule {
        checks: &[scripts::HTTP_VULN_CVE2017_5638],
        tokens: &["vulnerable"],
        matcher: Matcher::ContainsIgnoreCase,
        issue: "CVE-2017-5638 (Struts vulnerability) detected",
        remediation: "Update Apache Struts to a patched version",
    },
    Rule {
        checks: &[scripts::HTTP_SLOWLORIS_CHECK],
        tokens: &["vulnerable"],
        matcher: Matcher::ContainsIgnoreCase,
        issue: "Slowloris vulnerability detected",
        remediation: "Configure server to mitigate Slowloris attacks",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpAudit;

impl SecurityAudit for HttpAudit {
    fn stage(&self) -> &'static str {
        "HTTP"
    }

    fn selects(&self, port: u16, entry: &OpenPortEntry) -> bool {
        let service = entry.service.to_lowercase();
        HTTP_SERVICES.contains(&service.as_str()) || HTTP_PORTS.contains(&port)
    }

    fn checks(&self) -> &'static [&'static str] {
        scripts::HTTP_AUDIT
    }

    fn catalog(&self) -> &'static [Rule] {
        HTTP_RULES
    }
}
