//! TLS posture audit.
//!
//! A port is in scope when its service name contains `ssl` or it is one of
//! the conventional TLS ports. A service reported as plain `https` on a
//! non-standard port is therefore not audited here.

use super::rules::{Matcher, Rule};
use super::SecurityAudit;
use crate::constants::scripts;
use crate::models::OpenPortEntry;

pub const TLS_PORTS: &[u16] = &[443, 8443];

pub static TLS_RULES: &[Rule] = &[
    Rule {
        checks: &[scripts::SSL_ENUM_CIPHERS],
        tokens: &["RC4", "MD5", "DES", "3DES"],
        matcher: Matcher::Contains,
        issue: "Weak cipher detected: {token}",
        remediation: "Disable weak cipher {token} in server configuration.",
    },
    Rule {
        checks: &[scripts::SSL_ENUM_CIPHERS],
        tokens: &["TLSv1.0", "TLSv1.1", "SSLv2", "SSLv3"],
        matcher: Matcher::Contains,
        issue: "Outdated TLS version: {token}",
        remediation: "Disable {token} and enable TLSv1.2 or TLSv1.3.",
    },
    Rule {
        checks: &[scripts::SSL_CERT],
        tokens: &["expired"],
        matcher: Matcher::ContainsIgnoreCase,
        issue: "SSL certificate is expired",
        remediation: "Renew the SSL certificate",
    },
    Rule {
        checks: &[scripts::SSL_CERT],
        tokens: &["self-signed"],
        matcher: Matcher::ContainsIgnoreCase,
        issue: "Self-signed SSL certificate detected",
        remediation: "Replace with a certificate from a trusted CA",
    },
    Rule {
        checks: &[scripts::SSL_KNOWN_KEY],
        tokens: &["known vulnerable"],
        matcher: Matcher::ContainsIgnoreCase,
        issue: "Known vulnerable SSL key detected",
        remediation: "Regenerate SSL key and update certificates",
    },
    // "NOT VULNERABLE" output also matches
    Rule {
        checks: &[scripts::SSL_HEARTBLEED],
        tokens: &["vulnerable"],
        matcher: Matcher::ContainsIgnoreCase,
        issue: "Heartbleed vulnerability detected",
        remediation: "Update OpenSSL to a non-vulnerable version",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TlsAudit;

impl SecurityAudit for TlsAudit {
    fn stage(&self) -> &'static str {
        "SSL"
    }

    fn selects(&self, port: u16, entry: &OpenPortEntry) -> bool {
        entry.service.to_lowercase().contains("ssl") || TLS_PORTS.contains(&port)
    }

    fn checks(&self) -> &'static [&'static str] {
        scripts::TLS_AUDIT
    }

    fn catalog(&self) -> &'static [Rule] {
        TLS_RULES
    }
}
