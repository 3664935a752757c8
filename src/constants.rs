//! # Configuration Constants
//!
//! Defaults and operational limits used throughout surfacescan, together with
//! the probing-engine script lists requested by the audit stages.
//!
//! ## Categories
//!
//! - **Scheduling**: default port range, chunk size and worker multiplier
//! - **Port Limits**: valid port bounds
//! - **Nmap**: timing template and NSE script identifiers
//! - **Validation**: input validation limits

/// Port range scanned when a request does not name one
pub const DEFAULT_PORT_RANGE: &str = "1-65535";

/// Number of ports handed to one worker when a request does not set a chunk size
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Worker threads per logical core. Probes are I/O bound, so the pool is
/// oversubscribed relative to the core count.
pub const WORKERS_PER_CORE: usize = 4;

/// Nmap timing template (`-T4`)
pub const NMAP_TIMING_TEMPLATE: u8 = 4;

/// Name of the probing engine binary
pub const NMAP_BINARY: &str = "nmap";

/// Port scanning limits
pub mod ports {
    /// Maximum port number
    pub const MAX: u16 = 65535;
    /// Minimum port number
    pub const MIN: u16 = 1;
}

/// NSE scripts requested by the audit stages
pub mod scripts {
    pub const SSL_ENUM_CIPHERS: &str = "ssl-enum-ciphers";
    pub const SSL_CERT: &str = "ssl-cert";
    pub const SSL_KNOWN_KEY: &str = "ssl-known-key";
    pub const SSL_DATE: &str = "ssl-date";
    pub const SSL_DH_PARAMS: &str = "ssl-dh-params";
    pub const SSL_HEARTBLEED: &str = "ssl-heartbleed";

    pub const HTTP_HEADERS: &str = "http-headers";
    pub const HTTP_METHODS: &str = "http-methods";
    pub const HTTP_SECURITY_HEADERS: &str = "http-security-headers";
    pub const HTTP_VULN_CVE2017_5638: &str = "http-vuln-cve2017-5638";
    pub const HTTP_SLOWLORIS_CHECK: &str = "http-slowloris-check";

    /// Scripts run against every TLS-audited port
    pub const TLS_AUDIT: &[&str] = &[
        SSL_ENUM_CIPHERS,
        SSL_CERT,
        SSL_KNOWN_KEY,
        SSL_DATE,
        SSL_DH_PARAMS,
        SSL_HEARTBLEED,
    ];

    /// Scripts run against every HTTP-audited port
    pub const HTTP_AUDIT: &[&str] = &[
        HTTP_HEADERS,
        HTTP_METHODS,
        HTTP_SECURITY_HEADERS,
        HTTP_VULN_CVE2017_5638,
        HTTP_SLOWLORIS_CHECK,
    ];
}

/// Input validation
pub mod validation {
    /// Maximum target string length
    pub const MAX_TARGET_LENGTH: usize = 253;
    /// Maximum length of a single hostname label
    pub const MAX_LABEL_LENGTH: usize = 63;
    /// Upper bound on the worker pool size
    pub const MAX_WORKERS: usize = 1024;
}
