//! # Target Resolution
//!
//! A [`Target`] is a validated host identifier: a dotted IPv4 literal or a
//! hostname that resolves to at least one address. The scheduler and the
//! audits only accept a `Target`, so resolution always happens before any
//! work is scheduled.
//!
//! ```rust
//! use surfacescan::target::{self, Target};
//!
//! let target = Target::resolve("127.0.0.1")?;
//! assert_eq!(target.as_str(), "127.0.0.1");
//! assert!(!target::resolve("bad target"));
//! # Ok::<(), surfacescan::error::SurfaceScanError>(())
//! ```

use crate::error::{Result, SurfaceScanError};
use crate::validation;
use serde::Serialize;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use tracing::debug;

/// Validated, resolvable scan target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    /// Validate and resolve a raw target string
    pub fn resolve(raw: &str) -> Result<Self> {
        let validated = validation::validate_target(raw.trim())?;

        if validated.parse::<Ipv4Addr>().is_ok() {
            return Ok(Self(validated));
        }

        let addrs = resolve_addrs(&validated)?;
        debug!(target = %validated, addresses = addrs.len(), "Target resolved");
        Ok(Self(validated))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns `true` when `target` is a valid IPv4 literal or a resolvable hostname
pub fn resolve(target: &str) -> bool {
    Target::resolve(target).is_ok()
}

/// Resolve target hostname or IP to socket addresses
pub fn resolve_addrs(target: &str) -> Result<Vec<SocketAddr>> {
    match (target, 0u16).to_socket_addrs() {
        Ok(iter) => {
            let addrs: Vec<SocketAddr> = iter.collect();
            if addrs.is_empty() {
                Err(SurfaceScanError::target_resolution(format!(
                    "could not resolve target: {}",
                    target
                )))
            } else {
                Ok(addrs)
            }
        }
        Err(e) => Err(SurfaceScanError::target_resolution(format!(
            "resolve error for {}: {}",
            target, e
        ))),
    }
}
