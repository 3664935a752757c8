//! # Port Ranges and Scan Chunks
//!
//! A [`PortRange`] is an inclusive interval of TCP ports. The scheduler splits
//! it into [`ScanChunk`]s, contiguous sub-ranges of at most `chunk_size`
//! ports that together cover the range exactly once.
//!
//! ```rust
//! use surfacescan::ports::PortRange;
//!
//! let range: PortRange = "1-10".parse()?;
//! let chunks = range.chunks(4)?;
//! let exprs: Vec<String> = chunks.iter().map(|c| c.to_string()).collect();
//! assert_eq!(exprs, ["1-4", "5-8", "9-10"]);
//! # Ok::<(), surfacescan::error::SurfaceScanError>(())
//! ```

use crate::constants;
use crate::error::{Result, SurfaceScanError};
use crate::validation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive port interval `[start, end]` with `1 <= start <= end <= 65535`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self> {
        let (start, end) = validation::validate_port_range(start, end)?;
        Ok(Self { start, end })
    }

    /// Every valid port
    pub fn full() -> Self {
        Self {
            start: constants::ports::MIN,
            end: constants::ports::MAX,
        }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports in the range
    pub fn len(&self) -> usize {
        usize::from(self.end) - usize::from(self.start) + 1
    }

    /// A validated range always holds at least one port
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }

    /// Split the range into chunks of at most `chunk_size` ports.
    ///
    /// Chunks are produced in ascending order; the last one is clipped to
    /// the end of the range.
    pub fn chunks(&self, chunk_size: usize) -> Result<Vec<ScanChunk>> {
        let chunk_size = validation::validate_chunk_size(chunk_size)?;
        let end = u32::from(self.end);
        let step = u32::try_from(chunk_size).unwrap_or(u32::MAX);

        let mut chunks = Vec::with_capacity(self.len().div_ceil(chunk_size));
        let mut chunk_start = u32::from(self.start);
        while chunk_start <= end {
            let chunk_end = chunk_start.saturating_add(step - 1).min(end);
            // both bounds are <= self.end, which fits in u16
            chunks.push(ScanChunk {
                start: chunk_start as u16,
                end: chunk_end as u16,
            });
            chunk_start = chunk_end + 1;
        }

        Ok(chunks)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::full()
    }
}

impl FromStr for PortRange {
    type Err = SurfaceScanError;

    /// Parse `"start-end"`, or a single port `"N"`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (start, end) = match s.split_once('-') {
            Some((start, end)) => (start, end),
            None => (s, s),
        };

        let parse = |raw: &str| {
            raw.trim().parse::<u16>().map_err(|_| {
                SurfaceScanError::validation(format!("Invalid port range '{}'", s))
            })
        };

        Self::new(parse(start)?, parse(end)?)
    }
}

impl TryFrom<String> for PortRange {
    type Error = SurfaceScanError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PortRange> for String {
    fn from(range: PortRange) -> Self {
        range.to_string()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A contiguous sub-range of a [`PortRange`] assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanChunk {
    pub start: u16,
    pub end: u16,
}

impl ScanChunk {
    pub fn len(&self) -> usize {
        usize::from(self.end) - usize::from(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }
}

/// The probe port expression for the chunk, e.g. `"1-4"`
impl fmt::Display for ScanChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
