//! # surfacescan - Attack Surface Scanner
//!
//! surfacescan assesses the exposed attack surface of a network host. It
//! discovers open ports with a chunked, parallel nmap scan, classifies the
//! services behind them and audits their TLS and HTTP posture.
//!
//! ## Features
//!
//! - **Chunked Port Scanning**: port ranges split into chunks probed in parallel on a Rayon pool
//! - **Service Classification**: open ports projected to service, product and version
//! - **TLS Audit**: weak ciphers, outdated protocols, certificate problems, Heartbleed
//! - **HTTP Audit**: missing security headers, unsafe methods, known HTTP vulnerabilities
//! - **Multiple Output Formats**: coloured terminal summary and JSON export
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use surfacescan::external::nmap::NmapProber;
//! use surfacescan::service::{ScanRequest, ScanService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ScanService::new(NmapProber::new()?);
//!     let report = service
//!         .full_scan(ScanRequest::new("127.0.0.1").ports("1-1024").chunk_size(256))
//!         .await?;
//!
//!     println!("Found {} open ports", report.open_ports.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`target`]: target validation and resolution
//! - [`ports`]: port ranges and scan chunks
//! - [`probe`]: the probing engine contract; [`external::nmap`] implements it
//! - [`scheduler`] and [`aggregator`]: parallel chunk probing and result merging
//! - [`classifier`]: open-port selection
//! - [`audit`]: TLS and HTTP audit stages with their rule catalogs
//! - [`service`] and [`store`]: async scan operations and recorded results
//! - [`report`]: terminal and JSON output
//! - [`config`], [`logging`], [`error`], [`validation`], [`constants`], [`utils`]: supporting infrastructure

pub mod aggregator;
pub mod audit;
pub mod classifier;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod error;
pub mod external;
pub mod logging;
pub mod models;
pub mod ports;
pub mod probe;
pub mod report;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod target;
pub mod utils;
pub mod validation;
