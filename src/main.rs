use colored::*;
use std::env;
use std::process;
use surfacescan::config::Config;
use surfacescan::error::Result;
use surfacescan::external::nmap::NmapProber;
use surfacescan::logging;
use surfacescan::models::{ScanReport, ScanStatus};
use surfacescan::report;
use surfacescan::service::{ScanRequest, ScanService};
use surfacescan::utils;

/// Application entry point
#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        process::exit(0);
    }

    let config = match Config::from_args(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} {}", "ERROR".red().bold(), e);
            process::exit(1);
        }
    };

    let guards = match logging::init_logging(&config.logging) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("{} {}", "ERROR".red().bold(), e);
            process::exit(1);
        }
    };

    let code = match run(&config).await {
        Ok(report) => exit_code(report.status()),
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            1
        }
    };

    // flush file logs before exiting
    drop(guards);
    process::exit(code);
}

/// Print usage information
fn print_usage() {
    eprintln!(
        "{}",
        "usage: surfacescan <target> [--ports START-END] [--chunk-size N] [--workers N] [--json] [--output FILE]"
            .red()
            .bold()
    );
    eprintln!("Scan Options:");
    eprintln!("  --ports START-END   Port range to scan (default: 1-65535)");
    eprintln!("  --chunk-size N      Ports per worker task (default: 2000)");
    eprintln!("  --workers N         Worker threads (default: 4 per core)");
    eprintln!("  --no-os-detection   Skip OS fingerprinting (no root needed)");
    eprintln!("  --nmap-path PATH    Use this nmap binary instead of the one in PATH");
    eprintln!("Other Options:");
    eprintln!("  --json              Output in JSON format");
    eprintln!("  --output FILE       Save the JSON report to FILE");
    eprintln!("  --config FILE       Load settings from a TOML file");
    eprintln!("Environment:");
    eprintln!("  SURFACESCAN_WORKERS, SURFACESCAN_CHUNK_SIZE, SURFACESCAN_NMAP_PATH");
    eprintln!("  SURFACESCAN_LOG_LEVEL, SURFACESCAN_LOG_JSON, SURFACESCAN_LOG_FILE");
    eprintln!("Exit Codes:");
    eprintln!("  0 complete, 2 partial (an audit stage failed), 1 failure");
    eprintln!("Examples:");
    eprintln!("  surfacescan 127.0.0.1 --ports 1-1024           # Scan the first 1024 ports");
    eprintln!("  surfacescan example.com --no-os-detection      # Full scan without root");
    eprintln!("  surfacescan 192.168.1.1 --json --output r.json # JSON output saved to r.json");
}

/// Main application logic
async fn run(config: &Config) -> Result<ScanReport> {
    utils::check_dependencies(config.nmap_path.as_deref())?;

    let prober = match &config.nmap_path {
        Some(path) => NmapProber::with_path(path)?,
        None => NmapProber::new()?,
    };

    if !config.json_mode {
        print_scan_start(config);
    }

    let service = ScanService::from_config(prober, config);
    let request = ScanRequest::new(config.target.clone())
        .ports(config.ports.to_string())
        .chunk_size(config.chunk_size);

    let report = service.full_scan(request).await?;

    report::print_report(&report, config.json_mode)?;
    if let Some(path) = &config.output_file {
        report::save_json(&report, path)?;
    }

    Ok(report)
}

/// Print scan start message
fn print_scan_start(config: &Config) {
    println!(
        "{} Scanning ports {} on {} ({} workers, {} ports per chunk)...",
        "SCAN".bright_yellow(),
        config.ports,
        config.target,
        config.workers,
        config.chunk_size
    );
}

fn exit_code(status: ScanStatus) -> i32 {
    match status {
        ScanStatus::Complete => 0,
        ScanStatus::Partial => 2,
        ScanStatus::Failed => 1,
    }
}
