//! # Report Output
//!
//! Terminal and JSON rendering of a [`ScanReport`].

use crate::error::{Result, SurfaceScanError};
use crate::models::{AuditOutcome, OpenPortMap, ScanReport, ScanStatus};
use colored::*;
use std::fs;
use std::path::Path;
use tracing::info;

/// Pretty-printed JSON report
pub fn to_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| SurfaceScanError::parse(format!("Failed to serialize JSON: {}", e)))
}

/// Write the JSON report to `path`
pub fn save_json(report: &ScanReport, path: &Path) -> Result<()> {
    fs::write(path, to_json(report)?)?;
    info!(path = %path.display(), "Report saved");
    Ok(())
}

/// Print the report in JSON or as a coloured summary
pub fn print_report(report: &ScanReport, json_mode: bool) -> Result<()> {
    if json_mode {
        println!("{}", to_json(report)?);
    } else {
        print_summary(report);
    }
    Ok(())
}

/// Print a coloured summary in non-JSON mode
pub fn print_summary(report: &ScanReport) {
    println!(
        "\n{} {} ({} open ports, {} findings)",
        status_label(report.status()),
        report.target.bright_white().bold(),
        report.open_ports.len(),
        report.finding_count()
    );

    print_open_ports(&report.open_ports);
    print_audit("SSL/TLS", &report.ssl_security_findings);
    print_audit("HTTP", &report.http_security_findings);

    if !report.errors.is_empty() {
        println!("\n{}", "ERRORS".bright_red().bold());
        for error in &report.errors {
            println!("  {} {}", "x".red(), error);
        }
    }
}

fn status_label(status: ScanStatus) -> ColoredString {
    match status {
        ScanStatus::Complete => "COMPLETE".bright_green().bold(),
        ScanStatus::Partial => "PARTIAL".bright_yellow().bold(),
        ScanStatus::Failed => "FAILED".bright_red().bold(),
    }
}

fn print_open_ports(open_ports: &OpenPortMap) {
    if open_ports.is_empty() {
        println!("{} No open ports found", "WARNING".yellow());
        return;
    }

    println!("\n{}", "OPEN PORTS".bright_cyan().bold());
    for (port, entry) in open_ports.iter() {
        let service_info = if !entry.product.is_empty() {
            format!(
                "{} {} {}",
                entry.service.bright_cyan(),
                entry.product.bright_white(),
                entry.version.bright_black()
            )
        } else {
            entry.service.bright_cyan().to_string()
        };
        println!("  {} Port {}: {}", "->".bright_blue(), port, service_info);
    }
}

fn print_audit(title: &str, outcome: &AuditOutcome) {
    let findings = match outcome {
        AuditOutcome::Failed { error } => {
            println!("\n{} {}", title.bright_cyan().bold(), error.red());
            return;
        }
        AuditOutcome::Findings(findings) => findings,
    };

    if findings.is_empty() {
        return;
    }

    println!("\n{}", format!("{} FINDINGS", title).bright_cyan().bold());
    for (port, audit) in findings {
        if !audit.has_findings() {
            println!("  {} Port {}: {}", "->".bright_blue(), port, "no issues".green());
            continue;
        }

        println!("  {} Port {} ({})", "->".bright_blue(), port, audit.service);
        for finding in audit.findings() {
            println!("     {} {}", "!".bright_red(), finding.description.yellow());
            println!("       {}", finding.remediation.bright_black());
        }
    }
}
