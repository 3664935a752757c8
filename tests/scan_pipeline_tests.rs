mod common;

use common::{localhost, ScriptedProber};
use std::sync::Arc;
use surfacescan::constants::scripts;
use surfacescan::models::{PortRecord, PortState, ScanStatus};
use surfacescan::ports::PortRange;
use surfacescan::scheduler::ChunkScheduler;
use surfacescan::service::{ScanRequest, ScanService};

fn service(prober: &Arc<ScriptedProber>) -> ScanService<Arc<ScriptedProber>> {
    ScanService::new(Arc::clone(prober)).workers(4)
}

const HEADERS_WITHOUT_HSTS: &str = "Content-Security-Policy: default-src 'self'\n\
     X-Frame-Options: SAMEORIGIN\n\
     X-Content-Type-Options: nosniff";

#[tokio::test]
async fn test_localhost_first_ten_ports() {
    let prober = Arc::new(
        ScriptedProber::new()
            .open(7, "https")
            .record(3, PortRecord::new(PortState::Closed))
            .diagnostic(7, scripts::HTTP_HEADERS, HEADERS_WITHOUT_HSTS),
    );

    let report = service(&prober)
        .full_scan(ScanRequest::new("127.0.0.1").ports("1-10").chunk_size(4))
        .await
        .unwrap();

    assert_eq!(prober.chunk_calls(), vec!["1-4", "5-8", "9-10"]);
    assert!(prober.calls().iter().all(|call| !call.scripts.is_empty() || call.os_detection));

    assert_eq!(report.target, "127.0.0.1");
    assert_eq!(report.status(), ScanStatus::Complete);
    assert_eq!(report.open_ports.ports().collect::<Vec<_>>(), vec![7]);
    assert_eq!(report.port_scan.ports().unwrap().len(), 2);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["open_ports"]["tcp/7"]["service"], "https");

    // "https" on a non-TLS port is outside the TLS scope
    let tls = report.ssl_security_findings.findings().unwrap();
    assert!(tls.is_empty());

    let http = report.http_security_findings.findings().unwrap();
    assert_eq!(
        http[&7].security_issues,
        vec!["Missing HTTP header: Strict-Transport-Security"]
    );
    assert_eq!(json["http_security_findings"]["tcp/7"]["service"], "https");

    // only the HTTP stage probed port 7
    assert_eq!(prober.audited_ports(), vec![7]);
    let audit_call = prober
        .calls()
        .into_iter()
        .find(|call| !call.scripts.is_empty())
        .unwrap();
    assert_eq!(audit_call.scripts, scripts::HTTP_AUDIT);
}

#[tokio::test]
async fn test_chunk_failure_fails_whole_scan() {
    let prober = Arc::new(
        ScriptedProber::new()
            .open(2, "ssh")
            .open(9, "http")
            .fail_on("5-8"),
    );

    let report = service(&prober)
        .full_scan(ScanRequest::new("127.0.0.1").ports("1-10").chunk_size(4))
        .await
        .unwrap();

    // every chunk still ran
    assert_eq!(prober.chunk_calls().len(), 3);

    assert_eq!(report.status(), ScanStatus::Failed);
    assert_eq!(report.status().http_status(), 500);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Port Scan Error: "));
    assert!(report.errors[0].contains("scripted failure for 5-8"));
    assert!(report.open_ports.is_empty());
    assert!(report.port_scan.error().is_some());
    assert!(prober.audited_ports().is_empty());
}

#[tokio::test]
async fn test_chunk_panic_is_reported_as_scan_failure() {
    let prober = Arc::new(ScriptedProber::new().open(2, "ssh").panic_on("5-8"));
    let service = service(&prober);

    let report = service
        .full_scan(ScanRequest::new("127.0.0.1").ports("1-10").chunk_size(4))
        .await
        .unwrap();

    assert_eq!(prober.chunk_calls().len(), 3);
    assert_eq!(report.status(), ScanStatus::Failed);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Port Scan Error: "));
    assert!(report.errors[0].contains("engine crashed on 5-8"));
    assert!(report.open_ports.is_empty());

    let stored = service.final_results().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].route, "full_scan");
}

#[tokio::test]
async fn test_tls_weak_cipher_finding() {
    let prober = Arc::new(
        ScriptedProber::new()
            .open(22, "ssh")
            .open(443, "https")
            .diagnostic(
                443,
                scripts::SSL_ENUM_CIPHERS,
                "TLSv1.2:\n  ciphers:\n    TLS_RSA_WITH_RC4_128_SHA (rsa 2048) - C",
            )
            .diagnostic(22, scripts::SSL_ENUM_CIPHERS, "RC4"),
    );

    let report = service(&prober)
        .full_scan(ScanRequest::new("127.0.0.1").ports("1-1000").chunk_size(100))
        .await
        .unwrap();

    let tls = report.ssl_security_findings.findings().unwrap();
    assert!(!tls.contains_key(&22));

    let audit = &tls[&443];
    let weak = audit
        .findings()
        .find(|f| f.description == "Weak cipher detected: RC4")
        .unwrap();
    assert!(!weak.remediation.is_empty());
    assert!(weak.remediation.contains("RC4"));
    assert_eq!(audit.security_issues.len(), audit.remediations.len());
}

#[tokio::test]
async fn test_http_missing_hsts_finding() {
    let prober = Arc::new(
        ScriptedProber::new()
            .open(80, "http")
            .diagnostic(80, scripts::HTTP_HEADERS, HEADERS_WITHOUT_HSTS),
    );

    let report = service(&prober)
        .full_scan(ScanRequest::new("127.0.0.1").ports("1-100").chunk_size(50))
        .await
        .unwrap();

    let http = report.http_security_findings.findings().unwrap();
    let hsts: Vec<_> = http[&80]
        .findings()
        .filter(|f| f.description.contains("Strict-Transport-Security"))
        .collect();
    assert_eq!(hsts.len(), 1);
    assert_eq!(hsts[0].description, "Missing HTTP header: Strict-Transport-Security");
    assert!(hsts[0].remediation.contains("Strict-Transport-Security"));
}

#[tokio::test]
async fn test_failing_audit_stage_is_partial() {
    let prober = Arc::new(
        ScriptedProber::new()
            .open(80, "http")
            .open(9443, "ssl/http")
            .fail_on("9443"),
    );

    let report = service(&prober)
        .full_scan(ScanRequest::new("127.0.0.1").ports("1-10000").chunk_size(2500))
        .await
        .unwrap();

    assert_eq!(report.status(), ScanStatus::Partial);
    assert_eq!(report.status().http_status(), 207);
    assert_eq!(
        report.errors,
        vec!["SSL Scan Error: SSL security scan failed: Probe failed: scripted failure for 9443"]
    );
    assert_eq!(
        report.ssl_security_findings.error(),
        Some("SSL security scan failed: Probe failed: scripted failure for 9443")
    );

    // the sibling stage is unaffected
    let http = report.http_security_findings.findings().unwrap();
    assert_eq!(http.keys().copied().collect::<Vec<_>>(), vec![80]);
    assert_eq!(report.open_ports.len(), 2);
}

#[tokio::test]
async fn test_unreported_port_keeps_empty_audit() {
    let prober = Arc::new(
        ScriptedProber::new()
            .open(443, "HTTPS")
            .unreported_in_audits(443),
    );

    let report = service(&prober)
        .full_scan(ScanRequest::new("127.0.0.1").ports("400-500"))
        .await
        .unwrap();

    for outcome in [&report.ssl_security_findings, &report.http_security_findings] {
        let audit = &outcome.findings().unwrap()[&443];
        assert_eq!(audit.service, "https");
        assert!(audit.security_issues.is_empty());
        assert!(audit.remediations.is_empty());
    }
    assert_eq!(report.finding_count(), 0);
}

#[test]
fn test_full_range_chunk_count() {
    let scheduler = ChunkScheduler::new(ScriptedProber::new().open(65535, "unknown"))
        .workers(8)
        .chunk_size(2000);

    let ports = scheduler
        .schedule(&localhost(), PortRange::full())
        .unwrap();

    let chunks = scheduler.prober().chunk_calls();
    assert_eq!(chunks.len(), 33);
    assert_eq!(chunks.first().map(String::as_str), Some("1-2000"));
    assert_eq!(chunks.last().map(String::as_str), Some("64001-65535"));
    assert!(ports.contains_key(&65535));
}

#[test]
fn test_os_detection_can_be_disabled() {
    let scheduler = ChunkScheduler::new(ScriptedProber::new())
        .os_detection(false)
        .chunk_size(10);
    scheduler.schedule(&localhost(), "1-10".parse().unwrap()).unwrap();

    let calls = scheduler.prober().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].ports, "1-10");
    assert!(!calls[0].os_detection);
}
