#[cfg(test)]
mod tests {
    use surfacescan::error::SurfaceScanError;
    use surfacescan::external::nmap::{parse_nmap_xml, NmapProber};
    use surfacescan::external::BaseTool;
    use surfacescan::models::PortState;
    use surfacescan::probe::{ProbeOptions, Prober};
    use surfacescan::target::Target;

    const REPORT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap">
  <host>
    <ports>
      <port protocol="tcp" portid="80">
        <state state="open" reason="syn-ack"/>
        <service name="http" product="nginx" version="1.24.0"/>
        <script id="http-methods" output="Supported Methods: GET HEAD POST OPTIONS TRACE"/>
      </port>
      <port protocol="tcp" portid="81">
        <state state="closed" reason="reset"/>
      </port>
    </ports>
  </host>
</nmaprun>"#;

    #[cfg(unix)]
    fn stub_nmap(name: &str, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = std::env::temp_dir().join(format!(
            "surfacescan-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_base_tool_invalid_command() {
        let result = BaseTool::new("definitely_not_a_real_command_12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_nmap_prober_creation() {
        // depends on whether nmap is installed
        match NmapProber::new() {
            Ok(prober) => assert!(!prober.binary_path().is_empty()),
            Err(e) => assert!(matches!(e, SurfaceScanError::ExternalTool { .. })),
        }
    }

    #[test]
    fn test_nmap_prober_with_missing_path() {
        assert!(NmapProber::with_path("/nonexistent/nmap").is_err());
    }

    #[test]
    fn test_parse_public_report() {
        let report = parse_nmap_xml(&REPORT_XML.replace("<!DOCTYPE nmaprun>\n", "")).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[&80].state, PortState::Open);
        assert_eq!(report[&80].product.as_deref(), Some("nginx"));
        assert!(report[&80].diagnostic("http-methods").unwrap().contains("TRACE"));
        assert!(!report[&81].is_open());
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_runs_binary_and_parses_xml() {
        let path = stub_nmap("nmap-ok", &format!("cat <<'EOF'\n{}\nEOF", REPORT_XML));
        let prober = NmapProber::with_path(path.to_str().unwrap()).unwrap();
        let target = Target::resolve("127.0.0.1").unwrap();

        let report = prober
            .probe(&target, "80-81", &ProbeOptions::port_scan(false))
            .unwrap();
        assert_eq!(report.keys().copied().collect::<Vec<_>>(), vec![80, 81]);

        std::fs::remove_file(&path).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_reports_engine_failure() {
        let path = stub_nmap("nmap-fail", "echo 'requires root privileges' >&2\nexit 1");
        let prober = NmapProber::with_path(path.to_str().unwrap()).unwrap();
        let target = Target::resolve("127.0.0.1").unwrap();

        let err = prober
            .probe(&target, "1-10", &ProbeOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("requires root privileges"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_probe_rejects_bad_port_expression() {
        let Ok(prober) = NmapProber::new() else {
            return;
        };
        let target = Target::resolve("127.0.0.1").unwrap();
        let result = prober.probe(&target, "1-10; reboot", &ProbeOptions::default());
        assert!(matches!(result, Err(SurfaceScanError::Validation(_))));
    }
}
