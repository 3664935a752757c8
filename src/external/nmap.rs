use crate::constants;
use crate::error::{Result, SurfaceScanError};
use crate::external::{BaseTool, ExternalTool};
use crate::models::{PortRecord, PortState};
use crate::probe::{ProbeOptions, ProbeReport, Prober};
use crate::target::Target;
use crate::validation;
use roxmltree::{Document, Node};
use std::process::Output;
use tracing::debug;

/// [`Prober`] backed by the nmap binary
#[derive(Debug, Clone)]
pub struct NmapProber {
    base_tool: BaseTool,
}

impl NmapProber {
    /// Locate nmap in `PATH`
    pub fn new() -> Result<Self> {
        let base_tool = BaseTool::new(constants::NMAP_BINARY)?;
        Ok(Self { base_tool })
    }

    /// Use the nmap binary at `path`
    pub fn with_path(path: &str) -> Result<Self> {
        let base_tool = BaseTool::with_path(constants::NMAP_BINARY, path)?;
        Ok(Self { base_tool })
    }

    pub fn binary_path(&self) -> &str {
        &self.base_tool.binary_path
    }

    /// Build nmap command arguments
    pub fn build_args(target: &str, ports: &str, options: &ProbeOptions) -> Vec<String> {
        let mut args = vec!["-p".to_string(), ports.to_string()];

        if options.service_detection {
            args.push("-sV".to_string());
        }
        if options.os_detection {
            args.push("-O".to_string());
        }
        if !options.scripts.is_empty() {
            args.push("--script".to_string());
            args.push(options.scripts.join(","));
        }
        if options.skip_host_discovery {
            args.push("-Pn".to_string());
        }
        if let Some(timing) = options.timing {
            args.push(format!("-T{}", timing.min(5)));
        }

        // XML report on stdout
        args.push("-oX".to_string());
        args.push("-".to_string());
        args.push(target.to_string());
        args
    }

    /// Parse nmap process output
    fn parse_nmap_output(&self, output: &Output) -> Result<ProbeReport> {
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SurfaceScanError::external_tool(
                constants::NMAP_BINARY,
                format!("Command failed: {}", stderr.trim()),
            ));
        }

        let xml_content = String::from_utf8_lossy(&output.stdout);
        parse_nmap_xml(&clean_xml_content(&xml_content))
    }
}

impl ExternalTool for NmapProber {
    fn execute(&self, args: &[String]) -> Result<Output> {
        self.base_tool.execute_command(args)
    }
}

impl Prober for NmapProber {
    fn probe(&self, target: &Target, ports: &str, options: &ProbeOptions) -> Result<ProbeReport> {
        let ports = validation::validate_port_list(ports)?;
        let args = Self::build_args(target.as_str(), &ports, options);

        debug!(target = %target, ports = %ports, scripts = options.scripts.len(), "Running nmap");
        let output = self.execute(&args)?;
        self.parse_nmap_output(&output)
    }
}

/// Remove DOCTYPE declarations, which roxmltree rejects
fn clean_xml_content(xml_content: &str) -> String {
    xml_content
        .lines()
        .filter(|line| !line.trim().starts_with("<!DOCTYPE"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse an nmap XML report into TCP port records
pub fn parse_nmap_xml(xml_content: &str) -> Result<ProbeReport> {
    let doc = Document::parse(xml_content)
        .map_err(|e| SurfaceScanError::parse(format!("Failed to parse nmap XML: {}", e)))?;

    let root = doc.root_element();
    if root.tag_name().name() != "nmaprun" {
        return Err(SurfaceScanError::parse("Invalid nmap XML format"));
    }

    let mut report = ProbeReport::new();

    let port_elems = root
        .children()
        .filter(|n| n.has_tag_name("host"))
        .flat_map(|host| host.children().filter(|n| n.has_tag_name("ports")))
        .flat_map(|ports| ports.children().filter(|n| n.has_tag_name("port")));

    for port_elem in port_elems {
        if let Some((port, record)) = parse_port_element(&port_elem) {
            report.insert(port, record);
        }
    }

    Ok(report)
}

/// Parse one `<port>` element. Non-TCP ports and malformed ids are skipped.
fn parse_port_element(port_elem: &Node) -> Option<(u16, PortRecord)> {
    if port_elem.attribute("protocol").unwrap_or("tcp") != "tcp" {
        return None;
    }

    let port = port_elem
        .attribute("portid")
        .and_then(|p| p.parse::<u16>().ok())
        .filter(|&p| p > 0)?;

    let mut record = PortRecord::default();

    for child in port_elem.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "state" => {
                record.state = PortState::from_nmap(child.attribute("state").unwrap_or(""));
                record.reason = child.attribute("reason").map(str::to_string);
            }
            "service" => {
                record.service = Some(child.attribute("name").unwrap_or("").to_string());
                record.product = Some(child.attribute("product").unwrap_or("").to_string());
                record.version = Some(child.attribute("version").unwrap_or("").to_string());
                record.extrainfo = child.attribute("extrainfo").map(str::to_string);
                record.cpe = child
                    .children()
                    .find(|n| n.has_tag_name("cpe"))
                    .and_then(|n| n.text())
                    .map(str::to_string);
            }
            "script" => {
                if let Some(id) = child.attribute("id") {
                    let output = child.attribute("output").unwrap_or("");
                    record.diagnostics.insert(id.to_string(), output.to_string());
                }
            }
            _ => {}
        }
    }

    Some((port, record))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap" args="nmap -p 1-1000 -sV -oX - 127.0.0.1">
  <host>
    <status state="up" reason="user-set"/>
    <address addr="127.0.0.1" addrtype="ipv4"/>
    <ports>
      <extraports state="closed" count="997"/>
      <port protocol="tcp" portid="22">
        <state state="open" reason="syn-ack" reason_ttl="64"/>
        <service name="ssh" product="OpenSSH" version="8.9p1" extrainfo="Ubuntu" method="probed" conf="10">
          <cpe>cpe:/a:openbsd:openssh:8.9p1</cpe>
        </service>
      </port>
      <port protocol="tcp" portid="443">
        <state state="open" reason="syn-ack" reason_ttl="64"/>
        <service name="https" product="nginx" method="probed" conf="10"/>
        <script id="ssl-cert" output="Subject: commonName=localhost&#xa;Not valid after:  2020-01-01T00:00:00"/>
      </port>
      <port protocol="tcp" portid="631">
        <state state="filtered" reason="no-response" reason_ttl="0"/>
      </port>
      <port protocol="udp" portid="53">
        <state state="open" reason="udp-response" reason_ttl="64"/>
      </port>
    </ports>
  </host>
</nmaprun>"#;

    #[test]
    fn test_parse_nmap_xml() {
        let report = parse_nmap_xml(&clean_xml_content(SAMPLE_XML)).unwrap();
        assert_eq!(report.len(), 3);

        let ssh = &report[&22];
        assert_eq!(ssh.state, PortState::Open);
        assert_eq!(ssh.service.as_deref(), Some("ssh"));
        assert_eq!(ssh.product.as_deref(), Some("OpenSSH"));
        assert_eq!(ssh.version.as_deref(), Some("8.9p1"));
        assert_eq!(ssh.extrainfo.as_deref(), Some("Ubuntu"));
        assert_eq!(ssh.cpe.as_deref(), Some("cpe:/a:openbsd:openssh:8.9p1"));
        assert_eq!(ssh.reason.as_deref(), Some("syn-ack"));

        let https = &report[&443];
        assert_eq!(https.version.as_deref(), Some(""));
        let cert = https.diagnostic("ssl-cert").unwrap();
        assert!(cert.contains("commonName=localhost\nNot valid after"));

        assert_eq!(report[&631].state, PortState::Filtered);
        assert!(report[&631].service.is_none());
        assert!(!report.contains_key(&53));
    }

    #[test]
    fn test_parse_rejects_non_nmap_xml() {
        assert!(parse_nmap_xml("<html></html>").is_err());
        assert!(parse_nmap_xml("not xml").is_err());
    }

    #[test]
    fn test_parse_host_down_yields_empty_report() {
        let xml = r#"<nmaprun><runstats><hosts up="0" down="1" total="1"/></runstats></nmaprun>"#;
        assert!(parse_nmap_xml(xml).unwrap().is_empty());
    }

    #[test]
    fn test_build_args_for_chunk() {
        let args = NmapProber::build_args("127.0.0.1", "1-4", &ProbeOptions::port_scan(true));
        assert_eq!(
            args,
            ["-p", "1-4", "-sV", "-O", "-Pn", "-T4", "-oX", "-", "127.0.0.1"]
        );
    }

    #[test]
    fn test_build_args_with_scripts() {
        let options = ProbeOptions::diagnostics(&["http-headers", "http-methods"]);
        let args = NmapProber::build_args("example.com", "443", &options);
        assert_eq!(
            args,
            [
                "-p",
                "443",
                "-sV",
                "--script",
                "http-headers,http-methods",
                "-Pn",
                "-T4",
                "-oX",
                "-",
                "example.com"
            ]
        );
    }
}
