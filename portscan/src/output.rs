//! Rendering of scan results for the terminal and output files.

use anyhow::Result;
use port_scan::{catalog, ScanReport, ScanSummary};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::OutputFormat;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    summary: &'a ScanSummary,
    ports: &'a ScanReport,
}

#[derive(Serialize)]
struct PortLine<'a> {
    address: String,
    port: u16,
    description: &'a str,
}

pub fn render(format: OutputFormat, report: &ScanReport, summary: &ScanSummary) -> Result<String> {
    let out = match format {
        OutputFormat::Text => render_text(report, summary),
        OutputFormat::Json => serde_json::to_string(&JsonReport { summary, ports: report })?,
        OutputFormat::Jsonl => {
            let mut lines = Vec::with_capacity(report.len());
            for r in report {
                let line = PortLine {
                    address: summary.address.to_string(),
                    port: r.port,
                    description: r.description.unwrap_or(catalog::NO_KNOWN_DESCRIPTION),
                };
                lines.push(serde_json::to_string(&line)?);
            }
            lines.join("\n")
        }
    };
    Ok(out)
}

fn render_text(report: &ScanReport, summary: &ScanSummary) -> String {
    let mut s = if report.is_empty() {
        format!("{}: no open ports found ({} scanned)", summary.address, summary.scanned)
    } else {
        format!(
            "{}: {} open ports ({} scanned, {} ms)",
            summary.address,
            report.len(),
            summary.scanned,
            summary.duration_ms
        )
    };
    if summary.cancelled {
        s.push_str(" [cancelled]");
    }
    for r in report {
        s.push('\n');
        s.push_str(&format_port(r.port, r.description));
    }
    s
}

pub fn format_port(port: u16, description: Option<&str>) -> String {
    let desc = description.unwrap_or(catalog::NO_KNOWN_DESCRIPTION);
    format!("{:>5}/tcp  {}", port, desc)
}

/// One `address,port,description` row per open port.
pub fn write_csv<W: Write>(writer: W, report: &ScanReport, summary: &ScanSummary) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["address", "port", "description"])?;
    let address = summary.address.to_string();
    for r in report {
        let desc = r.description.unwrap_or(catalog::NO_KNOWN_DESCRIPTION);
        let port = r.port.to_string();
        wtr.write_record([address.as_str(), port.as_str(), desc])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `text` to `path` (truncating) or stdout.
pub fn emit(text: &str, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        let file = OpenOptions::new().create(true).truncate(true).write(true).open(path)?;
        let mut w = BufWriter::new(file);
        writeln!(w, "{}", text)?;
        w.flush()?;
    } else if !text.is_empty() {
        println!("{}", text);
    }
    Ok(())
}

pub fn render_services(format: OutputFormat) -> Result<String> {
    let entries = catalog::entries();
    let out = match format {
        OutputFormat::Text => entries
            .iter()
            .map(|(port, desc)| format_port(*port, Some(*desc)))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            let list: Vec<_> = entries
                .iter()
                .map(|(port, desc)| serde_json::json!({ "port": port, "description": desc }))
                .collect();
            serde_json::to_string(&list)?
        }
        OutputFormat::Jsonl => {
            let mut lines = Vec::with_capacity(entries.len());
            for (port, desc) in entries {
                lines.push(serde_json::to_string(&serde_json::json!({ "port": port, "description": desc }))?);
            }
            lines.join("\n")
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use port_scan::{aggregate, ProbeResult};
    use std::net::{IpAddr, Ipv4Addr};

    fn sample() -> (ScanReport, ScanSummary) {
        let report = aggregate(vec![
            ProbeResult::open(80, "HTTP"),
            ProbeResult::closed(81),
            ProbeResult::open(22, "SSH Remote Login Protocol"),
        ]);
        let summary = ScanSummary {
            address: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
            port_min: 1,
            port_max: 100,
            scanned: 100,
            open: 2,
            started_at: "2024-01-01T00:00:00Z".into(),
            ended_at: "2024-01-01T00:00:01Z".into(),
            duration_ms: 1000,
            cancelled: false,
        };
        (report, summary)
    }

    #[test]
    fn text_lists_ports_in_order() {
        let (report, summary) = sample();
        let text = render(OutputFormat::Text, &report, &summary).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "10.0.0.5: 2 open ports (100 scanned, 1000 ms)");
        assert_eq!(lines[1], "   22/tcp  SSH Remote Login Protocol");
        assert_eq!(lines[2], "   80/tcp  HTTP");
    }

    #[test]
    fn text_for_empty_and_cancelled() {
        let (_, mut summary) = sample();
        summary.cancelled = true;
        let text = render(OutputFormat::Text, &ScanReport::default(), &summary).unwrap();
        assert_eq!(text, "10.0.0.5: no open ports found (100 scanned) [cancelled]");
    }

    #[test]
    fn json_flattens_summary() {
        let (report, summary) = sample();
        let v: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json, &report, &summary).unwrap()).unwrap();
        assert_eq!(v["address"], "10.0.0.5");
        assert_eq!(v["open"], 2);
        assert_eq!(v["ports"][0]["port"], 22);
        assert_eq!(v["ports"][1]["description"], "HTTP");
    }

    #[test]
    fn jsonl_has_one_line_per_open_port() {
        let (report, summary) = sample();
        let out = render(OutputFormat::Jsonl, &report, &summary).unwrap();
        let lines: Vec<serde_json::Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["port"], 80);
        assert_eq!(lines[1]["address"], "10.0.0.5");
    }

    #[test]
    fn csv_rows() {
        let (report, summary) = sample();
        let mut buf = Vec::new();
        write_csv(&mut buf, &report, &summary).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s, "address,port,description\n10.0.0.5,22,SSH Remote Login Protocol\n10.0.0.5,80,HTTP\n");
    }

    #[test]
    fn services_text_matches_catalog() {
        let text = render_services(OutputFormat::Text).unwrap();
        assert_eq!(text.lines().count(), catalog::entries().len());
        assert!(text.lines().any(|l| l == "    7/tcp  CHO"));
    }
}
