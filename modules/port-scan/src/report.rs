//! Probe outcomes and their aggregation into an ordered report.

use serde::Serialize;
use std::net::IpAddr;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    Open,
    ClosedOrFiltered,
}

/// Outcome of one connection attempt. `description` is set only for open ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub port: u16,
    pub state: PortState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl ProbeResult {
    pub fn open(port: u16, description: &'static str) -> Self {
        ProbeResult { port, state: PortState::Open, description: Some(description) }
    }

    pub fn closed(port: u16) -> Self {
        ProbeResult { port, state: PortState::ClosedOrFiltered, description: None }
    }

    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// Open ports only, ascending by port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScanReport {
    entries: Vec<ProbeResult>,
}

impl ScanReport {
    pub fn entries(&self) -> &[ProbeResult] {
        &self.entries
    }

    pub fn ports(&self) -> Vec<u16> {
        self.entries.iter().map(|r| r.port).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ProbeResult> {
        self.entries
    }
}

impl IntoIterator for ScanReport {
    type Item = ProbeResult;
    type IntoIter = std::vec::IntoIter<ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScanReport {
    type Item = &'a ProbeResult;
    type IntoIter = std::slice::Iter<'a, ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Keep open results and order them by port, whatever order they completed in.
pub fn aggregate<I>(results: I) -> ScanReport
where
    I: IntoIterator<Item = ProbeResult>,
{
    let mut entries: Vec<ProbeResult> = results.into_iter().filter(ProbeResult::is_open).collect();
    entries.sort_by_key(|r| r.port);
    ScanReport { entries }
}

/// Bookkeeping for one scan run, reported next to the [`ScanReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub address: IpAddr,
    pub port_min: u16,
    pub port_max: u16,
    /// Probes that completed; lower than the range size after cancellation.
    pub scanned: usize,
    pub open: usize,
    pub started_at: String,
    pub ended_at: String,
    pub duration_ms: u64,
    pub cancelled: bool,
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}
