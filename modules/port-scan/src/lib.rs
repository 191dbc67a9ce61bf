//! TCP connect scan of a port range with bounded concurrency and service descriptions.
//!
//! [`scan_ports`] is the entry point for front ends: it validates the textual address and
//! range, fails fast on bad input, and returns the open ports in ascending order.

pub mod catalog;
pub mod probe;
pub mod report;
pub mod scheduler;

pub use portscan_core::{validate, Target, ValidationError};
pub use probe::probe;
pub use report::{aggregate, PortState, ProbeResult, ScanReport, ScanSummary};
pub use scheduler::{scan, scan_stream, scan_stream_with, scan_with_summary, ScanOptions};
pub use tokio_util::sync::CancellationToken;

/// Validate `address` and `port_range`, then scan.
///
/// No probe is sent when validation fails.
pub async fn scan_ports(
    address: &str,
    port_range: &str,
    options: &ScanOptions,
) -> Result<ScanReport, ValidationError> {
    let target = validate(address, port_range)?;
    Ok(scan(target, options, CancellationToken::new()).await)
}

/// [`scan_ports`] with cancellation, a per-result callback and a run summary.
pub async fn scan_ports_with_summary<F>(
    address: &str,
    port_range: &str,
    options: &ScanOptions,
    cancel: CancellationToken,
    on_result: F,
) -> Result<(ScanReport, ScanSummary), ValidationError>
where
    F: FnMut(&ProbeResult),
{
    let target = validate(address, port_range)?;
    Ok(scan_with_summary(target, options, cancel, on_result).await)
}
