//! Bounded fan-out of probes over a target's port range.

use crate::probe::{probe, DEFAULT_TIMEOUT};
use crate::report::{aggregate, now_rfc3339, ProbeResult, ScanReport, ScanSummary};
use portscan_core::pacing::RateLimiter;
use portscan_core::Target;
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_CONCURRENCY: usize = 256;

/// Tunables for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Maximum probes in flight. Must be at least 1.
    pub concurrency: usize,
    pub timeout: Duration,
    /// Probe launches per second; `None` launches as fast as permits free up.
    pub qps: Option<u32>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions { concurrency: DEFAULT_CONCURRENCY, timeout: DEFAULT_TIMEOUT, qps: None }
    }
}

impl ScanOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_qps(mut self, qps: u32) -> Self {
        self.qps = if qps == 0 { None } else { Some(qps) };
        self
    }
}

/// Start probing every port of `target` and stream each outcome in completion order.
///
/// At most `options.concurrency` probes run at once. Cancelling `cancel`, or dropping the
/// receiver, stops new probes from being launched; probes already in flight still report.
///
/// # Panics
///
/// If `options.concurrency` is zero, or when called outside a tokio runtime.
pub fn scan_stream(
    target: Target,
    options: &ScanOptions,
    cancel: CancellationToken,
) -> mpsc::Receiver<ProbeResult> {
    scan_stream_with(target, options, cancel, probe)
}

/// [`scan_stream`] with a caller-supplied prober in place of [`probe`].
pub fn scan_stream_with<P, Fut>(
    target: Target,
    options: &ScanOptions,
    cancel: CancellationToken,
    prober: P,
) -> mpsc::Receiver<ProbeResult>
where
    P: Fn(IpAddr, u16, Duration) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    assert!(options.concurrency > 0, "scan concurrency must be at least 1");
    let mut options = options.clone();
    options.concurrency = options.concurrency.min(Semaphore::MAX_PERMITS);
    let (tx, rx) = mpsc::channel(options.concurrency);
    tokio::spawn(dispatch(target, options, cancel, tx, prober));
    rx
}

async fn dispatch<P, Fut>(
    target: Target,
    options: ScanOptions,
    cancel: CancellationToken,
    tx: mpsc::Sender<ProbeResult>,
    prober: P,
) where
    P: Fn(IpAddr, u16, Duration) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = ProbeResult> + Send + 'static,
{
    let sem = Arc::new(Semaphore::new(options.concurrency));
    let pacer = options.qps.and_then(RateLimiter::from_qps);
    let address = target.address();
    let timeout_per_port = options.timeout;

    for port in target.ports() {
        if tx.is_closed() {
            debug!(%target, port, "receiver dropped, stopping dispatch");
            break;
        }
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = sem.clone().acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
        };
        if let Some(pacer) = &pacer {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = pacer.acquire() => {}
            }
        }
        let tx = tx.clone();
        let prober = prober.clone();
        tokio::spawn(async move {
            let result = prober(address, port, timeout_per_port).await;
            let _ = tx.send(result).await;
            // held until delivered so slow consumers also bound the task count
            drop(permit);
        });
    }
    if cancel.is_cancelled() {
        debug!(%target, "scan cancelled, no further probes dispatched");
    }
}

/// Scan `target` and return the ordered report of open ports.
pub async fn scan(target: Target, options: &ScanOptions, cancel: CancellationToken) -> ScanReport {
    let mut rx = scan_stream(target, options, cancel);
    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    aggregate(results)
}

/// Like [`scan`], also calling `on_result` for each outcome as it arrives and
/// returning a [`ScanSummary`] of the run.
pub async fn scan_with_summary<F>(
    target: Target,
    options: &ScanOptions,
    cancel: CancellationToken,
    mut on_result: F,
) -> (ScanReport, ScanSummary)
where
    F: FnMut(&ProbeResult),
{
    info!(
        %target,
        ports = target.port_count(),
        concurrency = options.concurrency,
        timeout_ms = options.timeout.as_millis() as u64,
        "scan started"
    );
    let started_at = now_rfc3339();
    let start = Instant::now();

    let mut rx = scan_stream(target, options, cancel.clone());
    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        on_result(&result);
        results.push(result);
    }
    let scanned = results.len();
    let report = aggregate(results);

    let summary = ScanSummary {
        address: target.address(),
        port_min: target.port_min(),
        port_max: target.port_max(),
        scanned,
        open: report.len(),
        started_at,
        ended_at: now_rfc3339(),
        duration_ms: start.elapsed().as_millis() as u64,
        cancelled: cancel.is_cancelled(),
    };
    info!(
        %target,
        scanned,
        open = summary.open,
        duration_ms = summary.duration_ms,
        cancelled = summary.cancelled,
        "scan finished"
    );
    (report, summary)
}
