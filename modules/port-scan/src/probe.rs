//! Single TCP connect attempt with a timeout.

use crate::catalog;
use crate::report::ProbeResult;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Try to connect to `address:port` within `timeout_per_port`.
///
/// A completed handshake is `Open`; refused, unreachable and timed-out attempts all
/// collapse into `ClosedOrFiltered`. The stream is dropped right away and nothing is sent.
pub async fn probe(address: IpAddr, port: u16, timeout_per_port: Duration) -> ProbeResult {
    let addr = SocketAddr::new(address, port);
    match timeout(timeout_per_port, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            debug!(%addr, "port open");
            ProbeResult::open(port, catalog::describe(port))
        }
        Ok(Err(err)) => {
            trace!(%addr, error = %err, "connect failed");
            ProbeResult::closed(port)
        }
        Err(_elapsed) => {
            trace!(%addr, "connect timed out");
            ProbeResult::closed(port)
        }
    }
}
