use port_scan::{catalog, scan_ports, ScanOptions, ValidationError};
use std::time::Duration;
use tokio::net::TcpListener;

fn options() -> ScanOptions {
    ScanOptions::default().with_concurrency(64).with_timeout(Duration::from_millis(300))
}

async fn closed_port() -> u16 {
    let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
    l.local_addr().unwrap().port()
}

#[tokio::test]
async fn reports_exactly_the_listening_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let report = scan_ports("127.0.0.1", &format!("{port}-{port}"), &options()).await.unwrap();
    assert_eq!(report.len(), 1);
    let entry = &report.entries()[0];
    assert_eq!(entry.port, port);
    assert_eq!(entry.description, Some(catalog::describe(port)));
}

#[tokio::test]
async fn several_listeners_come_back_sorted() {
    let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = first.local_addr().unwrap().port();
    let mut listeners = vec![first];
    // claim two more free ports just above the first one
    let mut candidate = base;
    while listeners.len() < 3 && candidate < u16::MAX {
        candidate += 1;
        if let Ok(l) = TcpListener::bind(("127.0.0.1", candidate)).await {
            listeners.push(l);
        }
    }
    assert_eq!(listeners.len(), 3, "no free ports above {base}");
    let ports: Vec<u16> = listeners.iter().map(|l| l.local_addr().unwrap().port()).collect();
    let (lo, hi) = (ports[0], ports[2]);
    let report = scan_ports("127.0.0.1", &format!("{lo}-{hi}"), &options()).await.unwrap();
    let found = report.ports();
    assert!(found.windows(2).all(|w| w[0] < w[1]));
    for p in ports {
        assert!(found.contains(&p));
    }
}

#[tokio::test]
async fn malformed_address_fails_before_scanning() {
    let err = scan_ports("not-an-ip", "1-100", &options()).await.unwrap_err();
    assert!(matches!(err, ValidationError::InvalidAddress { .. }));
}

#[tokio::test]
async fn malformed_range_fails_before_scanning() {
    let err = scan_ports("127.0.0.1", "abc", &options()).await.unwrap_err();
    assert!(matches!(err, ValidationError::InvalidRange { .. }));
}

#[tokio::test]
async fn spaced_range_scans_like_compact_range() {
    let port = closed_port().await;
    let spaced = scan_ports("127.0.0.1", &format!("{port} - {port}"), &options()).await.unwrap();
    let compact = scan_ports("127.0.0.1", &format!("{port}-{port}"), &options()).await.unwrap();
    assert_eq!(spaced, compact);
}

#[tokio::test]
async fn all_closed_is_empty_not_an_error() {
    let port = closed_port().await;
    let report = scan_ports("127.0.0.1", &format!("{port}-{port}"), &options()).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn inverted_range_is_an_empty_report() {
    let report = scan_ports("127.0.0.1", "100-1", &options()).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn ipv6_loopback_is_scanned() {
    let listener = match TcpListener::bind("[::1]:0").await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("skipping ipv6_loopback_is_scanned: no IPv6 loopback ({e})");
            return;
        }
    };
    let port = listener.local_addr().unwrap().port();
    let report = scan_ports("::1", &format!("{port}-{port}"), &options()).await.unwrap();
    assert_eq!(report.ports(), vec![port]);
}
