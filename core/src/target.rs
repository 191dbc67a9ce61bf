//! Target validation: a literal IP address plus a `<min>-<max>` port range.

use regex::Regex;
use std::fmt;
use std::net::IpAddr;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid address: {input:?} is not an IPv4 or IPv6 literal")]
    InvalidAddress { input: String },
    #[error("invalid port range {input:?}: {reason}")]
    InvalidRange { input: String, reason: &'static str },
}

/// A validated scan target. Only [`validate`] builds one.
///
/// `port_min > port_max` is allowed and describes an empty scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    address: IpAddr,
    port_min: u16,
    port_max: u16,
}

impl Target {
    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn port_min(&self) -> u16 {
        self.port_min
    }

    pub fn port_max(&self) -> u16 {
        self.port_max
    }

    /// Ports in ascending order; empty when the range is inverted.
    pub fn ports(&self) -> RangeInclusive<u16> {
        self.port_min..=self.port_max
    }

    pub fn port_count(&self) -> usize {
        if self.port_min > self.port_max {
            0
        } else {
            usize::from(self.port_max - self.port_min) + 1
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}-{}]", self.address, self.port_min, self.port_max)
    }
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]+)-([0-9]+)$").expect("range pattern compiles"))
}

/// Parse a literal IP address. Hostnames are rejected.
pub fn parse_address(address: &str) -> Result<IpAddr, ValidationError> {
    address
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ValidationError::InvalidAddress { input: address.to_string() })
}

/// Parse `<min>-<max>`, tolerating whitespace anywhere (`"70 - 80"` equals `"70-80"`).
pub fn parse_range(range_expr: &str) -> Result<(u16, u16), ValidationError> {
    let compact: String = range_expr.chars().filter(|c| !c.is_whitespace()).collect();
    let invalid = |reason| ValidationError::InvalidRange { input: range_expr.to_string(), reason };
    let caps = range_pattern()
        .captures(&compact)
        .ok_or_else(|| invalid("expected <min>-<max>, e.g. 1-1024"))?;
    // digits only, so the sole failure mode is overflow
    let min: u16 = caps[1].parse().map_err(|_| invalid("port above 65535"))?;
    let max: u16 = caps[2].parse().map_err(|_| invalid("port above 65535"))?;
    Ok((min, max))
}

/// Validate an address and a port range expression into a [`Target`].
pub fn validate(address: &str, range_expr: &str) -> Result<Target, ValidationError> {
    let address = parse_address(address)?;
    let (port_min, port_max) = parse_range(range_expr)?;
    Ok(Target { address, port_min, port_max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn accepts_ipv4_and_ipv6_literals() {
        let t = validate("127.0.0.1", "1-100").unwrap();
        assert_eq!(t.address(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!((t.port_min(), t.port_max()), (1, 100));
        let t = validate("::1", "22-22").unwrap();
        assert_eq!(t.address(), IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(t.port_count(), 1);
    }

    #[test]
    fn rejects_hostnames_and_garbage() {
        assert!(matches!(validate("not-an-ip", "1-100"), Err(ValidationError::InvalidAddress { .. })));
        assert!(matches!(validate("localhost", "1-100"), Err(ValidationError::InvalidAddress { .. })));
        assert!(matches!(validate("256.1.1.1", "1-100"), Err(ValidationError::InvalidAddress { .. })));
        assert!(matches!(validate("", "1-100"), Err(ValidationError::InvalidAddress { .. })));
    }

    #[test]
    fn address_is_checked_before_range() {
        assert!(matches!(validate("nope", "abc"), Err(ValidationError::InvalidAddress { .. })));
    }

    #[test]
    fn rejects_malformed_ranges() {
        for bad in ["abc", "", "80", "-80", "80-", "1-2-3", "a1-5", "1-5x", "1,5", "+1-5"] {
            assert!(
                matches!(validate("127.0.0.1", bad), Err(ValidationError::InvalidRange { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn embedded_whitespace_is_ignored() {
        assert_eq!(validate("127.0.0.1", "70 - 80"), validate("127.0.0.1", "70-80"));
        assert_eq!(parse_range("  1\t-\t10 ").unwrap(), (1, 10));
    }

    #[test]
    fn bounds_above_u16_are_rejected() {
        assert!(matches!(parse_range("1-65536"), Err(ValidationError::InvalidRange { .. })));
        assert!(matches!(parse_range("99999999999999999999-1"), Err(ValidationError::InvalidRange { .. })));
        assert_eq!(parse_range("0-65535").unwrap(), (0, 65535));
    }

    #[test]
    fn inverted_range_is_valid_and_empty() {
        let t = validate("10.0.0.1", "100-1").unwrap();
        assert_eq!(t.port_count(), 0);
        assert_eq!(t.ports().count(), 0);
    }

    #[test]
    fn full_range_counts_every_port() {
        let t = validate("10.0.0.1", "0-65535").unwrap();
        assert_eq!(t.port_count(), 65536);
        assert_eq!(t.to_string(), "10.0.0.1 [0-65535]");
    }

    #[test]
    fn errors_name_the_input() {
        let e = validate("bogus", "1-2").unwrap_err();
        assert!(e.to_string().contains("bogus"));
    }
}
