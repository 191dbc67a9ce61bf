use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::OutputFormat;

pub const DEFAULT_CONFIG_FILE: &str = "portscan.yaml";
pub const DEFAULT_TIMEOUT_MS: u64 = port_scan::probe::DEFAULT_TIMEOUT.as_millis() as u64;
pub use port_scan::scheduler::DEFAULT_CONCURRENCY;

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
    pub qps: Option<u32>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub scan: Option<ScanConfig>,
}

/// Load the YAML config at `path`, or `./portscan.yaml` if it exists.
///
/// A missing or unreadable file is not an error: defaults apply.
pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG_FILE);
            if p.exists() { p.to_path_buf() } else { return None; }
        }
    };
    let s = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
            return None;
        }
    };
    match parse_config(&s) {
        Ok(cfg) => {
            debug!(path = %path.display(), "loaded config");
            Some(cfg)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            None
        }
    }
}

pub fn parse_config(s: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str(s)
}

/// Effective scan settings after merging flags over the config file over defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub timeout_ms: u64,
    pub concurrency: usize,
    pub qps: u32,
    pub format: OutputFormat,
}

impl ScanSettings {
    pub fn resolve(
        timeout_ms: Option<u64>,
        concurrency: Option<usize>,
        qps: Option<u32>,
        format: Option<OutputFormat>,
        cfg: Option<&ScanConfig>,
    ) -> Self {
        let file = cfg.cloned().unwrap_or_default();
        let file_format = file.format.as_deref().and_then(|f| {
            let parsed = OutputFormat::from_name(f);
            if parsed.is_none() {
                warn!(format = f, "unknown format in config, ignoring");
            }
            parsed
        });
        ScanSettings {
            timeout_ms: timeout_ms.or(file.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS),
            concurrency: concurrency.or(file.concurrency).unwrap_or(DEFAULT_CONCURRENCY),
            qps: qps.or(file.qps).unwrap_or(0),
            format: format.or(file_format).unwrap_or(OutputFormat::Text),
        }
    }
}
