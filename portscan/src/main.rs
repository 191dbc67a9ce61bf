use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use port_scan::{CancellationToken, ScanOptions};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod output;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat { Text, Json, Jsonl }

impl OutputFormat {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "jsonl" => Some(OutputFormat::Jsonl),
            _ => None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "portscan", version, about = "TCP connect port scanner")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./portscan.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output on stderr (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Scan a port range on one IPv4 or IPv6 address
    Scan {
        /// Target IP address (literal, no hostnames)
        address: String,
        /// Port range as <min>-<max>, e.g. 1-1024 or "70 - 80"
        range: String,
        /// Timeout per port in milliseconds [default: 500]
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Max concurrent connection attempts [default: 256]
        #[arg(long)]
        concurrency: Option<usize>,
        /// Cap on connection attempts per second; 0 disables pacing [default: 0]
        #[arg(long)]
        qps: Option<u32>,
        /// Output format [default: text]
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Output file (overwrites)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Write CSV instead of text/json when --out is provided
        #[arg(long, default_value_t = false)]
        csv: bool,
        /// Print open ports on stderr as they are found
        #[arg(long, default_value_t = false)]
        stream: bool,
    },
    /// List the well-known service catalog
    Services {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt { Cancel, Exit }

/// First interrupt cancels the scan, any later one exits.
fn on_interrupt(cancel: &CancellationToken) -> Interrupt {
    if cancel.is_cancelled() {
        Interrupt::Exit
    } else {
        cancel.cancel();
        Interrupt::Cancel
    }
}

async fn watch_interrupts(cancel: CancellationToken) {
    while tokio::signal::ctrl_c().await.is_ok() {
        match on_interrupt(&cancel) {
            Interrupt::Cancel => {
                eprintln!("\nScan interrupted, waiting for in-flight probes (Ctrl-C again to quit)...");
            }
            Interrupt::Exit => {
                eprintln!("\nInterrupted again, exiting.");
                std::process::exit(130);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Version => {
            println!("portscan {} (core {})", env!("CARGO_PKG_VERSION"), portscan_core::version());
        }
        Commands::Services { format } => {
            println!("{}", output::render_services(format)?);
        }
        Commands::Scan { address, range, timeout_ms, concurrency, qps, format, out, csv, stream } => {
            let loaded_cfg = config::load_config(cli.config.as_deref());
            let settings = config::ScanSettings::resolve(
                timeout_ms,
                concurrency,
                qps,
                format,
                loaded_cfg.as_ref().and_then(|c| c.scan.as_ref()),
            );
            if settings.concurrency == 0 { return Err(anyhow!("--concurrency must be > 0")); }
            if settings.timeout_ms == 0 { return Err(anyhow!("--timeout-ms must be > 0")); }
            if csv && out.is_none() { return Err(anyhow!("--csv requires --out <file>")); }

            // Fail on bad input before starting the runtime.
            let target = port_scan::validate(&address, &range)?;
            let options = ScanOptions::default()
                .with_concurrency(settings.concurrency)
                .with_timeout(Duration::from_millis(settings.timeout_ms))
                .with_qps(settings.qps);

            let rt = tokio::runtime::Runtime::new()?;
            let (report, summary) = rt.block_on(async move {
                let cancel = CancellationToken::new();
                let cancel_on_signal = cancel.clone();
                tokio::spawn(watch_interrupts(cancel_on_signal));
                port_scan::scan_with_summary(target, &options, cancel, |r| {
                    if stream && r.is_open() {
                        eprintln!("{}", output::format_port(r.port, r.description));
                    }
                })
                .await
            });

            if csv {
                if let Some(path) = out.as_deref() {
                    let file = std::fs::File::create(path)?;
                    output::write_csv(file, &report, &summary)?;
                }
                return Ok(());
            }
            let text = output::render(settings.format, &report, &summary)?;
            output::emit(&text, out.as_deref())?;
        }
    }
    Ok(())
}
