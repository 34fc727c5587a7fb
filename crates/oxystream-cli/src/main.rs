use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use oxystream_core::{DecodedChannelBlock, OxygenReceiver, PacketInfo, TcpFrameSource};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("OXYSTREAM_BUILD_COMMIT"),
    " ",
    env!("OXYSTREAM_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "oxystream")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Client for Oxygen measurement data streams.",
    long_about = None,
    after_help = "Examples:\n  oxystream acquire -a 127.0.0.1 -p 10003 -n 10 -o data.json\n  oxystream acquire --address 10.0.0.5 --port 10003 --stdout --pretty"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to a device data stream and decode packets to JSON.
    #[command(
        after_help = "Examples:\n  oxystream acquire -a 127.0.0.1 -p 10003 -n 10 -o data.json\n  oxystream acquire --stdout"
    )]
    Acquire {
        /// Server address
        #[arg(short = 'a', long, default_value = "127.0.0.1")]
        address: String,

        /// Data stream TCP port
        #[arg(short = 'p', long, default_value_t = 10003)]
        port: u16,

        /// Stop after this many decoded packets; without it, run until
        /// the stream reports the last-packet status
        #[arg(short = 'n', long)]
        packets: Option<u64>,

        /// Output path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write JSON to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Socket read timeout in seconds
        #[arg(long, default_value_t = 5.0)]
        timeout: f64,

        /// Give up after this many consecutive reads with no data
        #[arg(long, default_value_t = 5)]
        idle_limit: u32,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Acquire {
            address,
            port,
            packets,
            output,
            stdout,
            pretty,
            timeout,
            idle_limit,
            quiet,
        } => cmd_acquire(
            &address, port, packets, output, stdout, pretty, timeout, idle_limit, quiet,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

/// One decoded packet as emitted in the JSON output.
#[derive(Debug, Serialize)]
struct PacketDump {
    info: PacketInfo,
    channels: Vec<DecodedChannelBlock>,
}

#[derive(Debug, Serialize)]
struct Acquisition {
    address: String,
    port: u16,
    packets: Vec<PacketDump>,
}

fn cmd_acquire(
    address: &str,
    port: u16,
    packets: Option<u64>,
    output: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    timeout: f64,
    idle_limit: u32,
    quiet: bool,
) -> Result<(), CliError> {
    if !timeout.is_finite() || timeout <= 0.0 {
        return Err(CliError::new(
            format!("invalid timeout: {timeout}"),
            Some("use a positive number of seconds".to_string()),
        ));
    }

    let mut receiver = OxygenReceiver::connect_with_timeout(
        address,
        port,
        Duration::from_secs_f64(timeout),
    )
    .map_err(|err| {
        CliError::new(
            format!("connection to {address}:{port} failed: {err}"),
            Some("check that the device is reachable and streaming is enabled on this port".to_string()),
        )
    })?;

    let dumps = drain_packets(&mut receiver, packets, idle_limit, quiet)?;
    receiver.disconnect();

    let acquisition = Acquisition {
        address: address.to_string(),
        port,
        packets: dumps,
    };
    let json = serialize_acquisition(&acquisition, pretty)?;

    if stdout {
        println!("{}", json);
        return Ok(());
    }

    let output = output.expect("output required when not using stdout");
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&output, json)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    if !quiet {
        eprintln!(
            "OK: {} packets written -> {}",
            acquisition.packets.len(),
            output.display()
        );
    }
    Ok(())
}

fn drain_packets(
    receiver: &mut OxygenReceiver<TcpFrameSource>,
    packets: Option<u64>,
    idle_limit: u32,
    quiet: bool,
) -> Result<Vec<PacketDump>, CliError> {
    let mut dumps = Vec::new();
    let mut idle = 0u32;
    loop {
        match receiver.read_packet() {
            Ok(Some(blocks)) => {
                idle = 0;
                dumps.push(PacketDump {
                    info: *receiver.packet_info(),
                    channels: blocks,
                });
                if receiver.packet_info().is_last_packet() {
                    break;
                }
                if let Some(limit) = packets {
                    if dumps.len() as u64 >= limit {
                        break;
                    }
                }
            }
            Ok(None) => {
                idle += 1;
                if idle >= idle_limit {
                    if !quiet {
                        eprintln!(
                            "warning: no data after {idle} consecutive read timeouts, stopping"
                        );
                    }
                    break;
                }
            }
            Err(err) => {
                return Err(CliError::new(
                    format!("stream read failed: {err}"),
                    Some("the connection state is suspect; reconnect and retry".to_string()),
                ));
            }
        }
    }
    Ok(dumps)
}

fn serialize_acquisition(acquisition: &Acquisition, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(acquisition)
    } else {
        serde_json::to_string(acquisition)
    };
    json.map_err(|err| CliError::new(format!("failed to serialize output: {err}"), None))
}
