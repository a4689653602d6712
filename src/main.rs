use clap::Parser;
use tokio::time::Duration;

use jbdread::{poll, render, BleTransport, PollConfig};

#[derive(Parser)]
#[command(name = "jbdread")]
#[command(about = "Read the basic info block from a JBD BMS over BLE and print it as JSON")]
struct Args {
    /// Remote Bluetooth address (or advertised name) of the BMS
    #[arg(short, long, value_name = "MAC")]
    device: String,

    /// Verbosity: -v for a summary, -vv for raw traces (on stderr)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Attempts for each of the connect and data request phases
    #[arg(long, default_value_t = PollConfig::DEFAULT_ATTEMPTS)]
    attempts: u32,

    /// Timeout for each connect and receive step, in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,
}

/// Prints `{}` rather than failing when the battery cannot be read, and
/// always exits 0.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    jbdread::logging::init(args.verbose);

    let config = PollConfig {
        connect_attempts: args.attempts,
        request_attempts: args.attempts,
        timeout: Duration::from_millis(args.timeout_ms),
        ..PollConfig::new(args.device)
    };

    let mut transport = BleTransport::default();
    let result = poll(&mut transport, &config).await;
    println!("{}", render(&result));
}
