use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context};
use clap::Parser;
use ec_oem::{Console, EcOem};
use linux_embedded_hal::{Delay, I2cdev};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Serial-style console for an EC OEM circuit on a Linux I2C bus.
/// Reads commands from stdin, one per line. Send `?` for help.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// I2C bus device
    #[arg(short, long, default_value = "/dev/i2c-1")]
    device: String,
    /// Address of the circuit, decimal or 0x-prefixed hex
    #[arg(short, long, default_value = "0x64", value_parser = parse_address)]
    address: u8,
}

fn parse_address(arg: &str) -> Result<u8, String> {
    let parsed = match arg.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.map_err(|e| format!("invalid address {arg}: {e}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let dev = I2cdev::new(&args.device)
        .with_context(|| format!("could not open {}", args.device))?;
    let mut console = Console::new(EcOem::new(dev, args.address, Delay));
    console
        .sensor()
        .init()
        .map_err(|e| anyhow!("could not activate sensor at {:#04x}: {e:?}", args.address))?;
    info!(device = %args.device, address = args.address, "sensor active");

    let mut stdout = io::stdout();
    for line in io::stdin().lock().lines() {
        let line = line.context("could not read stdin")?;
        let mut response = String::new();
        match console.process_line(&line, &mut response) {
            Ok(outcome) => debug!(?outcome, "processed {line:?}"),
            Err(e) => error!(error = ?e, "{line:?} failed"),
        }
        stdout.write_all(response.as_bytes())?;
        stdout.flush()?;
    }

    info!("stdin closed, exiting");
    Ok(())
}
