//! maxchain - Drive daisy-chained MAX7219/MAX7221 LED controllers
//!
//! Every controller in the chain shares one serial bus and one chip-select
//! line, so each command is shifted through the whole chain in a single
//! transaction. The commands here configure and write the displays through
//! any transport compiled in (an emulated chain or Linux spidev).
//!
//! When the chain is released at exit it is powered down, as the driver
//! lifecycle requires. Use `--hold` to keep the displays lit for a while.

mod cli;
mod commands;

use clap::Parser;
use cli::{ChainArgs, Cli, Commands};
use maxchain_core::{ChainConfig, ChainDriver};
use maxchain_transport::{open_chain, TransportHandle};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match &cli.command {
        Commands::Annotate { bytes } => {
            return commands::run_annotate(bytes, cli.chain.chain_length, cli.chain.device_type)
        }
        Commands::ListTransports => {
            commands::list_transports();
            return Ok(());
        }
        _ => {}
    }

    let mut driver = open(&cli.chain)?;

    let result = match cli.command {
        Commands::Mode { mode, device } => commands::chain::run_mode(&mut driver, mode, device),
        Commands::Intensity { level, device } => {
            commands::chain::run_intensity(&mut driver, level, device)
        }
        Commands::Decode { mask, device } => commands::chain::run_decode(&mut driver, mask, device),
        Commands::ScanLimit { digits, device } => {
            commands::chain::run_scan_limit(&mut driver, digits, device)
        }
        Commands::Digit {
            device,
            digit,
            value,
        } => commands::chain::run_digit(&mut driver, device, digit, value),
        Commands::Fill { value } => commands::chain::run_fill(&mut driver, value),
        Commands::Write {
            device,
            digit,
            values,
        } => commands::chain::run_write(&mut driver, device, digit, &values),
        Commands::Annotate { .. } | Commands::ListTransports => Ok(()),
    };

    if result.is_ok() {
        commands::chain::print_state(&driver);
        if cli.chain.hold > 0 {
            log::info!("Holding chain for {} s", cli.chain.hold);
            std::thread::sleep(Duration::from_secs(cli.chain.hold));
        }
    }

    // Power down and release the bus even when the command failed
    if let Err(e) = driver.free() {
        log::warn!("Failed to release chain cleanly: {}", e);
        if result.is_ok() {
            return Err(e.into());
        }
    }

    result
}

/// Open the transport and attach the chain described on the command line
fn open(args: &ChainArgs) -> Result<ChainDriver<TransportHandle>, Box<dyn std::error::Error>> {
    let config = ChainConfig::new(args.chain_length, args.device_type)
        .with_bus(args.bus)
        .with_clock_speed(args.speed)
        .with_chip_select(args.chip_select);

    log::debug!(
        "Opening {} for {} x {} at {} Hz",
        args.transport,
        config.chain_length,
        config.device_type,
        config.clock_speed_hz
    );

    open_chain(&args.transport, &config)
}
