//! CLI argument parsing

use clap::{Parser, Subcommand};
use maxchain_core::config::DEFAULT_CLOCK_SPEED_HZ;
use maxchain_core::display::DECIMAL_POINT;
use maxchain_core::{CodeB, DecodeMode, DeviceType, Intensity, Mode};

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex or decimal u8
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let value = parse_hex_u32(s)?;
    u8::try_from(value).map_err(|_| format!("Value out of range: {} (must be 0..=255)", value))
}

/// Parse a bare hex byte as captured on the bus ("0c" or "0x0C")
fn parse_bus_byte(s: &str) -> Result<u8, String> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex byte '{}': {}", s, e))
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_name(s)
        .ok_or_else(|| format!("Unknown mode: {} (expected normal, shutdown or test)", s))
}

fn parse_device_type(s: &str) -> Result<DeviceType, String> {
    DeviceType::from_name(s)
        .ok_or_else(|| format!("Unknown device type: {} (expected max7219 or max7221)", s))
}

fn parse_intensity(s: &str) -> Result<Intensity, String> {
    Intensity::new(parse_hex_u8(s)?).map_err(|e| e.to_string())
}

/// Parse a decode mask: "all", "none", or a digit bitmask (e.g. 0x0F)
fn parse_decode(s: &str) -> Result<DecodeMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "all" => Ok(DecodeMode::ALL),
        "none" => Ok(DecodeMode::NONE),
        _ => parse_hex_u8(s).map(DecodeMode::from_bits_retain),
    }
}

/// Parse a digit register value
///
/// A single Code B character, optionally followed by `.` for the decimal
/// point, is encoded as its symbol (`7`, `E.`, `-`). Anything longer is taken
/// as a raw hex or decimal register value (`0x7E`).
fn parse_code(s: &str) -> Result<u8, String> {
    let (symbol, dp) = match s.strip_suffix('.') {
        Some(rest) if !rest.is_empty() => (rest, DECIMAL_POINT),
        _ => (s, 0),
    };
    let mut chars = symbol.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(code) = CodeB::from_char(c) {
            return Ok(code.code() | dp);
        }
    }
    parse_hex_u8(s)
}

/// Generate dynamic help text for the transport argument
fn transport_help() -> String {
    format!(
        "Transport to use [available: {}]",
        maxchain_transport::transport_names_short()
    )
}

#[derive(Parser)]
#[command(name = "maxchain")]
#[command(
    author,
    version,
    about = "Drive daisy-chained MAX7219/MAX7221 LED controllers",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub chain: ChainArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Chain options shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct ChainArgs {
    /// Transport to use (e.g. "dummy" or "linux_spi:dev=/dev/spidev0.0")
    #[arg(short, long, global = true, default_value = "dummy", help = transport_help())]
    pub transport: String,

    /// Number of devices in the chain
    #[arg(short = 'n', long, global = true, default_value = "4")]
    pub chain_length: u8,

    /// Controller variant (max7219 or max7221)
    #[arg(long, global = true, default_value = "max7219", value_parser = parse_device_type)]
    pub device_type: DeviceType,

    /// Bus clock speed in Hz (hex or decimal)
    #[arg(long, global = true, default_value_t = DEFAULT_CLOCK_SPEED_HZ, value_parser = parse_hex_u32)]
    pub speed: u32,

    /// Chip-select line of the chain
    #[arg(long, global = true, default_value = "0")]
    pub chip_select: u32,

    /// Bus number
    #[arg(long, global = true, default_value = "0")]
    pub bus: u8,

    /// Keep the chain attached this many seconds before powering it down
    #[arg(long, global = true, default_value = "0")]
    pub hold: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set the operating mode (normal, shutdown or test)
    Mode {
        /// Operating mode
        #[arg(value_parser = parse_mode)]
        mode: Mode,

        /// Only change this device (1-based chain position, 0 for all)
        #[arg(short, long)]
        device: Option<u8>,
    },

    /// Set the display brightness (0-15)
    Intensity {
        /// Intensity level
        #[arg(value_parser = parse_intensity)]
        level: Intensity,

        /// Only change this device (1-based chain position, 0 for all)
        #[arg(short, long)]
        device: Option<u8>,
    },

    /// Select Code B decoding per digit
    Decode {
        /// "all", "none", or a digit bitmask (bit 0 is digit 1, e.g. 0x0F)
        #[arg(value_parser = parse_decode)]
        mask: DecodeMode,

        /// Only change this device (1-based chain position, 0 for all)
        #[arg(short, long)]
        device: Option<u8>,
    },

    /// Set how many digits are scanned (1-8)
    ScanLimit {
        /// Number of scanned digits
        digits: u8,

        /// Only change this device (1-based chain position, 0 for all)
        #[arg(short, long)]
        device: Option<u8>,
    },

    /// Write one digit of one device
    Digit {
        /// Device (1-based chain position)
        device: u8,

        /// Digit (1-8)
        digit: u8,

        /// Code B symbol (e.g. 7, E, "-", "3.") or raw value (e.g. 0x7E)
        #[arg(value_parser = parse_code)]
        value: u8,
    },

    /// Write the same value to every digit of every device
    Fill {
        /// Code B symbol or raw value
        #[arg(value_parser = parse_code)]
        value: u8,
    },

    /// Write a run of digits, continuing onto the next device after digit 8
    Write {
        /// First device of the run (1-based chain position)
        #[arg(short, long, default_value = "1")]
        device: u8,

        /// First digit of the run (1-8)
        #[arg(long, default_value = "1")]
        digit: u8,

        /// Values in run order (Code B symbols or raw values)
        #[arg(value_parser = parse_code, required = true)]
        values: Vec<u8>,
    },

    /// Annotate bytes captured on the bus
    Annotate {
        /// Captured bytes in hex, in transmission order (e.g. 0c 01 00 00)
        #[arg(value_parser = parse_bus_byte, required = true)]
        bytes: Vec<u8>,
    },

    /// List supported transports
    ListTransports,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code("7"), Ok(7));
        assert_eq!(parse_code("E."), Ok(0x8B));
        assert_eq!(parse_code("-"), Ok(0x0A));
        assert_eq!(parse_code("0x7E"), Ok(0x7E));
        assert_eq!(parse_code("12"), Ok(12));
        assert!(parse_code("Q").is_err());
        assert!(parse_code("0x100").is_err());
    }

    #[test]
    fn test_parse_decode() {
        assert_eq!(parse_decode("ALL"), Ok(DecodeMode::ALL));
        assert_eq!(parse_decode("none"), Ok(DecodeMode::NONE));
        assert_eq!(parse_decode("0x0F").map(|d| d.bits()), Ok(0x0F));
    }

    #[test]
    fn test_parse_bus_byte() {
        assert_eq!(parse_bus_byte("0c"), Ok(0x0C));
        assert_eq!(parse_bus_byte("0xFF"), Ok(0xFF));
        assert!(parse_bus_byte("zz").is_err());
    }

    #[test]
    fn test_parse_write_command() {
        let cli = Cli::try_parse_from([
            "maxchain", "-n", "2", "write", "--device", "1", "--digit", "7", "1", "2", "3.",
        ])
        .unwrap();
        assert_eq!(cli.chain.chain_length, 2);
        match cli.command {
            Commands::Write {
                device,
                digit,
                values,
            } => {
                assert_eq!((device, digit), (1, 7));
                assert_eq!(values, [1, 2, 0x83]);
            }
            _ => panic!("expected write"),
        }
    }
}
