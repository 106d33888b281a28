//! Transport registry and initialization
//!
//! This module handles opening transports by name and attaching a chain
//! driver to them.

use crate::handle::TransportHandle;
use maxchain_core::{ChainConfig, ChainDriver};
use std::collections::HashMap;

/// Parsed transport parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportParams {
    /// Transport name
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl TransportParams {
    /// Parameters as borrowed pairs, the form transport crates accept
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a transport string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_transport_params("linux_spi:dev=/dev/spidev0.0")?;
/// assert_eq!(params.name, "linux_spi");
/// assert_eq!(params.params.get("dev"), Some(&"/dev/spidev0.0".to_string()));
/// ```
pub fn parse_transport_params(s: &str) -> Result<TransportParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(TransportParams {
        name: name.to_string(),
        params,
    })
}

/// Open a transport for a chain described by `config`
///
/// # Arguments
/// * `transport` - Transport specification (e.g., "dummy" or "linux_spi:dev=/dev/spidev0.0")
/// * `config` - Chain the transport will carry
#[allow(unused_variables)]
pub fn open_transport(
    transport: &str,
    config: &ChainConfig,
) -> Result<TransportHandle, Box<dyn std::error::Error>> {
    let params = parse_transport_params(transport)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params, config),

        #[cfg(feature = "linux-spi")]
        "linux_spi" | "linux-spi" | "spidev" => open_linux_spi(&params),

        _ => Err(format!("Unknown transport: {}", params.name).into()),
    }
}

/// Open a transport and attach a chain driver to it
///
/// This is the main entry point for the CLI. It handles:
/// 1. Parsing the transport string
/// 2. Opening the appropriate transport
/// 3. Validating the configuration and attaching the chain
pub fn open_chain(
    transport: &str,
    config: &ChainConfig,
) -> Result<ChainDriver<TransportHandle>, Box<dyn std::error::Error>> {
    let handle = open_transport(transport, config)?;
    Ok(ChainDriver::init(*config, handle)?)
}

#[cfg(feature = "dummy")]
fn open_dummy(
    params: &TransportParams,
    config: &ChainConfig,
) -> Result<TransportHandle, Box<dyn std::error::Error>> {
    use maxchain_dummy::{DummyChain, DummyConfig};

    for key in params.params.keys() {
        log::warn!("dummy: Unknown option: {}", key);
    }

    log::info!(
        "Using emulated chain of {} x {}",
        config.chain_length,
        config.device_type
    );
    Ok(TransportHandle::Dummy(DummyChain::new(DummyConfig {
        chain_length: config.chain_length,
        device_type: config.device_type,
    })))
}

#[cfg(feature = "linux-spi")]
fn open_linux_spi(params: &TransportParams) -> Result<TransportHandle, Box<dyn std::error::Error>> {
    let transport = maxchain_linux_spi::open_linux_spi(&params.options())?;
    Ok(TransportHandle::Boxed(transport))
}

// Transport information and listing

/// Information about a transport
pub struct TransportInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available transports (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "dummy")]
    transports.push(TransportInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory emulated chain for testing",
    });

    #[cfg(feature = "linux-spi")]
    transports.push(TransportInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux SPI device via spidev interface (dev=/dev/spidevX.Y)",
    });

    transports
}

/// Generate a short list of transport names for CLI help
pub fn transport_names_short() -> String {
    let transports = available_transports();
    if transports.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = transports.iter().map(|t| t.name).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxchain_core::DeviceType;

    #[test]
    fn test_parse_name_only() {
        let params = parse_transport_params("dummy").unwrap();
        assert_eq!(params.name, "dummy");
        assert!(params.params.is_empty());
    }

    #[test]
    fn test_parse_with_params() {
        let params = parse_transport_params("linux_spi:dev=/dev/spidev0.1,extra=1").unwrap();
        assert_eq!(params.name, "linux_spi");
        assert_eq!(
            params.params.get("dev").map(String::as_str),
            Some("/dev/spidev0.1")
        );
        assert_eq!(params.options().len(), 2);
    }

    #[test]
    fn test_parse_rejects_bare_option() {
        assert!(parse_transport_params("linux_spi:dev").is_err());
    }

    #[test]
    fn test_unknown_transport() {
        let config = ChainConfig::new(1, DeviceType::Max7219).with_chip_select(0);
        let err = open_transport("bogus", &config).err().unwrap();
        assert_eq!(err.to_string(), "Unknown transport: bogus");
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_chain() {
        use maxchain_core::Mode;

        let config = ChainConfig::new(3, DeviceType::Max7221).with_chip_select(0);
        let mut driver = open_chain("dummy", &config).unwrap();
        driver.set_mode(2, Mode::Normal).unwrap();
        let chain = driver.transport().and_then(TransportHandle::emulated).unwrap();
        assert!(!chain.device(2).unwrap().is_shutdown());
        assert!(chain.device(1).unwrap().is_shutdown());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_chain_validates_config() {
        let config = ChainConfig::new(3, DeviceType::Max7219);
        let err = open_chain("dummy", &config).err().unwrap();
        assert_eq!(err.to_string(), "no chip-select line configured");
    }
}
