//! Chain commands
//!
//! Each command targets one device when a chain position is given and
//! broadcasts to the whole chain otherwise. Position 0 also broadcasts.

use maxchain_core::chain::Target;
use maxchain_core::{ChainDriver, DecodeMode, Intensity, Mode};
use maxchain_transport::TransportHandle;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn target(device: Option<u8>) -> Target {
    device.map_or(Target::All, Target::from_chain_id)
}

/// Set the operating mode
pub fn run_mode(
    driver: &mut ChainDriver<TransportHandle>,
    mode: Mode,
    device: Option<u8>,
) -> CmdResult {
    match target(device) {
        Target::Device(chain_id) => driver.set_mode(chain_id, mode)?,
        Target::All => driver.set_chain_mode(mode)?,
    }
    log::info!("Mode set to {}", mode);
    Ok(())
}

/// Set the brightness
pub fn run_intensity(
    driver: &mut ChainDriver<TransportHandle>,
    intensity: Intensity,
    device: Option<u8>,
) -> CmdResult {
    match target(device) {
        Target::Device(chain_id) => driver.set_intensity(chain_id, intensity)?,
        Target::All => driver.set_chain_intensity(intensity)?,
    }
    let duty = driver.config().device_type.duty_cycle(intensity);
    log::info!("Intensity set to {} (duty cycle {})", intensity.level(), duty);
    Ok(())
}

/// Select Code B decoding
pub fn run_decode(
    driver: &mut ChainDriver<TransportHandle>,
    decode: DecodeMode,
    device: Option<u8>,
) -> CmdResult {
    match target(device) {
        Target::Device(chain_id) => driver.configure_decode(chain_id, decode)?,
        Target::All => driver.configure_chain_decode(decode)?,
    }
    log::info!("Decode mode set to 0b{:08b}", decode.bits());
    Ok(())
}

/// Set the number of scanned digits
pub fn run_scan_limit(
    driver: &mut ChainDriver<TransportHandle>,
    digits: u8,
    device: Option<u8>,
) -> CmdResult {
    match target(device) {
        Target::Device(chain_id) => driver.configure_scan_limit(chain_id, digits)?,
        Target::All => driver.configure_chain_scan_limit(digits)?,
    }
    log::info!("Scanning {} digits", digits);
    Ok(())
}

/// Write one digit of one device
pub fn run_digit(
    driver: &mut ChainDriver<TransportHandle>,
    chain_id: u8,
    digit: u8,
    code: u8,
) -> CmdResult {
    driver.set_digit(chain_id, digit, code)?;
    log::info!("Device {} digit {} set to 0x{:02X}", chain_id, digit, code);
    Ok(())
}

/// Write one value to every digit of every device
pub fn run_fill(driver: &mut ChainDriver<TransportHandle>, code: u8) -> CmdResult {
    driver.set_chain(code)?;
    log::info!("Every digit set to 0x{:02X}", code);
    Ok(())
}

/// Write a run of digits
pub fn run_write(
    driver: &mut ChainDriver<TransportHandle>,
    chain_id: u8,
    digit: u8,
    codes: &[u8],
) -> CmdResult {
    driver.write_digits(chain_id, digit, codes)?;
    log::info!(
        "Wrote {} digits starting at device {} digit {}",
        codes.len(),
        chain_id,
        digit
    );
    Ok(())
}

/// Print the emulated display state when running on the dummy transport
#[allow(unused_variables)]
pub fn print_state(driver: &ChainDriver<TransportHandle>) {
    #[cfg(feature = "dummy")]
    if let Some(chain) = driver.transport().and_then(TransportHandle::emulated) {
        chain.dump();
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use maxchain_core::{ChainConfig, DeviceType};
    use maxchain_transport::open_chain;

    fn driver(chain_length: u8) -> ChainDriver<TransportHandle> {
        let config = ChainConfig::new(chain_length, DeviceType::Max7219).with_chip_select(0);
        open_chain("dummy", &config).unwrap()
    }

    #[test]
    fn test_device_zero_broadcasts() {
        let mut driver = driver(3);
        run_mode(&mut driver, Mode::Normal, Some(0)).unwrap();
        let chain = driver.transport().and_then(TransportHandle::emulated).unwrap();
        assert!(chain.devices().iter().all(|d| !d.is_shutdown()));
    }

    #[test]
    fn test_device_targets_one_position() {
        let mut driver = driver(3);
        run_intensity(&mut driver, Intensity::MAX, Some(2)).unwrap();
        run_scan_limit(&mut driver, 4, None).unwrap();
        let chain = driver.transport().and_then(TransportHandle::emulated).unwrap();
        assert_eq!(chain.device(2).unwrap().intensity(), Intensity::MAX);
        assert_eq!(chain.device(1).unwrap().intensity(), Intensity::MIN);
        assert!(chain.devices().iter().all(|d| d.scanned_digits() == 4));
    }

    #[test]
    fn test_out_of_range_device_is_rejected() {
        let mut driver = driver(2);
        assert!(run_decode(&mut driver, DecodeMode::ALL, Some(3)).is_err());
    }
}
