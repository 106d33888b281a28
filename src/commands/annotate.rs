//! Annotate captured bus traffic

use maxchain_core::chain::trace;
use maxchain_core::DeviceType;

/// Print what each device latches from one captured chip-select window
pub fn run_annotate(
    bytes: &[u8],
    chain_length: u8,
    device_type: DeviceType,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = trace::decode(bytes, chain_length, device_type)?;

    println!("{:<8} {:<12} Meaning", "Word", "Command");
    println!("{}", "-".repeat(48));
    for (index, entry) in entries.enumerate() {
        println!("{:<8} {:<12} {}", index, entry.command.to_string(), entry);
    }

    if bytes.len() != usize::from(chain_length) * 2 {
        log::warn!(
            "Captured {} words but the chain has {} devices",
            bytes.len() / 2,
            chain_length
        );
    }
    Ok(())
}
