//! List commands implementation

use maxchain_transport::available_transports;

/// List all transports compiled into this binary
pub fn list_transports() {
    println!("Supported transports:");
    println!();
    for transport in available_transports() {
        println!("  {:<10} - {}", transport.name, transport.description);
        if !transport.aliases.is_empty() {
            println!("  {:<10}   aliases: {}", "", transport.aliases.join(", "));
        }
    }
}
