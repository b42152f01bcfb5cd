//! Adapter information commands

use ch341_i2c_core::I2cAdapter;

use crate::adapters::available_adapters;

/// Print the opened adapter's description and versions
pub fn cmd_info(adapter: &dyn I2cAdapter) {
    let versions = adapter.versions();

    println!("Adapter:         {}", adapter.description());
    println!("Driver version:  {}", versions.driver);
    println!("Library version: {}", versions.library);
    println!("Tool version:    {}", env!("CARGO_PKG_VERSION"));
}

/// List compiled-in adapters and any attached CH341A devices
pub fn list_adapters() {
    println!("Supported adapters:");
    println!();
    for a in available_adapters() {
        if a.aliases.is_empty() {
            println!("  {:8} - {}", a.name, a.description);
        } else {
            println!(
                "  {:8} - {} (aliases: {})",
                a.name,
                a.description,
                a.aliases.join(", ")
            );
        }
    }

    #[cfg(feature = "ch341a")]
    {
        println!();
        match ch341_i2c_ch341a::Ch341a::list_devices() {
            Ok(devices) if devices.is_empty() => println!("No CH341A devices found"),
            Ok(devices) => {
                println!("Attached CH341A devices:");
                for device in devices {
                    println!("  {}", device);
                }
            }
            Err(e) => log::warn!("Failed to enumerate USB devices: {}", e),
        }
    }
}
