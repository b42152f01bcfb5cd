//! Adapter registration and dispatch
//!
//! Adapters are selected with a string of the form `name` or
//! `name:key=value,key=value`, e.g. `ch341a:index=1`.

use ch341_i2c_core::I2cAdapter;

/// Information about an adapter
pub struct AdapterInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all adapters enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_adapters() -> Vec<AdapterInfo> {
    let mut adapters = Vec::new();

    #[cfg(feature = "dummy")]
    adapters.push(AdapterInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory I2C bus with register devices at 0x0A and 0x50",
    });

    #[cfg(feature = "ch341a")]
    adapters.push(AdapterInfo {
        name: "ch341a",
        aliases: &["ch341", "ch341a_i2c"],
        description: "CH341A USB I2C adapter (VID:1a86 PID:5512) (index=<n>)",
    });

    adapters
}

/// Generate help text listing all available adapters
pub fn adapter_help() -> String {
    let adapters = available_adapters();

    if adapters.is_empty() {
        return "No adapters available (recompile with adapter features enabled)".to_string();
    }

    let mut help = String::from("Available adapters:\n");
    for a in &adapters {
        help.push_str(&format!("  {:8} - {}\n", a.name, a.description));
    }
    help
}

/// Generate a short list of adapter names for CLI help
pub fn adapter_names_short() -> String {
    let adapters = available_adapters();
    let names: Vec<&str> = adapters.iter().map(|a| a.name).collect();
    names.join(", ")
}

/// Resolve a name or alias to the adapter's primary name
pub fn find_adapter(name: &str) -> Option<&'static str> {
    available_adapters()
        .into_iter()
        .find(|a| a.name == name || a.aliases.contains(&name))
        .map(|a| a.name)
}

/// Parse an adapter string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_adapter_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Parse the `index=<n>` option, defaulting to the first device
#[cfg_attr(not(feature = "ch341a"), allow(dead_code))]
fn parse_index(options: &[(&str, &str)]) -> Result<usize, Box<dyn std::error::Error>> {
    match options.iter().find(|(k, _)| *k == "index") {
        Some((_, v)) => v
            .parse()
            .map_err(|_| format!("Invalid device index: {}", v).into()),
        None => Ok(0),
    }
}

/// Open the adapter named by `adapter`
pub fn open_adapter(adapter: &str) -> Result<Box<dyn I2cAdapter>, Box<dyn std::error::Error>> {
    let (name, options) = parse_adapter_string(adapter);

    let canonical_name = match find_adapter(name) {
        Some(n) => n,
        None => return Err(unknown_adapter_error(name)),
    };

    for (key, _) in options.iter().filter(|(k, _)| *k != "index") {
        log::warn!("Ignoring unknown adapter option '{}'", key);
    }

    match canonical_name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            log::debug!("Opening dummy I2C bus");
            Ok(Box::new(ch341_i2c_dummy::DummyBus::new_default()))
        }

        #[cfg(feature = "ch341a")]
        "ch341a" => {
            let index = parse_index(&options)?;
            log::info!("Opening CH341A #{}...", index);
            let device = ch341_i2c_ch341a::Ch341a::open_nth(index).map_err(|e| {
                format!(
                    "Failed to open CH341A: {}\nMake sure the device is connected and you have permissions.",
                    e
                )
            })?;
            Ok(Box::new(device))
        }

        _ => Err(unknown_adapter_error(name)),
    }
}

fn unknown_adapter_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown adapter: {}\n\n", name);
    msg.push_str(&adapter_help());
    msg.push_str("\nUse 'ch341-i2c list-adapters' for more details");
    msg.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_adapter_string() {
        assert_eq!(parse_adapter_string("dummy"), ("dummy", vec![]));
        assert_eq!(
            parse_adapter_string("ch341a:index=1,foo=bar"),
            ("ch341a", vec![("index", "1"), ("foo", "bar")])
        );
        assert_eq!(parse_adapter_string("ch341a:junk"), ("ch341a", vec![]));
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index(&[]).unwrap(), 0);
        assert_eq!(parse_index(&[("index", "3")]).unwrap(), 3);
        assert!(parse_index(&[("index", "x")]).is_err());
    }

    #[test]
    fn test_unknown_adapter() {
        let err = open_adapter("buspirate").err().unwrap();
        assert!(err.to_string().contains("Unknown adapter: buspirate"));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy() {
        assert_eq!(find_adapter("dummy"), Some("dummy"));
        let adapter = open_adapter("dummy").unwrap();
        assert!(!adapter.description().is_empty());
    }

    #[cfg(feature = "ch341a")]
    #[test]
    fn test_ch341a_aliases() {
        assert_eq!(find_adapter("ch341"), Some("ch341a"));
        assert_eq!(find_adapter("ch341a_i2c"), Some("ch341a"));
    }
}
