//! Transaction commands

use std::path::Path;

use ch341_i2c_core::bits::format_bytes;
use ch341_i2c_core::{run_request, I2cAdapter, Request, Workspace};

/// Run a single transaction built from command line fields
pub fn cmd_run(
    adapter: &mut dyn I2cAdapter,
    request: &Request,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let data = run_request(request, adapter)?;
    print_read(&data);
    Ok(data)
}

/// Run a command stored in a command file
pub fn cmd_exec(
    adapter: &mut dyn I2cAdapter,
    file: &Path,
    name: &str,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let (workspace, report) = Workspace::open(file)?;
    if !report.is_clean() {
        log::warn!("{}", report);
    }

    let data = workspace.run(name, adapter)?;
    print_read(&data);
    Ok(data)
}

fn print_read(data: &[u8]) {
    if data.is_empty() {
        println!("Transaction complete");
    } else {
        println!("Read {} byte(s):", data.len());
        println!("{}", format_bytes(data));
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use ch341_i2c_core::{Error, ValidationError};
    use ch341_i2c_dummy::DummyBus;

    #[test]
    fn test_run_write_then_read() {
        let mut bus = DummyBus::new_default();

        let write = Request::new("1010000", "00000100", "1 10 11", 0, 2);
        assert!(cmd_run(&mut bus, &write).unwrap().is_empty());

        let read = Request::new("1010000", "00000100", "", 3, 1);
        assert_eq!(cmd_run(&mut bus, &read).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_run_rejects_before_touching_the_bus() {
        let mut bus = DummyBus::new_default();
        let err = cmd_run(&mut bus, &Request::new("10000000", "", "", 1, 1)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Validation(ValidationError::InvalidAddress(_)))
        ));
        assert!(bus.transfers().is_empty());
    }

    #[test]
    fn test_exec_missing_command() {
        let path = std::env::temp_dir().join(format!("ch341-i2c-exec-{}.csv", std::process::id()));
        let mut workspace = Workspace::new();
        workspace
            .add("PING", &Request::new("1010000", "", "", 1, 1), false)
            .unwrap();
        workspace.save_as(&path).unwrap();

        let mut bus = DummyBus::new_default();
        assert_eq!(cmd_exec(&mut bus, &path, "PING").unwrap(), vec![0xFF]);

        let err = cmd_exec(&mut bus, &path, "PONG").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::CommandNotFound(name)) if name == "PONG"
        ));

        std::fs::remove_file(&path).unwrap();
    }
}
