//! ch341-i2c - Run I2C transactions through a CH341 adapter
//!
//! Transactions are entered as binary digit strings: a 7-bit device
//! address, an optional 8-bit register address, space-separated data
//! bytes and a read length. Named transactions ("commands") can be kept
//! in a CSV command file and run by name.

mod adapters;
mod cli;
mod commands;

use ch341_i2c_core::Request;
use clap::Parser;
use cli::{Cli, Commands, PresetCommands};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = dispatch(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run { adapter, request } => {
            let request = Request::from(request);
            let mut adapter = adapters::open_adapter(&adapter)?;
            let result = commands::cmd_run(adapter.as_mut(), &request);
            adapter.close();
            result.map(|_| ())
        }
        Commands::Exec {
            adapter,
            file,
            name,
        } => {
            let mut adapter = adapters::open_adapter(&adapter)?;
            let result = commands::cmd_exec(adapter.as_mut(), &file, &name);
            adapter.close();
            result.map(|_| ())
        }
        Commands::Presets(subcmd) => match subcmd {
            PresetCommands::List { file } => commands::presets::cmd_list(&file),
            PresetCommands::Show { file, name } => commands::presets::cmd_show(&file, &name),
            PresetCommands::Add {
                file,
                name,
                request,
                force,
                drop_invalid,
            } => commands::presets::cmd_add(
                &file,
                &name,
                &Request::from(request),
                force,
                drop_invalid,
            )
            .map(|_| ()),
            PresetCommands::Remove {
                file,
                name,
                drop_invalid,
            } => commands::presets::cmd_remove(&file, &name, drop_invalid),
            PresetCommands::Check { file } => commands::presets::cmd_check(&file).map(|_| ()),
            PresetCommands::SaveAs { file, output } => {
                commands::presets::cmd_save_as(&file, &output)
            }
        },
        Commands::Info { adapter } => {
            let mut adapter = adapters::open_adapter(&adapter)?;
            commands::cmd_info(adapter.as_ref());
            adapter.close();
            Ok(())
        }
        Commands::ListAdapters => {
            commands::list_adapters();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug_asserts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "ch341-i2c", "run", "-p", "dummy", "--address", "1010000", "-r", "100", "-n", "2",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { adapter, request } => {
                assert_eq!(adapter, "dummy");
                let request = Request::from(request);
                assert_eq!(request, Request::new("1010000", "100", "", 2, 1));
            }
            _ => panic!("expected run"),
        }
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_errors_use_display_text() {
        let run = |args: &[&str]| {
            let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
            dispatch(cli.command).unwrap_err().to_string()
        };

        assert_eq!(
            run(&["ch341-i2c", "run", "-p", "dummy", "-a", "10000000"]),
            "invalid device address (10000000)"
        );
        assert!(
            run(&["ch341-i2c", "run", "-p", "dummy", "-a", "0100010", "-n", "1"])
                .ends_with("please reconnect the CH341 device")
        );
    }

    #[test]
    fn test_parse_presets_add() {
        let cli = Cli::try_parse_from([
            "ch341-i2c", "-v", "presets", "add", "-f", "cmds.csv", "LED_ON", "--address", "1010",
            "-d", "11111111", "--force",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Presets(PresetCommands::Add { name, force, request, .. }) => {
                assert_eq!(name, "LED_ON");
                assert!(force);
                assert_eq!(request.data, "11111111");
                assert_eq!(request.speed, 1);
            }
            _ => panic!("expected presets add"),
        }
    }
}
