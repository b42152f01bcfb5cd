//! Command file management

use std::path::Path;

use ch341_i2c_core::{AddOutcome, Command, Error, LoadReport, Request, Workspace};

type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open a command file, logging any records that failed to load
fn open(file: &Path) -> CmdResult<Workspace> {
    let (workspace, report) = Workspace::open(file)?;
    if report.is_clean() {
        log::debug!("{}", report);
    } else {
        log::warn!("{}", report);
    }
    Ok(workspace)
}

/// Open a command file that is about to be rewritten
///
/// Rewriting drops records that failed to load, so this only proceeds when
/// every record loaded or the caller agreed to lose the rejected ones.
fn open_for_edit(file: &Path, drop_invalid: bool) -> CmdResult<Workspace> {
    let (workspace, report) = Workspace::open(file)?;
    if report.is_clean() {
        return Ok(workspace);
    }
    if !drop_invalid {
        return Err(format!(
            "{}
Refusing to rewrite {}; fix these records or pass --drop-invalid",
            report,
            file.display()
        )
        .into());
    }

    println!("{}", report);
    println!("Dropping {} invalid command(s)", report.rejected.len());
    Ok(workspace)
}

fn print_command(command: &Command) {
    println!("Name:        {}", command.name);
    println!("Address:     {}", command.address);
    println!(
        "Register:    {}",
        if command.register.is_empty() { "-" } else { command.register.as_str() }
    );
    println!(
        "Data:        {}",
        if command.data.is_empty() { "-" } else { command.data.as_str() }
    );
    println!("Read length: {}", command.read_length);
    println!("Speed:       {} ({})", command.speed.mode(), command.speed);
}

/// List the commands in a file
pub fn cmd_list(file: &Path) -> CmdResult {
    let workspace = open(file)?;
    let store = workspace.store();

    if store.is_empty() {
        println!("No commands in {}", file.display());
        return Ok(());
    }

    println!(
        "{:<20} {:<8} {:<9} {:>6} {:>8}  Data",
        "Name", "Address", "Register", "Read", "Speed"
    );
    println!("{}", "-".repeat(70));
    for command in store.iter() {
        println!(
            "{:<20} {:<8} {:<9} {:>6} {:>8}  {}",
            command.name,
            command.address,
            command.register,
            command.read_length,
            command.speed.to_string(),
            command.data
        );
    }
    Ok(())
}

/// Show one command
pub fn cmd_show(file: &Path, name: &str) -> CmdResult {
    let workspace = open(file)?;
    let command = workspace
        .store()
        .get(name)
        .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;
    print_command(command);
    Ok(())
}

/// Add a command, creating the file when it does not exist yet
pub fn cmd_add(
    file: &Path,
    name: &str,
    request: &Request,
    force: bool,
    drop_invalid: bool,
) -> CmdResult<AddOutcome> {
    let mut workspace = if file.exists() {
        open_for_edit(file, drop_invalid)?
    } else {
        log::info!("Creating new command file {}", file.display());
        Workspace::new()
    };

    let outcome = workspace.add(name, request, force)?;
    workspace.save_as(file)?;

    match outcome {
        AddOutcome::Inserted => println!("Added \"{}\"", name),
        AddOutcome::Replaced => println!("Replaced \"{}\"", name),
    }
    Ok(outcome)
}

/// Delete a command
pub fn cmd_remove(file: &Path, name: &str, drop_invalid: bool) -> CmdResult {
    let mut workspace = open_for_edit(file, drop_invalid)?;
    if !workspace.remove(name) {
        return Err(Error::CommandNotFound(name.to_string()).into());
    }
    workspace.save()?;
    println!("Deleted \"{}\"", name);
    Ok(())
}

/// Load a file and report every record that fails validation
pub fn cmd_check(file: &Path) -> CmdResult<LoadReport> {
    let (_, report) = Workspace::open(file)?;
    println!("{}", report);
    if report.is_clean() {
        Ok(report)
    } else {
        Err(format!("{} command(s) failed to load", report.rejected.len()).into())
    }
}

/// Write the loadable commands of `file` to `output`
pub fn cmd_save_as(file: &Path, output: &Path) -> CmdResult {
    let mut workspace = open(file)?;
    workspace.save_as(output)?;
    println!(
        "Saved {} command(s) to {}",
        workspace.store().len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ch341_i2c_core::csv::HEADER;
    use ch341_i2c_core::ValidationError;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(tag: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "ch341-i2c-presets-{}-{}-{}.csv",
            tag,
            std::process::id(),
            n
        ))
    }

    #[test]
    fn test_add_creates_file() {
        let path = temp_path("add");
        let led = Request::new("1010", "", "11111111", 0, 1);

        assert_eq!(cmd_add(&path, "LED_ON", &led, false, false).unwrap(), AddOutcome::Inserted);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(HEADER));
        assert!(text.contains("LED_ON,0001010,,11111111,0,1"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_add_needs_force_to_replace() {
        let path = temp_path("force");
        let first = Request::new("1", "", "1", 0, 1);
        let second = Request::new("10", "", "10", 0, 1);

        cmd_add(&path, "A", &first, false, false).unwrap();
        let err = cmd_add(&path, "A", &second, false, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::DuplicateName(_))
        ));

        assert_eq!(cmd_add(&path, "A", &second, true, false).unwrap(), AddOutcome::Replaced);
        let (workspace, _) = Workspace::open(&path).unwrap();
        assert_eq!(workspace.store().get("A").unwrap().address, "0000010");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_remove() {
        let path = temp_path("remove");
        cmd_add(&path, "A", &Request::new("1", "", "1", 0, 1), false, false).unwrap();

        cmd_remove(&path, "A", false).unwrap();
        let (workspace, _) = Workspace::open(&path).unwrap();
        assert!(workspace.store().is_empty());

        assert!(cmd_remove(&path, "A", false).is_err());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_check_and_save_as_drop_bad_records() {
        let path = temp_path("check");
        let output = temp_path("check-out");
        std::fs::write(
            &path,
            format!("{}\nGOOD,1,,1,0,1\nBAD,102,,1,0,1\n", HEADER),
        )
        .unwrap();

        assert!(cmd_check(&path).is_err());

        cmd_save_as(&path, &output).unwrap();
        let report = cmd_check(&output).unwrap();
        assert_eq!(report.inserted, 1);

        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_edit_keeps_invalid_records_unless_asked() {
        let path = temp_path("edit");
        let original = format!("{}\nGOOD,1,,1,0,1\nBAD,102,,1,0,1", HEADER);
        std::fs::write(&path, &original).unwrap();
        let led = Request::new("1010", "", "11111111", 0, 1);

        assert!(cmd_add(&path, "LED_ON", &led, false, false).is_err());
        assert!(cmd_remove(&path, "GOOD", false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);

        cmd_add(&path, "LED_ON", &led, false, true).unwrap();
        let (workspace, report) = Workspace::open(&path).unwrap();
        assert!(report.is_clean());
        let names: Vec<_> = workspace.store().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["GOOD", "LED_ON"]);

        cmd_remove(&path, "GOOD", false).unwrap();

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let path = temp_path("missing");
        assert!(cmd_list(&path).is_err());
        assert!(cmd_show(&path, "A").is_err());
    }
}
