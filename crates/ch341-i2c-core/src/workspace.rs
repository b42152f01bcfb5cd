//! Application state around a command store
//!
//! A [`Workspace`] owns the command store together with the file it was
//! loaded from and an unsaved-changes flag. Adding or removing commands
//! marks it dirty; loading and saving mark it clean.

use crate::adapter::{self, I2cAdapter};
use crate::command::Request;
use crate::csv::LineOutcome;
use crate::error::{Error, Result, ValidationError};
use crate::store::{AddOutcome, CommandStore};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Summary of a command file load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of commands loaded
    pub inserted: usize,
    /// Rejected records as (name, reason)
    pub rejected: Vec<(String, ValidationError)>,
}

impl LoadReport {
    /// Build a report from per-line outcomes
    pub fn from_outcomes(outcomes: Vec<LineOutcome>) -> Self {
        let mut report = Self::default();
        for outcome in outcomes {
            match outcome {
                LineOutcome::Inserted(_) => report.inserted += 1,
                LineOutcome::Rejected { name, reason, .. } => report.rejected.push((name, reason)),
            }
        }
        report
    }

    /// True if every record was loaded
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Loaded {} command(s)", self.inserted)?;
        if !self.rejected.is_empty() {
            write!(f, "\nFailed to load these commands:")?;
            for (name, reason) in &self.rejected {
                write!(f, "\n\"{}\" ({})", name, reason)?;
            }
        }
        Ok(())
    }
}

/// Command store plus its backing file and unsaved-changes flag
#[derive(Debug, Default)]
pub struct Workspace {
    store: CommandStore,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Workspace {
    /// Create an empty workspace with no associated file
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a command file
    ///
    /// Invalid records are skipped and listed in the returned report.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, LoadReport)> {
        let mut workspace = Self::new();
        let report = workspace.reload(path)?;
        Ok((workspace, report))
    }

    /// Replace the current commands with the contents of a command file
    ///
    /// If the file cannot be read the workspace is left untouched.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        log::info!("Opening command file {}", path.display());

        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.store.clear();
        let report = LoadReport::from_outcomes(self.store.load_csv(&text));
        self.path = Some(path.to_path_buf());
        self.dirty = false;

        if !report.is_clean() {
            log::warn!("{} command(s) could not be loaded", report.rejected.len());
        }
        Ok(report)
    }

    /// The command store
    pub fn store(&self) -> &CommandStore {
        &self.store
    }

    /// File the workspace was loaded from or last saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True if there are changes not yet written to disk
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Add a command
    ///
    /// An existing command with the same name is only replaced when
    /// `overwrite` is set; otherwise the add fails with
    /// [`ValidationError::DuplicateName`].
    pub fn add(
        &mut self,
        name: &str,
        request: &Request,
        overwrite: bool,
    ) -> std::result::Result<AddOutcome, ValidationError> {
        if !overwrite && self.store.contains(name) {
            return Err(ValidationError::DuplicateName(name.to_string()));
        }

        let outcome = self.store.add(name, request)?;
        self.dirty = true;
        log::info!("Added command \"{}\"", name);
        Ok(outcome)
    }

    /// Delete a command, returning whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.store.remove(name);
        if removed {
            self.dirty = true;
            log::info!("Deleted command \"{}\"", name);
        }
        removed
    }

    /// Write unsaved changes back to the associated file
    ///
    /// Returns `false` without writing when there is no associated file or
    /// nothing has changed.
    pub fn save(&mut self) -> Result<bool> {
        let Some(path) = self.path.clone() else {
            return Ok(false);
        };
        if !self.dirty {
            return Ok(false);
        }

        self.write_to(&path)?;
        self.dirty = false;
        Ok(true)
    }

    /// Write all commands to `path` and make it the associated file
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        log::info!("Saving {} command(s) to {}", self.store.len(), path.display());
        fs::write(path, self.store.to_csv()).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Run a stored command on an adapter, returning the bytes read
    pub fn run<A: I2cAdapter + ?Sized>(&self, name: &str, adapter: &mut A) -> Result<Vec<u8>> {
        let command = self
            .store
            .get(name)
            .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;

        let (tx, speed) = command.to_request().to_transaction()?;
        log::info!("Running command \"{}\"", name);
        Ok(adapter::execute(adapter, &tx, speed)?)
    }
}

/// Validate a request and run it on an adapter, returning the bytes read
///
/// Nothing is sent to the adapter if validation fails.
pub fn run_request<A: I2cAdapter + ?Sized>(request: &Request, adapter: &mut A) -> Result<Vec<u8>> {
    let (tx, speed) = request.to_transaction()?;
    Ok(adapter::execute(adapter, &tx, speed)?)
}
