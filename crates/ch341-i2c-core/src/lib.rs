//! ch341-i2c-core - Core library for CH341 I2C tooling
//!
//! This crate holds everything that does not touch hardware:
//!
//! - [`bits`] - validation and normalisation of binary-digit strings
//! - [`command`] - named command presets and ad-hoc requests
//! - [`store`] - the in-memory command store
//! - [`csv`] - the CSV file format used to persist command stores
//! - [`transaction`] - byte-level encoding of I2C transactions
//! - [`adapter`] - the [`I2cAdapter`] trait implemented by hardware drivers
//! - [`workspace`] - the application state (store, file path, unsaved flag)
//!
//! # Example
//!
//! ```
//! use ch341_i2c_core::{CommandStore, Request};
//!
//! let mut store = CommandStore::new();
//! store.add("LED_ON", &Request::new("1010", "", "11111111", 0, 1))?;
//!
//! let csv = store.to_csv();
//! assert!(csv.ends_with("LED_ON,0001010,,11111111,0,1"));
//! # Ok::<(), ch341_i2c_core::ValidationError>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod bits;
pub mod command;
pub mod csv;
pub mod error;
pub mod store;
pub mod transaction;
pub mod workspace;

pub use adapter::{execute, BusSpeed, I2cAdapter, Versions};
pub use command::{Command, Request};
pub use csv::LineOutcome;
pub use error::{DriverError, Error, Result, ValidationError};
pub use store::{AddOutcome, CommandStore};
pub use transaction::I2cTransaction;
pub use workspace::{run_request, LoadReport, Workspace};
