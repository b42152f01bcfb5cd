//! CLI command implementations
//!
//! Every handler takes an already opened adapter or a command file path,
//! prints its results to stdout and reports failures as boxed errors.

mod info;
pub mod presets;
mod run;

pub use info::{cmd_info, list_adapters};
pub use run::{cmd_exec, cmd_run};

use ch341_i2c_core::Request;

use crate::cli::RequestArgs;

impl From<RequestArgs> for Request {
    fn from(args: RequestArgs) -> Self {
        Request::new(
            args.address,
            args.register,
            args.data,
            args.read_length,
            args.speed,
        )
    }
}
