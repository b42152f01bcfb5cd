//! Writes ch341-i2c.1 and one page per subcommand (ch341-i2c-run.1, ...)
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
#[path = "../adapters.rs"]
mod adapters;
#[path = "../cli.rs"]
mod cli;

fn render(man: clap_mangen::Man, path: &Path) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(path, buffer)?;
    println!("{}", path.display());
    Ok(())
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    for sub in cmd.get_subcommands() {
        let page = format!("{}-{}", name, sub.get_name());
        let man = clap_mangen::Man::new(sub.clone()).title(page.to_uppercase());
        render(man, &output_dir.join(format!("{}.1", page)))?;
    }
    render(
        clap_mangen::Man::new(cmd),
        &output_dir.join(format!("{}.1", name)),
    )
}
