//! plugdoc — regenerate a Neovim plugin's documentation from its Lua sources.
//!
//! Reads LuaCATS annotations (`---@param`, `---@return`, `---@class`, …) and
//! rewrites the generated regions of the README, the vimdoc help file and
//! the lazy API stubs in the plugin's init module.
//!
//! - `plugdoc` — update files in place
//! - `plugdoc --check` — exit 1 if any file is out of date

mod config;
mod error;
mod generate;
mod logging;
mod model;
mod parser;
mod render;
mod section;
mod toc;
mod workspace;

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "plugdoc",
    about = "Regenerate README, vimdoc and API stubs from annotated Lua sources"
)]
struct Cli {
    /// Plugin root directory
    #[arg(short = 'C', long, default_value = ".")]
    root: PathBuf,

    /// Layout file (default: <root>/plugdoc.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report out-of-date files instead of writing them
    #[arg(long)]
    check: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let layout = config::Layout::load(&cli.root, cli.config.as_deref())?;
    let changed = generate::generate(&cli.root, &layout, cli.check)?;

    if cli.check {
        if changed.is_empty() {
            return Ok(ExitCode::SUCCESS);
        }
        for path in &changed {
            eprintln!("out of date: {}", path.display());
        }
        return Ok(ExitCode::FAILURE);
    }

    if changed.is_empty() {
        tracing::info!("documentation up to date");
    }
    Ok(ExitCode::SUCCESS)
}
