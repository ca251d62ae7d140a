//! `trigvis completions` — shell completion scripts.

use anyhow::Result;
use clap::{Args, Command};
use clap_complete::{generate, Shell};
use std::io;

/// Arguments for `trigvis completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: &CompletionsArgs, cmd: &mut Command) -> Result<()> {
    let name = cmd.get_name().to_string();
    generate(args.shell, cmd, name, &mut io::stdout());
    Ok(())
}
