//! Shell completion scripts.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::{Cli, Shell};
use crate::error::Result;

/// Print the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns an I/O error if stdout is closed.
pub fn execute(shell: &Shell) -> Result<()> {
    write_script(shell, &mut io::stdout().lock())?;
    Ok(())
}

fn write_script<W: Write>(shell: &Shell, out: &mut W) -> io::Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(generator(shell), &mut cmd, bin_name, out);
    out.flush()
}

const fn generator(shell: &Shell) -> clap_complete::Shell {
    match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    }
}
