//! Completions command implementation
//!
//! Handles `crazybuild completions`, which generates shell completion scripts for bash,
//! zsh, fish, etc.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io::Write;

/// Write the completion script for `shell` to `out`
///
/// `command` is the CLI definition, usually `Cli::command()`.
///
/// ```bash
/// # Bash
/// crazybuild completions bash > /etc/bash_completion.d/crazybuild
///
/// # Zsh
/// crazybuild completions zsh > ~/.zfunc/_crazybuild
///
/// # Fish
/// crazybuild completions fish > ~/.config/fish/completions/crazybuild.fish
/// ```
pub fn cmd_completions(shell: Shell, command: &mut Command, out: &mut dyn Write) {
    let bin_name = command.get_name().to_string();
    generate(shell, command, bin_name, out);
}
