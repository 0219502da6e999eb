//! Init command implementation
//!
//! Handles `crazybuild init`, which writes a commented `.crazybuild.toml`.

use anyhow::Result;
use console::style;
use std::path::Path;

use crate::config::{self, ConfigLoader};
use crate::fmt::{emoji, INFO, SPARKLES, WARNING};

/// Create `.crazybuild.toml` in `project_root`
///
/// An existing file is left alone unless `force` is set.
///
/// # Examples
///
/// ```no_run
/// use crazybuild::cmd::init::cmd_init;
/// use std::path::Path;
///
/// cmd_init(Path::new("."), false)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn cmd_init(project_root: &Path, force: bool) -> Result<()> {
    if !force && ConfigLoader::exists(project_root) {
        println!(
            "{} Config file already exists: {}",
            emoji(WARNING),
            style(config::CONFIG_FILE_NAME).cyan()
        );
        println!("   Edit it directly, or run with --force to start over.");
        return Ok(());
    }

    let path = ConfigLoader::init(project_root, force)?;
    println!(
        "{} Created {}",
        emoji(SPARKLES),
        style(path.display()).cyan()
    );
    println!();
    println!("{} Next steps:", emoji(INFO));
    println!(
        "   {} Set {} to the program that builds one player",
        style("1.").dim(),
        style("[toolchain] command").bold()
    );
    println!(
        "   {} Add a {} entry for each scene",
        style("2.").dim(),
        style("[[scenes]]").bold()
    );
    println!(
        "   {} Run {}",
        style("3.").dim(),
        style("crazybuild build release").green()
    );
    Ok(())
}
