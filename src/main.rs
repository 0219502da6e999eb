use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process;

use crazybuild::analyzer::MaxTextureSize;
use crazybuild::cmd;
use crazybuild::cmd::FixTarget;
use crazybuild::pipeline::BuildVariant;

/// WebGL build orchestrator and build-size analyzer
///
/// crazybuild runs portal-ready WebGL builds through your build toolchain, restores player
/// settings afterwards, and suggests import settings that shrink the build.
#[derive(Parser)]
#[command(name = "crazybuild", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable emoji output (useful for CI/CD or accessibility)
    #[arg(long, global = true)]
    no_emoji: bool,

    /// Project root containing .crazybuild.toml
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the player and produce the portal artifacts
    Build {
        /// Build variant
        #[arg(value_enum)]
        variant: BuildVariant,

        /// Also produce ASTC textures and memory-capped wasm for mobile browsers
        #[arg(long)]
        mobile: bool,

        /// Skip the analysis printed after a Release build
        #[arg(long)]
        no_analyze: bool,
    },

    /// Analyze the last Release build
    Analyze {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// List packaged files outside Assets/ too
        #[arg(long)]
        all_assets: bool,

        /// List packaged files smaller than 1 KB too
        #[arg(long)]
        include_small: bool,
    },

    /// Apply one analyzer suggestion to an asset
    Fix {
        /// Suggestion to apply
        #[arg(value_enum)]
        target: FixTarget,

        /// Project-relative asset path, as listed by `analyze`
        #[arg(value_name = "PATH")]
        path: String,

        /// Max imported size for texture-size (1024 or 512)
        #[arg(long, default_value = "1024", value_parser = cmd::parse_texture_size)]
        size: MaxTextureSize,
    },

    /// Create .crazybuild.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // RUST_LOG controls verbosity
    env_logger::init();

    let cli = Cli::parse();

    if cli.no_emoji {
        std::env::set_var("NO_EMOJI", "1");
    }

    let root = cli.project_dir.as_path();
    let result = match &cli.command {
        Some(Commands::Build {
            variant,
            mobile,
            no_analyze,
        }) => cmd::cmd_build(root, *variant, *mobile, *no_analyze),
        Some(Commands::Analyze {
            json,
            all_assets,
            include_small,
        }) => cmd::cmd_analyze(root, *json, cmd::listing_filter(*all_assets, *include_small)),
        Some(Commands::Fix { target, path, size }) => {
            cmd::cmd_fix(root, *target, path, *size).map(|_| ())
        }
        Some(Commands::Init { force }) => cmd::cmd_init(root, *force),
        Some(Commands::Completions { shell }) => {
            cmd::cmd_completions(*shell, &mut Cli::command(), &mut std::io::stdout());
            Ok(())
        }
        None => {
            println!("crazybuild v{}", env!("CARGO_PKG_VERSION"));
            println!("WebGL build orchestrator and build-size analyzer\n");
            println!("Usage: crazybuild <COMMAND>\n");
            println!("Commands:");
            println!("  build        Build the player and produce the portal artifacts");
            println!("  analyze      Analyze the last Release build");
            println!("  fix          Apply one analyzer suggestion to an asset");
            println!("  init         Create .crazybuild.toml");
            println!("  completions  Generate shell completions");
            println!("\nRun 'crazybuild <COMMAND> --help' for more information on a command.");
            Ok(())
        }
    };

    if let Err(e) = result {
        use crazybuild::error::ErrorFormatter;
        eprintln!("{}", ErrorFormatter::format(&e));
        process::exit(ErrorFormatter::exit_code(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_fix_size_defaults_to_1024() {
        let cli = Cli::try_parse_from(["crazybuild", "fix", "texture-size", "Assets/a.png"]).unwrap();
        match cli.command {
            Some(Commands::Fix { size, target, .. }) => {
                assert_eq!(size, MaxTextureSize::S1024);
                assert_eq!(target, FixTarget::TextureSize);
            }
            _ => panic!("expected fix command"),
        }
    }

    #[test]
    fn test_fix_rejects_unsupported_size() {
        assert!(Cli::try_parse_from([
            "crazybuild",
            "fix",
            "texture-size",
            "Assets/a.png",
            "--size",
            "256"
        ])
        .is_err());
    }
}
