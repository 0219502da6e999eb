//! Command handlers for the crazybuild CLI
//!
//! Each submodule handles one CLI command; `workflow` holds the project wiring they share.

pub mod analyze;
pub mod build;
pub mod completions;
pub mod fix;
pub mod init;
pub mod workflow;

pub use analyze::{cmd_analyze, listing_filter};
pub use build::{cmd_build, ProgressObserver};
pub use completions::cmd_completions;
pub use fix::{cmd_fix, parse_texture_size, FixTarget};
pub use init::cmd_init;
pub use workflow::{BuildWorkflow, ProjectContext};
