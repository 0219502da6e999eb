//! Packaged-file listing

use crate::report::PackagedFileSummary;

/// Files smaller than this are hidden by default
pub const SMALL_ASSET_BYTES: u64 = 1024;

/// Which packaged files to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackagedFileFilter {
    /// Hide files below [`SMALL_ASSET_BYTES`]
    pub exclude_small: bool,
    /// Only list files under `Assets/`
    pub assets_only: bool,
}

impl Default for PackagedFileFilter {
    fn default() -> Self {
        Self {
            exclude_small: true,
            assets_only: true,
        }
    }
}

impl PackagedFileFilter {
    /// Filter that lists everything
    pub const ALL: Self = Self {
        exclude_small: false,
        assets_only: false,
    };

    /// True when `file` passes the filter
    pub fn matches(&self, file: &PackagedFileSummary) -> bool {
        (!self.exclude_small || file.size >= SMALL_ASSET_BYTES)
            && (!self.assets_only || file.path.starts_with("Assets/"))
    }

    /// Files passing the filter, in their original order
    pub fn apply<'a>(&self, files: &'a [PackagedFileSummary]) -> Vec<&'a PackagedFileSummary> {
        files.iter().filter(|f| self.matches(f)).collect()
    }
}
