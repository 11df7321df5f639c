//! Layouts directory path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the layouts directory.
pub const LAYOUTS_ENV_VAR: &str = "HDM_LAYOUTS_DIR";

/// Get the layouts root directory.
///
/// Resolution order:
/// 1. `HDM_LAYOUTS_DIR` environment variable
/// 2. `layouts/` directory relative to workspace root
pub fn default_layouts_root() -> PathBuf {
    if let Ok(root) = std::env::var(LAYOUTS_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../layouts")
}
