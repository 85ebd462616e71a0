//! Host platform utility functions

use std::path::PathBuf;

/// Get the root directory of the software installation.
///
/// The root is given by the `AUTOCAR_SW_ROOT` environment variable, and is
/// used to resolve parameter files and session directories.
pub fn get_autocar_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("AUTOCAR_SW_ROOT")?))
}
