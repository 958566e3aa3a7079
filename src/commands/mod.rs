//! Subcommand orchestration.
pub mod install;
pub mod plugin;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::error::ShellConfigError;
use crate::shellcfg::ShellKind;

/// Resolve the target shell from CLI arguments or `$SHELL`.
///
/// # Errors
///
/// Returns an error if the named shell is unsupported or detection fails.
pub fn resolve_shell(global: &GlobalOpts) -> Result<ShellKind> {
    let shell = match global.shell.as_deref() {
        Some(name) => ShellKind::from_name(name)?,
        None => ShellKind::detect()?,
    };
    Ok(shell)
}

/// Resolve the rc file path: explicit `--rc-file` or the shell's default.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn resolve_rc_path(global: &GlobalOpts, shell: ShellKind) -> Result<PathBuf> {
    if let Some(path) = &global.rc_file {
        return Ok(path.clone());
    }
    Ok(shell.rc_path(&home_dir()?))
}

/// Resolve the catalog file path: explicit flag, `DEVSETUP_CATALOG`, or
/// `tools.toml` in the current directory.
#[must_use]
pub fn resolve_catalog_path(global: &GlobalOpts) -> PathBuf {
    if let Some(path) = &global.catalog {
        return path.clone();
    }
    std::env::var_os("DEVSETUP_CATALOG")
        .map_or_else(|| PathBuf::from("tools.toml"), PathBuf::from)
}

fn home_dir() -> Result<PathBuf, ShellConfigError> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(ShellConfigError::HomeNotFound)
}
