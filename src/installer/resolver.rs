//! Package name resolution.
//!
//! Maps a logical tool to the package name a specific manager should install.
//! Pure functions: no filesystem or network access, always best-effort — an
//! empty result is the installer's responsibility to detect.
use crate::catalog::Tool;

/// Version sentinels that mean "no pin".
const UNPINNED: &[&str] = &["latest", "stable"];

/// Resolve the package name to install for `tool` under the given manager.
///
/// Resolution order:
/// 1. manager-specific override (if present and non-empty),
/// 2. catalog-wide `default` override (if present and non-empty),
/// 3. the tool's base package name.
///
/// A version constraint other than `latest`/`stable` is appended per the
/// manager's pin convention.
#[must_use]
pub fn resolve_package_name(tool: &Tool, manager: &str) -> String {
    let base = tool
        .package_overrides
        .get(manager)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            tool.package_overrides
                .get("default")
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(&tool.package);

    match tool.version.as_deref() {
        Some(version) if !version.is_empty() && !UNPINNED.contains(&version) => {
            pin(base, version, manager)
        }
        _ => base.clone(),
    }
}

/// Format a pinned package name per manager convention.
///
/// `name=version` for apt/pacman-style managers, `name-version` for
/// dnf-style, `name@version` for brew-style. Unknown managers get the
/// apt-style default.
fn pin(name: &str, version: &str, manager: &str) -> String {
    match manager {
        "dnf" => format!("{name}-{version}"),
        "brew" => format!("{name}@{version}"),
        _ => format!("{name}={version}"),
    }
}
