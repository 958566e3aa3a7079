//! Tool catalog: descriptors for everything the engine can install.
//!
//! A [`Tool`] is the logical install unit handed to the install pipeline.
//! Descriptors are deserialized from a TOML catalog file (`[[tools]]` array);
//! they are immutable during a single install attempt and never persisted by
//! the engine itself.
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// A logical install unit.
#[derive(Debug, Clone, Deserialize)]
pub struct Tool {
    /// Logical tool identifier (also the binary name probed at verification).
    pub name: String,
    /// Default package name; used when no override matches.
    pub package: String,
    /// Per-package-manager name overrides, keyed by manager identifier
    /// (e.g. `"apt" = "foo"`, `"brew" = "foo-cli"`). The key `"default"`
    /// acts as a catalog-wide override that beats `package` but loses to a
    /// manager-specific entry.
    #[serde(default)]
    pub package_overrides: HashMap<String, String>,
    /// Optional version constraint. The sentinels `"latest"` and `"stable"`
    /// mean "no pin".
    #[serde(default)]
    pub version: Option<String>,
    /// Tool-level dependency package names, installed before the main package.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// System-level dependency package names, installed before tool-level ones.
    #[serde(default)]
    pub system_dependencies: Vec<String>,
    /// Commands run through `sh -c` after the main package is installed.
    #[serde(default)]
    pub post_install: Vec<PostInstallCommand>,
    /// Shell command used to verify the installation (e.g. `rg --version`).
    #[serde(default)]
    pub verify: Option<String>,
    /// Shell configuration applied after post-install commands.
    #[serde(default)]
    pub shell_config: Option<ShellConfigFragment>,
}

impl Tool {
    /// Build a minimal tool descriptor with the given name and package.
    ///
    /// Mostly useful in tests and for programmatic callers; catalog files go
    /// through [`load_tools`].
    #[must_use]
    pub fn new(name: &str, package: &str) -> Self {
        Self {
            name: name.to_string(),
            package: package.to_string(),
            package_overrides: HashMap::new(),
            version: None,
            dependencies: Vec::new(),
            system_dependencies: Vec::new(),
            post_install: Vec::new(),
            verify: None,
            shell_config: None,
        }
    }
}

/// A post-install command with a human-readable description.
#[derive(Debug, Clone, Deserialize)]
pub struct PostInstallCommand {
    /// Command line, run through `sh -c`.
    pub command: String,
    /// What the command does, for log messages.
    pub description: String,
}

/// Shell configuration fragment merged into the active shell's rc file.
///
/// Purely a value object; `BTreeMap`s keep rendering deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShellConfigFragment {
    /// Environment variables to export.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Directories appended to PATH, in order.
    #[serde(default)]
    pub path: Vec<String>,
    /// Shell aliases.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Shell functions, keyed by name, value is the body.
    #[serde(default)]
    pub functions: BTreeMap<String, String>,
}

impl ShellConfigFragment {
    /// Whether the fragment carries nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.env.is_empty()
            && self.path.is_empty()
            && self.aliases.is_empty()
            && self.functions.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    tools: Vec<Tool>,
}

/// Load tool descriptors from a TOML catalog file.
///
/// A missing file yields an empty catalog rather than an error, so callers
/// can ship without one.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_tools(path: &Path) -> Result<Vec<Tool>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

    let catalog: Catalog = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML catalog: {}", path.display()))?;

    Ok(catalog.tools)
}
