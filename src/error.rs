//! Domain-specific error types for the bootstrap engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors ([`InstallError`], [`PluginError`],
//! [`ShellConfigError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! InstallError      — package resolution, retry pipeline, verification
//! PluginError       — plugin registry and dependency ordering
//! ShellConfigError  — rc-file rendering and merging
//! ```

use thiserror::Error;

/// Errors produced by the install pipeline.
///
/// The variants mirror the pipeline stages so that callers can distinguish
/// failures that should abort the whole run (`Config`) from per-tool failures
/// that should be reported and skipped (`PackageNotFound`, `Install`, …).
#[derive(Error, Debug)]
pub enum InstallError {
    /// Empty or unresolvable package name, or a malformed tool descriptor.
    /// Never retried; callers should abort the run.
    #[error("configuration error for tool '{tool}': {reason}")]
    Config {
        /// Name of the offending tool.
        tool: String,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// The package manager reports the package does not exist in any
    /// configured repository. Never retried; surfaced distinctly so callers
    /// can suggest alternatives.
    #[error("package '{package}' not found by {manager}")]
    PackageNotFound {
        /// Resolved package name that was requested.
        package: String,
        /// Name of the package manager that rejected it.
        manager: String,
    },

    /// Transient install failure that exhausted all retry attempts.
    #[error("failed to install '{package}' after {attempts} attempt(s): {source}")]
    Install {
        /// Resolved package name that was requested.
        package: String,
        /// Number of install attempts made.
        attempts: u32,
        /// Error from the final attempt.
        source: anyhow::Error,
    },

    /// Repository bootstrap (PPA/tap setup) failed. Fatal for the current
    /// attempt sequence; no further retries.
    #[error("repository bootstrap for '{package}' failed: {source}")]
    RepoBootstrap {
        /// Package whose repository setup was attempted.
        package: String,
        /// Underlying bootstrap error.
        source: anyhow::Error,
    },

    /// A dependency of the tool could not be installed. The install attempt
    /// is aborted and same-attempt dependencies are rolled back.
    #[error("dependency '{dependency}' of '{tool}' failed: {source}")]
    Dependency {
        /// Tool whose dependency failed.
        tool: String,
        /// Name of the failing dependency package.
        dependency: String,
        /// The dependency's own install error.
        source: Box<InstallError>,
    },

    /// A post-install command exited non-zero. The main package stays
    /// installed; same-attempt dependencies are rolled back.
    #[error("post-install command for '{tool}' failed ({description}): {source}")]
    PostInstall {
        /// Tool whose post-install hook failed.
        tool: String,
        /// Human description of the failing command.
        description: String,
        /// Underlying execution error.
        source: anyhow::Error,
    },

    /// Applying the tool's shell configuration fragment failed.
    #[error("shell configuration for '{tool}' failed: {source}")]
    ShellConfig {
        /// Tool whose fragment could not be applied.
        tool: String,
        /// Underlying rc-file error.
        source: ShellConfigError,
    },

    /// The verification command failed and no binary was found in the
    /// probed install directories. The main package stays installed.
    #[error("verification of '{tool}' failed: {detail}")]
    Verification {
        /// Tool that failed verification.
        tool: String,
        /// What was attempted (command and probed directories).
        detail: String,
    },
}

impl InstallError {
    /// Whether this error should abort the whole run rather than just the
    /// current tool.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

/// Errors produced by the plugin dependency manager.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PluginError {
    /// A plugin with the same key is already registered, or its source line
    /// is already present in the rc file.
    #[error("plugin '{0}' already exists")]
    AlreadyExists(String),

    /// No plugin is registered under the given key.
    #[error("plugin '{0}' not found")]
    NotFound(String),

    /// The plugin is already enabled.
    #[error("plugin '{0}' is already enabled")]
    AlreadyEnabled(String),

    /// The plugin is already disabled.
    #[error("plugin '{0}' is already disabled")]
    AlreadyDisabled(String),

    /// A direct dependency of the plugin is disabled or unregistered.
    #[error("cannot enable '{plugin}': dependency '{dependency}' is not enabled")]
    DependencyDisabled {
        /// Plugin being enabled.
        plugin: String,
        /// The dependency that blocks it.
        dependency: String,
    },

    /// Another enabled plugin depends on this one.
    #[error("cannot disable '{plugin}': enabled plugin '{dependent}' depends on it")]
    DependentEnabled {
        /// Plugin being disabled.
        plugin: String,
        /// The enabled dependent that blocks it.
        dependent: String,
    },

    /// The requested configuration field is absent.
    #[error("plugin '{plugin}' has no config field '{field}'")]
    ConfigFieldMissing {
        /// Plugin that was queried.
        plugin: String,
        /// Missing field name.
        field: String,
    },

    /// The rc file could not be read or written.
    #[error("rc file error for '{path}': {message}")]
    RcFile {
        /// Path of the rc file.
        path: String,
        /// Description of the I/O failure.
        message: String,
    },
}

/// Errors produced by the shell configuration writer.
#[derive(Error, Debug)]
pub enum ShellConfigError {
    /// The home directory could not be resolved.
    #[error("cannot resolve home directory: HOME is not set")]
    HomeNotFound,

    /// The detected shell is not one of bash, zsh, or fish.
    #[error("unsupported shell '{0}': must be one of bash, zsh, fish")]
    UnsupportedShell(String),

    /// The rc file (or its parent directory) could not be read or written.
    #[error("cannot write rc file {path}: {source}")]
    Io {
        /// Path to the rc file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Classified kind of a package manager install failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The package does not exist in any configured repository.
    NotFound,
    /// Anything else, worth retrying.
    Transient,
}

/// Classify a package manager error message.
///
/// Package managers report "no such package" only through free-form text, so
/// this substring matching is inherently fragile; it is kept behind this one
/// function so there is a single point of change and of test coverage.
#[must_use]
pub fn classify_failure(message: &str) -> FailureKind {
    const NOT_FOUND_PATTERNS: &[&str] = &[
        "unable to locate package",
        "package not found",
        "no match for argument",
        "target not found",
        "no available formula",
        "no formulae found",
        "nothing provides",
        "could not find a package",
    ];

    let lower = message.to_lowercase();
    if NOT_FOUND_PATTERNS.iter().any(|p| lower.contains(p)) {
        FailureKind::NotFound
    } else {
        FailureKind::Transient
    }
}
