//! Shell configuration rendering and idempotent rc-file merging.
//!
//! A [`ShellConfigFragment`] is rendered into the syntax of the active shell
//! and merged into its rc file without duplicating content already present.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::ShellConfigFragment;
use crate::error::ShellConfigError;

/// Supported shells.
///
/// A closed enumeration: every piece of shell-specific rendering switches on
/// this rather than on raw `$SHELL` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// GNU Bash (`~/.bashrc`).
    Bash,
    /// Zsh (`~/.zshrc`).
    Zsh,
    /// Fish (`~/.config/fish/config.fish`).
    Fish,
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bash => write!(f, "bash"),
            Self::Zsh => write!(f, "zsh"),
            Self::Fish => write!(f, "fish"),
        }
    }
}

impl ShellKind {
    /// Detect the active shell from the `SHELL` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ShellConfigError::UnsupportedShell`] if `SHELL` is unset or
    /// names a shell other than bash, zsh, or fish.
    pub fn detect() -> Result<Self, ShellConfigError> {
        let shell = std::env::var("SHELL").unwrap_or_default();
        let name = shell.rsplit('/').next().unwrap_or_default();
        Self::from_name(name)
    }

    /// Parse a shell name.
    ///
    /// # Errors
    ///
    /// Returns [`ShellConfigError::UnsupportedShell`] for anything other than
    /// `bash`, `zsh`, or `fish`.
    pub fn from_name(name: &str) -> Result<Self, ShellConfigError> {
        match name {
            "bash" => Ok(Self::Bash),
            "zsh" => Ok(Self::Zsh),
            "fish" => Ok(Self::Fish),
            other => Err(ShellConfigError::UnsupportedShell(other.to_string())),
        }
    }

    /// Path of this shell's rc file under the given home directory.
    #[must_use]
    pub fn rc_path(self, home: &Path) -> PathBuf {
        match self {
            Self::Bash => home.join(".bashrc"),
            Self::Zsh => home.join(".zshrc"),
            Self::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }
}

/// How rendered fragments are combined with existing rc-file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Append fragments not already present; keep everything else.
    MergeWithExisting,
    /// Skip the whole fragment if any part of it is already present.
    SkipIfExists,
    /// Replace the file content with exactly the rendered fragment set.
    ReplaceExisting,
}

/// Renders shell configuration fragments and merges them into an rc file.
#[derive(Debug)]
pub struct ShellConfigWriter {
    shell: ShellKind,
    rc_path: PathBuf,
}

impl ShellConfigWriter {
    /// Create a writer for the given shell, targeting its rc file under `home`.
    #[must_use]
    pub fn new(shell: ShellKind, home: &Path) -> Self {
        Self {
            rc_path: shell.rc_path(home),
            shell,
        }
    }

    /// Create a writer targeting an explicit rc-file path.
    #[must_use]
    pub fn with_rc_path(shell: ShellKind, rc_path: PathBuf) -> Self {
        Self { shell, rc_path }
    }

    /// Path of the rc file this writer mutates.
    #[must_use]
    pub fn rc_path(&self) -> &Path {
        &self.rc_path
    }

    /// Render a fragment into per-shell syntax.
    ///
    /// Each returned unit is one logical rc-file entry; function bodies span
    /// multiple lines but still count as a single unit for duplicate checks.
    #[must_use]
    pub fn render(&self, fragment: &ShellConfigFragment) -> Vec<String> {
        let mut units = Vec::new();

        for (key, value) in &fragment.env {
            units.push(match self.shell {
                ShellKind::Bash | ShellKind::Zsh => format!("export {key}=\"{value}\""),
                ShellKind::Fish => format!("set -gx {key} \"{value}\""),
            });
        }

        for entry in &fragment.path {
            units.push(match self.shell {
                ShellKind::Bash | ShellKind::Zsh => format!("export PATH=\"$PATH:{entry}\""),
                ShellKind::Fish => format!("fish_add_path {entry}"),
            });
        }

        for (name, body) in &fragment.aliases {
            units.push(match self.shell {
                ShellKind::Bash | ShellKind::Zsh => format!("alias {name}='{body}'"),
                ShellKind::Fish => format!("alias {name} '{body}'"),
            });
        }

        for (name, body) in &fragment.functions {
            units.push(match self.shell {
                ShellKind::Bash | ShellKind::Zsh => {
                    format!("{name}() {{\n    {body}\n}}")
                }
                ShellKind::Fish => format!("function {name}\n    {body}\nend"),
            });
        }

        units
    }

    /// Merge a fragment into the rc file using the given strategy.
    ///
    /// Duplicate detection is an exact-substring match against the current
    /// file content. The rc file's parent directory is created if missing and
    /// a trailing newline is always preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the rc file or its parent directory cannot be
    /// read or written.
    pub fn write(
        &self,
        fragment: &ShellConfigFragment,
        strategy: MergeStrategy,
    ) -> Result<(), ShellConfigError> {
        let units = self.render(fragment);
        if units.is_empty() && strategy != MergeStrategy::ReplaceExisting {
            return Ok(());
        }

        let current = match std::fs::read_to_string(&self.rc_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(self.io_error(e)),
        };

        let next = match strategy {
            MergeStrategy::ReplaceExisting => Self::join(&units),
            MergeStrategy::SkipIfExists => {
                if units.iter().any(|u| current.contains(u.as_str())) {
                    return Ok(());
                }
                Self::append(&current, &units)
            }
            MergeStrategy::MergeWithExisting => {
                let missing: Vec<String> = units
                    .into_iter()
                    .filter(|u| !current.contains(u.as_str()))
                    .collect();
                if missing.is_empty() {
                    return Ok(());
                }
                Self::append(&current, &missing)
            }
        };

        if let Some(parent) = self.rc_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.rc_path, next).map_err(|e| self.io_error(e))
    }

    fn join(units: &[String]) -> String {
        let mut out = units.join("\n");
        out.push('\n');
        out
    }

    fn append(current: &str, units: &[String]) -> String {
        let mut out = current.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&Self::join(units));
        out
    }

    fn io_error(&self, source: std::io::Error) -> ShellConfigError {
        ShellConfigError::Io {
            path: self.rc_path.display().to_string(),
            source,
        }
    }
}
