//! Line-oriented `source` line mutation for shell rc files.
//!
//! The plugin registry mirrors its state into the user's rc file as
//! `source <path>` lines. Disabled plugins keep their line with a `# ` prefix
//! so that disable-then-enable restores the byte-identical line. All
//! operations are idempotent.
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PluginError;

/// Handle to a shell rc file holding plugin source lines.
#[derive(Debug, Clone)]
pub struct RcFile {
    path: PathBuf,
}

impl RcFile {
    /// Create a handle for the given rc file path.
    ///
    /// The file does not have to exist yet; it is created on first mutation.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying rc file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The active source line for a plugin path.
    #[must_use]
    pub fn source_line(plugin_path: &str) -> String {
        format!("source {plugin_path}")
    }

    fn commented_line(plugin_path: &str) -> String {
        format!("# {}", Self::source_line(plugin_path))
    }

    fn read(&self) -> Result<String, PluginError> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        fs::read_to_string(&self.path).map_err(|e| self.io_error(&e))
    }

    fn write(&self, content: &str) -> Result<(), PluginError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(&e))?;
        }
        fs::write(&self.path, content).map_err(|e| self.io_error(&e))
    }

    fn io_error(&self, e: &std::io::Error) -> PluginError {
        PluginError::RcFile {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }

    /// All plugin source entries in the file, in line order.
    ///
    /// Returns `(plugin_path, active)` pairs; commented entries report
    /// `active = false`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::RcFile`] if the file cannot be read.
    pub fn entries(&self) -> Result<Vec<(String, bool)>, PluginError> {
        let content = self.read()?;
        let mut entries = Vec::new();
        for line in content.lines() {
            if let Some(path) = line.strip_prefix("source ") {
                entries.push((path.to_string(), true));
            } else if let Some(path) = line.strip_prefix("# source ") {
                entries.push((path.to_string(), false));
            }
        }
        Ok(entries)
    }

    /// Whether the active (uncommented) source line is present.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::RcFile`] if the file cannot be read.
    pub fn has_active(&self, plugin_path: &str) -> Result<bool, PluginError> {
        let line = Self::source_line(plugin_path);
        Ok(self.read()?.lines().any(|l| l == line))
    }

    /// Whether the commented-out source line is present.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::RcFile`] if the file cannot be read.
    pub fn has_commented(&self, plugin_path: &str) -> Result<bool, PluginError> {
        let line = Self::commented_line(plugin_path);
        Ok(self.read()?.lines().any(|l| l == line))
    }

    /// Append the active source line unless it is already present.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::RcFile`] on read or write failure.
    pub fn append(&self, plugin_path: &str) -> Result<(), PluginError> {
        if self.has_active(plugin_path)? {
            return Ok(());
        }
        let mut content = self.read()?;
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&Self::source_line(plugin_path));
        content.push('\n');
        self.write(&content)
    }

    /// Remove both the active and commented source lines for a plugin.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::RcFile`] on read or write failure.
    pub fn remove(&self, plugin_path: &str) -> Result<(), PluginError> {
        let active = Self::source_line(plugin_path);
        let commented = Self::commented_line(plugin_path);
        let content = self.read()?;
        let kept: Vec<&str> = content
            .lines()
            .filter(|l| *l != active && *l != commented)
            .collect();
        let mut next = kept.join("\n");
        if !next.is_empty() {
            next.push('\n');
        }
        self.write(&next)
    }

    /// Comment out the active source line with a `# ` prefix.
    ///
    /// Already-commented or absent lines are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::RcFile`] on read or write failure.
    pub fn comment(&self, plugin_path: &str) -> Result<(), PluginError> {
        let active = Self::source_line(plugin_path);
        let content = self.read()?;
        let next: Vec<String> = content
            .lines()
            .map(|l| {
                if l == active {
                    Self::commented_line(plugin_path)
                } else {
                    l.to_string()
                }
            })
            .collect();
        let mut joined = next.join("\n");
        if !joined.is_empty() {
            joined.push('\n');
        }
        self.write(&joined)
    }

    /// Restore a commented source line to its active form.
    ///
    /// If neither the commented nor the active line exists, the active line is
    /// appended instead.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::RcFile`] on read or write failure.
    pub fn uncomment(&self, plugin_path: &str) -> Result<(), PluginError> {
        if self.has_commented(plugin_path)? {
            let commented = Self::commented_line(plugin_path);
            let active = Self::source_line(plugin_path);
            let content = self.read()?;
            let next: Vec<String> = content
                .lines()
                .map(|l| {
                    if l == commented {
                        active.clone()
                    } else {
                        l.to_string()
                    }
                })
                .collect();
            let mut joined = next.join("\n");
            if !joined.is_empty() {
                joined.push('\n');
            }
            return self.write(&joined);
        }
        if self.has_active(plugin_path)? {
            return Ok(());
        }
        self.append(plugin_path)
    }
}
