//! Shell plugin registry with dependency-aware enable/disable.
//!
//! Plugins are tracked in an in-memory registry and mirrored into the user's
//! shell rc file as `source` lines. Enabling a plugin requires all of its
//! direct dependencies to be registered and enabled; disabling one is refused
//! while an enabled plugin still depends on it. Disable comments the source
//! line out rather than deleting it, so state survives in the rc file.
mod rcfile;

pub use rcfile::RcFile;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::PluginError;

/// A tracked shell plugin.
#[derive(Debug, Clone)]
pub struct Plugin {
    /// Unique registry key.
    pub name: String,
    /// Path used in the rc file `source` line.
    pub path: String,
    /// Installed version, mutated by [`PluginManager::update_plugin`].
    pub version: String,
    /// Free-form description.
    pub description: String,
    /// Whether the plugin's source line is active.
    pub enabled: bool,
    /// Direct dependencies by registry key.
    pub dependencies: Vec<String>,
    /// Free-form per-plugin configuration.
    pub config: BTreeMap<String, String>,
}

/// Registry of shell plugins mirrored into an rc file.
///
/// The registry is guarded by a single [`RwLock`]; every operation takes the
/// lock once, so individual calls are atomic with respect to each other.
pub struct PluginManager {
    registry: RwLock<BTreeMap<String, Plugin>>,
    rc: RcFile,
}

/// Derive a registry key from a plugin path (the file stem).
fn key_from_path(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map_or_else(|| path.to_string(), |s| s.to_string_lossy().to_string())
}

impl PluginManager {
    /// Create a manager mirroring into the given rc file.
    #[must_use]
    pub fn new(rc_path: impl Into<PathBuf>) -> Self {
        Self {
            registry: RwLock::new(BTreeMap::new()),
            rc: RcFile::new(rc_path),
        }
    }

    /// Path of the rc file this manager mutates.
    #[must_use]
    pub fn rc_path(&self) -> &Path {
        self.rc.path()
    }

    /// Register a plugin by path and activate its source line.
    ///
    /// The registry key is the path's file stem. Returns the key.
    ///
    /// # Errors
    ///
    /// [`PluginError::AlreadyExists`] when the key is taken or the active
    /// source line is already present; [`PluginError::RcFile`] on I/O failure.
    pub fn add_plugin(&self, path: &str) -> Result<String, PluginError> {
        let key = key_from_path(path);
        let mut registry = self.write_lock();
        if registry.contains_key(&key) || self.rc.has_active(path)? {
            return Err(PluginError::AlreadyExists(key));
        }
        self.rc.append(path)?;
        registry.insert(
            key.clone(),
            Plugin {
                name: key.clone(),
                path: path.to_string(),
                version: String::new(),
                description: String::new(),
                enabled: true,
                dependencies: Vec::new(),
                config: BTreeMap::new(),
            },
        );
        Ok(key)
    }

    /// Register a plugin with full metadata.
    ///
    /// The plugin starts disabled so that dependency ordering applies: it must
    /// be explicitly enabled once its dependencies are. The source line is
    /// still written so the rc file reflects the registration.
    ///
    /// # Errors
    ///
    /// [`PluginError::AlreadyExists`] when the name is taken;
    /// [`PluginError::RcFile`] on I/O failure.
    pub fn add_plugin_with_metadata(
        &self,
        name: &str,
        path: &str,
        version: &str,
        description: &str,
        dependencies: Vec<String>,
    ) -> Result<(), PluginError> {
        let mut registry = self.write_lock();
        if registry.contains_key(name) {
            return Err(PluginError::AlreadyExists(name.to_string()));
        }
        self.rc.append(path)?;
        registry.insert(
            name.to_string(),
            Plugin {
                name: name.to_string(),
                path: path.to_string(),
                version: version.to_string(),
                description: description.to_string(),
                enabled: false,
                dependencies,
                config: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Remove a plugin and every trace of its source line.
    ///
    /// # Errors
    ///
    /// [`PluginError::NotFound`] when unregistered; [`PluginError::RcFile`] on
    /// I/O failure.
    pub fn remove_plugin(&self, name: &str) -> Result<(), PluginError> {
        let mut registry = self.write_lock();
        let plugin = registry
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        self.rc.remove(&plugin.path)?;
        registry.remove(name);
        Ok(())
    }

    /// Enable a plugin, restoring (or appending) its source line.
    ///
    /// # Errors
    ///
    /// [`PluginError::NotFound`], [`PluginError::AlreadyEnabled`], or
    /// [`PluginError::DependencyDisabled`] when any direct dependency is
    /// disabled or unregistered; [`PluginError::RcFile`] on I/O failure.
    pub fn enable_plugin(&self, name: &str) -> Result<(), PluginError> {
        let mut registry = self.write_lock();
        let plugin = registry
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        if plugin.enabled {
            return Err(PluginError::AlreadyEnabled(name.to_string()));
        }
        for dep in &plugin.dependencies {
            let satisfied = registry.get(dep).is_some_and(|d| d.enabled);
            if !satisfied {
                return Err(PluginError::DependencyDisabled {
                    plugin: name.to_string(),
                    dependency: dep.clone(),
                });
            }
        }
        let path = plugin.path.clone();
        self.rc.uncomment(&path)?;
        if let Some(plugin) = registry.get_mut(name) {
            plugin.enabled = true;
        }
        Ok(())
    }

    /// Disable a plugin, commenting its source line out.
    ///
    /// # Errors
    ///
    /// [`PluginError::NotFound`], [`PluginError::AlreadyDisabled`], or
    /// [`PluginError::DependentEnabled`] when an enabled plugin still depends
    /// on this one; [`PluginError::RcFile`] on I/O failure.
    pub fn disable_plugin(&self, name: &str) -> Result<(), PluginError> {
        let mut registry = self.write_lock();
        let plugin = registry
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        if !plugin.enabled {
            return Err(PluginError::AlreadyDisabled(name.to_string()));
        }
        let blocking = registry
            .values()
            .find(|p| p.enabled && p.name != name && p.dependencies.iter().any(|d| d == name));
        if let Some(dependent) = blocking {
            return Err(PluginError::DependentEnabled {
                plugin: name.to_string(),
                dependent: dependent.name.clone(),
            });
        }
        let path = plugin.path.clone();
        self.rc.comment(&path)?;
        if let Some(plugin) = registry.get_mut(name) {
            plugin.enabled = false;
        }
        Ok(())
    }

    /// Set a configuration field on a plugin.
    ///
    /// # Errors
    ///
    /// [`PluginError::NotFound`] when unregistered.
    pub fn set_plugin_config(
        &self,
        name: &str,
        field: &str,
        value: &str,
    ) -> Result<(), PluginError> {
        let mut registry = self.write_lock();
        let plugin = registry
            .get_mut(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        plugin.config.insert(field.to_string(), value.to_string());
        Ok(())
    }

    /// Read a configuration field from a plugin.
    ///
    /// # Errors
    ///
    /// [`PluginError::NotFound`] when unregistered;
    /// [`PluginError::ConfigFieldMissing`] when the field was never set.
    pub fn get_plugin_config(&self, name: &str, field: &str) -> Result<String, PluginError> {
        let registry = self.read_lock();
        let plugin = registry
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        plugin
            .config
            .get(field)
            .cloned()
            .ok_or_else(|| PluginError::ConfigFieldMissing {
                plugin: name.to_string(),
                field: field.to_string(),
            })
    }

    /// Record a new version for a plugin. Registry-only, no rc-file change.
    ///
    /// # Errors
    ///
    /// [`PluginError::NotFound`] when unregistered.
    pub fn update_plugin(&self, name: &str, version: &str) -> Result<(), PluginError> {
        let mut registry = self.write_lock();
        let plugin = registry
            .get_mut(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        plugin.version = version.to_string();
        Ok(())
    }

    /// Rebuild registry entries from the rc file's existing source lines.
    ///
    /// Keys derive from each path's file stem; active lines register as
    /// enabled, commented lines as disabled. Entries whose key is already
    /// registered are left alone. Returns the number of plugins registered.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::RcFile`] if the rc file cannot be read.
    pub fn reconcile_from_rc(&self) -> Result<usize, PluginError> {
        let entries = self.rc.entries()?;
        let mut registry = self.write_lock();
        let mut registered = 0;
        for (path, active) in entries {
            let key = key_from_path(&path);
            if registry.contains_key(&key) {
                continue;
            }
            registry.insert(
                key.clone(),
                Plugin {
                    name: key,
                    path,
                    version: String::new(),
                    description: String::new(),
                    enabled: active,
                    dependencies: Vec::new(),
                    config: BTreeMap::new(),
                },
            );
            registered += 1;
        }
        Ok(registered)
    }

    /// Snapshot of a single plugin.
    #[must_use]
    pub fn get_plugin(&self, name: &str) -> Option<Plugin> {
        self.read_lock().get(name).cloned()
    }

    /// Snapshot of all registered plugins, ordered by key.
    #[must_use]
    pub fn list_plugins(&self) -> Vec<Plugin> {
        self.read_lock().values().cloned().collect()
    }

    // A poisoned lock means a panic mid-mutation elsewhere; the registry map
    // itself is still structurally valid, so recover the guard and continue.
    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Plugin>> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Plugin>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn manager() -> (tempfile::TempDir, PluginManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = PluginManager::new(dir.path().join(".zshrc"));
        (dir, manager)
    }

    #[test]
    fn add_plugin_derives_key_from_path_stem() {
        let (_dir, m) = manager();
        let key = m.add_plugin("~/.plugins/fzf.zsh").unwrap();
        assert_eq!(key, "fzf");
        let plugin = m.get_plugin("fzf").unwrap();
        assert!(plugin.enabled);
        assert_eq!(plugin.path, "~/.plugins/fzf.zsh");
    }

    #[test]
    fn add_plugin_writes_active_source_line() {
        let (_dir, m) = manager();
        m.add_plugin("~/.plugins/fzf.zsh").unwrap();
        let content = fs::read_to_string(m.rc_path()).unwrap();
        assert_eq!(content, "source ~/.plugins/fzf.zsh\n");
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let (_dir, m) = manager();
        m.add_plugin("~/.plugins/fzf.zsh").unwrap();
        let err = m.add_plugin("~/.plugins/fzf.zsh").unwrap_err();
        assert_eq!(err, PluginError::AlreadyExists("fzf".to_string()));
    }

    #[test]
    fn add_with_metadata_starts_disabled() {
        let (_dir, m) = manager();
        m.add_plugin_with_metadata("syntax", "syntax.zsh", "1.0", "highlighting", vec![])
            .unwrap();
        let plugin = m.get_plugin("syntax").unwrap();
        assert!(!plugin.enabled);
        assert_eq!(plugin.version, "1.0");
    }

    #[test]
    fn enable_requires_dependencies_enabled_first() {
        // B depends on A: enable B fails, enable A, then enable B succeeds.
        let (_dir, m) = manager();
        m.add_plugin_with_metadata("a", "a.zsh", "1.0", "", vec![])
            .unwrap();
        m.add_plugin_with_metadata("b", "b.zsh", "1.0", "", vec!["a".to_string()])
            .unwrap();

        let err = m.enable_plugin("b").unwrap_err();
        assert_eq!(
            err,
            PluginError::DependencyDisabled {
                plugin: "b".to_string(),
                dependency: "a".to_string(),
            }
        );

        m.enable_plugin("a").unwrap();
        m.enable_plugin("b").unwrap();
        assert!(m.get_plugin("b").unwrap().enabled);
    }

    #[test]
    fn disable_refused_while_dependent_enabled() {
        let (_dir, m) = manager();
        m.add_plugin_with_metadata("a", "a.zsh", "1.0", "", vec![])
            .unwrap();
        m.add_plugin_with_metadata("b", "b.zsh", "1.0", "", vec!["a".to_string()])
            .unwrap();
        m.enable_plugin("a").unwrap();
        m.enable_plugin("b").unwrap();

        let err = m.disable_plugin("a").unwrap_err();
        assert_eq!(
            err,
            PluginError::DependentEnabled {
                plugin: "a".to_string(),
                dependent: "b".to_string(),
            }
        );

        m.disable_plugin("b").unwrap();
        m.disable_plugin("a").unwrap();
    }

    #[test]
    fn enable_fails_on_unregistered_dependency() {
        let (_dir, m) = manager();
        m.add_plugin_with_metadata("b", "b.zsh", "1.0", "", vec!["ghost".to_string()])
            .unwrap();
        let err = m.enable_plugin("b").unwrap_err();
        assert_eq!(
            err,
            PluginError::DependencyDisabled {
                plugin: "b".to_string(),
                dependency: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn disable_then_enable_restores_rc_file_exactly() {
        let (_dir, m) = manager();
        m.add_plugin("fzf.zsh").unwrap();
        let before = fs::read_to_string(m.rc_path()).unwrap();

        m.disable_plugin("fzf").unwrap();
        let disabled = fs::read_to_string(m.rc_path()).unwrap();
        assert_eq!(disabled, "# source fzf.zsh\n");

        m.enable_plugin("fzf").unwrap();
        let after = fs::read_to_string(m.rc_path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn enable_on_enabled_plugin_fails() {
        let (_dir, m) = manager();
        m.add_plugin("fzf.zsh").unwrap();
        let err = m.enable_plugin("fzf").unwrap_err();
        assert_eq!(err, PluginError::AlreadyEnabled("fzf".to_string()));
    }

    #[test]
    fn disable_on_disabled_plugin_fails() {
        let (_dir, m) = manager();
        m.add_plugin_with_metadata("fzf", "fzf.zsh", "1.0", "", vec![])
            .unwrap();
        let err = m.disable_plugin("fzf").unwrap_err();
        assert_eq!(err, PluginError::AlreadyDisabled("fzf".to_string()));
    }

    #[test]
    fn remove_drops_registry_entry_and_source_lines() {
        let (_dir, m) = manager();
        m.add_plugin("fzf.zsh").unwrap();
        m.disable_plugin("fzf").unwrap();
        m.remove_plugin("fzf").unwrap();
        assert!(m.get_plugin("fzf").is_none());
        let content = fs::read_to_string(m.rc_path()).unwrap();
        assert_eq!(content, "");
    }

    #[test]
    fn remove_unknown_plugin_fails() {
        let (_dir, m) = manager();
        let err = m.remove_plugin("ghost").unwrap_err();
        assert_eq!(err, PluginError::NotFound("ghost".to_string()));
    }

    #[test]
    fn config_round_trip_and_missing_field() {
        let (_dir, m) = manager();
        m.add_plugin("fzf.zsh").unwrap();
        m.set_plugin_config("fzf", "theme", "dark").unwrap();
        assert_eq!(m.get_plugin_config("fzf", "theme").unwrap(), "dark");
        let err = m.get_plugin_config("fzf", "missing").unwrap_err();
        assert_eq!(
            err,
            PluginError::ConfigFieldMissing {
                plugin: "fzf".to_string(),
                field: "missing".to_string(),
            }
        );
    }

    #[test]
    fn update_plugin_changes_version_only() {
        let (_dir, m) = manager();
        m.add_plugin_with_metadata("fzf", "fzf.zsh", "1.0", "fuzzy finder", vec![])
            .unwrap();
        m.update_plugin("fzf", "2.0").unwrap();
        let plugin = m.get_plugin("fzf").unwrap();
        assert_eq!(plugin.version, "2.0");
        assert_eq!(plugin.description, "fuzzy finder");
        assert!(!plugin.enabled, "update must not change enablement");
    }

    #[test]
    fn reconcile_rebuilds_registry_from_rc_file() {
        let dir = tempfile::tempdir().unwrap();
        let rc_path = dir.path().join(".zshrc");
        fs::write(&rc_path, "source fzf.zsh\n# source syntax.zsh\n").unwrap();

        let m = PluginManager::new(&rc_path);
        let registered = m.reconcile_from_rc().unwrap();
        assert_eq!(registered, 2);
        assert!(m.get_plugin("fzf").unwrap().enabled);
        assert!(!m.get_plugin("syntax").unwrap().enabled);

        // Second pass registers nothing new.
        assert_eq!(m.reconcile_from_rc().unwrap(), 0);
    }

    #[test]
    fn list_plugins_is_ordered_by_key() {
        let (_dir, m) = manager();
        m.add_plugin("zoxide.zsh").unwrap();
        m.add_plugin("autojump.zsh").unwrap();
        let names: Vec<String> = m.list_plugins().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["autojump".to_string(), "zoxide".to_string()]);
    }
}
