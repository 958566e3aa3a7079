use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, PluginCommand};
use crate::logging::Logger;
use crate::plugins::PluginManager;

/// Run a plugin management action.
///
/// The registry is rebuilt from the rc file's source lines before every
/// action so that enable/disable/remove see previously added plugins.
///
/// # Errors
///
/// Returns an error if the rc file cannot be resolved or the action violates
/// a registry rule (duplicate add, disabled dependency, enabled dependent).
pub fn run(global: &GlobalOpts, action: &PluginCommand, log: &Arc<Logger>) -> Result<()> {
    let shell = super::resolve_shell(global)?;
    let rc_path = super::resolve_rc_path(global, shell)?;
    let manager = PluginManager::new(&rc_path);

    let registered = manager.reconcile_from_rc()?;
    log.debug(&format!(
        "{registered} plugin(s) found in {}",
        rc_path.display()
    ));

    match action {
        PluginCommand::Add {
            path,
            name,
            version,
            description,
            depends,
        } => {
            let has_metadata = name.is_some()
                || version.is_some()
                || description.is_some()
                || !depends.is_empty();
            if has_metadata {
                let key = name.clone().unwrap_or_else(|| stem_of(path));
                manager.add_plugin_with_metadata(
                    &key,
                    path,
                    version.as_deref().unwrap_or_default(),
                    description.as_deref().unwrap_or_default(),
                    depends.clone(),
                )?;
                log.info(&format!(
                    "registered plugin '{key}' (disabled until its dependencies are enabled)"
                ));
            } else {
                let key = manager.add_plugin(path)?;
                log.info(&format!("added plugin '{key}' to {}", rc_path.display()));
            }
        }
        PluginCommand::Remove { name } => {
            manager.remove_plugin(name)?;
            log.info(&format!("removed plugin '{name}'"));
        }
        PluginCommand::Enable { name } => {
            manager.enable_plugin(name)?;
            log.info(&format!("enabled plugin '{name}'"));
        }
        PluginCommand::Disable { name } => {
            manager.disable_plugin(name)?;
            log.info(&format!("disabled plugin '{name}'"));
        }
        PluginCommand::List => {
            for plugin in manager.list_plugins() {
                let state = if plugin.enabled { "enabled" } else { "disabled" };
                println!("{:<24} {:<9} {}", plugin.name, state, plugin.path);
            }
        }
        PluginCommand::Update { name, version } => {
            manager.update_plugin(name, version)?;
            log.info(&format!("plugin '{name}' now at version {version}"));
        }
    }

    Ok(())
}

fn stem_of(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map_or_else(|| path.to_string(), |s| s.to_string_lossy().to_string())
}
