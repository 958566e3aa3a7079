use std::sync::Arc;

use anyhow::Result;

use crate::catalog::{self, Tool};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::exec::{Executor, SystemExecutor};
use crate::installer::{RetryPolicy, RetryingInstaller};
use crate::logging::{Log, Logger, TaskStatus};
use crate::manager;
use crate::shellcfg::ShellConfigWriter;

/// Run the install command.
///
/// Installs every selected catalog tool through the native package manager.
/// Per-tool failures are recorded and the run continues; configuration errors
/// abort immediately.
///
/// # Errors
///
/// Returns an error if no package manager is available, the catalog fails to
/// parse, a tool hits a configuration error, or any tool failed by the end of
/// the run.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);

    let Some(manager) = manager::detect(&executor) else {
        anyhow::bail!("no supported package manager found (apt, dnf, pacman, brew)");
    };
    let manager: Arc<dyn manager::PackageManager> = Arc::from(manager);
    log.info(&format!("using package manager: {}", manager.name()));

    let catalog_path = super::resolve_catalog_path(global);
    log.stage("Loading tool catalog");
    let tools = catalog::load_tools(&catalog_path)?;
    log.info(&format!(
        "{} tool(s) in {}",
        tools.len(),
        catalog_path.display()
    ));

    let selected = select_tools(&tools, opts);
    if selected.is_empty() {
        log.warn("no tools selected, nothing to do");
        return Ok(());
    }

    let mut policy = RetryPolicy::default();
    if let Some(max_attempts) = opts.max_attempts {
        policy.max_attempts = max_attempts;
    }

    let mut installer =
        RetryingInstaller::new(manager, executor, Arc::clone(log) as Arc<dyn Log>)
            .with_policy(policy);

    // Shell config is optional: an unsupported login shell downgrades to a
    // warning instead of blocking package installs.
    match super::resolve_shell(global) {
        Ok(shell) => {
            let rc_path = super::resolve_rc_path(global, shell)?;
            installer = installer.with_shell_writer(ShellConfigWriter::with_rc_path(shell, rc_path));
        }
        Err(e) => log.warn(&format!("shell config disabled: {e:#}")),
    }

    for tool in selected {
        match installer.install(tool) {
            Ok(()) => log.record_task(&tool.name, TaskStatus::Ok, None),
            Err(e) if e.is_fatal() => {
                log.record_task(&tool.name, TaskStatus::Failed, Some(&e.to_string()));
                log.print_summary();
                return Err(e.into());
            }
            Err(e) => {
                log.error(&format!("{}: {e}", tool.name));
                log.record_task(&tool.name, TaskStatus::Failed, Some(&e.to_string()));
            }
        }
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} tool(s) failed");
    }
    Ok(())
}

/// Filter catalog tools by `--only` and `--skip`.
fn select_tools<'a>(tools: &'a [Tool], opts: &InstallOpts) -> Vec<&'a Tool> {
    tools
        .iter()
        .filter(|t| {
            let name = t.name.to_lowercase();
            if !opts.only.is_empty() {
                return opts.only.iter().any(|o| name == o.to_lowercase());
            }
            if !opts.skip.is_empty() {
                return !opts.skip.iter().any(|s| name == s.to_lowercase());
            }
            true
        })
        .collect()
}
