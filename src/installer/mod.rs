//! The retrying install pipeline.
//!
//! [`RetryingInstaller`] drives one tool through the full sequence: package
//! name resolution, dependency installs, the retry loop with lazy repository
//! bootstrap, post-install commands, shell configuration, and verification.
//! Everything external goes through the injected [`PackageManager`] handle
//! and [`Executor`], so the whole pipeline is testable with mocks.
mod resolver;

pub use resolver::resolve_package_name;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Tool;
use crate::error::{FailureKind, InstallError, classify_failure};
use crate::exec::Executor;
use crate::logging::Log;
use crate::manager::PackageManager;
use crate::shellcfg::{MergeStrategy, ShellConfigWriter};

/// Retry behaviour of the install loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum install attempts per package.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Outcome of the retrying install primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallOutcome {
    /// The package was installed by this call.
    Installed,
    /// The manager already reported it installed; nothing was done.
    AlreadyInstalled,
}

/// Directories probed for the tool binary when verification fails.
const DEFAULT_PROBE_DIRS: &[&str] = &["/usr/bin", "/usr/local/bin", "/opt/homebrew/bin"];

/// Drives the install pipeline for one tool at a time.
///
/// Single-threaded and synchronous: each [`install`](Self::install) call runs
/// start-to-finish on the caller's thread; retries block for
/// `delay × attempts` in the worst case.
pub struct RetryingInstaller {
    manager: Arc<dyn PackageManager>,
    executor: Arc<dyn Executor>,
    log: Arc<dyn Log>,
    policy: RetryPolicy,
    shell_writer: Option<ShellConfigWriter>,
    probe_dirs: Vec<PathBuf>,
}

impl RetryingInstaller {
    /// Create an installer with the default retry policy and probe dirs.
    #[must_use]
    pub fn new(
        manager: Arc<dyn PackageManager>,
        executor: Arc<dyn Executor>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            manager,
            executor,
            log,
            policy: RetryPolicy::default(),
            shell_writer: None,
            probe_dirs: DEFAULT_PROBE_DIRS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Override the retry policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the shell configuration writer used for tool fragments.
    ///
    /// Without one, shell configuration fragments are skipped with a warning.
    #[must_use]
    pub fn with_shell_writer(mut self, writer: ShellConfigWriter) -> Self {
        self.shell_writer = Some(writer);
        self
    }

    /// Add extra directories to probe during verification.
    #[must_use]
    pub fn with_extra_probe_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.probe_dirs.extend(dirs);
        self
    }

    /// Install one tool end to end.
    ///
    /// # Errors
    ///
    /// Returns an [`InstallError`] tagged with the failing stage. Any failure
    /// except a main-package not-found rolls back dependencies installed in
    /// this attempt; the main package itself is never uninstalled once
    /// installed (partial success is preserved deliberately).
    pub fn install(&self, tool: &Tool) -> Result<(), InstallError> {
        let package = resolve_package_name(tool, self.manager.name());
        if package.is_empty() {
            return Err(InstallError::Config {
                tool: tool.name.clone(),
                reason: "resolved package name is empty".to_string(),
            });
        }

        self.log.stage(&format!(
            "Installing {} ({} via {})",
            tool.name,
            package,
            self.manager.name()
        ));

        let mut installed_deps: Vec<String> = Vec::new();
        let result = self.install_inner(tool, &package, &mut installed_deps);

        if let Err(e) = &result {
            // Not-found is a clean classification, not a broken state: the
            // dependencies stay installed so the user keeps what worked.
            if matches!(e, InstallError::PackageNotFound { .. }) {
                self.log.debug(&format!(
                    "keeping {} dependency package(s) after not-found failure",
                    installed_deps.len()
                ));
            } else {
                self.rollback(&installed_deps);
            }
        }

        result
    }

    fn install_inner(
        &self,
        tool: &Tool,
        package: &str,
        installed_deps: &mut Vec<String>,
    ) -> Result<(), InstallError> {
        for dep in tool
            .system_dependencies
            .iter()
            .chain(tool.dependencies.iter())
        {
            match self.install_with_retry(dep) {
                Ok(InstallOutcome::Installed) => {
                    self.log.info(&format!("installed dependency {dep}"));
                    installed_deps.push(dep.clone());
                }
                Ok(InstallOutcome::AlreadyInstalled) => {
                    self.log.debug(&format!("dependency {dep} already installed"));
                }
                Err(e) => {
                    return Err(InstallError::Dependency {
                        tool: tool.name.clone(),
                        dependency: dep.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        match self.install_with_retry(package)? {
            InstallOutcome::Installed => self.log.info(&format!("installed {package}")),
            InstallOutcome::AlreadyInstalled => {
                self.log.info(&format!("{package} already installed"));
            }
        }

        self.run_post_install(tool)?;
        self.apply_shell_config(tool)?;
        self.verify(tool)
    }

    /// Install a single package with retry and lazy repository bootstrap.
    fn install_with_retry(&self, package: &str) -> Result<InstallOutcome, InstallError> {
        if self.manager.is_installed(package) {
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        let mut bootstrap_tried = false;
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 1..=self.policy.max_attempts {
            self.log.debug(&format!(
                "installing {package} (attempt {attempt}/{})",
                self.policy.max_attempts
            ));

            match self.manager.install(package) {
                Ok(()) => return Ok(InstallOutcome::Installed),
                Err(e) => {
                    if classify_failure(&format!("{e:#}")) == FailureKind::NotFound {
                        return Err(InstallError::PackageNotFound {
                            package: package.to_string(),
                            manager: self.manager.name().to_string(),
                        });
                    }

                    self.log
                        .warn(&format!("install attempt {attempt} for {package} failed: {e:#}"));

                    if !bootstrap_tried {
                        bootstrap_tried = true;
                        match self.manager.setup_special_package(package) {
                            Ok(true) => {
                                self.log.info(&format!(
                                    "added repository for {package}, refreshing index"
                                ));
                                if let Err(update_err) = self.manager.update() {
                                    self.log.warn(&format!(
                                        "package index refresh failed: {update_err:#}"
                                    ));
                                }
                            }
                            Ok(false) => {}
                            Err(bootstrap_err) => {
                                return Err(InstallError::RepoBootstrap {
                                    package: package.to_string(),
                                    source: bootstrap_err,
                                });
                            }
                        }
                    }

                    last_error = Some(e);
                    if attempt < self.policy.max_attempts && !self.policy.delay.is_zero() {
                        std::thread::sleep(self.policy.delay);
                    }
                }
            }
        }

        Err(InstallError::Install {
            package: package.to_string(),
            attempts: self.policy.max_attempts,
            source: last_error.unwrap_or_else(|| anyhow::anyhow!("install failed")),
        })
    }

    fn run_post_install(&self, tool: &Tool) -> Result<(), InstallError> {
        for cmd in &tool.post_install {
            self.log.info(&format!("post-install: {}", cmd.description));
            self.log.debug(&format!("running: {}", cmd.command));
            self.executor
                .run_shell(&cmd.command)
                .map_err(|e| InstallError::PostInstall {
                    tool: tool.name.clone(),
                    description: cmd.description.clone(),
                    source: e,
                })?;
        }
        Ok(())
    }

    fn apply_shell_config(&self, tool: &Tool) -> Result<(), InstallError> {
        let Some(fragment) = &tool.shell_config else {
            return Ok(());
        };
        if fragment.is_empty() {
            return Ok(());
        }
        let Some(writer) = &self.shell_writer else {
            self.log.warn(&format!(
                "no shell writer configured, skipping shell config for {}",
                tool.name
            ));
            return Ok(());
        };
        self.log.info(&format!(
            "applying shell config for {} to {}",
            tool.name,
            writer.rc_path().display()
        ));
        writer
            .write(fragment, MergeStrategy::MergeWithExisting)
            .map_err(|e| InstallError::ShellConfig {
                tool: tool.name.clone(),
                source: e,
            })
    }

    fn verify(&self, tool: &Tool) -> Result<(), InstallError> {
        let Some(command) = &tool.verify else {
            return Ok(());
        };

        self.log.debug(&format!("verifying: {command}"));
        if let Ok(result) = self.executor.run_shell_unchecked(command)
            && result.success
        {
            return Ok(());
        }

        // Fall back to probing common install directories for the binary;
        // some tools are installed correctly but not yet on the current PATH.
        for dir in &self.probe_dirs {
            let candidate = dir.join(&tool.name);
            if candidate.exists() {
                self.log.info(&format!(
                    "verify command failed but found binary at {}",
                    candidate.display()
                ));
                return Ok(());
            }
        }

        Err(InstallError::Verification {
            tool: tool.name.clone(),
            detail: format!(
                "'{command}' failed and no '{}' binary found in probed directories",
                tool.name
            ),
        })
    }

    /// Uninstall same-attempt dependencies in reverse order.
    ///
    /// Best-effort: a failed rollback is logged as a warning, never escalated,
    /// so it cannot mask the primary failure.
    fn rollback(&self, installed_deps: &[String]) {
        for dep in installed_deps.iter().rev() {
            match self.manager.uninstall(dep) {
                Ok(()) => self.log.info(&format!("rolled back dependency {dep}")),
                Err(e) => self
                    .log
                    .warn(&format!("failed to roll back dependency {dep}: {e:#}")),
            }
        }
    }
}
