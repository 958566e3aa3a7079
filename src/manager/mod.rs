//! Package manager handles.
//!
//! The install pipeline never shells out to a package manager directly; it
//! drives one of these handles, which in turn issue subprocess commands
//! through the injected [`Executor`](crate::exec::Executor). Tests substitute
//! a scripted mock implementing [`PackageManager`].
mod system;

pub use system::{Apt, Brew, Dnf, Pacman};

use std::sync::Arc;

use anyhow::Result;

use crate::exec::Executor;

/// Handle to a native package manager.
///
/// `install` errors carry the manager's stderr text so the caller can
/// classify them (see [`classify_failure`](crate::error::classify_failure)).
pub trait PackageManager: Send + Sync {
    /// Manager identifier (`"apt"`, `"dnf"`, `"pacman"`, `"brew"`).
    fn name(&self) -> &str;

    /// Install a package by its manager-specific name.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying command cannot be spawned or exits
    /// non-zero; the message includes the manager's diagnostic output.
    fn install(&self, package: &str) -> Result<()>;

    /// Uninstall a package.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying command fails.
    fn uninstall(&self, package: &str) -> Result<()>;

    /// Refresh the package index.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying command fails.
    fn update(&self) -> Result<()>;

    /// Whether the package is currently installed.
    fn is_installed(&self, package: &str) -> bool;

    /// One-shot repository bootstrap for packages that live outside the
    /// default repositories (PPAs, coprs, taps).
    ///
    /// Returns `Ok(true)` when a repository was added for this package,
    /// `Ok(false)` when the package has no special-case handling.
    ///
    /// # Errors
    ///
    /// Returns an error if the bootstrap command itself fails; the caller
    /// treats that as fatal for the current attempt sequence.
    fn setup_special_package(&self, _package: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Detect the native package manager by probing PATH.
///
/// Probes in order: `apt-get`, `dnf`, `pacman`, `brew`. Returns `None` when
/// none of them is available.
#[must_use]
pub fn detect(executor: &Arc<dyn Executor>) -> Option<Box<dyn PackageManager>> {
    if executor.which("apt-get") {
        Some(Box::new(Apt::new(Arc::clone(executor))))
    } else if executor.which("dnf") {
        Some(Box::new(Dnf::new(Arc::clone(executor))))
    } else if executor.which("pacman") {
        Some(Box::new(Pacman::new(Arc::clone(executor))))
    } else if executor.which("brew") {
        Some(Box::new(Brew::new(Arc::clone(executor))))
    } else {
        None
    }
}

/// Shared test helpers for installer unit tests.
///
/// Provides a scriptable [`MockManager`](test_helpers::MockManager) so test
/// modules can drive the retry pipeline without a real package manager.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{Result, bail};

    use super::PackageManager;

    /// How a mock manager responds to `setup_special_package`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum BootstrapBehavior {
        /// `Ok(false)` — package has no special-case handling.
        NotSpecial,
        /// `Ok(true)` — a repository was added.
        Added,
        /// `Err` — the bootstrap command itself failed.
        Fails,
    }

    /// A scriptable package manager.
    ///
    /// `install` consumes scripted results in FIFO order (`Ok` once the queue
    /// is empty) and records every package name; successful installs are
    /// added to the installed set so `is_installed` reflects them.
    pub struct MockManager {
        install_results: Mutex<VecDeque<Result<(), String>>>,
        installed: Mutex<HashSet<String>>,
        install_calls: Mutex<Vec<String>>,
        uninstall_calls: Mutex<Vec<String>>,
        update_calls: AtomicUsize,
        bootstrap_calls: AtomicUsize,
        bootstrap: BootstrapBehavior,
    }

    impl MockManager {
        /// Manager that succeeds on every call.
        #[must_use]
        pub fn succeeding() -> Self {
            Self::with_install_results(vec![])
        }

        /// Manager with scripted install results.
        #[must_use]
        pub fn with_install_results(results: Vec<Result<(), String>>) -> Self {
            Self {
                install_results: Mutex::new(results.into()),
                installed: Mutex::new(HashSet::new()),
                install_calls: Mutex::new(Vec::new()),
                uninstall_calls: Mutex::new(Vec::new()),
                update_calls: AtomicUsize::new(0),
                bootstrap_calls: AtomicUsize::new(0),
                bootstrap: BootstrapBehavior::NotSpecial,
            }
        }

        /// Set the bootstrap behaviour.
        #[must_use]
        pub const fn with_bootstrap(mut self, behavior: BootstrapBehavior) -> Self {
            self.bootstrap = behavior;
            self
        }

        /// Pre-seed a package as installed.
        pub fn mark_installed(&self, package: &str) {
            if let Ok(mut guard) = self.installed.lock() {
                guard.insert(package.to_string());
            }
        }

        /// Package names passed to `install`, in call order.
        #[must_use]
        pub fn install_calls(&self) -> Vec<String> {
            self.install_calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        /// Package names passed to `uninstall`, in call order.
        #[must_use]
        pub fn uninstall_calls(&self) -> Vec<String> {
            self.uninstall_calls
                .lock()
                .map_or_else(|_| vec![], |g| g.clone())
        }

        /// Number of `update` calls made so far.
        #[must_use]
        pub fn update_calls(&self) -> usize {
            self.update_calls.load(Ordering::SeqCst)
        }

        /// Number of `setup_special_package` calls made so far.
        #[must_use]
        pub fn bootstrap_calls(&self) -> usize {
            self.bootstrap_calls.load(Ordering::SeqCst)
        }
    }

    impl PackageManager for MockManager {
        fn name(&self) -> &str {
            "mock"
        }

        fn install(&self, package: &str) -> Result<()> {
            if let Ok(mut guard) = self.install_calls.lock() {
                guard.push(package.to_string());
            }
            let next = self
                .install_results
                .lock()
                .map_or(None, |mut g| g.pop_front());
            match next {
                Some(Err(message)) => bail!("{message}"),
                _ => {
                    if let Ok(mut guard) = self.installed.lock() {
                        guard.insert(package.to_string());
                    }
                    Ok(())
                }
            }
        }

        fn uninstall(&self, package: &str) -> Result<()> {
            if let Ok(mut guard) = self.uninstall_calls.lock() {
                guard.push(package.to_string());
            }
            if let Ok(mut guard) = self.installed.lock() {
                guard.remove(package);
            }
            Ok(())
        }

        fn update(&self) -> Result<()> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn is_installed(&self, package: &str) -> bool {
            self.installed
                .lock()
                .is_ok_and(|guard| guard.contains(package))
        }

        fn setup_special_package(&self, _package: &str) -> Result<bool> {
            self.bootstrap_calls.fetch_add(1, Ordering::SeqCst);
            match self.bootstrap {
                BootstrapBehavior::NotSpecial => Ok(false),
                BootstrapBehavior::Added => Ok(true),
                BootstrapBehavior::Fails => bail!("add-apt-repository failed"),
            }
        }
    }
}
