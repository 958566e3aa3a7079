//! Shared mocks for integration tests.
#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};

use devsetup_cli::exec::{ExecResult, Executor};
use devsetup_cli::manager::PackageManager;

/// How [`MockManager`] responds to `setup_special_package`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapBehavior {
    NotSpecial,
    Added,
    Fails,
}

/// A scriptable package manager.
///
/// `install` consumes scripted results in FIFO order (`Ok` once the queue is
/// empty) and records every package name; successful installs are added to
/// the installed set so `is_installed` reflects them.
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
    pub fn succeeding() -> Self {
        Self::with_install_results(vec![])
    }

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

    pub fn with_bootstrap(mut self, behavior: BootstrapBehavior) -> Self {
        self.bootstrap = behavior;
        self
    }

    pub fn mark_installed(&self, package: &str) {
        self.installed
            .lock()
            .expect("installed set lock")
            .insert(package.to_string());
    }

    pub fn install_calls(&self) -> Vec<String> {
        self.install_calls.lock().expect("install calls lock").clone()
    }

    pub fn uninstall_calls(&self) -> Vec<String> {
        self.uninstall_calls
            .lock()
            .expect("uninstall calls lock")
            .clone()
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn bootstrap_calls(&self) -> usize {
        self.bootstrap_calls.load(Ordering::SeqCst)
    }
}

impl PackageManager for MockManager {
    fn name(&self) -> &str {
        "mock"
    }

    fn install(&self, package: &str) -> Result<()> {
        self.install_calls
            .lock()
            .expect("install calls lock")
            .push(package.to_string());
        let next = self
            .install_results
            .lock()
            .expect("install results lock")
            .pop_front();
        match next {
            Some(Err(message)) => bail!("{message}"),
            _ => {
                self.installed
                    .lock()
                    .expect("installed set lock")
                    .insert(package.to_string());
                Ok(())
            }
        }
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        self.uninstall_calls
            .lock()
            .expect("uninstall calls lock")
            .push(package.to_string());
        self.installed
            .lock()
            .expect("installed set lock")
            .remove(package);
        Ok(())
    }

    fn update(&self) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_installed(&self, package: &str) -> bool {
        self.installed
            .lock()
            .expect("installed set lock")
            .contains(package)
    }

    fn setup_special_package(&self, _package: &str) -> Result<bool> {
        self.bootstrap_calls.fetch_add(1, Ordering::SeqCst);
        match self.bootstrap {
            BootstrapBehavior::NotSpecial => Ok(false),
            BootstrapBehavior::Added => Ok(true),
            BootstrapBehavior::Fails => bail!("repository bootstrap failed"),
        }
    }
}

/// A scriptable executor with a FIFO `(success, stdout)` response queue.
///
/// When the queue is empty any call fails. Failed responses bail with the
/// scripted stdout as the error message (empty text gets a generic one).
pub struct MockExecutor {
    responses: Mutex<VecDeque<(bool, String)>>,
    which_result: bool,
}

impl MockExecutor {
    pub fn ok(stdout: &str) -> Self {
        Self::with_responses(vec![(true, stdout.to_string())])
    }

    pub fn fail() -> Self {
        Self::with_responses(vec![(false, String::new())])
    }

    pub fn with_responses(responses: Vec<(bool, String)>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            which_result: false,
        }
    }

    pub fn with_which(mut self, result: bool) -> Self {
        self.which_result = result;
        self
    }

    fn next(&self) -> (bool, String) {
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| (false, "unexpected call".to_string()))
    }

    fn next_result(&self) -> Result<ExecResult> {
        let (success, stdout) = self.next();
        if success {
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success: true,
                code: Some(0),
            })
        } else if stdout.is_empty() {
            bail!("mock command failed")
        } else {
            bail!("{stdout}")
        }
    }

    fn next_unchecked(&self) -> Result<ExecResult> {
        let (success, stdout) = self.next();
        Ok(ExecResult {
            stdout,
            stderr: String::new(),
            success,
            code: Some(i32::from(!success)),
        })
    }
}

impl Executor for MockExecutor {
    fn run(&self, _: &str, _: &[&str]) -> Result<ExecResult> {
        self.next_result()
    }

    fn run_unchecked(&self, _: &str, _: &[&str]) -> Result<ExecResult> {
        self.next_unchecked()
    }

    fn run_shell(&self, _: &str) -> Result<ExecResult> {
        self.next_result()
    }

    fn run_shell_unchecked(&self, _: &str) -> Result<ExecResult> {
        self.next_unchecked()
    }

    fn which(&self, _: &str) -> bool {
        self.which_result
    }
}
