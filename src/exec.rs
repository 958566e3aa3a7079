//! Subprocess execution abstraction.
//!
//! All external commands — package managers, post-install hooks, verification
//! probes — go through the [`Executor`] trait so that the install pipeline can
//! be exercised in tests without touching the system.
use anyhow::{Context, Result, bail};
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over subprocess invocation.
///
/// [`SystemExecutor`] is the real implementation; tests substitute scripted
/// mocks so no package manager is ever actually driven.
pub trait Executor: Send + Sync {
    /// Run a command, failing if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns the result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the command cannot be spawned at all.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command line through a POSIX shell (`sh -c "<command>"`),
    /// failing if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be spawned or the command exits
    /// non-zero.
    fn run_shell(&self, command: &str) -> Result<ExecResult>;

    /// Run a command line through a POSIX shell, allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the shell cannot be spawned at all.
    fn run_shell_unchecked(&self, command: &str) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// Executor backed by real system processes.
#[derive(Debug, Clone, Copy)]
pub struct SystemExecutor;

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_checked(cmd, program)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_shell(&self, command: &str) -> Result<ExecResult> {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        execute_checked(cmd, command)
    }

    fn run_shell_unchecked(&self, command: &str) -> Result<ExecResult> {
        let output = Command::new("sh")
            .args(["-c", command])
            .output()
            .with_context(|| format!("failed to execute shell command: {command}"))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
