//! Developer machine bootstrap engine.
//!
//! Installs command-line tools through whichever native package manager is
//! present (apt, dnf, pacman, brew) and patches the user's shell
//! configuration: exported variables, PATH entries, aliases, functions, and
//! `source`d plugins with dependency-aware enable/disable.
//!
//! The public API is organised into four layers:
//!
//! - **[`exec`] / [`manager`]** — subprocess and package manager abstractions
//! - **[`installer`]** — package name resolution and the retrying install
//!   pipeline with repository bootstrap, rollback, and verification
//! - **[`shellcfg`] / [`plugins`]** — rc-file rendering, merging, and plugin
//!   source-line management
//! - **[`commands`]** — top-level subcommand orchestration (`install`,
//!   `plugin`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod error;
pub mod exec;
pub mod installer;
pub mod logging;
pub mod manager;
pub mod plugins;
pub mod shellcfg;
