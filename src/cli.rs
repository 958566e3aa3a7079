use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the bootstrap engine.
#[derive(Parser, Debug)]
#[command(
    name = "devsetup",
    about = "Developer machine bootstrap engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Tool catalog file (default: tools.toml)
    #[arg(short, long, global = true)]
    pub catalog: Option<std::path::PathBuf>,

    /// Target shell (bash, zsh, fish); detected from $SHELL when omitted
    #[arg(long, global = true)]
    pub shell: Option<String>,

    /// Override the rc file that shell config and plugins are written to
    #[arg(long, global = true)]
    pub rc_file: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install tools from the catalog
    Install(InstallOpts),
    /// Manage shell plugins
    Plugin {
        #[command(subcommand)]
        action: PluginCommand,
    },
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Install only specific tools
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip specific tools
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Maximum install attempts per package
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

/// Plugin management actions.
#[derive(Subcommand, Debug, Clone)]
pub enum PluginCommand {
    /// Register a plugin and activate its source line
    Add {
        /// Path used in the rc file source line
        path: String,

        /// Explicit plugin name (defaults to the path's file stem)
        #[arg(long)]
        name: Option<String>,

        /// Plugin version
        #[arg(long)]
        version: Option<String>,

        /// Plugin description
        #[arg(long)]
        description: Option<String>,

        /// Plugin dependencies (by name)
        #[arg(long, value_delimiter = ',')]
        depends: Vec<String>,
    },
    /// Unregister a plugin and remove its source lines
    Remove { name: String },
    /// Enable a plugin (dependencies must be enabled first)
    Enable { name: String },
    /// Disable a plugin (no enabled plugin may depend on it)
    Disable { name: String },
    /// List plugins found in the rc file
    List,
    /// Record a new version for a plugin
    Update { name: String, version: String },
}
