//! Clap derive structures for the `ixtwin` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ixtwin -- drive an IXP digital twin from the command line
#[derive(Debug, Parser)]
#[command(
    name = "ixtwin",
    version,
    about = "Control an IXP digital twin from the command line",
    long_about = "Start, stop, and reload an emulated Internet Exchange, manage its\n\
        resource files, compare route-server RIBs, and run commands inside\n\
        emulated machines.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "IXTWIN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "IXTWIN_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "IXTWIN_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "IXTWIN_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "IXTWIN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the digital twin status
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Start the digital twin
    Start(StartArgs),

    /// Stop the digital twin
    Stop,

    /// Reload the digital twin configuration
    Reload(ReloadArgs),

    /// Manage resource files
    #[command(alias = "f")]
    Files(FilesArgs),

    /// Compare and capture route-server RIBs
    Rib(RibArgs),

    /// Run a command inside an emulated machine
    #[command(alias = "x")]
    Exec(ExecArgs),

    /// Show per-machine resource usage
    #[command(alias = "m")]
    Machines,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIFECYCLE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Keep polling and print every change until interrupted
    #[arg(long, short = 'w')]
    pub watch: bool,
}

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Cap the number of devices brought up (default: all)
    #[arg(long, short = 'n')]
    pub max_devices: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ReloadArgs {
    /// Only reconfigure the route servers
    #[arg(long)]
    pub rs_only: bool,

    /// Cap the number of devices brought up (default: all)
    #[arg(long, short = 'n')]
    pub max_devices: Option<u32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FILES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// List files in the resource directory
    #[command(alias = "ls")]
    List,

    /// Upload a single file
    Upload {
        /// Local file to upload
        path: PathBuf,
    },

    /// Upload a directory, keeping its layout
    UploadDir {
        /// Local directory to upload
        path: PathBuf,
    },

    /// List the RIB dumps the backend settings refer to
    RibDumps,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RIB
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RibArgs {
    #[command(subcommand)]
    pub command: RibCommand,
}

#[derive(Debug, Subcommand)]
pub enum RibCommand {
    /// List route servers from the topology configuration
    #[command(alias = "ls")]
    Servers,

    /// Diff a route server's live RIB against an uploaded dump
    Compare {
        /// Route server name
        #[arg(long, short = 's')]
        server: String,

        /// Resource file holding the reference dump
        #[arg(long, short = 'f')]
        file: String,

        /// List the differing routes
        #[arg(long, short = 'd')]
        details: bool,
    },

    /// Save a route server's live RIB to a local file
    Download {
        /// Route server name
        #[arg(long, short = 's')]
        server: String,

        /// Directory to write into (default: profile download_dir, then cwd)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EXEC
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Machine name
    pub machine: String,

    /// Command line to run
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub command: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with a profile
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Backend URL (prompted for when omitted on a terminal)
        #[arg(long)]
        url: Option<String>,

        /// Overwrite an existing profile of the same name
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (backend, timeout, poll_interval_secs, download_dir, ca_cert, insecure)
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
