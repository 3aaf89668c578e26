//! CLI argument definitions for `facetsync`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "facetsync",
    version,
    about = "Replay, inspect and link filter panel state",
    long_about = "Drive a filter panel through scripted gestures and watch its state settle \
                  into the address bar and the browser-style stores.\n\n\
                  Session files stand in for a browser tab, so running twice with the same \
                  session simulates a reload."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: the platform config directory).
    #[arg(long = "settings", value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a script of panel commands and report every commit.
    Replay(ReplayArgs),

    /// Mount a panel and show what each field resolves to.
    Resolve(TabArgs),

    /// Build a link from a URL with some entries changed.
    Link(LinkArgs),

    /// List the available panels.
    Presets,

    /// Write the current settings to the settings file.
    Init,
}

/// Where the panel is mounted.
#[derive(Args)]
pub struct TabArgs {
    /// Panel to mount.
    #[arg(long = "panel", default_value = "catalog")]
    pub panel: String,

    /// Address to open (default: the session URL, then the panel path).
    #[arg(long = "url")]
    pub url: Option<String>,

    /// Session file holding the tab's URL and store. Created if missing.
    #[arg(long = "session", value_name = "PATH")]
    pub session: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON script of timed panel commands.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    #[command(flatten)]
    pub tab: TabArgs,

    /// Sleep on the wall clock instead of jumping between deadlines.
    #[arg(long = "realtime")]
    pub realtime: bool,

    /// Close the panel after the last step, cancelling commits still pending.
    #[arg(long = "no-settle")]
    pub no_settle: bool,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Current address.
    #[arg(long = "from", default_value = "/")]
    pub from: String,

    /// Path of the new link (default: the path of --from).
    #[arg(long = "base")]
    pub base: Option<String>,

    /// Set KEY to VALUE. VALUE is used as JSON when it parses, else as a string.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Keep KEY with an empty value.
    #[arg(long = "clear", value_name = "KEY")]
    pub clear: Vec<String>,

    /// Drop KEY from the link.
    #[arg(long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
