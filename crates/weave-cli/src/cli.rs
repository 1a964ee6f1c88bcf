//! CLI argument definitions for the Weave linker.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "weave",
    version,
    about = "Weave module linker - turn directory conventions into wiring modules",
    long_about = "Scan module source trees, interpret naming conventions as declarations\n\
                  (routes, actions, event listeners, translations), resolve cross-module\n\
                  conflicts by priority, and generate the glue modules plus installation\n\
                  entrypoints that wire everything into the application."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan module trees and generate the wiring modules.
    Link(LinkArgs),

    /// List the registered declaration categories and module hooks.
    Categories,
}

#[derive(Parser)]
pub struct LinkArgs {
    /// Module directories to scan, in registration order.
    #[arg(value_name = "MODULE_DIR", required = true)]
    pub modules: Vec<PathBuf>,

    /// Output directory for the generated trees (default: ./generated).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run the full pass even when nothing changed since the last link.
    ///
    /// Setting the WEAVE_FORCE environment variable has the same effect.
    #[arg(long = "force")]
    pub force: bool,

    /// Scan, resolve, and report without writing any files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
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
