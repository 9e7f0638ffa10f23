//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Drydock - build RPM packages inside Docker containers
#[derive(Parser)]
#[command(name = "drydock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build RPMs for the targets declared in Drydock.toml
    Build(BuildArgs),

    /// List the configured platforms
    Platforms(PlatformsArgs),

    /// Print the build requirements declared by a spec file
    Requires(RequiresArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for build messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MessageFormatArg {
    /// Human-readable logging
    #[default]
    Human,
    /// One JSON event per line
    Json,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Specific targets to build (defaults to all declared targets)
    pub targets: Vec<String>,

    /// Platform to build RPMs for
    #[arg(long)]
    pub platform: Option<String>,

    /// Name of the docker command to invoke
    #[arg(long)]
    pub docker: Option<String>,

    /// Do not cache the results of `docker build`
    #[arg(long)]
    pub no_cache: bool,

    /// Do not remove the build directory, container, or image
    #[arg(long)]
    pub keep_build_products: bool,

    /// Keep processing remaining targets after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// Drop to a shell inside the container before invoking `rpmbuild`
    #[arg(long)]
    pub shell_before: bool,

    /// Drop to a shell inside the container after invoking `rpmbuild`
    #[arg(long)]
    pub shell_after: bool,

    /// Directory the recovered RPMs are written under
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format for build messages
    #[arg(long, value_enum, default_value = "human")]
    pub message_format: MessageFormatArg,
}

#[derive(Args)]
pub struct PlatformsArgs {}

#[derive(Args)]
pub struct RequiresArgs {
    /// Path to the RPM spec file
    pub spec: PathBuf,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
