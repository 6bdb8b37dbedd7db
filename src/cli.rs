//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand, ValueEnum};
use sitewright::generate::Creativity;
use std::path::PathBuf;

/// Sitewright theme runtime CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: sitewright.toml)
    #[arg(short = 'C', long, default_value = "sitewright.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// What a generate run targets.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateTarget {
    /// One component from the theme's template candidates
    Component,
    /// A complete theme file set
    Theme,
}

/// Creativity level for generated copy.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreativityArg {
    Conservative,
    Balanced,
    Experimental,
}

impl From<CreativityArg> for Creativity {
    fn from(arg: CreativityArg) -> Self {
        match arg {
            CreativityArg::Conservative => Creativity::Conservative,
            CreativityArg::Balanced => Creativity::Balanced,
            CreativityArg::Experimental => Creativity::Experimental,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scan a theme directory and report its component manifest
    Discover {
        /// Theme id (directory name under the themes root)
        theme: String,

        /// Write the registration manifest module into the theme
        #[arg(long)]
        write_manifest: bool,
    },

    /// Compose a page from a site fixture and print the rendered HTML
    Render {
        /// Theme id providing the component registry
        theme: String,

        /// TOML file holding the site read model
        #[arg(short, long)]
        site: PathBuf,

        /// Page id to render (defaults to the first page)
        #[arg(short, long)]
        page: Option<String>,

        /// Write the HTML fragment here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run the generation pipeline against a theme
    Generate {
        /// What to generate
        target: GenerateTarget,

        /// Free-form description of what to produce
        intent: String,

        /// Theme id the result targets
        theme: String,

        /// Site name used as brand context
        #[arg(long, default_value = "Untitled Site")]
        site_name: String,

        /// Site industry used as brand context
        #[arg(long, default_value = "")]
        industry: String,

        /// Visual style preference
        #[arg(long)]
        style: Option<String>,

        /// Brand personality
        #[arg(long)]
        personality: Option<String>,

        /// Creativity level (overrides the configured default)
        #[arg(long, value_enum)]
        creativity: Option<CreativityArg>,

        /// Replay a captured backend response from this file instead of
        /// calling a live backend
        #[arg(long)]
        response_file: Option<PathBuf>,

        /// Apply a generated theme to the live directory (backup first)
        #[arg(long)]
        apply: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_discover(&self) -> bool {
        matches!(self.command, Commands::Discover { .. })
    }
    pub const fn is_render(&self) -> bool {
        matches!(self.command, Commands::Render { .. })
    }
    pub const fn is_generate(&self) -> bool {
        matches!(self.command, Commands::Generate { .. })
    }
}
