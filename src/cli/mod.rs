//! CLI commands and interface

use clap::{Parser, Subcommand, ValueEnum};
use cortex_surface::io::FormatKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cortex-surface")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Layout of written surface files
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    New,
    Legacy,
}

impl From<OutputFormat> for FormatKind {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::New => FormatKind::New,
            OutputFormat::Legacy => FormatKind::Legacy,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display information about a surface file
    Info {
        /// Path to the surface file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Also write a JSON report
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Write a copy of the surface centered on the origin
    Center {
        /// Path to the surface file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output surface file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Output layout
        #[arg(long, value_enum, default_value_t = OutputFormat::New)]
        format: OutputFormat,
    },

    /// Project the surface onto an ellipsoid
    Ellipsoid {
        /// Path to the surface file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output surface file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Semi-axes "a,b,c" (overrides the configuration)
        #[arg(long, value_name = "A,B,C", value_delimiter = ',')]
        axes: Option<Vec<f32>>,

        /// Output layout
        #[arg(long, value_enum, default_value_t = OutputFormat::New)]
        format: OutputFormat,
    },

    /// Map the surface into Talairach space
    Talairach {
        /// Path to the surface file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output surface file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// JSON transform to use instead of the sibling transform path
        #[arg(long, value_name = "FILE")]
        transform: Option<PathBuf>,

        /// Output layout
        #[arg(long, value_enum, default_value_t = OutputFormat::New)]
        format: OutputFormat,
    },

    /// Export the surface to VTU for visualization
    Export {
        /// Path to the surface file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output VTU file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}
