//! Command-line argument definitions for the dfd CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, output format,
//! markdown mode, dependency checking, and logging verbosity.

use clap::Parser;

/// Command-line tool to generate data flow diagrams from text
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// DFD input file; if omitted, stdin is used
    pub input: Option<String>,

    /// Output file name; pass '-' to use stdout; if omitted, use the input
    /// base name with the format's extension, or stdout
    #[arg(short, long)]
    pub output_file: Option<String>,

    /// Consider snippets between opening marker "```data-flow-diagram
    /// OUTFILE" and closing marker "```", generating every diagram contained
    /// in a markdown input file
    #[arg(short, long)]
    pub markdown: bool,

    /// Output format: anything supported by Graphviz (svg, png, pdf, ...),
    /// or "dot" for the raw Graphviz DOT text; default is svg
    #[arg(short, long)]
    pub format: Option<String>,

    /// Background color name (including 'none' for transparent) in web
    /// color notation; default is white
    #[arg(short, long)]
    pub background_color: Option<String>,

    /// Suppress the graph title
    #[arg(long)]
    pub no_graph_title: bool,

    /// Suppress dependency checking
    #[arg(long)]
    pub no_check_dependencies: bool,

    /// Path to a configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
