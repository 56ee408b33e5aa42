//! CLI logic for the dfd diagram tool.
//!
//! Converts a textual data-flow-diagram description into a Graphviz-rendered
//! graphic file (or raw DOT text). In markdown mode, every fenced
//! `data-flow-diagram` snippet of the input document is built to its own
//! output file.

pub mod args;
pub mod config;
pub mod markdown;

pub use args::Args;

use std::fs;
use std::io::{self, Read as _, Write as _};
use std::path::Path;

use log::{debug, info};

use dfd::export::graphviz;
use dfd::pipeline::{BuildOptions, build};
use dfd_core::error::DfdError;
use dfd_core::model::{GraphOptions, SnippetMap};
use dfd_core::source::SourceMap;

/// Run the application with the given command-line args.
pub fn run(args: &Args) -> Result<(), DfdError> {
    let app_config = config::load_config(args.config.as_ref())?;

    let format = args
        .format
        .clone()
        .or(app_config.format)
        .unwrap_or_else(|| "svg".to_string());
    let options = BuildOptions {
        background_color: args
            .background_color
            .clone()
            .or(app_config.background_color),
        no_graph_title: args.no_graph_title,
        format,
        no_check_dependencies: args.no_check_dependencies,
    };

    // raw DOT output needs no renderer; everything else does
    if options.format != "dot" {
        graphviz::check_installed()?;
    }

    // resolve the input source (file or stdin)
    let (input_text, provenance) = match &args.input {
        Some(path) => (fs::read_to_string(path)?, format!("<file:{path}>")),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            (buffer, "<stdin>".to_string())
        }
    };

    info!(provenance, format = options.format; "Processing diagram source");

    if args.markdown {
        return handle_markdown_source(&options, &provenance, &input_text);
    }

    // resolve the output path (explicit, derived from the input, or stdout)
    let output_path = match &args.output_file {
        Some(path) => path.clone(),
        None => match &args.input {
            Some(input) => format!("{}.{}", stem(input), options.format),
            None => "-".to_string(),
        },
    };

    handle_dfd_source(&options, &provenance, &input_text, &output_path)
}

/// Build a single DFD source and write its output.
fn handle_dfd_source(
    options: &BuildOptions,
    provenance: &str,
    input: &str,
    output_path: &str,
) -> Result<(), DfdError> {
    let mut map = SourceMap::new();
    let root = map.root(provenance);
    let title = if output_path == "-" {
        String::new()
    } else {
        stem(output_path)
    };
    let (dot_text, graph_options) = build(&mut map, Some(root), input, &title, options, None)?;
    write_output(&dot_text, output_path, &options.format, &graph_options)
}

/// Markdown mode: isolate the snippets and build each one to its own
/// output file.
fn handle_markdown_source(
    options: &BuildOptions,
    provenance: &str,
    text: &str,
) -> Result<(), DfdError> {
    let snippets = markdown::extract_snippets(text);
    markdown::check_snippets_unicity(provenance, &snippets)?;
    let snippet_by_name: SnippetMap = snippets
        .iter()
        .map(|snippet| (snippet.name.clone(), snippet.clone()))
        .collect();

    for snippet in &snippets {
        // a snippet without an output file serves as includee only
        if snippet.output.starts_with('#') {
            continue;
        }

        let mut map = SourceMap::new();
        // container root: error messages number lines relative to the host
        let root = map.container(
            format!("{provenance}<snippet:{}>", snippet.output),
            snippet.line_nr,
        );
        let title = stem(&snippet.output);
        let (dot_text, graph_options) = build(
            &mut map,
            Some(root),
            &snippet.text,
            &title,
            options,
            Some(&snippet_by_name),
        )?;
        write_output(&dot_text, &snippet.output, &options.format, &graph_options)?;
        debug!(output = snippet.output; "Generated snippet output");
    }
    Ok(())
}

/// Write pipeline output (DOT text or rendered image) to a file or stdout.
fn write_output(
    dot_text: &str,
    output_path: &str,
    format: &str,
    graph_options: &GraphOptions,
) -> Result<(), DfdError> {
    if format == "dot" {
        if output_path == "-" {
            println!("{dot_text}");
        } else {
            fs::write(output_path, dot_text)?;
        }
        return Ok(());
    }

    if output_path == "-" {
        // render into a temporary file, then copy to stdout
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(format!("output.{format}"));
        graphviz::generate_image(graph_options, dot_text, &path, format)?;
        let bytes = fs::read(&path)?;
        io::stdout().write_all(&bytes)?;
        return Ok(());
    }

    graphviz::generate_image(graph_options, dot_text, Path::new(output_path), format)
}

/// Path without its extension, directories preserved.
pub(crate) fn stem(path: &str) -> String {
    match path.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('/') && !ext.contains('/') => {
            stem.to_string()
        }
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem() {
        assert_eq!(stem("diagram.svg"), "diagram");
        assert_eq!(stem("dir.d/diagram.svg"), "dir.d/diagram");
        assert_eq!(stem("noext"), "noext");
        assert_eq!(stem("dir.d/noext"), "dir.d/noext");
    }
}
