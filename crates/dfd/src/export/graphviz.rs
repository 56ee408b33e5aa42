//! Graphviz invocation: the thin wrapper turning DOT text into an image.

use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info};

use dfd_core::error::DfdError;
use dfd_core::model::GraphOptions;

use super::templates as TMPL;

/// Render `dot_text` to `output_path` in the given format by piping it to
/// the Graphviz engine. Context diagrams use `neato`, everything else `dot`.
pub fn generate_image(
    graph_options: &GraphOptions,
    dot_text: &str,
    output_path: &Path,
    format: &str,
) -> Result<(), DfdError> {
    let engine = if graph_options.is_context {
        TMPL::ENGINE_CONTEXT
    } else {
        TMPL::ENGINE_DEFAULT
    };
    info!(engine, format; "Invoking Graphviz");

    let mut child = Command::new(engine)
        .arg(format!("-T{format}"))
        .arg(format!("-o{}", output_path.display()))
        .stdin(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(dot_text.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        debug!(dot_text; "Graphviz rejected the generated text");
        return Err(DfdError::Render(format!("{engine} exited with {status}")));
    }
    Ok(())
}

/// Verify that Graphviz is installed and callable.
pub fn check_installed() -> Result<(), DfdError> {
    let result = Command::new(TMPL::ENGINE_DEFAULT)
        .arg("-V")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match result {
        Ok(_) => Ok(()),
        Err(err) => Err(DfdError::Render(format!(
            "\"Graphviz\" seems not installed: {err}"
        ))),
    }
}
