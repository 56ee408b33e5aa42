//! Pipeline orchestrator: scan → parse → check → filter → generate.

use std::collections::HashSet;

use log::{debug, info};

use dfd_core::error::{Diagnostic, DfdError, ErrorKind};
use dfd_core::identifier::Name;
use dfd_core::model::{GraphOptions, SnippetMap, Statement, Style, StyleOption};
use dfd_core::source::{LineId, SourceMap};
use dfd_parser::{checker, parser, scanner};

use crate::export::dot::{Generator, generate_dot};
use crate::{dependency, filters};

/// Caller-level options for one build, typically from the command line.
///
/// These override the corresponding in-diagram `style` settings.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub background_color: Option<String>,
    pub no_graph_title: bool,
    /// Output format: anything Graphviz supports, or `dot` for raw DOT text.
    pub format: String,
    pub no_check_dependencies: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            background_color: None,
            no_graph_title: false,
            format: "svg".to_string(),
            no_check_dependencies: false,
        }
    }
}

/// Take a DFD source and build the DOT text and the resolved graph options.
///
/// `provenance` is the synthetic root line for error reporting (`None` for a
/// plain `<input>` root); `title` is the graph title, usually the output
/// base name; `snippets` is the snippet table when building from a markdown
/// host document.
pub fn build(
    map: &mut SourceMap,
    provenance: Option<LineId>,
    dfd_src: &str,
    title: &str,
    options: &BuildOptions,
    snippets: Option<&SnippetMap>,
) -> Result<(String, GraphOptions), DfdError> {
    info!("Building diagram");

    // scan (includes, line continuations) and parse the DSL into statements
    let lines = scanner::scan(map, provenance, dfd_src, snippets)?;
    let (statements, dependencies, attribs) =
        parser::parse(map, &lines).map_err(DfdError::from)?;
    if !dependencies.is_empty() && !options.no_check_dependencies {
        dependency::check(map, &dependencies, snippets)?;
    }

    // validate statements and apply filters
    let items_by_name = checker::check(map, &statements).map_err(DfdError::from)?;
    let statements = filters::handle_filters(map, statements).map_err(DfdError::from)?;
    let statements = remove_unused_hidables(statements);
    let (statements, graph_options) = handle_options(map, statements).map_err(DfdError::from)?;

    // resolve title and background color (caller options override DFD styles)
    let title = if options.no_graph_title || graph_options.no_graph_title {
        ""
    } else {
        title
    };
    let bg_color = options
        .background_color
        .as_deref()
        .or(graph_options.background_color.as_deref());

    // generate the DOT text
    let generator = Generator::new(map, &graph_options, &attribs);
    let text = generate_dot(generator, title, bg_color, &statements, &items_by_name)
        .map_err(DfdError::from)?;
    debug!(bytes = text.len(); "Generated DOT text");

    Ok((text, graph_options))
}

/// Drop hidable items that have no connections (conditional items marked
/// with `?`).
pub fn remove_unused_hidables(statements: Vec<Statement>) -> Vec<Statement> {
    let mut connected_items: HashSet<Name> = HashSet::new();
    for statement in &statements {
        if let Statement::Connection(conn) = statement {
            for endpoint in [conn.src, conn.dst] {
                if let Some(name) = endpoint.name() {
                    connected_items.insert(name);
                }
            }
        }
    }

    statements
        .into_iter()
        .filter(|statement| match statement {
            Statement::Item(item) => !item.hidable || connected_items.contains(&item.name),
            _ => true,
        })
        .collect()
}

/// Extract style statements into [`GraphOptions`] and return the remaining
/// statements.
pub fn handle_options(
    map: &SourceMap,
    statements: Vec<Statement>,
) -> Result<(Vec<Statement>, GraphOptions), Diagnostic> {
    let mut options = GraphOptions::default();
    let mut new_statements: Vec<Statement> = Vec::new();

    for statement in statements {
        let Statement::Style(style) = &statement else {
            new_statements.push(statement);
            continue;
        };
        let Ok(option) = style.name.parse::<StyleOption>() else {
            return Err(Diagnostic::new(
                ErrorKind::Style,
                format!("Unsupported style \"{}\"", style.name),
            )
            .with_source(map, style.source));
        };
        match option {
            StyleOption::Vertical => options.is_vertical = true,
            StyleOption::Horizontal => options.is_vertical = false,
            StyleOption::Context => options.is_context = true,
            StyleOption::Rotated => options.is_rotated = true,
            StyleOption::Unrotated => options.is_rotated = false,
            StyleOption::ItemTextWidth => options.item_text_width = parse_width(map, style)?,
            StyleOption::ConnectionTextWidth => {
                options.connection_text_width = parse_width(map, style)?
            }
            StyleOption::BackgroundColor => {
                options.background_color = Some(style.value.clone())
            }
            StyleOption::NoGraphTitle => options.no_graph_title = true,
        }
    }

    Ok((new_statements, options))
}

fn parse_width(map: &SourceMap, style: &Style) -> Result<usize, Diagnostic> {
    style.value.parse::<usize>().map_err(|err| {
        Diagnostic::new(
            ErrorKind::Style,
            format!(
                "Invalid value \"{}\" for style \"{}\": {err}",
                style.value, style.name
            ),
        )
        .with_source(map, style.source)
    })
}
