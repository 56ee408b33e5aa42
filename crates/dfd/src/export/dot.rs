//! DOT code generation: Generator state and statement-to-DOT dispatch.

use std::sync::LazyLock;

use indexmap::IndexMap;
use log::trace;
use regex::Regex;

use dfd_core::error::{Diagnostic, ErrorKind};
use dfd_core::identifier::Name;
use dfd_core::model::{
    Connection, ConnectionKind, Endpoint, Frame, GraphOptions, Item, ItemKind, Statement,
};
use dfd_core::source::{LineId, SourceMap, pack};
use dfd_parser::parser::Attribs;

use super::templates as TMPL;

// Labels like "1. text" are re-laid-out number first, text below.
static RX_NUMBERED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+[.])(.*)").expect("numbered-name pattern is valid"));

/// Wrap label text to `cols` columns, preserving explicit `\n` breaks.
/// Words longer than the width are not broken.
pub(crate) fn wrap(text: &str, cols: usize) -> String {
    let mut result: Vec<String> = Vec::new();
    for part in text.trim().split("\\n") {
        let wrapped = wrap_part(part, cols);
        if wrapped.is_empty() {
            result.push(String::new());
        } else {
            result.extend(wrapped);
        }
    }
    result.join("\\n")
}

fn wrap_part(text: &str, cols: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= cols {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Remove matching quotes from an attribute value.
fn strip_quotes(s: &str) -> &str {
    if s.starts_with('"') {
        s.trim_matches('"')
    } else if s.starts_with('\'') {
        s.trim_matches('\'')
    } else {
        s
    }
}

/// DOT generation state: the emitted lines plus the star/frame counters.
pub struct Generator<'a> {
    map: &'a SourceMap,
    graph_options: &'a GraphOptions,
    attribs: &'a Attribs,
    attribs_rx: Option<Regex>,
    lines: Vec<String>,
    star_nr: usize,
    frame_nr: usize,
}

impl<'a> Generator<'a> {
    pub fn new(map: &'a SourceMap, graph_options: &'a GraphOptions, attribs: &'a Attribs) -> Self {
        Self {
            map,
            graph_options,
            attribs,
            attribs_rx: compile_attribs_names(attribs),
            lines: Vec::new(),
            star_nr: 0,
            frame_nr: 0,
        }
    }

    /// Emit one generated line, preceded by a comment citing its source.
    fn append(&mut self, line: String, source: LineId) {
        let src = self.map.get(source);
        let nr = src.line_index.unwrap_or(0);
        let text = pack(&src.text);
        self.lines.push(String::new());
        self.lines.push(format!("/* {nr}: {text} */"));
        self.lines.push(line);
    }

    /// Substitute whole-word attrib aliases in an attribute string.
    fn expand_attribs(&self, attrs: &str) -> String {
        let Some(rx) = &self.attribs_rx else {
            return attrs.to_string();
        };
        rx.replace_all(attrs, |caps: &regex::Captures<'_>| {
            match self.attribs.get(&caps[0]) {
                Some(attrib) => attrib.text.clone(),
                // pattern is built from the table keys, so this cannot miss
                None => caps[0].to_string(),
            }
        })
        .into_owned()
    }

    /// Emit the DOT declaration for a single item.
    fn generate_item(&mut self, item: &Item) -> Result<(), Diagnostic> {
        let mut label = item.label.clone();
        if let Some(caps) = RX_NUMBERED_NAME.captures(&label) {
            label = format!("{}\\n{}", &caps[1], &caps[2]);
        }
        let label = wrap(&label, self.graph_options.item_text_width);
        let attrs = self.expand_attribs(&item.attrs);

        let line = match item.kind {
            ItemKind::Process => {
                let (shape, fill) = if self.graph_options.is_context {
                    (TMPL::SHAPE_PROCESS_CONTEXT, TMPL::FILL_PROCESS_CONTEXT)
                } else {
                    (TMPL::SHAPE_PROCESS, TMPL::FILL_PROCESS)
                };
                format!(
                    "\"{}\" [shape={} label=\"{}\" fillcolor={} style={} {}]",
                    item.name,
                    shape,
                    label,
                    fill,
                    TMPL::STYLE_PROCESS,
                    attrs
                )
            }
            ItemKind::Control => format!(
                "\"{}\" [shape={} label=\"{}\" fillcolor={} style={} {}]",
                item.name,
                TMPL::SHAPE_PROCESS,
                label,
                TMPL::FILL_PROCESS,
                TMPL::STYLE_CONTROL,
                attrs
            ),
            ItemKind::Entity => format!(
                "\"{}\" [shape={} label=\"{}\" {}]",
                item.name,
                TMPL::SHAPE_ENTITY,
                label,
                attrs
            ),
            ItemKind::None => format!(
                "\"{}\" [shape={} label=\"{}\" {}]",
                item.name,
                TMPL::SHAPE_NONE,
                label,
                attrs
            ),
            ItemKind::Store => self.render_html_item(TMPL::STORE, item, &label, &attrs)?,
            ItemKind::Channel => {
                // the bar flips when the layout is vertical
                let template = if self.graph_options.is_vertical {
                    TMPL::CHANNEL_HORIZONTAL
                } else {
                    TMPL::CHANNEL
                };
                self.render_html_item(template, item, &label, &attrs)?
            }
        };
        self.append(line, item.source);
        Ok(())
    }

    /// Fill an HTML-label template (store, channel) with the item's fields
    /// and its `key=value` attributes.
    fn render_html_item(
        &self,
        template: &str,
        item: &Item,
        label: &str,
        attrs: &str,
    ) -> Result<String, Diagnostic> {
        let html_label = label.replace("\\n", "<br/>");
        let mut color = "black".to_string();
        let mut fontcolor = "black".to_string();

        for token in attrs.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                return Err(Diagnostic::new(
                    ErrorKind::Syntax,
                    format!(
                        "Invalid attribute \"{token}\" in item \"{}\"; \
                         maybe referring to an inexistent attrib alias?",
                        item.name
                    ),
                )
                .with_source(self.map, item.source));
            };
            match key {
                "color" => color = strip_quotes(value).to_string(),
                "fontcolor" => fontcolor = strip_quotes(value).to_string(),
                // other attributes have no slot in the table templates
                _ => {}
            }
        }

        Ok(template
            .replace("{name}", &item.name.resolve())
            .replace("{text}", &html_label)
            .replace("{color}", &color)
            .replace("{fontcolor}", &fontcolor))
    }

    /// Materialize an anonymous `*` endpoint as a star pseudo-item carrying
    /// the connection's label.
    fn generate_star(&mut self, text: &str) -> String {
        let text = wrap(text, self.graph_options.item_text_width);
        let star_name = TMPL::STAR_NODE_FMT.replace("{nr}", &self.star_nr.to_string());
        self.lines.push(format!(
            "\"{star_name}\" [shape=none label=\"{text}\" {}]",
            TMPL::DOT_FONT_EDGE
        ));
        self.star_nr += 1;
        star_name
    }

    /// Build the DOT attribute string for a connection edge.
    fn build_connection_attrs(&self, conn: &Connection, text: &str) -> String {
        let mut attrs = format!("label=\"{text}\"");

        // constraints are invisible layout-only edges; a labeled one without
        // explicit attrs still reserves space for its label
        if conn.kind == ConnectionKind::Constraint {
            if !text.is_empty() && conn.attrs.is_empty() {
                attrs.push_str(TMPL::ATTR_CONSTRAINT_LABELED);
            } else {
                attrs.push_str(TMPL::ATTR_CONSTRAINT_HIDDEN);
            }
        }

        if !conn.attrs.is_empty() {
            attrs.push(' ');
            attrs.push_str(&self.expand_attribs(&conn.attrs));
        }

        match conn.kind {
            ConnectionKind::Flow => {
                if conn.reversed {
                    attrs.push_str(TMPL::ATTR_DIR_BACK);
                }
            }
            ConnectionKind::Bflow => attrs.push_str(TMPL::ATTR_DIR_BOTH),
            ConnectionKind::Cflow => {
                if conn.reversed {
                    attrs.push_str(TMPL::ATTR_DIR_BACK);
                    attrs.push_str(TMPL::ATTR_CFLOW_TAIL);
                } else {
                    attrs.push_str(TMPL::ATTR_CFLOW_HEAD);
                }
            }
            ConnectionKind::Uflow => attrs.push_str(TMPL::ATTR_DIR_NONE),
            ConnectionKind::Signal => {
                if conn.reversed {
                    attrs.push_str(TMPL::ATTR_DIR_BACK);
                }
                attrs.push_str(TMPL::ATTR_STYLE_DASHED);
            }
            ConnectionKind::Constraint => {}
        }

        if conn.relaxed {
            attrs.push_str(TMPL::ATTR_RELAXED);
        }
        attrs
    }

    /// Emit the DOT edge declaration for a connection.
    fn generate_connection(
        &mut self,
        conn: &Connection,
        src_item: Option<&Item>,
        dst_item: Option<&Item>,
    ) {
        let mut text = wrap(&conn.label, self.graph_options.connection_text_width);

        // resolve endpoints: anonymous ("*") endpoints become star items,
        // taking the label with them
        let mut src_port = "";
        let mut dst_port = "";

        let src_name = match src_item {
            None => {
                let name = self.generate_star(&text);
                text = String::new();
                name
            }
            Some(item) => {
                if item.kind == ItemKind::Channel {
                    src_port = TMPL::CHANNEL_PORT;
                }
                item.name.resolve()
            }
        };

        let dst_name = match dst_item {
            None => {
                let name = self.generate_star(&text);
                text = String::new();
                name
            }
            Some(item) => {
                if item.kind == ItemKind::Channel {
                    dst_port = TMPL::CHANNEL_PORT;
                }
                item.name.resolve()
            }
        };

        let attrs = self.build_connection_attrs(conn, &text);
        let line = format!("\"{src_name}\"{src_port} -> \"{dst_name}\"{dst_port} [{attrs}]");
        self.append(line, conn.source);
    }

    /// Emit the subgraph cluster for a frame.
    fn generate_frame(&mut self, frame: &Frame) {
        self.append(format!("subgraph cluster_{} {{", self.frame_nr), frame.source);
        self.frame_nr += 1;

        self.lines.push(format!("  label=\"{}\"", frame.label));
        if !frame.attrs.is_empty() {
            let attrs = self.expand_attribs(&frame.attrs);
            self.lines.push(format!("  {attrs}"));
        }

        for member in &frame.members {
            self.lines.push(format!("  \"{member}\""));
        }
        self.lines.push("}".to_string());
    }

    /// Assemble all generated lines into the final DOT source text.
    fn generate_dot_text(self, title: &str, bg_color: Option<&str>) -> String {
        let mut graph_params: Vec<String> = Vec::new();

        if self.graph_options.is_context {
            graph_params.push(TMPL::GRAPH_PARAMS_CONTEXT_DIAGRAM.to_string());
        }

        if !title.is_empty() {
            graph_params.push(format!(
                "graph[label=\"\n- {title} -\" {}]",
                TMPL::DOT_FONT_GRAPH
            ));
        } else {
            graph_params.push(format!("graph[{}]", TMPL::DOT_FONT_GRAPH));
        }

        graph_params.push(
            if self.graph_options.is_vertical {
                TMPL::LAYOUT_VERTICAL
            } else {
                TMPL::LAYOUT_HORIZONTAL
            }
            .to_string(),
        );

        if self.graph_options.is_rotated {
            graph_params.push(format!("rotate={}", TMPL::ROTATION_DEGREES));
        }

        if let Some(bg) = bg_color {
            graph_params.push(format!("bgcolor={bg}"));
        }

        // wrap the generated lines into the digraph skeleton
        let block = self.lines.join("\n").replace('\n', "\n  ");
        format!(
            "digraph D {{\n  {graph_params}\n  edge[color=gray {font_edge}]\n  \
             node[{font_node}]\n  {block}\n}}",
            graph_params = graph_params.join("\n  "),
            font_edge = TMPL::DOT_FONT_EDGE,
            font_node = TMPL::DOT_FONT_NODE,
        )
        .replace("\n  \n", "\n\n")
    }
}

fn compile_attribs_names(attribs: &Attribs) -> Option<Regex> {
    if attribs.is_empty() {
        return None;
    }
    let pattern = attribs
        .keys()
        .map(|k| format!(r"\b{}\b", regex::escape(k)))
        .collect::<Vec<_>>()
        .join("|");
    Some(Regex::new(&pattern).expect("alias pattern is built from escaped names"))
}

/// Look up a connection endpoint, `None` for the wildcard.
fn resolve_endpoint<'i>(
    map: &SourceMap,
    conn: &Connection,
    endpoint: Endpoint,
    items_by_name: &'i IndexMap<Name, Item>,
) -> Result<Option<&'i Item>, Diagnostic> {
    let Some(name) = endpoint.name() else {
        return Ok(None);
    };
    match items_by_name.get(&name) {
        Some(item) => Ok(Some(item)),
        None => Err(Diagnostic::new(
            ErrorKind::Semantic,
            format!(
                "Connection \"{}\" connects to \"{name}\", which is not defined",
                conn.kind
            ),
        )
        .with_source(map, conn.source)),
    }
}

/// Iterate over the statements and generate the DOT source text.
pub fn generate_dot(
    mut generator: Generator<'_>,
    title: &str,
    bg_color: Option<&str>,
    statements: &[Statement],
    items_by_name: &IndexMap<Name, Item>,
) -> Result<String, Diagnostic> {
    for statement in statements {
        trace!(statement:?; "Generating");
        match statement {
            Statement::Item(item) => generator.generate_item(item)?,

            Statement::Connection(conn) => {
                let src_item = resolve_endpoint(generator.map, conn, conn.src, items_by_name)?;
                let dst_item = resolve_endpoint(generator.map, conn, conn.dst, items_by_name)?;
                generator.generate_connection(conn, src_item, dst_item);
            }

            Statement::Frame(frame) => generator.generate_frame(frame),

            // styles were consumed into GraphOptions; attribs and filters
            // produce no output of their own
            Statement::Style(_) | Statement::Attrib(_) | Statement::Filter(_) => {}
        }
    }

    Ok(generator.generate_dot_text(title, bg_color))
}
