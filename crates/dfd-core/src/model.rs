//! The statement model shared by every pipeline stage.
//!
//! The parser produces a flat list of [`Statement`]s; the checker, filter
//! engine, and code generator all consume it. Each statement carries the
//! [`LineId`] of the source line it was parsed from.

use std::fmt;
use std::str::FromStr;

use crate::identifier::Name;
use crate::source::LineId;

/// Default wrap width for item labels.
pub const DEFAULT_ITEM_TEXT_WIDTH: usize = 20;
/// Default wrap width for connection labels.
pub const DEFAULT_CONNECTION_TEXT_WIDTH: usize = 14;

/// Graphviz attributes applied to items referring to another graph.
pub const ITEM_EXTERNAL_ATTRS: &str = "fillcolor=white color=grey fontcolor=grey";
/// Default Graphviz attributes for frames.
pub const FRAME_DEFAULT_ATTRS: &str = "style=dashed";

/// Prefix distinguishing snippet references from file paths.
pub const SNIPPET_PREFIX: char = '#';
/// DSL directive for including external sources.
pub const INCLUDE_DIRECTIVE: &str = "#include";

/// The kind of a diagram item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Process,
    Control,
    Entity,
    Store,
    Channel,
    /// A plain node with no data-flow meaning; also the only kind allowed to
    /// refer to a whole external graph.
    None,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ItemKind::Process => "process",
            ItemKind::Control => "control",
            ItemKind::Entity => "entity",
            ItemKind::Store => "store",
            ItemKind::Channel => "channel",
            ItemKind::None => "none",
        };
        write!(f, "{text}")
    }
}

/// The kind of a connection between two items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    /// Directional data flow.
    Flow,
    /// Bidirectional data flow.
    Bflow,
    /// Continuous data flow (double arrowhead).
    Cflow,
    /// Undirected data flow.
    Uflow,
    /// Control signal (dashed).
    Signal,
    /// Invisible layout-only edge; carries no data-flow adjacency.
    Constraint,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectionKind::Flow => "flow",
            ConnectionKind::Bflow => "bflow",
            ConnectionKind::Cflow => "cflow",
            ConnectionKind::Uflow => "uflow",
            ConnectionKind::Signal => "signal",
            ConnectionKind::Constraint => "constraint",
        };
        write!(f, "{text}")
    }
}

/// One endpoint of a connection: a named item, or the anonymous `*` wildcard
/// materialized at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Star,
    Item(Name),
}

impl Endpoint {
    pub fn parse(text: &str) -> Self {
        if text == "*" {
            Endpoint::Star
        } else {
            Endpoint::Item(Name::new(text))
        }
    }

    /// The endpoint's item name, or `None` for the wildcard.
    pub fn name(&self) -> Option<Name> {
        match self {
            Endpoint::Star => None,
            Endpoint::Item(name) => Some(*name),
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self, Endpoint::Star)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Star => write!(f, "*"),
            Endpoint::Item(name) => write!(f, "{name}"),
        }
    }
}

/// A `style NAME [VALUE]` statement, consumed into [`GraphOptions`] before
/// code generation.
#[derive(Debug, Clone)]
pub struct Style {
    pub source: LineId,
    pub name: String,
    pub value: String,
}

/// An `attrib ALIAS TEXT` statement: a named substitution macro for
/// attribute strings.
#[derive(Debug, Clone)]
pub struct Attrib {
    pub source: LineId,
    pub alias: String,
    pub text: String,
}

/// A diagram node.
#[derive(Debug, Clone)]
pub struct Item {
    pub source: LineId,
    pub kind: ItemKind,
    pub name: Name,
    pub label: String,
    pub attrs: String,
    /// Set by a `?` suffix on the name: the item is dropped if it ends up
    /// with no connections.
    pub hidable: bool,
}

/// A connection between two endpoints.
#[derive(Debug, Clone)]
pub struct Connection {
    pub source: LineId,
    pub kind: ConnectionKind,
    pub src: Endpoint,
    pub dst: Endpoint,
    pub label: String,
    pub attrs: String,
    /// Render the arrow in the opposite direction. Graph adjacency for the
    /// filter engine still follows the declared direction.
    pub reversed: bool,
    /// The edge does not constrain layout ranks.
    pub relaxed: bool,
}

/// Structural identity of a connection, used to collapse duplicates created
/// by filter replacements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionSignature {
    pub kind: ConnectionKind,
    pub src: Endpoint,
    pub dst: Endpoint,
    pub label: String,
    pub attrs: String,
    pub reversed: bool,
    pub relaxed: bool,
}

impl Connection {
    pub fn signature(&self) -> ConnectionSignature {
        ConnectionSignature {
            kind: self.kind,
            src: self.src,
            dst: self.dst,
            label: self.label.clone(),
            attrs: self.attrs.clone(),
            reversed: self.reversed,
            relaxed: self.relaxed,
        }
    }
}

/// A named visual grouping of items.
#[derive(Debug, Clone)]
pub struct Frame {
    pub source: LineId,
    pub label: String,
    pub attrs: String,
    pub members: Vec<Name>,
}

/// Whether a filter keeps (`!`) or removes (`~`) its selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Only,
    Without,
}

/// How far, and in which semantics, a filter expands from its anchors in one
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSpec {
    /// How many connection hops to follow; -1 is unbounded.
    pub distance: i32,
    /// `x` flag: act on the neighbours only, not the anchors.
    pub no_anchors: bool,
    /// Follow the rendered (layout) direction instead of the flow direction.
    pub layout_dir: bool,
    /// `f` flag: suppress frames touching the selected set.
    pub no_frames: bool,
}

impl Default for NeighborSpec {
    fn default() -> Self {
        Self {
            distance: 0,
            no_anchors: false,
            layout_dir: false,
            no_frames: false,
        }
    }
}

/// An `!` (Only) or `~` (Without) visibility filter.
#[derive(Debug, Clone)]
pub struct Filter {
    pub source: LineId,
    pub mode: FilterMode,
    pub names: Vec<Name>,
    pub neighbors_up: NeighborSpec,
    pub neighbors_down: NeighborSpec,
    /// Without only: redirect connections of the removed items to this item.
    pub replaced_by: Option<Name>,
}

/// A parsed DSL statement.
#[derive(Debug, Clone)]
pub enum Statement {
    Style(Style),
    Attrib(Attrib),
    Item(Item),
    Connection(Connection),
    Frame(Frame),
    Filter(Filter),
}

impl Statement {
    pub fn source(&self) -> LineId {
        match self {
            Statement::Style(s) => s.source,
            Statement::Attrib(a) => a.source,
            Statement::Item(i) => i.source,
            Statement::Connection(c) => c.source,
            Statement::Frame(f) => f.source,
            Statement::Filter(f) => f.source,
        }
    }
}

/// Graph-level options accumulated from `style` statements.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    pub is_vertical: bool,
    pub is_context: bool,
    pub is_rotated: bool,
    pub item_text_width: usize,
    pub connection_text_width: usize,
    pub background_color: Option<String>,
    pub no_graph_title: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            is_vertical: false,
            is_context: false,
            is_rotated: false,
            item_text_width: DEFAULT_ITEM_TEXT_WIDTH,
            connection_text_width: DEFAULT_CONNECTION_TEXT_WIDTH,
            background_color: None,
            no_graph_title: false,
        }
    }
}

/// The closed set of recognized `style` option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleOption {
    Vertical,
    Horizontal,
    Context,
    Rotated,
    Unrotated,
    ItemTextWidth,
    ConnectionTextWidth,
    BackgroundColor,
    NoGraphTitle,
}

impl FromStr for StyleOption {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "vertical" => StyleOption::Vertical,
            "horizontal" => StyleOption::Horizontal,
            "context" => StyleOption::Context,
            "rotated" => StyleOption::Rotated,
            "unrotated" => StyleOption::Unrotated,
            "item-text-width" => StyleOption::ItemTextWidth,
            "connection-text-width" => StyleOption::ConnectionTextWidth,
            "background-color" => StyleOption::BackgroundColor,
            "no-graph-title" => StyleOption::NoGraphTitle,
            _ => return Err(()),
        })
    }
}

/// A reference from an item to an element of another graph, to be validated
/// by the dependency checker.
#[derive(Debug, Clone)]
pub struct Dependency {
    /// Referred graph: a file path, or a `#`-prefixed snippet name.
    pub to_graph: String,
    /// Referred item name; `None` for a whole-graph reference.
    pub to_item: Option<String>,
    /// The referring item's kind, which the referred item must match.
    pub to_kind: ItemKind,
    pub source: LineId,
}

/// A named diagram source extracted from a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    pub name: String,
    /// The output file named in the fence header.
    pub output: String,
    /// Offset of the snippet in the host document.
    pub line_nr: usize,
}

/// Snippets indexed by name.
pub type SnippetMap = std::collections::HashMap<String, Snippet>;
