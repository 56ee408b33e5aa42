//! Templates and fixed attribute fragments for DOT code generation.

// ── Item shapes and fills ──────────────────────────────────────────────

pub const SHAPE_PROCESS_CONTEXT: &str = "circle";
pub const SHAPE_PROCESS: &str = "ellipse";
pub const SHAPE_ENTITY: &str = "rectangle";
pub const SHAPE_NONE: &str = "none";

pub const FILL_PROCESS_CONTEXT: &str = "white";
pub const FILL_PROCESS: &str = "\"#eeeeee\"";

pub const STYLE_PROCESS: &str = "filled";
pub const STYLE_CONTROL: &str = "\"filled,dashed\"";

// ── Connection attributes ──────────────────────────────────────────────
// Leading space preserved: these are appended to an attribute string.

pub const ATTR_CONSTRAINT_LABELED: &str = " style=solid color=invis";
pub const ATTR_CONSTRAINT_HIDDEN: &str = " style=invis dir=none";
pub const ATTR_DIR_BACK: &str = " dir=back";
pub const ATTR_DIR_BOTH: &str = " dir=both";
pub const ATTR_DIR_NONE: &str = " dir=none";
pub const ATTR_CFLOW_TAIL: &str = " arrowtail=normalnormal";
pub const ATTR_CFLOW_HEAD: &str = " arrowhead=normalnormal";
pub const ATTR_STYLE_DASHED: &str = " style=dashed";
pub const ATTR_RELAXED: &str = " constraint=false";

// ── Layout parameters ──────────────────────────────────────────────────

pub const LAYOUT_VERTICAL: &str = "rankdir=TB";
pub const LAYOUT_HORIZONTAL: &str = "rankdir=LR";
pub const ROTATION_DEGREES: u32 = 90;

// ── Channel, star, engine ──────────────────────────────────────────────

/// Fixed anchor on the channel bar for attaching connections.
pub const CHANNEL_PORT: &str = ":x:c";
pub const STAR_NODE_FMT: &str = "__star_{nr}__";
pub const ENGINE_CONTEXT: &str = "neato";
pub const ENGINE_DEFAULT: &str = "dot";

// ── HTML-label templates (store, channel) ──────────────────────────────
// Placeholders {name} {text} {color} {fontcolor} are substituted verbatim.

pub const STORE: &str = r#""{name}" [shape=none label=<
  <TABLE BORDER="0">
    <TR><TD BGCOLOR="{color}" WIDTH="6"></TD></TR>
    <TR><TD><FONT COLOR="{fontcolor}">{text}</FONT></TD></TR>
    <TR><TD BGCOLOR="{color}" WIDTH="6"></TD></TR>
  </TABLE>>]"#;

pub const CHANNEL: &str = r#""{name}" [shape=none label=<
  <TABLE BORDER="0">
    <TR>
      <TD WIDTH="48"></TD>
      <TD BGCOLOR="{color}" WIDTH="0" PORT="x"><BR/><BR/></TD>
      <TD WIDTH="48"></TD>
    </TR>
    <TR>
      <TD COLSPAN="3"><FONT COLOR="{fontcolor}">{text}</FONT></TD>
    </TR>
  </TABLE>>]"#;

pub const CHANNEL_HORIZONTAL: &str = r#""{name}" [shape=none label=<
  <TABLE BORDER="0">
    <TR><TD BGCOLOR="{color}" PORT="x"></TD></TR>
    <TR><TD><FONT COLOR="{fontcolor}">{text}</FONT></TD></TR>
  </TABLE>>]"#;

// ── Graph-level fonts and parameters ───────────────────────────────────

pub const DOT_FONT_EDGE: &str = "fontname=\"times-italic\" fontsize=10";
pub const DOT_FONT_NODE: &str = "fontname=\"helvetica\" fontsize=10";
pub const DOT_FONT_GRAPH: &str = "fontname=\"helvetica\" fontsize=9 fontcolor=\"#000060\"";

pub const GRAPH_PARAMS_CONTEXT_DIAGRAM: &str = "edge [len=2.25]";
