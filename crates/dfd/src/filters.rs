//! Filter engine: only/without, neighbour expansion.
//!
//! Filters compose strictly left-to-right over the statement list. The
//! first `!` (only) starts from an empty kept set and adds; the first `~`
//! (without) starts from all items and removes. Neighbour expansion walks
//! the connection graph one hop at a time, excluding `constraint` edges,
//! which carry no data-flow adjacency.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;

use dfd_core::error::{Diagnostic, ErrorKind};
use dfd_core::identifier::Name;
use dfd_core::model::{
    ConnectionKind, ConnectionSignature, Endpoint, Filter, FilterMode, NeighborSpec, Statement,
};
use dfd_core::source::{LineId, SourceMap};

/// Adjacency over the non-constraint connections: once in flow direction
/// (reversed connections swapped back to their arrow direction) and once in
/// rendered layout direction (declared endpoint order).
struct NeighborGraphs {
    flow: DiGraphMap<Name, ()>,
    layout: DiGraphMap<Name, ()>,
}

/// Wildcard endpoints share one graph node, so a `*` can sit on a path
/// between two named items during expansion.
fn endpoint_node(endpoint: Endpoint) -> Name {
    match endpoint {
        Endpoint::Star => Name::new("*"),
        Endpoint::Item(name) => name,
    }
}

fn build_graphs(statements: &[Statement]) -> NeighborGraphs {
    let mut flow = DiGraphMap::new();
    let mut layout = DiGraphMap::new();
    for statement in statements {
        let Statement::Connection(conn) = statement else {
            continue;
        };
        // constraints do not define neighborhood
        if conn.kind == ConnectionKind::Constraint {
            continue;
        }
        let src = endpoint_node(conn.src);
        let dst = endpoint_node(conn.dst);
        match conn.kind {
            ConnectionKind::Bflow | ConnectionKind::Uflow => {
                flow.add_edge(src, dst, ());
                flow.add_edge(dst, src, ());
                layout.add_edge(src, dst, ());
                layout.add_edge(dst, src, ());
            }
            _ => {
                let (flow_src, flow_dst) = if conn.reversed { (dst, src) } else { (src, dst) };
                flow.add_edge(flow_src, flow_dst, ());
                layout.add_edge(src, dst, ());
            }
        }
    }
    NeighborGraphs { flow, layout }
}

/// Resolve a neighbor distance, treating negative as unlimited.
fn resolve_distance(distance: i32, max_neighbors: usize) -> usize {
    if distance < 0 {
        max_neighbors
    } else {
        distance as usize
    }
}

/// Expand neighbours in one direction by successive waves of connections.
fn expand_neighbors_in_dir(
    graphs: &NeighborGraphs,
    anchors: &[Name],
    max_neighbors: usize,
    spec: &NeighborSpec,
    down: bool,
) -> HashSet<Name> {
    let graph = if spec.layout_dir {
        &graphs.layout
    } else {
        &graphs.flow
    };
    let direction = if down {
        Direction::Outgoing
    } else {
        Direction::Incoming
    };

    let mut names: HashSet<Name> = anchors.iter().copied().collect();
    let mut neighbor_names: HashSet<Name> = HashSet::new();
    for hop in 0..resolve_distance(spec.distance, max_neighbors) {
        let mut found: HashSet<Name> = HashSet::new();
        for &name in &names {
            if graph.contains_node(name) {
                found.extend(graph.neighbors_directed(name, direction));
            }
        }
        if found.is_empty() {
            break;
        }
        trace!(hop, down, found = found.len(); "Neighbor wave");
        neighbor_names.extend(found.iter().copied());
        names = found;
    }
    neighbor_names
}

/// Collect neighbour names by following connections outward from the filter
/// anchors. Returns `(downstream, upstream)`.
fn find_neighbors(
    filter: &Filter,
    graphs: &NeighborGraphs,
    max_neighbors: usize,
) -> (HashSet<Name>, HashSet<Name>) {
    (
        expand_neighbors_in_dir(
            graphs,
            &filter.names,
            max_neighbors,
            &filter.neighbors_down,
            true,
        ),
        expand_neighbors_in_dir(
            graphs,
            &filter.names,
            max_neighbors,
            &filter.neighbors_up,
            false,
        ),
    )
}

fn sorted_names(names: impl IntoIterator<Item = Name>) -> Vec<String> {
    let mut resolved: Vec<String> = names.into_iter().map(|n| n.resolve()).collect();
    resolved.sort();
    resolved
}

/// Validate that filter names exist and are still available.
fn check_filter_names(
    map: &SourceMap,
    names: &HashSet<Name>,
    in_names: &HashSet<Name>,
    all_names: &HashSet<Name>,
    source: LineId,
) -> Result<(), Diagnostic> {
    let unknown: Vec<Name> = names.difference(all_names).copied().collect();
    if !unknown.is_empty() {
        return Err(Diagnostic::new(
            ErrorKind::Filter,
            format!("Name(s) unknown: {}", sorted_names(unknown).join(", ")),
        )
        .with_source(map, source));
    }

    let gone: Vec<Name> = names.difference(in_names).copied().collect();
    if !gone.is_empty() {
        return Err(Diagnostic::new(
            ErrorKind::Filter,
            format!(
                "Name(s) no longer available due to previous filters: {}",
                sorted_names(gone).join(", ")
            ),
        )
        .with_source(map, source));
    }
    Ok(())
}

/// Record names whose frames should be suppressed (`f` flag).
fn collect_frame_skips(
    filter: &Filter,
    names: &HashSet<Name>,
    downs: &HashSet<Name>,
    ups: &HashSet<Name>,
    skip_frames_for_names: &mut HashSet<Name>,
) {
    if filter.neighbors_up.no_frames {
        skip_frames_for_names.extend(ups.iter().copied());
        if !filter.neighbors_up.no_anchors {
            skip_frames_for_names.extend(names.iter().copied());
        }
    }
    if filter.neighbors_down.no_frames {
        skip_frames_for_names.extend(downs.iter().copied());
        if !filter.neighbors_down.no_anchors {
            skip_frames_for_names.extend(names.iter().copied());
        }
    }
}

type KeptState = (
    Option<HashSet<Name>>,
    HashSet<Name>,
    HashMap<Name, Name>,
    HashSet<Name>,
);

/// Process filter statements to determine which names to keep.
///
/// Returns `(kept_names, only_names, replacement, skip_frames_for_names)`.
fn collect_kept_names(
    map: &SourceMap,
    statements: &[Statement],
    graphs: &NeighborGraphs,
    all_names: &HashSet<Name>,
) -> Result<KeptState, Diagnostic> {
    let mut kept_names: Option<HashSet<Name>> = None;
    let mut only_names: HashSet<Name> = HashSet::new();
    let mut replacement: HashMap<Name, Name> = HashMap::new();
    let mut skip_frames_for_names: HashSet<Name> = HashSet::new();

    for statement in statements {
        let Statement::Filter(filter) = statement else {
            continue;
        };
        let names: HashSet<Name> = filter.names.iter().copied().collect();

        match filter.mode {
            FilterMode::Only => {
                // Only is additive: the first one starts with an empty kept set
                let kept = kept_names.get_or_insert_with(HashSet::new);

                check_filter_names(map, &names, all_names, all_names, filter.source)?;

                // add anchor names (suppressed by "x" flag: neighbours only)
                if !filter.neighbors_up.no_anchors && !filter.neighbors_down.no_anchors {
                    kept.extend(names.iter().copied());
                    only_names.extend(names.iter().copied());
                }

                let (downs, ups) = find_neighbors(filter, graphs, all_names.len());
                trace!(downs = downs.len(), ups = ups.len(); "Only: adding neighbors");
                kept.extend(downs.iter().copied());
                kept.extend(ups.iter().copied());

                collect_frame_skips(filter, &names, &downs, &ups, &mut skip_frames_for_names);
            }
            FilterMode::Without => {
                // Without is subtractive: the first one starts with all names
                let kept = kept_names.get_or_insert_with(|| all_names.clone());

                // validate filter names and register replacements
                let mut names_to_check = names.clone();
                if let Some(replacer) = filter.replaced_by {
                    names_to_check.insert(replacer);
                    for &name in &names {
                        replacement.insert(name, replacer);
                    }
                }
                check_filter_names(map, &names_to_check, kept, all_names, filter.source)?;

                // remove anchor names (suppressed by "x" flag: neighbours only)
                if !filter.neighbors_up.no_anchors && !filter.neighbors_down.no_anchors {
                    for name in &names {
                        kept.remove(name);
                    }
                }

                let (downs, ups) = find_neighbors(filter, graphs, all_names.len());
                trace!(downs = downs.len(), ups = ups.len(); "Without: removing neighbors");
                for name in downs.iter().chain(ups.iter()) {
                    kept.remove(name);
                }

                collect_frame_skips(filter, &names, &downs, &ups, &mut skip_frames_for_names);
            }
        }
    }

    Ok((kept_names, only_names, replacement, skip_frames_for_names))
}

/// Make items selected by an Only non-hidable so they don't vanish from the
/// output even if all their connections are filtered away.
fn mark_non_hidable(statements: &mut [Statement], only_names: &HashSet<Name>) {
    for statement in statements {
        if let Statement::Item(item) = statement {
            if only_names.contains(&item.name) {
                item.hidable = false;
            }
        }
    }
}

/// Apply kept/replacement/skip decisions to produce the filtered statements.
///
/// Returns the new statements and the signatures of connections rewritten by
/// a replacement (candidates for deduplication).
fn apply_filters(
    statements: Vec<Statement>,
    kept_names: &HashSet<Name>,
    replacement: &HashMap<Name, Name>,
    skip_frames_for_names: &HashSet<Name>,
) -> (Vec<Statement>, HashSet<ConnectionSignature>) {
    let mut new_statements: Vec<Statement> = Vec::new();
    let mut replaced_connections: HashSet<ConnectionSignature> = HashSet::new();

    for mut statement in statements {
        match &mut statement {
            Statement::Item(item) => {
                if !kept_names.contains(&item.name) {
                    trace!(name:% = item.name; "Skipping item: not in the kept set");
                    continue;
                }
            }

            Statement::Connection(conn) => {
                let src_replacer = conn.src.name().and_then(|n| replacement.get(&n)).copied();
                let dst_replacer = conn.dst.name().and_then(|n| replacement.get(&n)).copied();
                if src_replacer.is_some() || dst_replacer.is_some() {
                    // both ends replaced would collapse to a self-loop
                    if src_replacer.is_some() && dst_replacer.is_some() {
                        continue;
                    }
                    if let Some(replacer) = src_replacer {
                        conn.src = Endpoint::Item(replacer);
                    }
                    if let Some(replacer) = dst_replacer {
                        conn.dst = Endpoint::Item(replacer);
                    }
                    replaced_connections.insert(conn.signature());
                } else {
                    // wildcard endpoints are not item names and are exempt
                    // from the kept test
                    let src_kept = conn.src.name().is_none_or(|n| kept_names.contains(&n));
                    let dst_kept = conn.dst.name().is_none_or(|n| kept_names.contains(&n));
                    if !src_kept || !dst_kept {
                        trace!("Skipping connection: some end is not in the kept set");
                        continue;
                    }
                }
            }

            Statement::Frame(frame) => {
                // rewrite replaced names in the frame membership
                for member in frame.members.iter_mut() {
                    if let Some(replacer) = replacement.get(member) {
                        *member = *replacer;
                    }
                }

                // skip frames with no remaining kept member, else trim
                let members: HashSet<Name> = frame.members.iter().copied().collect();
                if members.is_disjoint(kept_names) {
                    trace!("Skipping frame: no member is in the kept set");
                    continue;
                }
                frame.members.retain(|m| kept_names.contains(m));

                // skip frames touching items selected via the "f" flag
                if frame
                    .members
                    .iter()
                    .any(|m| skip_frames_for_names.contains(m))
                {
                    trace!("Skipping frame: some member is in the skip-frames set");
                    continue;
                }
            }

            _ => {}
        }
        new_statements.push(statement);
    }

    (new_statements, replaced_connections)
}

/// Remove duplicate connections created by replacements: the first
/// occurrence of a rewritten signature survives, later ones are dropped.
fn deduplicate_connections(
    statements: Vec<Statement>,
    replaced_connections: &HashSet<ConnectionSignature>,
) -> Vec<Statement> {
    let mut kept_statements: Vec<Statement> = Vec::new();
    let mut skipped_signatures: HashSet<ConnectionSignature> = HashSet::new();

    for statement in statements {
        if let Statement::Connection(conn) = &statement {
            let signature = conn.signature();
            if skipped_signatures.contains(&signature) {
                continue;
            }
            if replaced_connections.contains(&signature) {
                skipped_signatures.insert(signature);
            }
        }
        kept_statements.push(statement);
    }
    kept_statements
}

/// Apply only/without filters to a statement list.
pub fn handle_filters(
    map: &SourceMap,
    mut statements: Vec<Statement>,
) -> Result<Vec<Statement>, Diagnostic> {
    let all_names: HashSet<Name> = statements
        .iter()
        .filter_map(|s| match s {
            Statement::Item(item) => Some(item.name),
            _ => None,
        })
        .collect();

    // phase 1: collect filtered names
    let graphs = build_graphs(&statements);
    let (kept_names, only_names, replacement, skip_frames_for_names) =
        collect_kept_names(map, &statements, &graphs, &all_names)?;

    mark_non_hidable(&mut statements, &only_names);

    // default to keeping all names if no filter was encountered
    let kept_names = kept_names.unwrap_or(all_names);
    debug!(kept = kept_names.len(); "Items to keep after filters");

    // phase 2: apply filters to statements
    let (new_statements, replaced_connections) =
        apply_filters(statements, &kept_names, &replacement, &skip_frames_for_names);

    // phase 3: deduplicate connections created by replacements
    Ok(deduplicate_connections(new_statements, &replaced_connections))
}
