//! Anchor selection for edges.
//!
//! Each edge leaves its source and enters its target on the sides facing
//! each other, picked from the delta between the two node centres.

use crate::graph::node_rect;
use crate::model::{Anchor, Graph, Side, Size, WorkflowNode};
use std::collections::HashMap;

/// Router parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingConfig {
    /// Size assumed for nodes without explicit dimensions.
    pub default_size: Size,
    /// Horizontal routing wins when `|dx| > |dy| * bias`.
    pub bias: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_size: crate::defaults::DEFAULT_NODE_SIZE,
            bias: 0.8,
        }
    }
}

/// Pick `(source_handle, target_handle)` for an edge between two nodes.
pub fn smart_anchors(
    source: &WorkflowNode,
    target: &WorkflowNode,
    config: &RoutingConfig,
) -> (Anchor, Anchor) {
    let (sx, sy) = node_rect(source, config.default_size).center();
    let (tx, ty) = node_rect(target, config.default_size).center();
    anchors_for_delta(tx - sx, ty - sy, config.bias)
}

/// Anchor pair for a centre delta (target minus source).
pub fn anchors_for_delta(dx: f64, dy: f64, bias: f64) -> (Anchor, Anchor) {
    let side = if dx.abs() > dy.abs() * bias {
        if dx > 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    } else if dy > 0.0 {
        Side::Bottom
    } else {
        Side::Top
    };
    (Anchor::source(side), Anchor::target(side.opposite()))
}

/// Re-apply the routing rule to every edge whose endpoints both exist.
/// Returns how many edges changed anchors.
pub fn reroute_edges(graph: &mut Graph, config: &RoutingConfig) -> usize {
    let index: HashMap<&str, &WorkflowNode> =
        graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let updates: Vec<(usize, (Anchor, Anchor))> = graph
        .edges
        .iter()
        .enumerate()
        .filter_map(|(i, edge)| {
            let source = index.get(edge.source.as_str())?;
            let target = index.get(edge.target.as_str())?;
            let anchors = smart_anchors(source, target, config);
            let current = (edge.source_handle, edge.target_handle);
            (current != (Some(anchors.0), Some(anchors.1))).then_some((i, anchors))
        })
        .collect();

    let changed = updates.len();
    for (i, (source_handle, target_handle)) in updates {
        let edge = &mut graph.edges[i];
        edge.source_handle = Some(source_handle);
        edge.target_handle = Some(target_handle);
    }
    changed
}
