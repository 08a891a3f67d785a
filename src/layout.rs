//! Sugiyama hierarchical graph layout.
//!
//! [`sugiyama_layout`] is a thin wrapper over the `rust-sugiyama` crate that
//! accepts arbitrary node ids. [`layered_layout`] builds on it to place the
//! nodes of a [`Graph`]: one column (or row) per layer, `rank_sep` between
//! layers, `node_sep` between neighbours within a layer, and the whole
//! drawing shifted to start at `margin`. Group nodes are not laid out.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::model::{Graph, Position, Size};

/// Layout direction for the Sugiyama algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Direction {
    /// Layers flow top to bottom.
    #[serde(rename = "TB")]
    TopToBottom,
    /// Layers flow left to right (default).
    #[default]
    #[serde(rename = "LR")]
    LeftToRight,
}

/// A positioned node returned by [`sugiyama_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition<Id> {
    pub id: Id,
    /// Centre of the node as placed by `rust-sugiyama`.
    pub x: f64,
    pub y: f64,
}

/// Configuration for the Sugiyama layout algorithm.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct SugiyamaConfig {
    /// Minimum spacing between vertices (0.0 uses the `rust-sugiyama` default).
    pub vertex_spacing: f64,
    /// Minimum edge length between layers (0 uses the `rust-sugiyama` default).
    pub minimum_length: u32,
    pub dummy_vertices: bool,
    pub direction: Direction,
}

/// Compute Sugiyama hierarchical layout positions.
///
/// Takes edges as `(source, target)` pairs and node sizes as
/// `(id, (width, height))` pairs. Ids are mapped to sequential `u32` indices
/// for `rust-sugiyama` and translated back before returning.
///
/// Duplicate ids in `node_sizes` are ignored (first occurrence wins), and
/// edges naming unknown ids are skipped.
pub fn sugiyama_layout<Id>(
    edges: &[(Id, Id)],
    node_sizes: &[(Id, (f64, f64))],
    config: &SugiyamaConfig,
) -> Vec<NodePosition<Id>>
where
    Id: Clone + Eq + Hash,
{
    if node_sizes.is_empty() {
        return Vec::new();
    }

    let horizontal = config.direction == Direction::LeftToRight;

    let mut id_to_idx: HashMap<&Id, u32> = HashMap::new();
    let mut idx_to_id: Vec<&Id> = Vec::with_capacity(node_sizes.len());
    // For horizontal layout, swap width/height so the algorithm spaces layers
    // along what will become the x-axis.
    let mut vertices: Vec<(u32, (f64, f64))> = Vec::with_capacity(node_sizes.len());

    for (node_id, (w, h)) in node_sizes {
        if let std::collections::hash_map::Entry::Vacant(e) = id_to_idx.entry(node_id) {
            let idx = idx_to_id.len() as u32;
            e.insert(idx);
            idx_to_id.push(node_id);
            let size = if horizontal { (*h, *w) } else { (*w, *h) };
            vertices.push((idx, size));
        }
    }

    let mapped_edges: Vec<(u32, u32)> = edges
        .iter()
        .filter_map(|(src, dst)| {
            let src_idx = id_to_idx.get(src)?;
            let dst_idx = id_to_idx.get(dst)?;
            Some((*src_idx, *dst_idx))
        })
        .collect();

    let mut sg_config = rust_sugiyama::configure::Config {
        dummy_vertices: config.dummy_vertices,
        ..Default::default()
    };
    if config.vertex_spacing > 0.0 {
        sg_config.vertex_spacing = config.vertex_spacing;
    }
    if config.minimum_length > 0 {
        sg_config.minimum_length = config.minimum_length;
    }

    // Returns Vec<(Vec<(usize, (f64, f64))>, f64, f64)>, one entry per connected component
    let subgraphs = rust_sugiyama::from_vertices_and_edges(&vertices, &mapped_edges, &sg_config);

    let mut results = Vec::with_capacity(idx_to_id.len());
    for (layout, _width, _height) in &subgraphs {
        for &(idx, (x, y)) in layout {
            if let Some(node_id) = idx_to_id.get(idx) {
                let (px, py) = if horizontal { (y, x) } else { (x, y) };
                results.push(NodePosition { id: (*node_id).clone(), x: px, y: py });
            }
        }
    }

    results
}

struct Placed<'a> {
    id: &'a str,
    order: usize,
    /// Extent along the layer axis and across it.
    rank_extent: f64,
    cross_extent: f64,
    layer_coord: f64,
    cross_start: f64,
}

/// Lay out every non-group node of `graph`.
///
/// Returns new top-left positions; nodes without a size use `default_size`.
pub fn layered_layout(
    graph: &Graph,
    config: &LayoutConfig,
    default_size: Size,
) -> Vec<(String, Position)> {
    let horizontal = config.direction == Direction::LeftToRight;

    let sizes: HashMap<&str, Size> = graph
        .nodes
        .iter()
        .filter(|n| !n.kind().is_group())
        .map(|n| (n.id.as_str(), n.size_or(default_size)))
        .collect();
    if sizes.is_empty() {
        return Vec::new();
    }

    let node_sizes: Vec<(&str, (f64, f64))> = graph
        .nodes
        .iter()
        .filter_map(|n| sizes.get(n.id.as_str()).map(|s| (n.id.as_str(), (s.width, s.height))))
        .collect();

    // Deduplicated in graph order so repeated runs feed the same input.
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let edges: Vec<(&str, &str)> = graph
        .edges
        .iter()
        .filter(|e| e.source != e.target)
        .filter(|e| sizes.contains_key(e.source.as_str()) && sizes.contains_key(e.target.as_str()))
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .filter(|pair| seen.insert(*pair))
        .collect();

    let sg_config = SugiyamaConfig {
        vertex_spacing: config.node_sep,
        direction: config.direction,
        ..Default::default()
    };
    let positions = sugiyama_layout(&edges, &node_sizes, &sg_config);

    let order: HashMap<&str, usize> =
        node_sizes.iter().enumerate().map(|(i, (id, _))| (*id, i)).collect();

    let mut placed: Vec<Placed<'_>> = positions
        .iter()
        .filter_map(|p| {
            let size = sizes.get(p.id)?;
            let (rank_extent, cross_extent) = if horizontal {
                (size.width, size.height)
            } else {
                (size.height, size.width)
            };
            let (layer_coord, cross_centre) = if horizontal { (p.x, p.y) } else { (p.y, p.x) };
            Some(Placed {
                id: p.id,
                order: order.get(p.id).copied().unwrap_or(usize::MAX),
                rank_extent,
                cross_extent,
                layer_coord,
                cross_start: cross_centre - cross_extent / 2.0,
            })
        })
        .collect();

    // Group into layers by the algorithm's layer coordinate.
    let mut layers: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, p) in placed.iter().enumerate() {
        layers.entry(p.layer_coord.round() as i64).or_default().push(i);
    }

    let mut rank_start: HashMap<usize, f64> = HashMap::new();
    let mut cursor = 0.0;
    for members in layers.values_mut() {
        let layer_extent = members
            .iter()
            .map(|&i| placed[i].rank_extent)
            .fold(0.0_f64, f64::max);
        for &i in members.iter() {
            rank_start.insert(i, cursor + (layer_extent - placed[i].rank_extent) / 2.0);
        }
        cursor += layer_extent + config.rank_sep;

        // Within a layer, keep the algorithm's order and enforce `node_sep`.
        members.sort_by(|&a, &b| {
            placed[a]
                .cross_start
                .total_cmp(&placed[b].cross_start)
                .then(placed[a].order.cmp(&placed[b].order))
        });
        let mut next_free = f64::NEG_INFINITY;
        for &i in members.iter() {
            let p = &mut placed[i];
            if p.cross_start < next_free {
                p.cross_start = next_free;
            }
            next_free = p.cross_start + p.cross_extent + config.node_sep;
        }
    }

    let min_cross = placed
        .iter()
        .map(|p| p.cross_start)
        .fold(f64::INFINITY, f64::min);

    let mut result: Vec<(usize, String, Position)> = placed
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let rank = config.margin + rank_start.get(&i).copied().unwrap_or(0.0);
            let cross = config.margin + p.cross_start - min_cross;
            let position = if horizontal {
                Position::new(rank, cross)
            } else {
                Position::new(cross, rank)
            };
            (p.order, p.id.to_string(), position)
        })
        .collect();
    result.sort_by_key(|(order, _, _)| *order);

    log::debug!(
        "layered layout placed {} nodes in {} layers",
        result.len(),
        layers.len()
    );
    result.into_iter().map(|(_, id, pos)| (id, pos)).collect()
}
