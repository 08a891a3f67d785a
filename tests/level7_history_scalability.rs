//! Level 7: History Invariants & Scalability Tests
//!
//! Random edit sequences check the undo/redo contract. The scalability half
//! runs layout, routing, selection and deletion on 1K+ node canvases with
//! generous thresholds to catch O(n²) regressions.
//!
//! **IMPORTANT:** Run with `cargo test level7 --release` for realistic performance.
//! Debug mode is 10-50x slower and timing assertions will be skipped.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use workflow_canvas::model::NodePayload;
use workflow_canvas::routing::reroute_edges;
use workflow_canvas::{
    layered_layout, Canvas, EditorConfig, Graph, ManualClock, NodeKind, Position, RoutingConfig,
    WorkflowEdge, WorkflowNode,
};

// ============================================================================
// Debug Mode Detection
// ============================================================================

const fn is_debug_mode() -> bool {
    cfg!(debug_assertions)
}

/// Assert that elapsed time is within threshold, but skip in debug mode.
macro_rules! assert_timing {
    ($elapsed:expr, $threshold:expr, $($msg:tt)+) => {
        if is_debug_mode() {
            if $elapsed > $threshold {
                eprintln!(
                    "SKIPPED (debug mode): {} - took {:?}, threshold {:?}. Run with --release for accurate timing.",
                    format!($($msg)+),
                    $elapsed,
                    $threshold
                );
            }
        } else {
            assert!(
                $elapsed <= $threshold,
                "{} took {:?}, expected <= {:?}",
                format!($($msg)+),
                $elapsed,
                $threshold
            );
        }
    };
}

const SCALE_SMALL: usize = 1_000;
const SCALE_LARGE: usize = 5_000;

mod thresholds {
    use super::*;

    pub const LAYOUT_1K: Duration = Duration::from_millis(3_000);
    pub const REROUTE_5K: Duration = Duration::from_millis(50);
    pub const SELECT_ALL_5K: Duration = Duration::from_millis(50);
    pub const DELETE_HALF_5K: Duration = Duration::from_millis(100);
    pub const SNAPSHOTS_1K: Duration = Duration::from_millis(500);
}

const START_MILLIS: i64 = 1_700_000_000_000;

fn canvas_with(config: EditorConfig, graph: Graph) -> Canvas {
    let mut canvas = Canvas::with_clock(config, Box::new(ManualClock::new(START_MILLIS)));
    canvas.load(graph);
    canvas
}

/// `chains` independent pipelines of `length` nodes each.
fn pipelines(chains: usize, length: usize) -> Graph {
    let mut nodes = Vec::with_capacity(chains * length);
    let mut edges = Vec::with_capacity(chains * length);
    for c in 0..chains {
        for i in 0..length {
            let id = format!("n{}-{}", c, i);
            let position = Position::new(i as f64 * 300.0, c as f64 * 200.0);
            nodes.push(WorkflowNode::new(
                id.as_str(),
                position,
                NodePayload::new(NodeKind::Logic, id.as_str()),
            ));
            if i > 0 {
                edges.push(WorkflowEdge::new(
                    format!("e{}-{}", c, i),
                    format!("n{}-{}", c, i - 1),
                    id,
                ));
            }
        }
    }
    Graph::new(nodes, edges)
}

// ============================================================================
// History invariants
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Add(NodeKind),
    Delete(usize),
    Drag(usize, i32, i32),
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::sample::select(NodeKind::ALL.to_vec()).prop_map(Op::Add),
        (0_usize..16).prop_map(Op::Delete),
        (0_usize..16, 1_i32..80, -80_i32..80).prop_map(|(i, dx, dy)| Op::Drag(i, dx, dy)),
        Just(Op::Undo),
        Just(Op::Redo),
    ]
}

fn nth_node(canvas: &Canvas, i: usize) -> Option<String> {
    let nodes = &canvas.graph().nodes;
    (!nodes.is_empty()).then(|| nodes[i % nodes.len()].id.clone())
}

/// Apply a mutating op. Returns whether the graph changed.
fn apply(canvas: &mut Canvas, op: &Op) -> bool {
    match op {
        Op::Add(kind) => {
            canvas.add_node(*kind);
            true
        }
        Op::Delete(i) => match nth_node(canvas, *i) {
            Some(id) => {
                canvas.set_selection([id], Vec::new());
                canvas.delete_selected()
            }
            None => false,
        },
        Op::Drag(i, dx, dy) => match nth_node(canvas, *i) {
            Some(id) => {
                canvas.set_selection(Vec::new(), Vec::new());
                canvas.begin_drag(&id);
                canvas.drag_by(*dx as f64, *dy as f64);
                canvas.end_drag()
            }
            None => false,
        },
        Op::Undo | Op::Redo => unreachable!(),
    }
}

proptest! {
    #[test]
    fn proptest_edit_sequences_keep_history_contract(
        ops in prop::collection::vec(op_strategy(), 1..60)
    ) {
        let config = EditorConfig { history_limit: 8, ..EditorConfig::default() };
        let mut canvas = canvas_with(config, workflow_canvas::defaults::sample_graph());

        for op in &ops {
            let before = canvas.graph().clone();
            match op {
                Op::Undo => {
                    let could = canvas.can_undo();
                    prop_assert_eq!(canvas.undo(), could);
                    if could {
                        prop_assert!(canvas.can_redo());
                        canvas.redo();
                        prop_assert_eq!(canvas.graph(), &before);
                        canvas.undo();
                    } else {
                        prop_assert_eq!(canvas.graph(), &before);
                    }
                }
                Op::Redo => {
                    let could = canvas.can_redo();
                    prop_assert_eq!(canvas.redo(), could);
                    if !could {
                        prop_assert_eq!(canvas.graph(), &before);
                    }
                }
                _ => {
                    if apply(&mut canvas, op) {
                        let after = canvas.graph().clone();
                        prop_assert_ne!(&after, &before);
                        prop_assert!(!canvas.can_redo());

                        prop_assert!(canvas.undo());
                        prop_assert_eq!(canvas.graph(), &before);
                        prop_assert!(canvas.redo());
                        prop_assert_eq!(canvas.graph(), &after);
                    } else {
                        prop_assert_eq!(canvas.graph(), &before);
                    }
                }
            }
            prop_assert!(canvas.history().past_len() <= 8);
        }
    }

    #[test]
    fn proptest_undo_all_returns_to_oldest_kept_state(
        kinds in prop::collection::vec(prop::sample::select(NodeKind::ALL.to_vec()), 1..20)
    ) {
        let config = EditorConfig { history_limit: 5, ..EditorConfig::default() };
        let mut canvas = canvas_with(config, Graph::default());
        for kind in &kinds {
            canvas.add_node(*kind);
        }

        let mut undone = 0;
        while canvas.undo() {
            undone += 1;
        }
        prop_assert_eq!(undone, kinds.len().min(5));
        prop_assert_eq!(canvas.graph().nodes.len(), kinds.len() - undone);
        prop_assert_eq!(canvas.history().future_len(), undone);
    }
}

// ============================================================================
// Scalability
// ============================================================================

#[test]
fn test_layout_1k_nodes() {
    let graph = pipelines(100, SCALE_SMALL / 100);
    let config = EditorConfig::default();

    let start = Instant::now();
    let positions = layered_layout(&graph, &config.layout, config.default_node_size);
    let elapsed = start.elapsed();

    assert_eq!(positions.len(), SCALE_SMALL);
    let unique: HashSet<(i64, i64)> = positions
        .iter()
        .map(|(_, p)| (p.x.round() as i64, p.y.round() as i64))
        .collect();
    assert_eq!(unique.len(), SCALE_SMALL);
    assert_timing!(elapsed, thresholds::LAYOUT_1K, "Auto layout (1K)");
}

#[test]
fn test_reroute_5k_nodes() {
    let mut graph = pipelines(500, SCALE_LARGE / 500);
    let config = RoutingConfig::default();

    let start = Instant::now();
    let changed = reroute_edges(&mut graph, &config);
    let elapsed = start.elapsed();

    assert_eq!(changed, graph.edges.len());
    assert_eq!(reroute_edges(&mut graph, &config), 0);
    assert_timing!(elapsed, thresholds::REROUTE_5K, "Reroute (5K)");
}

#[test]
fn test_select_and_delete_5k_nodes() {
    let graph = pipelines(500, SCALE_LARGE / 500);
    let ids: Vec<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
    let mut canvas = canvas_with(EditorConfig::default(), graph);

    let start = Instant::now();
    canvas.set_selection(ids.clone(), Vec::new());
    let elapsed = start.elapsed();
    assert_eq!(canvas.selected_nodes().len(), SCALE_LARGE);
    assert_timing!(elapsed, thresholds::SELECT_ALL_5K, "Select all (5K)");

    canvas.set_selection(ids.into_iter().step_by(2), Vec::new());
    let start = Instant::now();
    assert!(canvas.delete_selected());
    let elapsed = start.elapsed();

    assert_eq!(canvas.graph().nodes.len(), SCALE_LARGE / 2);
    let remaining: HashSet<&str> = canvas.graph().nodes.iter().map(|n| n.id.as_str()).collect();
    assert!(canvas
        .graph()
        .edges
        .iter()
        .all(|e| remaining.contains(e.source.as_str()) && remaining.contains(e.target.as_str())));
    assert_timing!(elapsed, thresholds::DELETE_HALF_5K, "Delete half (5K)");
}

#[test]
fn test_history_snapshots_of_large_graph_stay_bounded() {
    let mut canvas = canvas_with(EditorConfig::default(), pipelines(100, SCALE_SMALL / 100));
    let limit = canvas.history().limit();

    let start = Instant::now();
    for _ in 0..limit * 2 {
        canvas.add_node(NodeKind::Job);
    }
    let elapsed = start.elapsed();

    assert_eq!(canvas.history().past_len(), limit);
    assert_eq!(canvas.graph().nodes.len(), SCALE_SMALL + limit * 2);
    assert_timing!(elapsed, thresholds::SNAPSHOTS_1K, "{} snapshots (1K)", limit * 2);
}
