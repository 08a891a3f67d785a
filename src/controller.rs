//! Slint-facing handle over a [`Canvas`].
//!
//! [`CanvasController`] mirrors the canvas into `VecModel`s that a UI can bind
//! to, and hands out callbacks that forward UI events to the canvas.
//!
//! # Example
//!
//! ```ignore
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = CanvasController::new(Canvas::default());
//!
//!     window.set_nodes(ctrl.nodes_model());
//!     window.set_edges(ctrl.edges_model());
//!     window.on_node_clicked(ctrl.node_clicked_callback());
//!     window.on_key_pressed(ctrl.key_pressed_callback());
//!     window.on_add_node(ctrl.add_node_callback());
//!     window.on_pane_clicked(ctrl.pane_clicked_callback());
//!
//!     window.run().unwrap();
//! }
//! ```

use crate::canvas::{Canvas, NodeClick};
use crate::model::{Graph, NodeKind, WorkflowEdge, WorkflowNode};
use crate::selection::SelectionManager;
use crate::shortcuts::KeyInput;
use slint::{Color, Model, ModelRc, SharedString, VecModel};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Row of the node model, in render order.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRow {
    pub id: SharedString,
    pub kind: SharedString,
    /// Palette section label, e.g. "Infrastructure".
    pub category: SharedString,
    pub title: SharedString,
    pub description: SharedString,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub z_index: i32,
    pub is_icon: bool,
    pub selected: bool,
    pub connect_source: bool,
}

/// Row of the edge model.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRow {
    pub id: SharedString,
    pub source: SharedString,
    pub target: SharedString,
    pub source_handle: SharedString,
    pub target_handle: SharedString,
    pub color: Color,
    pub stroke_width: f32,
    pub animated: bool,
    pub selected: bool,
}

fn node_row(node: &WorkflowNode, canvas: &Canvas) -> NodeRow {
    let size = node.size_or(canvas.config().default_node_size);
    NodeRow {
        id: node.id.as_str().into(),
        kind: node.kind().as_str().into(),
        category: node.kind().category().label().into(),
        title: node.title().into(),
        description: node.payload.description().unwrap_or_default().into(),
        x: node.position.x as f32,
        y: node.position.y as f32,
        width: size.width as f32,
        height: size.height as f32,
        z_index: node.z_index(),
        is_icon: node.kind().is_icon(),
        selected: canvas.selected_nodes().contains(&node.id),
        connect_source: node.connect_source,
    }
}

fn edge_row(edge: &WorkflowEdge, canvas: &Canvas) -> EdgeRow {
    EdgeRow {
        id: edge.id.as_str().into(),
        source: edge.source.as_str().into(),
        target: edge.target.as_str().into(),
        source_handle: edge.source_handle.map(|a| a.as_str()).unwrap_or_default().into(),
        target_handle: edge.target_handle.map(|a| a.as_str()).unwrap_or_default().into(),
        color: edge.stroke_color(),
        stroke_width: edge.style.as_ref().map_or(1.0, |s| s.stroke_width),
        animated: edge.animated,
        selected: canvas.selected_edges().contains(&edge.id),
    }
}

type ChangeListener = Box<dyn Fn(&Graph)>;

/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct CanvasController {
    canvas: Rc<RefCell<Canvas>>,
    nodes: Rc<VecModel<NodeRow>>,
    edges: Rc<VecModel<EdgeRow>>,
    selection: Rc<VecModel<SharedString>>,
    listeners: Rc<RefCell<Vec<ChangeListener>>>,
    synced_revision: Rc<Cell<u64>>,
}

impl CanvasController {
    pub fn new(canvas: Canvas) -> Self {
        let ctrl = Self {
            canvas: Rc::new(RefCell::new(canvas)),
            nodes: Rc::new(VecModel::default()),
            edges: Rc::new(VecModel::default()),
            selection: Rc::new(VecModel::default()),
            listeners: Rc::new(RefCell::new(Vec::new())),
            synced_revision: Rc::new(Cell::new(0)),
        };
        ctrl.sync_models();
        ctrl.synced_revision.set(ctrl.canvas.borrow().revision());
        ctrl
    }

    pub fn nodes_model(&self) -> ModelRc<NodeRow> {
        ModelRc::from(self.nodes.clone())
    }

    pub fn edges_model(&self) -> ModelRc<EdgeRow> {
        ModelRc::from(self.edges.clone())
    }

    /// Selected node ids.
    pub fn selection_model(&self) -> ModelRc<SharedString> {
        ModelRc::from(self.selection.clone())
    }

    /// Register a listener called with the graph after every state change.
    pub fn on_change(&self, listener: impl Fn(&Graph) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Read the canvas.
    pub fn with<R>(&self, f: impl FnOnce(&Canvas) -> R) -> R {
        f(&self.canvas.borrow())
    }

    /// Run an operation on the canvas, then resync the models and notify
    /// listeners if anything changed.
    pub fn update<R>(&self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        let result = f(&mut self.canvas.borrow_mut());
        self.refresh();
        result
    }

    /// Resync if the canvas revision moved since the last sync.
    pub fn refresh(&self) {
        let revision = self.canvas.borrow().revision();
        if revision == self.synced_revision.get() {
            return;
        }
        self.synced_revision.set(revision);
        self.sync_models();

        // Listeners may call back into the controller, so no borrow is held.
        let graph = self.canvas.borrow().graph().clone();
        for listener in self.listeners.borrow().iter() {
            listener(&graph);
        }
    }

    fn sync_models(&self) {
        let canvas = self.canvas.borrow();
        let nodes: Vec<NodeRow> = canvas
            .graph()
            .render_order()
            .into_iter()
            .map(|n| node_row(n, &canvas))
            .collect();
        let edges: Vec<EdgeRow> = canvas.graph().edges.iter().map(|e| edge_row(e, &canvas)).collect();
        self.nodes.set_vec(nodes);
        self.edges.set_vec(edges);
        canvas.selected_nodes().sync_to_model(&self.selection);
    }

    /// Apply a box selection reported by the UI as id models.
    /// Unknown ids are dropped; returns `false` while locked.
    pub fn apply_box_selection(
        &self,
        nodes: &dyn Model<Data = SharedString>,
        edges: &dyn Model<Data = SharedString>,
    ) -> bool {
        let mut picked_nodes = SelectionManager::new();
        picked_nodes.sync_from_model(nodes);
        let mut picked_edges = SelectionManager::new();
        picked_edges.sync_from_model(edges);
        self.update(|c| c.set_selection(picked_nodes.sorted(), picked_edges.sorted()))
    }

    /// Find a node row by id.
    pub fn find_node_row(&self, id: &str) -> Option<(usize, NodeRow)> {
        (0..self.nodes.row_count())
            .filter_map(|i| self.nodes.row_data(i).map(|row| (i, row)))
            .find(|(_, row)| row.id == id)
    }

    // === Callback factories ===

    /// Returns a callback for `node-clicked(id, shift)`.
    pub fn node_clicked_callback(&self) -> impl Fn(SharedString, bool) {
        let ctrl = self.clone();
        move |id, shift| {
            let outcome = ctrl.update(|c| c.click_node(&id, shift));
            if let NodeClick::Rejected(err) = outcome {
                log::debug!("node click on {} rejected: {}", id, err);
            }
        }
    }

    /// Returns a callback for `edge-clicked(id, shift)`.
    pub fn edge_clicked_callback(&self) -> impl Fn(SharedString, bool) {
        let ctrl = self.clone();
        move |id, shift| {
            ctrl.update(|c| c.click_edge(&id, shift));
        }
    }

    /// Returns a callback for `key-pressed(key, ctrl, meta, shift, in-text-input) -> bool`.
    pub fn key_pressed_callback(&self) -> impl Fn(SharedString, bool, bool, bool, bool) -> bool {
        let ctrl = self.clone();
        move |key, control, meta, shift, in_text_input| {
            let input = KeyInput {
                key: key.to_string(),
                ctrl: control,
                meta,
                shift,
                in_text_input,
            };
            ctrl.update(|c| c.handle_key(&input))
        }
    }

    /// Returns a callback for `add-node(kind)`; unknown kinds are ignored.
    pub fn add_node_callback(&self) -> impl Fn(SharedString) {
        let ctrl = self.clone();
        move |kind| match kind.parse::<NodeKind>() {
            Ok(kind) => {
                ctrl.update(|c| c.add_node(kind));
            }
            Err(err) => log::warn!("add-node: {}", err),
        }
    }

    /// Returns a callback for `selection-box-finished(node-ids, edge-ids)`.
    pub fn box_selection_callback(&self) -> impl Fn(ModelRc<SharedString>, ModelRc<SharedString>) {
        let ctrl = self.clone();
        move |nodes, edges| {
            ctrl.apply_box_selection(&nodes, &edges);
        }
    }

    /// Returns a callback for `pane-clicked`.
    pub fn pane_clicked_callback(&self) -> impl Fn() {
        let ctrl = self.clone();
        move || ctrl.update(Canvas::click_pane)
    }

    /// Returns a callback for `pointer-moved(x, y)` in screen coordinates.
    pub fn pointer_moved_callback(&self) -> impl Fn(f32, f32) {
        let canvas = self.canvas.clone();
        move |x, y| canvas.borrow_mut().pointer_moved(x as f64, y as f64)
    }

    /// Returns callbacks for `node-drag-started(id)`, `node-dragged(dx, dy)` and `node-drag-ended`.
    pub fn drag_callbacks(&self) -> (impl Fn(SharedString), impl Fn(f32, f32), impl Fn()) {
        let start = self.clone();
        let moved = self.clone();
        let ended = self.clone();
        (
            move |id: SharedString| {
                start.update(|c| c.begin_drag(&id));
            },
            move |dx: f32, dy: f32| {
                moved.update(|c| c.drag_by(dx as f64, dy as f64));
            },
            move || {
                ended.update(Canvas::end_drag);
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ManualClock;
    use crate::config::EditorConfig;
    use crate::defaults::sample_graph;

    fn controller() -> CanvasController {
        let mut canvas =
            Canvas::with_clock(EditorConfig::default(), Box::new(ManualClock::new(1_000)));
        canvas.load(sample_graph());
        CanvasController::new(canvas)
    }

    #[test]
    fn test_models_mirror_graph() {
        let ctrl = controller();
        assert_eq!(ctrl.nodes_model().row_count(), 6);
        assert_eq!(ctrl.edges_model().row_count(), 4);
        let (_, row) = ctrl.find_node_row("node-api-create").unwrap();
        assert_eq!(row.kind, "API");
        assert_eq!(row.category, "Development");
        assert_eq!(row.x, 600.0);
        assert_eq!(row.width, 240.0);
    }

    #[test]
    fn test_group_rows_come_first() {
        let ctrl = controller();
        ctrl.update(|c| c.add_node(NodeKind::Group));
        let first = ctrl.nodes_model().row_data(0).unwrap();
        assert_eq!(first.kind, "GROUP");
        assert_eq!(first.z_index, -1);
    }

    #[test]
    fn test_listener_fires_on_change_only() {
        let ctrl = controller();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        ctrl.on_change(move |graph| {
            assert!(!graph.nodes.is_empty());
            seen.set(seen.get() + 1);
        });

        ctrl.update(|c| c.add_node(NodeKind::Logic));
        assert_eq!(calls.get(), 1);
        ctrl.update(|c| c.undo());
        assert_eq!(calls.get(), 2);
        // Nothing to redo twice over; second call is a no-op
        ctrl.update(|c| c.redo());
        ctrl.update(|c| c.redo());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_node_clicked_callback_updates_selection_model() {
        let ctrl = controller();
        let click = ctrl.node_clicked_callback();
        click("node-logic".into(), false);
        click("node-mysql".into(), true);

        let selection = ctrl.selection_model();
        let ids: Vec<String> = selection.iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, vec!["node-logic", "node-mysql"]);
        assert!(ctrl.find_node_row("node-logic").unwrap().1.selected);
    }

    #[test]
    fn test_box_selection_reads_id_models() {
        let ctrl = controller();
        let ids = |v: &[&str]| -> ModelRc<SharedString> {
            ModelRc::from(Rc::new(VecModel::from(
                v.iter().map(|s| SharedString::from(*s)).collect::<Vec<_>>(),
            )))
        };
        let boxed = ctrl.box_selection_callback();
        boxed(ids(&["node-mysql", "ghost", "node-app"]), ids(&["e4"]));

        let selection: Vec<String> = ctrl.selection_model().iter().map(|s| s.to_string()).collect();
        assert_eq!(selection, vec!["node-app", "node-mysql"]);
        assert!(ctrl.with(|c| c.selected_edges().contains("e4")));
        assert!(ctrl.find_node_row("node-mysql").unwrap().1.selected);

        // An empty box clears both kinds
        assert!(ctrl.apply_box_selection(&ids(&[]), &ids(&[])));
        assert_eq!(ctrl.selection_model().row_count(), 0);
        assert!(ctrl.with(|c| c.selected_edges().is_empty()));
    }

    #[test]
    fn test_key_callback_undoes_add() {
        let ctrl = controller();
        ctrl.add_node_callback()("REDIS".into());
        assert_eq!(ctrl.nodes_model().row_count(), 7);

        let key = ctrl.key_pressed_callback();
        assert!(key("z".into(), true, false, false, false));
        assert_eq!(ctrl.nodes_model().row_count(), 6);
        assert!(!key("z".into(), true, false, false, true));
    }

    #[test]
    fn test_add_node_callback_ignores_unknown_kind() {
        let ctrl = controller();
        ctrl.add_node_callback()("DATABASE".into());
        assert_eq!(ctrl.nodes_model().row_count(), 6);
    }

    #[test]
    fn test_pane_click_clears_selection() {
        let ctrl = controller();
        ctrl.node_clicked_callback()("node-app".into(), false);
        ctrl.pane_clicked_callback()();
        assert_eq!(ctrl.selection_model().row_count(), 0);
    }

    #[test]
    fn test_drag_callbacks_move_node() {
        let ctrl = controller();
        let (start, moved, ended) = ctrl.drag_callbacks();
        start("node-app".into());
        moved(10.0, 20.0);
        ended();
        let (_, row) = ctrl.find_node_row("node-app").unwrap();
        assert_eq!((row.x, row.y), (60.0, 170.0));
    }

    #[test]
    fn test_edge_rows_carry_style() {
        let ctrl = controller();
        let row = ctrl.edges_model().row_data(0).unwrap();
        assert_eq!(row.source_handle, "s-r");
        assert_eq!(row.color, Color::from_rgb_u8(0x3b, 0x82, 0xf6));
        assert_eq!(row.stroke_width, 2.5);
        assert!(row.animated);
    }
}
