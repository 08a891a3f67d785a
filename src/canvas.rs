//! The canvas: graph state plus every editing operation on it.
//!
//! All structural changes go through [`Canvas::mutate`], which records an
//! undo snapshot before running the change. Selection, tool state, the
//! clipboard and the viewport live beside the graph and are never part of
//! a snapshot.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};

use crate::config::EditorConfig;
use crate::graph::{validate_edge, CompositeValidator, ValidationError, ValidationResult};
use crate::history::History;
use crate::layout::layered_layout;
use crate::model::{
    Anchor, Graph, NodeEdit, NodeKind, NodePayload, Position, Size, WorkflowEdge, WorkflowNode,
};
use crate::routing::{reroute_edges, smart_anchors, RoutingConfig};
use crate::selection::SelectionManager;
use crate::shortcuts::{map_key, KeyInput, ShortcutAction};
use crate::tool::{ConnectStep, Tool, ToolState};
use crate::viewport::Viewport;

/// Source of the current time for ids and file names.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self { millis: Rc::new(Cell::new(millis)) }
    }

    pub fn set(&self, millis: i64) {
        self.millis.set(millis);
    }

    pub fn advance(&self, millis: i64) {
        self.millis.set(self.millis.get() + millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.get())
            .single()
            .unwrap_or_default()
    }

    fn now_millis(&self) -> i64 {
        self.millis.get()
    }
}

/// Result of a node click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeClick {
    /// Locked canvas or unknown node.
    Ignored,
    Selected,
    SourcePicked,
    Connected(String),
    Rejected(ValidationError),
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    moved: bool,
}

pub struct Canvas {
    graph: Graph,
    history: History,
    tool: ToolState,
    selected_nodes: SelectionManager,
    selected_edges: SelectionManager,
    clipboard: Option<Vec<WorkflowNode>>,
    viewport: Viewport,
    pointer: (f64, f64),
    locked: bool,
    drag: Option<DragState>,
    revision: u64,
    config: EditorConfig,
    clock: Box<dyn Clock>,
    validator: CompositeValidator,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Canvas {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            graph: Graph::default(),
            history: History::new(config.history_limit),
            tool: ToolState::default(),
            selected_nodes: SelectionManager::new(),
            selected_edges: SelectionManager::new(),
            clipboard: None,
            viewport: Viewport::default(),
            pointer: (0.0, 0.0),
            locked: false,
            drag: None,
            revision: 0,
            config,
            clock,
            validator: CompositeValidator::standard(),
        }
    }

    /// Replace the rule set checked before an edge is added.
    pub fn set_validator(&mut self, validator: CompositeValidator) {
        self.validator = validator;
    }

    /// Install a graph without recording history, e.g. at startup.
    pub fn load(&mut self, graph: Graph) {
        self.graph = graph;
        self.history.clear();
        self.after_replace();
        self.touch();
    }

    // === Accessors ===

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn tool(&self) -> Tool {
        self.tool.tool()
    }

    pub fn pending_source(&self) -> Option<&str> {
        self.tool.pending()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn selected_nodes(&self) -> &SelectionManager {
        &self.selected_nodes
    }

    pub fn selected_edges(&self) -> &SelectionManager {
        &self.selected_edges
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.as_ref().map_or(0, Vec::len)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    // === Mutation gateway ===

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Snapshot the graph, then apply `change` to it.
    pub fn mutate<R>(&mut self, label: &str, change: impl FnOnce(&mut Graph) -> R) -> R {
        self.history.snapshot(&self.graph);
        log::debug!("mutate: {}", label);
        let result = change(&mut self.graph);
        self.touch();
        result
    }

    fn routing(&self) -> RoutingConfig {
        RoutingConfig {
            default_size: self.config.default_node_size,
            bias: self.config.routing_bias,
        }
    }

    fn reroute(&mut self) -> usize {
        let routing = self.routing();
        reroute_edges(&mut self.graph, &routing)
    }

    /// Re-derive everything that hangs off graph ids after a wholesale change.
    fn after_replace(&mut self) {
        let graph = &self.graph;
        let pruned_nodes = self.selected_nodes.retain(|id| graph.contains_node(id));
        let pruned_edges = self.selected_edges.retain(|id| graph.contains_edge(id));
        if pruned_nodes + pruned_edges > 0 {
            log::debug!("pruned {} nodes and {} edges from selection", pruned_nodes, pruned_edges);
        }
        self.tool.prune(|id| graph.contains_node(id));
        self.drag = None;
        self.sync_markers();
    }

    fn sync_markers(&mut self) {
        match self.tool.pending() {
            Some(id) => {
                let id = id.to_string();
                self.graph.mark_connect_source(&id);
            }
            None => {
                self.graph.clear_connect_markers();
            }
        }
    }

    fn unique_id(&self, base: String, taken: impl Fn(&str) -> bool) -> String {
        if !taken(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn fresh_node_id(&self, base: String) -> String {
        self.unique_id(base, |id| self.graph.contains_node(id))
    }

    // === Node creation ===

    /// Add a palette node at the next cascade position. Returns its id.
    pub fn add_node(&mut self, kind: NodeKind) -> String {
        let id = self.fresh_node_id(format!("node-{}", self.clock.now_millis()));
        let count = self.graph.nodes.len() as f64;
        let offset = (count * self.config.cascade_step) % self.config.cascade_wrap
            + self.config.cascade_origin;
        let mut node = WorkflowNode::new(
            id.clone(),
            Position::new(offset, offset),
            NodePayload::palette_default(kind),
        );
        if kind.is_group() {
            node.set_size(self.config.default_group_size);
        }
        log::info!("adding {} node {}", kind, id);
        self.mutate("add node", |graph| graph.nodes.push(node));
        id
    }

    // === Layout ===

    /// Lay out all non-group nodes left to right, reroute and fit the view.
    /// Returns `false` when there is nothing to lay out.
    pub fn auto_layout(&mut self) -> bool {
        let positions =
            layered_layout(&self.graph, &self.config.layout, self.config.default_node_size);
        if positions.is_empty() {
            return false;
        }
        self.mutate("auto layout", |graph| apply_positions(graph, &positions));
        self.reroute();
        self.fit_view();
        true
    }

    // === Clipboard ===

    /// Capture the selected nodes. Edges are not copied.
    pub fn copy(&mut self) -> usize {
        if self.selected_nodes.is_empty() {
            return 0;
        }
        let copied: Vec<WorkflowNode> = self
            .graph
            .nodes
            .iter()
            .filter(|n| self.selected_nodes.contains(&n.id))
            .cloned()
            .map(|mut n| {
                n.connect_source = false;
                n
            })
            .collect();
        let count = copied.len();
        log::debug!("copied {} nodes", count);
        self.clipboard = Some(copied);
        count
    }

    /// Paste the clipboard at the pointer. Returns the new ids, which become
    /// the selection.
    pub fn paste(&mut self) -> Vec<String> {
        let Some(clipboard) = self.clipboard.as_ref().filter(|c| !c.is_empty()) else {
            return Vec::new();
        };
        let origin = self.viewport.screen_to_flow(self.pointer.0, self.pointer.1);
        let millis = self.clock.now_millis();
        let step = self.config.paste_offset;

        let mut taken: HashSet<String> = self.graph.nodes.iter().map(|n| n.id.clone()).collect();
        let mut pasted = Vec::with_capacity(clipboard.len());
        for (i, source) in clipboard.iter().enumerate() {
            let id = self.unique_id(format!("node-{}-{}", millis, i), |id| taken.contains(id));
            taken.insert(id.clone());
            let mut node = source.clone();
            node.id = id;
            node.position = Position::new(origin.x + i as f64 * step, origin.y + i as f64 * step);
            pasted.push(node);
        }

        let ids: Vec<String> = pasted.iter().map(|n| n.id.clone()).collect();
        self.mutate("paste", |graph| graph.nodes.extend(pasted));
        self.selected_nodes.replace_selection(ids.iter().cloned());
        self.selected_edges.clear();
        ids
    }

    // === Deletion ===

    /// Remove selected nodes (with their edges) and selected edges.
    /// No snapshot when nothing would be removed.
    pub fn delete_selected(&mut self) -> bool {
        let nodes: HashSet<String> = self
            .selected_nodes
            .iter()
            .filter(|id| self.graph.contains_node(id))
            .cloned()
            .collect();
        let edges: HashSet<String> = self
            .selected_edges
            .iter()
            .filter(|id| self.graph.contains_edge(id))
            .cloned()
            .collect();
        if nodes.is_empty() && edges.is_empty() {
            return false;
        }

        let (removal, removed_edges) = self.mutate("delete selection", |graph| {
            let removal = graph.remove_nodes(&nodes);
            (removal, graph.remove_edges(&edges))
        });
        log::info!(
            "deleted {} nodes and {} edges",
            removal.nodes,
            removal.edges + removed_edges
        );
        self.selected_nodes.clear();
        self.selected_edges.clear();
        self.after_replace();
        true
    }

    // === History ===

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.graph) else {
            return false;
        };
        self.graph = previous;
        self.after_replace();
        self.touch();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.graph) else {
            return false;
        };
        self.graph = next;
        self.after_replace();
        self.touch();
        true
    }

    // === Keyboard ===

    /// Dispatch a key press. Returns whether it mapped to an action.
    pub fn handle_key(&mut self, input: &KeyInput) -> bool {
        let Some(action) = map_key(input) else {
            return false;
        };
        log::debug!("shortcut {:?}", action);
        match action {
            ShortcutAction::DeleteSelection => {
                self.delete_selected();
            }
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Copy => {
                self.copy();
            }
            ShortcutAction::Paste => {
                self.paste();
            }
            ShortcutAction::SelectTool => {
                self.reset_tool();
            }
            ShortcutAction::ConnectTool => {
                self.enter_connect_tool();
            }
            ShortcutAction::Escape => {
                self.reset_tool();
                self.clear_selection();
            }
        }
        true
    }

    // === Pointer interaction ===

    pub fn click_node(&mut self, id: &str, shift: bool) -> NodeClick {
        if self.locked || !self.graph.contains_node(id) {
            return NodeClick::Ignored;
        }
        let outcome = match self.tool.click_node(id) {
            ConnectStep::NotConnecting => {
                self.selected_nodes.handle_interaction(id, shift);
                if !shift {
                    self.selected_edges.clear();
                }
                NodeClick::Selected
            }
            ConnectStep::SourcePicked(source) => {
                self.graph.mark_connect_source(&source);
                self.selected_nodes.select_only(&source);
                self.selected_edges.clear();
                NodeClick::SourcePicked
            }
            ConnectStep::Cancelled => {
                self.graph.clear_connect_markers();
                NodeClick::Cancelled
            }
            ConnectStep::Complete { source, target } => {
                self.graph.clear_connect_markers();
                self.selected_nodes.select_only(&target);
                self.selected_edges.clear();
                match self.add_edge(&source, &target, None) {
                    Ok(edge_id) => NodeClick::Connected(edge_id),
                    Err(err) => {
                        log::warn!("connection {} -> {} rejected: {}", source, target, err);
                        NodeClick::Rejected(err)
                    }
                }
            }
        };
        self.touch();
        outcome
    }

    pub fn click_edge(&mut self, id: &str, shift: bool) -> bool {
        if self.locked || self.tool.is_connecting() || !self.graph.contains_edge(id) {
            return false;
        }
        self.selected_edges.handle_interaction(id, shift);
        if !shift {
            self.selected_nodes.clear();
        }
        self.touch();
        true
    }

    /// Replace the selection, e.g. after a box selection in the UI.
    pub fn set_selection<N, E>(&mut self, nodes: N, edges: E) -> bool
    where
        N: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        if self.locked {
            return false;
        }
        let graph = &self.graph;
        self.selected_nodes
            .replace_selection(nodes.into_iter().filter(|id| graph.contains_node(id)));
        self.selected_edges
            .replace_selection(edges.into_iter().filter(|id| graph.contains_edge(id)));
        self.touch();
        true
    }

    pub fn click_pane(&mut self) {
        if self.tool.clear_pending() {
            self.graph.clear_connect_markers();
        }
        self.clear_selection();
    }

    fn clear_selection(&mut self) {
        self.selected_nodes.clear();
        self.selected_edges.clear();
        self.touch();
    }

    /// Connect with explicit anchors (a handle drag), or routed ones when `None`.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        anchors: Option<(Anchor, Anchor)>,
    ) -> Result<String, ValidationError> {
        if self.locked {
            return Err(ValidationError::Custom("canvas is locked".to_string()));
        }
        self.add_edge(source, target, anchors)
    }

    fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        anchors: Option<(Anchor, Anchor)>,
    ) -> Result<String, ValidationError> {
        let anchors = match anchors {
            Some(anchors) => Some(anchors),
            None => match (self.graph.node(source), self.graph.node(target)) {
                (Some(s), Some(t)) => Some(smart_anchors(s, t, &self.routing())),
                _ => None,
            },
        };
        let base = format!("e{}", self.clock.now_millis());
        let id = self.unique_id(base, |id| self.graph.contains_edge(id));
        let mut edge = WorkflowEdge::styled(
            id.clone(),
            source,
            target,
            &self.config.connect_edge_color,
            self.config.edge_stroke_width,
        );
        if let Some((sh, th)) = anchors {
            edge = edge.with_anchors(sh, th);
        }

        if let ValidationResult::Invalid(err) = validate_edge(&edge, &self.graph, &self.validator) {
            return Err(err);
        }
        log::info!("connecting {} -> {} as {}", source, target, id);
        self.mutate("connect", |graph| graph.edges.push(edge));
        Ok(id)
    }

    // === Tool ===

    /// The connect button. Returns the tool now active.
    pub fn toggle_connect_tool(&mut self) -> Tool {
        let sole = self.selected_nodes.sole().map(str::to_string);
        let tool = self.tool.toggle(sole.as_deref());
        self.drag = None;
        self.sync_markers();
        self.touch();
        tool
    }

    fn enter_connect_tool(&mut self) {
        let sole = self.selected_nodes.sole().map(str::to_string);
        self.tool.enter_connect(sole.as_deref());
        self.drag = None;
        self.sync_markers();
        self.touch();
    }

    pub fn reset_tool(&mut self) {
        self.tool.reset();
        self.graph.clear_connect_markers();
        self.touch();
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.locked == locked {
            return;
        }
        log::info!("canvas {}", if locked { "locked" } else { "unlocked" });
        self.locked = locked;
        self.drag = None;
        self.touch();
    }

    // === Drag ===

    /// Start dragging `id`; it joins the selection. Suppressed while locked or connecting.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        if self.locked || self.tool.is_connecting() || !self.graph.contains_node(id) {
            return false;
        }
        if self.selected_nodes.insert(id) {
            self.touch();
        }
        self.drag = Some(DragState { moved: false });
        true
    }

    /// Move the selection. The first non-zero move records the undo snapshot.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> bool {
        if self.locked || self.tool.is_connecting() {
            return false;
        }
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        if !drag.moved {
            drag.moved = true;
            self.history.snapshot(&self.graph);
            log::debug!("mutate: drag");
        }
        self.graph.translate_nodes(self.selected_nodes.as_set(), dx, dy);
        self.reroute();
        self.touch();
        true
    }

    /// Finish the gesture. Returns whether anything moved.
    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if drag.moved {
            self.reroute();
            self.touch();
        }
        drag.moved
    }

    // === Resize and edits ===

    /// Set a node's size; groups are clamped to the configured minimum.
    pub fn resize_node(&mut self, id: &str, size: Size) -> bool {
        if self.locked {
            return false;
        }
        let Some(node) = self.graph.node(id) else {
            return false;
        };
        let size = if node.kind().is_group() {
            let min = self.config.min_group_size;
            Size::new(size.width.max(min.width), size.height.max(min.height))
        } else {
            size
        };
        if node.size() == Some(size) {
            return false;
        }
        let id = id.to_string();
        self.mutate("resize", |graph| {
            if let Some(node) = graph.node_mut(&id) {
                node.set_size(size);
            }
        });
        self.reroute();
        true
    }

    /// Commit an edit of one node field. Unchanged values record nothing.
    pub fn edit_node(&mut self, id: &str, edit: NodeEdit) -> bool {
        let Some(node) = self.graph.node(id) else {
            return false;
        };
        if !node.payload.supports(&edit) {
            log::warn!("{} nodes have no '{}' field", node.kind(), edit.field_name());
            return false;
        }
        let mut preview = node.payload.clone();
        if !preview.apply_edit(&edit) {
            return false;
        }
        let id = id.to_string();
        self.mutate("edit node", |graph| {
            if let Some(node) = graph.node_mut(&id) {
                node.payload = preview;
            }
        });
        true
    }

    // === Viewport ===

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in(&self.config.viewport);
        self.touch();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out(&self.config.viewport);
        self.touch();
    }

    pub fn fit_view(&mut self) {
        let bounds = self.graph.bounds(self.config.default_node_size);
        self.viewport.fit(bounds, &self.config.viewport);
        self.touch();
    }

    // === Bulk replacement ===

    /// Replace the whole graph, e.g. on import.
    pub fn replace_graph(&mut self, mut graph: Graph) {
        graph.clear_connect_markers();
        self.mutate("replace graph", |current| *current = graph);
        self.after_replace();
    }

    /// Append generated nodes and edges, then lay out. One undo step covers both.
    pub fn insert_generated(&mut self, nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) {
        log::info!("inserting {} generated nodes and {} edges", nodes.len(), edges.len());
        self.mutate("insert generated", |graph| {
            graph.nodes.extend(nodes);
            graph.edges.extend(edges);
        });
        let positions =
            layered_layout(&self.graph, &self.config.layout, self.config.default_node_size);
        apply_positions(&mut self.graph, &positions);
        self.reroute();
        self.fit_view();
    }
}

fn apply_positions(graph: &mut Graph, positions: &[(String, Position)]) {
    for (id, position) in positions {
        if let Some(node) = graph.node_mut(id) {
            node.position = *position;
        }
    }
}
