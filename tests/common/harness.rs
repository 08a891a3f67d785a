//! Test harness wrapping a [`WorkflowApp`] with deterministic time and
//! in-memory storage.

#![allow(dead_code)]

use super::{ChangeTracker, ScriptedGenerator};
use std::sync::Arc;
use std::time::Duration;
use workflow_canvas::{
    Canvas, CanvasController, EditorConfig, GenerationError, Graph, KeyInput, ManualClock,
    MemoryStorage, NodeClick, WorkflowApp, WorkflowNode,
};

/// 2023-11-14T22:13:20Z
pub const START_MILLIS: i64 = 1_700_000_000_000;
pub const STORAGE_KEY: &str = "logic-flow-canvas-data";

pub struct EditorHarness {
    pub app: WorkflowApp,
    pub storage: MemoryStorage,
    pub clock: ManualClock,
    pub tracker: ChangeTracker,
    pub generator: Arc<ScriptedGenerator>,
}

impl EditorHarness {
    /// Fresh storage, so the app starts from the sample graph.
    pub fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    pub fn with_storage(storage: MemoryStorage) -> Self {
        Self::build(storage, ScriptedGenerator::new(), EditorConfig::default())
    }

    pub fn with_generator(generator: ScriptedGenerator) -> Self {
        Self::build(MemoryStorage::new(), generator, EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::build(MemoryStorage::new(), ScriptedGenerator::new(), config)
    }

    /// Start from `graph` instead of the sample.
    pub fn with_graph(graph: &Graph) -> Self {
        let storage = MemoryStorage::new();
        storage.insert(STORAGE_KEY, serde_json::to_string(graph).unwrap());
        Self::with_storage(storage)
    }

    fn build(storage: MemoryStorage, generator: ScriptedGenerator, config: EditorConfig) -> Self {
        let clock = ManualClock::new(START_MILLIS);
        let generator = Arc::new(generator);
        let app = WorkflowApp::with_clock(
            config,
            Box::new(storage.clone()),
            generator.clone(),
            Box::new(clock.clone()),
        );
        let tracker = ChangeTracker::new();
        let graphs = tracker.graphs.clone();
        app.controller().on_change(move |graph| graphs.borrow_mut().push(graph.clone()));
        Self { app, storage, clock, tracker, generator }
    }

    pub fn ctrl(&self) -> &CanvasController {
        self.app.controller()
    }

    pub fn canvas<R>(&self, f: impl FnOnce(&Canvas) -> R) -> R {
        self.ctrl().with(f)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        self.ctrl().update(f)
    }

    pub fn graph(&self) -> Graph {
        self.canvas(|c| c.graph().clone())
    }

    pub fn node(&self, id: &str) -> WorkflowNode {
        self.canvas(|c| c.graph().node(id).cloned())
            .unwrap_or_else(|| panic!("node {} not found", id))
    }

    /// What the storage currently holds.
    pub fn stored_graph(&self) -> Graph {
        let text = self.storage.get(STORAGE_KEY).expect("nothing stored");
        serde_json::from_str(&text).unwrap()
    }

    // === Interaction helpers ===

    pub fn click(&self, id: &str) -> NodeClick {
        self.update(|c| c.click_node(id, false))
    }

    pub fn shift_click(&self, id: &str) -> NodeClick {
        self.update(|c| c.click_node(id, true))
    }

    pub fn press(&self, input: KeyInput) -> bool {
        self.update(|c| c.handle_key(&input))
    }

    /// Drag `id` by `(dx, dy)` split into `steps` pointer moves.
    pub fn drag(&self, id: &str, dx: f64, dy: f64, steps: usize) -> bool {
        self.update(|c| {
            if !c.begin_drag(id) {
                return false;
            }
            let steps = steps.max(1);
            for _ in 0..steps {
                c.drag_by(dx / steps as f64, dy / steps as f64);
            }
            c.end_drag()
        })
    }

    pub fn selected_nodes(&self) -> Vec<String> {
        self.canvas(|c| c.selected_nodes().sorted())
    }

    pub fn selected_edges(&self) -> Vec<String> {
        self.canvas(|c| c.selected_edges().sorted())
    }

    pub fn finish_generation(&mut self) -> Result<usize, GenerationError> {
        self.app
            .wait_generation(Duration::from_secs(5))
            .expect("generation did not finish in time")
    }
}
