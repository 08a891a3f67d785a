//! # Workflow Canvas
//!
//! A headless engine for workflow diagram editors. It owns the graph, the
//! editing state and every decision an editor makes in response to user
//! input, and mirrors the result into Slint models so any UI can render it.
//!
//! ## Features
//!
//! - **Typed nodes** - A closed set of node kinds with per-kind payloads
//! - **Undo/Redo** - Bounded whole-graph snapshot history
//! - **Connect Tool** - Click-click edge creation with validation
//! - **Smart Routing** - Edges attach to the sides facing each other
//! - **Auto Layout** - Layered left-to-right layout via `rust-sugiyama`
//! - **Persistence** - Stored state, JSON import and export
//! - **Generation** - Build graphs from a text prompt on a worker thread
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use workflow_canvas::{EditorConfig, FileStorage, NodeKind, WorkflowApp};
//!
//! let generator = Arc::new(|prompt: &str| my_service::generate(prompt));
//! let app = WorkflowApp::new(
//!     EditorConfig::default(),
//!     Box::new(FileStorage::new("./state")),
//!     generator,
//! );
//! app.controller().update(|canvas| canvas.add_node(NodeKind::Api));
//! ```
//!
//! ## Core Components
//!
//! - [`Canvas`] - Graph state plus every editing operation
//! - [`CanvasController`] - Slint model mirror and UI callback factories
//! - [`WorkflowApp`] - Persistence, import/export, chat and generation
//! - [`History`] - Undo/redo snapshot stacks
//! - [`ToolState`] - Select/connect tool state machine
//! - [`SelectionManager`] - Selection state with O(1) lookups
//! - [`GenerationTask`] - Background generation with stale-result discard

pub mod app;
pub mod canvas;
pub mod chat;
pub mod config;
pub mod controller;
pub mod defaults;
pub mod error;
pub mod generation;
pub mod graph;
pub mod history;
pub mod layout;
pub mod model;
pub mod persistence;
pub mod routing;
pub mod selection;
pub mod shortcuts;
pub mod tool;
pub mod viewport;

pub use app::{UserNotice, WorkflowApp};
pub use canvas::{Canvas, Clock, ManualClock, NodeClick, SystemClock};
pub use chat::{ChatLog, ChatMessage, ChatRole};
pub use config::{load_config, EditorConfig, LayoutConfig, ViewportConfig};
pub use controller::{CanvasController, EdgeRow, NodeRow};
pub use error::{ConfigError, EditorError, GenerationError, PersistenceError, Result};
pub use generation::{
    convert_response, GeneratedGraph, GenerationOutcome, GenerationTask, Generator, TaskState,
};
pub use graph::{
    Bounds, Removal,
    // Edge validation framework
    EdgeValidator, BasicEdgeValidator, NoDuplicatesValidator, CompositeValidator,
    ValidationResult, ValidationError, validate_edge,
};
pub use history::History;
pub use layout::{layered_layout, sugiyama_layout, Direction, NodePosition, SugiyamaConfig};
pub use model::{
    Anchor, Graph, HttpMethod, NodeCategory, NodeEdit, NodeKind, NodePayload, Position, Side, Size,
    WorkflowEdge, WorkflowNode,
};
pub use persistence::{FileStorage, MemoryStorage, Storage};
pub use routing::{smart_anchors, RoutingConfig};
pub use selection::SelectionManager;
pub use shortcuts::{map_key, KeyInput, ShortcutAction};
pub use tool::{ConnectStep, Tool, ToolState};
pub use viewport::Viewport;
