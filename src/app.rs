//! Host application: persisted canvas, import/export, chat and generation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::canvas::{Canvas, Clock, SystemClock};
use crate::chat::{self, ChatLog};
use crate::config::EditorConfig;
use crate::controller::CanvasController;
use crate::error::{GenerationError, PersistenceError};
use crate::generation::{convert_response, GenerationOutcome, GenerationTask, Generator, TaskState};
use crate::model::Graph;
use crate::persistence::{export_document, load_state, parse_import, save_state, Storage};

/// Message to show the user after a failed action. State is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotice {
    pub message: String,
    pub detail: String,
}

impl UserNotice {
    fn new(message: &str, detail: impl fmt::Display) -> Self {
        Self { message: message.to_string(), detail: detail.to_string() }
    }
}

impl fmt::Display for UserNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.detail)
    }
}

type SharedStorage = Rc<RefCell<Box<dyn Storage>>>;

fn persist(storage: &SharedStorage, key: &str, graph: &Graph, last_saved: &RefCell<Option<Graph>>) {
    if last_saved.borrow().as_ref() == Some(graph) {
        return;
    }
    match save_state(&mut **storage.borrow_mut(), key, graph) {
        Ok(()) => *last_saved.borrow_mut() = Some(graph.clone()),
        Err(err) => log::warn!("failed to persist canvas: {}", err),
    }
}

pub struct WorkflowApp {
    controller: CanvasController,
    storage: SharedStorage,
    storage_key: String,
    chat: ChatLog,
    generation: GenerationTask,
    placeholder: Option<u64>,
}

impl WorkflowApp {
    pub fn new(config: EditorConfig, storage: Box<dyn Storage>, generator: Arc<dyn Generator>) -> Self {
        Self::with_clock(config, storage, generator, Box::new(SystemClock))
    }

    /// Load the stored graph (or the sample) and start saving every change.
    pub fn with_clock(
        config: EditorConfig,
        storage: Box<dyn Storage>,
        generator: Arc<dyn Generator>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let storage_key = config.storage_key.clone();
        let graph = load_state(&*storage, &storage_key);
        let mut canvas = Canvas::with_clock(config, clock);
        canvas.load(graph);

        let storage: SharedStorage = Rc::new(RefCell::new(storage));
        let last_saved = Rc::new(RefCell::new(None));
        persist(&storage, &storage_key, canvas.graph(), &last_saved);

        let controller = CanvasController::new(canvas);
        {
            let storage = storage.clone();
            let key = storage_key.clone();
            controller.on_change(move |graph| persist(&storage, &key, graph, &last_saved));
        }

        Self {
            controller,
            storage,
            storage_key,
            chat: ChatLog::new(),
            generation: GenerationTask::new(generator),
            placeholder: None,
        }
    }

    pub fn controller(&self) -> &CanvasController {
        &self.controller
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn generation_state(&self) -> &TaskState {
        self.generation.state()
    }

    /// The stored document text, if any.
    pub fn stored_document(&self) -> Option<String> {
        self.storage.borrow().read(&self.storage_key).ok().flatten()
    }

    // === Import / export ===

    /// File name and pretty JSON of the current graph.
    pub fn export(&self) -> Result<(String, String), UserNotice> {
        self.controller
            .with(|c| export_document(c.graph(), c.clock().now()))
            .map_err(|err| UserNotice::new("Failed to export the workflow.", err))
    }

    /// Replace the graph with an imported document. One undo step.
    pub fn import(&mut self, text: &str) -> Result<(), UserNotice> {
        let graph = parse_import(text).map_err(|err| {
            log::warn!("import rejected: {}", err);
            let message = match &err {
                PersistenceError::MissingField { .. } | PersistenceError::NotAnObject => {
                    "The file is not a workflow document."
                }
                _ => "Failed to parse JSON file.",
            };
            UserNotice::new(message, err)
        })?;
        log::info!("importing {} nodes and {} edges", graph.nodes.len(), graph.edges.len());
        self.controller.update(|c| c.replace_graph(graph));
        Ok(())
    }

    // === Lock ===

    /// Flip lock mode. Returns whether the canvas is now locked.
    pub fn toggle_lock(&mut self) -> bool {
        self.controller.update(|c| {
            let locked = !c.is_locked();
            c.set_locked(locked);
            locked
        })
    }

    // === Generation ===

    /// Start generating from `prompt`. Nothing is logged to the chat when rejected.
    pub fn submit_prompt(&mut self, prompt: &str) -> Result<u64, GenerationError> {
        let ticket = self.generation.submit(prompt)?;
        self.chat.push_user(prompt.trim());
        self.placeholder = Some(self.chat.push_placeholder());
        Ok(ticket)
    }

    /// Apply a finished generation, if one has arrived.
    ///
    /// Returns `None` while nothing has finished, otherwise the number of
    /// inserted nodes or the failure.
    pub fn poll_generation(&mut self) -> Option<Result<usize, GenerationError>> {
        let outcome = self.generation.poll()?;
        Some(self.apply_outcome(outcome))
    }

    /// Like [`poll_generation`](Self::poll_generation), blocking up to `timeout`.
    pub fn wait_generation(&mut self, timeout: Duration) -> Option<Result<usize, GenerationError>> {
        let outcome = self.generation.wait(timeout)?;
        Some(self.apply_outcome(outcome))
    }

    fn apply_outcome(&mut self, outcome: GenerationOutcome) -> Result<usize, GenerationError> {
        let placeholder = self.placeholder.take();
        let converted = outcome.result.and_then(|text| {
            self.controller.with(|c| {
                convert_response(&text, c.graph(), c.clock().now_millis(), c.config())
            })
        });

        match converted {
            Ok(generated) => {
                let count = generated.nodes.len();
                self.controller
                    .update(|c| c.insert_generated(generated.nodes, generated.edges));
                if let Some(id) = placeholder {
                    self.chat.resolve(id, chat::success_message(&outcome.prompt));
                }
                Ok(count)
            }
            Err(err) => {
                log::warn!("generation for '{}' failed: {}", outcome.prompt, err);
                self.generation.mark_failed(err.clone());
                if let Some(id) = placeholder {
                    self.chat.fail(id);
                }
                Err(err)
            }
        }
    }

    /// Abandon the pending request. Returns `false` if nothing was pending.
    pub fn cancel_generation(&mut self) -> bool {
        if !self.generation.cancel() {
            return false;
        }
        if let Some(id) = self.placeholder.take() {
            self.chat.resolve(id, chat::CANCELLED_MESSAGE);
        }
        true
    }
}
