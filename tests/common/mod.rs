//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Mutex;

use workflow_canvas::{GenerationError, Generator, Graph};

/// Records every graph the controller reports through `on_change`.
#[derive(Default, Clone)]
pub struct ChangeTracker {
    pub graphs: Rc<RefCell<Vec<Graph>>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.graphs.borrow().len()
    }

    pub fn last(&self) -> Option<Graph> {
        self.graphs.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.graphs.borrow_mut().clear();
    }
}

/// Generator that replays queued replies, then fails with a transport error.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn fail(self, error: GenerationError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<String, GenerationError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(GenerationError::Transport("no scripted reply".to_string())))
    }
}

/// A small valid generation response: API -> REDIS -> MYSQL.
pub const LOGIN_FLOW: &str = r#"{
    "nodes": [
        {"id": "login-api", "type": "API", "title": "Login", "method": "POST", "path": "/auth/login"},
        {"id": "session-cache", "type": "REDIS", "title": "Session cache"},
        {"id": "user-db", "type": "MYSQL", "title": "Users", "description": "Credential lookup"}
    ],
    "edges": [
        {"source": "login-api", "target": "session-cache"},
        {"source": "session-cache", "target": "user-db"}
    ]
}"#;
