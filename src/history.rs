//! Bounded undo/redo of whole-graph snapshots.

use crate::model::Graph;
use std::collections::VecDeque;

/// Past and future snapshot stacks.
///
/// The past stack is capped at `limit`; the oldest entry is evicted first.
/// Recording a new snapshot always discards the future.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Graph>,
    future: Vec<Graph>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(crate::defaults::HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record `graph` as the state to return to on the next undo.
    pub fn snapshot(&mut self, graph: &Graph) {
        self.past.push_back(graph.clone());
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Step back. `live` is kept for redo; `None` when there is nothing to undo.
    pub fn undo(&mut self, live: &Graph) -> Option<Graph> {
        let previous = self.past.pop_back()?;
        self.future.push(live.clone());
        Some(previous)
    }

    pub fn redo(&mut self, live: &Graph) -> Option<Graph> {
        let next = self.future.pop()?;
        self.past.push_back(live.clone());
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
