//! Persisted state, JSON import and export.
//!
//! The document is `{ "nodes": [...], "edges": [...] }`, stored under one
//! key. Loading never fails: unreadable data falls back to the sample graph,
//! field by field.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::defaults;
use crate::error::PersistenceError;
use crate::model::{Graph, WorkflowEdge, WorkflowNode};

/// Key/value store for the persisted document.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// One `{key}.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { key: key.to_string(), source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let io = |source| PersistenceError::Io { key: key.to_string(), source };
        std::fs::create_dir_all(&self.dir).map_err(io)?;
        std::fs::write(self.path_for(key), value).map_err(io)
    }
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// while the app owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.insert(key, value);
        Ok(())
    }
}

fn field<T: serde::de::DeserializeOwned>(doc: &Value, name: &'static str) -> Option<T> {
    let value = doc.get(name).filter(|v| !v.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::warn!("stored '{}' unreadable: {}", name, err);
            None
        }
    }
}

/// Read the stored graph, falling back to the sample for anything missing.
pub fn load_state(storage: &dyn Storage, key: &str) -> Graph {
    let text = match storage.read(key) {
        Ok(Some(text)) => text,
        Ok(None) => {
            log::info!("no stored state under '{}', using sample graph", key);
            return defaults::sample_graph();
        }
        Err(err) => {
            log::warn!("failed to read stored state: {}", err);
            return defaults::sample_graph();
        }
    };
    let doc: Value = match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(err) => {
            log::warn!("stored state is not valid JSON: {}", err);
            return defaults::sample_graph();
        }
    };

    let nodes: Vec<WorkflowNode> = field(&doc, "nodes").unwrap_or_else(defaults::sample_nodes);
    let edges: Vec<WorkflowEdge> = field(&doc, "edges").unwrap_or_else(defaults::sample_edges);
    log::debug!("loaded {} nodes and {} edges", nodes.len(), edges.len());
    Graph::new(nodes, edges)
}

/// Write the graph as one compact document.
pub fn save_state(storage: &mut dyn Storage, key: &str, graph: &Graph) -> Result<(), PersistenceError> {
    let text = serde_json::to_string(graph)?;
    storage.write(key, &text)?;
    log::debug!("saved {} nodes and {} edges", graph.nodes.len(), graph.edges.len());
    Ok(())
}

/// File name for an export made at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("workflow-{}.json", now.format("%Y-%m-%d"))
}

/// Pretty-printed export document and its file name.
pub fn export_document(graph: &Graph, now: DateTime<Utc>) -> Result<(String, String), PersistenceError> {
    Ok((export_file_name(now), serde_json::to_string_pretty(graph)?))
}

/// Parse an imported file. Both `nodes` and `edges` must be present and non-null.
pub fn parse_import(text: &str) -> Result<Graph, PersistenceError> {
    let doc: Value = serde_json::from_str(text)?;
    let Some(object) = doc.as_object() else {
        return Err(PersistenceError::NotAnObject);
    };
    for name in ["nodes", "edges"] {
        if object.get(name).map_or(true, Value::is_null) {
            return Err(PersistenceError::MissingField { field: name });
        }
    }
    Ok(serde_json::from_value(doc)?)
}
