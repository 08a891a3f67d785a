//! Generating workflow graphs from free text.
//!
//! A [`Generator`] turns a prompt into JSON text. [`GenerationTask`] runs it
//! on a worker thread and hands the result back over a channel when polled,
//! and [`convert_response`] turns the JSON into canvas nodes and edges.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use serde::Deserialize;

use crate::config::EditorConfig;
use crate::error::GenerationError;
use crate::model::{
    ApiData, Graph, HttpMethod, NodeEdit, NodeKind, NodePayload, Position, WorkflowEdge,
    WorkflowNode,
};

/// The external generation service.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

impl<F> Generator for F
where
    F: Fn(&str) -> Result<String, GenerationError> + Send + Sync,
{
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self(prompt)
    }
}

// === Response schema ===

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationResponse {
    pub nodes: Vec<GeneratedNode>,
    pub edges: Vec<GeneratedEdge>,
}

/// Nodes and edges ready to append to the canvas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedGraph {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

/// Drop a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string, e.g. "json".
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

pub fn parse_response(text: &str) -> Result<GenerationResponse, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GenerationError::Parse(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| GenerationError::Schema { reason: e.to_string() })
}

fn build_payload(node: &GeneratedNode) -> NodePayload {
    let kind = node.kind.parse::<NodeKind>().unwrap_or_else(|err| {
        log::warn!("generated node {}: {}, using INFO", node.id, err);
        NodeKind::Info
    });
    let description = node.description.clone().unwrap_or_default();
    if kind == NodeKind::Api {
        let method = node.method.as_deref().map_or(HttpMethod::default(), |m| {
            HttpMethod::parse(m).unwrap_or_else(|| {
                log::warn!("generated node {}: unknown method '{}', using POST", node.id, m);
                HttpMethod::default()
            })
        });
        return NodePayload::Api(ApiData {
            title: node.title.clone(),
            description: Some(description),
            method,
            path: node.path.clone().unwrap_or_else(|| crate::defaults::DEFAULT_API_PATH.to_string()),
        });
    }
    let mut payload = NodePayload::new(kind, node.title.clone());
    payload.apply_edit(&NodeEdit::Description(description));
    payload
}

/// Convert a response into nodes and edges for `existing`.
///
/// Node ids that collide with the canvas are renamed and edges follow the
/// rename. An edge endpoint resolves to a response node first, then to a
/// canvas node; anything else fails the whole response.
pub fn convert_response(
    text: &str,
    existing: &Graph,
    millis: i64,
    config: &EditorConfig,
) -> Result<GeneratedGraph, GenerationError> {
    let response = parse_response(text)?;

    let mut seen = HashSet::new();
    for node in &response.nodes {
        if node.id.trim().is_empty() {
            return Err(GenerationError::Schema { reason: "node with empty id".to_string() });
        }
        if !seen.insert(node.id.as_str()) {
            return Err(GenerationError::Schema {
                reason: format!("duplicate node id '{}'", node.id),
            });
        }
    }

    let mut taken: HashSet<String> = existing.nodes.iter().map(|n| n.id.clone()).collect();
    taken.extend(response.nodes.iter().map(|n| n.id.clone()));
    let mut renames: HashMap<&str, String> = HashMap::new();

    let mut nodes = Vec::with_capacity(response.nodes.len());
    for (i, generated) in response.nodes.iter().enumerate() {
        let mut id = generated.id.clone();
        if existing.contains_node(&id) {
            let mut n = 1;
            while taken.contains(&format!("{}-{}", generated.id, n)) {
                n += 1;
            }
            id = format!("{}-{}", generated.id, n);
            taken.insert(id.clone());
            log::debug!("generated node {} renamed to {}", generated.id, id);
        }
        renames.insert(generated.id.as_str(), id.clone());

        let offset = i as f64 * 50.0;
        let payload = build_payload(generated);
        let mut node = WorkflowNode::new(id, Position::new(offset, offset), payload);
        if node.kind().is_group() {
            node.set_size(config.default_group_size);
        }
        nodes.push(node);
    }

    let resolve = |id: &str| -> Result<String, GenerationError> {
        if let Some(renamed) = renames.get(id) {
            Ok(renamed.clone())
        } else if existing.contains_node(id) {
            Ok(id.to_string())
        } else {
            Err(GenerationError::Schema {
                reason: format!("edge references unknown node '{}'", id),
            })
        }
    };

    let mut pairs = HashSet::new();
    let mut edges = Vec::with_capacity(response.edges.len());
    for generated in &response.edges {
        let source = resolve(&generated.source)?;
        let target = resolve(&generated.target)?;
        if source == target {
            log::warn!("generated self-loop on {} dropped", source);
            continue;
        }
        if !pairs.insert((source.clone(), target.clone())) {
            continue;
        }
        let id = format!("e-ai-{}-{}-{}", millis, source, target);
        edges.push(WorkflowEdge::styled(
            id,
            source,
            target,
            &config.connect_edge_color,
            config.edge_stroke_width,
        ));
    }

    Ok(GeneratedGraph { nodes, edges })
}

// === Background task ===

#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    Idle,
    Pending { ticket: u64, prompt: String },
    Succeeded { prompt: String },
    Failed { prompt: String, error: GenerationError },
}

/// A finished request, as returned by [`GenerationTask::poll`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub ticket: u64,
    pub prompt: String,
    pub result: Result<String, GenerationError>,
}

type Reply = (u64, Result<String, GenerationError>);

/// One generation request at a time, run off the UI thread.
pub struct GenerationTask {
    generator: Arc<dyn Generator>,
    state: TaskState,
    inflight: Option<Receiver<Reply>>,
    next_ticket: u64,
}

impl GenerationTask {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            state: TaskState::Idle,
            inflight: None,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TaskState::Pending { .. })
    }

    /// Start a request. Rejected while another is pending or when the prompt is blank.
    pub fn submit(&mut self, prompt: &str) -> Result<u64, GenerationError> {
        if self.is_pending() {
            return Err(GenerationError::Busy);
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let ticket = self.next_ticket;
        let (tx, rx) = crossbeam_channel::bounded::<Reply>(1);
        let generator = Arc::clone(&self.generator);
        let request = prompt.to_string();
        std::thread::Builder::new()
            .name(format!("generation-{}", ticket))
            .spawn(move || {
                let result = generator.generate(&request);
                // The receiver is gone if the request was cancelled.
                let _ = tx.send((ticket, result));
            })
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        self.next_ticket += 1;
        self.inflight = Some(rx);
        self.state = TaskState::Pending { ticket, prompt: prompt.to_string() };
        log::info!("generation {} submitted", ticket);
        Ok(ticket)
    }

    /// Abandon the in-flight request; its result will be discarded.
    pub fn cancel(&mut self) -> bool {
        let TaskState::Pending { ticket, .. } = &self.state else {
            return false;
        };
        log::info!("generation {} cancelled", ticket);
        self.inflight = None;
        self.state = TaskState::Idle;
        true
    }

    /// Cancel whatever is pending and submit `prompt` instead.
    pub fn supersede(&mut self, prompt: &str) -> Result<u64, GenerationError> {
        self.cancel();
        self.submit(prompt)
    }

    /// Collect the result if it has arrived.
    pub fn poll(&mut self) -> Option<GenerationOutcome> {
        let reply = match self.inflight.as_ref()?.try_recv() {
            Ok(reply) => Ok(reply),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(GenerationError::Disconnected),
        };
        self.finish(reply)
    }

    /// Block until the result arrives or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<GenerationOutcome> {
        let reply = match self.inflight.as_ref()?.recv_timeout(timeout) {
            Ok(reply) => Ok(reply),
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(GenerationError::Disconnected),
        };
        self.finish(reply)
    }

    fn finish(&mut self, reply: Result<Reply, GenerationError>) -> Option<GenerationOutcome> {
        let TaskState::Pending { ticket, prompt } = &self.state else {
            self.inflight = None;
            return None;
        };
        let (ticket, prompt) = (*ticket, prompt.clone());
        let result = match reply {
            Ok((got, _)) if got != ticket => {
                log::debug!("dropping stale generation result {}", got);
                return None;
            }
            Ok((_, result)) => result,
            Err(err) => Err(err),
        };
        self.inflight = None;
        self.state = match &result {
            Ok(_) => TaskState::Succeeded { prompt: prompt.clone() },
            Err(error) => {
                log::warn!("generation {} failed: {}", ticket, error);
                TaskState::Failed { prompt: prompt.clone(), error: error.clone() }
            }
        };
        Some(GenerationOutcome { ticket, prompt, result })
    }

    /// Record a failure found after the response arrived, e.g. a schema violation.
    pub fn mark_failed(&mut self, error: GenerationError) {
        let prompt = match &self.state {
            TaskState::Succeeded { prompt }
            | TaskState::Pending { prompt, .. }
            | TaskState::Failed { prompt, .. } => prompt.clone(),
            TaskState::Idle => String::new(),
        };
        self.inflight = None;
        self.state = TaskState::Failed { prompt, error };
    }
}
