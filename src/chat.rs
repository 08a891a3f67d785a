//! Conversation shown beside the canvas while generating workflows.

pub const WELCOME_MESSAGE: &str = "Hi! I'm your workflow architect. Describe the process you need, \
for example \"build a login verification flow with an API, a Redis cache and a MySQL query\", \
and I'll lay out the nodes for you.";

pub const LOADING_MESSAGE: &str = "Thinking and building the flow...";

pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong while generating. Please try again later.";

pub const CANCELLED_MESSAGE: &str = "Generation cancelled.";

/// Reply once a generated graph has been inserted.
pub fn success_message(prompt: &str) -> String {
    format!("I've built the workflow nodes for \"{}\".", prompt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    /// A placeholder awaiting a generation result.
    pub pending: bool,
}

/// Append-only message list. Placeholders are resolved in place.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatLog {
    /// A log holding only the assistant's greeting.
    pub fn new() -> Self {
        let mut log = Self { messages: Vec::new(), next_id: 1 };
        log.push(ChatRole::Assistant, WELCOME_MESSAGE.to_string(), false);
        log
    }

    fn push(&mut self, role: ChatRole, text: String, pending: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage { id, role, text, pending });
        id
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> u64 {
        self.push(ChatRole::User, text.into(), false)
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) -> u64 {
        self.push(ChatRole::Assistant, text.into(), false)
    }

    /// Append the loading message shown while a request is in flight.
    pub fn push_placeholder(&mut self) -> u64 {
        self.push(ChatRole::Assistant, LOADING_MESSAGE.to_string(), true)
    }

    /// Replace a pending placeholder's text. Returns `false` if `id` is not pending.
    pub fn resolve(&mut self, id: u64, text: impl Into<String>) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id && m.pending) {
            Some(message) => {
                message.text = text.into();
                message.pending = false;
                true
            }
            None => false,
        }
    }

    pub fn fail(&mut self, id: u64) -> bool {
        self.resolve(id, FAILURE_MESSAGE)
    }

    pub fn has_pending(&self) -> bool {
        self.messages.iter().any(|m| m.pending)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
