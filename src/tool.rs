/// Which pointer tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Connect,
}

/// Tool state, including the pending source while connecting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolState {
    #[default]
    Select,
    Connect { pending: Option<String> },
}

/// What a node click means under the connect tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectStep {
    /// The clicked node became the pending source.
    SourcePicked(String),
    /// Connect the pending source to the clicked node.
    Complete { source: String, target: String },
    /// The pending source was clicked again.
    Cancelled,
    /// The select tool is active.
    NotConnecting,
}

impl ToolState {
    pub fn tool(&self) -> Tool {
        match self {
            ToolState::Select => Tool::Select,
            ToolState::Connect { .. } => Tool::Connect,
        }
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, ToolState::Connect { .. })
    }

    pub fn pending(&self) -> Option<&str> {
        match self {
            ToolState::Connect { pending } => pending.as_deref(),
            ToolState::Select => None,
        }
    }

    /// Switch to the connect tool. A sole selected node becomes the pending
    /// source. Returns the pending source, if any.
    pub fn enter_connect(&mut self, sole_selected: Option<&str>) -> Option<String> {
        let pending = match self {
            ToolState::Connect { pending } => pending.clone(),
            ToolState::Select => sole_selected.map(str::to_string),
        };
        *self = ToolState::Connect { pending: pending.clone() };
        pending
    }

    /// Back to the select tool. Returns whether the tool changed.
    pub fn reset(&mut self) -> bool {
        let was_connecting = self.is_connecting();
        *self = ToolState::Select;
        was_connecting
    }

    /// The connect button: enters connect mode, or leaves it when already there.
    pub fn toggle(&mut self, sole_selected: Option<&str>) -> Tool {
        if self.is_connecting() {
            self.reset();
        } else {
            self.enter_connect(sole_selected);
        }
        self.tool()
    }

    pub fn click_node(&mut self, id: &str) -> ConnectStep {
        let ToolState::Connect { pending } = self else {
            return ConnectStep::NotConnecting;
        };
        match pending.take() {
            None => {
                *pending = Some(id.to_string());
                ConnectStep::SourcePicked(id.to_string())
            }
            Some(source) if source == id => ConnectStep::Cancelled,
            Some(source) => ConnectStep::Complete {
                source,
                target: id.to_string(),
            },
        }
    }

    /// Drop the pending source, staying in connect mode. Returns whether one was set.
    pub fn clear_pending(&mut self) -> bool {
        match self {
            ToolState::Connect { pending } => pending.take().is_some(),
            ToolState::Select => false,
        }
    }

    /// Drop the pending source if `exists` says its node is gone.
    pub fn prune(&mut self, exists: impl Fn(&str) -> bool) -> bool {
        let Some(id) = self.pending() else {
            return false;
        };
        if exists(id) {
            return false;
        }
        log::debug!("pending connect source {} no longer exists", id);
        self.clear_pending()
    }
}
