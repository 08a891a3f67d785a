/// A key press as reported by the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    /// Key text, e.g. `"z"`, `"Delete"`, `"Escape"`.
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// Focus is in a text field; shortcuts must not fire.
    pub in_text_input: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), ..Default::default() }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    DeleteSelection,
    Undo,
    Redo,
    Copy,
    Paste,
    SelectTool,
    ConnectTool,
    Escape,
}

/// Map a key press to a canvas action.
///
/// Letter keys match case-insensitively since Shift changes the reported
/// character on most platforms.
pub fn map_key(input: &KeyInput) -> Option<ShortcutAction> {
    if input.in_text_input {
        return None;
    }
    let key = input.key.as_str();
    match key {
        "Delete" | "Backspace" => return Some(ShortcutAction::DeleteSelection),
        "Escape" => return Some(ShortcutAction::Escape),
        _ => {}
    }

    let lower = key.to_ascii_lowercase();
    if input.command() {
        match lower.as_str() {
            "z" if input.shift => Some(ShortcutAction::Redo),
            "z" => Some(ShortcutAction::Undo),
            "y" => Some(ShortcutAction::Redo),
            "c" => Some(ShortcutAction::Copy),
            "v" => Some(ShortcutAction::Paste),
            _ => None,
        }
    } else {
        match lower.as_str() {
            "v" => Some(ShortcutAction::SelectTool),
            "l" => Some(ShortcutAction::ConnectTool),
            _ => None,
        }
    }
}
