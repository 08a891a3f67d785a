use slint::{Model, SharedString, VecModel};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionManager {
    selected: HashSet<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle selection of an item (node or edge) based on interaction modifiers
    pub fn handle_interaction(&mut self, id: &str, shift_held: bool) {
        if shift_held {
            if !self.selected.remove(id) {
                self.selected.insert(id.to_string());
            }
        } else {
            if self.selected.len() == 1 && self.selected.contains(id) {
                return;
            }
            self.selected.clear();
            self.selected.insert(id.to_string());
        }
    }

    /// Select exactly one item
    pub fn select_only(&mut self, id: &str) {
        self.selected.clear();
        self.selected.insert(id.to_string());
    }

    /// Add an item without touching the rest of the selection
    pub fn insert(&mut self, id: &str) -> bool {
        self.selected.insert(id.to_string())
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the current selection with a new set of IDs
    pub fn replace_selection<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.clear();
        self.selected.extend(ids.into_iter().map(Into::into));
    }

    /// Drop IDs for which `exists` returns false. Returns how many were dropped.
    pub fn retain(&mut self, exists: impl Fn(&str) -> bool) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| exists(id));
        before - self.selected.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn iter(&self) -> std::collections::hash_set::Iter<'_, String> {
        self.selected.iter()
    }

    /// The selected ID when exactly one item is selected
    pub fn sole(&self) -> Option<&str> {
        if self.selected.len() == 1 {
            self.selected.iter().next().map(String::as_str)
        } else {
            None
        }
    }

    /// Selected IDs in a stable order
    pub fn sorted(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn as_set(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Sync the internal selection set to a Slint VecModel
    pub fn sync_to_model(&self, model: &VecModel<SharedString>) {
        let ids: Vec<SharedString> = self.sorted().into_iter().map(SharedString::from).collect();
        model.set_vec(ids);
    }

    /// Sync the internal selection set from any Slint Model (e.g. after box selection)
    pub fn sync_from_model(&mut self, model: &dyn Model<Data = SharedString>) {
        self.selected.clear();
        for i in 0..model.row_count() {
            if let Some(id) = model.row_data(i) {
                self.selected.insert(id.to_string());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
