//! Named ordered sequences of arguments (spec §3, §4.7).

use std::collections::HashMap;

use crate::argument::Argument;

/// A single named list.
#[derive(Clone, Debug, Default)]
pub struct List {
    items: Vec<Argument>,
}

impl List {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.items.get(index)
    }

    pub fn contains(&self, value: &Argument) -> bool {
        self.items.contains(value)
    }

    pub fn push_back(&mut self, value: Argument, unique: bool) {
        if unique && self.contains(&value) {
            return;
        }
        self.items.push(value);
    }

    pub fn push_front(&mut self, value: Argument, unique: bool) {
        if unique && self.contains(&value) {
            return;
        }
        self.items.insert(0, value);
    }

    pub fn pop_back(&mut self) -> Option<Argument> {
        self.items.pop()
    }

    pub fn pop_front(&mut self) -> Option<Argument> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Removes the first occurrence equal to `value` (by lexeme, per spec
    /// §3's equality rule). Returns `true` if an item was removed.
    pub fn pop_value(&mut self, value: &Argument) -> bool {
        if let Some(pos) = self.items.iter().position(|item| item == value) {
            self.items.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.items.iter()
    }
}

/// The process-wide registry of named lists.
#[derive(Clone, Debug, Default)]
pub struct ListStore {
    lists: HashMap<String, List>,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str) {
        self.lists.entry(name.to_lowercase()).or_default();
    }

    pub fn destroy(&mut self, name: &str) {
        self.lists.remove(&name.to_lowercase());
    }

    pub fn get(&self, name: &str) -> Option<&List> {
        self.lists.get(&name.to_lowercase())
    }

    /// Mutable access, auto-vivifying the list if it does not exist yet
    /// (matches UO Steam's `pushlist`/`createlist` tolerance for an
    /// unreferenced name).
    pub fn get_or_create_mut(&mut self, name: &str) -> &mut List {
        self.lists.entry(name.to_lowercase()).or_default()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut List> {
        self.lists.get_mut(&name.to_lowercase())
    }

    pub fn len(&self, name: &str) -> usize {
        self.get(name).map_or(0, List::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_unique_never_duplicates() {
        let mut list = List::default();
        list.push_back(Argument::literal("1"), true);
        list.push_back(Argument::literal("1"), true);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn pop_on_empty_is_a_no_op() {
        let mut list = List::default();
        assert!(list.pop_front().is_none());
        assert!(list.pop_back().is_none());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn fifo_order_preserved() {
        let mut list = List::default();
        list.push_back(Argument::literal("1"), false);
        list.push_back(Argument::literal("2"), false);
        assert_eq!(list.pop_front().unwrap().lexeme, "1");
        assert_eq!(list.pop_front().unwrap().lexeme, "2");
    }

    #[test]
    fn length_never_negative_by_construction() {
        let store = ListStore::new();
        assert_eq!(store.len("nonexistent"), 0);
    }
}
