//! Indexed string interning shared by the backend containers.

use std::collections::HashMap;

/// Insertion-ordered string table with stable indices.
#[derive(Debug, Default)]
pub(crate) struct Interner {
    entries: Vec<String>,
    index: HashMap<String, u32>,
}

impl Interner {
    /// Intern `value`, returning its index. Duplicates return the index of
    /// the first insertion.
    pub(crate) fn add(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.index.get(value) {
            return index;
        }
        let index = self.entries.len() as u32;
        self.entries.push(value.to_string());
        self.index.insert(value.to_string(), index);
        index
    }

    pub(crate) fn get(&self, value: &str) -> Option<u32> {
        self.index.get(value).copied()
    }

    pub(crate) fn as_slice(&self) -> &[String] {
        &self.entries
    }
}
