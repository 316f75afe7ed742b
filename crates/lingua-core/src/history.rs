//! Bounded translation history, newest first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of entries kept before the oldest is dropped.
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub src: String,
    pub dst: String,
}

#[derive(Debug, Clone)]
pub struct TranslationHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl TranslationHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a translation at the front, evicting past capacity.
    pub fn push(&mut self, src: impl Into<String>, dst: impl Into<String>) {
        self.entries.push_front(HistoryEntry {
            src: src.into(),
            dst: dst.into(),
        });
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for TranslationHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first() {
        let mut history = TranslationHistory::new();
        history.push("Hello", "Hola");
        history.push("Goodbye", "Adiós");

        let srcs: Vec<_> = history.entries().map(|e| e.src.as_str()).collect();
        assert_eq!(srcs, vec!["Goodbye", "Hello"]);
        assert_eq!(history.latest().unwrap().dst, "Adiós");
    }

    #[test]
    fn evicts_beyond_ten() {
        let mut history = TranslationHistory::new();
        for i in 0..15 {
            history.push(format!("src-{i}"), format!("dst-{i}"));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.latest().unwrap().src, "src-14");
        assert_eq!(history.entries().last().unwrap().src, "src-5");
    }

    #[test]
    fn clear_empties() {
        let mut history = TranslationHistory::new();
        history.push("a", "b");
        history.clear();
        assert!(history.is_empty());
    }
}
