use std::collections::VecDeque;

use crate::token::Token;

/// Entries kept before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 10;

/// One evaluated expression as echoed back by the relay. Immutable once
/// created.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub result: f64,
    pub expression_text: String,
    pub tokens: Vec<Token>,
}

/// Bounded log of the most recent evaluations seen by this session.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, evicting from the front until the log is back
    /// within capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Entries newest first, the order they are displayed in.
    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    /// Looks up an entry by its newest-first index, for recall.
    pub fn entry(&self, index: usize) -> Option<&HistoryEntry> {
        self.len()
            .checked_sub(index + 1)
            .and_then(|slot| self.entries.get(slot))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
