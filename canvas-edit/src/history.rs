//! Undo metadata handed to the history collaborator.
//!
//! The engine records an entry for every committed session and never reads
//! history back; storage and undo/redo belong to the embedder.

use canvas_core::ElementId;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Description of a committed edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMetadata {
    /// Human-readable label, e.g. "Move 2 elements".
    pub description: String,
    /// Elements the edit was applied to, in ID order.
    pub affected_element_ids: Vec<ElementId>,
}

/// A committed transition.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// State before the commit (idle, pre-edit document).
    pub previous: AppState,
    /// State after the commit.
    pub next: AppState,
    /// What the edit did.
    pub metadata: HistoryMetadata,
}

/// Receives committed transitions.
pub trait HistoryRecorder {
    /// Record one committed edit.
    fn record(&mut self, entry: HistoryEntry);
}

/// In-memory recorder that keeps every entry.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistoryRecorder for HistoryLog {
    fn record(&mut self, entry: HistoryEntry) {
        tracing::debug!(description = %entry.metadata.description, "history entry recorded");
        self.entries.push(entry);
    }
}

/// "1 element" / "3 elements".
pub(crate) fn element_count_label(count: usize) -> String {
    if count == 1 {
        "1 element".to_string()
    } else {
        format!("{count} elements")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::Document;

    #[test]
    fn test_count_label() {
        assert_eq!(element_count_label(1), "1 element");
        assert_eq!(element_count_label(0), "0 elements");
        assert_eq!(element_count_label(12), "12 elements");
    }

    #[test]
    fn test_log_keeps_order() {
        let mut log = HistoryLog::new();
        assert!(log.is_empty());
        for description in ["first", "second"] {
            log.record(HistoryEntry {
                previous: AppState::new(Document::new()),
                next: AppState::new(Document::new()),
                metadata: HistoryMetadata {
                    description: description.to_string(),
                    affected_element_ids: Vec::new(),
                },
            });
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].metadata.description, "first");
        assert_eq!(log.last().map(|e| e.metadata.description.as_str()), Some("second"));
    }
}
