//! History summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open range of message-log indices, `start..end`.
///
/// Displayed 1-based and inclusive, the way a reader counts messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRange {
    pub start: usize,
    pub end: usize,
}

impl MessageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    pub fn overlaps(&self, other: &MessageRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for MessageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "messages {}-{}", self.start + 1, self.end)
    }
}

/// Compacted text standing in for a range of older messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub range: MessageRange,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Summary {
    pub fn new(range: MessageRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_display_is_one_based() {
        assert_eq!(MessageRange::new(0, 10).to_string(), "messages 1-10");
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let first = MessageRange::new(0, 10);
        let second = MessageRange::new(10, 20);
        assert!(!first.overlaps(&second));
        assert!(first.overlaps(&MessageRange::new(9, 12)));
        assert!(first.contains(9));
        assert!(!first.contains(10));
        assert_eq!(second.len(), 10);
    }
}
