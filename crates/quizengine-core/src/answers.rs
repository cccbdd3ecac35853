//! Per-question answer slots for an in-progress quiz.

use serde::{Deserialize, Serialize};

/// One answer slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    #[default]
    Unanswered,
    Selected(usize),
}

impl Answer {
    pub fn selected(self) -> Option<usize> {
        match self {
            Answer::Unanswered => None,
            Answer::Selected(index) => Some(index),
        }
    }

    pub fn is_answered(self) -> bool {
        matches!(self, Answer::Selected(_))
    }
}

/// Fixed-length answer array with an O(1) answered count.
///
/// The length is set at creation and never changes; only existing slots are
/// overwritten. Option bounds are checked by the controller, which knows the
/// questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerTracker {
    slots: Vec<Answer>,
    answered: usize,
}

impl AnswerTracker {
    /// Creates `len` unanswered slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Answer::Unanswered; len],
            answered: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the slot at `position`, or `None` past the end.
    pub fn get(&self, position: usize) -> Option<Answer> {
        self.slots.get(position).copied()
    }

    /// Records `option` for `position`, replacing any prior selection.
    ///
    /// Returns the previous value, or `None` if `position` is out of range
    /// (in which case nothing changes).
    pub fn set(&mut self, position: usize, option: usize) -> Option<Answer> {
        let slot = self.slots.get_mut(position)?;
        let previous = std::mem::replace(slot, Answer::Selected(option));
        if !previous.is_answered() {
            self.answered += 1;
        }
        Some(previous)
    }

    /// Number of slots holding a selection.
    pub fn answered_count(&self) -> usize {
        self.answered
    }

    /// Immutable copy of the slots in submission form.
    pub fn snapshot(&self) -> Vec<Option<usize>> {
        self.slots.iter().map(|a| a.selected()).collect()
    }

    pub fn as_slice(&self) -> &[Answer] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unanswered() {
        let tracker = AnswerTracker::new(3);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.answered_count(), 0);
        assert_eq!(tracker.get(2), Some(Answer::Unanswered));
        assert_eq!(tracker.snapshot(), vec![None, None, None]);
    }

    #[test]
    fn reselecting_does_not_double_count() {
        let mut tracker = AnswerTracker::new(4);
        tracker.set(0, 2);
        tracker.set(0, 1);
        tracker.set(0, 1);
        tracker.set(3, 0);
        assert_eq!(tracker.answered_count(), 2);
        assert_eq!(tracker.get(0), Some(Answer::Selected(1)));
        assert_eq!(tracker.snapshot(), vec![Some(1), None, None, Some(0)]);
    }

    #[test]
    fn set_returns_previous_value() {
        let mut tracker = AnswerTracker::new(2);
        assert_eq!(tracker.set(1, 3), Some(Answer::Unanswered));
        assert_eq!(tracker.set(1, 0), Some(Answer::Selected(3)));
    }

    #[test]
    fn out_of_range_set_changes_nothing() {
        let mut tracker = AnswerTracker::new(2);
        assert_eq!(tracker.set(2, 0), None);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.answered_count(), 0);
        assert_eq!(tracker.get(2), None);
    }
}
