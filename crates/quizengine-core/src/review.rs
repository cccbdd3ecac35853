//! Missed-question review: derivation and navigation.

use crate::model::{Question, ReviewEntry};
use crate::traits::QuestionOutcome;

/// Builds the review list for a scored quiz.
///
/// A position is included only when the student chose an option and that
/// option differs from the correct one. Unanswered positions are left out
/// because there is no choice to contrast with the correct answer. Output
/// keeps the original question order.
///
/// `outcomes` and `answers` are aligned with `questions`; any surplus on
/// either side is ignored.
pub fn derive_review(
    questions: &[Question],
    outcomes: &[QuestionOutcome],
    answers: &[Option<usize>],
) -> Vec<ReviewEntry> {
    questions
        .iter()
        .zip(outcomes)
        .zip(answers)
        .filter_map(|((question, outcome), answer)| {
            let chosen = (*answer)?;
            if chosen == outcome.correct_index {
                return None;
            }
            Some(ReviewEntry {
                question: question.clone(),
                correct_index: outcome.correct_index,
                user_answer: Some(chosen),
                explanation: outcome.explanation.clone(),
                suggested_next_steps: outcome.suggested_next_steps.clone(),
            })
        })
        .collect()
}

/// Convenience form of [`derive_review`] taking bare correct indices.
pub fn derive_review_from_indices(
    questions: &[Question],
    correct_indices: &[usize],
    answers: &[Option<usize>],
) -> Vec<ReviewEntry> {
    let outcomes: Vec<QuestionOutcome> = correct_indices
        .iter()
        .map(|&correct_index| QuestionOutcome {
            correct_index,
            explanation: None,
            suggested_next_steps: Vec::new(),
        })
        .collect();
    derive_review(questions, &outcomes, answers)
}

/// Cursor over a non-empty review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewNavigator {
    len: usize,
    cursor: usize,
}

impl ReviewNavigator {
    /// Returns `None` when there is nothing to review.
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self { len, cursor: 0 })
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of entries; never zero.
    pub fn total(&self) -> usize {
        self.len
    }

    /// Moves forward, stopping at the last entry. Returns the new position.
    pub fn next(&mut self) -> usize {
        self.cursor = (self.cursor + 1).min(self.len - 1);
        self.cursor
    }

    /// Moves back, stopping at the first entry. Returns the new position.
    pub fn previous(&mut self) -> usize {
        self.cursor = self.cursor.saturating_sub(1);
        self.cursor
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|position| Question {
                text: format!("Question {}", position + 1),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                position,
            })
            .collect()
    }

    #[test]
    fn only_wrong_answers_are_reviewed() {
        let entries =
            derive_review_from_indices(&questions(3), &[2, 1, 0], &[Some(2), Some(0), None]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].position(), 1);
        assert_eq!(entries[0].user_answer, Some(0));
        assert_eq!(entries[0].correct_index, 1);
    }

    #[test]
    fn unanswered_questions_are_never_reviewed() {
        let entries = derive_review_from_indices(&questions(3), &[0, 0, 0], &[None, None, None]);
        assert!(entries.is_empty());
    }

    #[test]
    fn order_follows_question_positions() {
        let entries = derive_review_from_indices(
            &questions(5),
            &[0, 0, 0, 0, 0],
            &[Some(3), Some(0), Some(1), None, Some(2)],
        );
        let positions: Vec<usize> = entries.iter().map(ReviewEntry::position).collect();
        assert_eq!(positions, vec![0, 2, 4]);
    }

    #[test]
    fn explanations_are_carried_through() {
        let outcomes = vec![QuestionOutcome {
            correct_index: 1,
            explanation: Some("Because b.".into()),
            suggested_next_steps: vec!["Practice more".into()],
        }];
        let entries = derive_review(&questions(1), &outcomes, &[Some(3)]);
        assert_eq!(entries[0].explanation.as_deref(), Some("Because b."));
        assert_eq!(entries[0].suggested_next_steps, vec!["Practice more"]);
        assert_eq!(entries[0].correct_option(), Some("b"));
        assert_eq!(entries[0].user_option(), Some("d"));
    }

    #[test]
    fn navigator_requires_entries() {
        assert!(ReviewNavigator::new(0).is_none());
    }

    #[test]
    fn navigator_clamps_at_both_ends() {
        let mut nav = ReviewNavigator::new(3).unwrap();
        assert!(nav.is_first());
        assert_eq!(nav.previous(), 0);
        assert_eq!(nav.next(), 1);
        assert_eq!(nav.next(), 2);
        assert_eq!(nav.next(), 2);
        assert!(nav.is_last());
        assert_eq!(nav.previous(), 1);
        assert_eq!(nav.total(), 3);
    }
}
