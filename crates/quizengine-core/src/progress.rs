//! Presentation-agnostic progress data for the in-quiz header.

/// Remaining time below which a timed quiz is flagged as running low.
pub const LOW_TIME_THRESHOLD_SECS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// Zero-based question cursor.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    /// `None` for untimed quizzes.
    pub remaining_seconds: Option<u32>,
    pub low_time: bool,
}

impl QuizProgress {
    pub fn new(
        position: usize,
        total: usize,
        answered: usize,
        remaining_seconds: Option<u32>,
    ) -> Self {
        Self {
            position,
            total,
            answered,
            remaining_seconds,
            low_time: remaining_seconds.is_some_and(|s| s < LOW_TIME_THRESHOLD_SECS),
        }
    }

    /// Fraction of the quiz reached by the cursor, in `0.0..=1.0`.
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.position + 1) as f64 / self.total as f64
    }

    pub fn is_last_question(&self) -> bool {
        self.position + 1 >= self.total
    }
}

/// Formats seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(61), "1:01");
        assert_eq!(format_clock(3_600), "60:00");
    }

    #[test]
    fn low_time_only_for_timed_quizzes() {
        assert!(!QuizProgress::new(0, 10, 0, None).low_time);
        assert!(!QuizProgress::new(0, 10, 0, Some(300)).low_time);
        assert!(QuizProgress::new(0, 10, 0, Some(299)).low_time);
    }

    #[test]
    fn completion_ratio_counts_current_question() {
        let progress = QuizProgress::new(4, 10, 3, None);
        assert!((progress.completion_ratio() - 0.5).abs() < f64::EPSILON);
        assert!(!progress.is_last_question());
        assert!(QuizProgress::new(9, 10, 3, None).is_last_question());
    }
}
