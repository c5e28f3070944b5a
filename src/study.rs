//! Study material records: flashcards, quiz questions, and quiz results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of answer options on every quiz question.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// One question/answer study card derived from a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    /// Unique card ID.
    pub id: Uuid,
    /// Document this card was derived from.
    pub file_id: String,
    /// Principal that owns this card.
    pub owner: String,
    /// Question side.
    pub front: String,
    /// Answer side.
    pub back: String,
    /// When the card was generated.
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    /// Create a new flashcard.
    pub fn new(file_id: String, owner: String, front: String, back: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_id,
            owner,
            front,
            back,
            created_at: Utc::now(),
        }
    }
}

/// One multiple-choice question derived from a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Unique question ID.
    pub id: Uuid,
    /// Document this question was derived from.
    pub file_id: String,
    /// Principal that owns this question.
    pub owner: String,
    /// Question text.
    pub question: String,
    /// Exactly four answer options.
    pub options: Vec<String>,
    /// Index (0-3) of the correct option.
    pub correct_answer: u8,
    /// Explanation shown after answering.
    pub explanation: String,
    /// When the question was generated.
    pub created_at: DateTime<Utc>,
}

impl QuizQuestion {
    /// Create a new quiz question.
    pub fn new(
        file_id: String,
        owner: String,
        question: String,
        options: Vec<String>,
        correct_answer: u8,
        explanation: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_id,
            owner,
            question,
            options,
            correct_answer,
            explanation,
            created_at: Utc::now(),
        }
    }
}

/// One completed quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    /// Unique result ID.
    pub id: Uuid,
    /// Document the quiz belonged to.
    pub file_id: String,
    /// Principal that took the quiz.
    pub owner: String,
    /// Number of correct answers.
    pub score: u32,
    /// Total number of questions.
    pub total_questions: u32,
    /// Final percentage (0-100).
    pub percentage: f64,
    /// When the attempt finished.
    pub taken_at: DateTime<Utc>,
}

impl QuizResult {
    /// Record a completed attempt. Percentage is derived from the score.
    pub fn new(file_id: String, owner: String, score: u32, total_questions: u32) -> Self {
        let percentage = if total_questions == 0 {
            0.0
        } else {
            (score as f64 / total_questions as f64) * 100.0
        };

        Self {
            id: Uuid::new_v4(),
            file_id,
            owner,
            score,
            total_questions,
            percentage,
            taken_at: Utc::now(),
        }
    }
}

/// Aggregated quiz performance for one principal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuizStats {
    /// Number of completed attempts.
    pub attempts: u32,
    /// Average percentage across attempts.
    pub average_percentage: f64,
    /// Best percentage across attempts.
    pub best_percentage: f64,
}

impl QuizStats {
    /// Aggregate stats from a set of results.
    pub fn from_results(results: &[QuizResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let sum: f64 = results.iter().map(|r| r.percentage).sum();
        let best = results
            .iter()
            .map(|r| r.percentage)
            .fold(0.0f64, |a, b| a.max(b));

        Self {
            attempts: results.len() as u32,
            average_percentage: sum / results.len() as f64,
            best_percentage: best,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_result_percentage() {
        let result = QuizResult::new("doc".to_string(), "user".to_string(), 4, 5);
        assert!((result.percentage - 80.0).abs() < f64::EPSILON);

        let empty = QuizResult::new("doc".to_string(), "user".to_string(), 0, 0);
        assert_eq!(empty.percentage, 0.0);
    }

    #[test]
    fn test_stats_aggregation() {
        let results = vec![
            QuizResult::new("doc".to_string(), "user".to_string(), 3, 5),
            QuizResult::new("doc".to_string(), "user".to_string(), 5, 5),
        ];

        let stats = QuizStats::from_results(&results);
        assert_eq!(stats.attempts, 2);
        assert!((stats.average_percentage - 80.0).abs() < 0.001);
        assert!((stats.best_percentage - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_stats_empty() {
        let stats = QuizStats::from_results(&[]);
        assert_eq!(stats.attempts, 0);
        assert_eq!(stats.average_percentage, 0.0);
    }
}
