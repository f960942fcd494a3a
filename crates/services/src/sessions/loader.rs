use std::sync::Arc;

use quiz_core::model::{Grade, Question};
use storage::repository::QuestionRepository;
use tracing::{info, warn};

use crate::error::LoadError;

/// Fetches the ordered question set for a grade.
#[derive(Clone)]
pub struct QuestionSetLoader {
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionSetLoader {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// Load the question set for `grade`. An empty set is not an error here;
    /// the controller decides what an empty set means.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Transport` when the service cannot be reached and
    /// `LoadError::Malformed` when its payload cannot be decoded.
    pub async fn load(&self, grade: Grade) -> Result<Vec<Question>, LoadError> {
        match self.questions.fetch_questions(grade).await {
            Ok(questions) => {
                info!(%grade, count = questions.len(), "question set loaded");
                Ok(questions)
            }
            Err(err) => {
                let err = LoadError::from(err);
                warn!(%grade, error = %err, "question set load failed");
                Err(err)
            }
        }
    }
}
