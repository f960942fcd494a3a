use std::sync::Arc;

use quiz_core::model::{OptionLetter, QuestionId};
use storage::repository::AnswerRepository;

use crate::error::ValidationError;

/// Asks the remote service whether a selection is correct.
#[derive(Clone)]
pub struct AnswerValidator {
    answers: Arc<dyn AnswerRepository>,
}

impl AnswerValidator {
    #[must_use]
    pub fn new(answers: Arc<dyn AnswerRepository>) -> Self {
        Self { answers }
    }

    /// # Errors
    ///
    /// Returns `ValidationError::Remote` if the service call fails.
    pub async fn validate(
        &self,
        question_id: QuestionId,
        letter: OptionLetter,
    ) -> Result<bool, ValidationError> {
        Ok(self.answers.validate_answer(question_id, letter).await?)
    }
}
