use thiserror::Error;

use crate::model::{GradeError, QuestionError, SessionSummaryError, StudentError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Student(#[from] StudentError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
