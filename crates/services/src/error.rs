//! Shared error types for the services crate.

use thiserror::Error;

use storage::HttpInitError;
use storage::repository::StorageError;

/// The question set could not be fetched. Ends the session in `NoQuestions`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("question set could not be fetched: {0}")]
    Transport(#[source] StorageError),
    #[error("question set payload is malformed: {0}")]
    Malformed(#[source] StorageError),
}

impl From<StorageError> for LoadError {
    fn from(err: StorageError) -> Self {
        if err.is_malformed() {
            LoadError::Malformed(err)
        } else {
            LoadError::Transport(err)
        }
    }
}

/// A validation call failed. Non-fatal: the selection stays recorded but unvalidated.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error(transparent)]
    Remote(#[from] StorageError),
}

/// Registration or result save failed. Logged by the caller, never retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    #[error("student registration failed: {0}")]
    Registration(#[source] StorageError),
    #[error("result save failed: {0}")]
    Result(#[source] StorageError),
}

/// Service wiring could not be assembled.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Http(#[from] HttpInitError),
}
