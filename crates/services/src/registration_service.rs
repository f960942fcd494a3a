use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{StudentDraft, StudentError, StudentId, StudentProfile};
use storage::repository::StudentRepository;
use tracing::{info, warn};

use crate::error::PersistenceError;

/// Validates registration forms and registers students with the remote service.
#[derive(Clone)]
pub struct RegistrationService {
    clock: Clock,
    students: Arc<dyn StudentRepository>,
}

impl RegistrationService {
    #[must_use]
    pub fn new(clock: Clock, students: Arc<dyn StudentRepository>) -> Self {
        Self { clock, students }
    }

    /// Check the form locally. Nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns `StudentError` for the first invalid field.
    pub fn validate(&self, draft: StudentDraft) -> Result<StudentProfile, StudentError> {
        draft.validate(self.clock.today())
    }

    /// Register a validated profile. Called once per attempt; no retry.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Registration` if the service call fails or
    /// is not acknowledged.
    pub async fn register(&self, profile: &StudentProfile) -> Result<StudentId, PersistenceError> {
        match self.students.register_student(profile).await {
            Ok(id) => {
                info!(student = %id, grade = %profile.grade(), "student registered");
                Ok(id)
            }
            Err(err) => {
                warn!(error = %err, "student registration failed");
                Err(PersistenceError::Registration(err))
            }
        }
    }
}
