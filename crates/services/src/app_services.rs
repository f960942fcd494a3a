use std::sync::Arc;

use storage::HttpConfig;
use storage::repository::Storage;

use crate::Clock;
use crate::config::SessionConfig;
use crate::error::AppServicesError;
use crate::registration_service::RegistrationService;
use crate::reporter::ResultReporter;
use crate::sessions::{AnswerValidator, QuestionSetLoader, QuizSessionController};

/// Assembles host-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    registration: Arc<RegistrationService>,
    sessions: Arc<QuizSessionController>,
    reporter: Arc<ResultReporter>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: Storage, config: SessionConfig, clock: Clock) -> Self {
        let loader = QuestionSetLoader::new(storage.questions);
        let validator = AnswerValidator::new(storage.answers);
        Self {
            registration: Arc::new(RegistrationService::new(clock, storage.students)),
            sessions: Arc::new(QuizSessionController::new(loader, validator, config, clock)),
            reporter: Arc::new(ResultReporter::new(storage.results)),
        }
    }

    /// Build services backed by the remote quiz service.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client cannot be built.
    pub fn http(
        http: &HttpConfig,
        config: SessionConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::http(http)?;
        Ok(Self::new(storage, config, clock))
    }

    #[must_use]
    pub fn registration(&self) -> Arc<RegistrationService> {
        Arc::clone(&self.registration)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<QuizSessionController> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn reporter(&self) -> Arc<ResultReporter> {
        Arc::clone(&self.reporter)
    }
}
