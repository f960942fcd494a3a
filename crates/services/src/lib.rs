#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod registration_service;
pub mod reporter;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::SessionConfig;
pub use error::{AppServicesError, LoadError, PersistenceError, ValidationError};
pub use registration_service::RegistrationService;
pub use reporter::{ReportStatus, ResultReporter};
pub use sessions::{
    AnswerValidator, QuestionSetLoader, QuizSessionController, SessionCommand, SessionControls,
    SessionHandle, SessionOutcome, SessionProgress,
};
