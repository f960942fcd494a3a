mod clock;
mod controller;
mod loader;
mod progress;
mod state;
mod validator;

// Public API of the session subsystem.
pub use clock::{ClockEvent, ClockHandle, SessionClock};
pub use controller::{
    QuizSessionController, SessionCommand, SessionControls, SessionHandle, SessionOutcome,
};
pub use loader::QuestionSetLoader;
pub use progress::SessionProgress;
pub use state::{QuizSession, Step, ValidationTicket};
pub use validator::AnswerValidator;
