mod answer;
mod grade;
mod ids;
mod question;
mod session;
mod student;

pub use ids::{ParseIdError, QuestionId, SessionId, StudentId};

pub use answer::{AnswerRecord, Verdict};
pub use grade::{Grade, GradeError};
pub use question::{BilingualText, OptionLetter, Question, QuestionError};
pub use session::{
    CompletionReason, SessionPhase, SessionSnapshot, SessionSummary, SessionSummaryError,
};
pub use student::{StudentDraft, StudentError, StudentProfile};
