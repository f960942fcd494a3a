use quiz_core::Clock;
use quiz_core::model::{
    AnswerRecord, CompletionReason, Grade, OptionLetter, Question, QuestionId, SessionId,
    SessionPhase, SessionSnapshot, SessionSummary, Verdict,
};
use tracing::{debug, warn};

/// Identifies one dispatched validation call.
///
/// The `version` is the selection version at dispatch time; a verdict is
/// only applied if the record still carries that version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationTicket {
    pub index: usize,
    pub question_id: QuestionId,
    pub letter: OptionLetter,
    pub version: u32,
}

/// Result of `QuizSession::advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing changed: not in progress, or nothing selected.
    Ignored,
    /// Moved to the next question.
    Moved,
    /// Advanced past the last question.
    Completed(SessionSummary),
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Synchronous session state machine.
///
/// Every method is a no-op returning a "nothing happened" value when called
/// in a phase where it is not legal. The controller actor is the only owner.
pub struct QuizSession {
    id: SessionId,
    grade: Grade,
    phase: SessionPhase,
    questions: Vec<Question>,
    answers: Vec<AnswerRecord>,
    current: usize,
    time_remaining_secs: u32,
    score: u32,
    clock: Clock,
}

impl QuizSession {
    #[must_use]
    pub fn new(id: SessionId, grade: Grade, time_budget_secs: u32, clock: Clock) -> Self {
        Self {
            id,
            grade,
            phase: SessionPhase::Loading,
            questions: Vec::new(),
            answers: Vec::new(),
            current: 0,
            time_remaining_secs: time_budget_secs,
            score: 0,
            clock,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::InProgress => self.questions.get(self.current),
            _ => None,
        }
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining_secs
    }

    /// Install the loaded question set. An empty set ends the session in
    /// `NoQuestions`. Returns the resulting phase.
    pub fn begin(&mut self, questions: Vec<Question>) -> SessionPhase {
        if self.phase != SessionPhase::Loading {
            debug!(phase = ?self.phase, "question set ignored outside loading");
            return self.phase;
        }
        if questions.is_empty() {
            self.phase = SessionPhase::NoQuestions;
            return self.phase;
        }
        self.answers = vec![AnswerRecord::default(); questions.len()];
        self.questions = questions;
        self.current = 0;
        self.phase = SessionPhase::InProgress;
        self.phase
    }

    /// The question set could not be loaded.
    pub fn fail_load(&mut self) {
        if self.phase == SessionPhase::Loading {
            self.phase = SessionPhase::NoQuestions;
        }
    }

    /// Record `option` (0..=3) for the current question.
    ///
    /// Returns the ticket for the validation call to dispatch, or `None` if
    /// the selection was rejected (wrong phase, bad index, already validated).
    pub fn select(&mut self, option: usize) -> Option<ValidationTicket> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        let letter = OptionLetter::from_index(option).ok()?;
        let index = self.current;
        let question_id = self.questions.get(index)?.id();
        let version = self.answers.get_mut(index)?.select(letter)?;
        Some(ValidationTicket {
            index,
            question_id,
            letter,
            version,
        })
    }

    /// Apply a validator verdict. Returns `true` if the record changed.
    pub fn apply_verdict(&mut self, ticket: &ValidationTicket, correct: bool) -> bool {
        if self.phase != SessionPhase::InProgress {
            return false;
        }
        let Some(record) = self.answers.get_mut(ticket.index) else {
            return false;
        };
        if !record.apply_verdict(ticket.version, Verdict::from_correct(correct)) {
            return false;
        }
        if correct {
            self.score = self.score.saturating_add(1);
        }
        true
    }

    pub fn advance(&mut self) -> Step {
        if self.phase != SessionPhase::InProgress {
            return Step::Ignored;
        }
        let selected = self
            .answers
            .get(self.current)
            .is_some_and(|record| record.selected().is_some());
        if !selected {
            return Step::Ignored;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            return Step::Moved;
        }
        self.complete(CompletionReason::Finished)
            .map_or(Step::Ignored, Step::Completed)
    }

    /// Step back one question. Returns `true` if the index moved.
    pub fn retreat(&mut self) -> bool {
        if self.phase != SessionPhase::InProgress || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Record the remaining budget. Time never moves backwards.
    pub fn tick(&mut self, remaining_secs: u32) -> bool {
        if self.phase != SessionPhase::InProgress || remaining_secs >= self.time_remaining_secs {
            return false;
        }
        self.time_remaining_secs = remaining_secs;
        true
    }

    pub fn expire(&mut self) -> Option<SessionSummary> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        self.time_remaining_secs = 0;
        self.complete(CompletionReason::TimeExpired)
    }

    pub fn abort(&mut self) -> Option<SessionSummary> {
        self.complete(CompletionReason::Aborted)
    }

    /// The phase only changes once the summary exists, so a session can
    /// never be `Completed` without an outcome to deliver.
    fn complete(&mut self, reason: CompletionReason) -> Option<SessionSummary> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        let summary = match SessionSummary::from_answers(
            self.id,
            self.grade,
            &self.answers,
            reason,
            self.time_remaining_secs,
            self.clock.now(),
        ) {
            Ok(summary) => summary,
            Err(err) => {
                warn!(session = %self.id, error = %err, "summary could not be built");
                return None;
            }
        };
        self.phase = SessionPhase::Completed;
        Some(summary)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            grade: self.grade,
            phase: self.phase,
            current_index: self.current,
            total: self.questions.len(),
            current_question: self.current_question().cloned(),
            answers: self.answers.clone(),
            time_remaining_secs: self.time_remaining_secs,
            score: self.score,
        }
    }
}
