use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answer::AnswerRecord;
use crate::model::grade::Grade;
use crate::model::ids::SessionId;
use crate::model::question::{OptionLetter, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("a summary needs at least one question")]
    NoQuestions,

    #[error("too many questions for a single session: {len}")]
    TooManyQuestions { len: usize },
}

/// Coarse lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Loading,
    InProgress,
    /// Terminal: finished with a score.
    Completed,
    /// Terminal: the question set was empty or could not be loaded.
    NoQuestions,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::NoQuestions)
    }
}

/// What pushed the session into `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionReason {
    /// The participant advanced past the last question.
    Finished,
    /// The countdown reached zero.
    TimeExpired,
    /// The host ended the attempt early.
    Aborted,
}

/// Renderable view of a session, emitted after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub grade: Grade,
    pub phase: SessionPhase,
    pub current_index: usize,
    pub total: usize,
    pub current_question: Option<Question>,
    pub answers: Vec<AnswerRecord>,
    pub time_remaining_secs: u32,
    pub score: u32,
}

impl SessionSnapshot {
    #[must_use]
    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        self.answers.get(self.current_index)
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.total > 0 && self.current_index + 1 == self.total
    }
}

/// Final result of a completed session. Produced exactly once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    session_id: SessionId,
    grade: Grade,
    answers: Vec<Option<OptionLetter>>,
    score: u32,
    total: u32,
    reason: CompletionReason,
    time_remaining_secs: u32,
    completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Build a summary from the per-question answer records.
    ///
    /// The score is derived here (validated and correct records only), so a
    /// summary can never disagree with the answers it carries.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::NoQuestions` for an empty answer list and
    /// `SessionSummaryError::TooManyQuestions` if the count cannot fit in `u32`.
    pub fn from_answers(
        session_id: SessionId,
        grade: Grade,
        answers: &[AnswerRecord],
        reason: CompletionReason,
        time_remaining_secs: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        if answers.is_empty() {
            return Err(SessionSummaryError::NoQuestions);
        }
        let total = u32::try_from(answers.len())
            .map_err(|_| SessionSummaryError::TooManyQuestions { len: answers.len() })?;
        let score = answers
            .iter()
            .filter(|record| record.is_validated() && record.is_correct())
            .fold(0_u32, |acc, _| acc.saturating_add(1));

        Ok(Self {
            session_id,
            grade,
            answers: answers.iter().map(AnswerRecord::selected).collect(),
            score,
            total,
            reason,
            time_remaining_secs,
            completed_at,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<OptionLetter>] {
        &self.answers
    }

    /// Answers as slot indexes, `-1` for unanswered questions.
    #[must_use]
    pub fn answer_indexes(&self) -> Vec<i32> {
        self.answers
            .iter()
            .map(|answer| answer.map_or(-1, |letter| letter.index() as i32))
            .collect()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn reason(&self) -> CompletionReason {
        self.reason
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining_secs
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::answer::Verdict;
    use crate::time::fixed_now;

    fn answered(letter: OptionLetter, verdict: Option<Verdict>) -> AnswerRecord {
        let mut record = AnswerRecord::default();
        let version = record.select(letter).unwrap();
        if let Some(verdict) = verdict {
            record.apply_verdict(version, verdict);
        }
        record
    }

    #[test]
    fn score_counts_only_validated_correct_answers() {
        let answers = vec![
            answered(OptionLetter::A, Some(Verdict::Correct)),
            answered(OptionLetter::B, Some(Verdict::Incorrect)),
            answered(OptionLetter::C, None),
            AnswerRecord::default(),
        ];

        let summary = SessionSummary::from_answers(
            SessionId::new_v4(),
            Grade::Class3To4,
            &answers,
            CompletionReason::Finished,
            42,
            fixed_now(),
        )
        .unwrap();

        assert_eq!(summary.score(), 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.answer_indexes(), vec![0, 1, 2, -1]);
        assert_eq!(summary.reason(), CompletionReason::Finished);
    }

    #[test]
    fn empty_answer_list_is_rejected() {
        let err = SessionSummary::from_answers(
            SessionId::new_v4(),
            Grade::Class9,
            &[],
            CompletionReason::Aborted,
            0,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::NoQuestions);
    }

    #[test]
    fn snapshot_with_current_question_serializes() {
        let question = Question::new(
            crate::model::ids::QuestionId::new(5),
            crate::model::question::BilingualText::new("Largest ocean?", "सबसे बड़ा महासागर?"),
            OptionLetter::ALL.map(|l| crate::model::question::BilingualText::new(l.as_str(), "")),
        );
        let snapshot = SessionSnapshot {
            session_id: SessionId::new_v4(),
            grade: Grade::Class7To8,
            phase: SessionPhase::InProgress,
            current_index: 0,
            total: 1,
            current_question: Some(question),
            answers: vec![AnswerRecord::default()],
            time_remaining_secs: 600,
            score: 0,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["grade"], "Class 7-8");
        assert_eq!(json["current_question"]["id"], 5);
        let back: SessionSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
        assert!(back.is_last_question());
    }

    #[test]
    fn terminal_phases() {
        assert!(SessionPhase::Completed.is_terminal());
        assert!(SessionPhase::NoQuestions.is_terminal());
        assert!(!SessionPhase::Loading.is_terminal());
        assert!(!SessionPhase::InProgress.is_terminal());
    }
}
