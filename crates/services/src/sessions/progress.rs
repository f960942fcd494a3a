use quiz_core::model::SessionSnapshot;

/// Aggregated view of session progress, useful for hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub validated: usize,
    pub correct: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Questions without any selection yet.
    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}

impl From<&SessionSnapshot> for SessionProgress {
    fn from(snapshot: &SessionSnapshot) -> Self {
        let mut progress = Self {
            total: snapshot.total,
            is_complete: snapshot.phase.is_terminal(),
            ..Self::default()
        };
        for record in &snapshot.answers {
            if record.selected().is_some() {
                progress.answered += 1;
            }
            if record.is_validated() {
                progress.validated += 1;
                if record.is_correct() {
                    progress.correct += 1;
                }
            }
        }
        progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::state::QuizSession;
    use quiz_core::model::{BilingualText, Grade, OptionLetter, Question, QuestionId, SessionId};
    use quiz_core::time::fixed_clock;

    #[test]
    fn counts_selections_and_verdicts() {
        let mut session = QuizSession::new(SessionId::new_v4(), Grade::Class1To2, 600, fixed_clock());
        session.begin(
            (1..=3)
                .map(|id| {
                    Question::new(
                        QuestionId::new(id),
                        BilingualText::new("q", "q"),
                        OptionLetter::ALL.map(|l| BilingualText::new(l.as_str(), "")),
                    )
                })
                .collect(),
        );
        let ticket = session.select(0).unwrap();
        session.apply_verdict(&ticket, true);
        session.advance();
        session.select(1).unwrap();

        let progress = SessionProgress::from(&session.snapshot());
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 2);
        assert_eq!(progress.validated, 1);
        assert_eq!(progress.correct, 1);
        assert_eq!(progress.unanswered(), 1);
        assert!(!progress.is_complete);

        session.abort().unwrap();
        assert!(SessionProgress::from(&session.snapshot()).is_complete);
    }
}
