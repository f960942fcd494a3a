use serde::{Deserialize, Serialize};

use crate::model::question::OptionLetter;

/// Remote verdict for a validated selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    #[must_use]
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

/// Per-question answer state.
///
/// `selected` is recorded optimistically before the validator answers;
/// `verdict` is only set once a validation call for the current selection
/// succeeded. Once a verdict exists the record is locked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    selected: Option<OptionLetter>,
    verdict: Option<Verdict>,
    #[serde(skip)]
    version: u32,
}

impl AnswerRecord {
    #[must_use]
    pub fn selected(&self) -> Option<OptionLetter> {
        self.selected
    }

    /// Selected slot as an index, `-1` when nothing was chosen.
    #[must_use]
    pub fn selected_index(&self) -> i32 {
        self.selected
            .map_or(-1, |letter| i32::try_from(letter.index()).unwrap_or(-1))
    }

    #[must_use]
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.verdict.is_some()
    }

    /// Only meaningful when `is_validated` is true.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.verdict.is_some_and(Verdict::is_correct)
    }

    /// Selection version; bumped on every accepted selection.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Record a new selection and return the version tag for its validation.
    ///
    /// Returns `None` when the record is already locked by a verdict.
    pub fn select(&mut self, letter: OptionLetter) -> Option<u32> {
        if self.is_validated() {
            return None;
        }
        self.selected = Some(letter);
        self.version = self.version.wrapping_add(1);
        Some(self.version)
    }

    /// Apply a verdict produced for selection `version`.
    ///
    /// Returns `false` (and leaves the record untouched) if the record is
    /// already locked or the selection moved on since dispatch.
    pub fn apply_verdict(&mut self, version: u32, verdict: Verdict) -> bool {
        if self.is_validated() || self.version != version || self.selected.is_none() {
            return false;
        }
        self.verdict = Some(verdict);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_reports_minus_one() {
        let record = AnswerRecord::default();
        assert_eq!(record.selected_index(), -1);
        assert!(!record.is_validated());
        assert!(!record.is_correct());
    }

    #[test]
    fn reselect_bumps_version_and_discards_stale_verdict() {
        let mut record = AnswerRecord::default();
        let first = record.select(OptionLetter::A).unwrap();
        let second = record.select(OptionLetter::C).unwrap();
        assert_ne!(first, second);

        assert!(!record.apply_verdict(first, Verdict::Correct));
        assert!(!record.is_validated());

        assert!(record.apply_verdict(second, Verdict::Incorrect));
        assert_eq!(record.selected_index(), 2);
        assert!(record.is_validated());
        assert!(!record.is_correct());
    }

    #[test]
    fn validated_record_is_locked() {
        let mut record = AnswerRecord::default();
        let v = record.select(OptionLetter::B).unwrap();
        assert!(record.apply_verdict(v, Verdict::Correct));

        assert_eq!(record.select(OptionLetter::D), None);
        assert_eq!(record.selected(), Some(OptionLetter::B));
        assert!(!record.apply_verdict(v, Verdict::Incorrect));
        assert!(record.is_correct());
    }
}
