use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("option index {0} is out of range (expected 0-3)")]
    OptionIndex(usize),

    #[error("invalid option letter: {0:?}")]
    OptionLetter(String),
}

//
// ─── BILINGUAL TEXT ────────────────────────────────────────────────────────────
//

/// Text shown in two languages side by side (English first, Hindi second in
/// the question sets we serve).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    pub primary: String,
    pub secondary: String,
}

impl BilingualText {
    #[must_use]
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.primary.trim().is_empty() && self.secondary.trim().is_empty()
    }
}

//
// ─── OPTION LETTER ─────────────────────────────────────────────────────────────
//

/// One of the four answer slots. Slot order is fixed: A=0, B=1, C=2, D=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
    ];

    /// # Errors
    ///
    /// Returns `QuestionError::OptionIndex` for indexes outside 0-3.
    pub fn from_index(index: usize) -> Result<Self, QuestionError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(QuestionError::OptionIndex(index))
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            OptionLetter::A => 0,
            OptionLetter::B => 1,
            OptionLetter::C => 2,
            OptionLetter::D => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLetter {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(OptionLetter::A),
            "B" | "b" => Ok(OptionLetter::B),
            "C" | "c" => Ok(OptionLetter::C),
            "D" | "d" => Ok(OptionLetter::D),
            other => Err(QuestionError::OptionLetter(other.to_owned())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with exactly four options.
///
/// Immutable once loaded; the correct answer is never known client-side.
/// The prompt is shown as served, even when blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: BilingualText,
    options: [BilingualText; 4],
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, prompt: BilingualText, options: [BilingualText; 4]) -> Self {
        Self {
            id,
            prompt,
            options,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &BilingualText {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[BilingualText; 4] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, letter: OptionLetter) -> &BilingualText {
        &self.options[letter.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> [BilingualText; 4] {
        OptionLetter::ALL.map(|l| BilingualText::new(format!("opt {l}"), format!("vikalp {l}")))
    }

    #[test]
    fn letters_map_to_fixed_slots() {
        for (idx, letter) in OptionLetter::ALL.into_iter().enumerate() {
            assert_eq!(letter.index(), idx);
            assert_eq!(OptionLetter::from_index(idx).unwrap(), letter);
        }
        assert_eq!(
            OptionLetter::from_index(4).unwrap_err(),
            QuestionError::OptionIndex(4)
        );
    }

    #[test]
    fn letter_parse_accepts_lowercase() {
        assert_eq!("c".parse::<OptionLetter>().unwrap(), OptionLetter::C);
        assert!("E".parse::<OptionLetter>().is_err());
    }

    #[test]
    fn blank_prompt_is_kept_as_served() {
        let q = Question::new(QuestionId::new(3), BilingualText::new(" ", ""), options());
        assert!(q.prompt().is_blank());
        assert_eq!(q.id(), QuestionId::new(3));
    }

    #[test]
    fn option_lookup_by_letter() {
        let q = Question::new(QuestionId::new(1), BilingualText::new("Q", "P"), options());
        assert_eq!(q.option(OptionLetter::D).primary, "opt D");
    }
}
