use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown grade: {raw}")]
pub struct GradeError {
    pub raw: String,
}

/// Grade band a question set is written for.
///
/// The remote service keys question sets by the human label (`"Class 5-6"`),
/// so `as_str` is also the wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    Class1To2,
    Class3To4,
    Class5To6,
    Class7To8,
    Class9,
}

impl Grade {
    pub const ALL: [Grade; 5] = [
        Grade::Class1To2,
        Grade::Class3To4,
        Grade::Class5To6,
        Grade::Class7To8,
        Grade::Class9,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Class1To2 => "Class 1-2",
            Grade::Class3To4 => "Class 3-4",
            Grade::Class5To6 => "Class 5-6",
            Grade::Class7To8 => "Class 7-8",
            Grade::Class9 => "Class 9",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = GradeError;

    /// Accepts the exact label, case-insensitively and with loose spacing
    /// (`"class 5-6"`, `"Class5-6"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squashed: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        Grade::ALL
            .into_iter()
            .find(|grade| grade.as_str().replace(' ', "").to_ascii_lowercase() == squashed)
            .ok_or_else(|| GradeError { raw: s.to_owned() })
    }
}

impl TryFrom<String> for Grade {
    type Error = GradeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.as_str().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for grade in Grade::ALL {
            assert_eq!(grade.as_str().parse::<Grade>().unwrap(), grade);
        }
    }

    #[test]
    fn parse_is_lenient_about_case_and_spacing() {
        assert_eq!("class 5-6".parse::<Grade>().unwrap(), Grade::Class5To6);
        assert_eq!("Class9".parse::<Grade>().unwrap(), Grade::Class9);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "Class 10".parse::<Grade>().unwrap_err();
        assert_eq!(err.raw, "Class 10");
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Grade::Class7To8).unwrap();
        assert_eq!(json, "\"Class 7-8\"");
        let back: Grade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Grade::Class7To8);
    }
}
