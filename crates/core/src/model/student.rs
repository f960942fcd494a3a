use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::grade::Grade;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StudentError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("mobile number must be exactly 10 digits")]
    InvalidMobile,

    #[error("date of birth must be YYYY-MM-DD: {raw}")]
    InvalidDob { raw: String },

    #[error("date of birth {dob} is in the future")]
    DobInFuture { dob: NaiveDate },
}

//
// ─── REGISTRATION FORM ─────────────────────────────────────────────────────────
//

/// Raw registration form input, as typed by the participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub mobile: String,
    pub dob: String,
    pub grade: Grade,
}

impl StudentDraft {
    /// Validate the form against `today`.
    ///
    /// # Errors
    ///
    /// Returns the first `StudentError` found, checking name, mobile, then
    /// date of birth.
    pub fn validate(self, today: NaiveDate) -> Result<StudentProfile, StudentError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StudentError::EmptyName);
        }

        let mobile = self.mobile.trim();
        if mobile.len() != 10 || !mobile.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StudentError::InvalidMobile);
        }

        let dob = NaiveDate::parse_from_str(self.dob.trim(), "%Y-%m-%d").map_err(|_| {
            StudentError::InvalidDob {
                raw: self.dob.clone(),
            }
        })?;
        if dob > today {
            return Err(StudentError::DobInFuture { dob });
        }

        Ok(StudentProfile {
            name: name.to_owned(),
            mobile: mobile.to_owned(),
            dob,
            grade: self.grade,
        })
    }
}

/// A registration form that passed client-side validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    name: String,
    mobile: String,
    dob: NaiveDate,
    grade: Grade,
}

impl StudentProfile {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    #[must_use]
    pub fn dob(&self) -> NaiveDate {
        self.dob
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn draft() -> StudentDraft {
        StudentDraft {
            name: "  Asha Verma ".into(),
            mobile: "9876543210".into(),
            dob: "2014-06-01".into(),
            grade: Grade::Class5To6,
        }
    }

    #[test]
    fn valid_form_is_trimmed() {
        let profile = draft().validate(today()).unwrap();
        assert_eq!(profile.name(), "Asha Verma");
        assert_eq!(profile.dob(), NaiveDate::from_ymd_opt(2014, 6, 1).unwrap());
        assert_eq!(profile.grade(), Grade::Class5To6);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut form = draft();
        form.name = "   ".into();
        assert_eq!(form.validate(today()).unwrap_err(), StudentError::EmptyName);
    }

    #[test]
    fn mobile_must_be_ten_digits() {
        for bad in ["987654321", "98765432101", "98765x3210", ""] {
            let mut form = draft();
            form.mobile = bad.into();
            assert_eq!(
                form.validate(today()).unwrap_err(),
                StudentError::InvalidMobile,
                "{bad:?}"
            );
        }
    }

    #[test]
    fn dob_must_parse_and_not_be_in_future() {
        let mut form = draft();
        form.dob = "01/06/2014".into();
        assert!(matches!(
            form.validate(today()).unwrap_err(),
            StudentError::InvalidDob { .. }
        ));

        let mut form = draft();
        form.dob = "2025-02-01".into();
        assert!(matches!(
            form.validate(today()).unwrap_err(),
            StudentError::DobInFuture { .. }
        ));
    }
}
