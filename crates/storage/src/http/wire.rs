use quiz_core::model::{Grade, OptionLetter, StudentProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ValidateRequest {
    pub id: u64,
    pub answer: &'static str,
}

impl ValidateRequest {
    pub(crate) fn new(id: u64, letter: OptionLetter) -> Self {
        Self {
            id,
            answer: letter.as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidateResponse {
    pub correct: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentRequest<'a> {
    pub name: &'a str,
    pub mobile: &'a str,
    pub dob: String,
    pub grade: Grade,
}

impl<'a> From<&'a StudentProfile> for StudentRequest<'a> {
    fn from(profile: &'a StudentProfile) -> Self {
        Self {
            name: profile.name(),
            mobile: profile.mobile(),
            dob: profile.dob().format("%Y-%m-%d").to_string(),
            grade: profile.grade(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentResponse {
    #[serde(default)]
    pub success: bool,
    pub student_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use quiz_core::model::StudentDraft;

    #[test]
    fn validate_request_uses_letter() {
        let body = serde_json::to_value(ValidateRequest::new(12, OptionLetter::C)).unwrap();
        assert_eq!(body, serde_json::json!({"id": 12, "answer": "C"}));
    }

    #[test]
    fn student_request_matches_service_shape() {
        let profile = StudentDraft {
            name: "Ravi".into(),
            mobile: "9123456780".into(),
            dob: "2012-03-04".into(),
            grade: Grade::Class7To8,
        }
        .validate(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        .unwrap();

        let body = serde_json::to_value(StudentRequest::from(&profile)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "name": "Ravi",
                "mobile": "9123456780",
                "dob": "2012-03-04",
                "grade": "Class 7-8"
            })
        );
    }

    #[test]
    fn student_response_tolerates_missing_success_flag() {
        let resp: StudentResponse = serde_json::from_str(r#"{"student_id": 77}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.student_id, Some(77));
    }
}
