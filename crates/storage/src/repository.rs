use async_trait::async_trait;
use quiz_core::model::{
    BilingualText, Grade, OptionLetter, Question, QuestionId, StudentId, StudentProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by remote gateway adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("service responded with status {0}")]
    Status(u16),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("service rejected the request: {0}")]
    Rejected(String),
}

impl StorageError {
    /// True when the payload arrived but could not be understood.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, StorageError::Serialization(_))
    }
}

//
// ─── WIRE RECORDS ──────────────────────────────────────────────────────────────
//

/// Bilingual text as the question service spells it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualRecord {
    pub en: String,
    pub hi: String,
}

impl From<BilingualRecord> for BilingualText {
    fn from(record: BilingualRecord) -> Self {
        BilingualText::new(record.en, record.hi)
    }
}

impl From<&BilingualText> for BilingualRecord {
    fn from(text: &BilingualText) -> Self {
        Self {
            en: text.primary.clone(),
            hi: text.secondary.clone(),
        }
    }
}

/// The service's letter-keyed option map, pinned to four named fields.
///
/// A payload missing any of the letters fails to deserialize instead of
/// producing a question with a hole in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsRecord {
    #[serde(rename = "A")]
    pub a: BilingualRecord,
    #[serde(rename = "B")]
    pub b: BilingualRecord,
    #[serde(rename = "C")]
    pub c: BilingualRecord,
    #[serde(rename = "D")]
    pub d: BilingualRecord,
}

impl OptionsRecord {
    /// Options in slot order A, B, C, D.
    #[must_use]
    pub fn into_slots(self) -> [BilingualText; 4] {
        [self.a.into(), self.b.into(), self.c.into(), self.d.into()]
    }
}

/// Persisted shape for a question as served by `GetQuestions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: u64,
    pub question: BilingualRecord,
    pub options: OptionsRecord,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        let [a, b, c, d] = question.options();
        Self {
            id: question.id().value(),
            question: question.prompt().into(),
            options: OptionsRecord {
                a: a.into(),
                b: b.into(),
                c: c.into(),
                d: d.into(),
            },
        }
    }

    #[must_use]
    pub fn into_question(self) -> Question {
        Question::new(
            QuestionId::new(self.id),
            self.question.into(),
            self.options.into_slots(),
        )
    }
}

/// Body of a `SaveResult` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub student_id: StudentId,
    pub score: u32,
    pub total: u32,
    pub grade: Grade,
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Source of ordered question sets.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Fetch the ordered question set for a grade. An empty list is valid.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on transport failure or malformed payload.
    async fn fetch_questions(&self, grade: Grade) -> Result<Vec<Question>, StorageError>;
}

/// Remote authority for answer correctness.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Ask whether `letter` is the correct option for `question_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the service cannot be reached or answers
    /// with something unreadable.
    async fn validate_answer(
        &self,
        question_id: QuestionId,
        letter: OptionLetter,
    ) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Register a validated student profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the registration call fails.
    async fn register_student(&self, profile: &StudentProfile) -> Result<StudentId, StorageError>;
}

#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Persist a final score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the save call fails.
    async fn save_result(&self, result: &ResultRecord) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    questions: HashMap<Grade, Vec<Question>>,
    answer_key: HashMap<QuestionId, OptionLetter>,
    failing_grades: HashSet<Grade>,
    failing_validations: HashSet<QuestionId>,
    validation_delays: HashMap<QuestionId, Duration>,
    validation_calls: Vec<(QuestionId, OptionLetter)>,
    students: Vec<StudentProfile>,
    fail_registration: bool,
    results: Vec<ResultRecord>,
    fail_results: bool,
}

/// Scriptable in-memory backend for tests, demos and offline runs.
///
/// Holds the answer key server-side, exactly as the real service does; the
/// session code only ever sees `validate_answer` verdicts.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut InMemoryState) -> T) -> Result<T, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(f(&mut guard))
    }

    fn script(&self, f: impl FnOnce(&mut InMemoryState)) {
        if let Ok(mut guard) = self.state.lock() {
            f(&mut guard);
        }
    }

    /// Serve `questions` for `grade`, with `key` as the correct letter per question.
    #[must_use]
    pub fn with_question_set(self, grade: Grade, questions: Vec<(Question, OptionLetter)>) -> Self {
        self.script(|state| {
            let mut ordered = Vec::with_capacity(questions.len());
            for (question, letter) in questions {
                state.answer_key.insert(question.id(), letter);
                ordered.push(question);
            }
            state.questions.insert(grade, ordered);
        });
        self
    }

    #[must_use]
    pub fn failing_questions(self, grade: Grade) -> Self {
        self.script(|state| {
            state.failing_grades.insert(grade);
        });
        self
    }

    #[must_use]
    pub fn failing_validation(self, question_id: QuestionId) -> Self {
        self.script(|state| {
            state.failing_validations.insert(question_id);
        });
        self
    }

    #[must_use]
    pub fn delayed_validation(self, question_id: QuestionId, delay: Duration) -> Self {
        self.script(|state| {
            state.validation_delays.insert(question_id, delay);
        });
        self
    }

    #[must_use]
    pub fn failing_registration(self) -> Self {
        self.script(|state| state.fail_registration = true);
        self
    }

    #[must_use]
    pub fn failing_results(self) -> Self {
        self.script(|state| state.fail_results = true);
        self
    }

    #[must_use]
    pub fn validation_calls(&self) -> Vec<(QuestionId, OptionLetter)> {
        self.with_state(|state| state.validation_calls.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn registered_students(&self) -> Vec<StudentProfile> {
        self.with_state(|state| state.students.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn saved_results(&self) -> Vec<ResultRecord> {
        self.with_state(|state| state.results.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn fetch_questions(&self, grade: Grade) -> Result<Vec<Question>, StorageError> {
        self.with_state(|state| {
            if state.failing_grades.contains(&grade) {
                return Err(StorageError::Connection(format!(
                    "question service unavailable for {grade}"
                )));
            }
            Ok(state.questions.get(&grade).cloned().unwrap_or_default())
        })?
    }
}

#[async_trait]
impl AnswerRepository for InMemoryRepository {
    async fn validate_answer(
        &self,
        question_id: QuestionId,
        letter: OptionLetter,
    ) -> Result<bool, StorageError> {
        let delay = self.with_state(|state| {
            state.validation_calls.push((question_id, letter));
            state.validation_delays.get(&question_id).copied()
        })?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.with_state(|state| {
            if state.failing_validations.contains(&question_id) {
                return Err(StorageError::Connection(format!(
                    "validator unavailable for question {question_id}"
                )));
            }
            state
                .answer_key
                .get(&question_id)
                .map(|correct| *correct == letter)
                .ok_or_else(|| StorageError::Rejected(format!("unknown question {question_id}")))
        })?
    }
}

#[async_trait]
impl StudentRepository for InMemoryRepository {
    async fn register_student(&self, profile: &StudentProfile) -> Result<StudentId, StorageError> {
        self.with_state(|state| {
            if state.fail_registration {
                return Err(StorageError::Status(503));
            }
            state.students.push(profile.clone());
            let id = u64::try_from(state.students.len())
                .map_err(|_| StorageError::Serialization("student id overflow".into()))?;
            Ok(StudentId::new(id))
        })?
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn save_result(&self, result: &ResultRecord) -> Result<(), StorageError> {
        self.with_state(|state| {
            if state.fail_results {
                return Err(StorageError::Status(503));
            }
            state.results.push(result.clone());
            Ok(())
        })?
    }
}

/// Aggregates the remote repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(repo: InMemoryRepository) -> Self {
        Self {
            questions: Arc::new(repo.clone()),
            answers: Arc::new(repo.clone()),
            students: Arc::new(repo.clone()),
            results: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            BilingualText::new(format!("Q{id}"), format!("P{id}")),
            OptionLetter::ALL.map(|l| BilingualText::new(l.as_str(), l.as_str())),
        )
    }

    #[test]
    fn options_missing_a_letter_are_malformed() {
        let json = r#"{
            "id": 4,
            "question": {"en": "Capital of India?", "hi": "भारत की राजधानी?"},
            "options": {
                "A": {"en": "Delhi", "hi": "दिल्ली"},
                "B": {"en": "Mumbai", "hi": "मुंबई"},
                "C": {"en": "Pune", "hi": "पुणे"}
            }
        }"#;
        assert!(serde_json::from_str::<QuestionRecord>(json).is_err());
    }

    #[test]
    fn options_map_to_fixed_slots_regardless_of_key_order() {
        let json = r#"{
            "id": 9,
            "question": {"en": "2 + 2?", "hi": "२ + २?"},
            "options": {
                "D": {"en": "5", "hi": "५"},
                "B": {"en": "4", "hi": "४"},
                "A": {"en": "3", "hi": "३"},
                "C": {"en": "22", "hi": "२२"}
            }
        }"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        let q = record.into_question();
        assert_eq!(q.id(), QuestionId::new(9));
        assert_eq!(q.options()[0].primary, "3");
        assert_eq!(q.options()[1].primary, "4");
        assert_eq!(q.options()[3].secondary, "५");
    }

    #[test]
    fn blank_prompt_still_decodes() {
        let json = r#"{
            "id": 2,
            "question": {"en": "", "hi": " "},
            "options": {
                "A": {"en": "1", "hi": "१"},
                "B": {"en": "2", "hi": "२"},
                "C": {"en": "3", "hi": "३"},
                "D": {"en": "4", "hi": "४"}
            }
        }"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        let q = record.into_question();
        assert!(q.prompt().is_blank());
        assert_eq!(q.options()[2].primary, "3");
    }

    #[test]
    fn record_round_trips_through_domain() {
        let q = question(5);
        let back = QuestionRecord::from_question(&q).into_question();
        assert_eq!(back, q);
    }

    #[tokio::test]
    async fn in_memory_validates_against_server_side_key() {
        let repo = InMemoryRepository::new()
            .with_question_set(Grade::Class9, vec![(question(1), OptionLetter::B)]);

        assert!(repo
            .validate_answer(QuestionId::new(1), OptionLetter::B)
            .await
            .unwrap());
        assert!(!repo
            .validate_answer(QuestionId::new(1), OptionLetter::A)
            .await
            .unwrap());
        assert_eq!(repo.validation_calls().len(), 2);
    }

    #[tokio::test]
    async fn in_memory_returns_empty_set_for_unknown_grade() {
        let repo = InMemoryRepository::new();
        let questions = repo.fetch_questions(Grade::Class1To2).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_errors() {
        let repo = InMemoryRepository::new()
            .with_question_set(Grade::Class3To4, vec![(question(2), OptionLetter::A)])
            .failing_questions(Grade::Class3To4)
            .failing_validation(QuestionId::new(2))
            .failing_results();

        assert!(repo.fetch_questions(Grade::Class3To4).await.is_err());
        assert!(repo
            .validate_answer(QuestionId::new(2), OptionLetter::A)
            .await
            .is_err());
        let record = ResultRecord {
            student_id: StudentId::new(1),
            score: 1,
            total: 1,
            grade: Grade::Class3To4,
        };
        assert!(repo.save_result(&record).await.is_err());
        assert!(repo.saved_results().is_empty());
    }
}
