use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{Grade, OptionLetter, Question, QuestionId, StudentId, StudentProfile};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use crate::repository::{
    AnswerRepository, QuestionRecord, QuestionRepository, ResultRecord, ResultRepository, Storage,
    StorageError, StudentRepository,
};

mod wire;

use wire::{StudentRequest, StudentResponse, ValidateRequest, ValidateResponse};

pub const DEFAULT_BASE_URL: &str = "https://fvacentre.param.club";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const API_PREFIX: &str = "wp-json/kbc/v1/";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpInitError {
    #[error("invalid base url {raw}: {source}")]
    BaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the quiz service.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl HttpConfig {
    /// Read `QUIZ_API_BASE_URL` and `QUIZ_HTTP_TIMEOUT_SECS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("QUIZ_API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = env::var("QUIZ_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);
        Self { base_url, timeout }
    }
}

/// JSON-over-HTTP client for the quiz service.
#[derive(Clone, Debug)]
pub struct HttpRepository {
    client: Client,
    api: Url,
}

impl HttpRepository {
    /// Build a client rooted at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns `HttpInitError` if the base URL does not parse or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpInitError> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let api = Url::parse(&base)
            .and_then(|base| base.join(API_PREFIX))
            .map_err(|source| HttpInitError::BaseUrl {
                raw: config.base_url.clone(),
                source,
            })?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, api })
    }

    #[must_use]
    pub fn api_root(&self) -> &Url {
        &self.api
    }

    fn endpoint(&self, path: &str) -> Result<Url, StorageError> {
        self.api
            .join(path)
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

fn transport(err: reqwest::Error) -> StorageError {
    if err.is_decode() {
        StorageError::Serialization(err.to_string())
    } else {
        StorageError::Connection(err.to_string())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StorageError> {
    let status = response.status();
    if !status.is_success() {
        return Err(StorageError::Status(status.as_u16()));
    }
    let body = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|e| StorageError::Serialization(e.to_string()))
}

#[async_trait]
impl QuestionRepository for HttpRepository {
    #[instrument(skip_all, fields(grade = %grade))]
    async fn fetch_questions(&self, grade: Grade) -> Result<Vec<Question>, StorageError> {
        let mut url = self.endpoint("questions")?;
        url.query_pairs_mut().append_pair("grade", grade.as_str());

        let response = self.client.get(url).send().await.map_err(transport)?;
        let records: Vec<QuestionRecord> = read_json(response).await?;
        debug!(count = records.len(), "question set received");

        Ok(records.into_iter().map(QuestionRecord::into_question).collect())
    }
}

#[async_trait]
impl AnswerRepository for HttpRepository {
    #[instrument(skip_all, fields(question = %question_id, answer = %letter))]
    async fn validate_answer(
        &self,
        question_id: QuestionId,
        letter: OptionLetter,
    ) -> Result<bool, StorageError> {
        let response = self
            .client
            .post(self.endpoint("validate")?)
            .json(&ValidateRequest::new(question_id.value(), letter))
            .send()
            .await
            .map_err(transport)?;
        let body: ValidateResponse = read_json(response).await?;
        Ok(body.correct)
    }
}

#[async_trait]
impl StudentRepository for HttpRepository {
    #[instrument(skip_all, fields(grade = %profile.grade()))]
    async fn register_student(&self, profile: &StudentProfile) -> Result<StudentId, StorageError> {
        let response = self
            .client
            .post(self.endpoint("student")?)
            .json(&StudentRequest::from(profile))
            .send()
            .await
            .map_err(transport)?;
        let body: StudentResponse = read_json(response).await?;
        match body.student_id {
            Some(id) if body.success => Ok(StudentId::new(id)),
            _ => Err(StorageError::Rejected(
                "registration was not acknowledged".into(),
            )),
        }
    }
}

#[async_trait]
impl ResultRepository for HttpRepository {
    #[instrument(skip_all, fields(student = %result.student_id, score = result.score, total = result.total))]
    async fn save_result(&self, result: &ResultRecord) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.endpoint("result")?)
            .json(result)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status(status.as_u16()));
        }
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` backed by the remote quiz service.
    ///
    /// # Errors
    ///
    /// Returns `HttpInitError` if the client cannot be built.
    pub fn http(config: &HttpConfig) -> Result<Self, HttpInitError> {
        let repo = HttpRepository::new(config)?;
        info!(api = %repo.api_root(), "quiz service client ready");
        Ok(Self {
            questions: Arc::new(repo.clone()),
            answers: Arc::new(repo.clone()),
            students: Arc::new(repo.clone()),
            results: Arc::new(repo),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpRepository>();
    }

    #[test]
    fn endpoints_hang_off_api_prefix() {
        let repo = HttpRepository::new(&HttpConfig {
            base_url: "https://quiz.example.org/".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(
            repo.api_root().as_str(),
            "https://quiz.example.org/wp-json/kbc/v1/"
        );
        assert_eq!(
            repo.endpoint("validate").unwrap().as_str(),
            "https://quiz.example.org/wp-json/kbc/v1/validate"
        );
    }

    #[test]
    fn bad_base_url_is_reported() {
        let err = HttpRepository::new(&HttpConfig {
            base_url: "not a url".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap_err();
        assert!(matches!(err, HttpInitError::BaseUrl { .. }));
    }
}
