use std::sync::Arc;

use quiz_core::model::{
    AnswerRecord, CompletionReason, Grade, SessionId, SessionSummary, StudentId,
};
use quiz_core::time::fixed_now;
use services::{PersistenceError, ReportStatus, ResultReporter};
use storage::repository::{InMemoryRepository, ResultRecord};

fn summary(grade: Grade) -> SessionSummary {
    SessionSummary::from_answers(
        SessionId::new_v4(),
        grade,
        &[AnswerRecord::default(), AnswerRecord::default()],
        CompletionReason::TimeExpired,
        0,
        fixed_now(),
    )
    .unwrap()
}

#[tokio::test]
async fn result_is_saved_at_most_once_per_session() {
    let repo = InMemoryRepository::new();
    let reporter = ResultReporter::new(Arc::new(repo.clone()));
    let summary = summary(Grade::Class1To2);
    let student = Some(StudentId::new(7));

    assert_eq!(reporter.report(student, &summary).await.unwrap(), ReportStatus::Saved);
    assert_eq!(
        reporter.report(student, &summary).await.unwrap(),
        ReportStatus::AlreadyReported
    );
    assert_eq!(
        repo.saved_results(),
        vec![ResultRecord {
            student_id: StudentId::new(7),
            score: 0,
            total: 2,
            grade: Grade::Class1To2,
        }]
    );
}

#[tokio::test]
async fn missing_student_skips_the_save() {
    let repo = InMemoryRepository::new();
    let reporter = ResultReporter::new(Arc::new(repo.clone()));

    let status = reporter.report(None, &summary(Grade::Class9)).await.unwrap();
    assert_eq!(status, ReportStatus::NoStudent);
    assert!(repo.saved_results().is_empty());
}

#[tokio::test]
async fn failed_save_is_not_retried() {
    let repo = InMemoryRepository::new().failing_results();
    let reporter = ResultReporter::new(Arc::new(repo));
    let summary = summary(Grade::Class7To8);
    let student = Some(StudentId::new(1));

    let err = reporter.report(student, &summary).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Result(_)));
    assert_eq!(
        reporter.report(student, &summary).await.unwrap(),
        ReportStatus::AlreadyReported
    );
}

#[tokio::test]
async fn one_reporter_serves_many_sessions() {
    let repo = InMemoryRepository::new();
    let reporter = ResultReporter::new(Arc::new(repo.clone()));
    let student = Some(StudentId::new(3));

    for _ in 0..3 {
        let summary = summary(Grade::Class3To4);
        assert_eq!(reporter.report(student, &summary).await.unwrap(), ReportStatus::Saved);
    }
    assert_eq!(repo.saved_results().len(), 3);
}
