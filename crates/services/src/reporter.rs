use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use quiz_core::model::{SessionId, SessionSummary, StudentId};
use storage::repository::{ResultRecord, ResultRepository};
use tracing::{info, warn};

use crate::error::PersistenceError;

/// What `ResultReporter::report` did with a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Saved,
    /// Registration never produced a student id.
    NoStudent,
    /// A save for this session was already attempted.
    AlreadyReported,
}

/// Posts completed session summaries. At most one attempt per session, no retry.
pub struct ResultReporter {
    results: Arc<dyn ResultRepository>,
    // One id per finished session, kept for the reporter's lifetime. Hosts
    // build one reporter per process run, so this stays small.
    reported: Mutex<HashSet<SessionId>>,
}

impl ResultReporter {
    #[must_use]
    pub fn new(results: Arc<dyn ResultRepository>) -> Self {
        Self {
            results,
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// Save `summary` for `student`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Result` if the save call fails. The session
    /// still counts as reported.
    pub async fn report(
        &self,
        student: Option<StudentId>,
        summary: &SessionSummary,
    ) -> Result<ReportStatus, PersistenceError> {
        let Some(student_id) = student else {
            info!(session = %summary.session_id(), "no student id, result not saved");
            return Ok(ReportStatus::NoStudent);
        };
        if !self.claim(summary.session_id()) {
            return Ok(ReportStatus::AlreadyReported);
        }

        let record = ResultRecord {
            student_id,
            score: summary.score(),
            total: summary.total(),
            grade: summary.grade(),
        };
        match self.results.save_result(&record).await {
            Ok(()) => {
                info!(
                    session = %summary.session_id(),
                    student = %student_id,
                    score = record.score,
                    total = record.total,
                    "result saved"
                );
                Ok(ReportStatus::Saved)
            }
            Err(err) => {
                warn!(session = %summary.session_id(), error = %err, "result save failed");
                Err(PersistenceError::Result(err))
            }
        }
    }

    fn claim(&self, session: SessionId) -> bool {
        match self.reported.lock() {
            Ok(mut reported) => reported.insert(session),
            Err(poisoned) => poisoned.into_inner().insert(session),
        }
    }
}
