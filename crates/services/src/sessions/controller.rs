use quiz_core::Clock;
use quiz_core::model::{Grade, SessionId, SessionPhase, SessionSnapshot, SessionSummary};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{Instrument, debug, info, info_span, warn};

use super::clock::{ClockEvent, SessionClock};
use super::loader::QuestionSetLoader;
use super::state::{QuizSession, Step, ValidationTicket};
use super::validator::AnswerValidator;
use crate::config::SessionConfig;
use crate::error::{LoadError, ValidationError};

/// Host input accepted by a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Select(usize),
    Advance,
    Retreat,
    Abort,
}

/// Terminal result of a session, delivered once.
#[derive(Debug)]
pub enum SessionOutcome {
    Completed(SessionSummary),
    /// The set was empty (`error` is `None`) or could not be loaded.
    NoQuestions { error: Option<LoadError> },
}

impl SessionOutcome {
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        match self {
            SessionOutcome::Completed(summary) => Some(summary),
            SessionOutcome::NoQuestions { .. } => None,
        }
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Starts quiz sessions. Each session runs as its own actor task.
#[derive(Clone)]
pub struct QuizSessionController {
    loader: QuestionSetLoader,
    validator: AnswerValidator,
    config: SessionConfig,
    clock: Clock,
}

impl QuizSessionController {
    #[must_use]
    pub fn new(
        loader: QuestionSetLoader,
        validator: AnswerValidator,
        config: SessionConfig,
        clock: Clock,
    ) -> Self {
        Self {
            loader,
            validator,
            config,
            clock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begin loading the question set for `grade`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(&self, grade: Grade) -> SessionHandle {
        let id = SessionId::new_v4();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let actor = SessionActor {
            session: QuizSession::new(id, grade, self.config.time_budget_secs, self.clock),
            loader: self.loader.clone(),
            validator: self.validator.clone(),
            clock: SessionClock::from_config(&self.config),
            commands: command_rx,
            snapshots: snapshot_tx,
            outcome: Some(outcome_tx),
        };
        let span = info_span!("session", session = %id, %grade);
        let task = tokio::spawn(actor.run().instrument(span));

        SessionHandle {
            id,
            controls: SessionControls { tx: command_tx },
            snapshots: snapshot_rx,
            outcome: Some(outcome_rx),
            task,
        }
    }
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Cloneable sender for session commands. Sends to a finished session are
/// silently dropped.
#[derive(Debug, Clone)]
pub struct SessionControls {
    tx: UnboundedSender<SessionCommand>,
}

impl SessionControls {
    pub fn send(&self, command: SessionCommand) {
        if self.tx.send(command).is_err() {
            debug!(?command, "session already finished");
        }
    }

    pub fn select_option(&self, index: usize) {
        self.send(SessionCommand::Select(index));
    }

    pub fn advance(&self) {
        self.send(SessionCommand::Advance);
    }

    pub fn retreat(&self) {
        self.send(SessionCommand::Retreat);
    }

    pub fn abort(&self) {
        self.send(SessionCommand::Abort);
    }
}

/// Owner of a running session. Dropping it tears the session down, stopping
/// its clock and any validation still in flight.
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    controls: SessionControls,
    snapshots: UnboundedReceiver<SessionSnapshot>,
    outcome: Option<oneshot::Receiver<SessionOutcome>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn controls(&self) -> SessionControls {
        self.controls.clone()
    }

    pub fn select_option(&self, index: usize) {
        self.controls.select_option(index);
    }

    pub fn advance(&self) {
        self.controls.advance();
    }

    pub fn retreat(&self) {
        self.controls.retreat();
    }

    pub fn abort(&self) {
        self.controls.abort();
    }

    /// Wait for the next snapshot. `None` once the session has ended and all
    /// snapshots were drained.
    pub async fn next_snapshot(&mut self) -> Option<SessionSnapshot> {
        self.snapshots.recv().await
    }

    /// Wait for the terminal outcome. Returns `None` if it was already taken.
    pub async fn outcome(&mut self) -> Option<SessionOutcome> {
        let rx = self.outcome.take()?;
        rx.await.ok()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//
// ─── ACTOR ─────────────────────────────────────────────────────────────────────
//

type Validation = (ValidationTicket, Result<bool, ValidationError>);

enum Event {
    Command(Option<SessionCommand>),
    Clock(ClockEvent),
    Validated(Result<Validation, JoinError>),
}

struct SessionActor {
    session: QuizSession,
    loader: QuestionSetLoader,
    validator: AnswerValidator,
    clock: SessionClock,
    commands: UnboundedReceiver<SessionCommand>,
    snapshots: UnboundedSender<SessionSnapshot>,
    outcome: Option<oneshot::Sender<SessionOutcome>>,
}

impl SessionActor {
    async fn run(mut self) {
        self.emit();

        let loader = self.loader.clone();
        let load = loader.load(self.session.grade());
        tokio::pin!(load);
        let loaded = loop {
            tokio::select! {
                result = &mut load => break result,
                command = self.commands.recv() => match command {
                    Some(command) => debug!(?command, "command ignored while loading"),
                    None => return,
                },
            }
        };

        let error = match loaded {
            Ok(questions) => {
                self.session.begin(questions);
                None
            }
            Err(err) => {
                self.session.fail_load();
                Some(err)
            }
        };
        if self.session.phase() == SessionPhase::NoQuestions {
            info!(failed = error.is_some(), "session has no questions");
            self.emit();
            self.finish(SessionOutcome::NoQuestions { error });
            return;
        }

        info!(total = self.session.answers().len(), "session started");
        let (clock_tx, mut clock_rx) = mpsc::unbounded_channel();
        let mut clock = self.clock.start(clock_tx);
        let mut in_flight: JoinSet<Validation> = JoinSet::new();
        self.emit();

        loop {
            let event = tokio::select! {
                command = self.commands.recv() => Event::Command(command),
                Some(tick) = clock_rx.recv() => Event::Clock(tick),
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => Event::Validated(joined),
            };

            let completed = match event {
                Event::Command(None) => return,
                Event::Command(Some(command)) => self.on_command(command, &mut in_flight),
                Event::Clock(tick) => self.on_clock(tick),
                Event::Validated(joined) => {
                    self.on_validated(joined);
                    None
                }
            };

            if let Some(summary) = completed {
                clock.cancel();
                info!(
                    score = summary.score(),
                    total = summary.total(),
                    reason = ?summary.reason(),
                    "session completed"
                );
                self.emit();
                self.finish(SessionOutcome::Completed(summary));
                return;
            }
        }
    }

    fn on_command(
        &mut self,
        command: SessionCommand,
        in_flight: &mut JoinSet<Validation>,
    ) -> Option<SessionSummary> {
        match command {
            SessionCommand::Select(option) => {
                let Some(ticket) = self.session.select(option) else {
                    debug!(option, "selection rejected");
                    return None;
                };
                self.emit();
                let validator = self.validator.clone();
                in_flight.spawn(
                    async move {
                        let result = validator.validate(ticket.question_id, ticket.letter).await;
                        (ticket, result)
                    }
                    .in_current_span(),
                );
                None
            }
            SessionCommand::Advance => match self.session.advance() {
                Step::Ignored => {
                    debug!("advance ignored");
                    None
                }
                Step::Moved => {
                    self.emit();
                    None
                }
                Step::Completed(summary) => Some(summary),
            },
            SessionCommand::Retreat => {
                if self.session.retreat() {
                    self.emit();
                } else {
                    debug!("retreat ignored");
                }
                None
            }
            SessionCommand::Abort => self.session.abort(),
        }
    }

    fn on_clock(&mut self, event: ClockEvent) -> Option<SessionSummary> {
        match event {
            ClockEvent::Tick { remaining_secs } => {
                if self.session.tick(remaining_secs) {
                    self.emit();
                }
                None
            }
            ClockEvent::Expired => self.session.expire(),
        }
    }

    fn on_validated(&mut self, joined: Result<Validation, JoinError>) {
        let (ticket, result) = match joined {
            Ok(validation) => validation,
            Err(err) => {
                warn!(error = %err, "validation task did not finish");
                return;
            }
        };
        match result {
            Ok(correct) => {
                if self.session.apply_verdict(&ticket, correct) {
                    self.emit();
                } else {
                    debug!(question = %ticket.question_id, "stale verdict discarded");
                }
            }
            Err(err) => {
                warn!(
                    question = %ticket.question_id,
                    answer = %ticket.letter,
                    error = %err,
                    "validation failed, selection left unvalidated"
                );
            }
        }
    }

    fn emit(&self) {
        let _ = self.snapshots.send(self.session.snapshot());
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        if let Some(tx) = self.outcome.take() {
            let _ = tx.send(outcome);
        }
    }
}
