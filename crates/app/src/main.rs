use std::fmt;
use std::time::Duration;

use quiz_core::model::{Grade, StudentDraft, StudentId};
use services::{AppServices, Clock, ReportStatus, SessionConfig, SessionOutcome};
use storage::{HttpConfig, Storage};
use tracing_subscriber::EnvFilter;

mod demo;
mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingGrade,
    IncompleteStudent,
    InvalidBudget { raw: String },
    InvalidTick { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingGrade => write!(f, "--grade is required"),
            ArgsError::IncompleteStudent => {
                write!(f, "--name, --mobile and --dob must be given together")
            }
            ArgsError::InvalidBudget { raw } => write!(f, "invalid --budget value: {raw}"),
            ArgsError::InvalidTick { raw } => write!(f, "invalid --tick-ms value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play --grade <label> [--name <n> --mobile <m> --dob <YYYY-MM-DD>]");
    eprintln!("                          [--api <base_url>] [--budget <secs>] [--tick-ms <ms>] [--demo]");
    eprintln!("  cargo run -p app -- grades");
    eprintln!();
    eprintln!("During a quiz: a/b/c/d to answer, n(ext), p(rev), q(uit).");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_BASE_URL, QUIZ_HTTP_TIMEOUT_SECS, QUIZ_TIME_BUDGET_SECS,");
    eprintln!("  QUIZ_TICK_INTERVAL_MS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Grades,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "grades" => Some(Self::Grades),
            _ => None,
        }
    }
}

struct Student {
    name: String,
    mobile: String,
    dob: String,
}

struct Args {
    grade: String,
    student: Option<Student>,
    http: HttpConfig,
    session: SessionConfig,
    demo: bool,
}

impl Args {
    fn parse_play(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut grade = None;
        let (mut name, mut mobile, mut dob) = (None, None, None);
        let mut http = HttpConfig::from_env();
        let mut session = SessionConfig::from_env();
        let mut demo = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--grade" => grade = Some(require_value(args, "--grade")?),
                "--name" => name = Some(require_value(args, "--name")?),
                "--mobile" => mobile = Some(require_value(args, "--mobile")?),
                "--dob" => dob = Some(require_value(args, "--dob")?),
                "--api" => http.base_url = require_value(args, "--api")?,
                "--budget" => {
                    let value = require_value(args, "--budget")?;
                    let secs = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidBudget { raw: value.clone() })?;
                    session = session.with_time_budget(secs);
                }
                "--tick-ms" => {
                    let value = require_value(args, "--tick-ms")?;
                    let ms: u64 = value
                        .parse()
                        .ok()
                        .filter(|ms| *ms > 0)
                        .ok_or_else(|| ArgsError::InvalidTick { raw: value.clone() })?;
                    session = session.with_tick_interval(Duration::from_millis(ms));
                }
                "--demo" => demo = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let student = match (name, mobile, dob) {
            (Some(name), Some(mobile), Some(dob)) => Some(Student { name, mobile, dob }),
            (None, None, None) => None,
            _ => return Err(ArgsError::IncompleteStudent),
        };

        Ok(Self {
            grade: grade.ok_or(ArgsError::MissingGrade)?,
            student,
            http,
            session,
            demo,
        })
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv[0].starts_with("--") {
        argv.remove(0);
    }

    if cmd == Command::Grades {
        for grade in Grade::ALL {
            println!("{grade}");
        }
        return Ok(());
    }

    let parsed = Args::parse_play(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    play(parsed).await
}

async fn play(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let grade: Grade = args.grade.parse().map_err(quiz_core::Error::from)?;
    let clock = Clock::system();
    let services = if args.demo {
        AppServices::new(Storage::in_memory(demo::repository()), args.session, clock)
    } else {
        AppServices::http(&args.http, args.session, clock)?
    };

    let student_id = match args.student {
        Some(student) => register(&services, student, grade).await?,
        None => None,
    };

    let mut handle = services.sessions().start(grade);
    let input = tokio::spawn(terminal::forward_stdin(handle.controls()));

    let mut last = None;
    while let Some(snapshot) = handle.next_snapshot().await {
        terminal::render(last.as_ref(), &snapshot);
        last = Some(snapshot);
    }
    input.abort();

    match handle.outcome().await {
        Some(SessionOutcome::Completed(summary)) => {
            terminal::print_summary(&summary);
            match services.reporter().report(student_id, &summary).await {
                Ok(ReportStatus::Saved) => println!("result saved"),
                Ok(_) => {}
                Err(err) => println!("result not saved: {err}"),
            }
        }
        Some(SessionOutcome::NoQuestions { error: Some(err) }) => {
            println!("could not load questions: {err}");
        }
        Some(SessionOutcome::NoQuestions { error: None }) | None => {}
    }
    Ok(())
}

/// Validate the form locally, then register. A failed remote call is not
/// fatal; the quiz runs without a student id and the result is not saved.
async fn register(
    services: &AppServices,
    student: Student,
    grade: Grade,
) -> Result<Option<StudentId>, quiz_core::Error> {
    let registration = services.registration();
    let profile = registration.validate(StudentDraft {
        name: student.name,
        mobile: student.mobile,
        dob: student.dob,
        grade,
    })?;
    match registration.register(&profile).await {
        Ok(id) => Ok(Some(id)),
        Err(err) => {
            println!("registration failed, continuing without saving results: {err}");
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let code = match run().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            2
        }
    };
    // The stdin reader can still be parked on a blocking read.
    std::process::exit(code);
}
