use quiz_core::model::{OptionLetter, SessionPhase, SessionSnapshot, SessionSummary};
use services::{SessionCommand, SessionControls, SessionProgress};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Map one line of input to a session command.
pub fn parse_line(line: &str) -> Option<SessionCommand> {
    let line = line.trim();
    if let Ok(letter) = line.parse::<OptionLetter>() {
        return Some(SessionCommand::Select(letter.index()));
    }
    match line.to_ascii_lowercase().as_str() {
        "n" | "next" => Some(SessionCommand::Advance),
        "p" | "prev" | "back" => Some(SessionCommand::Retreat),
        "q" | "quit" => Some(SessionCommand::Abort),
        _ => None,
    }
}

/// Forward stdin lines to the session until stdin closes.
pub async fn forward_stdin(controls: SessionControls) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_line(&line) {
            Some(command) => controls.send(command),
            None if line.trim().is_empty() => {}
            None => println!("commands: a/b/c/d, n(ext), p(rev), q(uit)"),
        }
    }
}

/// Print what changed between two snapshots.
pub fn render(prev: Option<&SessionSnapshot>, next: &SessionSnapshot) {
    let moved = prev.is_none_or(|p| p.phase != next.phase || p.current_index != next.current_index);
    if moved {
        render_screen(next);
        return;
    }
    let Some(prev) = prev else { return };

    if prev.answers != next.answers {
        if let Some(record) = next.current_answer() {
            let status = match (record.selected(), record.verdict()) {
                (None, _) => "no answer".to_owned(),
                (Some(letter), None) => format!("{letter} selected, checking..."),
                (Some(letter), Some(verdict)) if verdict.is_correct() => {
                    format!("{letter} is correct")
                }
                (Some(letter), Some(_)) => format!("{letter} is not correct"),
            };
            println!("  {status} (score {})", next.score);
        }
    } else if prev.time_remaining_secs != next.time_remaining_secs {
        let secs = next.time_remaining_secs;
        if secs % 60 == 0 || secs <= 10 {
            println!("  time left {}:{:02}", secs / 60, secs % 60);
        }
    }
}

fn render_screen(snapshot: &SessionSnapshot) {
    match snapshot.phase {
        SessionPhase::Loading => println!("loading questions for {}...", snapshot.grade),
        SessionPhase::NoQuestions => println!("no questions available for {}", snapshot.grade),
        SessionPhase::Completed => println!("quiz finished"),
        SessionPhase::InProgress => {
            let Some(question) = &snapshot.current_question else {
                return;
            };
            println!();
            println!(
                "Question {}/{}  (time left {}:{:02})",
                snapshot.current_index + 1,
                snapshot.total,
                snapshot.time_remaining_secs / 60,
                snapshot.time_remaining_secs % 60
            );
            let prompt = question.prompt();
            if prompt.is_blank() {
                println!("(no question text)");
            } else {
                println!("{}", prompt.primary);
                if !prompt.secondary.trim().is_empty() {
                    println!("{}", prompt.secondary);
                }
            }
            for letter in OptionLetter::ALL {
                println!("  {letter}) {}", question.option(letter).primary);
            }
            if let Some(letter) = snapshot.current_answer().and_then(|a| a.selected()) {
                println!("  (selected {letter})");
            }
            println!("  {}", progress_line(snapshot));
        }
    }
}

fn progress_line(snapshot: &SessionSnapshot) -> String {
    let progress = SessionProgress::from(snapshot);
    let next = if snapshot.is_last_question() {
        "n to finish"
    } else {
        "n for next"
    };
    format!(
        "answered {}/{}, {} unanswered; {next}",
        progress.answered,
        progress.total,
        progress.unanswered()
    )
}

pub fn print_summary(summary: &SessionSummary) {
    println!();
    println!(
        "Score {}/{} ({:?}, {}s left)",
        summary.score(),
        summary.total(),
        summary.reason(),
        summary.time_remaining_secs()
    );
    for (i, answer) in summary.answers().iter().enumerate() {
        match answer {
            Some(letter) => println!("  Q{}: {letter}", i + 1),
            None => println!("  Q{}: -", i + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_select_and_words_navigate() {
        assert_eq!(parse_line("a"), Some(SessionCommand::Select(0)));
        assert_eq!(parse_line(" D "), Some(SessionCommand::Select(3)));
        assert_eq!(parse_line("next"), Some(SessionCommand::Advance));
        assert_eq!(parse_line("P"), Some(SessionCommand::Retreat));
        assert_eq!(parse_line("quit"), Some(SessionCommand::Abort));
        assert_eq!(parse_line("e"), None);
    }

    #[test]
    fn progress_line_flags_the_last_question() {
        use quiz_core::model::{AnswerRecord, Grade, SessionId};

        let mut answered = AnswerRecord::default();
        answered.select(OptionLetter::B);
        let mut snapshot = SessionSnapshot {
            session_id: SessionId::new_v4(),
            grade: Grade::Class9,
            phase: SessionPhase::InProgress,
            current_index: 0,
            total: 2,
            current_question: None,
            answers: vec![answered, AnswerRecord::default()],
            time_remaining_secs: 30,
            score: 0,
        };
        assert_eq!(progress_line(&snapshot), "answered 1/2, 1 unanswered; n for next");

        snapshot.current_index = 1;
        assert!(progress_line(&snapshot).ends_with("n to finish"));
    }
}
