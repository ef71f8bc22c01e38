use std::io::{self, BufRead, Write};

use colored::Colorize;
use sio_shift::{PromptAnswer, ShiftPrompt, ShiftQuestion};

/// Asks shift questions on the terminal.
///
/// `y` applies the suggested shift to the current file, `a` applies it to
/// every remaining file of the batch, anything else declines.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalPrompt;

impl ShiftPrompt for TerminalPrompt {
    fn ask(&self, question: &ShiftQuestion) -> Option<PromptAnswer> {
        let mut err = io::stderr().lock();
        let header = if question.needs_shift {
            "Coordinates are too large for single precision.".yellow().bold()
        } else {
            "Apply a global shift?".bold()
        };
        writeln!(err, "{header}").ok()?;
        writeln!(err, "  first point:     {}", question.point).ok()?;
        writeln!(err, "  suggested shift: {}", question.suggested_shift.to_string().cyan()).ok()?;
        write!(err, "Apply shift? [y]es / [a]ll files / [N]o: ").ok()?;
        err.flush().ok()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).ok()?;
        parse_answer(&line, question)
    }
}

fn parse_answer(line: &str, question: &ShiftQuestion) -> Option<PromptAnswer> {
    let apply_to_all = match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => false,
        "a" | "all" => true,
        _ => return None,
    };
    Some(PromptAnswer {
        shift: question.suggested_shift,
        preserve_on_save: true,
        apply_to_all,
    })
}
