//! Styled status lines on stderr (stdout carries rendered text).
//!
//! `console` drops the colors when stderr is not a terminal.

use console::style;

use crate::render::WriteOutcome;

pub fn success(msg: impl std::fmt::Display) {
    eprintln!("{} {}", style("✓").green(), msg);
}

pub fn error(msg: impl std::fmt::Display) {
    eprintln!("{} {}", style("✗").red(), style(msg).red());
}

pub fn written(outcome: WriteOutcome, path: &std::path::Path) {
    let label = match outcome {
        WriteOutcome::Created => style("created").green(),
        WriteOutcome::Updated => style("updated").yellow(),
        WriteOutcome::Unchanged => style("unchanged").dim(),
    };
    eprintln!("{} {}", label, path.display());
}
