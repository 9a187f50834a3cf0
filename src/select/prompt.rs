// src/select/prompt.rs
// =============================================================================
// Where selection strings come from.
//
// The pipeline never reads stdin itself. It asks a SelectionProvider for
// the next answer, which lets the same loop run against:
// - a real terminal (TerminalPrompt)
// - one answer given up front (FixedSelection), used by --select
// - a fixed list of answers (CannedSelections), used by tests
// =============================================================================

use anyhow::{anyhow, Result};
use std::io::{self, BufRead, Write};

/// Supplies raw selection strings to the pipeline.
pub trait SelectionProvider {
    /// Shows `prompt` (if the provider has somewhere to show it) and
    /// returns the next raw answer.
    ///
    /// An `Err` means no more answers will ever come; the caller gives up
    /// on the page instead of asking again.
    fn next_selection(&mut self, prompt: &str) -> Result<String>;

    /// Called before the first prompt for each source page.
    fn start_page(&mut self) {}
}

/// Reads answers from standard input.
pub struct TerminalPrompt;

impl SelectionProvider for TerminalPrompt {
    fn next_selection(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        read_answer(io::stdin().lock())
    }
}

// Reads one line, telling the runtime this worker thread is about to block
//
// Needs the multi-threaded runtime when called from async code, which is
// what #[tokio::main] gives us.
fn read_answer(mut reader: impl BufRead) -> Result<String> {
    tokio::task::block_in_place(|| {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            // EOF: without this the re-prompt loop would spin forever
            return Err(anyhow!("standard input closed"));
        }
        Ok(line)
    })
}

/// Gives the same answer once per page. If that answer is rejected there
/// is nobody to ask again, so the second request for a page errors.
#[derive(Debug)]
pub struct FixedSelection {
    answer: String,
    used: bool,
}

impl FixedSelection {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            used: false,
        }
    }
}

impl SelectionProvider for FixedSelection {
    fn next_selection(&mut self, _prompt: &str) -> Result<String> {
        if self.used {
            return Err(anyhow!("selection '{}' was rejected", self.answer.trim()));
        }
        self.used = true;
        Ok(self.answer.clone())
    }

    fn start_page(&mut self) {
        self.used = false;
    }
}

/// Hands out a fixed sequence of answers, then errors.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct CannedSelections {
    answers: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl CannedSelections {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
impl SelectionProvider for CannedSelections {
    fn next_selection(&mut self, _prompt: &str) -> Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("no more selections available"))
    }
}
