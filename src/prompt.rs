/// Interactive prompting.
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crossterm::tty::IsTty;

/// Source of answers for interactive questions.
pub trait Interaction {
    /// Whether a user is attached to answer prompts.
    fn is_interactive(&self) -> bool;

    /// Show `prompt` and return the answer without its trailing newline.
    /// `None` when input is closed.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalInteraction;

impl Interaction for TerminalInteraction {
    fn is_interactive(&self) -> bool {
        io::stdin().is_tty()
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Fixed answers, for non-interactive runs and tests.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    interactive: bool,
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedInteraction {
    pub fn non_interactive() -> Self {
        Self::default()
    }

    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interactive: true,
            answers: answers.into_iter().map(Into::into).collect(),
            asked: vec![],
        }
    }

    /// Prompts shown so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Interaction for ScriptedInteraction {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
