use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::store::traits::{Confirmation, Notification};

/// Prompt with pre-recorded answers. Keeps every question and notification so callers can
/// inspect them afterwards.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    /// Answer used once the recorded answers run out
    fallback: bool,
    questions: Mutex<Vec<String>>,
    notifications: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    /// Answers every confirmation with `answer`
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Self::default()
        }
    }

    /// Answers confirmations in order, then declines
    pub fn with_answers(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn push_answer(&self, answer: bool) {
        self.answers.lock().push_back(answer);
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().clone()
    }

    pub fn last_notification(&self) -> Option<String> {
        self.notifications.lock().last().cloned()
    }
}

impl Confirmation for ScriptedPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.questions.lock().push(message.to_string());
        self.answers.lock().pop_front().unwrap_or(self.fallback)
    }
}

impl Notification for ScriptedPrompt {
    fn notify(&self, message: &str) {
        self.notifications.lock().push(message.to_string());
    }
}

/// Terminal prompt: asks on stdout and reads `y`/`n` from stdin
#[derive(Debug, Clone, Default)]
pub struct ConsolePrompt {
    /// Skip the question and answer yes
    pub auto_confirm: bool,
}

impl ConsolePrompt {
    pub fn new(auto_confirm: bool) -> Self {
        Self { auto_confirm }
    }
}

impl Confirmation for ConsolePrompt {
    fn confirm(&self, message: &str) -> bool {
        if self.auto_confirm {
            println!("{} [y/N] y (auto)", message);
            return true;
        }

        Self::ask(message, &mut std::io::stdin().lock(), &mut std::io::stdout())
    }
}

impl ConsolePrompt {
    /// Write the question to `output` and read one answer line from `input`. Output failures
    /// are logged and the answer is still read; a failed read counts as no.
    fn ask(message: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
        if let Err(e) = write!(output, "{} [y/N] ", message).and_then(|_| output.flush()) {
            log::warn!("Failed to write confirmation prompt: {}", e);
        }

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                log::warn!("Failed to read confirmation, treating as no: {}", e);
                false
            }
        }
    }
}

impl Notification for ConsolePrompt {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}
