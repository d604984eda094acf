use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Stdin, Write};

use crate::error::{Error, Result};

/// Channel between a running task and whoever is operating it.
pub trait Feedback {
    /// Surface a human-readable progress message.
    fn message(&mut self, message: &str);

    /// Ask the operator a question and block for a one-line answer.
    ///
    /// Returns `Ok(None)` when no answer can be obtained (no input attached,
    /// end of input).
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
}

// ============================================================================
// Stream-backed (interactive) feedback
// ============================================================================

/// Feedback over a line-oriented input and a text output.
pub struct StreamFeedback<R: BufRead, W: Write> {
    input: R,
    output: W,
    prefix: Option<String>,
}

/// Interactive feedback for operator use: prompts on stderr, answers from stdin.
pub type ConsoleFeedback = StreamFeedback<BufReader<Stdin>, io::Stderr>;

impl ConsoleFeedback {
    pub fn console(prefix: Option<String>) -> Self {
        StreamFeedback::new(BufReader::new(io::stdin()), io::stderr(), prefix)
    }
}

impl<R: BufRead, W: Write> StreamFeedback<R, W> {
    pub fn new(input: R, output: W, prefix: Option<String>) -> Self {
        Self {
            input,
            output,
            prefix,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn tag(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("[{}] ", prefix),
            None => String::new(),
        }
    }
}

impl<R: BufRead, W: Write> Feedback for StreamFeedback<R, W> {
    fn message(&mut self, message: &str) {
        let tag = self.tag();
        // A closed output must not fail the task.
        let _ = writeln!(self.output, "{}{}", tag, message);
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let tag = self.tag();
        write!(self.output, "{}{} ", tag, question.trim_end())
            .and_then(|_| self.output.flush())
            .map_err(|e| Error::internal_io(e.to_string(), Some("write prompt".to_string())))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| Error::internal_io(e.to_string(), Some("read answer".to_string())))?;

        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

// ============================================================================
// Non-interactive feedback
// ============================================================================

/// Discards messages; every question goes unanswered.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn message(&mut self, _message: &str) {}

    fn ask(&mut self, _question: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Records messages and questions; answers come from a scripted queue.
#[derive(Debug, Default, Clone)]
pub struct BufferedFeedback {
    pub messages: Vec<String>,
    pub questions: Vec<String>,
    answers: VecDeque<String>,
}

impl BufferedFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Feedback for BufferedFeedback {
    fn message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front())
    }
}
