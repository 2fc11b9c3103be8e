//! Operator decisions at the two confirmation gates.

use log::debug;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub key: char,
    pub label: &'static str,
}

impl Choice {
    pub const fn new(key: char, label: &'static str) -> Self {
        Self { key, label }
    }

    fn matches(&self, input: &str) -> bool {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.eq_ignore_ascii_case(&self.key),
            _ => false,
        }
    }
}

pub const WAIT: Choice = Choice::new('w', "Wait");
pub const QUIT: Choice = Choice::new('q', "Exit");
pub const YES: Choice = Choice::new('y', "Yes");
pub const NO: Choice = Choice::new('n', "No");

/// Choice sets list the affirmative answer first and the negative one last.
pub const WAIT_OR_QUIT: [Choice; 2] = [WAIT, QUIT];
pub const YES_OR_NO: [Choice; 2] = [YES, NO];

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before a valid choice was entered")]
    Eof,
    #[error("no choices offered for prompt '{prompt}'")]
    NoChoices { prompt: String },
    #[error("failed to talk to the operator: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

pub trait DecisionProvider: Send {
    fn choose(&mut self, prompt: &str, choices: &[Choice]) -> Result<Choice, PromptError>;
}

/// Interactive provider: single-character answers, case-insensitive,
/// re-prompting until the answer is valid.
pub struct StdinDecisions<R, W> {
    input: R,
    output: W,
}

impl StdinDecisions<BufReader<Stdin>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> StdinDecisions<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn valid_inputs(choices: &[Choice]) -> String {
        choices
            .iter()
            .map(|choice| format!("'{}'", choice.key))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<R, W> DecisionProvider for StdinDecisions<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn choose(&mut self, prompt: &str, choices: &[Choice]) -> Result<Choice, PromptError> {
        if choices.is_empty() {
            return Err(PromptError::NoChoices {
                prompt: prompt.to_string(),
            });
        }

        writeln!(self.output, "{prompt}")?;
        loop {
            writeln!(self.output, "Please enter your choice:")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(PromptError::Eof);
            }

            let answer = line.trim();
            if let Some(choice) = choices.iter().find(|choice| choice.matches(answer)) {
                debug!("operator chose '{}'", choice.label);
                return Ok(*choice);
            }

            writeln!(
                self.output,
                "Input Error: only {} are valid inputs.\nPlease enter a valid input.\n",
                Self::valid_inputs(choices)
            )?;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoAnswer {
    Affirmative,
    Negative,
}

/// Non-interactive provider for `--yes` / `--no`.
#[derive(Debug, Clone, Copy)]
pub struct AutoDecisions {
    answer: AutoAnswer,
}

impl AutoDecisions {
    pub fn new(answer: AutoAnswer) -> Self {
        Self { answer }
    }
}

impl DecisionProvider for AutoDecisions {
    fn choose(&mut self, prompt: &str, choices: &[Choice]) -> Result<Choice, PromptError> {
        let choice = match self.answer {
            AutoAnswer::Affirmative => choices.first(),
            AutoAnswer::Negative => choices.last(),
        }
        .copied()
        .ok_or_else(|| PromptError::NoChoices {
            prompt: prompt.to_string(),
        })?;
        debug!("'{}' answered automatically with '{}'", prompt, choice.label);
        Ok(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn provider(input: &str) -> StdinDecisions<Cursor<Vec<u8>>, Vec<u8>> {
        StdinDecisions::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn answers_are_case_insensitive() {
        let mut decisions = provider("W\n");
        assert_eq!(decisions.choose("wait?", &WAIT_OR_QUIT).unwrap(), WAIT);

        let mut decisions = provider("q\n");
        assert_eq!(decisions.choose("wait?", &WAIT_OR_QUIT).unwrap(), QUIT);
    }

    #[test]
    fn invalid_input_reprompts_until_valid() {
        let mut decisions = provider("maybe\n\nyy\n  n  \n");
        assert_eq!(decisions.choose("proceed?", &YES_OR_NO).unwrap(), NO);

        let transcript = String::from_utf8(decisions.into_output()).unwrap();
        assert_eq!(transcript.matches("Input Error").count(), 3);
        assert!(transcript.contains("only 'y', 'n' are valid inputs"));
        assert!(transcript.starts_with("proceed?\n"));
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut decisions = provider("x\n");
        let err = decisions.choose("wait?", &WAIT_OR_QUIT).expect_err("eof");
        assert!(matches!(err, PromptError::Eof));
    }

    #[test]
    fn auto_decisions_pick_first_or_last() {
        let mut yes = AutoDecisions::new(AutoAnswer::Affirmative);
        let mut no = AutoDecisions::new(AutoAnswer::Negative);

        assert_eq!(yes.choose("proceed?", &YES_OR_NO).unwrap(), YES);
        assert_eq!(yes.choose("wait?", &WAIT_OR_QUIT).unwrap(), WAIT);
        assert_eq!(no.choose("proceed?", &YES_OR_NO).unwrap(), NO);
        assert_eq!(no.choose("wait?", &WAIT_OR_QUIT).unwrap(), QUIT);
        assert!(matches!(
            yes.choose("empty", &[]),
            Err(PromptError::NoChoices { .. })
        ));
    }
}
