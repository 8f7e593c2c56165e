use super::prompts::{check_default_index, Prompt};
use crate::error::{Result, WizardError};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use std::io::{self, BufRead};

/// Interactive terminal prompts built on `inquire`. Escape and Ctrl+C end
/// the wizard with [`WizardError::Cancelled`].
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl From<InquireError> for WizardError {
    fn from(error: InquireError) -> Self {
        match error {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => WizardError::Cancelled,
            InquireError::IO(e) => WizardError::Io(e),
            other => WizardError::Prompt(other.to_string()),
        }
    }
}

impl Prompt for TerminalPrompter {
    fn say(&mut self, message: impl AsRef<str>) -> Result<()> {
        println!("{}", message.as_ref());
        Ok(())
    }

    fn ask_string<F>(&mut self, prompt: &str, default: Option<&str>, validate: F) -> Result<String>
    where
        F: Fn(&str) -> std::result::Result<(), String>,
    {
        loop {
            let mut question = Text::new(prompt);
            if let Some(default) = default {
                question = question.with_default(default);
            }
            let response = question.prompt()?.trim().to_string();

            if response.is_empty() {
                self.say("Input cannot be empty. Please enter a value.")?;
                continue;
            }
            match validate(&response) {
                Ok(()) => return Ok(response),
                Err(message) => self.say(message)?,
            }
        }
    }

    fn ask_choice<S: AsRef<str>>(&mut self, prompt: &str, options: &[S], default_index: usize) -> Result<usize> {
        check_default_index(default_index, options.len())?;
        let labels: Vec<&str> = options.iter().map(AsRef::as_ref).collect();
        let choice = Select::new(prompt, labels)
            .with_starting_cursor(default_index)
            .raw_prompt()?;
        Ok(choice.index)
    }

    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new(prompt.trim_start()).with_default(default).prompt()?)
    }

    fn ask_int(&mut self, prompt: &str, default: Option<u64>, min: u64) -> Result<u64> {
        loop {
            let mut question = CustomType::<u64>::new(prompt)
                .with_error_message("Invalid number. Please enter a valid non-negative integer.");
            if let Some(default) = default {
                question = question.with_default(default);
            }

            let value = question.prompt()?;
            if value >= min {
                return Ok(value);
            }
            self.say(format!("Value must be at least {}.", min))?;
        }
    }

    fn ask_string_list<F>(&mut self, prompt: &str, item_name: &str, validate: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> std::result::Result<(), String>,
    {
        self.say(prompt)?;
        self.say(format!("(one {} per line, empty line to finish)", item_name))?;

        let mut items = Vec::new();
        loop {
            let label = format!("{} {}", item_name, items.len() + 1);
            let response = Text::new(&label).prompt()?.trim().to_string();
            if response.is_empty() {
                return Ok(items);
            }
            match validate(&response) {
                Ok(()) => items.push(response),
                Err(message) => self.say(message)?,
            }
        }
    }

    // Pasted JSON spans many lines, so this reads stdin directly
    fn read_multiline(&mut self, end_marker: &str) -> Result<String> {
        self.say(format!(
            "(Enter '{}' on a new line when done, or press Ctrl+D)",
            end_marker
        ))?;

        let mut lines = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line?;
            if line.trim() == end_marker {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inquire_errors() {
        assert!(matches!(
            WizardError::from(InquireError::OperationCanceled),
            WizardError::Cancelled
        ));
        assert!(matches!(
            WizardError::from(InquireError::OperationInterrupted),
            WizardError::Cancelled
        ));

        let io = InquireError::IO(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert!(matches!(WizardError::from(io), WizardError::Io(_)));

        let not_tty = WizardError::from(InquireError::NotTTY);
        assert!(matches!(not_tty, WizardError::Prompt(_)));
        assert!(!not_tty.is_known());
    }

    #[test]
    fn test_choice_default_out_of_range() {
        let err = TerminalPrompter::new()
            .ask_choice("Network", &["ethereum"], 1)
            .unwrap_err();
        assert!(matches!(err, WizardError::Validation(_)));
    }
}
