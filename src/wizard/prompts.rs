use crate::error::{Result, WizardError};
use std::io::{BufRead, Write};

/// Questions the wizard asks. Implemented for the terminal on `inquire`
/// and for plain line-based input.
pub trait Prompt {
    /// Print a line of output
    fn say(&mut self, message: impl AsRef<str>) -> Result<()>;

    /// Ask for a non-empty string. `validate` returns the message to show
    /// when the answer is rejected.
    fn ask_string<F>(&mut self, prompt: &str, default: Option<&str>, validate: F) -> Result<String>
    where
        F: Fn(&str) -> std::result::Result<(), String>;

    /// Show the options and return the index picked
    fn ask_choice<S: AsRef<str>>(&mut self, prompt: &str, options: &[S], default_index: usize) -> Result<usize>;

    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Ask for a non-negative integer of at least `min`
    fn ask_int(&mut self, prompt: &str, default: Option<u64>, min: u64) -> Result<u64>;

    /// Collect items one per line until an empty line
    fn ask_string_list<F>(&mut self, prompt: &str, item_name: &str, validate: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> std::result::Result<(), String>;

    /// Read raw lines until `end_marker` on its own line or end of input
    fn read_multiline(&mut self, end_marker: &str) -> Result<String>;
}

pub(super) fn check_default_index(default_index: usize, len: usize) -> Result<()> {
    if default_index >= len {
        return Err(WizardError::validation(format!(
            "default_index {} is out of range for {} options",
            default_index, len
        )));
    }
    Ok(())
}

/// Line-based prompts over any reader/writer pair, used when stdin is not a
/// terminal. End of input on a prompt is reported as
/// [`WizardError::Cancelled`].
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.writer, "{}", text)?;
        match self.read_line()? {
            Some(line) => Ok(line.trim().to_string()),
            None => {
                writeln!(self.writer)?;
                Err(WizardError::Cancelled)
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompter<R, W> {
    fn say(&mut self, message: impl AsRef<str>) -> Result<()> {
        writeln!(self.writer, "{}", message.as_ref())?;
        Ok(())
    }

    fn ask_string<F>(&mut self, prompt: &str, default: Option<&str>, validate: F) -> Result<String>
    where
        F: Fn(&str) -> std::result::Result<(), String>,
    {
        let text = match default {
            Some(default) => format!("{} [{}]: ", prompt, default),
            None => format!("{}: ", prompt),
        };

        loop {
            let response = self.prompt(&text)?;
            if response.is_empty() {
                match default {
                    Some(default) => return Ok(default.to_string()),
                    None => {
                        self.say("Input cannot be empty. Please enter a value.")?;
                        continue;
                    }
                }
            }
            match validate(&response) {
                Ok(()) => return Ok(response),
                Err(message) => self.say(message)?,
            }
        }
    }

    fn ask_choice<S: AsRef<str>>(&mut self, prompt: &str, options: &[S], default_index: usize) -> Result<usize> {
        check_default_index(default_index, options.len())?;

        self.say(format!("\n{}", prompt))?;
        for (i, option) in options.iter().enumerate() {
            let marker = if i == default_index { "*" } else { " " };
            self.say(format!("  {}{}. {}", marker, i + 1, option.as_ref()))?;
        }

        let text = format!("Enter choice (1-{}) [{}]: ", options.len(), default_index + 1);
        loop {
            let response = self.prompt(&text)?;
            if response.is_empty() {
                return Ok(default_index);
            }
            match response.parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => return Ok(choice - 1),
                _ => self.say(format!(
                    "Please enter a number between 1 and {}.",
                    options.len()
                ))?,
            }
        }
    }

    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let text = format!("{} {}: ", prompt, if default { "[Y/n]" } else { "[y/N]" });
        loop {
            match self.prompt(&text)?.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please enter 'y' or 'n'.")?,
            }
        }
    }

    fn ask_int(&mut self, prompt: &str, default: Option<u64>, min: u64) -> Result<u64> {
        let text = match default {
            Some(default) => format!("{} [{}]: ", prompt, default),
            None => format!("{}: ", prompt),
        };

        loop {
            let response = self.prompt(&text)?;
            if response.is_empty() {
                match default {
                    Some(default) => return Ok(default),
                    None => {
                        self.say("Input cannot be empty. Please enter a number.")?;
                        continue;
                    }
                }
            }
            match response.parse::<u64>() {
                Ok(value) if value >= min => return Ok(value),
                Ok(_) => self.say(format!("Value must be at least {}.", min))?,
                Err(_) => self.say("Invalid number. Please enter a valid non-negative integer.")?,
            }
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
            let response = self.prompt(&format!("  {} {}: ", item_name, items.len() + 1))?;
            if response.is_empty() {
                return Ok(items);
            }
            match validate(&response) {
                Ok(()) => items.push(response),
                Err(message) => self.say(message)?,
            }
        }
    }

    fn read_multiline(&mut self, end_marker: &str) -> Result<String> {
        self.say(format!(
            "(Enter '{}' on a new line when done, or press Ctrl+D)",
            end_marker
        ))?;

        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
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
    use std::io::Cursor;

    fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(prompter: LinePrompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(prompter.into_writer()).unwrap()
    }

    fn lowercase_only(value: &str) -> std::result::Result<(), String> {
        if value.chars().all(|c| c.is_ascii_lowercase()) {
            Ok(())
        } else {
            Err("lowercase only".to_string())
        }
    }

    #[test]
    fn test_ask_string_retries_until_valid() {
        let mut p = prompter("\nABC\nabc\n");
        assert_eq!(p.ask_string("Name", None, lowercase_only).unwrap(), "abc");

        let out = output(p);
        assert!(out.contains("Name: "));
        assert!(out.contains("Input cannot be empty"));
        assert!(out.contains("lowercase only"));
    }

    #[test]
    fn test_ask_string_default() {
        let mut p = prompter("\n");
        let value = p.ask_string("Output directory", Some("out"), |_| Ok(())).unwrap();
        assert_eq!(value, "out");
        assert!(output(p).contains("Output directory [out]: "));
    }

    #[test]
    fn test_ask_choice() {
        let options = ["arbitrum", "ethereum", "optimism"];

        let mut p = prompter("\n");
        assert_eq!(p.ask_choice("Network", &options, 1).unwrap(), 1);
        assert!(output(p).contains("  *2. ethereum"));

        let mut p = prompter("9\nx\n3\n");
        assert_eq!(p.ask_choice("Network", &options, 0).unwrap(), 2);
        assert!(output(p).contains("between 1 and 3"));

        let mut p = prompter("");
        assert!(matches!(
            p.ask_choice("Network", &options, 3).unwrap_err(),
            WizardError::Validation(_)
        ));
    }

    #[test]
    fn test_ask_yes_no() {
        let mut p = prompter("\nYES\nmaybe\nn\n");
        assert!(p.ask_yes_no("Continue?", true).unwrap());
        assert!(p.ask_yes_no("Continue?", false).unwrap());
        assert!(!p.ask_yes_no("Continue?", true).unwrap());
        assert!(output(p).contains("Please enter 'y' or 'n'."));
    }

    #[test]
    fn test_ask_int() {
        let mut p = prompter("-5\nabc\n3\n\n");
        assert_eq!(p.ask_int("Start block", Some(0), 1).unwrap(), 3);
        assert_eq!(p.ask_int("Start block", Some(7), 0).unwrap(), 7);
        let out = output(p);
        assert!(out.contains("Invalid number"));
    }

    #[test]
    fn test_ask_string_list() {
        let mut p = prompter("a\nB\nc\n\n");
        let items = p.ask_string_list("Events:", "event name", lowercase_only).unwrap();
        assert_eq!(items, vec!["a", "c"]);
    }

    #[test]
    fn test_read_multiline() {
        let mut p = prompter("[\n  {}\n]\nEND\nleftover\n");
        assert_eq!(p.read_multiline("END").unwrap(), "[\n  {}\n]");

        let mut p = prompter("line one\nline two");
        assert_eq!(p.read_multiline("END").unwrap(), "line one\nline two");
    }

    #[test]
    fn test_end_of_input_cancels() {
        let mut p = prompter("");
        assert!(matches!(
            p.ask_string("Name", None, |_| Ok(())).unwrap_err(),
            WizardError::Cancelled
        ));

        let mut p = prompter("maybe\n");
        assert!(matches!(
            p.ask_yes_no("Continue?", true).unwrap_err(),
            WizardError::Cancelled
        ));
    }
}
