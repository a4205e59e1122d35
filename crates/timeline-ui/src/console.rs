//! Line-oriented console interaction.
//!
//! The session only talks to the user through [`Console`], so the whole
//! interactive flow can run against in-memory buffers in tests.

use std::io::{self, BufRead, Write};

use timeline_core::error::{Result, TimelineError};

/// Prompting and printing on a text console.
pub trait Console {
    /// Show `message` and read one line of input, trimmed.
    ///
    /// End of input yields an empty answer.
    fn prompt(&mut self, message: &str) -> Result<String>;

    /// Print `text` followed by a newline.
    fn print(&mut self, text: &str) -> Result<()>;

    /// Ask a yes/no question. Only `yes` or `y` (any case) count as yes.
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let answer = self.prompt(message)?.to_lowercase();
        Ok(answer == "yes" || answer == "y")
    }

    /// Prompt, falling back to `default` when the answer is empty.
    fn prompt_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let answer = self.prompt(message)?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }
}

/// [`Console`] over any buffered reader and writer.
pub struct IoConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> IoConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the console and return the writer, e.g. to inspect output.
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Console bound to the process's stdin and stdout.
pub fn stdio() -> IoConsole<io::StdinLock<'static>, io::Stdout> {
    IoConsole::new(io::stdin().lock(), io::stdout())
}

fn console_err(e: io::Error) -> TimelineError {
    TimelineError::Console(e.to_string())
}

impl<R: BufRead, W: Write> Console for IoConsole<R, W> {
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message).map_err(console_err)?;
        self.output.flush().map_err(console_err)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(console_err)?;
        if read == 0 {
            // Keep following output off the prompt line.
            writeln!(self.output).map_err(console_err)?;
        }
        Ok(line.trim().to_string())
    }

    fn print(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).map_err(console_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> IoConsole<Cursor<Vec<u8>>, Vec<u8>> {
        IoConsole::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(c: IoConsole<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(c.into_output()).unwrap()
    }

    #[test]
    fn test_prompt_trims_answer() {
        let mut c = console("  /logs/a.txt  \n");
        assert_eq!(c.prompt("Path: ").unwrap(), "/logs/a.txt");
        assert_eq!(output(c), "Path: ");
    }

    #[test]
    fn test_prompt_at_eof_is_empty() {
        let mut c = console("");
        assert_eq!(c.prompt("Path: ").unwrap(), "");
        assert_eq!(output(c), "Path: \n");
    }

    #[test]
    fn test_confirm_accepts_yes_and_y() {
        let mut c = console("YES\ny\nno\nyep\n\n");
        assert!(c.confirm("? ").unwrap());
        assert!(c.confirm("? ").unwrap());
        assert!(!c.confirm("? ").unwrap());
        assert!(!c.confirm("? ").unwrap());
        assert!(!c.confirm("? ").unwrap());
    }

    #[test]
    fn test_prompt_with_default() {
        let mut c = console("\n/custom.csv\n");
        assert_eq!(
            c.prompt_with_default("Out: ", "/default.csv").unwrap(),
            "/default.csv"
        );
        assert_eq!(
            c.prompt_with_default("Out: ", "/default.csv").unwrap(),
            "/custom.csv"
        );
    }

    #[test]
    fn test_print_appends_newline() {
        let mut c = console("");
        c.print("hello").unwrap();
        assert_eq!(output(c), "hello\n");
    }
}
