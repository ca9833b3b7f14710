use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::{ReportError, ReportResult};

/// Line-oriented console prompts over any reader/writer pair
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: &str) -> ReportResult<()> {
        writeln!(self.output, "{}", line).map_err(io_error)
    }

    /// Print `question` and read one trimmed line; end of input reads as empty
    pub fn ask(&mut self, question: &str) -> ReportResult<String> {
        write!(self.output, "{}", question).map_err(io_error)?;
        self.output.flush().map_err(io_error)?;

        let mut line = String::new();
        self.input.read_line(&mut line).map_err(io_error)?;
        Ok(line.trim().to_string())
    }

    pub fn confirm(&mut self, question: &str) -> ReportResult<bool> {
        Ok(self.ask(question)?.eq_ignore_ascii_case("y"))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

fn io_error(e: io::Error) -> ReportError {
    ReportError::Configuration(format!("console I/O failed: {}", e))
}
