//! Result sink trait and the printing sink
//!
//! A sink consumes crawl results one at a time as they arrive from the
//! stream.

use crate::crawler::CrawlResult;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Consumer of crawl results
pub trait ResultSink {
    /// Handles one result
    fn accept(&mut self, result: &CrawlResult) -> OutputResult<()>;

    /// Called once after the stream has closed
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Writes one line per result
///
/// Successes are written as `found: <address> "<content>"`; failures are
/// written as the error's display text.
pub struct PrintSink<W: Write> {
    writer: W,
}

impl<W: Write> PrintSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl PrintSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ResultSink for PrintSink<W> {
    fn accept(&mut self, result: &CrawlResult) -> OutputResult<()> {
        match &result.outcome {
            Ok(content) => writeln!(self.writer, "found: {} {:?}", result.address, content)?,
            Err(error) => writeln!(self.writer, "{}", error)?,
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
