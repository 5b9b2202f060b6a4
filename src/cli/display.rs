//! Terminal output helpers
//!
//! Generated text goes to stdout; spinner, status and errors go to stderr
//! so piping the answer into a file stays clean.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

/// Spinner shown until the first fragment arrives
pub fn waiting_spinner(model: &str) -> Option<ProgressBar> {
    if !io::stderr().is_terminal() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Waiting for {}...", model));
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Output sink that clears the spinner before the first byte of text
pub struct SpinnerSink<W> {
    inner: W,
    spinner: Option<ProgressBar>,
    bytes_written: usize,
    ends_with_newline: bool,
}

impl<W: Write> SpinnerSink<W> {
    pub fn new(inner: W, spinner: Option<ProgressBar>) -> Self {
        Self {
            inner,
            spinner,
            bytes_written: 0,
            ends_with_newline: false,
        }
    }

    /// Remove the spinner if it is still showing
    pub fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Terminate the answer with a newline unless it already has one
    pub fn finish_line(&mut self) -> io::Result<()> {
        self.clear_spinner();
        if self.bytes_written > 0 && !self.ends_with_newline {
            self.inner.write_all(b"\n")?;
            self.ends_with_newline = true;
        }
        self.inner.flush()
    }
}

impl<W: Write> Write for SpinnerSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.clear_spinner();
        let written = self.inner.write(buf)?;
        if written > 0 {
            self.bytes_written += written;
            self.ends_with_newline = buf[written - 1] == b'\n';
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W> Drop for SpinnerSink<W> {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

/// Show an error message
pub fn show_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Show a warning message
pub fn show_warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), message);
}

/// Show a success message
pub fn show_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_passes_text_through() {
        let mut out = Vec::new();
        let mut sink = SpinnerSink::new(&mut out, None);
        sink.write_all(b"Hi").unwrap();
        sink.write_all(b" there").unwrap();
        assert_eq!(sink.bytes_written(), 8);
        drop(sink);
        assert_eq!(out, b"Hi there");
    }

    #[test]
    fn test_finish_line_adds_newline_once() {
        let mut out = Vec::new();
        let mut sink = SpinnerSink::new(&mut out, None);
        sink.write_all(b"answer").unwrap();
        sink.finish_line().unwrap();
        sink.finish_line().unwrap();
        drop(sink);
        assert_eq!(out, b"answer\n");
    }

    #[test]
    fn test_finish_line_respects_existing_newline() {
        let mut out = Vec::new();
        let mut sink = SpinnerSink::new(&mut out, None);
        sink.write_all(b"done\n").unwrap();
        sink.finish_line().unwrap();
        drop(sink);
        assert_eq!(out, b"done\n");
    }

    #[test]
    fn test_finish_line_without_output() {
        let mut out = Vec::new();
        let mut sink = SpinnerSink::new(&mut out, None);
        sink.finish_line().unwrap();
        drop(sink);
        assert!(out.is_empty());
    }

    #[test]
    fn test_spinner_cleared_on_first_write() {
        let pb = ProgressBar::hidden();
        let mut sink = SpinnerSink::new(Vec::new(), Some(pb.clone()));
        sink.write_all(b"x").unwrap();
        assert!(pb.is_finished());
    }

    #[test]
    fn test_spinner_cleared_on_drop() {
        let pb = ProgressBar::hidden();
        let sink = SpinnerSink::new(Vec::new(), Some(pb.clone()));
        drop(sink);
        assert!(pb.is_finished());
    }
}
