//! Reporting sinks for probe progress.
//!
//! A sink receives the human-readable transcript of a probe run. It is
//! handed to [`Probe::run`](crate::probe::Probe::run) for the duration of one
//! run; nothing about it is process-wide.

use std::io::Write;

/// Consumer of probe progress messages.
pub trait ReportSink: Send {
    /// Replaces everything shown so far with `text`.
    fn set_text(&mut self, text: &str);

    /// Appends `line` followed by a line break.
    fn append_line(&mut self, line: &str);
}

/// Collects the transcript in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the full text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the transcript split into lines.
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }
}

impl ReportSink for Transcript {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn append_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }
}

/// Writes the transcript to a terminal or any other writer.
///
/// `set_text` cannot erase what a stream already printed, so it writes the
/// new text as-is.
#[derive(Debug)]
pub struct ConsoleSink<W: Write + Send = std::io::Stdout> {
    out: W,
}

impl ConsoleSink {
    /// Writes to standard output.
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Writes to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ReportSink for ConsoleSink<W> {
    fn set_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.append_line(text);
        }
    }

    fn append_line(&mut self, line: &str) {
        // A closed stdout must not abort the probe; the tracing events carry
        // the same messages.
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_appends_lines() {
        let mut transcript = Transcript::new();
        transcript.append_line("one");
        transcript.append_line("two");
        assert_eq!(transcript.text(), "one\ntwo\n");
        assert_eq!(transcript.lines(), vec!["one", "two"]);
    }

    #[test]
    fn test_transcript_set_text_replaces() {
        let mut transcript = Transcript::new();
        transcript.append_line("stale");
        transcript.set_text("fresh");
        transcript.append_line("!");
        assert_eq!(transcript.text(), "fresh!\n");
    }

    #[test]
    fn test_console_sink_writes_lines() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.set_text("");
        sink.append_line("Try uploading random texture");
        assert_eq!(
            String::from_utf8(sink.into_inner()).unwrap(),
            "Try uploading random texture\n"
        );
    }
}
