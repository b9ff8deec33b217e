//! Output envelope
//!
//! The composite text shown to students and stored with each submission:
//! run status and resource usage followed by the program's own output.
//!
//! Format version 2:
//!
//! ```text
//! Status: AC
//! Memory: 64KB
//! Time: 0.1s
//! Stderr: 9 bytes
//!
//! <program stdout>
//!
//! [stderr]
//! <program stderr>
//! ```
//!
//! The header ends at the first blank line. The `Stderr` header line and the
//! `[stderr]` trailer are only present when the run wrote to stderr; the
//! header carries the trailer's byte length, so the split never depends on
//! what either stream contains. Blobs without a `Stderr` line (version 1)
//! are read as stdout only.

use serde::{Deserialize, Serialize};

const HEADER_SEPARATOR: &str = "\n\n";
const STDERR_MARKER: &str = "\n\n[stderr]\n";

/// Structured view of a rendered run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEnvelope {
    pub status_label: String,
    pub memory_used_kb: f64,
    pub time_used_seconds: f64,
    pub program_output: String,
    pub stderr: Option<String>,
}

impl OutputEnvelope {
    /// Renders the envelope as display text
    pub fn render(&self) -> String {
        let stderr = self.stderr.as_deref().filter(|s| !s.is_empty());

        let mut text = format!(
            "Status: {}\nMemory: {}KB\nTime: {}s",
            self.status_label, self.memory_used_kb, self.time_used_seconds
        );
        if let Some(stderr) = stderr {
            text.push_str(&format!("\nStderr: {} bytes", stderr.len()));
        }
        text.push_str(HEADER_SEPARATOR);
        text.push_str(&self.program_output);

        if let Some(stderr) = stderr {
            text.push_str(STDERR_MARKER);
            text.push_str(stderr);
        }

        text
    }

    /// Splits a rendered blob back into its parts
    ///
    /// Returns `None` if the blob has no header or the header is not in the
    /// expected shape.
    pub fn parse(blob: &str) -> Option<Self> {
        let (header, body) = blob.split_once(HEADER_SEPARATOR)?;

        let mut status_label = None;
        let mut memory_used_kb = None;
        let mut time_used_seconds = None;
        let mut stderr_len: Option<usize> = None;

        for line in header.lines() {
            let (key, value) = line.split_once(':')?;
            let value = value.trim();
            match key.trim() {
                "Status" => status_label = Some(value.to_string()),
                "Memory" => memory_used_kb = value.trim_end_matches("KB").parse().ok(),
                "Time" => time_used_seconds = value.trim_end_matches('s').parse().ok(),
                "Stderr" => {
                    stderr_len = Some(value.trim_end_matches("bytes").trim().parse().ok()?)
                }
                _ => {}
            }
        }

        let (program_output, stderr) = match stderr_len {
            Some(len) => {
                let split = body.len().checked_sub(STDERR_MARKER.len() + len)?;
                let trailer = body.get(split..)?.strip_prefix(STDERR_MARKER)?;
                (body.get(..split)?.to_string(), Some(trailer.to_string()))
            }
            None => (body.to_string(), None),
        };

        Some(Self {
            status_label: status_label?,
            memory_used_kb: memory_used_kb?,
            time_used_seconds: time_used_seconds?,
            program_output,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(stdout: &str, stderr: Option<&str>) -> OutputEnvelope {
        OutputEnvelope {
            status_label: "AC".to_string(),
            memory_used_kb: 64.0,
            time_used_seconds: 0.25,
            program_output: stdout.to_string(),
            stderr: stderr.map(str::to_string),
        }
    }

    #[test]
    fn test_render() {
        let text = envelope("hi\n", None).render();
        assert_eq!(text, "Status: AC\nMemory: 64KB\nTime: 0.25s\n\nhi\n");
    }

    #[test]
    fn test_render_with_stderr() {
        let text = envelope("", Some("Traceback")).render();
        assert!(text.ends_with("[stderr]\nTraceback"));
    }

    #[test]
    fn test_parse_keeps_multiline_output() {
        let original = envelope("line 1\n\nline 3\n", None);
        let parsed = OutputEnvelope::parse(&original.render()).unwrap();
        assert_eq!(parsed.program_output, "line 1\n\nline 3\n");
        assert_eq!(parsed.status_label, "AC");
        assert_eq!(parsed.memory_used_kb, 64.0);
        assert_eq!(parsed.stderr, None);
    }

    #[test]
    fn test_parse_splits_stderr() {
        let parsed = OutputEnvelope::parse(&envelope("partial", Some("boom")).render()).unwrap();
        assert_eq!(parsed.program_output, "partial");
        assert_eq!(parsed.stderr.as_deref(), Some("boom"));
    }

    #[test]
    fn test_render_with_stderr_header() {
        let text = envelope("ok\n", Some("warn")).render();
        assert_eq!(
            text,
            "Status: AC\nMemory: 64KB\nTime: 0.25s\nStderr: 4 bytes\n\nok\n\n\n[stderr]\nwarn"
        );
    }

    #[test]
    fn test_marker_in_stdout_stays_stdout() {
        let original = envelope("a\n\n[stderr]\nb", None);
        let parsed = OutputEnvelope::parse(&original.render()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_marker_in_both_streams() {
        let original = envelope("x\n\n[stderr]\ny", Some("z\n\n[stderr]\nw"));
        let parsed = OutputEnvelope::parse(&original.render()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_stderr_length_mismatch_rejected() {
        let blob = "Status: AC\nMemory: 64KB\nTime: 0.25s\nStderr: 99 bytes\n\nout\n\n[stderr]\nerr";
        assert!(OutputEnvelope::parse(blob).is_none());
    }

    #[test]
    fn test_version_one_blob_read_as_stdout() {
        let blob = "Status: AC\nMemory: 64KB\nTime: 0.25s\n\nout\n\n[stderr]\nerr";
        let parsed = OutputEnvelope::parse(blob).unwrap();
        assert_eq!(parsed.program_output, "out\n\n[stderr]\nerr");
        assert_eq!(parsed.stderr, None);
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert!(OutputEnvelope::parse("hello world").is_none());
        assert!(OutputEnvelope::parse("Error: Runtime Error\n\nmore").is_none());
    }
}
