//! Non-fatal status reporting.
//!
//! The engine never logs on its own. Whenever it decides to leave something
//! unmasked (a limit was hit, an embedded payload did not parse) it hands a
//! [`Diagnostic`] to a [`DiagnosticSink`] and carries on.
//!
//! Diagnostics describe *where* and *why*, never *what*: they carry limits and
//! positions, and never the text that was being processed.
//!
//! A sink must not route its output back through the masking pipeline it is
//! observing. Point it at a separate logger, a counter, or nothing at all.

use std::fmt;

/// A condition the engine recovered from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// An embedded JSON string was found at the depth limit and left as is.
    DepthLimitReached {
        /// The configured maximum.
        depth: usize,
    },
    /// No matching closing delimiter within the scan window.
    ScanWindowExceeded {
        /// The configured window, in characters.
        window: usize,
    },
    /// The text ended before the matching closing delimiter.
    UnterminatedJson,
    /// The extracted span was not valid JSON.
    EmbeddedParseFailed {
        /// Line reported by the parser, relative to the extracted span.
        line: usize,
        /// Column reported by the parser, relative to the extracted span.
        column: usize,
    },
    /// The masked embedded tree could not be serialized back to text.
    EmbeddedSerializeFailed,
    /// Masking was requested while the layer was not running.
    NotStarted,
}

impl Diagnostic {
    /// `true` for deliberate truncation of work, `false` for recovered failures.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            Self::DepthLimitReached { .. } | Self::ScanWindowExceeded { .. }
        )
    }

    /// Stable, machine-friendly name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DepthLimitReached { .. } => "depth_limit_reached",
            Self::ScanWindowExceeded { .. } => "scan_window_exceeded",
            Self::UnterminatedJson => "unterminated_json",
            Self::EmbeddedParseFailed { .. } => "embedded_parse_failed",
            Self::EmbeddedSerializeFailed => "embedded_serialize_failed",
            Self::NotStarted => "not_started",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthLimitReached { depth } => {
                write!(f, "embedded JSON depth limit of {depth} reached; nested text left unmasked")
            }
            Self::ScanWindowExceeded { window } => {
                write!(f, "no closing delimiter within {window} characters; text left unmasked")
            }
            Self::UnterminatedJson => {
                write!(f, "embedded JSON has no closing delimiter; text left unmasked")
            }
            Self::EmbeddedParseFailed { line, column } => {
                write!(f, "embedded JSON failed to parse at line {line} column {column}; text left unmasked")
            }
            Self::EmbeddedSerializeFailed => {
                write!(f, "masked embedded JSON could not be serialized; text left unmasked")
            }
            Self::NotStarted => {
                write!(f, "masking layer is not started; payload replaced by mask token")
            }
        }
    }
}

/// Receives diagnostics from the engine.
///
/// Implementations are called synchronously on the masking thread and must
/// not panic.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

/// Drops every diagnostic.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{Diagnostic, DiagnosticSink};

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |d: &Diagnostic| seen.lock().unwrap().push(d.clone());
        sink.report(&Diagnostic::UnterminatedJson);
        assert_eq!(*seen.lock().unwrap(), vec![Diagnostic::UnterminatedJson]);
    }

    #[test]
    fn limits_are_told_apart_from_failures() {
        assert!(Diagnostic::DepthLimitReached { depth: 10 }.is_limit());
        assert!(Diagnostic::ScanWindowExceeded { window: 5 }.is_limit());
        assert!(!Diagnostic::EmbeddedSerializeFailed.is_limit());
        assert!(!Diagnostic::NotStarted.is_limit());
    }

    #[test]
    fn display_mentions_the_limit() {
        let text = Diagnostic::ScanWindowExceeded { window: 100_000 }.to_string();
        assert!(text.contains("100000"));
    }
}
