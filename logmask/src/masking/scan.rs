//! Locating JSON that was stringified into a text value.
//!
//! Detection and extraction are two separate steps. [`detect`] is a cheap
//! heuristic that only says whether a text *might* contain an object or array
//! and where it would start. [`extract`] then runs a bounded, quote-aware scan
//! to find where it ends. Neither step checks that the region in between is
//! valid JSON; that is left to the parser.

use std::ops::Range;

use thiserror::Error;

use crate::diagnostics::Diagnostic;

/// The delimiter pair an embedded payload opens with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// `{` … `}`
    Brace,
    /// `[` … `]`
    Bracket,
}

impl Delimiter {
    pub fn open(self) -> char {
        match self {
            Self::Brace => '{',
            Self::Bracket => '[',
        }
    }

    pub fn close(self) -> char {
        match self {
            Self::Brace => '}',
            Self::Bracket => ']',
        }
    }
}

/// Where a possible embedded payload starts.
///
/// Only [`detect`] creates these, so `start` always points at `open` inside the
/// text it was produced from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    start: usize,
    open: Delimiter,
}

impl Candidate {
    /// Byte offset of the opening delimiter.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn delimiter(&self) -> Delimiter {
        self.open
    }
}

/// Result of the detection heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonShape {
    /// Plain text. Leave it alone.
    NotJsonLike,
    /// Worth scanning, starting at the given candidate.
    Candidate(Candidate),
}

/// Byte range of an extracted payload, closing delimiter included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Why [`extract`] gave up.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    #[error("text ended before the closing delimiter")]
    Unterminated,
    #[error("closing delimiter not found within {window} characters")]
    WindowExceeded { window: usize },
}

impl From<ScanError> for Diagnostic {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Unterminated => Self::UnterminatedJson,
            ScanError::WindowExceeded { window } => Self::ScanWindowExceeded { window },
        }
    }
}

/// Decides whether `text` may hold an embedded object or array.
///
/// A text qualifies when it is longer than one character and has an opening
/// brace before a closing brace, or an opening bracket before a closing
/// bracket. The candidate starts at whichever of the first `{` or first `[`
/// comes earlier.
pub fn detect(text: &str) -> JsonShape {
    if text.chars().nth(1).is_none() {
        return JsonShape::NotJsonLike;
    }

    let first_brace = text.find('{');
    let first_bracket = text.find('[');

    let encloses = |first: Option<usize>, close: char| match (first, text.rfind(close)) {
        (Some(open), Some(close)) => open < close,
        _ => false,
    };
    if !encloses(first_brace, '}') && !encloses(first_bracket, ']') {
        return JsonShape::NotJsonLike;
    }

    let candidate = match (first_brace, first_bracket) {
        (Some(brace), Some(bracket)) if bracket < brace => Candidate {
            start: bracket,
            open: Delimiter::Bracket,
        },
        (Some(brace), _) => Candidate {
            start: brace,
            open: Delimiter::Brace,
        },
        (None, Some(bracket)) => Candidate {
            start: bracket,
            open: Delimiter::Bracket,
        },
        (None, None) => return JsonShape::NotJsonLike,
    };
    JsonShape::Candidate(candidate)
}

/// Finds the delimiter that closes `candidate`.
///
/// Delimiters inside double-quoted segments are ignored and a backslash
/// escapes the character after it. Only the candidate's own delimiter pair
/// affects nesting depth. At most `window` characters are inspected, starting
/// with the opening delimiter.
pub fn extract(text: &str, candidate: Candidate, window: usize) -> Result<Span, ScanError> {
    let open = candidate.open.open();
    let close = candidate.open.close();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (inspected, (offset, ch)) in text[candidate.start..].char_indices().enumerate() {
        if inspected >= window {
            return Err(ScanError::WindowExceeded { window });
        }
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let start = candidate.start;
                    return Ok(Span {
                        start,
                        end: start + offset + c.len_utf8(),
                    });
                }
            }
            _ => {}
        }
    }

    Err(ScanError::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::{detect, extract, Candidate, Delimiter, JsonShape, ScanError, Span};

    fn candidate(text: &str) -> Candidate {
        match detect(text) {
            JsonShape::Candidate(candidate) => candidate,
            JsonShape::NotJsonLike => panic!("expected a candidate in {text:?}"),
        }
    }

    fn extracted(text: &str) -> &str {
        let span = extract(text, candidate(text), 100_000).unwrap();
        &text[span.range()]
    }

    #[test]
    fn plain_text_is_not_json_like() {
        assert_eq!(detect(""), JsonShape::NotJsonLike);
        assert_eq!(detect("{"), JsonShape::NotJsonLike);
        assert_eq!(detect("hello world"), JsonShape::NotJsonLike);
        assert_eq!(detect("closing first } then {"), JsonShape::NotJsonLike);
        assert_eq!(detect("only open { and ["), JsonShape::NotJsonLike);
    }

    #[test]
    fn two_characters_are_enough() {
        assert_eq!(
            detect("{}"),
            JsonShape::Candidate(Candidate {
                start: 0,
                open: Delimiter::Brace
            })
        );
    }

    #[test]
    fn earliest_opening_delimiter_wins() {
        let c = candidate("ids [1, 2] then {\"a\":1}");
        assert_eq!(c.delimiter(), Delimiter::Bracket);
        assert_eq!(c.start(), 4);

        let c = candidate("obj {\"a\":[1]}");
        assert_eq!(c.delimiter(), Delimiter::Brace);
        assert_eq!(c.start(), 4);
    }

    #[test]
    fn extraction_stops_at_the_matching_delimiter() {
        assert_eq!(
            extracted("Response: {\"a\":{\"b\":1}} trailing }"),
            "{\"a\":{\"b\":1}}"
        );
        assert_eq!(extracted("list [[1],[2]] end"), "[[1],[2]]");
    }

    #[test]
    fn delimiters_inside_strings_are_ignored() {
        assert_eq!(
            extracted(r#"x {"a":"}{","b":"]"} y"#),
            r#"{"a":"}{","b":"]"}"#
        );
    }

    #[test]
    fn escaped_quotes_do_not_end_a_string() {
        assert_eq!(
            extracted(r#"{"a":"say \"}\" please"} tail"#),
            r#"{"a":"say \"}\" please"}"#
        );
    }

    #[test]
    fn spans_are_byte_offsets() {
        let text = "né {\"k\":\"é\"} ok";
        let span = extract(text, candidate(text), 100).unwrap();
        assert_eq!(span, Span { start: 4, end: 14 });
        assert_eq!(&text[span.range()], "{\"k\":\"é\"}");
    }

    #[test]
    fn unterminated_payload_is_reported() {
        let text = "{\"a\":{\"b\":1}";
        assert_eq!(
            extract(text, candidate(text), 100),
            Err(ScanError::Unterminated)
        );
    }

    #[test]
    fn scan_stops_at_the_window() {
        let text = format!("{{\"a\":\"{}\"}}", "x".repeat(50));
        let c = candidate(&text);
        assert_eq!(
            extract(&text, c, 10),
            Err(ScanError::WindowExceeded { window: 10 })
        );
        assert!(extract(&text, c, text.len()).is_ok());
    }

    #[test]
    fn closing_delimiter_may_be_the_last_character_in_the_window() {
        // 7 characters, the last one closes the object.
        let text = r#"{"a":1}"#;
        let c = candidate(text);
        assert_eq!(extract(text, c, 7).unwrap().range(), 0..7);
        assert_eq!(
            extract(text, c, 6),
            Err(ScanError::WindowExceeded { window: 6 })
        );
    }

    #[test]
    fn window_counts_characters_not_bytes() {
        // The payload is 48 characters but 88 bytes long.
        let payload = format!("{{\"a\":\"{}\"}}", "é".repeat(40));
        let text = format!("ключ: {payload} конец");
        let c = candidate(&text);

        let span = extract(&text, c, 48).unwrap();
        assert_eq!(&text[span.range()], payload);
        assert_eq!(
            extract(&text, c, 47),
            Err(ScanError::WindowExceeded { window: 47 })
        );
    }

    #[test]
    fn window_starts_at_the_opening_delimiter() {
        // A long multibyte prefix does not eat into the window.
        let text = format!("{} [1,2]", "日".repeat(500));
        let c = candidate(&text);
        assert_eq!(&text[extract(&text, c, 5).unwrap().range()], "[1,2]");
    }
}
