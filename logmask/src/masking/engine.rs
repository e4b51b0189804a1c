//! The masking engine: tree traversal plus the embedded JSON re-entry path.
//!
//! Object and array nesting is walked with an explicit work stack, so the shape
//! of the input tree never grows the call stack. The one recursive path is the
//! unwrapping of JSON that was stringified into a text value; its depth is
//! passed explicitly and capped by [`Limits::max_depth`](crate::Limits).

use std::{fmt, sync::Arc};

use serde_json::Value;

use super::{
    replace::mask_value,
    scan::{self, Candidate, JsonShape},
};
use crate::{
    config::MaskingConfig,
    diagnostics::{Diagnostic, DiagnosticSink, NoopSink},
};

/// Anything that can mask a JSON tree in place.
///
/// Implemented by [`Masker`] and by [`crate::MaskingLayer`], so integrations can
/// accept either.
pub trait MaskTree {
    fn mask_tree(&self, root: &mut Value);
}

/// Masks configured fields in JSON trees.
///
/// A `Masker` is immutable once built and is `Send + Sync`; share it between
/// threads with an `Arc`. Each call needs exclusive access to the tree it masks.
///
/// ```rust
/// use logmask::{Masker, MaskingConfig};
/// use serde_json::json;
///
/// let config = MaskingConfig::configure("NAME,ID", "[REDACTED]").unwrap();
/// let masker = Masker::new(config);
///
/// let mut event = json!({"NAME": "John Doe", "ID": "123", "age": 30});
/// masker.mask(&mut event);
/// assert_eq!(event, json!({"NAME": "[REDACTED]", "ID": "[REDACTED]", "age": 30}));
/// ```
#[derive(Clone)]
pub struct Masker {
    config: MaskingConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Masker {
    /// Creates a masker that discards diagnostics.
    pub fn new(config: MaskingConfig) -> Self {
        Self::with_shared_sink(config, Arc::new(NoopSink))
    }

    /// Creates a masker that reports diagnostics to `sink`.
    pub fn with_sink<S>(config: MaskingConfig, sink: S) -> Self
    where
        S: DiagnosticSink + 'static,
    {
        Self::with_shared_sink(config, Arc::new(sink))
    }

    pub fn with_shared_sink(config: MaskingConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    /// The validated configuration this masker applies.
    pub fn config(&self) -> &MaskingConfig {
        &self.config
    }

    /// Masks `root` in place.
    ///
    /// A `null` root is left as is. This never fails: whatever cannot be
    /// processed is left untouched and reported to the diagnostic sink.
    pub fn mask(&self, root: &mut Value) {
        self.traverse(root, 0);
    }

    /// Walks one tree. `depth` counts how many embedded JSON strings enclose it.
    fn traverse(&self, root: &mut Value, depth: usize) {
        let mut pending: Vec<&mut Value> = vec![root];

        while let Some(node) = pending.pop() {
            match node {
                Value::Array(items) => pending.extend(items.iter_mut()),
                Value::Object(fields) => {
                    for (name, value) in fields.iter_mut() {
                        // A matched field is replaced wholesale, never inspected.
                        if self.config.contains(name) {
                            let original = std::mem::take(value);
                            *value = mask_value(original, self.config.mask_token());
                        } else if let Value::String(text) = value {
                            if let JsonShape::Candidate(candidate) = scan::detect(text) {
                                self.unwrap_embedded(text, candidate, depth);
                            }
                        } else {
                            pending.push(value);
                        }
                    }
                }
                Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
            }
        }
    }

    /// Masks the JSON embedded in `text` and splices the result back in.
    ///
    /// On any failure `text` is left exactly as it was.
    fn unwrap_embedded(&self, text: &mut String, candidate: Candidate, depth: usize) {
        let limits = self.config.limits();
        if depth >= limits.max_depth {
            self.report(Diagnostic::DepthLimitReached {
                depth: limits.max_depth,
            });
            return;
        }

        let span = match scan::extract(text, candidate, limits.scan_window) {
            Ok(span) => span,
            Err(err) => {
                self.report(err.into());
                return;
            }
        };

        let mut nested: Value = match serde_json::from_str(&text[span.range()]) {
            Ok(nested) => nested,
            Err(err) => {
                self.report(Diagnostic::EmbeddedParseFailed {
                    line: err.line(),
                    column: err.column(),
                });
                return;
            }
        };

        self.traverse(&mut nested, depth + 1);

        match serde_json::to_string(&nested) {
            Ok(rendered) => text.replace_range(span.range(), &rendered),
            Err(_) => self.report(Diagnostic::EmbeddedSerializeFailed),
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        self.sink.report(&diagnostic);
    }
}

impl MaskTree for Masker {
    fn mask_tree(&self, root: &mut Value) {
        self.mask(root);
    }
}

impl fmt::Debug for Masker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Masker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};

    use super::Masker;
    use crate::{
        config::{Limits, MaskingConfig},
        diagnostics::Diagnostic,
    };

    fn masker(fields: &str) -> Masker {
        Masker::new(MaskingConfig::configure(fields, "[REDACTED]").unwrap())
    }

    fn recording(fields: &str, limits: Limits) -> (Masker, Arc<Mutex<Vec<Diagnostic>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let config = MaskingConfig::configure(fields, "[REDACTED]")
            .unwrap()
            .with_limits(limits)
            .unwrap();
        let masker = Masker::with_sink(config, move |d: &Diagnostic| {
            sink_seen.lock().unwrap().push(d.clone());
        });
        (masker, seen)
    }

    #[test]
    fn null_root_is_a_no_op() {
        let mut root = Value::Null;
        masker("NAME").mask(&mut root);
        assert_eq!(root, Value::Null);
    }

    #[test]
    fn scalar_root_is_untouched() {
        let mut root = json!("NAME");
        masker("NAME").mask(&mut root);
        assert_eq!(root, json!("NAME"));
    }

    #[test]
    fn fields_inside_arrays_are_masked() {
        let mut root = json!([{"NAME": "a"}, [{"NAME": "b"}], "c"]);
        masker("NAME").mask(&mut root);
        assert_eq!(
            root,
            json!([{"NAME": "[REDACTED]"}, [{"NAME": "[REDACTED]"}], "c"])
        );
    }

    #[test]
    fn matched_subtrees_are_not_descended() {
        let mut root = json!({"NAME": {"ID": "x", "inner": {"NAME": "y"}}});
        masker("NAME,ID").mask(&mut root);
        assert_eq!(
            root,
            json!({"NAME": {"ID": "[REDACTED]", "inner": "[REDACTED]"}})
        );
    }

    #[test]
    fn matched_string_is_never_parsed() {
        let (masker, seen) = recording("NAME", Limits::default());
        let mut root = json!({"NAME": "{\"broken\""});
        masker.mask(&mut root);
        assert_eq!(root, json!({"NAME": "[REDACTED]"}));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn embedded_json_is_masked_and_spliced() {
        let mut root = json!({"msg": "Response: {\"NAME\":\"Doe\"} done"});
        masker("NAME").mask(&mut root);
        assert_eq!(
            root,
            json!({"msg": "Response: {\"NAME\":\"[REDACTED]\"} done"})
        );
    }

    #[test]
    fn embedded_arrays_are_handled() {
        let mut root = json!({"msg": "rows=[{\"ID\":1},{\"ID\":2}]"});
        masker("ID").mask(&mut root);
        assert_eq!(
            root,
            json!({"msg": "rows=[{\"ID\":\"[REDACTED]\"},{\"ID\":\"[REDACTED]\"}]"})
        );
    }

    #[test]
    fn invalid_embedded_json_is_left_as_is() {
        let (masker, seen) = recording("NAME", Limits::default());
        let original = "oops {\"NAME\": Doe}";
        let mut root = json!({ "msg": original });
        masker.mask(&mut root);
        assert_eq!(root, json!({ "msg": original }));
        assert!(matches!(
            seen.lock().unwrap().as_slice(),
            [Diagnostic::EmbeddedParseFailed { .. }]
        ));
    }

    #[test]
    fn unterminated_embedded_json_is_reported() {
        let (masker, seen) = recording("NAME", Limits::default());
        let original = "{\"NAME\":{\"x\":1}";
        let mut root = json!({ "msg": original });
        masker.mask(&mut root);
        assert_eq!(root, json!({ "msg": original }));
        assert_eq!(*seen.lock().unwrap(), vec![Diagnostic::UnterminatedJson]);
    }

    #[test]
    fn depth_limit_stops_unwrapping() {
        let (masker, seen) = recording(
            "NAME",
            Limits {
                max_depth: 1,
                scan_window: 1_000,
            },
        );
        let inner = json!({"NAME": "two"}).to_string();
        let outer = json!({"NAME": "one", "inner": inner}).to_string();
        let mut root = json!({ "msg": outer });
        masker.mask(&mut root);

        let level_one: Value = serde_json::from_str(root["msg"].as_str().unwrap()).unwrap();
        assert_eq!(level_one["NAME"], "[REDACTED]");
        assert_eq!(level_one["inner"], inner);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Diagnostic::DepthLimitReached { depth: 1 }]
        );
    }

    #[test]
    fn scan_window_limits_extraction() {
        let (masker, seen) = recording(
            "NAME",
            Limits {
                max_depth: 10,
                scan_window: 8,
            },
        );
        let original = "{\"NAME\":\"Doe\"}";
        let mut root = json!({ "msg": original });
        masker.mask(&mut root);
        assert_eq!(root, json!({ "msg": original }));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Diagnostic::ScanWindowExceeded { window: 8 }]
        );
    }

    #[test]
    fn debug_output_hides_the_sink() {
        let rendered = format!("{:?}", masker("NAME"));
        assert!(rendered.starts_with("Masker"));
    }
}
