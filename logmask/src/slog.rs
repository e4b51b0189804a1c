//! Adapters for emitting masked payloads and engine diagnostics through `slog`.
//!
//! This module connects the masking engine with `slog` in two directions:
//!
//! - [`IntoMaskedJson`] turns any `Serialize` value into a `slog::Value` whose
//!   logged form is the masked JSON tree, never the original.
//! - [`SlogSink`] forwards [`Diagnostic`]s to a logger of their own.
//!
//! It does not configure `slog` or decide which records get masked.

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Logger, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink},
    masking::MaskTree,
};

/// Logged in place of a payload that could not be turned into JSON.
pub const SERIALIZE_FAILED_PLACEHOLDER: &str = "Failed to serialize value for masking";

/// A `slog::Value` that emits an already-masked payload as structured JSON.
///
/// The payload is stored as a `serde_json::Value` and emitted via `slog`'s
/// nested-value support.
pub struct MaskedJson {
    value: JsonValue,
}

impl MaskedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The masked tree that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for MaskedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts values into a `slog::Value` that logs their masked form as JSON.
///
/// ## Example
/// ```ignore
/// use logmask::slog::IntoMaskedJson;
///
/// info!(logger, "request"; "payload" => request.into_masked_json(&masker));
/// ```
pub trait IntoMaskedJson: Serialize + Sized {
    /// Serializes `self` to a JSON tree, masks it, and wraps the result.
    ///
    /// If `self` cannot be represented as JSON, the logged value is
    /// [`SERIALIZE_FAILED_PLACEHOLDER`] rather than anything derived from the
    /// original.
    fn into_masked_json<M>(self, masker: &M) -> MaskedJson
    where
        M: MaskTree + ?Sized,
    {
        match serde_json::to_value(&self) {
            Ok(mut tree) => {
                masker.mask_tree(&mut tree);
                MaskedJson::new(tree)
            }
            Err(_) => MaskedJson::new(JsonValue::String(SERIALIZE_FAILED_PLACEHOLDER.to_owned())),
        }
    }
}

impl<T> IntoMaskedJson for T where T: Serialize {}

/// Reports engine diagnostics to a dedicated `slog::Logger`.
///
/// Give it a logger that writes somewhere other than the masked pipeline;
/// otherwise a diagnostic would be masked by the engine that produced it.
/// Limit hits are logged at `debug`, recovered failures at `warn`.
pub struct SlogSink {
    logger: Logger,
}

impl SlogSink {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl DiagnosticSink for SlogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        if diagnostic.is_limit() {
            slog::debug!(self.logger, "{}", diagnostic; "kind" => diagnostic.kind());
        } else {
            slog::warn!(self.logger, "{}", diagnostic; "kind" => diagnostic.kind());
        }
    }
}
