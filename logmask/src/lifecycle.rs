//! Start/stop lifecycle for hosting a [`Masker`] inside a log pipeline.
//!
//! The host builds a [`MaskingLayer`] from raw settings, calls
//! [`MaskingLayer::start`] once during startup, and then routes every payload
//! through [`MaskingLayer::mask`]. Until `start` succeeds the layer fails
//! closed: payloads are replaced by a placeholder instead of passing through.

use std::sync::Arc;

use serde_json::Value;

use crate::{
    config::{ConfigError, MaskToken, MaskingSettings},
    diagnostics::{Diagnostic, DiagnosticSink, NoopSink},
    masking::{discard, MaskTree, Masker},
};

/// Placeholder used when no valid mask token is available.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// A masker with an explicit lifecycle.
///
/// `start` and `stop` take `&mut self`; once started, `mask` only needs `&self`
/// and the layer can be shared across threads.
///
/// ```rust
/// use logmask::{MaskingLayer, MaskingSettings};
/// use serde_json::json;
///
/// let mut layer = MaskingLayer::new(MaskingSettings {
///     field_names: Some("NAME".into()),
///     mask_token: Some("***".into()),
///     ..MaskingSettings::default()
/// });
/// layer.start().unwrap();
///
/// let mut event = json!({"NAME": "Doe", "level": "info"});
/// layer.mask(&mut event);
/// assert_eq!(event, json!({"NAME": "***", "level": "info"}));
/// ```
pub struct MaskingLayer {
    settings: MaskingSettings,
    sink: Arc<dyn DiagnosticSink>,
    running: Option<Masker>,
}

impl MaskingLayer {
    /// Creates a stopped layer that discards diagnostics.
    pub fn new(settings: MaskingSettings) -> Self {
        Self::with_sink(settings, NoopSink)
    }

    /// Creates a stopped layer that reports diagnostics to `sink`.
    pub fn with_sink<S>(settings: MaskingSettings, sink: S) -> Self
    where
        S: DiagnosticSink + 'static,
    {
        Self {
            settings,
            sink: Arc::new(sink),
            running: None,
        }
    }

    /// Validates the settings and builds the masker.
    ///
    /// Calling this on a running layer does nothing. On error the layer stays
    /// stopped and keeps failing closed.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.running.is_some() {
            return Ok(());
        }
        let config = self.settings.clone().into_config()?;
        self.running = Some(Masker::with_shared_sink(config, Arc::clone(&self.sink)));
        Ok(())
    }

    /// Drops the masker. Safe to call on a layer that never started.
    pub fn stop(&mut self) {
        self.running = None;
    }

    pub fn is_started(&self) -> bool {
        self.running.is_some()
    }

    /// The running masker, if any.
    pub fn masker(&self) -> Option<&Masker> {
        self.running.as_ref()
    }

    /// Masks `root` in place.
    ///
    /// When the layer is not running, any non-null `root` is replaced by the
    /// configured mask token (or [`REDACTED_PLACEHOLDER`] if the token itself
    /// is unusable) and [`Diagnostic::NotStarted`] is reported.
    pub fn mask(&self, root: &mut Value) {
        if let Some(masker) = &self.running {
            masker.mask(root);
            return;
        }

        self.sink.report(&Diagnostic::NotStarted);
        if !root.is_null() {
            let original = std::mem::replace(root, Value::String(self.fallback_token()));
            discard(original);
        }
    }

    fn fallback_token(&self) -> String {
        self.settings
            .mask_token
            .as_deref()
            .and_then(|token| MaskToken::new(token).ok())
            .map_or_else(
                || REDACTED_PLACEHOLDER.to_owned(),
                |token| token.as_str().to_owned(),
            )
    }
}

impl MaskTree for MaskingLayer {
    fn mask_tree(&self, root: &mut Value) {
        self.mask(root);
    }
}
