//! Field-name driven masking for structured log payloads.
//!
//! This crate separates:
//! - **Configuration**: which object keys are sensitive and what replaces them.
//! - **Masking**: walking a `serde_json::Value` tree and redacting those keys,
//!   including inside JSON that was stringified into a text value.
//!
//! Key rules:
//! - Matching is by exact, case-sensitive field name. There is no content
//!   based detection.
//! - A matched value is replaced wholesale. Arrays keep their length and
//!   objects keep their keys; every element or value becomes the mask token.
//! - Strings held by object fields that look like embedded JSON are parsed,
//!   masked, and spliced back, up to a fixed nesting depth.
//! - Masking never fails. Whatever cannot be processed is left as received and
//!   reported through a [`DiagnosticSink`].
//!
//! What this crate does not do:
//! - build log records or decide when to mask them
//! - load configuration files
//!
//! The `slog` feature (on by default) adds adapters for logging masked
//! payloads and engine diagnostics through `slog`.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::use_self,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod config;
mod diagnostics;
mod lifecycle;
pub mod masking;
#[cfg(feature = "slog")]
pub mod slog;

// Re-exports
pub use config::{
    ConfigError, FieldNames, Limits, MaskToken, MaskingConfig, MaskingSettings,
    MAX_EMBEDDED_DEPTH, MAX_FIELD_NAME_LEN, SCAN_WINDOW,
};
pub use diagnostics::{Diagnostic, DiagnosticSink, NoopSink};
pub use lifecycle::{MaskingLayer, REDACTED_PLACEHOLDER};
pub use masking::{mask_value, MaskTree, Masker};
