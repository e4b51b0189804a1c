//! Tree masking: traversal, embedded JSON handling, and value replacement.
//!
//! This module ties the pieces together:
//!
//! - **`engine`**: the [`Masker`] entry point and the depth-guarded traversal
//! - **`scan`**: detection and bounded extraction of JSON embedded in text
//! - **`replace`**: what a matched field's value turns into
//!
//! Field names and the mask token come from `crate::config`.

mod engine;
mod replace;
pub mod scan;

pub use engine::{MaskTree, Masker};
pub use replace::mask_value;
pub(crate) use replace::discard;
