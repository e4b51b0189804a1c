//! Field matcher configuration: which keys are sensitive and what replaces them.
//!
//! Everything here is validated once, up front. A [`MaskingConfig`] only exists
//! if the mask token is non-blank and at least one usable field name survived
//! cleaning, so the engine never has to re-check its own inputs.
//!
//! Field names are matched exactly and case-sensitively. `"Name"` and `"NAME"`
//! are different fields.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

/// Longest accepted field name, in characters, after cleaning.
pub const MAX_FIELD_NAME_LEN: usize = 50;

/// Default bound on re-entry into embedded JSON strings.
pub const MAX_EMBEDDED_DEPTH: usize = 10;

/// Default number of characters inspected when looking for a closing delimiter.
pub const SCAN_WINDOW: usize = 100_000;

/// Reasons a configuration is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The mask token was absent or contained only whitespace.
    #[error("mask token is missing or blank")]
    MissingMaskToken,

    /// The field-name list was absent or contained only whitespace.
    #[error("field name list is missing or blank")]
    MissingFieldNames,

    /// Every entry of the field-name list was discarded during cleaning.
    #[error("no valid field names remain after cleaning")]
    NoValidFieldNames,

    /// A limit was set to zero.
    #[error("limit `{name}` must be greater than zero")]
    InvalidLimits {
        /// Which limit was rejected.
        name: &'static str,
    },
}

/// The cleaned, immutable set of sensitive field names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldNames {
    names: HashSet<String>,
}

impl FieldNames {
    /// Parses a comma-separated list of field names.
    ///
    /// Each entry is trimmed and stripped of every character outside
    /// `[A-Za-z0-9_]`. Entries that end up empty or longer than
    /// [`MAX_FIELD_NAME_LEN`] are dropped.
    pub fn parse(raw_csv: &str) -> Result<Self, ConfigError> {
        if raw_csv.trim().is_empty() {
            return Err(ConfigError::MissingFieldNames);
        }

        let names: HashSet<String> = raw_csv
            .split(',')
            .map(clean_field_name)
            .filter(|name| !name.is_empty() && name.chars().count() <= MAX_FIELD_NAME_LEN)
            .collect();

        if names.is_empty() {
            return Err(ConfigError::NoValidFieldNames);
        }

        Ok(Self { names })
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of distinct names left after cleaning.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false` for a successfully parsed set.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The cleaned names, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn clean_field_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect()
}

/// Replacement text for redacted values. Never blank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskToken(String);

impl MaskToken {
    /// Accepts the token verbatim as long as it is not blank.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::MissingMaskToken);
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MaskToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Work bounds for the embedded JSON path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// How many embedded JSON strings may be unwrapped inside one another.
    pub max_depth: usize,
    /// How many characters the delimiter scanner inspects before giving up.
    pub scan_window: usize,
}

impl Limits {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidLimits { name: "max_depth" });
        }
        if self.scan_window == 0 {
            return Err(ConfigError::InvalidLimits {
                name: "scan_window",
            });
        }
        Ok(self)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: MAX_EMBEDDED_DEPTH,
            scan_window: SCAN_WINDOW,
        }
    }
}

/// A validated configuration, ready to drive a [`crate::Masker`].
#[derive(Clone, Debug)]
pub struct MaskingConfig {
    field_names: FieldNames,
    mask_token: MaskToken,
    limits: Limits,
}

impl MaskingConfig {
    /// Validates a field-name CSV and mask token using the default [`Limits`].
    ///
    /// The mask token is checked before the field names.
    pub fn configure(raw_field_names_csv: &str, mask_token: &str) -> Result<Self, ConfigError> {
        let mask_token = MaskToken::new(mask_token)?;
        let field_names = FieldNames::parse(raw_field_names_csv)?;
        Ok(Self {
            field_names,
            mask_token,
            limits: Limits::default(),
        })
    }

    /// Replaces the default limits.
    pub fn with_limits(mut self, limits: Limits) -> Result<Self, ConfigError> {
        self.limits = limits.validate()?;
        Ok(self)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.field_names.contains(field_name)
    }

    /// The cleaned set of sensitive field names.
    pub fn field_names(&self) -> &FieldNames {
        &self.field_names
    }

    pub fn mask_token(&self) -> &MaskToken {
        &self.mask_token
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}

/// Raw, unvalidated settings as they arrive from the host application.
///
/// Any serde format works; absent keys deserialize to `None` and are treated
/// the same way as blank values.
///
/// ```rust
/// use logmask::MaskingSettings;
///
/// let settings: MaskingSettings = serde_json::from_str(
///     r#"{"field_names": "NAME, ID", "mask_token": "[REDACTED]"}"#,
/// ).unwrap();
/// let config = settings.into_config().unwrap();
/// assert!(config.contains("NAME"));
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskingSettings {
    /// Comma-separated field names.
    pub field_names: Option<String>,
    /// Replacement text.
    pub mask_token: Option<String>,
    /// Overrides [`MAX_EMBEDDED_DEPTH`].
    pub max_depth: Option<usize>,
    /// Overrides [`SCAN_WINDOW`].
    pub scan_window: Option<usize>,
}

impl MaskingSettings {
    /// Runs the full validation and produces a [`MaskingConfig`].
    pub fn into_config(self) -> Result<MaskingConfig, ConfigError> {
        let mask_token = self.mask_token.ok_or(ConfigError::MissingMaskToken)?;
        let field_names = self.field_names.ok_or(ConfigError::MissingFieldNames)?;
        let defaults = Limits::default();
        let limits = Limits {
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            scan_window: self.scan_window.unwrap_or(defaults.scan_window),
        };
        MaskingConfig::configure(&field_names, &mask_token)?.with_limits(limits)
    }
}
