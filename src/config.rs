//! Range configuration: which worksheet column holds which measurement.
//!
//! Callers supply a flat map of keys to A1 ranges (typically from a JSON
//! file). Several historical key spellings are in circulation per field, so
//! each semantic field carries a fixed alias list. Resolution is fail-fast:
//! a profile with a missing required field is a caller mistake and is
//! reported before any workbook is opened.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ranges::{RangeParseError, RangeRef};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing range for '{field}' (tried keys: {tried})")]
    MissingRange { field: &'static str, tried: String },

    #[error("invalid range '{text}' for '{field}': {source}")]
    InvalidRange {
        field: &'static str,
        text: String,
        source: RangeParseError,
    },

    #[error("failed to read range configuration {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse range configuration {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

const KONUS_DEPTH_KEYS: &[&str] = &["konus_depth", "y_range_depth", "depth"];
const KONUS_UNDIST_KEYS: &[&str] = &["konus_undist", "x_range_konus_undist", "undist"];
const KONUS_REMOULD_KEYS: &[&str] = &["konus_remould", "x_range_konus_remould", "remould"];
const ENAKS_DEPTH_KEYS: &[&str] = &["enaks_depth", "y_range_enaks_depth", "depth"];
const ENAKS_STRENGTH_KEYS: &[&str] = &["enaks_strength", "x_range_enaks_strength", "strength"];
const ENAKS_DEFORM_KEYS: &[&str] = &["enaks_deform", "x_range_enaks_deform", "deform"];
const WC_DEPTH_KEYS: &[&str] = &["wc_depth", "depth"];
const WC_VALUE_KEYS: &[&str] = &["wc", "water_content"];

/// Flat key-to-range mapping as supplied by the caller.
///
/// Keys are free-form; they only gain meaning through the per-profile alias
/// lists above. Empty or whitespace-only values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeConfig {
    ranges: BTreeMap<String, String>,
}

impl RangeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed ranges of the standard laboratory sheet layout.
    pub fn builtin_defaults() -> Self {
        let mut config = Self::new();
        config.set("depth", "F6:F30");
        config.set("konus_undist", "L6:L30");
        config.set("konus_remould", "M6:M30");
        config.set("enaks_strength", "G6:G30");
        config.set("enaks_deform", "H6:H30");
        config.set("wc", "K6:K30");
        config
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn set(&mut self, key: impl Into<String>, range: impl Into<String>) {
        self.ranges.insert(key.into(), range.into());
    }

    /// First alias with a non-empty value, if any.
    fn find(&self, keys: &[&'static str]) -> Option<(&'static str, &str)> {
        for key in keys {
            if let Some(value) = self.ranges.get(*key) {
                if !value.trim().is_empty() {
                    return Some((*key, value.as_str()));
                }
            }
        }
        None
    }

    /// Resolve one semantic field, naming the canonical field and the tried
    /// aliases on failure.
    fn resolve(&self, field: &'static str, keys: &[&'static str]) -> Result<RangeRef, ConfigError> {
        let (_, text) = self.find(keys).ok_or_else(|| ConfigError::MissingRange {
            field,
            tried: keys.join(", "),
        })?;
        RangeRef::parse(text).map_err(|source| ConfigError::InvalidRange {
            field,
            text: text.to_string(),
            source,
        })
    }
}

/// Ranges for a fall-cone (Konus) sheet. All fields required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KonusRanges {
    pub depth: RangeRef,
    pub undisturbed: RangeRef,
    pub remoulded: RangeRef,
}

impl KonusRanges {
    pub fn resolve(config: &RangeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            depth: config.resolve("depth", KONUS_DEPTH_KEYS)?,
            undisturbed: config.resolve("undisturbed strength", KONUS_UNDIST_KEYS)?,
            remoulded: config.resolve("remoulded strength", KONUS_REMOULD_KEYS)?,
        })
    }
}

/// Ranges for a uniaxial-compression (Enaks) sheet. All fields required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnaksRanges {
    pub depth: RangeRef,
    pub strength: RangeRef,
    pub deformation: RangeRef,
}

impl EnaksRanges {
    pub fn resolve(config: &RangeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            depth: config.resolve("depth", ENAKS_DEPTH_KEYS)?,
            strength: config.resolve("enaks strength", ENAKS_STRENGTH_KEYS)?,
            deformation: config.resolve("deformation at break", ENAKS_DEFORM_KEYS)?,
        })
    }
}

/// Ranges for a water-content sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterContentRanges {
    pub depth: RangeRef,
    pub water_content: RangeRef,
}

impl WaterContentRanges {
    pub fn resolve(config: &RangeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            depth: config.resolve("depth", WC_DEPTH_KEYS)?,
            water_content: config.resolve("water content", WC_VALUE_KEYS)?,
        })
    }
}
