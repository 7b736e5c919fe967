// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine configuration.

use serde::{Deserialize, Serialize};

/// How the converters treat NaN and infinities in float input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Store non-finite values unchanged.
    #[default]
    PassThrough,
    /// Fail conversion with [`crate::ConversionError::NonFinite`].
    Reject,
}

/// Tunables for conversion and batch building.
///
/// ```
/// use strata_core::{EngineConfig, NonFinitePolicy};
///
/// let config = EngineConfig::from_json(r#"{ "non_finite": "reject" }"#).unwrap();
/// assert_eq!(config.non_finite, NonFinitePolicy::Reject);
/// assert_eq!(config.max_batch_len, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Non-finite float handling.
    pub non_finite: NonFinitePolicy,
    /// Upper bound on instances per batch; `None` means unbounded.
    pub max_batch_len: Option<usize>,
}

impl EngineConfig {
    /// Parses a config from JSON; missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serializes the config as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Sets [`EngineConfig::non_finite`].
    pub fn with_non_finite(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    /// Sets [`EngineConfig::max_batch_len`].
    pub fn with_max_batch_len(mut self, max: usize) -> Self {
        self.max_batch_len = Some(max);
        self
    }
}
