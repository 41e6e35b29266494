//! Reader configuration types
//!
//! This module defines the minimal configuration needed by the decoder library.
//! Anything that interprets field values (flag tracking, report formatting) is
//! handled by the application layer.

use serde::{Deserialize, Serialize};

/// How record timestamps are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// Anchor boot time to the first GPS fix so timestamps are Unix epoch seconds
    #[default]
    GpsInterpolated,
    /// Seconds since boot, straight from `TimeUS`/`TimeMS`
    Boot,
}

/// Configuration for the log reader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Optional: only emit records with these message names
    #[serde(default)]
    pub type_filter: Option<Vec<String>>,

    /// Timestamp derivation
    #[serde(default)]
    pub clock: ClockMode,
}

impl ReaderConfig {
    /// Create a new reader configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the message type filter
    pub fn with_type_filter<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_filter = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Builder method: set the clock mode
    pub fn with_clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }

    /// Check if a record with this message name should be emitted
    pub fn should_emit(&self, name: &str) -> bool {
        match &self.type_filter {
            Some(names) => names.iter().any(|n| n == name),
            None => true,
        }
    }
}
