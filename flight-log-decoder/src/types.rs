//! Core types for the flight log decoder library
//!
//! This module defines the fundamental types that the decoder emits when processing
//! DataFlash logs. The decoder is stateless with respect to field values: it only
//! outputs decoded records and never tracks how a field changes between records.

use std::fmt;

/// Timestamp type used throughout the decoder: seconds since the Unix epoch
/// (or since boot when the log carries no GPS time base)
pub type Timestamp = f64;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Failed to parse log file: {0}")]
    LogParseError(String),

    #[error("Unsupported log format: {0}")]
    UnsupportedFormat(String),

    #[error("Field not found: {field} in {message}")]
    FieldNotFound { message: String, field: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A single decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Signed integer (`b`, `h`, `i`, `q`)
    Int(i64),
    /// Unsigned integer (`B`, `H`, `I`, `M`, `Q`)
    UInt(u64),
    /// Floating-point value, including scaled integer types (`c`, `C`, `e`, `E`, `L`)
    Float(f64),
    /// Fixed-width character field with trailing NULs removed
    Text(String),
    /// Array of 32 signed 16-bit values (`a`)
    Array(Vec<i16>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::UInt(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
            FieldValue::Array(v) => write!(f, "{:?}", v),
        }
    }
}

impl FieldValue {
    /// Convert to f64 (None for text and arrays)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::UInt(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) | FieldValue::Array(_) => None,
        }
    }

    /// Convert to i64 if the value is numeric (floats are truncated)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::UInt(v) => Some(*v as i64),
            FieldValue::Float(v) => Some(*v as i64),
            FieldValue::Text(_) | FieldValue::Array(_) => None,
        }
    }

    /// Interpret the value as a bitmask, keeping only the low 32 bits
    pub fn as_u32_mask(&self) -> Option<u32> {
        match self {
            FieldValue::UInt(v) => Some(*v as u32),
            _ => self.as_i64().map(|v| v as u32),
        }
    }

    /// Borrow the text of a character field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A decoded log record - the primary output of the decoder
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Message name from the FMT definition (e.g. "POWR", "GPS")
    pub name: String,
    /// Decoded fields in column order
    pub fields: Vec<(String, FieldValue)>,
    /// Timestamp from the reader clock, None if the record carries no time field
    pub timestamp: Option<Timestamp>,
}

impl Record {
    /// Create a record without a timestamp
    pub fn new(name: impl Into<String>, fields: Vec<(String, FieldValue)>) -> Self {
        Self {
            name: name.into(),
            fields,
            timestamp: None,
        }
    }

    /// Look up a field by column name
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Look up a field, failing with `FieldNotFound` if it is absent
    pub fn require(&self, column: &str) -> Result<&FieldValue> {
        self.get(column).ok_or_else(|| DecoderError::FieldNotFound {
            message: self.name.clone(),
            field: column.to_string(),
        })
    }

    /// Timestamp, defaulting to 0.0 when absent
    pub fn timestamp_or_zero(&self) -> Timestamp {
        self.timestamp.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_conversions() {
        let int_val = FieldValue::Int(-2);
        assert_eq!(int_val.as_f64(), Some(-2.0));
        assert_eq!(int_val.as_i64(), Some(-2));
        assert_eq!(int_val.as_u32_mask(), Some(0xFFFF_FFFE));

        let float_val = FieldValue::Float(3.75);
        assert_eq!(float_val.as_i64(), Some(3));

        let wide = FieldValue::UInt(0x1_0000_0005);
        assert_eq!(wide.as_u32_mask(), Some(5));

        let text = FieldValue::Text("ArduCopter".to_string());
        assert_eq!(text.as_f64(), None);
        assert_eq!(text.as_str(), Some("ArduCopter"));
    }

    #[test]
    fn test_record_lookup() {
        let record = Record::new(
            "POWR",
            vec![
                ("TimeUS".to_string(), FieldValue::UInt(1000)),
                ("Flags".to_string(), FieldValue::UInt(3)),
            ],
        );
        assert_eq!(record.get("Flags"), Some(&FieldValue::UInt(3)));
        assert!(record.get("Vcc").is_none());
        assert!(matches!(
            record.require("Vcc"),
            Err(DecoderError::FieldNotFound { .. })
        ));
        assert_eq!(record.timestamp_or_zero(), 0.0);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Int(42).to_string(), "42");
        assert_eq!(FieldValue::Float(4.5).to_string(), "4.5");
        assert_eq!(FieldValue::Text("POWR".into()).to_string(), "POWR");
    }
}
