//! Log file format parsers (binary and text DataFlash)
//!
//! This module contains parsers for the two DataFlash log encodings.
//! Each parser pulls one record at a time from an in-memory log.

use crate::types::{DecoderError, Record, Result};
use std::path::Path;

pub mod bin;
pub mod message_format;
pub mod text;

// Re-export parser types
pub use bin::BinParser;
pub use message_format::MessageFormat;
pub use text::TextParser;

/// Common trait for all log file parsers
///
/// Parsers yield records in file order, `Ok(None)` once the data is exhausted.
/// Timestamps are left unset; the reader's clock fills them in.
pub trait LogFormat {
    /// Pull the next record
    fn next_record(&mut self) -> Result<Option<Record>>;

    /// Restart from the beginning of the log, forgetting learned formats
    fn rewind(&mut self);
}

/// On-disk encoding of a DataFlash log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Binary `.bin` log as written by the autopilot
    Binary,
    /// Text `.log` export
    Text,
}

impl LogKind {
    /// Determine the encoding from the file extension, falling back to the
    /// first bytes of the file
    pub fn detect(path: &Path, data: &[u8]) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("bin") | Some("px4log") => Ok(LogKind::Binary),
            Some("log") | Some("txt") => Ok(LogKind::Text),
            _ => Self::sniff(data).ok_or_else(|| {
                DecoderError::UnsupportedFormat(format!(
                    "{:?} is neither a binary nor a text DataFlash log",
                    path
                ))
            }),
        }
    }

    /// Recognize a log from its leading bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[bin::HEAD1, bin::HEAD2]) {
            Some(LogKind::Binary)
        } else if data.starts_with(b"FMT,") {
            Some(LogKind::Text)
        } else {
            None
        }
    }

    /// Create the parser for this encoding
    pub fn parser(self, data: Vec<u8>) -> Box<dyn LogFormat> {
        match self {
            LogKind::Binary => Box::new(BinParser::new(data)),
            LogKind::Text => Box::new(TextParser::new(&String::from_utf8_lossy(&data))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(LogKind::detect(Path::new("00000042.BIN"), &[]).unwrap(), LogKind::Binary);
        assert_eq!(LogKind::detect(Path::new("flight.log"), &[]).unwrap(), LogKind::Text);
    }

    #[test]
    fn test_detect_by_content() {
        let binary = [0xA3, 0x95, 0x80];
        assert_eq!(LogKind::detect(Path::new("capture"), &binary).unwrap(), LogKind::Binary);
        assert_eq!(
            LogKind::detect(Path::new("capture.dat"), b"FMT, 128, 89").unwrap(),
            LogKind::Text
        );
    }

    #[test]
    fn test_unsupported_file_format() {
        let result = LogKind::detect(Path::new("notes.md"), b"# hello");
        assert!(matches!(result, Err(DecoderError::UnsupportedFormat(_))));
    }
}
