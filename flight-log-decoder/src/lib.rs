//! Flight Log Decoder Library
//!
//! A small, reusable library for reading ArduPilot DataFlash logs (binary `.bin`
//! and text `.log`) as a stream of typed records.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Learns message layouts from the FMT records embedded in the log
//! - Decodes each message into named, typed fields
//! - Timestamps records from boot time, anchored to GPS time when available
//! - Lets callers pull records lazily, optionally filtered by message name
//!
//! The library does NOT:
//! - Track field value changes between records
//! - Interpret field values (flag names, units, modes)
//! - Write or modify logs
//!
//! All higher-level functionality is in the application layer (powr-change-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use flight_log_decoder::{LogReader, ReaderConfig};
//! use std::path::Path;
//!
//! let config = ReaderConfig::new().with_type_filter(["POWR"]);
//! let reader = LogReader::open(Path::new("00000042.BIN"), config).unwrap();
//!
//! for record in reader {
//!     match record {
//!         Ok(powr) => println!("{:?} Flags={:?}", powr.timestamp, powr.get("Flags")),
//!         Err(e) => eprintln!("Decode error: {}", e),
//!     }
//! }
//! ```

// Public modules
pub mod clock;
pub mod config;
pub mod formats;
pub mod reader;
pub mod types;

// Re-export main types for convenience
pub use clock::Clock;
pub use config::{ClockMode, ReaderConfig};
pub use formats::{LogKind, MessageFormat};
pub use reader::{LogReader, MessagesOfType};
pub use types::{DecoderError, FieldValue, Record, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
