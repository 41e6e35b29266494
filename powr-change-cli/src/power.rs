//! POWR records
//!
//! Pulls power status records out of a log and reduces each one to the two
//! values the reporter needs: the flags mask and the timestamp.

use flight_log_decoder::{DecoderError, LogReader, Record, Timestamp};

/// Message name of power status records
pub const POWR: &str = "POWR";

/// Flags mask and capture time of one POWR record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerStatus {
    pub flags: u32,
    pub timestamp: Timestamp,
}

impl PowerStatus {
    pub fn new(flags: u32, timestamp: Timestamp) -> Self {
        Self { flags, timestamp }
    }
}

impl TryFrom<&Record> for PowerStatus {
    type Error = DecoderError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let flags = record.require("Flags")?.as_u32_mask().ok_or_else(|| {
            DecoderError::InvalidData(format!("{} Flags is not an integer", record.name))
        })?;
        Ok(Self::new(flags, record.timestamp_or_zero()))
    }
}

/// Lazy sequence of power status records from a log
pub struct PowerStatusSource {
    reader: LogReader,
}

impl PowerStatusSource {
    pub fn new(reader: LogReader) -> Self {
        Self { reader }
    }
}

impl Iterator for PowerStatusSource {
    type Item = flight_log_decoder::Result<PowerStatus>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.reader.recv_match(POWR).transpose()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        log::trace!("POWR at {:?}: Flags={:?}", record.timestamp, record.get("Flags"));
        Some(PowerStatus::try_from(&record))
    }
}
