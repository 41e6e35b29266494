//! Main reader API
//!
//! This module provides the primary interface for the decoder library.
//! The LogReader struct is the entry point for opening a log and pulling
//! decoded records out of it.

use crate::clock::Clock;
use crate::config::{ClockMode, ReaderConfig};
use crate::formats::{LogFormat, LogKind};
use crate::types::{Record, Result};
use std::fs;
use std::path::Path;

/// The main reader struct - entry point for all decoding operations
pub struct LogReader {
    parser: Box<dyn LogFormat>,
    kind: LogKind,
    config: ReaderConfig,
    clock: Clock,
}

impl LogReader {
    /// Open a DataFlash log and prepare it for reading
    ///
    /// The whole file is loaded into memory. The encoding is taken from the
    /// extension (`.bin`, `.log`) or recognized from the first bytes, and the
    /// log is scanned once for a GPS time base unless `ClockMode::Boot` is set.
    ///
    /// # Example
    /// ```no_run
    /// use flight_log_decoder::{LogReader, ReaderConfig};
    /// use std::path::Path;
    ///
    /// let mut reader = LogReader::open(Path::new("00000042.BIN"), ReaderConfig::new()).unwrap();
    /// while let Some(powr) = reader.recv_match("POWR").unwrap() {
    ///     println!("{:?}: {:?}", powr.timestamp, powr.get("Flags"));
    /// }
    /// ```
    pub fn open(path: &Path, config: ReaderConfig) -> Result<Self> {
        log::info!("Opening log file: {:?}", path);

        let data = fs::read(path)?;
        let kind = LogKind::detect(path, &data)?;
        log::debug!("Detected {:?} log ({} bytes)", kind, data.len());

        Self::from_bytes(data, kind, config)
    }

    /// Build a reader over log contents already in memory
    pub fn from_bytes(data: Vec<u8>, kind: LogKind, config: ReaderConfig) -> Result<Self> {
        let mut parser = kind.parser(data);

        let clock = match config.clock {
            ClockMode::GpsInterpolated => {
                let clock = Clock::scan(parser.as_mut())?;
                parser.rewind();
                clock
            }
            ClockMode::Boot => Clock::boot(),
        };

        Ok(Self {
            parser,
            kind,
            config,
            clock,
        })
    }

    /// Encoding of the log being read
    pub fn kind(&self) -> LogKind {
        self.kind
    }

    /// Clock used to timestamp records
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Pull the next record regardless of the type filter
    fn next_stamped(&mut self) -> Result<Option<Record>> {
        let Some(mut record) = self.parser.next_record()? else {
            return Ok(None);
        };
        record.timestamp = self.clock.timestamp(&record);
        Ok(Some(record))
    }

    /// Next record with the given message name, `Ok(None)` at end of log
    pub fn recv_match(&mut self, name: &str) -> Result<Option<Record>> {
        while let Some(record) = self.next_stamped()? {
            if record.name == name {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Lazy iterator over every record with the given message name
    pub fn messages_of_type(&mut self, name: impl Into<String>) -> MessagesOfType<'_> {
        MessagesOfType {
            reader: self,
            name: name.into(),
        }
    }

    /// Restart reading from the beginning of the log
    pub fn rewind(&mut self) {
        self.parser.rewind();
    }
}

impl Iterator for LogReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_stamped().transpose()? {
                Ok(record) if !self.config.should_emit(&record.name) => continue,
                other => return Some(other),
            }
        }
    }
}

/// Iterator returned by [`LogReader::messages_of_type`]
pub struct MessagesOfType<'a> {
    reader: &'a mut LogReader,
    name: String,
}

impl Iterator for MessagesOfType<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.recv_match(&self.name).transpose()
    }
}
