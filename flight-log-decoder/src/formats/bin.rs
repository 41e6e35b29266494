//! Binary DataFlash log parser
//!
//! Each message starts with the sync bytes `0xA3 0x95` followed by a one-byte
//! type id and a fixed-size payload described by an earlier FMT message. The
//! parser learns formats as it goes and resynchronizes byte by byte when it hits
//! data it cannot frame (corrupt blocks, partially written pages, unknown types).

use super::message_format::{MessageFormat, FMT_TYPE, HEADER_LEN};
use super::LogFormat;
use crate::types::{Record, Result};
use std::collections::HashMap;

/// First sync byte of every binary message
pub const HEAD1: u8 = 0xA3;
/// Second sync byte of every binary message
pub const HEAD2: u8 = 0x95;

/// Parser over an in-memory binary DataFlash log
pub struct BinParser {
    data: Vec<u8>,
    offset: usize,
    formats: HashMap<u8, MessageFormat>,
    skipped_bytes: usize,
}

impl BinParser {
    /// Create a parser over the full contents of a `.bin` log
    pub fn new(data: Vec<u8>) -> Self {
        let mut parser = Self {
            data,
            offset: 0,
            formats: HashMap::new(),
            skipped_bytes: 0,
        };
        parser.reset_formats();
        parser
    }

    fn reset_formats(&mut self) {
        self.formats.clear();
        self.formats.insert(FMT_TYPE, MessageFormat::fmt());
    }

    fn report_skipped(&mut self) {
        if self.skipped_bytes > 0 {
            log::warn!(
                "Skipped {} bytes of unframed data before offset {}",
                self.skipped_bytes,
                self.offset
            );
            self.skipped_bytes = 0;
        }
    }
}

impl LogFormat for BinParser {
    fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if self.offset + HEADER_LEN > self.data.len() {
                self.report_skipped();
                return Ok(None);
            }

            let start = self.offset;
            let type_id = self.data[start + 2];
            let format = match self.formats.get(&type_id) {
                Some(format) if self.data[start] == HEAD1 && self.data[start + 1] == HEAD2 => format,
                _ => {
                    self.skipped_bytes += 1;
                    self.offset += 1;
                    continue;
                }
            };

            let end = start + format.length;
            if end > self.data.len() {
                log::debug!(
                    "Truncated {} message at offset {} ({} of {} bytes)",
                    format.name,
                    start,
                    self.data.len() - start,
                    format.length
                );
                self.offset = self.data.len();
                self.report_skipped();
                return Ok(None);
            }

            let name = format.name.clone();
            let decoded = format.decode_payload(&self.data[start + HEADER_LEN..end]);
            self.report_skipped();
            self.offset = end;

            let record = Record::new(name, decoded?);
            if type_id == FMT_TYPE {
                let learned = MessageFormat::from_fmt_record(&record)?;
                log::trace!(
                    "Learned format {} (type {}, {} bytes): {}",
                    learned.name,
                    learned.type_id,
                    learned.length,
                    learned.format
                );
                self.formats.insert(learned.type_id, learned);
            }

            return Ok(Some(record));
        }
    }

    fn rewind(&mut self) {
        self.offset = 0;
        self.skipped_bytes = 0;
        self.reset_formats();
    }
}
