//! Text DataFlash log parser
//!
//! Text logs (`.log`) carry the same messages as binary logs, one per line:
//!
//! ```text
//! FMT, 128, 89, FMT, BBnNZ, Type,Length,Name,Format,Columns
//! FMT, 64, 21, POWR, QffH, TimeUS,Vcc,VServo,Flags
//! POWR, 1500000, 5.01, 0, 3
//! ```

use super::message_format::MessageFormat;
use super::LogFormat;
use crate::types::{DecoderError, FieldValue, Record, Result};
use std::collections::{HashMap, HashSet};

/// Parser over an in-memory text DataFlash log
pub struct TextParser {
    lines: Vec<String>,
    line_index: usize,
    formats: HashMap<String, MessageFormat>,
    warned: HashSet<String>,
}

impl TextParser {
    /// Create a parser over the full contents of a `.log` file
    pub fn new(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
            line_index: 0,
            formats: HashMap::new(),
            warned: HashSet::new(),
        }
    }

    fn parse_fmt(values: &[&str], line_no: usize) -> Result<(MessageFormat, Record)> {
        if values.len() < 5 {
            return Err(DecoderError::LogParseError(format!(
                "Line {}: FMT needs at least 5 fields, got {}",
                line_no,
                values.len()
            )));
        }

        let number = |raw: &str| -> Result<u64> {
            raw.parse().map_err(|_| {
                DecoderError::LogParseError(format!("Line {}: bad FMT number '{}'", line_no, raw))
            })
        };
        let type_id = number(values[0])?;
        let length = number(values[1])?;
        let columns = values[4..].join(",");

        let record = Record::new(
            "FMT",
            vec![
                ("Type".to_string(), FieldValue::UInt(type_id)),
                ("Length".to_string(), FieldValue::UInt(length)),
                ("Name".to_string(), FieldValue::Text(values[2].to_string())),
                ("Format".to_string(), FieldValue::Text(values[3].to_string())),
                ("Columns".to_string(), FieldValue::Text(columns.clone())),
            ],
        );

        let format = u8::try_from(type_id)
            .map_err(|_| {
                DecoderError::LogParseError(format!("Line {}: FMT type {} out of range", line_no, type_id))
            })
            .and_then(|type_id| {
                MessageFormat::new(type_id, length as usize, values[2], values[3], &columns)
            })?;

        Ok((format, record))
    }
}

/// Warn once per message name about lines that cannot be typed
fn warn_once(warned: &mut HashSet<String>, name: &str, reason: &str) {
    if warned.insert(name.to_string()) {
        log::warn!("Skipping {} lines: {}", name, reason);
    }
}

impl LogFormat for TextParser {
    fn next_record(&mut self) -> Result<Option<Record>> {
        while self.line_index < self.lines.len() {
            let line_no = self.line_index + 1;
            self.line_index += 1;

            let line = &self.lines[line_no - 1];
            if let Some(record) = parse_line(line, line_no, &mut self.formats, &mut self.warned)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    fn rewind(&mut self) {
        self.line_index = 0;
        self.formats.clear();
    }
}

fn parse_line(
    line: &str,
    line_no: usize,
    formats: &mut HashMap<String, MessageFormat>,
    warned: &mut HashSet<String>,
) -> Result<Option<Record>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    let (name, values) = (parts[0], &parts[1..]);

    if name == "FMT" {
        let (format, record) = TextParser::parse_fmt(values, line_no)?;
        log::trace!("Learned format {} from line {}", format.name, line_no);
        formats.insert(format.name.clone(), format);
        return Ok(Some(record));
    }

    let Some(format) = formats.get(name) else {
        warn_once(warned, name, "no FMT definition");
        return Ok(None);
    };

    if values.len() != format.columns.len() {
        let reason = format!(
            "expected {} fields, line {} has {}",
            format.columns.len(),
            line_no,
            values.len()
        );
        warn_once(warned, name, &reason);
        return Ok(None);
    }

    let fields = format.parse_text_fields(values).map_err(|e| {
        DecoderError::LogParseError(format!("Line {}: {}", line_no, e))
    })?;

    Ok(Some(Record::new(name, fields)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
FMT, 128, 89, FMT, BBnNZ, Type,Length,Name,Format,Columns
FMT, 64, 21, POWR, QffH, TimeUS,Vcc,VServo,Flags

POWR, 1500000, 5.01, 0, 3
MODE, 1600000, 4
POWR, 1700000, 5.00, 0
POWR, 1800000, 4.99, 0, 1
";

    fn collect(parser: &mut TextParser) -> Vec<Record> {
        let mut records = Vec::new();
        while let Some(record) = parser.next_record().unwrap() {
            records.push(record);
        }
        records
    }

    #[test]
    fn test_parse_text_log() {
        let mut parser = TextParser::new(LOG);
        let records = collect(&mut parser);

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["FMT", "FMT", "POWR", "POWR"]);
        assert_eq!(records[2].get("Flags"), Some(&FieldValue::UInt(3)));
        assert_eq!(records[3].get("TimeUS"), Some(&FieldValue::UInt(1_800_000)));
        assert_eq!(
            records[1].get("Columns"),
            Some(&FieldValue::Text("TimeUS,Vcc,VServo,Flags".to_string()))
        );
    }

    #[test]
    fn test_rewind() {
        let mut parser = TextParser::new(LOG);
        let first = collect(&mut parser);
        parser.rewind();
        assert_eq!(collect(&mut parser), first);
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let mut parser = TextParser::new(
            "FMT, 64, 21, POWR, QffH, TimeUS,Vcc,VServo,Flags\nPOWR, abc, 5.0, 0, 1\n",
        );
        parser.next_record().unwrap();
        let err = parser.next_record().unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_bad_fmt_is_an_error() {
        let mut parser = TextParser::new("FMT, 64, 21, POWR\n");
        assert!(parser.next_record().is_err());
    }
}
