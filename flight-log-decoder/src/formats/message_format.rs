//! FMT message definitions
//!
//! Every DataFlash log is self-describing: before a message type is used, a `FMT`
//! record declares its type id, total length, name, field format characters and
//! column names. `MessageFormat` holds one such declaration and knows how to turn a
//! payload (binary bytes or text fields) into typed values.

use crate::types::{DecoderError, FieldValue, Record, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// Type id reserved for FMT records
pub const FMT_TYPE: u8 = 0x80;

/// Size of the message header (two sync bytes plus the type id)
pub const HEADER_LEN: usize = 3;

/// A message definition learned from a FMT record
#[derive(Debug, Clone, PartialEq)]
pub struct MessageFormat {
    /// Message type id used in the binary header
    pub type_id: u8,
    /// Total message length in bytes, header included
    pub length: usize,
    /// Message name (e.g. "POWR")
    pub name: String,
    /// One format character per field
    pub format: String,
    /// Column names, same order as `format`
    pub columns: Vec<String>,
}

impl MessageFormat {
    /// Build a definition, checking that every format character is known and
    /// that there is one column per field
    pub fn new(
        type_id: u8,
        length: usize,
        name: impl Into<String>,
        format: impl Into<String>,
        columns: &str,
    ) -> Result<Self> {
        let name = name.into();
        let format = format.into();
        let columns: Vec<String> = columns
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        for c in format.chars() {
            if field_size(c).is_none() {
                return Err(DecoderError::LogParseError(format!(
                    "Unknown format character '{}' in FMT for {}",
                    c, name
                )));
            }
        }

        if columns.len() != format.len() {
            return Err(DecoderError::LogParseError(format!(
                "FMT for {} has {} format characters but {} columns",
                name,
                format.len(),
                columns.len()
            )));
        }

        Ok(Self {
            type_id,
            length,
            name,
            format,
            columns,
        })
    }

    /// The bootstrap definition of FMT itself
    pub fn fmt() -> Self {
        Self {
            type_id: FMT_TYPE,
            length: 89,
            name: "FMT".to_string(),
            format: "BBnNZ".to_string(),
            columns: ["Type", "Length", "Name", "Format", "Columns"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    /// Build a definition from a decoded FMT record
    pub fn from_fmt_record(record: &Record) -> Result<Self> {
        let number = |column: &str| -> Result<i64> {
            record.require(column)?.as_i64().ok_or_else(|| {
                DecoderError::InvalidData(format!("FMT {} is not numeric", column))
            })
        };
        let text = |column: &str| -> Result<String> {
            Ok(record.require(column)?.to_string())
        };

        let type_id = u8::try_from(number("Type")?).map_err(|_| {
            DecoderError::InvalidData("FMT Type does not fit in a byte".to_string())
        })?;
        let length = usize::try_from(number("Length")?).map_err(|_| {
            DecoderError::InvalidData("FMT Length is negative".to_string())
        })?;

        let format = Self::new(
            type_id,
            length,
            text("Name")?,
            text("Format")?,
            &text("Columns")?,
        )?;

        if format.length < HEADER_LEN + format.payload_len() {
            return Err(DecoderError::LogParseError(format!(
                "FMT for {} declares length {} but its fields need {}",
                format.name,
                format.length,
                HEADER_LEN + format.payload_len()
            )));
        }

        Ok(format)
    }

    /// Number of payload bytes the fields occupy
    pub fn payload_len(&self) -> usize {
        self.format.chars().filter_map(field_size).sum()
    }

    /// Decode a binary payload (the bytes following the header)
    pub fn decode_payload(&self, payload: &[u8]) -> Result<Vec<(String, FieldValue)>> {
        let mut rdr = payload;
        let mut fields = Vec::with_capacity(self.columns.len());

        for (c, column) in self.format.chars().zip(&self.columns) {
            let value = read_field(&mut rdr, c)?;
            fields.push((column.clone(), value));
        }

        Ok(fields)
    }

    /// Type the comma-separated values of a text log line
    pub fn parse_text_fields(&self, values: &[&str]) -> Result<Vec<(String, FieldValue)>> {
        if values.len() != self.columns.len() {
            return Err(DecoderError::InvalidData(format!(
                "{} expects {} fields, got {}",
                self.name,
                self.columns.len(),
                values.len()
            )));
        }

        self.format
            .chars()
            .zip(&self.columns)
            .zip(values)
            .map(|((c, column), raw)| Ok((column.clone(), parse_text_field(c, raw)?)))
            .collect()
    }
}

/// Payload size of a single format character
pub fn field_size(c: char) -> Option<usize> {
    let size = match c {
        'b' | 'B' | 'M' => 1,
        'h' | 'H' | 'c' | 'C' => 2,
        'i' | 'I' | 'f' | 'e' | 'E' | 'L' | 'n' => 4,
        'd' | 'q' | 'Q' => 8,
        'N' => 16,
        'Z' | 'a' => 64,
        _ => return None,
    };
    Some(size)
}

fn read_field(rdr: &mut &[u8], c: char) -> Result<FieldValue> {
    let value = match c {
        'b' => FieldValue::Int(rdr.read_i8()? as i64),
        'B' | 'M' => FieldValue::UInt(rdr.read_u8()? as u64),
        'h' => FieldValue::Int(rdr.read_i16::<LittleEndian>()? as i64),
        'H' => FieldValue::UInt(rdr.read_u16::<LittleEndian>()? as u64),
        'i' => FieldValue::Int(rdr.read_i32::<LittleEndian>()? as i64),
        'I' => FieldValue::UInt(rdr.read_u32::<LittleEndian>()? as u64),
        'q' => FieldValue::Int(rdr.read_i64::<LittleEndian>()?),
        'Q' => FieldValue::UInt(rdr.read_u64::<LittleEndian>()?),
        'f' => FieldValue::Float(rdr.read_f32::<LittleEndian>()? as f64),
        'd' => FieldValue::Float(rdr.read_f64::<LittleEndian>()?),
        'c' => FieldValue::Float(rdr.read_i16::<LittleEndian>()? as f64 * 0.01),
        'C' => FieldValue::Float(rdr.read_u16::<LittleEndian>()? as f64 * 0.01),
        'e' => FieldValue::Float(rdr.read_i32::<LittleEndian>()? as f64 * 0.01),
        'E' => FieldValue::Float(rdr.read_u32::<LittleEndian>()? as f64 * 0.01),
        'L' => FieldValue::Float(rdr.read_i32::<LittleEndian>()? as f64 * 1e-7),
        'n' | 'N' | 'Z' => {
            let mut buf = vec![0u8; field_size(c).unwrap_or(0)];
            rdr.read_exact(&mut buf)?;
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            FieldValue::Text(String::from_utf8_lossy(&buf[..end]).into_owned())
        }
        'a' => {
            let mut values = Vec::with_capacity(32);
            for _ in 0..32 {
                values.push(rdr.read_i16::<LittleEndian>()?);
            }
            FieldValue::Array(values)
        }
        other => {
            return Err(DecoderError::LogParseError(format!(
                "Unknown format character '{}'",
                other
            )))
        }
    };
    Ok(value)
}

fn parse_text_field(c: char, raw: &str) -> Result<FieldValue> {
    let invalid = || DecoderError::InvalidData(format!("cannot parse '{}' as '{}' field", raw, c));

    let value = match c {
        'b' | 'h' | 'i' | 'q' => FieldValue::Int(raw.parse().map_err(|_| invalid())?),
        'B' | 'H' | 'I' | 'M' | 'Q' => FieldValue::UInt(raw.parse().map_err(|_| invalid())?),
        'f' | 'd' | 'c' | 'C' | 'e' | 'E' | 'L' => {
            FieldValue::Float(raw.parse().map_err(|_| invalid())?)
        }
        _ => FieldValue::Text(raw.to_string()),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn powr() -> MessageFormat {
        MessageFormat::new(0x40, 3 + 8 + 4 + 4 + 2, "POWR", "QffH", "TimeUS,Vcc,VServo,Flags")
            .unwrap()
    }

    #[test]
    fn test_payload_len() {
        assert_eq!(powr().payload_len(), 18);
        assert_eq!(MessageFormat::fmt().payload_len(), 86);
    }

    #[test]
    fn test_unknown_format_char() {
        let result = MessageFormat::new(0x41, 10, "BAD", "Qx", "TimeUS,X");
        assert!(matches!(result, Err(DecoderError::LogParseError(_))));
    }

    #[test]
    fn test_column_count_mismatch() {
        let result = MessageFormat::new(0x41, 14, "BAD", "QH", "TimeUS");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_payload() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1_500_000u64.to_le_bytes());
        payload.extend_from_slice(&5.0f32.to_le_bytes());
        payload.extend_from_slice(&4.5f32.to_le_bytes());
        payload.extend_from_slice(&0x0003u16.to_le_bytes());

        let fields = powr().decode_payload(&payload).unwrap();
        assert_eq!(fields[0], ("TimeUS".to_string(), FieldValue::UInt(1_500_000)));
        assert_eq!(fields[1], ("Vcc".to_string(), FieldValue::Float(5.0)));
        assert_eq!(fields[3], ("Flags".to_string(), FieldValue::UInt(3)));
    }

    #[test]
    fn test_decode_short_payload_fails() {
        let result = powr().decode_payload(&[0u8; 4]);
        assert!(matches!(result, Err(DecoderError::IoError(_))));
    }

    #[test]
    fn test_scaled_and_text_fields() {
        let format = MessageFormat::new(0x42, 3 + 2 + 4 + 4, "TEST", "cLn", "A,Lat,Tag").unwrap();
        let mut payload = Vec::new();
        payload.extend_from_slice(&(-250i16).to_le_bytes());
        payload.extend_from_slice(&(-353_000_000i32).to_le_bytes());
        payload.extend_from_slice(b"AB\0\0");

        let fields = format.decode_payload(&payload).unwrap();
        assert_eq!(fields[0].1, FieldValue::Float(-2.5));
        match fields[1].1 {
            FieldValue::Float(lat) => assert!((lat + 35.3).abs() < 1e-9),
            ref other => panic!("unexpected {:?}", other),
        }
        assert_eq!(fields[2].1, FieldValue::Text("AB".to_string()));
    }

    #[test]
    fn test_parse_text_fields() {
        let fields = powr()
            .parse_text_fields(&["1500000", "5.01", "0", "3"])
            .unwrap();
        assert_eq!(fields[3].1, FieldValue::UInt(3));
        assert_eq!(fields[1].1, FieldValue::Float(5.01));

        assert!(powr().parse_text_fields(&["1", "2"]).is_err());
        assert!(powr().parse_text_fields(&["x", "5", "0", "3"]).is_err());
    }

    #[test]
    fn test_from_fmt_record_rejects_short_length() {
        let record = Record::new(
            "FMT",
            vec![
                ("Type".to_string(), FieldValue::UInt(0x40)),
                ("Length".to_string(), FieldValue::UInt(5)),
                ("Name".to_string(), FieldValue::Text("POWR".to_string())),
                ("Format".to_string(), FieldValue::Text("QffH".to_string())),
                ("Columns".to_string(), FieldValue::Text("TimeUS,Vcc,VServo,Flags".to_string())),
            ],
        );
        assert!(MessageFormat::from_fmt_record(&record).is_err());
    }
}
