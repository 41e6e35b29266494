// End-to-end reads of hand-built binary DataFlash logs
use flight_log_decoder::clock::gps_to_unix;
use flight_log_decoder::{FieldValue, LogKind, LogReader, ReaderConfig};
use std::io::Write;

const POWR_TYPE: u8 = 0x40;
const GPS_TYPE: u8 = 0x41;

fn fixed(text: &str, width: usize) -> Vec<u8> {
    let mut buf = text.as_bytes().to_vec();
    buf.resize(width, 0);
    buf
}

fn fmt(type_id: u8, length: u8, name: &str, format: &str, columns: &str) -> Vec<u8> {
    let mut msg = vec![0xA3, 0x95, 0x80, type_id, length];
    msg.extend(fixed(name, 4));
    msg.extend(fixed(format, 16));
    msg.extend(fixed(columns, 64));
    msg
}

/// POWR as logged by current firmware: TimeUS,Vcc,VServo,Flags,AccFlags,Safety
fn powr(time_us: u64, flags: u16) -> Vec<u8> {
    let mut msg = vec![0xA3, 0x95, POWR_TYPE];
    msg.extend_from_slice(&time_us.to_le_bytes());
    msg.extend_from_slice(&5.02f32.to_le_bytes());
    msg.extend_from_slice(&0.0f32.to_le_bytes());
    msg.extend_from_slice(&flags.to_le_bytes());
    msg.extend_from_slice(&flags.to_le_bytes());
    msg.push(1);
    msg
}

fn gps(time_us: u64, status: u8, week_ms: u32, week: u16) -> Vec<u8> {
    let mut msg = vec![0xA3, 0x95, GPS_TYPE];
    msg.extend_from_slice(&time_us.to_le_bytes());
    msg.push(status);
    msg.extend_from_slice(&week_ms.to_le_bytes());
    msg.extend_from_slice(&week.to_le_bytes());
    msg
}

fn header() -> Vec<u8> {
    let mut data = fmt(0x80, 89, "FMT", "BBnNZ", "Type,Length,Name,Format,Columns");
    data.extend(fmt(POWR_TYPE, 24, "POWR", "QffHHB", "TimeUS,Vcc,VServo,Flags,AccFlags,Safety"));
    data.extend(fmt(GPS_TYPE, 18, "GPS", "QBIH", "TimeUS,Status,GMS,GWk"));
    data
}

fn write_log(suffix: &str, data: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn reads_powr_records_with_gps_time() {
    let mut data = header();
    data.extend(powr(1_000_000, 0));
    data.extend(gps(2_000_000, 1, 0, 0));
    data.extend(gps(3_000_000, 3, 20_000, 2200));
    data.extend(powr(4_000_000, 0b11));
    let file = write_log(".BIN", &data);

    let mut reader = LogReader::open(file.path(), ReaderConfig::new()).unwrap();
    assert_eq!(reader.kind(), LogKind::Binary);

    let powr: Vec<_> = reader.messages_of_type("POWR").map(|r| r.unwrap()).collect();
    assert_eq!(powr.len(), 2);
    assert_eq!(powr[0].get("Flags"), Some(&FieldValue::UInt(0)));
    assert_eq!(powr[1].get("Flags"), Some(&FieldValue::UInt(3)));

    let base = gps_to_unix(2200, 20_000.0) - 3.0;
    assert_eq!(powr[1].timestamp, Some(4.0 + base));
}

#[test]
fn sniffs_binary_without_extension_and_skips_garbage() {
    let mut data = header();
    data.extend([0xde, 0xad, 0xbe, 0xef, 0xA3]);
    data.extend(powr(1_500_000, 0b101));
    data.extend(&powr(2_500_000, 0)[..7]);
    let file = write_log("", &data);

    let config = ReaderConfig::new().with_type_filter(["POWR"]);
    let records: Vec<_> = LogReader::open(file.path(), config)
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("Flags").and_then(|v| v.as_u32_mask()), Some(5));
    assert_eq!(records[0].timestamp, Some(1.5));
}

#[test]
fn rejects_unrecognized_files() {
    let file = write_log(".dat", b"not a flight log");
    assert!(LogReader::open(file.path(), ReaderConfig::new()).is_err());
}
