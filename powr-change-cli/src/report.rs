//! Report generation
//!
//! Formats one line per flags change:
//!
//! ```text
//! 2024-03-01 14:02:11.37:  +MAV_POWER_STATUS_USB_CONNECTED -UNKNOWN_BIT[9]
//! ```

use crate::bit_names::BitNameTable;
use crate::power::PowerStatus;
use crate::state::{BitChange, FlagDiff, FlagTracker};
use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use std::io::Write;

/// Local date and time to the second, followed by hundredths
pub fn format_timestamp(timestamp: f64) -> String {
    let secs = timestamp.floor() as i64;
    let date_time = Local
        .timestamp_opt(secs, 0)
        .earliest()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string());
    let hundredths = ((timestamp * 100.0) as i64).rem_euclid(100);
    format!("{}.{:02}", date_time, hundredths)
}

/// ` +NAME` / ` -NAME` tokens for every changed bit, in bit order
pub fn format_diff(diff: &FlagDiff, names: &BitNameTable) -> String {
    diff.changes()
        .into_iter()
        .map(|change| {
            let sign = match change {
                BitChange::Set(_) => '+',
                BitChange::Cleared(_) => '-',
            };
            format!(" {}{}", sign, names.resolve(change.bit()))
        })
        .collect()
}

/// Full output line for one changed record
pub fn format_line(timestamp: f64, diff: &str) -> String {
    format!("{}: {}", format_timestamp(timestamp), diff)
}

/// Emit a wall-clock progress line
pub fn progress<W: Write>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{}: {}", Utc::now().timestamp(), text).context("Failed to write output")?;
    Ok(())
}

/// Print a line for every record whose flags differ from the previous record's.
/// Returns the number of lines printed.
pub fn report_changes<I, W>(source: I, names: &BitNameTable, out: &mut W) -> Result<usize>
where
    I: IntoIterator<Item = flight_log_decoder::Result<PowerStatus>>,
    W: Write,
{
    let mut tracker = FlagTracker::new();
    let mut records = 0usize;
    let mut lines = 0usize;

    for status in source {
        let status = status.context("Failed to read POWR record")?;
        records += 1;

        let Some(diff) = tracker.observe(status.flags) else {
            continue;
        };

        let line = format_line(status.timestamp, &format_diff(&diff, names));
        writeln!(out, "{}", line).context("Failed to write output")?;
        lines += 1;
    }

    log::info!("Processed {} POWR records, {} flag changes", records, lines);
    log::debug!("Final flags: {:?}", tracker.current());
    Ok(lines)
}
