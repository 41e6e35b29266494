//! Record timestamps
//!
//! DataFlash records carry microseconds since boot (`TimeUS`, or `TimeMS` in older
//! logs). To turn those into wall-clock time the reader looks for the first GPS
//! record with a 3D fix and anchors boot time to the GPS week/millisecond it reports.

use crate::formats::LogFormat;
use crate::types::{Record, Result, Timestamp};

/// Unix time of the GPS epoch (1980-01-06 00:00:00 UTC)
pub const GPS_EPOCH_UNIX: f64 = 315_964_800.0;

/// GPS time runs ahead of UTC by the accumulated leap seconds
pub const GPS_LEAP_SECONDS: f64 = 18.0;

const SECONDS_PER_WEEK: f64 = 604_800.0;

/// Minimum GPS `Status` that carries a usable time (3D fix)
const GPS_FIX_3D: i64 = 3;

/// Convert GPS week and milliseconds-of-week to Unix seconds
pub fn gps_to_unix(week: i64, week_ms: f64) -> Timestamp {
    GPS_EPOCH_UNIX + week as f64 * SECONDS_PER_WEEK + week_ms * 0.001 - GPS_LEAP_SECONDS
}

/// Seconds since boot for a record, from `TimeUS` or `TimeMS`
pub fn boot_seconds(record: &Record) -> Option<f64> {
    if let Some(us) = record.get("TimeUS").and_then(|v| v.as_f64()) {
        return Some(us * 1e-6);
    }
    record.get("TimeMS").and_then(|v| v.as_f64()).map(|ms| ms * 1e-3)
}

/// Maps boot-relative record times onto a time base
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    timebase: f64,
}

impl Clock {
    /// Clock that reports seconds since boot
    pub fn boot() -> Self {
        Self { timebase: 0.0 }
    }

    /// Clock anchored on a GPS record, if it carries a 3D-fix time
    pub fn from_gps(record: &Record) -> Option<Self> {
        if record.name != "GPS" {
            return None;
        }

        let status = record.get("Status").and_then(|v| v.as_i64())?;
        let week = record.get("GWk").and_then(|v| v.as_i64())?;
        let week_ms = record.get("GMS").and_then(|v| v.as_f64())?;
        if status < GPS_FIX_3D || week <= 0 {
            return None;
        }

        let boot = boot_seconds(record)?;
        Some(Self {
            timebase: gps_to_unix(week, week_ms) - boot,
        })
    }

    /// Scan a log for the first usable GPS record, falling back to boot time
    pub fn scan(parser: &mut dyn LogFormat) -> Result<Self> {
        while let Some(record) = parser.next_record()? {
            if let Some(clock) = Self::from_gps(&record) {
                log::debug!("GPS time base found: {:.3}", clock.timebase);
                return Ok(clock);
            }
        }
        log::debug!("No GPS time base in log, using time since boot");
        Ok(Self::boot())
    }

    /// Offset added to boot seconds
    pub fn timebase(&self) -> f64 {
        self.timebase
    }

    /// Timestamp for a record, None if it has no time field
    pub fn timestamp(&self, record: &Record) -> Option<Timestamp> {
        boot_seconds(record).map(|boot| boot + self.timebase)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::boot()
    }
}
