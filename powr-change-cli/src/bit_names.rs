//! Power status bit names
//!
//! Static lookup from bit position to the `MAV_POWER_STATUS` enumerator name,
//! with an `UNKNOWN_BIT[n]` fallback for positions the enumeration does not define.

use std::borrow::Cow;

/// Number of bit positions in a flags mask
pub const BIT_COUNT: u32 = 32;

/// `MAV_POWER_STATUS` members as (mask value, name)
pub const MAV_POWER_STATUS: [(u32, &str); 6] = [
    (1, "MAV_POWER_STATUS_BRICK_VALID"),
    (2, "MAV_POWER_STATUS_SERVO_VALID"),
    (4, "MAV_POWER_STATUS_USB_CONNECTED"),
    (8, "MAV_POWER_STATUS_PERIPH_OVERCURRENT"),
    (16, "MAV_POWER_STATUS_PERIPH_HIPOWER_OVERCURRENT"),
    (32, "MAV_POWER_STATUS_CHANGED"),
];

/// Names indexed by bit position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitNameTable {
    names: [Option<&'static str>; BIT_COUNT as usize],
}

impl BitNameTable {
    /// A table with no known bits
    pub const fn empty() -> Self {
        Self {
            names: [None; BIT_COUNT as usize],
        }
    }

    /// The table for `MAV_POWER_STATUS`
    pub fn power_status() -> Self {
        MAV_POWER_STATUS
            .iter()
            .filter(|(mask, _)| mask.is_power_of_two())
            .fold(Self::empty(), |table, &(mask, name)| {
                table.with_name(mask.trailing_zeros(), name)
            })
    }

    /// Builder method: name a bit position (positions past 31 are ignored)
    pub fn with_name(mut self, bit: u32, name: &'static str) -> Self {
        if let Some(slot) = self.names.get_mut(bit as usize) {
            *slot = Some(name);
        }
        self
    }

    /// Known name of a bit position, if any
    pub fn name(&self, bit: u32) -> Option<&'static str> {
        self.names.get(bit as usize).copied().flatten()
    }

    /// Name of a bit position, or `UNKNOWN_BIT[n]`
    pub fn resolve(&self, bit: u32) -> Cow<'static, str> {
        match self.name(bit) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("UNKNOWN_BIT[{}]", bit)),
        }
    }
}

impl Default for BitNameTable {
    fn default() -> Self {
        Self::power_status()
    }
}
