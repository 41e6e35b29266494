//! Flag tracking and state management
//!
//! Remembers the last power status mask seen and works out which bits changed
//! (old→new) when the next record arrives.

use crate::bit_names::BIT_COUNT;

/// A single bit that changed between two masks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitChange {
    /// Clear before, set now
    Set(u32),
    /// Set before, clear now
    Cleared(u32),
}

impl BitChange {
    /// Bit position of the change
    pub fn bit(&self) -> u32 {
        match self {
            BitChange::Set(bit) | BitChange::Cleared(bit) => *bit,
        }
    }
}

/// Difference between two consecutive flag masks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagDiff {
    pub previous: u32,
    pub current: u32,
}

impl FlagDiff {
    /// Changed bits in ascending bit order
    pub fn changes(&self) -> Vec<BitChange> {
        (0..BIT_COUNT)
            .filter_map(|bit| {
                let mask = 1u32 << bit;
                let was_set = self.previous & mask != 0;
                let is_set = self.current & mask != 0;
                match (was_set, is_set) {
                    (false, true) => Some(BitChange::Set(bit)),
                    (true, false) => Some(BitChange::Cleared(bit)),
                    _ => None,
                }
            })
            .collect()
    }
}

/// Last-seen flags mask
#[derive(Debug, Default)]
pub struct FlagTracker {
    current: Option<u32>,
}

impl FlagTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask of the most recently observed record, None before the first one
    pub fn current(&self) -> Option<u32> {
        self.current
    }

    /// Record a new mask, returning the diff against the previous one (0 before
    /// the first record) or None when nothing changed
    pub fn observe(&mut self, flags: u32) -> Option<FlagDiff> {
        let previous = self.current.replace(flags).unwrap_or(0);
        if previous == flags {
            return None;
        }
        Some(FlagDiff {
            previous,
            current: flags,
        })
    }
}
