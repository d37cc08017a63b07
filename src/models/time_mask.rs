//! Weekly time masks and the overlap test.
//!
//! # Time Model
//! A week has 7 days of 13 class slots. A [`DayMasks`] value stores one
//! bitmask per day: bit k set means slot k+1 is occupied. A [`WeekMask`]
//! records which weeks of the term a section meets: bit k set means week k+1.
//!
//! # Overlap
//! Two sections collide on a day iff their masks for that day share a bit.
//! The day-only test ([`conflicts`]) ignores weeks and is conservative;
//! [`conflicts_in_weeks`] additionally requires a shared week and reports
//! only collisions that actually happen.

use serde::{Deserialize, Serialize};

/// Days in a teaching week.
pub const DAYS_PER_WEEK: usize = 7;

/// Class slots in a teaching day.
pub const SLOTS_PER_DAY: usize = 13;

/// Per-day class-slot bitmasks for one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayMasks(pub [u32; DAYS_PER_WEEK]);

impl DayMasks {
    /// A mask with no occupied slot.
    pub const EMPTY: Self = Self([0; DAYS_PER_WEEK]);

    /// Builds masks from a slice, zero-padding or truncating to 7 days.
    pub fn from_slice(days: &[u32]) -> Self {
        let mut masks = [0; DAYS_PER_WEEK];
        for (slot, &mask) in masks.iter_mut().zip(days) {
            *slot = mask;
        }
        Self(masks)
    }

    /// Builds masks occupying a single `slot` (0-based) on `day` (0-based).
    pub fn single(day: usize, slot: usize) -> Self {
        let mut masks = [0; DAYS_PER_WEEK];
        masks[day] = 1 << slot;
        Self(masks)
    }

    /// Mask for one day.
    #[inline]
    pub fn day(&self, day: usize) -> u32 {
        self.0[day]
    }

    /// Whether no slot is occupied on any day.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&m| m == 0)
    }

    /// Whether the two masks share a slot on any day.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).any(|(a, b)| a & b != 0)
    }

    /// Occupied slot indices (0-based, below [`SLOTS_PER_DAY`]) on `day`.
    pub fn slots(&self, day: usize) -> impl Iterator<Item = usize> {
        let mask = self.0[day];
        (0..SLOTS_PER_DAY).filter(move |slot| mask & (1 << slot) != 0)
    }
}

impl From<[u32; DAYS_PER_WEEK]> for DayMasks {
    fn from(masks: [u32; DAYS_PER_WEEK]) -> Self {
        Self(masks)
    }
}

/// Week-occurrence bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekMask(pub u64);

impl WeekMask {
    /// Meets in no week.
    pub const NONE: Self = Self(0);

    /// Whether the section meets in week `week` (0-based).
    #[inline]
    pub fn contains(&self, week: usize) -> bool {
        week < 64 && self.0 & (1 << week) != 0
    }

    /// Whether the two masks share a week.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl From<u64> for WeekMask {
    fn from(mask: u64) -> Self {
        Self(mask)
    }
}

/// Day-only overlap test.
#[inline]
pub fn conflicts(a: &DayMasks, b: &DayMasks) -> bool {
    a.overlaps(b)
}

/// Exact overlap test: a shared week and a shared slot.
#[inline]
pub fn conflicts_in_weeks(
    a_days: &DayMasks,
    a_weeks: WeekMask,
    b_days: &DayMasks,
    b_weeks: WeekMask,
) -> bool {
    a_weeks.overlaps(&b_weeks) && a_days.overlaps(b_days)
}
