//! Plan (solution) model.
//!
//! A plan places every course of a catalog either in one of the
//! [`SEMESTER_COUNT`] semesters or in the unscheduled bucket. The persisted
//! form is a flat list of [`PlanRecord`]s; the in-memory form is a
//! [`PlanTable`] of denormalized [`Placement`]s, one map per bucket.
//!
//! # Invariant
//! A course ID appears in at most one bucket of a [`PlanTable`].
//! [`PlanTable::place`] enforces this by evicting any earlier placement.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::{Catalog, Course, DayMasks, Offering, Requirement, WeekMask};
use crate::error::{PlanError, PlanResult};

/// Semesters in the planning horizon.
pub const SEMESTER_COUNT: usize = 8;

/// Persisted semester value of an unscheduled course.
pub const UNSCHEDULED_SEMESTER: i64 = -1;

const BUCKETS: usize = SEMESTER_COUNT + 1;

/// Where a course sits in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Semester index in `0..SEMESTER_COUNT`.
    Semester(usize),
    Unscheduled,
}

impl Slot {
    /// Decodes a persisted semester value (`-1` = unscheduled).
    pub fn from_persisted(value: i64) -> Option<Self> {
        match value {
            UNSCHEDULED_SEMESTER => Some(Self::Unscheduled),
            v if (0..SEMESTER_COUNT as i64).contains(&v) => Some(Self::Semester(v as usize)),
            _ => None,
        }
    }

    /// Encodes this slot as a persisted semester value.
    pub fn persisted(self) -> i64 {
        match self {
            Self::Semester(i) => i as i64,
            Self::Unscheduled => UNSCHEDULED_SEMESTER,
        }
    }

    /// Semester index, if scheduled.
    pub fn semester(self) -> Option<usize> {
        match self {
            Self::Semester(i) => Some(i),
            Self::Unscheduled => None,
        }
    }

    /// Bucket index; bucket `SEMESTER_COUNT` holds unscheduled courses.
    fn bucket(self) -> usize {
        match self {
            Self::Semester(i) => {
                assert!(i < SEMESTER_COUNT, "semester index {i} out of range");
                i
            }
            Self::Unscheduled => SEMESTER_COUNT,
        }
    }

    fn from_bucket(bucket: usize) -> Self {
        if bucket == SEMESTER_COUNT {
            Self::Unscheduled
        } else {
            Self::Semester(bucket)
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semester(i) => write!(f, "semester {i}"),
            Self::Unscheduled => f.write_str("unscheduled"),
        }
    }
}

/// Persisted assignment entry.
///
/// `semester == -1` with an empty `class_id` marks an unscheduled course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub course_id: String,
    #[serde(default)]
    pub class_id: String,
    pub semester: i64,
}

impl PlanRecord {
    /// A scheduled entry.
    pub fn scheduled(
        course_id: impl Into<String>,
        class_id: impl Into<String>,
        semester: usize,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            class_id: class_id.into(),
            semester: semester as i64,
        }
    }

    /// An unscheduled entry.
    pub fn unscheduled(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            class_id: String::new(),
            semester: UNSCHEDULED_SEMESTER,
        }
    }

    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.semester >= 0
    }
}

/// A course placed in a plan, with its chosen offering denormalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub course_id: String,
    pub name: String,
    /// Chosen offering ID; empty when unscheduled.
    pub class_id: String,
    pub teacher: String,
    pub times: DayMasks,
    pub weeks: WeekMask,
    pub requirement: Requirement,
    pub credit: u32,
}

impl Placement {
    /// Places `course` with `offering`.
    pub fn new(course: &Course, offering: &Offering) -> Self {
        Self {
            course_id: course.id.clone(),
            name: course.name.clone(),
            class_id: offering.id.clone(),
            teacher: offering.teacher.clone(),
            times: offering.times,
            weeks: offering.weeks,
            requirement: course.requirement,
            credit: course.credit,
        }
    }

    /// Placeholder for a course without an offering.
    pub fn unscheduled(course: &Course) -> Self {
        Self::new(course, &Offering::blank())
    }
}

/// Per-semester assignment table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanTable {
    buckets: [BTreeMap<String, Placement>; BUCKETS],
}

impl PlanTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves persisted records against a catalog.
    ///
    /// Fails with `MalformedInput` on an unknown course, an unknown
    /// offering, an out-of-range semester, or a course listed twice.
    pub fn from_records(catalog: &Catalog, records: &[PlanRecord]) -> PlanResult<Self> {
        let mut table = Self::new();
        let mut seen = HashSet::new();

        for record in records {
            let course = catalog.get(&record.course_id).ok_or_else(|| {
                PlanError::malformed("plan", format!("unknown course '{}'", record.course_id))
            })?;
            if !seen.insert(record.course_id.as_str()) {
                return Err(PlanError::malformed(
                    "plan",
                    format!("course '{}' listed more than once", record.course_id),
                ));
            }
            let slot = Slot::from_persisted(record.semester).ok_or_else(|| {
                PlanError::malformed(
                    "plan",
                    format!(
                        "course '{}' has semester {} outside -1..{}",
                        record.course_id,
                        record.semester,
                        SEMESTER_COUNT - 1
                    ),
                )
            })?;

            let placement = match slot {
                Slot::Unscheduled => Placement::unscheduled(course),
                Slot::Semester(_) => {
                    let offering = course.offering(&record.class_id).ok_or_else(|| {
                        PlanError::malformed(
                            "plan",
                            format!(
                                "course '{}' has no offering '{}'",
                                record.course_id, record.class_id
                            ),
                        )
                    })?;
                    Placement::new(course, offering)
                }
            };
            table.buckets[slot.bucket()].insert(course.id.clone(), placement);
        }

        Ok(table)
    }

    /// Flattens the table to persisted records, bucket by bucket.
    pub fn to_records(&self) -> Vec<PlanRecord> {
        self.iter()
            .map(|(slot, p)| PlanRecord {
                course_id: p.course_id.clone(),
                class_id: p.class_id.clone(),
                semester: slot.persisted(),
            })
            .collect()
    }

    /// Places a course, evicting any earlier placement of the same course.
    ///
    /// Returns the slot it previously occupied.
    ///
    /// # Panics
    /// Panics if `slot` is a semester `>= SEMESTER_COUNT`.
    pub fn place(&mut self, slot: Slot, placement: Placement) -> Option<Slot> {
        let previous = self.remove(&placement.course_id).map(|(s, _)| s);
        self.buckets[slot.bucket()].insert(placement.course_id.clone(), placement);
        previous
    }

    /// Removes a course from whichever bucket holds it.
    pub fn remove(&mut self, course_id: &str) -> Option<(Slot, Placement)> {
        self.buckets
            .iter_mut()
            .enumerate()
            .find_map(|(b, bucket)| bucket.remove(course_id).map(|p| (Slot::from_bucket(b), p)))
    }

    /// Finds a course's slot and placement.
    pub fn get(&self, course_id: &str) -> Option<(Slot, &Placement)> {
        self.buckets
            .iter()
            .enumerate()
            .find_map(|(b, bucket)| bucket.get(course_id).map(|p| (Slot::from_bucket(b), p)))
    }

    /// Placements in a slot, ordered by course ID.
    ///
    /// # Panics
    /// Panics if `slot` is a semester `>= SEMESTER_COUNT`.
    pub fn slot(&self, slot: Slot) -> impl Iterator<Item = &Placement> {
        self.buckets[slot.bucket()].values()
    }

    /// Placements in semester `index`.
    ///
    /// # Panics
    /// Panics if `index >= SEMESTER_COUNT`.
    pub fn semester(&self, index: usize) -> impl Iterator<Item = &Placement> {
        assert!(index < SEMESTER_COUNT, "semester index {index} out of range");
        self.buckets[index].values()
    }

    /// All placements with their slots, semesters first.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Placement)> {
        self.buckets
            .iter()
            .enumerate()
            .flat_map(|(b, bucket)| bucket.values().map(move |p| (Slot::from_bucket(b), p)))
    }

    /// Number of courses in semester buckets.
    pub fn scheduled_count(&self) -> usize {
        self.buckets[..SEMESTER_COUNT].iter().map(BTreeMap::len).sum()
    }

    /// Number of placements of any kind.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Credits placed in semester `index`, saturating at `u32::MAX`.
    ///
    /// # Panics
    /// Panics if `index >= SEMESTER_COUNT`.
    pub fn semester_credits(&self, index: usize) -> u32 {
        self.semester(index)
            .fold(0u32, |sum, p| sum.saturating_add(p.credit))
    }

    /// Credits across all semesters, saturating at `u32::MAX`.
    pub fn total_credits(&self) -> u32 {
        (0..SEMESTER_COUNT).fold(0u32, |sum, i| sum.saturating_add(self.semester_credits(i)))
    }
}
