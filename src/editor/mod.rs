//! Interactive plan edits.
//!
//! [`PlanEditor`] owns a catalog and a plan table and applies the manual
//! operations a student performs after the initial allocation: loading and
//! saving plans, searching the catalog, adding, removing, or moving a
//! course, re-prioritizing, and projecting a semester onto a weekly grid.
//!
//! Every failing edit leaves the table exactly as it was. `update_course`
//! is a remove followed by an add, so it restores the original placement
//! when the add fails.
//!
//! # Placement rule
//!
//! A manually added course goes to the earliest semester that
//! 1. comes strictly after every prerequisite's semester,
//! 2. matches the course's season,
//! 3. has no day-mask collision with courses already placed there.
//!
//! The forbidden-time mask used by the allocator is not consulted here.

mod grid;

pub use grid::SemesterGrid;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{PlanError, PlanResult};
use crate::models::{
    conflicts, Catalog, Course, Offering, Placement, PlanRecord, PlanTable, Slot, SEMESTER_COUNT,
};
use crate::validation::{validate_table, PlanReport};

/// A catalog search hit.
#[derive(Debug, Clone, Copy)]
pub struct QueryHit<'a> {
    pub course: &'a Course,
    /// Semester the course is placed in, if any.
    pub semester: Option<usize>,
}

impl QueryHit<'_> {
    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.semester.is_some()
    }
}

/// Mutation engine over a catalog and its plan.
#[derive(Debug, Clone)]
pub struct PlanEditor {
    catalog: Catalog,
    table: PlanTable,
    /// Course ID → semester, for every scheduled course.
    completed: HashMap<String, usize>,
}

impl PlanEditor {
    /// Creates an editor with an empty plan.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_table(catalog, PlanTable::new())
    }

    /// Creates an editor over an existing table, such as an allocator result.
    pub fn with_table(catalog: Catalog, table: PlanTable) -> Self {
        let completed = completed_index(&table);
        Self {
            catalog,
            table,
            completed,
        }
    }

    /// Creates an editor from persisted records.
    pub fn from_records(catalog: Catalog, records: &[PlanRecord]) -> PlanResult<Self> {
        let table = PlanTable::from_records(&catalog, records)?;
        Ok(Self::with_table(catalog, table))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn table(&self) -> &PlanTable {
        &self.table
    }

    /// Semester a course is scheduled in.
    pub fn semester_of(&self, course_id: &str) -> Option<usize> {
        self.completed.get(course_id).copied()
    }

    /// Replaces the table with persisted records.
    ///
    /// The whole input is resolved before anything is replaced; on failure
    /// the current table is kept.
    pub fn load_table(&mut self, records: &[PlanRecord]) -> PlanResult<()> {
        let table = PlanTable::from_records(&self.catalog, records)?;
        self.completed = completed_index(&table);
        self.table = table;
        debug!(
            records = records.len(),
            scheduled = self.completed.len(),
            "plan table loaded"
        );
        Ok(())
    }

    /// Persisted form of the table; unscheduled courses carry semester -1.
    pub fn dump_table(&self) -> Vec<PlanRecord> {
        self.table.to_records()
    }

    /// Loads a plan JSON file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> PlanResult<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let records: Vec<PlanRecord> =
            serde_json::from_str(&text).map_err(|e| PlanError::malformed("plan", e))?;
        self.load_table(&records)?;
        info!(path = %path.display(), records = records.len(), "plan loaded");
        Ok(())
    }

    /// Writes the table to a plan JSON file.
    pub fn save_file(&self, path: impl AsRef<Path>) -> PlanResult<()> {
        let path = path.as_ref();
        let records = self.dump_table();
        let json =
            serde_json::to_string_pretty(&records).map_err(|e| PlanError::malformed("plan", e))?;
        fs::write(path, json)?;
        info!(path = %path.display(), records = records.len(), "plan saved");
        Ok(())
    }

    /// Courses whose ID, name, or any instructor contains `keyword`.
    ///
    /// A blank keyword matches nothing. Surrounding whitespace is part of
    /// the keyword.
    pub fn query(&self, keyword: &str) -> Vec<QueryHit<'_>> {
        if keyword.trim().is_empty() {
            return Vec::new();
        }
        self.catalog
            .iter()
            .filter(|c| c.matches(keyword))
            .map(|course| QueryHit {
                course,
                semester: self.semester_of(&course.id),
            })
            .collect()
    }

    /// Schedules a course with the given offering.
    ///
    /// Returns the semester it landed in.
    ///
    /// # Errors
    /// - `UnknownCourse` / `UnknownOffering` for bad identifiers
    /// - `AlreadyScheduled` if the course is already placed
    /// - `NoFeasibleSlot` if no semester through the horizon qualifies
    pub fn add_course(&mut self, course_id: &str, offering_id: &str) -> PlanResult<usize> {
        let course = self
            .catalog
            .get(course_id)
            .ok_or_else(|| PlanError::UnknownCourse(course_id.to_string()))?;
        let offering = course
            .offering(offering_id)
            .ok_or_else(|| PlanError::UnknownOffering {
                course_id: course_id.to_string(),
                offering_id: offering_id.to_string(),
            })?;
        if let Some(&semester) = self.completed.get(course_id) {
            return Err(PlanError::AlreadyScheduled {
                course_id: course_id.to_string(),
                semester,
            });
        }

        let semester = earliest_semester(&self.table, &self.completed, course, offering)
            .ok_or_else(|| PlanError::NoFeasibleSlot {
                course_id: course_id.to_string(),
                offering_id: offering_id.to_string(),
            })?;

        self.table
            .place(Slot::Semester(semester), Placement::new(course, offering));
        self.completed.insert(course.id.clone(), semester);
        debug!(course = course_id, offering = offering_id, semester, "course added");
        Ok(semester)
    }

    /// Moves a course to the unscheduled bucket.
    ///
    /// Returns the semester it was in; `None` means it was not scheduled
    /// and nothing changed.
    pub fn remove_course(&mut self, course_id: &str) -> PlanResult<Option<usize>> {
        let course = self
            .catalog
            .get(course_id)
            .ok_or_else(|| PlanError::UnknownCourse(course_id.to_string()))?;
        let Some(semester) = self.completed.remove(course_id) else {
            return Ok(None);
        };
        self.table
            .place(Slot::Unscheduled, Placement::unscheduled(course));
        debug!(course = course_id, semester, "course removed");
        Ok(Some(semester))
    }

    /// Switches a scheduled course to another offering.
    ///
    /// The course may move to a different semester. If no semester fits
    /// the new offering the original placement is restored and
    /// `NoFeasibleSlot` is returned.
    pub fn update_course(&mut self, course_id: &str, offering_id: &str) -> PlanResult<usize> {
        let course = self
            .catalog
            .get(course_id)
            .ok_or_else(|| PlanError::UnknownCourse(course_id.to_string()))?;
        if course.offering(offering_id).is_none() {
            return Err(PlanError::UnknownOffering {
                course_id: course_id.to_string(),
                offering_id: offering_id.to_string(),
            });
        }
        let (semester, original) = match self.table.get(course_id) {
            Some((Slot::Semester(s), placement)) => (s, placement.clone()),
            _ => return Err(PlanError::NotScheduled(course_id.to_string())),
        };
        if original.class_id == offering_id {
            return Ok(semester);
        }

        self.remove_course(course_id)?;
        match self.add_course(course_id, offering_id) {
            Ok(landed) => {
                debug!(
                    course = course_id,
                    from = %original.class_id,
                    to = offering_id,
                    semester = landed,
                    "course updated"
                );
                Ok(landed)
            }
            Err(err) => {
                self.table.place(Slot::Semester(semester), original);
                self.completed.insert(course_id.to_string(), semester);
                warn!(course = course_id, offering = offering_id, %err, "update rolled back");
                Err(err)
            }
        }
    }

    /// Reads or replaces a course priority.
    ///
    /// `0` only reads; a negative value is clamped to 1. Returns the
    /// priority held before the call.
    pub fn set_priority(&mut self, course_id: &str, value: i32) -> PlanResult<i32> {
        let current = self
            .catalog
            .get(course_id)
            .map(|c| c.priority)
            .ok_or_else(|| PlanError::UnknownCourse(course_id.to_string()))?;
        if value == 0 {
            return Ok(current);
        }
        self.catalog.set_priority(course_id, value.max(1))
    }

    /// Weekly grid of semester `index`.
    pub fn project_table(&self, index: usize) -> PlanResult<SemesterGrid<'_>> {
        if index >= SEMESTER_COUNT {
            return Err(PlanError::SemesterOutOfRange(index));
        }
        Ok(SemesterGrid::build(index, self.table.semester(index)))
    }

    /// Checks the current table.
    pub fn validate(&self) -> PlanReport {
        validate_table(&self.catalog, &self.table)
    }
}

fn completed_index(table: &PlanTable) -> HashMap<String, usize> {
    table
        .iter()
        .filter_map(|(slot, p)| slot.semester().map(|s| (p.course_id.clone(), s)))
        .collect()
}

/// First semester satisfying the placement rule.
fn earliest_semester(
    table: &PlanTable,
    completed: &HashMap<String, usize>,
    course: &Course,
    offering: &Offering,
) -> Option<usize> {
    let mut start = 0;
    for prerequisite in &course.prerequisites {
        // An unscheduled prerequisite pushes the start past the horizon.
        let done = completed.get(prerequisite).copied().unwrap_or(SEMESTER_COUNT);
        start = start.max(done + 1);
    }
    (start..SEMESTER_COUNT).find(|&s| {
        course.runs_in(s) && !table.semester(s).any(|p| conflicts(&p.times, &offering.times))
    })
}
