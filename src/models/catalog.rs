//! Course catalog.
//!
//! The catalog owns every course and its offerings. It is built once from
//! input and is read-only afterwards, except for priority edits which go
//! through [`Catalog::set_priority`] so propagation stays consistent.
//!
//! Declaration order is preserved: it is the stable tie-break used by the
//! allocator when two courses share the same sort key.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::Course;
use crate::error::{PlanError, PlanResult};
use crate::priority::{self, Propagation};
use crate::validation::{validate_catalog, ValidationErrorKind};

/// Courses indexed by ID, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
    index: HashMap<String, usize>,
    compulsory_total: usize,
}

impl Catalog {
    /// Builds a catalog and propagates priorities along prerequisite edges.
    ///
    /// Duplicate course IDs and duplicate offering IDs within a course are
    /// fatal. Unknown prerequisites, prerequisite cycles, and courses without
    /// offerings are logged and tolerated: such courses simply never become
    /// schedulable.
    pub fn new(courses: Vec<Course>) -> PlanResult<Self> {
        if let Err(errors) = validate_catalog(&courses) {
            let mut fatal = Vec::new();
            for error in errors {
                match error.kind {
                    ValidationErrorKind::DuplicateId => fatal.push(error.message),
                    _ => warn!(kind = ?error.kind, "{}", error.message),
                }
            }
            if !fatal.is_empty() {
                return Err(PlanError::malformed("catalog", fatal.join("; ")));
            }
        }

        let index = courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        let compulsory_total = courses.iter().filter(|c| c.is_compulsory()).count();

        let mut catalog = Self {
            courses,
            index,
            compulsory_total,
        };
        priority::propagate_all(&mut catalog);
        Ok(catalog)
    }

    /// Parses a JSON array of course records.
    pub fn from_json_str(json: &str) -> PlanResult<Self> {
        let courses: Vec<Course> =
            serde_json::from_str(json).map_err(|e| PlanError::malformed("catalog", e))?;
        Self::new(courses)
    }

    /// Reads a catalog file.
    pub fn load(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            courses = catalog.len(),
            compulsory = catalog.compulsory_total,
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Writes the catalog, current priorities included, as a JSON array.
    pub fn save(&self, path: impl AsRef<Path>) -> PlanResult<()> {
        let json = serde_json::to_string_pretty(&self.courses)
            .map_err(|e| PlanError::malformed("catalog", e))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Looks up a course by ID.
    pub fn get(&self, course_id: &str) -> Option<&Course> {
        self.index.get(course_id).map(|&i| &self.courses[i])
    }

    pub fn contains(&self, course_id: &str) -> bool {
        self.index.contains_key(course_id)
    }

    /// Courses in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    /// Course slice in declaration order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Number of compulsory courses.
    pub fn compulsory_total(&self) -> usize {
        self.compulsory_total
    }

    /// Replaces a course's priority and propagates from it.
    ///
    /// Returns the previous priority.
    pub fn set_priority(&mut self, course_id: &str, value: i32) -> PlanResult<i32> {
        let &i = self
            .index
            .get(course_id)
            .ok_or_else(|| PlanError::UnknownCourse(course_id.to_string()))?;
        let previous = self.courses[i].priority;
        self.courses[i].priority = value;
        priority::propagate_from(self, course_id)?;
        Ok(previous)
    }

    /// Re-runs propagation over the whole catalog.
    pub fn propagate_priorities(&mut self) -> Propagation {
        priority::propagate_all(self)
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [Course], &HashMap<String, usize>) {
        (&mut self.courses, &self.index)
    }
}
