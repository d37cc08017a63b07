//! Priority propagation along prerequisite edges.
//!
//! A course that should be taken early drags its prerequisites even
//! earlier. For every edge `course → prerequisite`, the prerequisite's
//! priority is lowered to `max(1, course.priority - 1)` when it is
//! currently higher, and the walk continues from the lowered prerequisite.
//!
//! # Termination
//! Pushed values are floored at 1 and a priority is only ever lowered, so
//! the walk is finite on any graph. The current DFS path is tracked as
//! well: an edge back into the path is a prerequisite cycle, which is
//! skipped and reported instead of being relaxed around the loop.
//!
//! # Invariant
//! On an acyclic catalog, after [`propagate_all`] every edge satisfies
//! `prerequisite.priority <= max(1, course.priority - 1)`.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{PlanError, PlanResult};
use crate::models::{Catalog, Course};

/// Outcome of a propagation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Courses whose priority was lowered, with the new value, in visit order.
    pub lowered: Vec<(String, i32)>,
    /// Prerequisite edges `(course, prerequisite)` that close a cycle.
    pub cycle_edges: Vec<(String, String)>,
}

impl Propagation {
    /// Whether a prerequisite cycle was found.
    pub fn has_cycle(&self) -> bool {
        !self.cycle_edges.is_empty()
    }
}

/// Value pushed onto the prerequisites of a course with `priority`.
#[inline]
pub fn pushed_priority(priority: i32) -> i32 {
    priority.saturating_sub(1).max(1)
}

/// Propagates from every course, in declaration order.
pub fn propagate_all(catalog: &mut Catalog) -> Propagation {
    let (courses, index) = catalog.parts_mut();
    let mut report = Propagation::default();
    let mut on_path = HashSet::new();
    for start in 0..courses.len() {
        relax(courses, index, start, &mut on_path, &mut report);
    }
    log_report(&report);
    report
}

/// Propagates from a single course, typically after a priority edit.
pub fn propagate_from(catalog: &mut Catalog, course_id: &str) -> PlanResult<Propagation> {
    let (courses, index) = catalog.parts_mut();
    let &start = index
        .get(course_id)
        .ok_or_else(|| PlanError::UnknownCourse(course_id.to_string()))?;
    let mut report = Propagation::default();
    let mut on_path = HashSet::new();
    relax(courses, index, start, &mut on_path, &mut report);
    log_report(&report);
    Ok(report)
}

fn relax(
    courses: &mut [Course],
    index: &HashMap<String, usize>,
    node: usize,
    on_path: &mut HashSet<usize>,
    report: &mut Propagation,
) {
    on_path.insert(node);
    let pushed = pushed_priority(courses[node].priority);

    for k in 0..courses[node].prerequisites.len() {
        let Some(&prereq) = index.get(courses[node].prerequisites[k].as_str()) else {
            continue;
        };
        if on_path.contains(&prereq) {
            report
                .cycle_edges
                .push((courses[node].id.clone(), courses[prereq].id.clone()));
            continue;
        }
        if courses[prereq].priority > pushed {
            courses[prereq].priority = pushed;
            report.lowered.push((courses[prereq].id.clone(), pushed));
            relax(courses, index, prereq, on_path, report);
        }
    }

    on_path.remove(&node);
}

fn log_report(report: &Propagation) {
    for (course, prereq) in &report.cycle_edges {
        warn!(%course, %prereq, "prerequisite cycle; edge skipped during priority propagation");
    }
    if !report.lowered.is_empty() {
        debug!(lowered = report.lowered.len(), "priorities propagated");
    }
}
