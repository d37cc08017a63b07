//! Catalog and plan validation.
//!
//! Two independent checks live here:
//! - [`validate_catalog`]: structural integrity of course data before
//!   anything is scheduled (duplicate IDs, dangling prerequisites,
//!   prerequisite cycles, courses without offerings).
//! - [`validate_plan`]: re-derives every plan invariant from a catalog and a
//!   list of plan records, without reusing allocator or editor code.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

mod plan;

pub use plan::{validate_plan, validate_table, PlanReport, PlanViolation, ViolationKind};

use crate::models::Course;
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two courses, or two offerings of one course, share an ID.
    DuplicateId,
    /// A course lists a prerequisite that is not in the catalog.
    UnknownPrerequisite,
    /// Prerequisite graph contains a cycle.
    CyclicDependency,
    /// A course has no offerings and can never be scheduled.
    NoOfferings,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates catalog data.
///
/// Checks:
/// 1. No duplicate course IDs
/// 2. No duplicate offering IDs within a course
/// 3. Every course has at least one offering
/// 4. All prerequisite references point to existing courses
/// 5. No circular prerequisite chains
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(courses: &[Course]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut course_ids = HashSet::new();
    for course in courses {
        if !course_ids.insert(course.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", course.id),
            ));
        }

        let mut offering_ids = HashSet::new();
        for off in &course.offerings {
            if !offering_ids.insert(off.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate offering ID '{}' in course {}", off.id, course.id),
                ));
            }
        }

        if course.offerings.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoOfferings,
                format!("Course '{}' has no offerings", course.id),
            ));
        }
    }

    for course in courses {
        for prereq in &course.prerequisites {
            if !course_ids.contains(prereq.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownPrerequisite,
                    format!(
                        "Course '{}' references unknown prerequisite '{}'",
                        course.id, prereq
                    ),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(courses) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the prerequisite graph using DFS.
///
/// Roots are visited in declaration order, so the reported course is
/// deterministic.
fn detect_cycles(courses: &[Course]) -> Option<ValidationError> {
    // Build adjacency list: course_id → prerequisites
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for course in courses {
        adj.entry(course.id.as_str())
            .or_default()
            .extend(course.prerequisites.iter().map(String::as_str));
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for course in courses {
        let node = course.id.as_str();
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular prerequisite chain involving course '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}
