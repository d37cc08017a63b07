//! Plan validator.
//!
//! Re-checks a plan from scratch against a catalog:
//! 1. Every scheduled record names an existing course and offering.
//! 2. Every prerequisite is scheduled in a strictly earlier semester.
//! 3. No two courses in one semester meet in the same slot of the same week.
//!
//! The check is exact: sections that share a slot but never a week do not
//! conflict. Credit and compulsory coverage are tallied even when errors are
//! present, and all violations are collected before returning.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::models::{conflicts_in_weeks, Catalog, Offering, PlanRecord, PlanTable, SEMESTER_COUNT};

/// Classification of plan violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// Record names a course that is not in the catalog.
    UnknownCourse,
    /// Record names an offering that the course does not have.
    UnknownOffering,
    /// The same course appears in more than one record.
    DuplicateEntry,
    /// Record has a semester outside the planning horizon.
    OutOfHorizon,
    /// A prerequisite is not scheduled at all.
    MissingPrerequisite,
    /// A prerequisite is scheduled in the same or a later semester.
    PrerequisiteOrder,
    /// Two same-semester courses meet in the same slot of the same week.
    TimeConflict,
}

/// A single plan violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanViolation {
    pub kind: ViolationKind,
    /// Course the violation is reported against.
    pub course_id: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validation outcome with a credit and coverage summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanReport {
    pub violations: Vec<PlanViolation>,
    /// Credits of scheduled, known courses.
    pub total_credits: u32,
    /// Scheduled compulsory courses.
    pub compulsory_scheduled: usize,
    /// Compulsory courses in the catalog.
    pub compulsory_total: usize,
}

impl PlanReport {
    /// Whether no violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Fraction of compulsory courses scheduled.
    ///
    /// Returns `None` if the catalog has no compulsory course.
    pub fn coverage(&self) -> Option<f64> {
        if self.compulsory_total == 0 {
            return None;
        }
        Some(self.compulsory_scheduled as f64 / self.compulsory_total as f64)
    }

    /// Coverage in percent, truncated to one decimal place.
    pub fn coverage_percent(&self) -> Option<f64> {
        if self.compulsory_total == 0 {
            return None;
        }
        let permille = self.compulsory_scheduled * 1000 / self.compulsory_total;
        Some(permille as f64 / 10.0)
    }

    /// Number of violations of a kind.
    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }

    /// Multi-line text summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if self.is_valid() {
            out.push_str("plan is valid\n");
        } else {
            out.push_str(&format!("{} problem(s) found:\n", self.violations.len()));
            for v in &self.violations {
                out.push_str(&format!("  - {v}\n"));
            }
        }
        out.push_str(&format!("total credits: {}\n", self.total_credits));
        match self.coverage_percent() {
            Some(pct) => out.push_str(&format!(
                "compulsory scheduled: {}/{} ({pct}%)\n",
                self.compulsory_scheduled, self.compulsory_total
            )),
            None => out.push_str("compulsory scheduled: no compulsory courses in catalog\n"),
        }
        out
    }
}

struct Entry<'a> {
    course_id: &'a str,
    class_id: &'a str,
    semester: i64,
}

/// Validates plan records against a catalog.
///
/// When a course is listed more than once, the last record wins and a
/// [`ViolationKind::DuplicateEntry`] is reported.
pub fn validate_plan(catalog: &Catalog, records: &[PlanRecord]) -> PlanReport {
    let mut report = PlanReport {
        compulsory_total: catalog.compulsory_total(),
        ..PlanReport::default()
    };

    // Deduplicate, keeping first-seen order and last-seen values.
    let mut entries: Vec<Entry<'_>> = Vec::with_capacity(records.len());
    let mut position: HashMap<&str, usize> = HashMap::new();
    for r in records {
        let entry = Entry {
            course_id: &r.course_id,
            class_id: &r.class_id,
            semester: r.semester,
        };
        match position.get(r.course_id.as_str()) {
            Some(&i) => {
                report.push(
                    ViolationKind::DuplicateEntry,
                    &r.course_id,
                    format!("course {} is listed more than once", label(catalog, &r.course_id)),
                );
                entries[i] = entry;
            }
            None => {
                position.insert(&r.course_id, entries.len());
                entries.push(entry);
            }
        }
    }
    let semester_of: HashMap<&str, i64> =
        entries.iter().map(|e| (e.course_id, e.semester)).collect();

    // 1. References
    let mut resolved: BTreeMap<i64, Vec<(&str, &Offering)>> = BTreeMap::new();
    for e in entries.iter().filter(|e| e.semester >= 0) {
        if e.semester >= SEMESTER_COUNT as i64 {
            report.push(
                ViolationKind::OutOfHorizon,
                e.course_id,
                format!(
                    "course {} is placed in semester {}, beyond the last semester {}",
                    label(catalog, e.course_id),
                    e.semester,
                    SEMESTER_COUNT - 1
                ),
            );
        }
        let Some(course) = catalog.get(e.course_id) else {
            report.push(
                ViolationKind::UnknownCourse,
                e.course_id,
                format!("course {} does not exist in the catalog", e.course_id),
            );
            continue;
        };
        match course.offering(e.class_id) {
            Some(offering) => resolved
                .entry(e.semester)
                .or_default()
                .push((e.course_id, offering)),
            None => report.push(
                ViolationKind::UnknownOffering,
                e.course_id,
                format!(
                    "course {} has no offering '{}'",
                    label(catalog, e.course_id),
                    e.class_id
                ),
            ),
        }
    }

    // 2. Prerequisites
    for e in entries.iter().filter(|e| e.semester >= 0) {
        let Some(course) = catalog.get(e.course_id) else {
            continue;
        };
        for prereq in &course.prerequisites {
            let prereq_semester = semester_of.get(prereq.as_str()).copied().unwrap_or(-1);
            if prereq_semester < 0 {
                report.push(
                    ViolationKind::MissingPrerequisite,
                    e.course_id,
                    format!(
                        "course {} is missing prerequisite {}",
                        label(catalog, e.course_id),
                        label(catalog, prereq)
                    ),
                );
            } else if prereq_semester >= e.semester {
                report.push(
                    ViolationKind::PrerequisiteOrder,
                    e.course_id,
                    format!(
                        "prerequisite {} of course {} is in semester {}, not before semester {}",
                        label(catalog, prereq),
                        label(catalog, e.course_id),
                        prereq_semester,
                        e.semester
                    ),
                );
            }
        }
    }

    // 3. Time conflicts
    for (semester, placed) in &resolved {
        for (i, (id_a, a)) in placed.iter().enumerate() {
            for (id_b, b) in &placed[i + 1..] {
                if conflicts_in_weeks(&a.times, a.weeks, &b.times, b.weeks) {
                    report.push(
                        ViolationKind::TimeConflict,
                        id_a,
                        format!(
                            "semester {semester}: {} and {} meet at the same time",
                            label(catalog, id_a),
                            label(catalog, id_b)
                        ),
                    );
                }
            }
        }
    }

    // Summary
    for e in entries.iter().filter(|e| e.semester >= 0) {
        if let Some(course) = catalog.get(e.course_id) {
            report.total_credits = report.total_credits.saturating_add(course.credit);
            if course.is_compulsory() {
                report.compulsory_scheduled += 1;
            }
        }
    }

    report
}

/// Validates an in-memory table through its persisted form.
pub fn validate_table(catalog: &Catalog, table: &PlanTable) -> PlanReport {
    validate_plan(catalog, &table.to_records())
}

impl PlanReport {
    fn push(&mut self, kind: ViolationKind, course_id: &str, message: String) {
        self.violations.push(PlanViolation {
            kind,
            course_id: course_id.to_string(),
            message,
        });
    }
}

/// `ID (name)`, or the bare ID when the name is unknown or empty.
fn label(catalog: &Catalog, course_id: &str) -> String {
    match catalog.get(course_id) {
        Some(c) if !c.name.is_empty() => format!("{} ({})", course_id, c.name),
        _ => course_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, DayMasks, Requirement, Season};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn offering(id: &str, day0: u32, weeks: u64) -> Offering {
        Offering::new(id)
            .with_times([day0, 0, 0, 0, 0, 0, 0])
            .with_weeks(weeks)
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            Course::new("A", Season::Autumn, Requirement::Compulsory)
                .with_name("Algebra")
                .with_credit(3)
                .with_offering(offering("01", 0b1, 0b01))
                .with_offering(offering("02", 0b1, 0b11)),
            Course::new("B", Season::Spring, Requirement::Compulsory)
                .with_credit(3)
                .with_prerequisite("A")
                .with_offering(offering("01", 0b1, 0b10)),
            Course::new("C", Season::Autumn, Requirement::Elective)
                .with_credit(2)
                .with_offering(offering("01", 0b1, 0b10)),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_plan() {
        let catalog = sample_catalog();
        let records = vec![
            PlanRecord::scheduled("A", "01", 0),
            PlanRecord::scheduled("B", "01", 1),
            PlanRecord::unscheduled("C"),
        ];
        let report = validate_plan(&catalog, &records);
        assert!(report.is_valid(), "{}", report.summary());
        assert_eq!(report.total_credits, 6);
        assert_eq!(report.compulsory_scheduled, 2);
        assert_eq!(report.coverage(), Some(1.0));
    }

    #[test]
    fn test_disjoint_weeks_do_not_conflict() {
        // Same day mask, weeks 0b01 and 0b10.
        let catalog = sample_catalog();
        let records = vec![
            PlanRecord::scheduled("A", "01", 0),
            PlanRecord::scheduled("C", "01", 0),
        ];
        let report = validate_plan(&catalog, &records);
        assert_eq!(report.count(ViolationKind::TimeConflict), 0);
    }

    #[test]
    fn test_shared_week_conflicts() {
        let catalog = sample_catalog();
        let records = vec![
            PlanRecord::scheduled("A", "02", 0),
            PlanRecord::scheduled("C", "01", 0),
        ];
        let report = validate_plan(&catalog, &records);
        assert_eq!(report.count(ViolationKind::TimeConflict), 1);
        assert!(report.violations[0].message.contains("A (Algebra)"));
    }

    #[test]
    fn test_reference_errors() {
        let catalog = sample_catalog();
        let records = vec![
            PlanRecord::scheduled("Z", "01", 0),
            PlanRecord::scheduled("A", "99", 0),
            PlanRecord::scheduled("C", "01", 9),
        ];
        let report = validate_plan(&catalog, &records);
        assert_eq!(report.count(ViolationKind::UnknownCourse), 1);
        assert_eq!(report.count(ViolationKind::UnknownOffering), 1);
        assert_eq!(report.count(ViolationKind::OutOfHorizon), 1);
        // Best-effort tally still counts known scheduled courses.
        assert_eq!(report.total_credits, 5);
    }

    #[test]
    fn test_prerequisite_errors() {
        let catalog = sample_catalog();

        let missing = validate_plan(&catalog, &[PlanRecord::scheduled("B", "01", 1)]);
        assert_eq!(missing.count(ViolationKind::MissingPrerequisite), 1);

        let same = validate_plan(
            &catalog,
            &[
                PlanRecord::scheduled("A", "01", 1),
                PlanRecord::scheduled("B", "01", 1),
            ],
        );
        assert_eq!(same.count(ViolationKind::PrerequisiteOrder), 1);

        let unscheduled = validate_plan(
            &catalog,
            &[PlanRecord::unscheduled("A"), PlanRecord::scheduled("B", "01", 3)],
        );
        assert_eq!(unscheduled.count(ViolationKind::MissingPrerequisite), 1);
    }

    #[test]
    fn test_duplicate_records_last_wins() {
        let catalog = sample_catalog();
        let records = vec![
            PlanRecord::scheduled("A", "01", 0),
            PlanRecord::scheduled("A", "01", 4),
            PlanRecord::scheduled("B", "01", 1),
        ];
        let report = validate_plan(&catalog, &records);
        assert_eq!(report.count(ViolationKind::DuplicateEntry), 1);
        assert_eq!(report.count(ViolationKind::PrerequisiteOrder), 1);
        assert_eq!(report.total_credits, 6);
    }

    #[test]
    fn test_coverage_guarded_without_compulsory() {
        let catalog = Catalog::new(vec![Course::new("E", Season::Autumn, Requirement::Elective)
            .with_credit(2)
            .with_offering(offering("01", 1, 1))])
        .unwrap();
        let report = validate_plan(&catalog, &[PlanRecord::scheduled("E", "01", 0)]);
        assert_eq!(report.coverage(), None);
        assert_eq!(report.coverage_percent(), None);
        assert!(report.summary().contains("no compulsory courses"));
    }

    #[test]
    fn test_coverage_percent_truncates() {
        let report = PlanReport {
            compulsory_scheduled: 2,
            compulsory_total: 3,
            ..PlanReport::default()
        };
        assert_eq!(report.coverage_percent(), Some(66.6));
    }

    #[test]
    fn test_inputs_untouched() {
        let catalog = sample_catalog();
        let records = vec![PlanRecord::scheduled("B", "01", 0)];
        let before = records.clone();
        let _ = validate_plan(&catalog, &records);
        assert_eq!(records, before);
    }

    /// Reports a conflict iff some week bit and some slot bit on some day
    /// are shared, checked bit by bit.
    #[test]
    fn test_conflict_detection_matches_bitwise_search() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..300 {
            let mut courses = Vec::new();
            let mut records = Vec::new();
            for k in 0..3 {
                let mut times = [0u32; 7];
                for day in times.iter_mut() {
                    *day = rng.random_range(0..8);
                }
                let weeks = rng.random_range(1..8u64);
                let id = format!("K{k}");
                courses.push(
                    Course::new(&id, Season::Autumn, Requirement::Elective)
                        .with_offering(Offering::new("01").with_times(times).with_weeks(weeks)),
                );
                records.push(PlanRecord::scheduled(&id, "01", 0));
            }

            let mut expected = 0;
            for i in 0..courses.len() {
                for j in i + 1..courses.len() {
                    let (a, b) = (&courses[i].offerings[0], &courses[j].offerings[0]);
                    let shared_week = (0..3).any(|w| a.weeks.contains(w) && b.weeks.contains(w));
                    let shared_slot = (0..7).any(|d| {
                        (0..3).any(|s| {
                            DayMasks::single(d, s).overlaps(&a.times)
                                && DayMasks::single(d, s).overlaps(&b.times)
                        })
                    });
                    if shared_week && shared_slot {
                        expected += 1;
                    }
                }
            }

            let catalog = Catalog::new(courses).unwrap();
            let report = validate_plan(&catalog, &records);
            assert_eq!(report.count(ViolationKind::TimeConflict), expected);
        }
    }

    #[test]
    fn test_huge_credits_do_not_abort() {
        let catalog = Catalog::new(vec![
            Course::new("A", Season::Autumn, Requirement::Compulsory)
                .with_credit(4_000_000_000)
                .with_offering(offering("01", 0b01, 1)),
            Course::new("B", Season::Autumn, Requirement::Compulsory)
                .with_credit(4_000_000_000)
                .with_offering(offering("01", 0b10, 1)),
        ])
        .unwrap();
        let records = [
            PlanRecord::scheduled("A", "01", 0),
            PlanRecord::scheduled("B", "01", 2),
        ];
        let report = validate_plan(&catalog, &records);
        assert!(report.is_valid());
        assert_eq!(report.total_credits, u32::MAX);
        assert_eq!(report.compulsory_scheduled, 2);
    }
}
