//! Greedy semester allocator.
//!
//! # Algorithm
//!
//! 1. Sort courses once by (compulsory first if requested, priority
//!    ascending, credit descending); ties keep catalog order.
//! 2. For each semester 0..8, walk the sorted list and take every course
//!    that runs this season, has all prerequisites done in *earlier*
//!    semesters, fits the credit cap, and has an offering clear of the
//!    forbidden mask and of everything already taken this semester.
//! 3. The first offering in declaration order that fits is chosen.
//! 4. Remaining courses are recorded as unscheduled.
//!
//! Overlap here is day-only: two sections that share a slot are kept apart
//! even if their weeks never coincide.
//!
//! # Complexity
//! O(S * n * (log n + o * k)) where S=semesters, n=courses, o=offerings per
//! course, k=courses taken per semester.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::{Settings, UNLIMITED_CREDIT_CAP};
use crate::models::{Catalog, Course, DayMasks, Offering, Placement, PlanTable, Slot, SEMESTER_COUNT};

/// Input parameters for allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRequest {
    /// Stop once this many credits are placed.
    pub min_credits: u32,
    /// Soft per-semester course count.
    pub course_soft_limit: usize,
    /// Hard per-semester credit cap.
    pub credit_cap: u32,
    /// Slots no chosen offering may touch.
    pub forbidden: DayMasks,
    /// Sort compulsory courses first and stop once all are placed.
    pub compulsory_first: bool,
}

impl AllocationRequest {
    /// Creates a request with no cap, no forbidden slots, and a course soft
    /// limit of 30.
    pub fn new(min_credits: u32) -> Self {
        Self {
            min_credits,
            course_soft_limit: 30,
            credit_cap: UNLIMITED_CREDIT_CAP,
            forbidden: DayMasks::EMPTY,
            compulsory_first: false,
        }
    }

    /// Builds a request from settings, applying their toggles.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_credits: settings.min_credits,
            course_soft_limit: settings.course_soft_limit,
            credit_cap: settings.effective_credit_cap(),
            forbidden: settings.effective_forbidden(),
            compulsory_first: settings.compulsory_first,
        }
    }

    /// Sets the soft per-semester course count.
    pub fn with_course_soft_limit(mut self, limit: usize) -> Self {
        self.course_soft_limit = limit;
        self
    }

    /// Sets the per-semester credit cap.
    pub fn with_credit_cap(mut self, cap: u32) -> Self {
        self.credit_cap = cap;
        self
    }

    /// Sets the forbidden mask.
    pub fn with_forbidden(mut self, forbidden: DayMasks) -> Self {
        self.forbidden = forbidden;
        self
    }

    /// Enables compulsory-first ordering.
    pub fn with_compulsory_first(mut self, enabled: bool) -> Self {
        self.compulsory_first = enabled;
        self
    }

    /// Soft per-semester credit count: a sixth of the target.
    #[inline]
    pub fn credit_soft_limit(&self) -> u32 {
        self.min_credits / 6
    }
}

/// Greedy multi-semester allocator.
///
/// # Example
///
/// ```
/// use u_semester::models::{Catalog, Course, Offering, Requirement, Season, Slot};
/// use u_semester::scheduler::{AllocationRequest, Allocator};
///
/// let catalog = Catalog::new(vec![
///     Course::new("A", Season::Autumn, Requirement::Compulsory)
///         .with_credit(3)
///         .with_offering(Offering::new("01")),
///     Course::new("B", Season::Spring, Requirement::Compulsory)
///         .with_credit(3)
///         .with_prerequisite("A")
///         .with_offering(Offering::new("01")),
/// ])
/// .unwrap();
///
/// let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(6));
/// assert_eq!(table.get("A").unwrap().0, Slot::Semester(0));
/// assert_eq!(table.get("B").unwrap().0, Slot::Semester(1));
/// ```
#[derive(Debug, Clone)]
pub struct Allocator {
    horizon: usize,
}

impl Allocator {
    /// Creates an allocator over the full horizon.
    pub fn new() -> Self {
        Self {
            horizon: SEMESTER_COUNT,
        }
    }

    /// Limits allocation to the first `semesters` semesters.
    pub fn with_horizon(mut self, semesters: usize) -> Self {
        self.horizon = semesters.min(SEMESTER_COUNT);
        self
    }

    /// Builds a plan covering every catalog course.
    pub fn allocate(&self, catalog: &Catalog, request: &AllocationRequest) -> PlanTable {
        let courses = catalog.courses();
        let order = self.sort_courses(courses, request.compulsory_first);
        let credit_soft_limit = request.credit_soft_limit();

        let mut table = PlanTable::new();
        let mut done: HashMap<&str, usize> = HashMap::new();
        let mut total_credits: u32 = 0;
        let mut compulsory_done = 0;

        for semester in 0..self.horizon {
            if total_credits >= request.min_credits {
                break;
            }
            if request.compulsory_first && compulsory_done >= catalog.compulsory_total() {
                break;
            }

            let mut taken: Vec<&Offering> = Vec::new();
            let mut semester_credits: u32 = 0;

            for &i in &order {
                if taken.len() > request.course_soft_limit && semester_credits > credit_soft_limit
                {
                    break;
                }
                let course = &courses[i];
                if done.contains_key(course.id.as_str()) || !course.runs_in(semester) {
                    continue;
                }
                let prerequisites_done = course.prerequisites.iter().all(|p| {
                    done.get(p.as_str())
                        .is_some_and(|&finished| finished < semester)
                });
                if !prerequisites_done {
                    continue;
                }
                if semester_credits.saturating_add(course.credit) > request.credit_cap {
                    continue;
                }
                let Some(offering) = first_fit(course, &request.forbidden, &taken) else {
                    continue;
                };

                debug!(
                    course = %course.id,
                    offering = %offering.id,
                    semester,
                    "course allocated"
                );
                taken.push(offering);
                done.insert(&course.id, semester);
                semester_credits = semester_credits.saturating_add(course.credit);
                total_credits = total_credits.saturating_add(course.credit);
                if course.is_compulsory() {
                    compulsory_done += 1;
                }
                table.place(Slot::Semester(semester), Placement::new(course, offering));

                if total_credits >= request.min_credits {
                    break;
                }
            }
        }

        for &i in &order {
            let course = &courses[i];
            if !done.contains_key(course.id.as_str()) {
                table.place(Slot::Unscheduled, Placement::unscheduled(course));
            }
        }

        info!(
            scheduled = done.len(),
            unscheduled = courses.len() - done.len(),
            credits = total_credits,
            target = request.min_credits,
            "allocation finished"
        );
        table
    }

    /// Returns course indices in allocation order.
    fn sort_courses(&self, courses: &[Course], compulsory_first: bool) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..courses.len()).collect();
        indices.sort_by_key(|&i| {
            let c = &courses[i];
            let group = if compulsory_first && c.is_compulsory() { 0 } else { 1 };
            (group, c.priority, Reverse(c.credit))
        });
        indices
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

/// First offering, in declaration order, clear of `forbidden` and `taken`.
fn first_fit<'a>(
    course: &'a Course,
    forbidden: &DayMasks,
    taken: &[&Offering],
) -> Option<&'a Offering> {
    course.offerings.iter().find(|off| {
        !off.times.overlaps(forbidden) && !taken.iter().any(|t| t.times.overlaps(&off.times))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Requirement, Season};
    use crate::validation::{validate_table, ViolationKind};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn at(day: usize, slot: usize) -> [u32; 7] {
        let mut t = [0; 7];
        t[day] = 1 << slot;
        t
    }

    fn make_course(id: &str, season: Season, credit: u32, times: [u32; 7]) -> Course {
        Course::new(id, season, Requirement::Elective)
            .with_credit(credit)
            .with_offering(Offering::new("01").with_times(times).with_weeks(0xFFFF))
    }

    fn slot_of(table: &PlanTable, id: &str) -> Slot {
        table.get(id).unwrap().0
    }

    #[test]
    fn test_prerequisite_chain() {
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 3, at(0, 0)),
            make_course("B", Season::Spring, 3, at(0, 0)).with_prerequisite("A"),
        ])
        .unwrap();

        let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(6));
        assert_eq!(slot_of(&table, "A"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "B"), Slot::Semester(1));
    }

    #[test]
    fn test_same_semester_prerequisite_not_satisfied() {
        // B runs in autumn too, but A only completes at the end of semester 0.
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 3, at(0, 0)),
            make_course("B", Season::Autumn, 3, at(1, 0)).with_prerequisite("A"),
        ])
        .unwrap();

        let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(100));
        assert_eq!(slot_of(&table, "A"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "B"), Slot::Semester(2));
    }

    #[test]
    fn test_priority_then_credit_ordering() {
        // Only one of the three fits per semester (same slot).
        let catalog = Catalog::new(vec![
            make_course("small", Season::Autumn, 2, at(0, 0)),
            make_course("big", Season::Autumn, 5, at(0, 0)),
            make_course("urgent", Season::Autumn, 1, at(0, 0)).with_priority(2),
        ])
        .unwrap();

        let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(100));
        assert_eq!(slot_of(&table, "urgent"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "big"), Slot::Semester(2));
        assert_eq!(slot_of(&table, "small"), Slot::Semester(4));
    }

    #[test]
    fn test_first_fitting_offering_chosen() {
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 4, at(0, 0)),
            Course::new("B", Season::Autumn, Requirement::Elective)
                .with_credit(3)
                .with_offering(Offering::new("01").with_times(at(0, 0)))
                .with_offering(Offering::new("02").with_times(at(0, 1)))
                .with_offering(Offering::new("03").with_times(at(0, 2))),
        ])
        .unwrap();

        let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(100));
        let (slot, b) = table.get("B").unwrap();
        assert_eq!(slot, Slot::Semester(0));
        assert_eq!(b.class_id, "02");
    }

    #[test]
    fn test_forbidden_mask_respected() {
        let catalog = Catalog::new(vec![Course::new("A", Season::Autumn, Requirement::Elective)
            .with_credit(3)
            .with_offering(Offering::new("01").with_times(at(4, 12)))
            .with_offering(Offering::new("02").with_times(at(2, 0)))])
        .unwrap();

        let request = AllocationRequest::new(3).with_forbidden(DayMasks(at(4, 12)));
        let table = Allocator::new().allocate(&catalog, &request);
        assert_eq!(table.get("A").unwrap().1.class_id, "02");
    }

    #[test]
    fn test_credit_cap_skips_course() {
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 4, at(0, 0)),
            make_course("B", Season::Autumn, 4, at(0, 1)),
        ])
        .unwrap();

        let request = AllocationRequest::new(100).with_credit_cap(6);
        let table = Allocator::new().allocate(&catalog, &request);
        assert_eq!(slot_of(&table, "A"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "B"), Slot::Semester(2));
    }

    #[test]
    fn test_stops_at_credit_target() {
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 3, at(0, 0)),
            make_course("B", Season::Autumn, 3, at(0, 1)),
            make_course("C", Season::Spring, 3, at(0, 2)),
        ])
        .unwrap();

        let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(3));
        assert_eq!(slot_of(&table, "A"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "B"), Slot::Unscheduled);
        assert_eq!(slot_of(&table, "C"), Slot::Unscheduled);
        assert_eq!(table.total_credits(), 3);
    }

    #[test]
    fn test_soft_limits_close_semester() {
        // Soft limits: more than 1 course and more than 12/6 = 2 credits.
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 2, at(0, 0)),
            make_course("B", Season::Autumn, 2, at(0, 1)),
            make_course("C", Season::Autumn, 2, at(0, 2)),
        ])
        .unwrap();

        let request = AllocationRequest::new(12).with_course_soft_limit(1);
        let table = Allocator::new().allocate(&catalog, &request);
        assert_eq!(slot_of(&table, "A"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "B"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "C"), Slot::Semester(2));
    }

    #[test]
    fn test_compulsory_first() {
        let catalog = Catalog::new(vec![
            make_course("E", Season::Autumn, 5, at(0, 0)).with_priority(1),
            Course::new("R", Season::Autumn, Requirement::Compulsory)
                .with_credit(2)
                .with_offering(Offering::new("01").with_times(at(0, 0))),
        ])
        .unwrap();

        let plain = Allocator::new().allocate(&catalog, &AllocationRequest::new(100));
        assert_eq!(slot_of(&plain, "E"), Slot::Semester(0));

        let request = AllocationRequest::new(100).with_compulsory_first(true);
        let table = Allocator::new().allocate(&catalog, &request);
        assert_eq!(slot_of(&table, "R"), Slot::Semester(0));
        // Every compulsory course is placed after semester 0, so allocation stops.
        assert_eq!(slot_of(&table, "E"), Slot::Unscheduled);
    }

    #[test]
    fn test_unsatisfiable_prerequisite() {
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 3, at(0, 0)).with_prerequisite("GHOST"),
        ])
        .unwrap();

        let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(100));
        assert_eq!(slot_of(&table, "A"), Slot::Unscheduled);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_output_is_total_over_catalog() {
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 3, at(0, 0)),
            make_course("B", Season::Spring, 3, at(0, 0)),
            Course::new("C", Season::Autumn, Requirement::Elective).with_credit(1),
        ])
        .unwrap();

        let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(100));
        assert_eq!(table.len(), catalog.len());
        assert_eq!(slot_of(&table, "C"), Slot::Unscheduled);
    }

    #[test]
    fn test_horizon_limit() {
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 3, at(0, 0)),
            make_course("B", Season::Spring, 3, at(0, 0)).with_prerequisite("A"),
        ])
        .unwrap();

        let table = Allocator::new()
            .with_horizon(1)
            .allocate(&catalog, &AllocationRequest::new(100));
        assert_eq!(slot_of(&table, "A"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "B"), Slot::Unscheduled);
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings {
            min_credits: 60,
            credit_cap: 18,
            ..Settings::default()
        };
        settings.set_forbidden_times(&[1]);
        let request = AllocationRequest::from_settings(&settings);
        assert_eq!(request.credit_cap, UNLIMITED_CREDIT_CAP);
        assert!(request.forbidden.is_empty());
        assert_eq!(request.credit_soft_limit(), 10);

        settings.apply_credit_cap = true;
        settings.apply_forbidden_time = true;
        let request = AllocationRequest::from_settings(&settings);
        assert_eq!(request.credit_cap, 18);
        assert_eq!(request.forbidden.day(0), 1);
    }

    #[test]
    fn test_generated_plan_validates() {
        let catalog = Catalog::new(vec![
            make_course("M1", Season::Autumn, 4, at(0, 0)),
            make_course("M2", Season::Spring, 4, at(0, 0)).with_prerequisite("M1"),
            make_course("M3", Season::Autumn, 4, at(0, 0)).with_prerequisite("M2"),
            make_course("P1", Season::Autumn, 3, at(0, 0)),
            make_course("P2", Season::Spring, 3, at(1, 3)).with_prerequisite("P1"),
            make_course("X", Season::Spring, 2, at(1, 3)).with_prerequisite("M3"),
        ])
        .unwrap();

        let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(200));
        let report = validate_table(&catalog, &table);
        assert_eq!(report.count(ViolationKind::TimeConflict), 0);
        assert_eq!(report.count(ViolationKind::PrerequisiteOrder), 0);
        assert_eq!(report.count(ViolationKind::MissingPrerequisite), 0);

        for (slot, p) in table.iter() {
            let Some(semester) = slot.semester() else { continue };
            for prereq in &catalog.get(&p.course_id).unwrap().prerequisites {
                let prereq_slot = table.get(prereq).unwrap().0;
                assert!(prereq_slot.semester().unwrap() < semester);
            }
        }
    }

    #[test]
    fn test_huge_credits_saturate() {
        let catalog = Catalog::new(vec![
            make_course("A", Season::Autumn, 4_000_000_000, at(0, 0)),
            make_course("B", Season::Autumn, 4_000_000_000, at(0, 1)),
        ])
        .unwrap();

        let request = AllocationRequest::new(u32::MAX).with_credit_cap(u32::MAX);
        let table = Allocator::new().allocate(&catalog, &request);
        assert_eq!(slot_of(&table, "A"), Slot::Semester(0));
        assert_eq!(slot_of(&table, "B"), Slot::Semester(0));
        assert_eq!(table.total_credits(), u32::MAX);
    }

    #[test]
    fn test_random_catalogs_respect_prerequisites() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let n: usize = rng.random_range(2..10);
            let mut courses = Vec::with_capacity(n);
            for k in 0..n {
                let season = if rng.random_bool(0.5) {
                    Season::Autumn
                } else {
                    Season::Spring
                };
                let mut course = Course::new(format!("C{k}"), season, Requirement::Elective)
                    .with_credit(rng.random_range(1..5))
                    .with_priority(rng.random_range(1..10));
                // Prerequisites only point backwards, so the graph is acyclic.
                for j in 0..k {
                    if rng.random_bool(0.3) {
                        course = course.with_prerequisite(format!("C{j}"));
                    }
                }
                let sections: usize = rng.random_range(1..3);
                for o in 0..sections {
                    let times = at(rng.random_range(0..2), rng.random_range(0..3));
                    course = course.with_offering(
                        Offering::new(format!("{o:02}"))
                            .with_times(times)
                            .with_weeks(0xFFFF),
                    );
                }
                courses.push(course);
            }

            let catalog = Catalog::new(courses).unwrap();
            let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(1000));

            for course in catalog.iter() {
                let Slot::Semester(semester) = slot_of(&table, &course.id) else {
                    continue;
                };
                assert!(course.runs_in(semester));
                for prereq in &course.prerequisites {
                    match slot_of(&table, prereq) {
                        Slot::Semester(done) => assert!(
                            done < semester,
                            "{} in {semester} but prerequisite {prereq} in {done}",
                            course.id
                        ),
                        Slot::Unscheduled => {
                            panic!("{} scheduled without prerequisite {prereq}", course.id)
                        }
                    }
                }
            }
            let report = validate_table(&catalog, &table);
            assert!(report.is_valid(), "{}", report.summary());
        }
    }
}
