//! Planning domain models.
//!
//! Provides the data types shared by the allocator, the plan editor, and
//! the validator.
//!
//! # Domain Mappings
//!
//! | u-semester | Meaning |
//! |------------|---------|
//! | Course | Unit of study with credits, season, prerequisites |
//! | Offering | One section of a course: instructor and weekly times |
//! | Catalog | All courses, indexed by ID |
//! | PlanTable | Semester buckets of placed courses |
//! | PlanRecord | Persisted `{course_id, class_id, semester}` entry |

mod catalog;
mod course;
mod plan;
mod time_mask;

pub use catalog::Catalog;
pub use course::{Course, Offering, Requirement, Season, DEFAULT_PRIORITY};
pub use plan::{Placement, PlanRecord, PlanTable, Slot, SEMESTER_COUNT, UNSCHEDULED_SEMESTER};
pub use time_mask::{
    conflicts, conflicts_in_weeks, DayMasks, WeekMask, DAYS_PER_WEEK, SLOTS_PER_DAY,
};
