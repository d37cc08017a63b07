//! Course and offering models.
//!
//! A course is a unit of study worth some credits, offered in one season
//! and possibly gated by prerequisites. Each course has one or more
//! offerings (sections), each with its own instructor and weekly times.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DayMasks, WeekMask, DAYS_PER_WEEK};

/// Priority assigned to courses that do not declare one.
pub const DEFAULT_PRIORITY: i32 = 9;

/// Season in which a course runs.
///
/// Semesters alternate: even indices are autumn terms, odd ones spring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Autumn,
    Spring,
}

impl Season {
    /// Season of the semester at `index` (0-based).
    #[inline]
    pub fn of_semester(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Autumn
        } else {
            Self::Spring
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Autumn => f.write_str("Autumn"),
            Self::Spring => f.write_str("Spring"),
        }
    }
}

/// Requirement class of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Requirement {
    Compulsory,
    Elective,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compulsory => f.write_str("Compulsory"),
            Self::Elective => f.write_str("Elective"),
        }
    }
}

/// A section of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    /// Identifier, unique within the owning course.
    pub id: String,
    /// Instructor name.
    #[serde(default)]
    pub teacher: String,
    /// Weekly class slots.
    pub times: DayMasks,
    /// Weeks of the term in which the section meets.
    #[serde(default)]
    pub weeks: WeekMask,
}

impl Offering {
    /// Creates an offering with no times and no weeks.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            teacher: String::new(),
            times: DayMasks::EMPTY,
            weeks: WeekMask::NONE,
        }
    }

    /// Blank offering used for unscheduled placements.
    pub fn blank() -> Self {
        Self::new("")
    }

    /// Sets the instructor.
    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = teacher.into();
        self
    }

    /// Sets the weekly class slots.
    pub fn with_times(mut self, times: [u32; DAYS_PER_WEEK]) -> Self {
        self.times = DayMasks(times);
        self
    }

    /// Sets the week-occurrence mask.
    pub fn with_weeks(mut self, weeks: u64) -> Self {
        self.weeks = WeekMask(weeks);
        self
    }
}

/// A course in the catalog.
///
/// Field names follow the catalog file format: `semester` is the season
/// and `required` the requirement class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Globally unique identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Credit value.
    pub credit: u32,
    /// Season in which the course runs.
    #[serde(rename = "semester")]
    pub season: Season,
    /// Requirement class.
    #[serde(rename = "required")]
    pub requirement: Requirement,
    /// Prerequisite course IDs, in declaration order.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Sections, in declaration order.
    #[serde(default)]
    pub offerings: Vec<Offering>,
    /// Sort priority (lower = scheduled earlier).
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl Course {
    /// Creates a course with no credits, prerequisites, or offerings.
    pub fn new(id: impl Into<String>, season: Season, requirement: Requirement) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            credit: 0,
            season,
            requirement,
            prerequisites: Vec::new(),
            offerings: Vec::new(),
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the credit value.
    pub fn with_credit(mut self, credit: u32) -> Self {
        self.credit = credit;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a prerequisite.
    pub fn with_prerequisite(mut self, course_id: impl Into<String>) -> Self {
        self.prerequisites.push(course_id.into());
        self
    }

    /// Adds an offering.
    pub fn with_offering(mut self, offering: Offering) -> Self {
        self.offerings.push(offering);
        self
    }

    /// Looks up an offering by ID.
    pub fn offering(&self, offering_id: &str) -> Option<&Offering> {
        self.offerings.iter().find(|o| o.id == offering_id)
    }

    #[inline]
    pub fn is_compulsory(&self) -> bool {
        self.requirement == Requirement::Compulsory
    }

    /// Whether the course runs in the semester at `index`.
    #[inline]
    pub fn runs_in(&self, semester: usize) -> bool {
        self.season == Season::of_semester(semester)
    }

    /// Whether `keyword` occurs in the ID, the name, or any instructor.
    pub fn matches(&self, keyword: &str) -> bool {
        self.id.contains(keyword)
            || self.name.contains(keyword)
            || self.offerings.iter().any(|o| o.teacher.contains(keyword))
    }
}
