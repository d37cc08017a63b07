//! Day × slot projection of one semester.

use std::fmt::Write as _;

use crate::models::{Placement, DAYS_PER_WEEK, SLOTS_PER_DAY};

const DAY_NAMES: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const CELL_WIDTH: usize = 14;

/// Read-only weekly grid of a semester.
///
/// A placement occupies every slot set in its day masks. Sections that
/// never share a week may occupy the same cell; all of them are kept.
#[derive(Debug, Clone)]
pub struct SemesterGrid<'a> {
    semester: usize,
    cells: [[Vec<&'a Placement>; SLOTS_PER_DAY]; DAYS_PER_WEEK],
}

impl<'a> SemesterGrid<'a> {
    /// Projects `placements` onto the grid.
    pub fn build(semester: usize, placements: impl IntoIterator<Item = &'a Placement>) -> Self {
        let mut cells: [[Vec<&'a Placement>; SLOTS_PER_DAY]; DAYS_PER_WEEK] =
            std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));
        for placement in placements {
            for (day, row) in cells.iter_mut().enumerate() {
                for slot in placement.times.slots(day) {
                    row[slot].push(placement);
                }
            }
        }
        Self { semester, cells }
    }

    /// Semester index this grid shows.
    pub fn semester(&self) -> usize {
        self.semester
    }

    /// First placement in a cell.
    ///
    /// # Panics
    /// Panics if `day` or `slot` is out of range.
    pub fn cell(&self, day: usize, slot: usize) -> Option<&'a Placement> {
        self.cells[day][slot].first().copied()
    }

    /// Every placement in a cell, ordered by course ID.
    pub fn occupants(&self, day: usize, slot: usize) -> &[&'a Placement] {
        &self.cells[day][slot]
    }

    /// Placement meeting in a cell during `week` (0-based).
    pub fn in_week(&self, day: usize, slot: usize, week: usize) -> Option<&'a Placement> {
        self.cells[day][slot]
            .iter()
            .copied()
            .find(|p| p.weeks.contains(week))
    }

    /// Plain-text timetable, optionally filtered to one week.
    pub fn render(&self, week: Option<usize>) -> String {
        let mut out = String::new();
        let rule = "=".repeat(6 + CELL_WIDTH * DAYS_PER_WEEK);
        let _ = writeln!(out, "{rule}");
        match week {
            Some(w) => {
                let _ = writeln!(out, "semester {} / week {}", self.semester + 1, w + 1);
            }
            None => {
                let _ = writeln!(out, "semester {}", self.semester + 1);
            }
        }
        let _ = write!(out, "{:6}", "");
        for name in DAY_NAMES {
            let _ = write!(out, "{name:<CELL_WIDTH$}");
        }
        out.push('\n');
        let _ = writeln!(out, "{rule}");

        for slot in 0..SLOTS_PER_DAY {
            let _ = write!(out, "{:>4}  ", slot + 1);
            for day in 0..DAYS_PER_WEEK {
                let placement = match week {
                    Some(w) => self.in_week(day, slot, w),
                    None => self.cell(day, slot),
                };
                let label = placement.map(cell_label).unwrap_or_default();
                let _ = write!(out, "{label:<CELL_WIDTH$}");
            }
            out.push('\n');
            if slot == 4 || slot == 9 {
                let _ = writeln!(out, "{}", "-".repeat(6 + CELL_WIDTH * DAYS_PER_WEEK));
            }
        }
        let _ = writeln!(out, "{rule}");
        out
    }
}

fn cell_label(p: &Placement) -> String {
    let text = if p.name.is_empty() { &p.course_id } else { &p.name };
    text.chars().take(CELL_WIDTH - 2).collect()
}
