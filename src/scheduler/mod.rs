//! Initial plan construction.
//!
//! # Algorithm
//!
//! `Allocator` packs courses into semesters with a greedy, priority-driven,
//! first-fit heuristic over a fixed 8-semester horizon. It is not optimal:
//! it finds a valid plan when one is reachable in its fixed ordering, and
//! leaves every other course explicitly unscheduled.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod allocator;

pub use allocator::{AllocationRequest, Allocator};
