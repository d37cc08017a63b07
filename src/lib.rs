//! Multi-semester course planning.
//!
//! Builds an 8-semester study plan from a course catalog, lets a student
//! edit it by hand, and checks any plan independently of how it was built.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Offering`, `Catalog`, the
//!   day/week bitmasks, and the per-semester `PlanTable`
//! - **`priority`**: Propagation of priorities down prerequisite chains
//! - **`scheduler`**: Greedy first-fit `Allocator` for the initial plan
//! - **`editor`**: `PlanEditor` for transactional manual edits and the
//!   weekly `SemesterGrid` projection
//! - **`validation`**: Catalog lint and the stateless plan checker
//! - **`config`**: `Settings` loaded from TOML
//! - **`error`**: `PlanError` and its coarse `ErrorKind`
//!
//! # Example
//!
//! ```
//! use u_semester::models::{Catalog, Course, Offering, Requirement, Season};
//! use u_semester::scheduler::{AllocationRequest, Allocator};
//! use u_semester::editor::PlanEditor;
//!
//! let catalog = Catalog::new(vec![
//!     Course::new("CS101", Season::Autumn, Requirement::Compulsory)
//!         .with_credit(3)
//!         .with_offering(Offering::new("01").with_times([1, 0, 0, 0, 0, 0, 0]).with_weeks(1)),
//! ])
//! .unwrap();
//!
//! let table = Allocator::new().allocate(&catalog, &AllocationRequest::new(3));
//! let editor = PlanEditor::with_table(catalog, table);
//! assert_eq!(editor.semester_of("CS101"), Some(0));
//! assert!(editor.validate().is_valid());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod priority;
pub mod scheduler;
pub mod validation;

pub use error::{ErrorKind, PlanError, PlanResult};
