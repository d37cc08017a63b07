//! Planner settings.
//!
//! Settings are an explicit value handed to the allocator and the CLI;
//! nothing in the crate reads global state. They can be loaded from a TOML
//! file, and every field is optional there.
//!
//! ```toml
//! catalog_path = "data/course.json"
//! plan_path = "data/schedule.json"
//! min_credits = 120
//! course_soft_limit = 8
//! credit_cap = 30
//! compulsory_first = true
//! apply_forbidden_time = true
//! apply_credit_cap = true
//! forbidden_times = [0, 0, 0, 0, 4096, 0, 0]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PlanError, PlanResult};
use crate::models::DayMasks;

/// Credit cap applied when per-semester capping is disabled.
pub const UNLIMITED_CREDIT_CAP: u32 = 5000;

/// Default credit target for allocation.
pub const DEFAULT_MIN_CREDITS: u32 = 100;

/// Planner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catalog JSON file.
    pub catalog_path: PathBuf,
    /// Plan JSON file.
    pub plan_path: PathBuf,
    /// Total credits the allocator aims for.
    pub min_credits: u32,
    /// Soft per-semester course count; a semester closes once both this and
    /// the credit soft limit are exceeded.
    pub course_soft_limit: usize,
    /// Hard per-semester credit cap, honored when `apply_credit_cap` is set.
    pub credit_cap: u32,
    /// Schedule compulsory courses ahead of electives.
    pub compulsory_first: bool,
    /// Keep courses out of `forbidden_times`.
    pub apply_forbidden_time: bool,
    /// Enforce `credit_cap`.
    pub apply_credit_cap: bool,
    /// Slots the student refuses.
    pub forbidden_times: DayMasks,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/course.json"),
            plan_path: PathBuf::from("data/schedule.json"),
            min_credits: DEFAULT_MIN_CREDITS,
            course_soft_limit: 30,
            credit_cap: UNLIMITED_CREDIT_CAP,
            compulsory_first: false,
            apply_forbidden_time: false,
            apply_credit_cap: false,
            forbidden_times: DayMasks::EMPTY,
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(text: &str) -> PlanResult<Self> {
        toml::from_str(text).map_err(|e| PlanError::Config(e.to_string()))
    }

    /// Reads a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> PlanResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Forbidden mask the allocator should honor.
    pub fn effective_forbidden(&self) -> DayMasks {
        if self.apply_forbidden_time {
            self.forbidden_times
        } else {
            DayMasks::EMPTY
        }
    }

    /// Per-semester credit cap the allocator should honor.
    pub fn effective_credit_cap(&self) -> u32 {
        if self.apply_credit_cap {
            self.credit_cap
        } else {
            UNLIMITED_CREDIT_CAP
        }
    }

    /// Sets the forbidden mask from up to 7 day values; missing days are 0.
    pub fn set_forbidden_times(&mut self, days: &[u32]) {
        self.forbidden_times = DayMasks::from_slice(days);
    }

    /// Flips `compulsory_first`, returning the previous value.
    pub fn toggle_compulsory_first(&mut self) -> bool {
        let previous = self.compulsory_first;
        self.compulsory_first = !previous;
        previous
    }

    /// Flips `apply_forbidden_time`, returning the previous value.
    pub fn toggle_forbidden_time(&mut self) -> bool {
        let previous = self.apply_forbidden_time;
        self.apply_forbidden_time = !previous;
        previous
    }

    /// Flips `apply_credit_cap`, returning the previous value.
    pub fn toggle_credit_cap(&mut self) -> bool {
        let previous = self.apply_credit_cap;
        self.apply_credit_cap = !previous;
        previous
    }
}
