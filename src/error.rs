//! Error types for planning operations.
//!
//! Every fallible operation in the crate returns [`PlanResult`]. Variants
//! carry the offending identifiers; [`PlanError::kind`] collapses them into
//! the coarse [`ErrorKind`] classes callers usually branch on.

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors raised by catalog loading, allocation, and plan edits.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("unknown course '{0}'")]
    UnknownCourse(String),

    #[error("course '{course_id}' has no offering '{offering_id}'")]
    UnknownOffering {
        course_id: String,
        offering_id: String,
    },

    #[error("course '{0}' is not scheduled")]
    NotScheduled(String),

    #[error("course '{course_id}' is already scheduled in semester {semester}")]
    AlreadyScheduled { course_id: String, semester: usize },

    #[error("semester index {0} is outside the planning horizon")]
    SemesterOutOfRange(usize),

    #[error("no feasible semester for course '{course_id}' with offering '{offering_id}'")]
    NoFeasibleSlot {
        course_id: String,
        offering_id: String,
    },

    #[error("malformed {source_name}: {reason}")]
    MalformedInput { source_name: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An identifier did not resolve, or resolved to the wrong state.
    InvalidReference,
    /// No semester within the horizon satisfies the constraints.
    NoFeasibleSlot,
    /// A catalog, plan, or settings source failed to parse or resolve.
    MalformedInput,
    /// Underlying I/O failure.
    Io,
}

impl PlanError {
    pub(crate) fn malformed(source_name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::MalformedInput {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCourse(_)
            | Self::UnknownOffering { .. }
            | Self::NotScheduled(_)
            | Self::AlreadyScheduled { .. }
            | Self::SemesterOutOfRange(_) => ErrorKind::InvalidReference,
            Self::NoFeasibleSlot { .. } => ErrorKind::NoFeasibleSlot,
            Self::MalformedInput { .. } | Self::Config(_) => ErrorKind::MalformedInput,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidReference => "InvalidReference",
            Self::NoFeasibleSlot => "NoFeasibleSlot",
            Self::MalformedInput => "MalformedInput",
            Self::Io => "Io",
        };
        f.write_str(name)
    }
}
