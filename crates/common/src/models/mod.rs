//! Wire models for the attendance API
//!
//! The backend speaks Portuguese field names; the Rust side uses English
//! names and maps them with serde renames.

mod attendance;
mod school;

pub use attendance::{AttendanceEntry, AttendanceMark, AttendanceSummary, MessageResponse};
pub use school::{
    Class, EnrollmentRequest, EnrollmentResponse, NewClass, NewStudent, NewSubject, Student,
    Subject,
};

/// Backend identifiers are plain integers
pub type Id = i64;
