//! Frequencia Report Renderer
//!
//! Builds the attendance report shown on the desk page:
//! - `collect`: the fetch passes over classes, students and subjects
//! - `model`: row and statistic derivation, free of I/O
//! - `render`: markup for the report container

pub mod collect;
pub mod model;
pub mod render;

pub use collect::{collect_report, CollectOptions};
pub use model::{
    AttendanceStatus, ClassSection, ReportData, ReportTotals, StudentRow, SubjectRow, Tone,
};
pub use render::RenderOptions;
