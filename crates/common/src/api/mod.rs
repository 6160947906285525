//! Attendance API client abstraction
//!
//! One typed method per backend endpoint, implemented by:
//! - `HttpBackend`: the REST API over reqwest
//! - `MockBackend`: an in-memory backend for tests and demo mode

mod http;
mod mock;
pub mod paths;

pub use http::HttpBackend;
pub use mock::MockBackend;

use crate::config::BackendConfig;
use crate::errors::Result;
use crate::models::{
    AttendanceEntry, AttendanceSummary, Class, EnrollmentRequest, EnrollmentResponse, Id,
    MessageResponse, NewClass, NewStudent, NewSubject, Student, Subject,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for the attendance backend
///
/// Every non-2xx answer surfaces as `AppError::Request` carrying the status.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_classes(&self) -> Result<Vec<Class>>;

    async fn create_class(&self, class: &NewClass) -> Result<Class>;

    async fn list_class_students(&self, class_id: Id) -> Result<Vec<Student>>;

    async fn list_subjects(&self) -> Result<Vec<Subject>>;

    async fn create_subject(&self, subject: &NewSubject) -> Result<Subject>;

    async fn get_subject(&self, subject_id: Id) -> Result<Subject>;

    async fn list_subject_students(&self, subject_id: Id) -> Result<Vec<Student>>;

    async fn create_student(&self, student: &NewStudent) -> Result<Student>;

    async fn enroll(&self, request: &EnrollmentRequest) -> Result<EnrollmentResponse>;

    /// Record one entry in today's session of the subject
    async fn record_attendance(&self, entry: &AttendanceEntry) -> Result<MessageResponse>;

    async fn student_summary(&self, student_id: Id) -> Result<AttendanceSummary>;

    async fn student_subject_summary(
        &self,
        student_id: Id,
        subject_id: Id,
    ) -> Result<AttendanceSummary>;

    /// CSV export of a class report, as text
    async fn export_class_csv(&self, class_id: Id) -> Result<String>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Create a backend based on configuration
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn Backend>> {
    match config.provider.as_str() {
        "http" => Ok(Arc::new(HttpBackend::new(config)?)),
        "mock" => Ok(Arc::new(MockBackend::demo())),
        other => {
            tracing::warn!(provider = other, "Unknown backend provider, using http");
            Ok(Arc::new(HttpBackend::new(config)?))
        }
    }
}
