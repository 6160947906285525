//! REST implementation of the attendance backend

use super::{paths, Backend};
use crate::config::BackendConfig;
use crate::errors::{AppError, Result};
use crate::metrics::{endpoint_label, RequestMetrics};
use crate::models::{
    AttendanceEntry, AttendanceSummary, Class, EnrollmentRequest, EnrollmentResponse, Id,
    MessageResponse, NewClass, NewStudent, NewSubject, Student, Subject,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Attendance API client over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for `base_url + api_prefix`
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and fail on any non-2xx status without reading the body
    #[tracing::instrument(skip(self, body), fields(base = %self.base_url))]
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let metrics = RequestMetrics::start(method.as_str(), &endpoint_label(path));

        let mut builder = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics.finish(0);
                return Err(AppError::Transport(e));
            }
        };

        let status = response.status();
        metrics.finish(status.as_u16());
        tracing::debug!(status = status.as_u16(), "Backend responded");

        if !status.is_success() {
            return Err(AppError::Request {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Generic JSON request
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let response = self.send(method, path, body).await?;
        response.json::<T>().await.map_err(|e| AppError::Decode {
            message: format!("{}: {}", path, e),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body)).await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_classes(&self) -> Result<Vec<Class>> {
        self.get(paths::CLASSES).await
    }

    async fn create_class(&self, class: &NewClass) -> Result<Class> {
        self.post(paths::CLASSES, class).await
    }

    async fn list_class_students(&self, class_id: Id) -> Result<Vec<Student>> {
        self.get(&paths::class_students(class_id)).await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.get(paths::SUBJECTS).await
    }

    async fn create_subject(&self, subject: &NewSubject) -> Result<Subject> {
        self.post(paths::SUBJECTS, subject).await
    }

    async fn get_subject(&self, subject_id: Id) -> Result<Subject> {
        self.get(&paths::subject(subject_id)).await
    }

    async fn list_subject_students(&self, subject_id: Id) -> Result<Vec<Student>> {
        self.get(&paths::subject_students(subject_id)).await
    }

    async fn create_student(&self, student: &NewStudent) -> Result<Student> {
        self.post(paths::STUDENTS, student).await
    }

    async fn enroll(&self, request: &EnrollmentRequest) -> Result<EnrollmentResponse> {
        self.post(paths::ENROLL, request).await
    }

    async fn record_attendance(&self, entry: &AttendanceEntry) -> Result<MessageResponse> {
        self.post(paths::ATTENDANCE, entry).await
    }

    async fn student_summary(&self, student_id: Id) -> Result<AttendanceSummary> {
        self.get(&paths::student_summary(student_id)).await
    }

    async fn student_subject_summary(
        &self,
        student_id: Id,
        subject_id: Id,
    ) -> Result<AttendanceSummary> {
        self.get(&paths::student_subject_summary(student_id, subject_id))
            .await
    }

    async fn export_class_csv(&self, class_id: Id) -> Result<String> {
        let response = self
            .send(Method::GET, &paths::class_export(class_id), None)
            .await?;
        Ok(response.text().await?)
    }

    fn name(&self) -> &str {
        "http"
    }
}
