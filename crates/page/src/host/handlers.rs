//! Page handlers
//!
//! Every POST runs one controller action and answers 303 back to `/`; the
//! outcome shows up as a banner on the next render.

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use super::{spawn_pending_refresh, AppState};
use crate::render;
use crate::view::{ClassForm, StudentForm, SubjectForm};
use frequencia_common::errors::{AppError, Result};
use frequencia_common::models::Id;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
}

#[derive(Debug, Deserialize)]
pub struct EnrollForm {
    #[serde(rename = "matriculaAluno", default)]
    pub student: String,
    #[serde(rename = "matriculaDisciplina", default)]
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct SubjectSelection {
    #[serde(rename = "frequenciaDisciplina", default)]
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct StudentSelection {
    #[serde(rename = "frequenciaAluno", default)]
    pub student: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkForm {
    pub status: String,
    #[serde(rename = "observacao", default)]
    pub note: String,
}

impl MarkForm {
    /// `(present, justified)` of the pressed button
    pub fn flags(&self) -> Option<(bool, bool)> {
        match self.status.as_str() {
            "presente" => Some((true, false)),
            "falta" => Some((false, false)),
            "justificada" => Some((false, true)),
            _ => None,
        }
    }
}

fn back() -> Redirect {
    Redirect::to("/")
}

/// Liveness probe
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.config.backend.provider.clone();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: frequencia_common::VERSION.to_string(),
        backend,
    })
}

/// Page load; refetches the lists and, when needed, the report
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let mut controller = state.controller.lock().await;
    // Failures are rendered as banners
    let _ = controller.reload().await;
    spawn_pending_refresh(&state, &mut controller);

    let options = controller.render_options().clone();
    Html(render::page(controller.view_mut(), &options, Instant::now()).into_string())
}

pub async fn create_class(State(state): State<AppState>, Form(form): Form<ClassForm>) -> Redirect {
    let mut controller = state.controller.lock().await;
    let _ = controller.create_class(form).await;
    spawn_pending_refresh(&state, &mut controller);
    back()
}

pub async fn create_subject(
    State(state): State<AppState>,
    Form(form): Form<SubjectForm>,
) -> Redirect {
    let mut controller = state.controller.lock().await;
    let _ = controller.create_subject(form).await;
    spawn_pending_refresh(&state, &mut controller);
    back()
}

pub async fn create_student(
    State(state): State<AppState>,
    Form(form): Form<StudentForm>,
) -> Redirect {
    let mut controller = state.controller.lock().await;
    let _ = controller.create_student(form).await;
    spawn_pending_refresh(&state, &mut controller);
    back()
}

pub async fn enroll(State(state): State<AppState>, Form(form): Form<EnrollForm>) -> Redirect {
    let mut controller = state.controller.lock().await;
    let _ = controller.enroll(&form.student, &form.subject).await;
    spawn_pending_refresh(&state, &mut controller);
    back()
}

pub async fn select_subject(
    State(state): State<AppState>,
    Form(form): Form<SubjectSelection>,
) -> Redirect {
    let mut controller = state.controller.lock().await;
    let _ = controller.select_subject(&form.subject).await;
    back()
}

pub async fn select_student(
    State(state): State<AppState>,
    Form(form): Form<StudentSelection>,
) -> Redirect {
    let mut controller = state.controller.lock().await;
    let _ = controller.select_student(&form.student).await;
    back()
}

pub async fn mark_attendance(
    State(state): State<AppState>,
    Form(form): Form<MarkForm>,
) -> Result<Redirect> {
    let (present, justified) = form
        .flags()
        .ok_or_else(|| AppError::validation(format!("Status inválido: {}", form.status)))?;

    let mut controller = state.controller.lock().await;
    controller.set_note(form.note);
    let _ = controller.mark_attendance(present, justified).await;
    Ok(back())
}

pub async fn refresh_report(State(state): State<AppState>) -> Redirect {
    let mut controller = state.controller.lock().await;
    let _ = controller.refresh_report().await;
    back()
}

pub async fn dismiss_notice(State(state): State<AppState>, Path(id): Path<Uuid>) -> Redirect {
    state.controller.lock().await.dismiss_notice(id);
    back()
}

/// CSV of a class report; on failure the page shows the error banner
pub async fn export_class(State(state): State<AppState>, Path(class_id): Path<Id>) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.export_class_csv(class_id).await {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"relatorio_turma_{}.csv\"", class_id),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(_) => back().into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_form_flags() {
        let form = |status: &str| MarkForm {
            status: status.to_string(),
            note: String::new(),
        };
        assert_eq!(form("presente").flags(), Some((true, false)));
        assert_eq!(form("falta").flags(), Some((false, false)));
        assert_eq!(form("justificada").flags(), Some((false, true)));
        assert_eq!(form("talvez").flags(), None);
    }
}
