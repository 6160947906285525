//! HTTP host of the desk page

pub mod handlers;

use crate::controller::PageController;
use axum::{
    routing::{get, post},
    Router,
};
use frequencia_common::config::AppConfig;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// State shared across handlers
///
/// The mutex runs one page action at a time.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub controller: Arc<Mutex<PageController>>,
}

impl AppState {
    pub fn new(config: AppConfig, controller: PageController) -> Self {
        Self {
            config: Arc::new(config),
            controller: Arc::new(Mutex::new(controller)),
        }
    }
}

/// Run a deferred report refresh once its delay has passed
pub fn spawn_pending_refresh(state: &AppState, controller: &mut PageController) {
    let Some(delay) = controller.take_pending_refresh() else {
        return;
    };
    let shared = Arc::clone(&state.controller);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        // Failure is already on screen
        let _ = shared.lock().await.refresh_report().await;
    });
}

/// Create the page router
pub fn create_router(state: AppState) -> Router {
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))

        // Creation forms
        .route("/turmas", post(handlers::create_class))
        .route("/disciplinas", post(handlers::create_subject))
        .route("/alunos", post(handlers::create_student))
        .route("/matricular", post(handlers::enroll))

        // Attendance
        .route("/frequencia/disciplina", post(handlers::select_subject))
        .route("/frequencia/aluno", post(handlers::select_student))
        .route("/frequencia/marcar", post(handlers::mark_attendance))

        // Report
        .route("/relatorio/atualizar", post(handlers::refresh_report))
        .route("/exportar/turma/{id}", get(handlers::export_class))

        .route("/avisos/{id}/fechar", post(handlers::dismiss_notice))
        .layer(
            ServiceBuilder::new()
                .layer(request_id)
                .layer(TraceLayer::new_for_http())
                .layer(propagate_id),
        )
        .with_state(state)
}
