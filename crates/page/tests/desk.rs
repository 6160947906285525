//! Page controller scenarios against the in-memory backend

use frequencia_common::api::paths;
use frequencia_common::config::RefreshPolicy;
use frequencia_common::{Backend, MockBackend};
use frequencia_page::controller::{
    CLASS_CREATED, REPORT_UPDATED, SELECTION_REQUIRED, STUDENT_CREATED, STUDENT_ENROLLED,
};
use frequencia_page::view::{ClassForm, ReportPanel, StudentForm, NO_ENROLLED_STUDENTS};
use frequencia_page::{ControllerOptions, PageController};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn controller(backend: &Arc<MockBackend>) -> PageController {
    PageController::new(backend.clone(), ControllerOptions::default())
}

fn latest(page: &PageController) -> String {
    page.view()
        .notices
        .latest()
        .map(|n| n.message.clone())
        .unwrap_or_default()
}

fn report_html(page: &PageController) -> String {
    page.view().report.markup(page.render_options()).into_string()
}

#[tokio::test]
async fn test_empty_system_costs_two_requests() {
    let backend = Arc::new(MockBackend::new());
    let mut page = controller(&backend);

    assert_ok!(page.refresh_report().await);

    assert_eq!(
        backend.requests().await,
        vec!["GET /turmas/".to_string(), "GET /disciplinas/".to_string()]
    );
    assert!(matches!(page.view().report, ReportPanel::Empty));
    assert!(report_html(&page).contains("Configure o sistema primeiro"));
    // No success banner for the empty state
    assert!(page.view().notices.latest().is_none());
}

#[tokio::test]
async fn test_classes_without_subjects_show_empty_state() {
    let backend = Arc::new(MockBackend::new());
    backend.add_class("3º Ano A", 2024, "Manhã").await;
    let mut page = controller(&backend);

    assert_ok!(page.refresh_report().await);
    assert!(matches!(page.view().report, ReportPanel::Empty));
}

#[tokio::test]
async fn test_report_rows_for_present_and_missing_summaries() {
    let backend = Arc::new(MockBackend::new());
    let class = backend.add_class("3º Ano A", 2024, "Manhã").await;
    let subject = backend.add_subject("Matemática", "MAT301", 80, "Helena Prado").await;
    let a = backend.add_student("Ana Silva", "2024001", class).await;
    let b = backend.add_student("Bruno Santos", "2024002", class).await;
    for day in 0..10 {
        assert_ok!(backend.add_attendance(a, subject, day < 8, false).await);
        backend.advance_day().await;
    }
    backend.fail(paths::student_summary(b), 404).await;

    let mut page = controller(&backend);
    assert_ok!(page.refresh_report().await);

    let html = report_html(&page);
    assert!(html.contains("<small>80%</small>"));
    assert!(html.contains(r#"<span class="badge badge-success">Aprovado</span>"#));
    assert!(html.contains(r#"<span class="badge badge-warning">Sem dados</span>"#));
    assert!(html.contains("Relatório por Disciplina"));
    assert_eq!(latest(&page), REPORT_UPDATED);
}

#[tokio::test]
async fn test_report_failure_shows_error_state() {
    let backend = Arc::new(MockBackend::new());
    let class = backend.add_class("3º Ano A", 2024, "Manhã").await;
    backend.add_subject("Matemática", "MAT301", 80, "Helena Prado").await;
    backend.fail(paths::class_students(class), 500).await;

    let mut page = controller(&backend);
    assert_err!(page.refresh_report().await);

    assert!(matches!(page.view().report, ReportPanel::Failed));
    assert!(report_html(&page).contains("Erro ao carregar relatório"));
    assert_eq!(latest(&page), "Erro: HTTP error! status: 500");
}

#[tokio::test]
async fn test_init_fills_every_picker() {
    let backend = Arc::new(MockBackend::new());
    let first = backend.add_class("3º Ano A", 2024, "Manhã").await;
    backend.add_class("2º Ano B", 2024, "Tarde").await;
    backend.add_subject("Matemática", "MAT301", 80, "Helena Prado").await;
    backend.add_student("Ana Silva", "2024001", first).await;

    let mut page = controller(&backend);
    assert_ok!(page.init().await);
    let view = page.view();

    assert_eq!(view.class_select.options.len(), 2);
    assert_eq!(view.class_select.options[1].label, "2º Ano B - 2024 (Tarde)");
    assert_eq!(view.enroll_subject_select.options, view.attendance_subject_select.options);
    assert_eq!(
        view.enroll_subject_select.options[0].label,
        "Matemática (MAT301) - Prof. Helena Prado"
    );

    // Classes without students get no group
    assert_eq!(view.enroll_student_select.groups.len(), 1);
    assert_eq!(view.enroll_student_select.groups[0].label, "3º Ano A - 2024");
    assert_eq!(view.enroll_student_select.groups[0].options[0].label, "Ana Silva (2024001)");

    assert!(matches!(view.report, ReportPanel::Ready(_)));
}

#[tokio::test]
async fn test_attendance_flow_keeps_subject() {
    let backend = Arc::new(MockBackend::new());
    let class = backend.add_class("3º Ano A", 2024, "Manhã").await;
    let subject = backend.add_subject("Matemática", "MAT301", 80, "Helena Prado").await;
    let student = backend.add_student("Ana Silva", "2024001", class).await;
    backend.add_enrollment(student, subject).await;

    let mut page = controller(&backend);
    assert_ok!(page.select_subject(&subject.to_string()).await);
    assert_eq!(page.view().attendance_student_select.options.len(), 1);

    assert_ok!(page.select_student(&student.to_string()).await);
    let card = page.view().attendance_card.clone().unwrap();
    assert_eq!(card.student_name, "Ana Silva");
    assert_eq!(card.professor, "Helena Prado");

    page.set_note("Atestado médico");
    assert_ok!(page.mark_attendance(false, true).await);

    assert_eq!(latest(&page), "Frequência registrada: Falta Justificada");
    assert_eq!(page.current_subject(), Some(subject));
    assert_eq!(page.current_student(), None);
    assert!(page.view().attendance_card.is_none());
    assert!(page.view().attendance_note.is_empty());
    assert!(page.view().attendance_student_select.selected.is_empty());
    assert_eq!(backend.last_note().await.as_deref(), Some("Atestado médico"));

    // Marking does not regenerate the report
    let requests = backend.requests().await;
    assert_eq!(requests.last().map(String::as_str), Some("POST /frequencias/individual/"));
}

#[tokio::test]
async fn test_mark_without_enrollment_is_rejected_by_backend() {
    let backend = Arc::new(MockBackend::new());
    let class = backend.add_class("3º Ano A", 2024, "Manhã").await;
    let subject = backend.add_subject("Matemática", "MAT301", 80, "Helena Prado").await;
    let student = backend.add_student("Ana Silva", "2024001", class).await;

    let mut page = controller(&backend);
    assert_ok!(page.select_subject(&subject.to_string()).await);
    assert_eq!(page.view().attendance_student_select.placeholder, NO_ENROLLED_STUDENTS);

    // Not enrolled: the card stays hidden
    assert_ok!(page.select_student(&student.to_string()).await);
    assert!(page.view().attendance_card.is_none());

    assert_err!(page.mark_attendance(true, false).await);
    assert_eq!(latest(&page), "Erro: HTTP error! status: 400");
    assert_eq!(page.current_student(), Some(student));
}

#[tokio::test]
async fn test_enroll_only_student_is_validation() {
    let backend = Arc::new(MockBackend::new());
    let mut page = controller(&backend);

    assert_err!(page.enroll("1", "").await);
    assert_eq!(latest(&page), SELECTION_REQUIRED);
    assert!(backend.requests().await.is_empty());
}

#[tokio::test]
async fn test_enroll_messages() {
    let backend = Arc::new(MockBackend::new());
    let class = backend.add_class("3º Ano A", 2024, "Manhã").await;
    let subject = backend.add_subject("Matemática", "MAT301", 80, "Helena Prado").await;
    let student = backend.add_student("Ana Silva", "2024001", class).await;
    let mut page = controller(&backend);

    assert_ok!(page.enroll(&student.to_string(), &subject.to_string()).await);
    assert!(page
        .view()
        .notices
        .all()
        .iter()
        .any(|n| n.message == "Aluno Ana Silva matriculado em Matemática"));
    assert!(backend.is_enrolled(student, subject).await);
    assert!(page.view().enroll_subject_select.selected.is_empty());

    assert_err!(page.enroll(&student.to_string(), &subject.to_string()).await);
    assert_eq!(latest(&page), "Erro: Matrícula não realizada");
    assert_ne!(latest(&page), STUDENT_ENROLLED);
}

#[tokio::test]
async fn test_create_class_then_refresh() {
    let backend = Arc::new(MockBackend::new());
    backend.add_subject("Matemática", "MAT301", 80, "Helena Prado").await;
    let mut page = controller(&backend);

    let form = ClassForm {
        name: "3º Ano A".into(),
        year: "2024".into(),
        period: "Manhã".into(),
    };
    assert_ok!(page.create_class(form).await);

    assert!(page.view().notices.all().iter().any(|n| n.message == CLASS_CREATED));
    assert_eq!(page.view().class_form, ClassForm::default());
    assert_eq!(page.view().class_select.options.len(), 1);
    assert!(matches!(page.view().report, ReportPanel::Ready(_)));
    assert_eq!(latest(&page), REPORT_UPDATED);
}

#[tokio::test]
async fn test_invalid_year_keeps_form() {
    let backend = Arc::new(MockBackend::new());
    let mut page = controller(&backend);

    let form = ClassForm {
        name: "3º Ano A".into(),
        year: "dois mil".into(),
        period: "Manhã".into(),
    };
    assert_err!(page.create_class(form).await);

    assert_eq!(latest(&page), "Erro: HTTP error! status: 422");
    assert_eq!(page.view().class_form.year, "dois mil");
    assert_eq!(backend.list_classes().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_student_without_email() {
    let backend = Arc::new(MockBackend::new());
    let class = backend.add_class("3º Ano A", 2024, "Manhã").await;
    let mut page = controller(&backend);

    let form = StudentForm {
        name: "Ana Silva".into(),
        registration: "2024001".into(),
        email: String::new(),
        class_id: class.to_string(),
    };
    assert_ok!(page.create_student(form).await);

    assert!(page.view().notices.all().iter().any(|n| n.message == STUDENT_CREATED));
    let students = backend.list_class_students(class).await.unwrap();
    assert_eq!(students[0].email, None);
    assert_eq!(page.view().enroll_student_select.groups.len(), 1);
}

#[tokio::test]
async fn test_export_class_csv() {
    let backend = Arc::new(MockBackend::demo());
    let mut page = controller(&backend);
    let classes = backend.list_classes().await.unwrap();

    let csv = page.export_class_csv(classes[0].id).await.unwrap();
    assert!(csv.starts_with("nome,matricula,total_sessoes"));

    assert_err!(page.export_class_csv(classes[2].id).await);
    assert_eq!(latest(&page), "Erro: HTTP error! status: 500");
}

#[tokio::test]
async fn test_changing_subject_keeps_current_student() {
    let backend = Arc::new(MockBackend::new());
    let class = backend.add_class("3º Ano A", 2024, "Manhã").await;
    let math = backend.add_subject("Matemática", "MAT301", 80, "Helena Prado").await;
    let history = backend.add_subject("História", "HIS301", 40, "Lúcia Ramos").await;
    let student = backend.add_student("Ana Silva", "2024001", class).await;
    backend.add_enrollment(student, math).await;

    let mut page = controller(&backend);
    assert_ok!(page.select_subject(&math.to_string()).await);
    assert_ok!(page.select_student(&student.to_string()).await);
    assert!(page.view().attendance_card.is_some());

    assert_ok!(page.select_subject(&history.to_string()).await);
    let select = &page.view().attendance_student_select;
    assert!(select.options.is_empty());
    assert!(select.selected.is_empty());
    assert_eq!(select.placeholder, NO_ENROLLED_STUDENTS);
    assert_eq!(page.current_student(), Some(student));
    assert_eq!(page.current_subject(), Some(history));
}

#[tokio::test]
async fn test_failed_start_shows_error_state_with_refresh() {
    let backend = Arc::new(MockBackend::demo());
    backend.fail(paths::CLASSES, 500).await;
    let mut page = controller(&backend);

    assert_err!(page.init().await);
    assert!(matches!(page.view().report, ReportPanel::Failed));
    let html = report_html(&page);
    assert!(html.contains("Erro ao carregar relatório"));
    assert!(html.contains(r#"action="/relatorio/atualizar""#));
}

#[tokio::test]
async fn test_reload_recovers_from_failed_start() {
    let backend = Arc::new(MockBackend::demo());
    backend.fail(paths::CLASSES, 500).await;
    backend.fail(paths::SUBJECTS, 500).await;
    let mut page = controller(&backend);
    assert_err!(page.init().await);
    assert!(page.view().class_select.options.is_empty());

    backend.clear_failures().await;
    backend.clear_requests().await;
    assert_ok!(page.reload().await);

    assert_eq!(page.view().class_select.options.len(), 3);
    assert_eq!(page.view().attendance_subject_select.options.len(), 3);
    assert_eq!(page.view().enroll_student_select.groups.len(), 1);
    assert!(matches!(page.view().report, ReportPanel::Ready(_)));
    assert_eq!(latest(&page), REPORT_UPDATED);
    assert!(!backend.requests().await.is_empty());
}

#[tokio::test]
async fn test_reload_keeps_a_generated_report() {
    let backend = Arc::new(MockBackend::demo());
    let mut page = controller(&backend);
    assert_ok!(page.init().await);
    assert_ok!(page.select_subject("4").await);
    assert_ok!(page.select_student("7").await);

    backend.clear_requests().await;
    assert_ok!(page.reload().await);

    let requests = backend.requests().await;
    assert!(requests.iter().all(|r| !r.starts_with("GET /relatorio/")));
    assert_eq!(requests.last().map(String::as_str), Some("GET /disciplinas/4/alunos/"));
    // The operator's place survives the refill
    assert_eq!(page.view().attendance_student_select.selected, "7");
    assert!(page.view().attendance_card.is_some());
}

#[tokio::test]
async fn test_deferred_reload_queues_one_refresh() {
    let backend = Arc::new(MockBackend::demo());
    let options = ControllerOptions {
        initial_refresh: RefreshPolicy::Deferred(Duration::from_millis(1000)),
        ..ControllerOptions::default()
    };
    let mut page = PageController::new(backend.clone(), options);

    assert_ok!(page.reload().await);
    assert_eq!(page.take_pending_refresh(), Some(Duration::from_millis(1000)));
    assert!(matches!(page.view().report, ReportPanel::Loading));

    // Still waiting for the first one
    assert_ok!(page.reload().await);
    assert_eq!(page.take_pending_refresh(), None);

    assert_ok!(page.refresh_report().await);
    assert!(matches!(page.view().report, ReportPanel::Ready(_)));
}
