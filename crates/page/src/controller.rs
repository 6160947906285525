//! Page controller
//!
//! Owns the page view and the two attendance selections, and runs every
//! page action against the backend. Failures are turned into banners here;
//! the returned error only tells the caller to stop its own follow-up work.

use crate::notify::Notifier;
use crate::view::{
    class_options, parse_i32, parse_id, student_options, subject_options, AttendanceCard,
    ClassForm, OptionGroup, PageView, ReportPanel, StudentForm, SubjectForm, CLASS_PLACEHOLDER,
    NO_ENROLLED_STUDENTS, STUDENT_PLACEHOLDER, SUBJECT_PLACEHOLDER,
};
use frequencia_common::config::{AppConfig, NoticeTiming, RefreshPolicy};
use frequencia_common::metrics::record_report;
use frequencia_common::models::{
    AttendanceEntry, AttendanceMark, EnrollmentRequest, Id, NewClass, NewStudent, NewSubject,
};
use frequencia_common::{AppError, Backend, Result};
use frequencia_report::{collect_report, render, CollectOptions, RenderOptions};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const CLASS_CREATED: &str = "Turma criada com sucesso!";
pub const SUBJECT_CREATED: &str = "Disciplina cadastrada com sucesso!";
pub const STUDENT_CREATED: &str = "Aluno cadastrado com sucesso!";
pub const STUDENT_ENROLLED: &str = "Aluno matriculado com sucesso!";
pub const REPORT_UPDATED: &str = "Relatório atualizado!";
pub const CLASS_REQUIRED: &str = "Selecione uma turma!";
pub const SELECTION_REQUIRED: &str = "Selecione aluno e disciplina!";

/// Controller settings
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Report refresh after a successful mutation
    pub refresh: RefreshPolicy,
    /// Report refresh at the end of `init`
    pub initial_refresh: RefreshPolicy,
    pub collect: CollectOptions,
    pub render: RenderOptions,
    pub timing: NoticeTiming,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            refresh: RefreshPolicy::Inline,
            initial_refresh: RefreshPolicy::Inline,
            collect: CollectOptions::default(),
            render: RenderOptions::default(),
            timing: NoticeTiming::default(),
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            refresh: config.refresh_policy(),
            initial_refresh: config.initial_refresh_policy(),
            collect: CollectOptions {
                max_in_flight: config.report.max_in_flight,
            },
            render: RenderOptions::default(),
            timing: config.notice_timing(),
        }
    }
}

pub struct PageController {
    backend: Arc<dyn Backend>,
    view: PageView,
    current_student: Option<Id>,
    current_subject: Option<Id>,
    options: ControllerOptions,
    pending_refresh: Option<Duration>,
    /// A deferred refresh is waiting to run
    refresh_queued: bool,
}

impl PageController {
    pub fn new(backend: Arc<dyn Backend>, options: ControllerOptions) -> Self {
        Self {
            backend,
            view: PageView::new(Notifier::new(options.timing)),
            current_student: None,
            current_subject: None,
            options,
            pending_refresh: None,
            refresh_queued: false,
        }
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut PageView {
        &mut self.view
    }

    pub fn current_student(&self) -> Option<Id> {
        self.current_student
    }

    pub fn current_subject(&self) -> Option<Id> {
        self.current_subject
    }

    /// Where the report's controls post to
    pub fn render_options(&self) -> &RenderOptions {
        &self.options.render
    }

    /// Delay of a deferred report refresh the host has yet to run
    pub fn take_pending_refresh(&mut self) -> Option<Duration> {
        self.pending_refresh.take()
    }

    /// Banner and log for a failed request
    fn check<T>(&mut self, operation: &str, result: Result<T>) -> Result<T> {
        result.map_err(|e| {
            tracing::error!(operation, error = %e, "Backend request failed");
            self.view.notices.error(format!("Erro: {}", e));
            e
        })
    }

    /// Banner for a missing selection; nothing is logged
    fn invalid(&mut self, message: &str) -> Result<()> {
        self.view.notices.error(message);
        Err(AppError::validation(message))
    }

    async fn schedule_refresh(&mut self, policy: RefreshPolicy) {
        match policy {
            RefreshPolicy::Inline => {
                // Failure is already on screen
                let _ = self.refresh_report().await;
            }
            RefreshPolicy::Deferred(delay) => {
                self.pending_refresh = Some(delay);
                self.refresh_queued = true;
            }
        }
    }

    async fn load_pickers(&mut self) -> Result<()> {
        let classes = self.load_classes().await;
        let subjects = self.load_subjects().await;
        let students = self.load_students().await;
        classes.and(subjects).and(students)
    }

    /// Fill every list, then produce the first report
    pub async fn init(&mut self) -> Result<()> {
        let loaded = self.load_pickers().await;
        self.schedule_refresh(self.options.initial_refresh).await;
        loaded
    }

    /// Page load: refill every list and the attendance students of the
    /// selected subject, then produce a report unless one is on screen
    ///
    /// Selections that still exist survive the refill, so a redirect back
    /// to the page keeps the operator's place.
    pub async fn reload(&mut self) -> Result<()> {
        let loaded = self.load_pickers().await;
        let attendance = self.load_students_for_subject().await;
        let on_screen = matches!(self.view.report, ReportPanel::Ready(_));
        if !on_screen && !self.refresh_queued {
            self.schedule_refresh(self.options.initial_refresh).await;
        }
        loaded.and(attendance)
    }

    pub async fn create_class(&mut self, form: ClassForm) -> Result<()> {
        let class = NewClass {
            name: form.name.clone(),
            year: parse_i32(&form.year),
            period: form.period.clone(),
        };
        self.view.class_form = form;

        let result = self.backend.create_class(&class).await;
        let created = self.check("create_class", result)?;
        tracing::info!(class_id = created.id, "Class created");

        self.view.notices.success(CLASS_CREATED);
        self.view.class_form = ClassForm::default();
        let _ = self.load_classes().await;
        self.schedule_refresh(self.options.refresh).await;
        Ok(())
    }

    pub async fn create_subject(&mut self, form: SubjectForm) -> Result<()> {
        let subject = NewSubject {
            name: form.name.clone(),
            code: form.code.clone(),
            weekly_hours: parse_i32(&form.weekly_hours),
            professor: form.professor.clone(),
        };
        self.view.subject_form = form;

        let result = self.backend.create_subject(&subject).await;
        let created = self.check("create_subject", result)?;
        tracing::info!(subject_id = created.id, "Subject created");

        self.view.notices.success(SUBJECT_CREATED);
        self.view.subject_form = SubjectForm::default();
        let _ = self.load_subjects().await;
        self.schedule_refresh(self.options.refresh).await;
        Ok(())
    }

    pub async fn create_student(&mut self, form: StudentForm) -> Result<()> {
        self.view.class_select.select(&form.class_id);
        let class_id = parse_id(&form.class_id);
        let student = NewStudent {
            name: form.name.clone(),
            registration: form.registration.clone(),
            email: (!form.email.is_empty()).then(|| form.email.clone()),
            class_id: class_id.unwrap_or_default(),
            subject_ids: Vec::new(),
        };
        self.view.student_form = form;

        if class_id.is_none() {
            return self.invalid(CLASS_REQUIRED);
        }

        let result = self.backend.create_student(&student).await;
        let created = self.check("create_student", result)?;
        tracing::info!(student_id = created.id, class_id = created.class_id, "Student created");

        self.view.notices.success(STUDENT_CREATED);
        self.view.student_form = StudentForm::default();
        self.view.class_select.clear_selection();
        let _ = self.load_students().await;
        self.schedule_refresh(self.options.refresh).await;
        Ok(())
    }

    /// Enroll the student picked in the grouped picker into a subject
    pub async fn enroll(&mut self, student: &str, subject: &str) -> Result<()> {
        self.view.enroll_student_select.select(student);
        self.view.enroll_subject_select.select(subject);

        let (Some(student_id), Some(subject_id)) = (parse_id(student), parse_id(subject)) else {
            return self.invalid(SELECTION_REQUIRED);
        };

        let request = EnrollmentRequest {
            student_id,
            subject_id,
        };
        let result = self.backend.enroll(&request).await;
        let response = self.check("enroll", result)?;

        // The backend refuses with 200 and an error text
        if let (None, Some(error)) = (&response.message, &response.error) {
            tracing::warn!(student_id, subject_id, error = %error, "Enrollment refused");
            self.view.notices.error(format!("Erro: {}", error));
            return Err(AppError::validation(error.clone()));
        }

        let message = response
            .message
            .unwrap_or_else(|| STUDENT_ENROLLED.to_string());
        self.view.notices.success(message);
        self.view.enroll_student_select.clear_selection();
        self.view.enroll_subject_select.clear_selection();
        self.schedule_refresh(self.options.refresh).await;
        Ok(())
    }

    /// Change of the attendance subject picker
    pub async fn select_subject(&mut self, value: &str) -> Result<()> {
        self.view.attendance_subject_select.select(value);
        self.current_subject = parse_id(value);
        self.load_students_for_subject().await
    }

    /// Change of the attendance student picker
    pub async fn select_student(&mut self, value: &str) -> Result<()> {
        self.view.attendance_student_select.select(value);
        self.current_student = parse_id(value);
        self.show_attendance_card().await
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.view.attendance_note = note.into();
    }

    /// Record attendance for the selected student in the selected subject
    ///
    /// The subject stays selected so the next student can be marked right
    /// away; the student, the note and the card are cleared.
    pub async fn mark_attendance(&mut self, present: bool, justified: bool) -> Result<()> {
        let (Some(student_id), Some(subject_id)) = (self.current_student, self.current_subject)
        else {
            return self.invalid(SELECTION_REQUIRED);
        };

        let note = &self.view.attendance_note;
        let entry = AttendanceEntry {
            student_id,
            subject_id,
            present,
            justified,
            note: (!note.is_empty()).then(|| note.clone()),
        };
        let result = self.backend.record_attendance(&entry).await;
        self.check("mark_attendance", result)?;

        let mark = AttendanceMark::from_flags(present, justified);
        tracing::info!(student_id, subject_id, mark = mark.label(), "Attendance recorded");
        self.view
            .notices
            .success(format!("Frequência registrada: {}", mark.label()));

        self.view.attendance_note.clear();
        self.view.attendance_student_select.clear_selection();
        self.view.attendance_card = None;
        self.current_student = None;
        Ok(())
    }

    pub async fn load_classes(&mut self) -> Result<()> {
        let result = self.backend.list_classes().await;
        let classes = self.check("load_classes", result)?;
        self.view
            .class_select
            .replace(CLASS_PLACEHOLDER, class_options(&classes));
        Ok(())
    }

    /// Fill the enrollment and attendance subject pickers from one listing
    pub async fn load_subjects(&mut self) -> Result<()> {
        let result = self.backend.list_subjects().await;
        let subjects = self.check("load_subjects", result)?;
        let options = subject_options(&subjects);
        self.view
            .enroll_subject_select
            .replace(SUBJECT_PLACEHOLDER, options.clone());
        self.view
            .attendance_subject_select
            .replace(SUBJECT_PLACEHOLDER, options);
        Ok(())
    }

    /// Fill the grouped enrollment picker, one group per non-empty class
    ///
    /// A failed class listing stops the walk; the groups gathered so far
    /// are kept.
    pub async fn load_students(&mut self) -> Result<()> {
        let result = self.backend.list_classes().await;
        let classes = self.check("load_students", result)?;

        let mut groups = Vec::new();
        let mut outcome = Ok(());
        for class in &classes {
            match self.backend.list_class_students(class.id).await {
                Ok(students) if students.is_empty() => {}
                Ok(students) => groups.push(OptionGroup {
                    label: class.group_label(),
                    options: student_options(&students),
                }),
                Err(e) => {
                    outcome = self.check("load_students", Err(e));
                    break;
                }
            }
        }

        self.view.enroll_student_select.replace(groups);
        outcome
    }

    /// Fill the attendance student picker for the selected subject
    pub async fn load_students_for_subject(&mut self) -> Result<()> {
        let Some(subject_id) = self.current_subject else {
            return Ok(());
        };

        let result = self.backend.list_subject_students(subject_id).await;
        let students = self.check("load_students_for_subject", result)?;
        let select = &mut self.view.attendance_student_select;
        if students.is_empty() {
            select.replace(NO_ENROLLED_STUDENTS, Vec::new());
        } else {
            select.replace(STUDENT_PLACEHOLDER, student_options(&students));
        }
        Ok(())
    }

    /// Show the card of the selected student
    ///
    /// Does nothing while a selection is missing or when the student is no
    /// longer enrolled in the subject.
    pub async fn show_attendance_card(&mut self) -> Result<()> {
        let (Some(student_id), Some(subject_id)) = (self.current_student, self.current_subject)
        else {
            return Ok(());
        };

        let result = self.backend.list_subject_students(subject_id).await;
        let students = self.check("show_attendance_card", result)?;
        let Some(student) = students.into_iter().find(|s| s.id == student_id) else {
            tracing::debug!(student_id, subject_id, "Selected student not in subject");
            return Ok(());
        };

        let result = self.backend.get_subject(subject_id).await;
        let subject = self.check("show_attendance_card", result)?;
        self.view.attendance_card = Some(AttendanceCard::new(&student, &subject));
        Ok(())
    }

    /// Regenerate the report container
    #[tracing::instrument(skip(self))]
    pub async fn refresh_report(&mut self) -> Result<()> {
        self.refresh_queued = false;
        let listed = match self.backend.list_classes().await {
            Ok(classes) => self
                .backend
                .list_subjects()
                .await
                .map(|subjects| (classes, subjects)),
            Err(e) => Err(e),
        };
        let (classes, subjects) = match listed {
            Ok(lists) => lists,
            Err(e) => {
                self.view.report = ReportPanel::Failed;
                record_report("failed");
                return self.check("refresh_report", Err(e));
            }
        };

        if classes.is_empty() || subjects.is_empty() {
            tracing::debug!("Nothing to report yet");
            self.view.report = ReportPanel::Empty;
            record_report("empty");
            return Ok(());
        }

        let collected =
            collect_report(self.backend.as_ref(), &classes, &subjects, &self.options.collect).await;
        match collected {
            Ok(data) => {
                self.view.report = ReportPanel::Ready(render::report(&data, &self.options.render));
                record_report("rendered");
                self.view.notices.success(REPORT_UPDATED);
                Ok(())
            }
            Err(e) => {
                self.view.report = ReportPanel::Failed;
                record_report("failed");
                self.check("generate_report", Err(e))
            }
        }
    }

    pub fn dismiss_notice(&mut self, id: Uuid) -> bool {
        self.view.notices.dismiss(id)
    }

    /// CSV export of one class
    pub async fn export_class_csv(&mut self, class_id: Id) -> Result<String> {
        let result = self.backend.export_class_csv(class_id).await;
        self.check("export_class_csv", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frequencia_common::MockBackend;

    fn controller(backend: &Arc<MockBackend>) -> PageController {
        PageController::new(backend.clone(), ControllerOptions::default())
    }

    #[tokio::test]
    async fn test_student_without_class_issues_no_request() {
        let backend = Arc::new(MockBackend::new());
        let mut page = controller(&backend);

        let form = StudentForm {
            name: "Ana".into(),
            registration: "2024001".into(),
            ..StudentForm::default()
        };
        let err = page.create_student(form).await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(backend.requests().await.is_empty());
        assert_eq!(page.view().notices.latest().unwrap().message, CLASS_REQUIRED);
        // The typed values survive the failed submit
        assert_eq!(page.view().student_form.name, "Ana");
    }

    #[tokio::test]
    async fn test_enroll_needs_both_ids() {
        let backend = Arc::new(MockBackend::new());
        let mut page = controller(&backend);

        assert!(page.enroll("3", "").await.is_err());
        assert!(backend.requests().await.is_empty());
        assert_eq!(page.view().notices.latest().unwrap().message, SELECTION_REQUIRED);
    }

    #[tokio::test]
    async fn test_mark_needs_selection() {
        let backend = Arc::new(MockBackend::new());
        let mut page = controller(&backend);

        assert!(page.mark_attendance(true, false).await.is_err());
        page.select_student("4").await.unwrap();
        assert!(page.mark_attendance(false, true).await.is_err());
        // Selecting a student with no subject makes no request either
        assert!(backend.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_request_failure_is_notified() {
        let backend = Arc::new(MockBackend::new());
        backend.fail("/turmas/", 500).await;
        let mut page = controller(&backend);

        assert!(page.load_classes().await.is_err());
        let notice = page.view().notices.latest().unwrap();
        assert_eq!(notice.message, "Erro: HTTP error! status: 500");
    }

    #[tokio::test]
    async fn test_deferred_refresh_is_left_for_the_host() {
        let backend = Arc::new(MockBackend::new());
        let options = ControllerOptions {
            refresh: RefreshPolicy::Deferred(Duration::from_millis(500)),
            ..ControllerOptions::default()
        };
        let mut page = PageController::new(backend.clone(), options);

        let form = ClassForm {
            name: "3º Ano A".into(),
            year: "2024".into(),
            period: "Manhã".into(),
        };
        page.create_class(form).await.unwrap();

        assert_eq!(page.take_pending_refresh(), Some(Duration::from_millis(500)));
        assert_eq!(page.take_pending_refresh(), None);
        assert_eq!(
            backend.requests().await,
            vec!["POST /turmas/".to_string(), "GET /turmas/".to_string()]
        );
    }
}
