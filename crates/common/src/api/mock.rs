//! In-memory attendance backend for testing and demo mode
//!
//! Mirrors the REST backend's observable behaviour: id assignment,
//! the enrollment rule for attendance, one session per class/subject/day
//! and the summary arithmetic. Every call is appended to a bounded request
//! log and any path can be made to fail with a given status.

use super::{paths, Backend};
use crate::errors::{AppError, Result};
use crate::models::{
    AttendanceEntry, AttendanceSummary, Class, EnrollmentRequest, EnrollmentResponse, Id,
    MessageResponse, NewClass, NewStudent, NewSubject, Student, Subject,
};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, VecDeque};
use tokio::sync::Mutex;

/// Entries kept in the request log; older ones are dropped first
const REQUEST_LOG_LIMIT: usize = 1024;

/// Lesson of a class in a subject on one mock day
#[derive(Debug, Clone)]
struct Session {
    id: Id,
    class_id: Id,
    subject_id: Id,
    day: u32,
}

#[derive(Debug, Clone)]
struct Record {
    student_id: Id,
    session_id: Id,
    present: bool,
    justified: bool,
    note: Option<String>,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: Id,
    day: u32,
    classes: Vec<Class>,
    subjects: Vec<Subject>,
    students: Vec<Student>,
    /// (student, subject)
    enrollments: BTreeSet<(Id, Id)>,
    sessions: Vec<Session>,
    records: Vec<Record>,
    failures: HashMap<String, u16>,
    log: VecDeque<String>,
}

impl MockState {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn add_class(&mut self, name: &str, year: i32, period: &str) -> Id {
        let id = self.next_id();
        self.classes.push(Class {
            id,
            name: name.to_string(),
            year,
            period: period.to_string(),
        });
        id
    }

    fn add_subject(&mut self, name: &str, code: &str, weekly_hours: i32, professor: &str) -> Id {
        let id = self.next_id();
        self.subjects.push(Subject {
            id,
            name: name.to_string(),
            code: code.to_string(),
            weekly_hours,
            professor: professor.to_string(),
        });
        id
    }

    fn add_student(&mut self, name: &str, registration: &str, class_id: Id) -> Id {
        let id = self.next_id();
        self.students.push(Student {
            id,
            name: name.to_string(),
            registration: registration.to_string(),
            email: None,
            class_id,
        });
        id
    }

    fn student(&self, id: Id) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    fn subject(&self, id: Id) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Today's session for the class and subject, created on first use
    fn session_for_today(&mut self, class_id: Id, subject_id: Id) -> Id {
        let day = self.day;
        if let Some(session) = self
            .sessions
            .iter()
            .find(|s| s.class_id == class_id && s.subject_id == subject_id && s.day == day)
        {
            return session.id;
        }
        let id = self.next_id();
        self.sessions.push(Session {
            id,
            class_id,
            subject_id,
            day,
        });
        id
    }

    fn upsert_record(&mut self, record: Record) {
        match self
            .records
            .iter_mut()
            .find(|r| r.student_id == record.student_id && r.session_id == record.session_id)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    fn mark(&mut self, entry: &AttendanceEntry) -> Result<()> {
        let class_id = self
            .student(entry.student_id)
            .map(|s| s.class_id)
            .ok_or(AppError::Request { status: 400 })?;
        if self.subject(entry.subject_id).is_none()
            || !self.enrollments.contains(&(entry.student_id, entry.subject_id))
        {
            return Err(AppError::Request { status: 400 });
        }

        let session_id = self.session_for_today(class_id, entry.subject_id);
        self.upsert_record(Record {
            student_id: entry.student_id,
            session_id,
            present: entry.present,
            justified: entry.justified,
            note: entry.note.clone(),
        });
        Ok(())
    }

    fn summarize(&self, student_id: Id, subject_id: Option<Id>) -> AttendanceSummary {
        let mut presences = 0;
        let mut absences = 0;
        let mut justified = 0;

        for record in self.records.iter().filter(|r| r.student_id == student_id) {
            if let Some(subject_id) = subject_id {
                let in_subject = self
                    .sessions
                    .iter()
                    .any(|s| s.id == record.session_id && s.subject_id == subject_id);
                if !in_subject {
                    continue;
                }
            }
            if record.present {
                presences += 1;
            } else {
                absences += 1;
                if record.justified {
                    justified += 1;
                }
            }
        }

        let summary = AttendanceSummary::from_counts(student_id, presences, absences, justified);
        match subject_id {
            Some(subject_id) => summary.for_subject(subject_id),
            None => summary,
        }
    }

    /// Log the call and apply any injected failure
    fn enter(&mut self, method: &str, path: &str) -> Result<()> {
        if self.log.len() == REQUEST_LOG_LIMIT {
            self.log.pop_front();
        }
        self.log.push_back(format!("{} {}", method, path));
        match self.failures.get(path) {
            Some(&status) => Err(AppError::Request { status }),
            None => Ok(()),
        }
    }
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with a sample school
    pub fn demo() -> Self {
        let mut state = MockState::default();

        let first = state.add_class("3º Ano A", 2024, "Manhã");
        state.add_class("2º Ano B", 2024, "Tarde");
        state.add_class("1º Ano C", 2024, "Noite");

        let subjects = [
            state.add_subject("Matemática", "MAT301", 80, "Helena Prado"),
            state.add_subject("Português", "POR301", 80, "Marcos Teixeira"),
            state.add_subject("História", "HIS301", 40, "Lúcia Ramos"),
        ];

        let students = [
            state.add_student("Ana Silva", "2024001", first),
            state.add_student("Bruno Santos", "2024002", first),
            state.add_student("Carlos Oliveira", "2024003", first),
            state.add_student("Diana Costa", "2024004", first),
            state.add_student("Eduardo Lima", "2024005", first),
        ];

        for &student in &students {
            for &subject in &subjects {
                state.enrollments.insert((student, subject));
            }
        }

        // Four lesson days with a different pattern per student
        for day in 0..4u32 {
            state.day = day;
            for (index, &student) in students.iter().enumerate() {
                let present = match index {
                    0 => true,
                    1 => day != 2,
                    2 => day % 2 == 0,
                    _ => (day + index as u32) % 2 == 0,
                };
                let justified = !present && index != 3;
                for &subject in &subjects {
                    let entry = AttendanceEntry {
                        student_id: student,
                        subject_id: subject,
                        present,
                        justified,
                        note: justified.then(|| "Atestado médico".to_string()),
                    };
                    // Every demo student is enrolled, so marking cannot fail
                    let _ = state.mark(&entry);
                }
            }
        }
        state.day = 4;

        Self {
            state: Mutex::new(state),
        }
    }

    pub async fn add_class(&self, name: &str, year: i32, period: &str) -> Id {
        self.state.lock().await.add_class(name, year, period)
    }

    pub async fn add_subject(
        &self,
        name: &str,
        code: &str,
        weekly_hours: i32,
        professor: &str,
    ) -> Id {
        self.state
            .lock()
            .await
            .add_subject(name, code, weekly_hours, professor)
    }

    pub async fn add_student(&self, name: &str, registration: &str, class_id: Id) -> Id {
        self.state
            .lock()
            .await
            .add_student(name, registration, class_id)
    }

    pub async fn add_enrollment(&self, student_id: Id, subject_id: Id) {
        self.state
            .lock()
            .await
            .enrollments
            .insert((student_id, subject_id));
    }

    /// Seed one attendance record on the current day, bypassing the log
    pub async fn add_attendance(
        &self,
        student_id: Id,
        subject_id: Id,
        present: bool,
        justified: bool,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.enrollments.insert((student_id, subject_id));
        state.mark(&AttendanceEntry {
            student_id,
            subject_id,
            present,
            justified,
            note: None,
        })
    }

    /// Move to the next lesson day so new marks open new sessions
    pub async fn advance_day(&self) {
        self.state.lock().await.day += 1;
    }

    /// Make every request to `path` fail with `status`
    pub async fn fail(&self, path: impl Into<String>, status: u16) {
        self.state.lock().await.failures.insert(path.into(), status);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    /// Requests seen so far, as `"METHOD /path"`
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.log.iter().cloned().collect()
    }

    pub async fn clear_requests(&self) {
        self.state.lock().await.log.clear();
    }

    pub async fn is_enrolled(&self, student_id: Id, subject_id: Id) -> bool {
        self.state
            .lock()
            .await
            .enrollments
            .contains(&(student_id, subject_id))
    }

    /// Number of stored attendance records
    pub async fn record_count(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn last_note(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .records
            .last()
            .and_then(|r| r.note.clone())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn list_classes(&self) -> Result<Vec<Class>> {
        let mut state = self.state.lock().await;
        state.enter("GET", paths::CLASSES)?;
        Ok(state.classes.clone())
    }

    async fn create_class(&self, class: &NewClass) -> Result<Class> {
        let mut state = self.state.lock().await;
        state.enter("POST", paths::CLASSES)?;
        let year = class.year.ok_or(AppError::Request { status: 422 })?;
        if state.classes.iter().any(|c| c.name == class.name) {
            return Err(AppError::Request { status: 500 });
        }
        let id = state.add_class(&class.name, year, &class.period);
        Ok(Class {
            id,
            name: class.name.clone(),
            year,
            period: class.period.clone(),
        })
    }

    async fn list_class_students(&self, class_id: Id) -> Result<Vec<Student>> {
        let mut state = self.state.lock().await;
        state.enter("GET", &paths::class_students(class_id))?;
        Ok(state
            .students
            .iter()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        let mut state = self.state.lock().await;
        state.enter("GET", paths::SUBJECTS)?;
        Ok(state.subjects.clone())
    }

    async fn create_subject(&self, subject: &NewSubject) -> Result<Subject> {
        let mut state = self.state.lock().await;
        state.enter("POST", paths::SUBJECTS)?;
        let weekly_hours = subject.weekly_hours.ok_or(AppError::Request { status: 422 })?;
        if state
            .subjects
            .iter()
            .any(|s| s.name == subject.name || s.code == subject.code)
        {
            return Err(AppError::Request { status: 500 });
        }
        let id = state.add_subject(&subject.name, &subject.code, weekly_hours, &subject.professor);
        state
            .subject(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("disciplina", id))
    }

    async fn get_subject(&self, subject_id: Id) -> Result<Subject> {
        let mut state = self.state.lock().await;
        state.enter("GET", &paths::subject(subject_id))?;
        state
            .subject(subject_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("disciplina", subject_id))
    }

    async fn list_subject_students(&self, subject_id: Id) -> Result<Vec<Student>> {
        let mut state = self.state.lock().await;
        state.enter("GET", &paths::subject_students(subject_id))?;
        Ok(state
            .students
            .iter()
            .filter(|s| state.enrollments.contains(&(s.id, subject_id)))
            .cloned()
            .collect())
    }

    async fn create_student(&self, student: &NewStudent) -> Result<Student> {
        let mut state = self.state.lock().await;
        state.enter("POST", paths::STUDENTS)?;
        if state.students.iter().any(|s| s.registration == student.registration) {
            return Err(AppError::Request { status: 500 });
        }
        let id = state.add_student(&student.name, &student.registration, student.class_id);
        for &subject_id in &student.subject_ids {
            if state.subject(subject_id).is_some() {
                state.enrollments.insert((id, subject_id));
            }
        }
        let created = Student {
            id,
            name: student.name.clone(),
            registration: student.registration.clone(),
            email: student.email.clone(),
            class_id: student.class_id,
        };
        if let Some(stored) = state.students.iter_mut().find(|s| s.id == id) {
            *stored = created.clone();
        }
        Ok(created)
    }

    async fn enroll(&self, request: &EnrollmentRequest) -> Result<EnrollmentResponse> {
        let mut state = self.state.lock().await;
        state.enter("POST", paths::ENROLL)?;
        let key = (request.student_id, request.subject_id);
        let names = state
            .student(request.student_id)
            .zip(state.subject(request.subject_id))
            .map(|(student, subject)| (student.name.clone(), subject.name.clone()));

        match names {
            Some((student, subject)) if !state.enrollments.contains(&key) => {
                state.enrollments.insert(key);
                Ok(EnrollmentResponse {
                    message: Some(format!("Aluno {} matriculado em {}", student, subject)),
                    error: None,
                })
            }
            _ => Ok(EnrollmentResponse {
                message: None,
                error: Some("Matrícula não realizada".to_string()),
            }),
        }
    }

    async fn record_attendance(&self, entry: &AttendanceEntry) -> Result<MessageResponse> {
        let mut state = self.state.lock().await;
        state.enter("POST", paths::ATTENDANCE)?;
        state.mark(entry)?;
        Ok(MessageResponse {
            message: Some("Frequência registrada com sucesso".to_string()),
        })
    }

    async fn student_summary(&self, student_id: Id) -> Result<AttendanceSummary> {
        let mut state = self.state.lock().await;
        state.enter("GET", &paths::student_summary(student_id))?;
        Ok(state.summarize(student_id, None))
    }

    async fn student_subject_summary(
        &self,
        student_id: Id,
        subject_id: Id,
    ) -> Result<AttendanceSummary> {
        let mut state = self.state.lock().await;
        state.enter("GET", &paths::student_subject_summary(student_id, subject_id))?;
        Ok(state.summarize(student_id, Some(subject_id)))
    }

    async fn export_class_csv(&self, class_id: Id) -> Result<String> {
        let mut state = self.state.lock().await;
        state.enter("GET", &paths::class_export(class_id))?;

        let rows: Vec<String> = state
            .students
            .iter()
            .filter(|s| s.class_id == class_id)
            .map(|s| {
                let summary = state.summarize(s.id, None);
                format!(
                    "{},{},{},{},{},{},{:?}",
                    s.name,
                    s.registration,
                    summary.total_sessions,
                    summary.presences,
                    summary.absences,
                    summary.justified_absences,
                    summary.presence_percent()
                )
            })
            .collect();

        // The backend refuses to export an empty report
        if rows.is_empty() {
            return Err(AppError::Request { status: 500 });
        }

        let mut csv = String::from(
            "nome,matricula,total_sessoes,presencas,faltas,faltas_justificadas,percentual_presenca\r\n",
        );
        for row in rows {
            csv.push_str(&row);
            csv.push_str("\r\n");
        }
        Ok(csv)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
