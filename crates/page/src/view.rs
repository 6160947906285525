//! Page view model
//!
//! One field per control of the desk page. Form and select values are kept
//! as the raw strings the browser posts; numbers are read out of them the
//! way the page's `parseInt` does.

use frequencia_common::models::{Class, Id, Student, Subject};
use frequencia_report::RenderOptions;
use maud::Markup;
use serde::Deserialize;

use crate::notify::Notifier;

pub const CLASS_PLACEHOLDER: &str = "Selecione uma turma";
pub const SUBJECT_PLACEHOLDER: &str = "Selecione uma disciplina";
pub const STUDENT_PLACEHOLDER: &str = "Selecione um aluno";
pub const NO_ENROLLED_STUDENTS: &str = "Nenhum aluno matriculado nesta disciplina";

/// Leading integer of `value`, like `parseInt(value, 10)`
///
/// Leading whitespace and a sign are accepted and parsing stops at the first
/// non-digit; no digits at all means absent.
pub fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// `parse_int` narrowed to a 32-bit field
pub fn parse_i32(value: &str) -> Option<i32> {
    parse_int(value).and_then(|n| i32::try_from(n).ok())
}

/// Id out of a select value; empty, non-numeric and 0 are no selection
pub fn parse_id(value: &str) -> Option<Id> {
    parse_int(value).filter(|&id| id != 0)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClassForm {
    #[serde(rename = "turmaNome", default)]
    pub name: String,
    #[serde(rename = "turmaAno", default)]
    pub year: String,
    #[serde(rename = "turmaPeriodo", default)]
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubjectForm {
    #[serde(rename = "disciplinaNome", default)]
    pub name: String,
    #[serde(rename = "disciplinaCodigo", default)]
    pub code: String,
    #[serde(rename = "disciplinaCarga", default)]
    pub weekly_hours: String,
    #[serde(rename = "disciplinaProfessor", default)]
    pub professor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentForm {
    #[serde(rename = "alunoNome", default)]
    pub name: String,
    #[serde(rename = "alunoMatricula", default)]
    pub registration: String,
    #[serde(rename = "alunoEmail", default)]
    pub email: String,
    #[serde(rename = "alunoTurma", default)]
    pub class_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl ToString, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
        }
    }
}

/// A `<select>` with a leading empty-valued placeholder option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectList {
    pub placeholder: String,
    pub options: Vec<SelectOption>,
    pub selected: String,
}

impl SelectList {
    pub fn new(placeholder: &str) -> Self {
        Self {
            placeholder: placeholder.to_string(),
            options: Vec::new(),
            selected: String::new(),
        }
    }

    /// Rebuild the options; a selection that no longer exists is dropped
    pub fn replace(&mut self, placeholder: &str, options: Vec<SelectOption>) {
        self.placeholder = placeholder.to_string();
        self.options = options;
        if !self.options.iter().any(|o| o.value == self.selected) {
            self.selected.clear();
        }
    }

    pub fn select(&mut self, value: &str) {
        self.selected = value.to_string();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub label: String,
    pub options: Vec<SelectOption>,
}

/// A `<select>` with one `<optgroup>` per group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedSelect {
    pub placeholder: String,
    pub groups: Vec<OptionGroup>,
    pub selected: String,
}

impl GroupedSelect {
    pub fn new(placeholder: &str) -> Self {
        Self {
            placeholder: placeholder.to_string(),
            groups: Vec::new(),
            selected: String::new(),
        }
    }

    pub fn replace(&mut self, groups: Vec<OptionGroup>) {
        self.groups = groups;
        let still_there = self
            .groups
            .iter()
            .flat_map(|g| g.options.iter())
            .any(|o| o.value == self.selected);
        if !still_there {
            self.selected.clear();
        }
    }

    pub fn select(&mut self, value: &str) {
        self.selected = value.to_string();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }
}

/// Options of the class picker in the student form
pub fn class_options(classes: &[Class]) -> Vec<SelectOption> {
    classes
        .iter()
        .map(|c| SelectOption::new(c.id, c.option_label()))
        .collect()
}

pub fn subject_options(subjects: &[Subject]) -> Vec<SelectOption> {
    subjects
        .iter()
        .map(|s| SelectOption::new(s.id, s.option_label()))
        .collect()
}

pub fn student_options(students: &[Student]) -> Vec<SelectOption> {
    students
        .iter()
        .map(|s| SelectOption::new(s.id, s.option_label()))
        .collect()
}

/// Details of the student picked for attendance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceCard {
    pub student_name: String,
    pub registration: String,
    pub subject_name: String,
    pub professor: String,
}

impl AttendanceCard {
    pub fn new(student: &Student, subject: &Subject) -> Self {
        Self {
            student_name: student.name.clone(),
            registration: student.registration.clone(),
            subject_name: subject.name.clone(),
            professor: subject.professor.clone(),
        }
    }
}

/// What the report container currently shows
#[derive(Debug, Clone)]
pub enum ReportPanel {
    /// Nothing generated yet
    Loading,
    /// No classes or no subjects
    Empty,
    Failed,
    Ready(Markup),
}

impl Default for ReportPanel {
    fn default() -> Self {
        ReportPanel::Loading
    }
}

impl ReportPanel {
    pub fn markup(&self, options: &RenderOptions) -> Markup {
        match self {
            ReportPanel::Loading => frequencia_report::render::loading(),
            ReportPanel::Empty => frequencia_report::render::empty_setup(options),
            ReportPanel::Failed => frequencia_report::render::error_state(options),
            ReportPanel::Ready(markup) => markup.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub class_form: ClassForm,
    pub subject_form: SubjectForm,
    pub student_form: StudentForm,
    pub class_select: SelectList,
    pub enroll_student_select: GroupedSelect,
    pub enroll_subject_select: SelectList,
    pub attendance_subject_select: SelectList,
    pub attendance_student_select: SelectList,
    pub attendance_note: String,
    /// `None` while the card is hidden
    pub attendance_card: Option<AttendanceCard>,
    pub report: ReportPanel,
    pub notices: Notifier,
}

impl PageView {
    pub fn new(notices: Notifier) -> Self {
        Self {
            class_form: ClassForm::default(),
            subject_form: SubjectForm::default(),
            student_form: StudentForm::default(),
            class_select: SelectList::new(CLASS_PLACEHOLDER),
            enroll_student_select: GroupedSelect::new(STUDENT_PLACEHOLDER),
            enroll_subject_select: SelectList::new(SUBJECT_PLACEHOLDER),
            attendance_subject_select: SelectList::new(SUBJECT_PLACEHOLDER),
            attendance_student_select: SelectList::new(STUDENT_PLACEHOLDER),
            attendance_note: String::new(),
            attendance_card: None,
            report: ReportPanel::default(),
            notices,
        }
    }
}

impl Default for PageView {
    fn default() -> Self {
        Self::new(Notifier::default())
    }
}
