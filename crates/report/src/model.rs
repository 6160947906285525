//! Report rows and statistics derived from attendance summaries

use frequencia_common::models::{AttendanceSummary, Class, Id, Student, Subject};

/// Presence percentage from which a student is approved
pub const APPROVED_FROM: f64 = 75.0;

/// Presence percentage from which a student needs attention instead of failing
pub const ATTENTION_FROM: f64 = 50.0;

/// Colour family of badges, cards and progress fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Primary,
    Success,
    Warning,
    Danger,
}

impl Tone {
    pub fn css(&self) -> &'static str {
        match self {
            Tone::Primary => "primary",
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Danger => "danger",
        }
    }

    /// success at 75 and above, warning at 50 and above, danger below
    pub fn for_percent(percent: f64) -> Self {
        if percent >= APPROVED_FROM {
            Tone::Success
        } else if percent >= ATTENTION_FROM {
            Tone::Warning
        } else {
            Tone::Danger
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Approved,
    Attention,
    Failing,
    /// The summary could not be fetched
    NoData,
}

impl AttendanceStatus {
    pub fn from_percent(percent: f64) -> Self {
        if percent >= APPROVED_FROM {
            AttendanceStatus::Approved
        } else if percent >= ATTENTION_FROM {
            AttendanceStatus::Attention
        } else {
            AttendanceStatus::Failing
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Approved => "Aprovado",
            AttendanceStatus::Attention => "Atenção",
            AttendanceStatus::Failing => "Reprovado",
            AttendanceStatus::NoData => "Sem dados",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            AttendanceStatus::Approved => Tone::Success,
            AttendanceStatus::Attention | AttendanceStatus::NoData => Tone::Warning,
            AttendanceStatus::Failing => Tone::Danger,
        }
    }
}

/// Percentage as shown next to a progress bar (`80%`, `66.67%`)
pub fn percent_label(percent: f64) -> String {
    format!("{}%", percent)
}

/// One student line of a class table
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRow {
    pub student_id: Id,
    pub name: String,
    pub registration: String,
    pub presences: u32,
    pub absences: u32,
    pub justified_absences: u32,
    pub total_sessions: u32,
    /// Always within [0, 100]
    pub percent: f64,
    pub status: AttendanceStatus,
}

impl StudentRow {
    pub fn from_summary(student: &Student, summary: &AttendanceSummary) -> Self {
        let percent = summary.presence_percent();
        Self {
            student_id: student.id,
            name: student.name.clone(),
            registration: student.registration.clone(),
            presences: summary.presences,
            absences: summary.absences,
            justified_absences: summary.justified_absences,
            total_sessions: summary.total_sessions,
            percent,
            status: AttendanceStatus::from_percent(percent),
        }
    }

    /// All-zero row for a student whose summary is unavailable
    pub fn no_data(student: &Student) -> Self {
        Self {
            student_id: student.id,
            name: student.name.clone(),
            registration: student.registration.clone(),
            presences: 0,
            absences: 0,
            justified_absences: 0,
            total_sessions: 0,
            percent: 0.0,
            status: AttendanceStatus::NoData,
        }
    }

    /// Progress fill colour; a row without data gets the neutral fill
    pub fn progress_tone(&self) -> Option<Tone> {
        match self.status {
            AttendanceStatus::NoData => None,
            status => Some(status.tone()),
        }
    }
}

/// One line of the per-subject table
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRow {
    pub subject_id: Id,
    pub name: String,
    pub code: String,
    pub professor: String,
    pub students: usize,
    /// Enrolled students with at least one recorded session
    pub students_with_data: usize,
    pub total_sessions: u32,
    pub presences: u32,
    pub absences: u32,
    /// False when the subject's student list could not be fetched
    pub available: bool,
}

impl SubjectRow {
    /// Aggregate the per-subject summaries of the enrolled students
    ///
    /// `students` counts every enrolled student, including those whose
    /// summary could not be fetched and so are absent from `summaries`.
    pub fn from_summaries<'a>(
        subject: &Subject,
        students: usize,
        summaries: impl IntoIterator<Item = &'a AttendanceSummary>,
    ) -> Self {
        let mut row = Self::empty(subject, students, true);
        for summary in summaries {
            row.presences += summary.presences;
            row.absences += summary.absences;
            row.total_sessions += summary.total_sessions;
            if summary.total_sessions > 0 {
                row.students_with_data += 1;
            }
        }
        row
    }

    pub fn unavailable(subject: &Subject) -> Self {
        Self::empty(subject, 0, false)
    }

    fn empty(subject: &Subject, students: usize, available: bool) -> Self {
        Self {
            subject_id: subject.id,
            name: subject.name.clone(),
            code: subject.code.clone(),
            professor: subject.professor.clone(),
            students,
            students_with_data: 0,
            total_sessions: 0,
            presences: 0,
            absences: 0,
            available,
        }
    }

    /// Sessions per student with data, rounded down
    pub fn average_sessions(&self) -> u32 {
        let with_data = self.students_with_data.max(1) as u32;
        self.total_sessions / with_data
    }

    /// Presences over sessions as a whole percentage, 0 without sessions
    pub fn average_frequency(&self) -> u32 {
        if self.total_sessions == 0 {
            return 0;
        }
        let percent = (self.presences as f64 / self.total_sessions as f64 * 100.0).round();
        percent.clamp(0.0, 100.0) as u32
    }

    pub fn tone(&self) -> Option<Tone> {
        self.available
            .then(|| Tone::for_percent(self.average_frequency() as f64))
    }
}

/// Figures of the statistics cards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub classes: usize,
    pub subjects: usize,
    pub students: usize,
    pub presences: u32,
    pub absences: u32,
    pub justified_absences: u32,
}

impl ReportTotals {
    pub fn add(&mut self, summary: &AttendanceSummary) {
        self.presences += summary.presences;
        self.absences += summary.absences;
        self.justified_absences += summary.justified_absences;
    }

    pub fn presences_tone(&self) -> Tone {
        if self.presences > 0 { Tone::Success } else { Tone::Warning }
    }

    pub fn absences_tone(&self) -> Tone {
        if self.absences > 0 { Tone::Warning } else { Tone::Success }
    }

    pub fn justified_tone(&self) -> Tone {
        if self.justified_absences > 0 { Tone::Warning } else { Tone::Success }
    }
}

/// A class with at least one student and its table rows
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSection {
    pub class: Class,
    pub rows: Vec<StudentRow>,
}

impl ClassSection {
    pub fn title(&self) -> String {
        self.class.option_label()
    }

    pub fn enrolled_label(&self) -> String {
        format!("{} alunos matriculados", self.rows.len())
    }
}

/// Everything the report container shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportData {
    pub totals: ReportTotals,
    pub classes: Vec<ClassSection>,
    pub subjects: Vec<SubjectRow>,
}
