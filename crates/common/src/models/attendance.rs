//! Attendance records and the server-computed summaries

use super::Id;
use serde::{Deserialize, Serialize};

/// One attendance entry for a student in a subject's session of the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    #[serde(rename = "aluno_id")]
    pub student_id: Id,
    #[serde(rename = "disciplina_id")]
    pub subject_id: Id,
    #[serde(rename = "presente")]
    pub present: bool,
    #[serde(rename = "justificado")]
    pub justified: bool,
    #[serde(rename = "observacao")]
    pub note: Option<String>,
}

/// Three-way status shown after recording attendance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceMark {
    Present,
    JustifiedAbsence,
    Absence,
}

impl AttendanceMark {
    /// `present` wins over `justified`
    pub fn from_flags(present: bool, justified: bool) -> Self {
        match (present, justified) {
            (true, _) => AttendanceMark::Present,
            (false, true) => AttendanceMark::JustifiedAbsence,
            (false, false) => AttendanceMark::Absence,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceMark::Present => "Presente",
            AttendanceMark::JustifiedAbsence => "Falta Justificada",
            AttendanceMark::Absence => "Falta",
        }
    }
}

/// Generic `{message}` reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Per-student (optionally per-subject) attendance summary
///
/// Counts absent from the payload decode as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    #[serde(rename = "aluno_id", default)]
    pub student_id: Id,
    #[serde(rename = "disciplina_id", default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<Id>,
    #[serde(rename = "total_sessoes", default)]
    pub total_sessions: u32,
    #[serde(rename = "presencas", default)]
    pub presences: u32,
    #[serde(rename = "faltas", default)]
    pub absences: u32,
    #[serde(rename = "faltas_justificadas", default)]
    pub justified_absences: u32,
    #[serde(rename = "percentual_presenca", default)]
    pub presence_percentage: Option<f64>,
}

impl AttendanceSummary {
    /// Build a summary the way the backend computes one from raw counts
    pub fn from_counts(student_id: Id, presences: u32, absences: u32, justified: u32) -> Self {
        let total = presences + absences;
        Self {
            student_id,
            subject_id: None,
            total_sessions: total,
            presences,
            absences,
            justified_absences: justified,
            presence_percentage: Some(percent_of(presences, total)),
        }
    }

    pub fn for_subject(mut self, subject_id: Id) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    /// Presence percentage in [0, 100]
    ///
    /// Uses the server's value when it sent one, otherwise derives it from
    /// presences and total sessions.
    pub fn presence_percent(&self) -> f64 {
        let value = match self.presence_percentage {
            Some(p) if p.is_finite() => p,
            _ => percent_of(self.presences, self.total_sessions),
        };
        value.clamp(0.0, 100.0)
    }
}

/// presences / total × 100 rounded to two decimals, 0 when there are no sessions
pub(crate) fn percent_of(presences: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = presences as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mark_labels() {
        assert_eq!(AttendanceMark::from_flags(true, false).label(), "Presente");
        assert_eq!(AttendanceMark::from_flags(true, true).label(), "Presente");
        assert_eq!(AttendanceMark::from_flags(false, true).label(), "Falta Justificada");
        assert_eq!(AttendanceMark::from_flags(false, false).label(), "Falta");
    }

    #[test]
    fn test_summary_missing_counts_default_to_zero() {
        let summary: AttendanceSummary = serde_json::from_value(json!({"aluno_id": 9})).unwrap();
        assert_eq!(summary.presences, 0);
        assert_eq!(summary.total_sessions, 0);
        assert_eq!(summary.presence_percent(), 0.0);
    }

    #[test]
    fn test_percent_derived_when_server_omits_it() {
        let summary: AttendanceSummary = serde_json::from_value(json!({
            "presencas": 8,
            "faltas": 2,
            "total_sessoes": 10
        }))
        .unwrap();
        assert_eq!(summary.presence_percent(), 80.0);
    }

    #[test]
    fn test_percent_prefers_server_value_and_clamps() {
        let mut summary = AttendanceSummary::from_counts(1, 2, 1, 0);
        assert_eq!(summary.presence_percent(), 66.67);

        summary.presence_percentage = Some(140.0);
        assert_eq!(summary.presence_percent(), 100.0);

        summary.presence_percentage = Some(-3.0);
        assert_eq!(summary.presence_percent(), 0.0);
    }
}
