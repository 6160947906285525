//! Report data collection
//!
//! Runs three passes over the already-listed classes and subjects, one small
//! request per list and per student, in the page's request order:
//!
//! 1. totals: students of every class and each student's summary
//! 2. class tables: the students of every class again, with their summaries
//! 3. subject table: enrolled students of every subject and their
//!    per-subject summaries
//!
//! Summaries are fetched with at most `max_in_flight` requests outstanding;
//! results keep the student order either way.

use crate::model::{ClassSection, ReportData, ReportTotals, StudentRow, SubjectRow};
use frequencia_common::models::{AttendanceSummary, Class, Id, Student, Subject};
use frequencia_common::{Backend, Result};
use futures::stream::{self, StreamExt};

/// Options for a report collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    /// Summary requests in flight per list (1 = sequential)
    pub max_in_flight: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self { max_in_flight: 1 }
    }
}

/// Collect the full report
///
/// Fails only when a class's student list cannot be fetched. A missing
/// summary counts as zero, and a subject whose students cannot be listed
/// becomes an all-zero row.
#[tracing::instrument(skip_all, fields(classes = classes.len(), subjects = subjects.len()))]
pub async fn collect_report(
    backend: &dyn Backend,
    classes: &[Class],
    subjects: &[Subject],
    options: &CollectOptions,
) -> Result<ReportData> {
    let limit = options.max_in_flight.max(1);

    let mut totals = ReportTotals {
        classes: classes.len(),
        subjects: subjects.len(),
        ..ReportTotals::default()
    };
    for class in classes {
        let students = backend.list_class_students(class.id).await?;
        totals.students += students.len();
        for summary in student_summaries(backend, &students, limit).await.iter().flatten() {
            totals.add(summary);
        }
    }

    let mut sections = Vec::new();
    for class in classes {
        let students = backend.list_class_students(class.id).await?;
        if students.is_empty() {
            continue;
        }
        let summaries = student_summaries(backend, &students, limit).await;
        let rows = students
            .iter()
            .zip(summaries)
            .map(|(student, summary)| match summary {
                Some(summary) => StudentRow::from_summary(student, &summary),
                None => StudentRow::no_data(student),
            })
            .collect();
        sections.push(ClassSection {
            class: class.clone(),
            rows,
        });
    }

    let mut subject_rows = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let row = match backend.list_subject_students(subject.id).await {
            Ok(students) => {
                let summaries = subject_summaries(backend, subject.id, &students, limit).await;
                SubjectRow::from_summaries(subject, students.len(), summaries.iter().flatten())
            }
            Err(e) => {
                tracing::warn!(subject_id = subject.id, error = %e, "Subject students unavailable");
                SubjectRow::unavailable(subject)
            }
        };
        subject_rows.push(row);
    }

    Ok(ReportData {
        totals,
        classes: sections,
        subjects: subject_rows,
    })
}

/// Per-student summaries in student order; `None` where none could be read
async fn student_summaries(
    backend: &dyn Backend,
    students: &[Student],
    limit: usize,
) -> Vec<Option<AttendanceSummary>> {
    let ids: Vec<Id> = students.iter().map(|s| s.id).collect();
    stream::iter(ids)
        .map(|student_id| async move {
            match backend.student_summary(student_id).await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::debug!(student_id, error = %e, "No attendance summary");
                    None
                }
            }
        })
        .buffered(limit)
        .collect()
        .await
}

async fn subject_summaries(
    backend: &dyn Backend,
    subject_id: Id,
    students: &[Student],
    limit: usize,
) -> Vec<Option<AttendanceSummary>> {
    let ids: Vec<Id> = students.iter().map(|s| s.id).collect();
    stream::iter(ids)
        .map(|student_id| async move {
            match backend.student_subject_summary(student_id, subject_id).await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::debug!(student_id, subject_id, error = %e, "No subject summary");
                    None
                }
            }
        })
        .buffered(limit)
        .collect()
        .await
}
