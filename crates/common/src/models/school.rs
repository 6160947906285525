//! Classes, subjects, students and enrollments

use super::Id;
use serde::{Deserialize, Serialize};

/// A class ("turma"); parent of students
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: Id,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "periodo", default)]
    pub period: String,
}

impl Class {
    /// Label used by the class picker of the student form
    pub fn option_label(&self) -> String {
        format!("{} - {} ({})", self.name, self.year, self.period)
    }

    /// Label of the class group in the enrollment student picker
    pub fn group_label(&self) -> String {
        format!("{} - {}", self.name, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClass {
    #[serde(rename = "nome")]
    pub name: String,
    /// Absent when the typed year was not a number; the backend rejects it
    #[serde(rename = "ano")]
    pub year: Option<i32>,
    #[serde(rename = "periodo")]
    pub period: String,
}

/// A subject ("disciplina"); students enroll into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Id,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "carga_horaria")]
    pub weekly_hours: i32,
    pub professor: String,
}

impl Subject {
    pub fn option_label(&self) -> String {
        format!("{} ({}) - Prof. {}", self.name, self.code, self.professor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "carga_horaria")]
    pub weekly_hours: Option<i32>,
    pub professor: String,
}

/// A student ("aluno"); belongs to exactly one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: Id,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "matricula")]
    pub registration: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "turma_id")]
    pub class_id: Id,
}

impl Student {
    pub fn option_label(&self) -> String {
        format!("{} ({})", self.name, self.registration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "matricula")]
    pub registration: String,
    pub email: Option<String>,
    #[serde(rename = "turma_id")]
    pub class_id: Id,
    /// Subjects to enroll into at creation time
    #[serde(rename = "disciplina_ids", default, skip_serializing_if = "Vec::is_empty")]
    pub subject_ids: Vec<Id>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    #[serde(rename = "aluno_id")]
    pub student_id: Id,
    #[serde(rename = "disciplina_id")]
    pub subject_id: Id,
}

/// The backend answers 200 with either a message or an error text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
