//! Endpoint paths, relative to the API base

use crate::models::Id;

pub const CLASSES: &str = "/turmas/";
pub const SUBJECTS: &str = "/disciplinas/";
pub const STUDENTS: &str = "/alunos/";
pub const ENROLL: &str = "/matricular/";
pub const ATTENDANCE: &str = "/frequencias/individual/";

pub fn class_students(class_id: Id) -> String {
    format!("/turmas/{}/alunos/", class_id)
}

pub fn subject(subject_id: Id) -> String {
    format!("/disciplinas/{}", subject_id)
}

pub fn subject_students(subject_id: Id) -> String {
    format!("/disciplinas/{}/alunos/", subject_id)
}

pub fn student_summary(student_id: Id) -> String {
    format!("/relatorio/aluno/{}", student_id)
}

pub fn student_subject_summary(student_id: Id, subject_id: Id) -> String {
    format!("/relatorio/aluno/{}/disciplina/{}", student_id, subject_id)
}

pub fn class_export(class_id: Id) -> String {
    format!("/exportar/turma/{}", class_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(class_students(3), "/turmas/3/alunos/");
        assert_eq!(subject(2), "/disciplinas/2");
        assert_eq!(subject_students(2), "/disciplinas/2/alunos/");
        assert_eq!(student_subject_summary(5, 2), "/relatorio/aluno/5/disciplina/2");
        assert_eq!(class_export(1), "/exportar/turma/1");
    }
}
