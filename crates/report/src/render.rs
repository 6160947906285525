//! Report container markup

use crate::model::{
    percent_label, ClassSection, ReportData, ReportTotals, StudentRow, SubjectRow, Tone,
};
use maud::{html, Markup, PreEscaped};

const REFRESH_ICON: &str = r#"<svg width="16" height="16" viewBox="0 0 24 24" fill="currentColor"><path d="M17.65,6.35C16.2,4.9 14.21,4 12,4A8,8 0 0,0 4,12A8,8 0 0,0 12,20C15.73,20 18.84,17.45 19.73,14H17.65C16.83,16.33 14.61,18 12,18A6,6 0 0,1 6,12A6,6 0 0,1 12,6C13.66,6 15.14,6.69 16.22,7.78L13,11H20V4L17.65,6.35Z"/></svg>"#;

const DOWNLOAD_ICON: &str = r#"<svg width="16" height="16" viewBox="0 0 24 24" fill="currentColor"><path d="M5,20H19V18H5M19,9H15V3H9V9H5L12,16L19,9Z"/></svg>"#;

/// Where the report's controls point to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Form action of the trailing refresh control
    pub refresh_action: String,
    /// Prefix of the per-class CSV links, followed by `/{class_id}`;
    /// `None` hides the links
    pub export_base: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            refresh_action: "/relatorio/atualizar".to_string(),
            export_base: Some("/exportar/turma".to_string()),
        }
    }
}

/// The full report
pub fn report(data: &ReportData, options: &RenderOptions) -> Markup {
    html! {
        (stats(&data.totals))

        h4 style="margin: 2rem 0 1rem 0;" { "Relatório Detalhado de Frequência" }

        @for section in &data.classes {
            (class_card(section, options))
        }

        @if !data.subjects.is_empty() {
            (subject_card(&data.subjects))
        }

        (refresh_control(options))
    }
}

fn stat_card(tone: Tone, number: impl maud::Render, label: &str) -> Markup {
    html! {
        div class={ "stat-card " (tone.css()) } {
            div.stat-number { (number) }
            div.stat-label { (label) }
        }
    }
}

fn stats(totals: &ReportTotals) -> Markup {
    html! {
        div.stats {
            (stat_card(Tone::Primary, totals.classes, "Turmas"))
            (stat_card(Tone::Success, totals.subjects, "Disciplinas"))
            (stat_card(Tone::Success, totals.students, "Alunos"))
            (stat_card(totals.presences_tone(), totals.presences, "Presenças"))
            (stat_card(totals.absences_tone(), totals.absences, "Faltas"))
            (stat_card(totals.justified_tone(), totals.justified_absences, "Justificadas"))
        }
    }
}

fn badge(tone: Tone, content: impl maud::Render) -> Markup {
    html! {
        span class={ "badge badge-" (tone.css()) } { (content) }
    }
}

fn progress(percent: f64, tone: Option<Tone>) -> Markup {
    let width = format!("width: {}%", percent);
    html! {
        div.progress-bar {
            @match tone {
                Some(tone) => {
                    div class={ "progress-fill " (tone.css()) } style=(width) {}
                },
                None => {
                    div.progress-fill style=(width) {}
                },
            }
        }
        small { (percent_label(percent)) }
    }
}

fn class_card(section: &ClassSection, options: &RenderOptions) -> Markup {
    html! {
        div.card style="margin-bottom: 1.5rem;" {
            h3 { (section.title()) }
            p style="color: #64748b; margin-bottom: 1rem;" { (section.enrolled_label()) }

            table.data-table {
                thead {
                    tr {
                        th { "Aluno" }
                        th { "Matrícula" }
                        th { "Presenças" }
                        th { "Faltas" }
                        th { "Justificadas" }
                        th { "Total Sessões" }
                        th { "Frequência" }
                        th { "Status" }
                    }
                }
                tbody {
                    @for row in &section.rows {
                        (student_row(row))
                    }
                }
            }

            @if let Some(base) = &options.export_base {
                div style="margin-top: 1rem; text-align: right;" {
                    a.btn.btn-outline href={ (base) "/" (section.class.id) } {
                        (PreEscaped(DOWNLOAD_ICON))
                        " Exportar CSV"
                    }
                }
            }
        }
    }
}

fn student_row(row: &StudentRow) -> Markup {
    html! {
        tr {
            td { strong { (row.name) } }
            td { (badge(Tone::Success, &row.registration)) }
            td { (badge(Tone::Success, row.presences)) }
            td { (badge(Tone::Danger, row.absences)) }
            td { (badge(Tone::Warning, row.justified_absences)) }
            td { (row.total_sessions) }
            td { (progress(row.percent, row.progress_tone())) }
            td { (badge(row.status.tone(), row.status.label())) }
        }
    }
}

fn subject_card(rows: &[SubjectRow]) -> Markup {
    html! {
        div.card {
            h3 { "Relatório por Disciplina" }
            table.data-table {
                thead {
                    tr {
                        th { "Disciplina" }
                        th { "Professor" }
                        th { "Alunos" }
                        th { "Sessões" }
                        th { "Presenças" }
                        th { "Faltas" }
                        th { "Média Frequência" }
                    }
                }
                tbody {
                    @for row in rows {
                        (subject_row(row))
                    }
                }
            }
        }
    }
}

fn subject_row(row: &SubjectRow) -> Markup {
    // Rows without a student list keep warning badges for the counts
    let (students_tone, sessions_tone) = if row.available {
        (Tone::Success, Tone::Primary)
    } else {
        (Tone::Warning, Tone::Warning)
    };
    html! {
        tr {
            td {
                strong { (row.name) }
                br;
                small { (row.code) }
            }
            td { (row.professor) }
            td { (badge(students_tone, row.students)) }
            td { (badge(sessions_tone, row.average_sessions())) }
            td { (badge(Tone::Success, row.presences)) }
            td { (badge(Tone::Danger, row.absences)) }
            td { (progress(row.average_frequency() as f64, row.tone())) }
        }
    }
}

fn refresh_control(options: &RenderOptions) -> Markup {
    html! {
        form method="post" action=(options.refresh_action)
            style="margin-top: 1.5rem; display: flex; gap: 0.75rem; justify-content: center;" {
            button.btn.btn-outline type="submit" {
                (PreEscaped(REFRESH_ICON))
                " Atualizar Dados"
            }
        }
    }
}

fn empty_state(icon: &str, title: &str, description: &str, options: &RenderOptions) -> Markup {
    html! {
        div.empty-state {
            div.empty-state-icon { (icon) }
            div.empty-state-title { (title) }
            div.empty-state-description { (description) }
        }
        (refresh_control(options))
    }
}

/// Shown while there are no classes or no subjects
pub fn empty_setup(options: &RenderOptions) -> Markup {
    empty_state(
        "📊",
        "Configure o sistema primeiro",
        "Cadastre turmas, disciplinas e alunos para visualizar relatórios",
        options,
    )
}

/// Shown when the report could not be generated
pub fn error_state(options: &RenderOptions) -> Markup {
    empty_state(
        "❌",
        "Erro ao carregar relatório",
        "Verifique se há dados cadastrados no sistema",
        options,
    )
}

/// Shown before the first report is generated
pub fn loading() -> Markup {
    html! {
        div.loading {
            div.spinner {}
            "Carregando relatório..."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttendanceStatus;
    use frequencia_common::models::{AttendanceSummary, Class, Student, Subject};

    fn sample() -> ReportData {
        let class = Class {
            id: 4,
            name: "3º Ano A".into(),
            year: 2024,
            period: "Manhã".into(),
        };
        let ana = Student {
            id: 1,
            name: "Ana".into(),
            registration: "2024001".into(),
            email: None,
            class_id: 4,
        };
        let bruno = Student {
            id: 2,
            name: "Bruno".into(),
            registration: "2024002".into(),
            email: None,
            class_id: 4,
        };
        let subject = Subject {
            id: 7,
            name: "Matemática".into(),
            code: "MAT301".into(),
            weekly_hours: 80,
            professor: "Helena".into(),
        };
        let summary = AttendanceSummary {
            total_sessions: 10,
            presences: 8,
            absences: 2,
            ..AttendanceSummary::default()
        };

        ReportData {
            totals: ReportTotals {
                classes: 1,
                subjects: 1,
                students: 2,
                presences: 8,
                absences: 2,
                justified_absences: 0,
            },
            classes: vec![ClassSection {
                class,
                rows: vec![StudentRow::from_summary(&ana, &summary), StudentRow::no_data(&bruno)],
            }],
            subjects: vec![SubjectRow::unavailable(&subject)],
        }
    }

    #[test]
    fn test_report_markup() {
        let html = report(&sample(), &RenderOptions::default()).into_string();

        assert!(html.contains(r#"<div class="stat-card success"><div class="stat-number">8</div><div class="stat-label">Presenças</div></div>"#));
        assert!(html.contains(r#"<div class="stat-card success"><div class="stat-number">0</div><div class="stat-label">Justificadas</div></div>"#));
        assert!(html.contains("3º Ano A - 2024 (Manhã)"));
        assert!(html.contains("2 alunos matriculados"));
        assert!(html.contains(r#"<div class="progress-fill success" style="width: 80%"></div>"#));
        assert!(html.contains("<small>80%</small>"));
        assert!(html.contains(r#"<span class="badge badge-success">Aprovado</span>"#));
        assert!(html.contains(r#"<span class="badge badge-warning">Sem dados</span>"#));
        assert!(html.contains(r#"<div class="progress-fill" style="width: 0%"></div>"#));
        assert!(html.contains(r#"href="/exportar/turma/4""#));
        assert!(html.contains(r#"action="/relatorio/atualizar""#));
        assert!(html.ends_with("Atualizar Dados</button></form>"));
        assert_eq!(AttendanceStatus::NoData.label(), "Sem dados");
    }

    #[test]
    fn test_export_links_can_be_hidden() {
        let options = RenderOptions {
            export_base: None,
            ..RenderOptions::default()
        };
        let html = report(&sample(), &options).into_string();
        assert!(!html.contains("Exportar CSV"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut data = sample();
        data.classes[0].rows[0].name = "<script>".into();
        let html = report(&data, &RenderOptions::default()).into_string();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<strong><script>"));
    }

    #[test]
    fn test_empty_states() {
        let options = RenderOptions::default();
        let html = empty_setup(&options).into_string();
        assert!(html.contains("Configure o sistema primeiro"));
        assert!(html.contains("📊"));
        assert!(html.contains(r#"action="/relatorio/atualizar""#));

        let html = error_state(&options).into_string();
        assert!(html.contains("Erro ao carregar relatório"));
        assert!(html.contains("Verifique se há dados cadastrados no sistema"));
        assert!(html.ends_with("Atualizar Dados</button></form>"));
    }
}
