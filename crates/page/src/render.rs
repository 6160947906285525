//! Full page markup
//!
//! Element ids and form field names match the desk's fixed contract
//! (`turmaForm`, `matriculaAluno`, `relatorioContainer`, ...). Select
//! changes submit their own small form.

use crate::notify::ActiveNotice;
use crate::view::{AttendanceCard, GroupedSelect, PageView, ReportPanel, SelectList};
use frequencia_report::RenderOptions;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::time::Instant;

const SUBMIT_ON_CHANGE: &str = "this.form.submit()";

/// Render the whole page, pruning expired banners
pub fn page(view: &mut PageView, report: &RenderOptions, now: Instant) -> Markup {
    let notices = view.notices.active(now);
    let view = &*view;
    let still_loading = matches!(view.report, ReportPanel::Loading);

    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if still_loading {
                    meta http-equiv="refresh" content="2";
                }
                title { "Sistema de Frequência Escolar" }
                style { (PreEscaped(CSS)) }
            }
            body {
                @for notice in &notices {
                    (banner(notice))
                }
                div.container {
                    header.header {
                        h1 { "Sistema de Frequência Escolar" }
                        p { "Gestão de turmas, disciplinas, alunos e frequência" }
                    }

                    div.grid {
                        (class_form(view))
                        (subject_form(view))
                        (student_form(view))
                    }

                    div.grid {
                        (enroll_card(view))
                        (attendance_panel(view))
                    }

                    div.card {
                        h2 { "Relatórios" }
                        div #relatorioContainer { (view.report.markup(report)) }
                    }
                }
            }
        }
    }
}

fn banner(notice: &ActiveNotice) -> Markup {
    let timing = format!(
        "animation: alert-out {}ms ease {}ms forwards;",
        notice.remaining.saturating_sub(notice.visible_for).as_millis(),
        notice.visible_for.as_millis()
    );
    html! {
        div class={ "alert alert-" (notice.kind.as_str()) } style=(timing) {
            div style="display: flex; align-items: center; gap: 0.5rem;" {
                svg width="16" height="16" viewBox="0 0 24 24" fill="currentColor" {
                    path d=(notice.kind.icon_path()) {}
                }
                (notice.message)
                form.alert-close method="post" action={ "/avisos/" (notice.id.to_string()) "/fechar" } {
                    button type="submit" aria-label="Fechar" { "×" }
                }
            }
        }
    }
}

fn text_input(id: &str, label: &str, value: &str, kind: &str, required: bool) -> Markup {
    html! {
        div.form-group {
            label for=(id) { (label) }
            input type=(kind) id=(id) name=(id) value=(value) required[required];
        }
    }
}

fn select_list(id: &str, select: &SelectList, on_change: bool) -> Markup {
    html! {
        select id=(id) name=(id) onchange=[on_change.then_some(SUBMIT_ON_CHANGE)] {
            option value="" { (select.placeholder) }
            @for option in &select.options {
                option value=(option.value) selected[option.value == select.selected] {
                    (option.label)
                }
            }
        }
    }
}

fn grouped_select(id: &str, select: &GroupedSelect) -> Markup {
    html! {
        select id=(id) name=(id) {
            option value="" { (select.placeholder) }
            @for group in &select.groups {
                optgroup label=(group.label) {
                    @for option in &group.options {
                        option value=(option.value) selected[option.value == select.selected] {
                            (option.label)
                        }
                    }
                }
            }
        }
    }
}

fn class_form(view: &PageView) -> Markup {
    let form = &view.class_form;
    html! {
        div.card {
            h2 { "Nova Turma" }
            form #turmaForm method="post" action="/turmas" {
                (text_input("turmaNome", "Nome da Turma", &form.name, "text", true))
                (text_input("turmaAno", "Ano", &form.year, "number", true))
                div.form-group {
                    label for="turmaPeriodo" { "Período" }
                    select #turmaPeriodo name="turmaPeriodo" required {
                        @for period in ["Manhã", "Tarde", "Noite"] {
                            option value=(period) selected[form.period == period] { (period) }
                        }
                    }
                }
                button.btn.btn-primary type="submit" { "Criar Turma" }
            }
        }
    }
}

fn subject_form(view: &PageView) -> Markup {
    let form = &view.subject_form;
    html! {
        div.card {
            h2 { "Nova Disciplina" }
            form #disciplinaForm method="post" action="/disciplinas" {
                (text_input("disciplinaNome", "Nome da Disciplina", &form.name, "text", true))
                (text_input("disciplinaCodigo", "Código", &form.code, "text", true))
                (text_input("disciplinaCarga", "Carga Horária", &form.weekly_hours, "number", true))
                (text_input("disciplinaProfessor", "Professor", &form.professor, "text", true))
                button.btn.btn-primary type="submit" { "Cadastrar Disciplina" }
            }
        }
    }
}

fn student_form(view: &PageView) -> Markup {
    let form = &view.student_form;
    html! {
        div.card {
            h2 { "Novo Aluno" }
            form #alunoForm method="post" action="/alunos" {
                (text_input("alunoNome", "Nome do Aluno", &form.name, "text", true))
                (text_input("alunoMatricula", "Matrícula", &form.registration, "text", true))
                (text_input("alunoEmail", "Email", &form.email, "email", false))
                div.form-group {
                    label for="alunoTurma" { "Turma" }
                    (select_list("alunoTurma", &view.class_select, false))
                }
                button.btn.btn-primary type="submit" { "Cadastrar Aluno" }
            }
        }
    }
}

fn enroll_card(view: &PageView) -> Markup {
    html! {
        div.card {
            h2 { "Matrícula em Disciplina" }
            form #matriculaForm method="post" action="/matricular" {
                div.form-group {
                    label for="matriculaAluno" { "Aluno" }
                    (grouped_select("matriculaAluno", &view.enroll_student_select))
                }
                div.form-group {
                    label for="matriculaDisciplina" { "Disciplina" }
                    (select_list("matriculaDisciplina", &view.enroll_subject_select, false))
                }
                button.btn.btn-success type="submit" { "Matricular Aluno" }
            }
        }
    }
}

fn attendance_panel(view: &PageView) -> Markup {
    html! {
        div.card {
            h2 { "Registro de Frequência" }
            form method="post" action="/frequencia/disciplina" {
                div.form-group {
                    label for="frequenciaDisciplina" { "Disciplina" }
                    (select_list("frequenciaDisciplina", &view.attendance_subject_select, true))
                }
            }
            form method="post" action="/frequencia/aluno" {
                div.form-group {
                    label for="frequenciaAluno" { "Aluno" }
                    (select_list("frequenciaAluno", &view.attendance_student_select, true))
                }
            }
            @match &view.attendance_card {
                Some(card) => {
                    (attendance_card(card, &view.attendance_note))
                },
                None => {
                    div #frequenciaCard style="display: none;" {
                        div #alunoInfo {}
                    }
                },
            }
        }
    }
}

fn attendance_card(card: &AttendanceCard, note: &str) -> Markup {
    html! {
        div #frequenciaCard style="display: block;" {
            div #alunoInfo {
                div.student-info {
                    div.student-name { (card.student_name) }
                    div.student-details {
                        "Matrícula: " (card.registration) " | "
                        "Disciplina: " (card.subject_name) " | "
                        "Professor: " (card.professor)
                    }
                }
            }
            form method="post" action="/frequencia/marcar" {
                div.form-group {
                    label for="observacao" { "Observação" }
                    textarea #observacao name="observacao" rows="2" { (note) }
                }
                div.attendance-actions {
                    button.btn.btn-success type="submit" name="status" value="presente" { "Presente" }
                    button.btn.btn-danger type="submit" name="status" value="falta" { "Falta" }
                    button.btn.btn-warning type="submit" name="status" value="justificada" { "Falta Justificada" }
                }
            }
        }
    }
}

const CSS: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif; background: #f1f5f9; color: #1e293b; line-height: 1.5; }
.container { max-width: 1200px; margin: 0 auto; padding: 2rem 1.5rem; }
.header { text-align: center; margin-bottom: 2rem; }
.header h1 { font-size: 2rem; color: #1e40af; }
.header p { color: #64748b; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 1.5rem; margin-bottom: 1.5rem; }
.card { background: #fff; border-radius: 12px; padding: 1.5rem; box-shadow: 0 1px 3px rgba(15, 23, 42, 0.08); }
.card h2 { font-size: 1.15rem; margin-bottom: 1rem; }
.card h3 { font-size: 1.05rem; margin-bottom: 0.25rem; }
.form-group { margin-bottom: 1rem; }
.form-group label { display: block; font-weight: 600; font-size: 0.875rem; margin-bottom: 0.35rem; }
input, select, textarea { width: 100%; padding: 0.6rem 0.75rem; border: 1px solid #cbd5e1; border-radius: 8px; font: inherit; }
.btn { display: inline-flex; align-items: center; gap: 0.4rem; padding: 0.6rem 1.1rem; border: 0; border-radius: 8px; font: inherit; font-weight: 600; cursor: pointer; text-decoration: none; }
.btn-primary { background: #2563eb; color: #fff; }
.btn-success { background: #16a34a; color: #fff; }
.btn-warning { background: #d97706; color: #fff; }
.btn-danger { background: #dc2626; color: #fff; }
.btn-outline { background: transparent; color: #2563eb; border: 1px solid #2563eb; }
.attendance-actions { display: flex; gap: 0.5rem; flex-wrap: wrap; }
.student-info { background: #eff6ff; border-radius: 8px; padding: 0.75rem 1rem; margin: 1rem 0; }
.student-name { font-weight: 700; }
.student-details { color: #475569; font-size: 0.875rem; }
.alert { position: relative; max-width: 1200px; margin: 0.75rem auto 0; padding: 0.75rem 1rem; border-radius: 8px; transition: all 0.3s ease; }
.alert-success { background: #dcfce7; color: #166534; }
.alert-error { background: #fee2e2; color: #991b1b; }
.alert-close { margin-left: auto; }
.alert-close button { background: none; border: 0; font-size: 1.1rem; cursor: pointer; color: inherit; }
@keyframes alert-out { to { opacity: 0; transform: translateY(-20px); } }
.stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); gap: 1rem; }
.stat-card { border-radius: 10px; padding: 1rem; color: #fff; text-align: center; }
.stat-card.primary { background: #2563eb; }
.stat-card.success { background: #16a34a; }
.stat-card.warning { background: #d97706; }
.stat-number { font-size: 1.75rem; font-weight: 800; }
.stat-label { font-size: 0.85rem; opacity: 0.9; }
.data-table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
.data-table th, .data-table td { padding: 0.6rem; border-bottom: 1px solid #e2e8f0; text-align: left; }
.data-table th { background: #f8fafc; font-weight: 600; }
.badge { display: inline-block; padding: 0.15rem 0.55rem; border-radius: 999px; font-size: 0.8rem; font-weight: 600; }
.badge-primary { background: #dbeafe; color: #1e40af; }
.badge-success { background: #dcfce7; color: #166534; }
.badge-warning { background: #fef3c7; color: #92400e; }
.badge-danger { background: #fee2e2; color: #991b1b; }
.progress-bar { height: 8px; background: #e2e8f0; border-radius: 999px; overflow: hidden; }
.progress-fill { height: 100%; background: #94a3b8; }
.progress-fill.success { background: #16a34a; }
.progress-fill.warning { background: #d97706; }
.progress-fill.danger { background: #dc2626; }
.empty-state { text-align: center; padding: 2.5rem 1rem; color: #64748b; }
.empty-state-icon { font-size: 2.5rem; }
.empty-state-title { font-weight: 700; color: #1e293b; margin: 0.5rem 0 0.25rem; }
.loading { display: flex; align-items: center; justify-content: center; gap: 0.75rem; padding: 2rem; color: #64748b; }
.spinner { width: 20px; height: 20px; border: 3px solid #cbd5e1; border-top-color: #2563eb; border-radius: 50%; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
"#;
