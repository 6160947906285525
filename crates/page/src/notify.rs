//! Transient notification banners

use frequencia_common::config::NoticeTiming;
use frequencia_common::metrics::record_notification;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }

    /// SVG path of the banner icon
    pub fn icon_path(&self) -> &'static str {
        match self {
            NoticeKind::Success => "M9 16.17L4.83 12l-1.42 1.41L9 19 21 7l-1.41-1.41z",
            NoticeKind::Error => "M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm-2 15l-5-5 1.41-1.41L10 14.17l7.59-7.59L19 8l-9 9z",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: Uuid,
    pub message: String,
    pub kind: NoticeKind,
    pub created: Instant,
}

/// A banner still on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNotice {
    pub id: Uuid,
    pub message: String,
    pub kind: NoticeKind,
    /// Past the visible period and fading out
    pub fading: bool,
    /// Time left before the fade starts (zero once fading)
    pub visible_for: Duration,
    /// Time left before removal
    pub remaining: Duration,
}

/// Banners, newest first
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    timing: NoticeTiming,
    notices: Vec<Notice>,
}

impl Notifier {
    pub fn new(timing: NoticeTiming) -> Self {
        Self {
            timing,
            notices: Vec::new(),
        }
    }

    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.notify(message, NoticeKind::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> Uuid {
        self.notify(message, NoticeKind::Error)
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NoticeKind) -> Uuid {
        self.notify_at(message, kind, Instant::now())
    }

    pub fn notify_at(
        &mut self,
        message: impl Into<String>,
        kind: NoticeKind,
        now: Instant,
    ) -> Uuid {
        let id = Uuid::new_v4();
        record_notification(kind.as_str());
        self.notices.insert(
            0,
            Notice {
                id,
                message: message.into(),
                kind,
                created: now,
            },
        );
        id
    }

    /// Drop expired banners and return the rest, newest first
    pub fn active(&mut self, now: Instant) -> Vec<ActiveNotice> {
        let lifetime = self.timing.visible + self.timing.fade;
        self.notices
            .retain(|n| now.saturating_duration_since(n.created) < lifetime);

        self.notices
            .iter()
            .map(|n| {
                let age = now.saturating_duration_since(n.created);
                ActiveNotice {
                    id: n.id,
                    message: n.message.clone(),
                    kind: n.kind,
                    fading: age >= self.timing.visible,
                    visible_for: self.timing.visible.saturating_sub(age),
                    remaining: lifetime.saturating_sub(age),
                }
            })
            .collect()
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Every stored banner, including expired ones not yet pruned
    pub fn all(&self) -> &[Notice] {
        &self.notices
    }

    /// Message of the newest banner
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut notifier = Notifier::default();
        notifier.success("Turma criada com sucesso!");
        notifier.error("Erro: HTTP error! status: 500");

        let latest = notifier.latest().unwrap();
        assert_eq!(latest.kind, NoticeKind::Error);
        assert_eq!(notifier.all()[1].message, "Turma criada com sucesso!");
    }

    #[test]
    fn test_lifetime_and_fading() {
        let mut notifier = Notifier::default();
        let start = Instant::now();
        notifier.notify_at("Relatório atualizado!", NoticeKind::Success, start);

        let active = notifier.active(start + Duration::from_millis(1000));
        assert_eq!(active.len(), 1);
        assert!(!active[0].fading);
        assert_eq!(active[0].visible_for, Duration::from_millis(2000));

        let active = notifier.active(start + Duration::from_millis(3100));
        assert!(active[0].fading);
        assert_eq!(active[0].remaining, Duration::from_millis(200));

        assert!(notifier.active(start + Duration::from_millis(3300)).is_empty());
        assert!(notifier.all().is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut notifier = Notifier::default();
        let id = notifier.success("Aluno cadastrado com sucesso!");
        assert!(notifier.dismiss(id));
        assert!(!notifier.dismiss(id));
        assert!(notifier.latest().is_none());
    }

    #[test]
    fn test_custom_timing() {
        let mut notifier = Notifier::new(NoticeTiming {
            visible: Duration::from_millis(100),
            fade: Duration::from_millis(50),
        });
        let start = Instant::now();
        notifier.notify_at("x", NoticeKind::Error, start);
        assert_eq!(notifier.active(start + Duration::from_millis(149)).len(), 1);
        assert!(notifier.active(start + Duration::from_millis(150)).is_empty());
    }
}
