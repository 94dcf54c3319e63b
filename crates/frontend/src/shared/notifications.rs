//! Toast notifications.
//!
//! `NotificationQueue` is plain data so it can be tested natively; the
//! context wraps it in a signal and schedules auto-dismiss timers.

use leptos::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✅",
            NotificationKind::Error => "❌",
            NotificationKind::Warning => "⚠️",
            NotificationKind::Info => "ℹ️",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationKind::Success => "toast toast--success",
            NotificationKind::Error => "toast toast--error",
            NotificationKind::Warning => "toast toast--warning",
            NotificationKind::Info => "toast toast--info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    /// 0 keeps the toast until closed by hand.
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationQueue {
    items: Vec<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>, duration_ms: u32) -> Uuid {
        let id = Uuid::new_v4();
        self.items.push(Notification {
            id,
            kind,
            message: message.into(),
            duration_ms,
        });
        id
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Copy)]
pub struct NotificationContext {
    queue: RwSignal<NotificationQueue>,
    default_duration_ms: u32,
}

impl NotificationContext {
    pub fn new(default_duration_ms: u32) -> Self {
        Self {
            queue: RwSignal::new(NotificationQueue::default()),
            default_duration_ms,
        }
    }

    pub fn notify_with(&self, kind: NotificationKind, message: impl Into<String>, duration_ms: u32) -> Uuid {
        let mut id = Uuid::nil();
        let message = message.into();
        self.queue.update(|q| id = q.push(kind, message, duration_ms));
        if duration_ms > 0 {
            let queue = self.queue;
            gloo_timers::callback::Timeout::new(duration_ms, move || {
                queue.update(|q| {
                    q.dismiss(id);
                });
            })
            .forget();
        }
        id
    }

    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        self.notify_with(kind, message, self.default_duration_ms)
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.notify(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.notify(NotificationKind::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.notify(NotificationKind::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.notify(NotificationKind::Info, message)
    }

    pub fn dismiss(&self, id: Uuid) {
        self.queue.update(|q| {
            q.dismiss(id);
        });
    }
}

pub fn use_notifications() -> NotificationContext {
    use_context::<NotificationContext>().expect("NotificationContext not found")
}

#[component]
pub fn NotificationHost() -> impl IntoView {
    let ctx = use_notifications();

    view! {
        <div class="toast-container">
            <For
                each=move || ctx.queue.with(|q| q.items().to_vec())
                key=|n| n.id
                let:note
            >
                {{
                    let id = note.id;
                    view! {
                        <div class=note.kind.css_class() role="alert">
                            <span class="toast__icon">{note.kind.icon()}</span>
                            <span class="toast__message">{note.message.clone()}</span>
                            <button class="toast__close" title="Fechar" on:click=move |_| ctx.dismiss(id)>
                                "×"
                            </button>
                        </div>
                    }
                }}
            </For>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_push_and_dismiss() {
        let mut queue = NotificationQueue::default();
        let a = queue.push(NotificationKind::Success, "Salvo", 5000);
        let b = queue.push(NotificationKind::Error, "Falhou", 0);
        assert_eq!(queue.len(), 2);
        assert_ne!(a, b);

        assert!(queue.dismiss(a));
        assert!(!queue.dismiss(a));
        assert_eq!(queue.items()[0].message, "Falhou");
        assert_eq!(queue.items()[0].duration_ms, 0);
    }

    #[test]
    fn test_kind_styles() {
        assert_eq!(NotificationKind::Warning.css_class(), "toast toast--warning");
        assert_eq!(NotificationKind::Info.icon(), "ℹ️");
    }
}
