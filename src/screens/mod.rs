use std::time::{Duration, Instant};

pub mod fix_question;
pub mod list;

/// Where the shell should take the user after a screen operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Back,
    FixSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Transient banner shown after a mutation. It is not dismissed by the
/// user; it expires on its own after five seconds.
#[derive(Debug, Clone)]
pub struct Notice {
    kind: NoticeKind,
    text: String,
    shown_at: Instant,
}

impl Notice {
    pub const DISMISS_AFTER: Duration = Duration::from_secs(5);

    pub fn success(text: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Failure,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= Self::DISMISS_AFTER
    }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, by: Duration) {
        self.shown_at -= by;
    }
}
