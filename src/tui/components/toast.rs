// Toast notifications
//
// A queue of transient notices rendered stacked in the bottom-right
// corner. Expiry is tick-checked against each notice's creation instant
// rather than run off detached timers, so a manually dismissed notice
// cannot be removed twice: removal is id-keyed and a miss is a no-op.

use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// How long a notice stays visible.
const TOAST_TTL: Duration = Duration::from_millis(3500);

/// At most this many notices render at once; older ones still expire on
/// schedule underneath.
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ",
            Severity::Success => "✓",
            Severity::Warning => "⚠",
            Severity::Error => "✗",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    created_at: Instant,
}

/// The live toast queue. Multiple notices may be visible concurrently;
/// there is no deduplication.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notice and return its id. Does not block; removal happens
    /// on a later tick via `sweep`.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            message: message.into(),
            severity,
            created_at: Instant::now(),
        });
        id
    }

    /// Remove a notice early. A second call with the same id (or a sweep
    /// finding it already gone) is a no-op.
    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    /// Drop expired notices. Called on every render tick.
    pub fn sweep(&mut self) {
        self.sweep_at(Instant::now());
    }

    fn sweep_at(&mut self, now: Instant) {
        self.toasts
            .retain(|t| now.duration_since(t.created_at) < TOAST_TTL);
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.toasts.last().map(|t| t.message.as_str())
    }
}

/// Render the queue stacked upward from the bottom-right corner, newest
/// at the bottom. Uses `Clear` so notices sit on top of any overlay.
pub fn render(f: &mut Frame, area: Rect, queue: &ToastQueue, theme: &Theme) {
    let visible: Vec<&Toast> = queue.iter().rev().take(MAX_VISIBLE).collect();
    for (slot, toast) in visible.iter().enumerate() {
        let text = format!("{} {}", toast.severity.icon(), toast.message);
        let width = (text.width() as u16 + 4).min(area.width.saturating_sub(4));
        let height = 3;
        let x = area.right().saturating_sub(width + 2);
        let y = area
            .bottom()
            .saturating_sub(height * (slot as u16 + 1) + 1);
        if y < area.top() {
            break;
        }
        let toast_area = Rect::new(x, y, width, height);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.severity_style(toast.severity))
            .style(Style::default().bg(theme.bg));
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(theme.base_style())
            .block(block);

        f.render_widget(Clear, toast_area);
        f.render_widget(paragraph, toast_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_appends_without_dedup() {
        let mut queue = ToastQueue::new();
        queue.notify("sama", Severity::Info);
        queue.notify("sama", Severity::Info);
        assert_eq!(queue.iter().count(), 2);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let mut queue = ToastQueue::new();
        queue.notify("lama", Severity::Info);
        let now = Instant::now();
        queue.sweep_at(now + Duration::from_millis(3600));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sweep_keeps_fresh_notices() {
        let mut queue = ToastQueue::new();
        queue.notify("baru", Severity::Success);
        queue.sweep();
        assert_eq!(queue.iter().count(), 1);
    }

    #[test]
    fn test_double_dismiss_is_noop() {
        let mut queue = ToastQueue::new();
        let id = queue.notify("sekali", Severity::Warning);
        queue.dismiss(id);
        queue.dismiss(id);
        assert!(queue.is_empty());
        // a sweep after manual removal must not error either
        queue.sweep();
    }
}
