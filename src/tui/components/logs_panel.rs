// Logs overlay
//
// Full-screen-ish overlay listing the captured tracing entries, toggled
// with 'l'. Follows the tail until the user scrolls up.

use crate::logging::LogBuffer;
use crate::tui::scroll::ScrollState;
use crate::tui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub struct LogsPanel {
    scroll: ScrollState,
    follow: bool,
}

impl LogsPanel {
    pub fn new() -> Self {
        Self {
            scroll: ScrollState::new(),
            follow: true,
        }
    }

    /// Handle a key while the overlay is open. Returns true when the key
    /// closes the overlay.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('l') | KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.follow = false;
                self.scroll.scroll_up();
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll.scroll_down(),
            KeyCode::PageUp => {
                self.follow = false;
                self.scroll.page_up();
            }
            KeyCode::PageDown => self.scroll.page_down(),
            KeyCode::Char('g') => {
                self.follow = false;
                self.scroll.scroll_to_top();
            }
            KeyCode::Char('G') => self.follow = true,
            _ => {}
        }
        false
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, buffer: &LogBuffer, theme: &Theme) {
        let width = (area.width * 9 / 10).max(40).min(area.width);
        let height = (area.height * 8 / 10).max(10).min(area.height);
        let overlay = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        f.render_widget(Clear, overlay);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_focused_style())
            .title(Span::styled(" Log Sistem ", theme.title_style()));
        let inner = block.inner(overlay);
        f.render_widget(block, overlay);

        let entries = buffer.snapshot();
        let viewport = inner.height as usize;
        self.scroll.update_dimensions(entries.len(), viewport);
        if self.follow {
            // pin to the tail
            self.scroll.page_down();
            self.scroll.update_dimensions(entries.len(), viewport);
            while self.scroll.visible_range().1 < entries.len() {
                self.scroll.scroll_down();
            }
        }

        let (start, end) = self.scroll.visible_range();
        let lines: Vec<Line> = entries[start..end]
            .iter()
            .map(|entry| {
                let level_color = match entry.level {
                    crate::logging::LogLevel::Error => theme.log_error,
                    crate::logging::LogLevel::Warn => theme.log_warn,
                    crate::logging::LogLevel::Info => theme.log_info,
                    crate::logging::LogLevel::Debug => theme.log_debug,
                    crate::logging::LogLevel::Trace => theme.log_trace,
                };
                Line::from(vec![
                    Span::styled(
                        entry.timestamp.format("%H:%M:%S ").to_string(),
                        theme.muted_style(),
                    ),
                    Span::styled(
                        format!("{:<5} ", entry.level.as_str()),
                        ratatui::style::Style::default().fg(level_color),
                    ),
                    Span::styled(entry.message.clone(), theme.base_style()),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for LogsPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(panel: &mut LogsPanel, code: KeyCode) -> bool {
        panel.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_close_keys() {
        let mut panel = LogsPanel::new();
        assert!(press(&mut panel, KeyCode::Esc));
        assert!(press(&mut panel, KeyCode::Char('l')));
        assert!(press(&mut panel, KeyCode::Char('q')));
        assert!(!press(&mut panel, KeyCode::Char('j')));
    }

    #[test]
    fn test_scrolling_up_stops_following() {
        let mut panel = LogsPanel::new();
        assert!(panel.follow);
        press(&mut panel, KeyCode::Up);
        assert!(!panel.follow);
        press(&mut panel, KeyCode::Char('G'));
        assert!(panel.follow);
    }
}
