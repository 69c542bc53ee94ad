// Plant detail panel
//
// A centered modal over the active page. Opens with cached header fields
// rendered immediately, then swaps the loading placeholder for the
// composed body once the three parallel fetches settle. Any fetch failing
// fails the whole body into a single error placeholder.

use crate::loader::DetailData;
use crate::model::Plant;
use crate::render::{self, InstructionsView};
use crate::tui::scroll::ScrollState;
use crate::tui::theme::Theme;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Debug)]
pub enum DetailBodyState {
    Loading,
    Failed,
    Ready(DetailData),
}

/// What a key press inside the panel asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    None,
    Close,
    Trigger,
    AskDeactivate,
    ConfirmDeactivate,
}

pub struct DetailPanel {
    pub plant_id: String,
    pub body: DetailBodyState,
    pub scroll: ScrollState,
    pub confirm_deactivate: bool,
    /// Set while a single-cycle trigger is in flight; the trigger key is
    /// ignored and its hint dims until the call settles.
    pub trigger_in_flight: bool,
}

impl DetailPanel {
    pub fn open(plant_id: String) -> Self {
        Self {
            plant_id,
            body: DetailBodyState::Loading,
            scroll: ScrollState::new(),
            confirm_deactivate: false,
            trigger_in_flight: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DetailAction {
        if self.confirm_deactivate {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_deactivate = false;
                    DetailAction::ConfirmDeactivate
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_deactivate = false;
                    DetailAction::None
                }
                _ => DetailAction::None,
            };
        }
        match key.code {
            KeyCode::Esc => DetailAction::Close,
            KeyCode::Char('t') if !self.trigger_in_flight => DetailAction::Trigger,
            KeyCode::Char('d') => {
                self.confirm_deactivate = true;
                DetailAction::AskDeactivate
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll.scroll_up();
                DetailAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll.scroll_down();
                DetailAction::None
            }
            KeyCode::PageUp => {
                self.scroll.page_up();
                DetailAction::None
            }
            KeyCode::PageDown => {
                self.scroll.page_down();
                DetailAction::None
            }
            _ => DetailAction::None,
        }
    }

    /// Draw the panel and return the rect it occupied, for click
    /// hit-testing by the event loop.
    pub fn render(&mut self, f: &mut Frame, area: Rect, cached: Option<&Plant>, theme: &Theme) -> Rect {
        let width = (area.width * 7 / 10).clamp(40, 78).min(area.width);
        let height = (area.height * 8 / 10).max(12).min(area.height);
        let modal = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        f.render_widget(Clear, modal);
        let title = match cached {
            Some(plant) => format!(
                " {} {} ",
                crate::format::plant_emoji(&plant.plant_type),
                plant.name
            ),
            None => " Detail Tanaman ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_focused_style())
            .title(Span::styled(title, theme.title_style()));
        let inner = block.inner(modal);
        f.render_widget(block, modal);

        let mut lines = self.body_lines(cached, theme, inner.width as usize);
        lines.push(Line::default());
        lines.push(self.footer_line(theme));

        let viewport = inner.height as usize;
        self.scroll.update_dimensions(lines.len(), viewport);
        let (start, end) = self.scroll.visible_range();
        let visible: Vec<Line> = lines[start..end].to_vec();
        f.render_widget(Paragraph::new(visible), inner);

        modal
    }

    fn body_lines(&self, cached: Option<&Plant>, theme: &Theme, width: usize) -> Vec<Line<'static>> {
        match &self.body {
            DetailBodyState::Loading => self.header_only_lines(cached, theme, "⏳ Memuat data…"),
            DetailBodyState::Failed => {
                self.header_only_lines(cached, theme, "✗ Gagal memuat detail tanaman")
            }
            DetailBodyState::Ready(data) => {
                let body = render::build_detail_body(
                    cached,
                    &data.instructions,
                    &data.weather,
                    &data.actions,
                    Utc::now(),
                );
                composed_lines(&body, theme, width)
            }
        }
    }

    /// Cached header fields (when the plant is in the list cache) above a
    /// loading or error placeholder.
    fn header_only_lines(
        &self,
        cached: Option<&Plant>,
        theme: &Theme,
        placeholder: &str,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(plant) = cached {
            lines.push(Line::from(vec![
                Span::styled(
                    crate::format::state_label(&plant.current_state).to_string(),
                    theme.state_style(crate::model::PlantState::parse(&plant.current_state)),
                ),
                Span::styled(
                    format!("  📍 {}  ·  Hari {}", plant.location, plant.days_since_planting),
                    theme.muted_style(),
                ),
            ]));
            lines.push(Line::default());
        }
        let style = if matches!(self.body, DetailBodyState::Failed) {
            theme.error_style()
        } else {
            theme.loading_style()
        };
        lines.push(Line::from(Span::styled(placeholder.to_string(), style)));
        lines
    }

    fn footer_line(&self, theme: &Theme) -> Line<'static> {
        if self.confirm_deactivate {
            return Line::from(Span::styled(
                "Nonaktifkan tanaman ini? (y/n)",
                theme.error_style(),
            ));
        }
        let trigger_hint = if self.trigger_in_flight {
            Span::styled("t: siklus berjalan…", theme.muted_style())
        } else {
            Span::styled("t: jalankan siklus", theme.base_style())
        };
        Line::from(vec![
            trigger_hint,
            Span::styled("  ·  d: nonaktifkan  ·  ↑↓: gulir  ·  Esc: tutup", theme.muted_style()),
        ])
    }
}

fn composed_lines(body: &render::DetailBody, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(body.state_label.clone(), theme.state_style(body.state)),
        Span::styled(format!("  ·  {}", body.day_counter), theme.muted_style()),
    ]));
    if !body.location.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("📍 {}", body.location),
            theme.muted_style(),
        )));
    }
    if let Some(next) = &body.next_state_label {
        lines.push(Line::from(Span::styled(
            format!("Fase berikutnya: {next}"),
            theme.muted_style(),
        )));
    }

    lines.push(Line::default());
    lines.push(section_title("Cuaca", theme));
    lines.push(Line::from(Span::styled(
        format!(
            "{}   {}   {}",
            body.weather.temp_line, body.weather.humidity_line, body.weather.rainfall_line
        ),
        theme.base_style(),
    )));
    if let Some(forecast) = &body.weather.forecast {
        lines.push(Line::from(Span::styled(forecast.clone(), theme.muted_style())));
    }

    lines.push(Line::default());
    lines.push(section_title("Instruksi Hari Ini", theme));
    match &body.instructions {
        InstructionsView::NoAction => lines.push(Line::from(Span::styled(
            "✅ Tidak ada tindakan yang diperlukan",
            theme.empty_style(),
        ))),
        InstructionsView::Lines(instruction_lines) => {
            for line in instruction_lines {
                let style = if line.is_alert {
                    theme.action_style(crate::model::ActionType::Alert)
                        .add_modifier(Modifier::BOLD)
                } else {
                    theme.action_style(line.kind)
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("{} ", line.icon)),
                    Span::styled(
                        crate::util::truncate_width(&line.text, width.saturating_sub(3)),
                        style,
                    ),
                ]));
            }
        }
        // the panel builds these from loaded data only
        InstructionsView::Loading | InstructionsView::Failed => {}
    }

    if !body.harvest.is_empty() {
        lines.push(Line::default());
        lines.push(section_title("Info Panen", theme));
        for indicator in &body.harvest.indicators {
            lines.push(Line::from(vec![
                Span::raw("🌾 "),
                Span::styled(
                    crate::util::truncate_width(indicator, width.saturating_sub(3)),
                    theme.base_style(),
                ),
            ]));
        }
        if let Some(notes) = body.harvest.notes.as_deref().filter(|n| !n.is_empty()) {
            lines.push(Line::from(Span::styled(notes.to_string(), theme.muted_style())));
        }
    }

    if !body.diseases.is_empty() {
        lines.push(Line::default());
        lines.push(section_title("Penyakit Umum", theme));
        lines.push(Line::from(Span::styled(
            body.diseases.join(", "),
            theme.muted_style(),
        )));
    }

    lines.push(Line::default());
    lines.push(section_title("Aksi Terbaru", theme));
    if body.actions.is_empty() {
        lines.push(Line::from(Span::styled("Belum ada aksi", theme.empty_style())));
    }
    for action in &body.actions {
        lines.push(Line::from(vec![
            Span::raw(format!("{} ", action.icon)),
            Span::styled(
                crate::util::truncate_width(&action.description, width.saturating_sub(20)),
                theme.action_style(action.kind),
            ),
            Span::styled(
                format!("  [{}] {}", action.source, action.when),
                theme.muted_style(),
            ),
        ]));
    }

    lines
}

fn section_title(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        format!("── {text} ──"),
        theme.title_style(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(panel: &mut DetailPanel, code: KeyCode) -> DetailAction {
        panel.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_deactivate_requires_confirmation() {
        let mut panel = DetailPanel::open("p1".to_string());
        assert_eq!(press(&mut panel, KeyCode::Char('d')), DetailAction::AskDeactivate);
        assert!(panel.confirm_deactivate);
        // n aborts and leaves state unchanged
        assert_eq!(press(&mut panel, KeyCode::Char('n')), DetailAction::None);
        assert!(!panel.confirm_deactivate);
        // y confirms
        press(&mut panel, KeyCode::Char('d'));
        assert_eq!(press(&mut panel, KeyCode::Char('y')), DetailAction::ConfirmDeactivate);
    }

    #[test]
    fn test_trigger_key_ignored_while_in_flight() {
        let mut panel = DetailPanel::open("p1".to_string());
        assert_eq!(press(&mut panel, KeyCode::Char('t')), DetailAction::Trigger);
        panel.trigger_in_flight = true;
        assert_eq!(press(&mut panel, KeyCode::Char('t')), DetailAction::None);
    }

    #[test]
    fn test_esc_closes_unless_confirming() {
        let mut panel = DetailPanel::open("p1".to_string());
        press(&mut panel, KeyCode::Char('d'));
        // Esc answers the prompt, not the panel
        assert_eq!(press(&mut panel, KeyCode::Esc), DetailAction::None);
        assert!(!panel.confirm_deactivate);
        assert_eq!(press(&mut panel, KeyCode::Esc), DetailAction::Close);
    }
}
