// Dashboard page: summary strip, weather strip, today's instructions and
// the plant cards.

use crate::loader::Remote;
use crate::render::{self, InstructionsView};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme.clone();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Min(0),
        ])
        .split(area);

    draw_summary(f, chunks[0], app, &theme);
    draw_weather(f, chunks[1], app, &theme);
    draw_instructions(f, chunks[2], app, &theme);
    super::plants::draw_cards(f, chunks[3], app, &theme);
}

fn draw_summary(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(Span::styled(" Ringkasan Kebun ", theme.title_style()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = match &app.summary {
        Remote::Loading => vec![super::placeholder_line("⏳ Memuat ringkasan…", false, theme)],
        Remote::Failed(message) => vec![super::placeholder_line(
            &format!("✗ Gagal memuat ringkasan: {message}"),
            true,
            theme,
        )],
        Remote::Ready(summary) => {
            let strip = render::build_summary_strip(summary);
            vec![
                Line::from(vec![
                    Span::styled(strip.date, theme.base_style().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("   {}", strip.plants_line), theme.base_style()),
                ]),
                Line::from(vec![
                    Span::styled(strip.actions_line, theme.base_style()),
                    Span::styled(format!("   {}", strip.alerts_line), theme.muted_style()),
                ]),
            ]
        }
    };
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_weather(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let line = match &app.weather {
        Remote::Loading => super::placeholder_line(" ⏳ Memuat cuaca…", false, theme),
        Remote::Failed(_) => super::placeholder_line(" ✗ Cuaca tidak tersedia", true, theme),
        Remote::Ready(weather) => {
            let view = render::build_weather_view(weather);
            let mut text = format!(
                " {}   {}   {}",
                view.temp_line, view.humidity_line, view.rainfall_line
            );
            if let Some(forecast) = view.forecast {
                text.push_str(&format!("   {forecast}"));
            }
            Line::from(Span::styled(text, theme.base_style()))
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Today's instructions come with the farm summary; loading, failed and
/// no-action each render distinctly.
fn draw_instructions(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(Span::styled(" Instruksi Hari Ini ", theme.title_style()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let view = match &app.summary {
        Remote::Loading => InstructionsView::Loading,
        Remote::Failed(_) => InstructionsView::Failed,
        Remote::Ready(summary) => render::instruction_lines(&summary.instructions, &summary.alerts),
    };
    let lines = match view {
        InstructionsView::Loading => vec![super::placeholder_line("⏳ Memuat…", false, theme)],
        InstructionsView::Failed => {
            vec![super::placeholder_line("✗ Gagal memuat instruksi", true, theme)]
        }
        InstructionsView::NoAction => vec![Line::from(Span::styled(
            "✅ Tidak ada tindakan yang diperlukan",
            theme.empty_style(),
        ))],
        InstructionsView::Lines(instruction_lines) => instruction_lines
            .iter()
            .take(inner.height as usize)
            .map(|line| {
                let style = if line.is_alert {
                    theme
                        .action_style(crate::model::ActionType::Alert)
                        .add_modifier(Modifier::BOLD)
                } else {
                    theme.action_style(line.kind)
                };
                Line::from(vec![
                    Span::raw(format!("{} ", line.icon)),
                    Span::styled(
                        crate::util::truncate_width(&line.text, inner.width.saturating_sub(3) as usize),
                        style,
                    ),
                ])
            })
            .collect(),
    };
    f.render_widget(Paragraph::new(lines), inner);
}
