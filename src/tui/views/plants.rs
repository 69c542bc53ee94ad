// Plants page: the full card grid with the active-only filter indicator.

use crate::loader::Remote;
use crate::render::{self, PlantCard, PlantsView, StageMark};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::truncate_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const CARD_HEIGHT: u16 = 6;
const MAX_COLUMNS: u16 = 3;

pub fn draw(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme.clone();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let filter = if app.active_only {
        "Filter: hanya tanaman aktif (f untuk semua)"
    } else {
        "Filter: semua tanaman (f untuk aktif saja)"
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(format!(" {filter}"), theme.muted_style()))),
        chunks[0],
    );

    draw_cards(f, chunks[1], app, &theme);
}

/// Draw the card grid for the cached plant list, recording each card's
/// rect for click hit-testing. Shared with the dashboard page.
pub fn draw_cards(f: &mut Frame, area: Rect, app: &mut App, theme: &Theme) {
    match &app.plants {
        Remote::Loading => {
            f.render_widget(
                Paragraph::new(super::placeholder_line("⏳ Memuat tanaman…", false, theme)),
                area,
            );
            return;
        }
        Remote::Failed(message) => {
            f.render_widget(
                Paragraph::new(super::placeholder_line(
                    &format!("✗ Gagal memuat tanaman: {message}"),
                    true,
                    theme,
                )),
                area,
            );
            return;
        }
        Remote::Ready(plants) => match render::build_plants_view(plants) {
            PlantsView::Empty => {
                f.render_widget(
                    Paragraph::new(Line::from(Span::styled(
                        "Belum ada tanaman. Tekan 'a' untuk menambah.",
                        theme.empty_style(),
                    ))),
                    area,
                );
            }
            PlantsView::Cards(cards) => {
                draw_card_grid(f, area, app, theme, &cards);
            }
        },
    }
}

fn draw_card_grid(f: &mut Frame, area: Rect, app: &mut App, theme: &Theme, cards: &[PlantCard]) {
    if area.width < 20 || area.height < CARD_HEIGHT {
        return;
    }
    let columns = (area.width / 28).clamp(1, MAX_COLUMNS);
    let card_width = area.width / columns;
    let rows_visible = (area.height / CARD_HEIGHT) as usize;

    // keep the selected card in view
    let total_rows = cards.len().div_ceil(columns as usize);
    let selected_row = app.selected / columns as usize;
    let first_row = selected_row
        .saturating_sub(rows_visible.saturating_sub(1))
        .min(total_rows.saturating_sub(rows_visible.max(1)));

    for (i, card) in cards.iter().enumerate() {
        let row = i / columns as usize;
        if row < first_row || row >= first_row + rows_visible {
            continue;
        }
        let col = (i % columns as usize) as u16;
        let rect = Rect::new(
            area.x + col * card_width,
            area.y + ((row - first_row) as u16) * CARD_HEIGHT,
            card_width,
            CARD_HEIGHT,
        );
        app.card_rects.push((rect, card.id.clone()));
        draw_card(f, rect, theme, card, i == app.selected);
    }
}

fn draw_card(f: &mut Frame, area: Rect, theme: &Theme, card: &PlantCard, selected: bool) {
    let border_style = if selected {
        theme.border_focused_style()
    } else {
        theme.border_style()
    };
    let name_style = if card.is_active {
        theme.title_style()
    } else {
        theme.muted_style()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} {} ", card.emoji, card.name),
            name_style,
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines = vec![
        Line::from(Span::styled(
            truncate_width(&card.subtitle, width),
            theme.muted_style(),
        )),
        Line::from(vec![
            Span::styled(card.state_label.clone(), theme.state_style(card.state)),
            if card.is_active {
                Span::raw("")
            } else {
                Span::styled("  (nonaktif)", theme.muted_style())
            },
        ]),
        Line::from(Span::styled(
            truncate_width(&card.day_counter, width),
            theme.base_style(),
        )),
        stage_line(card, theme),
    ];
    lines.truncate(inner.height as usize);
    f.render_widget(Paragraph::new(lines), inner);
}

/// Five-dot progress indicator: done ●, current ◉, upcoming ○.
fn stage_line(card: &PlantCard, theme: &Theme) -> Line<'static> {
    let spans = card
        .stages
        .iter()
        .map(|mark| {
            let (glyph, color) = match mark {
                StageMark::Done => ("● ", theme.stage_done),
                StageMark::Current => ("◉ ", theme.stage_current),
                StageMark::Upcoming => ("○ ", theme.stage_upcoming),
            };
            Span::styled(glyph, ratatui::style::Style::default().fg(color))
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}
