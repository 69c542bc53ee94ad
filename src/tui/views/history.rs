// History page: the farm-wide event timeline.

use crate::loader::Remote;
use crate::render;
use crate::tui::app::App;
use chrono::Utc;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme.clone();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(Span::styled(
            format!(" Riwayat ({} terakhir) ", app.history_limit),
            theme.title_style(),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let entries = match &app.history {
        Remote::Loading => {
            f.render_widget(
                Paragraph::new(super::placeholder_line("⏳ Memuat riwayat…", false, &theme)),
                inner,
            );
            return;
        }
        Remote::Failed(message) => {
            f.render_widget(
                Paragraph::new(super::placeholder_line(
                    &format!("✗ Gagal memuat riwayat: {message}"),
                    true,
                    &theme,
                )),
                inner,
            );
            return;
        }
        Remote::Ready(entries) => entries,
    };

    if entries.is_empty() {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Belum ada kejadian",
                theme.empty_style(),
            ))),
            inner,
        );
        return;
    }

    let plants = app.plants.ready().map(Vec::as_slice).unwrap_or(&[]);
    let rows = render::build_timeline(entries, plants, Utc::now());

    let viewport = inner.height as usize;
    app.history_scroll.update_dimensions(rows.len(), viewport);
    let (start, end) = app.history_scroll.visible_range();

    let width = inner.width as usize;
    let lines: Vec<Line> = rows[start..end]
        .iter()
        .map(|row| {
            Line::from(vec![
                Span::styled("● ", theme.dot_style(row.dot)),
                Span::styled(
                    format!("{:<16}", crate::util::truncate_width(&row.title, 16)),
                    theme.title_style(),
                ),
                Span::styled(
                    crate::util::truncate_width(&row.description, width.saturating_sub(32)),
                    theme.base_style(),
                ),
                Span::styled(format!("  {}", row.when), theme.muted_style()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}
