// Draw dispatch
//
// One draw per frame: page chrome, the active page's body, then overlays
// in stacking order (detail panel, add-plant form, logs, toasts on top).

pub mod dashboard;
pub mod history;
pub mod plants;

use crate::tui::app::{App, Page};
use crate::tui::components::toast;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let theme = app.theme.clone();
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(theme.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    draw_tabs(f, chunks[0], app);
    app.card_rects.clear();
    match app.page {
        Page::Dashboard => dashboard::draw(f, chunks[1], app),
        Page::Plants => plants::draw(f, chunks[1], app),
        Page::History => history::draw(f, chunks[1], app),
    }
    draw_footer(f, chunks[2], app);

    // Overlays. The detail panel is taken out so its mutable render can
    // run while the plant cache is read for the header.
    if let Some(mut panel) = app.detail.take() {
        let cached = app.cached_plant(&panel.plant_id).cloned();
        let rect = panel.render(f, chunks[1], cached.as_ref(), &theme);
        app.panel_rect = Some(rect);
        app.detail = Some(panel);
    } else {
        app.panel_rect = None;
    }

    if let Some(form) = &app.add_plant {
        form.render(f, area, &theme);
    }

    if app.show_logs {
        let buffer = app.log_buffer.clone();
        app.logs_panel.render(f, area, &buffer, &theme);
    }

    toast::render(f, area, &app.toasts, &theme);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(" 🌱 taniterm ", theme.title_style())];
    for (i, page) in Page::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, page.title());
        if *page == app.page {
            spans.push(Span::styled(label, theme.selected_style()));
        } else {
            spans.push(Span::styled(label, theme.muted_style()));
        }
    }
    if app.api.is_demo() {
        spans.push(Span::styled("  [demo]", theme.muted_style()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let page_hint = match app.page {
        Page::Dashboard => "↑↓←→ pilih · Enter detail",
        Page::Plants => "↑↓←→ pilih · Enter detail · f filter",
        Page::History => "↑↓ gulir",
    };
    let line = Line::from(vec![
        Span::styled(format!(" {page_hint}"), theme.muted_style()),
        Span::styled(
            " · Tab halaman · a tambah · b siklus massal · r muat ulang · t tema · l log · q keluar",
            theme.muted_style(),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Standard placeholder line for a region that is loading or failed.
pub(crate) fn placeholder_line(message: &str, failed: bool, theme: &crate::tui::theme::Theme) -> Line<'static> {
    let style = if failed {
        theme.error_style()
    } else {
        theme.loading_style()
    };
    Line::from(Span::styled(message.to_string(), style))
}
