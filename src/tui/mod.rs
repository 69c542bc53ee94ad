// Terminal UI
//
// Terminal setup/teardown and the event loop. The loop multiplexes three
// sources: terminal input, a 200ms tick for toast expiry and redraws, and
// load completions from spawned API calls.

pub mod app;
pub mod components;
pub mod scroll;
pub mod theme;
pub mod views;

use crate::api::ApiClient;
use crate::config::Config;
use crate::loader::LoadMsg;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, Page};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub async fn run_tui(api: Arc<ApiClient>, log_buffer: LogBuffer, config: Config) -> Result<()> {
    install_panic_restore_hook();
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (tx, mut rx) = mpsc::channel(64);
    let mut app = App::new(api, tx, &config, log_buffer);
    app.startup_load();

    let result = run_event_loop(&mut terminal, &mut app, &mut rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// A panic anywhere in the draw/update path would otherwise leave raw
/// mode, the alternate screen and mouse capture active, so the terminal
/// is restored before the previous hook reports the panic. The release
/// profile aborts on panic; the hook still runs first.
fn install_panic_restore_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous(info);
    }));
}

/// Best-effort restore; errors are ignored since the terminal may
/// already be partially torn down.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        crossterm::cursor::Show
    );
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mut mpsc::Receiver<LoadMsg>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Terminal input (short poll keeps the loop responsive)
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => handle_key_event(app, key_event),
                        Ok(Event::Mouse(mouse_event)) => handle_mouse_event(app, mouse_event),
                        _ => {}
                    }
                }
            } => {}

            // Periodic tick: expire toasts, redraw
            _ = tick_interval.tick() => {
                app.toasts.sweep();
            }

            // Load completions from spawned API calls
            Some(msg) = rx.recv() => {
                app.apply(msg);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Layered dispatch: add-plant form → logs overlay → detail panel →
/// global keys → page keys. The first layer that owns the key wins.
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if app.add_plant.is_some() {
        app.handle_form_key(key_event);
        return;
    }

    if app.show_logs {
        if app.logs_panel.handle_key(key_event) {
            app.show_logs = false;
        }
        return;
    }

    if app.detail.is_some() {
        app.handle_detail_key(key_event);
        return;
    }

    if handle_global_keys(app, &key_event) {
        return;
    }

    handle_page_keys(app, &key_event);
}

fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.should_quit = true;
            true
        }
        KeyCode::Char('1') => {
            app.navigate(Page::Dashboard);
            true
        }
        KeyCode::Char('2') => {
            app.navigate(Page::Plants);
            true
        }
        KeyCode::Char('3') => {
            app.navigate(Page::History);
            true
        }
        KeyCode::Tab => {
            app.navigate(app.page.next());
            true
        }
        KeyCode::Char('r') => {
            app.refresh();
            true
        }
        KeyCode::Char('a') => {
            app.open_add_plant();
            true
        }
        KeyCode::Char('b') => {
            app.bulk_trigger();
            true
        }
        KeyCode::Char('t') => {
            app.cycle_theme();
            true
        }
        KeyCode::Char('l') => {
            app.show_logs = true;
            true
        }
        _ => false,
    }
}

fn handle_page_keys(app: &mut App, key_event: &KeyEvent) {
    match app.page {
        Page::Dashboard | Page::Plants => match key_event.code {
            KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1),
            KeyCode::Right => app.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => app.move_selection(-3),
            KeyCode::Down | KeyCode::Char('j') => app.move_selection(3),
            KeyCode::Enter => app.open_selected(),
            KeyCode::Char('f') if app.page == Page::Plants => app.toggle_active_only(),
            _ => {}
        },
        Page::History => match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => app.history_scroll.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => app.history_scroll.scroll_down(),
            KeyCode::PageUp => app.history_scroll.page_up(),
            KeyCode::PageDown => app.history_scroll.page_down(),
            KeyCode::Char('g') => app.history_scroll.scroll_to_top(),
            _ => {}
        },
    }
}

fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    match mouse_event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.handle_click(mouse_event.column, mouse_event.row);
        }
        MouseEventKind::ScrollUp => {
            if let Some(panel) = app.detail.as_mut() {
                panel.scroll.scroll_up();
            } else if app.page == Page::History {
                app.history_scroll.scroll_up();
            } else {
                app.move_selection(-1);
            }
        }
        MouseEventKind::ScrollDown => {
            if let Some(panel) = app.detail.as_mut() {
                panel.scroll.scroll_down();
            } else if app.page == Page::History {
                app.history_scroll.scroll_down();
            } else {
                app.move_selection(1);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_panic_hook_restores_then_delegates() {
        let delegated = Arc::new(AtomicBool::new(false));
        let flag = delegated.clone();
        std::panic::set_hook(Box::new(move |_| {
            flag.store(true, Ordering::SeqCst);
        }));
        install_panic_restore_hook();

        let result = std::panic::catch_unwind(|| panic!("draw failed"));

        let _ = std::panic::take_hook();
        assert!(result.is_err());
        // the restore hook must hand off to whatever hook was installed
        // before it, or panic reports would be swallowed
        assert!(delegated.load(Ordering::SeqCst));
    }
}
