// Application state
//
// Owns every UI region's load state and all overlay state. Mutation only
// happens here, on the event-loop task: spawned loads report back as
// `LoadMsg` and `apply` folds them in, discarding completions whose
// region token is stale.

use crate::api::ApiClient;
use crate::loader::{
    self, LoadMsg, MutationOutcome, Remote, TokenCounter,
};
use crate::model::{FarmSummary, HistoryEntry, Plant, WeatherSnapshot};
use crate::tui::components::add_plant::{AddPlantForm, FormAction};
use crate::tui::components::detail_panel::{DetailAction, DetailBodyState, DetailPanel};
use crate::tui::components::logs_panel::LogsPanel;
use crate::tui::components::toast::{Severity, ToastQueue};
use crate::tui::scroll::ScrollState;
use crate::tui::theme::{Theme, ThemeKind};
use crate::logging::LogBuffer;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Top-level pages, cycled with Tab and addressed with 1/2/3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Plants,
    History,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Plants, Page::History];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dasbor",
            Page::Plants => "Tanaman",
            Page::History => "Riwayat",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::Plants,
            Page::Plants => Page::History,
            Page::History => Page::Dashboard,
        }
    }
}

pub struct App {
    pub api: Arc<ApiClient>,
    tx: mpsc::Sender<LoadMsg>,
    pub should_quit: bool,
    pub page: Page,

    // Region load state
    pub summary: Remote<FarmSummary>,
    pub plants: Remote<Vec<Plant>>,
    pub history: Remote<Vec<HistoryEntry>>,
    pub weather: Remote<WeatherSnapshot>,
    summary_tokens: TokenCounter,
    plants_tokens: TokenCounter,
    history_tokens: TokenCounter,
    weather_tokens: TokenCounter,
    detail_tokens: TokenCounter,

    // Overlays
    pub detail: Option<DetailPanel>,
    pub add_plant: Option<AddPlantForm>,
    pub show_logs: bool,
    pub logs_panel: LogsPanel,
    pub toasts: ToastQueue,
    pub log_buffer: LogBuffer,

    pub theme_kind: ThemeKind,
    pub theme: Theme,

    // List controls
    pub active_only: bool,
    pub history_limit: u32,
    pub selected: usize,
    pub history_scroll: ScrollState,
    pub bulk_in_flight: bool,

    // Click hit-testing, recorded by the draw layer each frame
    pub card_rects: Vec<(Rect, String)>,
    pub panel_rect: Option<Rect>,
}

impl App {
    pub fn new(
        api: Arc<ApiClient>,
        tx: mpsc::Sender<LoadMsg>,
        config: &crate::config::Config,
        log_buffer: LogBuffer,
    ) -> Self {
        let theme_kind = ThemeKind::from_name(&config.theme);
        Self {
            api,
            tx,
            should_quit: false,
            page: Page::Dashboard,
            summary: Remote::Loading,
            plants: Remote::Loading,
            history: Remote::Loading,
            weather: Remote::Loading,
            summary_tokens: TokenCounter::default(),
            plants_tokens: TokenCounter::default(),
            history_tokens: TokenCounter::default(),
            weather_tokens: TokenCounter::default(),
            detail_tokens: TokenCounter::default(),
            detail: None,
            add_plant: None,
            show_logs: false,
            logs_panel: LogsPanel::new(),
            toasts: ToastQueue::new(),
            log_buffer,
            theme: theme_kind.theme(),
            theme_kind,
            active_only: config.active_only,
            history_limit: config.history_limit,
            selected: 0,
            history_scroll: ScrollState::new(),
            bulk_in_flight: false,
            card_rects: Vec::new(),
            panel_rect: None,
        }
    }

    /// Kick off the initial loads for the dashboard.
    pub fn startup_load(&mut self) {
        self.reload_summary();
        self.reload_plants();
    }

    pub fn reload_summary(&mut self) {
        self.summary = Remote::Loading;
        let token = self.summary_tokens.mint();
        loader::spawn_summary(self.api.clone(), self.tx.clone(), token);
    }

    pub fn reload_plants(&mut self) {
        self.plants = Remote::Loading;
        let token = self.plants_tokens.mint();
        loader::spawn_plants(self.api.clone(), self.tx.clone(), token, self.active_only);
    }

    pub fn reload_history(&mut self) {
        self.history = Remote::Loading;
        let token = self.history_tokens.mint();
        loader::spawn_history(self.api.clone(), self.tx.clone(), token, self.history_limit);
    }

    fn reload_weather(&mut self, plant_id: String) {
        self.weather = Remote::Loading;
        let token = self.weather_tokens.mint();
        loader::spawn_weather(self.api.clone(), self.tx.clone(), token, plant_id);
    }

    /// Switch page. The plants and history pages reload their lists on
    /// entry; dashboard data loads at startup and thereafter only via
    /// explicit refresh or a mutation reload.
    pub fn navigate(&mut self, page: Page) {
        self.page = page;
        match page {
            Page::Dashboard => {}
            Page::Plants => self.reload_plants(),
            Page::History => self.reload_history(),
        }
    }

    /// Manual refresh of the current page's regions.
    pub fn refresh(&mut self) {
        match self.page {
            Page::Dashboard => {
                self.reload_summary();
                self.reload_plants();
            }
            Page::Plants => self.reload_plants(),
            Page::History => self.reload_history(),
        }
        self.toasts.notify("Memuat ulang…", Severity::Info);
    }

    pub fn cycle_theme(&mut self) {
        self.theme_kind = self.theme_kind.next();
        self.theme = self.theme_kind.theme();
        self.toasts
            .notify(format!("Tema: {}", self.theme_kind.name()), Severity::Info);
    }

    pub fn toggle_active_only(&mut self) {
        self.active_only = !self.active_only;
        self.reload_plants();
    }

    /// Fold a load completion into state. Stale tokens are dropped so a
    /// slow response can never overwrite a newer one.
    pub fn apply(&mut self, msg: LoadMsg) {
        match msg {
            LoadMsg::Summary { token, result } => {
                if !self.summary_tokens.is_latest(token) {
                    tracing::debug!("discarding stale summary load (token {token})");
                    return;
                }
                self.summary = into_remote(result);
            }
            LoadMsg::Plants { token, result } => {
                if !self.plants_tokens.is_latest(token) {
                    tracing::debug!("discarding stale plant list load (token {token})");
                    return;
                }
                self.plants = into_remote(result);
                match &self.plants {
                    Remote::Ready(plants) => {
                        self.selected = self.selected.min(plants.len().saturating_sub(1));
                        // weather strip follows the first active plant's location
                        let first_active =
                            plants.iter().find(|p| p.is_active).map(|p| p.id.clone());
                        if let Some(id) = first_active {
                            self.reload_weather(id);
                        } else {
                            // no plant to resolve a location from; invalidate
                            // any in-flight fetch so it cannot land later
                            self.weather_tokens.mint();
                            self.weather = Remote::Failed("tidak ada tanaman aktif".to_string());
                        }
                    }
                    Remote::Failed(message) => {
                        let message = message.clone();
                        self.weather_tokens.mint();
                        self.weather = Remote::Failed(message);
                    }
                    Remote::Loading => {}
                }
            }
            LoadMsg::History { token, result } => {
                if !self.history_tokens.is_latest(token) {
                    tracing::debug!("discarding stale history load (token {token})");
                    return;
                }
                self.history = into_remote(result);
            }
            LoadMsg::Weather { token, result } => {
                if !self.weather_tokens.is_latest(token) {
                    tracing::debug!("discarding stale weather load (token {token})");
                    return;
                }
                self.weather = into_remote(result);
            }
            LoadMsg::Detail {
                token,
                plant_id,
                result,
            } => {
                if !self.detail_tokens.is_latest(token) {
                    tracing::debug!("discarding stale detail load for {plant_id}");
                    return;
                }
                if let Some(panel) = self.detail.as_mut() {
                    if panel.plant_id == plant_id {
                        panel.body = match result {
                            Ok(data) => DetailBodyState::Ready(data),
                            Err(_) => DetailBodyState::Failed,
                        };
                    }
                }
            }
            LoadMsg::Mutation(outcome) => self.apply_mutation(outcome),
        }
    }

    fn apply_mutation(&mut self, outcome: MutationOutcome) {
        match outcome {
            MutationOutcome::Created(Ok(plant)) => {
                self.add_plant = None;
                self.toasts.notify(
                    format!("Tanaman berhasil ditambahkan: {}", plant.name),
                    Severity::Success,
                );
                self.reload_summary();
                self.reload_plants();
            }
            MutationOutcome::Created(Err(e)) => {
                // the form stays open so the input can be corrected
                self.toasts.notify(e.user_message(), Severity::Error);
            }
            MutationOutcome::Triggered { plant_id, result } => {
                match result {
                    Ok(()) => {
                        self.toasts.notify("Siklus agen selesai", Severity::Success);
                        if let Some(panel) = self.detail.as_mut() {
                            if panel.plant_id == plant_id {
                                panel.trigger_in_flight = false;
                                panel.body = DetailBodyState::Loading;
                                let token = self.detail_tokens.mint();
                                loader::spawn_detail(
                                    self.api.clone(),
                                    self.tx.clone(),
                                    token,
                                    plant_id,
                                );
                            }
                        }
                        self.reload_summary();
                    }
                    Err(e) => {
                        self.toasts.notify(e.user_message(), Severity::Error);
                        if let Some(panel) = self.detail.as_mut() {
                            if panel.plant_id == plant_id {
                                panel.trigger_in_flight = false;
                            }
                        }
                    }
                }
            }
            MutationOutcome::BulkTriggered { succeeded, failed } => {
                self.bulk_in_flight = false;
                let severity = if failed == 0 {
                    Severity::Success
                } else {
                    Severity::Warning
                };
                self.toasts.notify(
                    format!("Siklus massal: {succeeded} berhasil, {failed} gagal"),
                    severity,
                );
                self.reload_summary();
                self.reload_plants();
                if self.page == Page::History {
                    self.reload_history();
                }
            }
            MutationOutcome::Deactivated { plant_id, result } => match result {
                Ok(()) => {
                    if self
                        .detail
                        .as_ref()
                        .is_some_and(|p| p.plant_id == plant_id)
                    {
                        self.close_detail();
                    }
                    self.toasts.notify("Tanaman dinonaktifkan", Severity::Success);
                    self.reload_summary();
                    self.reload_plants();
                }
                Err(e) => {
                    self.toasts.notify(e.user_message(), Severity::Error);
                }
            },
        }
    }

    // ── Detail panel ────────────────────────────────────────────────────

    pub fn open_detail(&mut self, plant_id: String) {
        let token = self.detail_tokens.mint();
        self.detail = Some(DetailPanel::open(plant_id.clone()));
        loader::spawn_detail(self.api.clone(), self.tx.clone(), token, plant_id);
    }

    pub fn open_selected(&mut self) {
        let id = self
            .plants
            .ready()
            .and_then(|plants| plants.get(self.selected))
            .map(|p| p.id.clone());
        if let Some(id) = id {
            self.open_detail(id);
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.panel_rect = None;
    }

    /// Plant from the cached list, for the detail header while loading.
    pub fn cached_plant(&self, plant_id: &str) -> Option<&Plant> {
        self.plants
            .ready()
            .and_then(|plants| plants.iter().find(|p| p.id == plant_id))
    }

    pub fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some(panel) = self.detail.as_mut() else {
            return;
        };
        let plant_id = panel.plant_id.clone();
        match panel.handle_key(key) {
            DetailAction::None | DetailAction::AskDeactivate => {}
            DetailAction::Close => self.close_detail(),
            DetailAction::Trigger => {
                panel.trigger_in_flight = true;
                loader::spawn_trigger(self.api.clone(), self.tx.clone(), plant_id);
            }
            DetailAction::ConfirmDeactivate => {
                loader::spawn_deactivate(self.api.clone(), self.tx.clone(), plant_id);
            }
        }
    }

    // ── Add-plant form ──────────────────────────────────────────────────

    pub fn open_add_plant(&mut self) {
        self.add_plant = Some(AddPlantForm::new());
    }

    pub fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.add_plant.as_mut() else {
            return;
        };
        match form.handle_key(key) {
            FormAction::None => {}
            FormAction::Cancel => self.add_plant = None,
            FormAction::Submit => self.submit_add_plant(),
        }
    }

    /// Validate and, only on success, issue the create. A failing form
    /// never reaches the network.
    pub fn submit_add_plant(&mut self) {
        let Some(form) = self.add_plant.as_ref() else {
            return;
        };
        match form.validate() {
            Ok(plant) => {
                loader::spawn_create(self.api.clone(), self.tx.clone(), plant);
            }
            Err(message) => {
                self.toasts.notify(message, Severity::Warning);
            }
        }
    }

    // ── Bulk trigger ────────────────────────────────────────────────────

    /// Trigger a cycle for every active plant in the cached list,
    /// sequentially. With nothing active this is a pure no-op beyond the
    /// notice: no request goes out and no reload is scheduled.
    pub fn bulk_trigger(&mut self) {
        if self.bulk_in_flight {
            return;
        }
        let ids: Vec<String> = self
            .plants
            .ready()
            .map(|plants| {
                plants
                    .iter()
                    .filter(|p| p.is_active)
                    .map(|p| p.id.clone())
                    .collect()
            })
            .unwrap_or_default();
        if ids.is_empty() {
            self.toasts.notify("Tidak ada tanaman aktif", Severity::Info);
            return;
        }
        self.bulk_in_flight = true;
        self.toasts.notify(
            format!("Menjalankan siklus untuk {} tanaman…", ids.len()),
            Severity::Info,
        );
        loader::spawn_bulk_trigger(self.api.clone(), self.tx.clone(), ids);
    }

    // ── Selection and mouse ─────────────────────────────────────────────

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.plants.ready().map(|p| p.len()).unwrap_or(0);
        if len == 0 {
            return;
        }
        let current = self.selected as i32;
        self.selected = (current + delta).clamp(0, len as i32 - 1) as usize;
    }

    /// Click dispatch per the recorded frame geometry: a click on a card
    /// opens its detail; with a panel open, a click outside it closes it.
    pub fn handle_click(&mut self, x: u16, y: u16) {
        if self.show_logs || self.add_plant.is_some() {
            return;
        }
        if let Some(rect) = self.panel_rect {
            if !contains(rect, x, y) {
                self.close_detail();
            }
            return;
        }
        let hit = self
            .card_rects
            .iter()
            .find(|(rect, _)| contains(*rect, x, y))
            .map(|(_, id)| id.clone());
        if let Some(id) = hit {
            if let Some(idx) = self
                .plants
                .ready()
                .and_then(|plants| plants.iter().position(|p| p.id == id))
            {
                self.selected = idx;
            }
            self.open_detail(id);
        }
    }
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn into_remote<T>(result: Result<T, crate::api::ApiError>) -> Remote<T> {
    match result {
        Ok(value) => Remote::Ready(value),
        Err(e) => Remote::Failed(e.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{sample_plant, DemoFarm};
    use crossterm::event::{KeyCode, KeyModifiers};

    fn test_app() -> (App, mpsc::Receiver<LoadMsg>) {
        let api = Arc::new(ApiClient::demo(DemoFarm::seeded()));
        let (tx, rx) = mpsc::channel(16);
        let config = crate::config::Config::default();
        let app = App::new(api, tx, &config, LogBuffer::new());
        (app, rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_form_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_network() {
        let (mut app, mut rx) = test_app();
        app.open_add_plant();
        // empty name, submit
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.toasts.last_message(), Some("Nama tanaman wajib diisi"));
        assert!(app.add_plant.is_some());
        assert!(rx.try_recv().is_err());
        assert_eq!(app.api.demo_farm().await.create_calls, 0);
    }

    #[tokio::test]
    async fn test_duplicate_name_keeps_form_open_with_server_message() {
        let (mut app, mut rx) = test_app();
        app.open_add_plant();
        for c in "Cabai Rawit".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        // jump to location and coordinates
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        for c in "Jakarta".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);

        let msg = rx.recv().await.unwrap();
        app.apply(msg);
        assert_eq!(app.toasts.last_message(), Some("duplicate name"));
        assert!(app.add_plant.is_some());
    }

    #[tokio::test]
    async fn test_bulk_trigger_with_no_active_plants_is_a_noop() {
        let (mut app, mut rx) = test_app();
        app.plants = Remote::Ready(vec![sample_plant("p1", "Lama", "dormant", false)]);
        app.bulk_trigger();
        assert_eq!(app.toasts.last_message(), Some("Tidak ada tanaman aktif"));
        assert!(!app.bulk_in_flight);
        assert!(rx.try_recv().is_err());
        assert_eq!(app.api.demo_farm().await.trigger_calls, 0);
    }

    #[tokio::test]
    async fn test_rapid_detail_reopen_discards_stale_completion() {
        let (mut app, mut rx) = test_app();
        app.open_detail("demo-cabai".to_string());
        app.open_detail("demo-tomat".to_string());

        // both completions arrive; only the latest token may land
        let mut msgs = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        // apply in token order so the stale one is seen last too
        msgs.sort_by_key(|m| match m {
            LoadMsg::Detail { token, .. } => std::cmp::Reverse(*token),
            _ => std::cmp::Reverse(0),
        });
        for msg in msgs {
            app.apply(msg);
        }

        let panel = app.detail.as_ref().unwrap();
        assert_eq!(panel.plant_id, "demo-tomat");
        match &panel.body {
            DetailBodyState::Ready(data) => {
                assert_eq!(data.instructions.plant_id, "demo-tomat");
            }
            other => panic!("expected ready body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deactivation_closes_panel_and_reloads() {
        let (mut app, _rx) = test_app();
        app.detail = Some(DetailPanel::open("demo-cabai".to_string()));
        app.apply(LoadMsg::Mutation(MutationOutcome::Deactivated {
            plant_id: "demo-cabai".to_string(),
            result: Ok(()),
        }));
        assert!(app.detail.is_none());
        assert_eq!(app.toasts.last_message(), Some("Tanaman dinonaktifkan"));
        assert!(app.summary.is_loading());
        assert!(app.plants.is_loading());
    }

    #[tokio::test]
    async fn test_weather_settles_when_no_plant_is_active() {
        let (mut app, mut rx) = test_app();
        let token = app.plants_tokens.mint();
        app.apply(LoadMsg::Plants {
            token,
            result: Ok(vec![sample_plant("p1", "Lama", "dormant", false)]),
        });
        // the strip must not sit on the loading placeholder forever
        assert!(matches!(app.weather, Remote::Failed(_)));
        // and no weather fetch was spawned
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_weather_fails_along_with_the_plant_list() {
        let (mut app, mut rx) = test_app();
        let token = app.plants_tokens.mint();
        app.apply(LoadMsg::Plants {
            token,
            result: Err(crate::api::ApiError::Transport("connection refused".to_string())),
        });
        assert!(matches!(app.plants, Remote::Failed(_)));
        assert!(matches!(app.weather, Remote::Failed(_)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_selection_clamps_to_list() {
        let (mut app, _rx) = test_app();
        app.plants = Remote::Ready(vec![
            sample_plant("p1", "A", "seed", true),
            sample_plant("p2", "B", "vegetative", true),
        ]);
        app.move_selection(5);
        assert_eq!(app.selected, 1);
        app.move_selection(-5);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_click_outside_open_panel_closes_it() {
        let (mut app, _rx) = test_app();
        app.detail = Some(DetailPanel::open("p1".to_string()));
        app.panel_rect = Some(Rect::new(10, 5, 40, 20));
        app.handle_click(5, 5);
        assert!(app.detail.is_none());
    }
}
