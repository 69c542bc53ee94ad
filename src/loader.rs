// Load orchestration
//
// Every network operation runs on a spawned task and reports back to the
// event loop over an mpsc channel as a `LoadMsg`. State is only ever
// mutated on the event-loop side, so the UI regions cannot race each
// other; staleness between repeated loads of the same region is handled
// by the token scheme below.
//
// Token scheme: each region keeps a monotonically increasing counter.
// Issuing a load mints a new token and hands it to the spawned task; the
// completion carries the token back, and the event loop drops any
// completion whose token is no longer the latest for its region. A rapid
// page switch or double detail-open therefore never lets an old response
// overwrite a newer one.

use crate::api::{ApiClient, ApiError};
use crate::model::{
    ActionEvent, FarmSummary, HistoryEntry, InstructionSet, NewPlant, Plant, WeatherSnapshot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Recent actions shown in the detail panel.
pub const DETAIL_ACTIONS_LIMIT: u32 = 10;

/// Pause after a successful single trigger before re-fetching the detail
/// panel, giving the backend time to commit the cycle's actions.
const TRIGGER_REFRESH_DELAY: Duration = Duration::from_millis(800);

/// Load state of one UI region. `Failed` carries a user-facing message;
/// the raw error goes to the log.
#[derive(Debug, Clone)]
pub enum Remote<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Remote<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }
}

/// Per-region monotonic token counter.
#[derive(Debug, Default)]
pub struct TokenCounter(u64);

impl TokenCounter {
    /// Mint the token for a new load; everything older becomes stale.
    pub fn mint(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_latest(&self, token: u64) -> bool {
        self.0 == token
    }
}

/// The composed payload of the detail panel's three parallel fetches.
/// All three must succeed; a single failure fails the composition.
#[derive(Debug, Clone)]
pub struct DetailData {
    pub instructions: InstructionSet,
    pub weather: WeatherSnapshot,
    pub actions: Vec<ActionEvent>,
}

/// Completion messages sent from spawned loads back to the event loop.
#[derive(Debug)]
pub enum LoadMsg {
    Summary {
        token: u64,
        result: Result<FarmSummary, ApiError>,
    },
    Plants {
        token: u64,
        result: Result<Vec<Plant>, ApiError>,
    },
    History {
        token: u64,
        result: Result<Vec<HistoryEntry>, ApiError>,
    },
    Weather {
        token: u64,
        result: Result<WeatherSnapshot, ApiError>,
    },
    Detail {
        token: u64,
        plant_id: String,
        result: Result<DetailData, ApiError>,
    },
    Mutation(MutationOutcome),
}

/// Terminal state of a mutating workflow. Mutations are not token-guarded;
/// each one is reported exactly once and handled in arrival order.
#[derive(Debug)]
pub enum MutationOutcome {
    Created(Result<Plant, ApiError>),
    Triggered {
        plant_id: String,
        result: Result<(), ApiError>,
    },
    BulkTriggered {
        succeeded: u32,
        failed: u32,
    },
    Deactivated {
        plant_id: String,
        result: Result<(), ApiError>,
    },
}

pub fn spawn_summary(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, token: u64) {
    tokio::spawn(async move {
        let result = api.farm_summary().await;
        if let Err(ref e) = result {
            tracing::warn!("summary load failed: {e}");
        }
        let _ = tx.send(LoadMsg::Summary { token, result }).await;
    });
}

pub fn spawn_plants(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, token: u64, active_only: bool) {
    tokio::spawn(async move {
        let result = api.plants(active_only).await;
        if let Err(ref e) = result {
            tracing::warn!("plant list load failed: {e}");
        }
        let _ = tx.send(LoadMsg::Plants { token, result }).await;
    });
}

pub fn spawn_history(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, token: u64, limit: u32) {
    tokio::spawn(async move {
        let result = api.history(limit).await;
        if let Err(ref e) = result {
            tracing::warn!("history load failed: {e}");
        }
        let _ = tx.send(LoadMsg::History { token, result }).await;
    });
}

pub fn spawn_weather(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, token: u64, plant_id: String) {
    tokio::spawn(async move {
        let result = api.weather(&plant_id).await;
        if let Err(ref e) = result {
            tracing::warn!("weather load failed for {plant_id}: {e}");
        }
        let _ = tx.send(LoadMsg::Weather { token, result }).await;
    });
}

/// Issue the detail panel's three fetches concurrently and report one
/// combined result once all have settled.
pub fn spawn_detail(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, token: u64, plant_id: String) {
    tokio::spawn(async move {
        let (instructions, weather, actions) = tokio::join!(
            api.instructions(&plant_id),
            api.weather(&plant_id),
            api.actions(&plant_id, DETAIL_ACTIONS_LIMIT),
        );
        let result = (|| {
            Ok(DetailData {
                instructions: instructions?,
                weather: weather?,
                actions: actions?,
            })
        })();
        if let Err(ref e) = result {
            tracing::warn!("detail load failed for {plant_id}: {e}");
        }
        let _ = tx
            .send(LoadMsg::Detail {
                token,
                plant_id,
                result,
            })
            .await;
    });
}

pub fn spawn_create(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, plant: NewPlant) {
    tokio::spawn(async move {
        let result = api.create_plant(&plant).await;
        match &result {
            Ok(created) => tracing::info!("plant created: {} ({})", created.name, created.id),
            Err(e) => tracing::warn!("plant creation failed: {e}"),
        }
        let _ = tx.send(LoadMsg::Mutation(MutationOutcome::Created(result))).await;
    });
}

/// Trigger one agent cycle. On success the completion is delayed briefly
/// so the follow-up detail refresh sees the cycle's recorded actions.
pub fn spawn_trigger(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, plant_id: String) {
    tokio::spawn(async move {
        let result = api.trigger_cycle(&plant_id).await;
        match &result {
            Ok(()) => {
                tracing::info!("agent cycle triggered for {plant_id}");
                tokio::time::sleep(TRIGGER_REFRESH_DELAY).await;
            }
            Err(e) => tracing::warn!("trigger failed for {plant_id}: {e}"),
        }
        let _ = tx
            .send(LoadMsg::Mutation(MutationOutcome::Triggered { plant_id, result }))
            .await;
    });
}

/// Trigger a cycle for each plant in turn. Strictly sequential: the next
/// POST is not issued until the previous one settles, bounding backend
/// load to one in-flight cycle.
pub fn spawn_bulk_trigger(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, plant_ids: Vec<String>) {
    tokio::spawn(async move {
        let mut succeeded = 0;
        let mut failed = 0;
        for plant_id in &plant_ids {
            match api.trigger_cycle(plant_id).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!("bulk trigger failed for {plant_id}: {e}");
                }
            }
        }
        tracing::info!("bulk trigger done: {succeeded} ok, {failed} failed");
        let _ = tx
            .send(LoadMsg::Mutation(MutationOutcome::BulkTriggered { succeeded, failed }))
            .await;
    });
}

pub fn spawn_deactivate(api: Arc<ApiClient>, tx: mpsc::Sender<LoadMsg>, plant_id: String) {
    tokio::spawn(async move {
        let result = api.deactivate_plant(&plant_id).await;
        match &result {
            Ok(()) => tracing::info!("plant deactivated: {plant_id}"),
            Err(e) => tracing::warn!("deactivate failed for {plant_id}: {e}"),
        }
        let _ = tx
            .send(LoadMsg::Mutation(MutationOutcome::Deactivated { plant_id, result }))
            .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoFarm;

    #[test]
    fn test_token_counter_latest() {
        let mut counter = TokenCounter::default();
        let first = counter.mint();
        assert!(counter.is_latest(first));
        let second = counter.mint();
        assert!(!counter.is_latest(first));
        assert!(counter.is_latest(second));
    }

    #[tokio::test]
    async fn test_detail_composition_fails_as_a_whole() {
        let api = Arc::new(ApiClient::demo(DemoFarm::seeded()));
        let (tx, mut rx) = mpsc::channel(4);
        spawn_detail(api, tx, 1, "no-such-plant".to_string());
        match rx.recv().await.unwrap() {
            LoadMsg::Detail { token, result, .. } => {
                assert_eq!(token, 1);
                assert!(result.is_err());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_detail_composition_carries_all_three() {
        let api = Arc::new(ApiClient::demo(DemoFarm::seeded()));
        let (tx, mut rx) = mpsc::channel(4);
        spawn_detail(api, tx, 7, "demo-cabai".to_string());
        match rx.recv().await.unwrap() {
            LoadMsg::Detail { plant_id, result, .. } => {
                assert_eq!(plant_id, "demo-cabai");
                let data = result.unwrap();
                assert_eq!(data.instructions.plant_id, "demo-cabai");
                assert!(data.actions.len() <= DETAIL_ACTIONS_LIMIT as usize);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bulk_trigger_counts_each_plant() {
        let api = Arc::new(ApiClient::demo(DemoFarm::seeded()));
        let (tx, mut rx) = mpsc::channel(4);
        spawn_bulk_trigger(
            api.clone(),
            tx,
            vec!["demo-cabai".to_string(), "demo-tomat".to_string(), "nope".to_string()],
        );
        match rx.recv().await.unwrap() {
            LoadMsg::Mutation(MutationOutcome::BulkTriggered { succeeded, failed }) => {
                assert_eq!(succeeded, 2);
                assert_eq!(failed, 1);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert_eq!(api.demo_farm().await.trigger_calls, 3);
    }
}
