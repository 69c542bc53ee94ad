// Farm API client
//
// One async function per backend endpoint, plus the error taxonomy the UI
// regions consume. In demo mode every call is answered by the in-process
// canned farm instead of HTTP; the same path doubles as the test double
// for the workflow tests.

use crate::demo::DemoFarm;
use crate::model::{
    ActionEvent, FarmSummary, HistoryEntry, InstructionSet, NewPlant, Plant, WeatherSnapshot,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;

/// How a call failed: transport trouble (no response), a non-success
/// status (carrying the server's `detail` message when present), or a body
/// that did not decode into the expected shape.
#[derive(Debug, Clone)]
pub enum ApiError {
    Transport(String),
    Status { code: u16, message: String },
    Decode(String),
}

impl ApiError {
    /// Message suitable for a toast. Server-supplied messages are shown
    /// verbatim; transport and decode failures get a generic line since
    /// their raw messages are developer-facing.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Transport(_) => "Gagal menghubungi server".to_string(),
            ApiError::Decode(_) => "Respons server tidak valid".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "transport error: {msg}"),
            ApiError::Status { code, message } => write!(f, "HTTP {code}: {message}"),
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

enum Mode {
    Http { http: reqwest::Client, base_url: String },
    Demo { farm: Mutex<DemoFarm> },
}

/// Client for the taniclaw backend. Cheap to share behind an Arc; all
/// methods take `&self`.
pub struct ApiClient {
    mode: Mode,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            mode: Mode::Http {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
            },
        }
    }

    pub fn demo(farm: DemoFarm) -> Self {
        Self {
            mode: Mode::Demo {
                farm: Mutex::new(farm),
            },
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self.mode, Mode::Demo { .. })
    }

    /// GET /api/farm/summary
    pub async fn farm_summary(&self) -> Result<FarmSummary, ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                get_json(http, format!("{base_url}/api/farm/summary")).await
            }
            Mode::Demo { farm } => farm.lock().await.summary(),
        }
    }

    /// GET /api/plants?active_only={bool}
    pub async fn plants(&self, active_only: bool) -> Result<Vec<Plant>, ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                get_json(http, format!("{base_url}/api/plants?active_only={active_only}")).await
            }
            Mode::Demo { farm } => Ok(farm.lock().await.plants(active_only)),
        }
    }

    /// GET /api/weather/{plantId}
    pub async fn weather(&self, plant_id: &str) -> Result<WeatherSnapshot, ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                get_json(http, format!("{base_url}/api/weather/{plant_id}")).await
            }
            Mode::Demo { farm } => farm.lock().await.weather(plant_id),
        }
    }

    /// GET /api/plants/{plantId}/instructions
    pub async fn instructions(&self, plant_id: &str) -> Result<InstructionSet, ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                get_json(http, format!("{base_url}/api/plants/{plant_id}/instructions")).await
            }
            Mode::Demo { farm } => farm.lock().await.instructions(plant_id),
        }
    }

    /// GET /api/actions/{plantId}?limit={n}
    pub async fn actions(&self, plant_id: &str, limit: u32) -> Result<Vec<ActionEvent>, ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                get_json(http, format!("{base_url}/api/actions/{plant_id}?limit={limit}")).await
            }
            Mode::Demo { farm } => farm.lock().await.actions(plant_id, limit),
        }
    }

    /// POST /api/actions/{plantId}/trigger. The backend answers with the
    /// executed actions; only success/failure matters here, so the body is
    /// not decoded.
    pub async fn trigger_cycle(&self, plant_id: &str) -> Result<(), ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                let url = format!("{base_url}/api/actions/{plant_id}/trigger");
                let resp = http
                    .post(&url)
                    .send()
                    .await
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                expect_success(resp).await
            }
            Mode::Demo { farm } => farm.lock().await.trigger_cycle(plant_id),
        }
    }

    /// GET /api/farm/history?limit={n}
    pub async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>, ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                get_json(http, format!("{base_url}/api/farm/history?limit={limit}")).await
            }
            Mode::Demo { farm } => Ok(farm.lock().await.history(limit)),
        }
    }

    /// POST /api/plants
    pub async fn create_plant(&self, plant: &NewPlant) -> Result<Plant, ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                let url = format!("{base_url}/api/plants");
                let resp = http
                    .post(&url)
                    .json(plant)
                    .send()
                    .await
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                decode(resp).await
            }
            Mode::Demo { farm } => farm.lock().await.create_plant(plant),
        }
    }

    /// DELETE /api/plants/{plantId}. Success/failure only; the `{status,
    /// message}` acknowledgement body is not decoded.
    pub async fn deactivate_plant(&self, plant_id: &str) -> Result<(), ApiError> {
        match &self.mode {
            Mode::Http { http, base_url } => {
                let url = format!("{base_url}/api/plants/{plant_id}");
                let resp = http
                    .delete(&url)
                    .send()
                    .await
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                expect_success(resp).await
            }
            Mode::Demo { farm } => farm.lock().await.deactivate_plant(plant_id),
        }
    }

    /// Demo-only access to the canned farm, for tests that assert on call
    /// counters and farm contents.
    #[cfg(test)]
    pub async fn demo_farm(&self) -> tokio::sync::MutexGuard<'_, DemoFarm> {
        match &self.mode {
            Mode::Demo { farm } => farm.lock().await,
            Mode::Http { .. } => panic!("demo_farm() on a live client"),
        }
    }
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: String,
) -> Result<T, ApiError> {
    let resp = http
        .get(&url)
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    decode(resp).await
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            code: status.as_u16(),
            message: extract_detail(resp).await,
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

async fn expect_success(resp: reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            code: status.as_u16(),
            message: extract_detail(resp).await,
        });
    }
    Ok(())
}

/// Pull the error message out of a non-success body. FastAPI puts it in a
/// `detail` field, usually a string but an object list for validation
/// errors; anything unreadable falls back to the status line.
async fn extract_detail(resp: reqwest::Response) -> String {
    let status = resp.status();
    match resp.json::<serde_json::Value>().await {
        Ok(body) => match body.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => format!("HTTP {status}"),
        },
        Err(_) => format!("HTTP {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_detail() {
        let err = ApiError::Status {
            code: 400,
            message: "duplicate name".to_string(),
        };
        assert_eq!(err.user_message(), "duplicate name");
    }

    #[test]
    fn test_user_message_generic_for_transport() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), "Gagal menghubungi server");
        // the technical detail still surfaces in logs via Display
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_demo_client_serves_plants() {
        let api = ApiClient::demo(DemoFarm::seeded());
        let plants = api.plants(false).await.unwrap();
        assert!(!plants.is_empty());
        let active = api.plants(true).await.unwrap();
        assert!(active.iter().all(|p| p.is_active));
        assert!(active.len() < plants.len());
    }

    #[tokio::test]
    async fn test_demo_client_unknown_plant_is_status_error() {
        let api = ApiClient::demo(DemoFarm::seeded());
        let err = api.weather("nope").await.unwrap_err();
        match err {
            ApiError::Status { code, .. } => assert_eq!(code, 404),
            other => panic!("expected status error, got {other}"),
        }
    }
}
