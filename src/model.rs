// Domain types shared between the farm API client and the TUI
//
// These mirror the JSON shapes served by the taniclaw backend. Lifecycle
// states and action types arrive as plain strings on the wire; the enums
// here cover the known values for pattern matching, while the structs keep
// the raw strings so unknown values from newer backends still render.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Known plant types. The wire format is an open string; anything not
/// listed here gets the generic seedling treatment in the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantType {
    Chili,
    Tomato,
    Spinach,
    Lettuce,
    Hydroponic,
}

impl PlantType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "chili" => Some(Self::Chili),
            "tomato" => Some(Self::Tomato),
            "spinach" => Some(Self::Spinach),
            "lettuce" => Some(Self::Lettuce),
            "hydroponic" => Some(Self::Hydroponic),
            _ => None,
        }
    }
}

/// Lifecycle states in growth order, plus the parked/terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantState {
    Seed,
    Germination,
    Vegetative,
    Flowering,
    Harvest,
    Dormant,
    Dead,
}

/// The five stages shown on a card's progress indicator. Dormant and dead
/// plants sit outside this sequence.
pub const GROWTH_STAGES: [PlantState; 5] = [
    PlantState::Seed,
    PlantState::Germination,
    PlantState::Vegetative,
    PlantState::Flowering,
    PlantState::Harvest,
];

impl PlantState {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "seed" => Some(Self::Seed),
            "germination" => Some(Self::Germination),
            "vegetative" => Some(Self::Vegetative),
            "flowering" => Some(Self::Flowering),
            "harvest" => Some(Self::Harvest),
            "dormant" => Some(Self::Dormant),
            "dead" => Some(Self::Dead),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Germination => "germination",
            Self::Vegetative => "vegetative",
            Self::Flowering => "flowering",
            Self::Harvest => "harvest",
            Self::Dormant => "dormant",
            Self::Dead => "dead",
        }
    }
}

/// Known action types recorded by the backend agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Water,
    SkipWater,
    Fertilize,
    Harvest,
    Notify,
    Alert,
    Log,
}

impl ActionType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "water" => Some(Self::Water),
            "skip_water" => Some(Self::SkipWater),
            "fertilize" => Some(Self::Fertilize),
            "harvest" => Some(Self::Harvest),
            "notify" => Some(Self::Notify),
            "alert" => Some(Self::Alert),
            "log" => Some(Self::Log),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::SkipWater => "skip_water",
            Self::Fertilize => "fertilize",
            Self::Harvest => "harvest",
            Self::Notify => "notify",
            Self::Alert => "alert",
            Self::Log => "log",
        }
    }
}

/// A tracked cultivation instance, as served by GET /api/plants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub plant_type: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub current_state: String,
    pub plant_date: NaiveDate,
    pub days_since_planting: u32,
    #[serde(default)]
    pub days_in_state: u32,
    #[serde(default)]
    pub growing_method: Option<String>,
    #[serde(default)]
    pub soil_condition: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub is_active: bool,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One recorded agent action against a plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
    pub id: String,
    pub plant_id: String,
    pub action_type: String,
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "de_timestamp_opt")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Farm-wide timeline record. `event_data` is a free-form payload whose
/// shape depends on `event_type` (created, state_change, cycle, action).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default)]
    pub plant_id: Option<String>,
    pub event_type: String,
    #[serde(default)]
    pub event_data: serde_json::Value,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Per-plant daily guidance bundle, fetched fresh on each detail open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionSet {
    pub plant_id: String,
    pub plant_name: String,
    pub plant_type: String,
    pub plant_state: String,
    pub days_since_planting: u32,
    #[serde(default)]
    pub days_in_state: u32,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub alerts: Vec<String>,
    #[serde(default)]
    pub weather_summary: Option<String>,
    #[serde(default)]
    pub weather: Option<WeatherSnapshot>,
    #[serde(default)]
    pub harvest_info: HarvestInfo,
    #[serde(default)]
    pub common_diseases: Vec<String>,
    #[serde(default)]
    pub next_state: Option<String>,
}

/// Harvest readiness indicators and timing notes for a plant's type.
/// The backend sends an empty object for types it has no data on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvestInfo {
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl HarvestInfo {
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty() && self.notes.as_deref().map_or(true, str::is_empty)
    }
}

/// Weather for a plant's location. Every field is optional on the wire;
/// display defaults are substituted in the renderer, never sent back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub rainfall_mm: Option<f64>,
    #[serde(default)]
    pub forecast_summary: Option<String>,
}

/// Aggregate counts plus today's instructions and alerts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmSummary {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub total_actions: u32,
    #[serde(default)]
    pub plants_count: u32,
    #[serde(default)]
    pub action_breakdown: BTreeMap<String, u32>,
    #[serde(default)]
    pub alerts: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// POST /api/plants payload. Carries exactly the form fields; weather
/// display defaults have no representation here and cannot leak back.
#[derive(Debug, Clone, Serialize)]
pub struct NewPlant {
    pub name: String,
    pub plant_type: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub plant_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growing_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Parse an ISO-8601 timestamp. The backend serializes naive datetimes
/// (no offset); tooling in between sometimes adds one. Accept both.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn de_timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Helper to generate unique IDs for demo data and client-side records
pub fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", Utc::now().timestamp_millis(), count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_with_offset() {
        let ts = parse_timestamp("2026-08-21T10:30:00+07:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-08-21T03:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_naive() {
        assert!(parse_timestamp("2026-08-21T10:30:00").is_some());
        assert!(parse_timestamp("2026-08-21T10:30:00.123456").is_some());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_plant_decodes_without_optionals() {
        let raw = serde_json::json!({
            "id": "p1",
            "name": "Cabai Rawit",
            "plant_type": "chili",
            "location": "Jakarta, Indonesia",
            "latitude": -6.2,
            "longitude": 106.8,
            "current_state": "vegetative",
            "plant_date": "2026-05-01",
            "days_since_planting": 40,
            "is_active": true,
            "created_at": "2026-05-01T08:00:00"
        });
        let plant: Plant = serde_json::from_value(raw).unwrap();
        assert_eq!(plant.days_in_state, 0);
        assert!(plant.growing_method.is_none());
        assert_eq!(plant.plant_date, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
    }

    #[test]
    fn test_weather_decodes_all_null() {
        let raw = serde_json::json!({
            "temp_max": null,
            "temp_min": null,
            "humidity": null,
            "rainfall_mm": null
        });
        let weather: WeatherSnapshot = serde_json::from_value(raw).unwrap();
        assert!(weather.temp_max.is_none());
        assert!(weather.forecast_summary.is_none());
    }

    #[test]
    fn test_instruction_set_decodes_harvest_info() {
        let raw = serde_json::json!({
            "plant_id": "p1",
            "plant_name": "Cabai Rawit",
            "plant_type": "chili",
            "plant_state": "harvest",
            "days_since_planting": 95,
            "harvest_info": {
                "indicators": ["Buah merah merata"],
                "notes": "Petik pagi hari"
            }
        });
        let set: InstructionSet = serde_json::from_value(raw).unwrap();
        assert_eq!(set.harvest_info.indicators, vec!["Buah merah merata"]);
        assert!(!set.harvest_info.is_empty());
    }

    #[test]
    fn test_instruction_set_harvest_info_defaults_empty() {
        // the backend sends {} for types without harvest data
        let raw = serde_json::json!({
            "plant_id": "p1",
            "plant_name": "Bayam",
            "plant_type": "spinach",
            "plant_state": "seed",
            "days_since_planting": 2,
            "harvest_info": {}
        });
        let set: InstructionSet = serde_json::from_value(raw).unwrap();
        assert!(set.harvest_info.is_empty());
    }

    #[test]
    fn test_new_plant_skips_empty_optionals() {
        let plant = NewPlant {
            name: "Tomat".into(),
            plant_type: "tomato".into(),
            location: "Bandung".into(),
            latitude: -6.9,
            longitude: 107.6,
            plant_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            growing_method: None,
            soil_condition: None,
            notes: None,
        };
        let value = serde_json::to_value(&plant).unwrap();
        assert!(value.get("growing_method").is_none());
        assert!(value.get("temp_max").is_none());
    }

    #[test]
    fn test_state_parse_round_trip() {
        for state in GROWTH_STAGES {
            assert_eq!(PlantState::parse(state.as_str()), Some(state));
        }
        assert_eq!(PlantState::parse("hibernating"), None);
    }
}
