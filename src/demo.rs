// Demo data source
//
// A canned in-process farm, used when demo mode is enabled: the full UI
// runs against it without a backend, and the workflow tests drive it as
// their test double. Mutations are simulated in memory and counted so
// tests can assert which endpoints were (or were not) called.
//
// Run with: TANITERM_DEMO=1 cargo run --release

use crate::api::ApiError;
use crate::model::{
    generate_id, ActionEvent, FarmSummary, HarvestInfo, HistoryEntry, InstructionSet, NewPlant,
    Plant, PlantState, WeatherSnapshot,
};
use chrono::{Duration, Utc};
use std::collections::BTreeMap;

const SUPPORTED_TYPES: [&str; 5] = ["chili", "tomato", "spinach", "lettuce", "hydroponic"];

// Leafy greens skip the flowering stage entirely
const TYPES_WITHOUT_FLOWERING: [&str; 3] = ["spinach", "lettuce", "hydroponic"];

pub struct DemoFarm {
    plants: Vec<Plant>,
    actions: Vec<ActionEvent>,
    history: Vec<HistoryEntry>,
    /// Mutating calls observed, for test assertions
    pub create_calls: u32,
    pub trigger_calls: u32,
    pub deactivate_calls: u32,
}

impl DemoFarm {
    pub fn with_plants(plants: Vec<Plant>) -> Self {
        Self {
            plants,
            actions: Vec::new(),
            history: Vec::new(),
            create_calls: 0,
            trigger_calls: 0,
            deactivate_calls: 0,
        }
    }

    /// A small farm spanning the lifecycle: four active plants in
    /// different stages plus one deactivated dormant one.
    pub fn seeded() -> Self {
        let mut farm = Self::with_plants(vec![
            seed_plant(
                "demo-cabai",
                "Cabai Rawit",
                "chili",
                "Jakarta Selatan, Indonesia",
                -6.26,
                106.81,
                "vegetative",
                45,
                12,
                Some("soil"),
                true,
            ),
            seed_plant(
                "demo-tomat",
                "Tomat Ceri",
                "tomato",
                "Bandung, Indonesia",
                -6.91,
                107.61,
                "flowering",
                62,
                9,
                Some("pot"),
                true,
            ),
            seed_plant(
                "demo-selada",
                "Selada Keriting",
                "lettuce",
                "Depok, Indonesia",
                -6.40,
                106.82,
                "harvest",
                38,
                3,
                Some("hydroponic"),
                true,
            ),
            seed_plant(
                "demo-bayam",
                "Bayam Hijau",
                "spinach",
                "Bogor, Indonesia",
                -6.60,
                106.80,
                "germination",
                6,
                4,
                Some("soil"),
                true,
            ),
            seed_plant(
                "demo-lama",
                "Cabai Musim Lalu",
                "chili",
                "Jakarta Selatan, Indonesia",
                -6.26,
                106.81,
                "dormant",
                210,
                60,
                Some("soil"),
                false,
            ),
        ]);

        let now = Utc::now();
        farm.push_action(
            "demo-cabai",
            "water",
            "Siram 500ml di pagi hari",
            "rules",
            now - Duration::hours(2),
        );
        farm.push_action(
            "demo-cabai",
            "fertilize",
            "Beri pupuk NPK 5g",
            "rules",
            now - Duration::hours(26),
        );
        farm.push_action(
            "demo-tomat",
            "alert",
            "Waspada busuk daun, kelembaban tinggi",
            "rules",
            now - Duration::minutes(40),
        );
        farm.push_action(
            "demo-selada",
            "harvest",
            "Panen daun terluar yang sudah lebar",
            "manual",
            now - Duration::hours(5),
        );

        // History entries covering every payload shape the timeline handles
        farm.history.push(HistoryEntry {
            id: generate_id(),
            plant_id: Some("demo-cabai".to_string()),
            event_type: "action".to_string(),
            event_data: serde_json::json!({
                "action_id": generate_id(),
                "action_type": "water",
                "description": "Siram 500ml di pagi hari",
                "source": "rules",
                "result": {"status": "ok"},
            }),
            created_at: now - Duration::hours(2),
        });
        farm.history.push(HistoryEntry {
            id: generate_id(),
            plant_id: Some("demo-tomat".to_string()),
            event_type: "alert".to_string(),
            event_data: serde_json::json!({
                "message": "Gelombang panas! Suhu maks 38°C. Beri naungan dan siram ekstra.",
            }),
            created_at: now - Duration::hours(8),
        });
        farm.history.push(HistoryEntry {
            id: generate_id(),
            plant_id: Some("demo-cabai".to_string()),
            event_type: "state_change".to_string(),
            event_data: serde_json::json!({
                "from_state": "germination",
                "to_state": "vegetative",
                "days_in_previous_state": 9,
            }),
            created_at: now - Duration::days(12),
        });
        farm.history.push(HistoryEntry {
            id: generate_id(),
            plant_id: Some("demo-bayam".to_string()),
            event_type: "cycle".to_string(),
            event_data: serde_json::json!({"message": "No action needed"}),
            created_at: now - Duration::days(1),
        });
        farm.history.push(HistoryEntry {
            id: generate_id(),
            plant_id: Some("demo-selada".to_string()),
            event_type: "created".to_string(),
            event_data: serde_json::json!({
                "plant_type": "lettuce",
                "location": "Depok, Indonesia",
                "plant_date": (now - Duration::days(38)).format("%Y-%m-%d").to_string(),
            }),
            created_at: now - Duration::days(38),
        });

        farm
    }

    fn find(&self, plant_id: &str) -> Result<&Plant, ApiError> {
        self.plants
            .iter()
            .find(|p| p.id == plant_id)
            .ok_or_else(not_found)
    }

    fn push_action(
        &mut self,
        plant_id: &str,
        action_type: &str,
        description: &str,
        source: &str,
        at: chrono::DateTime<Utc>,
    ) {
        self.actions.push(ActionEvent {
            id: generate_id(),
            plant_id: plant_id.to_string(),
            action_type: action_type.to_string(),
            description: description.to_string(),
            source: source.to_string(),
            status: "executed".to_string(),
            executed_at: Some(at),
            created_at: at,
        });
    }

    pub fn plants(&self, active_only: bool) -> Vec<Plant> {
        self.plants
            .iter()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> Result<FarmSummary, ApiError> {
        let today = Utc::now().date_naive();
        let mut action_breakdown: BTreeMap<String, u32> = BTreeMap::new();
        let mut total_actions = 0;
        for action in &self.actions {
            if action.created_at.date_naive() == today {
                *action_breakdown.entry(action.action_type.clone()).or_default() += 1;
                total_actions += 1;
            }
        }

        let mut alerts = Vec::new();
        let mut instructions = Vec::new();
        for plant in self.plants.iter().filter(|p| p.is_active) {
            let (instrs, plant_alerts) = stage_guidance(&plant.current_state);
            instructions.extend(instrs.iter().take(2).map(|s| s.to_string()));
            alerts.extend(plant_alerts.iter().map(|s| s.to_string()));
        }
        alerts.truncate(5);
        instructions.truncate(10);

        Ok(FarmSummary {
            date: today.format("%Y-%m-%d").to_string(),
            total_actions,
            plants_count: self.plants.iter().filter(|p| p.is_active).count() as u32,
            action_breakdown,
            alerts,
            instructions,
        })
    }

    pub fn weather(&self, plant_id: &str) -> Result<WeatherSnapshot, ApiError> {
        let idx = self
            .plants
            .iter()
            .position(|p| p.id == plant_id)
            .ok_or_else(not_found)?;
        Ok(weather_bank(idx))
    }

    pub fn instructions(&self, plant_id: &str) -> Result<InstructionSet, ApiError> {
        let plant = self.find(plant_id)?;
        let (instrs, alerts) = stage_guidance(&plant.current_state);
        let idx = self.plants.iter().position(|p| p.id == plant_id).unwrap_or(0);
        let weather = weather_bank(idx);
        Ok(InstructionSet {
            plant_id: plant.id.clone(),
            plant_name: plant.name.clone(),
            plant_type: plant.plant_type.clone(),
            plant_state: plant.current_state.clone(),
            days_since_planting: plant.days_since_planting,
            days_in_state: plant.days_in_state,
            instructions: instrs.iter().map(|s| s.to_string()).collect(),
            alerts: alerts.iter().map(|s| s.to_string()).collect(),
            weather_summary: weather.forecast_summary.clone(),
            weather: Some(weather),
            harvest_info: harvest_info(&plant.plant_type),
            common_diseases: common_diseases(&plant.plant_type),
            next_state: next_state(&plant.plant_type, &plant.current_state),
        })
    }

    pub fn actions(&self, plant_id: &str, limit: u32) -> Result<Vec<ActionEvent>, ApiError> {
        self.find(plant_id)?;
        let mut out: Vec<ActionEvent> = self
            .actions
            .iter()
            .filter(|a| a.plant_id == plant_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit as usize);
        Ok(out)
    }

    pub fn history(&self, limit: u32) -> Vec<HistoryEntry> {
        let mut out = self.history.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit as usize);
        out
    }

    pub fn trigger_cycle(&mut self, plant_id: &str) -> Result<(), ApiError> {
        self.trigger_calls += 1;
        let plant = self.find(plant_id)?.clone();
        let description = match PlantState::parse(&plant.current_state) {
            Some(PlantState::Harvest) => "Panen hasil yang sudah matang",
            Some(PlantState::Germination) => "Siram ringan, jaga media lembab",
            _ => "Siram 500ml di pagi hari",
        };
        let now = Utc::now();
        self.push_action(plant_id, "water", description, "rules", now);
        self.history.push(HistoryEntry {
            id: generate_id(),
            plant_id: Some(plant_id.to_string()),
            event_type: "cycle".to_string(),
            event_data: serde_json::json!({"message": format!("Siklus dijalankan: {description}")}),
            created_at: now,
        });
        Ok(())
    }

    pub fn create_plant(&mut self, new: &NewPlant) -> Result<Plant, ApiError> {
        self.create_calls += 1;
        if !SUPPORTED_TYPES.contains(&new.plant_type.as_str()) {
            return Err(ApiError::Status {
                code: 400,
                message: format!(
                    "Unsupported plant type '{}'. Supported: {:?}",
                    new.plant_type, SUPPORTED_TYPES
                ),
            });
        }
        if self.plants.iter().any(|p| p.name == new.name) {
            return Err(ApiError::Status {
                code: 400,
                message: "duplicate name".to_string(),
            });
        }
        let now = Utc::now();
        let days = (now.date_naive() - new.plant_date).num_days().max(0) as u32;
        let plant = Plant {
            id: generate_id(),
            name: new.name.clone(),
            plant_type: new.plant_type.clone(),
            location: new.location.clone(),
            latitude: new.latitude,
            longitude: new.longitude,
            current_state: "seed".to_string(),
            plant_date: new.plant_date,
            days_since_planting: days,
            days_in_state: 0,
            growing_method: new.growing_method.clone(),
            soil_condition: new.soil_condition.clone(),
            notes: new.notes.clone(),
            is_active: true,
            created_at: now,
        };
        self.history.push(HistoryEntry {
            id: generate_id(),
            plant_id: Some(plant.id.clone()),
            event_type: "created".to_string(),
            event_data: serde_json::json!({
                "plant_type": plant.plant_type,
                "location": plant.location,
                "plant_date": plant.plant_date.format("%Y-%m-%d").to_string(),
            }),
            created_at: now,
        });
        self.plants.push(plant.clone());
        Ok(plant)
    }

    pub fn deactivate_plant(&mut self, plant_id: &str) -> Result<(), ApiError> {
        self.deactivate_calls += 1;
        let plant = self
            .plants
            .iter_mut()
            .find(|p| p.id == plant_id)
            .ok_or_else(not_found)?;
        plant.is_active = false;
        Ok(())
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        code: 404,
        message: "Plant not found".to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn seed_plant(
    id: &str,
    name: &str,
    plant_type: &str,
    location: &str,
    latitude: f64,
    longitude: f64,
    state: &str,
    days_ago: i64,
    days_in_state: u32,
    growing_method: Option<&str>,
    is_active: bool,
) -> Plant {
    let now = Utc::now();
    Plant {
        id: id.to_string(),
        name: name.to_string(),
        plant_type: plant_type.to_string(),
        location: location.to_string(),
        latitude,
        longitude,
        current_state: state.to_string(),
        plant_date: (now - Duration::days(days_ago)).date_naive(),
        days_since_planting: days_ago.max(0) as u32,
        days_in_state,
        growing_method: growing_method.map(|s| s.to_string()),
        soil_condition: None,
        notes: None,
        is_active,
        created_at: now - Duration::days(days_ago),
    }
}

/// Instructions and alerts per lifecycle stage, mirroring what the rules
/// engine produces on a typical day.
fn stage_guidance(state: &str) -> (&'static [&'static str], &'static [&'static str]) {
    match PlantState::parse(state) {
        Some(PlantState::Seed) => (
            &["Rendam benih 6 jam sebelum semai", "Jaga media semai tetap lembab"],
            &[],
        ),
        Some(PlantState::Germination) => (
            &[
                "Siram ringan setiap pagi, jangan sampai tergenang",
                "Pastikan kecambah mendapat cahaya tidak langsung",
            ],
            &[],
        ),
        Some(PlantState::Vegetative) => (
            &["Siram 500ml di pagi hari", "Beri pupuk NPK 5g setiap 14 hari"],
            &["Waspada kutu daun di musim kemarau"],
        ),
        Some(PlantState::Flowering) => (
            &[
                "Kurangi nitrogen, tambah pupuk fosfor",
                "Siram di pangkal tanaman, hindari membasahi bunga",
            ],
            &[],
        ),
        Some(PlantState::Harvest) => (
            &["Panen pagi hari agar tetap segar", "Panen bertahap, dahulukan yang matang"],
            &[],
        ),
        Some(PlantState::Dormant) | Some(PlantState::Dead) | None => (&[], &[]),
    }
}

/// Harvest indicators per type; types without an entry get the empty
/// object, same as the knowledge base.
fn harvest_info(plant_type: &str) -> HarvestInfo {
    let (indicators, notes): (&[&str], &str) = match plant_type {
        "chili" => (
            &["Buah merah merata", "Mudah dipetik dari tangkai"],
            "Petik bertahap setiap 2-3 hari",
        ),
        "tomato" => (
            &["Warna merah penuh", "Buah sedikit lunak saat ditekan"],
            "Panen pagi hari sebelum panas",
        ),
        "spinach" | "lettuce" => (
            &["Daun berukuran penuh sebelum berbunga"],
            "Potong pangkal, sisakan akar untuk tumbuh ulang",
        ),
        _ => (&[], ""),
    };
    HarvestInfo {
        indicators: indicators.iter().map(|s| s.to_string()).collect(),
        notes: if notes.is_empty() { None } else { Some(notes.to_string()) },
    }
}

fn common_diseases(plant_type: &str) -> Vec<String> {
    let names: &[&str] = match plant_type {
        "chili" => &["Antraknosa", "Busuk buah", "Kutu daun"],
        "tomato" => &["Busuk daun", "Layu fusarium"],
        "spinach" | "lettuce" => &["Rebah semai", "Bercak daun"],
        "hydroponic" => &["Busuk akar"],
        _ => &[],
    };
    names.iter().map(|s| s.to_string()).collect()
}

/// Next lifecycle stage on the normal growth path. Leafy greens skip
/// flowering; dormant plants resume at vegetative.
fn next_state(plant_type: &str, state: &str) -> Option<String> {
    let next = match PlantState::parse(state)? {
        PlantState::Seed => PlantState::Germination,
        PlantState::Germination => PlantState::Vegetative,
        PlantState::Vegetative => {
            if TYPES_WITHOUT_FLOWERING.contains(&plant_type) {
                PlantState::Harvest
            } else {
                PlantState::Flowering
            }
        }
        PlantState::Flowering => PlantState::Harvest,
        PlantState::Harvest => PlantState::Dormant,
        PlantState::Dormant => PlantState::Vegetative,
        PlantState::Dead => return None,
    };
    Some(next.as_str().to_string())
}

/// Rotate through three weather moods; the last one has missing numeric
/// fields so the display-default substitution stays visible in demo mode.
fn weather_bank(idx: usize) -> WeatherSnapshot {
    match idx % 3 {
        0 => WeatherSnapshot {
            temp_max: Some(31.0),
            temp_min: Some(24.0),
            humidity: Some(76.0),
            rainfall_mm: Some(0.0),
            forecast_summary: Some("Cuaca normal. Suhu 24-31°C, kelembaban 76%.".to_string()),
        },
        1 => WeatherSnapshot {
            temp_max: Some(29.0),
            temp_min: Some(23.0),
            humidity: Some(88.0),
            rainfall_mm: Some(15.0),
            forecast_summary: Some(
                "Hujan sedang diprediksi (15mm). Lewati penyiraman.".to_string(),
            ),
        },
        _ => WeatherSnapshot {
            temp_max: None,
            temp_min: None,
            humidity: None,
            rainfall_mm: None,
            forecast_summary: Some("Data cuaca tidak lengkap hari ini.".to_string()),
        },
    }
}

#[cfg(test)]
pub fn sample_plant(id: &str, name: &str, state: &str, is_active: bool) -> Plant {
    seed_plant(
        id,
        name,
        "chili",
        "Jakarta, Indonesia",
        -6.2,
        106.8,
        state,
        30,
        5,
        Some("soil"),
        is_active,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_farm_active_filter() {
        let farm = DemoFarm::seeded();
        assert_eq!(farm.plants(false).len(), 5);
        assert_eq!(farm.plants(true).len(), 4);
    }

    #[test]
    fn test_summary_counts_only_active_plants() {
        let farm = DemoFarm::seeded();
        let summary = farm.summary().unwrap();
        assert_eq!(summary.plants_count, 4);
        assert!(summary.alerts.len() <= 5);
        assert!(summary.instructions.len() <= 10);
    }

    #[test]
    fn test_dormant_plant_has_no_guidance() {
        let farm = DemoFarm::seeded();
        let set = farm.instructions("demo-lama").unwrap();
        assert!(set.instructions.is_empty());
        assert!(set.alerts.is_empty());
    }

    #[test]
    fn test_trigger_records_action_and_history() {
        let mut farm = DemoFarm::seeded();
        let before = farm.actions("demo-bayam", 50).unwrap().len();
        farm.trigger_cycle("demo-bayam").unwrap();
        assert_eq!(farm.trigger_calls, 1);
        assert_eq!(farm.actions("demo-bayam", 50).unwrap().len(), before + 1);
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let mut farm = DemoFarm::seeded();
        let new = NewPlant {
            name: "Cabai Rawit".to_string(),
            plant_type: "chili".to_string(),
            location: "Jakarta".to_string(),
            latitude: -6.2,
            longitude: 106.8,
            plant_date: Utc::now().date_naive(),
            growing_method: None,
            soil_condition: None,
            notes: None,
        };
        let err = farm.create_plant(&new).unwrap_err();
        assert_eq!(err.user_message(), "duplicate name");
        assert_eq!(farm.create_calls, 1);
    }

    #[test]
    fn test_create_rejects_unknown_type() {
        let mut farm = DemoFarm::seeded();
        let new = NewPlant {
            name: "Durian Mini".to_string(),
            plant_type: "durian".to_string(),
            location: "Medan".to_string(),
            latitude: 3.6,
            longitude: 98.7,
            plant_date: Utc::now().date_naive(),
            growing_method: None,
            soil_condition: None,
            notes: None,
        };
        let err = farm.create_plant(&new).unwrap_err();
        assert!(err.user_message().contains("Unsupported plant type"));
    }

    #[test]
    fn test_deactivate_flips_active_flag() {
        let mut farm = DemoFarm::seeded();
        farm.deactivate_plant("demo-selada").unwrap();
        assert!(farm.plants(true).iter().all(|p| p.id != "demo-selada"));
        assert!(farm.plants(false).iter().any(|p| p.id == "demo-selada"));
    }

    #[test]
    fn test_next_state_skips_flowering_for_leafy_greens() {
        assert_eq!(next_state("lettuce", "vegetative").as_deref(), Some("harvest"));
        assert_eq!(next_state("chili", "vegetative").as_deref(), Some("flowering"));
        assert_eq!(next_state("chili", "dead"), None);
    }

    #[test]
    fn test_history_sorted_newest_first_and_limited() {
        let farm = DemoFarm::seeded();
        let entries = farm.history(3);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].created_at >= entries[1].created_at);
    }
}
