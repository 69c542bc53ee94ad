// View-model builders
//
// Pure mappings from domain data to display fragments. The draw layer in
// tui/views consumes these and applies theme styles; nothing here touches
// the terminal, so the display rules stay testable as plain functions.

use crate::format::{action_visual, infer_action_type, plant_emoji, relative_time, state_label};
use crate::model::{
    ActionEvent, ActionType, HarvestInfo, HistoryEntry, InstructionSet, Plant, PlantState,
    WeatherSnapshot, GROWTH_STAGES,
};
use crate::util::{short_id, truncate_width};
use chrono::{DateTime, Utc};

// Display defaults for missing weather fields. Substituted at render time
// only; they never travel back to the server.
const DEFAULT_TEMP_MAX: f64 = 28.0;
const DEFAULT_TEMP_MIN: f64 = 22.0;
const DEFAULT_HUMIDITY: f64 = 70.0;
const DEFAULT_RAINFALL: f64 = 0.0;

const PAYLOAD_PREVIEW_COLS: usize = 60;

/// Marking of one stage on a card's five-stage progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMark {
    Done,
    Current,
    Upcoming,
}

/// One plant card.
#[derive(Debug, Clone)]
pub struct PlantCard {
    pub id: String,
    pub emoji: &'static str,
    pub name: String,
    pub subtitle: String,
    pub state: Option<PlantState>,
    pub state_label: String,
    pub day_counter: String,
    pub stages: [StageMark; 5],
    pub is_active: bool,
}

/// The plants grid: either exactly one empty-state placeholder or one
/// card per plant.
#[derive(Debug, Clone)]
pub enum PlantsView {
    Empty,
    Cards(Vec<PlantCard>),
}

/// Index of a state within the five growth stages; -1 for states outside
/// the sequence (dormant, dead, unknown).
pub fn stage_index(state: &str) -> i32 {
    match PlantState::parse(state) {
        Some(parsed) => GROWTH_STAGES
            .iter()
            .position(|s| *s == parsed)
            .map(|i| i as i32)
            .unwrap_or(-1),
        None => -1,
    }
}

/// Stage marks for a lifecycle state: everything strictly before the
/// current stage is done, the stage itself is current, the rest upcoming.
/// A state outside the sequence leaves all five unmarked.
pub fn stage_marks(state: &str) -> [StageMark; 5] {
    let current = stage_index(state);
    let mut marks = [StageMark::Upcoming; 5];
    if current < 0 {
        return marks;
    }
    for (i, mark) in marks.iter_mut().enumerate() {
        *mark = match (i as i32).cmp(&current) {
            std::cmp::Ordering::Less => StageMark::Done,
            std::cmp::Ordering::Equal => StageMark::Current,
            std::cmp::Ordering::Greater => StageMark::Upcoming,
        };
    }
    marks
}

pub fn build_plants_view(plants: &[Plant]) -> PlantsView {
    if plants.is_empty() {
        return PlantsView::Empty;
    }
    PlantsView::Cards(plants.iter().map(build_card).collect())
}

fn build_card(plant: &Plant) -> PlantCard {
    let subtitle = match plant.growing_method.as_deref() {
        Some(method) if !method.is_empty() => format!("{} · {}", plant.plant_type, method),
        _ => plant.plant_type.clone(),
    };
    let day_counter = if plant.days_in_state > 0 {
        format!(
            "Hari {} · {} hari di fase ini",
            plant.days_since_planting, plant.days_in_state
        )
    } else {
        format!("Hari {}", plant.days_since_planting)
    };
    PlantCard {
        id: plant.id.clone(),
        emoji: plant_emoji(&plant.plant_type),
        name: plant.name.clone(),
        subtitle,
        state: PlantState::parse(&plant.current_state),
        state_label: state_label(&plant.current_state).to_string(),
        day_counter,
        stages: stage_marks(&plant.current_state),
        is_active: plant.is_active,
    }
}

/// One line in an instructions panel: an alert banner or an instruction
/// with its inferred action icon.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionLine {
    pub icon: &'static str,
    pub kind: ActionType,
    pub text: String,
    pub is_alert: bool,
}

/// The instructions panel. Loading, failed and no-action are three
/// distinct states and must stay visually distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionsView {
    Loading,
    Failed,
    NoAction,
    Lines(Vec<InstructionLine>),
}

/// Build the loaded portion of an instructions panel: alerts first, then
/// instruction lines with inferred icons. Both empty yields the single
/// no-action placeholder.
pub fn instruction_lines(instructions: &[String], alerts: &[String]) -> InstructionsView {
    if instructions.is_empty() && alerts.is_empty() {
        return InstructionsView::NoAction;
    }
    let mut lines = Vec::with_capacity(alerts.len() + instructions.len());
    for alert in alerts {
        let (icon, kind) = action_visual("alert");
        lines.push(InstructionLine {
            icon,
            kind,
            text: alert.clone(),
            is_alert: true,
        });
    }
    for instruction in instructions {
        let kind = infer_action_type(instruction);
        let (icon, kind) = action_visual(kind.as_str());
        lines.push(InstructionLine {
            icon,
            kind,
            text: instruction.clone(),
            is_alert: false,
        });
    }
    InstructionsView::Lines(lines)
}

/// Timeline dot classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotClass {
    Alert,
    StateChange,
    Default,
}

/// One row of the history timeline.
#[derive(Debug, Clone)]
pub struct TimelineRow {
    pub dot: DotClass,
    pub title: String,
    pub description: String,
    pub when: String,
}

/// Build timeline rows. Plant names resolve against the cached plant
/// list; an unknown identifier falls back to its short form. Descriptions
/// come from the payload's description field, then message, then a
/// truncated serialization of the whole payload.
pub fn build_timeline(
    entries: &[HistoryEntry],
    plants: &[Plant],
    now: DateTime<Utc>,
) -> Vec<TimelineRow> {
    entries
        .iter()
        .map(|entry| TimelineRow {
            dot: classify_dot(&entry.event_type),
            title: resolve_plant_name(entry.plant_id.as_deref(), plants),
            description: resolve_description(&entry.event_data),
            when: relative_time(entry.created_at, now),
        })
        .collect()
}

fn classify_dot(event_type: &str) -> DotClass {
    if event_type.contains("alert") {
        DotClass::Alert
    } else if event_type.contains("state_change") {
        DotClass::StateChange
    } else {
        DotClass::Default
    }
}

fn resolve_plant_name(plant_id: Option<&str>, plants: &[Plant]) -> String {
    let Some(id) = plant_id else {
        return "Kebun".to_string();
    };
    plants
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| short_id(id))
}

fn resolve_description(payload: &serde_json::Value) -> String {
    for key in ["description", "message"] {
        if let Some(text) = payload.get(key).and_then(|v| v.as_str()) {
            return text.to_string();
        }
    }
    truncate_width(&payload.to_string(), PAYLOAD_PREVIEW_COLS)
}

/// Weather block with display defaults substituted for missing fields.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub temp_line: String,
    pub humidity_line: String,
    pub rainfall_line: String,
    pub forecast: Option<String>,
}

pub fn build_weather_view(weather: &WeatherSnapshot) -> WeatherView {
    let temp_max = weather.temp_max.unwrap_or(DEFAULT_TEMP_MAX);
    let temp_min = weather.temp_min.unwrap_or(DEFAULT_TEMP_MIN);
    let humidity = weather.humidity.unwrap_or(DEFAULT_HUMIDITY);
    let rainfall = weather.rainfall_mm.unwrap_or(DEFAULT_RAINFALL);
    WeatherView {
        temp_line: format!("🌡️ {temp_min:.0}–{temp_max:.0}°C"),
        humidity_line: format!("💦 {humidity:.0}%"),
        rainfall_line: format!("🌧️ {rainfall:.1} mm"),
        forecast: weather.forecast_summary.clone(),
    }
}

/// One action row in the detail panel's recent-actions list.
#[derive(Debug, Clone)]
pub struct ActionRow {
    pub icon: &'static str,
    pub kind: ActionType,
    pub description: String,
    pub source: String,
    pub when: String,
}

pub fn build_action_rows(actions: &[ActionEvent], now: DateTime<Utc>) -> Vec<ActionRow> {
    actions
        .iter()
        .map(|action| {
            let (icon, kind) = action_visual(&action.action_type);
            ActionRow {
                icon,
                kind,
                description: action.description.clone(),
                source: action.source.clone(),
                when: relative_time(action.created_at, now),
            }
        })
        .collect()
}

/// Composed detail view: header from the cached plant (when present) or
/// the instruction set, plus the three fetched blocks.
#[derive(Debug, Clone)]
pub struct DetailBody {
    pub emoji: &'static str,
    pub name: String,
    pub state: Option<PlantState>,
    pub state_label: String,
    pub location: String,
    pub day_counter: String,
    pub next_state_label: Option<String>,
    pub weather: WeatherView,
    pub instructions: InstructionsView,
    pub harvest: HarvestInfo,
    pub diseases: Vec<String>,
    pub actions: Vec<ActionRow>,
}

pub fn build_detail_body(
    cached: Option<&Plant>,
    instructions: &InstructionSet,
    weather: &WeatherSnapshot,
    actions: &[ActionEvent],
    now: DateTime<Utc>,
) -> DetailBody {
    let location = cached.map(|p| p.location.clone()).unwrap_or_default();
    let day_counter = format!(
        "Hari {} · {} hari di fase ini",
        instructions.days_since_planting, instructions.days_in_state
    );
    DetailBody {
        emoji: plant_emoji(&instructions.plant_type),
        name: instructions.plant_name.clone(),
        state: PlantState::parse(&instructions.plant_state),
        state_label: state_label(&instructions.plant_state).to_string(),
        location,
        day_counter,
        next_state_label: instructions
            .next_state
            .as_deref()
            .map(|s| state_label(s).to_string()),
        weather: build_weather_view(weather),
        instructions: instruction_lines(&instructions.instructions, &instructions.alerts),
        harvest: instructions.harvest_info.clone(),
        diseases: instructions.common_diseases.clone(),
        actions: build_action_rows(actions, now),
    }
}

/// Dashboard summary strip.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStrip {
    pub date: String,
    pub plants_line: String,
    pub actions_line: String,
    pub alerts_line: String,
}

pub fn build_summary_strip(summary: &crate::model::FarmSummary) -> SummaryStrip {
    let breakdown: Vec<String> = summary
        .action_breakdown
        .iter()
        .map(|(kind, count)| {
            let (icon, _) = action_visual(kind);
            format!("{icon} {count}")
        })
        .collect();
    let actions_line = if breakdown.is_empty() {
        format!("{} aksi hari ini", summary.total_actions)
    } else {
        format!("{} aksi hari ini · {}", summary.total_actions, breakdown.join("  "))
    };
    SummaryStrip {
        date: summary.date.clone(),
        plants_line: format!("🌱 {} tanaman aktif", summary.plants_count),
        actions_line,
        alerts_line: format!("⚠️ {} peringatan", summary.alerts.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::sample_plant;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_stage_marks_exact_partition() {
        for (i, state) in GROWTH_STAGES.iter().enumerate() {
            let marks = stage_marks(state.as_str());
            for (j, mark) in marks.iter().enumerate() {
                let expected = match j.cmp(&i) {
                    std::cmp::Ordering::Less => StageMark::Done,
                    std::cmp::Ordering::Equal => StageMark::Current,
                    std::cmp::Ordering::Greater => StageMark::Upcoming,
                };
                assert_eq!(*mark, expected, "state {state:?} stage {j}");
            }
        }
    }

    #[test]
    fn test_stage_index_outside_sequence_is_minus_one() {
        assert_eq!(stage_index("dormant"), -1);
        assert_eq!(stage_index("dead"), -1);
        assert_eq!(stage_index("hibernating"), -1);
        // and no stage renders marked
        assert_eq!(stage_marks("dormant"), [StageMark::Upcoming; 5]);
        assert_eq!(stage_marks("dead"), [StageMark::Upcoming; 5]);
    }

    #[test]
    fn test_empty_plant_list_renders_single_placeholder() {
        match build_plants_view(&[]) {
            PlantsView::Empty => {}
            PlantsView::Cards(cards) => panic!("expected empty state, got {} cards", cards.len()),
        }
    }

    #[test]
    fn test_one_card_per_plant() {
        let plants = vec![
            sample_plant("p1", "Cabai", "vegetative", true),
            sample_plant("p2", "Tomat", "dormant", false),
        ];
        match build_plants_view(&plants) {
            PlantsView::Cards(cards) => {
                assert_eq!(cards.len(), 2);
                assert_eq!(cards[0].emoji, "🌶️");
                assert_eq!(cards[0].state_label, "Vegetatif");
                assert_eq!(cards[1].stages, [StageMark::Upcoming; 5]);
            }
            PlantsView::Empty => panic!("expected cards"),
        }
    }

    #[test]
    fn test_no_action_placeholder_is_distinct() {
        let view = instruction_lines(&[], &[]);
        assert_eq!(view, InstructionsView::NoAction);
        assert_ne!(view, InstructionsView::Loading);
        assert_ne!(view, InstructionsView::Failed);
    }

    #[test]
    fn test_alerts_render_before_instructions() {
        let instructions = vec!["Siram 500ml".to_string()];
        let alerts = vec!["Waspada hama".to_string()];
        match instruction_lines(&instructions, &alerts) {
            InstructionsView::Lines(lines) => {
                assert_eq!(lines.len(), 2);
                assert!(lines[0].is_alert);
                assert_eq!(lines[0].kind, ActionType::Alert);
                assert!(!lines[1].is_alert);
                assert_eq!(lines[1].kind, ActionType::Water);
                assert_eq!(lines[1].icon, "💧");
            }
            other => panic!("expected lines, got {other:?}"),
        }
    }

    #[test]
    fn test_timeline_resolves_names_with_short_id_fallback() {
        let plants = vec![sample_plant("p1", "Cabai Rawit", "vegetative", true)];
        let entries = vec![
            history_entry(Some("p1"), "action", serde_json::json!({"description": "Siram"})),
            history_entry(
                Some("3f8a2b1c-9d4e-4f5a"),
                "cycle",
                serde_json::json!({"message": "No action needed"}),
            ),
        ];
        let rows = build_timeline(&entries, &plants, now());
        assert_eq!(rows[0].title, "Cabai Rawit");
        assert_eq!(rows[0].description, "Siram");
        assert_eq!(rows[1].title, "3f8a2b1c…");
        assert_eq!(rows[1].description, "No action needed");
    }

    #[test]
    fn test_timeline_payload_fallback_is_truncated_serialization() {
        let entries = vec![history_entry(
            None,
            "state_change",
            serde_json::json!({"from_state": "seed", "to_state": "germination"}),
        )];
        let rows = build_timeline(&entries, &[], now());
        assert_eq!(rows[0].dot, DotClass::StateChange);
        assert!(rows[0].description.contains("from_state"));
    }

    #[test]
    fn test_dot_classification() {
        assert_eq!(classify_dot("alert"), DotClass::Alert);
        assert_eq!(classify_dot("weather_alert"), DotClass::Alert);
        assert_eq!(classify_dot("state_change"), DotClass::StateChange);
        assert_eq!(classify_dot("cycle"), DotClass::Default);
    }

    #[test]
    fn test_detail_body_carries_harvest_info() {
        let set = InstructionSet {
            plant_id: "p1".to_string(),
            plant_name: "Cabai Rawit".to_string(),
            plant_type: "chili".to_string(),
            plant_state: "harvest".to_string(),
            days_since_planting: 95,
            days_in_state: 4,
            instructions: vec!["Panen bertahap".to_string()],
            alerts: vec![],
            weather_summary: None,
            weather: None,
            harvest_info: HarvestInfo {
                indicators: vec!["Buah merah merata".to_string()],
                notes: Some("Petik pagi hari".to_string()),
            },
            common_diseases: vec!["Antraknosa".to_string()],
            next_state: Some("dormant".to_string()),
        };
        let body = build_detail_body(None, &set, &WeatherSnapshot::default(), &[], now());
        assert!(!body.harvest.is_empty());
        assert_eq!(body.harvest.indicators, vec!["Buah merah merata"]);
        assert_eq!(body.harvest.notes.as_deref(), Some("Petik pagi hari"));
    }

    #[test]
    fn test_weather_defaults_substituted_for_display() {
        let view = build_weather_view(&WeatherSnapshot::default());
        assert_eq!(view.temp_line, "🌡️ 22–28°C");
        assert_eq!(view.humidity_line, "💦 70%");
        assert_eq!(view.rainfall_line, "🌧️ 0.0 mm");
        assert!(view.forecast.is_none());
    }

    #[test]
    fn test_weather_present_values_win() {
        let weather = WeatherSnapshot {
            temp_max: Some(31.0),
            temp_min: Some(24.0),
            humidity: Some(88.0),
            rainfall_mm: Some(15.0),
            forecast_summary: Some("Hujan sedang".to_string()),
        };
        let view = build_weather_view(&weather);
        assert_eq!(view.temp_line, "🌡️ 24–31°C");
        assert_eq!(view.rainfall_line, "🌧️ 15.0 mm");
        assert_eq!(view.forecast.as_deref(), Some("Hujan sedang"));
    }

    fn history_entry(
        plant_id: Option<&str>,
        event_type: &str,
        payload: serde_json::Value,
    ) -> HistoryEntry {
        HistoryEntry {
            id: crate::model::generate_id(),
            plant_id: plant_id.map(|s| s.to_string()),
            event_type: event_type.to_string(),
            event_data: payload,
            created_at: now() - chrono::Duration::hours(1),
        }
    }
}
