// Display formatters
//
// Pure mappings from domain values to display tokens: emoji, localized
// labels, relative-time strings, and inferred action types. Everything here
// is total and side-effect free; colors are resolved later by the theme.

use crate::model::{ActionType, PlantState, PlantType};
use chrono::{DateTime, Datelike, Utc};

/// Emoji for a plant type. Unknown types get the generic seedling.
pub fn plant_emoji(plant_type: &str) -> &'static str {
    match PlantType::parse(plant_type) {
        Some(PlantType::Chili) => "🌶️",
        Some(PlantType::Tomato) => "🍅",
        Some(PlantType::Spinach) => "🥬",
        Some(PlantType::Lettuce) => "🥗",
        Some(PlantType::Hydroponic) => "🪴",
        None => "🌱",
    }
}

/// Localized label for a lifecycle state. Unknown states pass through
/// verbatim so new backend states still show something meaningful.
pub fn state_label(state: &str) -> &str {
    match PlantState::parse(state) {
        Some(PlantState::Seed) => "Benih",
        Some(PlantState::Germination) => "Berkecambah",
        Some(PlantState::Vegetative) => "Vegetatif",
        Some(PlantState::Flowering) => "Berbunga",
        Some(PlantState::Harvest) => "Panen",
        Some(PlantState::Dormant) => "Dorman",
        Some(PlantState::Dead) => "Mati",
        None => state,
    }
}

/// Emoji plus style token for an action type. The token is fed to the
/// theme for color resolution; unknown types get the log pairing.
pub fn action_visual(action_type: &str) -> (&'static str, ActionType) {
    let kind = ActionType::parse(action_type).unwrap_or(ActionType::Log);
    let icon = match kind {
        ActionType::Water => "💧",
        ActionType::SkipWater => "⏭️",
        ActionType::Fertilize => "🌿",
        ActionType::Harvest => "🧺",
        ActionType::Notify => "🔔",
        ActionType::Alert => "⚠️",
        ActionType::Log => "📝",
    };
    (icon, kind)
}

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Relative-time string with four bands: under a minute, whole minutes,
/// whole hours, then day + month. Boundary values belong to the lower band
/// (exactly 60s reads "1 menit lalu", not "Baru saja"). Future timestamps
/// read as "Baru saja".
pub fn relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - ts).num_seconds();
    if secs < 60 {
        "Baru saja".to_string()
    } else if secs < 3600 {
        format!("{} menit lalu", secs / 60)
    } else if secs < 86400 {
        format!("{} jam lalu", secs / 3600)
    } else {
        format!("{} {}", ts.day(), MONTH_ABBREV[ts.month0() as usize])
    }
}

/// Ordered keyword rule table for classifying free-text instructions.
/// The order IS the tie-break: water terms are checked before fertilize,
/// fertilize before harvest, harvest before alert, alert before skip.
/// "Lewati penyiraman" therefore classifies as water, not skip_water.
const ACTION_KEYWORDS: [(ActionType, &[&str]); 5] = [
    (ActionType::Water, &["siram", "water", "penyiraman"]),
    (ActionType::Fertilize, &["pupuk", "fertilize"]),
    (ActionType::Harvest, &["panen", "harvest"]),
    (ActionType::Alert, &["peringatan", "alert", "waspada"]),
    (ActionType::SkipWater, &["lewati", "skip", "tunda"]),
];

/// Infer an action type from a free-text instruction line. First matching
/// rule wins; no match falls back to log.
pub fn infer_action_type(text: &str) -> ActionType {
    let lower = text.to_lowercase();
    for (kind, terms) in ACTION_KEYWORDS.iter() {
        if terms.iter().any(|term| lower.contains(term)) {
            return *kind;
        }
    }
    ActionType::Log
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        (now - chrono::Duration::seconds(secs_ago), now)
    }

    #[test]
    fn test_relative_time_just_now_band() {
        let (ts, now) = at(0);
        assert_eq!(relative_time(ts, now), "Baru saja");
        let (ts, now) = at(59);
        assert_eq!(relative_time(ts, now), "Baru saja");
    }

    #[test]
    fn test_relative_time_minute_band_boundaries() {
        // Exactly 60s belongs to the minute band, not "just now"
        let (ts, now) = at(60);
        assert_eq!(relative_time(ts, now), "1 menit lalu");
        let (ts, now) = at(3599);
        assert_eq!(relative_time(ts, now), "59 menit lalu");
    }

    #[test]
    fn test_relative_time_hour_band_boundaries() {
        let (ts, now) = at(3600);
        assert_eq!(relative_time(ts, now), "1 jam lalu");
        let (ts, now) = at(86399);
        assert_eq!(relative_time(ts, now), "23 jam lalu");
    }

    #[test]
    fn test_relative_time_date_band() {
        let (ts, now) = at(86400);
        assert_eq!(relative_time(ts, now), "20 Agu");
    }

    #[test]
    fn test_relative_time_future_is_just_now() {
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        let future = now + chrono::Duration::seconds(120);
        assert_eq!(relative_time(future, now), "Baru saja");
    }

    #[test]
    fn test_infer_water_beats_fertilize() {
        // Both a water term and a fertilize term: first rule wins
        assert_eq!(
            infer_action_type("Siram dulu, lalu beri pupuk NPK"),
            ActionType::Water
        );
    }

    #[test]
    fn test_infer_water_beats_skip() {
        // The skip-watering forecast line still carries the water icon
        assert_eq!(
            infer_action_type("Hujan sedang diprediksi (15mm). Lewati penyiraman."),
            ActionType::Water
        );
    }

    #[test]
    fn test_infer_plain_matches() {
        assert_eq!(infer_action_type("Beri pupuk NPK 5g"), ActionType::Fertilize);
        assert_eq!(infer_action_type("Panen buah yang merah"), ActionType::Harvest);
        assert_eq!(infer_action_type("Waspada hama kutu daun"), ActionType::Alert);
        assert_eq!(infer_action_type("Tunda pemupukan minggu ini"), ActionType::SkipWater);
    }

    #[test]
    fn test_infer_case_insensitive() {
        assert_eq!(infer_action_type("SIRAM PAGI HARI"), ActionType::Water);
    }

    #[test]
    fn test_infer_fallback_is_log() {
        assert_eq!(infer_action_type("Cek kondisi daun"), ActionType::Log);
        assert_eq!(infer_action_type(""), ActionType::Log);
    }

    #[test]
    fn test_state_label_known_and_unknown() {
        assert_eq!(state_label("vegetative"), "Vegetatif");
        assert_eq!(state_label("dormant"), "Dorman");
        assert_eq!(state_label("hibernating"), "hibernating");
    }

    #[test]
    fn test_plant_emoji_fallback() {
        assert_eq!(plant_emoji("chili"), "🌶️");
        assert_eq!(plant_emoji("durian"), "🌱");
    }

    #[test]
    fn test_action_visual_unknown_gets_log_pairing() {
        let (icon, kind) = action_visual("transplant");
        assert_eq!(icon, "📝");
        assert_eq!(kind, ActionType::Log);
    }
}
