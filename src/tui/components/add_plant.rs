// Add-plant form modal
//
// A centered overlay with one input row per field. Validation is pure and
// runs before any network call: a failing form never reaches the API.

use crate::model::NewPlant;
use crate::tui::theme::Theme;
use chrono::{NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const PLANT_TYPES: [&str; 5] = ["chili", "tomato", "spinach", "lettuce", "hydroponic"];

/// Text fields, in navigation order. Plant type is a separate selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    PlantType,
    PlantDate,
    Location,
    Latitude,
    Longitude,
    GrowingMethod,
    Notes,
}

const FIELD_ORDER: [Field; 8] = [
    Field::Name,
    Field::PlantType,
    Field::PlantDate,
    Field::Location,
    Field::Latitude,
    Field::Longitude,
    Field::GrowingMethod,
    Field::Notes,
];

impl Field {
    fn label(&self) -> &'static str {
        match self {
            Field::Name => "Nama",
            Field::PlantType => "Jenis",
            Field::PlantDate => "Tanggal tanam",
            Field::Location => "Lokasi",
            Field::Latitude => "Lintang",
            Field::Longitude => "Bujur",
            Field::GrowingMethod => "Metode tanam",
            Field::Notes => "Catatan",
        }
    }
}

/// What a key press did to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Cancel,
}

pub struct AddPlantForm {
    name: String,
    type_index: usize,
    plant_date: String,
    location: String,
    latitude: String,
    longitude: String,
    growing_method: String,
    notes: String,
    focus: usize,
}

impl AddPlantForm {
    /// Fresh form with today's date prefilled.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            type_index: 0,
            plant_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            location: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            growing_method: String::new(),
            notes: String::new(),
            focus: 0,
        }
    }

    fn focused(&self) -> Field {
        FIELD_ORDER[self.focus]
    }

    fn field_text(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::PlantType => PLANT_TYPES[self.type_index],
            Field::PlantDate => &self.plant_date,
            Field::Location => &self.location,
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
            Field::GrowingMethod => &self.growing_method,
            Field::Notes => &self.notes,
        }
    }

    fn field_text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::PlantType => None,
            Field::PlantDate => Some(&mut self.plant_date),
            Field::Location => Some(&mut self.location),
            Field::Latitude => Some(&mut self.latitude),
            Field::Longitude => Some(&mut self.longitude),
            Field::GrowingMethod => Some(&mut self.growing_method),
            Field::Notes => Some(&mut self.notes),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % FIELD_ORDER.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FIELD_ORDER.len() - 1) % FIELD_ORDER.len();
            }
            KeyCode::Left if self.focused() == Field::PlantType => {
                self.type_index = (self.type_index + PLANT_TYPES.len() - 1) % PLANT_TYPES.len();
            }
            KeyCode::Right if self.focused() == Field::PlantType => {
                self.type_index = (self.type_index + 1) % PLANT_TYPES.len();
            }
            KeyCode::Backspace => {
                let field = self.focused();
                if let Some(text) = self.field_text_mut(field) {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                let field = self.focused();
                if let Some(text) = self.field_text_mut(field) {
                    text.push(c);
                }
            }
            _ => {}
        }
        FormAction::None
    }

    /// Client-side validation (§ pre-submission). Returns the payload or
    /// the first failure as a toast-ready message.
    pub fn validate(&self) -> Result<NewPlant, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Nama tanaman wajib diisi".to_string());
        }
        let location = self.location.trim();
        if location.is_empty() {
            return Err("Lokasi wajib diisi".to_string());
        }
        let plant_date = NaiveDate::parse_from_str(self.plant_date.trim(), "%Y-%m-%d")
            .map_err(|_| "Tanggal tanam tidak valid (YYYY-MM-DD)".to_string())?;
        let latitude: f64 = self
            .latitude
            .trim()
            .parse()
            .map_err(|_| "Lintang harus berupa angka".to_string())?;
        let longitude: f64 = self
            .longitude
            .trim()
            .parse()
            .map_err(|_| "Bujur harus berupa angka".to_string())?;

        let optional = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        Ok(NewPlant {
            name: name.to_string(),
            plant_type: PLANT_TYPES[self.type_index].to_string(),
            location: location.to_string(),
            latitude,
            longitude,
            plant_date,
            growing_method: optional(&self.growing_method),
            soil_condition: None,
            notes: optional(&self.notes),
        })
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let width = 52.min(area.width.saturating_sub(4));
        let height = (FIELD_ORDER.len() as u16 + 4).min(area.height.saturating_sub(2));
        let modal = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        f.render_widget(Clear, modal);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_focused_style())
            .title(Span::styled(" 🌱 Tambah Tanaman ", theme.title_style()));
        let inner = block.inner(modal);
        f.render_widget(block, modal);

        let mut constraints = vec![Constraint::Length(1); FIELD_ORDER.len()];
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in FIELD_ORDER.iter().enumerate() {
            let focused = i == self.focus;
            let marker = if focused { "▸ " } else { "  " };
            let value = if *field == Field::PlantType {
                format!("◂ {} ▸", self.field_text(*field))
            } else {
                self.field_text(*field).to_string()
            };
            let value_style = if focused {
                theme.base_style().add_modifier(Modifier::BOLD)
            } else {
                theme.base_style()
            };
            let line = Line::from(vec![
                Span::styled(marker, theme.title_style()),
                Span::styled(format!("{:<14}", field.label()), theme.muted_style()),
                Span::styled(value, value_style),
            ]);
            f.render_widget(Paragraph::new(line), rows[i]);
        }

        let hint = Paragraph::new(Line::from(Span::styled(
            "Tab/↑↓ pindah · ◂▸ jenis · Enter simpan · Esc batal",
            theme.muted_style(),
        )));
        f.render_widget(hint, rows[FIELD_ORDER.len() + 1]);
    }
}

impl Default for AddPlantForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(form: &mut AddPlantForm, code: KeyCode) -> FormAction {
        form.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(form: &mut AddPlantForm, text: &str) {
        for c in text.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    fn filled_form() -> AddPlantForm {
        let mut form = AddPlantForm::new();
        type_text(&mut form, "Tomat Ceri");
        press(&mut form, KeyCode::Tab); // type selector, keep chili default
        press(&mut form, KeyCode::Tab); // date prefilled
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "Bandung");
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "-6.9");
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "107.6");
        form
    }

    #[test]
    fn test_empty_name_blocks_submission() {
        let form = AddPlantForm::new();
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Nama tanaman wajib diisi");
    }

    #[test]
    fn test_whitespace_name_blocks_submission() {
        let mut form = AddPlantForm::new();
        type_text(&mut form, "   ");
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_non_numeric_coordinates_block_submission() {
        let mut form = filled_form();
        // focus is on longitude; corrupt it
        type_text(&mut form, "x");
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Bujur harus berupa angka");
    }

    #[test]
    fn test_valid_form_builds_payload() {
        let form = filled_form();
        let plant = form.validate().unwrap();
        assert_eq!(plant.name, "Tomat Ceri");
        assert_eq!(plant.plant_type, "chili");
        assert_eq!(plant.location, "Bandung");
        assert!(plant.growing_method.is_none());
    }

    #[test]
    fn test_type_selector_cycles() {
        let mut form = AddPlantForm::new();
        press(&mut form, KeyCode::Tab); // focus type
        press(&mut form, KeyCode::Right);
        assert_eq!(form.validate().map(|p| p.plant_type).ok(), None); // name empty still blocks
        type_text(&mut form, ""); // no-op on selector
        assert_eq!(PLANT_TYPES[form.type_index], "tomato");
        press(&mut form, KeyCode::Left);
        press(&mut form, KeyCode::Left);
        assert_eq!(PLANT_TYPES[form.type_index], "hydroponic");
    }

    #[test]
    fn test_esc_cancels_enter_submits() {
        let mut form = AddPlantForm::new();
        assert_eq!(press(&mut form, KeyCode::Esc), FormAction::Cancel);
        assert_eq!(press(&mut form, KeyCode::Enter), FormAction::Submit);
    }
}
