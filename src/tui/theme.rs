// Theme system for the TUI
//
// Resolves every style token the renderer emits: lifecycle badges, action
// styles, timeline dots, toast severities and the region placeholders.
// The formatter layer stays theme-agnostic; only this file knows colors.

use crate::model::{ActionType, PlantState};
use crate::render::DotClass;
use crate::tui::components::toast::Severity;
use ratatui::style::{Color, Modifier, Style};

/// Available themes, cyclable at runtime and selectable via config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

impl ThemeKind {
    pub fn all() -> &'static [ThemeKind] {
        &[ThemeKind::Dark, ThemeKind::Light]
    }

    pub fn next(self) -> Self {
        let themes = Self::all();
        let current = themes.iter().position(|&t| t == self).unwrap_or(0);
        themes[(current + 1) % themes.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
        }
    }

    /// Parse a config value; anything unknown falls back to dark.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => ThemeKind::Light,
            _ => ThemeKind::Dark,
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            ThemeKind::Dark => Theme::dark(),
            ThemeKind::Light => Theme::light(),
        }
    }
}

/// Complete theme definition.
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub border: Color,
    pub border_focused: Color,
    pub title: Color,
    pub muted: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,

    // Lifecycle badges
    pub state_seed: Color,
    pub state_germination: Color,
    pub state_vegetative: Color,
    pub state_flowering: Color,
    pub state_harvest: Color,
    pub state_dormant: Color,
    pub state_dead: Color,

    // Action styles
    pub action_water: Color,
    pub action_skip: Color,
    pub action_fertilize: Color,
    pub action_harvest: Color,
    pub action_notify: Color,
    pub action_alert: Color,
    pub action_log: Color,

    // Timeline dots
    pub dot_alert: Color,
    pub dot_state_change: Color,
    pub dot_default: Color,

    // Stage progress
    pub stage_done: Color,
    pub stage_current: Color,
    pub stage_upcoming: Color,

    // Toast severities
    pub toast_info: Color,
    pub toast_success: Color,
    pub toast_warning: Color,
    pub toast_error: Color,

    // Region placeholders
    pub placeholder_loading: Color,
    pub placeholder_error: Color,
    pub placeholder_empty: Color,

    // Log levels
    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,
    pub log_trace: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Green,
            title: Color::Green,
            muted: Color::Gray,
            selected_bg: Color::DarkGray,
            selected_fg: Color::Yellow,

            state_seed: Color::Gray,
            state_germination: Color::LightYellow,
            state_vegetative: Color::Green,
            state_flowering: Color::Magenta,
            state_harvest: Color::LightRed,
            state_dormant: Color::DarkGray,
            state_dead: Color::Red,

            action_water: Color::Cyan,
            action_skip: Color::Gray,
            action_fertilize: Color::Green,
            action_harvest: Color::LightRed,
            action_notify: Color::Blue,
            action_alert: Color::Yellow,
            action_log: Color::Gray,

            dot_alert: Color::Red,
            dot_state_change: Color::Magenta,
            dot_default: Color::Cyan,

            stage_done: Color::Green,
            stage_current: Color::Yellow,
            stage_upcoming: Color::DarkGray,

            toast_info: Color::Cyan,
            toast_success: Color::Green,
            toast_warning: Color::Yellow,
            toast_error: Color::Red,

            placeholder_loading: Color::Gray,
            placeholder_error: Color::Red,
            placeholder_empty: Color::DarkGray,

            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Blue,
            log_debug: Color::Gray,
            log_trace: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            border: Color::Gray,
            border_focused: Color::Rgb(0, 120, 60),
            title: Color::Rgb(0, 120, 60),
            muted: Color::DarkGray,
            selected_bg: Color::Rgb(220, 235, 220),
            selected_fg: Color::Black,

            state_seed: Color::DarkGray,
            state_germination: Color::Rgb(184, 134, 11),
            state_vegetative: Color::Rgb(0, 120, 60),
            state_flowering: Color::Magenta,
            state_harvest: Color::Rgb(200, 70, 30),
            state_dormant: Color::Gray,
            state_dead: Color::Red,

            action_water: Color::Blue,
            action_skip: Color::DarkGray,
            action_fertilize: Color::Rgb(0, 120, 60),
            action_harvest: Color::Rgb(200, 70, 30),
            action_notify: Color::Blue,
            action_alert: Color::Rgb(184, 134, 11),
            action_log: Color::DarkGray,

            dot_alert: Color::Red,
            dot_state_change: Color::Magenta,
            dot_default: Color::Blue,

            stage_done: Color::Rgb(0, 120, 60),
            stage_current: Color::Rgb(184, 134, 11),
            stage_upcoming: Color::Gray,

            toast_info: Color::Blue,
            toast_success: Color::Rgb(0, 120, 60),
            toast_warning: Color::Rgb(184, 134, 11),
            toast_error: Color::Red,

            placeholder_loading: Color::DarkGray,
            placeholder_error: Color::Red,
            placeholder_empty: Color::Gray,

            log_error: Color::Red,
            log_warn: Color::Rgb(184, 134, 11),
            log_info: Color::Blue,
            log_debug: Color::DarkGray,
            log_trace: Color::Gray,
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused_style(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Badge style for a lifecycle state; unknown states get the muted
    /// color so they still render legibly.
    pub fn state_style(&self, state: Option<PlantState>) -> Style {
        let color = match state {
            Some(PlantState::Seed) => self.state_seed,
            Some(PlantState::Germination) => self.state_germination,
            Some(PlantState::Vegetative) => self.state_vegetative,
            Some(PlantState::Flowering) => self.state_flowering,
            Some(PlantState::Harvest) => self.state_harvest,
            Some(PlantState::Dormant) => self.state_dormant,
            Some(PlantState::Dead) => self.state_dead,
            None => self.muted,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn action_style(&self, kind: ActionType) -> Style {
        let color = match kind {
            ActionType::Water => self.action_water,
            ActionType::SkipWater => self.action_skip,
            ActionType::Fertilize => self.action_fertilize,
            ActionType::Harvest => self.action_harvest,
            ActionType::Notify => self.action_notify,
            ActionType::Alert => self.action_alert,
            ActionType::Log => self.action_log,
        };
        Style::default().fg(color)
    }

    pub fn dot_style(&self, dot: DotClass) -> Style {
        let color = match dot {
            DotClass::Alert => self.dot_alert,
            DotClass::StateChange => self.dot_state_change,
            DotClass::Default => self.dot_default,
        };
        Style::default().fg(color)
    }

    pub fn severity_style(&self, severity: Severity) -> Style {
        let color = match severity {
            Severity::Info => self.toast_info,
            Severity::Success => self.toast_success,
            Severity::Warning => self.toast_warning,
            Severity::Error => self.toast_error,
        };
        Style::default().fg(color)
    }

    pub fn loading_style(&self) -> Style {
        Style::default()
            .fg(self.placeholder_loading)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.placeholder_error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn empty_style(&self) -> Style {
        Style::default().fg(self.placeholder_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_cycle_wraps() {
        assert_eq!(ThemeKind::Dark.next(), ThemeKind::Light);
        assert_eq!(ThemeKind::Light.next(), ThemeKind::Dark);
    }

    #[test]
    fn test_from_name_falls_back_to_dark() {
        assert_eq!(ThemeKind::from_name("light"), ThemeKind::Light);
        assert_eq!(ThemeKind::from_name("Light"), ThemeKind::Light);
        assert_eq!(ThemeKind::from_name("solarized"), ThemeKind::Dark);
    }
}
