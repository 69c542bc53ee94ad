// Reusable TUI components shared across the page views

pub mod add_plant;
pub mod detail_panel;
pub mod logs_panel;
pub mod toast;
