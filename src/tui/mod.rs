//! Terminal UI
//!
//! One parameterized front-end instead of per-surface variants: the detail
//! view renders either as an inline panel next to the results or as a
//! modal overlay, selected at startup via [`DetailSurface`].

pub mod debouncer;
pub mod engine;
pub mod input;
pub mod renderer;
pub mod state;

pub use debouncer::SearchDebouncer;
pub use engine::{Engine, EngineConfig};
pub use state::AppState;

use clap::ValueEnum;
use ratatui::style::{Color, Modifier, Style};

/// Where the file-context detail view lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetailSurface {
    /// Inline panel to the right of the results list.
    Panel,
    /// Full-screen modal overlay on top of the results list.
    Modal,
}

/// Shared style palette.
#[derive(Debug, Clone)]
pub struct TuiStyles {
    pub file_path: Style,
    pub line_number: Style,
    pub pattern_match: Style,
    pub selected_row: Style,
    pub info: Style,
    pub error: Style,
    pub badge: Style,
    pub gutter: Style,
    pub match_line: Style,
    pub recursive: Style,
    pub location: Style,
    pub menu_enabled: Style,
    pub menu_disabled: Style,
}

impl Default for TuiStyles {
    fn default() -> Self {
        Self {
            file_path: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            line_number: Style::default().fg(Color::Yellow),
            pattern_match: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            selected_row: Style::default().fg(Color::Black).bg(Color::LightBlue),
            info: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            error: Style::default().fg(Color::Red),
            badge: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            gutter: Style::default().fg(Color::DarkGray),
            match_line: Style::default().bg(Color::Rgb(60, 60, 20)),
            recursive: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            location: Style::default().fg(Color::DarkGray),
            menu_enabled: Style::default().fg(Color::White),
            menu_disabled: Style::default().fg(Color::DarkGray),
        }
    }
}
