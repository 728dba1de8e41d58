//! Syntax highlighting for the detail view
//!
//! Wraps syntect with the file-type mapping the server uses. The syntax and
//! theme sets are loaded once at startup and shared for the lifetime of the
//! app; there is no lazy readiness check to wait on.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::types::FileKind;

const THEME: &str = "base16-ocean.dark";

pub struct CodeHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl CodeHighlighter {
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(THEME)
            .unwrap_or_default();
        Self { syntax_set, theme }
    }

    /// Highlight a block of code line by line. Highlighting state carries
    /// across lines, so multi-line constructs (block comments, strings)
    /// come out right. Unknown file types render as plain text.
    pub fn highlight_block(&self, kind: FileKind, lines: &[String]) -> Vec<Line<'static>> {
        self.highlight_token_block(kind.highlight_token(), lines)
    }

    /// Same as [`highlight_block`](Self::highlight_block) but keyed by a
    /// fenced-code-block language token from a markdown document.
    pub fn highlight_fenced(&self, lang: &str, lines: &[String]) -> Vec<Line<'static>> {
        let token = if lang.is_empty() { None } else { Some(lang) };
        self.highlight_token_block(token, lines)
    }

    fn highlight_token_block(&self, token: Option<&str>, lines: &[String]) -> Vec<Line<'static>> {
        let syntax = token
            .and_then(|token| self.syntax_set.find_syntax_by_token(token))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        lines
            .iter()
            .map(|line| {
                let ranges = highlighter
                    .highlight_line(line, &self.syntax_set)
                    .unwrap_or_else(|_| vec![(syntect::highlighting::Style::default(), line)]);
                let spans: Vec<Span<'static>> = ranges
                    .into_iter()
                    .map(|(style, text)| {
                        Span::styled(text.to_string(), convert_style(style))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_style(style: syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut converted = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        converted = converted.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        converted = converted.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        converted = converted.add_modifier(Modifier::UNDERLINED);
    }
    converted
}
