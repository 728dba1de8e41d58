//! UI state
//!
//! All mutable UI state lives on this one struct, constructed once at
//! startup: input fields, the results view, the detail view, the call
//! hierarchy overlay and the context menu. State transitions are plain
//! methods so they stay testable without a terminal.

use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::client::ClientError;
use crate::hierarchy::HierarchyView;
use crate::highlight::CodeHighlighter;
use crate::markdown::MarkdownRenderer;
use crate::types::{
    parse_result_line, CallHierarchy, ContextLine, FileContext, SearchResponse, SearchResultLine,
};

use super::input::TextField;
use super::DetailSurface;

/// Which input field receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Path,
    Pattern,
}

/// One rendered result row. Lines that failed structured parsing stay as
/// plain highlighted text and cannot be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRow {
    Match(SearchResultLine),
    Plain(String),
}

impl ResultRow {
    pub fn is_selectable(&self) -> bool {
        matches!(self, ResultRow::Match(_))
    }
}

/// Footer under the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsFooter {
    /// Quick search hit the cap; pressing Enter runs the full search.
    Limited { cap: u64 },
    /// Full search; shows the total count.
    Total { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsState {
    pub pattern: String,
    pub rows: Vec<ResultRow>,
    pub footer: Option<ResultsFooter>,
    pub selected: Option<usize>,
    pub offset: usize,
}

/// Results area lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    Idle,
    Searching,
    Error(String),
    Loaded(ResultsState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailHeader {
    pub file_name: String,
    pub file_path: String,
    pub line_number: u64,
}

impl DetailHeader {
    pub fn new(file_path: &str, line_number: u64) -> Self {
        let file_name = file_path.rsplit('/').next().unwrap_or(file_path).to_string();
        Self {
            file_name,
            file_path: file_path.to_string(),
            line_number,
        }
    }
}

/// Syntax-highlighted code context ready for drawing.
#[derive(Debug, Clone)]
pub struct CodeView {
    pub lines: Vec<Line<'static>>,
    pub raw: Vec<ContextLine>,
    pub match_index: Option<usize>,
    /// Vertical scroll, centered on the match line at first draw.
    pub scroll: Option<u16>,
    /// Right-click call-hierarchy lookup armed (C/C++ only).
    pub hierarchy_armed: bool,
}

#[derive(Debug, Clone)]
pub enum DetailBody {
    Code(CodeView),
    Markdown {
        lines: Vec<Line<'static>>,
        scroll: u16,
    },
}

/// Detail surface lifecycle.
#[derive(Debug, Clone)]
pub enum DetailState {
    Idle,
    Loading {
        header: DetailHeader,
    },
    Loaded {
        header: DetailHeader,
        file_type: String,
        body: DetailBody,
    },
    Failed {
        header: DetailHeader,
        message: String,
    },
}

impl DetailState {
    pub fn header(&self) -> Option<&DetailHeader> {
        match self {
            DetailState::Idle => None,
            DetailState::Loading { header }
            | DetailState::Loaded { header, .. }
            | DetailState::Failed { header, .. } => Some(header),
        }
    }
}

/// Call hierarchy overlay lifecycle: Closed → Loading → Populated | Empty |
/// Errored → Closed.
#[derive(Debug, Clone)]
pub enum HierarchyState {
    Closed,
    Loading {
        function_name: String,
    },
    Empty {
        function_name: String,
    },
    Populated {
        view: HierarchyView,
        offset: usize,
    },
    Errored {
        function_name: String,
        message: String,
    },
}

impl HierarchyState {
    pub fn is_open(&self) -> bool {
        !matches!(self, HierarchyState::Closed)
    }
}

/// Context menu opened by a right-click on code content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub x: u16,
    pub y: u16,
    pub token: String,
    pub enabled: bool,
}

/// Screen regions recorded during the last draw, for mouse hit testing.
#[derive(Debug, Clone, Default)]
pub struct LayoutMap {
    pub path: Rect,
    pub pattern: Rect,
    pub results_inner: Rect,
    pub detail_inner: Option<Rect>,
    pub gutter_width: u16,
    pub hierarchy: Option<Rect>,
    pub hierarchy_rows: Option<Rect>,
    pub menu: Option<Rect>,
}

pub struct AppState {
    pub path: TextField,
    pub pattern: TextField,
    pub focus: Focus,
    pub surface: DetailSurface,
    pub results: ResultsView,
    pub detail: DetailState,
    pub hierarchy: HierarchyState,
    pub menu: Option<ContextMenu>,
    pub layout: LayoutMap,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(base_path: String, surface: DetailSurface) -> Self {
        let cursor = base_path.chars().count();
        Self {
            path: TextField {
                text: base_path,
                cursor,
            },
            pattern: TextField::default(),
            focus: Focus::Pattern,
            surface,
            results: ResultsView::Idle,
            detail: DetailState::Idle,
            hierarchy: HierarchyState::Closed,
            menu: None,
            layout: LayoutMap::default(),
            should_quit: false,
        }
    }

    pub fn focused_field_mut(&mut self) -> &mut TextField {
        match self.focus {
            Focus::Path => &mut self.path,
            Focus::Pattern => &mut self.pattern,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Path => Focus::Pattern,
            Focus::Pattern => Focus::Path,
        };
    }

    /// Both fields non-empty: the query that would be issued.
    pub fn query(&self) -> Option<(String, String)> {
        if self.path.is_empty() || self.pattern.is_empty() {
            return None;
        }
        Some((self.path.text.clone(), self.pattern.text.clone()))
    }

    /// Empty-field behavior: no request, results and detail views cleared.
    pub fn clear_search_views(&mut self) {
        self.results = ResultsView::Idle;
        self.detail = DetailState::Idle;
    }

    pub fn begin_search(&mut self) {
        self.results = ResultsView::Searching;
    }

    /// Apply a completed search. Superseded generations never reach this
    /// point; the engine filters them out first.
    pub fn apply_search(
        &mut self,
        full: bool,
        pattern: String,
        limit: u64,
        result: Result<SearchResponse, ClientError>,
    ) {
        match result {
            Ok(response) => {
                if response.results.is_empty() {
                    // Match the empty-result behavior of a cleared query:
                    // the context panel resets alongside the list.
                    self.detail = DetailState::Idle;
                }
                let rows: Vec<ResultRow> = response
                    .results
                    .iter()
                    .map(|line| match parse_result_line(line) {
                        Some(parsed) => ResultRow::Match(parsed),
                        None => ResultRow::Plain(line.clone()),
                    })
                    .collect();
                let footer = if response.limited && !full {
                    Some(ResultsFooter::Limited { cap: limit })
                } else if full {
                    Some(ResultsFooter::Total { count: rows.len() })
                } else {
                    None
                };
                self.results = ResultsView::Loaded(ResultsState {
                    pattern,
                    rows,
                    footer,
                    selected: None,
                    offset: 0,
                });
            }
            Err(err) => {
                self.results = ResultsView::Error(err.to_string());
            }
        }
    }

    /// Move the result selection, skipping unselectable plain rows.
    /// Returns the newly selected match for the engine to load context for.
    pub fn select_result(&mut self, forward: bool) -> Option<SearchResultLine> {
        let ResultsView::Loaded(state) = &mut self.results else {
            return None;
        };
        let count = state.rows.len();
        if count == 0 {
            return None;
        }

        let mut index = match (state.selected, forward) {
            (Some(current), true) => current + 1,
            (Some(current), false) => current.checked_sub(1)?,
            (None, true) => 0,
            (None, false) => count - 1,
        };
        loop {
            if index >= count {
                return None;
            }
            if state.rows[index].is_selectable() {
                break;
            }
            if forward {
                index += 1;
            } else {
                index = index.checked_sub(1)?;
            }
        }

        state.selected = Some(index);
        match &state.rows[index] {
            ResultRow::Match(line) => Some(line.clone()),
            ResultRow::Plain(_) => None,
        }
    }

    /// Select a row by absolute index (mouse click). Plain rows are not
    /// selectable; returns the match to load when selection changed.
    pub fn select_result_at(&mut self, index: usize) -> Option<SearchResultLine> {
        let ResultsView::Loaded(state) = &mut self.results else {
            return None;
        };
        match state.rows.get(index) {
            Some(ResultRow::Match(line)) => {
                state.selected = Some(index);
                Some(line.clone())
            }
            _ => None,
        }
    }

    /// Header update and loading placeholder, applied before the request
    /// is issued.
    pub fn begin_context_load(&mut self, file_path: &str, line_number: u64) {
        self.detail = DetailState::Loading {
            header: DetailHeader::new(file_path, line_number),
        };
    }

    /// Apply a completed context fetch, dispatching markdown vs code.
    pub fn apply_context(
        &mut self,
        file_path: &str,
        line_number: u64,
        result: Result<FileContext, ClientError>,
        highlighter: &CodeHighlighter,
    ) {
        let header = DetailHeader::new(file_path, line_number);
        match result {
            Ok(context) => {
                let kind = context.kind();
                let body = if kind == crate::types::FileKind::Markdown {
                    let renderer = MarkdownRenderer::new(highlighter);
                    DetailBody::Markdown {
                        lines: renderer.render(&context.joined_content()),
                        scroll: 0,
                    }
                } else {
                    let contents: Vec<String> =
                        context.context.iter().map(|l| l.content.clone()).collect();
                    DetailBody::Code(CodeView {
                        lines: highlighter.highlight_block(kind, &contents),
                        match_index: context.match_index(),
                        raw: context.context.clone(),
                        scroll: None,
                        hierarchy_armed: kind.supports_call_hierarchy(),
                    })
                };
                self.detail = DetailState::Loaded {
                    header,
                    file_type: context.file_type,
                    body,
                };
            }
            Err(err) => {
                self.detail = DetailState::Failed {
                    header,
                    message: err.to_string(),
                };
            }
        }
    }

    /// Scroll the loaded detail body by one line, clamped to its content.
    pub fn scroll_detail(&mut self, down: bool) {
        let DetailState::Loaded { body, .. } = &mut self.detail else {
            return;
        };
        match body {
            DetailBody::Code(view) => {
                let max = view.lines.len().saturating_sub(1) as u16;
                let current = view.scroll.unwrap_or(0);
                view.scroll = Some(if down {
                    (current + 1).min(max)
                } else {
                    current.saturating_sub(1)
                });
            }
            DetailBody::Markdown { lines, scroll } => {
                let max = lines.len().saturating_sub(1) as u16;
                *scroll = if down {
                    (*scroll + 1).min(max)
                } else {
                    scroll.saturating_sub(1)
                };
            }
        }
    }

    pub fn begin_hierarchy_load(&mut self, function_name: &str) {
        self.hierarchy = HierarchyState::Loading {
            function_name: function_name.to_string(),
        };
    }

    pub fn apply_hierarchy(
        &mut self,
        function_name: &str,
        result: Result<CallHierarchy, ClientError>,
    ) {
        match result {
            Ok(data) => {
                if data.callers.is_empty() {
                    self.hierarchy = HierarchyState::Empty {
                        function_name: data.function_name,
                    };
                } else {
                    self.hierarchy = HierarchyState::Populated {
                        view: HierarchyView::new(data),
                        offset: 0,
                    };
                }
            }
            Err(err) => {
                self.hierarchy = HierarchyState::Errored {
                    function_name: function_name.to_string(),
                    message: err.to_string(),
                };
            }
        }
    }

    /// Close the hierarchy overlay, discarding tree and expansion state.
    pub fn close_hierarchy(&mut self) {
        self.hierarchy = HierarchyState::Closed;
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
    }
}
