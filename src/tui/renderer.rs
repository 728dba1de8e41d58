//! Drawing
//!
//! Renders the whole frame from [`AppState`] and records the regions mouse
//! events need to hit-test against. Rendering never mutates request state;
//! the only writes back into the state are scroll offsets.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use regex::RegexBuilder;

use crate::tui::state::{
    AppState, DetailBody, DetailHeader, DetailState, Focus, HierarchyState, ResultRow,
    ResultsFooter, ResultsView,
};
use crate::tui::{DetailSurface, TuiStyles};

/// Split `content` into (text, is_match) segments for case-insensitive
/// occurrences of the literal pattern. Regex metacharacters in the pattern
/// are escaped first, so `a.b` highlights exactly `a.b`.
pub fn highlight_segments(content: &str, pattern: &str) -> Vec<(String, bool)> {
    if pattern.is_empty() {
        return vec![(content.to_string(), false)];
    }
    let matcher = match RegexBuilder::new(&regex::escape(pattern))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(_) => return vec![(content.to_string(), false)],
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for found in matcher.find_iter(content) {
        if found.start() > last {
            segments.push((content[last..found.start()].to_string(), false));
        }
        segments.push((content[found.range()].to_string(), true));
        last = found.end();
    }
    if last < content.len() {
        segments.push((content[last..].to_string(), false));
    }
    if segments.is_empty() {
        segments.push((String::new(), false));
    }
    segments
}

fn highlight_spans(content: &str, pattern: &str, styles: &TuiStyles) -> Vec<Span<'static>> {
    highlight_segments(content, pattern)
        .into_iter()
        .map(|(text, is_match)| {
            if is_match {
                Span::styled(text, styles.pattern_match)
            } else {
                Span::raw(text)
            }
        })
        .collect()
}

pub fn draw(f: &mut Frame, state: &mut AppState, styles: &TuiStyles) {
    // Overlay rects are recomputed every frame.
    state.layout.hierarchy = None;
    state.layout.hierarchy_rows = None;
    state.layout.menu = None;
    state.layout.detail_inner = None;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    draw_inputs(f, state, chunks[0]);

    match state.surface {
        DetailSurface::Panel => {
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);
            draw_results(f, state, styles, panes[0]);
            draw_detail(f, state, styles, panes[1]);
        }
        DetailSurface::Modal => {
            draw_results(f, state, styles, chunks[1]);
            if !matches!(state.detail, DetailState::Idle) {
                let popup = centered_rect(f.size(), 80, 80);
                f.render_widget(Clear, popup);
                draw_detail(f, state, styles, popup);
            }
        }
    }

    draw_status(f, state, styles, chunks[2]);

    if state.hierarchy.is_open() {
        draw_hierarchy(f, state, styles);
    }
    if state.menu.is_some() {
        draw_menu(f, state, styles);
    }
}

fn draw_inputs(f: &mut Frame, state: &mut AppState, area: Rect) {
    let fields = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let focused = Style::default().fg(ratatui::style::Color::Yellow);
    let unfocused = Style::default();

    let path_block = Block::default()
        .borders(Borders::ALL)
        .title(" Directory ")
        .border_style(if state.focus == Focus::Path { focused } else { unfocused });
    let pattern_block = Block::default()
        .borders(Borders::ALL)
        .title(" Pattern ")
        .border_style(if state.focus == Focus::Pattern { focused } else { unfocused });

    f.render_widget(
        Paragraph::new(state.path.text.clone()).block(path_block),
        fields[0],
    );
    f.render_widget(
        Paragraph::new(state.pattern.text.clone()).block(pattern_block),
        fields[1],
    );
    state.layout.path = fields[0];
    state.layout.pattern = fields[1];

    let (field, rect) = match state.focus {
        Focus::Path => (&state.path, fields[0]),
        Focus::Pattern => (&state.pattern, fields[1]),
    };
    let cursor_x = rect.x + 1 + field.cursor.min(rect.width.saturating_sub(2) as usize) as u16;
    f.set_cursor(cursor_x, rect.y + 1);
}

fn draw_results(f: &mut Frame, state: &mut AppState, styles: &TuiStyles, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Results ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    state.layout.results_inner = inner;

    match &mut state.results {
        ResultsView::Idle => {}
        ResultsView::Searching => {
            f.render_widget(
                Paragraph::new(Line::styled(
                    "Searching... (press Enter for full results)",
                    styles.info,
                )),
                inner,
            );
        }
        ResultsView::Error(message) => {
            f.render_widget(
                Paragraph::new(Line::styled(message.clone(), styles.error))
                    .wrap(Wrap { trim: false }),
                inner,
            );
        }
        ResultsView::Loaded(results) => {
            if results.rows.is_empty() {
                f.render_widget(
                    Paragraph::new(Line::styled("No results found", styles.info)),
                    inner,
                );
                return;
            }

            let footer_height = if results.footer.is_some() { 1 } else { 0 };
            let list_height = inner.height.saturating_sub(footer_height) as usize;
            if list_height == 0 {
                return;
            }

            // Keep the selection in view.
            if let Some(selected) = results.selected {
                if selected < results.offset {
                    results.offset = selected;
                } else if selected >= results.offset + list_height {
                    results.offset = selected + 1 - list_height;
                }
            }
            results.offset = results.offset.min(results.rows.len().saturating_sub(1));

            let mut lines: Vec<Line<'static>> = Vec::with_capacity(list_height);
            for (index, row) in results
                .rows
                .iter()
                .enumerate()
                .skip(results.offset)
                .take(list_height)
            {
                let mut spans = match row {
                    ResultRow::Match(line) => {
                        let mut spans = vec![
                            Span::styled(line.file_path.clone(), styles.file_path),
                            Span::styled(format!(":{}", line.line_number), styles.line_number),
                            Span::raw(" "),
                        ];
                        spans.extend(highlight_spans(&line.content, &results.pattern, styles));
                        spans
                    }
                    ResultRow::Plain(raw) => highlight_spans(raw, &results.pattern, styles),
                };
                if results.selected == Some(index) {
                    spans = spans
                        .into_iter()
                        .map(|span| Span::styled(span.content, styles.selected_row))
                        .collect();
                }
                lines.push(Line::from(spans));
            }

            let list_area = Rect { height: list_height as u16, ..inner };
            f.render_widget(Paragraph::new(Text::from(lines)), list_area);

            if let Some(footer) = &results.footer {
                let text = match footer {
                    ResultsFooter::Limited { cap } => format!(
                        "Showing first {} results. Press Enter for full search.",
                        cap
                    ),
                    ResultsFooter::Total { count } => format!("Showing all {} results", count),
                };
                let footer_area = Rect {
                    y: inner.y + inner.height - 1,
                    height: 1,
                    ..inner
                };
                f.render_widget(Paragraph::new(Line::styled(text, styles.info)), footer_area);
            }
        }
    }
}

fn header_lines(header: &DetailHeader, badge: Option<&str>, styles: &TuiStyles) -> Vec<Line<'static>> {
    let mut meta = vec![Span::styled(
        format!("Line {}", header.line_number),
        styles.line_number,
    )];
    if let Some(file_type) = badge {
        meta.push(Span::raw(" "));
        meta.push(Span::styled(
            format!(" {} ", file_type.to_uppercase()),
            styles.badge,
        ));
    }
    vec![
        Line::from(vec![
            Span::styled(
                format!("{} - {}", header.file_name, header.file_path),
                styles.file_path,
            ),
        ]),
        Line::from(meta),
    ]
}

fn draw_detail(f: &mut Frame, state: &mut AppState, styles: &TuiStyles, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" File Context ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    match &mut state.detail {
        DetailState::Idle => {
            f.render_widget(
                Paragraph::new(Line::styled(
                    "Select a search result to view its context",
                    styles.info,
                )),
                inner,
            );
        }
        DetailState::Loading { header } => {
            let mut lines = header_lines(header, None, styles);
            lines.push(Line::default());
            lines.push(Line::styled("Loading file content...", styles.info));
            f.render_widget(Paragraph::new(Text::from(lines)), inner);
        }
        DetailState::Failed { header, message } => {
            let mut lines = header_lines(header, None, styles);
            lines.push(Line::default());
            lines.push(Line::styled(
                format!("Error loading file: {}", message),
                styles.error,
            ));
            f.render_widget(
                Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
                inner,
            );
        }
        DetailState::Loaded {
            header,
            file_type,
            body,
        } => {
            let header_text = header_lines(header, Some(file_type), styles);
            let header_height = header_text.len() as u16;
            let header_area = Rect {
                height: header_height.min(inner.height),
                ..inner
            };
            f.render_widget(Paragraph::new(Text::from(header_text)), header_area);

            let body_area = Rect {
                y: inner.y + header_height,
                height: inner.height.saturating_sub(header_height),
                ..inner
            };
            if body_area.height == 0 {
                return;
            }

            match body {
                DetailBody::Markdown { lines, scroll } => {
                    f.render_widget(
                        Paragraph::new(Text::from(lines.clone()))
                            .wrap(Wrap { trim: false })
                            .scroll((*scroll, 0)),
                        body_area,
                    );
                    state.layout.detail_inner = Some(body_area);
                    state.layout.gutter_width = 0;
                }
                DetailBody::Code(view) => {
                    let gutter_width = view
                        .raw
                        .iter()
                        .map(|l| l.line_number.to_string().len())
                        .max()
                        .unwrap_or(1) as u16
                        + 1;

                    // Center the matched line vertically on first draw.
                    let scroll = *view.scroll.get_or_insert_with(|| {
                        let match_index = view.match_index.unwrap_or(0) as u16;
                        match_index.saturating_sub(body_area.height / 2)
                    });

                    let lines: Vec<Line<'static>> = view
                        .raw
                        .iter()
                        .zip(view.lines.iter())
                        .enumerate()
                        .map(|(index, (raw, content))| {
                            let mut spans = vec![Span::styled(
                                format!(
                                    "{:>width$} ",
                                    raw.line_number,
                                    width = gutter_width as usize - 1
                                ),
                                styles.gutter,
                            )];
                            spans.extend(content.spans.iter().cloned());
                            if Some(index) == view.match_index {
                                spans = spans
                                    .into_iter()
                                    .map(|span| {
                                        let style = span.style.patch(styles.match_line);
                                        Span::styled(span.content, style)
                                    })
                                    .collect();
                            }
                            Line::from(spans)
                        })
                        .collect();

                    f.render_widget(
                        Paragraph::new(Text::from(lines)).scroll((scroll, 0)),
                        body_area,
                    );
                    state.layout.detail_inner = Some(body_area);
                    state.layout.gutter_width = gutter_width;
                }
            }
        }
    }
}

fn draw_hierarchy(f: &mut Frame, state: &mut AppState, styles: &TuiStyles) {
    let popup = centered_rect(f.size(), 70, 70);
    f.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Call Hierarchy (Esc to close) ");
    let inner = block.inner(popup);
    f.render_widget(block, popup);
    state.layout.hierarchy = Some(popup);

    match &mut state.hierarchy {
        HierarchyState::Closed => {}
        HierarchyState::Loading { function_name } => {
            let lines = vec![
                Line::styled(
                    function_name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Line::default(),
                Line::styled("Building recursive call hierarchy...", styles.info),
            ];
            f.render_widget(Paragraph::new(Text::from(lines)), inner);
        }
        HierarchyState::Empty { function_name } => {
            let lines = vec![
                Line::from(vec![
                    Span::raw("No callers found for function "),
                    Span::styled(
                        function_name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::default(),
                Line::styled(
                    "This function might be a main function, entry point, or not found in the current directory.",
                    styles.info,
                ),
            ];
            f.render_widget(
                Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
                inner,
            );
        }
        HierarchyState::Errored { message, .. } => {
            f.render_widget(
                Paragraph::new(Line::styled(
                    format!("Error loading call hierarchy: {}", message),
                    styles.error,
                ))
                .wrap(Wrap { trim: false }),
                inner,
            );
        }
        HierarchyState::Populated { view, offset } => {
            let data = &view.data;
            let head = vec![
                Line::from(vec![
                    Span::styled(
                        data.function_name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(" Target Function ", styles.badge),
                ]),
                Line::from(vec![Span::styled(
                    format!(
                        "{} is called by {} function{} ({} total references)",
                        data.function_name,
                        data.total_callers,
                        if data.total_callers == 1 { "" } else { "s" },
                        data.total_nodes(),
                    ),
                    styles.info,
                )]),
                Line::default(),
            ];
            let head_height = head.len() as u16;
            let head_area = Rect {
                height: head_height.min(inner.height),
                ..inner
            };
            f.render_widget(Paragraph::new(Text::from(head)), head_area);

            let rows_area = Rect {
                y: inner.y + head_height,
                height: inner.height.saturating_sub(head_height),
                ..inner
            };
            if rows_area.height == 0 {
                return;
            }
            state.layout.hierarchy_rows = Some(rows_area);

            let rows = view.visible_rows();
            let visible = rows_area.height as usize;
            if view.selected < *offset {
                *offset = view.selected;
            } else if view.selected >= *offset + visible {
                *offset = view.selected + 1 - visible;
            }

            let lines: Vec<Line<'static>> = rows
                .iter()
                .enumerate()
                .skip(*offset)
                .take(visible)
                .map(|(index, row)| {
                    let toggle = if row.has_children {
                        if row.expanded {
                            "▼ "
                        } else {
                            "▶ "
                        }
                    } else {
                        "  "
                    };
                    let mut spans = vec![
                        Span::raw("  ".repeat(row.depth)),
                        Span::raw(toggle.to_string()),
                        Span::styled(
                            row.caller_function.clone(),
                            if row.is_recursive {
                                styles.recursive
                            } else {
                                Style::default()
                            },
                        ),
                    ];
                    if row.is_recursive {
                        spans.push(Span::raw(" "));
                        spans.push(Span::styled(" RECURSIVE ", styles.recursive));
                    }
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(row.display_location(), styles.location));
                    if index == view.selected {
                        spans = spans
                            .into_iter()
                            .map(|span| Span::styled(span.content, styles.selected_row))
                            .collect();
                    }
                    Line::from(spans)
                })
                .collect();
            f.render_widget(Paragraph::new(Text::from(lines)), rows_area);
        }
    }
}

fn draw_menu(f: &mut Frame, state: &mut AppState, styles: &TuiStyles) {
    let Some(menu) = &state.menu else { return };
    let label = "Show call hierarchy";
    let width = (label.len() + 4) as u16;
    let height = 3u16;
    let frame_area = f.size();
    let x = menu.x.min(frame_area.width.saturating_sub(width));
    let y = menu.y.min(frame_area.height.saturating_sub(height));
    let area = Rect {
        x,
        y,
        width,
        height,
    };

    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let style = if menu.enabled {
        styles.menu_enabled
    } else {
        styles.menu_disabled
    };
    f.render_widget(Paragraph::new(Line::styled(label, style)), inner);
    state.layout.menu = Some(area);
}

fn draw_status(f: &mut Frame, state: &AppState, styles: &TuiStyles, area: Rect) {
    let hints = if state.hierarchy.is_open() {
        "↑↓ navigate | Space expand/collapse | Enter open location | Esc close"
    } else if state.menu.is_some() {
        "Enter show call hierarchy | Esc dismiss"
    } else {
        "Tab field | Enter full search | ↑↓ select result | right-click C/C++ identifier for call hierarchy | Esc quit"
    };
    f.render_widget(Paragraph::new(Line::styled(hints, styles.info)), area);
}

/// Centered popup rect sized as a percentage of the frame. Widened math:
/// width * percent overflows u16 on very wide terminals.
fn centered_rect(frame: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (u32::from(frame.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(frame.height) * u32::from(percent_y) / 100) as u16;
    Rect {
        x: frame.x + (frame.width.saturating_sub(width)) / 2,
        y: frame.y + (frame.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_is_case_insensitive() {
        let segments = highlight_segments("Todo and TODO and todo", "todo");
        let matches: Vec<&str> = segments
            .iter()
            .filter(|(_, m)| *m)
            .map(|(t, _)| t.as_str())
            .collect();
        assert_eq!(matches, vec!["Todo", "TODO", "todo"]);
    }

    #[test]
    fn test_highlight_treats_pattern_as_literal() {
        // `a.b` must match only the literal substring, not "any char".
        let segments = highlight_segments("axb a.b ayb", "a.b");
        let matches: Vec<&str> = segments
            .iter()
            .filter(|(_, m)| *m)
            .map(|(t, _)| t.as_str())
            .collect();
        assert_eq!(matches, vec!["a.b"]);
    }

    #[test]
    fn test_highlight_star_is_literal() {
        let segments = highlight_segments("x*y and xxy", "x*y");
        let matches: Vec<&str> = segments
            .iter()
            .filter(|(_, m)| *m)
            .map(|(t, _)| t.as_str())
            .collect();
        assert_eq!(matches, vec!["x*y"]);
    }

    #[test]
    fn test_highlight_segments_reassemble_content() {
        let content = "// TODO fix the TODO list";
        let segments = highlight_segments(content, "TODO");
        let rebuilt: String = segments.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(rebuilt, content);
    }

    #[test]
    fn test_empty_pattern_yields_single_segment() {
        assert_eq!(
            highlight_segments("anything", ""),
            vec![("anything".to_string(), false)]
        );
    }

    #[test]
    fn test_centered_rect() {
        let frame = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(frame, 70, 70);
        assert_eq!(popup.width, 70);
        assert_eq!(popup.height, 35);
        assert_eq!(popup.x, 15);
        assert_eq!(popup.y, 7);
    }

    #[test]
    fn test_centered_rect_on_very_wide_terminal() {
        // u16 width * percent must not overflow.
        let frame = Rect::new(0, 0, 2000, 50);
        let popup = centered_rect(frame, 70, 70);
        assert_eq!(popup.width, 1400);
        assert_eq!(popup.x, 300);
    }
}
