//! Markdown rendering for the detail view
//!
//! Converts markdown file context to styled terminal text. Fenced `mermaid`
//! blocks are post-processed into rendered diagram blocks in place; a
//! diagram that fails to render degrades to an inline error block showing
//! the raw source, and never aborts the rest of the document.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::highlight::CodeHighlighter;

pub struct MarkdownRenderer<'a> {
    highlighter: &'a CodeHighlighter,
}

impl<'a> MarkdownRenderer<'a> {
    pub fn new(highlighter: &'a CodeHighlighter) -> Self {
        Self { highlighter }
    }

    /// Render a markdown document to terminal lines.
    pub fn render(&self, markdown: &str) -> Vec<Line<'static>> {
        let mut out: Vec<Line<'static>> = Vec::new();
        let mut current: Vec<Span<'static>> = Vec::new();

        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_content = String::new();
        let mut list_depth: usize = 0;
        let mut heading_level: Option<usize> = None;
        let mut in_emphasis = false;
        let mut in_strong = false;

        let flush = |out: &mut Vec<Line<'static>>, current: &mut Vec<Span<'static>>| {
            if !current.is_empty() {
                out.push(Line::from(std::mem::take(current)));
            }
        };

        for event in Parser::new(markdown) {
            match event {
                Event::Start(tag) => match tag {
                    Tag::Heading(level, _, _) => {
                        flush(&mut out, &mut current);
                        out.push(Line::default());
                        heading_level = Some(level as usize);
                    }
                    Tag::Paragraph => {
                        flush(&mut out, &mut current);
                    }
                    Tag::List(_) => {
                        flush(&mut out, &mut current);
                        list_depth += 1;
                    }
                    Tag::Item => {
                        flush(&mut out, &mut current);
                        let indent = "  ".repeat(list_depth.saturating_sub(1));
                        current.push(Span::raw(format!("{}• ", indent)));
                    }
                    Tag::CodeBlock(kind) => {
                        flush(&mut out, &mut current);
                        in_code_block = true;
                        if let CodeBlockKind::Fenced(lang) = kind {
                            code_lang = lang.to_string();
                        }
                    }
                    Tag::Emphasis => in_emphasis = true,
                    Tag::Strong => in_strong = true,
                    Tag::Link(_, dest_url, _) => {
                        current.push(Span::styled(
                            dest_url.to_string(),
                            Style::default()
                                .fg(Color::Blue)
                                .add_modifier(Modifier::UNDERLINED),
                        ));
                    }
                    Tag::BlockQuote => {
                        flush(&mut out, &mut current);
                        current.push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                    }
                    _ => {}
                },
                Event::End(tag) => match tag {
                    Tag::Heading(_, _, _) => {
                        flush(&mut out, &mut current);
                        heading_level = None;
                    }
                    Tag::Paragraph => {
                        flush(&mut out, &mut current);
                        out.push(Line::default());
                    }
                    Tag::List(_) => {
                        flush(&mut out, &mut current);
                        list_depth = list_depth.saturating_sub(1);
                        if list_depth == 0 {
                            out.push(Line::default());
                        }
                    }
                    Tag::Item => {
                        flush(&mut out, &mut current);
                    }
                    Tag::CodeBlock(_) => {
                        if in_code_block {
                            out.extend(self.render_code_block(&code_lang, &code_content));
                            in_code_block = false;
                            code_lang.clear();
                            code_content.clear();
                        }
                    }
                    Tag::Emphasis => in_emphasis = false,
                    Tag::Strong => in_strong = false,
                    _ => {}
                },
                Event::Text(text) => {
                    if in_code_block {
                        code_content.push_str(&text);
                    } else {
                        current.push(styled_text(
                            text.to_string(),
                            heading_level,
                            in_emphasis,
                            in_strong,
                        ));
                    }
                }
                Event::Code(code) => {
                    current.push(Span::styled(
                        format!(" {} ", code),
                        Style::default().fg(Color::Yellow).bg(Color::DarkGray),
                    ));
                }
                Event::SoftBreak => {
                    if !in_code_block {
                        current.push(Span::raw(" "));
                    }
                }
                Event::HardBreak => {
                    flush(&mut out, &mut current);
                }
                Event::Rule => {
                    flush(&mut out, &mut current);
                    out.push(Line::styled(
                        "─".repeat(40),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                _ => {}
            }
        }
        flush(&mut out, &mut current);

        out
    }

    /// Fenced blocks: mermaid sources become rendered diagram blocks, any
    /// other language goes through the syntax highlighter.
    fn render_code_block(&self, lang: &str, code: &str) -> Vec<Line<'static>> {
        if lang == "mermaid" {
            return match render_mermaid(code) {
                Ok(lines) => lines,
                Err(err) => mermaid_error_block(&err, code),
            };
        }

        let lines: Vec<String> = code.lines().map(str::to_string).collect();
        let mut block = Vec::with_capacity(lines.len() + 2);
        block.push(border_line("┌", "┐", &lines));
        for line in self.highlighter.highlight_fenced(lang, &lines) {
            let mut spans = vec![Span::styled("│ ", Style::default().fg(Color::DarkGray))];
            spans.extend(line.spans);
            block.push(Line::from(spans));
        }
        block.push(border_line("└", "┘", &lines));
        block
    }
}

fn styled_text(
    text: String,
    heading_level: Option<usize>,
    in_emphasis: bool,
    in_strong: bool,
) -> Span<'static> {
    if let Some(level) = heading_level {
        let color = match level {
            1 => Color::LightBlue,
            2 => Color::LightGreen,
            3 => Color::LightYellow,
            _ => Color::LightMagenta,
        };
        return Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD));
    }
    if in_strong {
        return Span::styled(text, Style::default().add_modifier(Modifier::BOLD));
    }
    if in_emphasis {
        return Span::styled(text, Style::default().add_modifier(Modifier::ITALIC));
    }
    Span::raw(text)
}

fn border_line(left: &str, right: &str, lines: &[String]) -> Line<'static> {
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
    Line::styled(
        format!("{}{}{}", left, "─".repeat(width), right),
        Style::default().fg(Color::DarkGray),
    )
}

/// Diagram kinds the terminal renderer understands.
const DIAGRAM_KINDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "erDiagram",
    "gantt",
    "pie",
];

/// Render a mermaid source block to a bordered diagram block. Flowcharts
/// get their edges drawn as arrow lines; other known diagram kinds are
/// shown as a titled source block. Unknown or empty sources are errors so
/// the caller can fall back to the raw-source error block.
pub fn render_mermaid(source: &str) -> Result<Vec<Line<'static>>, String> {
    let mut lines = source.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines.next().ok_or_else(|| "empty diagram".to_string())?;
    let kind = header.split_whitespace().next().unwrap_or("");
    let kind = DIAGRAM_KINDS
        .iter()
        .find(|k| kind.starts_with(**k))
        .ok_or_else(|| format!("unsupported diagram type: {}", kind))?;

    let title_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut out = vec![Line::from(vec![
        Span::styled("◇ ", title_style),
        Span::styled(kind.to_string(), title_style),
    ])];

    if *kind == "graph" || *kind == "flowchart" {
        for line in lines {
            if let Some((from, to)) = parse_flowchart_edge(line) {
                out.push(Line::from(vec![
                    Span::styled("  ".to_string(), Style::default()),
                    Span::styled(from, Style::default().fg(Color::White)),
                    Span::styled(" ──▶ ", Style::default().fg(Color::Cyan)),
                    Span::styled(to, Style::default().fg(Color::White)),
                ]));
            } else {
                out.push(Line::styled(
                    format!("  {}", line),
                    Style::default().fg(Color::Gray),
                ));
            }
        }
    } else {
        for line in lines {
            out.push(Line::styled(
                format!("  {}", line),
                Style::default().fg(Color::Gray),
            ));
        }
    }

    Ok(out)
}

/// Pull `A --> B` out of a flowchart line, dropping node shape decorations
/// like `A[label]` or `B{cond}`.
fn parse_flowchart_edge(line: &str) -> Option<(String, String)> {
    let (from, to) = line.split_once("-->")?;
    let clean = |s: &str| {
        let s = s.trim();
        let end = s
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(s.len());
        s[..end].to_string()
    };
    let from = clean(from);
    let to = clean(to);
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from, to))
}

/// Inline error block shown in place of a diagram that failed to render.
fn mermaid_error_block(error: &str, source: &str) -> Vec<Line<'static>> {
    let error_style = Style::default().fg(Color::Red);
    let mut out = vec![
        Line::from(vec![
            Span::styled("Mermaid diagram error: ", error_style.add_modifier(Modifier::BOLD)),
            Span::styled(error.to_string(), error_style),
        ]),
        Line::styled("Diagram source:", Style::default().fg(Color::DarkGray)),
    ];
    for line in source.lines() {
        out.push(Line::styled(
            format!("  {}", line),
            Style::default().fg(Color::DarkGray),
        ));
    }
    out
}
