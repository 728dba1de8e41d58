//! Event loop
//!
//! Integrates three sources into one loop: user input from a crossterm
//! polling task, completion events from the request coordinator, and a
//! redraw tick. The tick also flushes the search debouncer and the
//! hierarchy jump that waits for the overlay to close.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::client::SearchClient;
use crate::coordinator::{AppEvent, RequestCoordinator, RequestKind};
use crate::highlight::CodeHighlighter;
use crate::identifier::{is_identifier, token_at_column};
use crate::tui::debouncer::{SearchDebouncer, DEBOUNCE_DELAY};
use crate::tui::input::InputOperation;
use crate::tui::renderer;
use crate::tui::state::{
    AppState, ContextMenu, DetailBody, DetailState, Focus, HierarchyState, ResultsView,
};
use crate::tui::{DetailSurface, TuiStyles};

const TICK: Duration = Duration::from_millis(33);
const INPUT_POLL: Duration = Duration::from_millis(10);
const IDLE_POLL: Duration = Duration::from_millis(5);

/// Delay between closing the hierarchy overlay and jumping to a caller
/// location, so the jump lands on a settled screen.
const JUMP_SETTLE: Duration = Duration::from_millis(100);

/// User input forwarded from the crossterm polling task.
#[derive(Debug)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_path: String,
    pub surface: DetailSurface,
    pub debounce: Duration,
    pub limit: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_path: ".".to_string(),
            surface: DetailSurface::Panel,
            debounce: DEBOUNCE_DELAY,
            limit: 50,
        }
    }
}

/// Caller location waiting out the settle delay before its context loads.
#[derive(Debug)]
struct PendingJump {
    file_path: String,
    line_number: u64,
    requested_at: Instant,
}

pub struct Engine {
    state: AppState,
    coordinator: RequestCoordinator,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    input_rx: mpsc::UnboundedReceiver<InputEvent>,
    debouncer: SearchDebouncer,
    highlighter: CodeHighlighter,
    styles: TuiStyles,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    limit: u64,
    pending_jump: Option<PendingJump>,
}

/// Forward crossterm events into a channel the select loop can await on.
fn spawn_input_task() -> mpsc::UnboundedReceiver<InputEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            if crossterm::event::poll(INPUT_POLL).unwrap_or(false) {
                match crossterm::event::read() {
                    Ok(event) => {
                        let input = match event {
                            CrosstermEvent::Key(key) => InputEvent::Key(key),
                            CrosstermEvent::Mouse(mouse) => InputEvent::Mouse(mouse),
                            CrosstermEvent::Resize(_, _) => InputEvent::Resize,
                            _ => continue,
                        };
                        if tx.send(input).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            tokio::time::sleep(IDLE_POLL).await;
        }
    });
    rx
}

fn hit(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// What a key does when no overlay is open.
#[derive(Debug, Clone, PartialEq)]
enum KeyAction {
    Quit,
    CloseDetail,
    ToggleFocus,
    FullSearch,
    SelectPrevious,
    SelectNext,
    Edit(InputOperation),
    None,
}

/// Base key mapping, outside menus and overlays. Enter only issues the
/// immediate full search from the pattern field; in the directory field it
/// is inert, matching the debounce-only trigger there.
fn base_key_action(key: &KeyEvent, focus: Focus, modal_detail_open: bool) -> KeyAction {
    match key.code {
        KeyCode::Esc if modal_detail_open => KeyAction::CloseDetail,
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Tab => KeyAction::ToggleFocus,
        KeyCode::Enter if focus == Focus::Pattern => KeyAction::FullSearch,
        KeyCode::Enter => KeyAction::None,
        KeyCode::Up => KeyAction::SelectPrevious,
        KeyCode::Down => KeyAction::SelectNext,
        _ => match editing_operation(key) {
            Some(operation) => KeyAction::Edit(operation),
            None => KeyAction::None,
        },
    }
}

/// Map a key event to a text editing operation, Emacs bindings included.
fn editing_operation(key: &KeyEvent) -> Option<InputOperation> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('a') => Some(InputOperation::MoveCursorToStart),
            KeyCode::Char('e') => Some(InputOperation::MoveCursorToEnd),
            KeyCode::Char('b') => Some(InputOperation::MoveCursorLeft),
            KeyCode::Char('f') => Some(InputOperation::MoveCursorRight),
            KeyCode::Char('d') => Some(InputOperation::DeleteCharForward),
            KeyCode::Char('h') => Some(InputOperation::DeleteCharBackward),
            KeyCode::Char('k') => Some(InputOperation::KillToEnd),
            KeyCode::Char('u') => Some(InputOperation::ClearLine),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(c) => Some(InputOperation::InsertChar(c)),
        KeyCode::Backspace => Some(InputOperation::DeleteCharBackward),
        KeyCode::Delete => Some(InputOperation::DeleteCharForward),
        KeyCode::Left => Some(InputOperation::MoveCursorLeft),
        KeyCode::Right => Some(InputOperation::MoveCursorRight),
        KeyCode::Home => Some(InputOperation::MoveCursorToStart),
        KeyCode::End => Some(InputOperation::MoveCursorToEnd),
        _ => None,
    }
}

impl Engine {
    pub fn new(client: SearchClient, config: EngineConfig) -> Result<Self> {
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        enable_raw_mode()?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let coordinator = RequestCoordinator::new(client, events_tx);
        let input_rx = spawn_input_task();

        Ok(Self {
            state: AppState::new(config.base_path, config.surface),
            coordinator,
            events_rx,
            input_rx,
            debouncer: SearchDebouncer::with_delay(config.debounce),
            highlighter: CodeHighlighter::new(),
            styles: TuiStyles::default(),
            terminal,
            limit: config.limit,
            pending_jump: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let outcome = self.event_loop().await;
        self.cleanup()?;
        outcome
    }

    async fn event_loop(&mut self) -> Result<()> {
        let mut tick = tokio::time::interval(TICK);
        loop {
            tokio::select! {
                biased;

                Some(input) = self.input_rx.recv() => {
                    match input {
                        InputEvent::Key(key) => self.handle_key(key),
                        InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
                        InputEvent::Resize => {}
                    }
                    if self.state.should_quit {
                        break;
                    }
                }

                Some(event) = self.events_rx.recv() => {
                    self.handle_app_event(event);
                }

                _ = tick.tick() => {
                    self.flush_debouncer();
                    self.flush_pending_jump();
                    self.render()?;
                }
            }
        }
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let state = &mut self.state;
        let styles = &self.styles;
        self.terminal.draw(|f| renderer::draw(f, state, styles))?;
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return;
        }

        if self.state.menu.is_some() {
            match key.code {
                KeyCode::Enter => self.activate_menu(),
                _ => self.state.close_menu(),
            }
            return;
        }
        if self.state.hierarchy.is_open() {
            self.handle_hierarchy_key(key);
            return;
        }

        let modal_detail_open = self.state.surface == DetailSurface::Modal
            && !matches!(self.state.detail, DetailState::Idle);
        match base_key_action(&key, self.state.focus, modal_detail_open) {
            KeyAction::CloseDetail => self.state.detail = DetailState::Idle,
            KeyAction::Quit => self.state.should_quit = true,
            KeyAction::ToggleFocus => self.state.toggle_focus(),
            KeyAction::FullSearch => self.trigger_full_search(),
            KeyAction::SelectPrevious => self.move_selection(false),
            KeyAction::SelectNext => self.move_selection(true),
            KeyAction::Edit(operation) => {
                let changed = self.state.focused_field_mut().apply(operation);
                if changed {
                    self.on_query_edited();
                }
            }
            KeyAction::None => {}
        }
    }

    fn handle_hierarchy_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.close_hierarchy(),
            KeyCode::Up | KeyCode::Down | KeyCode::Char(' ') | KeyCode::Enter => {
                let HierarchyState::Populated { view, .. } = &mut self.state.hierarchy else {
                    // Loading/Empty/Errored bodies only respond to Esc.
                    return;
                };
                match key.code {
                    KeyCode::Up => view.select_previous(),
                    KeyCode::Down => view.select_next(),
                    KeyCode::Char(' ') => view.toggle_selected(),
                    KeyCode::Enter => {
                        if let Some((file_path, line_number)) = view.selected_location() {
                            self.jump_to_caller(file_path, line_number);
                        }
                    }
                    _ => unreachable!(),
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.handle_left_click(x, y),
            MouseEventKind::Down(MouseButton::Right) => self.handle_right_click(x, y),
            MouseEventKind::ScrollUp => self.handle_scroll(x, y, false),
            MouseEventKind::ScrollDown => self.handle_scroll(x, y, true),
            _ => {}
        }
    }

    fn handle_left_click(&mut self, x: u16, y: u16) {
        if let Some(menu_rect) = self.state.layout.menu {
            if self.state.menu.is_some() {
                if hit(menu_rect, x, y) {
                    self.activate_menu();
                } else {
                    self.state.close_menu();
                }
                return;
            }
        }

        if self.state.hierarchy.is_open() {
            if let Some(rows_rect) = self.state.layout.hierarchy_rows {
                if hit(rows_rect, x, y) {
                    // Clicking the toggle glyph expands/collapses; clicking
                    // anywhere else on the row navigates to the caller.
                    let mut jump = None;
                    if let HierarchyState::Populated { view, offset } = &mut self.state.hierarchy {
                        let index = *offset + (y - rows_rect.y) as usize;
                        let column = (x - rows_rect.x) as usize;
                        match view.visible_rows().get(index) {
                            Some(row) if row.toggle_hit(column) => {
                                view.selected = index;
                                view.toggle_selected();
                            }
                            Some(row) => {
                                jump = Some((row.file_path.clone(), row.line_number));
                            }
                            None => {}
                        }
                    }
                    if let Some((file_path, line_number)) = jump {
                        self.jump_to_caller(file_path, line_number);
                    }
                    return;
                }
            }
            // Clicks outside the overlay close it, like Esc.
            if let Some(popup) = self.state.layout.hierarchy {
                if !hit(popup, x, y) {
                    self.state.close_hierarchy();
                }
            }
            return;
        }

        if hit(self.state.layout.path, x, y) {
            self.state.focus = Focus::Path;
            return;
        }
        if hit(self.state.layout.pattern, x, y) {
            self.state.focus = Focus::Pattern;
            return;
        }

        let results_rect = self.state.layout.results_inner;
        if hit(results_rect, x, y) {
            let offset = match &self.state.results {
                ResultsView::Loaded(loaded) => loaded.offset,
                _ => return,
            };
            let index = offset + (y - results_rect.y) as usize;
            if let Some(line) = self.state.select_result_at(index) {
                self.load_context_for(line.file_path, line.line_number);
            }
        }
    }

    /// Right-click on a code line opens the call-hierarchy context menu when
    /// the click lands on a token. The entry is enabled only for
    /// identifier-shaped tokens in files that support hierarchy lookup.
    fn handle_right_click(&mut self, x: u16, y: u16) {
        if self.state.hierarchy.is_open() || self.state.menu.is_some() {
            return;
        }
        let Some(detail_rect) = self.state.layout.detail_inner else {
            return;
        };
        if !hit(detail_rect, x, y) {
            return;
        }
        let DetailState::Loaded {
            body: DetailBody::Code(view),
            ..
        } = &self.state.detail
        else {
            return;
        };
        if !view.hierarchy_armed {
            return;
        }

        let scroll = view.scroll.unwrap_or(0) as usize;
        let row = scroll + (y - detail_rect.y) as usize;
        let Some(line) = view.raw.get(row) else {
            return;
        };
        let column = (x - detail_rect.x).saturating_sub(self.state.layout.gutter_width) as usize;
        let Some(token) = token_at_column(&line.content, column) else {
            return;
        };
        let enabled = is_identifier(&token);
        self.state.menu = Some(ContextMenu {
            x,
            y,
            token,
            enabled,
        });
    }

    fn handle_scroll(&mut self, x: u16, y: u16, down: bool) {
        if self.state.hierarchy.is_open() {
            if let HierarchyState::Populated { view, .. } = &mut self.state.hierarchy {
                if down {
                    view.select_next();
                } else {
                    view.select_previous();
                }
            }
            return;
        }

        if let Some(detail_rect) = self.state.layout.detail_inner {
            if hit(detail_rect, x, y) {
                self.state.scroll_detail(down);
                return;
            }
        }

        if hit(self.state.layout.results_inner, x, y) {
            if let ResultsView::Loaded(loaded) = &mut self.state.results {
                if down {
                    loaded.offset = (loaded.offset + 1).min(loaded.rows.len().saturating_sub(1));
                } else {
                    loaded.offset = loaded.offset.saturating_sub(1);
                }
            }
        }
    }

    /// Menu activation: kick off the call hierarchy lookup for the clicked
    /// token. Requires the directory field to be set.
    fn activate_menu(&mut self) {
        let Some(menu) = self.state.menu.take() else {
            return;
        };
        if !menu.enabled {
            return;
        }
        if self.state.path.is_empty() {
            self.state.hierarchy = HierarchyState::Errored {
                function_name: menu.token,
                message: "Please set a directory path first".to_string(),
            };
            return;
        }
        self.state.begin_hierarchy_load(&menu.token);
        self.coordinator
            .load_hierarchy(menu.token, self.state.path.text.clone());
    }

    /// Any edit reschedules the quick search; emptying either field cancels
    /// everything in flight and clears the views.
    fn on_query_edited(&mut self) {
        match self.state.query() {
            Some((path, pattern)) => {
                self.debouncer.schedule(path, pattern);
            }
            None => {
                self.debouncer.cancel();
                self.coordinator.cancel_search();
                self.state.clear_search_views();
            }
        }
    }

    /// Enter: skip the debounce window and run the uncapped search.
    fn trigger_full_search(&mut self) {
        self.debouncer.cancel();
        if let Some((path, pattern)) = self.state.query() {
            self.state.begin_search();
            self.coordinator.start_search(path, pattern, true, self.limit);
        }
    }

    fn flush_debouncer(&mut self) {
        if let Some(pending) = self.debouncer.poll_ready() {
            self.state.begin_search();
            self.coordinator
                .start_search(pending.path, pending.pattern, false, self.limit);
        }
    }

    fn flush_pending_jump(&mut self) {
        let ready = self
            .pending_jump
            .as_ref()
            .is_some_and(|jump| jump.requested_at.elapsed() >= JUMP_SETTLE);
        if ready {
            if let Some(jump) = self.pending_jump.take() {
                self.load_context_for(jump.file_path, jump.line_number);
            }
        }
    }

    fn move_selection(&mut self, forward: bool) {
        if let Some(line) = self.state.select_result(forward) {
            self.load_context_for(line.file_path, line.line_number);
        }
    }

    fn load_context_for(&mut self, file_path: String, line_number: u64) {
        self.state.begin_context_load(&file_path, line_number);
        self.coordinator
            .load_context(file_path, line_number, self.state.path.text.clone());
    }

    fn jump_to_caller(&mut self, file_path: String, line_number: u64) {
        self.state.close_hierarchy();
        self.state.begin_context_load(&file_path, line_number);
        self.pending_jump = Some(PendingJump {
            file_path,
            line_number,
            requested_at: Instant::now(),
        });
    }

    /// Apply a completion event unless its request has been superseded.
    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchFinished {
                generation,
                full,
                pattern,
                result,
            } => {
                if !self.coordinator.is_current(RequestKind::Search, generation) {
                    log::debug!("discarding stale search gen {}", generation);
                    return;
                }
                self.state.apply_search(full, pattern, self.limit, result);
            }
            AppEvent::ContextLoaded {
                generation,
                file_path,
                line_number,
                result,
            } => {
                if !self.coordinator.is_current(RequestKind::Context, generation) {
                    log::debug!("discarding stale context gen {}", generation);
                    return;
                }
                self.state
                    .apply_context(&file_path, line_number, result, &self.highlighter);
            }
            AppEvent::HierarchyLoaded {
                generation,
                function_name,
                result,
            } => {
                if !self
                    .coordinator
                    .is_current(RequestKind::Hierarchy, generation)
                {
                    log::debug!("discarding stale hierarchy gen {}", generation);
                    return;
                }
                // The overlay may have been closed while the request ran.
                if self.state.hierarchy.is_open() {
                    self.state.apply_hierarchy(&function_name, result);
                }
            }
        }
    }
}
