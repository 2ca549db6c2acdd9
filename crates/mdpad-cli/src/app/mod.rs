pub mod action;
pub mod bus;
pub mod clipboard;
pub mod input;
pub mod state;
pub mod update;

use std::hash::{Hash, Hasher};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use mdpad_core::{
    Breakpoints, ChosenPathSaver, DeviceClass, DownloadSink, EditingSurface, EditorBuffer,
    ExportOutcome, ImageLibrary, InsertPath, InsertionCoordinator, LayoutController,
    NativeSaver, PersistentStore, PreviewLine, Session, ToolbarAction, UserAgentProbe, Viewport,
    derive_filename, export, image_markdown, is_image_path, read_text_file, render_preview,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};

use crate::ui::help;
use crate::ui::layout::{ScreenLayout, compute_screen_layout};
use crate::ui::render::{compose_status, styled_preview_line, truncate_middle};
use crate::ui::theme::{ThemeTokens, build_theme};
use crate::ui::toolbar::{self, ToolbarButton};
use action::Action;
use bus::{CommandBus, Dispatcher};
use state::{Prompt, PromptKind, UiState};
pub use state::{PaneFocus, ThemeChoice};

const SCROLL_STEP_LINES: usize = 3;
const MOBILE_NOTICE: &str = "Narrow screen: single pane, Shift+Tab switches editor and preview";

/// Everything the app needs from the outside world.
pub struct AppOptions {
    pub store: Box<dyn PersistentStore>,
    pub downloads: Box<dyn DownloadSink>,
    /// Ask for a destination before saving instead of dropping the file
    /// into the downloads directory.
    pub native_save: bool,
    pub user_agent: String,
    pub perf_mode: bool,
}

pub struct App {
    session: Session,
    editor: EditorBuffer,
    insertion: InsertionCoordinator,
    layout: LayoutController,
    probe: UserAgentProbe,
    device: DeviceClass,
    images: ImageLibrary,
    images_revision: u64,
    downloads: Box<dyn DownloadSink>,
    native_save: bool,
    bus: CommandBus,
    dispatcher: Dispatcher,
    ui: UiState,
    status: String,
    perf_mode: bool,
    interactive_input: bool,
    mobile_notice_shown: bool,
    screen: Option<ScreenLayout>,
    buttons: Vec<ToolbarButton>,
    editor_scroll: usize,
    preview_scroll: usize,
    editor_height: usize,
    preview_height: usize,
    preview_width: u16,
    draw_time_us: u128,
    preview_cache: Option<PreviewCache>,
    clipboard: fn(&str) -> io::Result<()>,
    #[cfg(test)]
    test_inputs: Option<std::collections::VecDeque<InputEvent>>,
    #[cfg(test)]
    test_input_error: Option<io::Error>,
    #[cfg(test)]
    test_draw_error: Option<io::Error>,
}

#[derive(Clone)]
struct PreviewCache {
    key: u64,
    lines: Arc<Vec<PreviewLine>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    Resize(u16, u16),
}

impl App {
    pub fn new(options: AppOptions, viewport: Viewport) -> Self {
        let breakpoints = Breakpoints::terminal();
        let probe = UserAgentProbe::new(options.user_agent);
        let layout = LayoutController::new(Box::new(probe.clone()), breakpoints, viewport);
        let device = probe.classify(viewport, &breakpoints);
        let session = Session::open(options.store);
        let editor = EditorBuffer::new(session.content().to_string());
        let bus = CommandBus::new();
        let dispatcher = bus.dispatcher();
        tracing::info!(?device, width = viewport.width, "starting editor");

        let mut app = Self {
            session,
            editor,
            insertion: InsertionCoordinator::new(),
            layout,
            probe,
            device,
            images: ImageLibrary::new(),
            images_revision: 0,
            downloads: options.downloads,
            native_save: options.native_save,
            bus,
            dispatcher,
            ui: UiState::default(),
            status: "Ready".into(),
            perf_mode: options.perf_mode,
            interactive_input: io::stdin().is_terminal(),
            mobile_notice_shown: false,
            screen: None,
            buttons: Vec::new(),
            editor_scroll: 0,
            preview_scroll: 0,
            editor_height: 1,
            preview_height: 1,
            preview_width: 80,
            draw_time_us: 0,
            preview_cache: None,
            clipboard: clipboard::copy_to_clipboard,
            #[cfg(test)]
            test_inputs: None,
            #[cfg(test)]
            test_input_error: None,
            #[cfg(test)]
            test_draw_error: None,
        };
        app.report_cursor();
        app.check_mobile_notice();
        app
    }

    pub fn set_theme(&mut self, theme: ThemeChoice) {
        let focus = self.ui.focus;
        let no_color = self.ui.no_color;
        update::apply_ui_action(
            &mut self.ui,
            &Action::ApplyPrefs {
                focus,
                theme,
                no_color,
            },
        );
    }

    pub fn set_no_color(&mut self, no_color: bool) {
        let focus = self.ui.focus;
        let theme = self.ui.theme;
        update::apply_ui_action(
            &mut self.ui,
            &Action::ApplyPrefs {
                focus,
                theme,
                no_color,
            },
        );
    }

    pub fn set_initial_focus(&mut self, focus: PaneFocus) {
        let theme = self.ui.theme;
        let no_color = self.ui.no_color;
        update::apply_ui_action(
            &mut self.ui,
            &Action::ApplyPrefs {
                focus,
                theme,
                no_color,
            },
        );
    }

    /// Queues an import of `path`; it runs before the first frame.
    pub fn open_on_start(&self, path: PathBuf) {
        self.dispatcher.send(Action::Import(path));
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        if self.interactive_input {
            stdout.execute(EnableMouseCapture)?;
            stdout.execute(EnableBracketedPaste)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        toggle_raw_mode(self.interactive_input, enable_raw_mode)?;

        let loop_result = self.run_loop(&mut terminal);

        toggle_raw_mode(self.interactive_input, disable_raw_mode)?;
        if self.interactive_input {
            terminal.backend_mut().execute(DisableBracketedPaste)?;
            terminal.backend_mut().execute(DisableMouseCapture)?;
        }
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        loop_result
    }

    fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut running = true;
        self.process_actions(&mut running);

        while running {
            let started = Instant::now();
            #[cfg(test)]
            if let Some(err) = self.test_draw_error.take() {
                return Err(err.into());
            }
            terminal.draw(|frame| self.draw(frame))?;
            self.draw_time_us = started.elapsed().as_micros();

            if !self.interactive_input {
                running = false;
            }

            if self.interactive_input
                && let Some(input_event) = self.next_input_event()?
            {
                self.handle_input(input_event, &mut running);
            }
        }

        tracing::info!(history = self.session.history().len(), "editor closed");
        Ok(())
    }

    fn next_input_event(&mut self) -> Result<Option<InputEvent>> {
        #[cfg(test)]
        {
            if let Some(err) = self.test_input_error.take() {
                return Err(err.into());
            }
            if let Some(queue) = self.test_inputs.as_mut() {
                return match queue.pop_front() {
                    Some(input) => Ok(Some(input)),
                    None => Err(io::Error::other("input queue drained").into()),
                };
            }
        }
        next_terminal_input(event::poll, event::read)
    }

    fn handle_input(&mut self, input: InputEvent, running: &mut bool) {
        match input {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(mouse) => {
                if let Some(screen) = self.screen
                    && let Some(action) =
                        input::map_mouse(mouse, &screen, &self.buttons, self.layout.is_dragging())
                {
                    self.dispatcher.send(action);
                }
            }
            InputEvent::Paste(text) => self
                .dispatcher
                .send(input::classify_paste(&text, Path::is_file)),
            InputEvent::Resize(width, height) => {
                self.dispatcher.send(Action::Resize(width, height));
            }
        }
        self.process_actions(running);
    }

    fn process_actions(&mut self, running: &mut bool) {
        while let Some(action) = self.bus.try_next() {
            self.apply(action, running);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.ui.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }

        if let Some(action) = input::map_global_key(key) {
            self.dispatcher.send(action);
            return;
        }

        if self.ui.help_open {
            return;
        }

        if self.ui.menu_open {
            if let (KeyCode::Char(digit), KeyModifiers::NONE) = (key.code, key.modifiers)
                && let Some(action) = ToolbarAction::from_shortcut_digit(digit)
            {
                self.dispatcher.send(Action::Insert(action));
            }
            return;
        }

        if self.ui.focus == PaneFocus::Preview {
            self.handle_preview_key(key);
        } else {
            self.handle_editor_key(key);
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(kind) = self.ui.prompt.as_ref().map(|prompt| prompt.kind) else {
            return;
        };

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                self.ui.prompt = None;
                self.dispatcher.send(Action::Quit);
            }
            (KeyCode::Esc, _) => {
                self.ui.prompt = None;
                self.cancel_prompt(kind);
            }
            (KeyCode::Char('y' | 'Y'), _) if kind == PromptKind::ConfirmClear => {
                self.ui.prompt = None;
                self.dispatcher.send(Action::ConfirmClear(true));
            }
            (KeyCode::Char('n' | 'N'), _) if kind == PromptKind::ConfirmClear => {
                self.ui.prompt = None;
                self.dispatcher.send(Action::ConfirmClear(false));
            }
            (KeyCode::Enter, _) if kind.takes_text() => self.submit_prompt(kind),
            (KeyCode::Backspace, _) => {
                if let Some(prompt) = self.ui.prompt.as_mut() {
                    prompt.input.pop();
                }
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) if kind.takes_text() => {
                if let Some(prompt) = self.ui.prompt.as_mut() {
                    prompt.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind) {
        let input = self
            .ui
            .prompt
            .as_ref()
            .map(|prompt| prompt.input.trim().to_string())
            .unwrap_or_default();
        if input.is_empty() {
            self.status = format!("{}: enter a path", kind.title());
            return;
        }

        self.ui.prompt = None;
        let path = expand_home(&input, std::env::var_os("HOME").map(PathBuf::from));
        let action = match kind {
            PromptKind::SaveAs => Action::Export(Some(path)),
            PromptKind::Import => Action::Import(path),
            PromptKind::AttachImage => Action::AttachImage(path),
            PromptKind::ConfirmClear => return,
        };
        self.dispatcher.send(action);
    }

    fn cancel_prompt(&mut self, kind: PromptKind) {
        match kind {
            PromptKind::SaveAs => self.dispatcher.send(Action::Export(None)),
            PromptKind::ConfirmClear => self.dispatcher.send(Action::ConfirmClear(false)),
            PromptKind::Import | PromptKind::AttachImage => {
                self.status = format!("{} cancelled", kind.title());
            }
        }
    }

    fn handle_preview_key(&mut self, key: KeyEvent) {
        let page = self.preview_height.max(1);
        match key.code {
            KeyCode::Up => self.scroll_preview_by(-1),
            KeyCode::Down => self.scroll_preview_by(1),
            KeyCode::PageUp => self.scroll_preview_by(-(page as isize)),
            KeyCode::PageDown => self.scroll_preview_by(page as isize),
            KeyCode::Home => self.preview_scroll = 0,
            KeyCode::End => self.scroll_preview_by(isize::MAX / 2),
            KeyCode::Char(_) | KeyCode::Enter | KeyCode::Backspace => {
                self.status = "Preview is read-only | Shift+Tab to edit".into();
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let mut edited = false;

        match (key.code, key.modifiers) {
            (KeyCode::Char('a'), KeyModifiers::CONTROL) => self.editor.select_all(),
            (KeyCode::Left, _) => self.editor.move_left(shift),
            (KeyCode::Right, _) => self.editor.move_right(shift),
            (KeyCode::Up, _) => self.editor.move_up(shift),
            (KeyCode::Down, _) => self.editor.move_down(shift),
            (KeyCode::Home, _) => self.editor.move_line_start(shift),
            (KeyCode::End, _) => self.editor.move_line_end(shift),
            (KeyCode::PageUp, _) => {
                for _ in 0..self.editor_height.max(1) {
                    self.editor.move_up(shift);
                }
            }
            (KeyCode::PageDown, _) => {
                for _ in 0..self.editor_height.max(1) {
                    self.editor.move_down(shift);
                }
            }
            (KeyCode::Enter, _) => {
                self.editor.insert_newline();
                edited = true;
            }
            (KeyCode::Backspace, _) => {
                self.editor.backspace();
                edited = true;
            }
            (KeyCode::Delete, _) => {
                self.editor.delete_forward();
                edited = true;
            }
            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.editor.insert_str("  ");
                edited = true;
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.editor.insert_char(c);
                edited = true;
            }
            _ => {}
        }

        if edited {
            self.commit_edit();
        } else {
            self.report_cursor();
        }
        self.ensure_cursor_visible();
    }

    fn apply(&mut self, action: Action, running: &mut bool) {
        tracing::trace!(?action, "apply");
        if update::apply_ui_action(&mut self.ui, &action) {
            self.after_ui_action(&action);
            return;
        }

        match action {
            Action::Quit => *running = false,
            Action::Undo => {
                if self.session.undo() {
                    self.sync_editor_from_session();
                    self.status = "Undo".into();
                } else {
                    self.status = "Nothing to undo".into();
                }
            }
            Action::Redo => {
                if self.session.redo() {
                    self.sync_editor_from_session();
                    self.status = "Redo".into();
                } else {
                    self.status = "Nothing to redo".into();
                }
            }
            Action::RequestClear => {
                self.dispatcher
                    .send(Action::OpenPrompt(Prompt::new(PromptKind::ConfirmClear)));
            }
            Action::ConfirmClear(true) => {
                self.session.clear();
                self.sync_editor_from_session();
                self.editor_scroll = 0;
                self.preview_scroll = 0;
                self.status = "Document cleared".into();
            }
            Action::ConfirmClear(false) => self.status = "Clear cancelled".into(),
            Action::Copy => match (self.clipboard)(self.session.content()) {
                Ok(()) => self.status = "Copied document to clipboard".into(),
                Err(err) => {
                    tracing::warn!(%err, "clipboard copy failed");
                    self.status = format!("Clipboard unavailable: {err}");
                }
            },
            Action::Insert(toolbar_action) => {
                self.ui.menu_open = false;
                self.insert_text(toolbar_action.template());
                self.status = format!("Inserted {}", toolbar_action.label());
            }
            Action::RequestExport => {
                if self.native_save {
                    let suggested = derive_filename(self.session.content());
                    self.dispatcher.send(Action::OpenPrompt(Prompt::with_input(
                        PromptKind::SaveAs,
                        suggested,
                    )));
                } else {
                    self.export_document(None);
                }
            }
            Action::Export(choice) => {
                let mut saver = ChosenPathSaver::new(choice);
                self.export_document(Some(&mut saver));
            }
            Action::Import(path) => self.import_path(&path),
            Action::DropFile(path) => {
                if is_image_path(&path) {
                    self.attach_image(&path);
                } else {
                    self.import_path(&path);
                }
            }
            Action::AttachImage(path) => self.attach_image(&path),
            Action::Paste(text) => {
                if self.editor_visible() {
                    self.editor.insert_str(&text);
                    self.commit_edit();
                    self.ensure_cursor_visible();
                    self.status = format!("Pasted {} chars", text.chars().count());
                } else {
                    self.status = "Switch to the editor to paste".into();
                }
            }
            Action::BeginDrag => {
                if self.layout.begin_drag() {
                    self.status = "Resizing panes".into();
                }
            }
            Action::DragTo(column) => {
                if let Some(screen) = self.screen {
                    self.layout.drag_to(f64::from(column), screen.content_span());
                }
            }
            Action::EndDrag => {
                self.layout.end_drag();
                self.status = format!("Split {:.0}%", self.layout.split_ratio());
            }
            Action::Scroll(direction) => self.scroll_active_viewport(direction),
            Action::Resize(width, height) => self.on_resize(width, height),
            Action::ToggleFocus
            | Action::FocusPane(_)
            | Action::ToggleHelp
            | Action::ToggleMenu
            | Action::CloseOverlays
            | Action::OpenPrompt(_)
            | Action::ApplyPrefs { .. } => {}
        }
    }

    fn after_ui_action(&mut self, action: &Action) {
        match action {
            Action::ToggleFocus | Action::FocusPane(_) => {
                self.status = match self.ui.focus {
                    PaneFocus::Editor => "Mode: editor".into(),
                    PaneFocus::Preview => "Mode: preview".into(),
                };
            }
            Action::ToggleHelp => {
                self.status = if self.ui.help_open {
                    "Help opened".into()
                } else {
                    "Help closed".into()
                };
            }
            Action::ToggleMenu => {
                self.status = if self.ui.menu_open {
                    "Menu opened".into()
                } else {
                    "Menu closed".into()
                };
            }
            Action::OpenPrompt(prompt) => self.status = prompt_status(prompt.kind).into(),
            _ => {}
        }
    }

    fn editor_visible(&self) -> bool {
        !self.layout.state().is_mobile || self.ui.focus == PaneFocus::Editor
    }

    fn commit_edit(&mut self) {
        self.session.apply(self.editor.text().to_string());
        self.report_cursor();
    }

    fn report_cursor(&mut self) {
        if let Some(position) = self.editor.position() {
            self.insertion.on_cursor_change(position);
        }
    }

    fn sync_editor_from_session(&mut self) {
        self.editor.set_text(self.session.content().to_string());
        self.report_cursor();
        self.ensure_cursor_visible();
    }

    fn insert_text(&mut self, text: &str) -> InsertPath {
        let path = if self.editor_visible() {
            self.insertion.insert(
                &mut self.session,
                Some(&mut self.editor as &mut dyn EditingSurface),
                text,
            )
        } else {
            self.insertion.insert(&mut self.session, None, text)
        };

        if self.editor.text() != self.session.content() {
            self.editor.set_text(self.session.content().to_string());
        }
        match path {
            InsertPath::Surface => self.report_cursor(),
            InsertPath::Cursor => {
                if let Some(at) = self.insertion.last_cursor() {
                    self.editor.move_to_line_col(
                        at.line_number.saturating_sub(1),
                        at.column.saturating_sub(1),
                    );
                }
            }
            InsertPath::End => {}
        }
        self.ensure_cursor_visible();
        path
    }

    fn export_document(&mut self, native: Option<&mut dyn NativeSaver>) {
        let text = self.session.content().to_string();
        self.status = match export(&text, native, self.downloads.as_mut()) {
            Ok(ExportOutcome::Saved(path)) => format!("Saved {}", path.display()),
            Ok(ExportOutcome::Downloaded(path)) => format!("Downloaded {}", path.display()),
            Ok(ExportOutcome::Cancelled) => "Save cancelled".into(),
            Err(err) => {
                tracing::error!(%err, "export failed");
                format!("Export error: {err}")
            }
        };
    }

    fn import_path(&mut self, path: &Path) {
        match read_text_file(path) {
            Ok(text) => {
                self.session.import(text);
                self.editor = EditorBuffer::new(self.session.content().to_string());
                self.report_cursor();
                self.editor_scroll = 0;
                self.preview_scroll = 0;
                self.status = format!("Opened {}", path.display());
            }
            Err(err) => {
                tracing::warn!(%err, "import failed");
                self.status = format!("Open error: {err}");
            }
        }
    }

    fn attach_image(&mut self, path: &Path) {
        match self.images.attach_file(path) {
            Ok(name) => {
                self.images_revision += 1;
                self.insert_text(&image_markdown(&name));
                self.status = format!("Attached image {name}");
            }
            Err(err) => {
                tracing::warn!(%err, "image attach failed");
                self.status = format!("Image error: {err}");
            }
        }
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        let viewport = Viewport::new(u32::from(width), u32::from(height));
        let state = self.layout.on_resize(viewport);
        self.device = self.probe.classify(viewport, self.layout.breakpoints());
        if state.is_mobile {
            self.layout.end_drag();
        }
        self.check_mobile_notice();
    }

    fn check_mobile_notice(&mut self) {
        if self.layout.state().is_mobile && !self.mobile_notice_shown {
            self.mobile_notice_shown = true;
            self.status = MOBILE_NOTICE.into();
        }
    }

    fn ensure_cursor_visible(&mut self) {
        let (cursor_line, _) = self.editor.line_col_at_cursor();
        if cursor_line < self.editor_scroll {
            self.editor_scroll = cursor_line;
        } else if cursor_line >= self.editor_scroll + self.editor_height {
            self.editor_scroll = cursor_line.saturating_sub(self.editor_height.saturating_sub(1));
        }
    }

    fn scroll_active_viewport(&mut self, direction: i8) {
        let amount = SCROLL_STEP_LINES;
        if self.ui.focus == PaneFocus::Editor && self.editor_visible() {
            let total = line_count(self.editor.text());
            if direction < 0 {
                self.editor_scroll = self.editor_scroll.saturating_sub(amount);
            } else {
                self.editor_scroll = self.editor_scroll.saturating_add(amount);
            }
            self.editor_scroll = clamp_scroll(self.editor_scroll, total, self.editor_height.max(1));
            return;
        }

        let step = amount as isize;
        self.scroll_preview_by(if direction < 0 { -step } else { step });
    }

    fn scroll_preview_by(&mut self, delta: isize) {
        let lines = self.preview_lines_cached(self.preview_width);
        self.preview_scroll = self.preview_scroll.saturating_add_signed(delta);
        self.preview_scroll = clamp_scroll(
            self.preview_scroll,
            lines.len(),
            self.preview_height.max(1),
        );
    }

    fn preview_cache_key(&self, preview_width: u16) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        preview_width.hash(&mut hasher);
        self.images_revision.hash(&mut hasher);
        self.session.content().hash(&mut hasher);
        hasher.finish()
    }

    fn preview_lines_cached(&mut self, preview_width: u16) -> Arc<Vec<PreviewLine>> {
        let key = self.preview_cache_key(preview_width);
        if let Some(cache) = &self.preview_cache
            && cache.key == key
        {
            return Arc::clone(&cache.lines);
        }

        let lines = Arc::new(render_preview(
            self.session.content(),
            preview_width,
            &self.images,
        ));
        self.preview_cache = Some(PreviewCache {
            key,
            lines: Arc::clone(&lines),
        });
        lines
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        if Viewport::new(u32::from(area.width), u32::from(area.height)) != self.layout.viewport() {
            self.on_resize(area.width, area.height);
        }
        let theme = build_theme(self.ui.theme, self.ui.no_color);
        let state = self.layout.state();
        let screen = compute_screen_layout(area, state, self.ui.focus, self.layout.split_ratio());
        self.screen = Some(screen);

        let info = self.info_line(screen.top_bar.width as usize);
        frame.render_widget(Paragraph::new(info).style(theme.top_bar), screen.top_bar);

        let mut buttons = toolbar::toolbar_buttons(screen.toolbar, state);
        frame.render_widget(
            Paragraph::new(toolbar_line(&buttons, state.use_compact_menu, &theme))
                .style(theme.toolbar),
            screen.toolbar,
        );

        if screen.editor_visible() {
            self.draw_editor(frame, screen.editor, &theme);
        }

        if screen.divider.width > 0 && screen.divider.height > 0 {
            let style = if self.layout.is_dragging() {
                theme.divider_active
            } else {
                theme.divider
            };
            let bar = vec![Line::from("│"); screen.divider.height as usize];
            frame.render_widget(Paragraph::new(bar).style(style), screen.divider);
        }

        if screen.preview.width > 0 && screen.preview.height > 0 {
            self.draw_preview(frame, screen.preview, &theme);
        }

        let base = status_line(
            &self.status,
            self.perf_mode,
            self.draw_time_us,
            self.session.history().len(),
        );
        let status = compose_status(&base, &self.status_hint(), screen.status.width as usize);
        frame.render_widget(
            Paragraph::new(status).style(status_style(&theme, &self.status)),
            screen.status,
        );

        if self.ui.menu_open {
            let menu = toolbar::menu_area(screen.content, state);
            let items = toolbar::menu_buttons(menu, state);
            frame.render_widget(Clear, menu);
            let lines: Vec<Line<'static>> = items
                .iter()
                .map(|item| Line::from(Span::styled(item.label.clone(), theme.toolbar_button)))
                .collect();
            frame.render_widget(
                Paragraph::new(lines).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Insert")
                        .border_style(theme.pane_focus),
                ),
                menu,
            );
            buttons.extend(items);
        }
        self.buttons = buttons;

        if self.ui.help_open {
            let popup = centered_popup(70, help::help_lines().len() as u16 + 2, screen.content);
            frame.render_widget(Clear, popup);
            let help_widget = Paragraph::new(help::help_text()).style(theme.help).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Help")
                    .border_style(theme.pane_focus),
            );
            frame.render_widget(help_widget, popup);
        }

        if let Some(prompt) = &self.ui.prompt {
            let popup = centered_popup(60, 3, screen.content);
            frame.render_widget(Clear, popup);
            let body = if prompt.kind.takes_text() {
                prompt.input.clone()
            } else {
                "Clear all content? (y/n)".to_string()
            };
            frame.render_widget(
                Paragraph::new(body).style(theme.prompt).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(prompt.kind.title())
                        .border_style(theme.pane_focus),
                ),
                popup,
            );
            if prompt.kind.takes_text() {
                let inner = cursor_rect(popup);
                let typed = u16::try_from(prompt.input.chars().count()).unwrap_or(u16::MAX);
                let x = inner
                    .x
                    .saturating_add(typed)
                    .min(inner.x + inner.width.saturating_sub(1));
                frame.set_cursor_position((x, inner.y));
            }
            return;
        }

        if !self.ui.overlay_open()
            && self.ui.focus == PaneFocus::Editor
            && screen.editor_visible()
        {
            let cursor = cursor_rect(screen.editor);
            let (line, col) = self.editor.line_col_at_cursor();
            let visible_line =
                u16::try_from(line.saturating_sub(self.editor_scroll)).unwrap_or(u16::MAX);
            if visible_line < cursor.height {
                let col = u16::try_from(col).unwrap_or(u16::MAX);
                let x = cursor
                    .x
                    .saturating_add(col)
                    .min(cursor.x + cursor.width.saturating_sub(1));
                let y = cursor.y + visible_line;
                frame.set_cursor_position((x, y));
            }
        }
    }

    fn draw_editor(&mut self, frame: &mut Frame<'_>, area: Rect, theme: &ThemeTokens) {
        self.editor_height = area.height.saturating_sub(2).max(1) as usize;
        let total = line_count(self.editor.text());
        self.ensure_cursor_visible();
        self.editor_scroll = clamp_scroll(self.editor_scroll, total, self.editor_height);

        let lines = editor_lines(
            self.editor.text(),
            self.editor.selection_bounds(),
            self.editor_scroll,
            self.editor_height,
            theme.selection,
        );
        let title = if self.session.can_redo() {
            "Editor [redo available]"
        } else {
            "Editor"
        };
        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(pane_border_style(theme, self.ui.focus == PaneFocus::Editor)),
        );
        frame.render_widget(widget, area);
    }

    fn draw_preview(&mut self, frame: &mut Frame<'_>, area: Rect, theme: &ThemeTokens) {
        self.preview_height = area.height.saturating_sub(2).max(1) as usize;
        self.preview_width = area.width.saturating_sub(2).max(1);
        let lines = self.preview_lines_cached(self.preview_width);
        self.preview_scroll = clamp_scroll(self.preview_scroll, lines.len(), self.preview_height);

        let visible: Vec<Line<'static>> = lines
            .iter()
            .skip(self.preview_scroll)
            .take(self.preview_height)
            .map(|line| styled_preview_line(line, theme))
            .collect();
        let widget = Paragraph::new(visible).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Preview")
                .border_style(pane_border_style(theme, self.ui.focus == PaneFocus::Preview)),
        );
        frame.render_widget(widget, area);
    }

    fn info_line(&self, width: usize) -> String {
        let name = derive_filename(self.session.content());
        let device = match self.device {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
        };
        let layout = if self.layout.state().is_mobile {
            "single pane".to_string()
        } else {
            format!("split {:.0}%", self.layout.split_ratio())
        };
        let history = self.session.history();
        let position = history.cursor().map_or(0, |cursor| cursor + 1);
        let line = format!(
            "mdpad | {} | {device} | {layout} | history {position}/{}",
            truncate_middle(&name, width.saturating_sub(48).max(12)),
            history.len()
        );
        truncate_middle(&line, width).into_owned()
    }

    fn status_hint(&self) -> String {
        if let Some(prompt) = &self.ui.prompt {
            return if prompt.kind.takes_text() {
                "Enter confirm | Esc cancel".into()
            } else {
                "y clear | n keep".into()
            };
        }
        if self.ui.help_open {
            return "Esc close help".into();
        }
        if self.ui.menu_open {
            return "digit or click inserts | Esc close".into();
        }
        if self.layout.is_dragging() {
            return "release to set split".into();
        }
        "Shift+Tab pane | Ctrl+/ help".into()
    }
}

fn prompt_status(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::SaveAs => "Save as: edit the file name",
        PromptKind::Import => "Open file: type a path",
        PromptKind::AttachImage => "Attach image: type a path",
        PromptKind::ConfirmClear => "Clear all content? (y/n)",
    }
}

fn expand_home(input: &str, home: Option<PathBuf>) -> PathBuf {
    match (input.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(input),
    }
}

fn status_line(base: &str, perf_mode: bool, draw_time_us: u128, history_len: usize) -> String {
    if !perf_mode {
        return base.to_string();
    }

    format!("{base} | perf draw={draw_time_us}us history={history_len}")
}

fn toolbar_line(buttons: &[ToolbarButton], compact: bool, theme: &ThemeTokens) -> Line<'static> {
    let mut spans = Vec::with_capacity(buttons.len() * 2 + 1);
    for button in buttons {
        spans.push(Span::styled(button.label.clone(), theme.toolbar_button));
        spans.push(Span::styled(" ", theme.toolbar));
    }
    if compact {
        spans.push(Span::styled("Alt+digit inserts | Ctrl+T menu", theme.toolbar));
    }
    Line::from(spans)
}

/// Visible editor rows with the selection highlighted. `selection` holds
/// byte offsets into `text`.
fn editor_lines(
    text: &str,
    selection: Option<(usize, usize)>,
    scroll: usize,
    height: usize,
    selected: Style,
) -> Vec<Line<'static>> {
    let mut out = Vec::with_capacity(height);
    let mut offset = 0usize;
    for (idx, line) in text.split('\n').enumerate() {
        let start = offset;
        let end = start + line.len();
        offset = end + 1;
        if idx < scroll {
            continue;
        }
        if out.len() >= height {
            break;
        }

        let Some((sel_start, sel_end)) = selection else {
            out.push(Line::from(line.to_string()));
            continue;
        };
        let a = sel_start.clamp(start, end) - start;
        let b = sel_end.clamp(start, end) - start;
        if a == b {
            out.push(Line::from(line.to_string()));
            continue;
        }
        out.push(Line::from(vec![
            Span::raw(line[..a].to_string()),
            Span::styled(line[a..b].to_string(), selected),
            Span::raw(line[b..].to_string()),
        ]));
    }
    out
}

fn pane_border_style(theme: &ThemeTokens, focused: bool) -> Style {
    if focused {
        theme.pane_focus
    } else {
        theme.pane_border
    }
}

fn status_style(theme: &ThemeTokens, status: &str) -> Style {
    let lower = status.to_ascii_lowercase();
    if lower.contains("error") {
        return theme.status_error;
    }
    if ["cancelled", "unavailable", "nothing to", "read-only"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return theme.status_warn;
    }
    theme.status_ok
}

fn centered_popup(width_percent: u16, height: u16, area: Rect) -> Rect {
    let popup_width = (area.width.saturating_mul(width_percent) / 100)
        .max(10)
        .min(area.width);
    let popup_height = height.max(3).min(area.height);
    Rect {
        x: area.x + (area.width - popup_width) / 2,
        y: area.y + (area.height - popup_height) / 2,
        width: popup_width,
        height: popup_height,
    }
}

fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

fn clamp_scroll(scroll: usize, total: usize, height: usize) -> usize {
    if total <= height {
        0
    } else {
        scroll.min(total - height)
    }
}

fn cursor_rect(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

fn toggle_raw_mode<F>(interactive: bool, mut f: F) -> Result<()>
where
    F: FnMut() -> io::Result<()>,
{
    if interactive {
        f()?;
    }
    Ok(())
}

fn next_terminal_input<P, R>(mut poll: P, mut read: R) -> Result<Option<InputEvent>>
where
    P: FnMut(Duration) -> io::Result<bool>,
    R: FnMut() -> io::Result<Event>,
{
    if !poll(Duration::from_millis(30))? {
        return Ok(None);
    }
    let input = match read()? {
        Event::Key(key) if key.kind == event::KeyEventKind::Press => Some(InputEvent::Key(key)),
        Event::Mouse(mouse) => Some(InputEvent::Mouse(mouse)),
        Event::Paste(text) => Some(InputEvent::Paste(text)),
        Event::Resize(width, height) => Some(InputEvent::Resize(width, height)),
        _ => None,
    };
    Ok(input)
}
