// src/tui.rs
use crate::cli::Services;
use crate::edit::{EditOutcome, EditWorkflow, Field};
use crate::encoding::SecretCodec;
use crate::error::{AppResult, RepositoryResult, TuiError, WorkflowError, WorkflowResult};
use crate::interact::{ClipboardWriter, SystemClipboard};
use crate::listing::{delete_prompt, DetailView, ListRequest, ListResponse, ListingWorkflow, DELETE_TITLE};
use crate::models::Credential;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::{stdout, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use log;

const NUM_EDIT_FIELDS: usize = Field::ALL.len();
const BASE_KEYS: &str = "(q) Quit | (j/k) Nav | (/) Search | (a) Add | (e) Edit | (Enter) View | (d) Del | (r) Reload";

/// Results of background repository calls, applied on the UI thread.
enum AppEvent {
    Listed(ListResponse),
    Deleted { credential: Credential, result: RepositoryResult<()> },
    Submitted { workflow: Box<EditWorkflow>, result: WorkflowResult<Credential> },
}

struct FormState {
    // None while a submit is in flight.
    workflow: Option<Box<EditWorkflow>>,
    field_index: usize,
    input: String,
}

impl FormState {
    fn new(workflow: EditWorkflow) -> Self {
        let input = workflow.form().get(Field::ALL[0]).to_string();
        FormState { workflow: Some(Box::new(workflow)), field_index: 0, input }
    }

    fn field(&self) -> Field {
        Field::ALL[self.field_index]
    }

    fn store_input(&mut self) {
        let field = self.field();
        if let Some(workflow) = self.workflow.as_mut() {
            workflow.set_field(field, self.input.clone());
        }
    }

    fn focus(&mut self, index: usize) {
        self.field_index = index % NUM_EDIT_FIELDS;
        let field = self.field();
        self.input = self
            .workflow
            .as_ref()
            .map(|w| w.form().get(field).to_string())
            .unwrap_or_default();
    }
}

enum InputMode {
    Normal,
    Searching,
    Form(FormState),
    Detail(DetailView),
    ConfirmDelete(Credential),
}

pub struct App {
    should_quit: bool,
    listing: ListingWorkflow,
    codec: Arc<dyn SecretCodec>,
    clipboard: Box<dyn ClipboardWriter>,
    handle: Handle,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    list_state: ListState,
    input_mode: InputMode,
    search_query: String,
    app_status: String,
    clipboard_clear_after: Duration,
    clipboard_clear_at: Option<Instant>,
}

impl App {
    fn new(services: &Services, handle: Handle) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        App {
            should_quit: false,
            listing: ListingWorkflow::new(services.repository.clone()),
            codec: services.codec.clone(),
            clipboard: Box::new(SystemClipboard),
            handle,
            events_tx,
            events_rx,
            list_state: ListState::default(),
            input_mode: InputMode::Normal,
            search_query: String::new(),
            app_status: "Loading credentials...".to_string(),
            clipboard_clear_after: Duration::from_secs(services.config.clipboard_clear_time_seconds),
            clipboard_clear_at: None,
        }
    }

    fn spawn_list(&self, request: ListRequest) {
        let repository = self.listing.repository();
        let tx = self.events_tx.clone();
        self.handle.spawn(async move {
            let response = request.run(repository.as_ref()).await;
            let _ = tx.send(AppEvent::Listed(response));
        });
    }

    fn spawn_delete(&self, credential: Credential) {
        let repository = self.listing.repository();
        let tx = self.events_tx.clone();
        self.handle.spawn(async move {
            let result = repository.delete(credential.id).await;
            let _ = tx.send(AppEvent::Deleted { credential, result });
        });
    }

    fn spawn_submit(&self, mut workflow: Box<EditWorkflow>) {
        let tx = self.events_tx.clone();
        self.handle.spawn(async move {
            let result = workflow.submit().await;
            let _ = tx.send(AppEvent::Submitted { workflow, result });
        });
    }

    fn reload(&mut self) {
        let request = self.listing.begin_load();
        self.spawn_list(request);
    }

    /// Runs a reload issued by the listing and reapplies an active filter.
    /// The search is issued last so its ticket wins over the reload.
    fn refresh(&mut self, reload: ListRequest) {
        self.spawn_list(reload);
        if !self.search_query.is_empty() {
            let request = self.listing.begin_search(&self.search_query);
            self.spawn_list(request);
        }
    }

    fn selected_credential(&self) -> Option<Credential> {
        self.list_state
            .selected()
            .and_then(|i| self.listing.state().credentials.get(i))
            .cloned()
    }

    fn clamp_selection(&mut self) {
        let len = self.listing.state().credentials.len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            let index = self.list_state.selected().unwrap_or(0).min(len - 1);
            self.list_state.select(Some(index));
        }
    }

    fn copy_to_clipboard(&mut self, result: Result<(), String>, field_name: &str, clears: bool) {
        match result {
            Ok(()) => {
                self.app_status = format!("{} copied to clipboard!", field_name);
                log::info!("Copied {} to clipboard.", field_name);
                if clears && !self.clipboard_clear_after.is_zero() {
                    self.clipboard_clear_at = Some(Instant::now() + self.clipboard_clear_after);
                }
            }
            Err(err) => {
                self.app_status = format!("Error copying {}: {}", field_name, err);
                log::error!("Error copying {} to clipboard: {}", field_name, err);
            }
        }
    }

    fn tick(&mut self) {
        if let Some(deadline) = self.clipboard_clear_at {
            if Instant::now() >= deadline {
                self.clipboard_clear_at = None;
                match self.clipboard.write_text("") {
                    Ok(()) => {
                        self.app_status = "Clipboard cleared.".to_string();
                        log::info!("Clipboard cleared after timeout.");
                    }
                    Err(e) => log::warn!("Failed to clear clipboard: {}", e),
                }
            }
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.on_event(event);
        }
    }

    fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Listed(response) => {
                if self.listing.apply(response) {
                    self.clamp_selection();
                    let count = self.listing.state().credentials.len();
                    if self.listing.state().error.is_none() && !self.listing.state().loading {
                        self.app_status = format!("{} credentials.", count);
                    }
                }
            }
            AppEvent::Deleted { credential, result } => {
                match self.listing.finish_delete(&credential, result) {
                    Some(reload) => {
                        self.app_status = format!("Entry '{}' deleted.", credential.app);
                        self.refresh(reload);
                    }
                    None => {
                        self.app_status = "Delete failed.".to_string();
                    }
                }
            }
            AppEvent::Submitted { workflow, result } => match result {
                Ok(saved) => {
                    self.app_status = format!("Entry '{}' saved.", saved.app);
                    self.input_mode = InputMode::Normal;
                    if let Some(reload) = self.listing.complete_edit(&EditOutcome::Saved(saved)) {
                        self.refresh(reload);
                    }
                }
                Err(e) => {
                    if let InputMode::Form(form) = &mut self.input_mode {
                        let first_invalid = Field::ALL
                            .iter()
                            .position(|&f| workflow.field_error(f).is_some());
                        form.workflow = Some(workflow);
                        form.focus(first_invalid.unwrap_or(form.field_index));
                    }
                    self.app_status = match e {
                        WorkflowError::Validation(_) => "Fix the highlighted fields. (Esc to cancel)".to_string(),
                        other => format!("Error saving entry: {}", other),
                    };
                }
            },
        }
    }

    fn open_form(&mut self, workflow: EditWorkflow) {
        self.app_status = match (workflow.is_edit(), workflow.load_error()) {
            (true, Some(e)) => format!("Stored password unreadable ({}). Enter a new one.", e),
            (true, None) => "Editing entry... (Esc to cancel)".to_string(),
            (false, _) => "Adding new entry... (Esc to cancel)".to_string(),
        };
        self.input_mode = InputMode::Form(FormState::new(workflow));
    }

    pub fn on_key(&mut self, key_event: KeyEvent) {
        let key_code = key_event.code;
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        self.input_mode = match mode {
            InputMode::Normal => {
                self.on_normal_key(key_code);
                // on_normal_key may have switched modes itself.
                std::mem::replace(&mut self.input_mode, InputMode::Normal)
            }
            InputMode::Searching => self.on_search_key(key_code),
            InputMode::Form(form) => self.on_form_key(form, key_code),
            InputMode::Detail(view) => self.on_detail_key(view, key_code),
            InputMode::ConfirmDelete(credential) => self.on_confirm_key(credential, key_code),
        };
    }

    fn on_normal_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('r') => {
                self.search_query.clear();
                self.reload();
            }
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Searching;
                self.app_status = "Type to search. (Enter) Keep results | (Esc) Clear".to_string();
            }
            KeyCode::Char('a') => {
                let request = self.listing.request_create();
                let workflow = EditWorkflow::from_request(self.listing.repository(), self.codec.clone(), &request);
                self.open_form(workflow);
            }
            KeyCode::Char('e') => match self.selected_credential() {
                Some(credential) => {
                    let request = self.listing.request_edit(&credential);
                    let workflow = EditWorkflow::from_request(self.listing.repository(), self.codec.clone(), &request);
                    self.open_form(workflow);
                }
                None => self.app_status = "No entry selected to edit.".to_string(),
            },
            KeyCode::Enter => match self.selected_credential() {
                Some(credential) => {
                    let view = self.listing.request_view(&credential, self.codec.as_ref());
                    self.app_status = "(v) Show/Hide | (c) Copy User | (x) Copy Pass | (Esc) Close".to_string();
                    self.input_mode = InputMode::Detail(view);
                }
                None => self.app_status = "No entry selected to view.".to_string(),
            },
            KeyCode::Char('d') => match self.selected_credential() {
                Some(credential) => {
                    self.app_status = "(y) Delete | (n) Keep".to_string();
                    self.input_mode = InputMode::ConfirmDelete(credential);
                }
                None => self.app_status = "No entry selected to delete.".to_string(),
            },
            _ => {}
        }
    }

    fn on_search_key(&mut self, key_code: KeyCode) -> InputMode {
        match key_code {
            KeyCode::Char(c) => {
                self.search_query.push(c);
                let request = self.listing.begin_search(&self.search_query);
                self.spawn_list(request);
                InputMode::Searching
            }
            KeyCode::Backspace => {
                self.search_query.pop();
                let request = self.listing.begin_search(&self.search_query);
                self.spawn_list(request);
                InputMode::Searching
            }
            KeyCode::Enter => {
                self.app_status = format!("Filtered by '{}'.", self.search_query);
                InputMode::Normal
            }
            KeyCode::Esc => {
                self.search_query.clear();
                let request = self.listing.begin_search("");
                self.spawn_list(request);
                self.app_status = "Search cleared.".to_string();
                InputMode::Normal
            }
            _ => InputMode::Searching,
        }
    }

    fn on_form_key(&mut self, mut form: FormState, key_code: KeyCode) -> InputMode {
        if form.workflow.is_none() {
            // Saving; ignore input until the result arrives.
            return InputMode::Form(form);
        }
        match key_code {
            KeyCode::Char(c) => form.input.push(c),
            KeyCode::Backspace => {
                form.input.pop();
            }
            KeyCode::Tab | KeyCode::Down => {
                form.store_input();
                form.focus(form.field_index + 1);
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.store_input();
                form.focus(form.field_index + NUM_EDIT_FIELDS - 1);
            }
            KeyCode::Enter => {
                form.store_input();
                if form.field_index == NUM_EDIT_FIELDS - 1 {
                    if let Some(workflow) = form.workflow.take() {
                        self.app_status = "Saving...".to_string();
                        self.spawn_submit(workflow);
                    }
                } else {
                    form.focus(form.field_index + 1);
                }
            }
            KeyCode::Esc => {
                self.listing.complete_edit(&EditOutcome::Cancelled);
                self.app_status = "Edit cancelled.".to_string();
                log::info!("Credential form cancelled.");
                return InputMode::Normal;
            }
            _ => {}
        }
        InputMode::Form(form)
    }

    fn on_detail_key(&mut self, mut view: DetailView, key_code: KeyCode) -> InputMode {
        match key_code {
            KeyCode::Char('v') => view.toggle_secret(),
            KeyCode::Char('c') => {
                let result = view.copy_user_name(self.clipboard.as_ref());
                self.copy_to_clipboard(result, "Username", false);
            }
            KeyCode::Char('x') => {
                let result = view.copy_secret(self.clipboard.as_ref());
                self.copy_to_clipboard(result, "Password", true);
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.app_status = String::new();
                return InputMode::Normal;
            }
            _ => {}
        }
        InputMode::Detail(view)
    }

    fn on_confirm_key(&mut self, credential: Credential, key_code: KeyCode) -> InputMode {
        match key_code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.app_status = format!("Deleting '{}'...", credential.app);
                self.spawn_delete(credential);
                InputMode::Normal
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.app_status = "Deletion cancelled.".to_string();
                InputMode::Normal
            }
            _ => InputMode::ConfirmDelete(credential),
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let num_entries = self.listing.state().credentials.len();
        if num_entries == 0 {
            self.list_state.select(None);
            return;
        }
        let current_index = self.list_state.selected().unwrap_or(0) as i32;
        let new_index = (current_index + delta).clamp(0, num_entries as i32 - 1);
        self.list_state.select(Some(new_index as usize));
    }
}

pub fn run_tui(services: &Services, handle: Handle) -> AppResult<()> {
    log::info!("Initializing TUI...");
    enable_raw_mode().map_err(|e| { log::error!("Failed to enable raw mode: {}", e); TuiError::Io(e) })?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| { log::error!("Failed to setup terminal screen: {}", e); TuiError::Io(e) })?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| { log::error!("Failed to create terminal: {}", e); TuiError::Io(e) })?;

    let mut app = App::new(services, handle);
    app.reload();

    log::info!("Starting TUI application loop.");
    let res = run_app_loop(&mut terminal, &mut app);
    log::info!("TUI application loop finished.");

    disable_raw_mode().map_err(|e| { log::error!("Failed to disable raw mode: {}", e); TuiError::Io(e) })?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .map_err(|e| { log::error!("Failed to restore terminal screen: {}", e); TuiError::Io(e) })?;

    res?;
    log::info!("TUI shutdown complete.");
    Ok(())
}

fn run_app_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<(), TuiError> {
    while !app.should_quit {
        app.drain_events();
        app.tick();
        terminal.draw(|f| ui(f, app)).map_err(|e| { log::error!("Terminal draw error: {}", e); TuiError::Io(e) })?;

        if event::poll(Duration::from_millis(100)).map_err(|e| { log::error!("Event poll error: {}", e); TuiError::Io(e) })? {
            if let Event::Key(key_event) = event::read().map_err(|e| { log::error!("Event read error: {}", e); TuiError::Io(e) })? {
                if key_event.kind == KeyEventKind::Press {
                    app.on_key(key_event);
                }
            }
        }
    }
    Ok(())
}

fn draw_main_ui(f: &mut Frame, app: &mut App) {
    let show_search = matches!(app.input_mode, InputMode::Searching) || !app.search_query.is_empty();
    let mut constraints = vec![Constraint::Min(0), Constraint::Length(3)];
    if show_search {
        constraints.insert(0, Constraint::Length(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.size());
    let (search_area, body_area, status_bar_area) = if show_search {
        (Some(chunks[0]), chunks[1], chunks[2])
    } else {
        (None, chunks[0], chunks[1])
    };

    if let Some(area) = search_area {
        let cursor = if matches!(app.input_mode, InputMode::Searching) { "▋" } else { "" };
        let search = Paragraph::new(format!("{}{}", app.search_query, cursor))
            .block(Block::default().borders(Borders::ALL).title("Search"));
        f.render_widget(search, area);
    }

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)].as_ref())
        .split(body_area);
    let list_area = main_chunks[0];
    let detail_area = main_chunks[1];

    let state = app.listing.state();
    let mut entries_block_title = format!("Credentials ({})", state.credentials.len());
    if state.loading {
        entries_block_title.push_str(" loading...");
    }
    let entries_block = Block::default().borders(Borders::ALL).title(entries_block_title);

    if state.credentials.is_empty() {
        let text = if state.loading { "Loading..." } else { "No credentials found." };
        let empty = Paragraph::new(text)
            .block(entries_block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(empty, list_area);
    } else {
        let list_items: Vec<ListItem> = state
            .credentials
            .iter()
            .map(|c| ListItem::new(Span::raw(format!("{} - {}", c.app, c.user_name))))
            .collect();
        let list = List::new(list_items)
            .block(entries_block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::Gray))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, list_area, &mut app.list_state);
    }

    let details_block = Block::default().borders(Borders::ALL).title("Details");
    match app.selected_credential() {
        Some(entry) => {
            let timestamp = |t: Option<chrono::DateTime<chrono::Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_default();
            let detail_text = vec![
                Line::from(vec![Span::styled("Category: ", Style::default().bold()), Span::raw(entry.category.clone())]),
                Line::from(vec![Span::styled("App: ", Style::default().bold()), Span::raw(entry.app.clone())]),
                Line::from(vec![Span::styled("User name: ", Style::default().bold()), Span::raw(entry.user_name.clone())]),
                Line::from(vec![Span::styled("Password: ", Style::default().bold()), Span::raw("********")]),
                Line::from(vec![Span::styled("Created: ", Style::default().bold()), Span::raw(timestamp(entry.created_at))]),
                Line::from(vec![Span::styled("Updated: ", Style::default().bold()), Span::raw(timestamp(entry.updated_at))]),
            ];
            let details_paragraph = Paragraph::new(detail_text).block(details_block).wrap(Wrap { trim: true });
            f.render_widget(details_paragraph, detail_area);
        }
        None => {
            let text = Paragraph::new("Select an entry to see details.").block(details_block).alignment(Alignment::Center);
            f.render_widget(text, detail_area);
        }
    }

    let mut status_line = vec![Span::raw(app.app_status.clone())];
    if let Some(error) = &app.listing.state().error {
        status_line.insert(0, Span::styled(format!("{} | ", error), Style::default().fg(Color::Red)));
    }
    if matches!(app.input_mode, InputMode::Normal) {
        status_line.push(Span::raw(format!(" | {}", BASE_KEYS)));
    }
    let status_paragraph = Paragraph::new(Line::from(status_line))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status_paragraph, status_bar_area);
}

fn draw_editing_form(f: &mut Frame, form: &FormState) {
    let editing = form.workflow.as_ref().map_or(false, |w| w.is_edit());
    let form_title = match (&form.workflow, editing) {
        (None, _) => "Saving...",
        (Some(_), true) => "Edit Password Entry",
        (Some(_), false) => "Add New Password Entry",
    };

    let form_area = centered_rect(60, 50, f.size());
    f.render_widget(Clear, form_area);
    f.render_widget(Block::default().title(form_title).borders(Borders::ALL), form_area);

    let form_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ].as_ref())
        .split(form_area);

    for (i, field) in Field::ALL.iter().copied().enumerate() {
        let stored = form.workflow.as_ref().map(|w| w.form().get(field).to_string()).unwrap_or_default();
        let value = if form.field_index == i { form.input.clone() } else { stored };
        let shown = if field == Field::Secret { "*".repeat(value.chars().count()) } else { value };
        let text = if form.field_index == i { format!("{}▋", shown) } else { shown };

        let error = form.workflow.as_ref().and_then(|w| w.field_error(field));
        let title = match &error {
            Some(e) => format!("{}: {}", field.label(), e),
            None => format!("{}:", field.label()),
        };
        let style = if error.is_some() {
            Style::default().fg(Color::Red)
        } else if form.field_index == i {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(style);
        f.render_widget(paragraph, form_chunks[i]);
    }

    let help_paragraph = Paragraph::new("(Tab) Next | (Enter) Next/Save | (Esc) Cancel").alignment(Alignment::Center);
    f.render_widget(help_paragraph, form_chunks[NUM_EDIT_FIELDS + 1]);
}

fn draw_detail(f: &mut Frame, view: &DetailView) {
    let area = centered_rect(60, 40, f.size());
    f.render_widget(Clear, area);
    let entry = &view.credential;
    let mut lines = vec![
        Line::from(vec![Span::styled("Category: ", Style::default().bold()), Span::raw(entry.category.clone())]),
        Line::from(vec![Span::styled("App: ", Style::default().bold()), Span::raw(entry.app.clone())]),
        Line::from(vec![Span::styled("User name: ", Style::default().bold()), Span::raw(entry.user_name.clone())]),
        Line::from(vec![Span::styled("Password: ", Style::default().bold()), Span::raw(view.secret_display())]),
    ];
    if let Some(e) = view.decode_error() {
        lines.push(Line::from(Span::styled(e.to_string(), Style::default().fg(Color::Red))));
    }
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(format!("{} details", entry.app)))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_confirm(f: &mut Frame, credential: &Credential) {
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(delete_prompt(credential)),
        Line::from(""),
        Line::from("(y) Delete | (n) Keep"),
    ])
    .block(Block::default().borders(Borders::ALL).title(DELETE_TITLE))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Renders the UI widgets based on the application mode.
fn ui(f: &mut Frame, app: &mut App) {
    draw_main_ui(f, app);
    match &app.input_mode {
        InputMode::Normal | InputMode::Searching => {}
        InputMode::Form(form) => draw_editing_form(f, form),
        InputMode::Detail(view) => draw_detail(f, view),
        InputMode::ConfirmDelete(credential) => draw_confirm(f, credential),
    }
}

/// Helper to create a centered rect for popups.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
