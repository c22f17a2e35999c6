//! TUI Renderer - Implements UiRenderer for the terminal
//!
//! Drawing is a pure function of `AppState`; key handling maps crossterm
//! events to `Command`s according to what currently has input.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::time::Duration;

use crate::core::path_browser::BrowseState;
use crate::core::pm_sync::ModelSelector;
use crate::ui_backend::{
    AppState, BrowserModal, Command, FormKind, LoadState, Modal, ModelPickerModal, Panel,
    PmField, PmSettingsModal, Screen, UiRenderer,
};

use super::theme::Theme;
use super::widgets::modal::help_lines;
use super::widgets::panels::render_panel;
use super::widgets::{centered_rect, FormWidget, ModalFrame, NavSidebar, StatusBar};

/// TUI Renderer implementation
pub struct TuiRenderer<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
    /// Shown in the status bar
    server_url: String,
}

impl<B: Backend> TuiRenderer<B> {
    pub fn new(terminal: Terminal<B>, theme: Theme, server_url: impl Into<String>) -> Self {
        Self {
            terminal,
            theme,
            server_url: server_url.into(),
        }
    }

    /// Get reference to terminal (for testing)
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> UiRenderer for TuiRenderer<B> {
    fn render(&mut self, state: &AppState) -> Result<()> {
        let theme = &self.theme;
        let server_url = self.server_url.as_str();
        self.terminal
            .draw(|frame| draw(frame, state, theme, server_url))?;
        Ok(())
    }

    fn poll_command(&mut self, state: &AppState, timeout: Duration) -> Result<Option<Command>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(key_to_command(key, state)),
            // the next draw picks up the new size
            _ => Ok(None),
        }
    }

    fn get_size(&self) -> (u16, u16) {
        self.terminal
            .size()
            .map(|s| (s.width, s.height))
            .unwrap_or((80, 24))
    }
}

/// Translate a key press into a command for the current context
pub fn key_to_command(key: KeyEvent, state: &AppState) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Application control
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    if state.screen == Screen::Auth {
        return match key.code {
            KeyCode::Char('r') if ctrl => Some(Command::ToggleAuthMode),
            KeyCode::Char('u') if ctrl => Some(Command::ClearInput),
            KeyCode::Char(c) if !ctrl => Some(Command::InsertChar(c)),
            KeyCode::Backspace => Some(Command::DeleteCharBefore),
            KeyCode::Tab | KeyCode::Down => Some(Command::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Command::PrevField),
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Esc => Some(Command::Quit),
            _ => None,
        };
    }

    if let Some(modal) = state.modal() {
        return modal_key(key, modal);
    }

    // Chat input swallows printable keys
    if state.panel == Panel::Chat {
        match key.code {
            KeyCode::Char('p') if ctrl => return Some(Command::OpenPmSettings),
            KeyCode::Char(c) if !ctrl => return Some(Command::InsertChar(c)),
            KeyCode::Backspace => return Some(Command::DeleteCharBefore),
            KeyCode::Esc => return Some(Command::ClearInput),
            KeyCode::Enter => return Some(Command::Submit),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char('p') if ctrl => Some(Command::OpenPmSettings),
        KeyCode::Tab => Some(Command::NextPanel),
        KeyCode::BackTab => Some(Command::PrevPanel),
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            Panel::from_index(index).map(Command::ShowPanel)
        }
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('?') => Some(Command::ToggleHelp),
        KeyCode::Char('r') => Some(Command::Reload),
        KeyCode::Char('n') => Some(Command::NewItem),
        KeyCode::Char('e') => Some(Command::EditItem),
        KeyCode::Char('m') => Some(Command::EditModels),
        KeyCode::Char('d') => Some(Command::DeleteItem),
        KeyCode::Char('b') => Some(Command::BrowseWorkspace),
        KeyCode::Char('g') => Some(Command::ConnectGithub),
        KeyCode::Char('c') => Some(Command::ConnectCoder),
        KeyCode::Char('o') => Some(Command::CoderOAuth),
        KeyCode::Char('L') => Some(Command::Logout),
        KeyCode::Char('k') | KeyCode::Up => Some(Command::CursorUp),
        KeyCode::Char('j') | KeyCode::Down => Some(Command::CursorDown),
        KeyCode::Char('h') | KeyCode::Left => Some(Command::FocusLeft),
        KeyCode::Char('l') | KeyCode::Right => Some(Command::FocusRight),
        KeyCode::Enter => Some(Command::Submit),
        _ => None,
    }
}

fn modal_key(key: KeyEvent, modal: &Modal) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Esc {
        return Some(Command::CloseModal);
    }

    match modal {
        Modal::Form(form) => match key.code {
            KeyCode::Char('f') if ctrl && form.kind == FormKind::NewAccount => {
                Some(Command::FetchProviderModels)
            }
            KeyCode::Char('u') if ctrl => Some(Command::ClearInput),
            KeyCode::Char(c) if !ctrl => Some(Command::InsertChar(c)),
            KeyCode::Backspace => Some(Command::DeleteCharBefore),
            KeyCode::Tab | KeyCode::Down => Some(Command::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Command::PrevField),
            KeyCode::Enter => Some(Command::Submit),
            _ => None,
        },
        Modal::Confirm { .. } => match key.code {
            KeyCode::Char(c) => Some(Command::InsertChar(c.to_ascii_lowercase())),
            KeyCode::Enter => Some(Command::Submit),
            _ => None,
        },
        Modal::Notice { .. } | Modal::Help => match key.code {
            KeyCode::Enter | KeyCode::Char('q') => Some(Command::Submit),
            KeyCode::Char('?') => Some(Command::ToggleHelp),
            _ => None,
        },
        Modal::PmSettings(_) => match key.code {
            KeyCode::Tab | KeyCode::BackTab => Some(Command::NextField),
            KeyCode::Left | KeyCode::Char('h') => Some(Command::FocusLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Command::FocusRight),
            KeyCode::Up | KeyCode::Char('k') => Some(Command::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::CursorDown),
            KeyCode::Enter | KeyCode::Char('s') => Some(Command::Submit),
            _ => None,
        },
        Modal::Models(_) => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Command::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::CursorDown),
            KeyCode::Char(' ') => Some(Command::ToggleItem),
            KeyCode::Char('a') => Some(Command::ToggleAll),
            KeyCode::Char('d') => Some(Command::SetDefault),
            KeyCode::Enter | KeyCode::Char('s') => Some(Command::Submit),
            _ => None,
        },
        Modal::Browser(_) => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Command::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::CursorDown),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Some(Command::Submit),
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => Some(Command::BrowseParent),
            KeyCode::Char('r') => Some(Command::Reload),
            KeyCode::Char('s') => Some(Command::SaveSelection),
            _ => None,
        },
    }
}

// ========== Drawing ==========

/// Draw the whole screen for `state`
pub fn draw(frame: &mut Frame, state: &AppState, theme: &Theme, server_url: &str) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg_main)),
        area,
    );

    let [body, status_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);

    match state.screen {
        Screen::Auth => draw_auth(frame, body, state, theme),
        Screen::Dashboard => draw_dashboard(frame, body, state, theme),
    }

    frame.render_widget(
        StatusBar::new(theme)
            .server(server_url)
            .message(state.status.as_deref())
            .pending(state.requests.pending()),
        status_area,
    );

    for modal in &state.modals {
        draw_modal(frame, area, modal, theme);
    }
}

fn draw_auth(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let form = &state.auth_form;
    let switch_hint = match form.kind {
        FormKind::Register => "Ctrl+R: have an account? Sign in",
        _ => "Ctrl+R: no account? Register",
    };
    let box_area = centered_rect(60, 60, area);
    let block = Block::default()
        .title(Span::styled(
            format!(" Fulcrum · {} ", form.kind.title()),
            Style::default().fg(theme.purple).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Span::styled(
            format!(" Enter: submit  {}  Esc: quit ", switch_hint),
            theme.muted(),
        ))
        .borders(Borders::ALL)
        .border_style(theme.block_style(true));
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);
    frame.render_widget(FormWidget::new(form, theme), inner);
}

fn draw_dashboard(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let [nav_area, main_area] =
        Layout::horizontal([Constraint::Length(26), Constraint::Min(20)]).areas(area);

    // show the account's label instead of its id when the list is loaded
    let pm_account = state.pm_pref.account_id.as_deref().map(|id| {
        state
            .accounts
            .loaded()
            .and_then(|accounts| accounts.iter().find(|a| a.id == id))
            .map(|a| a.display_name())
            .unwrap_or_else(|| id.to_string())
    });

    frame.render_widget(
        NavSidebar::new(state.panel, theme)
            .llm_status(state.llm_status())
            .pm(pm_account.as_deref(), state.pm_pref.model.as_deref()),
        nav_area,
    );
    render_panel(frame, main_area, state, theme);
}

fn draw_modal(frame: &mut Frame, area: Rect, modal: &Modal, theme: &Theme) {
    match modal {
        Modal::Notice { title, message } => {
            let lines = message
                .lines()
                .map(|l| Line::from(l.to_string()))
                .collect();
            ModalFrame::new(title, theme)
                .content(lines)
                .footer("Enter: close")
                .width(60)
                .height(30)
                .render(area, frame.buffer_mut());
        }
        Modal::Help => {
            ModalFrame::new("Keyboard shortcuts", theme)
                .content(help_lines(theme))
                .footer("Esc: close")
                .width(64)
                .height(70)
                .render(area, frame.buffer_mut());
        }
        Modal::Confirm { message, .. } => {
            ModalFrame::new("Confirm", theme)
                .content(vec![
                    Line::from(message.clone()),
                    Line::default(),
                    Line::from(Span::styled("y / Enter: yes   n / Esc: no", theme.muted())),
                ])
                .width(50)
                .height(25)
                .render(area, frame.buffer_mut());
        }
        Modal::Form(form) => {
            let footer = match form.kind {
                FormKind::NewAccount => "Tab: next field  Ctrl+F: fetch models  Enter: save",
                _ => "Tab: next field  Enter: save  Esc: cancel",
            };
            let modal_frame = ModalFrame::new(form.kind.title(), theme)
                .footer(footer)
                .width(64)
                .height(60);
            let buf = frame.buffer_mut();
            let inner = modal_frame.render_frame(area, buf);
            FormWidget::new(form, theme).render(inner, buf);
        }
        Modal::PmSettings(modal) => draw_pm_settings(frame, area, modal, theme),
        Modal::Models(picker) => draw_model_picker(frame, area, picker, theme),
        Modal::Browser(modal) => draw_browser(frame, area, modal, theme),
    }
}

fn draw_pm_settings(frame: &mut Frame, area: Rect, modal: &PmSettingsModal, theme: &Theme) {
    let modal_frame = ModalFrame::new("PM Assistant Settings", theme)
        .footer("Tab: switch  ↑↓: change  Enter: save")
        .width(60)
        .height(40);
    let inner = modal_frame.render_frame(area, frame.buffer_mut());

    let settings = match &modal.settings {
        LoadState::Loaded(settings) => settings,
        LoadState::Failed(message) => {
            frame.render_widget(
                Paragraph::new(format!("Error: {}", message)).style(theme.error()),
                inner,
            );
            return;
        }
        _ => {
            frame.render_widget(Paragraph::new("Loading accounts...").style(theme.muted()), inner);
            return;
        }
    };

    let field_style = |field: PmField| {
        if modal.focus == field {
            theme.selected()
        } else {
            Style::default().fg(theme.text_primary)
        }
    };

    let account = settings
        .selected_account()
        .map(|a| a.display_name())
        .unwrap_or_else(|| "Select account...".to_string());
    let (model, model_note) = match &settings.selector {
        ModelSelector::AwaitingAccount => ("-".to_string(), None),
        ModelSelector::Loading => ("Loading models...".to_string(), None),
        ModelSelector::Ready { models } if models.is_empty() => {
            ("Default".to_string(), Some("No models reported".to_string()))
        }
        ModelSelector::Ready { .. } => (
            settings.model.clone().unwrap_or_else(|| "Default".to_string()),
            None,
        ),
        ModelSelector::Failed { message } => ("-".to_string(), Some(message.clone())),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Account  ", theme.muted()),
            Span::styled(format!(" ◂ {} ▸ ", account), field_style(PmField::Account)),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled("Model    ", theme.muted()),
            Span::styled(format!(" ◂ {} ▸ ", model), field_style(PmField::Model)),
        ]),
    ];
    if let Some(note) = model_note {
        lines.push(Line::from(Span::styled(note, theme.error())));
    }
    if let Some(hint) = &modal.hint {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(hint.clone(), theme.error())));
    }
    if settings.accounts.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "No AI accounts yet. Add one under AI Accounts.",
            theme.muted(),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_model_picker(frame: &mut Frame, area: Rect, picker: &ModelPickerModal, theme: &Theme) {
    let title = format!("Models · {}", picker.account.display_name());
    let modal_frame = ModalFrame::new(&title, theme)
        .footer("Space: toggle  a: all  d: default  Enter: save")
        .width(60)
        .height(70);
    let inner = modal_frame.render_frame(area, frame.buffer_mut());

    let [header_area, list_area, hint_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let allow_label = if picker.allow.is_all() {
        "All models allowed".to_string()
    } else {
        format!("{} selected", picker.models().iter().filter(|m| picker.allow.permits(m)).count())
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(allow_label, Style::default().fg(theme.cyan)),
            Span::styled(
                format!(
                    "   default: {}",
                    picker.default_model.as_deref().unwrap_or("provider default")
                ),
                theme.muted(),
            ),
        ])),
        header_area,
    );

    match &picker.available {
        LoadState::Loaded(models) if !models.is_empty() => {
            let items: Vec<ListItem> = models
                .iter()
                .map(|model| {
                    let check = if picker.allow.permits(model) { "[x]" } else { "[ ]" };
                    let star = if picker.default_model.as_deref() == Some(model.as_str()) {
                        " ★"
                    } else {
                        ""
                    };
                    ListItem::new(format!("{} {}{}", check, model, star))
                })
                .collect();
            let mut list_state = ListState::default().with_selected(Some(picker.cursor));
            frame.render_stateful_widget(
                List::new(items).highlight_style(theme.selected()),
                list_area,
                &mut list_state,
            );
        }
        LoadState::Loaded(_) => frame.render_widget(
            Paragraph::new("The provider reported no models").style(theme.muted()),
            list_area,
        ),
        LoadState::Failed(message) => frame.render_widget(
            Paragraph::new(message.clone())
                .style(theme.error())
                .wrap(Wrap { trim: true }),
            list_area,
        ),
        _ => frame.render_widget(
            Paragraph::new("Loading models...").style(theme.muted()),
            list_area,
        ),
    }

    if let Some(hint) = &picker.hint {
        frame.render_widget(
            Paragraph::new(hint.clone()).style(Style::default().fg(theme.yellow)),
            hint_area,
        );
    }
}

fn draw_browser(frame: &mut Frame, area: Rect, modal: &BrowserModal, theme: &Theme) {
    let browser = &modal.browser;
    let footer = if modal.project_id.is_some() {
        "Enter: open  Backspace: up  s: use this folder  r: retry"
    } else {
        "Enter: open  Backspace: up  r: retry"
    };
    let title = format!(
        "Browse · {}",
        browser
            .target
            .workspace_ref
            .as_deref()
            .unwrap_or(&browser.target.workspace_id)
    );
    let modal_frame = ModalFrame::new(&title, theme)
        .footer(footer)
        .width(70)
        .height(70);
    let inner = modal_frame.render_frame(area, frame.buffer_mut());

    let [path_area, list_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).areas(inner);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("📁 ", Style::default().fg(theme.yellow)),
            Span::styled(
                browser.current_path.clone(),
                Style::default().fg(theme.text_primary).add_modifier(Modifier::BOLD),
            ),
        ])),
        path_area,
    );

    match &browser.state {
        BrowseState::Idle => {}
        BrowseState::Loading { path } => frame.render_widget(
            Paragraph::new(format!("Loading {}...", path)).style(theme.muted()),
            list_area,
        ),
        BrowseState::Listing(listing) if listing.folders.is_empty() => frame.render_widget(
            Paragraph::new("No subfolders").style(theme.muted()),
            list_area,
        ),
        BrowseState::Listing(listing) => {
            let items: Vec<ListItem> = listing
                .folders
                .iter()
                .map(|f| ListItem::new(format!("▸ {}", f.name)))
                .collect();
            let mut list_state = ListState::default().with_selected(Some(browser.selected));
            frame.render_stateful_widget(
                List::new(items).highlight_style(theme.selected()),
                list_area,
                &mut list_state,
            );
        }
        BrowseState::Unreachable { message, start_url } => {
            let mut lines = vec![
                Line::from(Span::styled(
                    "Workspace is not reachable",
                    Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
                )),
                Line::from(message.clone()),
                Line::default(),
            ];
            match start_url {
                Some(url) => {
                    lines.push(Line::from("Start the workspace, then press r:"));
                    lines.push(Line::from(Span::styled(
                        url.clone(),
                        Style::default().fg(theme.blue).add_modifier(Modifier::UNDERLINED),
                    )));
                }
                None => lines.push(Line::from("Start the workspace in Coder, then press r.")),
            }
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), list_area);
        }
        BrowseState::Failed { message } => frame.render_widget(
            Paragraph::new(message.clone())
                .style(theme.error())
                .wrap(Wrap { trim: true }),
            list_area,
        ),
    }
}
