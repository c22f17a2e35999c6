//! Dashboard rendering against ratatui's test backend
//!
//! Run: cargo test --test tui_widget_tests

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use fulcrum_dash::api::{Account, Overview, Project, NO_LLM_STATUS};
use fulcrum_dash::config::BrowserConfig;
use fulcrum_dash::core::PmPreference;
use fulcrum_dash::tui::{draw, key_to_command, Theme};
use fulcrum_dash::ui_backend::{AppState, Command, LoadState, Modal, Panel};

const SERVER: &str = "http://localhost:8000";

/// Render the full screen and return it row by row
fn render(state: &AppState, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    let theme = Theme::default();
    terminal
        .draw(|f| draw(f, state, &theme, SERVER))
        .unwrap();

    let buf = terminal.backend().buffer();
    let mut result = String::new();
    for y in 0..height {
        for x in 0..width {
            result.push_str(buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
        }
        result.push('\n');
    }
    result
}

fn dashboard(pm: PmPreference) -> AppState {
    AppState::new(true, pm, BrowserConfig::default())
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

// ============================================================================
// AUTH SCREEN
// ============================================================================

#[test]
fn test_auth_screen_shows_sign_in_form() {
    let state = AppState::new(false, PmPreference::default(), BrowserConfig::default());
    let output = render(&state, 100, 30);

    assert!(output.contains("Sign in"), "title missing:\n{}", output);
    assert!(output.contains("Email"));
    assert!(output.contains("Password"));
    assert!(!output.contains("AI Accounts"), "dashboard leaked into auth screen");
}

#[test]
fn test_auth_screen_masks_password() {
    let mut state = AppState::new(false, PmPreference::default(), BrowserConfig::default());
    state.auth_form.next_field();
    for c in "hunter2".chars() {
        state.auth_form.insert_char(c);
    }
    let output = render(&state, 100, 30);
    assert!(!output.contains("hunter2"));
    assert!(output.contains("•••••••"));
}

// ============================================================================
// DASHBOARD
// ============================================================================

#[test]
fn test_sidebar_lists_every_panel() {
    let state = dashboard(PmPreference::default());
    let output = render(&state, 100, 30);

    for panel in Panel::ALL {
        assert!(output.contains(panel.title()), "missing {}", panel.title());
    }
    assert!(output.contains("not set (Ctrl+P)"));
}

#[test]
fn test_overview_lists_projects() {
    let mut state = dashboard(PmPreference::default());
    state.overview = LoadState::Loaded(Overview {
        llm_status: NO_LLM_STATUS.to_string(),
        project_count: 1,
        projects: vec![Project {
            id: "0123456789".into(),
            name: "Launchpad".into(),
            ..Default::default()
        }],
    });
    let output = render(&state, 100, 30);

    assert!(output.contains("Launchpad"));
    assert!(output.contains("#01234567"));
    assert!(output.contains(NO_LLM_STATUS));
}

#[test]
fn test_failed_panel_shows_error() {
    let mut state = dashboard(PmPreference::default());
    state.overview = LoadState::Failed("Network error: Connection failed".into());
    let output = render(&state, 100, 30);
    assert!(output.contains("Connection failed"));
}

#[test]
fn test_sidebar_names_pm_account() {
    let mut state = dashboard(PmPreference::new("a1", Some("gpt-4o".into())));
    state.accounts = LoadState::Loaded(vec![Account {
        id: "a1".into(),
        provider: "openai".into(),
        name: Some("Work".into()),
        ..Default::default()
    }]);
    let output = render(&state, 100, 30);
    assert!(output.contains("Work · gpt-4o"), "sidebar:\n{}", output);
}

#[test]
fn test_notice_modal_is_drawn_on_top() {
    let mut state = dashboard(PmPreference::default());
    state
        .modals
        .push(Modal::notice("PM Settings", "PM Settings saved!"));
    let output = render(&state, 100, 30);
    assert!(output.contains("PM Settings saved!"));
}

// ============================================================================
// KEY MAPPING
// ============================================================================

#[test]
fn test_digits_switch_panels_only_outside_text_entry() {
    let state = dashboard(PmPreference::default());
    assert_eq!(
        key_to_command(key(KeyCode::Char('2')), &state),
        Some(Command::ShowPanel(Panel::Projects))
    );

    let auth = AppState::new(false, PmPreference::default(), BrowserConfig::default());
    assert_eq!(
        key_to_command(key(KeyCode::Char('2')), &auth),
        Some(Command::InsertChar('2'))
    );
}

#[test]
fn test_ctrl_c_always_quits() {
    let mut state = dashboard(PmPreference::default());
    state.modals.push(Modal::Help);
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(key_to_command(ctrl_c, &state), Some(Command::Quit));
}
