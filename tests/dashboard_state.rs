//! Dashboard state transitions without a terminal or network

use fulcrum_dash::api::{
    Account, ApiError, AuthorizeUrl, ChatReply, CoderAccount, Folder, FolderListing, Overview, Project,
    TokenResponse, NO_LLM_STATUS,
};
use fulcrum_dash::config::BrowserConfig;
use fulcrum_dash::core::{PmPreference, RequestToken, StartLocation};
use fulcrum_dash::ui_backend::{
    AppEvent, AppState, ChatRole, Command, Effect, Fetch, Loaded, Modal, Mutated, Mutation,
    Panel, Screen, NO_LLM_REPLY,
};

fn dashboard() -> AppState {
    AppState::new(true, PmPreference::default(), BrowserConfig::default())
}

/// Token of the fetch matching `pred`
fn token_of(effects: &[Effect], pred: impl Fn(&Fetch) -> bool) -> RequestToken {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Fetch { token, fetch } if pred(fetch) => Some(*token),
            _ => None,
        })
        .expect("fetch effect")
}

fn loaded(token: RequestToken, data: Loaded) -> AppEvent {
    AppEvent::Loaded { token, data }
}

fn account(id: &str) -> Account {
    Account {
        id: id.to_string(),
        provider: "openai".to_string(),
        ..Default::default()
    }
}

fn type_text(state: &mut AppState, text: &str) {
    for c in text.chars() {
        state.handle_command(Command::InsertChar(c));
    }
}

#[test]
fn test_start_loads_overview() {
    let mut state = dashboard();
    let effects = state.start();
    assert_eq!(effects.len(), 1);
    assert!(state.overview.is_loading());

    let signed_out = AppState::new(false, PmPreference::default(), BrowserConfig::default())
        .start();
    assert!(signed_out.is_empty());
}

#[test]
fn test_superseded_response_is_dropped() {
    let mut state = dashboard();
    let first = token_of(&state.start(), |f| *f == Fetch::Overview);
    let second = token_of(&state.handle_command(Command::Reload), |f| *f == Fetch::Overview);

    let stale = Overview {
        llm_status: "stale".into(),
        ..Default::default()
    };
    state.apply(loaded(first, Loaded::Overview(Ok(stale))));
    assert!(state.overview.is_loading());

    let fresh = Overview {
        llm_status: "fresh".into(),
        ..Default::default()
    };
    state.apply(loaded(second, Loaded::Overview(Ok(fresh))));
    assert_eq!(state.llm_status(), "fresh");

    // a duplicate of the accepted response is also dropped
    state.apply(loaded(second, Loaded::Overview(Ok(Overview::default()))));
    assert_eq!(state.llm_status(), "fresh");
}

#[test]
fn test_unauthorized_response_signs_out() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::ShowPanel(Panel::Projects));
    let token = token_of(&effects, |f| *f == Fetch::Projects);

    let effects = state.apply(loaded(
        token,
        Loaded::Projects(Err(ApiError::Unauthorized("expired".into()))),
    ));
    assert_eq!(effects, vec![Effect::ClearToken]);
    assert_eq!(state.screen, Screen::Auth);
    assert!(state.auth_form.hint.as_deref().unwrap().contains("Session expired"));
    assert!(state.projects.is_idle());
}

#[test]
fn test_responses_after_sign_out_are_ignored() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::ShowPanel(Panel::Accounts));
    let token = token_of(&effects, |f| *f == Fetch::Accounts);
    state.handle_command(Command::Logout);

    let effects = state.apply(loaded(token, Loaded::Accounts(Ok(vec![account("a1")]))));
    assert!(effects.is_empty());
    assert!(state.accounts.is_idle());
}

#[test]
fn test_sign_in_flow() {
    let mut state = AppState::new(false, PmPreference::default(), BrowserConfig::default());
    let effects = state.handle_command(Command::Submit);
    assert!(effects.is_empty());
    assert_eq!(state.auth_form.hint.as_deref(), Some("Email is required"));

    type_text(&mut state, "me@example.com");
    state.handle_command(Command::NextField);
    type_text(&mut state, "pw");
    let effects = state.handle_command(Command::Submit);
    assert_eq!(
        effects,
        vec![Effect::Mutate(Mutation::Login {
            email: "me@example.com".into(),
            password: "pw".into()
        })]
    );

    let effects = state.apply(AppEvent::Mutated(Mutated::SignedIn(Ok(TokenResponse {
        access_token: "t".into(),
        token_type: None,
    }))));
    assert_eq!(effects[0], Effect::SaveToken("t".into()));
    assert_eq!(state.screen, Screen::Dashboard);
    assert!(state.overview.is_loading());
}

#[test]
fn test_failed_sign_in_stays_on_form() {
    let mut state = AppState::new(false, PmPreference::default(), BrowserConfig::default());
    let effects = state.apply(AppEvent::Mutated(Mutated::SignedIn(Err(
        ApiError::Application {
            status: 401,
            detail: "Incorrect email or password".into(),
        },
    ))));
    assert!(effects.is_empty());
    assert_eq!(state.screen, Screen::Auth);
    assert_eq!(
        state.auth_form.hint.as_deref(),
        Some("Incorrect email or password")
    );
}

#[test]
fn test_first_account_becomes_pm_preference() {
    let mut state = dashboard();
    state.handle_command(Command::ShowPanel(Panel::Accounts));
    state.handle_command(Command::NewItem);
    assert!(matches!(state.modal(), Some(Modal::Form(_))));

    let created = Account {
        model_name: Some("gpt-4o".into()),
        ..account("a1")
    };
    let effects = state.apply(AppEvent::Mutated(Mutated::AccountCreated(Ok(created))));
    let expected = PmPreference::new("a1", Some("gpt-4o".into()));
    assert!(effects.contains(&Effect::SavePmPreference(expected.clone())));
    assert_eq!(state.pm_pref, expected);
    assert!(state.modals.is_empty());

    // a second account leaves the preference alone
    let effects = state.apply(AppEvent::Mutated(Mutated::AccountCreated(Ok(account("a2")))));
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::SavePmPreference(_))));
    assert_eq!(state.pm_pref, expected);
}

#[test]
fn test_allow_list_edit_reconciles_pm_model() {
    let mut state = AppState::new(
        true,
        PmPreference::new("a1", Some("gpt-4".into())),
        BrowserConfig::default(),
    );
    let narrowed = Account {
        enabled_models: Some(vec!["gpt-4o-mini".into()]),
        ..account("a1")
    };
    let effects = state.apply(AppEvent::Mutated(Mutated::AccountUpdated(Ok(narrowed))));
    assert!(effects.contains(&Effect::SavePmPreference(PmPreference::new(
        "a1",
        Some("gpt-4o-mini".into())
    ))));
}

#[test]
fn test_failed_mutation_shows_notice() {
    let mut state = dashboard();
    state.handle_command(Command::ShowPanel(Panel::Projects));
    state.handle_command(Command::NewItem);
    type_text(&mut state, "Fulcrum");
    let effects = state.handle_command(Command::Submit);
    assert!(matches!(
        effects.as_slice(),
        [Effect::Mutate(Mutation::CreateProject(_))]
    ));

    state.apply(AppEvent::Mutated(Mutated::ProjectCreated(Err(
        ApiError::Application {
            status: 400,
            detail: "Project name taken".into(),
        },
    ))));
    match state.modal() {
        Some(Modal::Notice { message, .. }) => assert_eq!(message, "Project name taken"),
        other => panic!("expected notice, got {:?}", other),
    }
    // dismissing the notice returns to the still-open form
    state.handle_command(Command::Submit);
    match state.modal() {
        Some(Modal::Form(form)) => assert!(!form.submitting),
        other => panic!("expected form, got {:?}", other),
    }
}

#[test]
fn test_chat_without_llm_answers_locally() {
    let mut state = dashboard();
    let token = token_of(&state.start(), |f| *f == Fetch::Overview);
    state.apply(loaded(
        token,
        Loaded::Overview(Ok(Overview {
            llm_status: NO_LLM_STATUS.into(),
            ..Default::default()
        })),
    ));

    state.handle_command(Command::ShowPanel(Panel::Chat));
    type_text(&mut state, "hello");
    let effects = state.handle_command(Command::Submit);
    assert!(effects.is_empty());
    assert_eq!(state.chat.messages.len(), 2);
    assert_eq!(state.chat.messages[1].text, NO_LLM_REPLY);
}

#[test]
fn test_chat_round_trip() {
    let mut state = AppState::new(
        true,
        PmPreference::new("a1", Some("gpt-4o".into())),
        BrowserConfig::default(),
    );
    state.handle_command(Command::ShowPanel(Panel::Chat));
    type_text(&mut state, "  status?  ");
    let effects = state.handle_command(Command::Submit);
    let token = token_of(&effects, |f| match f {
        Fetch::Chat(request) => {
            request.message == "status?"
                && request.account_id.as_deref() == Some("a1")
                && request.model_name.as_deref() == Some("gpt-4o")
        }
        _ => false,
    });
    assert!(state.chat.pending);
    assert!(state.chat.input.is_empty());

    // no second send while waiting
    type_text(&mut state, "again");
    assert!(state.handle_command(Command::Submit).is_empty());

    state.apply(loaded(
        token,
        Loaded::Chat(Ok(ChatReply {
            response: "All green".into(),
            model_used: Some("gpt-4o".into()),
        })),
    ));
    let reply = state.chat.messages.last().unwrap();
    assert_eq!(reply.role, ChatRole::Assistant);
    assert_eq!(reply.text, "All green");
    assert!(!state.chat.pending);
}

#[test]
fn test_pm_settings_save() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::OpenPmSettings);
    let accounts_token = token_of(&effects, |f| *f == Fetch::PmAccounts);

    // nothing saved yet: no model request until an account is picked
    let effects = state.apply(loaded(
        accounts_token,
        Loaded::PmAccounts(Ok(vec![account("a1"), account("a2")])),
    ));
    assert!(effects.is_empty());

    let effects = state.handle_command(Command::CursorDown);
    let models_token = token_of(&effects, |f| {
        *f == Fetch::PmModels {
            account_id: "a1".into(),
        }
    });
    state.apply(loaded(
        models_token,
        Loaded::PmModels(Ok(vec!["gpt-4".into(), "gpt-4o".into()])),
    ));

    let effects = state.handle_command(Command::Submit);
    assert_eq!(
        effects,
        vec![Effect::SavePmPreference(PmPreference::new(
            "a1",
            Some("gpt-4".into())
        ))]
    );
    match state.modal() {
        Some(Modal::Notice { message, .. }) => assert_eq!(message, "PM Settings saved!"),
        other => panic!("expected notice, got {:?}", other),
    }
}

#[test]
fn test_project_browser_saves_path() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::ShowPanel(Panel::Projects));
    let projects = token_of(&effects, |f| *f == Fetch::Projects);
    let coder = token_of(&effects, |f| *f == Fetch::CoderAccounts);

    state.apply(loaded(
        coder,
        Loaded::CoderAccounts(Ok(vec![CoderAccount {
            id: "c1".into(),
            ..Default::default()
        }])),
    ));
    state.apply(loaded(
        projects,
        Loaded::Projects(Ok(vec![Project {
            id: "p1".into(),
            name: "Fulcrum".into(),
            workspace_id: Some("w1".into()),
            workspace_path: Some("/srv".into()),
            ..Default::default()
        }])),
    ));

    let effects = state.handle_command(Command::BrowseWorkspace);
    let browse = token_of(&effects, |f| match f {
        Fetch::Folders { target, start } => {
            target.account_id == "c1" && *start == StartLocation::Exact("/srv".into())
        }
        _ => false,
    });
    state.apply(loaded(
        browse,
        Loaded::Folders(Ok(FolderListing {
            path: "/srv".into(),
            folders: vec![Folder {
                name: "app".into(),
                path: None,
            }],
        })),
    ));

    let effects = state.handle_command(Command::Submit);
    let open = token_of(&effects, |f| match f {
        Fetch::Folders { start, .. } => *start == StartLocation::Exact("/srv/app".into()),
        _ => false,
    });
    state.apply(loaded(
        open,
        Loaded::Folders(Ok(FolderListing {
            path: "/srv/app".into(),
            folders: Vec::new(),
        })),
    ));

    let effects = state.handle_command(Command::SaveSelection);
    match effects.as_slice() {
        [Effect::Mutate(Mutation::UpdateProject { id, patch })] => {
            assert_eq!(id, "p1");
            assert_eq!(patch.workspace_path.as_deref(), Some("/srv/app"));
        }
        other => panic!("unexpected effects {:?}", other),
    }
}

#[test]
fn test_closing_browser_drops_late_listing() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::ShowPanel(Panel::Projects));
    let projects = token_of(&effects, |f| *f == Fetch::Projects);
    state.apply(loaded(
        projects,
        Loaded::Projects(Ok(vec![Project {
            id: "p1".into(),
            name: "Fulcrum".into(),
            workspace_id: Some("w1".into()),
            coder_account_id: Some("c1".into()),
            ..Default::default()
        }])),
    ));

    let effects = state.handle_command(Command::BrowseWorkspace);
    let browse = token_of(&effects, |f| matches!(f, Fetch::Folders { .. }));
    state.handle_command(Command::CloseModal);
    assert!(state.modals.is_empty());

    let effects = state.apply(loaded(
        browse,
        Loaded::Folders(Ok(FolderListing::default())),
    ));
    assert!(effects.is_empty());
    assert!(state.modals.is_empty());
}

#[test]
fn test_pm_settings_save_waits_for_models() {
    let saved = PmPreference::new("a1", Some("gpt-4".into()));
    let mut state = AppState::new(true, saved.clone(), BrowserConfig::default());
    let effects = state.handle_command(Command::OpenPmSettings);
    let accounts_token = token_of(&effects, |f| *f == Fetch::PmAccounts);
    let effects = state.apply(loaded(
        accounts_token,
        Loaded::PmAccounts(Ok(vec![account("a1")])),
    ));
    assert_eq!(effects.len(), 1, "models request should be in flight");

    // Enter before /chat/models answers must not erase the saved model
    let effects = state.handle_command(Command::Submit);
    assert!(effects.is_empty(), "unexpected effects {:?}", effects);
    assert_eq!(state.pm_pref, saved);
    match state.modal() {
        Some(Modal::PmSettings(modal)) => {
            assert_eq!(modal.hint.as_deref(), Some("Wait for the model list to load"));
        }
        other => panic!("expected PM settings, got {:?}", other),
    }
}

#[test]
fn test_pm_settings_without_account_is_not_saved() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::OpenPmSettings);
    let accounts_token = token_of(&effects, |f| *f == Fetch::PmAccounts);
    state.apply(loaded(
        accounts_token,
        Loaded::PmAccounts(Ok(vec![account("a1")])),
    ));

    let effects = state.handle_command(Command::Submit);
    assert!(effects.is_empty());
    assert_eq!(state.pm_pref, PmPreference::default());
    assert!(matches!(state.modal(), Some(Modal::PmSettings(_))));
}

#[test]
fn test_unreachable_workspace_keeps_saved_path() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::ShowPanel(Panel::Projects));
    let projects = token_of(&effects, |f| *f == Fetch::Projects);
    state.apply(loaded(
        projects,
        Loaded::Projects(Ok(vec![Project {
            id: "p1".into(),
            name: "Fulcrum".into(),
            workspace_id: Some("w1".into()),
            coder_account_id: Some("c1".into()),
            workspace_path: Some("/srv/app".into()),
            ..Default::default()
        }])),
    ));

    let effects = state.handle_command(Command::BrowseWorkspace);
    let browse = token_of(&effects, |f| matches!(f, Fetch::Folders { .. }));

    // still loading: nothing confirmed yet
    assert!(state.handle_command(Command::SaveSelection).is_empty());

    state.apply(loaded(
        browse,
        Loaded::Folders(Err(ApiError::Conflict("Workspace is stopped".into()))),
    ));
    let effects = state.handle_command(Command::SaveSelection);
    assert!(effects.is_empty(), "unexpected effects {:?}", effects);
    assert!(state
        .status
        .as_deref()
        .is_some_and(|s| s.contains("Workspace is stopped")));
    assert!(matches!(state.modal(), Some(Modal::Browser(_))));
}

#[test]
fn test_results_reach_modal_under_notice() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::OpenPmSettings);
    let accounts_token = token_of(&effects, |f| *f == Fetch::PmAccounts);

    state.apply(AppEvent::Mutated(Mutated::AuthorizeUrl {
        provider: "GitHub",
        result: Ok(AuthorizeUrl {
            url: "https://github.com/login/oauth/authorize".into(),
        }),
    }));
    assert!(matches!(state.modal(), Some(Modal::Notice { .. })));

    state.apply(loaded(
        accounts_token,
        Loaded::PmAccounts(Ok(vec![account("a1")])),
    ));
    state.handle_command(Command::Submit);

    match state.modal() {
        Some(Modal::PmSettings(modal)) => {
            let settings = modal.settings.loaded().expect("settings loaded");
            assert_eq!(settings.accounts.len(), 1);
        }
        other => panic!("expected PM settings, got {:?}", other),
    }
}

#[test]
fn test_late_account_update_keeps_other_modal_open() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::ShowPanel(Panel::Accounts));
    let accounts = token_of(&effects, |f| *f == Fetch::Accounts);
    state.apply(loaded(
        accounts,
        Loaded::Accounts(Ok(vec![account("a1"), account("a2")])),
    ));
    state.handle_command(Command::CursorDown);
    state.handle_command(Command::EditModels);
    assert!(matches!(state.modal(), Some(Modal::Models(p)) if p.account.id == "a2"));

    // an earlier edit of a1 finishing late leaves a2's picker alone
    state.apply(AppEvent::Mutated(Mutated::AccountUpdated(Ok(account("a1")))));
    assert!(matches!(state.modal(), Some(Modal::Models(p)) if p.account.id == "a2"));

    state.apply(AppEvent::Mutated(Mutated::AccountUpdated(Ok(account("a2")))));
    assert!(state.modals.is_empty());
}

#[test]
fn test_model_picker_cursor_wraps() {
    let mut state = dashboard();
    let effects = state.handle_command(Command::ShowPanel(Panel::Accounts));
    let accounts = token_of(&effects, |f| *f == Fetch::Accounts);
    state.apply(loaded(accounts, Loaded::Accounts(Ok(vec![account("a1")]))));

    let effects = state.handle_command(Command::EditModels);
    let models = token_of(&effects, |f| matches!(f, Fetch::AccountModels { .. }));
    state.apply(loaded(
        models,
        Loaded::AccountModels(Ok(vec!["gpt-4".into(), "gpt-4o".into()])),
    ));

    state.handle_command(Command::CursorDown);
    assert!(matches!(state.modal(), Some(Modal::Models(p)) if p.cursor == 1));
    state.handle_command(Command::CursorDown);
    assert!(matches!(state.modal(), Some(Modal::Models(p)) if p.cursor == 0));
    state.handle_command(Command::CursorUp);
    assert!(matches!(state.modal(), Some(Modal::Models(p)) if p.cursor == 1));
}
