//! Panel bodies
//!
//! One render function per dashboard panel. Each shows the panel's
//! `LoadState`: a placeholder while idle or loading, the error text on
//! failure, the data once loaded.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::tui::theme::Theme;
use crate::ui_backend::{AppState, ChatRole, IntegrationFocus, LoadState, Panel};

use super::fit_width;

fn panel_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(theme.block_style(focused))
}

/// Placeholder text for anything but `Loaded`
fn placeholder<T>(state: &LoadState<T>, theme: &Theme) -> Option<Paragraph<'static>> {
    let (text, style) = match state {
        LoadState::Loaded(_) => return None,
        LoadState::Idle => ("Press r to load".to_string(), theme.muted()),
        LoadState::Loading => ("Loading...".to_string(), Style::default().fg(theme.yellow)),
        LoadState::Failed(message) => (format!("Error: {}", message), theme.error()),
    };
    Some(Paragraph::new(text).style(style).wrap(Wrap { trim: true }))
}

pub fn render_panel(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    match state.panel {
        Panel::Overview => render_overview(frame, area, state, theme),
        Panel::Projects => render_projects(frame, area, state, theme),
        Panel::Accounts => render_accounts(frame, area, state, theme),
        Panel::Chat => render_chat(frame, area, state, theme),
        Panel::Integrations => render_integrations(frame, area, state, theme),
    }
}

fn render_overview(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let block = panel_block("Overview", true, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(p) = placeholder(&state.overview, theme) {
        frame.render_widget(p, inner);
        return;
    }
    let Some(overview) = state.overview.loaded() else {
        return;
    };

    let llm_style = if overview.has_llm() {
        Style::default().fg(theme.green)
    } else {
        Style::default().fg(theme.yellow)
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("LLM status   ", theme.muted()),
            Span::styled(state.llm_status().to_string(), llm_style),
        ]),
        Line::from(vec![
            Span::styled("Projects     ", theme.muted()),
            Span::styled(
                overview.project_count.to_string(),
                Style::default().fg(theme.text_primary),
            ),
        ]),
        Line::default(),
    ];
    if overview.projects.is_empty() {
        lines.push(Line::from(Span::styled(
            "No projects yet. Create one from the Projects panel (n).",
            theme.muted(),
        )));
    }
    for project in &overview.projects {
        lines.push(Line::from(vec![
            Span::styled("• ", Style::default().fg(theme.purple)),
            Span::styled(project.name.clone(), Style::default().fg(theme.text_primary)),
            Span::styled(format!("  #{}", project.short_id()), theme.muted()),
        ]));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_projects(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    let block = panel_block("Projects  n:new e:edit b:browse", true, theme);
    let inner = block.inner(list_area);
    frame.render_widget(block, list_area);
    if let Some(p) = placeholder(&state.projects, theme) {
        frame.render_widget(p, inner);
    } else if let Some(projects) = state.projects.loaded() {
        if projects.is_empty() {
            frame.render_widget(
                Paragraph::new("No projects yet. Press n to create one.").style(theme.muted()),
                inner,
            );
        } else {
            let width = inner.width as usize;
            let items: Vec<ListItem> = projects
                .iter()
                .map(|p| {
                    let source = p.source_type.as_deref().unwrap_or("local");
                    ListItem::new(Line::from(vec![
                        Span::raw(fit_width(&p.name, width.saturating_sub(10))),
                        Span::styled(format!("  {}", source), theme.muted()),
                    ]))
                })
                .collect();
            let mut list_state = ListState::default().with_selected(Some(state.project_cursor));
            frame.render_stateful_widget(
                List::new(items).highlight_style(theme.selected()),
                inner,
                &mut list_state,
            );
        }
    }

    let block = panel_block("Details", false, theme);
    let inner = block.inner(detail_area);
    frame.render_widget(block, detail_area);
    let Some(project) = state.selected_project() else {
        return;
    };
    let row = |label: &'static str, value: Option<&str>| {
        Line::from(vec![
            Span::styled(format!("{:<16}", label), theme.muted()),
            Span::styled(
                value.filter(|v| !v.is_empty()).unwrap_or("-").to_string(),
                Style::default().fg(theme.text_primary),
            ),
        ])
    };
    let lines = vec![
        row("Name", Some(project.name.as_str())),
        row("ID", Some(project.id.as_str())),
        row("Description", project.description.as_deref()),
        row("Source", project.source_type.as_deref()),
        row("Remote", project.remote_url.as_deref()),
        row("GitHub repo", project.github_repo.as_deref()),
        row("Workspace", project.workspace_name.as_deref()),
        row("Workspace path", project.workspace_path.as_deref()),
        row("Production", project.production_url.as_deref()),
        row("Testing", project.testing_url.as_deref()),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_accounts(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let block = panel_block("AI Accounts  n:new e:rename m:models d:delete", true, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(p) = placeholder(&state.accounts, theme) {
        frame.render_widget(p, inner);
        return;
    }
    let Some(accounts) = state.accounts.loaded() else {
        return;
    };
    if accounts.is_empty() {
        frame.render_widget(
            Paragraph::new("No AI accounts. Press n to add your provider credentials.")
                .style(theme.muted()),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = accounts
        .iter()
        .map(|account| {
            let pm = state.pm_pref.account_id.as_deref() == Some(account.id.as_str());
            let mut spans = vec![
                Span::styled(
                    format!("{:<20}", fit_width(&account.display_name(), 20)),
                    Style::default().fg(theme.text_primary),
                ),
                Span::styled(format!(" {:<13}", account.provider), Style::default().fg(theme.cyan)),
                Span::styled(
                    format!(" {:<14}", account.default_model().unwrap_or_default()),
                    Style::default().fg(theme.green),
                ),
                Span::styled(format!(" {}", account.allow_list()), theme.muted()),
            ];
            if account.is_global {
                spans.push(Span::styled("  global", Style::default().fg(theme.purple)));
            }
            if pm {
                spans.push(Span::styled("  ★ PM", Style::default().fg(theme.yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let mut list_state = ListState::default().with_selected(Some(state.account_cursor));
    frame.render_stateful_widget(
        List::new(items).highlight_style(theme.selected()),
        inner,
        &mut list_state,
    );
}

fn render_chat(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    let block = panel_block("PM Chat  Ctrl+P:settings", false, theme);
    let inner = block.inner(messages_area);
    frame.render_widget(block, messages_area);

    let mut lines: Vec<Line> = Vec::new();
    if state.chat.messages.is_empty() {
        lines.push(Line::from(Span::styled(
            "Ask the project manager about your projects.",
            theme.muted(),
        )));
    }
    for message in &state.chat.messages {
        let (who, color) = match message.role {
            ChatRole::User => ("You", theme.blue),
            ChatRole::Assistant => ("PM", theme.green),
        };
        let mut header = vec![
            Span::styled(who, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", message.at.format("%H:%M")), theme.muted()),
        ];
        if let Some(model) = &message.model {
            header.push(Span::styled(format!("  {}", model), theme.muted()));
        }
        lines.push(Line::from(header));
        for text in message.text.lines() {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(theme.text_primary),
            )));
        }
        lines.push(Line::default());
    }
    if state.chat.pending {
        lines.push(Line::from(Span::styled(
            "PM is thinking...",
            Style::default().fg(theme.yellow),
        )));
    }

    // keep the newest lines visible
    let visible = inner.height as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        inner,
    );

    let block = panel_block("Message", true, theme);
    let inner = block.inner(input_area);
    frame.render_widget(block, input_area);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(state.chat.input.clone(), Style::default().fg(theme.text_primary)),
            Span::styled("▏", Style::default().fg(theme.blue)),
        ])),
        inner,
    );
}

fn render_integrations(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let [github_area, coder_area] =
        Layout::vertical([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);
    let integrations = &state.integrations;

    let block = panel_block("GitHub  g:connect", false, theme);
    let inner = block.inner(github_area);
    frame.render_widget(block, github_area);
    if let Some(p) = placeholder(&integrations.github, theme) {
        frame.render_widget(p, inner);
    } else if let Some(github) = integrations.github.loaded() {
        let mut lines = Vec::new();
        let status = if github.status.connected {
            Span::styled(
                format!(
                    "Connected as {}",
                    github.status.username.as_deref().unwrap_or("unknown")
                ),
                Style::default().fg(theme.green),
            )
        } else if !github.status.configured {
            Span::styled("GitHub OAuth is not configured on the server", theme.muted())
        } else {
            Span::styled("Not connected (press g)", Style::default().fg(theme.yellow))
        };
        lines.push(Line::from(status));
        for repo in &github.repos {
            lines.push(Line::from(vec![
                Span::styled(
                    repo.full_name.clone().unwrap_or_default(),
                    Style::default().fg(theme.text_primary),
                ),
                Span::styled(
                    format!("  {}", repo.description.as_deref().unwrap_or("")),
                    theme.muted(),
                ),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    let [accounts_area, workspaces_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(coder_area);

    let focus_accounts = integrations.focus == IntegrationFocus::CoderAccounts;
    let block = panel_block("Coder  c:connect o:oauth d:remove", focus_accounts, theme);
    let inner = block.inner(accounts_area);
    frame.render_widget(block, accounts_area);
    if let Some(p) = placeholder(&integrations.coder_accounts, theme) {
        frame.render_widget(p, inner);
    } else if let Some(accounts) = integrations.coder_accounts.loaded() {
        if accounts.is_empty() {
            frame.render_widget(
                Paragraph::new("No Coder accounts. Press c to connect.").style(theme.muted()),
                inner,
            );
        } else {
            let items: Vec<ListItem> = accounts
                .iter()
                .map(|a| {
                    ListItem::new(Line::from(vec![
                        Span::raw(a.display_name().to_string()),
                        Span::styled(
                            format!("  {}", a.api_endpoint.as_deref().unwrap_or("")),
                            theme.muted(),
                        ),
                    ]))
                })
                .collect();
            let mut list_state =
                ListState::default().with_selected(Some(integrations.coder_cursor));
            frame.render_stateful_widget(
                List::new(items).highlight_style(theme.selected()),
                inner,
                &mut list_state,
            );
        }
    }

    let block = panel_block("Workspaces  b:browse", !focus_accounts, theme);
    let inner = block.inner(workspaces_area);
    frame.render_widget(block, workspaces_area);
    if let Some(p) = placeholder(&integrations.workspaces, theme) {
        frame.render_widget(p, inner);
    } else if let Some(workspaces) = integrations.workspaces.loaded() {
        if workspaces.is_empty() {
            frame.render_widget(Paragraph::new("No workspaces").style(theme.muted()), inner);
        } else {
            let items: Vec<ListItem> = workspaces
                .iter()
                .map(|w| {
                    let status = w.status.as_deref().unwrap_or("unknown");
                    let color = match status {
                        "running" => theme.green,
                        "stopped" | "failed" => theme.red,
                        _ => theme.yellow,
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(w.display_name().to_string()),
                        Span::styled(format!("  {}", status), Style::default().fg(color)),
                        Span::styled(
                            format!("  @{}", w.owner_name.as_deref().unwrap_or("?")),
                            theme.muted(),
                        ),
                    ]))
                })
                .collect();
            let mut list_state =
                ListState::default().with_selected(Some(integrations.workspace_cursor));
            frame.render_stateful_widget(
                List::new(items).highlight_style(theme.selected()),
                inner,
                &mut list_state,
            );
        }
    }
}
