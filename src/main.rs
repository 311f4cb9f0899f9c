mod app;
mod config;
mod domain;
mod infrastructure;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{App, Focus, InputMode, LookupPhase, StatusLevel};
use crate::infrastructure::ethereum::ProviderConfig;
use crate::infrastructure::indexing::AlchemyNftClient;
use crate::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};

#[derive(Debug, Parser)]
#[command(
    name = "glimpse",
    version,
    about = "Glimpse: a terminal NFT collection viewer"
)]
struct Args {
    /// HTTP JSON-RPC wallet endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket wallet endpoint (e.g. ws://localhost:8546)
    #[arg(long)]
    ws: Option<String>,

    /// Indexing API key (overrides GLIMPSE_API_KEY and the config file)
    #[arg(long)]
    api_key: Option<String>,

    /// Owner address or ENS name to look up on startup
    #[arg(long)]
    owner: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load();
    let endpoints = endpoints_from_args_and_config(&args, &config);
    let initial_endpoint_display = endpoints
        .first()
        .map(|endpoint| endpoint.display())
        .unwrap_or_else(|| "localhost:8545".to_string());

    let api_key = args
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .or_else(|| config.indexing_api_key());
    let missing_api_key = api_key.is_none();
    let index = Arc::new(AlchemyNftClient::new(
        &config.indexing_base_url(),
        api_key.as_deref().unwrap_or("demo"),
    ));

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create the runtime bridge; the indexing client is injected
    let runtime = RuntimeBridge::new(endpoints, index)?;

    let mut app = App::new(config.placeholder_image.clone());
    app.endpoint = initial_endpoint_display;
    app.set_status("Connecting…", StatusLevel::Info);
    if missing_api_key {
        app.set_status(
            "No indexing API key configured - using the rate-limited demo key \
             (set GLIMPSE_API_KEY)",
            StatusLevel::Warn,
        );
    }
    if let Some(owner) = args.owner.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        app.input = owner.to_string();
        app.submit_lookup();
    }

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &mut app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    // Process runtime events
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::Connected {
                endpoint,
                node_kind,
                accounts,
            } => app.apply_connected(endpoint, node_kind, accounts),
            RuntimeEvent::AccountsChanged { accounts } => app.apply_accounts_changed(accounts),
            RuntimeEvent::GalleryReady {
                generation,
                owner,
                gallery,
            } => app.apply_gallery(generation, owner, gallery),
            RuntimeEvent::LookupFailed {
                generation,
                failure,
                message,
            } => app.apply_lookup_failed(generation, failure, message),
            RuntimeEvent::WalletUnavailable { message } => app.apply_wallet_unavailable(message),
            RuntimeEvent::Error { message } => app.apply_error(message),
        }
    }

    // Forward pending requests
    if let Some((generation, query)) = app.take_lookup_request() {
        let _ = runtime.send(RuntimeCommand::Lookup { generation, query });
    }
    if app.take_connect_request() {
        let _ = runtime.send(RuntimeCommand::ConnectWallet);
    }
}

fn endpoints_from_args_and_config(args: &Args, config: &config::Config) -> Vec<ProviderConfig> {
    let mut endpoints = Vec::new();

    // CLI arguments take precedence
    if let Some(ws) = args.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        endpoints.push(ProviderConfig::WebSocket(ws.to_string()));
    } else if let Some(rpc) = args.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        endpoints.push(ProviderConfig::Http(normalize_http_endpoint(rpc)));
    }

    // Config file endpoints
    for entry in &config.endpoints {
        if let Some(rpc) = entry.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            endpoints.push(ProviderConfig::Http(normalize_http_endpoint(rpc)));
            continue;
        }
        if let Some(ws) = entry.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            endpoints.push(ProviderConfig::WebSocket(ws.to_string()));
        }
    }

    // Default fallback
    if endpoints.is_empty() {
        endpoints.push(ProviderConfig::Http(normalize_http_endpoint(
            "localhost:8545",
        )));
    }

    endpoints
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => app.should_quit = true,
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char('i') | KeyCode::Char('/'), _) => app.enter_edit(),
        (KeyCode::Enter, _) => app.submit_lookup(),
        (KeyCode::Char('c'), _) => app.request_connect(),
        (KeyCode::Char('r'), _) => app.retry_lookup(),
        (KeyCode::Tab, _) => {
            app.focus = match app.focus {
                Focus::Input => Focus::Gallery,
                Focus::Gallery => Focus::Input,
            };
        }
        (KeyCode::Char('y'), _) => copy_to_clipboard(app, CopyTarget::Contract),
        (KeyCode::Char('Y'), _) => copy_to_clipboard(app, CopyTarget::Image),
        (KeyCode::Left | KeyCode::Char('h'), _) => {
            if gallery_focused(app) {
                app.move_selection_left();
            }
        }
        (KeyCode::Right | KeyCode::Char('l'), _) => {
            if gallery_focused(app) {
                app.move_selection_right();
            }
        }
        (KeyCode::Up | KeyCode::Char('k'), _) => {
            if gallery_focused(app) {
                app.move_selection_up();
            }
        }
        (KeyCode::Down | KeyCode::Char('j'), _) => {
            if gallery_focused(app) {
                app.move_selection_down();
            }
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_edit(),
        KeyCode::Enter => {
            app.exit_edit();
            app.submit_lookup();
        }
        KeyCode::Backspace => app.backspace_input(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_input(),
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.push_input(ch);
        }
        _ => {}
    }
}

fn gallery_focused(app: &App) -> bool {
    app.focus == Focus::Gallery && app.phase == LookupPhase::Success
}

enum CopyTarget {
    Contract,
    Image,
}

fn copy_to_clipboard(app: &mut App, target: CopyTarget) {
    use arboard::Clipboard;

    let Some(cell) = app.selected_cell() else {
        app.set_status("Nothing to copy", StatusLevel::Warn);
        return;
    };
    let text = match target {
        CopyTarget::Contract => cell.contract_address.clone(),
        CopyTarget::Image => cell.image_uri.clone(),
    };

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                let shown = if text.len() > 24 {
                    format!("{}…", &text[..24])
                } else {
                    text
                };
                app.set_status(format!("Copied: {shown}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}
