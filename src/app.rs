use std::time::{Duration, Instant};

use crate::domain::address::{AddressQuery, ResolveError};
use crate::domain::nft::{Gallery, PLACEHOLDER_IMAGE};
use crate::infrastructure::runtime::LookupFailure;

/// Where key input is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Gallery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Lookup lifecycle: Idle -> Loading -> {Success, Error}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// One rendered grid cell - title and image URI already carry their
/// fallbacks so the UI layer never decides content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryCell {
    pub title: String,
    pub contract_address: String,
    pub token_id: String,
    pub image_uri: String,
}

/// TUI session state. Single writer: the TUI thread.
pub struct App {
    // Address input line
    pub input: String,
    pub input_mode: InputMode,
    pub focus: Focus,

    // Wallet session view
    pub wallet_address: Option<String>,
    pub wallet_accounts: Vec<String>,
    pub endpoint: String,
    pub node_kind: String,

    // Lookup state machine
    pub phase: LookupPhase,
    pub error: Option<String>,
    pub generation: u64,
    pub owner: Option<String>,
    pub cells: Vec<GalleryCell>,
    pub truncated: bool,
    pub selected: usize,
    /// Columns of the grid as last laid out; keyboard navigation uses it
    pub grid_columns: usize,

    // Pending requests picked up by the event pump
    pending_lookup: Option<(u64, AddressQuery)>,
    pending_connect: bool,
    last_query: Option<AddressQuery>,

    pub status: Option<StatusMessage>,
    pub help_open: bool,
    pub should_quit: bool,

    placeholder_image: String,
}

impl App {
    pub fn new(placeholder_image: Option<String>) -> Self {
        Self {
            input: String::new(),
            input_mode: InputMode::Normal,
            focus: Focus::Input,
            wallet_address: None,
            wallet_accounts: Vec::new(),
            endpoint: String::new(),
            node_kind: "connecting".to_string(),
            phase: LookupPhase::Idle,
            error: None,
            generation: 0,
            owner: None,
            cells: Vec::new(),
            truncated: false,
            selected: 0,
            grid_columns: 1,
            pending_lookup: None,
            pending_connect: false,
            last_query: None,
            status: None,
            help_open: false,
            should_quit: false,
            placeholder_image: placeholder_image
                .filter(|uri| !uri.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(4) {
                self.status = None;
            }
        }
        self.clamp_selection();
    }

    // --- address input -----------------------------------------------------

    pub fn enter_edit(&mut self) {
        self.input_mode = InputMode::Editing;
        self.focus = Focus::Input;
    }

    pub fn exit_edit(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn push_input(&mut self, ch: char) {
        self.input.push(ch);
        self.error = None;
    }

    pub fn backspace_input(&mut self) {
        self.input.pop();
        self.error = None;
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.error = None;
    }

    // --- lookup state machine ----------------------------------------------

    /// Validate the input and queue a lookup. The syntactic check runs here,
    /// on the UI thread - invalid input never produces a command, so no
    /// network traffic can happen for it.
    pub fn submit_lookup(&mut self) {
        match AddressQuery::parse(&self.input) {
            Ok(query) => self.start_lookup(query),
            Err(err) => {
                self.phase = LookupPhase::Error;
                self.error = Some(user_message(&err));
                self.set_status(user_message(&err), StatusLevel::Error);
            }
        }
    }

    /// Re-run the last submitted query, if any
    pub fn retry_lookup(&mut self) {
        let Some(query) = self.last_query.clone() else {
            self.set_status("Nothing to retry", StatusLevel::Warn);
            return;
        };
        self.start_lookup(query);
    }

    fn start_lookup(&mut self, query: AddressQuery) {
        // Starting a new query supersedes anything in flight: results
        // arriving for an older generation are discarded on arrival
        self.generation += 1;
        self.phase = LookupPhase::Loading;
        self.error = None;
        self.cells.clear();
        self.owner = None;
        self.truncated = false;
        self.selected = 0;
        self.last_query = Some(query.clone());
        self.pending_lookup = Some((self.generation, query.clone()));
        self.set_status(format!("Looking up {}…", query.display()), StatusLevel::Info);
    }

    pub fn request_connect(&mut self) {
        self.pending_connect = true;
        self.set_status("Requesting wallet accounts…", StatusLevel::Info);
    }

    pub fn take_lookup_request(&mut self) -> Option<(u64, AddressQuery)> {
        self.pending_lookup.take()
    }

    pub fn take_connect_request(&mut self) -> bool {
        if self.pending_connect {
            self.pending_connect = false;
            true
        } else {
            false
        }
    }

    // --- event application -------------------------------------------------

    pub fn apply_connected(&mut self, endpoint: String, node_kind: String, accounts: Vec<String>) {
        self.endpoint = endpoint;
        self.node_kind = node_kind;
        self.adopt_accounts(accounts);
        self.set_status("Wallet endpoint connected", StatusLevel::Info);
    }

    pub fn apply_accounts_changed(&mut self, accounts: Vec<String>) {
        self.adopt_accounts(accounts);
        if let Some(address) = self.wallet_address.clone() {
            self.set_status(format!("Active account: {address}"), StatusLevel::Info);
        }
    }

    fn adopt_accounts(&mut self, accounts: Vec<String>) {
        if accounts.is_empty() {
            return;
        }
        self.wallet_address = Some(accounts[0].clone());
        self.wallet_accounts = accounts;
        // Pre-fill the input with the active account, but never clobber
        // text the user is editing right now
        if self.input_mode != InputMode::Editing {
            self.input = self.wallet_address.clone().unwrap_or_default();
            self.error = None;
        }
    }

    pub fn apply_gallery(&mut self, generation: u64, owner: String, gallery: Gallery) {
        if generation != self.generation {
            // Stale: a newer query has been submitted since
            return;
        }
        self.phase = LookupPhase::Success;
        self.error = None;
        self.owner = Some(owner);
        self.truncated = gallery.truncated;
        self.selected = 0;
        let placeholder = self.placeholder_image.clone();
        self.cells = gallery
            .iter()
            .map(|(token, meta)| {
                // Metadata title wins, then the ownership record's, then the
                // original client's "No Name"
                let title = if meta.title.trim().is_empty() && !token.title.trim().is_empty() {
                    token.title.clone()
                } else {
                    meta.display_title().to_string()
                };
                let image_uri = meta.image_uri().unwrap_or(&placeholder).to_string();
                GalleryCell {
                    title,
                    contract_address: token.contract_address.clone(),
                    token_id: token.token_id.clone(),
                    image_uri,
                }
            })
            .collect();

        if self.cells.is_empty() {
            self.set_status("No NFTs found for this address", StatusLevel::Info);
        } else if self.truncated {
            self.set_status(
                format!("Showing first page ({} tokens)", self.cells.len()),
                StatusLevel::Warn,
            );
        } else {
            self.set_status(format!("{} tokens", self.cells.len()), StatusLevel::Info);
        }
        if !self.cells.is_empty() {
            self.focus = Focus::Gallery;
        }
    }

    pub fn apply_lookup_failed(&mut self, generation: u64, _failure: LookupFailure, message: String) {
        if generation != self.generation {
            return;
        }
        self.phase = LookupPhase::Error;
        self.error = Some(message.clone());
        self.set_status(message, StatusLevel::Error);
    }

    pub fn apply_wallet_unavailable(&mut self, message: String) {
        // Logged, never blocking: the address input keeps working
        self.set_status(message, StatusLevel::Warn);
    }

    pub fn apply_error(&mut self, message: String) {
        self.set_status(message, StatusLevel::Error);
    }

    // --- gallery navigation ------------------------------------------------

    pub fn selected_cell(&self) -> Option<&GalleryCell> {
        self.cells.get(self.selected)
    }

    pub fn move_selection_left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_selection_right(&mut self) {
        if self.selected + 1 < self.cells.len() {
            self.selected += 1;
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(self.grid_columns.max(1));
    }

    pub fn move_selection_down(&mut self) {
        let next = self.selected + self.grid_columns.max(1);
        if next < self.cells.len() {
            self.selected = next;
        }
    }

    fn clamp_selection(&mut self) {
        if self.cells.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.cells.len() {
            self.selected = self.cells.len() - 1;
        }
    }
}

fn user_message(err: &ResolveError) -> String {
    match err {
        ResolveError::InvalidFormat => {
            "Invalid address. Enter an Ethereum address or ENS name.".to_string()
        }
        other => other.to_string(),
    }
}
