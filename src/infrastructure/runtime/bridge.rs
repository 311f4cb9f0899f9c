//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! This module provides a bridge between the synchronous TUI (ratatui) thread
//! and the asynchronous Tokio runtime that handles wallet RPC and indexing
//! API operations.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tokio::runtime::Runtime;

use crate::domain::address::AddressQuery;
use crate::domain::nft::Gallery;
use crate::infrastructure::ethereum::ProviderConfig;
use crate::infrastructure::indexing::NftIndex;
use crate::infrastructure::runtime::worker::run_async_worker;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Resolve a validated query and fetch its gallery
    Lookup {
        generation: u64,
        query: AddressQuery,
    },
    /// Ask the wallet endpoint to expose accounts (may prompt the user)
    ConnectWallet,
    /// Shutdown the worker
    Shutdown,
}

/// Which stage of a lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailure {
    /// The name is well-formed but has no address record
    UnresolvedName,
    /// Name resolution, ownership query or metadata fetch failed remotely
    Network,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Successfully connected to a wallet endpoint
    Connected {
        endpoint: String,
        node_kind: String,
        accounts: Vec<String>,
    },
    /// The wallet endpoint's account list changed; first entry is current
    AccountsChanged { accounts: Vec<String> },
    /// A lookup completed; gallery is index-aligned
    GalleryReady {
        generation: u64,
        owner: String,
        gallery: Gallery,
    },
    /// A lookup failed terminally for this generation
    LookupFailed {
        generation: u64,
        failure: LookupFailure,
        message: String,
    },
    /// Wallet endpoint missing or connect prompt declined - warn, not fatal
    WalletUnavailable { message: String },
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Create a new runtime bridge. The indexing client is injected so the
    /// worker never constructs its own network dependencies.
    pub fn new(
        endpoints: Vec<ProviderConfig>,
        index: Arc<dyn NftIndex>,
    ) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        // Spawn the worker thread with its own Tokio runtime
        thread::spawn(move || {
            let rt = Runtime::new().expect("Failed to create Tokio runtime");
            rt.block_on(async {
                if let Err(err) = run_async_worker(endpoints, index, cmd_rx, evt_tx.clone()).await {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Worker exited: {:#}", err),
                    });
                }
            });
        });

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        // Guaranteed teardown: the worker drops its session and account watch
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
