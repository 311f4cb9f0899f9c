//! Async worker - runs in Tokio runtime and handles all network operations
//!
//! Owns the wallet session for the lifetime of a connection and at most one
//! in-flight lookup task. Submitting a new lookup aborts the previous task;
//! stamping every event with its generation lets the TUI discard anything
//! stale that still slips through.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::primitives::Address;
use anyhow::{Context, Result};
use futures::future::try_join_all;

use crate::domain::address::{to_checksummed, AddressQuery};
use crate::domain::nft::Gallery;
use crate::domain::session::WalletSession;
use crate::infrastructure::ethereum::{create_provider, ProviderConfig, WalletProvider};
use crate::infrastructure::indexing::{IndexError, NftIndex};
use crate::infrastructure::runtime::bridge::{LookupFailure, RuntimeCommand, RuntimeEvent};

/// How often the worker re-reads eth_accounts to emulate the
/// account-change subscription of an injected provider
const ACCOUNT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Pause between connection attempts to an unreachable wallet endpoint
const RECONNECT_INTERVAL: Duration = Duration::from_millis(900);

/// Run the async worker loop
pub async fn run_async_worker(
    endpoints: Vec<ProviderConfig>,
    index: Arc<dyn NftIndex>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    if endpoints.is_empty() {
        anyhow::bail!("No wallet endpoints configured");
    }

    let mut endpoint_index = 0usize;
    let mut provider: Option<Arc<dyn WalletProvider>> = None;
    let mut session = WalletSession::default();
    let mut last_accounts_check = Instant::now();
    let mut last_connect_attempt: Option<Instant> = None;
    let mut reported_unavailable = false;
    let mut active_lookup: Option<tokio::task::JoinHandle<()>> = None;

    loop {
        // Try to connect if not connected. A missing wallet endpoint never
        // blocks the command loop: hex-address lookups work without one.
        if provider.is_none()
            && last_connect_attempt.map_or(true, |at| at.elapsed() >= RECONNECT_INTERVAL)
        {
            last_connect_attempt = Some(Instant::now());
            let config = endpoints[endpoint_index].clone();
            match connect_to_endpoint(config.clone(), &evt_tx).await {
                Ok((p, initial_session)) => {
                    provider = Some(p);
                    session = initial_session;
                    last_accounts_check = Instant::now();
                    reported_unavailable = false;
                }
                Err(err) => {
                    // Report once per outage, keep retrying quietly
                    if !reported_unavailable {
                        let _ = evt_tx.send(RuntimeEvent::WalletUnavailable {
                            message: format!(
                                "Connection failed ({}): {:#}",
                                config.display(),
                                err
                            ),
                        });
                        reported_unavailable = true;
                    }

                    // Try next endpoint if available
                    if endpoints.len() > 1 {
                        endpoint_index = (endpoint_index + 1) % endpoints.len();
                    }
                }
            }
        }

        // Process commands (non-blocking)
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                RuntimeCommand::Shutdown => {
                    if let Some(active) = active_lookup.take() {
                        active.abort();
                    }
                    return Ok(());
                }

                RuntimeCommand::ConnectWallet => {
                    let Some(ref p) = provider else {
                        let _ = evt_tx.send(RuntimeEvent::WalletUnavailable {
                            message: "No wallet endpoint connected".to_string(),
                        });
                        continue;
                    };
                    match p.request_accounts().await {
                        Ok(accounts) => {
                            if session.apply_accounts(accounts) {
                                let _ = evt_tx.send(RuntimeEvent::AccountsChanged {
                                    accounts: display_accounts(&session),
                                });
                            }
                        }
                        Err(err) => {
                            let _ = evt_tx.send(RuntimeEvent::WalletUnavailable {
                                message: format!("Wallet connect failed: {:#}", err),
                            });
                        }
                    }
                }

                RuntimeCommand::Lookup { generation, query } => {
                    // A newer query supersedes whatever is in flight
                    if let Some(active) = active_lookup.take() {
                        active.abort();
                    }

                    let provider = provider.clone();
                    let index = Arc::clone(&index);
                    let evt_tx = evt_tx.clone();
                    active_lookup = Some(tokio::spawn(async move {
                        let event =
                            run_lookup(provider.as_deref(), index.as_ref(), generation, query)
                                .await;
                        let _ = evt_tx.send(event);
                    }));
                }
            }
        }

        // Drop the handle once its task has finished
        if active_lookup.as_ref().is_some_and(|task| task.is_finished()) {
            active_lookup = None;
        }

        // Account-change watch: poll and diff
        if let Some(ref p) = provider {
            if last_accounts_check.elapsed() >= ACCOUNT_POLL_INTERVAL {
                match p.accounts().await {
                    Ok(accounts) => {
                        if session.apply_accounts(accounts) {
                            let _ = evt_tx.send(RuntimeEvent::AccountsChanged {
                                accounts: display_accounts(&session),
                            });
                        }
                    }
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Wallet endpoint lost: {:#}", err),
                        });
                        provider = None;
                        session = WalletSession::default();
                        // Already reported; retry immediately and quietly
                        reported_unavailable = true;
                        last_connect_attempt = None;

                        if endpoints.len() > 1 {
                            endpoint_index = (endpoint_index + 1) % endpoints.len();
                        }
                        continue;
                    }
                }
                last_accounts_check = Instant::now();
            }
        }

        // Small yield to prevent busy loop
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Connect to an endpoint and seed the wallet session from its accounts
async fn connect_to_endpoint(
    config: ProviderConfig,
    evt_tx: &Sender<RuntimeEvent>,
) -> Result<(Arc<dyn WalletProvider>, WalletSession)> {
    let provider = create_provider(config).await?;

    let client_version = provider
        .client_version()
        .await
        .context("Failed to get client version")?;
    let node_kind = detect_node_kind(&client_version);

    // A bare node may expose no accounts; that only means the session
    // starts unset, manual address entry still works
    let accounts = provider.accounts().await.unwrap_or_default();
    let session = WalletSession::new(accounts);

    let _ = evt_tx.send(RuntimeEvent::Connected {
        endpoint: provider.endpoint_name(),
        node_kind,
        accounts: display_accounts(&session),
    });

    Ok((Arc::new(provider), session))
}

/// Detect endpoint kind from client version string
fn detect_node_kind(version: &str) -> String {
    let lower = version.to_lowercase();
    if lower.contains("anvil") {
        "anvil".to_string()
    } else if lower.contains("frame") {
        "frame".to_string()
    } else if lower.contains("reth") {
        "reth".to_string()
    } else if lower.contains("geth") || lower.contains("go-ethereum") {
        "geth".to_string()
    } else {
        version.to_string()
    }
}

fn display_accounts(session: &WalletSession) -> Vec<String> {
    session.accounts().iter().copied().map(to_checksummed).collect()
}

/// Resolve a query and fetch its gallery. Every exit path produces exactly
/// one event for this generation - the TUI can never be stuck loading.
async fn run_lookup(
    provider: Option<&dyn WalletProvider>,
    index: &dyn NftIndex,
    generation: u64,
    query: AddressQuery,
) -> RuntimeEvent {
    let owner = match query {
        AddressQuery::Hex(address) => address,
        AddressQuery::Name(ref name) => {
            let Some(provider) = provider else {
                return RuntimeEvent::LookupFailed {
                    generation,
                    failure: LookupFailure::Network,
                    message: "No wallet endpoint connected for name resolution".to_string(),
                };
            };
            match provider.resolve_name(name).await {
                Ok(Some(address)) => address,
                Ok(None) => {
                    return RuntimeEvent::LookupFailed {
                        generation,
                        failure: LookupFailure::UnresolvedName,
                        message: format!("{name} does not resolve to an account"),
                    }
                }
                Err(err) => {
                    return RuntimeEvent::LookupFailed {
                        generation,
                        failure: LookupFailure::Network,
                        message: format!("Name resolution failed: {:#}", err),
                    }
                }
            }
        }
    };

    match fetch_gallery(index, owner).await {
        Ok(gallery) => RuntimeEvent::GalleryReady {
            generation,
            owner: to_checksummed(owner),
            gallery,
        },
        Err(err) => RuntimeEvent::LookupFailed {
            generation,
            failure: LookupFailure::Network,
            message: format!("NFT lookup failed: {err}"),
        },
    }
}

/// List owned tokens, then fan out one metadata request per token.
///
/// The requests are issued without ordering dependency and jointly awaited;
/// one failure fails the whole batch. Output stays index-aligned with the
/// ownership list.
pub(crate) async fn fetch_gallery(
    index: &dyn NftIndex,
    owner: Address,
) -> Result<Gallery, IndexError> {
    let page = index.owned_tokens(owner).await?;
    if page.tokens.is_empty() {
        return Ok(Gallery::new(Vec::new(), Vec::new(), page.truncated));
    }

    let metadata = try_join_all(
        page.tokens
            .iter()
            .map(|token| index.token_metadata(&token.contract_address, &token.token_id)),
    )
    .await?;

    Ok(Gallery::new(page.tokens, metadata, page.truncated))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::nft::{OwnedToken, TokenMetadata};
    use crate::infrastructure::indexing::OwnedPage;

    struct StubIndex {
        tokens: Vec<OwnedToken>,
        truncated: bool,
        fail_metadata_for: Option<String>,
        metadata_requests: AtomicUsize,
    }

    impl StubIndex {
        fn with_tokens(count: usize) -> Self {
            let tokens = (0..count)
                .map(|i| OwnedToken {
                    contract_address: format!("0x{:040x}", i + 1),
                    token_id: format!("0x{:x}", i),
                    title: format!("Token #{i}"),
                })
                .collect();
            Self {
                tokens,
                truncated: false,
                fail_metadata_for: None,
                metadata_requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl NftIndex for StubIndex {
        async fn owned_tokens(&self, _owner: Address) -> Result<OwnedPage, IndexError> {
            Ok(OwnedPage {
                tokens: self.tokens.clone(),
                total_count: self.tokens.len() as u64,
                truncated: self.truncated,
            })
        }

        async fn token_metadata(
            &self,
            _contract_address: &str,
            token_id: &str,
        ) -> Result<TokenMetadata, IndexError> {
            self.metadata_requests.fetch_add(1, Ordering::SeqCst);
            if self.fail_metadata_for.as_deref() == Some(token_id) {
                return Err(IndexError::Status {
                    operation: "getNFTMetadata",
                    status: 500,
                });
            }
            Ok(TokenMetadata {
                title: format!("Meta {token_id}"),
                image: None,
            })
        }
    }

    fn owner() -> Address {
        Address::from([0xab; 20])
    }

    #[tokio::test]
    async fn n_tokens_issue_n_metadata_requests_index_aligned() {
        let index = StubIndex::with_tokens(3);
        let gallery = fetch_gallery(&index, owner()).await.unwrap();

        assert_eq!(index.metadata_requests.load(Ordering::SeqCst), 3);
        assert_eq!(gallery.len(), 3);
        for (token, meta) in gallery.iter() {
            assert_eq!(meta.title, format!("Meta {}", token.token_id));
        }
    }

    #[tokio::test]
    async fn empty_ownership_skips_metadata_entirely() {
        let index = StubIndex::with_tokens(0);
        let gallery = fetch_gallery(&index, owner()).await.unwrap();

        assert!(gallery.is_empty());
        assert_eq!(index.metadata_requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_failing_metadata_request_fails_the_batch() {
        let mut index = StubIndex::with_tokens(3);
        index.fail_metadata_for = Some("0x1".to_string());

        let result = fetch_gallery(&index, owner()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn truncation_flag_survives_the_fetch() {
        let mut index = StubIndex::with_tokens(1);
        index.truncated = true;

        let gallery = fetch_gallery(&index, owner()).await.unwrap();
        assert!(gallery.truncated);
    }

    struct StubProvider {
        resolved: Option<Address>,
    }

    #[async_trait::async_trait]
    impl WalletProvider for StubProvider {
        async fn client_version(&self) -> Result<String> {
            Ok("stub/0.1".into())
        }
        async fn accounts(&self) -> Result<Vec<Address>> {
            Ok(Vec::new())
        }
        async fn request_accounts(&self) -> Result<Vec<Address>> {
            anyhow::bail!("not supported")
        }
        async fn call(
            &self,
            _request: alloy::rpc::types::TransactionRequest,
        ) -> Result<alloy::primitives::Bytes> {
            anyhow::bail!("not supported")
        }
        async fn resolve_name(&self, _name: &str) -> Result<Option<Address>> {
            Ok(self.resolved)
        }
        fn endpoint_name(&self) -> String {
            "stub".into()
        }
    }

    #[tokio::test]
    async fn unresolved_name_fails_without_touching_the_index() {
        let provider = StubProvider { resolved: None };
        let index = StubIndex::with_tokens(3);
        let query = AddressQuery::parse("ghost.eth").unwrap();

        let event = run_lookup(Some(&provider), &index, 7, query).await;
        match event {
            RuntimeEvent::LookupFailed {
                generation,
                failure,
                ..
            } => {
                assert_eq!(generation, 7);
                assert_eq!(failure, LookupFailure::UnresolvedName);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(index.metadata_requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolving_name_proceeds_to_ownership_query() {
        let provider = StubProvider {
            resolved: Some(owner()),
        };
        let index = StubIndex::with_tokens(2);
        let query = AddressQuery::parse("vitalik.eth").unwrap();

        let event = run_lookup(Some(&provider), &index, 1, query).await;
        match event {
            RuntimeEvent::GalleryReady {
                generation,
                gallery,
                ..
            } => {
                assert_eq!(generation, 1);
                assert_eq!(gallery.len(), 2);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn hex_query_needs_no_provider() {
        let index = StubIndex::with_tokens(1);
        let query =
            AddressQuery::parse("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();

        let event = run_lookup(None, &index, 3, query).await;
        assert!(matches!(event, RuntimeEvent::GalleryReady { generation: 3, .. }));
    }
}
