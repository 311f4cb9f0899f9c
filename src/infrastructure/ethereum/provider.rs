//! Wallet provider abstraction and Alloy implementations
//!
//! The "injected wallet" of the browser world maps onto a JSON-RPC wallet
//! endpoint here: a dev node (Anvil, geth --dev) or a wallet that exposes
//! local RPC (e.g. Frame on 127.0.0.1:1248). Raw requests cover the wallet
//! methods alloy has no typed wrapper for.

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};

use crate::infrastructure::ethereum::ens;

/// Provider configuration
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
        }
    }
}

/// Abstract wallet provider trait
///
/// Everything the lookup flow needs from the wallet endpoint: account
/// acquisition, the access prompt, and the reads behind ENS resolution.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Get client version (for endpoint detection)
    async fn client_version(&self) -> Result<String>;

    /// List the accounts the endpoint currently exposes
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Ask the endpoint to expose accounts, prompting the user if it gates
    /// access (eth_requestAccounts)
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Execute a read-only call (eth_call)
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;

    /// Forward-resolve an ENS name; None when no address record exists
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

// Type aliases for the filled providers
type HttpFillProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

type WsFillProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based provider that stores concrete types for each transport
pub enum AlloyProvider {
    Http {
        provider: HttpFillProvider,
        endpoint: String,
    },
    WebSocket {
        provider: WsFillProvider,
        endpoint: String,
    },
}

/// Create a provider from configuration
pub async fn create_provider(config: ProviderConfig) -> Result<AlloyProvider> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(AlloyProvider::Http {
                provider,
                endpoint: url,
            })
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(AlloyProvider::WebSocket {
                provider,
                endpoint: url,
            })
        }
    }
}

// Macro to reduce code duplication for provider method implementations
macro_rules! impl_provider_method {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            AlloyProvider::Http { provider, .. } => provider.$method($($arg),*).await,
            AlloyProvider::WebSocket { provider, .. } => provider.$method($($arg),*).await,
        }
    };
}

#[async_trait::async_trait]
impl WalletProvider for AlloyProvider {
    async fn client_version(&self) -> Result<String> {
        Ok(impl_provider_method!(self, get_client_version)?)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(impl_provider_method!(self, get_accounts)?)
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        // No typed wrapper in alloy - wallet endpoints answer this, plain
        // nodes usually reject it with "method not found"
        let result: std::result::Result<Vec<Address>, _> = match self {
            AlloyProvider::Http { provider, .. } => {
                provider.raw_request("eth_requestAccounts".into(), ()).await
            }
            AlloyProvider::WebSocket { provider, .. } => {
                provider.raw_request("eth_requestAccounts".into(), ()).await
            }
        };
        result.context("eth_requestAccounts rejected")
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        match self {
            AlloyProvider::Http { provider, .. } => Ok(provider.call(request.clone()).await?),
            AlloyProvider::WebSocket { provider, .. } => Ok(provider.call(request).await?),
        }
    }

    async fn resolve_name(&self, name: &str) -> Result<Option<Address>> {
        ens::resolve_name(self, name).await
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyProvider::Http { endpoint, .. } => endpoint.clone(),
            AlloyProvider::WebSocket { endpoint, .. } => endpoint.clone(),
        }
    }
}
