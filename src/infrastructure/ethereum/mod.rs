//! Ethereum infrastructure - Alloy provider implementations and ENS reads

pub(crate) mod ens;
mod provider;

pub use ens::namehash;
pub use provider::{create_provider, AlloyProvider, ProviderConfig, WalletProvider};
