//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based wallet provider implementations and ENS reads
//! - The NFT indexing API client (reqwest)
//! - Tokio runtime bridge for async operations

pub mod ethereum;
pub mod indexing;
pub mod runtime;
