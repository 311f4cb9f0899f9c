//! Indexing infrastructure - NFT ownership and metadata API client

mod client;

pub use client::{AlchemyNftClient, IndexError, NftIndex, OwnedPage};
