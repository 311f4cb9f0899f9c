//! NFT indexing API client (Alchemy-compatible REST)

use alloy::primitives::Address;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::nft::{OwnedToken, TokenMetadata};

/// Failures at the indexing API boundary. Any of these fails the whole
/// lookup; the UI surfaces a terminal error and allows resubmission.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("indexing request failed: {0}")]
    Transport(String),

    #[error("indexing API returned {status} for {operation}")]
    Status { operation: &'static str, status: u16 },

    #[error("could not decode {0} response: {1}")]
    Decode(&'static str, String),
}

/// One page of ownership records
#[derive(Debug, Clone, Default)]
pub struct OwnedPage {
    pub tokens: Vec<OwnedToken>,
    pub total_count: u64,
    /// The API reported more pages beyond this one
    pub truncated: bool,
}

/// Abstract indexing service trait
#[async_trait::async_trait]
pub trait NftIndex: Send + Sync + 'static {
    /// List tokens owned by an address (single page, see OwnedPage::truncated)
    async fn owned_tokens(&self, owner: Address) -> Result<OwnedPage, IndexError>;

    /// Fetch metadata for one token, keyed by contract address + token id
    async fn token_metadata(
        &self,
        contract_address: &str,
        token_id: &str,
    ) -> Result<TokenMetadata, IndexError>;
}

/// getNFTs response structures
#[derive(Debug, Deserialize)]
struct OwnedNftsResponse {
    #[serde(rename = "ownedNfts", default)]
    owned_nfts: Vec<OwnedNftRecord>,
    #[serde(rename = "totalCount", default)]
    total_count: u64,
    #[serde(rename = "pageKey", default)]
    page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwnedNftRecord {
    contract: NftContract,
    id: NftId,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct NftContract {
    address: String,
}

#[derive(Debug, Deserialize)]
struct NftId {
    #[serde(rename = "tokenId")]
    token_id: String,
}

/// getNFTMetadata response structures
#[derive(Debug, Deserialize)]
struct NftMetadataResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    image: Option<String>,
}

/// Alchemy NFT API v2 client
pub struct AlchemyNftClient {
    http: reqwest::Client,
    base_url: String,
}

impl AlchemyNftClient {
    /// `base_url` is the network root (e.g. https://eth-mainnet.g.alchemy.com/nft/v2);
    /// the API key becomes a path segment as the API expects.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: format!("{}/{}", base_url.trim_end_matches('/'), api_key),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        url: String,
    ) -> Result<T, IndexError> {
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| IndexError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Status {
                operation,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| IndexError::Decode(operation, err.to_string()))
    }
}

#[async_trait::async_trait]
impl NftIndex for AlchemyNftClient {
    async fn owned_tokens(&self, owner: Address) -> Result<OwnedPage, IndexError> {
        let url = format!("{}/getNFTs?owner={:?}&withMetadata=false", self.base_url, owner);
        let data: OwnedNftsResponse = self.get_json("getNFTs", url).await?;
        Ok(owned_page_from_response(data))
    }

    async fn token_metadata(
        &self,
        contract_address: &str,
        token_id: &str,
    ) -> Result<TokenMetadata, IndexError> {
        let url = format!(
            "{}/getNFTMetadata?contractAddress={}&tokenId={}",
            self.base_url, contract_address, token_id
        );
        let data: NftMetadataResponse = self.get_json("getNFTMetadata", url).await?;
        Ok(TokenMetadata {
            title: data.title,
            image: data.metadata.image,
        })
    }
}

fn owned_page_from_response(data: OwnedNftsResponse) -> OwnedPage {
    let truncated = data.page_key.is_some();
    let tokens = data
        .owned_nfts
        .into_iter()
        .map(|record| OwnedToken {
            contract_address: record.contract.address,
            token_id: record.id.token_id,
            title: record.title,
        })
        .collect();
    OwnedPage {
        tokens,
        total_count: data.total_count,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owned_nfts_page() {
        let json = r#"{
            "ownedNfts": [
                {
                    "contract": { "address": "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d" },
                    "id": { "tokenId": "0x1a2b" },
                    "title": "Ape #6698"
                },
                {
                    "contract": { "address": "0x60e4d786628fea6478f785a6d7e704777c86a7c6" },
                    "id": { "tokenId": "0x01" }
                }
            ],
            "totalCount": 2
        }"#;
        let data: OwnedNftsResponse = serde_json::from_str(json).unwrap();
        let page = owned_page_from_response(data);
        assert_eq!(page.tokens.len(), 2);
        assert_eq!(page.total_count, 2);
        assert!(!page.truncated);
        assert_eq!(page.tokens[0].title, "Ape #6698");
        assert_eq!(page.tokens[1].title, "");
        assert_eq!(page.tokens[1].token_id, "0x01");
    }

    #[test]
    fn page_key_marks_truncation() {
        let json = r#"{ "ownedNfts": [], "totalCount": 250, "pageKey": "abc123" }"#;
        let data: OwnedNftsResponse = serde_json::from_str(json).unwrap();
        let page = owned_page_from_response(data);
        assert!(page.truncated);
        assert_eq!(page.total_count, 250);
    }

    #[test]
    fn parses_metadata_with_and_without_image() {
        let json = r#"{ "title": "Ape #6698", "metadata": { "image": "ipfs://Qm/6698.png" } }"#;
        let data: NftMetadataResponse = serde_json::from_str(json).unwrap();
        assert_eq!(data.title, "Ape #6698");
        assert_eq!(data.metadata.image.as_deref(), Some("ipfs://Qm/6698.png"));

        let json = r#"{ "title": "Bare" }"#;
        let data: NftMetadataResponse = serde_json::from_str(json).unwrap();
        assert_eq!(data.metadata.image, None);
    }
}
