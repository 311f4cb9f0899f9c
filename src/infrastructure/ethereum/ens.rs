//! ENS forward resolution (EIP-137)
//!
//! Two fixed-selector reads against mainnet ENS: `resolver(bytes32)` on the
//! registry, then `addr(bytes32)` on the returned resolver. Calldata is built
//! by hand - both calls take a single bytes32 node.

use alloy::primitives::{keccak256, Address, B256};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};

use crate::infrastructure::ethereum::provider::WalletProvider;

/// ENS registry, same address on mainnet and the test networks
const ENS_REGISTRY: [u8; 20] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x2e, 0x07, 0x4e, 0xc6, 0x9a, 0x0d, 0xfb, 0x29, 0x97,
    0xba, 0x6c, 0x7d, 0x2e, 0x1e,
];

// resolver(bytes32)
const SELECTOR_RESOLVER: [u8; 4] = [0x01, 0x78, 0xb8, 0xbf];
// addr(bytes32)
const SELECTOR_ADDR: [u8; 4] = [0x3b, 0x3b, 0x57, 0xde];

/// Forward-resolve a name to an address. Returns None when the name has no
/// resolver or no address record.
pub async fn resolve_name<P>(provider: &P, name: &str) -> Result<Option<Address>>
where
    P: WalletProvider + ?Sized,
{
    let node = namehash(name);

    let registry = Address::from(ENS_REGISTRY);
    let resolver_data = provider
        .call(node_call(registry, SELECTOR_RESOLVER, node))
        .await
        .context("ENS registry lookup failed")?;
    let Some(resolver) = decode_address_word(&resolver_data) else {
        return Ok(None);
    };

    let addr_data = provider
        .call(node_call(resolver, SELECTOR_ADDR, node))
        .await
        .context("ENS resolver lookup failed")?;
    Ok(decode_address_word(&addr_data))
}

/// EIP-137 namehash
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.split('.').rev() {
        let label_hash = keccak256(label.as_bytes());
        let mut packed = [0u8; 64];
        packed[..32].copy_from_slice(node.as_slice());
        packed[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(packed);
    }
    node
}

/// Build an eth_call request for `selector(bytes32 node)`
fn node_call(to: Address, selector: [u8; 4], node: B256) -> TransactionRequest {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector);
    data.extend_from_slice(node.as_slice());
    TransactionRequest::default().to(to).input(data.into())
}

/// Decode a 32-byte ABI word as an address; zero means "no record"
fn decode_address_word(data: &[u8]) -> Option<Address> {
    if data.len() < 32 {
        return None;
    }
    let address = Address::from_slice(&data[12..32]);
    if address.is_zero() {
        None
    } else {
        Some(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors from EIP-137
    #[test]
    fn namehash_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            hex::encode(namehash("eth")),
            "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            hex::encode(namehash("foo.eth")),
            "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn node_call_shape() {
        let node = namehash("foo.eth");
        let request = node_call(Address::from(ENS_REGISTRY), SELECTOR_RESOLVER, node);
        let input = request.input.input().expect("calldata set");
        assert_eq!(input.len(), 36);
        assert_eq!(&input[..4], &SELECTOR_RESOLVER);
        assert_eq!(&input[4..], node.as_slice());
    }

    #[test]
    fn decode_address_word_handles_zero_and_short() {
        assert_eq!(decode_address_word(&[]), None);
        assert_eq!(decode_address_word(&[0u8; 32]), None);

        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&[0x11u8; 20]);
        assert_eq!(decode_address_word(&word), Some(Address::from([0x11u8; 20])));
    }
}
