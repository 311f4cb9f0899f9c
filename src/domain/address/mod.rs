//! Owner input validation - hex addresses (EIP-55) and ENS names
//!
//! `AddressQuery::parse` is the syntactic gate: nothing that fails here ever
//! reaches the network. Resolution of ENS names happens later, in the worker,
//! against the connected endpoint.

use alloy::primitives::{keccak256, Address};
use thiserror::Error;

/// Failures on the path from raw user input to a usable account address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Input is neither a well-formed hex address nor a well-formed ENS name
    #[error("not a valid Ethereum address or ENS name")]
    InvalidFormat,

    /// Name is well-formed but has no address record on the connected network
    #[error("{0} does not resolve to an account")]
    UnresolvedName(String),

    /// The resolution lookup itself failed (RPC error, bad response)
    #[error("name resolution failed: {0}")]
    Lookup(String),
}

/// A syntactically validated owner query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressQuery {
    /// Hex address, already canonical - no network round trip needed
    Hex(Address),
    /// ENS name, normalized to lowercase - must be resolved before use
    Name(String),
}

impl AddressQuery {
    /// Syntactic validation. Pure - performs no network traffic.
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ResolveError::InvalidFormat);
        }

        // Anything with a dot is name-shaped, never hex
        if trimmed.contains('.') {
            if is_ens_name(trimmed) {
                return Ok(AddressQuery::Name(trimmed.to_ascii_lowercase()));
            }
            return Err(ResolveError::InvalidFormat);
        }

        if let Some(payload) = strip_hex_prefix(trimmed) {
            return parse_hex_address(payload).map(AddressQuery::Hex);
        }

        // A bare 40-hex-digit string is accepted as an address too
        if trimmed.len() == 40 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return parse_hex_address(trimmed).map(AddressQuery::Hex);
        }

        Err(ResolveError::InvalidFormat)
    }

    /// The display form shown in the input line and status messages
    pub fn display(&self) -> String {
        match self {
            AddressQuery::Hex(addr) => to_checksummed(*addr),
            AddressQuery::Name(name) => name.clone(),
        }
    }
}

fn strip_hex_prefix(value: &str) -> Option<&str> {
    value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"))
}

fn parse_hex_address(payload: &str) -> Result<Address, ResolveError> {
    if payload.len() != 40 || !payload.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ResolveError::InvalidFormat);
    }

    // Mixed-case input carries an EIP-55 checksum and must match it.
    // All-lower and all-upper forms carry no checksum and are accepted as-is.
    let has_lower = payload.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = payload.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let expected = checksum_payload(&payload.to_ascii_lowercase());
        if payload != expected {
            return Err(ResolveError::InvalidFormat);
        }
    }

    let bytes = hex::decode(payload.to_ascii_lowercase()).map_err(|_| ResolveError::InvalidFormat)?;
    Ok(Address::from_slice(&bytes))
}

/// ENS name shape: dot-separated, non-empty labels of [a-z0-9-_]
fn is_ens_name(value: &str) -> bool {
    if !value.contains('.') {
        return false;
    }
    value.split('.').all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

/// EIP-55 checksummed display form
pub fn to_checksummed(address: Address) -> String {
    format!("0x{}", checksum_payload(&hex::encode(address.as_slice())))
}

fn checksum_payload(lower_hex: &str) -> String {
    let hash = keccak256(lower_hex.as_bytes());
    let hash_hex = hex::encode(hash.as_slice());

    lower_hex
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let hash_char = hash_hex.chars().nth(i).unwrap_or('0');
            if hash_char.to_digit(16).unwrap_or(0) >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage() {
        for input in ["", "   ", "not-an-address", "0x1234", "hello world", "0xzz"] {
            assert_eq!(AddressQuery::parse(input), Err(ResolveError::InvalidFormat), "{input:?}");
        }
    }

    #[test]
    fn accepts_lowercase_hex() {
        let parsed = AddressQuery::parse("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert!(matches!(parsed, AddressQuery::Hex(_)));
    }

    #[test]
    fn accepts_unprefixed_hex() {
        let parsed = AddressQuery::parse("fb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert!(matches!(parsed, AddressQuery::Hex(_)));
    }

    #[test]
    fn validates_eip55_checksum() {
        // Correct mixed-case form
        assert!(AddressQuery::parse("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359").is_ok());
        // One flipped character breaks the checksum
        assert_eq!(
            AddressQuery::parse("0xFb6916095ca1df60bB79Ce92cE3Ea74c37c5d359"),
            Err(ResolveError::InvalidFormat)
        );
    }

    #[test]
    fn checksummed_display_round_trips() {
        let AddressQuery::Hex(addr) =
            AddressQuery::parse("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap()
        else {
            panic!("expected hex");
        };
        assert_eq!(to_checksummed(addr), "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359");
    }

    #[test]
    fn accepts_ens_names() {
        assert_eq!(
            AddressQuery::parse("vitalik.eth"),
            Ok(AddressQuery::Name("vitalik.eth".into()))
        );
        assert_eq!(
            AddressQuery::parse("Sub.Domain.ETH"),
            Ok(AddressQuery::Name("sub.domain.eth".into()))
        );
        // Hex-looking labels are still names once a dot appears
        assert_eq!(
            AddressQuery::parse("0xdead.eth"),
            Ok(AddressQuery::Name("0xdead.eth".into()))
        );
    }

    #[test]
    fn rejects_malformed_names() {
        for input in ["eth", ".eth", "foo..eth", "foo .eth", "foo.eth!"] {
            assert_eq!(AddressQuery::parse(input), Err(ResolveError::InvalidFormat), "{input:?}");
        }
    }
}
