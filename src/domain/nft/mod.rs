//! NFT ownership and metadata records
//!
//! Records are immutable once fetched and replaced wholesale by the next
//! query; the gallery keeps ownership and metadata index-aligned.

/// Shown for tokens whose metadata carries no image URI
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/200";

/// One ownership record from the indexing API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub contract_address: String,
    pub token_id: String,
    pub title: String,
}

/// Per-token detail, fetched individually for each ownership record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenMetadata {
    pub title: String,
    pub image: Option<String>,
}

impl TokenMetadata {
    /// Display title, with the original client's empty-title fallback
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "No Name"
        } else {
            &self.title
        }
    }

    /// Image URI if the metadata actually carries one
    pub fn image_uri(&self) -> Option<&str> {
        self.image.as_deref().filter(|uri| !uri.trim().is_empty())
    }
}

/// The combined result of one lookup cycle
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    pub tokens: Vec<OwnedToken>,
    pub metadata: Vec<TokenMetadata>,
    /// The indexing API reported further pages beyond the one fetched
    pub truncated: bool,
}

impl Gallery {
    /// Invariant: metadata is index-aligned with tokens
    pub fn new(tokens: Vec<OwnedToken>, metadata: Vec<TokenMetadata>, truncated: bool) -> Self {
        debug_assert_eq!(tokens.len(), metadata.len());
        Self {
            tokens,
            metadata,
            truncated,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OwnedToken, &TokenMetadata)> {
        self.tokens.iter().zip(self.metadata.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_falls_back() {
        let meta = TokenMetadata {
            title: "  ".into(),
            image: None,
        };
        assert_eq!(meta.display_title(), "No Name");
    }

    #[test]
    fn blank_image_counts_as_missing() {
        let meta = TokenMetadata::default();
        assert_eq!(meta.image_uri(), None);

        let meta = TokenMetadata {
            title: "x".into(),
            image: Some("  ".into()),
        };
        assert_eq!(meta.image_uri(), None);

        let meta = TokenMetadata {
            title: "x".into(),
            image: Some("ipfs://abc".into()),
        };
        assert_eq!(meta.image_uri(), Some("ipfs://abc"));
    }

    #[test]
    fn gallery_iterates_aligned_pairs() {
        let tokens = vec![
            OwnedToken {
                contract_address: "0xaaaa".into(),
                token_id: "1".into(),
                title: "a".into(),
            },
            OwnedToken {
                contract_address: "0xbbbb".into(),
                token_id: "2".into(),
                title: "b".into(),
            },
        ];
        let metadata = vec![
            TokenMetadata {
                title: "a".into(),
                image: None,
            },
            TokenMetadata {
                title: "b".into(),
                image: Some("https://img/b".into()),
            },
        ];
        let gallery = Gallery::new(tokens, metadata, false);
        assert_eq!(gallery.len(), 2);
        let pairs: Vec<_> = gallery.iter().collect();
        assert_eq!(pairs[0].0.token_id, "1");
        assert_eq!(pairs[0].1.title, "a");
        assert_eq!(pairs[1].0.token_id, "2");
        assert_eq!(pairs[1].1.image.as_deref(), Some("https://img/b"));
    }
}
