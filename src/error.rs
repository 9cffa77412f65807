use thiserror::Error;

/// Classifies address rejections for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressErrorKind {
    /// Not an IP address or CIDR at all
    Malformed,
    /// Valid address of the other family (e.g. IPv6 given to an IPv4 trie)
    WrongFamily,
    /// Prefix length outside `[0, width]`
    PrefixLength,
}

/// Trie error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid address ({kind:?}): {address}")]
    InvalidAddress {
        kind: AddressErrorKind,
        address: String,
    },
}

impl TrieError {
    pub(crate) fn invalid_address(kind: AddressErrorKind, address: &str) -> Self {
        TrieError::InvalidAddress {
            kind,
            address: address.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrieError>;
