//! ACL Trie - most-specific-match lookup structures for domains and IP prefixes
//!
//! This library provides the matching core of rule-based routing:
//! - Domain matching (exact, subdomain wildcard, catch-all) on a reversed-label trie
//! - IPv4 and IPv6 longest-prefix matching on binary tries
//! - A classifier that owns one of each and dispatches by input type
//!
//! The structures are build-once, read-many: `insert` takes `&mut self` and
//! lookups take `&self`, so a fully built structure can be shared across
//! threads without locking.
//!
//! # Example
//!
//! ```rust
//! use acl_trie::{DomainMatcher, Ipv4Trie};
//!
//! let mut domains = DomainMatcher::new();
//! domains.insert("*.example.com", "proxy").unwrap();
//! domains.insert("*", "direct").unwrap();
//! assert_eq!(domains.find("www.example.com"), Some("proxy"));
//! assert_eq!(domains.find("example.org"), Some("direct"));
//!
//! let mut ipv4 = Ipv4Trie::new();
//! ipv4.insert("10.0.0.0/8", "lan").unwrap();
//! ipv4.insert("10.1.0.0/16", "lab").unwrap();
//! assert_eq!(ipv4.find("10.1.2.3"), Some("lab"));
//! assert_eq!(ipv4.find("10.2.2.3"), Some("lan"));
//! assert_eq!(ipv4.find("11.0.0.1"), None);
//! ```
//!
//! # Pattern Syntax
//!
//! | Type | Example | Description |
//! |------|---------|-------------|
//! | Domain | `example.com` | Exact domain match |
//! | Wildcard | `*.example.com` | Proper subdomains only |
//! | Star suffix | `*example.com` | Domain and all subdomains |
//! | IP | `1.2.3.4` | Single address (/32 or /128) |
//! | CIDR | `192.168.0.0/16` | Address range |
//! | All | `*` | Match everything |
//!
//! Precedence: exact domain > deepest wildcard > catch-all; for addresses the
//! longest matching prefix wins.

pub mod classifier;
pub mod error;
pub mod matcher;
pub mod types;

// Re-export commonly used items
pub use classifier::{Classifier, ClassifierBuilder, ClassifierOptions, DEFAULT_CACHE_SIZE};
pub use error::{AddressErrorKind, Result, TrieError};
pub use matcher::{
    AddressFamily, DomainMatcher, IpTrie, Ipv4Trie, Ipv6Trie, MAX_LABEL_LEN, MAX_NAME_LEN, V4, V6,
};
pub use types::HostInfo;
