mod domain_trie;
mod ip_trie;

pub use domain_trie::{DomainMatcher, MAX_LABEL_LEN, MAX_NAME_LEN};
pub use ip_trie::{AddressFamily, IpTrie, Ipv4Trie, Ipv6Trie, V4, V6};
