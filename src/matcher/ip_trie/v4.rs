use std::net::{IpAddr, Ipv4Addr};

use ipnet::IpNet;

use super::{parse_net, AddressFamily, IpTrie};
use crate::error::{AddressErrorKind, Result, TrieError};

/// IPv4 address family (32-bit keys).
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are unmapped, both as bare
/// rule addresses and as queries. IPv6 CIDR rules are rejected.
#[derive(Debug, Clone, Copy)]
pub enum V4 {}

/// Longest-prefix-match trie over IPv4 addresses
pub type Ipv4Trie<T> = IpTrie<V4, T>;

impl AddressFamily for V4 {
    type Addr = Ipv4Addr;

    const WIDTH: u8 = 32;

    fn parse_prefix(prefix: &str) -> Result<(u128, u8)> {
        let (addr, len) = match parse_net(prefix)? {
            IpNet::V4(net) => (net.addr(), net.prefix_len()),
            IpNet::V6(net) => match net.addr().to_ipv4_mapped() {
                Some(v4) if !prefix.contains('/') => (v4, Self::WIDTH),
                _ => {
                    return Err(TrieError::invalid_address(
                        AddressErrorKind::WrongFamily,
                        prefix,
                    ))
                }
            },
        };
        Ok((to_key(addr), len))
    }

    fn parse_address(address: &str) -> Option<Ipv4Addr> {
        match address.parse::<IpAddr>().ok()? {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(v6) => v6.to_ipv4_mapped(),
        }
    }

    fn key(addr: Ipv4Addr) -> Option<u128> {
        Some(to_key(addr))
    }
}

#[inline]
fn to_key(addr: Ipv4Addr) -> u128 {
    u128::from(u32::from(addr)) << 96
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_prefix_match() {
        let mut trie = Ipv4Trie::new();
        trie.insert("10.0.0.0/8", "A").unwrap();
        trie.insert("10.1.0.0/16", "B").unwrap();

        assert_eq!(trie.find("10.1.2.3"), Some("B"));
        assert_eq!(trie.find("10.2.2.3"), Some("A"));
        assert_eq!(trie.find("11.0.0.1"), None);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn test_bare_address_is_exact() {
        let mut trie = Ipv4Trie::new();
        trie.insert("192.168.1.1", 1).unwrap();

        assert_eq!(trie.find("192.168.1.1"), Some(1));
        assert_eq!(trie.find("192.168.1.2"), None);
    }

    #[test]
    fn test_host_bits_are_ignored() {
        let mut trie = Ipv4Trie::new();
        trie.insert("10.1.2.3/8", 1).unwrap();

        assert_eq!(trie.find("10.200.0.1"), Some(1));
        assert_eq!(trie.find("11.1.2.3"), None);
    }

    #[test]
    fn test_catch_all_and_zero_prefix_share_root() {
        let mut trie = Ipv4Trie::new();
        trie.insert("*", "star").unwrap();
        assert_eq!(trie.find("8.8.8.8"), Some("star"));

        trie.insert("0.0.0.0/0", "zero").unwrap();
        assert_eq!(trie.find("8.8.8.8"), Some("zero"));

        trie.insert("*", "star again").unwrap();
        assert_eq!(trie.find("8.8.8.8"), Some("star again"));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_specific_prefix_beats_catch_all() {
        let mut trie = Ipv4Trie::new();
        trie.insert("*", 0).unwrap();
        trie.insert("192.168.0.0/16", 16).unwrap();
        trie.insert("192.168.1.0/24", 24).unwrap();
        trie.insert("192.168.1.1/32", 32).unwrap();

        assert_eq!(trie.find("192.168.1.1"), Some(32));
        assert_eq!(trie.find("192.168.1.2"), Some(24));
        assert_eq!(trie.find("192.168.2.1"), Some(16));
        assert_eq!(trie.find("1.1.1.1"), Some(0));
    }

    #[test]
    fn test_overwrite_keeps_last_value() {
        let mut trie = Ipv4Trie::new();
        trie.insert("10.0.0.0/8", 1).unwrap();
        trie.insert("10.0.0.0/8", 2).unwrap();

        assert_eq!(trie.find("10.9.9.9"), Some(2));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_rejects_ipv6_rules() {
        let mut trie = Ipv4Trie::new();
        for prefix in ["2001:db8::/32", "2001:db8::1", "::ffff:10.0.0.0/104"] {
            match trie.insert(prefix, 1) {
                Err(TrieError::InvalidAddress { kind, .. }) => {
                    assert_eq!(kind, AddressErrorKind::WrongFamily, "prefix: {}", prefix);
                }
                other => panic!("expected InvalidAddress for {}, got {:?}", prefix, other),
            }
        }
        assert!(trie.is_empty());
    }

    #[test]
    fn test_rejects_malformed_rules() {
        let mut trie = Ipv4Trie::new();
        assert!(trie.insert("", 1).is_err());
        assert!(trie.insert("10.0.0", 1).is_err());
        assert!(trie.insert("10.0.0.0/33", 1).is_err());
        assert!(trie.insert("10.0.0.0/-1", 1).is_err());
        assert!(trie.insert("**", 1).is_err());
        assert!(trie.is_empty());
        assert_eq!(trie.find("10.0.0.1"), None);
    }

    #[test]
    fn test_mapped_ipv6_is_unmapped() {
        let mut trie = Ipv4Trie::new();
        trie.insert("::ffff:10.0.0.1", "mapped rule").unwrap();
        trie.insert("172.16.0.0/12", "private").unwrap();

        assert_eq!(trie.find("10.0.0.1"), Some("mapped rule"));
        assert_eq!(trie.find("::ffff:172.16.5.4"), Some("private"));
    }

    #[test]
    fn test_malformed_query_is_no_match() {
        let mut trie = Ipv4Trie::new();
        trie.insert("*", 1).unwrap();

        // Unparsable input and the other family are "no match", not errors,
        // even with a catch-all registered.
        assert_eq!(trie.find(""), None);
        assert_eq!(trie.find("not-an-ip"), None);
        assert_eq!(trie.find("10.0.0.0/8"), None);
        assert_eq!(trie.find("2001:db8::1"), None);
        assert_eq!(trie.find("10.0.0.1"), Some(1));
    }

    #[test]
    fn test_get_addr() {
        let mut trie = Ipv4Trie::new();
        trie.insert("10.0.0.0/8", 8).unwrap();

        assert_eq!(trie.get_addr(Ipv4Addr::new(10, 1, 1, 1)), Some(&8));
        assert_eq!(trie.get_addr(Ipv4Addr::new(11, 1, 1, 1)), None);
    }
}
