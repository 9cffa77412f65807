use std::net::{IpAddr, Ipv6Addr};

use ipnet::IpNet;

use super::{parse_net, AddressFamily, IpTrie};
use crate::error::{AddressErrorKind, Result, TrieError};

/// IPv6 address family (128-bit keys).
///
/// Plain IPv4 and IPv4-mapped IPv6 addresses belong to [`super::V4`] and are
/// rejected as rules and ignored as queries.
#[derive(Debug, Clone, Copy)]
pub enum V6 {}

/// Longest-prefix-match trie over IPv6 addresses
pub type Ipv6Trie<T> = IpTrie<V6, T>;

impl AddressFamily for V6 {
    type Addr = Ipv6Addr;

    const WIDTH: u8 = 128;

    fn parse_prefix(prefix: &str) -> Result<(u128, u8)> {
        match parse_net(prefix)? {
            IpNet::V6(net) if net.addr().to_ipv4_mapped().is_none() => {
                Ok((u128::from(net.addr()), net.prefix_len()))
            }
            _ => Err(TrieError::invalid_address(
                AddressErrorKind::WrongFamily,
                prefix,
            )),
        }
    }

    fn parse_address(address: &str) -> Option<Ipv6Addr> {
        match address.parse::<IpAddr>().ok()? {
            IpAddr::V6(v6) => Some(v6),
            IpAddr::V4(_) => None,
        }
    }

    fn key(addr: Ipv6Addr) -> Option<u128> {
        match addr.to_ipv4_mapped() {
            Some(_) => None,
            None => Some(u128::from(addr)),
        }
    }
}
