//! Longest-prefix-match tries over IP address bits.
//!
//! Both families share one binary trie: keys are left-aligned in a `u128`
//! (an IPv4 address occupies the top 32 bits) and walked from the most
//! significant bit down. The family only decides how text is parsed and how
//! many bits a full-width key has.

mod v4;
mod v6;

use std::fmt;
use std::marker::PhantomData;
use std::net::IpAddr;

use ipnet::IpNet;
use tracing::{debug, trace};

use crate::error::{AddressErrorKind, Result, TrieError};

pub use v4::{Ipv4Trie, V4};
pub use v6::{Ipv6Trie, V6};

/// Address family of an [`IpTrie`].
pub trait AddressFamily {
    /// Typed address of this family
    type Addr: Copy;

    /// Number of bits in a full-width key
    const WIDTH: u8;

    /// Parse a CIDR or bare address into a left-aligned key and prefix length.
    fn parse_prefix(prefix: &str) -> Result<(u128, u8)>;

    /// Parse a query address.
    ///
    /// Returns `None` for malformed input or an address of the other family.
    fn parse_address(address: &str) -> Option<Self::Addr>;

    /// Left-aligned key of `addr`, or `None` if it belongs to the other family.
    fn key(addr: Self::Addr) -> Option<u128>;
}

/// Node in the bit trie
struct BitNode<T> {
    children: [Option<Box<BitNode<T>>>; 2],
    value: Option<T>,
}

impl<T> Default for BitNode<T> {
    fn default() -> Self {
        Self {
            children: [None, None],
            value: None,
        }
    }
}

/// Binary trie mapping IP prefixes to values with longest-prefix-match lookup.
///
/// The root holds both the catch-all `*` and any `/0` prefix; whichever was
/// inserted last wins. Lookups never fail: unparsable input or an address of
/// the wrong family is simply "no match".
pub struct IpTrie<F, T> {
    root: BitNode<T>,
    len: usize,
    _family: PhantomData<fn() -> F>,
}

impl<F, T> Default for IpTrie<F, T> {
    fn default() -> Self {
        Self {
            root: BitNode::default(),
            len: 0,
            _family: PhantomData,
        }
    }
}

impl<F, T> fmt::Debug for IpTrie<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpTrie").field("len", &self.len).finish()
    }
}

impl<F: AddressFamily, T> IpTrie<F, T> {
    /// Create an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct prefixes holding a value
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no prefix has been registered
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register `prefix` (`*`, a CIDR, or a bare address) with `value`.
    ///
    /// Host bits past the prefix length are ignored. Re-registering a prefix
    /// replaces its value.
    pub fn insert(&mut self, prefix: &str, value: T) -> Result<()> {
        let (key, bits) = if prefix == "*" {
            (0, 0)
        } else {
            F::parse_prefix(prefix).inspect_err(|err| {
                debug!(prefix, error = %err, "rejected address prefix");
            })?
        };

        let mut node = &mut self.root;
        for index in 0..bits {
            node = &mut **node.children[bit_at(key, index)].get_or_insert_with(Box::default);
        }

        if node.value.replace(value).is_some() {
            trace!(prefix, "address prefix overwritten");
        } else {
            self.len += 1;
        }
        Ok(())
    }

    /// Look up the value of the longest registered prefix containing `address`.
    pub fn get(&self, address: &str) -> Option<&T> {
        self.get_addr(F::parse_address(address)?)
    }

    /// Same as [`IpTrie::get`] for an already parsed address.
    pub fn get_addr(&self, addr: F::Addr) -> Option<&T> {
        let key = F::key(addr)?;

        let mut node = &self.root;
        let mut best = node.value.as_ref();
        for index in 0..F::WIDTH {
            match node.children[bit_at(key, index)].as_deref() {
                Some(child) => node = child,
                None => break,
            }
            if let Some(value) = node.value.as_ref() {
                best = Some(value);
            }
        }
        best
    }

    /// Look up `address` and return a copy of the matching value.
    pub fn find(&self, address: &str) -> Option<T>
    where
        T: Clone,
    {
        self.get(address).cloned()
    }
}

/// Bit `index` of a left-aligned key, counting from the most significant bit.
#[inline]
fn bit_at(key: u128, index: u8) -> usize {
    ((key >> (127 - index)) & 1) as usize
}

/// Parse a CIDR or bare address of either family.
///
/// A bare address becomes a full-width prefix.
fn parse_net(prefix: &str) -> Result<IpNet> {
    if let Ok(net) = prefix.parse::<IpNet>() {
        return Ok(net);
    }
    if let Ok(ip) = prefix.parse::<IpAddr>() {
        return Ok(IpNet::from(ip));
    }

    let kind = match prefix.split_once('/') {
        Some((addr, len)) if addr.parse::<IpAddr>().is_ok() && len.parse::<u32>().is_ok() => {
            AddressErrorKind::PrefixLength
        }
        _ => AddressErrorKind::Malformed,
    };
    Err(TrieError::invalid_address(kind, prefix))
}
