//! Classifier module.
//!
//! Owns one domain matcher and one trie per address family, routes each rule
//! to the structure that understands it, and dispatches lookups by input type.
//! Rules are registered on a [`ClassifierBuilder`]; [`ClassifierBuilder::build`]
//! freezes them into a [`Classifier`] that can be shared across threads.
//! Cached lookups are serialised by the cache mutex; a `cache_size` of 0
//! drops the cache and leaves lookups lock-free.

use std::net::IpAddr;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{AddressErrorKind, Result, TrieError};
use crate::matcher::{DomainMatcher, Ipv4Trie, Ipv6Trie};
use crate::types::HostInfo;

/// Default LRU cache size
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Classifier options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// LRU cache size for lookup results (0 disables the cache and its lock)
    pub cache_size: usize,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl ClassifierOptions {
    /// Create new classifier options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache size.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }
}

/// Structure a rule is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    Ipv4,
    Ipv6,
    Domain,
}

/// Decide which structure owns `pattern`.
///
/// Anything whose address part parses as an IP goes to the trie of that family
/// (IPv4-mapped IPv6 counts as IPv4); anything else with a `/` is a broken CIDR.
fn route(pattern: &str) -> Result<RuleKind> {
    let addr = pattern.split_once('/').map_or(pattern, |(addr, _)| addr);
    match addr.parse::<IpAddr>().map(|ip| ip.to_canonical()) {
        Ok(IpAddr::V4(_)) => Ok(RuleKind::Ipv4),
        Ok(IpAddr::V6(_)) => Ok(RuleKind::Ipv6),
        Err(_) if pattern.contains('/') => Err(TrieError::invalid_address(
            AddressErrorKind::Malformed,
            pattern,
        )),
        Err(_) => Ok(RuleKind::Domain),
    }
}

/// Mutable registration phase of a [`Classifier`].
#[derive(Debug)]
pub struct ClassifierBuilder<T> {
    domains: DomainMatcher<T>,
    ipv4: Ipv4Trie<T>,
    ipv6: Ipv6Trie<T>,
    fallback: Option<T>,
}

impl<T> Default for ClassifierBuilder<T> {
    fn default() -> Self {
        Self {
            domains: DomainMatcher::new(),
            ipv4: Ipv4Trie::new(),
            ipv6: Ipv6Trie::new(),
            fallback: None,
        }
    }
}

impl<T: Clone> ClassifierBuilder<T> {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.
    ///
    /// `*` sets the fallback used when nothing more specific matches any part
    /// of the host. IP addresses and CIDRs go to the trie of their family;
    /// everything else is a domain pattern and is lowercased.
    pub fn insert(&mut self, pattern: &str, value: T) -> Result<()> {
        let pattern = pattern.trim();
        if pattern == "*" {
            if self.fallback.replace(value).is_some() {
                trace!("fallback rule overwritten");
            }
            return Ok(());
        }

        match route(pattern)? {
            RuleKind::Ipv4 => self.ipv4.insert(pattern, value),
            RuleKind::Ipv6 => self.ipv6.insert(pattern, value),
            RuleKind::Domain => self.domains.insert(&pattern.to_lowercase(), value),
        }
    }

    /// Register every `(pattern, value)` pair, stopping at the first invalid one.
    pub fn extend_rules<I, S>(&mut self, rules: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        for (pattern, value) in rules {
            self.insert(pattern.as_ref(), value)?;
        }
        Ok(())
    }

    /// Number of occupied rule slots
    pub fn rule_count(&self) -> usize {
        self.domains.len()
            + self.ipv4.len()
            + self.ipv6.len()
            + usize::from(self.fallback.is_some())
    }

    /// Freeze the registered rules.
    pub fn build(self, options: ClassifierOptions) -> Classifier<T> {
        debug!(
            domains = self.domains.len(),
            ipv4 = self.ipv4.len(),
            ipv6 = self.ipv6.len(),
            fallback = self.fallback.is_some(),
            cache_size = options.cache_size,
            "classifier built"
        );

        Classifier {
            domains: self.domains,
            ipv4: self.ipv4,
            ipv6: self.ipv6,
            fallback: self.fallback,
            cache: NonZeroUsize::new(options.cache_size)
                .map(|size| Mutex::new(LruCache::new(size))),
        }
    }
}

/// Frozen classifier with LRU-cached lookups.
///
/// Lookup order is: domain rules on the host name, IPv4 rules, IPv6 rules,
/// then the `*` fallback.
///
/// Every [`match_host`](Self::match_host) call takes the cache mutex, hits
/// included, so concurrent readers are serialised. Build with
/// `cache_size: 0` when lookups should scale across threads instead.
pub struct Classifier<T> {
    domains: DomainMatcher<T>,
    ipv4: Ipv4Trie<T>,
    ipv6: Ipv6Trie<T>,
    fallback: Option<T>,
    cache: Option<Mutex<LruCache<HostInfo, Option<T>>>>,
}

impl<T: Clone> Classifier<T> {
    /// Start registering rules
    pub fn builder() -> ClassifierBuilder<T> {
        ClassifierBuilder::new()
    }

    /// Classify free-form input (an IP address or a host name).
    pub fn find(&self, input: &str) -> Option<T> {
        self.match_host(&HostInfo::parse(input))
    }

    /// Classify a host
    pub fn match_host(&self, host: &HostInfo) -> Option<T> {
        // Nothing to match on, so skip the cache.
        if host.is_empty() {
            return self.fallback.clone();
        }

        // HostInfo constructors lowercase the name but direct struct
        // construction may not. Rules go through `str::to_lowercase`, so
        // compare against that rather than ASCII case.
        let normalized;
        let host = if host.name.chars().any(|c| c.to_lowercase().ne([c])) {
            normalized = HostInfo {
                name: host.name.to_lowercase(),
                ipv4: host.ipv4,
                ipv6: host.ipv6,
            };
            &normalized
        } else {
            host
        };

        let Some(cache) = &self.cache else {
            return self.lookup(host);
        };

        let mut cache = cache.lock();
        if let Some(cached) = cache.get(host) {
            return cached.clone();
        }

        // Lookups are CPU-only, so computing under the lock is fine.
        trace!(name = %host.name, "classifier cache miss");
        let result = self.lookup(host);
        cache.put(host.clone(), result.clone());
        result
    }

    /// Lookup without caching
    fn lookup(&self, host: &HostInfo) -> Option<T> {
        self.domains
            .get(&host.name)
            .or_else(|| host.ipv4.and_then(|ip| self.ipv4.get_addr(ip)))
            .or_else(|| host.ipv6.and_then(|ip| self.ipv6.get_addr(ip)))
            .or(self.fallback.as_ref())
            .cloned()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().clear();
        }
    }
}

impl<T> Classifier<T> {
    /// Number of occupied rule slots
    pub fn rule_count(&self) -> usize {
        self.domains.len()
            + self.ipv4.len()
            + self.ipv6.len()
            + usize::from(self.fallback.is_some())
    }

    /// Domain rules
    pub fn domains(&self) -> &DomainMatcher<T> {
        &self.domains
    }

    /// IPv4 rules
    pub fn ipv4(&self) -> &Ipv4Trie<T> {
        &self.ipv4
    }

    /// IPv6 rules
    pub fn ipv6(&self) -> &Ipv6Trie<T> {
        &self.ipv6
    }

    /// The `*` fallback value
    pub fn fallback(&self) -> Option<&T> {
        self.fallback.as_ref()
    }
}
