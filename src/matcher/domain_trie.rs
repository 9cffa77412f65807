//! Reversed-label domain trie.
//!
//! Patterns are stored as paths of DNS labels walked from the TLD towards the
//! leftmost label, so `www.example.com` lives at `com -> example -> www`.
//! Every node carries two independent slots: an exact value and a wildcard
//! value covering proper subdomains of the node's name.
//!
//! ## Example
//!
//! ```
//! use acl_trie::DomainMatcher;
//!
//! let mut matcher = DomainMatcher::new();
//! matcher.insert("a.example.com", "exact").unwrap();
//! matcher.insert("*.example.com", "wildcard").unwrap();
//!
//! assert_eq!(matcher.find("a.example.com"), Some("exact"));
//! assert_eq!(matcher.find("b.example.com"), Some("wildcard"));
//! assert_eq!(matcher.find("example.com"), None);
//! ```

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{Result, TrieError};

/// Longest domain name accepted in a pattern, in octets
pub const MAX_NAME_LEN: usize = 253;

/// Longest single label accepted in a pattern, in octets
pub const MAX_LABEL_LEN: usize = 63;

/// Node in the label trie
#[derive(Debug, Clone)]
struct LabelNode<T> {
    children: HashMap<String, LabelNode<T>>,
    /// Value for the node's name itself
    exact: Option<T>,
    /// Value for any proper subdomain of the node's name
    wildcard: Option<T>,
}

impl<T> Default for LabelNode<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            exact: None,
            wildcard: None,
        }
    }
}

/// Which payload slots a pattern writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slots {
    Exact,
    Wildcard,
    Both,
}

/// Domain matcher resolving a name to its most specific registered pattern.
///
/// Supported patterns:
/// - `example.com` - exact name only
/// - `*.example.com` - any proper subdomain, never `example.com` itself
/// - `*example.com` - `example.com` and any subdomain
/// - `*` - catch-all
///
/// Precedence on lookup is exact > deepest wildcard > catch-all. Labels are
/// compared byte for byte; callers wanting case-insensitive matching lowercase
/// both patterns and queries (as [`crate::Classifier`] does).
#[derive(Debug, Clone)]
pub struct DomainMatcher<T> {
    /// The root's wildcard slot is the catch-all
    root: LabelNode<T>,
    len: usize,
}

impl<T> Default for DomainMatcher<T> {
    fn default() -> Self {
        Self {
            root: LabelNode::default(),
            len: 0,
        }
    }
}

impl<T> DomainMatcher<T> {
    /// Create an empty matcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied payload slots.
    ///
    /// A `*example.com` pattern occupies two (exact and wildcard).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no pattern has been registered
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up the most specific value registered for `name`.
    pub fn get(&self, name: &str) -> Option<&T> {
        let mut node = &self.root;
        let mut candidate = None;
        let mut labels = name.rsplit('.').peekable();

        while let Some(label) = labels.next() {
            match node.children.get(label) {
                Some(child) => node = child,
                None => return candidate.or(self.root.wildcard.as_ref()),
            }

            // A wildcard only covers names with at least one more label
            if labels.peek().is_some() {
                if let Some(value) = node.wildcard.as_ref() {
                    candidate = Some(value);
                }
            }
        }

        node.exact
            .as_ref()
            .or(candidate)
            .or(self.root.wildcard.as_ref())
    }

    /// Walk (or create) the nodes for `name`, TLD first, and return the last one.
    fn walk_mut<'a>(root: &'a mut LabelNode<T>, name: &str) -> &'a mut LabelNode<T> {
        let mut node = root;
        for label in name.rsplit('.') {
            node = node.children.entry(label.to_string()).or_default();
        }
        node
    }

    fn store(slot: &mut Option<T>, value: T, len: &mut usize, pattern: &str) {
        if slot.replace(value).is_some() {
            trace!(pattern, "domain pattern overwritten");
        } else {
            *len += 1;
        }
    }
}

impl<T: Clone> DomainMatcher<T> {
    /// Register `pattern` with `value`.
    ///
    /// Re-registering a pattern replaces its value. Patterns other than `*`
    /// must contain a dot, no empty labels, and stay within DNS limits
    /// ([`MAX_NAME_LEN`], [`MAX_LABEL_LEN`]); otherwise
    /// [`TrieError::InvalidPattern`] is returned and the matcher is unchanged.
    pub fn insert(&mut self, pattern: &str, value: T) -> Result<()> {
        if pattern == "*" {
            Self::store(&mut self.root.wildcard, value, &mut self.len, pattern);
            return Ok(());
        }

        let (name, slots) = parse_pattern(pattern).inspect_err(|err| {
            debug!(pattern, error = %err, "rejected domain pattern");
        })?;

        let node = Self::walk_mut(&mut self.root, name);
        match slots {
            Slots::Exact => Self::store(&mut node.exact, value, &mut self.len, pattern),
            Slots::Wildcard => Self::store(&mut node.wildcard, value, &mut self.len, pattern),
            Slots::Both => {
                Self::store(&mut node.exact, value.clone(), &mut self.len, pattern);
                Self::store(&mut node.wildcard, value, &mut self.len, pattern);
            }
        }
        Ok(())
    }

    /// Look up `name` and return a copy of the matching value.
    pub fn find(&self, name: &str) -> Option<T> {
        self.get(name).cloned()
    }
}

/// Split a non-catch-all pattern into the name it anchors on and the slots it fills.
fn parse_pattern(pattern: &str) -> Result<(&str, Slots)> {
    if !pattern.contains('.') {
        return Err(TrieError::InvalidPattern(pattern.to_string()));
    }

    let (name, slots) = if let Some(suffix) = pattern.strip_prefix("*.") {
        (suffix, Slots::Wildcard)
    } else if let Some(rest) = pattern.strip_prefix('*') {
        (rest, Slots::Both)
    } else {
        (pattern, Slots::Exact)
    };

    // The length limits also bound the trie depth
    if name.len() > MAX_NAME_LEN
        || name
            .split('.')
            .any(|label| label.is_empty() || label.len() > MAX_LABEL_LEN)
    {
        return Err(TrieError::InvalidPattern(pattern.to_string()));
    }

    Ok((name, slots))
}
