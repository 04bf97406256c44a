//! Identity-keyed linkage store.
//!
//! Upstream attaches the linkage record to the host object under a private
//! `Symbol(description)`.  The Rust rendition inverts that: each tree
//! instance owns a side table keyed by `Rc` identity, plus a [`TreeTag`]
//! standing in for the symbol.  Distinct instances own distinct tables, so
//! the same host object can belong to several trees at once without the
//! instances observing each other.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::node::SymbolTreeNode;

static NEXT_TAG: AtomicU64 = AtomicU64::new(0);

/// Process-unique token identifying one tree instance.
///
/// Mirrors the upstream `Symbol(description || 'SymbolTree data')`: carries a
/// human-readable debug label and an id no other instance shares.
#[derive(Clone, PartialEq, Eq)]
pub struct TreeTag {
    id: u64,
    label: String,
}

impl TreeTag {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            id: NEXT_TAG.fetch_add(1, Ordering::Relaxed),
            label: label.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for TreeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeTag({:?}, {})", self.label, self.id)
    }
}

/// Hashes and compares by `Rc` identity, not by value.
///
/// Holding the `Rc` inside the key keeps the allocation alive, so a record's
/// address can never be reused by a different host object while the store
/// still references it.
struct RcKey<T>(Rc<T>);

impl<T> PartialEq for RcKey<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for RcKey<T> {}

impl<T> Hash for RcKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

/// Pure storage: never inspects record contents.
pub(crate) struct LinkStore<T> {
    tag: TreeTag,
    records: HashMap<RcKey<T>, SymbolTreeNode<T>>,
}

impl<T> LinkStore<T> {
    pub fn new(tag: TreeTag) -> Self {
        Self {
            tag,
            records: HashMap::new(),
        }
    }

    pub fn tag(&self) -> &TreeTag {
        &self.tag
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Existing record, or a freshly created all-`None` one.
    /// Mirrors upstream `_node(object)`.
    pub fn ensure(&mut self, object: &Rc<T>) -> &mut SymbolTreeNode<T> {
        self.records
            .entry(RcKey(Rc::clone(object)))
            .or_insert_with(SymbolTreeNode::new)
    }

    /// Read-only lookup; never creates a record, so passive queries stay
    /// observably side-effect free.
    pub fn get(&self, object: &Rc<T>) -> Option<&SymbolTreeNode<T>> {
        self.records.get(&RcKey(Rc::clone(object)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent() {
        let mut store = LinkStore::new(TreeTag::new("test"));
        let obj = Rc::new("a".to_string());

        store.ensure(&obj).id = Some("marker".to_string());
        assert_eq!(store.ensure(&obj).id.as_deref(), Some("marker"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_does_not_create_records() {
        let mut store = LinkStore::new(TreeTag::new("test"));
        let obj = Rc::new("a".to_string());

        assert!(store.get(&obj).is_none());
        assert_eq!(store.len(), 0);
        store.ensure(&obj);
        assert!(store.get(&obj).is_some());
    }

    #[test]
    fn keys_compare_by_identity_not_value() {
        let mut store = LinkStore::new(TreeTag::new("test"));
        let a = Rc::new("same".to_string());
        let b = Rc::new("same".to_string());

        store.ensure(&a);
        store.ensure(&b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn tags_are_process_unique() {
        let t1 = TreeTag::new("SymbolTree data");
        let t2 = TreeTag::new("SymbolTree data");
        assert_ne!(t1, t2);
        assert_eq!(t1.label(), t2.label());
    }
}
