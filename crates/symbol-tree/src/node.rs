use std::rc::Rc;

/// Per-object linkage record.  Mirrors upstream `SymbolTreeNode.js`.
///
/// Upstream hangs this off the host object under a private `Symbol`; here it
/// lives in the tree instance's identity-keyed side table, so the host object
/// never sees it.
#[derive(Debug)]
pub(crate) struct SymbolTreeNode<T> {
    pub parent: Option<Rc<T>>,
    pub first: Option<Rc<T>>,
    pub last: Option<Rc<T>>,
    pub prev: Option<Rc<T>>,
    pub next: Option<Rc<T>>,
    /// Unique id assigned by `get_unique_id`, cleared on `remove`.
    pub id: Option<String>,
}

impl<T> SymbolTreeNode<T> {
    pub fn new() -> Self {
        Self {
            parent: None,
            first: None,
            last: None,
            prev: None,
            next: None,
            id: None,
        }
    }

    /// An object participates in some chain iff any of these is set.
    pub fn is_attached(&self) -> bool {
        self.parent.is_some() || self.prev.is_some() || self.next.is_some()
    }

    /// True when the object has no children.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

impl<T> Default for SymbolTreeNode<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_node_is_detached_and_empty() {
        let node = SymbolTreeNode::<String>::new();
        assert!(!node.is_attached());
        assert!(node.is_empty());
        assert!(node.id.is_none());
    }

    #[test]
    fn attached_when_any_link_is_set() {
        let other = Rc::new("x".to_string());

        let mut node = SymbolTreeNode::<String>::new();
        node.parent = Some(Rc::clone(&other));
        assert!(node.is_attached());

        let mut node = SymbolTreeNode::<String>::new();
        node.prev = Some(Rc::clone(&other));
        assert!(node.is_attached());

        let mut node = SymbolTreeNode::<String>::new();
        node.next = Some(other);
        assert!(node.is_attached());
    }

    #[test]
    fn children_do_not_make_a_node_attached() {
        let child = Rc::new("c".to_string());
        let mut node = SymbolTreeNode::<String>::new();
        node.first = Some(Rc::clone(&child));
        node.last = Some(child);
        assert!(!node.is_attached());
        assert!(!node.is_empty());
    }
}
