//! The tree/forest engine: navigation, O(1) structural mutation, and the
//! unique-id index.  Mirrors upstream `SymbolTree.js`.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use uuid::Uuid;

use crate::store::{LinkStore, TreeTag};

/// Raised by every insert operation when the object to insert already
/// participates in some chain of this tree.  No mutation happens before the
/// check; callers must [`SymbolTree::remove`] first.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("object is already present in this SymbolTree, remove it first")]
pub struct AlreadyAttachedError;

/// One namespace under which host objects may be organized into a tree, or a
/// forest of trees chained as top-level siblings.
///
/// Host objects are shared `Rc<T>`; the tree never copies or wraps them and
/// tracks linkage purely by `Rc` identity.  A single object may belong to
/// several independent `SymbolTree` instances at the same time.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use symbol_tree::SymbolTree;
///
/// let mut tree = SymbolTree::new();
/// let parent = Rc::new("parent");
/// let child = Rc::new("child");
///
/// tree.insert_last(&child, &parent).unwrap();
///
/// assert!(Rc::ptr_eq(&tree.parent(&child).unwrap(), &parent));
/// assert!(Rc::ptr_eq(&tree.first(&parent).unwrap(), &child));
/// assert!(tree.next(&child).is_none());
/// ```
pub struct SymbolTree<T> {
    pub(crate) store: LinkStore<T>,
    pub(crate) root: Option<Rc<T>>,
    pub(crate) ids: HashMap<String, Rc<T>>,
}

impl<T> SymbolTree<T> {
    /// Tree instance with the default debug label, like `new SymbolTree()`.
    pub fn new() -> Self {
        Self::with_label("SymbolTree data")
    }

    /// Tree instance with a human-readable label for the underlying tag,
    /// like `new SymbolTree(description)`.
    pub fn with_label(label: &str) -> Self {
        Self {
            store: LinkStore::new(TreeTag::new(label)),
            root: None,
            ids: HashMap::new(),
        }
    }

    /// The process-unique tag identifying this instance.
    pub fn tag(&self) -> &TreeTag {
        self.store.tag()
    }

    /// Eagerly create the linkage record for `object` and hand the object
    /// back unchanged.  Purely a construction-time optimization; every other
    /// operation creates records lazily.
    pub fn initialize(&mut self, object: &Rc<T>) -> Rc<T> {
        self.store.ensure(object);
        Rc::clone(object)
    }

    // ---- navigation, all O(1) ----
    //
    // Objects without a record behave as freshly initialized; lookups never
    // mutate the store.

    /// True when `object` has no children.
    pub fn is_empty(&self, object: &Rc<T>) -> bool {
        self.store.get(object).map_or(true, |node| node.is_empty())
    }

    /// First child of `object`.
    pub fn first(&self, object: &Rc<T>) -> Option<Rc<T>> {
        self.store.get(object).and_then(|node| node.first.clone())
    }

    /// Last child of `object`.
    pub fn last(&self, object: &Rc<T>) -> Option<Rc<T>> {
        self.store.get(object).and_then(|node| node.last.clone())
    }

    /// Previous sibling of `object`.
    pub fn prev(&self, object: &Rc<T>) -> Option<Rc<T>> {
        self.store.get(object).and_then(|node| node.prev.clone())
    }

    /// Next sibling of `object`.
    pub fn next(&self, object: &Rc<T>) -> Option<Rc<T>> {
        self.store.get(object).and_then(|node| node.next.clone())
    }

    /// Parent of `object`.
    pub fn parent(&self, object: &Rc<T>) -> Option<Rc<T>> {
        self.store.get(object).and_then(|node| node.parent.clone())
    }

    // ---- structural mutation, all O(1) ----
    //
    // Each operation updates exactly the records of the moved object, its
    // old/new neighbors and its old/new parent.  Descendant records are
    // never touched.

    /// Splice `new_object` in as the previous sibling of `reference`.
    pub fn insert_before(
        &mut self,
        new_object: &Rc<T>,
        reference: &Rc<T>,
    ) -> Result<Rc<T>, AlreadyAttachedError> {
        if self.store.ensure(new_object).is_attached() {
            return Err(AlreadyAttachedError);
        }

        let (parent, prev) = {
            let reference_node = self.store.ensure(reference);
            (reference_node.parent.clone(), reference_node.prev.clone())
        };

        {
            let new_node = self.store.ensure(new_object);
            new_node.parent = parent.clone();
            new_node.prev = prev.clone();
            new_node.next = Some(Rc::clone(reference));
        }
        self.store.ensure(reference).prev = Some(Rc::clone(new_object));

        if let Some(prev) = &prev {
            self.store.ensure(prev).next = Some(Rc::clone(new_object));
        }
        if let Some(parent) = &parent {
            let parent_node = self.store.ensure(parent);
            if parent_node
                .first
                .as_ref()
                .is_some_and(|first| Rc::ptr_eq(first, reference))
            {
                parent_node.first = Some(Rc::clone(new_object));
            }
        }

        Ok(Rc::clone(new_object))
    }

    /// Splice `new_object` in as the next sibling of `reference`.
    pub fn insert_after(
        &mut self,
        new_object: &Rc<T>,
        reference: &Rc<T>,
    ) -> Result<Rc<T>, AlreadyAttachedError> {
        if self.store.ensure(new_object).is_attached() {
            return Err(AlreadyAttachedError);
        }

        let (parent, next) = {
            let reference_node = self.store.ensure(reference);
            (reference_node.parent.clone(), reference_node.next.clone())
        };

        {
            let new_node = self.store.ensure(new_object);
            new_node.parent = parent.clone();
            new_node.prev = Some(Rc::clone(reference));
            new_node.next = next.clone();
        }
        self.store.ensure(reference).next = Some(Rc::clone(new_object));

        if let Some(next) = &next {
            self.store.ensure(next).prev = Some(Rc::clone(new_object));
        }
        if let Some(parent) = &parent {
            let parent_node = self.store.ensure(parent);
            if parent_node
                .last
                .as_ref()
                .is_some_and(|last| Rc::ptr_eq(last, reference))
            {
                parent_node.last = Some(Rc::clone(new_object));
            }
        }

        Ok(Rc::clone(new_object))
    }

    /// Make `new_object` the first child of `parent`.
    pub fn insert_first(
        &mut self,
        new_object: &Rc<T>,
        parent: &Rc<T>,
    ) -> Result<Rc<T>, AlreadyAttachedError> {
        if self.store.ensure(new_object).is_attached() {
            return Err(AlreadyAttachedError);
        }

        match self.store.ensure(parent).first.clone() {
            Some(first) => self.insert_before(new_object, &first),
            None => {
                self.store.ensure(new_object).parent = Some(Rc::clone(parent));
                let parent_node = self.store.ensure(parent);
                parent_node.first = Some(Rc::clone(new_object));
                parent_node.last = Some(Rc::clone(new_object));
                Ok(Rc::clone(new_object))
            }
        }
    }

    /// Make `new_object` the last child of `parent`.
    pub fn insert_last(
        &mut self,
        new_object: &Rc<T>,
        parent: &Rc<T>,
    ) -> Result<Rc<T>, AlreadyAttachedError> {
        if self.store.ensure(new_object).is_attached() {
            return Err(AlreadyAttachedError);
        }

        match self.store.ensure(parent).last.clone() {
            Some(last) => self.insert_after(new_object, &last),
            None => {
                self.store.ensure(new_object).parent = Some(Rc::clone(parent));
                let parent_node = self.store.ensure(parent);
                parent_node.first = Some(Rc::clone(new_object));
                parent_node.last = Some(Rc::clone(new_object));
                Ok(Rc::clone(new_object))
            }
        }
    }

    /// [`insert_last`](Self::insert_last) with `(parent, child)` argument
    /// order; the entry point bulk construction uses.
    pub fn append_child(
        &mut self,
        parent: &Rc<T>,
        child: &Rc<T>,
    ) -> Result<Rc<T>, AlreadyAttachedError> {
        self.insert_last(child, parent)
    }

    /// Detach `object` from its sibling chain and parent.
    ///
    /// The subtree below `object` stays intact and re-attachable as a unit.
    /// Any unique id assigned to `object` is evicted from the index.  Has no
    /// effect if already removed.
    pub fn remove(&mut self, object: &Rc<T>) -> Rc<T> {
        let (parent, prev, next, id) = {
            let node = self.store.ensure(object);
            (
                node.parent.take(),
                node.prev.take(),
                node.next.take(),
                node.id.take(),
            )
        };

        if let Some(parent) = &parent {
            let parent_node = self.store.ensure(parent);
            if parent_node
                .first
                .as_ref()
                .is_some_and(|first| Rc::ptr_eq(first, object))
            {
                parent_node.first = next.clone();
            }
            if parent_node
                .last
                .as_ref()
                .is_some_and(|last| Rc::ptr_eq(last, object))
            {
                parent_node.last = prev.clone();
            }
        }
        if let Some(prev) = &prev {
            self.store.ensure(prev).next = next.clone();
        }
        if let Some(next) = &next {
            self.store.ensure(next).prev = prev.clone();
        }
        if let Some(id) = id {
            self.ids.remove(&id);
        }

        Rc::clone(object)
    }

    // ---- unique-id index ----

    /// Stable unique id for `object`, generated on first call.
    ///
    /// The id is a canonical 36-character UUID v4 string, registered in the
    /// instance's id index until the object is removed from the tree.
    pub fn get_unique_id(&mut self, object: &Rc<T>) -> String {
        if let Some(id) = self.store.ensure(object).id.clone() {
            return id;
        }
        let id = Uuid::new_v4().to_string();
        self.store.ensure(object).id = Some(id.clone());
        self.ids.insert(id.clone(), Rc::clone(object));
        id
    }

    /// O(1) lookup of a previously assigned id.  `None` when the id was
    /// never assigned or its object has been removed.
    pub fn get_by_id(&self, id: &str) -> Option<Rc<T>> {
        self.ids.get(id).cloned()
    }
}

impl<T> Default for SymbolTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SymbolTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTree")
            .field("tag", self.store.tag())
            .field("tracked_objects", &self.store.len())
            .field("assigned_ids", &self.ids.len())
            .finish()
    }
}
