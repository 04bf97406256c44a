//! Conversion between live tree structure and nested plain-object
//! ("JSON-shaped") trees, in both directions.

use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::tree::{AlreadyAttachedError, SymbolTree};

/// Configuration for the recursive conversions.
///
/// `children_attribute` names the field holding the nested children array on
/// the raw JSON side (default `"children"`).  `get_node` maps a raw JSON
/// node to the host object actually inserted into the tree; the default (for
/// `Value` hosts) uses the raw node unchanged.
pub struct ConvertOptions<'a, T> {
    pub children_attribute: String,
    pub get_node: Box<dyn Fn(&Value) -> Rc<T> + 'a>,
}

impl<'a, T> ConvertOptions<'a, T> {
    /// Options with a custom raw-node-to-host-object hook.
    pub fn with_get_node(get_node: impl Fn(&Value) -> Rc<T> + 'a) -> Self {
        Self {
            children_attribute: "children".to_string(),
            get_node: Box::new(get_node),
        }
    }

    /// Override the name of the children-holding attribute.
    pub fn children_attribute(mut self, name: impl Into<String>) -> Self {
        self.children_attribute = name.into();
        self
    }
}

impl<'a> Default for ConvertOptions<'a, Value> {
    fn default() -> Self {
        Self::with_get_node(|raw| Rc::new(raw.clone()))
    }
}

impl<T> SymbolTree<T> {
    /// Build tree structure from a nested JSON node, recursively.
    ///
    /// The node produced by `get_node` is appended as the last child of
    /// `parent`, or left as a freestanding top-level root when `parent` is
    /// `None`.  Each element of the node's children array (per
    /// `children_attribute`, missing means none) is then appended under it
    /// in array order.  Returns the host object for `json` itself.
    ///
    /// # Example
    ///
    /// ```
    /// use symbol_tree::{ConvertOptions, SymbolTree};
    /// use serde_json::json;
    ///
    /// let mut tree = SymbolTree::new();
    /// let opts = ConvertOptions::default();
    /// let root = tree
    ///     .append_children_recursively(
    ///         &json!({"name": "root", "children": [{"name": "leaf", "children": []}]}),
    ///         None,
    ///         &opts,
    ///     )
    ///     .unwrap();
    ///
    /// let leaf = tree.first(&root).unwrap();
    /// assert_eq!(leaf["name"], json!("leaf"));
    /// ```
    pub fn append_children_recursively(
        &mut self,
        json: &Value,
        parent: Option<&Rc<T>>,
        options: &ConvertOptions<'_, T>,
    ) -> Result<Rc<T>, AlreadyAttachedError> {
        let node = (options.get_node)(json);
        match parent {
            Some(parent) => {
                self.insert_last(&node, parent)?;
            }
            None => {
                self.initialize(&node);
            }
        }

        if let Some(children) = json
            .get(options.children_attribute.as_str())
            .and_then(Value::as_array)
        {
            for child in children {
                self.append_children_recursively(child, Some(&node), options)?;
            }
        }

        Ok(node)
    }

    /// Flatten the live tree rooted at `object` back into a nested JSON
    /// value.
    ///
    /// Starts from the object's own serialized fields (linkage is side-table
    /// state and never appears) and overwrites `children_attribute` with the
    /// recursively converted children in `first`→`next` order, empty array
    /// when childless.  The children array always mirrors current structure,
    /// so edits made after construction are reflected.  Non-object
    /// serializations contribute no fields of their own.
    pub fn to_tree_object(
        &self,
        object: &Rc<T>,
        options: &ConvertOptions<'_, T>,
    ) -> serde_json::Result<Value>
    where
        T: Serialize,
    {
        let mut fields = match serde_json::to_value(&**object)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut children = Vec::new();
        let mut cursor = self.first(object);
        while let Some(child) = cursor {
            cursor = self.next(&child);
            children.push(self.to_tree_object(&child, options)?);
        }
        fields.insert(options.children_attribute.clone(), Value::Array(children));

        Ok(Value::Object(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize)]
    struct Step {
        name: String,
    }

    #[test]
    fn get_node_hook_builds_typed_hosts() {
        let mut tree = SymbolTree::<Step>::new();
        let opts = ConvertOptions::with_get_node(|raw| {
            Rc::new(Step {
                name: raw["name"].as_str().unwrap_or_default().to_string(),
            })
        });

        let root = tree
            .append_children_recursively(
                &json!({"name": "root", "children": [{"name": "a"}, {"name": "b"}]}),
                None,
                &opts,
            )
            .unwrap();

        assert_eq!(root.name, "root");
        let a = tree.first(&root).unwrap();
        let b = tree.next(&a).unwrap();
        assert_eq!(a.name, "a");
        assert_eq!(b.name, "b");
        assert!(tree.next(&b).is_none());

        // The typed host serializes without any trace of tree linkage.
        assert_eq!(
            tree.to_tree_object(&root, &opts).unwrap(),
            json!({
                "name": "root",
                "children": [
                    {"name": "a", "children": []},
                    {"name": "b", "children": []},
                ],
            })
        );
    }

    #[test]
    fn missing_children_attribute_means_leaf() {
        let mut tree = SymbolTree::<Value>::new();
        let opts = ConvertOptions::default();
        let root = tree
            .append_children_recursively(&json!({"name": "lonely"}), None, &opts)
            .unwrap();
        assert!(tree.is_empty(&root));
    }

    #[test]
    fn non_object_hosts_serialize_to_bare_children() {
        let mut tree = SymbolTree::<Value>::new();
        let opts = ConvertOptions::default();
        let root = Rc::new(json!("scalar"));
        let child = Rc::new(json!({"name": "c"}));
        tree.insert_last(&child, &root).unwrap();

        assert_eq!(
            tree.to_tree_object(&root, &opts).unwrap(),
            json!({"children": [{"name": "c", "children": []}]})
        );
    }

    #[test]
    fn attaches_under_an_existing_parent() {
        let mut tree = SymbolTree::<Value>::new();
        let opts = ConvertOptions::default();
        let parent = Rc::new(json!({"name": "parent"}));
        let sibling = Rc::new(json!({"name": "sibling"}));
        tree.insert_last(&sibling, &parent).unwrap();

        let added = tree
            .append_children_recursively(&json!({"name": "added"}), Some(&parent), &opts)
            .unwrap();

        assert!(Rc::ptr_eq(&tree.last(&parent).unwrap(), &added));
        assert!(Rc::ptr_eq(&tree.prev(&added).unwrap(), &sibling));
    }

    #[test]
    fn get_node_returning_an_attached_object_fails_atomically() {
        let mut tree = SymbolTree::<Value>::new();
        let parent = Rc::new(json!({"name": "parent"}));
        let stuck = Rc::new(json!({"name": "stuck"}));
        tree.insert_last(&stuck, &parent).unwrap();

        let reuse = Rc::clone(&stuck);
        let opts = ConvertOptions::with_get_node(move |_| Rc::clone(&reuse));
        let err = tree
            .append_children_recursively(&json!({"name": "again"}), Some(&parent), &opts)
            .unwrap_err();
        assert_eq!(err, AlreadyAttachedError);

        assert!(Rc::ptr_eq(&tree.first(&parent).unwrap(), &stuck));
        assert!(Rc::ptr_eq(&tree.last(&parent).unwrap(), &stuck));
    }
}
