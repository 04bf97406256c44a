//! Rust port of [symbol-tree](https://github.com/jsdom/js-symbol-tree),
//! including the extended path / unique-id / JSON-conversion API.
//!
//! Organizes arbitrary host-owned objects into a tree, or a forest of trees,
//! without the objects knowing about their membership and without the caller
//! doing any pointer bookkeeping.  Where the TypeScript original hides the
//! per-object linkage record under a private `Symbol`, this port keys an
//! identity-indexed side table by `Rc` pointer, so the host object's own
//! shape is never touched and independent tree instances never interfere.
//!
//! All structural operations are O(1); whole-subtree conversions are O(n).
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use symbol_tree::SymbolTree;
//!
//! let mut tree = SymbolTree::new();
//! let a = Rc::new("a");
//! let aa = Rc::new("aa");
//! let ab = Rc::new("ab");
//!
//! tree.insert_last(&aa, &a).unwrap();
//! tree.insert_after(&ab, &aa).unwrap();
//!
//! tree.set_root(&a);
//! assert_eq!(tree.get_path(&ab).to_string(), "0.1");
//! assert!(Rc::ptr_eq(&tree.get_by_path("0.1").unwrap(), &ab));
//! ```
//!
//! # Module layout
//!
//! | Module | Upstream file | Contents |
//! |--------|---------------|----------|
//! [`store`] | `Symbol` side table | [`TreeTag`] and the identity-keyed linkage store |
//! `node` | `SymbolTreeNode.js` | the hidden per-object linkage record |
//! [`tree`] | `SymbolTree.js` | [`SymbolTree`]: navigation, mutation, unique ids |
//! [`path`] | extended API | [`TreePath`], root-relative and `$`-forest addressing |
//! [`convert`] | extended API | [`ConvertOptions`], nested-JSON conversion |

mod node;

pub mod convert;
pub mod path;
pub mod store;
pub mod tree;

pub use convert::ConvertOptions;
pub use path::{InvalidPathError, TreePath};
pub use store::TreeTag;
pub use tree::{AlreadyAttachedError, SymbolTree};
