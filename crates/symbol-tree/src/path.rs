//! Forest-aware path addressing.
//!
//! Two addressing modes share one textual shape, dot-separated zero-based
//! sibling indices, most significant first:
//!
//! - **Root-relative** (`"0.1.0"`): produced when a root has been designated
//!   via [`SymbolTree::set_root`] and the addressed node sits under it.  The
//!   first segment is the root's own sibling index.
//! - **Forest-relative** (`"$1.0"`): `$`-prefixed; the first segment indexes
//!   among the top-level roots chained as parentless siblings.
//!
//! Resolution dispatches on the parsed [`TreePath`] variant rather than
//! sniffing string prefixes.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use thiserror::Error;

use crate::tree::SymbolTree;

/// Raised by [`SymbolTree::get_by_path`] and friends when a path cannot be
/// parsed or resolved against the current structure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidPathError {
    /// A segment is empty or not a non-negative integer.
    #[error("invalid segment {segment:?} in path {path:?}")]
    InvalidSegment { path: String, segment: String },
    /// A segment asks for more siblings/children than exist at that level.
    #[error("index {index} out of range at depth {depth} of path {path:?}")]
    IndexOutOfRange {
        path: String,
        depth: usize,
        index: usize,
    },
    /// `$`/non-`$` form does not match the addressing mode in effect.
    #[error("path {path:?} does not match the addressing mode in effect")]
    ModeMismatch { path: String },
    /// Forest-relative path with no designated root and no start object to
    /// locate the top-level chain from.
    #[error("no anchor object to resolve forest path {path:?} from")]
    NoAnchor { path: String },
}

/// Parsed form of a tree address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreePath {
    /// Dot-separated indices relative to a designated root's sibling chain.
    Rooted(Vec<usize>),
    /// `$`-prefixed: `root` indexes among the top-level roots, `steps`
    /// descend through children from there.
    Forest { root: usize, steps: Vec<usize> },
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreePath::Rooted(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{step}")?;
                }
                Ok(())
            }
            TreePath::Forest { root, steps } => {
                write!(f, "${root}")?;
                for step in steps {
                    write!(f, ".{step}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for TreePath {
    type Err = InvalidPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (forest, body) = match s.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let mut steps = Vec::new();
        for segment in body.split('.') {
            let index = segment.parse::<usize>().map_err(|_| {
                InvalidPathError::InvalidSegment {
                    path: s.to_string(),
                    segment: segment.to_string(),
                }
            })?;
            steps.push(index);
        }

        if forest {
            let root = steps.remove(0);
            Ok(TreePath::Forest { root, steps })
        } else {
            Ok(TreePath::Rooted(steps))
        }
    }
}

impl<T> SymbolTree<T> {
    /// Designate the root used by root-relative addressing.  Returns the
    /// root for chaining.
    pub fn set_root(&mut self, root: &Rc<T>) -> Rc<T> {
        self.root = Some(Rc::clone(root));
        Rc::clone(root)
    }

    /// Zero-based index of `object` among its siblings, counting from the
    /// chain start.  O(preceding siblings).
    fn sibling_index(&self, object: &Rc<T>) -> usize {
        let mut index = 0;
        let mut current = Rc::clone(object);
        while let Some(prev) = self.prev(&current) {
            index += 1;
            current = prev;
        }
        index
    }

    /// First object of `object`'s sibling chain (walks `prev` to the end).
    fn chain_start(&self, object: &Rc<T>) -> Rc<T> {
        let mut current = Rc::clone(object);
        while let Some(prev) = self.prev(&current) {
            current = prev;
        }
        current
    }

    /// Topmost ancestor of `object` (walks `parent` to the end).
    fn top_level_ancestor(&self, object: &Rc<T>) -> Rc<T> {
        let mut current = Rc::clone(object);
        while let Some(parent) = self.parent(&current) {
            current = parent;
        }
        current
    }

    /// Path of `object`, most-significant-first.
    ///
    /// Walks up from `object`, recording the sibling index at each level.
    /// When the walk meets the designated root the result is
    /// [`TreePath::Rooted`], with the root's own sibling index as the first
    /// segment; otherwise it runs to the top of the chain and the result is
    /// the `$`-prefixed [`TreePath::Forest`] form.  O(depth × breadth).
    pub fn get_path(&self, object: &Rc<T>) -> TreePath {
        let mut steps = Vec::new();
        let mut current = Rc::clone(object);
        loop {
            steps.push(self.sibling_index(&current));
            if self.root.as_ref().is_some_and(|root| Rc::ptr_eq(root, &current)) {
                steps.reverse();
                return TreePath::Rooted(steps);
            }
            match self.parent(&current) {
                Some(parent) => current = parent,
                None => {
                    steps.reverse();
                    let root = steps.remove(0);
                    return TreePath::Forest { root, steps };
                }
            }
        }
    }

    /// Resolve `path` against the designated root.
    ///
    /// The inverse of [`get_path`](Self::get_path): the first segment must
    /// be the designated root's own sibling index, every further segment
    /// descends one child level.  Addresses outside the rooted tree never
    /// resolve here — root-relative paths require a designated root and
    /// forest paths are rejected while one is in effect; use
    /// [`get_by_path_from`](Self::get_by_path_from) to resolve relative to
    /// an explicit object instead.
    pub fn get_by_path(&self, path: &str) -> Result<Rc<T>, InvalidPathError> {
        let parsed: TreePath = path.parse()?;
        match (&parsed, &self.root) {
            (TreePath::Rooted(steps), Some(root)) => match steps.split_first() {
                Some((&top, rest)) => {
                    if top != self.sibling_index(root) {
                        return Err(InvalidPathError::IndexOutOfRange {
                            path: parsed.to_string(),
                            depth: 0,
                            index: top,
                        });
                    }
                    self.descend(root, rest, 1, &parsed)
                }
                None => Err(InvalidPathError::InvalidSegment {
                    path: parsed.to_string(),
                    segment: String::new(),
                }),
            },
            (TreePath::Rooted(_), None) | (TreePath::Forest { .. }, Some(_)) => {
                Err(InvalidPathError::ModeMismatch {
                    path: path.to_string(),
                })
            }
            (TreePath::Forest { .. }, None) => Err(InvalidPathError::NoAnchor {
                path: path.to_string(),
            }),
        }
    }

    /// Resolve `path` relative to `start` instead of the designated root.
    ///
    /// The explicit anchor always wins over a designated root and accepts
    /// either path form.  Root-relative paths descend from `start`'s
    /// children, so `"0"` is `start`'s first child and `"2.0"` the first
    /// child of its third child, as in the upstream
    /// `getByPath(path, object)`.  Forest paths resolve against the
    /// top-level chain reached by walking `parent` then `prev` from
    /// `start`.
    pub fn get_by_path_from(
        &self,
        path: &str,
        start: &Rc<T>,
    ) -> Result<Rc<T>, InvalidPathError> {
        let parsed: TreePath = path.parse()?;
        match &parsed {
            TreePath::Rooted(steps) => self.descend(start, steps, 0, &parsed),
            TreePath::Forest { root, steps } => {
                let anchor = self.chain_start(&self.top_level_ancestor(start));
                let top = self.advance(anchor, *root, 0, &parsed)?;
                self.descend(&top, steps, 1, &parsed)
            }
        }
    }

    /// Walk down one child level per step, starting below `start`.
    fn descend(
        &self,
        start: &Rc<T>,
        steps: &[usize],
        first_depth: usize,
        path: &TreePath,
    ) -> Result<Rc<T>, InvalidPathError> {
        let mut current = Rc::clone(start);
        for (level, &index) in steps.iter().enumerate() {
            let depth = first_depth + level;
            current = self
                .first(&current)
                .ok_or_else(|| InvalidPathError::IndexOutOfRange {
                    path: path.to_string(),
                    depth,
                    index,
                })?;
            current = self.advance(current, index, depth, path)?;
        }
        Ok(current)
    }

    /// Advance `index` times along the sibling chain.
    fn advance(
        &self,
        from: Rc<T>,
        index: usize,
        depth: usize,
        path: &TreePath,
    ) -> Result<Rc<T>, InvalidPathError> {
        let mut current = from;
        for _ in 0..index {
            current = self
                .next(&current)
                .ok_or_else(|| InvalidPathError::IndexOutOfRange {
                    path: path.to_string(),
                    depth,
                    index,
                })?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rooted_paths() {
        let path: TreePath = "0.1.0".parse().unwrap();
        assert_eq!(path, TreePath::Rooted(vec![0, 1, 0]));

        let single: TreePath = "3".parse().unwrap();
        assert_eq!(single, TreePath::Rooted(vec![3]));
    }

    #[test]
    fn parses_forest_paths() {
        let path: TreePath = "$1.0".parse().unwrap();
        assert_eq!(
            path,
            TreePath::Forest {
                root: 1,
                steps: vec![0]
            }
        );

        let bare: TreePath = "$2".parse().unwrap();
        assert_eq!(
            bare,
            TreePath::Forest {
                root: 2,
                steps: vec![]
            }
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "$", "0..1", "a", "0.x", "-1", "$.0", "0.$1"] {
            let parsed = bad.parse::<TreePath>();
            assert!(
                matches!(parsed, Err(InvalidPathError::InvalidSegment { .. })),
                "expected InvalidSegment for {bad:?}, got {parsed:?}"
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for text in ["0", "0.1.0", "$0", "$1.0", "$2.3.4"] {
            let parsed: TreePath = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }
}
