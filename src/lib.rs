//! # redblack-rs
//!
//! An arena-backed red-black tree: an ordered key collection with O(log n)
//! search, insertion and deletion, stable node handles, and a pluggable
//! comparator.
//!
//! Links are arena offsets rather than pointers, and a shared BLACK sentinel
//! slot stands in for every absent child and parent, so the rebalancing code
//! never branches on a missing link.
//!
//! ## Example
//!
//! ```rust
//! use redblack_rs::RbTree;
//!
//! let mut tree: RbTree<u32> = RbTree::new();
//! let handle = tree.insert(20).unwrap();
//! tree.insert(10).unwrap();
//! tree.insert(30).unwrap();
//!
//! assert_eq!(tree.key(handle), Some(&20));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
//!
//! assert_eq!(tree.remove_node(handle), 20);
//! assert_eq!(tree.find(&20), None);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Comparator
// =============================================================================

/// Total order over stored keys.
///
/// Must be pure, and stable for as long as a key it has ordered remains in
/// the tree; mutating a stored key's ordering value while it is stored leaves
/// the tree inconsistent.
pub trait Comparator<K> {
    fn cmp(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation. The default comparator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    #[inline]
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

// =============================================================================
// Node storage
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

/// Stable handle naming one stored key.
///
/// Obtained from [`RbTree::insert`] and valid until that node is removed.
/// Rotations and rebalancing never move a key between nodes, so the handle
/// keeps naming the same key across any sequence of other mutations. Removal
/// recycles the slot: a handle held past the removal of its node may later
/// alias an unrelated key and must be discarded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeRef(u32);

impl NodeRef {
    /// Arena slot 0 is the sentinel.
    const NIL: NodeRef = NodeRef(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn is_nil(self) -> bool {
        self.0 == 0
    }
}

#[derive(Clone, Copy)]
struct Node {
    left: NodeRef,
    right: NodeRef,
    parent: NodeRef,
    color: Color,
}

impl Node {
    const SENTINEL: Node = Node {
        left: NodeRef::NIL,
        right: NodeRef::NIL,
        parent: NodeRef::NIL,
        color: Color::Black,
    };

    /// Fresh attachment point: RED with sentinel children, so the
    /// black-height of every existing path is untouched.
    #[inline]
    fn leaf(parent: NodeRef) -> Node {
        Node {
            left: NodeRef::NIL,
            right: NodeRef::NIL,
            parent,
            color: Color::Red,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failed insertion. Both variants hand the rejected key back untouched.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertError<K> {
    /// An equal key is already stored; `existing` names its node.
    Duplicate { existing: NodeRef, key: K },
    /// Node storage could not be grown. The tree is left unmodified.
    AllocationFailed { key: K },
}

impl<K> fmt::Display for InsertError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::Duplicate { .. } => write!(f, "an equal key is already stored"),
            InsertError::AllocationFailed { .. } => write!(f, "node storage could not be grown"),
        }
    }
}

impl<K: fmt::Debug> std::error::Error for InsertError<K> {}

// =============================================================================
// Traversal order
// =============================================================================

/// Visitation order for [`RbTree::walk`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Traversal {
    /// Ascending comparator order.
    InOrder,
    /// Node before its subtrees.
    PreOrder,
    /// Subtrees before their node.
    PostOrder,
}

// =============================================================================
// RbTree
// =============================================================================

/// A red-black tree over keys ordered by an injected [`Comparator`].
///
/// Nodes live in an arena indexed by [`NodeRef`]; keys sit in a parallel
/// vector so the sentinel slot carries none. The sentinel is always BLACK and
/// its child links are never written; its parent field is scratch space for
/// delete fixup, which may need to walk up from a sentinel position.
///
/// Duplicate keys are rejected: [`RbTree::insert`] returns the incumbent
/// node's handle and the caller's key via [`InsertError::Duplicate`].
pub struct RbTree<K, C = NaturalOrder> {
    nodes: Vec<Node>,
    /// Key per arena slot; `None` for the sentinel and free slots.
    keys: Vec<Option<K>>,
    /// Recycled arena slots.
    free: Vec<NodeRef>,
    root: NodeRef,
    count: usize,
    cmp: C,
}

impl<K: Ord> RbTree<K, NaturalOrder> {
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, C> RbTree<K, C> {
    /// Empty tree ordering its keys by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        RbTree {
            nodes: vec![Node::SENTINEL],
            keys: vec![None],
            free: Vec::new(),
            root: NodeRef::NIL,
            count: 0,
            cmp,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node>()
            + self.keys.capacity() * std::mem::size_of::<Option<K>>()
            + self.free.capacity() * std::mem::size_of::<NodeRef>()
    }

    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
        self.keys.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    /// Key stored at `node`, or `None` if the handle does not name a live
    /// node (the sentinel, a freed slot, or an out-of-range index).
    pub fn key(&self, node: NodeRef) -> Option<&K> {
        self.keys.get(node.index()).and_then(|slot| slot.as_ref())
    }

    /// Smallest key, per the comparator.
    pub fn min(&self) -> Option<&K> {
        if self.root.is_nil() {
            return None;
        }
        Some(self.stored_key(self.subtree_min(self.root)))
    }

    /// Largest key, per the comparator.
    pub fn max(&self) -> Option<&K> {
        if self.root.is_nil() {
            return None;
        }
        Some(self.stored_key(self.subtree_max(self.root)))
    }

    /// Height in nodes: 0 for an empty tree. The color invariants bound it by
    /// `2·log2(n + 1)`.
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    /// In-order iterator over stored keys, ascending per the comparator.
    pub fn iter(&self) -> Iter<'_, K, C> {
        let next = if self.root.is_nil() {
            NodeRef::NIL
        } else {
            self.subtree_min(self.root)
        };
        Iter { tree: self, next }
    }

    /// Visit every key in the requested order.
    ///
    /// The shared borrow rules out tree mutation from inside the visitor.
    pub fn walk<F: FnMut(&K)>(&self, order: Traversal, mut visit: F) {
        match order {
            Traversal::InOrder => {
                if self.root.is_nil() {
                    return;
                }
                let mut node = self.subtree_min(self.root);
                while !node.is_nil() {
                    visit(self.stored_key(node));
                    node = self.successor(node);
                }
            }
            Traversal::PreOrder => {
                let mut stack = Vec::new();
                if !self.root.is_nil() {
                    stack.push(self.root);
                }
                while let Some(node) = stack.pop() {
                    visit(self.stored_key(node));
                    let right = self.right(node);
                    if !right.is_nil() {
                        stack.push(right);
                    }
                    let left = self.left(node);
                    if !left.is_nil() {
                        stack.push(left);
                    }
                }
            }
            Traversal::PostOrder => {
                let mut stack = Vec::new();
                if !self.root.is_nil() {
                    stack.push((self.root, false));
                }
                while let Some((node, expanded)) = stack.pop() {
                    if expanded {
                        visit(self.stored_key(node));
                        continue;
                    }
                    stack.push((node, true));
                    let right = self.right(node);
                    if !right.is_nil() {
                        stack.push((right, false));
                    }
                    let left = self.left(node);
                    if !left.is_nil() {
                        stack.push((left, false));
                    }
                }
            }
        }
    }

    /// Drop every node, handing each key to `dtor` in post-order so children
    /// are torn down before their parent.
    pub fn clear_with<F: FnMut(K)>(&mut self, mut dtor: F) {
        let mut stack = Vec::new();
        if !self.root.is_nil() {
            stack.push((self.root, false));
        }
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                if let Some(key) = self.keys[node.index()].take() {
                    dtor(key);
                }
                continue;
            }
            stack.push((node, true));
            let right = self.right(node);
            if !right.is_nil() {
                stack.push((right, false));
            }
            let left = self.left(node);
            if !left.is_nil() {
                stack.push((left, false));
            }
        }

        self.nodes.truncate(1);
        self.keys.truncate(1);
        self.free.clear();
        self.root = NodeRef::NIL;
        self.count = 0;
    }

    /// Drop every node, dropping the keys in place.
    pub fn clear(&mut self) {
        self.clear_with(drop);
    }

    // === Link accessors ===

    #[inline]
    fn left(&self, r: NodeRef) -> NodeRef {
        self.nodes[r.index()].left
    }

    #[inline]
    fn right(&self, r: NodeRef) -> NodeRef {
        self.nodes[r.index()].right
    }

    #[inline]
    fn parent(&self, r: NodeRef) -> NodeRef {
        self.nodes[r.index()].parent
    }

    #[inline]
    fn color(&self, r: NodeRef) -> Color {
        self.nodes[r.index()].color
    }

    #[inline]
    fn set_left(&mut self, r: NodeRef, child: NodeRef) {
        debug_assert!(!r.is_nil(), "sentinel child links are immutable");
        self.nodes[r.index()].left = child;
    }

    #[inline]
    fn set_right(&mut self, r: NodeRef, child: NodeRef) {
        debug_assert!(!r.is_nil(), "sentinel child links are immutable");
        self.nodes[r.index()].right = child;
    }

    #[inline]
    fn set_parent(&mut self, r: NodeRef, parent: NodeRef) {
        // The sentinel's parent is deliberately writable: delete fixup may
        // start from a sentinel position and walks up through this field.
        self.nodes[r.index()].parent = parent;
    }

    #[inline]
    fn set_color(&mut self, r: NodeRef, color: Color) {
        debug_assert!(
            !r.is_nil() || color == Color::Black,
            "sentinel must stay black"
        );
        self.nodes[r.index()].color = color;
    }

    /// Key of a node known to be live and non-sentinel.
    #[inline]
    fn stored_key(&self, r: NodeRef) -> &K {
        debug_assert!(!r.is_nil());
        match &self.keys[r.index()] {
            Some(key) => key,
            None => unreachable!("reachable node always carries a key"),
        }
    }

    // === Slot management ===

    fn alloc(&mut self, key: K, parent: NodeRef) -> Result<NodeRef, K> {
        if let Some(r) = self.free.pop() {
            self.nodes[r.index()] = Node::leaf(parent);
            self.keys[r.index()] = Some(key);
            return Ok(r);
        }
        if self.nodes.len() > u32::MAX as usize
            || self.nodes.try_reserve(1).is_err()
            || self.keys.try_reserve(1).is_err()
        {
            return Err(key);
        }
        let r = NodeRef(self.nodes.len() as u32);
        self.nodes.push(Node::leaf(parent));
        self.keys.push(Some(key));
        Ok(r)
    }

    fn release(&mut self, r: NodeRef) -> K {
        debug_assert!(!r.is_nil());
        self.free.push(r);
        match self.keys[r.index()].take() {
            Some(key) => key,
            None => unreachable!("released node always carries a key"),
        }
    }

    // === Shape primitives ===

    fn subtree_min(&self, mut node: NodeRef) -> NodeRef {
        debug_assert!(!node.is_nil());
        while !self.left(node).is_nil() {
            node = self.left(node);
        }
        node
    }

    fn subtree_max(&self, mut node: NodeRef) -> NodeRef {
        debug_assert!(!node.is_nil());
        while !self.right(node).is_nil() {
            node = self.right(node);
        }
        node
    }

    /// In-order successor: right-subtree minimum, else the nearest ancestor
    /// whose left subtree holds `node`. Sentinel when `node` is the maximum.
    fn successor(&self, mut node: NodeRef) -> NodeRef {
        let right = self.right(node);
        if !right.is_nil() {
            return self.subtree_min(right);
        }
        let mut up = self.parent(node);
        while !up.is_nil() && node == self.right(up) {
            node = up;
            up = self.parent(up);
        }
        up
    }

    // Recursion depth is bounded by the color invariants, so the stack stays
    // shallow even for full arenas.
    fn subtree_height(&self, node: NodeRef) -> usize {
        if node.is_nil() {
            return 0;
        }
        let hl = self.subtree_height(self.left(node));
        let hr = self.subtree_height(self.right(node));
        1 + hl.max(hr)
    }

    /// Promote `x`'s right child into `x`'s position; `x` becomes its left
    /// child and the grandchild in between switches sides. In-order sequence
    /// is unchanged.
    fn rotate_left(&mut self, x: NodeRef) {
        let y = self.right(x);
        debug_assert!(!y.is_nil(), "rotation pivot must have a right child");

        let inner = self.left(y);
        self.set_right(x, inner);
        if !inner.is_nil() {
            self.set_parent(inner, x);
        }

        let up = self.parent(x);
        self.set_parent(y, up);
        if up.is_nil() {
            self.root = y;
        } else if x == self.left(up) {
            self.set_left(up, y);
        } else {
            self.set_right(up, y);
        }

        self.set_left(y, x);
        self.set_parent(x, y);
    }

    fn rotate_right(&mut self, y: NodeRef) {
        let x = self.left(y);
        debug_assert!(!x.is_nil(), "rotation pivot must have a left child");

        let inner = self.right(x);
        self.set_left(y, inner);
        if !inner.is_nil() {
            self.set_parent(inner, y);
        }

        let up = self.parent(y);
        self.set_parent(x, up);
        if up.is_nil() {
            self.root = x;
        } else if y == self.right(up) {
            self.set_right(up, x);
        } else {
            self.set_left(up, x);
        }

        self.set_right(x, y);
        self.set_parent(y, x);
    }

    /// Replace the subtree rooted at `u` with the one rooted at `v` in `u`'s
    /// parent link. `v` may be the sentinel; its parent is written regardless
    /// so delete fixup can walk up from it.
    fn transplant(&mut self, u: NodeRef, v: NodeRef) {
        let up = self.parent(u);
        if up.is_nil() {
            self.root = v;
        } else if u == self.left(up) {
            self.set_left(up, v);
        } else {
            self.set_right(up, v);
        }
        self.set_parent(v, up);
    }
}

impl<K, C: Comparator<K>> RbTree<K, C> {
    /// Handle of the node storing a key equal to `key`, or `None`.
    pub fn find(&self, key: &K) -> Option<NodeRef> {
        let mut node = self.root;
        while !node.is_nil() {
            match self.cmp.cmp(key, self.stored_key(node)) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node = self.left(node),
                Ordering::Greater => node = self.right(node),
            }
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Insert `key`, returning a stable handle to its node.
    ///
    /// Duplicates are rejected; allocation failure leaves the tree
    /// unmodified. Either way the key travels back in the error.
    pub fn insert(&mut self, key: K) -> Result<NodeRef, InsertError<K>> {
        let mut parent = NodeRef::NIL;
        let mut node = self.root;
        let mut went_left = false;
        while !node.is_nil() {
            parent = node;
            match self.cmp.cmp(&key, self.stored_key(node)) {
                Ordering::Equal => {
                    return Err(InsertError::Duplicate {
                        existing: node,
                        key,
                    })
                }
                Ordering::Less => {
                    node = self.left(node);
                    went_left = true;
                }
                Ordering::Greater => {
                    node = self.right(node);
                    went_left = false;
                }
            }
        }

        let z = match self.alloc(key, parent) {
            Ok(z) => z,
            Err(key) => return Err(InsertError::AllocationFailed { key }),
        };
        if parent.is_nil() {
            self.root = z;
        } else if went_left {
            self.set_left(parent, z);
        } else {
            self.set_right(parent, z);
        }

        self.insert_fixup(z);
        self.count += 1;
        Ok(z)
    }

    /// Remove the node storing a key equal to `key` and return the stored
    /// key, or `None` if absent.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let node = self.find(key)?;
        Some(self.remove_node(node))
    }

    /// Remove the node named by `handle` and return its key.
    ///
    /// Two-child removal physically relinks the in-order successor rather
    /// than copying its key across nodes, so every other outstanding handle
    /// keeps naming the same key.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not name a live node.
    pub fn remove_node(&mut self, handle: NodeRef) -> K {
        assert!(
            self.key(handle).is_some(),
            "handle does not name a live node"
        );
        let z = handle;

        let mut removed_color = self.color(z);
        let x;
        if self.left(z).is_nil() {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z).is_nil() {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            // Two children: relink the successor into z's position.
            let y = self.subtree_min(self.right(z));
            removed_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                // x may be the sentinel; fixup still needs its parent link.
                self.set_parent(x, y);
            } else {
                self.transplant(y, x);
                let zr = self.right(z);
                self.set_right(y, zr);
                self.set_parent(zr, y);
            }
            self.transplant(z, y);
            let zl = self.left(z);
            self.set_left(y, zl);
            self.set_parent(zl, y);
            let zc = self.color(z);
            self.set_color(y, zc);
        }

        if removed_color == Color::Black {
            self.remove_fixup(x);
        }
        self.count -= 1;
        self.release(z)
    }

    /// Restore the color invariants after attaching the RED node `z`.
    ///
    /// Walks upward while a red-red conflict remains. A red uncle recolors
    /// and moves the conflict two levels up; a black uncle resolves it with
    /// at most two rotations (a triangle is straightened into a line first).
    fn insert_fixup(&mut self, mut z: NodeRef) {
        while self.color(self.parent(z)) == Color::Red {
            let parent = self.parent(z);
            let grandparent = self.parent(parent);
            debug_assert!(!grandparent.is_nil(), "a red parent is never the root");

            if parent == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if self.color(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                } else {
                    if z == self.right(parent) {
                        z = parent;
                        self.rotate_left(z);
                    }
                    // Line case; the rotation above moved z's parent.
                    let parent = self.parent(z);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.left(grandparent);
                if self.color(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                } else {
                    if z == self.left(parent) {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.parent(z);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Rebalance after splicing out a BLACK node; `x` carries the extra
    /// black and may be the sentinel (its parent link was just written).
    ///
    /// Each step either terminates (a red sibling child is reachable within
    /// two rotations) or pushes the extra black one level toward the root.
    fn remove_fixup(&mut self, mut x: NodeRef) {
        while x != self.root && self.color(x) == Color::Black {
            let parent = self.parent(x);
            if x == self.left(parent) {
                let mut sibling = self.right(parent);
                debug_assert!(!sibling.is_nil(), "black-height forces a real sibling");

                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.right(parent);
                }

                if self.color(self.left(sibling)) == Color::Black
                    && self.color(self.right(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = parent;
                } else {
                    if self.color(self.right(sibling)) == Color::Black {
                        let near = self.left(sibling);
                        self.set_color(near, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right(parent);
                    }
                    let parent_color = self.color(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let far = self.right(sibling);
                    self.set_color(far, Color::Black);
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = self.left(parent);
                debug_assert!(!sibling.is_nil(), "black-height forces a real sibling");

                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.left(parent);
                }

                if self.color(self.left(sibling)) == Color::Black
                    && self.color(self.right(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = parent;
                } else {
                    if self.color(self.left(sibling)) == Color::Black {
                        let near = self.right(sibling);
                        self.set_color(near, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left(parent);
                    }
                    let parent_color = self.color(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let far = self.left(sibling);
                    self.set_color(far, Color::Black);
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }
        self.set_color(x, Color::Black);
    }
}

impl<K: Ord> Default for RbTree<K, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, C: Clone> Clone for RbTree<K, C> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            keys: self.keys.clone(),
            free: self.free.clone(),
            root: self.root,
            count: self.count,
            cmp: self.cmp.clone(),
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for RbTree<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// In-order key iterator; see [`RbTree::iter`].
pub struct Iter<'a, K, C> {
    tree: &'a RbTree<K, C>,
    next: NodeRef,
}

impl<'a, K, C> Iterator for Iter<'a, K, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.next.is_nil() {
            return None;
        }
        let node = self.next;
        self.next = self.tree.successor(node);
        Some(self.tree.stored_key(node))
    }
}

// =============================================================================
// Invariant checking (test-only)
// =============================================================================

#[cfg(test)]
impl<K: fmt::Debug, C: Comparator<K>> RbTree<K, C> {
    /// Assert every structural invariant: BST order, black root, no red-red
    /// edge, uniform black-height, and count matching reachability.
    pub(crate) fn check_invariants(&self) {
        if self.root.is_nil() {
            assert_eq!(self.count, 0, "empty tree must report count 0");
            return;
        }
        assert_eq!(self.color(self.root), Color::Black, "root must be black");
        assert!(self.parent(self.root).is_nil(), "root must have no parent");

        let mut reachable = 0usize;
        self.check_subtree(self.root, &mut reachable);
        assert_eq!(reachable, self.count, "count must match reachable nodes");

        let keys: Vec<&K> = self.iter().collect();
        assert_eq!(keys.len(), self.count);
        for pair in keys.windows(2) {
            assert_eq!(
                self.cmp.cmp(pair[0], pair[1]),
                Ordering::Less,
                "in-order sequence must be strictly ascending: {:?} vs {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    /// Returns the subtree's black-height (sentinels count as 1).
    fn check_subtree(&self, node: NodeRef, reachable: &mut usize) -> usize {
        if node.is_nil() {
            return 1;
        }
        *reachable += 1;
        assert!(
            self.keys[node.index()].is_some(),
            "reachable node must hold a key"
        );

        let left = self.left(node);
        let right = self.right(node);
        if !left.is_nil() {
            assert_eq!(self.parent(left), node, "left child parent link broken");
        }
        if !right.is_nil() {
            assert_eq!(self.parent(right), node, "right child parent link broken");
        }
        if self.color(node) == Color::Red {
            assert_eq!(
                self.color(left),
                Color::Black,
                "red node {:?} has a red left child",
                self.stored_key(node)
            );
            assert_eq!(
                self.color(right),
                Color::Black,
                "red node {:?} has a red right child",
                self.stored_key(node)
            );
        }

        let bh_left = self.check_subtree(left, reachable);
        let bh_right = self.check_subtree(right, reachable);
        assert_eq!(
            bh_left, bh_right,
            "black-height mismatch under {:?}",
            self.stored_key(node)
        );
        bh_left + (self.color(node) == Color::Black) as usize
    }
}


#[cfg(test)]
mod proptests;
