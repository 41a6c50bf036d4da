//! Tree nodes and the arena that owns them.
//!
//! Every node lives in an [`Arena`] slot and is addressed by a [`NodeId`].
//! Child edges, parent back-references and the leaf chain are all plain
//! indices, so a node never holds a pointer into another node. The arena is
//! the single owner; a parent "owns" its children only in the sense that it
//! is the one place where their ids are reachable from the root.

use crate::key::Key;

use std::fmt;

/// Stable handle to a node stored in an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

// ===========================================================================
// Arena
// ===========================================================================

/// Slot storage for nodes with a free list for recycling.
pub(crate) struct Arena<V> {
	slots: Vec<Option<Node<V>>>,
	free: Vec<usize>,
}

impl<V> Arena<V> {
	pub(crate) fn new() -> Self {
		Arena {
			slots: Vec::new(),
			free: Vec::new(),
		}
	}

	/// Stores a node, reusing a freed slot when one exists.
	pub(crate) fn alloc(&mut self, node: Node<V>) -> NodeId {
		if let Some(idx) = self.free.pop() {
			self.slots[idx] = Some(node);
			NodeId(idx)
		} else {
			self.slots.push(Some(node));
			NodeId(self.slots.len() - 1)
		}
	}

	/// Removes a node from the arena and returns it. The slot is recycled.
	pub(crate) fn free(&mut self, id: NodeId) -> Node<V> {
		let node = self.take(id);
		self.free.push(id.0);
		node
	}

	/// Moves a node out of its slot without recycling the slot. The caller
	/// must [`restore`](Self::restore) it before the operation finishes.
	pub(crate) fn take(&mut self, id: NodeId) -> Node<V> {
		match self.slots.get_mut(id.0).and_then(Option::take) {
			Some(node) => node,
			None => unreachable!("node {id} is not live in the arena"),
		}
	}

	/// Puts back a node previously moved out with [`take`](Self::take).
	pub(crate) fn restore(&mut self, id: NodeId, node: Node<V>) {
		let slot = &mut self.slots[id.0];
		assert!(slot.is_none(), "node {id} restored into an occupied slot");
		*slot = Some(node);
	}

	#[inline]
	pub(crate) fn get(&self, id: NodeId) -> &Node<V> {
		match self.slots.get(id.0) {
			Some(Some(node)) => node,
			_ => unreachable!("node {id} is not live in the arena"),
		}
	}

	#[inline]
	pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<V> {
		match self.slots.get_mut(id.0) {
			Some(Some(node)) => node,
			_ => unreachable!("node {id} is not live in the arena"),
		}
	}

	/// Number of live nodes.
	#[cfg(any(test, feature = "test-utils"))]
	pub(crate) fn live(&self) -> usize {
		self.slots.len() - self.free.len()
	}

	/// Drops every node.
	pub(crate) fn clear(&mut self) {
		self.slots.clear();
		self.free.clear();
	}
}

// ===========================================================================
// Node
// ===========================================================================

/// A node in the B+ tree, either internal (index) or leaf (data).
///
/// All leaves are at the same depth, and internal nodes contain only routing
/// information (no values).
pub(crate) enum Node<V> {
	/// An internal (index) node containing keys and child edges.
	Internal(InternalNode),
	/// A leaf node containing key-value pairs.
	Leaf(LeafNode<V>),
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Node::Internal(ref internal) => f.debug_tuple("Internal").field(internal).finish(),
			Node::Leaf(ref leaf) => f.debug_tuple("Leaf").field(leaf).finish(),
		}
	}
}

impl<V> Node<V> {
	/// Returns `true` if this is a leaf node.
	#[inline]
	pub(crate) fn is_leaf(&self) -> bool {
		matches!(self, Node::Leaf(_))
	}

	/// Returns a reference to the inner leaf node.
	///
	/// # Panics
	///
	/// Panics if called on an internal node.
	#[inline]
	pub(crate) fn as_leaf(&self) -> &LeafNode<V> {
		match self {
			Node::Leaf(ref leaf) => leaf,
			Node::Internal(_) => {
				unreachable!(
					"as_leaf() called on internal node - this indicates a tree traversal bug"
				)
			}
		}
	}

	/// Returns a mutable reference to the inner leaf node.
	///
	/// # Panics
	///
	/// Panics if called on an internal node.
	#[inline]
	pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<V> {
		match self {
			Node::Leaf(ref mut leaf) => leaf,
			Node::Internal(_) => {
				unreachable!(
					"as_leaf_mut() called on internal node - this indicates a tree traversal bug"
				)
			}
		}
	}

	/// Returns a reference to the inner internal node.
	///
	/// # Panics
	///
	/// Panics if called on a leaf node.
	#[inline]
	pub(crate) fn as_internal(&self) -> &InternalNode {
		match self {
			Node::Internal(ref internal) => internal,
			Node::Leaf(_) => {
				unreachable!(
					"as_internal() called on leaf node - this indicates a tree traversal bug"
				)
			}
		}
	}

	/// Returns a mutable reference to the inner internal node.
	///
	/// # Panics
	///
	/// Panics if called on a leaf node.
	#[inline]
	pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode {
		match self {
			Node::Internal(ref mut internal) => internal,
			Node::Leaf(_) => {
				unreachable!(
					"as_internal_mut() called on leaf node - this indicates a tree traversal bug"
				)
			}
		}
	}

	/// The keys stored in this node.
	#[inline]
	pub(crate) fn keys(&self) -> &[Key] {
		match self {
			Node::Internal(ref internal) => &internal.keys,
			Node::Leaf(ref leaf) => &leaf.keys,
		}
	}

	/// Number of keys in this node.
	#[inline]
	pub(crate) fn len(&self) -> usize {
		self.keys().len()
	}

	#[inline]
	pub(crate) fn parent(&self) -> Option<NodeId> {
		match self {
			Node::Internal(ref internal) => internal.parent,
			Node::Leaf(ref leaf) => leaf.parent,
		}
	}

	#[inline]
	pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
		match self {
			Node::Internal(ref mut internal) => internal.parent = parent,
			Node::Leaf(ref mut leaf) => leaf.parent = parent,
		}
	}
}

// ===========================================================================
// Leaf Node
// ===========================================================================

/// A leaf node in the B+ tree, storing actual key-value pairs.
///
/// Leaves are linked left to right through `next`, so a range scan only
/// descends once and then follows the chain.
pub(crate) struct LeafNode<V> {
	/// Sorted array of keys.
	pub(crate) keys: Vec<Key>,
	/// Values corresponding to keys (same index).
	pub(crate) values: Vec<V>,
	/// The next leaf in key order.
	pub(crate) next: Option<NodeId>,
	/// The internal node holding this leaf, `None` for a root leaf.
	pub(crate) parent: Option<NodeId>,
}

impl<V: fmt::Debug> fmt::Debug for LeafNode<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LeafNode")
			.field("keys", &self.keys)
			.field("values", &self.values)
			.field("next", &self.next)
			.field("parent", &self.parent)
			.finish()
	}
}

impl<V> LeafNode<V> {
	/// Creates a new, empty leaf node.
	pub(crate) fn new() -> LeafNode<V> {
		LeafNode {
			keys: Vec::new(),
			values: Vec::new(),
			next: None,
			parent: None,
		}
	}

	#[inline]
	pub(crate) fn len(&self) -> usize {
		self.keys.len()
	}

	/// Binary search for a key, returning position and whether it's an exact match.
	///
	/// `position` is where the key is, or where it would be inserted.
	#[inline]
	pub(crate) fn lower_bound(&self, key: &[u8]) -> (usize, bool) {
		match self.keys.binary_search_by(|probe| probe.as_bytes().cmp(key)) {
			Ok(pos) => (pos, true),
			Err(pos) => (pos, false),
		}
	}

	/// Returns the value stored under `key`.
	pub(crate) fn find_entry(&self, key: &[u8]) -> Option<&V> {
		match self.lower_bound(key) {
			(pos, true) => Some(&self.values[pos]),
			(_, false) => None,
		}
	}

	/// Returns references to the key and value at the given position.
	#[inline]
	pub(crate) fn kv_at(&self, pos: usize) -> Option<(&Key, &V)> {
		Some((self.keys.get(pos)?, self.values.get(pos)?))
	}

	/// Overwrites the value of an existing key in place.
	///
	/// Returns `Ok(previous)` if the key was present. Otherwise nothing is
	/// changed and the value is handed back as `Err(value)`.
	pub(crate) fn upsert(&mut self, key: &[u8], value: V) -> Result<V, V> {
		match self.lower_bound(key) {
			(pos, true) => Ok(std::mem::replace(&mut self.values[pos], value)),
			(_, false) => Err(value),
		}
	}

	/// Inserts a pair at the position that keeps keys sorted.
	///
	/// The key must not be present yet; use [`upsert`](Self::upsert) first.
	pub(crate) fn insert_ordered(&mut self, key: Key, value: V) {
		let (pos, exact) = self.lower_bound(key.as_bytes());
		assert!(!exact, "insert_ordered called with duplicate key {key:?}");
		self.insert_at(pos, key, value);
	}

	/// Inserts a key-value pair at the specified position.
	#[inline]
	pub(crate) fn insert_at(&mut self, pos: usize, key: Key, value: V) {
		self.keys.insert(pos, key);
		self.values.insert(pos, value);
	}

	/// Removes and returns the key-value pair at the specified position.
	#[inline]
	pub(crate) fn remove_at(&mut self, pos: usize) -> (Key, V) {
		let key = self.keys.remove(pos);
		let value = self.values.remove(pos);
		(key, value)
	}

	/// Removes `key` and returns its value.
	pub(crate) fn remove(&mut self, key: &[u8]) -> Option<V> {
		match self.lower_bound(key) {
			(pos, true) => Some(self.remove_at(pos).1),
			(_, false) => None,
		}
	}

	/// Splits this leaf, moving entries after `split_pos` to `right`.
	///
	/// After split:
	/// - `self` (left) contains entries `[0, split_pos]`
	/// - `right` contains entries `[split_pos + 1, len)`
	///
	/// Returns the first key of `right`, which becomes the separator in the
	/// parent. The leaf chain is left for the caller to splice.
	pub(crate) fn split(&mut self, right: &mut LeafNode<V>, split_pos: usize) -> Key {
		assert!(right.keys.is_empty());
		assert!(right.values.is_empty());
		right.keys.extend(self.keys.drain(split_pos + 1..));
		right.values.extend(self.values.drain(split_pos + 1..));

		right.keys.first().cloned().expect("split must leave the right leaf non-empty")
	}

	/// Merges the `right` leaf into `self` and takes over its chain link.
	pub(crate) fn merge(&mut self, right: LeafNode<V>) {
		self.keys.extend(right.keys);
		self.values.extend(right.values);
		self.next = right.next;
	}
}

// ===========================================================================
// Internal Node
// ===========================================================================

/// An internal (index) node in the B+ tree, storing keys and child edges.
///
/// # Structure
///
/// ```text
/// keys:       [K0,  K1,  K2,  ...  K(n-1)]
/// edges:      [E0,  E1,  E2,  ...  E(n-1)]  upper_edge
///               │    │    │         │            │
///               ▼    ▼    ▼         ▼            ▼
///            child0 child1 child2 child(n-1) child(n)
///
/// Navigation: keys[i-1] <= K < keys[i] follows edges[i]
///             (edges[0] for K < keys[0], upper_edge for K >= keys[n-1])
/// ```
///
/// A key equal to a separator routes to the child on its right.
///
/// # Invariants
///
/// - `keys.len() == edges.len()`
/// - `upper_edge` is always set outside of a merge in progress
/// - Keys are sorted in ascending order
pub(crate) struct InternalNode {
	/// Separator keys, sorted in ascending order.
	pub(crate) keys: Vec<Key>,
	/// `edges[i]` points to the subtree with keys < `keys[i]`.
	pub(crate) edges: Vec<NodeId>,
	/// Rightmost child (the overflow child), for keys >= the last separator.
	pub(crate) upper_edge: Option<NodeId>,
	/// The internal node holding this one, `None` for the root.
	pub(crate) parent: Option<NodeId>,
}

impl fmt::Debug for InternalNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InternalNode")
			.field("keys", &self.keys)
			.field("edges", &self.edges)
			.field("upper_edge", &self.upper_edge)
			.field("parent", &self.parent)
			.finish()
	}
}

impl InternalNode {
	/// Creates a new, empty internal node.
	pub(crate) fn new() -> InternalNode {
		InternalNode {
			keys: Vec::new(),
			edges: Vec::new(),
			upper_edge: None,
			parent: None,
		}
	}

	/// Creates a root holding a single separator between two children.
	pub(crate) fn with_children(left: NodeId, separator: Key, right: NodeId) -> InternalNode {
		InternalNode {
			keys: vec![separator],
			edges: vec![left],
			upper_edge: Some(right),
			parent: None,
		}
	}

	#[inline]
	pub(crate) fn len(&self) -> usize {
		self.keys.len()
	}

	/// Binary search over the separators.
	///
	/// Returns `(position, exact_match)` where `exact_match` is true if
	/// `key == keys[position]`.
	#[inline]
	pub(crate) fn lower_bound(&self, key: &[u8]) -> (usize, bool) {
		match self.keys.binary_search_by(|probe| probe.as_bytes().cmp(key)) {
			Ok(pos) => (pos, true),
			Err(pos) => (pos, false),
		}
	}

	/// Returns the child whose key range contains `key`.
	#[inline]
	pub(crate) fn child_for(&self, key: &[u8]) -> NodeId {
		let (pos, exact) = self.lower_bound(key);
		self.edge_at(if exact { pos + 1 } else { pos })
	}

	/// Returns the child at the given position.
	///
	/// - Positions `0..len` return `edges[pos]`
	/// - Position `len` returns `upper_edge`
	#[inline]
	pub(crate) fn edge_at(&self, pos: usize) -> NodeId {
		if pos == self.keys.len() {
			self.upper_edge.expect("internal node must have an upper_edge")
		} else {
			self.edges[pos]
		}
	}

	/// Position of `child` among the explicit edges, `None` if it is the
	/// upper edge (or not a child at all).
	#[inline]
	pub(crate) fn position(&self, child: NodeId) -> Option<usize> {
		self.edges.iter().position(|&edge| edge == child)
	}

	/// All children, left to right.
	pub(crate) fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.edges.iter().copied().chain(self.upper_edge)
	}

	/// Inserts a separator key and new right child after a child split.
	///
	/// The left child stays where it is and `right` is placed immediately
	/// after it:
	///
	/// ```text
	/// Before: keys=[A, B], edges=[e0, e1], upper=e2
	///         Splitting child e1 into (e1, new_right)
	///
	/// After:  keys=[A, split_key, B], edges=[e0, e1, new_right], upper=e2
	/// ```
	///
	/// When `left` is the upper edge it becomes a regular edge and `right`
	/// takes over as the upper edge.
	pub(crate) fn insert_after(&mut self, left: NodeId, key: Key, right: NodeId) {
		match self.position(left) {
			Some(pos) => {
				self.keys.insert(pos, key);
				self.edges.insert(pos + 1, right);
			}
			None => {
				assert_eq!(
					self.upper_edge,
					Some(left),
					"split child {left} is not a child of this node"
				);
				self.keys.push(key);
				self.edges.push(left);
				self.upper_edge = Some(right);
			}
		}
	}

	/// Removes the separator `key` together with the child on its right.
	///
	/// If that child is the upper edge, the child on the separator's left is
	/// promoted into the upper edge slot.
	pub(crate) fn remove(&mut self, key: &[u8], child: NodeId) -> Key {
		let pos = match self.lower_bound(key) {
			(pos, true) => pos,
			(_, false) => unreachable!("separator {:?} not found in parent", Key::new(key)),
		};

		if self.edges.get(pos + 1) == Some(&child) {
			self.edges.remove(pos + 1);
		} else if pos + 1 == self.keys.len() && self.upper_edge == Some(child) {
			self.upper_edge = self.edges.pop();
		} else {
			unreachable!("child {child} does not follow separator {:?}", Key::new(key));
		}

		self.keys.remove(pos)
	}

	/// Splits this internal node, moving entries after `split_pos` to `right`.
	///
	/// The separator at `split_pos` is pushed up to the parent rather than
	/// remaining in either child.
	///
	/// ```text
	/// Before split (self):
	///   keys:  [K0, K1, K2, K3, K4, K5]  (split_pos = 3)
	///   edges: [E0, E1, E2, E3, E4, E5]  upper_edge: E6
	///
	/// After split:
	///   self (left):
	///     keys:  [K0, K1, K2]
	///     edges: [E0, E1, E2]  upper_edge: E3
	///
	///   right:
	///     keys:  [K4, K5]
	///     edges: [E4, E5]  upper_edge: E6
	///
	///   returned separator: K3
	/// ```
	///
	/// Parent links of the moved children are the caller's responsibility.
	pub(crate) fn split(&mut self, right: &mut InternalNode, split_pos: usize) -> Key {
		assert!(right.keys.is_empty());
		assert!(right.edges.is_empty());
		right.keys.extend(self.keys.drain(split_pos + 1..));
		right.edges.extend(self.edges.drain(split_pos + 1..));

		// Right gets our upper_edge (it's now the rightmost in its range)
		right.upper_edge = self.upper_edge.take();

		// The edge at split_pos becomes our new upper_edge
		self.upper_edge =
			Some(self.edges.pop().expect("edges non-empty: split requires at least one edge"));
		self.keys.pop().expect("keys non-empty: split requires at least one key")
	}

	/// Merges the `right` internal node into `self`.
	///
	/// The separator that divided the two nodes in the parent comes back down
	/// between their contents:
	///
	/// ```text
	/// Before merge:
	///   self:  keys=[K0, K1], edges=[E0, E1], upper=E2
	///   right: keys=[K3, K4], edges=[E3, E4], upper=E5
	///   separator = K2
	///
	/// After merge (into self):
	///   keys:  [K0, K1, K2, K3, K4]
	///   edges: [E0, E1, E2, E3, E4]  upper=E5
	/// ```
	pub(crate) fn merge(&mut self, separator: Key, right: InternalNode) {
		let left_upper_edge =
			self.upper_edge.take().expect("merge requires left node to have upper_edge");

		self.keys.push(separator);
		self.edges.push(left_upper_edge);

		self.keys.extend(right.keys);
		self.edges.extend(right.edges);
		self.upper_edge = right.upper_edge;
	}
}
