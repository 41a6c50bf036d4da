//! # Cedartree: An In-Memory B+ Tree Index
//!
//! This crate provides an ordered key/value index over byte-string keys,
//! built as a B+ tree whose leaves are chained together for range scans.
//!
//! ## Design Overview
//!
//! ```text
//!                    ┌─────────────────┐
//!                    │  Internal Node  │  <- Separator keys and child edges
//!                    │   keys: [K]     │
//!                    │   edges: [id]   │
//!                    │   upper_edge    │  <- rightmost (overflow) child
//!                    └────────┬────────┘
//!                             │
//!              ┌──────────────┼──────────────┐
//!              ▼              ▼              ▼
//!        ┌──────────┐  ┌──────────┐  ┌──────────┐
//!        │   Leaf   │─▶│   Leaf   │─▶│   Leaf   │  <- Key-value pairs, chained
//!        │ keys:[K] │  │ keys:[K] │  │ keys:[K] │     through `next`
//!        │ vals:[V] │  │ vals:[V] │  │ vals:[V] │
//!        └──────────┘  └──────────┘  └──────────┘
//! ```
//!
//! **Arena ownership**: every node lives in a slot of an arena owned by the
//! tree. Child edges, parent back-references and the leaf chain are indices
//! into that arena, which keeps upward navigation O(1) without reference
//! cycles.
//!
//! **Routing**: in an internal node, `edges[i]` leads to keys below
//! `keys[i]`; a search key equal to a separator continues to the right of it.
//! The `upper_edge` covers everything at or above the last separator.
//!
//! **Fill factor**: a node splits on the insert that would take it past its
//! capacity, and rebalances when a delete leaves it below half of its
//! capacity, first by borrowing one entry from a sibling, otherwise by
//! merging with it.
//!
//! ## Basic Usage
//!
//! ```
//! use cedartree::Tree;
//!
//! let mut tree = Tree::new(4, 4).unwrap();
//!
//! tree.insert("key1", "value1");
//! tree.insert("key2", "value2");
//! tree.insert("key3", "value3");
//!
//! assert_eq!(tree.find("key1"), Some(&"value1"));
//! assert_eq!(tree.find_range("key2", "key3"), vec![&"value2", &"value3"]);
//!
//! assert_eq!(tree.delete("key1"), Some("value1"));
//! assert_eq!(tree.find("key1"), None);
//! ```
//!
//! ## Thread Safety
//!
//! A [`Tree`] is a single-writer structure: mutation takes `&mut self`, and
//! any number of readers may share `&Tree` when no writer exists. Wrap it in
//! a [`SharedTree`] to serialize writers across threads.

pub mod config;
pub mod error;
pub mod iter;
pub mod key;
pub(crate) mod node;
pub mod shared;
pub mod stats;

#[cfg(test)]
mod util;
#[cfg(any(test, feature = "test-utils"))]
mod validate;

pub use config::Config;
pub use error::{Error, Result};
pub use iter::Iter;
pub use key::Key;
pub use shared::SharedTree;
pub use stats::{TraversalCounter, TreeStats};

use node::{Arena, InternalNode, LeafNode, Node, NodeId};

use tracing::{debug, trace};

use std::collections::VecDeque;
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// A B+ tree mapping byte-string keys to values of type `V`.
///
/// # Internal Structure
///
/// The tree consists of:
/// - An **arena** holding every node, addressed by index.
/// - The **root** id. The root is never absent: an empty tree is a single
///   empty leaf. It is replaced whenever the tree grows or shrinks a level.
/// - The **configuration** with the two fanout parameters.
/// - An optional **traversal counter** for measuring read cost.
pub struct Tree<V> {
	arena: Arena<V>,
	root: NodeId,
	config: Config,
	counter: Option<Arc<TraversalCounter>>,
}

impl<V> Default for Tree<V> {
	/// Creates a tree with [`Config::default`] capacities.
	fn default() -> Self {
		Self::build(Config::default())
	}
}

/// The sibling chosen to rebalance an underfull node with.
#[derive(Debug, Clone)]
pub(crate) struct Sibling {
	/// The sibling node.
	pub(crate) id: NodeId,
	/// Index of the parent key separating the node and its sibling.
	pub(crate) separator_index: usize,
	/// The parent key separating the node and its sibling.
	pub(crate) separator_key: Key,
	/// Whether the sibling sits to the left of the node.
	pub(crate) is_predecessor: bool,
}

// ---------------------------------------------------------------------------
// Tree Implementation
// ---------------------------------------------------------------------------

impl<V> Tree<V> {
	// -----------------------------------------------------------------------
	// Construction
	// -----------------------------------------------------------------------

	/// Creates an empty tree with the given leaf and internal capacities.
	///
	/// # Errors
	///
	/// Returns an error if either capacity is below
	/// [`MIN_CAPACITY`](config::MIN_CAPACITY).
	///
	/// # Example
	///
	/// ```
	/// use cedartree::{Error, Tree};
	///
	/// let tree: Tree<i32> = Tree::new(3, 3).unwrap();
	/// assert!(tree.is_empty());
	/// assert_eq!(tree.height(), 1); // Single leaf node
	///
	/// assert!(matches!(Tree::<i32>::new(2, 3), Err(Error::LeafCapacity { .. })));
	/// ```
	pub fn new(leaf_capacity: usize, internal_capacity: usize) -> Result<Self> {
		Self::with_config(Config::new(leaf_capacity, internal_capacity))
	}

	/// Creates an empty tree from a configuration.
	pub fn with_config(config: Config) -> Result<Self> {
		config.validate()?;
		Ok(Self::build(config))
	}

	fn build(config: Config) -> Self {
		let mut arena = Arena::new();
		let root = arena.alloc(Node::Leaf(LeafNode::new()));
		debug!(
			leaf_capacity = config.leaf_capacity,
			internal_capacity = config.internal_capacity,
			"created tree"
		);
		Tree {
			arena,
			root,
			config,
			counter: None,
		}
	}

	/// The configuration this tree was built with.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Maximum number of entries per leaf.
	pub fn leaf_capacity(&self) -> usize {
		self.config.leaf_capacity
	}

	/// Maximum number of separator keys per internal node.
	pub fn internal_capacity(&self) -> usize {
		self.config.internal_capacity
	}

	// -----------------------------------------------------------------------
	// Instrumentation
	// -----------------------------------------------------------------------

	/// Attaches a counter that records the nodes loaded by each read.
	///
	/// Reads ([`find`](Self::find), [`find_range`](Self::find_range),
	/// [`range`](Self::range) and friends) reset the counter before they
	/// descend. Mutations do not touch it.
	pub fn attach_counter(&mut self, counter: Arc<TraversalCounter>) {
		self.counter = Some(counter);
	}

	/// Detaches and returns the traversal counter, if any.
	pub fn detach_counter(&mut self) -> Option<Arc<TraversalCounter>> {
		self.counter.take()
	}

	/// Nodes loaded by the most recent read, or 0 when no counter is attached.
	pub fn last_traversal_cost(&self) -> usize {
		self.counter.as_ref().map_or(0, |c| c.get())
	}

	#[inline]
	pub(crate) fn record_hop(&self) {
		if let Some(counter) = &self.counter {
			counter.record_hop();
		}
	}

	#[inline]
	fn reset_cost(&self) {
		if let Some(counter) = &self.counter {
			counter.reset();
		}
	}

	/// Computes structural statistics with a breadth-first walk.
	pub fn stats(&self) -> TreeStats {
		let mut stats = TreeStats::default();
		let mut queue = VecDeque::from([(self.root, 1)]);

		while let Some((id, depth)) = queue.pop_front() {
			stats.node_count += 1;
			stats.height = stats.height.max(depth);
			match self.arena.get(id) {
				Node::Leaf(leaf) => {
					stats.leaf_count += 1;
					stats.key_count += leaf.len();
				}
				Node::Internal(internal) => {
					queue.extend(internal.children().map(|child| (child, depth + 1)));
				}
			}
		}

		stats
	}

	/// Total number of nodes in the tree.
	pub fn node_count(&self) -> usize {
		self.stats().node_count
	}

	/// Number of key/value pairs, counted by walking every node.
	pub fn key_count(&self) -> usize {
		self.stats().key_count
	}

	/// Number of levels. A tree whose root is a leaf has height 1.
	pub fn height(&self) -> usize {
		self.stats().height
	}

	// -----------------------------------------------------------------------
	// Descent
	// -----------------------------------------------------------------------

	/// Descends from the root to the leaf whose range contains `key`,
	/// counting each internal hop on the attached counter.
	pub(crate) fn find_leaf(&self, key: &[u8]) -> NodeId {
		self.descend(key, true)
	}

	fn descend(&self, key: &[u8], counted: bool) -> NodeId {
		let mut current = self.root;
		loop {
			match self.arena.get(current) {
				Node::Internal(internal) => {
					if counted {
						self.record_hop();
					}
					current = internal.child_for(key);
				}
				Node::Leaf(_) => return current,
			}
		}
	}

	fn first_leaf(&self) -> NodeId {
		let mut current = self.root;
		while let Node::Internal(internal) = self.arena.get(current) {
			self.record_hop();
			current = internal.edge_at(0);
		}
		current
	}

	fn last_leaf(&self) -> NodeId {
		let mut current = self.root;
		while let Node::Internal(internal) = self.arena.get(current) {
			self.record_hop();
			current = internal.edge_at(internal.len());
		}
		current
	}

	// -----------------------------------------------------------------------
	// Public API: Read Operations
	// -----------------------------------------------------------------------

	/// Returns a reference to the value stored under `key`.
	///
	/// # Example
	///
	/// ```
	/// use cedartree::Tree;
	///
	/// let mut tree = Tree::new(3, 3).unwrap();
	/// tree.insert("g", 7);
	///
	/// assert_eq!(tree.find("g"), Some(&7));
	/// assert_eq!(tree.find("z"), None);
	/// ```
	pub fn find(&self, key: impl AsRef<[u8]>) -> Option<&V> {
		let key = key.as_ref();
		self.reset_cost();
		let leaf = self.find_leaf(key);
		self.record_hop();
		self.arena.get(leaf).as_leaf().find_entry(key)
	}

	/// Returns a clone of the value stored under `key`.
	pub fn get(&self, key: impl AsRef<[u8]>) -> Option<V>
	where
		V: Clone,
	{
		self.find(key).cloned()
	}

	/// Returns `true` if the tree contains `key`.
	pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
		self.find(key).is_some()
	}

	/// Returns the values of every key in `[start, end]`, in key order.
	///
	/// Returns an empty vector when `start > end`.
	///
	/// # Example
	///
	/// ```
	/// use cedartree::Tree;
	///
	/// let mut tree = Tree::new(3, 3).unwrap();
	/// for k in ["a", "b", "c", "d", "e"] {
	/// 	tree.insert(k, k.to_uppercase());
	/// }
	///
	/// assert_eq!(tree.find_range("b", "d"), vec!["B", "C", "D"]);
	/// assert!(tree.find_range("d", "b").is_empty());
	/// ```
	pub fn find_range(&self, start: impl AsRef<[u8]>, end: impl AsRef<[u8]>) -> Vec<&V> {
		let (start, end) = (start.as_ref(), end.as_ref());
		if start > end {
			self.reset_cost();
			return Vec::new();
		}
		self.range(start..=end).map(|(_, v)| v).collect()
	}

	/// Returns an iterator over the entries within `range`, in key order.
	///
	/// The scan descends once to the first leaf of the range and then follows
	/// the leaf chain, stopping at the first key past the end bound. An
	/// inverted range yields nothing.
	///
	/// # Example
	///
	/// ```
	/// use cedartree::Tree;
	///
	/// let mut tree = Tree::new(3, 3).unwrap();
	/// for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
	/// 	tree.insert(*k, i);
	/// }
	///
	/// let keys: Vec<String> = tree.range("b".."d").map(|(k, _)| k.to_string()).collect();
	/// assert_eq!(keys, ["b", "c"]);
	/// ```
	pub fn range<K, R>(&self, range: R) -> Iter<'_, V>
	where
		K: AsRef<[u8]> + ?Sized,
		R: RangeBounds<K>,
	{
		self.reset_cost();

		let upper = match range.end_bound() {
			Bound::Included(end) => Bound::Included(Key::new(end.as_ref())),
			Bound::Excluded(end) => Bound::Excluded(Key::new(end.as_ref())),
			Bound::Unbounded => Bound::Unbounded,
		};

		let (leaf, pos) = match range.start_bound() {
			Bound::Included(start) => {
				let start: &[u8] = start.as_ref();
				let leaf = self.find_leaf(start);
				(leaf, self.arena.get(leaf).as_leaf().lower_bound(start).0)
			}
			Bound::Excluded(start) => {
				let start: &[u8] = start.as_ref();
				let leaf = self.find_leaf(start);
				let (pos, exact) = self.arena.get(leaf).as_leaf().lower_bound(start);
				(leaf, if exact { pos + 1 } else { pos })
			}
			Bound::Unbounded => (self.first_leaf(), 0),
		};
		self.record_hop();

		Iter::new(self, leaf, pos, upper)
	}

	/// Returns an iterator over all entries in key order.
	pub fn iter(&self) -> Iter<'_, V> {
		self.range::<[u8], _>(..)
	}

	/// Returns the first (minimum) key-value pair in the tree.
	pub fn first_key_value(&self) -> Option<(&Key, &V)> {
		self.reset_cost();
		let leaf = self.first_leaf();
		self.record_hop();
		self.arena.get(leaf).as_leaf().kv_at(0)
	}

	/// Returns the last (maximum) key-value pair in the tree.
	pub fn last_key_value(&self) -> Option<(&Key, &V)> {
		self.reset_cost();
		let leaf = self.last_leaf();
		self.record_hop();
		let leaf = self.arena.get(leaf).as_leaf();
		leaf.len().checked_sub(1).and_then(|pos| leaf.kv_at(pos))
	}

	/// Returns the number of entries, following the leaf chain.
	pub fn len(&self) -> usize {
		let mut count = 0;
		let mut current = Some(self.descend_first_leaf());
		while let Some(id) = current {
			let leaf = self.arena.get(id).as_leaf();
			count += leaf.len();
			current = leaf.next;
		}
		count
	}

	/// Returns `true` if the tree holds no entries.
	pub fn is_empty(&self) -> bool {
		let root = self.arena.get(self.root);
		root.is_leaf() && root.len() == 0
	}

	fn descend_first_leaf(&self) -> NodeId {
		let mut current = self.root;
		while let Node::Internal(internal) = self.arena.get(current) {
			current = internal.edge_at(0);
		}
		current
	}

	// -----------------------------------------------------------------------
	// Public API: Write Operations
	// -----------------------------------------------------------------------

	/// Inserts a key-value pair into the tree.
	///
	/// If the key already exists, the value is replaced in place and the old
	/// value is returned; the structure of the tree does not change. If the
	/// key is new, `None` is returned.
	///
	/// # Algorithm
	///
	/// 1. Descend to the leaf whose range contains the key
	/// 2. If the key is present, overwrite its value
	/// 3. If the leaf has room, insert in order
	/// 4. Otherwise split the leaf and push the new separator upward,
	///    splitting internal nodes and growing a new root as needed
	///
	/// # Example
	///
	/// ```
	/// use cedartree::Tree;
	///
	/// let mut tree = Tree::new(3, 3).unwrap();
	///
	/// assert_eq!(tree.insert("k", "one"), None);        // New key
	/// assert_eq!(tree.insert("k", "uno"), Some("one")); // Update existing
	/// assert_eq!(tree.key_count(), 1);
	/// ```
	pub fn insert(&mut self, key: impl Into<Key>, value: V) -> Option<V> {
		let key = key.into();
		let leaf_id = self.descend(key.as_bytes(), false);
		let leaf_capacity = self.config.leaf_capacity;

		let leaf = self.arena.get_mut(leaf_id).as_leaf_mut();
		let value = match leaf.upsert(key.as_bytes(), value) {
			Ok(previous) => return Some(previous),
			Err(value) => value,
		};

		if leaf.len() < leaf_capacity {
			leaf.insert_ordered(key, value);
		} else {
			self.split_leaf(leaf_id, key, value);
		}
		None
	}

	/// Removes a key from the tree, returning its value if it existed.
	///
	/// # Algorithm
	///
	/// 1. Find the leaf containing the key
	/// 2. Remove the entry
	/// 3. Walk upward while nodes are underfull, borrowing from or merging
	///    with a sibling, and collapse the root if it is left without keys
	///
	/// # Example
	///
	/// ```
	/// use cedartree::Tree;
	///
	/// let mut tree = Tree::new(3, 3).unwrap();
	/// tree.insert("a", 1);
	///
	/// assert_eq!(tree.delete("a"), Some(1));
	/// assert_eq!(tree.delete("a"), None); // Already removed
	/// ```
	pub fn delete(&mut self, key: impl AsRef<[u8]>) -> Option<V> {
		let key = key.as_ref();
		let leaf_id = self.descend(key, false);
		let value = self.arena.get_mut(leaf_id).as_leaf_mut().remove(key)?;
		self.rebalance(leaf_id);
		Some(value)
	}

	/// Removes all entries, leaving a single empty leaf as the root.
	pub fn clear(&mut self) {
		self.arena.clear();
		self.root = self.arena.alloc(Node::Leaf(LeafNode::new()));
		debug!("cleared tree");
	}

	// -----------------------------------------------------------------------
	// Insertion: Splits
	// -----------------------------------------------------------------------

	/// Splits a full leaf while inserting `key`.
	///
	/// The `leaf_capacity + 1` pairs are partitioned after index
	/// `leaf_capacity / 2`; the upper part moves to a new leaf spliced into
	/// the chain right after the original.
	fn split_leaf(&mut self, leaf_id: NodeId, key: Key, value: V) {
		let split_pos = self.config.leaf_capacity / 2;

		let leaf = self.arena.get_mut(leaf_id).as_leaf_mut();
		leaf.insert_ordered(key, value);

		let mut right = LeafNode::new();
		let separator = leaf.split(&mut right, split_pos);
		right.next = leaf.next;
		right.parent = leaf.parent;

		let right_id = self.arena.alloc(Node::Leaf(right));
		self.arena.get_mut(leaf_id).as_leaf_mut().next = Some(right_id);

		trace!(left = %leaf_id, right = %right_id, separator = %separator, "split leaf");
		self.insert_into_parent(leaf_id, separator, right_id);
	}

	/// Links a freshly split `right` node into the parent of `left`.
	///
	/// # Cases
	///
	/// - `left` was the root: a new internal root with a single separator
	///   is installed above both halves
	/// - the parent has room: the separator and `right` go immediately after
	///   `left`
	/// - the parent is full: it splits as well, its median key moves up (not
	///   copied) and the process repeats one level higher
	fn insert_into_parent(&mut self, left: NodeId, separator: Key, right: NodeId) {
		let Some(parent_id) = self.arena.get(left).parent() else {
			let root_id = self.arena.alloc(Node::Internal(InternalNode::with_children(
				left, separator, right,
			)));
			self.arena.get_mut(left).set_parent(Some(root_id));
			self.arena.get_mut(right).set_parent(Some(root_id));
			self.root = root_id;
			debug!(root = %root_id, "grew new root");
			return;
		};

		self.arena.get_mut(right).set_parent(Some(parent_id));

		let internal_capacity = self.config.internal_capacity;
		let parent = self.arena.get_mut(parent_id).as_internal_mut();
		parent.insert_after(left, separator, right);
		if parent.len() <= internal_capacity {
			return;
		}

		// The parent now holds capacity + 1 keys and capacity + 2 children.
		let mut sibling = InternalNode::new();
		let median = parent.split(&mut sibling, internal_capacity / 2);
		sibling.parent = parent.parent;

		let moved: Vec<NodeId> = sibling.children().collect();
		let sibling_id = self.arena.alloc(Node::Internal(sibling));
		for child in moved {
			self.arena.get_mut(child).set_parent(Some(sibling_id));
		}

		trace!(left = %parent_id, right = %sibling_id, separator = %median, "split internal node");
		self.insert_into_parent(parent_id, median, sibling_id);
	}

	// -----------------------------------------------------------------------
	// Deletion: Rebalancing
	// -----------------------------------------------------------------------

	/// Minimum number of keys a non-root node of this kind must keep.
	fn min_keys(&self, node: &Node<V>) -> usize {
		match node {
			Node::Leaf(_) => self.config.leaf_min(),
			Node::Internal(_) => self.config.internal_min(),
		}
	}

	fn capacity_of(&self, node: &Node<V>) -> usize {
		match node {
			Node::Leaf(_) => self.config.leaf_capacity,
			Node::Internal(_) => self.config.internal_capacity,
		}
	}

	/// Restores the fill factor after an entry was removed from `node_id`.
	///
	/// Each iteration either stops (node is the root or still half full),
	/// redistributes one entry with a sibling and stops, or merges with a
	/// sibling and continues at the parent, which just lost a separator.
	fn rebalance(&mut self, mut node_id: NodeId) {
		loop {
			if node_id == self.root {
				self.shrink_root();
				return;
			}

			let node = self.arena.get(node_id);
			if node.len() >= self.min_keys(node) {
				return;
			}

			let capacity = self.capacity_of(node);
			let sibling = self.lookup_sibling(node_id);
			let combined = self.arena.get(sibling.id).len() + node.len();

			if combined < capacity {
				node_id = self.coalesce(node_id, sibling);
			} else {
				self.redistribute(node_id, sibling);
				return;
			}
		}
	}

	/// Replaces a root that has become redundant.
	///
	/// - an internal root without keys hands over to its only child
	/// - an empty leaf root is replaced by a fresh empty leaf
	fn shrink_root(&mut self) {
		match self.arena.get(self.root) {
			Node::Internal(internal) if internal.len() == 0 => {
				let child = internal.edge_at(0);
				self.arena.free(self.root);
				self.arena.get_mut(child).set_parent(None);
				self.root = child;
				debug!(root = %child, "collapsed root");
			}
			Node::Leaf(leaf) if leaf.len() == 0 => {
				self.clear();
			}
			_ => {}
		}
	}

	/// Picks the sibling to rebalance `node_id` with.
	///
	/// # Preference
	///
	/// - `node` is the upper edge: the last explicit child (predecessor)
	/// - `node` is the last explicit child: the upper edge (successor)
	/// - `node` is the first child: the second child (successor)
	/// - otherwise: the previous child (predecessor)
	///
	/// # Panics
	///
	/// Panics if `node_id` is the root or is missing from its parent.
	pub(crate) fn lookup_sibling(&self, node_id: NodeId) -> Sibling {
		let parent_id = self.arena.get(node_id).parent().expect("non-root node must have a parent");
		let parent = self.arena.get(parent_id).as_internal();
		let last = parent
			.len()
			.checked_sub(1)
			.expect("parent of an underfull node must hold at least one separator");

		let (id, separator_index, is_predecessor) = match parent.position(node_id) {
			None => {
				assert_eq!(
					parent.upper_edge,
					Some(node_id),
					"node {node_id} missing from its parent {parent_id}"
				);
				(parent.edges[last], last, true)
			}
			Some(pos) if pos == last => (parent.edge_at(last + 1), last, false),
			Some(0) => (parent.edges[1], 0, false),
			Some(pos) => (parent.edges[pos - 1], pos - 1, true),
		};

		Sibling {
			id,
			separator_index,
			separator_key: parent.keys[separator_index].clone(),
			is_predecessor,
		}
	}

	/// Merges `node_id` and its sibling into whichever of the two is on the
	/// left, frees the right one and removes their separator from the parent.
	///
	/// Returns the parent, which may now be underfull itself.
	fn coalesce(&mut self, node_id: NodeId, sibling: Sibling) -> NodeId {
		let (left, right) = if sibling.is_predecessor {
			(sibling.id, node_id)
		} else {
			(node_id, sibling.id)
		};
		let parent_id = self.arena.get(node_id).parent().expect("non-root node must have a parent");

		match self.arena.free(right) {
			Node::Leaf(right_leaf) => {
				self.arena.get_mut(left).as_leaf_mut().merge(right_leaf);
			}
			Node::Internal(right_internal) => {
				let moved: Vec<NodeId> = right_internal.children().collect();
				self.arena
					.get_mut(left)
					.as_internal_mut()
					.merge(sibling.separator_key.clone(), right_internal);
				for child in moved {
					self.arena.get_mut(child).set_parent(Some(left));
				}
			}
		}

		self.arena
			.get_mut(parent_id)
			.as_internal_mut()
			.remove(sibling.separator_key.as_bytes(), right);

		trace!(left = %left, right = %right, separator = %sibling.separator_key, "coalesced nodes");
		parent_id
	}

	/// Moves one entry from the sibling into `node_id` and updates the parent
	/// separator between them. Both nodes end up within bounds, so nothing
	/// propagates further.
	fn redistribute(&mut self, node_id: NodeId, sibling: Sibling) {
		let parent_id = self.arena.get(node_id).parent().expect("non-root node must have a parent");
		let Sibling {
			id: sibling_id,
			separator_index,
			separator_key,
			is_predecessor,
		} = sibling;

		let mut donor = self.arena.take(sibling_id);
		let mut moved_child = None;

		let new_separator = match (self.arena.get_mut(node_id), &mut donor) {
			(Node::Leaf(node), Node::Leaf(donor)) => {
				if is_predecessor {
					// Sibling's last pair becomes our first.
					let last = donor.len() - 1;
					let (key, value) = donor.remove_at(last);
					let separator = key.clone();
					node.insert_at(0, key, value);
					separator
				} else {
					// Sibling's first pair becomes our last.
					let (key, value) = donor.remove_at(0);
					let end = node.len();
					node.insert_at(end, key, value);
					donor.keys.first().cloned().expect("donor leaf cannot be emptied")
				}
			}
			(Node::Internal(node), Node::Internal(donor)) => {
				if is_predecessor {
					// The separator comes down in front of our keys, and the
					// sibling's upper edge becomes our first child.
					let child = donor.upper_edge.take().expect("donor must have an upper_edge");
					donor.upper_edge = donor.edges.pop();
					node.keys.insert(0, separator_key);
					node.edges.insert(0, child);
					moved_child = Some(child);
					donor.keys.pop().expect("donor must hold a key to lend")
				} else {
					// The separator comes down behind our keys, our upper edge
					// becomes a regular edge and the sibling's first child
					// becomes our upper edge.
					let child = donor.edges.remove(0);
					let upper =
						node.upper_edge.replace(child).expect("node must have an upper_edge");
					node.keys.push(separator_key);
					node.edges.push(upper);
					moved_child = Some(child);
					donor.keys.remove(0)
				}
			}
			_ => unreachable!("siblings {node_id} and {sibling_id} are at different levels"),
		};

		self.arena.restore(sibling_id, donor);
		if let Some(child) = moved_child {
			self.arena.get_mut(child).set_parent(Some(node_id));
		}

		trace!(
			node = %node_id,
			sibling = %sibling_id,
			separator = %new_separator,
			from_predecessor = is_predecessor,
			"redistributed entry"
		);
		self.arena.get_mut(parent_id).as_internal_mut().keys[separator_index] = new_separator;
	}
}
