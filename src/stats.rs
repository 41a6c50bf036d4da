//! Instrumentation.
//!
//! Two kinds of numbers are exposed:
//!
//! - a [`TraversalCounter`] that a caller attaches to a tree to measure how
//!   many nodes each read touches (an I/O-equivalent cost), and
//! - [`TreeStats`], a structural snapshot computed on demand by walking the
//!   whole tree breadth first.
//!
//! The core never depends on either being present.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts nodes loaded by reads.
///
/// The counter is shared through an `Arc`, so it can be inspected while the
/// tree is borrowed elsewhere:
///
/// ```
/// use cedartree::{TraversalCounter, Tree};
/// use std::sync::Arc;
///
/// let mut tree: Tree<u32> = Tree::new(3, 3).unwrap();
/// let counter = Arc::new(TraversalCounter::new());
/// tree.attach_counter(Arc::clone(&counter));
///
/// for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
/// 	tree.insert(*k, i as u32);
/// }
/// tree.find("c");
/// // one internal hop plus the leaf itself
/// assert_eq!(counter.get(), 2);
/// assert_eq!(tree.last_traversal_cost(), 2);
/// ```
#[derive(Debug, Default)]
pub struct TraversalCounter {
	hops: AtomicUsize,
}

impl TraversalCounter {
	/// Creates a counter at zero.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one node load.
	#[inline]
	pub fn record_hop(&self) {
		self.hops.fetch_add(1, Ordering::Relaxed);
	}

	/// Clears the count. Reads call this before they descend.
	#[inline]
	pub fn reset(&self) {
		self.hops.store(0, Ordering::Relaxed);
	}

	/// Nodes loaded since the last reset.
	#[inline]
	pub fn get(&self) -> usize {
		self.hops.load(Ordering::Relaxed)
	}
}

/// Structural statistics of a tree at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
	/// Total number of nodes, leaves and internal nodes alike.
	pub node_count: usize,
	/// Number of leaf nodes.
	pub leaf_count: usize,
	/// Number of key/value pairs stored in the leaves.
	pub key_count: usize,
	/// Number of levels; a tree whose root is a leaf has height 1.
	pub height: usize,
}
