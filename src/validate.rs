//! Structural validation for tests.

use crate::node::{Node, NodeId};
use crate::{Key, Tree};

/// Invariant validation for testing. Validates tree structure so that broken
/// splits, merges and redistributions are caught at the operation that
/// caused them.
impl<V> Tree<V> {
	/// Validates all tree invariants. Panics with diagnostic info if any
	/// invariant is violated.
	///
	/// # Invariants Checked
	///
	/// 1. Height consistency: all leaves at the same depth
	/// 2. Key ordering: keys strictly increasing within each node
	/// 3. Routing bounds: every key in the subtree at `edges[i]` lies in
	///    `[keys[i - 1], keys[i])`
	/// 4. Occupancy: every non-root node is at least half full and no node
	///    exceeds its capacity; an internal root holds at least one key
	/// 5. Shape: `edges.len() == keys.len()` and `upper_edge` is set
	/// 6. Parent links: every child points back at the node holding it
	/// 7. Leaf chain: following `next` visits exactly the leaves in order
	/// 8. Arena: no node is live without being reachable from the root
	pub fn assert_invariants(&self) {
		let root = self.arena.get(self.root);
		assert_eq!(root.parent(), None, "root {} has a parent", self.root);
		if let Node::Internal(internal) = root {
			assert!(!internal.keys.is_empty(), "internal root {} holds no keys", self.root);
		}

		let height = self.height();
		let mut leaves = Vec::new();
		let reachable = self.validate_node(self.root, 1, height, None, None, &mut leaves);

		// Invariant 7: Leaf chain
		let mut chained = Vec::new();
		let mut current = leaves.first().copied();
		while let Some(id) = current {
			assert!(chained.len() < leaves.len(), "leaf chain is longer than the tree has leaves");
			chained.push(id);
			current = self.arena.get(id).as_leaf().next;
		}
		assert_eq!(chained, leaves, "leaf chain does not match in-order leaves");

		let mut previous: Option<&Key> = None;
		for &id in &chained {
			for key in &self.arena.get(id).as_leaf().keys {
				if let Some(previous) = previous {
					assert!(previous < key, "leaf chain not increasing: {previous:?} >= {key:?}");
				}
				previous = Some(key);
			}
		}

		// Invariant 8: Arena
		assert_eq!(self.arena.live(), reachable, "arena holds unreachable nodes");
	}

	/// Recursively validates a node and its subtree, returning the number of
	/// nodes visited.
	///
	/// # Arguments
	/// * `id` - The node to validate
	/// * `level` - Current level (1 = root)
	/// * `height` - Total tree height
	/// * `lower` - Inclusive lower bound from the parent, None if leftmost
	/// * `upper` - Exclusive upper bound from the parent, None if rightmost
	fn validate_node(
		&self,
		id: NodeId,
		level: usize,
		height: usize,
		lower: Option<&Key>,
		upper: Option<&Key>,
		leaves: &mut Vec<NodeId>,
	) -> usize {
		let node = self.arena.get(id);
		let keys = node.keys();
		let is_root = id == self.root;

		// Invariant 2: Key ordering
		for pair in keys.windows(2) {
			assert!(
				pair[0] < pair[1],
				"keys not sorted in node {id}: {:?} >= {:?}",
				pair[0],
				pair[1]
			);
		}

		// Invariant 3: Routing bounds
		if let Some(lower) = lower {
			for key in keys {
				assert!(key >= lower, "key {key:?} in node {id} below lower bound {lower:?}");
			}
		}
		if let Some(upper) = upper {
			for key in keys {
				assert!(key < upper, "key {key:?} in node {id} not below upper bound {upper:?}");
			}
		}

		match node {
			Node::Leaf(leaf) => {
				// Invariant 1: Height consistency
				assert_eq!(level, height, "leaf {id} at level {level}, tree height is {height}");
				assert_eq!(
					leaf.keys.len(),
					leaf.values.len(),
					"leaf {id} keys.len() {} != values.len() {}",
					leaf.keys.len(),
					leaf.values.len()
				);

				// Invariant 4: Occupancy
				assert!(leaf.len() <= self.config.leaf_capacity, "leaf {id} over capacity");
				if !is_root {
					assert!(
						leaf.len() >= self.config.leaf_min(),
						"leaf {id} underfull: {} < {}",
						leaf.len(),
						self.config.leaf_min()
					);
				}

				leaves.push(id);
				1
			}
			Node::Internal(internal) => {
				assert!(level < height, "internal node {id} at leaf level {level}");

				// Invariant 5: Shape
				assert_eq!(
					internal.keys.len(),
					internal.edges.len(),
					"internal {id} keys.len() {} != edges.len() {}",
					internal.keys.len(),
					internal.edges.len()
				);
				assert!(internal.upper_edge.is_some(), "internal {id} has no upper_edge");

				// Invariant 4: Occupancy
				assert!(
					internal.len() <= self.config.internal_capacity,
					"internal {id} over capacity"
				);
				if !is_root {
					assert!(
						internal.len() >= self.config.internal_min(),
						"internal {id} underfull: {} < {}",
						internal.len(),
						self.config.internal_min()
					);
				}

				let mut visited = 1;
				for (i, child) in internal.children().enumerate() {
					// Invariant 6: Parent links
					assert_eq!(
						self.arena.get(child).parent(),
						Some(id),
						"child {child} of {id} points at the wrong parent"
					);

					let child_lower = if i == 0 { lower } else { Some(&internal.keys[i - 1]) };
					let child_upper = internal.keys.get(i).or(upper);
					visited +=
						self.validate_node(child, level + 1, height, child_lower, child_upper, leaves);
				}
				visited
			}
		}
	}
}
