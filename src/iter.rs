//! Ordered iteration over the leaf chain of a [`Tree`]
use crate::node::NodeId;
use crate::{Key, Tree};

use std::iter::FusedIterator;
use std::ops::Bound;

#[derive(Debug, PartialEq, Copy, Clone)]
enum LeafResult {
	Ok,
	End,
}

/// Iterator over the entries of a tree in ascending key order.
///
/// Created by [`Tree::range`] and [`Tree::iter`]. The iterator starts at a
/// leaf position found by a single descent and then walks the leaf chain
/// through `next` links, never going back up the tree. Each further leaf it
/// moves to is recorded on the tree's traversal counter.
pub struct Iter<'t, V> {
	tree: &'t Tree<V>,
	leaf: Option<NodeId>,
	pos: usize,
	upper: Bound<Key>,
}

impl<'t, V> Iter<'t, V> {
	pub(crate) fn new(tree: &'t Tree<V>, leaf: NodeId, pos: usize, upper: Bound<Key>) -> Self {
		Iter {
			tree,
			leaf: Some(leaf),
			pos,
			upper,
		}
	}

	#[inline]
	fn within_upper(&self, key: &Key) -> bool {
		match &self.upper {
			Bound::Included(end) => key <= end,
			Bound::Excluded(end) => key < end,
			Bound::Unbounded => true,
		}
	}

	fn next_leaf(&mut self) -> LeafResult {
		let Some(current) = self.leaf else {
			return LeafResult::End;
		};

		self.leaf = self.tree.arena.get(current).as_leaf().next;
		self.pos = 0;

		match self.leaf {
			Some(_) => {
				self.tree.record_hop();
				LeafResult::Ok
			}
			None => LeafResult::End,
		}
	}
}

impl<'t, V> Iterator for Iter<'t, V> {
	type Item = (&'t Key, &'t V);

	fn next(&mut self) -> Option<Self::Item> {
		let tree = self.tree;
		loop {
			let leaf = tree.arena.get(self.leaf?).as_leaf();

			if let Some((key, value)) = leaf.kv_at(self.pos) {
				if !self.within_upper(key) {
					self.leaf = None;
					return None;
				}
				self.pos += 1;
				return Some((key, value));
			}

			if self.next_leaf() == LeafResult::End {
				return None;
			}
		}
	}
}

impl<V> FusedIterator for Iter<'_, V> {}
