//! Tree configuration.
//!
//! A tree is shaped by two fanout parameters: how many entries a leaf may
//! hold, and how many separator keys an internal node may hold. Both are
//! validated once, when the tree is built.

use crate::error::{Error, Result};

/// Smallest accepted capacity for either node kind.
pub const MIN_CAPACITY: usize = 3;

/// Default capacity for leaf nodes.
pub const DEFAULT_LEAF_CAPACITY: usize = 200;

/// Default capacity for internal (index) nodes.
pub const DEFAULT_INTERNAL_CAPACITY: usize = 100;

/// Fanout parameters for a [`Tree`](crate::Tree).
///
/// ```
/// use cedartree::{Config, Tree};
///
/// let config = Config::default().with_leaf_capacity(16).with_internal_capacity(8);
/// let tree: Tree<u64> = Tree::with_config(config).unwrap();
/// assert_eq!(tree.leaf_capacity(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
	/// Maximum number of key/value pairs in a leaf.
	pub leaf_capacity: usize,
	/// Maximum number of separator keys in an internal node.
	pub internal_capacity: usize,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			leaf_capacity: DEFAULT_LEAF_CAPACITY,
			internal_capacity: DEFAULT_INTERNAL_CAPACITY,
		}
	}
}

impl Config {
	/// Creates a configuration with explicit capacities. Nothing is checked
	/// until [`validate`](Self::validate) runs.
	pub fn new(leaf_capacity: usize, internal_capacity: usize) -> Self {
		Config {
			leaf_capacity,
			internal_capacity,
		}
	}

	/// Sets the leaf capacity.
	pub fn with_leaf_capacity(mut self, capacity: usize) -> Self {
		self.leaf_capacity = capacity;
		self
	}

	/// Sets the internal node capacity.
	pub fn with_internal_capacity(mut self, capacity: usize) -> Self {
		self.internal_capacity = capacity;
		self
	}

	/// Checks that both capacities are at least [`MIN_CAPACITY`].
	pub fn validate(&self) -> Result<()> {
		if self.leaf_capacity < MIN_CAPACITY {
			return Err(Error::LeafCapacity {
				got: self.leaf_capacity,
				min: MIN_CAPACITY,
			});
		}
		if self.internal_capacity < MIN_CAPACITY {
			return Err(Error::InternalCapacity {
				got: self.internal_capacity,
				min: MIN_CAPACITY,
			});
		}
		Ok(())
	}

	/// Minimum occupancy of a non-root leaf.
	#[inline]
	pub(crate) fn leaf_min(&self) -> usize {
		self.leaf_capacity / 2
	}

	/// Minimum occupancy of a non-root internal node.
	#[inline]
	pub(crate) fn internal_min(&self) -> usize {
		self.internal_capacity / 2
	}
}
