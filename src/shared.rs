//! A tree shared between threads.
//!
//! [`Tree`] itself assumes a single writer. [`SharedTree`] wraps it in a
//! reader-writer lock so that any number of threads may read concurrently
//! while writers are serialized. Values handed out across the lock are
//! cloned, or inspected in place through a closure.

use crate::{Config, Result, Tree, TreeStats};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A [`Tree`] behind a `parking_lot` reader-writer lock.
///
/// ```
/// use cedartree::SharedTree;
/// use std::sync::Arc;
/// use std::thread;
///
/// let tree = Arc::new(SharedTree::new(4, 4).unwrap());
///
/// let handles: Vec<_> = (0..4)
/// 	.map(|t| {
/// 		let tree = Arc::clone(&tree);
/// 		thread::spawn(move || {
/// 			for i in 0..100 {
/// 				tree.insert(format!("{t}:{i:03}"), i);
/// 			}
/// 		})
/// 	})
/// 	.collect();
/// for handle in handles {
/// 	handle.join().unwrap();
/// }
///
/// assert_eq!(tree.len(), 400);
/// assert_eq!(tree.get("2:042"), Some(42));
/// ```
pub struct SharedTree<V> {
	inner: RwLock<Tree<V>>,
}

impl<V> Default for SharedTree<V> {
	fn default() -> Self {
		SharedTree::from(Tree::default())
	}
}

impl<V> From<Tree<V>> for SharedTree<V> {
	fn from(tree: Tree<V>) -> Self {
		SharedTree {
			inner: RwLock::new(tree),
		}
	}
}

impl<V> SharedTree<V> {
	/// Creates an empty shared tree with the given capacities.
	pub fn new(leaf_capacity: usize, internal_capacity: usize) -> Result<Self> {
		Tree::new(leaf_capacity, internal_capacity).map(SharedTree::from)
	}

	/// Creates an empty shared tree from a configuration.
	pub fn with_config(config: Config) -> Result<Self> {
		Tree::with_config(config).map(SharedTree::from)
	}

	/// Inserts under the write lock. See [`Tree::insert`].
	pub fn insert(&self, key: impl Into<crate::Key>, value: V) -> Option<V> {
		self.inner.write().insert(key, value)
	}

	/// Deletes under the write lock. See [`Tree::delete`].
	pub fn delete(&self, key: impl AsRef<[u8]>) -> Option<V> {
		self.inner.write().delete(key)
	}

	/// Returns a clone of the value stored under `key`.
	pub fn get(&self, key: impl AsRef<[u8]>) -> Option<V>
	where
		V: Clone,
	{
		self.inner.read().get(key)
	}

	/// Runs `f` on the value stored under `key` while holding the read lock.
	pub fn lookup<R, F>(&self, key: impl AsRef<[u8]>, f: F) -> Option<R>
	where
		F: FnOnce(&V) -> R,
	{
		self.inner.read().find(key).map(f)
	}

	/// Returns clones of the values of every key in `[start, end]`.
	pub fn find_range_cloned(&self, start: impl AsRef<[u8]>, end: impl AsRef<[u8]>) -> Vec<V>
	where
		V: Clone,
	{
		self.inner.read().find_range(start, end).into_iter().cloned().collect()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.inner.read().len()
	}

	/// Returns `true` if the tree holds no entries.
	pub fn is_empty(&self) -> bool {
		self.inner.read().is_empty()
	}

	/// Structure statistics read under the read lock.
	pub fn stats(&self) -> TreeStats {
		self.inner.read().stats()
	}

	/// Acquires the read lock for a sequence of reads over one snapshot.
	pub fn read(&self) -> RwLockReadGuard<'_, Tree<V>> {
		self.inner.read()
	}

	/// Acquires the write lock for a batch of mutations.
	pub fn write(&self) -> RwLockWriteGuard<'_, Tree<V>> {
		self.inner.write()
	}

	/// Consumes the wrapper and returns the tree.
	pub fn into_inner(self) -> Tree<V> {
		self.inner.into_inner()
	}
}
