//! # Error Types for the B+ Tree
//!
//! The tree distinguishes three kinds of failure:
//!
//! - **Configuration errors** are recoverable and reported through [`Error`]
//!   when a tree is constructed or a [`Config`](crate::Config) is validated.
//! - **Absence** of a key is not an error at all: lookups and deletes return
//!   `None`.
//! - **Invariant violations** (a leaf where an internal node was expected, a
//!   child missing from its parent, ...) mean the tree is corrupted. These
//!   panic immediately instead of being threaded through `Result`, because no
//!   caller can do anything useful with a half-updated tree.

use thiserror::Error;

/// Errors returned when configuring a tree.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The leaf fanout is too small to split into two non-empty halves.
	#[error("leaf capacity must be at least {min}, got {got}")]
	LeafCapacity {
		/// The rejected capacity.
		got: usize,
		/// The smallest accepted capacity.
		min: usize,
	},

	/// The internal fanout is too small to promote a median key.
	#[error("internal capacity must be at least {min}, got {got}")]
	InternalCapacity {
		/// The rejected capacity.
		got: usize,
		/// The smallest accepted capacity.
		min: usize,
	},
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
