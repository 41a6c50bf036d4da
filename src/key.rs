//! Byte-string keys.
//!
//! Keys are compared lexicographically byte by byte, which for UTF-8 text is
//! the same order as comparing the strings. Keys up to 16 bytes are stored
//! inline without a heap allocation.

use smallvec::SmallVec;

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

/// Number of key bytes stored inline before spilling to the heap.
const INLINE_KEY_BYTES: usize = 16;

/// An immutable, totally ordered byte string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Key(SmallVec<[u8; INLINE_KEY_BYTES]>);

impl Key {
	/// Creates a key by copying the given bytes.
	pub fn new(bytes: &[u8]) -> Self {
		Key(SmallVec::from_slice(bytes))
	}

	/// Returns the raw bytes of this key.
	#[inline]
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Three-way lexicographic comparison.
	#[inline]
	pub fn compare(&self, other: &Key) -> Ordering {
		self.as_bytes().cmp(other.as_bytes())
	}

	/// Number of bytes in the key.
	#[inline]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` for the zero-length key.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl AsRef<[u8]> for Key {
	#[inline]
	fn as_ref(&self) -> &[u8] {
		self.as_bytes()
	}
}

impl Borrow<[u8]> for Key {
	#[inline]
	fn borrow(&self) -> &[u8] {
		self.as_bytes()
	}
}

impl From<&[u8]> for Key {
	fn from(bytes: &[u8]) -> Self {
		Key::new(bytes)
	}
}

impl<const N: usize> From<&[u8; N]> for Key {
	fn from(bytes: &[u8; N]) -> Self {
		Key::new(bytes)
	}
}

impl From<Vec<u8>> for Key {
	fn from(bytes: Vec<u8>) -> Self {
		Key(SmallVec::from_vec(bytes))
	}
}

impl From<&str> for Key {
	fn from(s: &str) -> Self {
		Key::new(s.as_bytes())
	}
}

impl From<String> for Key {
	fn from(s: String) -> Self {
		Key::from(s.into_bytes())
	}
}

impl From<&Key> for Key {
	fn from(key: &Key) -> Self {
		key.clone()
	}
}

impl PartialEq<[u8]> for Key {
	fn eq(&self, other: &[u8]) -> bool {
		self.as_bytes() == other
	}
}

impl PartialEq<&str> for Key {
	fn eq(&self, other: &&str) -> bool {
		self.as_bytes() == other.as_bytes()
	}
}

impl fmt::Debug for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "\"{}\"", self.0.escape_ascii())
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.escape_ascii())
	}
}
