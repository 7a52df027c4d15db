//! Cache key for proxy classes.

use std::any::TypeId;
use std::fmt;

use gyro_ref::CapabilityType;

/// Ordered, duplicate-free list of capability types.
///
/// Order is significant: `[A, B]` and `[B, A]` are different keys and map to
/// different proxy classes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProxyKey {
	types: Box<[CapabilityType]>,
}

impl ProxyKey {
	/// Builds a key, dropping repeated types and keeping the first occurrence.
	pub fn new(types: impl IntoIterator<Item = CapabilityType>) -> Self {
		let mut unique: Vec<CapabilityType> = Vec::new();
		for ty in types {
			if !unique.contains(&ty) {
				unique.push(ty);
			}
		}
		Self {
			types: unique.into_boxed_slice(),
		}
	}

	/// Capability types in key order.
	pub fn types(&self) -> &[CapabilityType] {
		&self.types
	}

	/// Returns true if the key lists the capability with the given id.
	pub fn contains(&self, id: TypeId) -> bool {
		self.types.iter().any(|ty| ty.id() == id)
	}

	/// Number of capability types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Returns true for the empty key.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Simple names concatenated in key order.
	pub(crate) fn simple_names(&self) -> String {
		self.types.iter().map(|ty| ty.name()).collect()
	}
}

impl fmt::Debug for ProxyKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.types.iter()).finish()
	}
}
