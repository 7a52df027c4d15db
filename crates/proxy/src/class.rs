//! Synthesized proxy classes.

use std::fmt;

use gyro_ref::{Capability, CapabilityType, Operation};

use crate::ProxyKey;

/// Forwarding layout shared by every proxy over one [`ProxyKey`].
///
/// Built once per key by [`crate::ProxyClassCache`] and never mutated afterwards.
pub struct ProxyClass {
	name: String,
	key: ProxyKey,
	operations: Box<[Operation]>,
}

impl ProxyClass {
	/// Assembles the class for `key`, numbered `serial`.
	///
	/// The operation table is the union of the capability tables in key order; an
	/// operation already present with the same name and signature is not repeated.
	pub(crate) fn synthesize(prefix: &str, serial: u64, key: ProxyKey) -> Self {
		let mut operations: Vec<Operation> = Vec::new();
		for op in key.types().iter().flat_map(|ty| ty.operations()) {
			if !operations.contains(op) {
				operations.push(*op);
			}
		}

		Self {
			name: format!("{prefix}{serial}.{}", key.simple_names()),
			key,
			operations: operations.into_boxed_slice(),
		}
	}

	/// Unique class name, `{prefix}{serial}.{SimpleNames}`.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Key the class was synthesized for.
	pub fn key(&self) -> &ProxyKey {
		&self.key
	}

	/// Implemented capability types in key order.
	pub fn types(&self) -> &[CapabilityType] {
		self.key.types()
	}

	/// Forwarded operations.
	pub fn operations(&self) -> &[Operation] {
		&self.operations
	}

	/// Returns true if proxies of this class forward `C`.
	pub fn implements<C: Capability + ?Sized>(&self) -> bool {
		self.key.contains(CapabilityType::of::<C>().id())
	}
}

impl fmt::Debug for ProxyClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProxyClass")
			.field("name", &self.name)
			.field("types", &self.key)
			.field("operations", &self.operations.len())
			.finish()
	}
}

impl fmt::Display for ProxyClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}
