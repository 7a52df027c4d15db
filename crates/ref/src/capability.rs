//! Capability descriptors.
//!
//! A capability is a named operation set, usually a trait used as `dyn Trait`. The
//! descriptor carries the operation table so proxy classes can be assembled
//! without reflection.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One operation of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
	/// Method name.
	pub name: &'static str,
	/// Rendered method signature.
	pub signature: &'static str,
}

impl Operation {
	/// Creates an operation entry.
	pub const fn new(name: &'static str, signature: &'static str) -> Self {
		Self { name, signature }
	}
}

/// Static description of a capability type.
///
/// Implemented for `dyn Trait`, either by `gyro_proxy::capability!` or by hand.
pub trait Capability: 'static {
	/// Simple name of the capability.
	const NAME: &'static str;
	/// Operations of the capability in declaration order.
	const OPERATIONS: &'static [Operation];
}

/// Runtime handle to a [`Capability`].
///
/// Identity is the [`TypeId`] of the capability; name and operations are
/// informational.
#[derive(Clone, Copy)]
pub struct CapabilityType {
	id: TypeId,
	name: &'static str,
	operations: &'static [Operation],
}

impl CapabilityType {
	/// Returns the handle for `C`.
	pub fn of<C: Capability + ?Sized>() -> Self {
		Self {
			id: TypeId::of::<C>(),
			name: C::NAME,
			operations: C::OPERATIONS,
		}
	}

	/// Identity of the capability.
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Simple name of the capability.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Operation table of the capability.
	pub fn operations(&self) -> &'static [Operation] {
		self.operations
	}

	/// Returns true if this is the handle for `C`.
	pub fn is<C: Capability + ?Sized>(&self) -> bool {
		self.id == TypeId::of::<C>()
	}
}

impl PartialEq for CapabilityType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for CapabilityType {}

impl Hash for CapabilityType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for CapabilityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for CapabilityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}
