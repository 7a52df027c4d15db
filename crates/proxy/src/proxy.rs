//! Proxy instances.

use std::fmt;
use std::sync::Arc;

use gyro_ref::{Capability, Ref};

use crate::{ProxyClass, ProxyError};

/// A value implementing the capabilities of its [`ProxyClass`] by forwarding every
/// call to whatever delegate its controller currently holds.
///
/// Proxies carry no state of their own; any number of them may share one
/// controller. Cloning is cheap.
pub struct Proxy<D: 'static> {
	class: Arc<ProxyClass>,
	reference: Arc<Ref<D>>,
}

impl<D: Send + Sync + 'static> Proxy<D> {
	pub(crate) fn new(class: Arc<ProxyClass>, reference: Arc<Ref<D>>) -> Self {
		Self { class, reference }
	}

	/// Class of this proxy.
	pub fn class(&self) -> &Arc<ProxyClass> {
		&self.class
	}

	/// Controller the proxy forwards through.
	pub fn reference(&self) -> &Arc<Ref<D>> {
		&self.reference
	}

	/// Returns true if the proxy forwards `C`.
	pub fn implements<C: Capability + ?Sized>(&self) -> bool {
		self.class.implements::<C>()
	}

	/// Runs `call` against the current delegate on behalf of capability `C`.
	///
	/// The controller's shared lock is held for the whole call, so the delegate cannot
	/// be unbound or replaced underneath it. `call` may read the controller but must
	/// not drive transitions on it.
	///
	/// # Errors
	///
	/// [`ProxyError::Unsupported`] if the class does not include `C`, and
	/// [`ProxyError::Ref`] if the controller is not bound.
	pub fn forward<C, R, F>(&self, call: F) -> Result<R, ProxyError>
	where
		C: Capability + ?Sized,
		F: FnOnce(&D) -> R,
	{
		if !self.class.implements::<C>() {
			return Err(ProxyError::Unsupported {
				class: self.class.name().to_owned(),
				capability: C::NAME,
			});
		}

		let guard = self.reference.read();
		let delegate = guard.delegate()?;
		Ok(call(delegate))
	}
}

impl<D: 'static> Clone for Proxy<D> {
	fn clone(&self) -> Self {
		Self {
			class: Arc::clone(&self.class),
			reference: Arc::clone(&self.reference),
		}
	}
}

impl<D: 'static> fmt::Debug for Proxy<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Proxy")
			.field("class", &self.class.name())
			.field("reference", &self.reference)
			.finish()
	}
}

impl<D: 'static> fmt::Display for Proxy<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> {}", self.class, self.reference)
	}
}
