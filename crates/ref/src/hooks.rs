//! Extension points run by lifecycle operations.

use crate::{BoxError, Props};

/// Strategy hooks for a [`crate::Ref`].
///
/// Every method has a default, so implementors override only what they need. Hooks
/// run outside the controller lock and may block; they must not call back into the
/// operation that invoked them.
pub trait RefHooks<T>: Send + Sync {
	/// Runs while the controller is [`crate::State::Opening`].
	///
	/// Failure rolls the controller back to [`crate::State::Closed`].
	fn open(&self) -> Result<(), BoxError> {
		Ok(())
	}

	/// Runs while the controller is [`crate::State::Closing`].
	///
	/// The controller reaches [`crate::State::Closed`] whatever this returns.
	fn close(&self) -> Result<(), BoxError> {
		Ok(())
	}

	/// Computes the delegate to store from the one supplied to `bind`.
	///
	/// `props` is the property map in effect for the new binding. Failure rolls the
	/// controller back to [`crate::State::Unbound`].
	fn bind(&self, delegate: T, props: &Props) -> Result<T, BoxError> {
		let _ = props;
		Ok(delegate)
	}

	/// Computes the delegate to store from the one supplied to `update`.
	///
	/// Defaults to [`RefHooks::bind`]. The controller returns to
	/// [`crate::State::Bound`] whatever this returns; on failure the previous
	/// delegate stays in place.
	fn update(&self, delegate: T, props: &Props) -> Result<T, BoxError> {
		self.bind(delegate, props)
	}

	/// Releases whatever `bind` acquired for the outgoing delegate.
	///
	/// Delegate and props are cleared afterwards regardless of the outcome.
	fn unbind(&self, delegate: &T, props: &Props) -> Result<(), BoxError> {
		let _ = (delegate, props);
		Ok(())
	}
}

/// Hooks that store delegates unchanged and do nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> RefHooks<T> for Identity {}
