//! Error types for reference lifecycle operations.

use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

use crate::State;

/// Boxed error produced by user hooks and listeners.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A convenient type alias for `Result` with `E` = [`RefError`].
pub type Result<T, E = RefError> = std::result::Result<T, E>;

/// Lifecycle operation whose hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum HookStage {
	/// [`crate::RefHooks::open`].
	Open,
	/// [`crate::RefHooks::bind`].
	Bind,
	/// [`crate::RefHooks::update`].
	Update,
	/// [`crate::RefHooks::unbind`].
	Unbind,
	/// [`crate::RefHooks::close`].
	Close,
}

/// Errors reported by [`crate::Ref`].
///
/// `reference` is the controller's display form, `Ref([types])[ State ]`, captured
/// when the error was raised.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RefError {
	/// The requested state is not a legal successor of the current one.
	#[error("{reference}: can't transition from {from} to {to}")]
	IllegalTransition {
		/// Controller description.
		reference: String,
		/// State at the time of the request.
		from: State,
		/// Requested state.
		to: State,
	},
	/// The delegate was requested while the controller is not bound.
	#[error("{reference}: not bound")]
	Unbound {
		/// Controller description.
		reference: String,
	},
	/// A user hook failed.
	#[error("{reference}: {stage} hook failed: {source}")]
	Hook {
		/// Controller description.
		reference: String,
		/// Operation that ran the hook.
		stage: HookStage,
		/// Failure reported by the hook.
		#[source]
		source: BoxError,
	},
	/// Arguments were rejected before any transition was attempted.
	#[error("{reference}: {reason}")]
	Validation {
		/// Controller description.
		reference: String,
		/// What was wrong.
		reason: &'static str,
	},
}

impl RefError {
	/// Description of the controller that raised the error.
	pub fn reference(&self) -> &str {
		match self {
			Self::IllegalTransition { reference, .. }
			| Self::Unbound { reference }
			| Self::Hook { reference, .. }
			| Self::Validation { reference, .. } => reference,
		}
	}

	/// Returns true for [`RefError::Unbound`].
	pub fn is_unbound(&self) -> bool {
		matches!(self, Self::Unbound { .. })
	}

	/// Stage of a [`RefError::Hook`] failure.
	pub fn hook_stage(&self) -> Option<HookStage> {
		match self {
			Self::Hook { stage, .. } => Some(*stage),
			_ => None,
		}
	}
}
