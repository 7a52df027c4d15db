//! Transition engine.
//!
//! Every state change goes through [`Ref::transit`] (checked) or [`Ref::rollback`]
//! (forced). Both hold the write lock only for the read-check-write of the state.

use std::mem;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::{Props, Ref};
use crate::{Direction, RefError, Result, State};

impl<T: Send + Sync + 'static> Ref<T> {
	/// Moves to `next` or fails with [`RefError::IllegalTransition`].
	pub(crate) fn to_state(&self, next: State) -> Result<()> {
		self.transit(next).map_err(|current| RefError::IllegalTransition {
			reference: self.shape(current).to_string(),
			from: current,
			to: next,
		})
	}

	/// Moves to `next` if legal. Returns false and leaves the state alone otherwise.
	pub(crate) fn try_state(&self, next: State) -> bool {
		self.transit(next).is_ok()
	}

	/// Compare-and-set on the state, then listener dispatch outside the lock.
	///
	/// On refusal returns the current state.
	fn transit(&self, next: State) -> std::result::Result<(), State> {
		let prev = {
			let mut slot = self.slot.write();
			if !slot.state.can_transit(next) {
				return Err(slot.state);
			}
			mem::replace(&mut slot.state, next)
		};

		debug!(reference = %self.shape(next), from = %prev, to = %next, "transition");

		if let Some(event) = prev.dispatch(Direction::Exit) {
			self.listeners.dispatch(event, self);
		}
		if let Some(event) = next.dispatch(Direction::Entry) {
			self.listeners.dispatch(event, self);
		}
		Ok(())
	}

	/// Forces the state onto its rollback edge, bypassing the legality check.
	///
	/// Dispatches nothing.
	pub(crate) fn rollback(&self) {
		let mut slot = self.slot.write();
		let from = slot.state;
		match from.rollback() {
			Some(to) => {
				slot.state = to;
				drop(slot);
				warn!(reference = %self.shape(to), %from, %to, "rolled back");
			}
			None => {
				drop(slot);
				error!(reference = %self.shape(from), %from, "no rollback edge");
			}
		}
	}
}

/// What a [`Completion`] does when it is finished or dropped.
pub(super) enum Step {
	/// Take the rollback edge of the current state.
	Rollback,
	/// Move to the given state.
	Transit(State),
	/// Clear props and move to [`State::Unbound`].
	Release,
}

/// Drop guard that brings an in-flight operation to a stable state.
///
/// Finishing it explicitly reports the outcome of the final step; dropping it
/// (early return or unwind) performs the step and logs a failure.
pub(super) struct Completion<'a, T: Send + Sync + 'static> {
	owner: &'a Ref<T>,
	step: Option<Step>,
}

impl<'a, T: Send + Sync + 'static> Completion<'a, T> {
	pub(super) fn new(owner: &'a Ref<T>, step: Step) -> Self {
		Self { owner, step: Some(step) }
	}

	/// Runs the step now.
	pub(super) fn finish(mut self) -> Result<()> {
		match self.step.take() {
			Some(step) => self.run(step),
			None => Ok(()),
		}
	}

	/// Forgets the step; the operation completed on its own.
	pub(super) fn disarm(mut self) {
		self.step = None;
	}

	fn run(&self, step: Step) -> Result<()> {
		match step {
			Step::Rollback => {
				self.owner.rollback();
				Ok(())
			}
			Step::Transit(next) => self.owner.to_state(next),
			Step::Release => {
				self.owner.slot.write().props = Arc::new(Props::new());
				self.owner.to_state(State::Unbound)
			}
		}
	}
}

impl<T: Send + Sync + 'static> Drop for Completion<'_, T> {
	fn drop(&mut self) {
		if let Some(step) = self.step.take()
			&& let Err(err) = self.run(step)
		{
			error!(error = %err, "failed to complete lifecycle operation");
		}
	}
}
