//! Static lifecycle graph.
//!
//! Legality, rollback edges and listener dispatch are plain lookup tables over
//! [`State`]. They carry no per-controller data.

use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Lifecycle state of a [`crate::Ref`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum State {
	/// Not usable. Initial and terminal state.
	Closed,
	/// `open()` in progress.
	Opening,
	/// Open, no delegate.
	Unbound,
	/// `close()` in progress.
	Closing,
	/// `bind()` in progress.
	Binding,
	/// Open with a delegate.
	Bound,
	/// `unbind()` in progress.
	Unbinding,
	/// `update()` in progress.
	Updating,
}

/// Side of a transition a notification is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// The state was just entered.
	Entry,
	/// The state was just left.
	Exit,
}

/// Listener callback selected by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RefEvent {
	/// Left [`State::Opening`].
	Open,
	/// Left [`State::Binding`].
	Bound,
	/// Left [`State::Updating`].
	Updated,
	/// Entered [`State::Unbinding`].
	Unbinding,
	/// Left [`State::Closing`].
	Closed,
}

impl State {
	/// Legal successors of this state.
	pub const fn transitions(self) -> &'static [State] {
		match self {
			Self::Closed => &[Self::Opening],
			Self::Opening => &[Self::Unbound],
			Self::Unbound => &[Self::Closing, Self::Binding],
			Self::Closing => &[Self::Closed],
			Self::Binding => &[Self::Bound],
			Self::Bound => &[Self::Unbinding, Self::Updating],
			Self::Unbinding => &[Self::Unbound],
			Self::Updating => &[Self::Bound],
		}
	}

	/// Returns true if `next` is a legal successor of this state.
	pub fn can_transit(self, next: State) -> bool {
		self.transitions().contains(&next)
	}

	/// Forced fallback used when the operation that entered this state fails.
	///
	/// Only [`State::Opening`] and [`State::Binding`] have one.
	pub const fn rollback(self) -> Option<State> {
		match self {
			Self::Opening => Some(Self::Closed),
			Self::Binding => Some(Self::Unbound),
			_ => None,
		}
	}

	/// Listener callback fired when this state is entered or left.
	pub const fn dispatch(self, direction: Direction) -> Option<RefEvent> {
		match (self, direction) {
			(Self::Opening, Direction::Exit) => Some(RefEvent::Open),
			(Self::Binding, Direction::Exit) => Some(RefEvent::Bound),
			(Self::Updating, Direction::Exit) => Some(RefEvent::Updated),
			(Self::Closing, Direction::Exit) => Some(RefEvent::Closed),
			(Self::Unbinding, Direction::Entry) => Some(RefEvent::Unbinding),
			_ => None,
		}
	}

	/// Returns true while a delegate may be read.
	pub const fn is_bound(self) -> bool {
		matches!(self, Self::Bound)
	}

	/// Returns the state name.
	pub fn as_str(self) -> &'static str {
		self.into()
	}
}
