//! The reference lifecycle controller.
//!
//! # Purpose
//!
//! - Hold one binding: the declared capability shape, the current delegate and its
//!   property map.
//! - Serialize lifecycle moves through the static [`State`] graph and notify
//!   [`RefListener`]s once per committed move.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints | Constructed / mutated in |
//! |---|---|---|---|
//! | [`Ref`] | Controller for one binding | State changes only through the transition engine | [`Ref::new`], lifecycle ops |
//! | `Slot` | `(state, delegate, props)` behind one `RwLock` | Write lock never held across hooks or dispatch | `transit`, field writes in ops |
//! | [`RefGuard`] | Shared-lock snapshot of the slot | Only place the delegate is borrowed | [`Ref::read`] |
//! | `Completion` | Drop guard finishing an op | Rolls back or completes even on unwind | `open`, `bind`, `update`, `unbind`, `close` |
//!
//! # Concurrency and ordering
//!
//! - Each field write takes the write lock on its own. Readers see either the old or
//!   the new value of a field, never a torn one, and [`Ref::read`] gives all three
//!   fields from one acquisition.
//! - Readers acquire the lock recursively. A delegate running inside a proxy call
//!   (which holds the shared lock) can read its own controller even when a writer is
//!   queued. It must not drive transitions on it.
//! - Listener dispatch walks a snapshot of the listener set taken when the
//!   transition committed.
//!
//! # Failure modes and recovery
//!
//! - `open` or `bind` hook fails: forced rollback to `Closed` / `Unbound`, error returned.
//! - `update` hook fails: back to `Bound` with the previous delegate, error returned.
//! - `unbind` or `close` hook fails: the operation completes, error returned afterwards.
//! - Hook panics: the same recovery runs while unwinding.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::hooks::Identity;
use crate::listener::Listeners;
use crate::{BoxError, Capability, CapabilityType, HookStage, RefError, RefHooks, RefListener, Result, State};

mod transition;

use transition::{Completion, Step};

/// String-keyed property map attached to a binding.
///
/// Replaced wholesale by `bind`/`update`, never merged.
pub type Props = serde_json::Map<String, serde_json::Value>;

struct Slot<T> {
	state: State,
	delegate: Option<T>,
	props: Arc<Props>,
}

/// Lifecycle controller for one capability binding.
///
/// Created [`State::Closed`]. Usable between [`Ref::open`] and [`Ref::close`]; a closed
/// controller can be opened again.
pub struct Ref<T: 'static> {
	types: Box<[CapabilityType]>,
	slot: RwLock<Slot<T>>,
	listeners: Listeners<T>,
	hooks: Box<dyn RefHooks<T>>,
}

impl<T: Send + Sync + 'static> Ref<T> {
	/// Creates a controller with [`Identity`] hooks.
	///
	/// # Panics
	///
	/// Panics if `types` is empty.
	pub fn new(types: impl IntoIterator<Item = CapabilityType>) -> Self {
		Self::with_hooks(types, Identity)
	}

	/// Creates a controller for a single capability.
	pub fn of<C: Capability + ?Sized>() -> Self {
		Self::new([CapabilityType::of::<C>()])
	}

	/// Creates a controller with the given hooks.
	///
	/// Repeated capability types are dropped, keeping the first occurrence.
	///
	/// # Panics
	///
	/// Panics if `types` is empty.
	pub fn with_hooks(types: impl IntoIterator<Item = CapabilityType>, hooks: impl RefHooks<T> + 'static) -> Self {
		let mut shape: Vec<CapabilityType> = Vec::new();
		for ty in types {
			if !shape.contains(&ty) {
				shape.push(ty);
			}
		}
		assert!(!shape.is_empty(), "a reference needs at least one capability type");

		Self {
			types: shape.into_boxed_slice(),
			slot: RwLock::new(Slot {
				state: State::Closed,
				delegate: None,
				props: Arc::new(Props::new()),
			}),
			listeners: Listeners::new(),
			hooks: Box::new(hooks),
		}
	}

	/// Declared capability types, in declaration order.
	pub fn types(&self) -> &[CapabilityType] {
		&self.types
	}

	/// Current state.
	pub fn state(&self) -> State {
		self.slot.read_recursive().state
	}

	/// Snapshot of the current property map.
	pub fn props(&self) -> Arc<Props> {
		Arc::clone(&self.slot.read_recursive().props)
	}

	/// Takes the shared lock and returns a consistent view of the binding.
	///
	/// Transitions block until the guard is dropped, so keep it short.
	pub fn read(&self) -> RefGuard<'_, T> {
		RefGuard {
			owner: self,
			slot: self.slot.read_recursive(),
		}
	}

	/// Registers a listener.
	///
	/// The controller keeps only a weak reference: the listener stays registered for as
	/// long as the caller keeps `listener` alive. A listener added while a transition is
	/// being dispatched may miss that transition.
	pub fn add_listener(&self, listener: &Arc<dyn RefListener<T>>) {
		self.listeners.add(listener);
	}

	/// Unregisters one registration of `listener`.
	pub fn remove_listener(&self, listener: &Arc<dyn RefListener<T>>) {
		self.listeners.remove(listener);
	}

	/// Number of live registered listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Opens the controller: `Closed -> Opening -> Unbound`.
	///
	/// Runs [`RefHooks::open`] in between. On hook failure the controller is rolled back
	/// to [`State::Closed`].
	pub fn open(&self) -> Result<()> {
		self.to_state(State::Opening)?;

		let rollback = Completion::new(self, Step::Rollback);
		if let Err(source) = self.hooks.open() {
			drop(rollback);
			return Err(self.hook_error(HookStage::Open, source));
		}
		rollback.disarm();

		self.to_state(State::Unbound)
	}

	/// Closes the controller, unbinding it first if needed.
	///
	/// Idempotent: returns `Ok(())` without doing anything unless the controller is
	/// unbound (after the implicit unbind). The controller is [`State::Closed`] when an
	/// unbind or close hook error is returned.
	pub fn close(&self) -> Result<()> {
		let unbound = self.unbind();

		if !self.try_state(State::Closing) {
			return unbound;
		}

		let complete = Completion::new(self, Step::Transit(State::Closed));
		let outcome = self.hooks.close();
		complete.finish()?;

		unbound?;
		outcome.map_err(|source| self.hook_error(HookStage::Close, source))
	}

	/// Binds a delegate: `Unbound -> Binding -> Bound`.
	///
	/// `props` replaces the property map when supplied. The stored delegate is whatever
	/// [`RefHooks::bind`] returns. On hook failure the controller is rolled back to
	/// [`State::Unbound`]; a property map supplied to this call stays in place.
	pub fn bind(&self, delegate: T, props: Option<Props>) -> Result<()> {
		self.to_state(State::Binding)?;

		let rollback = Completion::new(self, Step::Rollback);
		let props = self.replace_props(props);
		match self.hooks.bind(delegate, &props) {
			Ok(delegate) => {
				self.slot.write().delegate = Some(delegate);
				rollback.disarm();
				self.to_state(State::Bound)
			}
			Err(source) => {
				drop(rollback);
				Err(self.hook_error(HookStage::Bind, source))
			}
		}
	}

	/// Replaces the delegate, the props, or both: `Bound -> Updating -> Bound`.
	///
	/// At least one of the arguments must be supplied. A new delegate goes through
	/// [`RefHooks::update`]. The controller returns to [`State::Bound`] even when the
	/// hook fails, keeping the previous delegate.
	pub fn update(&self, delegate: Option<T>, props: Option<Props>) -> Result<()> {
		if delegate.is_none() && props.is_none() {
			return Err(RefError::Validation {
				reference: self.to_string(),
				reason: "must update something",
			});
		}

		self.to_state(State::Updating)?;

		let complete = Completion::new(self, Step::Transit(State::Bound));
		let props = self.replace_props(props);
		let outcome = match delegate {
			Some(delegate) => self.hooks.update(delegate, &props).map(|delegate| {
				self.slot.write().delegate = Some(delegate);
			}),
			None => Ok(()),
		};
		complete.finish()?;

		outcome.map_err(|source| self.hook_error(HookStage::Update, source))
	}

	/// Releases the delegate: `Bound -> Unbinding -> Unbound`.
	///
	/// Idempotent: returns `Ok(())` without doing anything unless the controller is
	/// bound. Delegate and props are cleared even if [`RefHooks::unbind`] fails.
	pub fn unbind(&self) -> Result<()> {
		if !self.try_state(State::Unbinding) {
			return Ok(());
		}

		let complete = Completion::new(self, Step::Release);
		let (delegate, props) = {
			let mut slot = self.slot.write();
			(slot.delegate.take(), Arc::clone(&slot.props))
		};
		let outcome = match &delegate {
			Some(delegate) => self.hooks.unbind(delegate, &props),
			None => Ok(()),
		};
		drop(delegate);
		complete.finish()?;

		outcome.map_err(|source| self.hook_error(HookStage::Unbind, source))
	}

	/// Clone of the current delegate.
	///
	/// Fails with [`RefError::Unbound`] unless the controller is [`State::Bound`]. Use
	/// [`Ref::read`] to borrow the delegate instead.
	pub fn delegate(&self) -> Result<T>
	where
		T: Clone,
	{
		self.read().delegate().cloned()
	}

	/// Stores `props` if supplied and returns the map now in effect.
	fn replace_props(&self, props: Option<Props>) -> Arc<Props> {
		match props {
			Some(props) => {
				let props = Arc::new(props);
				self.slot.write().props = Arc::clone(&props);
				props
			}
			None => Arc::clone(&self.slot.read_recursive().props),
		}
	}

	fn hook_error(&self, stage: HookStage, source: BoxError) -> RefError {
		RefError::Hook {
			reference: self.to_string(),
			stage,
			source,
		}
	}
}

impl<T: 'static> Ref<T> {
	/// Display form for a known state, usable while the slot lock is held.
	pub(crate) fn shape(&self, state: State) -> Shape<'_> {
		Shape { types: &self.types, state }
	}
}

/// `Ref([A, B])[ State ]`.
pub(crate) struct Shape<'a> {
	types: &'a [CapabilityType],
	state: State,
}

impl fmt::Display for Shape<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Ref({:?})[ {} ]", self.types, self.state)
	}
}

impl<T: 'static> fmt::Display for Ref<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.slot.read_recursive().state;
		fmt::Display::fmt(&self.shape(state), f)
	}
}

impl<T: 'static> fmt::Debug for Ref<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Ref")
			.field("types", &self.types)
			.field("state", &self.slot.read_recursive().state)
			.field("listeners", &self.listeners.len())
			.finish_non_exhaustive()
	}
}

/// Shared-lock view of a [`Ref`].
///
/// While it lives no transition can commit, so state, delegate and props read
/// through it are mutually consistent.
pub struct RefGuard<'a, T: 'static> {
	owner: &'a Ref<T>,
	slot: RwLockReadGuard<'a, Slot<T>>,
}

impl<'a, T: 'static> RefGuard<'a, T> {
	/// State at the time the guard was taken.
	pub fn state(&self) -> State {
		self.slot.state
	}

	/// Borrows the delegate without further locking.
	///
	/// Fails with [`RefError::Unbound`] unless the state is [`State::Bound`].
	pub fn delegate(&self) -> Result<&T> {
		match (&self.slot.delegate, self.slot.state) {
			(Some(delegate), State::Bound) => Ok(delegate),
			(_, state) => Err(RefError::Unbound {
				reference: self.owner.shape(state).to_string(),
			}),
		}
	}

	/// Property map of the binding.
	pub fn props(&self) -> &Props {
		&self.slot.props
	}

	/// The controller this guard reads.
	pub fn reference(&self) -> &'a Ref<T> {
		self.owner
	}
}
