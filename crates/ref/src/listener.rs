//! Transition observers and the concurrent listener set.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use tracing::warn;

use crate::{BoxError, Ref, RefEvent};

/// Observer of committed lifecycle transitions.
///
/// Callbacks run on the thread that performed the transition, after the controller
/// lock has been released. Errors and panics are logged and do not reach the caller
/// or the remaining listeners.
pub trait RefListener<T: 'static>: Send + Sync {
	/// The controller finished opening.
	fn open(&self, reference: &Ref<T>) -> Result<(), BoxError> {
		let _ = reference;
		Ok(())
	}

	/// A delegate was bound.
	fn bound(&self, reference: &Ref<T>) -> Result<(), BoxError> {
		let _ = reference;
		Ok(())
	}

	/// The bound delegate or its props were replaced.
	fn updated(&self, reference: &Ref<T>) -> Result<(), BoxError> {
		let _ = reference;
		Ok(())
	}

	/// The delegate is about to be released. It can no longer be read.
	fn unbinding(&self, reference: &Ref<T>) -> Result<(), BoxError> {
		let _ = reference;
		Ok(())
	}

	/// The controller finished closing.
	fn closed(&self, reference: &Ref<T>) -> Result<(), BoxError> {
		let _ = reference;
		Ok(())
	}
}

impl RefEvent {
	fn deliver<T: 'static>(self, listener: &dyn RefListener<T>, reference: &Ref<T>) -> Result<(), BoxError> {
		match self {
			Self::Open => listener.open(reference),
			Self::Bound => listener.bound(reference),
			Self::Updated => listener.updated(reference),
			Self::Unbinding => listener.unbinding(reference),
			Self::Closed => listener.closed(reference),
		}
	}
}

type Entry<T> = Weak<dyn RefListener<T>>;

/// Copy-on-write set of weakly held listeners.
///
/// Writers publish a new vector; dispatch walks whichever vector was current when it
/// started.
pub(crate) struct Listeners<T: 'static> {
	entries: ArcSwap<Vec<Entry<T>>>,
}

impl<T: 'static> Listeners<T> {
	pub(crate) fn new() -> Self {
		Self {
			entries: ArcSwap::from_pointee(Vec::new()),
		}
	}

	pub(crate) fn add(&self, listener: &Arc<dyn RefListener<T>>) {
		let added = Arc::downgrade(listener);
		self.entries.rcu(|current| {
			let mut next: Vec<Entry<T>> = current.iter().filter(|w| w.strong_count() > 0).cloned().collect();
			next.push(added.clone());
			next
		});
	}

	pub(crate) fn remove(&self, listener: &Arc<dyn RefListener<T>>) {
		let removed = Arc::downgrade(listener);
		self.entries.rcu(|current| {
			let mut next: Vec<Entry<T>> = current.iter().filter(|w| w.strong_count() > 0).cloned().collect();
			if let Some(pos) = next.iter().position(|w| Weak::ptr_eq(w, &removed)) {
				next.remove(pos);
			}
			next
		});
	}

	/// Number of live listeners.
	pub(crate) fn len(&self) -> usize {
		self.entries.load().iter().filter(|w| w.strong_count() > 0).count()
	}

	pub(crate) fn dispatch(&self, event: RefEvent, reference: &Ref<T>) {
		let snapshot = self.entries.load_full();
		for listener in snapshot.iter().filter_map(Weak::upgrade) {
			match catch_unwind(AssertUnwindSafe(|| event.deliver(&*listener, reference))) {
				Ok(Ok(())) => {}
				Ok(Err(error)) => {
					warn!(%reference, %event, %error, "listener failed");
				}
				Err(payload) => {
					warn!(%reference, %event, panic = panic_message(&*payload), "listener panicked");
				}
			}
		}
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		msg
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.as_str()
	} else {
		"<non-string panic payload>"
	}
}
