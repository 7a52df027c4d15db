//! Machine-checkable invariant proofs for the reference lifecycle controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use parking_lot::Mutex;
use proptest::prelude::*;

use crate::{BoxError, Capability, CapabilityType, Operation, Props, Ref, RefEvent, RefHooks, RefListener, State};

trait Probe: Send + Sync {}

impl Capability for dyn Probe {
	const NAME: &'static str = "Probe";
	const OPERATIONS: &'static [Operation] = &[];
}

/// Hooks whose failure is switched from the outside before each operation.
struct Scripted {
	fail: Arc<AtomicBool>,
}

impl Scripted {
	fn check(&self, stage: &'static str) -> Result<(), BoxError> {
		if self.fail.load(Ordering::SeqCst) { Err(format!("{stage} scripted failure").into()) } else { Ok(()) }
	}
}

impl RefHooks<u32> for Scripted {
	fn open(&self) -> Result<(), BoxError> {
		self.check("open")
	}

	fn close(&self) -> Result<(), BoxError> {
		self.check("close")
	}

	fn bind(&self, delegate: u32, _props: &Props) -> Result<u32, BoxError> {
		self.check("bind").map(|()| delegate)
	}

	fn unbind(&self, _delegate: &u32, _props: &Props) -> Result<(), BoxError> {
		self.check("unbind")
	}
}

/// Records each event with the delegate visibility observed at delivery.
#[derive(Default)]
struct Journal {
	entries: Mutex<Vec<(RefEvent, State, bool)>>,
}

impl Journal {
	fn note(&self, event: RefEvent, reference: &Ref<u32>) -> Result<(), BoxError> {
		let guard = reference.read();
		let readable = guard.delegate().is_ok();
		self.entries.lock().push((event, guard.state(), readable));
		Ok(())
	}

	fn events(&self) -> Vec<RefEvent> {
		self.entries.lock().iter().map(|(e, ..)| *e).collect()
	}
}

impl RefListener<u32> for Journal {
	fn open(&self, reference: &Ref<u32>) -> Result<(), BoxError> {
		self.note(RefEvent::Open, reference)
	}

	fn bound(&self, reference: &Ref<u32>) -> Result<(), BoxError> {
		self.note(RefEvent::Bound, reference)
	}

	fn updated(&self, reference: &Ref<u32>) -> Result<(), BoxError> {
		self.note(RefEvent::Updated, reference)
	}

	fn unbinding(&self, reference: &Ref<u32>) -> Result<(), BoxError> {
		self.note(RefEvent::Unbinding, reference)
	}

	fn closed(&self, reference: &Ref<u32>) -> Result<(), BoxError> {
		self.note(RefEvent::Closed, reference)
	}
}

#[derive(Debug, Clone)]
enum Op {
	Open { fail: bool },
	Close { fail: bool },
	Bind { delegate: u32, fail: bool },
	Update { delegate: Option<u32>, props: bool, fail: bool },
	Unbind { fail: bool },
}

impl Op {
	fn fail(&self) -> bool {
		match *self {
			Self::Open { fail } | Self::Close { fail } | Self::Bind { fail, .. } | Self::Update { fail, .. } | Self::Unbind { fail } => fail,
		}
	}
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		any::<bool>().prop_map(|fail| Op::Open { fail }),
		any::<bool>().prop_map(|fail| Op::Close { fail }),
		(0u32..100, any::<bool>()).prop_map(|(delegate, fail)| Op::Bind { delegate, fail }),
		(proptest::option::of(0u32..100), any::<bool>(), any::<bool>()).prop_map(|(delegate, props, fail)| Op::Update { delegate, props, fail }),
		any::<bool>().prop_map(|fail| Op::Unbind { fail }),
	]
}

/// Reference model of the controller: expected state, delegate and emitted events.
#[derive(Debug)]
struct Model {
	state: State,
	delegate: Option<u32>,
	events: Vec<RefEvent>,
}

impl Model {
	fn new() -> Self {
		Self {
			state: State::Closed,
			delegate: None,
			events: Vec::new(),
		}
	}

	fn apply(&mut self, op: &Op) {
		match (self.state, op) {
			(State::Closed, Op::Open { fail: false }) => {
				self.state = State::Unbound;
				self.events.push(RefEvent::Open);
			}
			(State::Unbound, Op::Bind { delegate, fail: false }) => {
				self.state = State::Bound;
				self.delegate = Some(*delegate);
				self.events.push(RefEvent::Bound);
			}
			(State::Bound, Op::Update { delegate, props, fail }) if delegate.is_some() || *props => {
				// Hooks are only consulted for a new delegate; default update goes through bind.
				if let Some(d) = delegate
					&& !fail
				{
					self.delegate = Some(*d);
				}
				self.events.push(RefEvent::Updated);
			}
			(State::Bound, Op::Unbind { .. }) => {
				self.state = State::Unbound;
				self.delegate = None;
				self.events.push(RefEvent::Unbinding);
			}
			(State::Bound, Op::Close { .. }) => {
				self.state = State::Closed;
				self.delegate = None;
				self.events.push(RefEvent::Unbinding);
				self.events.push(RefEvent::Closed);
			}
			(State::Unbound, Op::Close { .. }) => {
				self.state = State::Closed;
				self.events.push(RefEvent::Closed);
			}
			_ => {}
		}
	}
}

fn run(r: &Ref<u32>, fail: &AtomicBool, op: &Op) {
	fail.store(op.fail(), Ordering::SeqCst);
	let _ = match *op {
		Op::Open { .. } => r.open(),
		Op::Close { .. } => r.close(),
		Op::Bind { delegate, .. } => r.bind(delegate, Some(Props::new())),
		Op::Update { delegate, props, .. } => r.update(delegate, props.then(Props::new)),
		Op::Unbind { .. } => r.unbind(),
	};
}

fn scripted() -> (Ref<u32>, Arc<AtomicBool>) {
	let fail = Arc::new(AtomicBool::new(false));
	let r = Ref::with_hooks([CapabilityType::of::<dyn Probe>()], Scripted { fail: Arc::clone(&fail) });
	(r, fail)
}

proptest! {
	#[test]
	fn test_operations_never_strand_transient_states(ops in proptest::collection::vec(op(), 0..48)) {
		let (r, fail) = scripted();
		let mut model = Model::new();
		for op in &ops {
			run(&r, &fail, op);
			model.apply(op);
			let state = r.state();
			prop_assert!(matches!(state, State::Closed | State::Unbound | State::Bound), "{op:?} left {state}");
			prop_assert_eq!(state, model.state, "after {:?}", op);
			prop_assert_eq!(r.delegate().ok(), model.delegate, "after {:?}", op);
		}
	}

	#[test]
	fn test_listener_events_match_committed_transitions(ops in proptest::collection::vec(op(), 0..48)) {
		let (r, fail) = scripted();
		let journal = Arc::new(Journal::default());
		let listener: Arc<dyn RefListener<u32>> = journal.clone();
		r.add_listener(&listener);

		let mut model = Model::new();
		for op in &ops {
			run(&r, &fail, op);
			model.apply(op);
		}
		prop_assert_eq!(journal.events(), model.events);
	}
}

#[test]
fn test_hook_failures_restore_pre_operation_state() {
	let (r, fail) = scripted();

	run(&r, &fail, &Op::Open { fail: true });
	assert_eq!(r.state(), State::Closed);

	run(&r, &fail, &Op::Open { fail: false });
	run(&r, &fail, &Op::Bind { delegate: 1, fail: true });
	assert_eq!(r.state(), State::Unbound);
	assert!(r.delegate().is_err());

	run(&r, &fail, &Op::Bind { delegate: 2, fail: false });
	assert_eq!(r.delegate().ok(), Some(2));
}

#[test]
fn test_delegate_readable_only_when_bound() {
	let (r, fail) = scripted();
	let journal = Arc::new(Journal::default());
	let listener: Arc<dyn RefListener<u32>> = journal.clone();
	r.add_listener(&listener);

	for op in [
		Op::Open { fail: false },
		Op::Bind { delegate: 4, fail: false },
		Op::Update {
			delegate: Some(5),
			props: false,
			fail: false,
		},
		Op::Close { fail: false },
	] {
		run(&r, &fail, &op);
	}

	let entries = journal.entries.lock().clone();
	assert_eq!(entries.len(), 5);
	for (event, state, readable) in entries {
		assert_eq!(readable, state == State::Bound, "{event} in {state}");
	}
}

#[test]
fn test_concurrent_listener_registration_loses_nothing() {
	const THREADS: usize = 8;
	const PER_THREAD: usize = 64;

	let r: Arc<Ref<u32>> = Arc::new(Ref::of::<dyn Probe>());
	let kept: Arc<Mutex<Vec<Arc<dyn RefListener<u32>>>>> = Arc::default();

	let workers: Vec<_> = (0..THREADS)
		.map(|i| {
			let r = Arc::clone(&r);
			let kept = Arc::clone(&kept);
			thread::spawn(move || {
				for n in 0..PER_THREAD {
					let listener: Arc<dyn RefListener<u32>> = Arc::new(Journal::default());
					r.add_listener(&listener);
					if n % 2 == 0 {
						r.remove_listener(&listener);
					} else {
						kept.lock().push(listener);
					}
					if i == 0 {
						let _ = r.open();
						let _ = r.close();
					}
				}
			})
		})
		.collect();

	for worker in workers {
		worker.join().expect("worker panicked");
	}

	assert_eq!(r.listener_count(), THREADS * PER_THREAD / 2);
}
