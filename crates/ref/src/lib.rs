//! Lifecycle controller for indirect bindings.
//!
//! A [`Ref`] is a managed slot that may or may not currently hold a delegate: the
//! concrete resource satisfying a set of capabilities. A collaborator (usually a
//! service registry) drives it through [`Ref::open`], [`Ref::bind`], [`Ref::update`],
//! [`Ref::unbind`] and [`Ref::close`]; consumers read the delegate through it, most
//! often via a proxy from `gyro-proxy`.
//!
//! # Mental model
//!
//! - The legal moves form a fixed graph, [`State`]. Each move is a compare-and-set
//!   under an exclusive lock; nothing else runs under that lock.
//! - User code plugs in through two seams. [`RefHooks`] transform or clean up the
//!   delegate as part of an operation; [`RefListener`]s observe committed
//!   transitions after the lock is released.
//! - A failing hook never strands the controller in a transient state: `open` and
//!   `bind` roll back, `update` returns to [`State::Bound`], `unbind` and `close`
//!   complete anyway.
//! - A failing listener is logged and skipped.
//!
//! # Example
//!
//! ```
//! use gyro_ref::{Capability, Operation, Props, Ref, State};
//!
//! trait Greeter: Send + Sync {
//! 	fn greet(&self) -> String;
//! }
//!
//! impl Capability for dyn Greeter {
//! 	const NAME: &'static str = "Greeter";
//! 	const OPERATIONS: &'static [Operation] = &[Operation::new("greet", "fn greet(&self) -> String")];
//! }
//!
//! let greeter: Ref<&'static str> = Ref::of::<dyn Greeter>();
//! greeter.open()?;
//! greeter.bind("hello", Some(Props::new()))?;
//! assert_eq!(greeter.state(), State::Bound);
//! assert_eq!(greeter.delegate()?, "hello");
//! greeter.close()?;
//! assert_eq!(greeter.state(), State::Closed);
//! # Ok::<(), gyro_ref::RefError>(())
//! ```
#![warn(missing_docs)]

mod capability;
mod error;
mod hooks;
mod invariants;
mod listener;
mod reference;
mod state;

pub use capability::{Capability, CapabilityType, Operation};
pub use error::{BoxError, HookStage, RefError, Result};
pub use hooks::{Identity, RefHooks};
pub use listener::RefListener;
pub use reference::{Props, Ref, RefGuard};
pub use state::{Direction, RefEvent, State};
