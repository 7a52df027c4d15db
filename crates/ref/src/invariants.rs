//! Invariant catalog for [`crate::Ref`].
#![allow(dead_code)]

/// Every lifecycle operation must return with the controller in a stable state.
///
/// - Enforced in: `Completion` (drop guard in `reference::transition`)
/// - Tested by: [`crate::invariants::test_operations_never_strand_transient_states`]
/// - Failure symptom: A controller stuck in `Binding`/`Updating`/`Unbinding` that refuses every further operation.
pub(crate) const OPERATIONS_RETURN_IN_STABLE_STATE: () = ();

/// Rollback must only follow the designated edges `Opening -> Closed` and `Binding -> Unbound`.
///
/// - Enforced in: [`crate::State::rollback`], `Ref::rollback`
/// - Tested by: [`crate::invariants::test_hook_failures_restore_pre_operation_state`]
/// - Failure symptom: A failed `open` leaves a half-open controller, or a failed `bind` exposes a stale delegate.
pub(crate) const ROLLBACK_FOLLOWS_DESIGNATED_EDGES: () = ();

/// Listeners must be notified once per committed transition and never while the write lock is held.
///
/// - Enforced in: `Ref::transit`
/// - Tested by: [`crate::invariants::test_listener_events_match_committed_transitions`]
/// - Failure symptom: Duplicate or missing notifications; deadlock when a listener reads the controller.
pub(crate) const ONE_NOTIFICATION_PER_COMMITTED_TRANSITION: () = ();

/// The delegate must only be readable while the state is exactly `Bound`.
///
/// - Enforced in: [`crate::RefGuard::delegate`]
/// - Tested by: [`crate::invariants::test_delegate_readable_only_when_bound`]
/// - Failure symptom: Proxies forward to a delegate that is being bound, updated or released.
pub(crate) const DELEGATE_READABLE_ONLY_WHEN_BOUND: () = ();

/// Concurrent listener registration must not lose updates.
///
/// - Enforced in: `Listeners::add`, `Listeners::remove` (read-copy-update)
/// - Tested by: [`crate::invariants::test_concurrent_listener_registration_loses_nothing`]
/// - Failure symptom: Listeners silently missing after parallel registration.
pub(crate) const LISTENER_REGISTRATION_IS_LINEARIZABLE: () = ();

#[cfg(doc)]
pub(crate) fn test_operations_never_strand_transient_states() {}

#[cfg(doc)]
pub(crate) fn test_hook_failures_restore_pre_operation_state() {}

#[cfg(doc)]
pub(crate) fn test_listener_events_match_committed_transitions() {}

#[cfg(doc)]
pub(crate) fn test_delegate_readable_only_when_bound() {}

#[cfg(doc)]
pub(crate) fn test_concurrent_listener_registration_loses_nothing() {}

#[cfg(test)]
mod proofs;
