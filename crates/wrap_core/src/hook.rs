//! Lifecycle hooks and the actions they return.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Result of a hook or case body. Failures are reported by the runner.
pub type HookResult = anyhow::Result<()>;

/// A boxed future that resolves to a [`HookResult`].
pub type BoxFuture = Pin<Box<dyn Future<Output = HookResult> + Send + 'static>>;

/// What a hook or case body hands back to the runner.
///
/// The engine only arranges call order. Awaiting [`Action::Async`] is the
/// runner's job.
pub enum Action {
	/// Completed synchronously.
	Done(HookResult),
	/// Needs async work. The runner awaits the future before moving on.
	Async(BoxFuture),
}

impl Action {
	/// Create a sync action that succeeded.
	pub fn done() -> Self {
		Action::Done(Ok(()))
	}

	/// Create an async action from a future.
	pub fn future<F>(fut: F) -> Self
	where
		F: Future<Output = HookResult> + Send + 'static,
	{
		Action::Async(Box::pin(fut))
	}
}

impl From<HookResult> for Action {
	fn from(result: HookResult) -> Self {
		Action::Done(result)
	}
}

impl From<()> for Action {
	fn from(_: ()) -> Self {
		Action::done()
	}
}

impl fmt::Debug for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Done(result) => f.debug_tuple("Done").field(result).finish(),
			Action::Async(_) => f.write_str("Async(..)"),
		}
	}
}

/// Recognized lifecycle names, in declaration order.
pub const LIFECYCLE_NAMES: &[&str] = &["before_all", "before_each", "after_all", "after_each"];

/// When a hook runs relative to the cases of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
	/// Once, before the first case of the group.
	BeforeAll,
	/// Before every case.
	BeforeEach,
	/// Once, after the last case of the group.
	AfterAll,
	/// After every case.
	AfterEach,
}

impl Lifecycle {
	/// All lifecycles, in the same order as [`LIFECYCLE_NAMES`].
	pub const ALL: [Lifecycle; 4] = [
		Lifecycle::BeforeAll,
		Lifecycle::BeforeEach,
		Lifecycle::AfterAll,
		Lifecycle::AfterEach,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			Lifecycle::BeforeAll => "before_all",
			Lifecycle::BeforeEach => "before_each",
			Lifecycle::AfterAll => "after_all",
			Lifecycle::AfterEach => "after_each",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|l| l.as_str() == name)
	}

	/// Slot index used by per-lifecycle storage.
	pub(crate) const fn index(self) -> usize {
		match self {
			Lifecycle::BeforeAll => 0,
			Lifecycle::BeforeEach => 1,
			Lifecycle::AfterAll => 2,
			Lifecycle::AfterEach => 3,
		}
	}
}

impl fmt::Display for Lifecycle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A zero-argument lifecycle callable.
///
/// Cheap to clone; clones share the underlying closure.
#[derive(Clone)]
pub struct Hook(Arc<dyn Fn() -> Action + Send + Sync>);

impl Hook {
	/// Wraps a closure returning anything convertible into an [`Action`]:
	/// `()`, a [`HookResult`], or an `Action` itself.
	pub fn new<F, R>(f: F) -> Self
	where
		F: Fn() -> R + Send + Sync + 'static,
		R: Into<Action>,
	{
		Self(Arc::new(move || f().into()))
	}

	/// Runs the hook.
	pub fn call(&self) -> Action {
		(self.0)()
	}

	pub fn ptr_eq(&self, other: &Hook) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Hook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Hook(..)")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lifecycle_names_match_variants() {
		let names: Vec<_> = Lifecycle::ALL.iter().map(|l| l.as_str()).collect();
		assert_eq!(names, LIFECYCLE_NAMES);
		for (i, lifecycle) in Lifecycle::ALL.into_iter().enumerate() {
			assert_eq!(lifecycle.index(), i);
			assert_eq!(Lifecycle::from_name(lifecycle.as_str()), Some(lifecycle));
		}
		assert_eq!(Lifecycle::from_name("beforeAll"), None);
	}

	#[test]
	fn hook_converts_unit_and_results() {
		let ok = Hook::new(|| ());
		assert!(matches!(ok.call(), Action::Done(Ok(()))));

		let failing = Hook::new(|| -> HookResult { Err(anyhow::anyhow!("boom")) });
		match failing.call() {
			Action::Done(Err(err)) => assert_eq!(err.to_string(), "boom"),
			other => panic!("unexpected action: {other:?}"),
		}
	}

	#[test]
	fn hook_clones_share_identity() {
		let hook = Hook::new(|| ());
		assert!(hook.ptr_eq(&hook.clone()));
		assert!(!hook.ptr_eq(&Hook::new(|| ())));
	}
}
