//! The seam to the host test runner.
//!
//! The engine does not group, execute or skip anything itself. It calls into
//! a [`Runner`] looked up on the current thread at the moment a terminal call
//! executes. Install one with [`install`] or [`scoped`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::hook::{Action, Hook, Lifecycle};

pub mod recorder;

pub use recorder::{CaseReport, CaseStatus, GroupReport, Recorder, RunReport};

/// Deferred body of a group. The runner passes itself back in so nested
/// declarations reach the same runner.
pub type GroupBody = Box<dyn FnOnce(&dyn Runner)>;

/// Body of a single case.
pub type CaseBody = Box<dyn FnOnce() -> Action>;

/// Inclusion policy for a composed group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Mode {
	/// Run normally.
	#[default]
	All,
	/// Exclusive inclusion: only groups in this mode run.
	Only,
	/// Excluded.
	Skip,
}

impl Mode {
	pub const fn as_str(self) -> &'static str {
		match self {
			Mode::All => "all",
			Mode::Only => "only",
			Mode::Skip => "skip",
		}
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The terminal call that closes a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
	Describe,
	It,
	Test,
}

impl Terminal {
	pub const fn as_str(self) -> &'static str {
		match self {
			Terminal::Describe => "describe",
			Terminal::It => "it",
			Terminal::Test => "test",
		}
	}
}

impl fmt::Display for Terminal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Grouping and execution primitives of a host test runner.
///
/// Implementations decide when bodies run and how failures returned through
/// [`Action`] are reported. Async actions must be awaited before the next
/// step in a sequence runs.
pub trait Runner {
	/// Declare a normal group.
	fn describe(&self, label: &str, body: GroupBody);

	/// Declare a group that runs to the exclusion of non-`only` groups.
	fn describe_only(&self, label: &str, body: GroupBody);

	/// Declare a skipped group.
	fn describe_skip(&self, label: &str, body: GroupBody);

	/// Declare a case.
	fn it(&self, message: &str, block: CaseBody);

	/// Declare a case. Runners without a distinction treat it like [`Runner::it`].
	fn test(&self, message: &str, block: CaseBody) {
		self.it(message, block);
	}

	/// Register a lifecycle hook on the group currently being declared.
	fn hook(&self, lifecycle: Lifecycle, hook: Hook);
}

thread_local! {
	static AMBIENT: RefCell<Option<Rc<dyn Runner>>> = const { RefCell::new(None) };
}

/// Restores the previously installed runner when dropped.
#[must_use = "the runner is uninstalled when the guard is dropped"]
pub struct AmbientGuard {
	previous: Option<Rc<dyn Runner>>,
}

impl Drop for AmbientGuard {
	fn drop(&mut self) {
		let previous = self.previous.take();
		AMBIENT.with(|slot| *slot.borrow_mut() = previous);
	}
}

/// Installs `runner` as this thread's ambient runner.
pub fn install(runner: Rc<dyn Runner>) -> AmbientGuard {
	let previous = AMBIENT.with(|slot| slot.borrow_mut().replace(runner));
	AmbientGuard { previous }
}

/// Runs `f` with `runner` installed, restoring the previous one afterwards.
pub fn scoped<T>(runner: Rc<dyn Runner>, f: impl FnOnce() -> T) -> T {
	let _guard = install(runner);
	f()
}

/// The runner installed on this thread, if any.
pub fn current() -> Option<Rc<dyn Runner>> {
	AMBIENT.with(|slot| slot.borrow().clone())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn guards_restore_the_previous_runner() {
		let outer: Rc<dyn Runner> = Rc::new(Recorder::new());
		let inner: Rc<dyn Runner> = Rc::new(Recorder::new());
		assert!(current().is_none());

		let guard = install(outer.clone());
		scoped(inner.clone(), || {
			assert!(Rc::ptr_eq(&current().unwrap(), &inner));
		});
		assert!(Rc::ptr_eq(&current().unwrap(), &outer));

		drop(guard);
		assert!(current().is_none());
	}

	#[test]
	fn display_names() {
		assert_eq!(Terminal::Describe.to_string(), "describe");
		assert_eq!(Mode::Only.to_string(), "only");
		assert_eq!(Mode::default(), Mode::All);
	}
}
