//! Process-wide table of composition engines, keyed by handle id.
//!
//! A [`Wrapper`](crate::Wrapper) holds only its [`HandleId`]. The engine it
//! drives lives here, so nothing reachable from the handle can be mutated
//! except through the handle's operations.

use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;

use crate::engine::Engine;
use crate::error::WrapError;

/// Opaque identity of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

static INSTANCES: LazyLock<Mutex<HashMap<HandleId, Engine>>> =
	LazyLock::new(|| Mutex::new(HashMap::default()));

/// Creates a fresh engine and returns the id that addresses it.
pub(crate) fn create() -> HandleId {
	let id = HandleId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
	INSTANCES.lock().insert(id, Engine::new());
	id
}

/// Removes the engine for `id`.
pub(crate) fn release(id: HandleId) {
	// Hooks may own other handles; drop the engine after unlocking.
	let engine = INSTANCES.lock().remove(&id);
	drop(engine);
}

/// Runs `f` against the engine for `id`.
///
/// The table lock is held for the duration of `f`, so `f` must not call back
/// into user code.
pub(crate) fn with_engine<T>(
	id: HandleId,
	f: impl FnOnce(&mut Engine) -> Result<T, WrapError>,
) -> Result<T, WrapError> {
	let mut instances = INSTANCES.lock();
	let engine = instances.get_mut(&id).ok_or(WrapError::MissingEngine { id })?;
	f(engine)
}

/// Number of live engines.
pub fn live() -> usize {
	INSTANCES.lock().len()
}
