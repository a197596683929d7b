use crate::hook::Lifecycle;
use crate::instances::HandleId;
use crate::runner::{Mode, Terminal};

/// Misuse of the wrapper API.
///
/// Every variant is raised synchronously to the caller of the operation that
/// triggered it. Nothing is stored when an operation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WrapError {
	/// A dynamic receiver was not a [`Wrapper`](crate::Wrapper).
	#[error("{found} must be a Wrapper")]
	InvalidReceiver { found: &'static str },

	/// `extend` was given an empty or missing description.
	#[error("a non-empty description string is required")]
	InvalidDescription,

	/// A lifecycle field held something other than hooks.
	#[error("wrapper method \"{value}\" must be a hook, or list of hooks, if present ({lifecycle})")]
	InvalidHook { lifecycle: Lifecycle, value: String },

	/// A plugin name does not follow the `with<Name>` convention.
	#[error("plugin name {name:?} must start with \"with\" followed by a name")]
	InvalidPluginName { name: String },

	/// A plugin rejected the arguments it was applied with.
	#[error("{plugin}: {reason}")]
	InvalidPluginArgs { plugin: String, reason: String },

	/// A terminal call was made before any wrapper was added.
	#[error("`{call}` called with no wrappers defined")]
	EmptyComposition { call: Terminal },

	/// The named plugin is not in the registry.
	#[error("plugin {name:?} is not registered")]
	NotRegistered { name: String },

	/// `it.only`-style modifiers used instead of the handle-level chain.
	#[error("suitewrap requires `.{modifier}().{call}(..)` rather than `{call}_{modifier}`")]
	MisplacedModifier { call: Terminal, modifier: Mode },

	/// No runner was installed on this thread when a terminal call executed.
	#[error("`{call}` called with no ambient runner installed")]
	NoRunner { call: Terminal },

	/// A live handle without an engine. Indicates a construction bug.
	#[error("internal error: no engine for handle {id}")]
	MissingEngine { id: HandleId },
}
