//! Declarative setup/teardown wrappers composed around test blocks.
//!
//! Build a [`Wrapper`] with [`wrap`], add named hook bundles with
//! [`Wrapper::extend`] or plugins, then close it with `describe`, `it` or
//! `test`. The composed group is declared on the [`Runner`] installed on the
//! current thread.
//!
//! The `builtins` feature (on by default) links the override plugins from
//! [`plugins`] into the registry.

pub use suitewrap_core::runner;
pub use suitewrap_core::{
	Action, BoxFuture, Descriptor, HandleId, Hook, HookResult, LABEL_PREFIX, LIFECYCLE_NAMES,
	Lifecycle, Mode, PLUGIN_PREFIX, Plugin, PluginDef, PluginFn, PluginName, PluginOutput,
	PluginSource, Runner, Table, Terminal, Value, WrapError, Wrapper, WrapperDef,
	check_with_name, invoke, is_registered, live_handles, lookup, plugin, register,
	registered_names, text_arg, unregister, wrap,
};
#[cfg(feature = "builtins")]
pub use suitewrap_plugins as plugins;
