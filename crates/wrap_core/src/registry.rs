//! Process-wide plugin registry.
//!
//! # Purpose
//!
//! Let third parties extend the vocabulary of every [`Wrapper`](crate::Wrapper)
//! without touching the handle type: a registered plugin becomes callable by
//! name through [`Wrapper::call`](crate::Wrapper::call).
//!
//! # Mental model
//!
//! * The registry is a capability table: name to [`Plugin`].
//! * `handle.call(name, args)` is exactly `handle.use_plugin(&plugin, args)`
//!   for the plugin registered under `name`.
//! * Plugins declared with [`plugin!`](crate::plugin!) are submitted through
//!   `inventory` and seeded into the table on first access.
//!
//! # Invariants
//!
//! * Every name in the table satisfies [`check_with_name`].
//! * Registration is idempotent by name, not by function identity. Registering
//!   a second plugin under a taken name is a silent no-op.
//! * Removing a name that is not registered fails with
//!   [`WrapError::NotRegistered`].
//!
//! # Concurrency & ordering
//!
//! * The table sits behind a `parking_lot::RwLock`. The lock is never held
//!   while a plugin runs; lookups clone the [`Plugin`] out first.

use std::sync::LazyLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, trace, warn};

use crate::error::WrapError;
use crate::plugin::{Plugin, PluginDef, PluginName, check_with_name};

static PLUGINS: LazyLock<RwLock<HashMap<Box<str>, Plugin>>> = LazyLock::new(|| {
	let mut table = HashMap::default();
	for def in inventory::iter::<PluginDef> {
		if let Err(err) = check_with_name(def.name) {
			warn!(plugin = def.name, source = %def.source, %err, "skipping submitted plugin");
			continue;
		}
		if table.contains_key(def.name) {
			trace!(plugin = def.name, source = %def.source, "duplicate submitted plugin ignored");
			continue;
		}
		debug!(plugin = def.name, source = %def.source, "seeding plugin");
		table.insert(def.name.into(), Plugin::from(def));
	}
	RwLock::new(table)
});

/// Registers `plugin` under its name.
///
/// A name that is already registered is left untouched and `Ok(())` is
/// returned, so repeated setup code is harmless.
pub fn register(plugin: impl Into<Plugin>) -> Result<(), WrapError> {
	let plugin = plugin.into();
	check_with_name(plugin.name())?;

	let mut table = PLUGINS.write();
	if table.contains_key(plugin.name()) {
		trace!(plugin = plugin.name(), "already registered");
		return Ok(());
	}
	debug!(plugin = plugin.name(), source = %plugin.source(), "registering plugin");
	table.insert(plugin.name().into(), plugin);
	Ok(())
}

/// Removes the plugin registered under `target`'s name.
pub fn unregister<K: PluginName + ?Sized>(target: &K) -> Result<(), WrapError> {
	let name = target.plugin_name();
	check_with_name(name)?;

	match PLUGINS.write().remove(name) {
		Some(_) => {
			debug!(plugin = name, "unregistered plugin");
			Ok(())
		}
		None => Err(WrapError::NotRegistered {
			name: name.to_string(),
		}),
	}
}

/// Whether a plugin is registered under `name`. Fails on malformed names.
pub fn is_registered(name: &str) -> Result<bool, WrapError> {
	check_with_name(name)?;
	Ok(PLUGINS.read().contains_key(name))
}

/// The plugin registered under `name`.
pub fn lookup(name: &str) -> Result<Plugin, WrapError> {
	check_with_name(name)?;
	PLUGINS
		.read()
		.get(name)
		.cloned()
		.ok_or_else(|| WrapError::NotRegistered {
			name: name.to_string(),
		})
}

/// Registered names, sorted.
pub fn registered_names() -> Vec<String> {
	let mut names: Vec<String> = PLUGINS.read().keys().map(|k| k.to_string()).collect();
	names.sort();
	names
}
