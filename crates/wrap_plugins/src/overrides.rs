//! Override plugins: patch table entries before each case, restore after.

use std::sync::Arc;

use parking_lot::Mutex;
use suitewrap_core::{Descriptor, Table, Value, WrapError, plugin, text_arg};
use tracing::trace;

use crate::globals::globals;

/// Entries displaced by the last `before_each`, as `(key, previous)`.
type Saved = Arc<Mutex<Vec<(String, Option<Value>)>>>;

/// Builds a descriptor that sets `entries` on `target` around every case.
///
/// Keys absent before the override are removed again on restore.
pub fn override_descriptor(
	description: String,
	target: Table,
	entries: Vec<(String, Value)>,
) -> Descriptor {
	let saved: Saved = Arc::default();
	let (apply_saved, restore_saved) = (saved.clone(), saved);
	let (apply_target, restore_target) = (target.clone(), target);

	Descriptor::described(description)
		.before_each(move || {
			let mut saved = apply_saved.lock();
			saved.clear();
			for (key, value) in &entries {
				let previous = apply_target.insert(key.clone(), value.clone());
				trace!(%key, had_previous = previous.is_some(), "override applied");
				saved.push((key.clone(), previous));
			}
		})
		.after_each(move || {
			let mut saved = restore_saved.lock();
			for (key, previous) in saved.drain(..).rev() {
				match previous {
					Some(value) => {
						restore_target.insert(key, value);
					}
					None => {
						restore_target.remove(&key);
					}
				}
			}
		})
}

fn table_arg(plugin: &str, args: &[Value], index: usize) -> Result<Table, WrapError> {
	args.get(index)
		.and_then(Value::as_table)
		.cloned()
		.ok_or_else(|| WrapError::InvalidPluginArgs {
			plugin: plugin.to_string(),
			reason: format!("argument {index} must be a table"),
		})
}

plugin!(
	with_override,
	"Override one table entry around each case",
	|_, args| {
		let target = table_arg("with_override", args, 0)?;
		let key = text_arg("with_override", args, 1)?;
		let value = args.get(2).cloned().unwrap_or_default();
		Ok(override_descriptor(
			format!("with_override: {key}"),
			target,
			vec![(key.to_string(), value)],
		))
	}
);

plugin!(
	with_overrides,
	"Override every entry of a table around each case",
	|_, args| {
		let target = table_arg("with_overrides", args, 0)?;
		let overrides = table_arg("with_overrides", args, 1)?;
		let entries = overrides.entries();
		if entries.is_empty() {
			return Err(WrapError::InvalidPluginArgs {
				plugin: "with_overrides".into(),
				reason: "no overrides given".into(),
			});
		}
		let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
		let description = format!("with_overrides: {}", keys.join(", "));
		Ok(override_descriptor(description, target, entries))
	}
);

plugin!(
	with_global,
	"Override a process-wide global around each case",
	|_, args| {
		let key = text_arg("with_global", args, 0)?;
		let value = args.get(1).cloned().unwrap_or_default();
		Ok(override_descriptor(
			format!("with_global: {key}"),
			globals(),
			vec![(key.to_string(), value)],
		))
	}
);
