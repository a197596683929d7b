//! Wrapper descriptors and their validation.
//!
//! A [`Descriptor`] is the loosely typed input a caller or plugin builds. It is
//! consumed by validation and turned into a [`WrapperDef`], the immutable form
//! the engine stores.

use indexmap::IndexMap;

use crate::error::WrapError;
use crate::hook::{Action, Hook, Lifecycle};
use crate::value::Value;

/// A named bundle of lifecycle hooks, prior to validation.
///
/// Hook fields are keyed by the names in
/// [`LIFECYCLE_NAMES`](crate::LIFECYCLE_NAMES). Each may hold a single hook or
/// a list of hooks. Any other field is kept as metadata.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
	description: Option<String>,
	fields: IndexMap<String, Value>,
}

impl Descriptor {
	pub fn new() -> Self {
		Self::default()
	}

	/// A descriptor carrying its own description, as plugins return them.
	pub fn described(description: impl Into<String>) -> Self {
		Self {
			description: Some(description.into()),
			fields: IndexMap::new(),
		}
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Appends a hook to the given lifecycle field.
	pub fn hook<F, R>(mut self, lifecycle: Lifecycle, f: F) -> Self
	where
		F: Fn() -> R + Send + Sync + 'static,
		R: Into<Action>,
	{
		let hook = Value::Hook(Hook::new(f));
		match self.fields.shift_remove(lifecycle.as_str()) {
			None => {
				self.fields.insert(lifecycle.as_str().to_string(), hook);
			}
			Some(Value::List(mut items)) => {
				items.push(hook);
				self.fields.insert(lifecycle.as_str().to_string(), Value::List(items));
			}
			Some(existing) => {
				self.fields
					.insert(lifecycle.as_str().to_string(), Value::List(vec![existing, hook]));
			}
		}
		self
	}

	pub fn before_all<F, R>(self, f: F) -> Self
	where
		F: Fn() -> R + Send + Sync + 'static,
		R: Into<Action>,
	{
		self.hook(Lifecycle::BeforeAll, f)
	}

	pub fn before_each<F, R>(self, f: F) -> Self
	where
		F: Fn() -> R + Send + Sync + 'static,
		R: Into<Action>,
	{
		self.hook(Lifecycle::BeforeEach, f)
	}

	pub fn after_each<F, R>(self, f: F) -> Self
	where
		F: Fn() -> R + Send + Sync + 'static,
		R: Into<Action>,
	{
		self.hook(Lifecycle::AfterEach, f)
	}

	pub fn after_all<F, R>(self, f: F) -> Self
	where
		F: Fn() -> R + Send + Sync + 'static,
		R: Into<Action>,
	{
		self.hook(Lifecycle::AfterAll, f)
	}

	/// Sets a raw field, replacing any previous value.
	///
	/// Lifecycle fields set this way are checked by validation.
	pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.fields.insert(name.into(), value.into());
		self
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.get(name)
	}
}

/// A validated descriptor, as stored by the engine.
#[derive(Debug, Clone)]
pub struct WrapperDef {
	description: String,
	hooks: [Vec<Hook>; 4],
	metadata: IndexMap<String, Value>,
}

impl WrapperDef {
	/// Validates `descriptor` and attaches `description` to it.
	///
	/// The descriptor's own description, if any, is replaced.
	pub fn new(description: impl Into<String>, descriptor: Descriptor) -> Result<Self, WrapError> {
		let (hooks, metadata) = normalize(descriptor.fields)?;
		Ok(Self {
			description: description.into(),
			hooks,
			metadata,
		})
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	/// Hooks for one lifecycle, in declaration order.
	pub fn hooks(&self, lifecycle: Lifecycle) -> &[Hook] {
		&self.hooks[lifecycle.index()]
	}

	/// Non-lifecycle fields, untouched by validation.
	pub fn metadata(&self) -> &IndexMap<String, Value> {
		&self.metadata
	}
}

type Normalized = ([Vec<Hook>; 4], IndexMap<String, Value>);

/// Splits raw fields into per-lifecycle hook lists and passthrough metadata.
///
/// A single value in a lifecycle field is treated as a one-element list.
/// Every element must be a hook.
fn normalize(mut fields: IndexMap<String, Value>) -> Result<Normalized, WrapError> {
	let mut hooks: [Vec<Hook>; 4] = Default::default();

	for lifecycle in Lifecycle::ALL {
		let Some(value) = fields.shift_remove(lifecycle.as_str()) else {
			continue;
		};
		let items = match value {
			Value::List(items) => items,
			single => vec![single],
		};
		let slot = &mut hooks[lifecycle.index()];
		for item in items {
			match item {
				Value::Hook(hook) => slot.push(hook),
				other => {
					return Err(WrapError::InvalidHook {
						lifecycle,
						value: other.to_string(),
					});
				}
			}
		}
	}

	Ok((hooks, fields))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[test]
	fn single_hook_becomes_one_element_list() {
		let def = WrapperDef::new("single", Descriptor::new().before_each(|| ())).unwrap();
		assert_eq!(def.hooks(Lifecycle::BeforeEach).len(), 1);
		assert!(def.hooks(Lifecycle::BeforeAll).is_empty());
	}

	#[test]
	fn repeated_builder_calls_accumulate_in_order() {
		let first = Hook::new(|| ());
		let descriptor = Descriptor::new()
			.set("after_all", first.clone())
			.set("after_all", Value::List(vec![first.clone().into()]))
			.hook(Lifecycle::AfterAll, || ());
		let def = WrapperDef::new("ordered", descriptor.set("x", 1)).unwrap();

		let hooks = def.hooks(Lifecycle::AfterAll);
		assert_eq!(hooks.len(), 2);
		assert!(hooks[0].ptr_eq(&first));
		assert!(!hooks[1].ptr_eq(&first));
	}

	#[test]
	fn builder_promotes_raw_single_hook_to_list() {
		let raw = Hook::new(|| ());
		let descriptor = Descriptor::new().set("before_all", raw.clone()).before_all(|| ());
		assert!(matches!(descriptor.get("before_all"), Some(Value::List(items)) if items.len() == 2));

		let def = WrapperDef::new("promoted", descriptor).unwrap();
		assert!(def.hooks(Lifecycle::BeforeAll)[0].ptr_eq(&raw));
	}

	#[rstest]
	#[case::integer("before_each", Value::Int(123), "123")]
	#[case::text("after_all", Value::from("teardown"), "teardown")]
	#[case::null("before_all", Value::Null, "null")]
	#[case::nested_list("after_each", Value::List(vec![Value::List(vec![])]), "[]")]
	fn non_hook_values_are_rejected(#[case] field: &str, #[case] value: Value, #[case] rendered: &str) {
		let err = WrapperDef::new("bad", Descriptor::new().set(field, value)).unwrap_err();
		assert_eq!(
			err,
			WrapError::InvalidHook {
				lifecycle: Lifecycle::from_name(field).unwrap(),
				value: rendered.to_string(),
			}
		);
		assert!(err.to_string().contains(rendered));
	}

	#[test]
	fn one_bad_element_rejects_the_whole_list() {
		let descriptor = Descriptor::new().set(
			"before_each",
			Value::List(vec![Hook::new(|| ()).into(), Value::Bool(true)]),
		);
		assert!(matches!(
			WrapperDef::new("mixed", descriptor),
			Err(WrapError::InvalidHook { lifecycle: Lifecycle::BeforeEach, .. })
		));
	}

	#[test]
	fn unrecognized_fields_pass_through_as_metadata() {
		let descriptor = Descriptor::described("ignored")
			.set("beforeEach", 5)
			.set("timeout_ms", 250)
			.after_each(|| ());
		let def = WrapperDef::new("kept", descriptor).unwrap();

		assert_eq!(def.description(), "kept");
		let keys: Vec<_> = def.metadata().keys().map(String::as_str).collect();
		assert_eq!(keys, ["beforeEach", "timeout_ms"]);
		assert_eq!(def.metadata()["timeout_ms"], Value::Int(250));
	}
}
