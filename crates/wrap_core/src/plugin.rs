use std::fmt;
use std::sync::Arc;

use crate::descriptor::Descriptor;
use crate::error::WrapError;
use crate::handle::Wrapper;
use crate::value::Value;

/// Prefix every plugin name must start with.
pub const PLUGIN_PREFIX: &str = "with";

/// Signature of a static plugin.
pub type PluginFn = fn(&Wrapper, &[Value]) -> Result<PluginOutput, WrapError>;

type DynPluginFn = dyn Fn(&Wrapper, &[Value]) -> Result<PluginOutput, WrapError> + Send + Sync;

/// Where a plugin was defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginSource {
	/// Submitted at compile time from a library crate.
	Crate(&'static str),
	/// Constructed at runtime.
	Runtime,
}

impl fmt::Display for PluginSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Crate(name) => write!(f, "crate:{name}"),
			Self::Runtime => write!(f, "runtime"),
		}
	}
}

/// What applying a plugin produced.
pub enum PluginOutput {
	/// A descriptor to fold into the composition. It must carry a description.
	Descriptor(Descriptor),
	/// The plugin already applied itself to a handle.
	Handle(Wrapper),
	/// Nothing to fold.
	Nothing,
}

impl From<Descriptor> for PluginOutput {
	fn from(descriptor: Descriptor) -> Self {
		PluginOutput::Descriptor(descriptor)
	}
}

impl From<Wrapper> for PluginOutput {
	fn from(wrapper: Wrapper) -> Self {
		PluginOutput::Handle(wrapper)
	}
}

impl From<()> for PluginOutput {
	fn from(_: ()) -> Self {
		PluginOutput::Nothing
	}
}

/// A plugin declared at compile time and collected through `inventory`.
///
/// Use the [`plugin!`](crate::plugin!) macro rather than building one by hand.
pub struct PluginDef {
	pub name: &'static str,
	pub description: &'static str,
	pub apply: PluginFn,
	pub source: PluginSource,
}

inventory::collect!(PluginDef);

impl PluginDef {
	pub const fn new(
		name: &'static str,
		description: &'static str,
		apply: PluginFn,
		source: PluginSource,
	) -> Self {
		Self {
			name,
			description,
			apply,
			source,
		}
	}
}

impl fmt::Debug for PluginDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginDef")
			.field("name", &self.name)
			.field("description", &self.description)
			.field("source", &self.source)
			.finish()
	}
}

/// A named function that contributes a wrapper to a handle.
///
/// Cheap to clone. The name is the plugin's identity for registration.
#[derive(Clone)]
pub struct Plugin {
	name: Arc<str>,
	source: PluginSource,
	apply: Arc<DynPluginFn>,
}

impl Plugin {
	/// A runtime plugin. The name is checked when the plugin is used or
	/// registered, not here.
	pub fn new<F, R>(name: impl Into<Arc<str>>, apply: F) -> Self
	where
		F: Fn(&Wrapper, &[Value]) -> Result<R, WrapError> + Send + Sync + 'static,
		R: Into<PluginOutput>,
	{
		Self {
			name: name.into(),
			source: PluginSource::Runtime,
			apply: Arc::new(move |wrapper: &Wrapper, args: &[Value]| {
				apply(wrapper, args).map(Into::into)
			}),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn source(&self) -> PluginSource {
		self.source
	}

	pub(crate) fn apply(&self, wrapper: &Wrapper, args: &[Value]) -> Result<PluginOutput, WrapError> {
		(self.apply)(wrapper, args)
	}
}

impl From<&PluginDef> for Plugin {
	fn from(def: &PluginDef) -> Self {
		let apply = def.apply;
		Self {
			name: def.name.into(),
			source: def.source,
			apply: Arc::new(apply),
		}
	}
}

impl fmt::Debug for Plugin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Plugin")
			.field("name", &self.name)
			.field("source", &self.source)
			.finish()
	}
}

/// Anything that identifies a plugin by name.
pub trait PluginName {
	fn plugin_name(&self) -> &str;
}

impl PluginName for str {
	fn plugin_name(&self) -> &str {
		self
	}
}

impl PluginName for String {
	fn plugin_name(&self) -> &str {
		self
	}
}

impl PluginName for Plugin {
	fn plugin_name(&self) -> &str {
		self.name()
	}
}

impl PluginName for PluginDef {
	fn plugin_name(&self) -> &str {
		self.name
	}
}

/// Checks the `with<Name>` convention: the prefix plus at least one character.
pub fn check_with_name(name: &str) -> Result<(), WrapError> {
	match name.strip_prefix(PLUGIN_PREFIX) {
		Some(rest) if !rest.is_empty() => Ok(()),
		_ => Err(WrapError::InvalidPluginName {
			name: name.to_string(),
		}),
	}
}

/// Pulls a text argument out of a plugin's argument list.
pub fn text_arg<'a>(plugin: &str, args: &'a [Value], index: usize) -> Result<&'a str, WrapError> {
	args.get(index)
		.and_then(Value::as_str)
		.ok_or_else(|| WrapError::InvalidPluginArgs {
			plugin: plugin.to_string(),
			reason: format!("argument {index} must be text"),
		})
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("with_retries", true)]
	#[case("withRetries", true)]
	#[case("with_", true)]
	#[case("with", false)]
	#[case("foo", false)]
	#[case("", false)]
	#[case("With_retries", false)]
	fn with_name_convention(#[case] name: &str, #[case] valid: bool) {
		assert_eq!(check_with_name(name).is_ok(), valid, "{name:?}");
	}

	#[test]
	fn text_arg_reports_position() {
		let args = [Value::from("key"), Value::Int(1)];
		assert_eq!(text_arg("with_x", &args, 0), Ok("key"));
		assert_eq!(
			text_arg("with_x", &args, 1),
			Err(WrapError::InvalidPluginArgs {
				plugin: "with_x".into(),
				reason: "argument 1 must be text".into(),
			})
		);
		assert!(text_arg("with_x", &args, 2).is_err());
	}

	#[test]
	fn names_resolve_through_every_identifier() {
		let plugin = Plugin::new("with_anything", |_, _| Ok(()));
		assert_eq!(plugin.plugin_name(), "with_anything");
		assert_eq!("with_anything".plugin_name(), "with_anything");
		assert_eq!(plugin.source(), PluginSource::Runtime);
	}
}
