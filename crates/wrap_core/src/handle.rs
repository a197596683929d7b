//! The public handle.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::descriptor::{Descriptor, WrapperDef};
use crate::engine::Block;
use crate::error::WrapError;
use crate::hook::Action;
use crate::instances::{self, HandleId};
use crate::plugin::{Plugin, PluginOutput, check_with_name};
use crate::registry;
use crate::runner::{self, Mode, Runner, Terminal};
use crate::value::Value;

/// Releases the engine once the last clone of a handle goes away.
struct HandleToken {
	id: HandleId,
}

impl Drop for HandleToken {
	fn drop(&mut self) {
		trace!(handle = %self.id, "releasing engine");
		instances::release(self.id);
	}
}

/// A composable set of suite wrappers.
///
/// Clones share one composition: `extend` on a clone is visible through every
/// other clone. Every operation returns the handle so calls chain:
///
/// ```ignore
/// wrap()
/// 	.extend("with a db", Descriptor::new().before_all(connect))?
/// 	.only()?
/// 	.it("reads rows", || Ok(()))?;
/// ```
#[derive(Clone)]
pub struct Wrapper {
	token: Arc<HandleToken>,
}

/// Creates an empty handle.
pub fn wrap() -> Wrapper {
	Wrapper::new()
}

impl Wrapper {
	pub fn new() -> Self {
		let id = instances::create();
		trace!(handle = %id, "created handle");
		Self {
			token: Arc::new(HandleToken { id }),
		}
	}

	pub fn id(&self) -> HandleId {
		self.token.id
	}

	/// Appends `descriptor` under `description`.
	///
	/// The descriptor is consumed by validation. Fails with
	/// [`WrapError::InvalidDescription`] on an empty description and with
	/// [`WrapError::InvalidHook`] when a lifecycle field is not hooks. A failed
	/// call leaves the composition untouched and `self` usable.
	pub fn extend(&self, description: &str, descriptor: Descriptor) -> Result<Self, WrapError> {
		if description.is_empty() {
			return Err(WrapError::InvalidDescription);
		}
		self.push(WrapperDef::new(description, descriptor)?)?;
		trace!(handle = %self.id(), description, "extended");
		Ok(self.clone())
	}

	/// Appends `description` alone: it joins the composed label and counts as
	/// a wrapper, but contributes no hooks.
	pub fn note(&self, description: &str) -> Result<Self, WrapError> {
		self.extend(description, Descriptor::new())
	}

	fn push(&self, def: WrapperDef) -> Result<(), WrapError> {
		instances::with_engine(self.id(), |engine| {
			engine.push(def);
			Ok(())
		})
	}

	/// Applies `plugin` with `args` and folds whatever it produced.
	pub fn use_plugin(
		&self,
		plugin: &Plugin,
		args: impl IntoIterator<Item = Value>,
	) -> Result<Self, WrapError> {
		check_with_name(plugin.name())?;
		let args: Vec<Value> = args.into_iter().collect();

		match plugin.apply(self, &args)? {
			PluginOutput::Descriptor(descriptor) => {
				let description = descriptor.description().unwrap_or_default().to_string();
				self.extend(&description, descriptor)
			}
			PluginOutput::Handle(_) => {
				trace!(handle = %self.id(), plugin = plugin.name(), "plugin applied itself");
				Ok(self.clone())
			}
			PluginOutput::Nothing => Ok(self.clone()),
		}
	}

	/// Applies the plugin registered under `name`.
	pub fn call(&self, name: &str, args: impl IntoIterator<Item = Value>) -> Result<Self, WrapError> {
		let plugin = registry::lookup(name)?;
		self.use_plugin(&plugin, args)
	}

	/// Marks the next composed group as exclusive.
	pub fn only(&self) -> Result<Self, WrapError> {
		self.set_mode(Mode::Only)
	}

	/// Marks the next composed group as skipped.
	pub fn skip(&self) -> Result<Self, WrapError> {
		self.set_mode(Mode::Skip)
	}

	fn set_mode(&self, mode: Mode) -> Result<Self, WrapError> {
		instances::with_engine(self.id(), |engine| {
			engine.set_mode(mode);
			Ok(())
		})?;
		trace!(handle = %self.id(), %mode, "mode set");
		Ok(self.clone())
	}

	pub fn mode(&self) -> Result<Mode, WrapError> {
		instances::with_engine(self.id(), |engine| Ok(engine.mode()))
	}

	/// Descriptions in accumulation order.
	pub fn descriptions(&self) -> Result<Vec<String>, WrapError> {
		instances::with_engine(self.id(), |engine| Ok(engine.descriptions()))
	}

	/// Declares a wrapped group around `body`.
	pub fn describe<F>(&self, message: &str, body: F) -> Result<(), WrapError>
	where
		F: FnOnce(&dyn Runner) + 'static,
	{
		self.terminal(message, Block::Describe(Box::new(body)))
	}

	/// Declares a wrapped case.
	pub fn it<F, R>(&self, message: &str, block: F) -> Result<(), WrapError>
	where
		F: FnOnce() -> R + 'static,
		R: Into<Action>,
	{
		self.terminal(message, Block::It(Box::new(move || block().into())))
	}

	/// Declares a wrapped case through the runner's `test` primitive.
	pub fn test<F, R>(&self, message: &str, block: F) -> Result<(), WrapError>
	where
		F: FnOnce() -> R + 'static,
		R: Into<Action>,
	{
		self.terminal(message, Block::Test(Box::new(move || block().into())))
	}

	fn terminal(&self, message: &str, block: Block) -> Result<(), WrapError> {
		let call = block.terminal();
		let composition = instances::with_engine(self.id(), |engine| engine.compose(call))?;
		let runner = runner::current().ok_or(WrapError::NoRunner { call })?;
		composition.emit(runner.as_ref(), message.to_string(), block);
		Ok(())
	}

	#[deprecated(note = "use `.only().it(..)`")]
	pub fn it_only<F>(&self, _message: &str, _block: F) -> Result<(), WrapError> {
		misplaced(Terminal::It, Mode::Only)
	}

	#[deprecated(note = "use `.skip().it(..)`")]
	pub fn it_skip<F>(&self, _message: &str, _block: F) -> Result<(), WrapError> {
		misplaced(Terminal::It, Mode::Skip)
	}

	#[deprecated(note = "use `.only().test(..)`")]
	pub fn test_only<F>(&self, _message: &str, _block: F) -> Result<(), WrapError> {
		misplaced(Terminal::Test, Mode::Only)
	}

	#[deprecated(note = "use `.skip().test(..)`")]
	pub fn test_skip<F>(&self, _message: &str, _block: F) -> Result<(), WrapError> {
		misplaced(Terminal::Test, Mode::Skip)
	}

	#[deprecated(note = "use `.only().describe(..)`")]
	pub fn describe_only<F>(&self, _message: &str, _body: F) -> Result<(), WrapError> {
		misplaced(Terminal::Describe, Mode::Only)
	}

	#[deprecated(note = "use `.skip().describe(..)`")]
	pub fn describe_skip<F>(&self, _message: &str, _body: F) -> Result<(), WrapError> {
		misplaced(Terminal::Describe, Mode::Skip)
	}
}

impl Default for Wrapper {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Wrapper {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Wrapper").field("id", &self.id()).finish()
	}
}

fn misplaced(call: Terminal, modifier: Mode) -> Result<(), WrapError> {
	Err(WrapError::MisplacedModifier { call, modifier })
}

/// Applies the registered plugin `name` to a dynamically typed receiver.
///
/// Fails with [`WrapError::InvalidReceiver`], naming the receiver's type,
/// unless `receiver` is a [`Wrapper`].
pub fn invoke<T: Any>(receiver: &T, name: &str, args: &[Value]) -> Result<Wrapper, WrapError> {
	let wrapper = (receiver as &dyn Any)
		.downcast_ref::<Wrapper>()
		.ok_or(WrapError::InvalidReceiver {
			found: std::any::type_name::<T>(),
		})?;
	wrapper.call(name, args.iter().cloned())
}
