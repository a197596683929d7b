//! Composition engine for reusable test-suite wrappers.
//!
//! A [`Wrapper`] accumulates named bundles of lifecycle hooks and, on a
//! terminal call (`describe`, `it`, `test`), declares one group on the
//! ambient [`Runner`] whose body registers those hooks around the caller's
//! block:
//!
//! ```ignore
//! let _guard = runner::install(Rc::new(Recorder::new()));
//! wrap()
//! 	.extend("with a db", Descriptor::new().before_all(connect).after_all(close))?
//! 	.call("with_global", [Value::from("LANG"), Value::from("C")])?
//! 	.it("reads rows", || -> anyhow::Result<()> { Ok(()) })?;
//! ```
//!
//! Plugins are named functions that contribute wrappers. Register them at
//! runtime with [`register`] or at compile time with [`plugin!`].

mod descriptor;
mod engine;
mod error;
mod handle;
mod hook;
mod instances;
mod macros;
mod plugin;
mod registry;
pub mod runner;
mod value;

pub use descriptor::{Descriptor, WrapperDef};
pub use engine::LABEL_PREFIX;
pub use error::WrapError;
pub use handle::{Wrapper, invoke, wrap};
pub use hook::{Action, BoxFuture, Hook, HookResult, LIFECYCLE_NAMES, Lifecycle};
pub use instances::{HandleId, live as live_handles};
pub use plugin::{
	PLUGIN_PREFIX, Plugin, PluginDef, PluginFn, PluginName, PluginOutput, PluginSource,
	check_with_name, text_arg,
};
pub use registry::{is_registered, lookup, register, registered_names, unregister};
pub use runner::{Mode, Runner, Terminal};
pub use value::{Table, Value};

#[doc(hidden)]
pub use inventory as __inventory;
#[doc(hidden)]
pub use paste as __paste;
