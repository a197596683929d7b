//! Built-in suitewrap plugins.
//!
//! Linking this crate submits `with_override`, `with_overrides` and
//! `with_global` to the plugin registry, so they are callable by name on any
//! [`Wrapper`](suitewrap_core::Wrapper).

mod globals;
mod overrides;

pub use globals::globals;
pub use overrides::{WITH_GLOBAL, WITH_OVERRIDE, WITH_OVERRIDES, override_descriptor};

/// Names of the plugins this crate submits.
pub const BUILTIN_PLUGINS: &[&str] = &["with_override", "with_overrides", "with_global"];
