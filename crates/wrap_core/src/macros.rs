//! Plugin declaration macro.

/// Define a plugin and submit it to the process-wide registry.
///
/// The body evaluates to `Result<T, WrapError>` where `T` converts into a
/// [`PluginOutput`](crate::PluginOutput). A `pub const` named after the plugin
/// in upper case is generated alongside, for [`Wrapper::use_plugin`] and
/// [`unregister`](crate::unregister).
///
/// # Example
///
/// ```ignore
/// plugin!(with_retries, "Retry flaky cases", |_wrapper, args| {
/// 	let count = args.first().and_then(Value::as_int).unwrap_or(3);
/// 	Ok(Descriptor::described(format!("with {count} retries")))
/// });
/// ```
///
/// [`Wrapper::use_plugin`]: crate::Wrapper::use_plugin
#[macro_export]
macro_rules! plugin {
	($name:ident, $desc:expr, |$wrapper:pat_param, $args:pat_param| $body:expr) => {
		$crate::__paste::paste! {
			fn [<plugin_fn_ $name>](
				$wrapper: &$crate::Wrapper,
				$args: &[$crate::Value],
			) -> ::core::result::Result<$crate::PluginOutput, $crate::WrapError> {
				let result: ::core::result::Result<_, $crate::WrapError> = { $body };
				result.map(::core::convert::Into::into)
			}

			#[allow(dead_code)]
			pub const [<$name:upper>]: $crate::PluginDef = $crate::PluginDef::new(
				stringify!($name),
				$desc,
				[<plugin_fn_ $name>],
				$crate::PluginSource::Crate(env!("CARGO_PKG_NAME")),
			);

			$crate::__inventory::submit! {
				$crate::PluginDef::new(
					stringify!($name),
					$desc,
					[<plugin_fn_ $name>],
					$crate::PluginSource::Crate(env!("CARGO_PKG_NAME")),
				)
			}
		}
	};
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use crate::{Descriptor, PluginSource, Value, WrapError, is_registered, text_arg, wrap};

	crate::plugin!(with_macro_sample, "Sample plugin for the macro", |_, args| {
		let label = text_arg("with_macro_sample", args, 0)?;
		Ok(Descriptor::described(format!("sample {label}")))
	});

	#[test]
	fn declared_plugins_are_seeded() {
		assert_eq!(is_registered("with_macro_sample"), Ok(true));
		assert_eq!(WITH_MACRO_SAMPLE.name, "with_macro_sample");
		assert_eq!(WITH_MACRO_SAMPLE.source, PluginSource::Crate("suitewrap-core"));

		let w = wrap().call("with_macro_sample", [Value::from("a")]).unwrap();
		assert_eq!(w.descriptions().unwrap(), ["sample a"]);
		assert!(matches!(
			wrap().call("with_macro_sample", []),
			Err(WrapError::InvalidPluginArgs { .. })
		));
	}
}
