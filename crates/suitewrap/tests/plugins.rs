//! Plugin registration, dispatch and the built-in override plugins.

#![cfg(feature = "builtins")]

mod common;

use common::{log, push, recorder};
use pretty_assertions::assert_eq;
use serial_test::serial;
use suitewrap::plugins::{BUILTIN_PLUGINS, globals};
use suitewrap::runner::{self, CaseStatus};
use suitewrap::{
	Descriptor, Plugin, PluginOutput, PluginSource, Table, Value, WrapError, Wrapper, invoke,
	is_registered, register, unregister, wrap,
};

fn with_foo() -> Plugin {
	Plugin::new("with_foo", |_, args: &[Value]| {
		let suffix = args.first().map(Value::to_string).unwrap_or_default();
		Ok(Descriptor::described(format!("foo{suffix}")))
	})
}

#[test]
#[serial]
fn register_call_unregister() {
	register(with_foo()).unwrap();
	assert_eq!(is_registered("with_foo"), Ok(true));

	let called = wrap().call("with_foo", [Value::Int(1)]).unwrap();
	let used = wrap().use_plugin(&with_foo(), [Value::Int(1)]).unwrap();
	assert_eq!(called.descriptions(), used.descriptions());
	assert_eq!(called.descriptions().unwrap(), ["foo1"]);

	unregister("with_foo").unwrap();
	assert_eq!(is_registered("with_foo"), Ok(false));
	assert_eq!(
		unregister("with_foo"),
		Err(WrapError::NotRegistered {
			name: "with_foo".into()
		})
	);
	assert!(matches!(
		wrap().call("with_foo", []),
		Err(WrapError::NotRegistered { .. })
	));
}

#[test]
#[serial]
fn registering_a_taken_name_is_a_no_op() {
	register(with_foo()).unwrap();
	register(Plugin::new("with_foo", |_, _| Ok(Descriptor::described("replacement")))).unwrap();

	let w = wrap().call("with_foo", []).unwrap();
	assert_eq!(w.descriptions().unwrap(), ["foo"]);

	unregister(&with_foo()).unwrap();
}

#[test]
#[serial]
fn plugins_returning_nothing_leave_the_composition_alone() {
	register(Plugin::new("with_nothing", |_, _| Ok(()))).unwrap();
	let w = wrap().extend("only this", Descriptor::new()).unwrap();

	let same = w.call("with_nothing", [Value::from("ignored")]).unwrap();
	assert_eq!(same.id(), w.id());
	assert_eq!(w.descriptions().unwrap(), ["only this"]);

	unregister("with_nothing").unwrap();
}

#[test]
fn names_must_follow_the_with_convention() {
	let foo = Plugin::new("foo", |_, _| Ok(Descriptor::described("foo")));
	let expected = WrapError::InvalidPluginName { name: "foo".into() };
	assert_eq!(register(foo.clone()), Err(expected.clone()));
	assert_eq!(wrap().use_plugin(&foo, []).unwrap_err(), expected);
	assert_eq!(unregister("with"), Err(WrapError::InvalidPluginName { name: "with".into() }));
}

#[test]
fn plugin_failures_propagate_unchanged() {
	let failing = Plugin::new("with_failure", |_, _| -> Result<PluginOutput, WrapError> {
		Err(WrapError::InvalidPluginArgs {
			plugin: "with_failure".into(),
			reason: "always".into(),
		})
	});
	let w = wrap();
	assert_eq!(
		w.use_plugin(&failing, []).unwrap_err(),
		WrapError::InvalidPluginArgs {
			plugin: "with_failure".into(),
			reason: "always".into(),
		}
	);
	assert!(w.descriptions().unwrap().is_empty());
}

#[test]
fn plugins_may_extend_the_handle_themselves() {
	let applied = Plugin::new("with_two_layers", |w: &Wrapper, _| {
		w.extend("layer one", Descriptor::new())?
			.extend("layer two", Descriptor::new())
	});
	let w = wrap().use_plugin(&applied, []).unwrap();
	assert_eq!(w.descriptions().unwrap(), ["layer one", "layer two"]);
}

#[test]
fn invoke_dispatches_on_wrappers_only() {
	let table = Table::new();
	let args = [Value::from(table), Value::from("k"), Value::Int(1)];
	let w = invoke(&wrap(), "with_override", &args).unwrap();
	assert_eq!(w.descriptions().unwrap(), ["with_override: k"]);

	let err = invoke(&"not a wrapper", "with_override", &args).unwrap_err();
	assert!(matches!(err, WrapError::InvalidReceiver { found } if found.contains("str")));
	assert!(err.to_string().ends_with(" must be a Wrapper"), "{err}");
}

#[test]
fn builtins_are_seeded() {
	for name in BUILTIN_PLUGINS {
		assert_eq!(is_registered(name), Ok(true), "{name}");
	}
	let plugin = suitewrap::lookup("with_global").unwrap();
	assert_eq!(plugin.source(), PluginSource::Crate("suitewrap-plugins"));
}

#[test]
fn override_patches_a_table_around_each_case() {
	let config: Table = [("level", "info")].into_iter().collect();
	let seen = log();
	let observe = {
		let (config, seen) = (config.clone(), seen.clone());
		move || seen.lock().push(config.get("level").map(|v| v.to_string()).unwrap_or_default())
	};

	let rec = recorder();
	runner::scoped(rec.clone(), || -> Result<(), WrapError> {
		let w = wrap().call(
			"with_override",
			[Value::from(config.clone()), Value::from("level"), Value::from("debug")],
		)?;
		w.it("first", observe.clone())?;
		w.it("second", observe)
	})
	.unwrap();

	assert_eq!(
		rec.declared().iter().map(|(_, l)| l.as_str()).collect::<Vec<_>>(),
		["wrapped: with_override: level:", "wrapped: with_override: level:"]
	);
	assert_eq!(rec.run().passed(), 2);
	assert_eq!(*seen.lock(), ["debug", "debug"]);
	assert_eq!(config.get("level"), Some(Value::from("info")));
}

#[test]
fn overrides_remove_keys_that_did_not_exist() {
	let env = Table::new();
	let overrides: Table = [("A", "1"), ("B", "2")].into_iter().collect();

	let rec = recorder();
	let inside = env.clone();
	runner::scoped(rec.clone(), || -> Result<(), WrapError> {
		wrap()
			.call("with_overrides", [Value::from(env.clone()), Value::from(overrides)])?
			.it("sees both", move || -> anyhow::Result<()> {
				anyhow::ensure!(inside.len() == 2, "expected two overrides, got {}", inside.len());
				Ok(())
			})
	})
	.unwrap();

	let report = rec.run();
	assert_eq!(report.cases()[0].path, ["wrapped: with_overrides: A, B:"]);
	assert_eq!(report.cases()[0].status, CaseStatus::Passed);
	assert!(env.is_empty());
}

#[test]
#[serial]
fn with_global_patches_the_process_table() {
	globals().insert("MODE", "prod");
	let log = log();

	let rec = recorder();
	let observed = log.clone();
	runner::scoped(rec.clone(), || -> Result<(), WrapError> {
		wrap()
			.extend("audit", Descriptor::new().after_each(push(&log, "after")))?
			.call("with_global", [Value::from("MODE"), Value::from("test")])?
			.it("reads the override", move || {
				let mode = globals().get("MODE").map(|v| v.to_string()).unwrap_or_default();
				observed.lock().push(mode);
			})
	})
	.unwrap();
	assert_eq!(rec.run().passed(), 1);

	assert_eq!(*log.lock(), ["test", "after"]);
	assert_eq!(globals().get("MODE"), Some(Value::from("prod")));
	globals().remove("MODE");
}
