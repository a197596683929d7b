//! Shared helpers for suitewrap integration tests.

#![allow(dead_code)]

use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use suitewrap::runner::Recorder;
use tracing_subscriber::EnvFilter;

/// Ordered log of hook and case events.
pub type Log = Arc<Mutex<Vec<String>>>;

/// A fresh recorder. Enables log output under `RUST_LOG`.
pub fn recorder() -> Rc<Recorder> {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
	Rc::new(Recorder::new())
}

pub fn log() -> Log {
	Arc::default()
}

/// A hook body that appends `event` to `log`.
pub fn push(log: &Log, event: &str) -> impl Fn() + Send + Sync + 'static {
	let log = log.clone();
	let event = event.to_string();
	move || log.lock().push(event.clone())
}

pub fn events(log: &Log) -> Vec<String> {
	log.lock().clone()
}
