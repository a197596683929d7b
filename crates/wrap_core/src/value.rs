//! Dynamically typed values carried by descriptors and plugin arguments.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::hook::Hook;

/// A descriptor field or plugin argument.
#[derive(Debug, Clone, Default)]
pub enum Value {
	/// Absent value.
	#[default]
	Null,
	/// Boolean value.
	Bool(bool),
	/// Integer value.
	Int(i64),
	/// Text value.
	Text(String),
	/// Ordered list of values.
	List(Vec<Value>),
	/// Zero-argument lifecycle callable.
	Hook(Hook),
	/// Shared mutable table.
	Table(Table),
}

impl Value {
	/// Returns the boolean value if this is a `Bool` variant.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the integer value if this is an `Int` variant.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the text if this is a `Text` variant.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Text(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the hook if this is a `Hook` variant.
	pub fn as_hook(&self) -> Option<&Hook> {
		match self {
			Value::Hook(h) => Some(h),
			_ => None,
		}
	}

	/// Returns the table if this is a `Table` variant.
	pub fn as_table(&self) -> Option<&Table> {
		match self {
			Value::Table(t) => Some(t),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Returns the type name of this value.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Text(_) => "text",
			Value::List(_) => "list",
			Value::Hook(_) => "hook",
			Value::Table(_) => "table",
		}
	}
}

/// Hooks and tables compare by identity.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Text(a), Value::Text(b)) => a == b,
			(Value::List(a), Value::List(b)) => a == b,
			(Value::Hook(a), Value::Hook(b)) => a.ptr_eq(b),
			(Value::Table(a), Value::Table(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Bool(v) => write!(f, "{v}"),
			Value::Int(v) => write!(f, "{v}"),
			Value::Text(v) => f.write_str(v),
			Value::List(items) => {
				f.write_str("[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
			Value::Hook(_) => f.write_str("[hook]"),
			Value::Table(t) => write!(f, "[table of {}]", t.len()),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(v.into())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Text(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Text(v.to_string())
	}
}

impl From<Hook> for Value {
	fn from(v: Hook) -> Self {
		Value::Hook(v)
	}
}

impl From<Table> for Value {
	fn from(v: Table) -> Self {
		Value::Table(v)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(v: Vec<T>) -> Self {
		Value::List(v.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map_or(Value::Null, Into::into)
	}
}

/// Shared, insertion-ordered table of values.
///
/// Clones share storage. This is the target type override plugins patch
/// and restore around each case.
#[derive(Clone, Default)]
pub struct Table {
	inner: Arc<Mutex<IndexMap<String, Value>>>,
}

impl Table {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<Value> {
		self.inner.lock().get(key).cloned()
	}

	/// Stores `value` under `key`, returning the previous value.
	pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.inner.lock().insert(key.into(), value.into())
	}

	/// Removes `key`, preserving the order of the remaining entries.
	pub fn remove(&self, key: &str) -> Option<Value> {
		self.inner.lock().shift_remove(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.inner.lock().contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.inner.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.lock().is_empty()
	}

	/// Snapshot of all entries in insertion order.
	pub fn entries(&self) -> Vec<(String, Value)> {
		self.inner
			.lock()
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	pub fn ptr_eq(&self, other: &Table) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Table {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.entries()).finish()
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Table {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let map = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
		Self {
			inner: Arc::new(Mutex::new(map)),
		}
	}
}
