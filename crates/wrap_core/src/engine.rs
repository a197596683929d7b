//! The private composition engine behind each handle.

use std::sync::Arc;

use tracing::debug;

use crate::descriptor::WrapperDef;
use crate::error::WrapError;
use crate::hook::Lifecycle;
use crate::runner::{CaseBody, GroupBody, Mode, Runner, Terminal};

/// Marker prefixed to every composed group label.
pub const LABEL_PREFIX: &str = "wrapped: ";

/// Accumulated state of one handle.
#[derive(Debug, Default)]
pub(crate) struct Engine {
	descriptors: Vec<Arc<WrapperDef>>,
	mode: Mode,
}

impl Engine {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn push(&mut self, def: WrapperDef) {
		self.descriptors.push(Arc::new(def));
	}

	pub(crate) fn mode(&self) -> Mode {
		self.mode
	}

	pub(crate) fn set_mode(&mut self, mode: Mode) {
		self.mode = mode;
	}

	pub(crate) fn descriptions(&self) -> Vec<String> {
		self.descriptors.iter().map(|d| d.description().to_string()).collect()
	}

	/// Snapshots the current state for a terminal call.
	pub(crate) fn compose(&self, call: Terminal) -> Result<Composition, WrapError> {
		if self.descriptors.is_empty() {
			return Err(WrapError::EmptyComposition { call });
		}
		Ok(Composition {
			descriptors: self.descriptors.clone(),
			mode: self.mode,
		})
	}
}

/// The user's block for a terminal call.
pub(crate) enum Block {
	Describe(GroupBody),
	It(CaseBody),
	Test(CaseBody),
}

impl Block {
	pub(crate) fn terminal(&self) -> Terminal {
		match self {
			Block::Describe(_) => Terminal::Describe,
			Block::It(_) => Terminal::It,
			Block::Test(_) => Terminal::Test,
		}
	}
}

/// An immutable snapshot of an engine, ready to be emitted.
pub(crate) struct Composition {
	descriptors: Vec<Arc<WrapperDef>>,
	mode: Mode,
}

impl Composition {
	/// `wrapped: <d1>; <d2>:`, descriptions in accumulation order.
	pub(crate) fn label(&self) -> String {
		let descriptions: Vec<&str> = self
			.descriptors
			.iter()
			.map(|d| d.description())
			.filter(|d| !d.is_empty())
			.collect();
		format!("{LABEL_PREFIX}{}:", descriptions.join("; "))
	}

	/// Declares one group on `runner` whose body wraps `block` in the
	/// accumulated hooks.
	pub(crate) fn emit(self, runner: &dyn Runner, message: String, block: Block) {
		let label = self.label();
		let Composition { descriptors, mode } = self;
		debug!(%label, %mode, call = %block.terminal(), case = %message, "emitting wrapped group");

		let body: GroupBody = Box::new(move |r: &dyn Runner| {
			register(r, &descriptors, Lifecycle::BeforeAll);
			register(r, &descriptors, Lifecycle::BeforeEach);
			match block {
				Block::Describe(body) => r.describe(&message, body),
				Block::It(case) => r.it(&message, case),
				Block::Test(case) => r.test(&message, case),
			}
			register(r, &descriptors, Lifecycle::AfterEach);
			// Teardown unwinds: the last wrapper added is torn down first.
			for def in descriptors.iter().rev() {
				for hook in def.hooks(Lifecycle::AfterAll) {
					r.hook(Lifecycle::AfterAll, hook.clone());
				}
			}
		});

		match mode {
			Mode::All => runner.describe(&label, body),
			Mode::Only => runner.describe_only(&label, body),
			Mode::Skip => runner.describe_skip(&label, body),
		}
	}
}

fn register(runner: &dyn Runner, descriptors: &[Arc<WrapperDef>], lifecycle: Lifecycle) {
	for def in descriptors {
		for hook in def.hooks(lifecycle) {
			runner.hook(lifecycle, hook.clone());
		}
	}
}
