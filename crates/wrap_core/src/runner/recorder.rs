//! In-memory [`Runner`] that records declarations and replays them.
//!
//! Group bodies run immediately while declaring, the way collection works in
//! most runners. [`Recorder::run`] then executes the recorded tree: `before_all`
//! once per group, `before_each` outer to inner around every case,
//! `after_each` inner to outer, `after_all` once per group. Hooks of one kind
//! run in registration order. If any group was declared with
//! [`Mode::Only`], cases outside such groups are skipped.

use std::cell::RefCell;

use tracing::{debug, trace};

use super::{CaseBody, GroupBody, Mode, Runner};
use crate::hook::{Action, Hook, Lifecycle};

enum Node {
	Group(Group),
	Hook(Lifecycle, Hook),
	Case(String, CaseBody),
}

struct Group {
	mode: Mode,
	label: String,
	nodes: Vec<Node>,
}

/// Records groups, hooks and cases declared through the [`Runner`] trait.
pub struct Recorder {
	stack: RefCell<Vec<Group>>,
}

impl Default for Recorder {
	fn default() -> Self {
		Self::new()
	}
}

impl Recorder {
	pub fn new() -> Self {
		Self {
			stack: RefCell::new(vec![Group {
				mode: Mode::All,
				label: String::new(),
				nodes: Vec::new(),
			}]),
		}
	}

	fn push(&self, node: Node) {
		let mut stack = self.stack.borrow_mut();
		if let Some(top) = stack.last_mut() {
			top.nodes.push(node);
		}
	}

	fn group(&self, mode: Mode, label: &str, body: GroupBody) {
		trace!(%mode, label, "declaring group");
		self.stack.borrow_mut().push(Group {
			mode,
			label: label.to_string(),
			nodes: Vec::new(),
		});
		body(self);
		let group = self.stack.borrow_mut().pop();
		if let Some(group) = group {
			self.push(Node::Group(group));
		}
	}

	/// Labels and modes of the top-level groups declared so far.
	pub fn declared(&self) -> Vec<(Mode, String)> {
		let stack = self.stack.borrow();
		stack
			.first()
			.map(|root| {
				root.nodes
					.iter()
					.filter_map(|node| match node {
						Node::Group(g) => Some((g.mode, g.label.clone())),
						_ => None,
					})
					.collect()
			})
			.unwrap_or_default()
	}

	/// Executes everything declared so far and clears the recording.
	pub fn run(&self) -> RunReport {
		let nodes = {
			let mut stack = self.stack.borrow_mut();
			stack.first_mut().map(|root| std::mem::take(&mut root.nodes)).unwrap_or_default()
		};
		let root = Group {
			mode: Mode::All,
			label: String::new(),
			nodes,
		};
		let scope = Scope {
			only_active: contains_only(&root.nodes),
			..Scope::default()
		};
		let report = execute(root, scope, &mut Vec::new(), &mut Vec::new());
		debug!(
			passed = report.count(CaseStatus::is_passed),
			failed = report.count(CaseStatus::is_failed),
			skipped = report.count(CaseStatus::is_skipped),
			"recorded run finished"
		);
		RunReport { root: report }
	}
}

impl Runner for Recorder {
	fn describe(&self, label: &str, body: GroupBody) {
		self.group(Mode::All, label, body);
	}

	fn describe_only(&self, label: &str, body: GroupBody) {
		self.group(Mode::Only, label, body);
	}

	fn describe_skip(&self, label: &str, body: GroupBody) {
		self.group(Mode::Skip, label, body);
	}

	fn it(&self, message: &str, block: CaseBody) {
		self.push(Node::Case(message.to_string(), block));
	}

	fn hook(&self, lifecycle: Lifecycle, hook: Hook) {
		self.push(Node::Hook(lifecycle, hook));
	}
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseStatus {
	Passed,
	/// The first failure observed while running the case or its hooks.
	Failed(String),
	Skipped,
}

impl CaseStatus {
	pub fn is_passed(&self) -> bool {
		matches!(self, CaseStatus::Passed)
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, CaseStatus::Failed(_))
	}

	pub fn is_skipped(&self) -> bool {
		matches!(self, CaseStatus::Skipped)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
	/// Labels of the enclosing groups, outermost first.
	pub path: Vec<String>,
	pub message: String,
	pub status: CaseStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
	pub label: String,
	pub mode: Mode,
	pub groups: Vec<GroupReport>,
	pub cases: Vec<CaseReport>,
	/// Failure of an `after_all` hook, if any.
	pub teardown_error: Option<String>,
}

impl GroupReport {
	fn count(&self, pred: fn(&CaseStatus) -> bool) -> usize {
		self.cases.iter().filter(|c| pred(&c.status)).count()
			+ self.groups.iter().map(|g| g.count(pred)).sum::<usize>()
	}

	fn collect<'a>(&'a self, out: &mut Vec<&'a CaseReport>) {
		out.extend(self.cases.iter());
		for group in &self.groups {
			group.collect(out);
		}
	}

	fn find(&self, label: &str) -> Option<&GroupReport> {
		if self.label == label {
			return Some(self);
		}
		self.groups.iter().find_map(|g| g.find(label))
	}
}

/// Result of [`Recorder::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
	pub root: GroupReport,
}

impl RunReport {
	/// Every case, depth first, in declaration order within a group.
	pub fn cases(&self) -> Vec<&CaseReport> {
		let mut out = Vec::new();
		self.root.collect(&mut out);
		out
	}

	/// First group with this label, depth first.
	pub fn group(&self, label: &str) -> Option<&GroupReport> {
		self.root.groups.iter().find_map(|g| g.find(label))
	}

	pub fn passed(&self) -> usize {
		self.root.count(CaseStatus::is_passed)
	}

	pub fn failed(&self) -> usize {
		self.root.count(CaseStatus::is_failed)
	}

	pub fn skipped(&self) -> usize {
		self.root.count(CaseStatus::is_skipped)
	}
}

#[derive(Debug, Clone, Default)]
struct Scope {
	only_active: bool,
	inside_only: bool,
	skipped: bool,
	broken: Option<String>,
}

impl Scope {
	fn enter(&self, mode: Mode) -> Scope {
		let mut next = self.clone();
		match mode {
			Mode::All => {}
			Mode::Only => next.inside_only = true,
			Mode::Skip => next.skipped = true,
		}
		next
	}

	fn selects(&self) -> bool {
		!self.skipped && (!self.only_active || self.inside_only)
	}
}

#[derive(Default)]
struct EachHooks {
	before: Vec<Hook>,
	after: Vec<Hook>,
}

fn contains_only(nodes: &[Node]) -> bool {
	nodes.iter().any(|node| match node {
		Node::Group(g) => g.mode == Mode::Only || contains_only(&g.nodes),
		_ => false,
	})
}

fn has_runnable(nodes: &[Node], scope: &Scope) -> bool {
	nodes.iter().any(|node| match node {
		Node::Case(..) => scope.selects(),
		Node::Group(g) => has_runnable(&g.nodes, &scope.enter(g.mode)),
		Node::Hook(..) => false,
	})
}

/// Resolves an action, awaiting it if needed.
fn settle(action: Action) -> Result<(), String> {
	let result = match action {
		Action::Done(result) => result,
		Action::Async(fut) => futures::executor::block_on(fut),
	};
	result.map_err(|err| format!("{err:#}"))
}

fn run_hooks(hooks: &[Hook]) -> Option<String> {
	let mut failure = None;
	for hook in hooks {
		if let Err(err) = settle(hook.call()) {
			failure.get_or_insert(err);
		}
	}
	failure
}

fn run_case(block: CaseBody, chain: &[EachHooks]) -> CaseStatus {
	let mut failure: Option<String> = None;
	for hook in chain.iter().flat_map(|each| each.before.iter()) {
		if failure.is_some() {
			break;
		}
		if let Err(err) = settle(hook.call()) {
			failure = Some(err);
		}
	}
	if failure.is_none()
		&& let Err(err) = settle(block())
	{
		failure = Some(err);
	}
	for hook in chain.iter().rev().flat_map(|each| each.after.iter()) {
		if let Err(err) = settle(hook.call()) {
			failure.get_or_insert(err);
		}
	}
	failure.map_or(CaseStatus::Passed, CaseStatus::Failed)
}

fn skip_all(group: Group, path: &mut Vec<String>) -> GroupReport {
	let mut report = GroupReport {
		label: group.label,
		mode: group.mode,
		groups: Vec::new(),
		cases: Vec::new(),
		teardown_error: None,
	};
	for node in group.nodes {
		match node {
			Node::Case(message, _) => report.cases.push(CaseReport {
				path: path.clone(),
				message,
				status: CaseStatus::Skipped,
			}),
			Node::Group(child) => {
				path.push(child.label.clone());
				report.groups.push(skip_all(child, path));
				path.pop();
			}
			Node::Hook(..) => {}
		}
	}
	report
}

fn execute(
	group: Group,
	scope: Scope,
	chain: &mut Vec<EachHooks>,
	path: &mut Vec<String>,
) -> GroupReport {
	if !has_runnable(&group.nodes, &scope) {
		return skip_all(group, path);
	}

	let mut before_all = Vec::new();
	let mut after_all = Vec::new();
	let mut each = EachHooks::default();
	let mut members = Vec::new();
	for node in group.nodes {
		match node {
			Node::Hook(Lifecycle::BeforeAll, hook) => before_all.push(hook),
			Node::Hook(Lifecycle::AfterAll, hook) => after_all.push(hook),
			Node::Hook(Lifecycle::BeforeEach, hook) => each.before.push(hook),
			Node::Hook(Lifecycle::AfterEach, hook) => each.after.push(hook),
			member => members.push(member),
		}
	}

	let mut report = GroupReport {
		label: group.label,
		mode: group.mode,
		groups: Vec::new(),
		cases: Vec::new(),
		teardown_error: None,
	};

	let mut scope = scope;
	if scope.broken.is_none()
		&& let Some(err) = run_hooks(&before_all)
	{
		scope.broken = Some(format!("before_all hook failed: {err}"));
	}

	chain.push(each);
	for member in members {
		match member {
			Node::Case(message, block) => {
				let status = if !scope.selects() {
					CaseStatus::Skipped
				} else if let Some(err) = &scope.broken {
					CaseStatus::Failed(err.clone())
				} else {
					run_case(block, chain)
				};
				report.cases.push(CaseReport {
					path: path.clone(),
					message,
					status,
				});
			}
			Node::Group(child) => {
				let child_scope = scope.enter(child.mode);
				path.push(child.label.clone());
				report.groups.push(execute(child, child_scope, chain, path));
				path.pop();
			}
			Node::Hook(..) => {}
		}
	}
	chain.pop();

	report.teardown_error = run_hooks(&after_all);
	report
}
