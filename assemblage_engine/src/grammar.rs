use std::fmt;

use crate::assembler::Assembler;
use crate::error::{EngineError, EngineResult};
use crate::matching::MatchOptions;
use crate::terminal::Terminal;

/// A handle to a parser node inside a [Grammar].
///
/// Handles are only meaningful for the grammar that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParserId(pub(crate) usize);

impl ParserId {
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for ParserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

pub(crate) type BoxedAssembler<E, T> = Box<dyn Assembler<E, T>>;

pub(crate) enum Kind<E, T> {
	Terminal {
		terminal: Box<dyn Terminal<E>>,
		discard: bool,
	},
	Sequence(Vec<ParserId>),
	Alternation(Vec<ParserId>),
	Repetition {
		subparser: ParserId,
		pre_assembler: Option<BoxedAssembler<E, T>>,
	},
	Empty,
}

impl<E, T> Kind<E, T> {
	pub(crate) fn name(&self) -> &'static str {
		match self {
			Self::Terminal { .. } => "terminal",
			Self::Sequence(_) => "sequence",
			Self::Alternation(_) => "alternation",
			Self::Repetition { .. } => "repetition",
			Self::Empty => "empty",
		}
	}
}

pub(crate) struct Node<E, T> {
	pub(crate) name: Option<String>,
	pub(crate) kind: Kind<E, T>,
	pub(crate) assembler: Option<BoxedAssembler<E, T>>,
}

/**
	An arena of parser nodes.

	Nodes refer to each other by [ParserId], so a grammar may be recursive: a
	sequence or alternation can be created first and filled in with
	[Grammar::add] once the nodes it refers to exist, including itself or one
	of its ancestors.

	```
	use assemblage_engine::{Grammar, terminal::Exact};

	// list = 'a' (',' list | empty)
	let mut grammar = Grammar::<char>::new();
	let list = grammar.sequence([]).unwrap();
	let a = grammar.terminal(Exact('a'));
	let comma = grammar.terminal(Exact(','));
	let more = grammar.sequence([comma, list]).unwrap();
	let empty = grammar.empty();
	let tail = grammar.alternation([more, empty]).unwrap();
	grammar.add(list, a).unwrap();
	grammar.add(list, tail).unwrap();
	```
*/
pub struct Grammar<E, T = ()> {
	pub(crate) nodes: Vec<Node<E, T>>,
	pub(crate) options: MatchOptions,
}

impl<E, T> Default for Grammar<E, T> {
	fn default() -> Self {
		Self::with_options(MatchOptions::default())
	}
}

impl<E, T> Grammar<E, T> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: MatchOptions) -> Self {
		Self {
			nodes: vec![],
			options,
		}
	}

	pub fn options(&self) -> &MatchOptions {
		&self.options
	}

	pub fn set_options(&mut self, options: MatchOptions) {
		self.options = options;
	}

	/// The number of nodes in this grammar.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	fn push(&mut self, kind: Kind<E, T>) -> ParserId {
		let id = ParserId(self.nodes.len());
		self.nodes.push(Node {
			name: None,
			kind,
			assembler: None,
		});
		id
	}

	pub(crate) fn node(&self, id: ParserId) -> &Node<E, T> {
		&self.nodes[id.0]
	}

	fn node_mut(&mut self, id: ParserId) -> &mut Node<E, T> {
		&mut self.nodes[id.0]
	}

	pub fn terminal(&mut self, terminal: impl Terminal<E> + 'static) -> ParserId {
		self.push(Kind::Terminal {
			terminal: Box::new(terminal),
			discard: false,
		})
	}

	/// Fails with [EngineError::UnknownParser] if this grammar never issued `id`.
	fn check(&self, id: ParserId) -> EngineResult<ParserId> {
		if id.0 < self.nodes.len() {
			Ok(id)
		} else {
			Err(EngineError::UnknownParser {
				id,
				nodes: self.nodes.len(),
			})
		}
	}

	fn check_all(&self, ids: impl IntoIterator<Item = ParserId>) -> EngineResult<Vec<ParserId>> {
		ids.into_iter().map(|id| self.check(id)).collect()
	}

	pub fn sequence(&mut self, subparsers: impl IntoIterator<Item = ParserId>) -> EngineResult<ParserId> {
		let subparsers = self.check_all(subparsers)?;
		Ok(self.push(Kind::Sequence(subparsers)))
	}

	pub fn alternation(&mut self, subparsers: impl IntoIterator<Item = ParserId>) -> EngineResult<ParserId> {
		let subparsers = self.check_all(subparsers)?;
		Ok(self.push(Kind::Alternation(subparsers)))
	}

	pub fn repetition(&mut self, subparser: ParserId) -> EngineResult<ParserId> {
		let subparser = self.check(subparser)?;
		Ok(self.push(Kind::Repetition {
			subparser,
			pre_assembler: None,
		}))
	}

	pub fn empty(&mut self) -> ParserId {
		self.push(Kind::Empty)
	}

	/// Gives `id` a name, which printing uses in place of its body once visited.
	pub fn named(&mut self, id: ParserId, name: impl Into<String>) -> ParserId {
		self.node_mut(id).name = Some(name.into());
		id
	}

	pub fn name(&self, id: ParserId) -> Option<&str> {
		self.node(id).name.as_deref()
	}

	/// `"terminal"`, `"sequence"`, `"alternation"`, `"repetition"` or `"empty"`.
	pub fn kind_name(&self, id: ParserId) -> &'static str {
		self.node(id).kind.name()
	}

	/// The sub-nodes of `id`, in order. Leaves have none.
	pub fn subparsers(&self, id: ParserId) -> Vec<ParserId> {
		match &self.node(id).kind {
			Kind::Sequence(subparsers) | Kind::Alternation(subparsers) => subparsers.clone(),
			Kind::Repetition { subparser, .. } => vec![*subparser],
			Kind::Terminal { .. } | Kind::Empty => vec![],
		}
	}

	/// Appends `subparser` to a sequence or alternation.
	pub fn add(&mut self, parent: ParserId, subparser: ParserId) -> EngineResult<()> {
		self.check(parent)?;
		self.check(subparser)?;
		let label = self.label(parent);
		match &mut self.node_mut(parent).kind {
			Kind::Sequence(subparsers) | Kind::Alternation(subparsers) => {
				subparsers.push(subparser);
				Ok(())
			},
			kind => Err(EngineError::WrongKind {
				node: label,
				kind: kind.name(),
				expected: "sequence or alternation",
			}),
		}
	}

	/// Stops a terminal from pushing the elements it matches.
	pub fn discard(&mut self, id: ParserId) -> EngineResult<ParserId> {
		let label = self.label(id);
		match &mut self.node_mut(id).kind {
			Kind::Terminal { discard, .. } => {
				*discard = true;
				Ok(id)
			},
			kind => Err(EngineError::WrongKind {
				node: label,
				kind: kind.name(),
				expected: "terminal",
			}),
		}
	}

	/// Binds the assembler run on every assembly `id` produces.
	pub fn set_assembler(
		&mut self,
		id: ParserId,
		assembler: impl Assembler<E, T> + 'static,
	) -> ParserId {
		self.node_mut(id).assembler = Some(Box::new(assembler));
		id
	}

	/// Binds the assembler a repetition runs on its input before matching.
	pub fn set_pre_assembler(
		&mut self,
		id: ParserId,
		assembler: impl Assembler<E, T> + 'static,
	) -> EngineResult<ParserId> {
		let label = self.label(id);
		match &mut self.node_mut(id).kind {
			Kind::Repetition { pre_assembler, .. } => {
				*pre_assembler = Some(Box::new(assembler));
				Ok(id)
			},
			kind => Err(EngineError::WrongKind {
				node: label,
				kind: kind.name(),
				expected: "repetition",
			}),
		}
	}

	/// How errors and logs refer to a node: its name, or its kind and id.
	pub fn label(&self, id: ParserId) -> String {
		let node = self.node(id);
		match &node.name {
			Some(name) => name.clone(),
			None => format!("{} {id}", node.kind.name()),
		}
	}
}

#[test]
fn test_builder_rejects_wrong_kinds() {
	use crate::terminal::Exact;

	let mut grammar = Grammar::<char>::new();
	let a = grammar.terminal(Exact('a'));
	let star = grammar.repetition(a).unwrap();
	let seq = grammar.sequence([a]).unwrap();

	assert!(matches!(
		grammar.add(a, star),
		Err(EngineError::WrongKind { kind: "terminal", .. })
	));
	assert!(matches!(
		grammar.discard(seq),
		Err(EngineError::WrongKind { kind: "sequence", .. })
	));
	assert!(matches!(
		grammar.set_pre_assembler(seq, crate::assembler::Pop),
		Err(EngineError::WrongKind { expected: "repetition", .. })
	));
	assert!(grammar.set_pre_assembler(star, crate::assembler::Pop).is_ok());
	assert!(grammar.add(seq, star).is_ok());
	assert_eq!(grammar.subparsers(seq), vec![a, star]);
	assert_eq!(grammar.subparsers(star), vec![a]);
}

#[test]
fn test_labels() {
	let mut grammar = Grammar::<char>::new();
	let empty = grammar.empty();
	let star = grammar.repetition(empty).unwrap();
	grammar.named(star, "stars");
	assert_eq!(grammar.label(empty), "empty #0");
	assert_eq!(grammar.label(star), "stars");
	assert_eq!(grammar.name(empty), None);
	assert_eq!(grammar.kind_name(star), "repetition");
	assert_eq!(grammar.len(), 2);
}

#[test]
fn test_builders_reject_foreign_ids() {
	use crate::terminal::Exact;

	let mut other = Grammar::<char>::new();
	other.terminal(Exact('x'));
	other.terminal(Exact('y'));
	let foreign = other.terminal(Exact('z'));

	let mut grammar = Grammar::<char>::new();
	let a = grammar.terminal(Exact('a'));
	let seq = grammar.sequence([a]).unwrap();
	assert!(matches!(
		grammar.sequence([a, foreign]),
		Err(EngineError::UnknownParser { id, nodes: 2 }) if id == foreign
	));
	assert!(matches!(
		grammar.alternation([foreign]),
		Err(EngineError::UnknownParser { .. })
	));
	assert!(matches!(
		grammar.repetition(foreign),
		Err(EngineError::UnknownParser { .. })
	));
	assert!(matches!(
		grammar.add(seq, foreign),
		Err(EngineError::UnknownParser { .. })
	));
	assert!(matches!(
		grammar.add(foreign, a),
		Err(EngineError::UnknownParser { .. })
	));
	// nothing was added by the failed calls
	assert_eq!(grammar.len(), 2);
	assert_eq!(grammar.subparsers(seq), vec![a]);
}
