/*!
	A parser combinator engine that matches *sets* of parse states.

	Grammars are built in a [Grammar] arena out of five kinds of node:
	terminals, sequences, alternations, repetitions and the empty parser.
	Instead of backtracking, matching threads a set of [Assembly] values
	through the grammar. Every branch point clones the assemblies it works on,
	so all derivations of an ambiguous grammar are explored side by side and
	the caller picks the [best](Grammar::best_match) or
	[complete](Grammar::complete_match) one at the end.

	[Assembler]s bound to nodes run on each assembly a node produces, using the
	assembly's stack and target to build a result.
*/

pub mod assembler;
pub mod assembly;
pub mod error;
pub mod grammar;
pub mod matching;
pub mod random;
pub mod terminal;
pub mod visitor;

pub use crate::assembler::Assembler;
pub use crate::assembly::{Assembly, Duplicate, Element, Value};
pub use crate::error::{AssemblyError, EngineError, EngineResult};
pub use crate::grammar::{Grammar, ParserId};
pub use crate::matching::{MatchOptions, best};
pub use crate::random::ExpansionOptions;
pub use crate::terminal::Terminal;
pub use crate::visitor::{GrammarPrinter, NodeCounter, ParserVisitor, Visited};
