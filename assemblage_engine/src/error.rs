use thiserror::Error;

use crate::grammar::ParserId;

/// A failure raised while working on a single assembly.
///
/// These are authoring defects in a grammar or its assemblers, never a "no match".
#[derive(Debug, Error)]
pub enum AssemblyError {
	#[error("stack underflow")]
	StackUnderflow,
	#[error("expected {expected} on the stack but found {found}")]
	UnexpectedValue { expected: &'static str, found: String },
	#[error("assembly has no target")]
	MissingTarget,
	#[error("could not duplicate {what}: {reason}")]
	Duplication { what: &'static str, reason: String },
	#[error("{0}")]
	Custom(String),
}

impl AssemblyError {
	pub fn custom(message: impl Into<String>) -> Self {
		Self::Custom(message.into())
	}
}

/// A fatal error that aborts a matching attempt or a grammar operation.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("assembler on {node} failed")]
	Assembler {
		node: String,
		#[source]
		source: AssemblyError,
	},
	#[error("pre-assembler on {node} failed")]
	PreAssembler {
		node: String,
		#[source]
		source: AssemblyError,
	},
	#[error("could not clone an assembly at {node}")]
	Duplication {
		node: String,
		#[source]
		source: AssemblyError,
	},
	#[error("repetition {node} ran more than {limit} rounds")]
	RepetitionLimit { node: String, limit: usize },
	#[error("random expansion of {node} went deeper than {limit}")]
	ExpansionDepth { node: String, limit: usize },
	#[error("parser {id} does not belong to this grammar of {nodes} nodes")]
	UnknownParser { id: ParserId, nodes: usize },
	#[error("{node} is a {kind}, expected {expected}")]
	WrongKind {
		node: String,
		kind: &'static str,
		expected: &'static str,
	},
}

pub type EngineResult<T> = Result<T, EngineError>;
