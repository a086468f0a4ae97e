/*!
	Non-deterministic parsing over sets of assemblies.

	The engine lives in [engine], word-level tokens and their terminals in
	[tokens]. [coffee] is a complete grammar built on both.
*/

pub mod coffee;

pub use assemblage_engine as engine;
pub use assemblage_engine::{Assembler, Assembly, Duplicate, Grammar, ParserId};
pub use assemblage_tokens as tokens;
pub use assemblage_tokens::{Token, lex};
