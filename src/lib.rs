// Assembling
mod lexer;
pub use lexer::{tokenize, Token, TokenKind};
mod parser;
pub use parser::AsmParser;
mod air;
pub use air::{Air, AirStmt, Label, Operand};
mod symbol;
pub use symbol::{Mnemonic, Span, SymbolTable, Word, OPERAND_MAX};

// Running
mod ops;
pub use ops::{disassemble, Addr, Op, RawInstr};
mod runtime;
pub use runtime::{RunState, Step};
mod output;
pub use output::{Console, OutputEvent, OutputSink};

mod error;
pub use error::{AsmError, RunError};

pub mod env;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 4;

/// Assemble source text into the initial memory image.
pub fn assemble(src: &str) -> Result<Vec<Word>, AsmError> {
    AsmParser::new(src)?.parse()?.assemble()
}
