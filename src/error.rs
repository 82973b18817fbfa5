use std::{error::Error, fmt};

use miette::Diagnostic;

use crate::symbol::{Span, Word};

/// Fatal error raised while turning source text into a memory image.
#[derive(Debug, Diagnostic, PartialEq, Eq)]
pub enum AsmError {
    #[diagnostic(
        code(lex::too_many_lexemes),
        help("a line holds at most a label, a mnemonic and an operand")
    )]
    TooManyLexemes {
        /// Zero-based line index
        line: usize,
        content: String,
        #[label("too many lexemes")]
        span: Span,
    },
    #[diagnostic(
        code(lex::bad_lit),
        help("only whole numbers are allowed, like 42 or -7")
    )]
    InvalidLiteral {
        lexeme: String,
        #[label("not an integer")]
        span: Span,
    },
    #[diagnostic(
        code(parse::missing_op),
        help("labels must decorate an instruction or a DAT on the same line")
    )]
    MissingOperation {
        label: String,
        #[label("label without instruction")]
        span: Span,
    },
    #[diagnostic(
        code(parse::duplicate_label),
        help("labels are only allowed to be defined once per file")
    )]
    DuplicateLabel {
        label: String,
        /// Address of the later definition
        index: usize,
        #[label("duplicate label")]
        span: Span,
    },
    #[diagnostic(
        code(asm::unresolved_symbol),
        help("check the spelling, or define the label on some line")
    )]
    UnresolvedSymbol {
        symbol: String,
        #[label("undefined symbol")]
        span: Span,
    },
    #[diagnostic(
        code(asm::operand_range),
        help("operands must fit the 3-digit field, 0 to 999")
    )]
    OperandOutOfRange {
        operand: Word,
        #[label("out-of-range operand")]
        span: Span,
    },
}

impl Error for AsmError {}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyLexemes { line, content, .. } => write!(
                f,
                "Error on line {}: `{}` has more than three elements",
                line, content
            ),
            Self::InvalidLiteral { lexeme, .. } => {
                write!(f, "Encountered an invalid literal: `{}`", lexeme)
            }
            Self::MissingOperation { label, .. } => {
                write!(f, "Label `{}` is not followed by a mnemonic", label)
            }
            Self::DuplicateLabel { label, index, .. } => write!(
                f,
                "Multiple definitions of label `{}`, latest at {}",
                label, index
            ),
            Self::UnresolvedSymbol { symbol, .. } => write!(f, "Undefined symbol: `{}`", symbol),
            Self::OperandOutOfRange { operand, .. } => {
                write!(f, "Operand {} does not fit in an instruction", operand)
            }
        }
    }
}

/// Fatal error raised while executing a memory image.
///
/// `StackUnderflow` and `InputExhausted` are faults of the guest program, the
/// rest mean the image itself is corrupt or the run was cut short.
#[derive(Debug, Diagnostic, PartialEq, Eq)]
pub enum RunError {
    #[diagnostic(
        code(run::invalid_instruction),
        help("control flow probably reached a DAT word")
    )]
    InvalidInstruction {
        /// Address the word was fetched from
        pc: usize,
        word: Word,
        accumulator: Word,
        memory: Vec<Word>,
        stack: Vec<Word>,
    },
    #[diagnostic(code(run::stack_underflow), help("every POP needs a matching PSH"))]
    StackUnderflow { pc: usize },
    #[diagnostic(
        code(run::input_exhausted),
        help("supply more values to the input queue")
    )]
    InputExhausted { pc: usize },
    #[diagnostic(
        code(run::address),
        help("addresses must point inside the assembled program")
    )]
    AddressOutOfBounds { pc: usize, addr: Word },
    #[diagnostic(
        code(run::step_limit),
        help("the program may loop forever; raise the limit if it does not")
    )]
    StepLimitExceeded { limit: u64 },
}

impl Error for RunError {}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInstruction {
                pc,
                word,
                accumulator,
                memory,
                stack,
            } => write!(
                f,
                "Invalid instruction {} at address {} (accumulator: {}, stack: {:?}, memory: {:?})",
                word, pc, accumulator, stack, memory
            ),
            Self::StackUnderflow { pc } => {
                write!(f, "Popped from an empty stack at address {}", pc)
            }
            Self::InputExhausted { pc } => {
                write!(f, "Read from an empty input queue at address {}", pc)
            }
            Self::AddressOutOfBounds { pc, addr } => write!(
                f,
                "Address {} is outside of memory, accessed at address {}",
                addr, pc
            ),
            Self::StepLimitExceeded { limit } => {
                write!(f, "Program did not halt within {} steps", limit)
            }
        }
    }
}
