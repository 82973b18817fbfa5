use std::slice::Iter;

use crate::{
    error::AsmError,
    ops::RawInstr,
    symbol::{Mnemonic, Span, SymbolTable, Word, OPERAND_MAX},
};

/// Assembly intermediate representation, one statement per non-blank source line.
///
/// Statement index is the memory address the statement is emitted to.
#[derive(Debug, Default)]
pub struct Air {
    ast: Vec<AirStmt>,
}

impl Air {
    pub fn new() -> Self {
        Air::default()
    }

    pub fn add_stmt(&mut self, stmt: AirStmt) {
        self.ast.push(stmt)
    }

    pub fn len(&self) -> usize {
        self.ast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ast.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, AirStmt> {
        self.ast.iter()
    }

    /// First pass: map every label to the address of the statement it decorates.
    pub fn symbol_table(&self) -> Result<SymbolTable, AsmError> {
        let mut symbols = SymbolTable::new();
        for (addr, stmt) in self.ast.iter().enumerate() {
            if let Some(label) = &stmt.label {
                symbols.insert(&label.name, addr, label.span)?;
            }
        }
        Ok(symbols)
    }

    /// Second pass: resolve operands and pack every statement into a word.
    pub fn emit(&self, symbols: &SymbolTable) -> Result<Vec<Word>, AsmError> {
        self.ast.iter().map(|stmt| stmt.emit(symbols)).collect()
    }

    /// Run both passes, producing the initial memory image.
    pub fn assemble(&self) -> Result<Vec<Word>, AsmError> {
        let symbols = self.symbol_table()?;
        self.emit(&symbols)
    }
}

impl<'a> IntoIterator for &'a Air {
    type Item = &'a AirStmt;
    type IntoIter = Iter<'a, AirStmt>;

    fn into_iter(self) -> Self::IntoIter {
        self.ast.iter()
    }
}

/// Label defined at the start of a statement.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Label {
    pub name: String,
    pub span: Span,
}

impl Label {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Label {
            name: name.into(),
            span,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    /// Nothing given, packs as zero.
    None,
    /// Injected by a mnemonic that shares its opcode with others.
    SubOp(Word),
    Lit(Word),
    /// Reference to be resolved through the symbol table.
    Label(String),
}

/// Single statement, with an optional label.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AirStmt {
    pub label: Option<Label>,
    pub op: Mnemonic,
    pub operand: Operand,
    /// Span of the mnemonic
    pub span: Span,
    /// Span of an explicit operand, if one was written
    pub operand_span: Option<Span>,
}

impl AirStmt {
    /// Resolve the operand and pack the statement into one memory word.
    pub fn emit(&self, symbols: &SymbolTable) -> Result<Word, AsmError> {
        let span = self.operand_span.unwrap_or(self.span);
        let operand = match &self.operand {
            Operand::None => 0,
            Operand::SubOp(val) | Operand::Lit(val) => *val,
            Operand::Label(name) => match symbols.get(name) {
                Some(addr) => addr as Word,
                None => {
                    return Err(AsmError::UnresolvedSymbol {
                        symbol: name.clone(),
                        span,
                    })
                }
            },
        };

        let Some(opcode) = self.op.opcode() else {
            // Raw data is stored verbatim
            return Ok(operand);
        };
        if !(0..=OPERAND_MAX).contains(&operand) {
            return Err(AsmError::OperandOutOfRange { operand, span });
        }
        Ok(RawInstr { opcode, operand }.encode())
    }
}
