use std::{fmt, ops::Range, str::FromStr};

use fxhash::FxBuildHasher;
use indexmap::{map::Entry, IndexMap};
use miette::SourceSpan;

use crate::error::AsmError;

/// A single memory cell. Also the type of the accumulator and stack entries.
pub type Word = i64;

/// Largest operand that survives the `opcode * 1000 + operand` packing.
pub const OPERAND_MAX: Word = 999;

/// Location within source
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, Debug)]
pub struct Span {
    offs: usize,
    len: usize,
}

impl Span {
    pub fn new(offs: usize, len: usize) -> Self {
        Span { offs, len }
    }

    pub fn offs(&self) -> usize {
        self.offs
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> usize {
        self.offs + self.len
    }
}

impl From<Span> for SourceSpan {
    fn from(value: Span) -> Self {
        SourceSpan::new(value.offs().into(), value.len())
    }
}

impl From<Span> for Range<usize> {
    fn from(value: Span) -> Self {
        value.offs()..value.end()
    }
}

/// Every keyword understood by the assembler.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mnemonic {
    Add,
    Sub,
    Sta,
    Lda,
    Bra,
    Brz,
    Brp,
    Hlt,
    Ret,
    Pop,
    Psh,
    Ldapc,
    Inp,
    Out,
    Outc,
    /// Raw data, stored verbatim.
    Dat,
}

impl Mnemonic {
    /// Numeric opcode class. `None` for `DAT`, which is never opcode-packed.
    pub fn opcode(self) -> Option<Word> {
        let opcode = match self {
            Mnemonic::Hlt | Mnemonic::Ret => 0,
            Mnemonic::Add => 1,
            Mnemonic::Sub => 2,
            Mnemonic::Sta => 3,
            Mnemonic::Pop | Mnemonic::Psh | Mnemonic::Ldapc => 4,
            Mnemonic::Lda => 5,
            Mnemonic::Bra => 6,
            Mnemonic::Brz => 7,
            Mnemonic::Brp => 8,
            Mnemonic::Inp | Mnemonic::Out | Mnemonic::Outc => 9,
            Mnemonic::Dat => return None,
        };
        Some(opcode)
    }

    /// Operand value that tells apart mnemonics sharing one opcode.
    pub fn sub_opcode(self) -> Option<Word> {
        match self {
            Mnemonic::Hlt => Some(0),
            Mnemonic::Ret | Mnemonic::Pop | Mnemonic::Inp => Some(1),
            Mnemonic::Psh | Mnemonic::Out => Some(2),
            Mnemonic::Ldapc | Mnemonic::Outc => Some(3),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Add => "ADD",
            Mnemonic::Sub => "SUB",
            Mnemonic::Sta => "STA",
            Mnemonic::Lda => "LDA",
            Mnemonic::Bra => "BRA",
            Mnemonic::Brz => "BRZ",
            Mnemonic::Brp => "BRP",
            Mnemonic::Hlt => "HLT",
            Mnemonic::Ret => "RET",
            Mnemonic::Pop => "POP",
            Mnemonic::Psh => "PSH",
            Mnemonic::Ldapc => "LDAPC",
            Mnemonic::Inp => "INP",
            Mnemonic::Out => "OUT",
            Mnemonic::Outc => "OUTC",
            Mnemonic::Dat => "DAT",
        }
    }
}

impl FromStr for Mnemonic {
    type Err = ();

    // Keywords are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Mnemonic::Add),
            "SUB" => Ok(Mnemonic::Sub),
            "STA" => Ok(Mnemonic::Sta),
            "LDA" => Ok(Mnemonic::Lda),
            "BRA" => Ok(Mnemonic::Bra),
            "BRZ" => Ok(Mnemonic::Brz),
            "BRP" => Ok(Mnemonic::Brp),
            "HLT" => Ok(Mnemonic::Hlt),
            "RET" => Ok(Mnemonic::Ret),
            "POP" => Ok(Mnemonic::Pop),
            "PSH" => Ok(Mnemonic::Psh),
            "LDAPC" => Ok(Mnemonic::Ldapc),
            "INP" => Ok(Mnemonic::Inp),
            "OUT" => Ok(Mnemonic::Out),
            "OUTC" => Ok(Mnemonic::Outc),
            "DAT" => Ok(Mnemonic::Dat),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Label -> memory address (instruction index). Only lives for one assembly.
#[derive(Debug, Default)]
pub struct SymbolTable {
    table: FxMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Record a label definition. Error if the label already exists.
    pub fn insert(&mut self, label: &str, addr: usize, span: Span) -> Result<(), AsmError> {
        match self.table.entry(label.to_string()) {
            Entry::Occupied(_) => Err(AsmError::DuplicateLabel {
                label: label.to_string(),
                index: addr,
                span,
            }),
            Entry::Vacant(slot) => {
                slot.insert(addr);
                Ok(())
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.table.get(label).copied()
    }

    /// Labels in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.table.iter().map(|(label, addr)| (label.as_str(), *addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!("OUTC".parse(), Ok(Mnemonic::Outc));
        assert_eq!("outc".parse::<Mnemonic>(), Err(()));
    }

    #[test]
    fn shared_opcodes() {
        for (mnemonic, opcode, sub) in [
            (Mnemonic::Hlt, 0, 0),
            (Mnemonic::Ret, 0, 1),
            (Mnemonic::Pop, 4, 1),
            (Mnemonic::Psh, 4, 2),
            (Mnemonic::Ldapc, 4, 3),
            (Mnemonic::Inp, 9, 1),
            (Mnemonic::Out, 9, 2),
            (Mnemonic::Outc, 9, 3),
        ] {
            assert_eq!(mnemonic.opcode(), Some(opcode), "{mnemonic}");
            assert_eq!(mnemonic.sub_opcode(), Some(sub), "{mnemonic}");
        }
        assert_eq!(Mnemonic::Lda.sub_opcode(), None);
        assert_eq!(Mnemonic::Dat.opcode(), None);
    }

    #[test]
    fn duplicate_label() {
        let mut table = SymbolTable::new();
        table.insert("x", 0, Span::default()).unwrap();
        let err = table.insert("x", 3, Span::default()).unwrap_err();
        assert!(matches!(
            err,
            AsmError::DuplicateLabel { ref label, index: 3, .. } if label == "x"
        ));
        assert_eq!(table.get("x"), Some(0));
    }
}
