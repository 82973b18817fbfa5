use std::fmt;

use crate::symbol::Word;

/// Opcode and operand fields of a packed word, before any meaning is assigned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RawInstr {
    pub opcode: Word,
    pub operand: Word,
}

impl RawInstr {
    pub fn encode(self) -> Word {
        self.opcode * 1000 + self.operand
    }

    /// Exact inverse of [`RawInstr::encode`] for operands in `0..=999`.
    pub fn decode(word: Word) -> Self {
        RawInstr {
            opcode: word.div_euclid(1000),
            operand: word.rem_euclid(1000),
        }
    }
}

/// Memory address carried by an instruction.
pub type Addr = usize;

/// Decoded instruction. Mnemonics sharing an opcode get their own variant.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Op {
    /// Stop execution
    HLT,
    /// Jump to the address held in the accumulator
    RET,
    ADD(Addr),
    SUB(Addr),
    STA(Addr),
    /// Pop the stack into the accumulator
    POP,
    /// Push the accumulator onto the stack
    PSH,
    /// Load the (already advanced) program counter into the accumulator
    LDAPC,
    LDA(Addr),
    BRA(Addr),
    /// Branch if accumulator is zero
    BRZ(Addr),
    /// Branch if accumulator is strictly positive
    BRP(Addr),
    /// Read one value from the input queue
    INP,
    /// Emit accumulator as a number
    OUT,
    /// Emit accumulator as a character code
    OUTC,
}

impl Op {
    /// `None` if the word matches no instruction.
    pub fn decode(word: Word) -> Option<Op> {
        let RawInstr { opcode, operand } = RawInstr::decode(word);
        let addr = operand as Addr;
        let op = match (opcode, operand) {
            (0, 0) => Op::HLT,
            (0, 1) => Op::RET,
            (1, _) => Op::ADD(addr),
            (2, _) => Op::SUB(addr),
            (3, _) => Op::STA(addr),
            (4, 1) => Op::POP,
            (4, 2) => Op::PSH,
            (4, 3) => Op::LDAPC,
            (5, _) => Op::LDA(addr),
            (6, _) => Op::BRA(addr),
            (7, _) => Op::BRZ(addr),
            (8, _) => Op::BRP(addr),
            (9, 1) => Op::INP,
            (9, 2) => Op::OUT,
            (9, 3) => Op::OUTC,
            _ => return None,
        };
        Some(op)
    }

    pub fn encode(self) -> Word {
        let (opcode, operand) = match self {
            Op::HLT => (0, 0),
            Op::RET => (0, 1),
            Op::ADD(addr) => (1, addr as Word),
            Op::SUB(addr) => (2, addr as Word),
            Op::STA(addr) => (3, addr as Word),
            Op::POP => (4, 1),
            Op::PSH => (4, 2),
            Op::LDAPC => (4, 3),
            Op::LDA(addr) => (5, addr as Word),
            Op::BRA(addr) => (6, addr as Word),
            Op::BRZ(addr) => (7, addr as Word),
            Op::BRP(addr) => (8, addr as Word),
            Op::INP => (9, 1),
            Op::OUT => (9, 2),
            Op::OUTC => (9, 3),
        };
        RawInstr { opcode, operand }.encode()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::ADD(addr) => write!(f, "ADD {addr}"),
            Op::SUB(addr) => write!(f, "SUB {addr}"),
            Op::STA(addr) => write!(f, "STA {addr}"),
            Op::LDA(addr) => write!(f, "LDA {addr}"),
            Op::BRA(addr) => write!(f, "BRA {addr}"),
            Op::BRZ(addr) => write!(f, "BRZ {addr}"),
            Op::BRP(addr) => write!(f, "BRP {addr}"),
            Op::HLT => f.write_str("HLT"),
            Op::RET => f.write_str("RET"),
            Op::POP => f.write_str("POP"),
            Op::PSH => f.write_str("PSH"),
            Op::LDAPC => f.write_str("LDAPC"),
            Op::INP => f.write_str("INP"),
            Op::OUT => f.write_str("OUT"),
            Op::OUTC => f.write_str("OUTC"),
        }
    }
}

/// Disassemble a word, falling back to `DAT` for anything that is not an instruction.
pub fn disassemble(word: Word) -> String {
    match Op::decode(word) {
        Some(op) => op.to_string(),
        None => format!("DAT {word}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::OPERAND_MAX;

    #[test]
    fn raw_round_trip() {
        for opcode in 0..=9 {
            for operand in 0..=OPERAND_MAX {
                let raw = RawInstr { opcode, operand };
                assert_eq!(RawInstr::decode(raw.encode()), raw);
            }
        }
    }

    #[test]
    fn negative_words_decode_below_zero() {
        assert_eq!(
            RawInstr::decode(-5),
            RawInstr {
                opcode: -1,
                operand: 995
            }
        );
        assert_eq!(Op::decode(-5), None);
    }

    #[test]
    fn extreme_words_do_not_overflow() {
        assert_eq!(
            RawInstr::decode(Word::MIN),
            RawInstr {
                opcode: -9_223_372_036_854_776,
                operand: 192
            }
        );
        assert_eq!(Op::decode(Word::MIN), None);
        assert_eq!(Op::decode(Word::MIN + 191), None);
        assert_eq!(Op::decode(Word::MAX), None);
    }

    #[test]
    fn unknown_sub_opcodes() {
        assert_eq!(Op::decode(2), None);
        assert_eq!(Op::decode(4000), None);
        assert_eq!(Op::decode(9004), None);
        assert_eq!(Op::decode(10_000), None);
    }

    #[test]
    fn op_round_trip() {
        for op in [Op::HLT, Op::RET, Op::POP, Op::PSH, Op::LDAPC, Op::INP, Op::OUT, Op::OUTC] {
            assert_eq!(Op::decode(op.encode()), Some(op));
        }
        assert_eq!(Op::decode(8042), Some(Op::BRP(42)));
        assert_eq!(Op::BRP(42).encode(), 8042);
    }

    #[test]
    fn disassembly() {
        assert_eq!(disassemble(5004), "LDA 4");
        assert_eq!(disassemble(9003), "OUTC");
        assert_eq!(disassemble(-7), "DAT -7");
    }
}
