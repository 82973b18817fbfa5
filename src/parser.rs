use std::vec::IntoIter;

use crate::{
    air::{Air, AirStmt, Label, Operand},
    error::AsmError,
    lexer::{tokenize, Token, TokenKind},
    symbol::{Mnemonic, Span},
};

/// Statement being collated from the tokens of the current line.
#[derive(Debug, Default)]
struct PendingStmt {
    label: Option<Label>,
    op: Option<(Mnemonic, Span)>,
    operand: Option<(Operand, Option<Span>)>,
}

impl PendingStmt {
    /// Fold one non-terminator token into the statement.
    fn feed(mut self, tok: Token) -> Self {
        match (tok.kind, self.op.is_some()) {
            (TokenKind::Op(op), false) => {
                // Shared-opcode mnemonics carry their sub-opcode until an operand replaces it
                self.operand = op
                    .sub_opcode()
                    .map(|sub| (Operand::SubOp(sub), None));
                self.op = Some((op, tok.span));
            }
            (TokenKind::Label(name), false) => {
                self.label = Some(Label::new(name, tok.span));
            }
            (TokenKind::Label(name), true) => {
                self.operand = Some((Operand::Label(name), Some(tok.span)));
            }
            (TokenKind::Lit(val), true) => {
                self.operand = Some((Operand::Lit(val), Some(tok.span)));
            }
            // A second mnemonic, or a literal before any mnemonic, carries no meaning
            (TokenKind::Op(_), true) | (TokenKind::Lit(_), false) => {}
            (TokenKind::Eol, _) => unreachable!("terminators flush the statement"),
        }
        self
    }

    /// Close the statement at a line terminator. Blank lines yield nothing.
    fn finish(self) -> Result<Option<AirStmt>, AsmError> {
        match (self.op, self.label) {
            (Some((op, span)), label) => {
                let (operand, operand_span) = self.operand.unwrap_or((Operand::None, None));
                Ok(Some(AirStmt {
                    label,
                    op,
                    operand,
                    span,
                    operand_span,
                }))
            }
            (None, Some(label)) => Err(AsmError::MissingOperation {
                label: label.name,
                span: label.span,
            }),
            (None, None) => Ok(None),
        }
    }
}

/// Transforms token stream into AIR
pub struct AsmParser {
    toks: IntoIter<Token>,
    air: Air,
}

impl AsmParser {
    pub fn new(src: &str) -> Result<Self, AsmError> {
        let toks = tokenize(src)?;
        Ok(AsmParser {
            toks: toks.into_iter(),
            air: Air::new(),
        })
    }

    /// Create AIR out of token stream
    pub fn parse(mut self) -> Result<Air, AsmError> {
        let mut pending = PendingStmt::default();
        for tok in self.toks.by_ref() {
            if tok.kind == TokenKind::Eol {
                if let Some(stmt) = std::mem::take(&mut pending).finish()? {
                    self.air.add_stmt(stmt);
                }
            } else {
                pending = pending.feed(tok);
            }
        }
        // Token streams always end in a terminator
        debug_assert!(pending.op.is_none() && pending.label.is_none());
        Ok(self.air)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        air::{AirStmt, Label, Operand},
        error::AsmError,
        symbol::{Mnemonic, Span},
    };

    use super::AsmParser;

    fn parse(src: &str) -> Vec<AirStmt> {
        AsmParser::new(src).unwrap().parse().unwrap().iter().cloned().collect()
    }

    #[test]
    fn one_stmt_per_line() {
        let air = parse("LDA x\n\n\t\nOUT\nx DAT 5\n");
        assert_eq!(air.len(), 3);
        assert_eq!(air[0].op, Mnemonic::Lda);
        assert_eq!(air[0].operand, Operand::Label("x".into()));
        assert_eq!(air[1].op, Mnemonic::Out);
        assert_eq!(air[2].label, Some(Label::new("x", Span::new(13, 1))));
        assert_eq!(air[2].operand, Operand::Lit(5));
    }

    #[test]
    fn sub_opcode_defaults() {
        let air = parse("PSH\nHLT\nDAT");
        assert_eq!(air[0].operand, Operand::SubOp(2));
        assert_eq!(air[0].operand_span, None);
        assert_eq!(air[1].operand, Operand::SubOp(0));
        assert_eq!(air[2].operand, Operand::None);
    }

    #[test]
    fn operand_replaces_sub_opcode() {
        let air = parse("OUT 3");
        assert_eq!(air[0].operand, Operand::Lit(3));
        assert_eq!(air[0].operand_span, Some(Span::new(4, 1)));
    }

    #[test]
    fn flexible_order() {
        // Literal before the mnemonic is dropped, the label still decorates
        let air = parse("start 4 OUT");
        assert_eq!(air[0].label.as_ref().map(|l| l.name.as_str()), Some("start"));
        assert_eq!(air[0].operand, Operand::SubOp(2));
    }

    #[test]
    fn second_mnemonic_ignored() {
        let air = parse("LDA ADD 4");
        assert_eq!(air[0].op, Mnemonic::Lda);
        assert_eq!(air[0].operand, Operand::Lit(4));
    }

    #[test]
    fn label_without_op() {
        let err = AsmParser::new("HLT\nlonely\n").unwrap().parse().unwrap_err();
        assert!(matches!(err, AsmError::MissingOperation { ref label, .. } if label == "lonely"));
    }

    #[test]
    fn lex_errors_surface_early() {
        assert!(matches!(
            AsmParser::new("a b c d"),
            Err(AsmError::TooManyLexemes { line: 0, .. })
        ));
    }
}
