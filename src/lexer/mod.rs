use crate::error::AsmError;
use crate::symbol::{Mnemonic, Span, Word};

/// Most lexemes a single line may hold: label, mnemonic, operand.
pub const MAX_LEXEMES: usize = 3;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Zero-based line index
    pub line: usize,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Op(Mnemonic),
    Label(String),
    Lit(Word),
    /// Emitted once per source line, blank or not.
    Eol,
}

/// Test if a character separates lexemes.
pub(crate) fn is_whitespace(c: char) -> bool {
    // Carriage returns are left over from CRLF sources
    matches!(c, ' ' | '\t' | '\r')
}

/// Remove a trailing `;` comment.
fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Tabs become spaces, runs of spaces collapse to one, ends are trimmed.
pub fn normalize(line: &str) -> String {
    lexemes(strip_comment(line))
        .into_iter()
        .map(|(_, lexeme)| lexeme)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a line into lexemes together with their byte offset in the line.
fn lexemes(line: &str) -> Vec<(usize, &str)> {
    let mut res = Vec::new();
    let mut start = None;
    for (idx, c) in line.char_indices() {
        match (is_whitespace(c), start) {
            (true, Some(begin)) => {
                res.push((begin, &line[begin..idx]));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(begin) = start {
        res.push((begin, &line[begin..]));
    }
    res
}

fn classify(lexeme: &str, span: Span) -> Result<TokenKind, AsmError> {
    if let Ok(op) = lexeme.parse::<Mnemonic>() {
        return Ok(TokenKind::Op(op));
    }
    if let Ok(val) = lexeme.parse::<Word>() {
        return Ok(TokenKind::Lit(val));
    }
    // Numeric, but not something a word can hold
    if lexeme.parse::<f64>().is_ok_and(f64::is_finite) {
        return Err(AsmError::InvalidLiteral {
            lexeme: lexeme.to_string(),
            span,
        });
    }
    Ok(TokenKind::Label(lexeme.to_string()))
}

/// Turn source text into a flat token stream, one `Eol` per line.
pub fn tokenize(src: &str) -> Result<Vec<Token>, AsmError> {
    let mut toks = Vec::new();
    let mut line_offs = 0;

    for (line, text) in src.split('\n').enumerate() {
        let code = strip_comment(text);
        let words = lexemes(code);

        if words.len() > MAX_LEXEMES {
            let (first, _) = words[0];
            let (last, last_word) = words[words.len() - 1];
            return Err(AsmError::TooManyLexemes {
                line,
                content: normalize(code),
                span: Span::new(line_offs + first, last + last_word.len() - first),
            });
        }

        for (offs, lexeme) in words {
            let span = Span::new(line_offs + offs, lexeme.len());
            toks.push(Token {
                kind: classify(lexeme, span)?,
                span,
                line,
            });
        }
        toks.push(Token {
            kind: TokenKind::Eol,
            span: Span::new(line_offs + text.len(), 0),
            line,
        });

        line_offs += text.len() + 1;
    }
    Ok(toks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|tok| tok.kind)
            .collect()
    }

    #[test]
    fn classifies_lexemes() {
        assert_eq!(
            kinds("loop LDA -12"),
            vec![
                TokenKind::Label("loop".into()),
                TokenKind::Op(Mnemonic::Lda),
                TokenKind::Lit(-12),
                TokenKind::Eol,
            ]
        );
    }

    #[test]
    fn keywords_need_exact_case() {
        assert_eq!(
            kinds("lda"),
            vec![TokenKind::Label("lda".into()), TokenKind::Eol]
        );
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize("\t x \t  DAT    5  \r"), "x DAT 5");
        assert_eq!(
            kinds("\tOUT  \t"),
            vec![TokenKind::Op(Mnemonic::Out), TokenKind::Eol]
        );
    }

    #[test]
    fn blank_lines_only_terminate() {
        assert_eq!(
            kinds("HLT\n\n   \n"),
            vec![
                TokenKind::Op(Mnemonic::Hlt),
                TokenKind::Eol,
                TokenKind::Eol,
                TokenKind::Eol,
                TokenKind::Eol,
            ]
        );
    }

    #[test]
    fn strips_comments() {
        assert_eq!(
            kinds("OUT ; print the result now"),
            vec![TokenKind::Op(Mnemonic::Out), TokenKind::Eol]
        );
    }

    #[test]
    fn too_many_lexemes() {
        let err = tokenize("HLT\na  b LDA  c").unwrap_err();
        assert_eq!(
            err,
            AsmError::TooManyLexemes {
                line: 1,
                content: "a b LDA c".into(),
                span: Span::new(4, 11),
            }
        );
    }

    #[test]
    fn rejects_fractions() {
        let err = tokenize("DAT 1.5").unwrap_err();
        assert!(matches!(err, AsmError::InvalidLiteral { ref lexeme, .. } if lexeme == "1.5"));
        // Not numbers at all, so labels
        assert_eq!(
            kinds("inf nan"),
            vec![
                TokenKind::Label("inf".into()),
                TokenKind::Label("nan".into()),
                TokenKind::Eol,
            ]
        );
    }

    #[test]
    fn spans_point_into_source() {
        let src = "HLT\n  x DAT 7";
        let toks = tokenize(src).unwrap();
        let dat = &toks[3];
        assert_eq!(dat.kind, TokenKind::Op(Mnemonic::Dat));
        assert_eq!(dat.line, 1);
        assert_eq!(&src[std::ops::Range::from(dat.span)], "DAT");
    }
}
