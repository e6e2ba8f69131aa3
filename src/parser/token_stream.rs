//! Adapter that attaches spans to the raw lexer tokens

use crate::lexer::{Cursor, TokenKind};
use crate::span::Span;

/// A token with its location in the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn len(&self) -> usize {
        self.span.len()
    }
}

/// Iterator over the spanned tokens of the input. Ends before yielding
/// [`TokenKind::Eof`].
pub(crate) struct TokenStream<'i> {
    cursor: Cursor<'i>,
    offset: usize,
}

impl<'i> TokenStream<'i> {
    pub fn new(input: &'i str) -> Self {
        Self {
            cursor: Cursor::new(input),
            offset: 0,
        }
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.cursor.advance_token();
        if token.kind == TokenKind::Eof {
            return None;
        }
        let start = self.offset;
        self.offset += token.len as usize;
        Some(Token {
            kind: token.kind,
            span: Span::new(start, self.offset),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::T;

    #[test]
    fn spans_are_adjacent() {
        let input = "Put sugar into the mixing bowl.\n";
        let tokens: Vec<_> = TokenStream::new(input).collect();
        assert_eq!(tokens.first().unwrap().span.start(), 0);
        assert_eq!(tokens.last().unwrap().span.end(), input.len());
        assert!(tokens.windows(2).all(|w| w[0].span.end() == w[1].span.start()));
        assert_eq!(tokens.last().unwrap().kind, T![newline]);
    }

    #[test]
    fn token_text_roundtrip() {
        let input = "72 g haricot beans";
        for tok in TokenStream::new(input) {
            let text = &input[tok.span.range()];
            assert_eq!(text.len(), tok.len());
        }
    }
}
