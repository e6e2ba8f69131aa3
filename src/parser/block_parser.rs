use crate::error::{SourceDiag, SourceReport};
use crate::lexer::{TokenKind, T};
use crate::span::Span;

use super::token_stream::Token;

macro_rules! debug_assert_adjacent {
    ($s:expr) => {
        debug_assert!(
            $s.windows(2).all(|w| w[0].span.end() == w[1].span.start()),
            "tokens are not adjacent"
        )
    };
}

fn is_separator(kind: TokenKind) -> bool {
    // newlines inside a statement are just spaces, lines and statements are
    // already split by the time a block parser walks them
    matches!(kind, T![ws] | T![newline])
}

/// Cursor over a slice of spanned tokens
///
/// All consuming helpers skip whitespace first; Chef whitespace is only ever
/// a separator. Names and titles are recovered from the source text through
/// spans, so the skipped tokens are never lost.
pub(crate) struct BlockParser<'t, 'i> {
    tokens: &'t [Token],
    pub(crate) current: usize,
    pub(crate) input: &'i str,
    report: &'t mut SourceReport,
}

impl<'t, 'i> BlockParser<'t, 'i> {
    /// Create it from separate parts.
    /// - tokens must be adjacent (checked in debug)
    /// - tokens's spans must refer to the input (checked in debug)
    pub(crate) fn new(tokens: &'t [Token], input: &'i str, report: &'t mut SourceReport) -> Self {
        debug_assert!(
            tokens.is_empty()
                || (tokens.first().unwrap().span.start() < input.len()
                    && tokens.last().unwrap().span.end() <= input.len()),
            "tokens out of input bounds"
        );
        debug_assert_adjacent!(tokens);
        Self {
            tokens,
            current: 0,
            input,
            report,
        }
    }

    pub(crate) fn error(&mut self, error: SourceDiag) {
        debug_assert!(error.is_error());
        self.report.error(error);
    }

    pub(crate) fn warn(&mut self, warn: SourceDiag) {
        debug_assert!(warn.is_warning());
        self.report.warn(warn);
    }

    /// Runs a function that can fail to parse the input.
    ///
    /// If the function fails, any token eaten by it will be restored. Note
    /// that diagnostics already pushed are not rolled back.
    pub(crate) fn with_recover<F, O>(&mut self, f: F) -> Option<O>
    where
        F: FnOnce(&mut Self) -> Option<O>,
    {
        let old_current = self.current;
        let r = f(self);
        if r.is_none() {
            self.current = old_current;
        }
        r
    }

    /// Gets a token's matching str from the input
    pub(crate) fn token_str(&self, token: Token) -> &'i str {
        &self.input[token.span.range()]
    }

    /// Source text covered by a token slice, untrimmed
    pub(crate) fn slice_str(&self, s: &[Token]) -> &'i str {
        debug_assert_adjacent!(s);
        if s.is_empty() {
            return "";
        }
        let start = s.first().unwrap().span.start();
        let end = s.last().unwrap().span.end();
        &self.input[start..end]
    }

    /// Span of a token slice. Empty slices get the current position.
    pub(crate) fn slice_span(&self, s: &[Token]) -> Span {
        match (s.first(), s.last()) {
            (Some(first), Some(last)) => Span::new(first.span.start(), last.span.end()),
            _ => self.current_span(),
        }
    }

    /// A position span at the current token, or past the block if consumed
    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.current) {
            Some(t) => Span::pos(t.span.start()),
            None => Span::pos(
                self.tokens
                    .last()
                    .map(|t| t.span.end())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Advance over whitespace
    pub(crate) fn skip_ws(&mut self) {
        while self
            .tokens
            .get(self.current)
            .is_some_and(|t| is_separator(t.kind))
        {
            self.current += 1;
        }
    }

    fn first_meaningful(&self) -> Option<Token> {
        self.tokens[self.current..]
            .iter()
            .find(|t| !is_separator(t.kind))
            .copied()
    }

    /// Peeks the literal next token, whitespace included. Needed to check
    /// adjacency, e.g. the `nd` right after the `2` of an ordinal.
    pub(crate) fn peek_raw(&self) -> Option<Token> {
        self.tokens.get(self.current).copied()
    }

    /// Peeks the next non-whitespace token kind without consuming it.
    pub(crate) fn peek(&self) -> TokenKind {
        self.first_meaningful()
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Peeks the next non-whitespace token without consuming it.
    pub(crate) fn peek_token(&self) -> Option<Token> {
        self.first_meaningful()
    }

    /// Checks the next token without consuming it.
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    /// Checks the next token against an exact identifier, case sensitive.
    pub(crate) fn at_word(&self, word: &str) -> bool {
        self.first_meaningful()
            .is_some_and(|t| t.kind == T![word] && self.token_str(t) == word)
    }

    /// Checks the next token against any of the given identifiers.
    pub(crate) fn at_any_word(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.at_word(w))
    }

    /// Advance to the next non-whitespace token.
    #[must_use]
    pub(crate) fn next_token(&mut self) -> Option<Token> {
        self.skip_ws();
        if let Some(token) = self.tokens.get(self.current) {
            self.current += 1;
            Some(*token)
        } else {
            None
        }
    }

    /// Call [`Self::next_token`] if the next token is `expected`.
    #[must_use]
    pub(crate) fn consume(&mut self, expected: TokenKind) -> Option<Token> {
        if self.at(expected) {
            self.next_token()
        } else {
            None
        }
    }

    /// Consume the next token if it is exactly the identifier `word`.
    #[must_use]
    pub(crate) fn consume_word(&mut self, word: &str) -> Option<Token> {
        if self.at_word(word) {
            self.next_token()
        } else {
            None
        }
    }

    /// Consume up to (not including) the LAST identifier equal to `word`
    /// among the remaining tokens, returning the consumed slice.
    ///
    /// Ingredient names may contain spaces, so the separator keyword of a
    /// statement is searched from the end.
    #[must_use]
    pub(crate) fn until_last_word(&mut self, word: &str) -> Option<&'t [Token]> {
        let rest = self.rest();
        let pos = rest
            .iter()
            .rposition(|t| t.kind == T![word] && self.token_str(*t) == word)?;
        let s = &rest[..pos];
        self.current += pos;
        Some(s)
    }

    /// Check if any remaining token is the identifier `word`
    pub(crate) fn contains_word(&self, word: &str) -> bool {
        self.rest()
            .iter()
            .any(|t| t.kind == T![word] && self.token_str(*t) == word)
    }

    /// Returns the not yet parsed tokens
    pub(crate) fn rest(&self) -> &'t [Token] {
        self.tokens.split_at(self.current).1
    }

    pub(crate) fn consume_rest(&mut self) -> &'t [Token] {
        let r = self.rest();
        self.current += r.len();
        r
    }

    /// Check there is nothing meaningful left
    pub(crate) fn at_end(&self) -> bool {
        self.peek() == TokenKind::Eof
    }
}
