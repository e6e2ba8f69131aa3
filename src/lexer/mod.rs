mod cursor;

pub use cursor::Cursor;

#[derive(Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub len: u32,
}

impl Token {
    fn new(kind: TokenKind, len: u32) -> Token {
        Token { kind, len }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TokenKind {
    /// A run of ASCII letters
    #[strum(serialize = "identifier")]
    Word,
    /// A run of ASCII digits, always non-negative
    #[strum(serialize = "number")]
    Int,
    /// "."
    #[strum(serialize = "'.'")]
    FullStop,
    /// "-"
    #[strum(serialize = "'-'")]
    Hyphen,
    /// ":"
    #[strum(serialize = "':'")]
    Colon,
    /// "("
    #[strum(serialize = "'('")]
    OpenParen,
    /// ")"
    #[strum(serialize = "')'")]
    CloseParen,

    /// Spaces, tabs and stray carriage returns
    #[strum(serialize = "whitespace")]
    Whitespace,
    /// A single "\n"
    #[strum(serialize = "newline")]
    Newline,

    /// Anything else
    #[strum(serialize = "unknown character")]
    Unknown,

    /// End of input
    #[strum(serialize = "end of file")]
    Eof,
}

fn is_whitespace(c: char) -> bool {
    // CR is not a line terminator in chef sources, just noise
    c == ' ' || c == '\t' || c == '\r'
}

impl Cursor<'_> {
    pub fn advance_token(&mut self) -> Token {
        let first_char = match self.bump() {
            Some(c) => c,
            None => return Token::new(TokenKind::Eof, 0),
        };

        let token_kind = match first_char {
            '\n' => TokenKind::Newline,
            c if is_whitespace(c) => self.whitespace(),
            c if c.is_ascii_alphabetic() => self.word(),
            c if c.is_ascii_digit() => self.number(),

            '.' => TokenKind::FullStop,
            '-' => TokenKind::Hyphen,
            ':' => TokenKind::Colon,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,

            _ => TokenKind::Unknown,
        };
        let token = Token::new(token_kind, self.pos_within_token());
        self.reset_pos_within_token();
        token
    }

    fn whitespace(&mut self) -> TokenKind {
        debug_assert!(is_whitespace(self.prev()));
        self.eat_while(is_whitespace);
        TokenKind::Whitespace
    }

    fn word(&mut self) -> TokenKind {
        debug_assert!(self.prev().is_ascii_alphabetic());
        self.eat_while(|c| c.is_ascii_alphabetic());
        TokenKind::Word
    }

    fn number(&mut self) -> TokenKind {
        debug_assert!(self.prev().is_ascii_digit());
        self.eat_while(|c| c.is_ascii_digit());
        TokenKind::Int
    }
}

/// Shorthand macro for [`TokenKind`]
macro_rules! T {
    [word] => {
        $crate::lexer::TokenKind::Word
    };
    [int] => {
        $crate::lexer::TokenKind::Int
    };
    [.] => {
        $crate::lexer::TokenKind::FullStop
    };
    [-] => {
        $crate::lexer::TokenKind::Hyphen
    };
    [:] => {
        $crate::lexer::TokenKind::Colon
    };
    ['('] => {
        $crate::lexer::TokenKind::OpenParen
    };
    [')'] => {
        $crate::lexer::TokenKind::CloseParen
    };
    [ws] => {
        $crate::lexer::TokenKind::Whitespace
    };
    [newline] => {
        $crate::lexer::TokenKind::Newline
    };
    [unknown] => {
        $crate::lexer::TokenKind::Unknown
    };
    [eof] => {
        $crate::lexer::TokenKind::Eof
    };
}
pub(crate) use T;

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn tokenize(input: &str) -> impl Iterator<Item = Token> + '_ {
        let mut cursor = Cursor::new(input);
        std::iter::from_fn(move || {
            let token = cursor.advance_token();
            if token.kind != TokenKind::Eof {
                Some(token)
            } else {
                None
            }
        })
    }

    macro_rules! t {
        ($input:expr, $token_kinds:expr) => {
            let got: Vec<TokenKind> = tokenize($input).map(|t| t.kind).collect();
            assert_eq!(got, $token_kinds, "Input was: '{}'", $input)
        };
    }

    #[test]
    fn word() {
        t!("flour", vec![Word]);
        t!("self raising flour", vec![Word, Whitespace, Word, Whitespace, Word]);
        t!("Pre-heat", vec![Word, Hyphen, Word]);
        t!("Ingredients.", vec![Word, FullStop]);
        t!("word\nanother", vec![Word, Newline, Word]);
    }

    #[test]
    fn number() {
        t!("1", vec![Int]);
        t!("0", vec![Int]);
        t!("111", vec![Int]);
        t!("72 g", vec![Int, Whitespace, Word]);
        t!("2nd", vec![Int, Word]);
        t!("-3", vec![Hyphen, Int]);
    }

    #[test]
    fn punctuation() {
        t!("Cooking time: 25", vec![Word, Whitespace, Word, Colon, Whitespace, Int]);
        t!("(gas mark 4)", vec![OpenParen, Word, Whitespace, Word, Whitespace, Int, CloseParen]);
    }

    #[test]
    fn newlines() {
        t!("a\n\nb", vec![Word, Newline, Newline, Word]);
        t!("a\n  \nb", vec![Word, Newline, Whitespace, Newline, Word]);
        t!("a\r\nb", vec![Word, Whitespace, Newline, Word]);
    }

    #[test]
    fn unknown() {
        t!("caf\u{e9}", vec![Word, Unknown]);
        t!("100%", vec![Int, Unknown]);
    }

    #[test]
    fn statement() {
        const S: TokenKind = Whitespace;
        let input = "Put dry sugar into the 2nd mixing bowl.";
        t!(
            input,
            vec![Word, S, Word, S, Word, S, Word, S, Word, S, Int, Word, S, Word, S, Word, FullStop]
        );
    }
}
