//! Lexical analyzer for Jack source.
//!
//! Produces the full token sequence up front; the parser consumes it
//! through an indexed cursor with one-token lookahead.

use crate::error::{CompileError, Result};
use crate::token::{Keyword, Span, SpannedToken, Token, is_symbol};

pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input. The first lexical error aborts.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;
            if self.at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> Span {
        Span::new(self.line, self.column)
    }

    /// Skip whitespace, `//` line comments, and `/* */` block comments.
    /// Block comments do not nest; the first `*/` closes the comment.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            if self.peek() != Some('/') {
                return Ok(());
            }

            match self.peek_next() {
                Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('*') => {
                    let open = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        if self.at_end() {
                            return Err(CompileError::lexical(open, "unterminated block comment"));
                        }
                        if self.peek() == Some('*') && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<SpannedToken> {
        let span = self.here();
        let c = match self.peek() {
            Some(c) => c,
            None => return Err(CompileError::lexical(span, "unexpected end of input")),
        };

        if is_symbol(c) {
            self.advance();
            return Ok(SpannedToken::new(Token::Symbol(c), span));
        }
        if c.is_ascii_digit() {
            return self.read_integer(span);
        }
        if c == '"' {
            return self.read_string(span);
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.read_word(span));
        }

        Err(CompileError::lexical(
            span,
            format!("unexpected character '{c}'"),
        ))
    }

    fn read_integer(&mut self, span: Span) -> Result<SpannedToken> {
        let mut value: u32 = 0;
        while let Some(c) = self.peek() {
            match c.to_digit(10) {
                Some(d) => {
                    self.advance();
                    value = value * 10 + d;
                    if value > 32767 {
                        return Err(CompileError::lexical(
                            span,
                            "integer constant exceeds 32767",
                        ));
                    }
                }
                None => break,
            }
        }
        Ok(SpannedToken::new(Token::IntConst(value as u16), span))
    }

    fn read_string(&mut self, span: Span) -> Result<SpannedToken> {
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return Ok(SpannedToken::new(Token::StrConst(value), span));
                }
                Some('\n') | None => {
                    return Err(CompileError::lexical(span, "unterminated string constant"));
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_word(&mut self, span: Span) -> SpannedToken {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let token = match Keyword::parse(&word) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier(word),
        };
        SpannedToken::new(token, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Tokenizer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(tokens("class"), vec![Token::Keyword(Keyword::Class)]);
        assert_eq!(
            tokens("className"),
            vec![Token::Identifier("className".to_string())]
        );
        assert_eq!(tokens("_x1"), vec![Token::Identifier("_x1".to_string())]);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(
            tokens("{(~;"),
            vec![
                Token::Symbol('{'),
                Token::Symbol('('),
                Token::Symbol('~'),
                Token::Symbol(';'),
            ]
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(tokens("0 32767"), vec![
            Token::IntConst(0),
            Token::IntConst(32767),
        ]);
        assert!(Tokenizer::new("32768").tokenize().is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokens("\"hello world\""),
            vec![Token::StrConst("hello world".to_string())]
        );
        assert!(Tokenizer::new("\"no closing quote").tokenize().is_err());
        assert!(Tokenizer::new("\"line\nbreak\"").tokenize().is_err());
    }

    #[test]
    fn test_string_may_contain_slashes() {
        assert_eq!(
            tokens("\"a // b\""),
            vec![Token::StrConst("a // b".to_string())]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            tokens("// line\nclass /* inline */ Main /** doc */ {"),
            vec![
                Token::Keyword(Keyword::Class),
                Token::Identifier("Main".to_string()),
                Token::Symbol('{'),
            ]
        );
    }

    #[test]
    fn test_multiline_block_comment() {
        assert_eq!(
            tokens("/* first\nsecond\nthird */ return"),
            vec![Token::Keyword(Keyword::Return)]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert!(Tokenizer::new("/* never closed").tokenize().is_err());
    }

    #[test]
    fn test_illegal_character() {
        assert!(Tokenizer::new("let x = #;").tokenize().is_err());
    }

    #[test]
    fn test_spans_track_lines() {
        let toks = Tokenizer::new("class\n  Main").tokenize().unwrap();
        assert_eq!(toks[0].span, Span::new(1, 1));
        assert_eq!(toks[1].span, Span::new(2, 3));
    }

    #[test]
    fn test_statement_stream() {
        let toks = tokens("let x = x + 1;");
        assert_eq!(toks.len(), 7);
        assert_eq!(toks[0], Token::Keyword(Keyword::Let));
        assert_eq!(toks[3], Token::Identifier("x".to_string()));
        assert_eq!(toks[4], Token::Symbol('+'));
    }
}
