//! Liberty tokenizer.
//!
//! Produces punctuation, bare words, and quoted strings with line numbers.
//! Handles `/* */` and `// ...` comments, backslash line continuations
//! (inside and outside quoted strings), and treats identifiers, numbers,
//! and unit-suffixed values uniformly as words; the parser decides what is
//! numeric.

use crate::error::LibertyError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Semi,
    Comma,
    Eq,
    Word(String),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    filename: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, filename: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            filename,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<u8> {
        self.src.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn skip_trivia(&mut self) -> Result<(), LibertyError> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.bump();
                }
                // Line continuation.
                Some(b'\\') if matches!(self.peek2(), Some(b'\n') | Some(b'\r')) => {
                    self.bump();
                    if self.peek() == Some(b'\r') {
                        self.bump();
                    }
                    self.bump();
                }
                Some(b'/') if self.peek2() == Some(b'*') => {
                    let start_line = self.line;
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some(b'*') if self.peek() == Some(b'/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(LibertyError::syntax(
                                    self.filename,
                                    start_line,
                                    "unterminated comment",
                                ));
                            }
                        }
                    }
                }
                Some(b'/') if self.peek2() == Some(b'/') => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn quoted_string(&mut self) -> Result<Token, LibertyError> {
        let line = self.line;
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                Some(b'"') => break,
                Some(b'\\') => match self.bump() {
                    // Continuation inside a string drops the newline.
                    Some(b'\n') => {}
                    Some(b'\r') => {
                        if self.peek() == Some(b'\n') {
                            self.bump();
                        }
                    }
                    Some(ch) => text.push(ch as char),
                    None => {
                        return Err(LibertyError::syntax(
                            self.filename,
                            line,
                            "unterminated string",
                        ));
                    }
                },
                Some(ch) => text.push(ch as char),
                None => {
                    return Err(LibertyError::syntax(
                        self.filename,
                        line,
                        "unterminated string",
                    ));
                }
            }
        }
        Ok(Token {
            kind: TokenKind::Str(text),
            line,
        })
    }

    fn word(&mut self) -> Token {
        let line = self.line;
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                b'{' | b'}' | b'(' | b')' | b':' | b';' | b',' | b'=' | b'"' | b' ' | b'\t'
                | b'\r' | b'\n' => break,
                b'\\' if matches!(self.peek2(), Some(b'\n') | Some(b'\r')) => break,
                _ => {
                    text.push(ch as char);
                    self.bump();
                }
            }
        }
        Token {
            kind: TokenKind::Word(text),
            line,
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, LibertyError> {
        self.skip_trivia()?;
        let line = self.line;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        let punct = |kind| {
            Ok(Some(Token { kind, line }))
        };
        match ch {
            b'{' => {
                self.bump();
                punct(TokenKind::LBrace)
            }
            b'}' => {
                self.bump();
                punct(TokenKind::RBrace)
            }
            b'(' => {
                self.bump();
                punct(TokenKind::LParen)
            }
            b')' => {
                self.bump();
                punct(TokenKind::RParen)
            }
            b':' => {
                self.bump();
                punct(TokenKind::Colon)
            }
            b';' => {
                self.bump();
                punct(TokenKind::Semi)
            }
            b',' => {
                self.bump();
                punct(TokenKind::Comma)
            }
            b'=' => {
                self.bump();
                punct(TokenKind::Eq)
            }
            b'"' => Ok(Some(self.quoted_string()?)),
            _ => Ok(Some(self.word())),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LibertyError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src, "test.lib")
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn punctuation_and_words() {
        let toks = kinds("library (demo) { time_unit : \"1ns\" ; }");
        assert_eq!(
            toks,
            vec![
                TokenKind::Word("library".into()),
                TokenKind::LParen,
                TokenKind::Word("demo".into()),
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Word("time_unit".into()),
                TokenKind::Colon,
                TokenKind::Str("1ns".into()),
                TokenKind::Semi,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let toks = kinds("a /* hide { } */ b // rest of line\nc");
        assert_eq!(
            toks,
            vec![
                TokenKind::Word("a".into()),
                TokenKind::Word("b".into()),
                TokenKind::Word("c".into()),
            ]
        );
    }

    #[test]
    fn line_continuation() {
        let toks = kinds("values ( \"1, 2\" , \\\n \"3, 4\" );");
        assert_eq!(
            toks,
            vec![
                TokenKind::Word("values".into()),
                TokenKind::LParen,
                TokenKind::Str("1, 2".into()),
                TokenKind::Comma,
                TokenKind::Str("3, 4".into()),
                TokenKind::RParen,
                TokenKind::Semi,
            ]
        );
    }

    #[test]
    fn string_escapes_and_continuation() {
        let toks = kinds("f : \"a\\\"b\";");
        assert_eq!(toks[2], TokenKind::Str("a\"b".into()));
        let toks = kinds("v : \"0.1, \\\n0.2\";");
        assert_eq!(toks[2], TokenKind::Str("0.1, 0.2".into()));
    }

    #[test]
    fn line_numbers_advance() {
        let toks = Lexer::new("a\nb\n  c", "test.lib").tokenize().unwrap();
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].line, 2);
        assert_eq!(toks[2].line, 3);
    }

    #[test]
    fn unterminated_comment_errors() {
        assert!(Lexer::new("/* oops", "test.lib").tokenize().is_err());
    }
}
