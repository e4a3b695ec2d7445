//! Token stream → `LibertyGroup` tree.
//!
//! Liberty is a uniform group/attribute syntax; the parser builds the
//! statement tree the reader visits. Unknown constructs are kept in the
//! tree so reader subclass hooks can see them.

use crate::error::LibertyError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::stmt::{
    LibertyAttr, LibertyAttrType, LibertyAttrValue, LibertyDefine, LibertyGroup, LibertyStmt,
    LibertyVariable,
};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    filename: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, filename: &'a str) -> Result<Self, LibertyError> {
        let tokens = Lexer::new(src, filename).tokenize()?;
        Ok(Parser {
            tokens,
            pos: 0,
            filename,
        })
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn line(&self) -> u32 {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(0, |t| t.line)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, LibertyError> {
        match self.bump() {
            Some(token) if token.kind == *kind => Ok(token),
            Some(token) => Err(LibertyError::syntax(
                self.filename,
                token.line,
                format!("expected {what}"),
            )),
            None => Err(LibertyError::syntax(
                self.filename,
                self.line(),
                format!("expected {what}, found end of file"),
            )),
        }
    }

    fn syntax(&self, line: u32, message: impl Into<String>) -> LibertyError {
        LibertyError::syntax(self.filename, line, message)
    }

    /// Parse the file's top-level `library` group.
    pub fn parse_library(&mut self) -> Result<LibertyGroup, LibertyError> {
        loop {
            match self.peek() {
                None => {
                    return Err(LibertyError::NoLibrary {
                        filename: self.filename.to_string(),
                    });
                }
                Some(TokenKind::Word(_)) => {
                    let stmt = self.parse_stmt()?;
                    if let LibertyStmt::Group(group) = stmt {
                        return Ok(group);
                    }
                }
                Some(_) => {
                    let line = self.line();
                    return Err(self.syntax(line, "expected a group"));
                }
            }
        }
    }

    fn attr_value(token: Token, filename: &str) -> Result<LibertyAttrValue, LibertyError> {
        match token.kind {
            TokenKind::Str(s) => Ok(LibertyAttrValue::String(s)),
            TokenKind::Word(w) => match w.parse::<f32>() {
                Ok(f) => Ok(LibertyAttrValue::Float(f)),
                Err(_) => Ok(LibertyAttrValue::String(w)),
            },
            _ => Err(LibertyError::syntax(
                filename,
                token.line,
                "expected a value",
            )),
        }
    }

    fn parse_stmt(&mut self) -> Result<LibertyStmt, LibertyError> {
        let name_token = self.bump().ok_or_else(|| {
            self.syntax(self.line(), "unexpected end of file")
        })?;
        let line = name_token.line;
        let name = match name_token.kind {
            TokenKind::Word(w) => w,
            TokenKind::Str(s) => s,
            _ => return Err(self.syntax(line, "expected a statement name")),
        };
        match self.peek() {
            // name : value ;
            Some(TokenKind::Colon) => {
                self.bump();
                let value_token = self
                    .bump()
                    .ok_or_else(|| self.syntax(line, "missing attribute value"))?;
                let value = Self::attr_value(value_token, self.filename)?;
                // Trailing semicolon is conventional but optional.
                if self.peek() == Some(&TokenKind::Semi) {
                    self.bump();
                }
                Ok(LibertyStmt::Attr(LibertyAttr::Simple { name, value, line }))
            }
            // name = value ;
            Some(TokenKind::Eq) => {
                self.bump();
                let value_token = self
                    .bump()
                    .ok_or_else(|| self.syntax(line, "missing variable value"))?;
                let value = match Self::attr_value(value_token, self.filename)? {
                    LibertyAttrValue::Float(f) => f,
                    LibertyAttrValue::String(s) => {
                        return Err(self.syntax(line, format!("variable {name} = {s} is not numeric")));
                    }
                };
                if self.peek() == Some(&TokenKind::Semi) {
                    self.bump();
                }
                Ok(LibertyStmt::Variable(LibertyVariable { name, value, line }))
            }
            // name ( params ) { ... }  |  name ( values ) ;
            Some(TokenKind::LParen) => {
                self.bump();
                let mut values = Vec::new();
                loop {
                    match self.peek() {
                        Some(TokenKind::RParen) => {
                            self.bump();
                            break;
                        }
                        Some(TokenKind::Comma) => {
                            self.bump();
                        }
                        Some(_) => {
                            let token = self.bump().unwrap();
                            values.push(Self::attr_value(token, self.filename)?);
                        }
                        None => {
                            return Err(self.syntax(line, "unterminated parameter list"));
                        }
                    }
                }
                if self.peek() == Some(&TokenKind::LBrace) {
                    self.bump();
                    let names = values.iter().map(ToString::to_string).collect();
                    let mut children = Vec::new();
                    loop {
                        match self.peek() {
                            Some(TokenKind::RBrace) => {
                                self.bump();
                                break;
                            }
                            Some(TokenKind::Semi) => {
                                self.bump();
                            }
                            Some(_) => children.push(self.parse_stmt()?),
                            None => {
                                return Err(self.syntax(line, "unterminated group"));
                            }
                        }
                    }
                    Ok(LibertyStmt::Group(LibertyGroup {
                        group_type: name,
                        names,
                        children,
                        line,
                    }))
                } else {
                    if self.peek() == Some(&TokenKind::Semi) {
                        self.bump();
                    }
                    if name == "define" {
                        return self.make_define(values, line);
                    }
                    Ok(LibertyStmt::Attr(LibertyAttr::Complex { name, values, line }))
                }
            }
            _ => Err(self.syntax(line, format!("unexpected statement {name}"))),
        }
    }

    fn make_define(
        &self,
        values: Vec<LibertyAttrValue>,
        line: u32,
    ) -> Result<LibertyStmt, LibertyError> {
        if values.len() == 3 {
            let as_name = |v: &LibertyAttrValue| v.to_string();
            Ok(LibertyStmt::Define(LibertyDefine {
                name: as_name(&values[0]),
                group_type: as_name(&values[1]),
                value_type: LibertyAttrType::find(&as_name(&values[2])),
                line,
            }))
        } else {
            Err(self.syntax(line, "define requires (name, group, type)"))
        }
    }
}

/// Parse Liberty text into its `library` group.
pub fn parse_liberty(src: &str, filename: &str) -> Result<LibertyGroup, LibertyError> {
    Parser::new(src, filename)?.parse_library()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_groups() {
        let src = r#"
library (demo) {
  time_unit : "1ns";
  cell (BUF1) {
    area : 2.0;
    pin (Z) {
      direction : output;
      function : "A";
    }
  }
}
"#;
        let library = parse_liberty(src, "demo.lib").unwrap();
        assert_eq!(library.group_type, "library");
        assert_eq!(library.first_name(), Some("demo"));
        assert_eq!(library.children.len(), 2);
        match &library.children[1] {
            LibertyStmt::Group(cell) => {
                assert_eq!(cell.group_type, "cell");
                assert_eq!(cell.first_name(), Some("BUF1"));
                match &cell.children[0] {
                    LibertyStmt::Attr(attr) => {
                        assert_eq!(attr.name(), "area");
                        assert_eq!(attr.first_value().unwrap().as_float(), Some(2.0));
                    }
                    other => panic!("expected area attr, got {other:?}"),
                }
            }
            other => panic!("expected cell group, got {other:?}"),
        }
    }

    #[test]
    fn parses_complex_attrs_and_defines() {
        let src = r#"
library (demo) {
  capacitive_load_unit (1, pf);
  define (thingy, cell, string);
  voltage_map (VDD, 1.1);
}
"#;
        let library = parse_liberty(src, "demo.lib").unwrap();
        match &library.children[0] {
            LibertyStmt::Attr(LibertyAttr::Complex { name, values, .. }) => {
                assert_eq!(name, "capacitive_load_unit");
                assert_eq!(values[0].as_float(), Some(1.0));
                assert_eq!(values[1].as_str(), Some("pf"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &library.children[1] {
            LibertyStmt::Define(define) => {
                assert_eq!(define.name, "thingy");
                assert_eq!(define.group_type, "cell");
                assert_eq!(define.value_type, LibertyAttrType::String);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_variables() {
        let src = "library (demo) { VDD = 1.21; }";
        let library = parse_liberty(src, "demo.lib").unwrap();
        match &library.children[0] {
            LibertyStmt::Variable(var) => {
                assert_eq!(var.name, "VDD");
                assert_eq!(var.value, 1.21);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn syntax_error_carries_line() {
        let src = "library (demo) {\n  area ;\n}";
        let err = parse_liberty(src, "demo.lib").unwrap_err();
        match err {
            LibertyError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_library_reports() {
        assert!(matches!(
            parse_liberty("", "empty.lib"),
            Err(LibertyError::NoLibrary { .. })
        ));
    }
}
