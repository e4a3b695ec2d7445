//! Parser for Liberty boolean function expressions.
//!
//! Grammar, loosest binding first: `+`/`|` (or), `*`/`&`/juxtaposition
//! (and), `^` (xor), `!`/postfix-`'` (not), parentheses, the constants
//! `0`/`1`, and port names (including bus bits like `D[3]`).

use std::fmt;

use arclight_model::{FuncExpr, LibertyCell};

#[derive(Debug, Clone, PartialEq)]
pub struct ExprError {
    pub message: String,
}

impl ExprError {
    fn new(message: impl Into<String>) -> Self {
        ExprError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExprError {}

#[derive(Debug, Clone, PartialEq)]
enum ExprToken {
    Port(String),
    Zero,
    One,
    Not,
    Quote,
    And,
    Or,
    Xor,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Result<Vec<ExprToken>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let ch = bytes[i];
        match ch {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
            }
            b'!' => {
                tokens.push(ExprToken::Not);
                i += 1;
            }
            b'\'' => {
                tokens.push(ExprToken::Quote);
                i += 1;
            }
            b'*' | b'&' => {
                tokens.push(ExprToken::And);
                i += 1;
            }
            b'+' | b'|' => {
                tokens.push(ExprToken::Or);
                i += 1;
            }
            b'^' => {
                tokens.push(ExprToken::Xor);
                i += 1;
            }
            b'(' => {
                tokens.push(ExprToken::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(ExprToken::RParen);
                i += 1;
            }
            b'0' if !matches!(bytes.get(i + 1), Some(c) if is_name_char(*c)) => {
                tokens.push(ExprToken::Zero);
                i += 1;
            }
            b'1' if !matches!(bytes.get(i + 1), Some(c) if is_name_char(*c)) => {
                tokens.push(ExprToken::One);
                i += 1;
            }
            c if is_name_char(c) => {
                let start = i;
                while i < bytes.len() && is_name_char(bytes[i]) {
                    i += 1;
                }
                // Bus bit subscript.
                if i < bytes.len() && bytes[i] == b'[' {
                    while i < bytes.len() && bytes[i] != b']' {
                        i += 1;
                    }
                    if i == bytes.len() {
                        return Err(ExprError::new("unterminated bus subscript"));
                    }
                    i += 1;
                }
                tokens.push(ExprToken::Port(text[start..i].to_string()));
            }
            other => {
                return Err(ExprError::new(format!(
                    "unexpected character '{}'",
                    other as char
                )));
            }
        }
    }
    Ok(tokens)
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || c == b'\\' || c == b'/'
}

struct ExprParser<'a> {
    tokens: Vec<ExprToken>,
    pos: usize,
    cell: &'a LibertyCell,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<ExprToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // or := and (('+'|'|') and)*
    fn parse_or(&mut self) -> Result<FuncExpr, ExprError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&ExprToken::Or) {
            self.bump();
            let right = self.parse_and()?;
            left = FuncExpr::make_or(left, right);
        }
        Ok(left)
    }

    // and := xor (('*'|'&'|juxtaposition) xor)*
    fn parse_and(&mut self) -> Result<FuncExpr, ExprError> {
        let mut left = self.parse_xor()?;
        loop {
            match self.peek() {
                Some(ExprToken::And) => {
                    self.bump();
                }
                // Juxtaposition: a following operand is an implicit AND.
                Some(ExprToken::Port(_))
                | Some(ExprToken::Zero)
                | Some(ExprToken::One)
                | Some(ExprToken::Not)
                | Some(ExprToken::LParen) => {}
                _ => break,
            }
            let right = self.parse_xor()?;
            left = FuncExpr::make_and(left, right);
        }
        Ok(left)
    }

    // xor := unary ('^' unary)*
    fn parse_xor(&mut self) -> Result<FuncExpr, ExprError> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some(&ExprToken::Xor) {
            self.bump();
            let right = self.parse_unary()?;
            left = FuncExpr::make_xor(left, right);
        }
        Ok(left)
    }

    // unary := '!' unary | primary '\''*
    fn parse_unary(&mut self) -> Result<FuncExpr, ExprError> {
        if self.peek() == Some(&ExprToken::Not) {
            self.bump();
            let expr = self.parse_unary()?;
            return Ok(FuncExpr::make_not(expr));
        }
        let mut expr = self.parse_primary()?;
        while self.peek() == Some(&ExprToken::Quote) {
            self.bump();
            expr = FuncExpr::make_not(expr);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<FuncExpr, ExprError> {
        match self.bump() {
            Some(ExprToken::Zero) => Ok(FuncExpr::make_zero()),
            Some(ExprToken::One) => Ok(FuncExpr::make_one()),
            Some(ExprToken::LParen) => {
                let expr = self.parse_or()?;
                match self.bump() {
                    Some(ExprToken::RParen) => Ok(expr),
                    _ => Err(ExprError::new("missing ')'")),
                }
            }
            Some(ExprToken::Port(name)) => match self.cell.find_port(&name) {
                Some(port) => Ok(FuncExpr::make_port(port)),
                None => Err(ExprError::new(format!("port {name} not found"))),
            },
            other => Err(ExprError::new(format!("unexpected token {other:?}"))),
        }
    }
}

/// Parse a function expression against a cell's (complete) port set.
pub fn parse_func_expr(cell: &LibertyCell, text: &str) -> Result<FuncExpr, ExprError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(ExprError::new("empty expression"));
    }
    let mut parser = ExprParser {
        tokens,
        pos: 0,
        cell,
    };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(ExprError::new("trailing tokens in expression"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arclight_model::{LibertyCell, PortDirection, TimingSense};

    fn cell() -> LibertyCell {
        let mut cell = LibertyCell::new("X", "test.lib");
        cell.add_port("A", PortDirection::Input);
        cell.add_port("B", PortDirection::Input);
        cell.add_port("EN", PortDirection::Input);
        cell.add_bus_port("D", 1, 0, PortDirection::Input);
        cell
    }

    #[test]
    fn and_or_not() {
        let cell = cell();
        let a = cell.find_port("A").unwrap();
        let b = cell.find_port("B").unwrap();
        let expr = parse_func_expr(&cell, "A*B").unwrap();
        assert_eq!(expr.port_timing_sense(a), TimingSense::PositiveUnate);
        assert_eq!(expr.port_timing_sense(b), TimingSense::PositiveUnate);
        assert_eq!(expr.to_string(&cell), "A*B");

        let expr = parse_func_expr(&cell, "!A + B'").unwrap();
        assert_eq!(expr.port_timing_sense(a), TimingSense::NegativeUnate);
        assert_eq!(expr.port_timing_sense(b), TimingSense::NegativeUnate);
    }

    #[test]
    fn juxtaposition_is_and() {
        let cell = cell();
        let with_star = parse_func_expr(&cell, "A*B").unwrap();
        let with_space = parse_func_expr(&cell, "A B").unwrap();
        assert!(FuncExpr::equiv(Some(&with_star), Some(&with_space)));
    }

    #[test]
    fn parens_and_xor() {
        let cell = cell();
        let a = cell.find_port("A").unwrap();
        let expr = parse_func_expr(&cell, "(A+B)^EN").unwrap();
        assert_eq!(expr.port_timing_sense(a), TimingSense::NonUnate);
    }

    #[test]
    fn constants_and_bus_bits() {
        let cell = cell();
        assert!(FuncExpr::equiv(
            Some(&parse_func_expr(&cell, "0").unwrap()),
            Some(&FuncExpr::make_zero())
        ));
        let bit = parse_func_expr(&cell, "D[0]").unwrap();
        assert_eq!(bit.port(), cell.find_port("D[0]"));
    }

    #[test]
    fn unknown_port_is_an_error() {
        let cell = cell();
        let err = parse_func_expr(&cell, "A*Q").unwrap_err();
        assert!(err.message.contains("Q"));
    }
}
