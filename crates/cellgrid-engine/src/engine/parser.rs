//! Formula parser.
//!
//! Hand-written tokenizer + recursive descent over the infix grammar:
//!
//! ```text
//! expr    := term  (('+'|'-') term)*
//! term    := unary (('*'|'/') unary)*
//! unary   := ('+'|'-') unary | primary
//! primary := NUMBER | CELLID | ('min'|'max') '(' expr ',' expr ')' | '(' expr ')'
//! ```
//!
//! The parser is pure and deterministic: no side effects, identical output
//! for identical input. Malformed input fails with a [`ParseError`] carrying
//! the byte offset of the offending token; no partial tree is produced.

use thiserror::Error;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::cell_id::CellId;

/// A formula that does not match the grammar.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("syntax error at offset {pos}: {message}")]
pub struct ParseError {
    pub pos: usize,
    pub message: String,
}

impl ParseError {
    fn new(pos: usize, message: impl Into<String>) -> ParseError {
        ParseError {
            pos,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Cell(CellId),
    Func(BinaryOp),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> &'static str {
        match self {
            Token::Number(_) => "number",
            Token::Cell(_) => "cell reference",
            Token::Func(_) => "function name",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::Comma => "','",
        }
    }
}

/// Parse formula text into an expression tree.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        index: 0,
        end: text.len(),
    };
    let expr = parser.parse_expr()?;
    match parser.peek() {
        Some((pos, token)) => Err(ParseError::new(
            *pos,
            format!("unexpected {} after expression", token.describe()),
        )),
        None => Ok(expr),
    }
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
            }
            b'+' => {
                tokens.push((start, Token::Plus));
                i += 1;
            }
            b'-' => {
                tokens.push((start, Token::Minus));
                i += 1;
            }
            b'*' => {
                tokens.push((start, Token::Star));
                i += 1;
            }
            b'/' => {
                tokens.push((start, Token::Slash));
                i += 1;
            }
            b'(' => {
                tokens.push((start, Token::LParen));
                i += 1;
            }
            b')' => {
                tokens.push((start, Token::RParen));
                i += 1;
            }
            b',' => {
                tokens.push((start, Token::Comma));
                i += 1;
            }
            b'0'..=b'9' | b'.' => {
                i = scan_number(bytes, i);
                let literal = &text[start..i];
                let value: f64 = literal
                    .parse()
                    .map_err(|_| ParseError::new(start, format!("bad number '{}'", literal)))?;
                tokens.push((start, Token::Number(value)));
            }
            c if c.is_ascii_alphabetic() => {
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let letters_end = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let word = &text[start..i];
                if letters_end == i {
                    // Bare identifier: only the two-argument functions are known.
                    match word.to_ascii_lowercase().as_str() {
                        "min" => tokens.push((start, Token::Func(BinaryOp::Min))),
                        "max" => tokens.push((start, Token::Func(BinaryOp::Max))),
                        _ => {
                            return Err(ParseError::new(
                                start,
                                format!("unknown function '{}'", word),
                            ));
                        }
                    }
                } else {
                    let id = CellId::parse(word).ok_or_else(|| {
                        ParseError::new(start, format!("bad cell reference '{}'", word))
                    })?;
                    tokens.push((start, Token::Cell(id)));
                }
            }
            c => {
                return Err(ParseError::new(
                    start,
                    format!("unexpected character '{}'", c as char),
                ));
            }
        }
    }

    Ok(tokens)
}

fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    // Exponent only when it is actually followed by digits, so that an
    // adjacent cell reference like "2e1" stays a number but "2ea1" does not
    // swallow the letters.
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    i
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    index: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(usize, Token)> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.next() {
            Some((_, token)) if token == expected => Ok(()),
            Some((pos, token)) => Err(ParseError::new(
                pos,
                format!("expected {}, found {}", expected.describe(), token.describe()),
            )),
            None => Err(ParseError::new(
                self.end,
                format!("expected {}, found end of input", expected.describe()),
            )),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some((_, Token::Plus)) => BinaryOp::Add,
                Some((_, Token::Minus)) => BinaryOp::Sub,
                _ => break,
            };
            self.index += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some((_, Token::Star)) => BinaryOp::Mul,
                Some((_, Token::Slash)) => BinaryOp::Div,
                _ => break,
            };
            self.index += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some((_, Token::Plus)) => Some(UnaryOp::Plus),
            Some((_, Token::Minus)) => Some(UnaryOp::Minus),
            _ => None,
        };
        if let Some(op) = op {
            self.index += 1;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(op, Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.next() {
            Some((_, Token::Number(value))) => Ok(Expr::Number(value)),
            Some((_, Token::Cell(id))) => Ok(Expr::Reference(id)),
            Some((_, Token::Func(op))) => {
                self.expect(Token::LParen)?;
                let first = self.parse_expr()?;
                self.expect(Token::Comma)?;
                let second = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Binary(op, Box::new(first), Box::new(second)))
            }
            Some((_, Token::LParen)) => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some((pos, token)) => Err(ParseError::new(
                pos,
                format!(
                    "expected a number, cell reference, or '(', found {}",
                    token.describe()
                ),
            )),
            None => Err(ParseError::new(self.end, "unexpected end of formula")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::ast::referenced_cells;
    use super::*;

    #[test]
    fn test_parse_number_literal() {
        assert_eq!(parse("42").unwrap(), Expr::Number(42.0));
        assert_eq!(parse(" 2.5 ").unwrap(), Expr::Number(2.5));
        assert_eq!(parse("1e3").unwrap(), Expr::Number(1000.0));
    }

    #[test]
    fn test_parse_cell_reference() {
        assert_eq!(
            parse("b2").unwrap(),
            Expr::Reference(CellId::parse("b2").unwrap())
        );
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let expr = parse("1+2*3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Number(1.0)),
                Box::new(Expr::Binary(
                    BinaryOp::Mul,
                    Box::new(Expr::Number(2.0)),
                    Box::new(Expr::Number(3.0)),
                )),
            )
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expr = parse("10-3-2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Sub,
                Box::new(Expr::Binary(
                    BinaryOp::Sub,
                    Box::new(Expr::Number(10.0)),
                    Box::new(Expr::Number(3.0)),
                )),
                Box::new(Expr::Number(2.0)),
            )
        );
    }

    #[test]
    fn test_unary_minus_is_distinct_from_binary() {
        let expr = parse("-a1").unwrap();
        assert_eq!(
            expr,
            Expr::Unary(
                UnaryOp::Minus,
                Box::new(Expr::Reference(CellId::parse("a1").unwrap())),
            )
        );
        // Double negation nests.
        let expr = parse("--3").unwrap();
        assert_eq!(
            expr,
            Expr::Unary(
                UnaryOp::Minus,
                Box::new(Expr::Unary(UnaryOp::Minus, Box::new(Expr::Number(3.0)))),
            )
        );
    }

    #[test]
    fn test_min_max_function_calls() {
        let expr = parse("min(a1, max(2, b2))").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Min,
                Box::new(Expr::Reference(CellId::parse("a1").unwrap())),
                Box::new(Expr::Binary(
                    BinaryOp::Max,
                    Box::new(Expr::Number(2.0)),
                    Box::new(Expr::Reference(CellId::parse("b2").unwrap())),
                )),
            )
        );
    }

    #[test]
    fn test_parenthesized_grouping() {
        let expr = parse("(1+2)*3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Mul,
                Box::new(Expr::Binary(
                    BinaryOp::Add,
                    Box::new(Expr::Number(1.0)),
                    Box::new(Expr::Number(2.0)),
                )),
                Box::new(Expr::Number(3.0)),
            )
        );
    }

    #[test]
    fn test_collects_references_across_the_tree() {
        let expr = parse("a1 + min(b2, c3) * -d4").unwrap();
        let refs: Vec<String> = referenced_cells(&expr)
            .iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(refs, vec!["a1", "b2", "c3", "d4"]);
    }

    #[test]
    fn test_rejects_dangling_operator() {
        let err = parse("3+*2").unwrap_err();
        assert_eq!(err.pos, 2);
        assert!(err.message.contains("expected a number"));
    }

    #[test]
    fn test_rejects_trailing_garbage() {
        let err = parse("1 2").unwrap_err();
        assert_eq!(err.pos, 2);
    }

    #[test]
    fn test_rejects_unknown_function() {
        let err = parse("sum(1,2)").unwrap_err();
        assert!(err.message.contains("unknown function 'sum'"));
    }

    #[test]
    fn test_rejects_unbalanced_parens() {
        assert!(parse("(1+2").is_err());
        assert!(parse("min(1,2").is_err());
        assert!(parse("1)").is_err());
    }

    #[test]
    fn test_rejects_empty_input() {
        let err = parse("").unwrap_err();
        assert_eq!(err.pos, 0);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        assert_eq!(parse("a1+b1*2"), parse("a1+b1*2"));
    }
}
