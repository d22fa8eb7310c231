//! Tokenizer and recursive-descent parser.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' unary | power
//! power  := atom ('^' unary)?
//! atom   := number | ident '.' ident | '(' expr ')'
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use super::{Attribute, BinaryOp, Expr, FormulaError, Subject};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Dot,
    Op(char),
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number {n}"),
            Self::Ident(name) => format!("identifier '{name}'"),
            Self::Dot => "'.'".to_owned(),
            Self::Op(c) => format!("'{c}'"),
            Self::LParen => "'('".to_owned(),
            Self::RParen => "')'".to_owned(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices<'_>> = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' => {
                let mut end = offset;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &source[offset..end];
                let value = text.parse::<f64>().map_err(|_| FormulaError::UnexpectedToken {
                    formula: source.to_owned(),
                    found: format!("number '{text}'"),
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = offset;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(source[offset..end].to_owned()));
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '+' | '-' | '*' | '/' | '^' => {
                chars.next();
                tokens.push(Token::Op(c));
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => {
                return Err(FormulaError::UnexpectedChar {
                    formula: source.to_owned(),
                    found: other,
                    offset,
                });
            }
        }
    }
    Ok(tokens)
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn unexpected(&self, token: Option<&Token>) -> FormulaError {
        FormulaError::UnexpectedToken {
            formula: self.source.to_owned(),
            found: token.map_or_else(|| "end of input".to_owned(), Token::describe),
        }
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(c)) if ops.contains(c) => {
                let c = *c;
                self.pos += 1;
                Some(c)
            }
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            let op = if op == '+' { BinaryOp::Add } else { BinaryOp::Sub };
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/']) {
            let rhs = self.unary()?;
            let op = if op == '*' { BinaryOp::Mul } else { BinaryOp::Div };
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if self.eat_op(&['-']).is_some() {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.atom()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.unary()?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, FormulaError> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    other => Err(self.unexpected(other.as_ref())),
                }
            }
            Some(Token::Ident(subject)) => {
                let subject = match subject.as_str() {
                    "a" => Subject::User,
                    "b" => Subject::Target,
                    _ => {
                        return Err(FormulaError::UnknownSubject {
                            formula: self.source.to_owned(),
                            name: subject,
                        });
                    }
                };
                match self.bump() {
                    Some(Token::Dot) => {}
                    other => return Err(self.unexpected(other.as_ref())),
                }
                match self.bump() {
                    Some(Token::Ident(name)) => {
                        let attr = name.parse::<Attribute>().map_err(|_| {
                            FormulaError::UnknownAttribute {
                                formula: self.source.to_owned(),
                                name,
                            }
                        })?;
                        Ok(Expr::Attr(subject, attr))
                    }
                    other => Err(self.unexpected(other.as_ref())),
                }
            }
            other => Err(self.unexpected(other.as_ref())),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub(super) fn parse(source: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let expr = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.unexpected(parser.peek()));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_binds_multiplication_tighter() {
        let expr = parse("4 + 2 * a.level").unwrap();
        assert_eq!(
            expr,
            binary(
                BinaryOp::Add,
                Expr::Number(4.0),
                binary(
                    BinaryOp::Mul,
                    Expr::Number(2.0),
                    Expr::Attr(Subject::User, Attribute::Level)
                )
            )
        );
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2 ^ 3 ^ 2").unwrap();
        assert_eq!(
            expr,
            binary(
                BinaryOp::Pow,
                Expr::Number(2.0),
                binary(BinaryOp::Pow, Expr::Number(3.0), Expr::Number(2.0))
            )
        );
    }

    #[test]
    fn decimals_and_parentheses() {
        assert!(parse("(b.mhp - b.hp) * 0.3").is_ok());
        assert!(parse("-a.atk").is_ok());
        assert!(parse(".5").is_err());
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            parse("a.charisma"),
            Err(FormulaError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            parse("c.atk"),
            Err(FormulaError::UnknownSubject { .. })
        ));
    }

    #[test]
    fn rejects_code_like_input() {
        assert!(matches!(
            parse("a.atk; drop()"),
            Err(FormulaError::UnexpectedChar { found: ';', .. })
        ));
        assert!(parse("a.atk a.def").is_err());
        assert!(parse("(1 + 2").is_err());
        assert!(parse("").is_err());
    }
}
