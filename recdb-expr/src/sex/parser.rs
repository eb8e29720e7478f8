//! Recursive-descent parser for selection expressions, built over the
//! [`Lexer`](crate::sex::lexer::Lexer)'s token stream.

use super::ast::{Expr, NameRef};
use super::lexer::{Lexer, Tok};
use crate::error::ExprError;

pub struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    pub fn parse(src: &str) -> Result<Expr, ExprError> {
        let toks = Lexer::new(src).tokenize()?;
        let mut parser = Parser { toks, pos: 0 };
        let expr = parser.parse_cond()?;
        parser.expect_eof()?;
        Ok(expr)
    }

    fn peek(&self) -> &Tok {
        &self.toks[self.pos]
    }

    fn bump(&mut self) -> Tok {
        let tok = self.toks[self.pos].clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == tok {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_eof(&self) -> Result<(), ExprError> {
        if self.peek() == &Tok::Eof {
            Ok(())
        } else {
            Err(ExprError::Syntax(format!("unexpected trailing token {:?}", self.peek())))
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<(), ExprError> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(ExprError::Syntax(format!("expected {tok:?}, found {:?}", self.peek())))
        }
    }

    fn parse_cond(&mut self) -> Result<Expr, ExprError> {
        let cond = self.parse_implies()?;
        if self.eat(&Tok::Question) {
            let then_branch = self.parse_cond()?;
            self.expect(Tok::Colon)?;
            let else_branch = self.parse_cond()?;
            return Ok(Expr::Cond(Box::new(cond), Box::new(then_branch), Box::new(else_branch)));
        }
        Ok(cond)
    }

    fn parse_implies(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_or()?;
        if self.eat(&Tok::Implies) {
            let rhs = self.parse_implies()?;
            return Ok(Expr::Implies(Box::new(lhs), Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Tok::OrOr) {
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&Tok::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_relational()?;
        loop {
            lhs = if self.eat(&Tok::Eq) {
                Expr::Eq(Box::new(lhs), Box::new(self.parse_relational()?))
            } else if self.eat(&Tok::Ne) {
                Expr::Neq(Box::new(lhs), Box::new(self.parse_relational()?))
            } else if self.eat(&Tok::Tilde) {
                Expr::Mat(Box::new(lhs), Box::new(self.parse_relational()?))
            } else if self.eat(&Tok::Before) {
                Expr::Before(Box::new(lhs), Box::new(self.parse_relational()?))
            } else if self.eat(&Tok::After) {
                Expr::After(Box::new(lhs), Box::new(self.parse_relational()?))
            } else if self.eat(&Tok::SameTime) {
                Expr::SameTime(Box::new(lhs), Box::new(self.parse_relational()?))
            } else {
                break;
            };
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_additive()?;
        loop {
            lhs = if self.eat(&Tok::Lt) {
                Expr::Lt(Box::new(lhs), Box::new(self.parse_additive()?))
            } else if self.eat(&Tok::Le) {
                Expr::Lte(Box::new(lhs), Box::new(self.parse_additive()?))
            } else if self.eat(&Tok::Gt) {
                Expr::Gt(Box::new(lhs), Box::new(self.parse_additive()?))
            } else if self.eat(&Tok::Ge) {
                Expr::Gte(Box::new(lhs), Box::new(self.parse_additive()?))
            } else {
                break;
            };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            lhs = if self.eat(&Tok::Plus) {
                Expr::Add(Box::new(lhs), Box::new(self.parse_multiplicative()?))
            } else if self.eat(&Tok::Minus) {
                Expr::Sub(Box::new(lhs), Box::new(self.parse_multiplicative()?))
            } else {
                break;
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            lhs = if self.eat(&Tok::Star) {
                Expr::Mul(Box::new(lhs), Box::new(self.parse_unary()?))
            } else if self.eat(&Tok::Slash) {
                Expr::Div(Box::new(lhs), Box::new(self.parse_unary()?))
            } else if self.eat(&Tok::Percent) {
                Expr::Mod(Box::new(lhs), Box::new(self.parse_unary()?))
            } else {
                break;
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Tok::Minus) {
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        if self.eat(&Tok::Bang) {
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        if self.eat(&Tok::Hash) {
            return Ok(Expr::Hash(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.bump() {
            Tok::Int(n) => Ok(Expr::Int(n)),
            Tok::Real(n) => Ok(Expr::Real(n)),
            Tok::Str(s) => Ok(Expr::Str(s)),
            Tok::Ident(name) => {
                if name == "NoVal" {
                    Ok(Expr::NoVal)
                } else {
                    let index = self.parse_opt_subscript()?;
                    Ok(Expr::Name(NameRef {
                        name: join_dotted(&name),
                        index,
                    }))
                }
            }
            Tok::LParen => {
                let inner = self.parse_cond()?;
                self.expect(Tok::RParen)?;
                Ok(inner)
            }
            other => Err(ExprError::Syntax(format!("unexpected token {other:?}"))),
        }
    }

    /// Parses an optional `[N]` subscript after a field name, returning its
    /// index, or `-1` if absent.
    fn parse_opt_subscript(&mut self) -> Result<i64, ExprError> {
        if !self.eat(&Tok::LBracket) {
            return Ok(-1);
        }
        let idx = match self.bump() {
            Tok::Int(n) if n >= 0 => n,
            other => return Err(ExprError::Syntax(format!("expected a subscript index, found {other:?}"))),
        };
        self.expect(Tok::RBracket)?;
        Ok(idx)
    }
}

fn join_dotted(name: &str) -> String {
    match name.split_once('.') {
        Some((base, sub)) => format!("{base}_{sub}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_precedence_correctly() {
        // `1 + 2 * 3 = 7` should parse as `(1 + (2 * 3)) = 7`.
        let expr = Parser::parse("1 + 2 * 3 = 7").unwrap();
        match expr {
            Expr::Eq(lhs, rhs) => {
                assert!(matches!(*rhs, Expr::Int(7)));
                assert!(matches!(*lhs, Expr::Add(_, _)));
            }
            _ => panic!("expected top-level Eq"),
        }
    }

    #[test]
    fn parses_ternary_and_dotted_name() {
        let expr = Parser::parse("Year > 2000 ? Address.City : \"unknown\"").unwrap();
        assert!(matches!(expr, Expr::Cond(_, _, _)));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(Parser::parse("1 + 1 2").is_err());
    }
}
