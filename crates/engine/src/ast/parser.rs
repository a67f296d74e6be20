//! Recursive-descent parser adapter. `parse_formula` is the single entry
//! point the rest of the crate uses: it either yields an [`Expr`] (with the
//! ordered list of positions it references) or reports a parse failure.
//! The adapter never emits a partial AST — on any error nothing is
//! returned.

use super::expr::{BinaryOp, Expr, UnaryOp};
use super::lexer::{self, Token};
use crate::error::SheetError;
use crate::position::Position;

pub struct ParsedFormula {
    pub root: Expr,
    /// Every `CellRef` the AST contains, in the order encountered. May
    /// contain duplicates; always valid positions (invalid literals are
    /// rejected during parsing as [`SheetError::FormulaException`]).
    pub referenced: Vec<Position>,
}

pub fn parse_formula(text: &str) -> Result<ParsedFormula, SheetError> {
    let tokens = lexer::tokenize(text)?;
    let mut parser = Parser { tokens: &tokens, pos: 0, refs: Vec::new() };
    let root = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(SheetError::ParsingError("trailing input after expression".into()));
    }
    Ok(ParsedFormula { root, referenced: parser.refs })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    refs: Vec<Position>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    /// Additive level: `+` and `-`, left-associative.
    fn parse_expr(&mut self) -> Result<Expr, SheetError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Binary { op: BinaryOp::Add, lhs: Box::new(lhs), rhs: Box::new(rhs) };
                }
                Some(Token::Minus) => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Binary { op: BinaryOp::Sub, lhs: Box::new(lhs), rhs: Box::new(rhs) };
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    /// Multiplicative level: `*` and `/`, left-associative.
    fn parse_term(&mut self) -> Result<Expr, SheetError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::Binary { op: BinaryOp::Mul, lhs: Box::new(lhs), rhs: Box::new(rhs) };
                }
                Some(Token::Slash) => {
                    self.bump();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::Binary { op: BinaryOp::Div, lhs: Box::new(lhs), rhs: Box::new(rhs) };
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, SheetError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.bump();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op: UnaryOp::Plus, operand: Box::new(operand) })
            }
            Some(Token::Minus) => {
                self.bump();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary { op: UnaryOp::Minus, operand: Box::new(operand) })
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, SheetError> {
        match self.bump().cloned() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Cell(text)) => {
                let pos = Position::from_string(&text);
                if !pos.is_valid() {
                    return Err(SheetError::FormulaException(format!("invalid position: {text}")));
                }
                self.refs.push(pos);
                Ok(Expr::CellRef(pos))
            }
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(SheetError::ParsingError("expected ')'".into())),
                }
            }
            Some(other) => Err(SheetError::ParsingError(format!("unexpected token: {other:?}"))),
            None => Err(SheetError::ParsingError("unexpected end of formula".into())),
        }
    }
}
