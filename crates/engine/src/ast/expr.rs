//! The formula expression tree: four node kinds, and the three operations
//! the spec asks of them — evaluate, minimally-parenthesized print, and
//! enumerate referenced positions.

use crate::position::Position;
use crate::sheet::Sheet;
use crate::value::{EvalError, Value};

/// Precedence class used only for deciding where the printer needs
/// parentheses. Higher is tighter-binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Add,
    Sub,
    Mul,
    Div,
    Unary,
    Atom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }

    fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Add => Precedence::Add,
            BinaryOp::Sub => Precedence::Sub,
            BinaryOp::Mul => Precedence::Mul,
            BinaryOp::Div => Precedence::Div,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl UnaryOp {
    fn symbol(self) -> char {
        match self {
            UnaryOp::Plus => '+',
            UnaryOp::Minus => '-',
        }
    }
}

#[derive(Clone, Debug)]
pub enum Expr {
    Number(f64),
    CellRef(Position),
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
}

/// `PRECEDENCE_RULES[parent][child]`, encoded as a pair of bits (left/right)
/// rather than a 6x6 table: a bit is set exactly when omitting parens
/// between that parent and child would change the parse under the infix
/// grammar (see spec for the case analysis).
fn needs_parens(parent: Precedence, child: Precedence, is_right_child: bool) -> bool {
    use Precedence::*;
    let (left, right) = match (parent, child) {
        (Sub, Add) | (Sub, Sub) => (false, true),
        (Mul, Add) | (Mul, Sub) => (true, true),
        (Div, Add) | (Div, Sub) => (true, true),
        (Div, Mul) | (Div, Div) => (false, true),
        (Unary, Add) | (Unary, Sub) => (true, true),
        _ => (false, false),
    };
    if is_right_child { right } else { left }
}

fn format_number(n: f64) -> String {
    format!("{n}")
}

impl Expr {
    pub fn precedence(&self) -> Precedence {
        match self {
            Expr::Number(_) | Expr::CellRef(_) => Precedence::Atom,
            Expr::Unary { .. } => Precedence::Unary,
            Expr::Binary { op, .. } => op.precedence(),
        }
    }

    /// Recursive-descent evaluation against `sheet`. Binary results that
    /// overflow to a non-finite double fail with `Arithmetic`; unary
    /// operators never introduce a new finiteness failure since their
    /// operand was already checked.
    pub fn evaluate(&self, sheet: &Sheet) -> Result<f64, EvalError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::CellRef(pos) => evaluate_cell_ref(*pos, sheet),
            Expr::Unary { op, operand } => {
                let v = operand.evaluate(sheet)?;
                Ok(match op {
                    UnaryOp::Plus => v,
                    UnaryOp::Minus => -v,
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.evaluate(sheet)?;
                let r = rhs.evaluate(sheet)?;
                let result = match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                };
                if !result.is_finite() {
                    return Err(EvalError::Arithmetic);
                }
                Ok(result)
            }
        }
    }

    /// Minimally-parenthesized infix rendering, as used by `Cell::get_text`.
    pub fn print_formula(&self) -> String {
        let mut out = String::new();
        self.write_formula(&mut out, Precedence::Atom, false);
        out
    }

    fn write_formula(&self, out: &mut String, parent: Precedence, is_right_child: bool) {
        let my_prec = self.precedence();
        let wrap = needs_parens(parent, my_prec, is_right_child);
        if wrap {
            out.push('(');
        }
        match self {
            Expr::Number(n) => out.push_str(&format_number(*n)),
            Expr::CellRef(pos) => out.push_str(&pos.to_string()),
            Expr::Unary { op, operand } => {
                out.push(op.symbol());
                operand.write_formula(out, Precedence::Unary, false);
            }
            Expr::Binary { op, lhs, rhs } => {
                lhs.write_formula(out, my_prec, false);
                out.push(op.symbol());
                rhs.write_formula(out, my_prec, true);
            }
        }
        if wrap {
            out.push(')');
        }
    }

    /// Prefix-style `(op lhs rhs)` rendering, used only for diagnostics.
    pub fn print_debug(&self) -> String {
        let mut out = String::new();
        self.write_debug(&mut out);
        out
    }

    fn write_debug(&self, out: &mut String) {
        match self {
            Expr::Number(n) => out.push_str(&format_number(*n)),
            Expr::CellRef(pos) => out.push_str(&pos.to_string()),
            Expr::Unary { op, operand } => {
                out.push('(');
                out.push(op.symbol());
                out.push(' ');
                operand.write_debug(out);
                out.push(')');
            }
            Expr::Binary { op, lhs, rhs } => {
                out.push('(');
                out.push(op.symbol());
                out.push(' ');
                lhs.write_debug(out);
                out.push(' ');
                rhs.write_debug(out);
                out.push(')');
            }
        }
    }

}

fn evaluate_cell_ref(pos: Position, sheet: &Sheet) -> Result<f64, EvalError> {
    if !pos.is_valid() {
        return Err(EvalError::Ref);
    }
    match sheet.cell_value(pos) {
        None => Ok(0.0),
        Some(Value::Number(n)) => Ok(n),
        Some(Value::Error(e)) => Err(e),
        Some(Value::Text(s)) => {
            if s.is_empty() {
                Ok(0.0)
            } else {
                s.parse::<f64>().map_err(|_| EvalError::Value)
            }
        }
    }
}
