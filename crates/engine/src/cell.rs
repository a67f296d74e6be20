//! A single cell: its content, the positions it references, and a
//! lazily-populated value cache. The *reverse* dependency edges (who
//! references this cell) are tracked by [`crate::sheet::Sheet`] instead of
//! here — that keeps a cell's existence in the sheet's map tied purely to
//! whether it holds user content, rather than to bookkeeping for formulas
//! elsewhere that merely reference it.

use std::cell::RefCell;

use crate::ast::Expr;
use crate::sheet::Sheet;
use crate::value::Value;
use crate::position::Position;

/// What a cell holds. Evaluation only ever touches the `Formula` arm;
/// `Empty`/`Text` are returned as-is. There is no separate numeric variant:
/// a cell whose literal text happens to look like a number (`"42"`) is
/// still `Text("42")` — it's `get_value` on the *reading* side (and a
/// formula's `CellRef` evaluation) that decides whether it parses as a
/// double, not the cell's own representation.
#[derive(Clone, Debug)]
pub enum CellKind {
    Empty,
    Text(String),
    Formula { source: String, ast: Expr },
}

/// A cell in the sheet's arena.
#[derive(Debug)]
pub struct Cell {
    kind: CellKind,
    referenced_cells: Vec<Position>,
    cache: RefCell<Option<Value>>,
}

impl Cell {
    pub(crate) fn empty() -> Self {
        Cell { kind: CellKind::Empty, referenced_cells: Vec::new(), cache: RefCell::new(None) }
    }

    pub(crate) fn new_text(text: String) -> Self {
        Cell { kind: CellKind::Text(text), ..Cell::empty() }
    }

    pub(crate) fn new_formula(source: String, ast: Expr, referenced_cells: Vec<Position>) -> Self {
        Cell { kind: CellKind::Formula { source, ast }, referenced_cells, cache: RefCell::new(None) }
    }

    /// Every position this cell's formula reads, in encounter order, with
    /// duplicates. This is the internal view used to wire the dependency
    /// graph; for the external `get_referenced_cells` contract (deduped,
    /// sorted) see [`Cell::get_referenced_cells`].
    pub(crate) fn referenced_cells(&self) -> &[Position] {
        &self.referenced_cells
    }

    /// The deduped, sorted list of positions this cell's formula reads.
    /// Empty for non-formula cells.
    pub fn get_referenced_cells(&self) -> Vec<Position> {
        let mut out = self.referenced_cells.clone();
        out.sort();
        out.dedup();
        out
    }

    /// Space-separated dump of every referenced position, for diagnostics
    /// only — no public API surfaces this as structured data.
    pub fn referenced_cells_debug_string(&self) -> String {
        self.referenced_cells
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Prefix-notation dump of the formula's AST, for diagnostics only.
    /// `None` for a non-formula cell.
    pub fn debug_ast(&self) -> Option<String> {
        match &self.kind {
            CellKind::Formula { ast, .. } => Some(ast.print_debug()),
            _ => None,
        }
    }

    /// Whether this cell keeps a memoized value at all. `Empty`/`Text`
    /// always report `true` — there's nothing to (re)compute, so
    /// the distinction is moot, and it lets an invalidation cascade always
    /// pass through a non-formula cell on its way to formula dependents
    /// further out. A `Formula` cell whose cache has already been dropped
    /// reports `false`, stopping a redundant cascade.
    pub(crate) fn has_cache(&self) -> bool {
        match &self.kind {
            CellKind::Empty | CellKind::Text(_) => true,
            CellKind::Formula { .. } => self.cache.borrow().is_some(),
        }
    }

    /// Drops the memoized value. Safe to call unconditionally; idempotent.
    pub(crate) fn invalidate_cache(&self) {
        *self.cache.borrow_mut() = None;
    }

    /// The cell's display text: exactly the literal it was set to (escape
    /// character preserved) for `Text`, the minimally-parenthesized formula
    /// source (with leading `=`) for a formula cell.
    pub fn get_text(&self) -> String {
        match &self.kind {
            CellKind::Empty => String::new(),
            CellKind::Text(s) => s.clone(),
            CellKind::Formula { ast, .. } => format!("={}", ast.print_formula()),
        }
    }

    /// The cell's computed value, memoizing formula results. `sheet` is
    /// needed to resolve `CellRef` nodes during formula evaluation; the
    /// memo write happens only after evaluation fully returns, so a cell
    /// that is itself mid-evaluation (via a cycle, which is normally
    /// rejected at write time, or simple reentrancy) never observes its own
    /// stale cache.
    pub fn get_value(&self, sheet: &Sheet) -> Value {
        match &self.kind {
            CellKind::Empty => Value::Text(String::new()),
            CellKind::Text(s) => Value::Text(s.strip_prefix('\'').unwrap_or(s).to_string()),
            CellKind::Formula { ast, .. } => {
                if let Some(cached) = self.cache.borrow().as_ref() {
                    return cached.clone();
                }
                let value = match ast.evaluate(sheet) {
                    Ok(n) => Value::Number(n),
                    Err(e) => Value::Error(e),
                };
                *self.cache.borrow_mut() = Some(value.clone());
                value
            }
        }
    }
}
