//! The sheet: an arena of cells keyed by position, the reverse dependency
//! index, and the mutating operations that keep both in sync.

use std::collections::{HashMap, HashSet};

use crate::ast::parse_formula;
use crate::cell::Cell;
use crate::error::{Result, SheetError};
use crate::position::{Position, Size};
use crate::value::Value;

/// An in-memory spreadsheet.
///
/// `cells` holds only positions with user content; referencing a position
/// that was never set (or was cleared) evaluates to an empty value without
/// an entry ever being created for it. `dependents` is the reverse of every
/// cell's `referenced_cells`: for a formula at `dep` that reads `pos`,
/// `dependents[pos]` contains `dep`. It survives independently of whether
/// `pos` itself has a cell, since a formula can reference a position before
/// (or after) that position ever holds content.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    dependents: HashMap<Position, HashSet<Position>>,
}

impl Sheet {
    pub fn new() -> Self {
        Sheet::default()
    }

    pub fn get_cell(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// The value a formula's `CellRef` observes when reading `pos`: `None`
    /// for a position with no content (the formula layer then treats it as
    /// zero), `Some` otherwise.
    pub fn cell_value(&self, pos: Position) -> Option<Value> {
        self.cells.get(&pos).map(|c| c.get_value(self))
    }

    /// Parses and installs `text` at `pos`.
    ///
    /// Validation (position range, formula syntax, cell-literal validity,
    /// and the cycle check) happens entirely before any mutation: if this
    /// returns `Err`, the sheet — content, caches, and dependency edges
    /// alike — is left exactly as it was.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        let new_cell = Self::build_cell(text)?;
        let new_refs = new_cell.referenced_cells().to_vec();
        if self.would_create_cycle(pos, &new_refs) {
            return Err(SheetError::CircularDependency);
        }
        self.install(pos, new_cell, &new_refs);
        log::debug!("set {pos} = {text:?}");
        Ok(())
    }

    /// Removes any content at `pos`, unconditionally dropping the map
    /// entry (rather than replacing it with an explicit empty cell) and
    /// cascading cache invalidation to whatever still depends on it.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition);
        }
        if let Some(old) = self.cells.remove(&pos) {
            self.unwire_references(pos, old.referenced_cells());
        }
        self.invalidate_dependents(pos);
        log::debug!("clear {pos}");
        Ok(())
    }

    /// Whether any formula currently reads `pos` — `Cell::is_referenced`
    /// from the spec lives here rather than on `Cell` itself, since the
    /// reverse dependency edges are tracked at the sheet level (see the
    /// module docs above).
    pub fn is_referenced(&self, pos: Position) -> bool {
        self.dependents.get(&pos).is_some_and(|deps| !deps.is_empty())
    }

    /// The smallest rectangle, anchored at `(0, 0)`, containing every cell
    /// with content.
    pub fn get_printable_size(&self) -> Size {
        let mut rows = 0;
        let mut cols = 0;
        for pos in self.cells.keys() {
            rows = rows.max(pos.row + 1);
            cols = cols.max(pos.col + 1);
        }
        Size { rows, cols }
    }

    /// Renders every cell's computed value over the printable rectangle,
    /// one row per line, tab-separated.
    pub fn print_values(&self) -> String {
        self.print_grid(|cell| cell.get_value(self).to_string())
    }

    /// Renders every cell's literal text (formula source, not its result)
    /// over the printable rectangle, one row per line, tab-separated.
    pub fn print_texts(&self) -> String {
        self.print_grid(|cell| cell.get_text())
    }

    fn print_grid(&self, render: impl Fn(&Cell) -> String) -> String {
        let size = self.get_printable_size();
        let mut out = String::new();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.push('\t');
                }
                if let Some(cell) = self.cells.get(&Position::new(row, col)) {
                    out.push_str(&render(cell));
                }
            }
            out.push('\n');
        }
        out
    }

    /// `text == ""` installs `Empty`; a lone `"="` (empty formula body) is
    /// treated as plain text rather than a parse error; any other leading
    /// character that isn't the formula sigil — including the escape
    /// character `'` — installs `Text(text)` verbatim. Numeric-looking
    /// text is *not* special-cased into its own kind: a cell's stored
    /// representation is only ever empty/text/formula, matching the data
    /// model; whether `"42"` reads as a number is decided at evaluation
    /// time, by `Cell::get_value`/a formula's `CellRef`.
    fn build_cell(text: &str) -> Result<Cell> {
        if text.is_empty() {
            Ok(Cell::empty())
        } else if text == "=" {
            Ok(Cell::new_text(text.to_string()))
        } else if let Some(formula_src) = text.strip_prefix('=') {
            let parsed = parse_formula(formula_src)?;
            Ok(Cell::new_formula(formula_src.to_string(), parsed.root, parsed.referenced))
        } else {
            Ok(Cell::new_text(text.to_string()))
        }
    }

    /// Whether wiring `pos` to reference every position in `new_refs` would
    /// close a cycle, found by walking the *current* (pre-mutation)
    /// `referenced_cells` edges forward from each candidate and checking
    /// whether `pos` is reachable.
    fn would_create_cycle(&self, pos: Position, new_refs: &[Position]) -> bool {
        let mut seen = HashSet::new();
        let mut stack: Vec<Position> = new_refs.to_vec();
        while let Some(current) = stack.pop() {
            if current == pos {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(cell) = self.cells.get(&current) {
                stack.extend(cell.referenced_cells().iter().copied());
            }
        }
        false
    }

    fn install(&mut self, pos: Position, new_cell: Cell, new_refs: &[Position]) {
        if let Some(old) = self.cells.remove(&pos) {
            self.unwire_references(pos, old.referenced_cells());
        }
        self.cells.insert(pos, new_cell);
        for r in new_refs {
            self.dependents.entry(*r).or_default().insert(pos);
        }
        self.invalidate_dependents(pos);
    }

    fn unwire_references(&mut self, pos: Position, old_refs: &[Position]) {
        for r in old_refs {
            if let Some(set) = self.dependents.get_mut(r) {
                set.remove(&pos);
                if set.is_empty() {
                    self.dependents.remove(r);
                }
            }
        }
    }

    /// Invalidates every cell that transitively depends on `pos`, stopping
    /// at formula cells whose cache is already empty.
    fn invalidate_dependents(&self, pos: Position) {
        let Some(deps) = self.dependents.get(&pos) else { return };
        for dep in deps.iter().copied().collect::<Vec<_>>() {
            if let Some(cell) = self.cells.get(&dep) {
                if cell.has_cache() {
                    cell.invalidate_cache();
                    self.invalidate_dependents(dep);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(s: &str) -> Position {
        Position::from_string(s)
    }

    #[test]
    fn formula_reads_referenced_number() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("B1"), "5").unwrap();
        sheet.set_cell(pos("A1"), "=B1+1").unwrap();
        assert_eq!(sheet.cell_value(pos("A1")), Some(Value::Number(6.0)));
    }

    #[test]
    fn setting_a_plain_value_invalidates_dependent_formula_cache() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("B1"), "5").unwrap();
        sheet.set_cell(pos("A1"), "=B1+1").unwrap();
        assert_eq!(sheet.cell_value(pos("A1")), Some(Value::Number(6.0)));
        sheet.set_cell(pos("B1"), "10").unwrap();
        assert_eq!(sheet.cell_value(pos("A1")), Some(Value::Number(11.0)));
    }

    #[test]
    fn direct_self_reference_is_rejected() {
        let mut sheet = Sheet::new();
        let err = sheet.set_cell(pos("A1"), "=A1+1").unwrap_err();
        assert_eq!(err, SheetError::CircularDependency);
        assert!(sheet.get_cell(pos("A1")).is_none());
    }

    #[test]
    fn indirect_cycle_is_rejected_and_leaves_sheet_untouched() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=B1+1").unwrap();
        let err = sheet.set_cell(pos("B1"), "=A1+1").unwrap_err();
        assert_eq!(err, SheetError::CircularDependency);
        assert!(sheet.get_cell(pos("B1")).is_none());
        // A1 is untouched by the rejected write.
        assert_eq!(sheet.get_cell(pos("A1")).unwrap().get_text(), "=B1+1");
    }

    #[test]
    fn lone_equals_sign_is_plain_text_not_a_parse_error() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=").unwrap();
        assert_eq!(sheet.cell_value(pos("A1")), Some(Value::Text("=".to_string())));
    }

    #[test]
    fn escaped_leading_equals_is_text_stripped_only_on_value_read() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "'=notaformula").unwrap();
        assert_eq!(sheet.cell_value(pos("A1")), Some(Value::Text("=notaformula".to_string())));
        assert_eq!(sheet.get_cell(pos("A1")).unwrap().get_text(), "'=notaformula");
    }

    #[test]
    fn reading_an_empty_cell_is_zero_in_formulas() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=Z100+1").unwrap();
        assert_eq!(sheet.cell_value(pos("A1")), Some(Value::Number(1.0)));
    }

    #[test]
    fn division_by_zero_is_an_arithmetic_error() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=1/0").unwrap();
        match sheet.cell_value(pos("A1")) {
            Some(Value::Error(crate::value::EvalError::Arithmetic)) => {}
            other => panic!("expected arithmetic error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_cell_literal_in_formula_is_a_formula_exception() {
        let err = Sheet::build_cell("=AAAA1+1").unwrap_err();
        assert!(matches!(err, SheetError::FormulaException(_)));
    }

    #[test]
    fn clearing_a_cell_removes_it_and_invalidates_dependents() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("B1"), "5").unwrap();
        sheet.set_cell(pos("A1"), "=B1+1").unwrap();
        assert_eq!(sheet.cell_value(pos("A1")), Some(Value::Number(6.0)));
        sheet.clear_cell(pos("B1")).unwrap();
        assert!(sheet.get_cell(pos("B1")).is_none());
        assert_eq!(sheet.cell_value(pos("A1")), Some(Value::Number(1.0)));
    }

    #[test]
    fn is_referenced_tracks_whether_any_formula_currently_reads_a_position() {
        let mut sheet = Sheet::new();
        assert!(!sheet.is_referenced(pos("B1")));
        sheet.set_cell(pos("A1"), "=B1+1").unwrap();
        assert!(sheet.is_referenced(pos("B1")));
        sheet.clear_cell(pos("A1")).unwrap();
        assert!(!sheet.is_referenced(pos("B1")));
    }

    #[test]
    fn get_referenced_cells_is_deduped_and_sorted() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=B2+A1000+B2").unwrap();
        assert_eq!(
            sheet.get_cell(pos("A1")).unwrap().get_referenced_cells(),
            vec![pos("B2"), pos("A1000")],
        );
    }

    #[test]
    fn printable_size_excludes_unset_referenced_cells() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("B2"), "=Z100+1").unwrap();
        assert_eq!(sheet.get_printable_size(), Size { rows: 2, cols: 2 });
    }

    #[test]
    fn print_values_and_texts_render_the_bounding_rectangle() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "1").unwrap();
        sheet.set_cell(pos("B2"), "=A1+1").unwrap();
        assert_eq!(sheet.print_values(), "1\t\n\t2\n");
        assert_eq!(sheet.print_texts(), "1\t\n\t=A1+1\n");
    }
}
