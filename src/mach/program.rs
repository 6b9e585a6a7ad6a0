use crate::error;
use crate::lang::ast::{Expression, Statement};
use crate::lang::{Error, LineNumber, MaxValue};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Line that holds statements typed without a line number. It sorts after
/// every real line and is never reached by running off the program's end.
pub const DIRECT: u16 = 65535;

/// Cursor line index once the program has run off its end.
const END: usize = usize::max_value();

#[derive(Debug)]
pub struct CodeLine {
    number: u16,
    statements: Vec<Rc<Statement>>,
}

/// A point in the program: a line and a statement index within it.
/// `line` is `None` past the end of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: LineNumber,
    pub index: usize,
}

/// One `DATA` constant, found by the data cursor.
#[derive(Debug)]
pub struct Datum {
    statement: Rc<Statement>,
    index: usize,
}

impl Datum {
    pub fn expression(&self) -> Option<&Expression> {
        match &*self.statement {
            Statement::Data(_, items) => items.get(self.index),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    line: usize,
    statement: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct DataCursor {
    line: usize,
    statement: usize,
    item: usize,
}

/// ## Program storage
///
/// Lines ordered by number, an execution cursor, and a separate cursor
/// for `READ`. Statements are shared so the runtime can hold one while
/// the store moves on.

#[derive(Debug, Default)]
pub struct Program {
    lines: Vec<CodeLine>,
    editing: Option<usize>,
    cursor: Cursor,
    data: DataCursor,
    jumps: usize,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.editing = None;
        self.cursor = Cursor::default();
        self.data = DataCursor::default();
        self.jumps += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.number == DIRECT)
    }

    pub fn line_numbers(&self) -> impl Iterator<Item = u16> + '_ {
        self.lines
            .iter()
            .map(|line| line.number)
            .filter(|&number| number != DIRECT)
    }

    fn find(&self, number: u16) -> std::result::Result<usize, usize> {
        self.lines.binary_search_by_key(&number, |line| line.number)
    }

    /// Starts or restarts a line. Statements appended after this land on it.
    pub fn add_line(&mut self, number: u16) {
        let idx = match self.find(number) {
            Ok(idx) => {
                self.lines[idx].statements.clear();
                idx
            }
            Err(idx) => {
                self.lines.insert(
                    idx,
                    CodeLine {
                        number,
                        statements: vec![],
                    },
                );
                let started = idx == self.cursor.line && self.cursor.statement > 0;
                if self.cursor.line != END && (idx < self.cursor.line || started) {
                    self.cursor.line += 1;
                }
                idx
            }
        };
        self.editing = Some(idx);
    }

    pub fn append_statement(&mut self, statement: Statement) -> Result<()> {
        if let Statement::LineNumber(_, number) = statement {
            self.add_line(number);
            return Ok(());
        }
        match self.editing.and_then(|idx| self.lines.get_mut(idx)) {
            Some(line) => {
                line.statements.push(Rc::new(statement));
                Ok(())
            }
            None => Err(error!(InternalError; "NO LINE TO APPEND TO")),
        }
    }

    pub fn remove_line(&mut self, number: u16) -> bool {
        match self.find(number) {
            Ok(idx) => {
                self.lines.remove(idx);
                if idx < self.cursor.line && self.cursor.line != END {
                    self.cursor.line -= 1;
                } else if idx == self.cursor.line {
                    self.cursor.statement = 0;
                }
                self.editing = None;
                true
            }
            Err(_) => false,
        }
    }

    /// The next statement in order, with the position it was found at.
    /// Execution never advances from a numbered line into the direct line.
    pub fn next(&mut self) -> Option<(Position, Rc<Statement>)> {
        loop {
            let line = self.lines.get(self.cursor.line)?;
            if let Some(statement) = line.statements.get(self.cursor.statement) {
                let position = Position {
                    line: Some(line.number),
                    index: self.cursor.statement,
                };
                self.cursor.statement += 1;
                return Some((position, statement.clone()));
            }
            match self.lines.get(self.cursor.line + 1) {
                Some(next) if next.number != DIRECT => {
                    self.cursor.line += 1;
                    self.cursor.statement = 0;
                }
                _ => {
                    self.end();
                    return None;
                }
            }
        }
    }

    /// Counts every transfer of control, so callers can tell when the
    /// statement they just ran moved the cursor.
    pub fn jumps(&self) -> usize {
        self.jumps
    }

    pub fn rewind(&mut self) {
        self.cursor = Cursor::default();
        if self.lines.first().map(|line| line.number) == Some(DIRECT) {
            self.end();
        }
        self.jumps += 1;
    }

    pub fn end(&mut self) {
        self.cursor = Cursor {
            line: END,
            statement: 0,
        };
        self.jumps += 1;
    }

    /// Moves the cursor to the first statement of a line. A missing line
    /// leaves the cursor at the end.
    pub fn jump(&mut self, number: u16) -> Result<()> {
        if number > LineNumber::max_value() && number != DIRECT {
            self.end();
            return Err(error!(UndefinedLine));
        }
        match self.find(number) {
            Ok(idx) => {
                self.cursor = Cursor {
                    line: idx,
                    statement: 0,
                };
                self.jumps += 1;
                Ok(())
            }
            Err(_) => {
                self.end();
                Err(error!(UndefinedLine))
            }
        }
    }

    /// Where `next` will continue from.
    pub fn position(&self) -> Position {
        match self.lines.get(self.cursor.line) {
            Some(line) => Position {
                line: Some(line.number),
                index: self.cursor.statement,
            },
            None => Position {
                line: None,
                index: 0,
            },
        }
    }

    pub fn resume(&mut self, position: Position) -> Result<()> {
        match position.line {
            None => {
                self.end();
                Ok(())
            }
            Some(number) => {
                self.jump(number)?;
                self.cursor.statement = position.index;
                Ok(())
            }
        }
    }

    pub fn next_data(&mut self) -> Option<Datum> {
        loop {
            let line = self.lines.get(self.data.line)?;
            if line.number == DIRECT {
                return None;
            }
            match line.statements.get(self.data.statement) {
                None => {
                    self.data = DataCursor {
                        line: self.data.line + 1,
                        statement: 0,
                        item: 0,
                    };
                }
                Some(statement) => {
                    if let Statement::Data(_, items) = &**statement {
                        if self.data.item < items.len() {
                            let datum = Datum {
                                statement: statement.clone(),
                                index: self.data.item,
                            };
                            self.data.item += 1;
                            return Some(datum);
                        }
                    }
                    self.data.statement += 1;
                    self.data.item = 0;
                }
            }
        }
    }

    pub fn restore(&mut self) {
        self.data = DataCursor::default();
    }

    pub fn restore_to(&mut self, number: u16) -> Result<()> {
        match self.find(number) {
            Ok(idx) => {
                self.data = DataCursor {
                    line: idx,
                    statement: 0,
                    item: 0,
                };
                Ok(())
            }
            Err(_) => Err(error!(UndefinedLine)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{ErrorCode, Line};

    fn program(source: &[&str]) -> Program {
        let mut program = Program::new();
        for s in source {
            for statement in Line::new(s).ast().unwrap() {
                program.append_statement(statement).unwrap();
            }
        }
        program
    }

    fn numbers(program: &mut Program) -> Vec<u16> {
        let mut v = vec![];
        while let Some((position, _)) = program.next() {
            if let Some(n) = position.line {
                v.push(n);
            }
        }
        v
    }

    #[test]
    fn test_lines_sort_and_replace() {
        let mut p = program(&["30 end", "10 rem", "20 rem:rem", "10 end"]);
        assert_eq!(numbers(&mut p), vec![10, 20, 20, 30]);
        assert_eq!(p.line_numbers().collect::<Vec<_>>(), vec![10, 20, 30]);
        p.rewind();
        let (_, first) = p.next().unwrap();
        assert!(matches!(*first, Statement::End(_)));
    }

    #[test]
    fn test_fresh_program_starts_at_lowest_line() {
        let mut p = program(&["30 end", "10 rem", "20 rem"]);
        assert_eq!(p.position(), Position { line: Some(10), index: 0 });
        assert_eq!(numbers(&mut p), vec![10, 20, 30]);
    }

    #[test]
    fn test_insert_before_running_line_keeps_place() {
        let mut p = program(&["20 rem:rem", "30 rem"]);
        p.next().unwrap();
        p.add_line(10);
        p.append_statement(Statement::End(0..3)).unwrap();
        assert_eq!(p.position(), Position { line: Some(20), index: 1 });
        p.end();
        p.add_line(40);
        assert!(p.next().is_none());
        assert!(p.remove_line(10));
        assert_eq!(p.position().line, None);
    }

    #[test]
    fn test_statement_needs_a_line() {
        let mut p = Program::new();
        let statement = Line::new("end").ast().unwrap().pop().unwrap();
        assert_eq!(
            p.append_statement(statement).unwrap_err().code(),
            ErrorCode::InternalError
        );
    }

    #[test]
    fn test_jump() {
        let mut p = program(&["10 rem", "20 rem", "30 rem"]);
        p.jump(20).unwrap();
        assert_eq!(numbers(&mut p), vec![20, 30]);
        assert_eq!(p.jump(25).unwrap_err().code(), ErrorCode::UndefinedLine);
        assert!(p.next().is_none());
        assert_eq!(p.position().line, None);
    }

    #[test]
    fn test_position_and_resume() {
        let mut p = program(&["10 rem:rem", "20 rem"]);
        p.next().unwrap();
        let here = p.position();
        assert_eq!(here, Position { line: Some(10), index: 1 });
        p.end();
        p.resume(here).unwrap();
        assert_eq!(numbers(&mut p), vec![10, 20]);
    }

    #[test]
    fn test_direct_line_is_a_wall() {
        let mut p = program(&["10 rem", "20 rem"]);
        p.add_line(DIRECT);
        p.append_statement(Statement::End(0..3)).unwrap();
        p.rewind();
        assert_eq!(numbers(&mut p), vec![10, 20]);
        p.jump(DIRECT).unwrap();
        assert_eq!(numbers(&mut p), vec![DIRECT]);
        assert!(p.remove_line(DIRECT));
        assert!(!p.is_empty());
    }

    #[test]
    fn test_data_cursor() {
        let mut p = program(&["10 data 1,2", "20 print:data 3", "30 data 4"]);
        let mut read = || {
            p.next_data()
                .and_then(|d| d.expression().map(|e| e.column().start))
        };
        assert!(read().is_some());
        assert!(read().is_some());
        assert!(read().is_some());
        assert!(read().is_some());
        assert!(read().is_none());
        p.restore_to(20).unwrap();
        let datum = p.next_data().unwrap();
        assert!(matches!(datum.expression(), Some(Expression::Integer(_, 3))));
        p.restore();
        let datum = p.next_data().unwrap();
        assert!(matches!(datum.expression(), Some(Expression::Integer(_, 1))));
        assert_eq!(p.restore_to(15).unwrap_err().code(), ErrorCode::UndefinedLine);
    }
}
