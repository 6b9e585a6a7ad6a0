use super::program::DIRECT;
use super::{
    Capture, Console, Environment, Object, Op, Operation, Position, Program, Registry, Stack,
    UserFunction, DEFAULT_PRECISION,
};
use crate::error;
use crate::lang::ast::{Expression, Ident, PrintItem, Statement, Variable};
use crate::lang::{Error, Line, LineNumber, MaxValue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

mod eval;

type Result<T> = std::result::Result<T, Error>;

/// ## Session state
///
/// Held once by the runtime, never copied into function scopes.

#[derive(Debug)]
pub struct Session {
    precision: u32,
    trace: bool,
    running: bool,
    restart: Option<Position>,
    line: LineNumber,
    rng: StdRng,
    last_rnd: f32,
}

impl Default for Session {
    fn default() -> Session {
        Session {
            precision: DEFAULT_PRECISION,
            trace: false,
            running: false,
            restart: None,
            line: None,
            rng: StdRng::seed_from_u64(0),
            last_rnd: 0.0,
        }
    }
}

impl Session {
    /// Fractional digits kept by Fixed division.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn set_precision(&mut self, digits: u32) {
        self.precision = digits;
    }

    pub fn is_tracing(&self) -> bool {
        self.trace
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn can_continue(&self) -> bool {
        self.restart.is_some()
    }

    /// Line of the statement most recently started.
    pub fn line_number(&self) -> LineNumber {
        self.line
    }

    pub fn randomize(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Negative arguments reseed, zero repeats the last number.
    pub fn rnd(&mut self, arg: Option<f64>) -> f32 {
        match arg {
            Some(n) if n < 0.0 => self.randomize(n.to_bits()),
            Some(n) if n == 0.0 => return self.last_rnd,
            _ => {}
        }
        self.last_rnd = self.rng.gen();
        self.last_rnd
    }
}

#[derive(Debug, Clone)]
struct ForLoop {
    var: Ident,
    to: Object,
    step: Object,
    body: Position,
}

/// ## Program runtime
///
/// Walks the program one statement at a time. Direct statements are
/// stored on a line of their own so that GOSUB, FOR and CONT treat them
/// like any other line.

pub struct Runtime {
    program: Program,
    env: Environment,
    session: Session,
    console: Box<dyn Console>,
    builtins: Registry,
    returns: Stack<Position>,
    loops: Stack<ForLoop>,
    depth: usize,
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new(Box::new(Capture::default()))
    }
}

impl Runtime {
    pub fn new(console: Box<dyn Console>) -> Runtime {
        Runtime {
            program: Program::new(),
            env: Environment::new(),
            session: Session::default(),
            console,
            builtins: Registry::default(),
            returns: Stack::new("RETURN STACK FULL"),
            loops: Stack::new("FOR STACK FULL"),
            depth: 0,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn builtins_mut(&mut self) -> &mut Registry {
        &mut self.builtins
    }

    /// Takes one line as typed. Numbered lines edit the program; a bare
    /// line number deletes that line. Anything else runs immediately.
    pub fn enter(&mut self, s: &str) -> Result<Object> {
        let line = Line::new(s);
        if let Some(number) = line.number() {
            if number > LineNumber::max_value() {
                return Err(error!(SyntaxError; "LINE NUMBER TOO LARGE"));
            }
            self.session.restart = None;
            if line.is_empty() {
                self.program.remove_line(number);
                return Ok(Object::Integer(0));
            }
            for statement in line.ast()? {
                self.program.append_statement(statement)?;
            }
            return Ok(Object::Integer(0));
        }
        if line.is_empty() {
            return Ok(Object::Integer(0));
        }
        let statements = line.ast()?;
        self.program.add_line(DIRECT);
        for statement in statements {
            self.program.append_statement(statement)?;
        }
        let result = match self.program.jump(DIRECT) {
            Ok(()) => self.run(),
            Err(error) => Err(error),
        };
        self.program.remove_line(DIRECT);
        result
    }

    /// Runs from the program cursor until the program ends, halts or
    /// fails. The console's break flag is polled between statements.
    pub fn run(&mut self) -> Result<Object> {
        self.session.running = true;
        let mut result = Object::Integer(0);
        while self.session.running {
            if self.console.break_check() {
                let position = self.program.position();
                self.halt(position);
                break;
            }
            let (position, statement) = match self.program.next() {
                Some(next) => next,
                None => break,
            };
            let line = position.line.filter(|&number| number != DIRECT);
            if let (Some(number), 0) = (line, position.index) {
                if self.session.trace {
                    self.console.print(&format!("[{}]", number));
                }
            }
            self.session.line = line;
            match self.eval_statement(&statement) {
                Ok(obj) => result = obj,
                Err(error) => {
                    self.session.running = false;
                    return Err(error.in_line_number(line));
                }
            }
        }
        self.session.running = false;
        Ok(result)
    }

    fn halt(&mut self, restart: Position) {
        self.session.restart = Some(restart);
        self.session.running = false;
        self.program.end();
        match self.session.line {
            Some(number) => self.console.println(&format!("BREAK IN {}", number)),
            None => self.console.println("BREAK"),
        }
    }

    fn clear(&mut self) {
        self.env.clear();
        self.returns.clear();
        self.loops.clear();
        self.program.restore();
    }

    pub fn eval_statement(&mut self, statement: &Statement) -> Result<Object> {
        self.eval_statement_inner(statement)
            .map_err(|error| error.in_column(&statement.column()))
    }

    fn eval_statement_inner(&mut self, statement: &Statement) -> Result<Object> {
        match statement {
            Statement::LineNumber(_, number) => {
                self.session.line = Some(*number);
                return Ok(Operation::normalize(Object::Long(*number as i32)));
            }
            Statement::Beep(_) => self.console.sound_bell(),
            Statement::Clear(_) => self.clear(),
            Statement::Cont(_) => self.r#cont()?,
            Statement::Data(..) | Statement::Rem(_) => {}
            Statement::Def(_, name, params, body) => self.r#def(name, params, body)?,
            Statement::Dim(_, vars) => self.r#dim(vars)?,
            Statement::End(_) => {
                self.session.restart = None;
                self.session.running = false;
                self.program.end();
            }
            Statement::For(_, var, from, to, step) => self.r#for(var, from, to, step.as_ref())?,
            Statement::Gosub(_, target) => {
                let number = self.line_number(target)?;
                self.gosub(number)?;
            }
            Statement::Goto(_, target) => {
                let number = self.line_number(target)?;
                self.program.jump(number)?;
            }
            Statement::If(_, predicate, then_stmts, else_stmts) => {
                return if self.eval(predicate)?.is_true()? {
                    self.eval_block(then_stmts)
                } else {
                    self.eval_block(else_stmts)
                };
            }
            Statement::Let(_, var, expr) => {
                let value = self.eval(expr)?;
                self.assign(var, value.clone())?;
                return Ok(value);
            }
            Statement::Locate(_, row, col) => {
                let row = self.screen_coordinate(row)?;
                let col = self.screen_coordinate(col)?;
                self.console.locate(row, col);
            }
            Statement::New(_) => {
                self.clear();
                self.session.restart = None;
                self.session.running = false;
                self.program.clear();
            }
            Statement::Next(_, vars) => self.r#next(vars)?,
            Statement::OnGoto(_, selector, targets) => {
                if let Some(number) = self.on_target(selector, targets)? {
                    self.program.jump(number)?;
                }
            }
            Statement::OnGosub(_, selector, targets) => {
                if let Some(number) = self.on_target(selector, targets)? {
                    self.gosub(number)?;
                }
            }
            Statement::Print(_, items) => self.r#print(items)?,
            Statement::Randomize(_, seed) => {
                let seed = match seed {
                    Some(expr) => self.eval(expr)?.to_f64()?.to_bits(),
                    None => chrono::Local::now().timestamp_millis() as u64,
                };
                self.session.randomize(seed);
            }
            Statement::Read(_, vars) => self.r#read(vars)?,
            Statement::Restore(_, target) => match target {
                Some(target) => {
                    let number = self.line_number(target)?;
                    self.program.restore_to(number)?;
                }
                None => self.program.restore(),
            },
            Statement::Return(_, target) => self.r#return(target.as_ref())?,
            Statement::Run(_, target) => {
                let number = match target {
                    Some(target) => Some(self.line_number(target)?),
                    None => None,
                };
                self.clear();
                self.session.restart = None;
                match number {
                    Some(number) => self.program.jump(number)?,
                    None => self.program.rewind(),
                }
                self.session.running = true;
            }
            Statement::Stop(_) => {
                let position = self.program.position();
                self.halt(position);
            }
            Statement::Troff(_) => self.session.trace = false,
            Statement::Tron(_) => self.session.trace = true,
        }
        Ok(Object::Integer(0))
    }

    /// Runs the statements of an IF branch. A statement that moves the
    /// program cursor ends the branch.
    fn eval_block(&mut self, statements: &[Statement]) -> Result<Object> {
        let jumps = self.program.jumps();
        let mut result = Object::Integer(0);
        for statement in statements {
            result = self.eval_statement(statement)?;
            if self.program.jumps() != jumps {
                break;
            }
        }
        Ok(result)
    }

    fn line_number(&mut self, expr: &Expression) -> Result<u16> {
        let number = self.eval(expr)?.to_index()?;
        if number < 0 || number > LineNumber::max_value() as i64 {
            return Err(error!(UndefinedLine));
        }
        Ok(number as u16)
    }

    fn screen_coordinate(&mut self, expr: &Expression) -> Result<u16> {
        match self.eval(expr)?.cint()? {
            n if (1..=255).contains(&n) => Ok(n as u16),
            _ => Err(error!(IllegalFunctionCall)),
        }
    }

    fn gosub(&mut self, number: u16) -> Result<()> {
        let point = self.program.position();
        self.program.jump(number)?;
        self.returns.push(point)
    }

    fn r#return(&mut self, target: Option<&Expression>) -> Result<()> {
        if self.returns.is_empty() {
            return Err(error!(ReturnWithoutGosub));
        }
        let point = self.returns.pop()?;
        match target {
            Some(target) => {
                let number = self.line_number(target)?;
                self.program.jump(number)
            }
            None => self.program.resume(point),
        }
    }

    fn on_target(&mut self, selector: &Expression, targets: &[Expression]) -> Result<Option<u16>> {
        let index = self.eval(selector)?.round_i64()?;
        if index < 0 || index > 255 {
            return Err(error!(IllegalFunctionCall));
        }
        match targets.get((index as usize).wrapping_sub(1)) {
            Some(target) => Ok(Some(self.line_number(target)?)),
            _ => Ok(None),
        }
    }

    fn r#cont(&mut self) -> Result<()> {
        let point = match self.session.restart.take() {
            Some(point) => point,
            None => return Err(error!(CantContinue)),
        };
        if self.program.resume(point).is_err() {
            return Err(error!(CantContinue));
        }
        self.session.running = true;
        Ok(())
    }

    fn r#def(&mut self, name: &Ident, params: &[Ident], body: &Expression) -> Result<()> {
        let func = UserFunction {
            name: name.clone(),
            params: params.to_vec(),
            body: Rc::new(body.clone()),
            env: self.env.clone(),
        };
        self.env.set(name.name(), Object::Function(Rc::new(func)))
    }

    fn r#dim(&mut self, vars: &[Variable]) -> Result<()> {
        for var in vars {
            if let Variable::Array(col, ident, bounds) = var {
                let mut sizes = vec![];
                for bound in bounds {
                    let bound = self.eval(bound)?.to_index()?;
                    if bound < 0 || bound > u16::max_value() as i64 {
                        return Err(error!(SubscriptOutOfRange, ..col));
                    }
                    sizes.push(bound as usize + 1);
                }
                self.env
                    .dimension(ident, &sizes)
                    .map_err(|error| error.in_column(col))?;
            }
        }
        Ok(())
    }

    fn r#for(
        &mut self,
        var: &Ident,
        from: &Expression,
        to: &Expression,
        step: Option<&Expression>,
    ) -> Result<()> {
        let from = self.eval(from)?;
        if !from.is_numeric() {
            return Err(error!(TypeMismatch));
        }
        self.env.store(var, from)?;
        let to = self.eval(to)?.into_value();
        let step = match step {
            Some(step) => self.eval(step)?.into_value(),
            None => Object::Integer(1),
        };
        if !to.is_numeric() || !step.is_numeric() {
            return Err(error!(TypeMismatch));
        }
        if let Some(index) = self.loops.rposition(|l| l.var == *var) {
            self.loops.truncate(index);
        }
        let body = self.program.position();
        self.loops.push(ForLoop {
            var: var.clone(),
            to,
            step,
            body,
        })
    }

    fn r#next(&mut self, vars: &[Ident]) -> Result<()> {
        if vars.is_empty() {
            self.next_loop(None)?;
            return Ok(());
        }
        for var in vars {
            if self.next_loop(Some(var))? {
                break;
            }
        }
        Ok(())
    }

    /// Steps one loop. True when control went back to the loop body.
    fn next_loop(&mut self, var: Option<&Ident>) -> Result<bool> {
        let index = match var {
            Some(var) => self.loops.rposition(|l| l.var == *var),
            None => self.loops.len().checked_sub(1),
        };
        let index = match index {
            Some(index) => index,
            None => return Err(error!(NextWithoutFor)),
        };
        self.loops.truncate(index + 1);
        let l = match self.loops.last() {
            Some(l) => l.clone(),
            None => return Err(error!(NextWithoutFor)),
        };
        let precision = self.session.precision;
        let current = match self.env.fetch(&l.var) {
            Some(current) => current,
            None => return Err(error!(IdentifierNotFound)),
        };
        let next = Operation::binary(Op::Add, current, l.step.clone(), precision)?;
        self.env.store(&l.var, next)?;
        let next = self.env.fetch(&l.var).unwrap_or(Object::Integer(0));
        let down = Operation::binary(Op::Less, l.step.clone(), Object::Integer(0), precision)?;
        let past = if down.is_true()? { Op::Less } else { Op::Greater };
        if Operation::binary(past, next, l.to.clone(), precision)?.is_true()? {
            self.loops.pop()?;
            Ok(false)
        } else {
            self.program.resume(l.body)?;
            Ok(true)
        }
    }

    fn r#print(&mut self, items: &[PrintItem]) -> Result<()> {
        for item in items {
            match item {
                PrintItem::Expression(expr) => {
                    let text = self.eval(expr)?.print_text();
                    self.console.print(&text);
                }
                PrintItem::Comma(_) => self.console.print("\t"),
                PrintItem::Semicolon(_) => {}
            }
        }
        if let Some(PrintItem::Semicolon(_)) = items.last() {
            return Ok(());
        }
        self.console.print("\n");
        Ok(())
    }

    fn r#read(&mut self, vars: &[Variable]) -> Result<()> {
        for var in vars {
            let datum = match self.program.next_data() {
                Some(datum) => datum,
                None => return Err(error!(OutOfData)),
            };
            let value = match datum.expression() {
                Some(expr) => self.eval(expr)?,
                None => return Err(error!(InternalError; "DATA CURSOR LOST")),
            };
            self.assign(var, value)?;
        }
        Ok(())
    }
}
