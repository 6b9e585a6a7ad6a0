use super::{Result, Runtime};
use crate::error;
use crate::lang::ast::{Expression, Ident, Variable};
use crate::lang::Suffix;
use crate::mach::{Environment, Logic, Object, Op, Operation, UserFunction};

/// Nesting limit for user function calls.
const MAX_DEPTH: usize = 255;

impl Runtime {
    pub fn eval(&mut self, expr: &Expression) -> Result<Object> {
        self.eval_inner(expr)
            .map_err(|error| error.in_column(&expr.column()))
    }

    fn eval_inner(&mut self, expr: &Expression) -> Result<Object> {
        match expr {
            Expression::Integer(_, n) => Ok(Object::Integer(*n)),
            Expression::Long(_, n) => Ok(Object::Long(*n)),
            Expression::Fixed(_, s) => Ok(Object::Fixed(s.parse()?)),
            Expression::Single(_, n) => Ok(Object::Single(*n)),
            Expression::Double(_, n) => Ok(Object::Double(*n)),
            Expression::String(_, s) => Ok(Object::String(s.clone())),
            Expression::Var(_, ident) => self.fetch(ident),
            Expression::Function(_, ident, args) => self.call(ident, args),
            Expression::Negation(_, expr) => Operation::negate(self.eval(expr)?),
            Expression::Not(_, expr) => Operation::not(self.eval(expr)?),
            Expression::Power(_, lhs, rhs) => self.binary(Op::Power, lhs, rhs),
            Expression::Multiply(_, lhs, rhs) => self.binary(Op::Multiply, lhs, rhs),
            Expression::Divide(_, lhs, rhs) => self.binary(Op::Divide, lhs, rhs),
            Expression::DivideInt(_, lhs, rhs) => self.binary(Op::DivideInt, lhs, rhs),
            Expression::Modulus(_, lhs, rhs) => self.binary(Op::Modulus, lhs, rhs),
            Expression::Add(_, lhs, rhs) => self.binary(Op::Add, lhs, rhs),
            Expression::Subtract(_, lhs, rhs) => self.binary(Op::Subtract, lhs, rhs),
            Expression::Equal(_, lhs, rhs) => self.binary(Op::Equal, lhs, rhs),
            Expression::NotEqual(_, lhs, rhs) => self.binary(Op::NotEqual, lhs, rhs),
            Expression::Less(_, lhs, rhs) => self.binary(Op::Less, lhs, rhs),
            Expression::LessEqual(_, lhs, rhs) => self.binary(Op::LessEqual, lhs, rhs),
            Expression::Greater(_, lhs, rhs) => self.binary(Op::Greater, lhs, rhs),
            Expression::GreaterEqual(_, lhs, rhs) => self.binary(Op::GreaterEqual, lhs, rhs),
            Expression::And(_, lhs, rhs) => self.logical(Logic::And, lhs, rhs),
            Expression::Or(_, lhs, rhs) => self.logical(Logic::Or, lhs, rhs),
            Expression::Xor(_, lhs, rhs) => self.logical(Logic::Xor, lhs, rhs),
            Expression::Imp(_, lhs, rhs) => self.logical(Logic::Imp, lhs, rhs),
            Expression::Eqv(_, lhs, rhs) => self.logical(Logic::Eqv, lhs, rhs),
        }
    }

    fn binary(&mut self, op: Op, lhs: &Expression, rhs: &Expression) -> Result<Object> {
        let lhs = self.eval(lhs)?;
        let rhs = self.eval(rhs)?;
        Operation::binary(op, lhs, rhs, self.session.precision)
    }

    fn logical(&mut self, op: Logic, lhs: &Expression, rhs: &Expression) -> Result<Object> {
        let lhs = self.eval(lhs)?;
        let rhs = self.eval(rhs)?;
        Operation::logical(op, lhs, rhs)
    }

    fn eval_list(&mut self, exprs: &[Expression]) -> Result<Vec<Object>> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn indices(&mut self, exprs: &[Expression]) -> Result<Vec<i64>> {
        exprs
            .iter()
            .map(|expr| self.eval(expr)?.to_index())
            .collect()
    }

    /// A bare name: a variable, a function of no arguments, or a builtin.
    fn fetch(&mut self, ident: &Ident) -> Result<Object> {
        match self.env.get(ident.name()) {
            Some(Object::Function(func)) => self.call_user(&func, vec![]),
            Some(obj) => Ok(obj.into_value()),
            None => match self.builtins.lookup(ident.name()) {
                Some(builtin) => (builtin.func)(&mut self.session, vec![]),
                None if ident.is_user_function() => Err(error!(UndefinedUserFunction)),
                None => Err(error!(IdentifierNotFound)),
            },
        }
    }

    /// `NAME(args)`: a user function, an array element, or a builtin when
    /// no array of that name exists.
    fn call(&mut self, ident: &Ident, args: &[Expression]) -> Result<Object> {
        if ident.is_user_function() {
            return match self.env.get(ident.name()) {
                Some(Object::Function(func)) => {
                    let args = self.eval_list(args)?;
                    self.call_user(&func, args)
                }
                _ => Err(error!(UndefinedUserFunction)),
            };
        }
        if self.env.array(ident).is_none() {
            if let Some(builtin) = self.builtins.lookup(ident.name()) {
                let args = self.eval_list(args)?;
                return (builtin.func)(&mut self.session, args);
            }
        }
        let indices = self.indices(args)?;
        self.env.fetch_array(ident, &indices)
    }

    fn call_user(&mut self, func: &UserFunction, args: Vec<Object>) -> Result<Object> {
        if args.len() != func.params.len() {
            return Err(error!(SyntaxError; "WRONG NUMBER OF ARGUMENTS"));
        }
        if self.depth >= MAX_DEPTH {
            return Err(error!(OutOfMemory; "FUNCTION NESTING TOO DEEP"));
        }
        let scope = Environment::enclosed(&func.env);
        for (param, arg) in func.params.iter().zip(args) {
            scope.define(param, arg)?;
        }
        let caller = std::mem::replace(&mut self.env, scope);
        self.depth += 1;
        let result = self.eval(&func.body);
        self.depth -= 1;
        self.env = caller;
        let value = match result? {
            Object::Return(value) => *value,
            value => value,
        };
        match func.name.suffix() {
            Suffix::Plain => Ok(value),
            suffix => value.coerce(suffix),
        }
    }

    /// Saves a value the way LET does. Array subscripts are evaluated
    /// after the value.
    pub fn assign(&mut self, var: &Variable, value: Object) -> Result<()> {
        match var {
            Variable::Unary(col, ident) => self
                .env
                .store(ident, value)
                .map_err(|error| error.in_column(col)),
            Variable::Array(col, ident, args) => {
                let indices = self.indices(args)?;
                self.env
                    .store_array(ident, &indices, value)
                    .map_err(|error| error.in_column(col))
            }
        }
    }
}
