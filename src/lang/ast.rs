use super::Column;
pub use super::ident::Ident;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Marks the start of a numbered line. Programs are built by
    /// appending these followed by the line's statements.
    LineNumber(Column, u16),
    Beep(Column),
    Clear(Column),
    Cont(Column),
    Data(Column, Vec<Expression>),
    Def(Column, Ident, Vec<Ident>, Expression),
    Dim(Column, Vec<Variable>),
    End(Column),
    For(Column, Ident, Expression, Expression, Option<Expression>),
    Gosub(Column, Expression),
    Goto(Column, Expression),
    If(Column, Expression, Vec<Statement>, Vec<Statement>),
    Let(Column, Variable, Expression),
    Locate(Column, Expression, Expression),
    New(Column),
    Next(Column, Vec<Ident>),
    OnGoto(Column, Expression, Vec<Expression>),
    OnGosub(Column, Expression, Vec<Expression>),
    Print(Column, Vec<PrintItem>),
    Randomize(Column, Option<Expression>),
    Read(Column, Vec<Variable>),
    Rem(Column),
    Restore(Column, Option<Expression>),
    Return(Column, Option<Expression>),
    Run(Column, Option<Expression>),
    Stop(Column),
    Troff(Column),
    Tron(Column),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Unary(Column, Ident),
    Array(Column, Ident, Vec<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintItem {
    Expression(Expression),
    Comma(Column),
    Semicolon(Column),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(Column, i16),
    Long(Column, i32),
    Fixed(Column, Rc<str>),
    Single(Column, f32),
    Double(Column, f64),
    String(Column, Rc<str>),
    Var(Column, Ident),
    /// `NAME(args)` is an array element, a user function or a builtin;
    /// only the runtime can tell which.
    Function(Column, Ident, Vec<Expression>),
    Negation(Column, Box<Expression>),
    Power(Column, Box<Expression>, Box<Expression>),
    Multiply(Column, Box<Expression>, Box<Expression>),
    Divide(Column, Box<Expression>, Box<Expression>),
    DivideInt(Column, Box<Expression>, Box<Expression>),
    Modulus(Column, Box<Expression>, Box<Expression>),
    Add(Column, Box<Expression>, Box<Expression>),
    Subtract(Column, Box<Expression>, Box<Expression>),
    Equal(Column, Box<Expression>, Box<Expression>),
    NotEqual(Column, Box<Expression>, Box<Expression>),
    Less(Column, Box<Expression>, Box<Expression>),
    LessEqual(Column, Box<Expression>, Box<Expression>),
    Greater(Column, Box<Expression>, Box<Expression>),
    GreaterEqual(Column, Box<Expression>, Box<Expression>),
    Not(Column, Box<Expression>),
    And(Column, Box<Expression>, Box<Expression>),
    Or(Column, Box<Expression>, Box<Expression>),
    Xor(Column, Box<Expression>, Box<Expression>),
    Imp(Column, Box<Expression>, Box<Expression>),
    Eqv(Column, Box<Expression>, Box<Expression>),
}

impl Statement {
    pub fn column(&self) -> Column {
        use Statement::*;
        match self {
            LineNumber(col, ..)
            | Beep(col)
            | Clear(col)
            | Cont(col)
            | Data(col, ..)
            | Def(col, ..)
            | Dim(col, ..)
            | End(col)
            | For(col, ..)
            | Gosub(col, ..)
            | Goto(col, ..)
            | If(col, ..)
            | Let(col, ..)
            | Locate(col, ..)
            | New(col)
            | Next(col, ..)
            | OnGoto(col, ..)
            | OnGosub(col, ..)
            | Print(col, ..)
            | Randomize(col, ..)
            | Read(col, ..)
            | Rem(col)
            | Restore(col, ..)
            | Return(col, ..)
            | Run(col, ..)
            | Stop(col)
            | Troff(col)
            | Tron(col) => col.clone(),
        }
    }
}

impl Expression {
    pub fn column(&self) -> Column {
        use Expression::*;
        match self {
            Integer(col, ..)
            | Long(col, ..)
            | Fixed(col, ..)
            | Single(col, ..)
            | Double(col, ..)
            | String(col, ..)
            | Var(col, ..)
            | Function(col, ..)
            | Negation(col, ..)
            | Power(col, ..)
            | Multiply(col, ..)
            | Divide(col, ..)
            | DivideInt(col, ..)
            | Modulus(col, ..)
            | Add(col, ..)
            | Subtract(col, ..)
            | Equal(col, ..)
            | NotEqual(col, ..)
            | Less(col, ..)
            | LessEqual(col, ..)
            | Greater(col, ..)
            | GreaterEqual(col, ..)
            | Not(col, ..)
            | And(col, ..)
            | Or(col, ..)
            | Xor(col, ..)
            | Imp(col, ..)
            | Eqv(col, ..) => col.clone(),
        }
    }
}
