use super::{ast::*, token::*, Column, Error, LineNumber};
use crate::error;

type Result<T> = std::result::Result<T, Error>;

pub fn parse(line_number: LineNumber, tokens: &[Token]) -> Result<Vec<Statement>> {
    match Parser::parse(tokens) {
        Err(e) => Err(e.in_line_number(line_number)),
        Ok(mut r) => {
            if let Some(number) = line_number {
                r.insert(0, Statement::LineNumber(0..0, number));
            }
            Ok(r)
        }
    }
}

struct Parser<'a> {
    token_stream: std::slice::Iter<'a, Token>,
    peeked: Option<&'a Token>,
    col: Column,
}

impl<'a> Parser<'a> {
    fn parse(tokens: &'a [Token]) -> Result<Vec<Statement>> {
        let mut parse = Parser {
            token_stream: tokens.iter(),
            peeked: None,
            col: 0..0,
        };
        match parse.statement_list(false) {
            Ok(r) => match parse.peek() {
                None => Ok(r),
                Some(_) => Err(error!(SyntaxError, ..&parse.col; "UNEXPECTED TOKEN")),
            },
            Err(e) => Err(e.in_column(&parse.col)),
        }
    }

    fn column(&self) -> Column {
        self.col.clone()
    }

    fn next(&mut self) -> Option<&'a Token> {
        if self.peeked.is_some() {
            return self.peeked.take();
        }
        loop {
            self.col.start = self.col.end;
            let t = self.token_stream.next()?;
            self.col.end += t.to_string().chars().count();
            match t {
                Token::Whitespace(_) => continue,
                _ => return Some(t),
            }
        }
    }

    fn peek(&mut self) -> Option<&&'a Token> {
        if self.peeked.is_none() {
            self.peeked = self.next();
        }
        self.peeked.as_ref()
    }

    fn statement_list(&mut self, stop_at_else: bool) -> Result<Vec<Statement>> {
        let mut r: Vec<Statement> = vec![];
        loop {
            match self.peek() {
                None => return Ok(r),
                Some(Token::Colon) => {
                    self.next();
                    continue;
                }
                Some(Token::Word(Word::Else)) if stop_at_else => return Ok(r),
                Some(_) => {}
            }
            r.push(self.statement()?);
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        match self.peek().copied() {
            Some(Token::Ident(_)) => {
                let column = self.column();
                Statement::r#let(self, column)
            }
            Some(Token::Word(word)) => {
                self.next();
                Statement::for_word(self, word)
            }
            _ => Err(error!(SyntaxError; "EXPECTED STATEMENT")),
        }
    }

    fn expression(&mut self) -> Result<Expression> {
        fn parse(this: &mut Parser, precedence: usize) -> Result<Expression> {
            let mut lhs = match this.next() {
                Some(Token::LParen) => {
                    let expr = this.expression()?;
                    this.expect(Token::RParen)?;
                    expr
                }
                Some(Token::Ident(i)) => {
                    let column = this.column();
                    match this.peek() {
                        Some(&&Token::LParen) => {
                            Expression::Function(column, i.clone(), this.expression_list()?)
                        }
                        _ => Expression::Var(column, i.clone()),
                    }
                }
                Some(Token::Literal(l)) => Expression::for_literal(this.column(), l)?,
                Some(Token::Operator(Operator::Minus)) => {
                    let column = this.column();
                    let expr = parse(this, Expression::UNARY_PRECEDENCE)?;
                    Expression::Negation(column, Box::new(expr))
                }
                Some(Token::Operator(Operator::Plus)) => {
                    parse(this, Expression::UNARY_PRECEDENCE)?
                }
                Some(Token::Operator(Operator::Not)) => {
                    let column = this.column();
                    let expr = parse(this, Expression::NOT_PRECEDENCE)?;
                    Expression::Not(column, Box::new(expr))
                }
                _ => return Err(error!(SyntaxError; "EXPECTED EXPRESSION")),
            };
            while let Some(Token::Operator(op)) = this.peek().copied() {
                let op_precedence = match Expression::op_precedence(op) {
                    Some(p) => p,
                    None => break,
                };
                if op_precedence < precedence {
                    break;
                }
                this.next();
                let column = this.column();
                let rhs = parse(this, op_precedence + 1)?;
                lhs = Expression::for_binary_op(column, op, lhs, rhs);
            }
            Ok(lhs)
        }
        parse(self, 0)
    }

    fn expression_list(&mut self) -> Result<Vec<Expression>> {
        self.expect(Token::LParen)?;
        let mut v: Vec<Expression> = vec![];
        loop {
            v.push(self.expression()?);
            match self.next() {
                Some(Token::RParen) => return Ok(v),
                Some(Token::Comma) => continue,
                _ => return Err(error!(SyntaxError; "EXPECTED END OR SEPARATOR")),
            }
        }
    }

    fn comma_list<T, F>(&mut self, mut item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Parser<'a>) -> Result<T>,
    {
        let mut v = vec![item(self)?];
        while let Some(Token::Comma) = self.peek() {
            self.next();
            v.push(item(self)?);
        }
        Ok(v)
    }

    fn printer_list(&mut self) -> Result<Vec<PrintItem>> {
        let mut v: Vec<PrintItem> = vec![];
        loop {
            match self.peek() {
                None
                | Some(Token::Colon)
                | Some(Token::Word(Word::Else))
                | Some(Token::Word(Word::Rem2)) => return Ok(v),
                Some(Token::Semicolon) => {
                    self.next();
                    v.push(PrintItem::Semicolon(self.column()));
                }
                Some(Token::Comma) => {
                    self.next();
                    v.push(PrintItem::Comma(self.column()));
                }
                _ => v.push(PrintItem::Expression(self.expression()?)),
            };
        }
    }

    fn ident(&mut self) -> Result<(Column, Ident)> {
        let ident = match self.next() {
            Some(Token::Ident(i)) => i.clone(),
            _ => return Err(error!(SyntaxError; "EXPECTED IDENTIFIER")),
        };
        Ok((self.column(), ident))
    }

    fn variable(&mut self) -> Result<Variable> {
        let (column, ident) = self.ident()?;
        match self.peek() {
            Some(Token::LParen) => Ok(Variable::Array(column, ident, self.expression_list()?)),
            _ => Ok(Variable::Unary(column, ident)),
        }
    }

    fn optional_expression(&mut self) -> Result<Option<Expression>> {
        match self.peek() {
            None | Some(Token::Colon) | Some(Token::Word(Word::Else)) => Ok(None),
            Some(_) => Ok(Some(self.expression()?)),
        }
    }

    /// `THEN 100` and `ELSE 100` are shorthand for a GOTO.
    fn branch(&mut self) -> Result<Vec<Statement>> {
        if let Some(Token::Literal(_)) = self.peek() {
            let column = self.column();
            return Ok(vec![Statement::Goto(column, self.expression()?)]);
        }
        self.statement_list(true)
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if let Some(t) = self.next() {
            if *t == token {
                return Ok(());
            }
        }
        use Token::*;
        Err(error!(SyntaxError;
            match token {
                Unknown(_) | Whitespace(_) => {"UNEXPECTED TOKEN"}
                Literal(_) => {"EXPECTED LITERAL"}
                Word(_) => {"EXPECTED RESERVED WORD"}
                Operator(_) => {"EXPECTED OPERATOR"}
                Ident(_) => {"EXPECTED IDENTIFIER"}
                LParen => {"EXPECTED LEFT PARENTHESIS"}
                RParen => {"EXPECTED RIGHT PARENTHESIS"}
                Comma => {"EXPECTED COMMA"}
                Colon => {"EXPECTED COLON"}
                Semicolon => {"EXPECTED SEMICOLON"}
            }
        ))
    }
}

impl Expression {
    const NOT_PRECEDENCE: usize = 6;
    const UNARY_PRECEDENCE: usize = 12;

    fn for_binary_op(col: Column, op: &Operator, lhs: Expression, rhs: Expression) -> Expression {
        use Operator::*;
        let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
        match op {
            Caret => Expression::Power(col, lhs, rhs),
            Multiply => Expression::Multiply(col, lhs, rhs),
            Divide => Expression::Divide(col, lhs, rhs),
            DivideInt => Expression::DivideInt(col, lhs, rhs),
            Modulus => Expression::Modulus(col, lhs, rhs),
            Plus => Expression::Add(col, lhs, rhs),
            Minus => Expression::Subtract(col, lhs, rhs),
            Equal => Expression::Equal(col, lhs, rhs),
            NotEqual => Expression::NotEqual(col, lhs, rhs),
            Less => Expression::Less(col, lhs, rhs),
            LessEqual | EqualLess => Expression::LessEqual(col, lhs, rhs),
            Greater => Expression::Greater(col, lhs, rhs),
            GreaterEqual | EqualGreater => Expression::GreaterEqual(col, lhs, rhs),
            And => Expression::And(col, lhs, rhs),
            Or => Expression::Or(col, lhs, rhs),
            Xor => Expression::Xor(col, lhs, rhs),
            Imp => Expression::Imp(col, lhs, rhs),
            Eqv => Expression::Eqv(col, lhs, rhs),
            Not => unreachable!("NOT is never binary"),
        }
    }

    fn op_precedence(op: &Operator) -> Option<usize> {
        use Operator::*;
        Some(match op {
            Caret => 13,
            Multiply | Divide => 11,
            DivideInt => 10,
            Modulus => 9,
            Plus | Minus => 8,
            Equal | NotEqual | Less | LessEqual | EqualLess | Greater | GreaterEqual
            | EqualGreater => 7,
            Not => return None,
            And => 5,
            Or => 4,
            Xor => 3,
            Eqv => 2,
            Imp => 1,
        })
    }

    fn for_literal(col: Column, lit: &Literal) -> Result<Expression> {
        fn clean(s: &str) -> String {
            let mut s = s.replace("D", "E");
            if let Some('!') | Some('#') | Some('%') = s.chars().last() {
                s.pop();
            }
            s
        }
        match lit {
            Literal::Integer(s) => match clean(s).parse() {
                Ok(n) => Ok(Expression::Integer(col, n)),
                Err(_) => Err(error!(Overflow, ..&col)),
            },
            Literal::Long(s) => match s.parse() {
                Ok(n) => Ok(Expression::Long(col, n)),
                Err(_) => Err(error!(Overflow, ..&col)),
            },
            Literal::Fixed(s) => Ok(Expression::Fixed(col, s.as_str().into())),
            Literal::Single(s) => match clean(s).parse() {
                Ok(n) => Ok(Expression::Single(col, n)),
                Err(_) => Err(error!(SyntaxError, ..&col; "INVALID NUMBER")),
            },
            Literal::Double(s) => match clean(s).parse() {
                Ok(n) => Ok(Expression::Double(col, n)),
                Err(_) => Err(error!(SyntaxError, ..&col; "INVALID NUMBER")),
            },
            Literal::String(s) => Ok(Expression::String(col, s.as_str().into())),
        }
    }
}

impl Statement {
    fn for_word(parse: &mut Parser, word: &Word) -> Result<Statement> {
        let column = parse.column();
        use Word::*;
        match word {
            Beep => Ok(Statement::Beep(column)),
            Clear => Ok(Statement::Clear(column)),
            Cont => Ok(Statement::Cont(column)),
            Data => Self::r#data(parse, column),
            Def => Self::r#def(parse, column),
            Dim => Self::r#dim(parse, column),
            End => Ok(Statement::End(column)),
            For => Self::r#for(parse, column),
            Gosub1 | Gosub2 => Ok(Statement::Gosub(column, parse.expression()?)),
            Goto1 | Goto2 => Ok(Statement::Goto(column, parse.expression()?)),
            If => Self::r#if(parse, column),
            Let => Self::r#let(parse, column),
            Locate => Self::r#locate(parse, column),
            New => Ok(Statement::New(column)),
            Next => Self::r#next(parse, column),
            On => Self::r#on(parse, column),
            Print1 | Print2 => Ok(Statement::Print(column, parse.printer_list()?)),
            Randomize => Ok(Statement::Randomize(column, parse.optional_expression()?)),
            Read => Ok(Statement::Read(column, parse.comma_list(Parser::variable)?)),
            Rem1 | Rem2 => {
                while parse.next().is_some() {}
                Ok(Statement::Rem(column))
            }
            Restore => Ok(Statement::Restore(column, parse.optional_expression()?)),
            Return => Ok(Statement::Return(column, parse.optional_expression()?)),
            Run => Ok(Statement::Run(column, parse.optional_expression()?)),
            Stop => Ok(Statement::Stop(column)),
            Troff => Ok(Statement::Troff(column)),
            Tron => Ok(Statement::Tron(column)),
            Else | Step | To | Then => Err(error!(SyntaxError; "EXPECTED STATEMENT")),
        }
    }

    fn r#let(parse: &mut Parser, column: Column) -> Result<Statement> {
        let var = parse.variable()?;
        parse.expect(Token::Operator(Operator::Equal))?;
        let expr = parse.expression()?;
        Ok(Statement::Let(column, var, expr))
    }

    fn r#data(parse: &mut Parser, column: Column) -> Result<Statement> {
        Ok(Statement::Data(column, parse.comma_list(Parser::expression)?))
    }

    fn r#def(parse: &mut Parser, column: Column) -> Result<Statement> {
        let (_, ident) = parse.ident()?;
        if !ident.is_user_function() {
            return Err(error!(SyntaxError; "FUNCTION NAME MUST BEGIN WITH FN"));
        }
        let mut params = vec![];
        if let Some(Token::LParen) = parse.peek() {
            parse.next();
            params = parse.comma_list(|p| Ok(p.ident()?.1))?;
            parse.expect(Token::RParen)?;
        }
        parse.expect(Token::Operator(Operator::Equal))?;
        Ok(Statement::Def(column, ident, params, parse.expression()?))
    }

    fn r#dim(parse: &mut Parser, column: Column) -> Result<Statement> {
        let vars = parse.comma_list(Parser::variable)?;
        for var in &vars {
            if let Variable::Unary(col, _) = var {
                return Err(error!(SyntaxError, ..col; "NOT AN ARRAY"));
            }
        }
        Ok(Statement::Dim(column, vars))
    }

    fn r#for(parse: &mut Parser, column: Column) -> Result<Statement> {
        let (_, ident) = parse.ident()?;
        parse.expect(Token::Operator(Operator::Equal))?;
        let from = parse.expression()?;
        parse.expect(Token::Word(Word::To))?;
        let to = parse.expression()?;
        let step = match parse.peek() {
            Some(Token::Word(Word::Step)) => {
                parse.next();
                Some(parse.expression()?)
            }
            _ => None,
        };
        Ok(Statement::For(column, ident, from, to, step))
    }

    fn r#if(parse: &mut Parser, column: Column) -> Result<Statement> {
        let predicate = parse.expression()?;
        let then_stmts = match parse.peek() {
            Some(Token::Word(Word::Then)) => {
                parse.next();
                parse.branch()?
            }
            Some(Token::Word(Word::Goto1)) | Some(Token::Word(Word::Goto2)) => {
                parse.statement_list(true)?
            }
            _ => return Err(error!(SyntaxError; "EXPECTED THEN")),
        };
        let else_stmts = match parse.peek() {
            Some(Token::Word(Word::Else)) => {
                parse.next();
                parse.branch()?
            }
            _ => vec![],
        };
        Ok(Statement::If(column, predicate, then_stmts, else_stmts))
    }

    fn r#locate(parse: &mut Parser, column: Column) -> Result<Statement> {
        let row = parse.expression()?;
        parse.expect(Token::Comma)?;
        let col = parse.expression()?;
        Ok(Statement::Locate(column, row, col))
    }

    fn r#next(parse: &mut Parser, column: Column) -> Result<Statement> {
        match parse.peek() {
            Some(Token::Ident(_)) => Ok(Statement::Next(
                column,
                parse.comma_list(|p| Ok(p.ident()?.1))?,
            )),
            _ => Ok(Statement::Next(column, vec![])),
        }
    }

    fn r#on(parse: &mut Parser, column: Column) -> Result<Statement> {
        let selector = parse.expression()?;
        let gosub = match parse.next() {
            Some(Token::Word(Word::Goto1)) | Some(Token::Word(Word::Goto2)) => false,
            Some(Token::Word(Word::Gosub1)) | Some(Token::Word(Word::Gosub2)) => true,
            _ => return Err(error!(SyntaxError; "EXPECTED GOTO OR GOSUB")),
        };
        let targets = parse.comma_list(Parser::expression)?;
        if gosub {
            Ok(Statement::OnGosub(column, selector, targets))
        } else {
            Ok(Statement::OnGoto(column, selector, targets))
        }
    }
}
