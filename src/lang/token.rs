pub use super::ident::Ident;
use super::{Error, LineNumber, MaxValue};
use crate::error;
use std::collections::HashMap;
use std::convert::TryFrom;

thread_local!(
    static STRING_TO_TOKEN: HashMap<std::string::String, Token> = Token::field_less()
        .into_iter()
        .map(|d| (d.to_string(), d))
        .collect();
);

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Unknown(String),
    Whitespace(usize),
    Literal(Literal),
    Word(Word),
    Operator(Operator),
    Ident(Ident),
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
}

impl Token {
    pub fn from_string(s: &str) -> Option<Token> {
        STRING_TO_TOKEN.with(|stt| stt.get(s).cloned())
    }

    fn field_less() -> Vec<Token> {
        let mut v = vec![
            Token::LParen,
            Token::RParen,
            Token::Comma,
            Token::Colon,
            Token::Semicolon,
        ];
        v.extend(Word::ALL.iter().cloned().map(Token::Word));
        v.extend(Operator::ALL.iter().cloned().map(Token::Operator));
        v
    }

    pub fn is_word(&self) -> bool {
        match self {
            Token::Word(_) => true,
            Token::Operator(op) => op.is_word(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Unknown(s) => write!(f, "{}", s),
            Whitespace(u) => write!(f, "{s:>w$}", s = "", w = u),
            Literal(s) => write!(f, "{}", s),
            Word(s) => write!(f, "{}", s),
            Operator(s) => write!(f, "{}", s),
            Ident(s) => write!(f, "{}", s),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            Semicolon => write!(f, ";"),
        }
    }
}

impl TryFrom<&Token> for LineNumber {
    type Error = Error;
    fn try_from(token: &Token) -> Result<Self, Self::Error> {
        let msg = "INVALID LINE NUMBER";
        if let Token::Literal(lit) = token {
            let s = match lit {
                Literal::Integer(s) | Literal::Long(s) | Literal::Double(s) => s,
                _ => return Err(error!(SyntaxError; msg)),
            };
            if s.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(line) = s.parse::<u16>() {
                    if line <= LineNumber::max_value() {
                        return Ok(Some(line));
                    }
                }
                return Err(error!(Overflow; msg));
            }
        }
        Err(error!(SyntaxError; msg))
    }
}

/// Numeric literals keep their source text; the parser decides the value.
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Integer(String),
    Long(String),
    Fixed(String),
    Single(String),
    Double(String),
    String(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Literal::*;
        match self {
            Integer(s) | Long(s) | Fixed(s) | Single(s) | Double(s) => write!(f, "{}", s),
            String(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Word {
    Beep,
    Clear,
    Cont,
    Data,
    Def,
    Dim,
    Else,
    End,
    For,
    Gosub1,
    Gosub2,
    Goto1,
    Goto2,
    If,
    Let,
    Locate,
    New,
    Next,
    On,
    Print1,
    Print2,
    Randomize,
    Read,
    Rem1,
    Rem2,
    Restore,
    Return,
    Run,
    Step,
    Stop,
    Then,
    To,
    Troff,
    Tron,
}

impl Word {
    const ALL: [Word; 34] = [
        Word::Beep,
        Word::Clear,
        Word::Cont,
        Word::Data,
        Word::Def,
        Word::Dim,
        Word::Else,
        Word::End,
        Word::For,
        Word::Gosub1,
        Word::Gosub2,
        Word::Goto1,
        Word::Goto2,
        Word::If,
        Word::Let,
        Word::Locate,
        Word::New,
        Word::Next,
        Word::On,
        Word::Print1,
        Word::Print2,
        Word::Randomize,
        Word::Read,
        Word::Rem1,
        Word::Rem2,
        Word::Restore,
        Word::Return,
        Word::Run,
        Word::Step,
        Word::Stop,
        Word::Then,
        Word::To,
        Word::Troff,
        Word::Tron,
    ];
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Word::*;
        match self {
            Beep => write!(f, "BEEP"),
            Clear => write!(f, "CLEAR"),
            Cont => write!(f, "CONT"),
            Data => write!(f, "DATA"),
            Def => write!(f, "DEF"),
            Dim => write!(f, "DIM"),
            Else => write!(f, "ELSE"),
            End => write!(f, "END"),
            For => write!(f, "FOR"),
            Gosub1 => write!(f, "GOSUB"),
            Gosub2 => write!(f, "GO SUB"),
            Goto1 => write!(f, "GOTO"),
            Goto2 => write!(f, "GO TO"),
            If => write!(f, "IF"),
            Let => write!(f, "LET"),
            Locate => write!(f, "LOCATE"),
            New => write!(f, "NEW"),
            Next => write!(f, "NEXT"),
            On => write!(f, "ON"),
            Print1 => write!(f, "PRINT"),
            Print2 => write!(f, "?"),
            Randomize => write!(f, "RANDOMIZE"),
            Read => write!(f, "READ"),
            Rem1 => write!(f, "REM"),
            Rem2 => write!(f, "'"),
            Restore => write!(f, "RESTORE"),
            Return => write!(f, "RETURN"),
            Run => write!(f, "RUN"),
            Step => write!(f, "STEP"),
            Stop => write!(f, "STOP"),
            Then => write!(f, "THEN"),
            To => write!(f, "TO"),
            Troff => write!(f, "TROFF"),
            Tron => write!(f, "TRON"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Operator {
    Caret,
    Multiply,
    Divide,
    DivideInt,
    Modulus,
    Plus,
    Minus,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    EqualLess,
    Greater,
    GreaterEqual,
    EqualGreater,
    Not,
    And,
    Or,
    Xor,
    Imp,
    Eqv,
}

impl Operator {
    const ALL: [Operator; 21] = [
        Operator::Caret,
        Operator::Multiply,
        Operator::Divide,
        Operator::DivideInt,
        Operator::Modulus,
        Operator::Plus,
        Operator::Minus,
        Operator::Equal,
        Operator::NotEqual,
        Operator::Less,
        Operator::LessEqual,
        Operator::EqualLess,
        Operator::Greater,
        Operator::GreaterEqual,
        Operator::EqualGreater,
        Operator::Not,
        Operator::And,
        Operator::Or,
        Operator::Xor,
        Operator::Imp,
        Operator::Eqv,
    ];

    pub fn is_word(&self) -> bool {
        use Operator::*;
        match self {
            Caret | Multiply | Divide | DivideInt | Plus | Minus | Equal | NotEqual | Less
            | LessEqual | EqualLess | Greater | GreaterEqual | EqualGreater => false,
            Modulus | Not | And | Or | Xor | Imp | Eqv => true,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Caret => write!(f, "^"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            DivideInt => write!(f, "\\"),
            Modulus => write!(f, "MOD"),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Equal => write!(f, "="),
            NotEqual => write!(f, "<>"),
            Less => write!(f, "<"),
            LessEqual => write!(f, "<="),
            EqualLess => write!(f, "=<"),
            Greater => write!(f, ">"),
            GreaterEqual => write!(f, ">="),
            EqualGreater => write!(f, "=>"),
            Not => write!(f, "NOT"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
            Xor => write!(f, "XOR"),
            Imp => write!(f, "IMP"),
            Eqv => write!(f, "EQV"),
        }
    }
}
