use std::rc::Rc;

// Used in both Token and Ast

/// Names keep their suffix character, `A$` and `A%` are different variables.
#[derive(Debug, PartialEq, Hash, Clone)]
pub enum Ident {
    Plain(Rc<str>),
    String(Rc<str>),
    Single(Rc<str>),
    Double(Rc<str>),
    Integer(Rc<str>),
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Suffix {
    Plain,
    String,
    Single,
    Double,
    Integer,
}

impl Ident {
    pub fn new(name: &str) -> Ident {
        let name: Rc<str> = name.to_ascii_uppercase().into();
        match name.chars().last() {
            Some('$') => Ident::String(name),
            Some('!') => Ident::Single(name),
            Some('#') => Ident::Double(name),
            Some('%') => Ident::Integer(name),
            _ => Ident::Plain(name),
        }
    }

    pub fn name(&self) -> &Rc<str> {
        use Ident::*;
        match self {
            Plain(s) | String(s) | Single(s) | Double(s) | Integer(s) => s,
        }
    }

    pub fn suffix(&self) -> Suffix {
        match self {
            Ident::Plain(_) => Suffix::Plain,
            Ident::String(_) => Suffix::String,
            Ident::Single(_) => Suffix::Single,
            Ident::Double(_) => Suffix::Double,
            Ident::Integer(_) => Suffix::Integer,
        }
    }

    /// User functions are the names DEF FN can define.
    pub fn is_user_function(&self) -> bool {
        self.name().starts_with("FN")
    }
}

impl Suffix {
    pub fn as_char(self) -> Option<char> {
        match self {
            Suffix::Plain => None,
            Suffix::String => Some('$'),
            Suffix::Single => Some('!'),
            Suffix::Double => Some('#'),
            Suffix::Integer => Some('%'),
        }
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Display for Suffix {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.as_char() {
            Some(ch) => write!(f, "{}", ch),
            None => Ok(()),
        }
    }
}
