use super::ast::*;
use super::error::*;
use super::lex::*;
use super::parse::*;
use super::token::*;
use super::LineNumber;

/// One line of source as typed: an optional line number and its tokens.
#[derive(Debug, PartialEq)]
pub struct Line {
    number: LineNumber,
    tokens: Vec<Token>,
}

impl Line {
    pub fn new(s: &str) -> Line {
        let (number, tokens) = lex(s);
        Line { number, tokens }
    }

    pub fn number(&self) -> LineNumber {
        self.number
    }

    pub fn is_direct(&self) -> bool {
        self.number.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn ast(&self) -> Result<Vec<Statement>, Error> {
        parse(self.number, &self.tokens)
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s: String = self.tokens.iter().map(|s| s.to_string()).collect();
        match self.number {
            Some(number) => write!(f, "{} {}", number, s),
            None => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lf() {
        let l = Line::new("run\n");
        assert_eq!(l.tokens, [Token::Word(Word::Run)]);
    }

    #[test]
    fn test_crlf() {
        let l = Line::new("10 end\r\n");
        assert_eq!(l.number(), Some(10));
        assert_eq!(l.tokens, [Token::Word(Word::End)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Line::new("10 print  \"hi\"").to_string(), "10 PRINT  \"hi\"");
    }
}
