use super::{token::*, LineNumber, MaxValue};

pub fn lex(s: &str) -> (LineNumber, Vec<Token>) {
    BasicLexer::lex(s)
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_basic_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_basic_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic()
}

trait Tokenizers<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::Chars<'a>>;

    fn whitespace(&mut self) -> Option<Token> {
        let mut len = 0;
        loop {
            self.chars().next();
            len += 1;
            if let Some(pk) = self.chars().peek() {
                if is_basic_whitespace(*pk) {
                    continue;
                }
            }
            return Some(Token::Whitespace(len));
        }
    }

    fn number(&mut self) -> Option<Token> {
        let mut s = String::new();
        let mut digits = 0;
        let mut decimal = false;
        let mut exp: Option<char> = None;
        loop {
            let ch = match self.chars().next() {
                Some(c) => c.to_ascii_uppercase(),
                None => {
                    debug_assert!(false, "Failed to tokenize number.");
                    return None;
                }
            };
            s.push(ch);
            if exp.is_none() && is_basic_digit(ch) {
                digits += 1;
            }
            match ch {
                '.' => decimal = true,
                'E' | 'D' => exp = Some(ch),
                '!' => return Some(Token::Literal(Literal::Single(s))),
                '#' => return Some(Token::Literal(Literal::Double(s))),
                '%' => return Some(Token::Literal(Literal::Integer(s))),
                _ => {}
            }
            if let Some(pk) = self.chars().peek() {
                if (ch == 'E' || ch == 'D') && (*pk == '+' || *pk == '-') {
                    continue;
                }
                if is_basic_digit(*pk) {
                    continue;
                }
                if !decimal && exp.is_none() && *pk == '.' {
                    continue;
                }
                if exp.is_none() && matches!(*pk, 'E' | 'e' | 'D' | 'd') {
                    continue;
                }
                if *pk == '!' || *pk == '#' || *pk == '%' {
                    continue;
                }
            }
            break;
        }
        match exp {
            Some('D') => return Some(Token::Literal(Literal::Double(s))),
            Some(_) if digits > 7 => return Some(Token::Literal(Literal::Double(s))),
            Some(_) => return Some(Token::Literal(Literal::Single(s))),
            None => {}
        }
        if decimal {
            return Some(Token::Literal(Literal::Fixed(s)));
        }
        if s.parse::<i16>().is_ok() {
            return Some(Token::Literal(Literal::Integer(s)));
        }
        if s.parse::<i32>().is_ok() {
            return Some(Token::Literal(Literal::Long(s)));
        }
        Some(Token::Literal(Literal::Double(s)))
    }

    fn string(&mut self) -> Option<Token> {
        let mut s = String::new();
        self.chars().next();
        loop {
            if let Some(ch) = self.chars().next() {
                if ch != '"' {
                    s.push(ch);
                    continue;
                }
            }
            return Some(Token::Literal(Literal::String(s)));
        }
    }

    fn alphabetic(&mut self) -> Option<Token> {
        let mut s = String::new();
        let mut digit = false;
        loop {
            let ch = match self.chars().next() {
                Some(ch) => ch.to_ascii_uppercase(),
                None => {
                    debug_assert!(false, "Failed to tokenize alphabetic.");
                    return None;
                }
            };
            s.push(ch);
            if is_basic_digit(ch) {
                digit = true;
            }
            if let Some(token) = Token::from_string(&s) {
                return Some(token);
            }
            if ch == '$' || ch == '!' || ch == '#' || ch == '%' {
                return Some(Token::Ident(Ident::new(&s)));
            }
            if let Some(pk) = self.chars().peek() {
                if is_basic_alphabetic(*pk) {
                    if digit {
                        break;
                    }
                    continue;
                }
                if is_basic_digit(*pk) || *pk == '$' || *pk == '!' || *pk == '#' || *pk == '%' {
                    continue;
                }
            }
            break;
        }
        Some(Token::Ident(Ident::new(&s)))
    }

    fn minutia(&mut self) -> Option<Token> {
        let mut s = String::new();
        loop {
            if let Some(ch) = self.chars().next() {
                s.push(ch);
                if let Some(t) = Token::from_string(&s) {
                    return Some(t);
                }
                if let Some(pk) = self.chars().peek() {
                    if is_basic_alphabetic(*pk) || is_basic_digit(*pk) || is_basic_whitespace(*pk)
                    {
                        break;
                    }
                    continue;
                }
            }
            break;
        }
        Some(Token::Unknown(s))
    }
}

struct BasicLexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    remark: bool,
}

impl<'a> Tokenizers<'a> for BasicLexer<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::Chars<'a>> {
        &mut self.chars
    }
}

impl<'a> Iterator for BasicLexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let pk = self.chars.peek()?;
        if self.remark {
            return Some(Token::Unknown(self.chars.by_ref().collect::<String>()));
        }
        if is_basic_whitespace(*pk) {
            return self.whitespace();
        }
        if is_basic_digit(*pk) || *pk == '.' {
            return self.number();
        }
        if is_basic_alphabetic(*pk) {
            let r = self.alphabetic();
            if let Some(Token::Word(Word::Rem1)) = r {
                self.remark = true;
            }
            return r;
        }
        if *pk == '"' {
            return self.string();
        }
        let minutia = self.minutia();
        if let Some(Token::Word(Word::Rem2)) = minutia {
            self.remark = true;
        }
        minutia
    }
}

impl<'a> BasicLexer<'a> {
    fn lex(s: &str) -> (LineNumber, Vec<Token>) {
        let s = s.trim_end_matches(|c| c == '\r' || c == '\n');
        let mut line_number = None;
        let mut s = s;
        let mut ln: usize = 0;
        let mut seen_digit = false;
        while let Some(n) = s.get(ln..) {
            if let Some(ch) = n.chars().next() {
                if seen_digit && !is_basic_digit(ch) {
                    break;
                }
                if is_basic_digit(ch) {
                    seen_digit = true;
                } else if !is_basic_whitespace(ch) {
                    break;
                }
                ln += 1;
            } else {
                break;
            }
        }
        if let Ok(n) = s[0..ln].trim_start().parse::<u16>() {
            if n <= LineNumber::max_value() {
                line_number = Some(n);
                if let Some(' ') = s[ln..].chars().next() {
                    ln += 1;
                }
                s = &s[ln..];
            }
        }
        let mut tokens = BasicLexer {
            chars: s.chars().peekable(),
            remark: false,
        }
        .collect();
        BasicLexer::trim_end(&mut tokens);
        BasicLexer::collapse_go(&mut tokens);
        BasicLexer::collapse_lt_gt_equal(&mut tokens);
        (line_number, tokens)
    }

    fn collapse_lt_gt_equal(tokens: &mut Vec<Token>) {
        let mut locs: Vec<(usize, Token)> = vec![];
        let mut tokens_iter = tokens.windows(2).enumerate();
        while let Some((index, tt)) = tokens_iter.next() {
            let merged = match (&tt[0], &tt[1]) {
                (Token::Operator(Operator::Equal), Token::Operator(Operator::Greater)) => {
                    Some(Operator::EqualGreater)
                }
                (Token::Operator(Operator::Equal), Token::Operator(Operator::Less)) => {
                    Some(Operator::EqualLess)
                }
                (Token::Operator(Operator::Greater), Token::Operator(Operator::Equal)) => {
                    Some(Operator::GreaterEqual)
                }
                (Token::Operator(Operator::Less), Token::Operator(Operator::Equal)) => {
                    Some(Operator::LessEqual)
                }
                (Token::Operator(Operator::Less), Token::Operator(Operator::Greater)) => {
                    Some(Operator::NotEqual)
                }
                _ => None,
            };
            if let Some(op) = merged {
                locs.push((index, Token::Operator(op)));
                tokens_iter.next();
            }
        }
        while let Some((index, token)) = locs.pop() {
            tokens.splice(index..index + 2, Some(token));
        }
    }

    fn collapse_go(tokens: &mut Vec<Token>) {
        let mut locs: Vec<(usize, Token)> = vec![];
        for (index, ttt) in tokens.windows(3).enumerate() {
            if let Token::Ident(Ident::Plain(go)) = &ttt[0] {
                if &**go == "GO" {
                    if let Token::Whitespace(_) = ttt[1] {
                        if let Token::Word(Word::To) = ttt[2] {
                            locs.push((index, Token::Word(Word::Goto2)));
                        }
                        if let Token::Ident(Ident::Plain(sub)) = &ttt[2] {
                            if &**sub == "SUB" {
                                locs.push((index, Token::Word(Word::Gosub2)));
                            }
                        }
                    }
                }
            }
        }
        while let Some((index, token)) = locs.pop() {
            tokens.splice(index..index + 3, Some(token));
        }
    }

    fn trim_end(tokens: &mut Vec<Token>) {
        if let Some(Token::Whitespace(_)) = tokens.last() {
            tokens.pop();
        }
        if let Some(Token::Unknown(_)) = tokens.last() {
            if let Some(Token::Unknown(s)) = tokens.pop() {
                tokens.push(Token::Unknown(s.trim_end().to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_number() {
        let (ln, tokens) = lex("10 END");
        assert_eq!(ln, Some(10));
        assert_eq!(tokens, vec![Token::Word(Word::End)]);
        let (ln, _) = lex("END");
        assert_eq!(ln, None);
    }

    #[test]
    fn test_numeric_literal_kinds() {
        let (_, t) = lex("?32768 2.5 2.5! 2.5# 1E3 1D3 5%");
        let lits: Vec<Token> = t
            .into_iter()
            .skip(1)
            .filter(|t| !matches!(t, Token::Whitespace(_)))
            .collect();
        assert_eq!(
            lits,
            vec![
                Token::Literal(Literal::Long("32768".into())),
                Token::Literal(Literal::Fixed("2.5".into())),
                Token::Literal(Literal::Single("2.5!".into())),
                Token::Literal(Literal::Double("2.5#".into())),
                Token::Literal(Literal::Single("1E3".into())),
                Token::Literal(Literal::Double("1D3".into())),
                Token::Literal(Literal::Integer("5%".into())),
            ]
        );
    }

    #[test]
    fn test_crunched_keywords() {
        let (_, t) = lex("fori=1to9");
        assert_eq!(
            t,
            vec![
                Token::Word(Word::For),
                Token::Ident(Ident::new("I")),
                Token::Operator(Operator::Equal),
                Token::Literal(Literal::Integer("1".into())),
                Token::Word(Word::To),
                Token::Literal(Literal::Integer("9".into())),
            ]
        );
    }

    #[test]
    fn test_go_to_and_relations() {
        let (_, t) = lex("GO TO 10");
        assert_eq!(t[0], Token::Word(Word::Goto2));
        let (_, t) = lex("A<>B");
        assert_eq!(t[1], Token::Operator(Operator::NotEqual));
        let (_, t) = lex("A=<B");
        assert_eq!(t[1], Token::Operator(Operator::EqualLess));
    }
}
