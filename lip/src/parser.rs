use crate::expr::{ExprId, LispExpr};
use lexers::{LispToken, LispTokenizer, Position, Scanner, Token};
use std::fmt;
use std::str::Chars;

#[derive(Clone, PartialEq, Debug)]
pub enum ParseError {
    UnexpectedClose(char, Position),
    Mismatched { expected: char, found: char, pos: Position },
    UnexpectedEOF(Position),
    BadToken(String, Position),
}

impl ParseError {
    pub fn pos(&self) -> Position {
        match *self {
            ParseError::UnexpectedClose(_, pos) => pos,
            ParseError::Mismatched{pos, ..} => pos,
            ParseError::UnexpectedEOF(pos) => pos,
            ParseError::BadToken(_, pos) => pos,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::UnexpectedClose(c, _) => write!(f, "unexpected '{}'", c),
            ParseError::Mismatched{expected, found, ..} =>
                write!(f, "expect '{}', found '{}'", expected, found),
            ParseError::UnexpectedEOF(_) => write!(f, "unexpected end of input"),
            ParseError::BadToken(msg, _) => write!(f, "{}", msg),
        }
    }
}

/// Parsed top-level forms plus the position of every node built from source.
#[derive(Debug, Default)]
pub struct Parsed {
    pub forms: Vec<LispExpr>,
    pub positions: Vec<(ExprId, Position)>,
}

pub struct Parser<'a> {
    lex: Scanner<LispTokenizer<Chars<'a>>>,
    positions: Vec<(ExprId, Position)>,
    last: Position,
}

impl<'a> Parser<'a> {
    pub fn parse_str(source: &'a str) -> Result<Parsed, ParseError> {
        let mut parser = Parser{
            lex: LispTokenizer::scanner(source.chars()),
            positions: Vec::new(),
            last: Position{line: 1, col: 1},
        };
        let mut forms = Vec::new();
        while parser.lex.peek().is_some() {
            forms.push(parser.parse()?);
            parser.lex.ignore();
        }
        Ok(Parsed{forms, positions: parser.positions})
    }

    fn at(&mut self, expr: LispExpr, pos: Position) -> LispExpr {
        self.positions.push((expr.id(), pos));
        expr
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        match self.lex.next() {
            Some(tok) => {
                self.last = tok.pos;
                Ok(tok)
            },
            None => Err(ParseError::UnexpectedEOF(self.last)),
        }
    }

    fn parse(&mut self) -> Result<LispExpr, ParseError> {
        let Token{token, pos} = self.next_token()?;
        let expr = match token {
            LispToken::Integer(n) => LispExpr::int(n),
            LispToken::String(s) => LispExpr::string(s),
            LispToken::True => LispExpr::bool(true),
            LispToken::False => LispExpr::bool(false),
            LispToken::Nil => LispExpr::nil(),
            LispToken::Symbol(s) => LispExpr::symbol(s),
            LispToken::Quote => {
                let quote = self.at(LispExpr::symbol("quote"), pos);
                let quoted = self.parse()?;
                LispExpr::list(vec![quote, quoted])
            },
            LispToken::OParen => LispExpr::list(self.parse_seq(')')?),
            LispToken::OBracket => LispExpr::vector(self.parse_seq(']')?),
            LispToken::CParen => return Err(ParseError::UnexpectedClose(')', pos)),
            LispToken::CBracket => return Err(ParseError::UnexpectedClose(']', pos)),
            LispToken::Unknown(msg) => return Err(ParseError::BadToken(msg, pos)),
        };
        Ok(self.at(expr, pos))
    }

    // elements up to the closing bracket, which is consumed
    fn parse_seq(&mut self, close: char) -> Result<Vec<LispExpr>, ParseError> {
        let mut items = Vec::new();
        loop {
            let found = match self.lex.peek() {
                None => return Err(ParseError::UnexpectedEOF(self.last)),
                Some(Token{token: LispToken::CParen, pos}) => (')', pos),
                Some(Token{token: LispToken::CBracket, pos}) => (']', pos),
                Some(_) => {
                    items.push(self.parse()?);
                    continue;
                }
            };
            self.next_token()?;
            return match found {
                (c, _) if c == close => Ok(items),
                (c, pos) => Err(ParseError::Mismatched{expected: close, found: c, pos}),
            };
        }
    }
}
