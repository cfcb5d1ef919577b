#![deny(warnings)]

use crate::scanner::Scanner;
use std::fmt;
use std::str::FromStr;

// chars that end a symbol or number
const DELIMITERS: &str = "()[]\"';";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum LispToken {
    OParen, CParen,
    OBracket, CBracket,
    Quote,
    True, False, Nil,
    Symbol(String),
    Integer(i64),
    String(String),
    // lexical errors are handed to the parser as tokens
    Unknown(String),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub token: LispToken,
    pub pos: Position,
}

pub struct LispTokenizer<I: Iterator<Item=char>> {
    src: Scanner<I>,
    line: usize,
    col: usize,
}

impl<I: Iterator<Item=char>> LispTokenizer<I> {
    pub fn new(source: I) -> Self {
        LispTokenizer{src: Scanner::new(source), line: 1, col: 1}
    }

    pub fn scanner(source: I) -> Scanner<Self> {
        Scanner::new(Self::new(source))
    }

    fn here(&self) -> Position {
        Position{line: self.line, col: self.col}
    }

    // pull the current token out of the char scanner keeping track of lines
    fn take(&mut self) -> String {
        let text = self.src.extract_string();
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        text
    }

    fn skip_blanks(&mut self) {
        loop {
            self.src.skip_ws();
            if self.src.accept_char(';') {
                self.src.until_any_char("\n");
            }
            if self.src.view().is_empty() {
                return;
            }
            self.take();
        }
    }

    fn scan_string(&mut self) -> LispToken {
        self.src.until_any_char("\"\n");
        if self.src.accept_char('"') {
            let text = self.take();
            LispToken::String(text[1..text.len() - 1].to_string())
        } else {
            LispToken::Unknown(format!("unterminated string {}", self.take()))
        }
    }

    fn scan_atom(&mut self) -> LispToken {
        while let Some(c) = self.src.peek() {
            if c.is_whitespace() || DELIMITERS.contains(c) { break; }
            self.src.next();
        }
        let text = self.take();
        match &text[..] {
            "true" => LispToken::True,
            "false" => LispToken::False,
            "nil" => LispToken::Nil,
            _ => match i64::from_str(&text) {
                Ok(n) if !text.starts_with('+') => LispToken::Integer(n),
                _ if looks_numeric(&text) =>
                    LispToken::Unknown(format!("bad integer literal {}", text)),
                _ => LispToken::Symbol(text),
            }
        }
    }
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

impl<I: Iterator<Item=char>> Iterator for LispTokenizer<I> {
    type Item = Token;
    fn next(&mut self) -> Option<Self::Item> {
        self.skip_blanks();
        let pos = self.here();
        let token = match self.src.next()? {
            '(' => LispToken::OParen,
            ')' => LispToken::CParen,
            '[' => LispToken::OBracket,
            ']' => LispToken::CBracket,
            '\'' => LispToken::Quote,
            '"' => return Some(Token{token: self.scan_string(), pos}),
            _ => {
                self.src.reset(0);
                return Some(Token{token: self.scan_atom(), pos});
            }
        };
        self.take();
        Some(Token{token, pos})
    }
}

///////////////////////////////////////////////////////////////////////////////
