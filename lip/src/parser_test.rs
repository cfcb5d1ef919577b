use crate::expr::LispExpr;
use crate::parser::{ParseError, Parser};
use lexers::Position;

fn sym(s: &str) -> LispExpr { LispExpr::symbol(s) }

#[test]
fn test_lisp1() {
    let p = Parser::parse_str("(do (var r 10) (* pi (* r r)))").unwrap();
    let r = LispExpr::list(vec![
        sym("do"),
        LispExpr::list(vec![sym("var"), sym("r"), LispExpr::int(10)]),
        LispExpr::list(vec![
            sym("*"),
            sym("pi"),
            LispExpr::list(vec![sym("*"), sym("r"), sym("r")]),
        ]),
    ]);
    assert_eq!(p.forms, vec![r]);
}

#[test]
fn test_quote_and_vectors() {
    let p = Parser::parse_str("'(a [1 \"s\"]) nil").unwrap();
    let quoted = LispExpr::list(vec![
        sym("quote"),
        LispExpr::list(vec![
            sym("a"),
            LispExpr::vector(vec![LispExpr::int(1), LispExpr::string("s")]),
        ]),
    ]);
    assert_eq!(p.forms, vec![quoted, LispExpr::nil()]);
}

#[test]
fn test_many_forms() {
    let p = Parser::parse_str("1 2\n; comment\n(3)").unwrap();
    assert_eq!(p.forms.len(), 3);
    assert!(Parser::parse_str("  ; only a comment").unwrap().forms.is_empty());
}

#[test]
fn test_positions() {
    let p = Parser::parse_str("(+ 1\n   x)").unwrap();
    let items = p.forms[0].as_seq().unwrap().to_vec();
    let pos_of = |e: &LispExpr| p.positions.iter()
        .find(|(id, _)| *id == e.id()).map(|(_, pos)| *pos);
    assert_eq!(pos_of(&p.forms[0]), Some(Position{line: 1, col: 1}));
    assert_eq!(pos_of(&items[1]), Some(Position{line: 1, col: 4}));
    assert_eq!(pos_of(&items[2]), Some(Position{line: 2, col: 4}));
}

#[test]
fn test_errors() {
    assert_eq!(Parser::parse_str(")").unwrap_err(),
               ParseError::UnexpectedClose(')', Position{line: 1, col: 1}));
    assert!(matches!(Parser::parse_str("(a b").unwrap_err(), ParseError::UnexpectedEOF(_)));
    assert!(matches!(Parser::parse_str("'").unwrap_err(), ParseError::UnexpectedEOF(_)));
    assert_eq!(Parser::parse_str("(a]").unwrap_err(),
               ParseError::Mismatched{expected: ')', found: ']', pos: Position{line: 1, col: 3}});
    assert!(matches!(Parser::parse_str("(print \"open)").unwrap_err(),
                     ParseError::BadToken(_, _)));
}
