use crate::error::{EvalErr, ErrorKind};
use crate::eval::Evaluator;
use crate::expr::LispExpr;
use crate::parser::Parser;

fn eval(code: &str) -> Result<LispExpr, EvalErr> {
    Evaluator::bare().eval_str(code)
}

fn parse_one(code: &str) -> LispExpr {
    Parser::parse_str(code).unwrap().forms.remove(0)
}

fn kind_of(code: &str) -> ErrorKind {
    eval(code).unwrap_err().kind
}

#[test]
fn arithmetic() {
    assert_eq!(eval("(+ 1 2 3)").unwrap(), LispExpr::int(6));
    assert_eq!(eval("(- 10 1 2)").unwrap(), LispExpr::int(7));
    assert_eq!(eval("(- 4)").unwrap(), LispExpr::int(-4));
    assert_eq!(eval("(* 2 3 4)").unwrap(), LispExpr::int(24));
    assert_eq!(eval("(/ 20 3)").unwrap(), LispExpr::int(6));
    assert_eq!(eval("(/ -7 2)").unwrap(), LispExpr::int(-3));
}

#[test]
fn arithmetic_errors() {
    assert_eq!(kind_of("(+ 1)"), ErrorKind::Arity{expected: 2, got: 1, variadic: true});
    assert_eq!(kind_of("(-)"), ErrorKind::Arity{expected: 1, got: 0, variadic: true});
    assert_eq!(kind_of("(/ 1 0)"), ErrorKind::DivisionByZero);
    assert_eq!(kind_of("(* 9223372036854775807 2)"), ErrorKind::Overflow);
    assert_eq!(kind_of("(- -9223372036854775807 2)"), ErrorKind::Overflow);
    assert!(matches!(kind_of("(* 2 \"x\")"), ErrorKind::TypeMismatch(_)));
    assert!(matches!(kind_of("(+ nil 1)"), ErrorKind::TypeMismatch(_)));
}

#[test]
fn string_concatenation() {
    assert_eq!(eval("(+ \"a\" \"b\" 1)").unwrap(), LispExpr::string("ab1"));
    assert_eq!(eval("(+ \"n=\" -2)").unwrap(), LispExpr::string("n=-2"));
    assert!(matches!(kind_of("(+ \"a\" nil)"), ErrorKind::TypeMismatch(_)));
    assert!(matches!(kind_of("(+ 1 \"a\")"), ErrorKind::TypeMismatch(_)));
}

#[test]
fn comparisons_are_pairwise() {
    assert_eq!(eval("(< 1 2 3)").unwrap(), LispExpr::bool(true));
    assert_eq!(eval("(< 1 3 2)").unwrap(), LispExpr::bool(false));
    assert_eq!(eval("(> 3 2 1)").unwrap(), LispExpr::bool(true));
    assert_eq!(eval("(>= 3 3 1)").unwrap(), LispExpr::bool(true));
    assert_eq!(eval("(<= 1 1 0)").unwrap(), LispExpr::bool(false));
    assert_eq!(eval("(< \"a\" \"b\")").unwrap(), LispExpr::bool(true));
    // ints compare with strings by their decimal form
    assert_eq!(eval("(< \"1\" 2)").unwrap(), LispExpr::bool(true));
    assert_eq!(eval("(< 10 \"9\")").unwrap(), LispExpr::bool(true));
    assert!(matches!(kind_of("(< 1 nil)"), ErrorKind::TypeMismatch(_)));
    assert_eq!(kind_of("(< 1)"), ErrorKind::Arity{expected: 2, got: 1, variadic: true});
}

#[test]
fn equality() {
    assert_eq!(eval("(= nil nil)").unwrap(), LispExpr::bool(true));
    assert_eq!(eval("(= nil false)").unwrap(), LispExpr::bool(false));
    assert_eq!(eval("(= nil '())").unwrap(), LispExpr::bool(false));
    assert_eq!(eval("(= 1 1 1)").unwrap(), LispExpr::bool(true));
    assert_eq!(eval("(= 1 1 2)").unwrap(), LispExpr::bool(false));
    assert_eq!(eval("(= '(1 (2)) (list 1 (list 2)))").unwrap(), LispExpr::bool(true));
    assert_eq!(eval("(= '(1 2) [1 2])").unwrap(), LispExpr::bool(false));
    assert_eq!(eval("(= \"1\" 1)").unwrap(), LispExpr::bool(false));
}

#[test]
fn sequences() {
    assert_eq!(eval("(list 1 (+ 1 1))").unwrap(), parse_one("(1 2)"));
    assert_eq!(eval("(list)").unwrap(), LispExpr::list(vec![]));
    assert_eq!(eval("(: '(1) 2 3)").unwrap(), parse_one("(1 2 3)"));
    assert_eq!(eval("(: [1] 2)").unwrap(), parse_one("[1 2]"));
    assert!(matches!(kind_of("(: 1 2)"), ErrorKind::TypeMismatch(_)));
    assert_eq!(eval("(var l '(1)) (: l 2) l").unwrap(), parse_one("(1)"));
    assert_eq!(eval("(len '(1 2 3))").unwrap(), LispExpr::int(3));
    assert_eq!(eval("(len [])").unwrap(), LispExpr::int(0));
    assert!(matches!(kind_of("(len \"abc\")"), ErrorKind::TypeMismatch(_)));
}

#[test]
fn indexing() {
    assert_eq!(eval("(. '(a b c) 0)").unwrap(), LispExpr::symbol("a"));
    assert_eq!(eval("(. [1 2 3] 2)").unwrap(), LispExpr::int(3));
    assert_eq!(eval("(. [1 2 3] -1)").unwrap(), LispExpr::int(3));
    assert_eq!(kind_of("(. [1 2 3] 3)"), ErrorKind::OutOfBounds{index: 3, len: 3});
    assert_eq!(kind_of("(. [1 2 3] -4)"), ErrorKind::OutOfBounds{index: -4, len: 3});
    assert_eq!(kind_of("(. '() 0)"), ErrorKind::OutOfBounds{index: 0, len: 0});
    assert!(matches!(kind_of("(. [1] \"0\")"), ErrorKind::TypeMismatch(_)));
}

#[test]
fn logic_and_types() {
    assert_eq!(eval("(not nil)").unwrap(), LispExpr::bool(true));
    assert_eq!(eval("(not 0)").unwrap(), LispExpr::bool(false));
    assert_eq!(kind_of("(not)"), ErrorKind::Arity{expected: 1, got: 0, variadic: false});
    let types = "(list (type 1) (type \"s\") (type true) (type nil) (type 'x) (type '(1))
                       (type [1]) (type (fn [] 1)) (type +))";
    assert_eq!(eval(types).unwrap().to_string(),
               "(int string bool nil symbol list vector closure builtin)");
    assert_eq!(eval("(macro m () 1) (type m)").unwrap(), LispExpr::string("macro"));
}

#[test]
fn do_returns_last() {
    assert_eq!(eval("(do 1 2 3)").unwrap(), LispExpr::int(3));
    assert_eq!(eval("(do)").unwrap(), LispExpr::nil());
}

#[test]
fn time_never_decreases() {
    let ev = Evaluator::bare();
    let a = ev.eval_str("(time)").unwrap();
    let b = ev.eval_str("(time)").unwrap();
    assert_eq!(ev.eval_str(&format!("(<= {} {})", a, b)).unwrap(), LispExpr::bool(true));
    assert!(matches!(ev.eval_str("(time 1)").unwrap_err().kind, ErrorKind::Arity{..}));
}

#[test]
fn macroexpand_is_one_step() {
    let ev = Evaluator::bare();
    ev.eval_str("(macro inner (x) (list '* x 2))").unwrap();
    ev.eval_str("(macro outer (x) (list 'inner x))").unwrap();
    assert_eq!(ev.eval_str("(macroexpand '(outer (+ 1 2)))").unwrap(),
               parse_one("(inner (+ 1 2))"));
    assert!(matches!(ev.eval_str("(macroexpand '(+ 1 2))").unwrap_err().kind,
                     ErrorKind::TypeMismatch(_)));
    assert!(matches!(ev.eval_str("(macroexpand 1)").unwrap_err().kind,
                     ErrorKind::TypeMismatch(_)));
}

#[test]
fn gensym_is_fresh() {
    let ev = Evaluator::bare();
    let a = ev.eval_str("(gensym)").unwrap();
    let b = ev.eval_str("(gensym)").unwrap();
    assert_eq!(a.type_name(), "symbol");
    assert_ne!(a, b);
    let c = ev.eval_str("(gensym \"tmp\")").unwrap();
    assert!(c.to_string().starts_with("tmp"));
    assert!(matches!(ev.eval_str("(gensym 1)").unwrap_err().kind, ErrorKind::TypeMismatch(_)));
}

#[test]
fn builtins_are_values() {
    assert_eq!(eval("+").unwrap().to_string(), "<builtin +>");
    assert_eq!(eval("(var plus +) (plus 1 2)").unwrap(), LispExpr::int(3));
    assert_eq!(eval("((fn [f] (f 2 3)) *)").unwrap(), LispExpr::int(6));
}

#[test]
fn range_and_reduce() {
    assert_eq!(eval("(range 2 5)").unwrap(), parse_one("(2 3 4)"));
    assert_eq!(eval("(range 5 2)").unwrap(), LispExpr::list(vec![]));
    assert!(matches!(kind_of("(range 0 \"5\")"), ErrorKind::TypeMismatch(_)));
    assert_eq!(eval("(reduce + 0 [1 2 3])").unwrap(), LispExpr::int(6));
    assert_eq!(eval("(reduce (fn [acc x] (: acc (* x x))) '() '(1 2 3))").unwrap(),
               parse_one("(1 4 9)"));
    assert_eq!(eval("(reduce + 7 '())").unwrap(), LispExpr::int(7));
    assert_eq!(kind_of("(reduce 1 0 '(1))"), ErrorKind::NotCallable("int"));
    assert_eq!(kind_of("(reduce (fn [x] x) 0 '(1))"),
               ErrorKind::Arity{expected: 1, got: 2, variadic: false});
    assert!(matches!(kind_of("(reduce + 0 5)"), ErrorKind::TypeMismatch(_)));
}

#[test]
fn gensym_cannot_be_written_in_source() {
    let ev = Evaluator::bare();
    let name = ev.eval_str("(gensym \"tmp\")").unwrap().to_string();
    assert!(Parser::parse_str(&name).unwrap().forms.len() > 1);
}
