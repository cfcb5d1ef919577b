use crate::env::Environment;
use crate::error::{EvalErr, ErrorKind};
use crate::eval::Evaluator;
use crate::expr::{ExprKind, LispExpr};

use std::cmp::Ordering;
use std::collections::HashMap;

/// Native procedure: evaluator, calling environment, the operator value and
/// the evaluated arguments.
pub type Fp = fn(&Evaluator, &Environment, &LispExpr, &[LispExpr]) -> Result<LispExpr, EvalErr>;

// a shorthand for checking number of arguments
macro_rules! nargs {
    ($op:expr, $args:expr, == $n:expr) => {
        if $args.len() != $n {
            return Err(EvalErr::at(
                ErrorKind::Arity{expected: $n, got: $args.len(), variadic: false}, $op));
        }
    };
    ($op:expr, $args:expr, >= $n:expr) => {
        if $args.len() < $n {
            return Err(EvalErr::at(
                ErrorKind::Arity{expected: $n, got: $args.len(), variadic: true}, $op));
        }
    };
}

fn int_of(e: &LispExpr) -> Result<i64, EvalErr> {
    match e.kind() {
        ExprKind::Integer(n) => Ok(*n),
        _ => Err(EvalErr::type_mismatch(format!("expect int, got {}", e.type_name()), e)),
    }
}

fn foldop<T>(op: &LispExpr, args: &[LispExpr], f: T) -> Result<LispExpr, EvalErr>
        where T: Fn(i64, i64) -> Result<i64, ErrorKind> {
    nargs!(op, args, >= 2);
    let mut acc = int_of(&args[0])?;
    for arg in &args[1..] {
        acc = f(acc, int_of(arg)?).map_err(|kind| EvalErr::at(kind, arg))?;
    }
    Ok(LispExpr::int(acc))
}

fn plus(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, >= 2);
    match args[0].kind() {
        ExprKind::Integer(_) => foldop(op, args, |a, b| a.checked_add(b).ok_or(ErrorKind::Overflow)),
        ExprKind::String(s) => {
            let mut res = s.clone();
            for arg in &args[1..] {
                match arg.kind() {
                    ExprKind::String(s) => res.push_str(s),
                    ExprKind::Integer(n) => res.push_str(&n.to_string()),
                    _ => return Err(EvalErr::type_mismatch(
                        format!("expect string or int, got {}", arg.type_name()), arg)),
                }
            }
            Ok(LispExpr::string(res))
        },
        _ => Err(EvalErr::type_mismatch(
            format!("unsupported operand for +: expect int or string, got {}",
                    args[0].type_name()), &args[0])),
    }
}

// (- x) negates, more arguments fold left
fn minus(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, >= 1);
    if args.len() == 1 {
        let n = int_of(&args[0])?;
        return n.checked_neg()
            .map(LispExpr::int)
            .ok_or_else(|| EvalErr::at(ErrorKind::Overflow, &args[0]));
    }
    foldop(op, args, |a, b| a.checked_sub(b).ok_or(ErrorKind::Overflow))
}

fn multiply(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    foldop(op, args, |a, b| a.checked_mul(b).ok_or(ErrorKind::Overflow))
}

fn divide(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    foldop(op, args, |a, b| match b {
        0 => Err(ErrorKind::DivisionByZero),
        _ => a.checked_div(b).ok_or(ErrorKind::Overflow),
    })
}

// ints and strings order among themselves, a mixed pair orders by the int's
// decimal form
fn compare(a: &LispExpr, b: &LispExpr) -> Result<Ordering, EvalErr> {
    match (a.kind(), b.kind()) {
        (ExprKind::Integer(x), ExprKind::Integer(y)) => Ok(x.cmp(y)),
        (ExprKind::String(x), ExprKind::String(y)) => Ok(x.cmp(y)),
        (ExprKind::String(x), ExprKind::Integer(y)) => Ok(x.as_str().cmp(y.to_string().as_str())),
        (ExprKind::Integer(x), ExprKind::String(y)) => Ok(x.to_string().as_str().cmp(y.as_str())),
        (ExprKind::Integer(_), _) | (ExprKind::String(_), _) => Err(EvalErr::type_mismatch(
            format!("expect string or int, got {}", b.type_name()), b)),
        _ => Err(EvalErr::type_mismatch(
            format!("expect string or int, got {}", a.type_name()), a)),
    }
}

// adjacent pairs left to right, not all pairs
fn foldcmp<T>(op: &LispExpr, args: &[LispExpr], pred: T) -> Result<LispExpr, EvalErr>
        where T: Fn(Ordering) -> bool {
    nargs!(op, args, >= 2);
    for win in args.windows(2) {
        if !pred(compare(&win[0], &win[1])?) {
            return Ok(LispExpr::bool(false));
        }
    }
    Ok(LispExpr::bool(true))
}

fn greater(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    foldcmp(op, args, |o| o == Ordering::Greater)
}

fn less(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    foldcmp(op, args, |o| o == Ordering::Less)
}

fn greater_equal(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    foldcmp(op, args, |o| o != Ordering::Less)
}

fn less_equal(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    foldcmp(op, args, |o| o != Ordering::Greater)
}

fn equal(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, >= 2);
    Ok(LispExpr::bool(args.windows(2).all(|win| win[0] == win[1])))
}

fn append(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, >= 2);
    let extended = |items: &Vec<LispExpr>| {
        let mut items = items.clone();
        items.extend_from_slice(&args[1..]);
        items
    };
    match args[0].kind() {
        ExprKind::List(items) => Ok(LispExpr::list(extended(items))),
        ExprKind::Vector(items) => Ok(LispExpr::vector(extended(items))),
        _ => Err(EvalErr::type_mismatch(
            format!("expect a list, got {}", args[0].type_name()), &args[0])),
    }
}

fn list(_: &Evaluator, _: &Environment, _: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    Ok(LispExpr::list(args.to_vec()))
}

fn not(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, == 1);
    Ok(LispExpr::bool(!args[0].is_truthy()))
}

fn type_of(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, == 1);
    Ok(LispExpr::string(args[0].type_name()))
}

fn seq_of<'a>(e: &'a LispExpr, what: &str) -> Result<&'a [LispExpr], EvalErr> {
    e.as_seq().ok_or_else(|| EvalErr::type_mismatch(
        format!("unsupported type for {}: {}", what, e.type_name()), e))
}

fn length(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, == 1);
    let items = seq_of(&args[0], "len")?;
    Ok(LispExpr::int(items.len() as i64))
}

// zero based, negative indexes count from the end
fn dot(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, == 2);
    let items = seq_of(&args[0], ".")?;
    let index = int_of(&args[1])?;
    let len = items.len();
    let at = if index < 0 { index + len as i64 } else { index };
    if at < 0 || at >= len as i64 {
        return Err(EvalErr::at(ErrorKind::OutOfBounds{index, len}, &args[1]));
    }
    Ok(items[at as usize].clone())
}

// from inclusive, to exclusive
fn range(_: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, == 2);
    let (from, to) = (int_of(&args[0])?, int_of(&args[1])?);
    Ok(LispExpr::list((from..to).map(LispExpr::int).collect()))
}

// (reduce f init xs) folds left, calling f with the accumulator and an element
fn reduce(ev: &Evaluator, env: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, == 3);
    let items = seq_of(&args[2], "reduce")?;
    let mut acc = args[1].clone();
    for item in items {
        acc = ev.invoke(&args[0], vec![acc, item.clone()], env, op)?;
    }
    Ok(acc)
}

fn do_(_: &Evaluator, _: &Environment, _: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    Ok(args.last().cloned().unwrap_or_else(LispExpr::nil))
}

fn print(ev: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    let line = args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ");
    ev.write_line(&line).map_err(|e| EvalErr::at(ErrorKind::Io(e.to_string()), op))?;
    Ok(LispExpr::nil())
}

fn time(ev: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, == 0);
    Ok(LispExpr::int(ev.tick()))
}

fn macroexpand(ev: &Evaluator, env: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    nargs!(op, args, == 1);
    let form = &args[0];
    let items = match form.kind() {
        ExprKind::List(items) if !items.is_empty() => items,
        _ => return Err(EvalErr::type_mismatch(
            format!("expect argument to be a quoted list, got {}", form.type_name()), form)),
    };
    match ev.macro_of(&items[0], env) {
        Some(mac) => ev.expand(&mac, &items[1..], form),
        None => Err(EvalErr::type_mismatch("not macro", &items[0])),
    }
}

fn gensym(ev: &Evaluator, _: &Environment, op: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
    let prefix = match args {
        [] => "g",
        [p] => match p.kind() {
            ExprKind::String(s) | ExprKind::Symbol(s) => s.as_str(),
            _ => return Err(EvalErr::type_mismatch(
                format!("expect string or symbol prefix, got {}", p.type_name()), p)),
        },
        _ => return Err(EvalErr::at(
            ErrorKind::Arity{expected: 1, got: args.len(), variadic: false}, op)),
    };
    Ok(LispExpr::symbol(ev.gensym(prefix)))
}

pub fn builtins() -> HashMap<&'static str, Fp> {
    let mut procs: HashMap<&'static str, Fp> = HashMap::new();
    procs.insert("+", plus);
    procs.insert("-", minus);
    procs.insert("*", multiply);
    procs.insert("/", divide);
    procs.insert("=", equal);
    procs.insert(">", greater);
    procs.insert("<", less);
    procs.insert(">=", greater_equal);
    procs.insert("<=", less_equal);
    procs.insert(":", append);
    procs.insert("list", list);
    procs.insert("not", not);
    procs.insert("type", type_of);
    procs.insert("len", length);
    procs.insert(".", dot);
    procs.insert("range", range);
    procs.insert("reduce", reduce);
    procs.insert("do", do_);
    procs.insert("print", print);
    procs.insert("time", time);
    procs.insert("macroexpand", macroexpand);
    procs.insert("gensym", gensym);
    procs
}
