use crate::expr::{ExprId, LispExpr};
use lexers::Position;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, PartialEq, Debug)]
pub struct Location {
    pub source: Rc<str>,
    pub pos: Position,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.pos)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum ErrorKind {
    Undefined(String),
    AlreadyDefined(String),
    Arity { expected: usize, got: usize, variadic: bool },
    TypeMismatch(String),
    OutOfBounds { index: i64, len: usize },
    DivisionByZero,
    Overflow,
    Syntax(String),
    NotCallable(&'static str),
    InvalidForm(String),
    Io(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Undefined(name) => write!(f, "undefined: {}", name),
            ErrorKind::AlreadyDefined(name) => write!(f, "already defined: {}", name),
            ErrorKind::Arity{expected, got, variadic: false} =>
                write!(f, "arity mismatch: expect {} arguments, got {}", expected, got),
            ErrorKind::Arity{expected, got, variadic: true} =>
                write!(f, "arity mismatch: expect at least {} arguments, got {}", expected, got),
            ErrorKind::TypeMismatch(msg) => write!(f, "type mismatch: {}", msg),
            ErrorKind::OutOfBounds{index, len} =>
                write!(f, "index {} out of bound {}", index, len),
            ErrorKind::DivisionByZero => write!(f, "division by zero"),
            ErrorKind::Overflow => write!(f, "integer overflow"),
            ErrorKind::Syntax(msg) => write!(f, "syntax error: {}", msg),
            ErrorKind::NotCallable(got) => write!(f, "expect proc or function, got {}", got),
            ErrorKind::InvalidForm(msg) => write!(f, "invalid form: {}", msg),
            ErrorKind::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

/// A diagnostic bound to the node that caused it. The location is filled in
/// by the evaluator from its positions table while the error unwinds.
#[derive(Clone, PartialEq, Debug)]
pub struct EvalErr {
    pub kind: ErrorKind,
    pub node: &'static str,
    pub origin: Option<ExprId>,
    pub location: Option<Location>,
}

impl EvalErr {
    pub fn at(kind: ErrorKind, node: &LispExpr) -> EvalErr {
        EvalErr{kind, node: node.type_name(), origin: Some(node.id()), location: None}
    }

    pub fn syntax(msg: String, location: Location) -> EvalErr {
        EvalErr{kind: ErrorKind::Syntax(msg), node: "source", origin: None,
                location: Some(location)}
    }

    pub fn type_mismatch<S: Into<String>>(msg: S, node: &LispExpr) -> EvalErr {
        Self::at(ErrorKind::TypeMismatch(msg.into()), node)
    }

    pub fn invalid_form<S: Into<String>>(msg: S, node: &LispExpr) -> EvalErr {
        Self::at(ErrorKind::InvalidForm(msg.into()), node)
    }
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref loc) = self.location {
            write!(f, "{}: ", loc)?;
        }
        write!(f, "{}: {}", self.node, self.kind)
    }
}

impl std::error::Error for EvalErr {}
