use crate::procedure::{Macro, Procedure};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Stable identity of an expression node. Clones share it, freshly
/// constructed nodes get a new one. Source positions are keyed by it.
pub type ExprId = usize;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn fresh_id() -> ExprId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Integer(i64),
    String(String),
    Bool(bool),
    Nil,
    Symbol(String),
    List(Vec<LispExpr>),
    Vector(Vec<LispExpr>),
    Closure(Rc<Procedure>),
    Macro(Rc<Macro>),
    Builtin(String),
}

#[derive(Clone, Debug)]
pub struct LispExpr {
    id: ExprId,
    kind: ExprKind,
}

impl LispExpr {
    pub fn new(kind: ExprKind) -> LispExpr {
        LispExpr{id: fresh_id(), kind}
    }

    pub fn int(n: i64) -> LispExpr { Self::new(ExprKind::Integer(n)) }
    pub fn string<S: Into<String>>(s: S) -> LispExpr { Self::new(ExprKind::String(s.into())) }
    pub fn bool(b: bool) -> LispExpr { Self::new(ExprKind::Bool(b)) }
    pub fn nil() -> LispExpr { Self::new(ExprKind::Nil) }
    pub fn symbol<S: Into<String>>(s: S) -> LispExpr { Self::new(ExprKind::Symbol(s.into())) }
    pub fn list(items: Vec<LispExpr>) -> LispExpr { Self::new(ExprKind::List(items)) }
    pub fn vector(items: Vec<LispExpr>) -> LispExpr { Self::new(ExprKind::Vector(items)) }
    pub fn builtin<S: Into<String>>(name: S) -> LispExpr { Self::new(ExprKind::Builtin(name.into())) }

    pub fn closure(p: Procedure) -> LispExpr {
        Self::new(ExprKind::Closure(Rc::new(p)))
    }

    pub fn macro_(m: Macro) -> LispExpr {
        Self::new(ExprKind::Macro(Rc::new(m)))
    }

    pub fn id(&self) -> ExprId { self.id }

    pub fn kind(&self) -> &ExprKind { &self.kind }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ExprKind::Integer(_) => "int",
            ExprKind::String(_) => "string",
            ExprKind::Bool(_) => "bool",
            ExprKind::Nil => "nil",
            ExprKind::Symbol(_) => "symbol",
            ExprKind::List(_) => "list",
            ExprKind::Vector(_) => "vector",
            ExprKind::Closure(_) => "closure",
            ExprKind::Macro(_) => "macro",
            ExprKind::Builtin(_) => "builtin",
        }
    }

    /// Only `false` and `nil` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self.kind, ExprKind::Bool(false) | ExprKind::Nil)
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self.kind {
            ExprKind::Symbol(ref s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a List or a Vector.
    pub fn as_seq(&self) -> Option<&[LispExpr]> {
        match self.kind {
            ExprKind::List(ref items) | ExprKind::Vector(ref items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for LispExpr {
    fn eq(&self, other: &LispExpr) -> bool {
        use self::ExprKind::*;
        match (&self.kind, &other.kind) {
            (Integer(a), Integer(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (Nil, Nil) => true,
            (List(a), List(b)) | (Vector(a), Vector(b)) => a == b,
            (Closure(_), Closure(_)) | (Macro(_), Macro(_)) | (Builtin(_), Builtin(_)) =>
                self.id == other.id,
            _ => false,
        }
    }
}

fn join(items: &[LispExpr]) -> String {
    items.iter().map(|it| it.to_string()).collect::<Vec<_>>().join(" ")
}

impl fmt::Display for LispExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ExprKind::Integer(n) => write!(f, "{}", n),
            ExprKind::String(ref s) => write!(f, "{}", s),
            ExprKind::Bool(b) => write!(f, "{}", b),
            ExprKind::Nil => write!(f, "nil"),
            ExprKind::Symbol(ref s) => write!(f, "{}", s),
            ExprKind::List(ref items) => write!(f, "({})", join(items)),
            ExprKind::Vector(ref items) => write!(f, "[{}]", join(items)),
            ExprKind::Closure(_) => write!(f, "<closure>"),
            ExprKind::Macro(ref m) => write!(f, "<macro {}>", m.name()),
            ExprKind::Builtin(ref name) => write!(f, "<builtin {}>", name),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
