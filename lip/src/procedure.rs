use crate::env::Environment;
use crate::error::{EvalErr, ErrorKind};
use crate::expr::{ExprKind, LispExpr};
use std::collections::HashSet;
use std::fmt;

/// Parameter list of a closure: positional names and an optional
/// `& rest` name collecting the remaining arguments.
#[derive(Clone, PartialEq, Debug)]
pub struct Params {
    names: Vec<String>,
    rest: Option<String>,
}

impl Params {
    pub fn new(names: Vec<String>, rest: Option<String>) -> Params {
        Params{names, rest}
    }

    /// Parse `[a b & rest]` or `(a b & rest)`.
    pub fn parse(form: &LispExpr) -> Result<Params, EvalErr> {
        let items = match form.kind() {
            ExprKind::Vector(items) | ExprKind::List(items) => items,
            _ => return Err(EvalErr::invalid_form(
                format!("expect a parameter list, got {}", form.type_name()), form)),
        };
        let mut names = Vec::new();
        let mut rest = None;
        let mut seen = HashSet::new();
        let mut iter = items.iter();
        while let Some(param) = iter.next() {
            let name = param.as_symbol().ok_or_else(|| EvalErr::invalid_form(
                format!("parameter must be a symbol, got {}", param.type_name()), param))?;
            let name = if name == "&" {
                let tail = iter.next().and_then(|p| p.as_symbol()).filter(|t| *t != "&")
                    .ok_or_else(|| EvalErr::invalid_form("expect a single symbol after &", param))?;
                if let Some(extra) = iter.next() {
                    return Err(EvalErr::invalid_form("expect a single symbol after &", extra));
                }
                rest = Some(tail.to_string());
                tail
            } else {
                names.push(name.to_string());
                name
            };
            if !seen.insert(name) {
                return Err(EvalErr::invalid_form("parameter name must be unique", form));
            }
        }
        Ok(Params{names, rest})
    }

    pub fn names(&self) -> &[String] { &self.names }

    /// Exact match without a rest parameter, at least `names.len()` with one.
    pub fn check_arity(&self, got: usize) -> Result<(), ErrorKind> {
        let expected = self.names.len();
        let ok = match self.rest {
            Some(_) => got >= expected,
            None => got == expected,
        };
        if ok {
            Ok(())
        } else {
            Err(ErrorKind::Arity{expected, got, variadic: self.rest.is_some()})
        }
    }
}

pub struct Procedure {
    params: Params,
    body: Vec<LispExpr>,
    env: Environment,
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(fn {:?} ...)", self.params)
    }
}

impl Procedure {
    pub fn new(params: Params, body: Vec<LispExpr>, env: Environment) -> Procedure {
        Procedure{params, body, env}
    }

    pub fn params(&self) -> &Params { &self.params }

    pub fn body(&self) -> &[LispExpr] { &self.body }

    /// Extend the captured environment with a frame holding the arguments.
    /// Arity must have been checked by the caller.
    pub fn bind(&self, args: Vec<LispExpr>) -> Result<Environment, ErrorKind> {
        let env = self.env.extend();
        let npos = self.params.names.len();
        let mut args = args.into_iter();
        for (name, arg) in self.params.names.iter().zip(args.by_ref().take(npos)) {
            env.define(name, arg)?;
        }
        if let Some(ref rest) = self.params.rest {
            env.define(rest, LispExpr::list(args.collect()))?;
        }
        Ok(env)
    }
}

pub struct Macro {
    name: String,
    procedure: Procedure,
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(macro {} {:?} ...)", self.name, self.procedure.params)
    }
}

impl Macro {
    pub fn new(name: String, procedure: Procedure) -> Macro {
        Macro{name, procedure}
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn procedure(&self) -> &Procedure { &self.procedure }
}

///////////////////////////////////////////////////////////////////////////////
