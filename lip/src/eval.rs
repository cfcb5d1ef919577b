use crate::builtin::{builtins, Fp};
use crate::env::Environment;
use crate::error::{EvalErr, ErrorKind, Location};
use crate::expr::{ExprId, ExprKind, LispExpr};
use crate::parser::Parser;
use crate::procedure::{Macro, Params, Procedure};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use time::OffsetDateTime;
use tracing::{debug, trace};

const PRELUDE: &str = include_str!("../stdlib/prelude.lip");

const SPECIAL_FORMS: [&str; 7] = ["quote", "var", "set", "if", "fn", "macro", "apply"];

fn is_special(head: &LispExpr) -> bool {
    head.as_symbol().is_some_and(|sym| SPECIAL_FORMS.contains(&sym))
}

macro_rules! check {
    ($argcheck:expr, $err:expr) => {
        if ! $argcheck { return Err($err); }
    }
}

/// Tree walking evaluator. Owns the base environment, the builtin registry
/// and the source positions of every form it has parsed.
pub struct Evaluator {
    base: Environment,
    builtins: HashMap<&'static str, Fp>,
    positions: RefCell<HashMap<ExprId, Location>>,
    output: RefCell<Box<dyn Write>>,
    last_tick: Cell<i64>,
    gensyms: Cell<usize>,
}

impl Evaluator {
    /// Builtins only, no prelude.
    pub fn bare() -> Evaluator {
        let builtins = builtins();
        let base = Environment::new();
        for name in builtins.keys() {
            // registry keys are unique and the frame starts empty
            let _ = base.define(name, LispExpr::builtin(*name));
        }
        Evaluator{
            base,
            builtins,
            positions: RefCell::new(HashMap::new()),
            output: RefCell::new(Box::new(io::stdout())),
            last_tick: Cell::new(i64::MIN),
            gensyms: Cell::new(0),
        }
    }

    /// Builtins plus the bundled prelude.
    pub fn new() -> Result<Evaluator, EvalErr> {
        Self::with_prelude(PRELUDE)
    }

    pub fn with_prelude(prelude: &str) -> Result<Evaluator, EvalErr> {
        let ev = Self::bare();
        debug!(bytes = prelude.len(), "loading prelude");
        ev.eval_source("prelude", prelude)?;
        debug!(bindings = ev.base.names().len(), "prelude loaded");
        Ok(ev)
    }

    pub fn base_env(&self) -> &Environment { &self.base }

    /// Redirect the output of `print`.
    pub fn set_output<W: Write + 'static>(&self, out: W) {
        *self.output.borrow_mut() = Box::new(out);
    }

    /// Parse `code` and remember where each node came from. `source` names
    /// the input in diagnostics. Positions are kept for the evaluator's
    /// lifetime since closures built from this code may run much later.
    pub fn parse(&self, source: &str, code: &str) -> Result<Vec<LispExpr>, EvalErr> {
        let source: Rc<str> = Rc::from(source);
        let parsed = Parser::parse_str(code).map_err(|err| {
            EvalErr::syntax(err.to_string(), Location{source: source.clone(), pos: err.pos()})
        })?;
        let mut positions = self.positions.borrow_mut();
        for (id, pos) in parsed.positions {
            positions.insert(id, Location{source: source.clone(), pos});
        }
        Ok(parsed.forms)
    }

    /// Evaluate a top-level form in the base environment.
    pub fn eval_top(&self, form: &LispExpr) -> Result<LispExpr, EvalErr> {
        self.eval(form, &self.base)
    }

    /// Evaluate every form in `code`, returning the value of the last one.
    pub fn eval_source(&self, source: &str, code: &str) -> Result<LispExpr, EvalErr> {
        let mut res = LispExpr::nil();
        for form in self.parse(source, code)? {
            res = self.eval_top(&form)?;
        }
        Ok(res)
    }

    pub fn eval_str(&self, code: &str) -> Result<LispExpr, EvalErr> {
        self.eval_source("repl", code)
    }

    pub fn eval(&self, expr: &LispExpr, env: &Environment) -> Result<LispExpr, EvalErr> {
        self.eval_expr(expr, env).map_err(|err| self.locate(err, expr))
    }

    // the origin node's position if known, else the innermost enclosing
    // form that came from source
    fn locate(&self, mut err: EvalErr, expr: &LispExpr) -> EvalErr {
        if err.location.is_none() {
            let positions = self.positions.borrow();
            err.location = err.origin
                .and_then(|id| positions.get(&id))
                .or_else(|| positions.get(&expr.id()))
                .cloned();
        }
        err
    }

    fn eval_expr(&self, expr: &LispExpr, env: &Environment) -> Result<LispExpr, EvalErr> {
        match expr.kind() {
            ExprKind::Integer(_) | ExprKind::String(_) | ExprKind::Bool(_) | ExprKind::Nil |
            ExprKind::Closure(_) | ExprKind::Macro(_) | ExprKind::Builtin(_) => Ok(expr.clone()),
            ExprKind::Symbol(sym) => env.get(sym)
                .ok_or_else(|| EvalErr::at(ErrorKind::Undefined(sym.clone()), expr)),
            ExprKind::Vector(items) => Ok(LispExpr::vector(self.eval_args(items, env)?)),
            ExprKind::List(list) => match list.split_first() {
                None => Ok(expr.clone()),
                Some((head, args)) => self.eval_list(expr, head, args, env),
            },
        }
    }

    fn eval_args(&self, args: &[LispExpr], env: &Environment) -> Result<Vec<LispExpr>, EvalErr> {
        args.iter().map(|arg| self.eval(arg, env)).collect()
    }

    fn eval_list(&self, form: &LispExpr, head: &LispExpr, args: &[LispExpr],
                 env: &Environment) -> Result<LispExpr, EvalErr> {
        if let Some(mac) = self.macro_of(head, env) {
            let expansion = self.expand(&mac, args, form)?;
            return self.eval(&expansion, env);
        }
        match head.as_symbol().unwrap_or("") {
            "quote" => self.quote(form, args),
            "var" => self.var(form, args, env),
            "set" => self.set(form, args, env),
            "if" => self.if_(form, args, env),
            "fn" => self.lambda(form, args, env),
            "macro" => self.macro_(form, args, env),
            "apply" => self.apply(form, args, env),
            _ => self.call(form, head, args, env),
        }
    }

    fn call(&self, form: &LispExpr, head: &LispExpr, args: &[LispExpr],
            env: &Environment) -> Result<LispExpr, EvalErr> {
        let op = self.eval(head, env)?;
        match op.kind() {
            ExprKind::Builtin(name) => {
                let args = self.eval_args(args, env)?;
                self.call_builtin(name, &op, env, &args)
            },
            ExprKind::Closure(p) => {
                p.params().check_arity(args.len()).map_err(|kind| EvalErr::at(kind, form))?;
                let args = self.eval_args(args, env)?;
                self.apply_procedure(p, args, form)
            },
            _ => Err(EvalErr::at(ErrorKind::NotCallable(op.type_name()), head)),
        }
    }

    fn call_builtin(&self, name: &str, op: &LispExpr, env: &Environment,
                    args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
        match self.builtins.get(name) {
            Some(f) => f(self, env, op, args),
            None => Err(EvalErr::at(ErrorKind::Undefined(name.to_string()), op)),
        }
    }

    /// Call an already evaluated operator with already evaluated arguments.
    pub(crate) fn invoke(&self, op: &LispExpr, args: Vec<LispExpr>, env: &Environment,
              form: &LispExpr) -> Result<LispExpr, EvalErr> {
        match op.kind() {
            ExprKind::Builtin(name) => self.call_builtin(name, op, env, &args),
            ExprKind::Closure(p) => {
                p.params().check_arity(args.len()).map_err(|kind| EvalErr::at(kind, form))?;
                self.apply_procedure(p, args, form)
            },
            _ => Err(EvalErr::at(ErrorKind::NotCallable(op.type_name()), form)),
        }
    }

    fn apply_procedure(&self, p: &Procedure, args: Vec<LispExpr>,
                       form: &LispExpr) -> Result<LispExpr, EvalErr> {
        trace!(params = ?p.params().names(), nargs = args.len(), "applying closure");
        let env = p.bind(args).map_err(|kind| EvalErr::at(kind, form))?;
        self.eval_body(p.body(), &env)
    }

    fn eval_body(&self, body: &[LispExpr], env: &Environment) -> Result<LispExpr, EvalErr> {
        let mut res = LispExpr::nil();
        for expr in body {
            res = self.eval(expr, env)?;
        }
        Ok(res)
    }

    /// The macro bound to `head` if it is a symbol naming one.
    pub fn macro_of(&self, head: &LispExpr, env: &Environment) -> Option<Rc<Macro>> {
        let value = env.get(head.as_symbol()?)?;
        match value.kind() {
            ExprKind::Macro(mac) => Some(mac.clone()),
            _ => None,
        }
    }

    /// One expansion step: run the macro body over the unevaluated argument
    /// forms. The result is not evaluated.
    pub fn expand(&self, mac: &Macro, args: &[LispExpr],
                  form: &LispExpr) -> Result<LispExpr, EvalErr> {
        let p = mac.procedure();
        p.params().check_arity(args.len()).map_err(|kind| EvalErr::at(kind, form))?;
        let expansion = self.apply_procedure(p, args.to_vec(), form)?;
        debug!(name = mac.name(), %expansion, "expanded macro");
        Ok(expansion)
    }

    fn quote(&self, form: &LispExpr, args: &[LispExpr]) -> Result<LispExpr, EvalErr> {
        check!(args.len() == 1, EvalErr::invalid_form("expect (quote expr)", form));
        Ok(args[0].clone())
    }

    fn var(&self, form: &LispExpr, args: &[LispExpr],
           env: &Environment) -> Result<LispExpr, EvalErr> {
        check!(args.len() == 2, EvalErr::invalid_form("expect (var name value)", form));
        let name = args[0].as_symbol().ok_or_else(|| EvalErr::invalid_form(
            format!("expect a symbol to define, got {}", args[0].type_name()), &args[0]))?;
        let value = self.eval(&args[1], env)?;
        env.define(name, value).map_err(|kind| EvalErr::at(kind, &args[0]))?;
        Ok(LispExpr::nil())
    }

    fn set(&self, form: &LispExpr, args: &[LispExpr],
           env: &Environment) -> Result<LispExpr, EvalErr> {
        check!(args.len() == 2, EvalErr::invalid_form("expect (set name value)", form));
        let name = args[0].as_symbol().ok_or_else(|| EvalErr::invalid_form(
            format!("expect a symbol to set, got {}", args[0].type_name()), &args[0]))?;
        let value = self.eval(&args[1], env)?;
        env.set(name, value).map_err(|kind| EvalErr::at(kind, &args[0]))?;
        Ok(LispExpr::nil())
    }

    fn if_(&self, form: &LispExpr, args: &[LispExpr],
           env: &Environment) -> Result<LispExpr, EvalErr> {
        check!(args.len() == 2 || args.len() == 3,
               EvalErr::invalid_form("expect (if pred then [else])", form));
        if self.eval(&args[0], env)?.is_truthy() {
            self.eval(&args[1], env)
        } else {
            match args.get(2) {
                Some(alt) => self.eval(alt, env),
                None => Ok(LispExpr::nil()),
            }
        }
    }

    // (fn [params] body...) or (fn name [params] body...)
    fn lambda(&self, form: &LispExpr, args: &[LispExpr],
              env: &Environment) -> Result<LispExpr, EvalErr> {
        check!(!args.is_empty(), EvalErr::invalid_form("expect (fn [params] body...)", form));
        match args[0].as_symbol() {
            Some(name) => {
                check!(args.len() >= 2,
                       EvalErr::invalid_form("expect (fn name [params] body...)", form));
                let closure = self.closure(&args[1], &args[2..], env)?;
                env.define(name, closure).map_err(|kind| EvalErr::at(kind, &args[0]))?;
                Ok(LispExpr::nil())
            },
            None => self.closure(&args[0], &args[1..], env),
        }
    }

    fn closure(&self, params: &LispExpr, body: &[LispExpr],
               env: &Environment) -> Result<LispExpr, EvalErr> {
        let params = Params::parse(params)?;
        Ok(LispExpr::closure(Procedure::new(params, body.to_vec(), env.clone())))
    }

    // (macro name (params) body...)
    fn macro_(&self, form: &LispExpr, args: &[LispExpr],
              env: &Environment) -> Result<LispExpr, EvalErr> {
        check!(args.len() >= 2, EvalErr::invalid_form("expect (macro name (params) body...)", form));
        let name = args[0].as_symbol().ok_or_else(|| EvalErr::invalid_form(
            format!("expect a macro name, got {}", args[0].type_name()), &args[0]))?;
        let params = Params::parse(&args[1])?;
        let procedure = Procedure::new(params, args[2..].to_vec(), env.clone());
        let mac = LispExpr::macro_(Macro::new(name.to_string(), procedure));
        env.define(name, mac).map_err(|kind| EvalErr::at(kind, &args[0]))?;
        Ok(LispExpr::nil())
    }

    // (apply f rest) or (apply (f a b) rest): the rest values follow the
    // literal arguments and are not evaluated again
    fn apply(&self, form: &LispExpr, args: &[LispExpr],
             env: &Environment) -> Result<LispExpr, EvalErr> {
        check!(args.len() == 2, EvalErr::invalid_form("expect (apply callable list)", form));
        let (head, literal) = match args[0].kind() {
            ExprKind::List(items) if !items.is_empty() => (&items[0], &items[1..]),
            _ => (&args[0], &args[..0]),
        };
        if let Some(mac) = self.macro_of(head, env) {
            let mut forms = literal.to_vec();
            forms.extend(self.apply_rest(&args[1], env)?);
            let expansion = self.expand(&mac, &forms, form)?;
            return self.eval(&expansion, env);
        }
        if is_special(head) {
            // quoted so the special form sees the rest values as they are
            let mut call = vec![head.clone()];
            call.extend_from_slice(literal);
            for value in self.apply_rest(&args[1], env)? {
                call.push(LispExpr::list(vec![LispExpr::symbol("quote"), value]));
            }
            return self.eval(&LispExpr::list(call), env);
        }
        let op = self.eval(head, env)?;
        let mut values = self.eval_args(literal, env)?;
        values.extend(self.apply_rest(&args[1], env)?);
        self.invoke(&op, values, env, form)
    }

    fn apply_rest(&self, rest: &LispExpr, env: &Environment) -> Result<Vec<LispExpr>, EvalErr> {
        let value = self.eval(rest, env)?;
        match value.as_seq() {
            Some(items) => Ok(items.to_vec()),
            None => Err(EvalErr::type_mismatch(
                format!("expect a list to apply, got {}", value.type_name()), rest)),
        }
    }

    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        writeln!(out, "{}", line)?;
        out.flush()
    }

    /// Wall clock nanoseconds, never lower than a previous reading.
    pub fn tick(&self) -> i64 {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos();
        let now = i64::try_from(now).unwrap_or(i64::MAX);
        let tick = now.max(self.last_tick.get());
        self.last_tick.set(tick);
        tick
    }

    /// A symbol name no source text can spell: `'` always ends a symbol in
    /// the tokenizer, and the counter keeps every name apart.
    pub fn gensym(&self, prefix: &str) -> String {
        let n = self.gensyms.get();
        self.gensyms.set(n + 1);
        format!("{}'{}", prefix, n)
    }
}
