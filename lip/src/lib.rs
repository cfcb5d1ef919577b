mod expr;
mod env;
mod procedure;
mod builtin;
mod error;
mod eval;
mod parser;

pub use expr::{ExprId, ExprKind, LispExpr};
pub use env::Environment;
pub use procedure::{Macro, Params, Procedure};
pub use builtin::{builtins, Fp};
pub use error::{EvalErr, ErrorKind, Location};
pub use eval::Evaluator;
pub use parser::{Parser, Parsed, ParseError};

#[cfg(test)]
mod parser_test;
#[cfg(test)]
mod builtin_test;
