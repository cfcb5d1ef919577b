mod scanner;
mod lisp_tokenizer;

pub use scanner::Scanner;
pub use lisp_tokenizer::{LispTokenizer, LispToken, Token, Position};
