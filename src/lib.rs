//! A calculator expression engine.
//!
//! Input goes through three stages, each failing fast with its own error
//! type: [`lexer::lex`] turns a string into tokens, [`parser::Parser`] builds
//! an [`ast::Expression`] and [`evaluator::evaluate`] reduces it to an `f64`
//! against a [`context::Context`] of variables and functions.
//!
//! ```
//! let context = exprcalc::Context::new();
//! assert_eq!(exprcalc::evaluate("2 + 3 * 4", &context).unwrap(), 14.0);
//! ```

pub mod ast;
pub mod calculator;
pub mod context;
pub mod convert;
pub mod evaluator;
pub mod functions;
pub mod history;
pub mod lexer;
pub mod parser;
pub mod programmer;

pub use ast::Expression;
pub use calculator::Calculator;
pub use context::{AngleMode, Context};
pub use evaluator::EvalError;
pub use lexer::{lex, normalize, LexError};
pub use parser::{ParseError, Parser};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        Error::Parse(ParseError::Lex(err))
    }
}

/// Tokenize, parse and evaluate `input` against `context`.
pub fn evaluate(input: &str, context: &Context) -> Result<f64, Error> {
    let expr = Parser::default().parse_str(input)?;
    Ok(evaluator::evaluate(&expr, context)?)
}
