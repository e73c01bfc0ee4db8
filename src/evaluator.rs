use log::trace;

use crate::ast::{Expression, Operator, UnaryOperator};
use crate::context::Context;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("unknown variable referenced {0}")]
    UnboundVariable(String),
    #[error("unknown function {0}")]
    UnknownFunction(String),
    #[error("invalid number of args in call {name} expected {expected} found {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("{function} is not defined for {value}")]
    Domain { function: String, value: f64 },
    #[error("division by zero")]
    DivisionByZero,
}

impl EvalError {
    pub fn domain(function: &str, value: f64) -> Self {
        EvalError::Domain {
            function: function.to_string(),
            value,
        }
    }
}

/// Walks an expression tree against a borrowed context.
pub struct Evaluator<'a> {
    pub context: &'a Context,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a Context) -> Evaluator<'a> {
        Evaluator { context }
    }

    fn eval_binary(&self, op: Operator, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        match op {
            Operator::Add => Ok(lhs + rhs),
            Operator::Sub => Ok(lhs - rhs),
            Operator::Mul => Ok(lhs * rhs),
            Operator::Div if rhs == 0.0 => Err(EvalError::DivisionByZero),
            Operator::Div => Ok(lhs / rhs),
            Operator::Pow => Ok(lhs.powf(rhs)),
        }
    }

    pub fn eval_expr(&self, expr: &Expression) -> Result<f64, EvalError> {
        match expr {
            Expression::Literal(value) => Ok(*value),
            Expression::Variable(name) => match self.context.variable(name) {
                Some(value) => Ok(value),
                None => Err(EvalError::UnboundVariable(name.clone())),
            },
            Expression::Unary(UnaryOperator::Neg, operand) => Ok(-self.eval_expr(operand)?),
            Expression::Binary(op, left, right) => {
                let lhs = self.eval_expr(left)?;
                let rhs = self.eval_expr(right)?;
                let value = self.eval_binary(*op, lhs, rhs)?;
                trace!("{} {} {} = {}", lhs, op, rhs, value);
                Ok(value)
            }
            Expression::Call(callee, args) => match self.context.function(callee) {
                Some(func) => {
                    func.check_arity(callee, args.len())?;

                    let mut evaluated = Vec::with_capacity(args.len());
                    for arg in args {
                        evaluated.push(self.eval_expr(arg)?);
                    }

                    let value = (func.body)(&evaluated)?;
                    trace!("{}({:?}) = {}", callee, evaluated, value);
                    Ok(value)
                }
                None => Err(EvalError::UnknownFunction(callee.clone())),
            },
        }
    }
}

/// Evaluate `expr` against `context`. The tree is not modified.
pub fn evaluate(expr: &Expression, context: &Context) -> Result<f64, EvalError> {
    Evaluator::new(context).eval_expr(expr)
}
