use std::{collections::HashMap, fmt, sync::Arc};

use log::{debug, info};

use crate::evaluator::EvalError;
use crate::functions;

pub type NativeFn = Arc<dyn Fn(&[f64]) -> Result<f64, EvalError> + Send + Sync>;

/// A fixed-arity function callable from expressions.
#[derive(Clone)]
pub struct Function {
    pub arity: usize,
    pub body: NativeFn,
}

impl Function {
    pub fn new<F>(arity: usize, body: F) -> Self
    where
        F: Fn(&[f64]) -> Result<f64, EvalError> + Send + Sync + 'static,
    {
        Self {
            arity,
            body: Arc::new(body),
        }
    }

    /// Fails unless the function takes exactly `actual` arguments. `name` is
    /// only used for the error.
    pub fn check_arity(&self, name: &str, actual: usize) -> Result<(), EvalError> {
        if actual == self.arity {
            Ok(())
        } else {
            Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected: self.arity,
                actual,
            })
        }
    }

    /// Invoke the function, checking the argument count first.
    pub fn call(&self, name: &str, args: &[f64]) -> Result<f64, EvalError> {
        self.check_arity(name, args.len())?;
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("arity", &self.arity)
            .finish()
    }
}

/// Unit used by the trigonometric built-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleMode {
    Radians,
    Degrees,
}

impl Default for AngleMode {
    fn default() -> Self {
        AngleMode::Radians
    }
}

impl AngleMode {
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Radians => angle,
            AngleMode::Degrees => angle.to_radians(),
        }
    }

    pub fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Radians => angle,
            AngleMode::Degrees => angle.to_degrees(),
        }
    }
}

/// Named variables and functions visible to an evaluation.
///
/// Evaluation only needs `&Context`, so a context can be shared between
/// threads while nothing mutates it. Every mutation goes through `&mut self`.
#[derive(Debug, Clone)]
pub struct Context {
    variables: HashMap<String, f64>,
    functions: HashMap<String, Function>,
    angle_mode: AngleMode,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A context with no variables and no functions.
    pub fn empty() -> Self {
        Self {
            variables: HashMap::new(),
            functions: HashMap::new(),
            angle_mode: AngleMode::default(),
        }
    }

    /// A context pre-populated with `pi`, `e` and the built-in functions.
    pub fn new() -> Self {
        let mut context = Self::empty();
        functions::register_builtins(&mut context);
        context
    }

    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, f64)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Returns the previous value, if any.
    pub fn set_variable(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        let name = name.into();
        info!("set variable {} = {}", name, value);
        self.variables.insert(name, value)
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<f64> {
        let removed = self.variables.remove(name);
        if removed.is_some() {
            info!("removed variable {}", name);
        }
        removed
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Register `body` under `name`, replacing any function of that name.
    pub fn register_function<F>(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        body: F,
    ) -> Option<Function>
    where
        F: Fn(&[f64]) -> Result<f64, EvalError> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!("registered function {}/{}", name, arity);
        self.functions.insert(name, Function::new(arity, body))
    }

    pub fn remove_function(&mut self, name: &str) -> Option<Function> {
        self.functions.remove(name)
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    /// Switch the unit of the trigonometric built-ins. User functions
    /// registered under the same names are replaced.
    pub fn set_angle_mode(&mut self, mode: AngleMode) {
        info!("angle mode set to {:?}", mode);
        self.angle_mode = mode;
        functions::register_trig(self, mode);
    }

    /// Lex, parse and evaluate `input` against this context.
    pub fn evaluate(&self, input: &str) -> Result<f64, crate::Error> {
        crate::evaluate(input, self)
    }
}
