use log::{debug, warn};

use crate::context::{AngleMode, Context};
use crate::evaluator;
use crate::history::{Entry, History};
use crate::parser::Parser;
use crate::Error;

/// Name under which the memory register is visible to expressions.
pub const MEMORY_VARIABLE: &str = "mem";

/// What the calculator shows instead of a value when evaluation fails.
pub const ERROR_DISPLAY: &str = "Error";

/// The M+, M-, MR and MC register.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Memory {
    value: f64,
}

impl Memory {
    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn set(&mut self, value: f64) {
        self.value = value;
    }

    pub fn add(&mut self, value: f64) {
        self.value += value;
    }

    pub fn subtract(&mut self, value: f64) {
        self.value -= value;
    }

    pub fn clear(&mut self) {
        self.value = 0.0;
    }
}

/// Digits kept after the decimal point.
const DISPLAY_DECIMALS: usize = 8;

/// Format a result the way the calculator displays it: integers that fit an
/// `i64` as plain integers, other values with at most eight decimals.
/// Scientific notation is used beyond the `i64` range and for non-zero
/// magnitudes that eight decimals would round to zero.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value.is_sign_positive() { "" } else { "-" };
        return format!("{}Infinity", sign);
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= i64::MAX as f64 || magnitude < 0.5e-8 {
        return format!("{:e}", value);
    }
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }

    let formatted = format!("{:.*}", DISPLAY_DECIMALS, value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// An evaluation context plus the state a calculator front end keeps
/// between expressions: memory register and history.
#[derive(Debug, Clone)]
pub struct Calculator {
    parser: Parser,
    context: Context,
    memory: Memory,
    history: History,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_context(Context::new())
    }

    pub fn with_context(context: Context) -> Self {
        let mut calculator = Self {
            parser: Parser::default(),
            context,
            memory: Memory::default(),
            history: History::new(),
        };
        calculator.sync_memory();
        calculator
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Direct access to the context. Writes to [`MEMORY_VARIABLE`] made
    /// here bypass the memory register; use [`Calculator::memory_store`].
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn set_angle_mode(&mut self, mode: AngleMode) {
        self.context.set_angle_mode(mode);
    }

    /// Evaluate `input` and record it in the history on success.
    pub fn evaluate(&mut self, input: &str) -> Result<f64, Error> {
        let expr = self.parser.parse_str(input)?;
        let value = evaluator::evaluate(&expr, &self.context)?;
        debug!("{} = {}", input, value);
        self.history.push(Entry::new(input.trim(), value));
        Ok(value)
    }

    /// Evaluate `input` for display: the formatted value, or
    /// [`ERROR_DISPLAY`] when anything goes wrong.
    pub fn display(&mut self, input: &str) -> String {
        match self.evaluate(input) {
            Ok(value) => format_value(value),
            Err(err) => {
                warn!("failed to evaluate {:?}: {}", input, err);
                ERROR_DISPLAY.to_string()
            }
        }
    }

    /// Evaluate `input` and bind the result to `name`. Assigning to
    /// [`MEMORY_VARIABLE`] stores into the memory register.
    pub fn assign(&mut self, name: &str, input: &str) -> Result<f64, Error> {
        let value = self.evaluate(input)?;
        if name == MEMORY_VARIABLE {
            self.memory_store(value);
        } else {
            self.context.set_variable(name, value);
        }
        Ok(value)
    }

    pub fn memory(&self) -> f64 {
        self.memory.get()
    }

    pub fn memory_store(&mut self, value: f64) {
        self.memory.set(value);
        self.sync_memory();
    }

    pub fn memory_add(&mut self, value: f64) {
        self.memory.add(value);
        self.sync_memory();
    }

    pub fn memory_subtract(&mut self, value: f64) {
        self.memory.subtract(value);
        self.sync_memory();
    }

    pub fn memory_clear(&mut self) {
        self.memory.clear();
        self.sync_memory();
    }

    fn sync_memory(&mut self) {
        self.context.set_variable(MEMORY_VARIABLE, self.memory.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvalError;
    use pretty_assertions::assert_eq;

    #[test]
    fn memory_register() {
        let mut calculator = Calculator::new();
        calculator.memory_store(10.0);
        assert_eq!(calculator.memory(), 10.0);
        calculator.memory_add(5.0);
        assert_eq!(calculator.memory(), 15.0);
        calculator.memory_subtract(7.0);
        assert_eq!(calculator.memory(), 8.0);
        assert_eq!(calculator.evaluate("mem * 2"), Ok(16.0));
        calculator.memory_clear();
        assert_eq!(calculator.memory(), 0.0);
        assert_eq!(calculator.evaluate("mem"), Ok(0.0));
    }

    #[test]
    fn display_symbols() {
        let mut calculator = Calculator::new();
        assert_eq!(calculator.evaluate("6×4"), Ok(24.0));
        assert_eq!(calculator.evaluate("10÷2"), Ok(5.0));
        assert_eq!(calculator.evaluate("2+3×4"), Ok(14.0));
        assert_eq!(calculator.evaluate("(2+3)×4"), Ok(20.0));
        assert_eq!(calculator.evaluate("√9"), Ok(3.0));
        assert_eq!(calculator.display("2×π"), format_value(2.0 * std::f64::consts::PI));
    }

    #[test]
    fn history_records_successes_only() {
        let mut calculator = Calculator::new();
        calculator.evaluate("1 + 1").unwrap();
        assert!(calculator.evaluate("1 +").is_err());
        calculator.evaluate("2 * 3").unwrap();

        let entries: Vec<String> = calculator
            .history()
            .entries()
            .map(|entry| entry.to_string())
            .collect();
        assert_eq!(entries, vec!["2 * 3 = 6", "1 + 1 = 2"]);

        calculator.clear_history();
        assert!(calculator.history().is_empty());
    }

    #[test]
    fn display_shows_error() {
        let mut calculator = Calculator::new();
        assert_eq!(calculator.display("1/0"), ERROR_DISPLAY);
        assert_eq!(calculator.display("sqrt(-4)"), ERROR_DISPLAY);
        assert_eq!(calculator.display("0.1 + 0.2"), "0.3");
    }

    #[test]
    fn assign_binds_variable() {
        let mut calculator = Calculator::new();
        assert_eq!(calculator.assign("r", "2"), Ok(2.0));
        assert_eq!(calculator.evaluate("r^2"), Ok(4.0));
        assert_eq!(
            calculator.assign("q", "unknown"),
            Err(Error::Eval(EvalError::UnboundVariable("unknown".to_string())))
        );
        assert_eq!(calculator.context().variable("q"), None);
    }

    #[test]
    fn assigning_mem_stores_into_memory() {
        let mut calculator = Calculator::new();
        assert_eq!(calculator.assign(MEMORY_VARIABLE, "2 + 3"), Ok(5.0));
        assert_eq!(calculator.memory(), 5.0);
        assert_eq!(calculator.context().variable(MEMORY_VARIABLE), Some(5.0));

        calculator.memory_add(1.0);
        assert_eq!(calculator.evaluate("mem"), Ok(6.0));
    }

    #[test]
    fn format_values() {
        assert_eq!(format_value(2.0), "2");
        assert_eq!(format_value(-2.5), "-2.5");
        assert_eq!(format_value(1.0 / 3.0), "0.33333333");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(1e15), "1000000000000000");
        assert_eq!(format_value(-123456789.0), "-123456789");
        assert_eq!(format_value(1e-9), "1e-9");
        assert_eq!(format_value(1e20), "1e20");
        assert_eq!(format_value(f64::INFINITY), "Infinity");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_value(f64::NAN), "NaN");
    }
}
