//! Built-in constants and functions of the default context.

use std::f64::consts::{E, PI};

use crate::context::{AngleMode, Context};
use crate::evaluator::EvalError;

/// Lanczos approximation, g = 7, n = 9.
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Largest n for which n! is finite as an f64.
const MAX_FACTORIAL: f64 = 170.0;

fn unary(context: &mut Context, name: &'static str, f: fn(f64) -> f64) {
    context.register_function(name, 1, move |args| Ok(f(args[0])));
}

fn binary(context: &mut Context, name: &'static str, f: fn(f64, f64) -> f64) {
    context.register_function(name, 2, move |args| Ok(f(args[0], args[1])));
}

/// Like `unary`, but inputs rejected by `valid` are a domain error.
fn checked(context: &mut Context, name: &'static str, valid: fn(f64) -> bool, f: fn(f64) -> f64) {
    context.register_function(name, 1, move |args| {
        let x = args[0];
        if x.is_nan() || valid(x) {
            Ok(f(x))
        } else {
            Err(EvalError::domain(name, x))
        }
    });
}

fn positive(x: f64) -> bool {
    x > 0.0
}

fn unit_interval(x: f64) -> bool {
    (-1.0..=1.0).contains(&x)
}

pub fn register_builtins(context: &mut Context) {
    context.set_variable("pi", PI);
    context.set_variable("e", E);

    checked(context, "sqrt", |x| x >= 0.0, f64::sqrt);
    checked(context, "ln", positive, f64::ln);
    checked(context, "log", positive, f64::ln);
    checked(context, "log10", positive, f64::log10);
    checked(context, "log2", positive, f64::log2);

    unary(context, "cbrt", f64::cbrt);
    unary(context, "abs", f64::abs);
    unary(context, "exp", f64::exp);
    unary(context, "floor", f64::floor);
    unary(context, "ceil", f64::ceil);
    unary(context, "round", f64::round);
    unary(context, "signum", f64::signum);
    unary(context, "sinh", f64::sinh);
    unary(context, "cosh", f64::cosh);
    unary(context, "tanh", f64::tanh);
    unary(context, "gamma", gamma);

    binary(context, "pow", f64::powf);
    binary(context, "min", f64::min);
    binary(context, "max", f64::max);

    context.register_function("fact", 1, |args| factorial(args[0]));

    let mode = context.angle_mode();
    register_trig(context, mode);
}

/// (Re-)register the trigonometric functions for the given angle unit.
pub fn register_trig(context: &mut Context, mode: AngleMode) {
    context.register_function("sin", 1, move |args| Ok(mode.to_radians(args[0]).sin()));
    context.register_function("cos", 1, move |args| Ok(mode.to_radians(args[0]).cos()));
    context.register_function("tan", 1, move |args| Ok(mode.to_radians(args[0]).tan()));
    context.register_function("asin", 1, move |args| {
        inverse_trig("asin", args[0], mode, f64::asin)
    });
    context.register_function("acos", 1, move |args| {
        inverse_trig("acos", args[0], mode, f64::acos)
    });
    context.register_function("atan", 1, move |args| Ok(mode.from_radians(args[0].atan())));
    context.register_function("atan2", 2, move |args| {
        Ok(mode.from_radians(args[0].atan2(args[1])))
    });
}

fn inverse_trig(name: &str, x: f64, mode: AngleMode, f: fn(f64) -> f64) -> Result<f64, EvalError> {
    if unit_interval(x) || x.is_nan() {
        Ok(mode.from_radians(f(x)))
    } else {
        Err(EvalError::domain(name, x))
    }
}

fn ln_gamma_lanczos(x: f64) -> f64 {
    let z = x - 1.0;
    let mut sum = LANCZOS_COEFFICIENTS[0];
    for (i, coefficient) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        sum += coefficient / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt().ln() + (z + 0.5) * t.ln() - t + sum.ln()
}

/// The gamma function. Poles at the non-positive integers come out as
/// infinities or NaN.
pub fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        PI / ((PI * x).sin() * gamma(1.0 - x))
    } else {
        ln_gamma_lanczos(x).exp()
    }
}

/// `n!` for non-negative `n`. Integers are multiplied out exactly; other
/// values go through `gamma(n + 1)`.
pub fn factorial(n: f64) -> Result<f64, EvalError> {
    if n < 0.0 || n.is_nan() {
        return Err(EvalError::domain("fact", n));
    }
    if n.is_infinite() {
        return Ok(f64::INFINITY);
    }

    if n.fract() != 0.0 {
        return Ok(gamma(n + 1.0));
    }
    if n > MAX_FACTORIAL {
        return Ok(f64::INFINITY);
    }

    let mut result = 1.0;
    let mut i = 2.0;
    while i <= n {
        result *= i;
        i += 1.0;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {} but got {}",
            expected,
            actual
        );
    }

    fn eval(context: &Context, input: &str) -> f64 {
        context.evaluate(input).unwrap()
    }

    #[test]
    fn factorial_of_integers() {
        assert_eq!(factorial(0.0), Ok(1.0));
        assert_eq!(factorial(1.0), Ok(1.0));
        assert_eq!(factorial(5.0), Ok(120.0));
        assert_eq!(factorial(171.0), Ok(f64::INFINITY));
        assert_eq!(factorial(f64::INFINITY), Ok(f64::INFINITY));
    }

    #[test]
    fn factorial_of_fractions_uses_gamma() {
        approx(factorial(0.5).unwrap(), PI.sqrt() / 2.0);
        approx(factorial(1.5).unwrap(), 3.0 * PI.sqrt() / 4.0);
    }

    #[test]
    fn factorial_of_negative_is_domain_error() {
        assert_eq!(factorial(-1.0), Err(EvalError::domain("fact", -1.0)));
    }

    #[test]
    fn gamma_matches_known_values() {
        approx(gamma(5.0), 24.0);
        approx(gamma(0.5), PI.sqrt());
        approx(gamma(-0.5), -2.0 * PI.sqrt());
    }

    #[test]
    fn logarithms() {
        let context = Context::new();
        approx(eval(&context, "log10(10)"), 1.0);
        approx(eval(&context, "ln(10)"), 10f64.ln());
        approx(eval(&context, "log(e)"), 1.0);
        approx(eval(&context, "log2(8)"), 3.0);
    }

    #[test]
    fn radians_by_default() {
        let context = Context::new();
        approx(eval(&context, "sin(0)"), 0.0);
        approx(eval(&context, "cos(0)"), 1.0);
        approx(eval(&context, "sin(pi/2)"), 1.0);
    }

    #[test]
    fn degree_mode() {
        let mut context = Context::new();
        context.set_angle_mode(AngleMode::Degrees);
        approx(eval(&context, "sin(90)"), 1.0);
        approx(eval(&context, "cos(90)"), 0.0);
        approx(eval(&context, "atan(1)"), 45.0);
        approx(eval(&context, "asin(1)"), 90.0);
    }

    #[test]
    fn binary_builtins() {
        let context = Context::new();
        assert_eq!(eval(&context, "pow(2, 3)"), 8.0);
        assert_eq!(eval(&context, "max(2, 3) - min(2, 3)"), 1.0);
        assert_eq!(eval(&context, "fact(5)"), 120.0);
        assert_eq!(eval(&context, "fact(10^400)"), f64::INFINITY);
    }

    #[test]
    fn inverse_trig_domain() {
        let context = Context::new();
        assert!(context.evaluate("acos(2)").is_err());
    }
}
