//! Fixed-rule unit conversion.

use std::{fmt, str::FromStr};

const CENTIMETERS_PER_METER: f64 = 100.0;
const FEET_PER_METER: f64 = 3.28084;
const POUNDS_PER_KILOGRAM: f64 = 2.20462;
const KELVIN_OFFSET: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Meter,
    Centimeter,
    Foot,
    Kilogram,
    Pound,
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Meter => "m",
            Unit::Centimeter => "cm",
            Unit::Foot => "ft",
            Unit::Kilogram => "kg",
            Unit::Pound => "lb",
            Unit::Celsius => "C",
            Unit::Fahrenheit => "F",
            Unit::Kelvin => "K",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Unit {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Unit::Meter),
            "cm" => Ok(Unit::Centimeter),
            "ft" => Ok(Unit::Foot),
            "kg" => Ok(Unit::Kilogram),
            "lb" => Ok(Unit::Pound),
            "C" => Ok(Unit::Celsius),
            "F" => Ok(Unit::Fahrenheit),
            "K" => Ok(Unit::Kelvin),
            other => Err(ConvertError::UnknownUnit(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("unknown unit {0}")]
    UnknownUnit(String),
    #[error("Conversion from {from} to {to} is not supported")]
    Unsupported { from: Unit, to: Unit },
}

pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64, ConvertError> {
    use Unit::*;

    let converted = match (from, to) {
        (a, b) if a == b => value,
        (Meter, Centimeter) => value * CENTIMETERS_PER_METER,
        (Centimeter, Meter) => value / CENTIMETERS_PER_METER,
        (Meter, Foot) => value * FEET_PER_METER,
        (Foot, Meter) => value / FEET_PER_METER,
        (Kilogram, Pound) => value * POUNDS_PER_KILOGRAM,
        (Pound, Kilogram) => value / POUNDS_PER_KILOGRAM,
        (Celsius, Fahrenheit) => value * 9.0 / 5.0 + 32.0,
        (Fahrenheit, Celsius) => (value - 32.0) * 5.0 / 9.0,
        (Celsius, Kelvin) => value + KELVIN_OFFSET,
        (Kelvin, Celsius) => value - KELVIN_OFFSET,
        _ => return Err(ConvertError::Unsupported { from, to }),
    };
    Ok(converted)
}

/// [`convert`] with units given by their symbols, e.g. `"kg"`.
pub fn convert_str(value: f64, from: &str, to: &str) -> Result<f64, ConvertError> {
    convert(value, from.parse()?, to.parse()?)
}
