//! Programmer mode: 64-bit bitwise operations and number base conversion.

use std::{char, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOperation {
    And,
    Or,
    Xor,
    Not,
    LeftShift,
    RightShift,
}

impl FromStr for BitwiseOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" | "&" => Ok(BitwiseOperation::And),
            "or" | "|" => Ok(BitwiseOperation::Or),
            "xor" => Ok(BitwiseOperation::Xor),
            "not" | "~" => Ok(BitwiseOperation::Not),
            "shl" | "<<" => Ok(BitwiseOperation::LeftShift),
            "shr" | ">>" => Ok(BitwiseOperation::RightShift),
            other => Err(format!("unknown bitwise operation {}", other)),
        }
    }
}

/// Apply `op` to `a` and `b`. `Not` ignores `b`; shift amounts use their
/// low six bits, so shifting by 64 is a no-op.
pub fn bitwise(a: i64, b: i64, op: BitwiseOperation) -> i64 {
    let shift = (b & 0x3f) as u32;
    match op {
        BitwiseOperation::And => a & b,
        BitwiseOperation::Or => a | b,
        BitwiseOperation::Xor => a ^ b,
        BitwiseOperation::Not => !a,
        BitwiseOperation::LeftShift => a << shift,
        BitwiseOperation::RightShift => a >> shift,
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BaseError {
    #[error("Invalid number format for the specified base: `{value}` in base {radix}")]
    InvalidDigits { value: String, radix: u32 },
    #[error("unsupported base {0}, expected 2 to 36")]
    UnsupportedBase(u32),
}

fn check_radix(radix: u32) -> Result<u32, BaseError> {
    if (2..=36).contains(&radix) {
        Ok(radix)
    } else {
        Err(BaseError::UnsupportedBase(radix))
    }
}

/// Render `value` in `radix` with lowercase digits and a leading `-` for
/// negative numbers.
pub fn to_radix_string(value: i64, radix: u32) -> Result<String, BaseError> {
    let radix = check_radix(radix)?;

    let mut magnitude = value.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        let digit = (magnitude % radix as u64) as u32;
        digits.push(char::from_digit(digit, radix).unwrap_or('?'));
        magnitude /= radix as u64;
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push('-');
    }
    Ok(digits.into_iter().rev().collect())
}

/// Reinterpret `value`, written in base `from`, in base `to`.
pub fn convert_base(value: &str, from: u32, to: u32) -> Result<String, BaseError> {
    let from = check_radix(from)?;
    let parsed = i64::from_str_radix(value.trim(), from).map_err(|_| BaseError::InvalidDigits {
        value: value.to_string(),
        radix: from,
    })?;
    to_radix_string(parsed, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bitwise_operations() {
        assert_eq!(bitwise(6, 3, BitwiseOperation::And), 2);
        assert_eq!(bitwise(6, 3, BitwiseOperation::Or), 7);
        assert_eq!(bitwise(6, 3, BitwiseOperation::Xor), 5);
        assert_eq!(bitwise(6, 0, BitwiseOperation::Not), !6);
        assert_eq!(bitwise(6, 2, BitwiseOperation::LeftShift), 24);
        assert_eq!(bitwise(6, 2, BitwiseOperation::RightShift), 1);
        assert_eq!(bitwise(-8, 1, BitwiseOperation::RightShift), -4);
        assert_eq!(bitwise(1, 64, BitwiseOperation::LeftShift), 1);
    }

    #[test]
    fn parse_operation_names() {
        assert_eq!("XOR".parse::<BitwiseOperation>(), Ok(BitwiseOperation::Xor));
        assert_eq!("<<".parse::<BitwiseOperation>(), Ok(BitwiseOperation::LeftShift));
        assert!("nand".parse::<BitwiseOperation>().is_err());
    }

    #[test]
    fn base_conversion() {
        assert_eq!(convert_base("1010", 2, 10).unwrap(), "10");
        assert_eq!(convert_base("10", 10, 2).unwrap(), "1010");
        assert_eq!(convert_base("10", 10, 16).unwrap(), "a");
        assert_eq!(convert_base("10", 16, 10).unwrap(), "16");
        assert_eq!(convert_base("10", 8, 2).unwrap(), "1000");
        assert_eq!(convert_base("-255", 10, 16).unwrap(), "-ff");
        assert_eq!(convert_base("0", 10, 2).unwrap(), "0");
    }

    #[test]
    fn extreme_values() {
        assert_eq!(
            to_radix_string(i64::MIN, 16).unwrap(),
            "-8000000000000000"
        );
        assert_eq!(to_radix_string(i64::MAX, 36).unwrap(), "1y2p0ij32e8e7");
    }

    #[test]
    fn invalid_digits() {
        let err = convert_base("G", 16, 10).unwrap_err();
        assert!(err
            .to_string()
            .contains("Invalid number format for the specified base"));
        assert_eq!(convert_base("1", 1, 10), Err(BaseError::UnsupportedBase(1)));
        assert_eq!(convert_base("1", 10, 37), Err(BaseError::UnsupportedBase(37)));
    }
}
