use super::Quantity;
use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A height change applied to a player by an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Diff {
    /// Signed change in metres.
    Add(f64),
    Multiply(f64),
}

impl Diff {
    /// Parses `x2`, `*0.5`, `/3`, `+10cm` or `-1ft`.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        let invalid = |reason: &str| ParseError::invalid("size", s, reason);
        let mut chars = s.chars();
        let op = chars.next().ok_or_else(|| invalid("empty"))?;
        let operand = chars.as_str().trim();

        match op {
            'x' | 'X' | '*' | '/' => {
                let factor: f64 = operand.parse().map_err(|_| invalid("bad factor"))?;
                if !factor.is_finite() || factor <= 0.0 {
                    return Err(invalid("factor must be positive"));
                }
                Ok(if op == '/' {
                    Diff::Multiply(1.0 / factor)
                } else {
                    Diff::Multiply(factor)
                })
            }
            '+' | '-' => {
                let amount = Quantity::parse(operand).map_err(|_| invalid("bad length"))?;
                let sign = if op == '-' { -1.0 } else { 1.0 };
                Ok(Diff::Add(sign * amount.meters()))
            }
            _ => Err(invalid("expected one of x * / + -")),
        }
    }

    /// Applies the change. Heights never go below zero.
    pub fn apply(self, height: Quantity) -> Quantity {
        let next = match self {
            Diff::Add(meters) => height + Quantity::from_meters(meters),
            Diff::Multiply(factor) => height * factor,
        };
        if next.meters() < 0.0 {
            Quantity::ZERO
        } else {
            next
        }
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diff::Add(m) if *m < 0.0 => write!(f, "-{}", Quantity::from_meters(-m)),
            Diff::Add(m) => write!(f, "+{}", Quantity::from_meters(*m)),
            Diff::Multiply(factor) => write!(f, "x{}", factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiply_and_divide() {
        assert_eq!(Diff::parse("x2").unwrap(), Diff::Multiply(2.0));
        assert_eq!(Diff::parse("*0.5").unwrap(), Diff::Multiply(0.5));
        assert_eq!(Diff::parse("/4").unwrap(), Diff::Multiply(0.25));
    }

    #[test]
    fn test_parse_add_and_subtract() {
        assert_eq!(Diff::parse("+1m").unwrap(), Diff::Add(1.0));
        assert_eq!(Diff::parse("-2m").unwrap(), Diff::Add(-2.0));
    }

    #[test]
    fn test_parse_rejects_unknown_operator() {
        assert!(Diff::parse("2m").is_err());
        assert!(Diff::parse("x0").is_err());
        assert!(Diff::parse("").is_err());
        assert!(Diff::parse("+tall").is_err());
    }

    #[test]
    fn test_apply_clamps_at_zero() {
        let h = Quantity::from_meters(1.0);
        assert_eq!(Diff::Multiply(3.0).apply(h), Quantity::from_meters(3.0));
        assert_eq!(Diff::Add(-5.0).apply(h), Quantity::ZERO);
    }
}
