use crate::constants::{
    METERS_PER_CENTIMETER, METERS_PER_FOOT, METERS_PER_INCH, METERS_PER_KILOMETER,
    METERS_PER_MILE, METERS_PER_MILLIMETER, METERS_PER_YARD,
};
use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Measurement system used when formatting a [`Quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Metric,
    Us,
}

/// A length, stored in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(f64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0.0);

    pub fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub fn meters(self) -> f64 {
        self.0
    }

    /// Parses a unit string such as `1.7m`, `5ft 10in`, `4 mi` or `2`.
    ///
    /// Parts are summed. A number without a unit is metres.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::invalid("length", s, reason);
        let mut rest = s.trim();
        if rest.is_empty() {
            return Err(invalid("empty"));
        }

        let mut total = 0.0;
        while !rest.is_empty() {
            let num_end = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            if num_end == 0 {
                return Err(invalid("expected a number"));
            }
            let value: f64 = rest[..num_end]
                .parse()
                .map_err(|_| invalid("bad number"))?;
            rest = rest[num_end..].trim_start();

            let unit_end = rest
                .find(|c: char| !(c.is_alphabetic() || c == '\'' || c == '"'))
                .unwrap_or(rest.len());
            let factor = unit_factor(&rest[..unit_end]).ok_or_else(|| invalid("unknown unit"))?;
            rest = rest[unit_end..].trim_start();

            total += value * factor;
        }

        if !total.is_finite() {
            return Err(invalid("not finite"));
        }
        Ok(Self(total))
    }

    /// Formats in the largest unit of `system` that keeps the value at least 1.
    pub fn format(self, system: UnitSystem) -> String {
        let m = self.0;
        let (value, unit) = match system {
            UnitSystem::Metric => {
                if m >= METERS_PER_KILOMETER {
                    (m / METERS_PER_KILOMETER, "km")
                } else if m >= 1.0 {
                    (m, "m")
                } else if m >= METERS_PER_CENTIMETER {
                    (m / METERS_PER_CENTIMETER, "cm")
                } else {
                    (m / METERS_PER_MILLIMETER, "mm")
                }
            }
            UnitSystem::Us => {
                if m >= METERS_PER_MILE {
                    (m / METERS_PER_MILE, "mi")
                } else if m >= METERS_PER_FOOT {
                    (m / METERS_PER_FOOT, "ft")
                } else {
                    (m / METERS_PER_INCH, "in")
                }
            }
        };
        format!("{}{}", trim_decimals(value), unit)
    }
}

fn unit_factor(unit: &str) -> Option<f64> {
    let factor = match unit.to_ascii_lowercase().as_str() {
        "" | "m" | "meter" | "meters" | "metre" | "metres" => 1.0,
        "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
            METERS_PER_MILLIMETER
        }
        "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
            METERS_PER_CENTIMETER
        }
        "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => METERS_PER_KILOMETER,
        "in" | "inch" | "inches" | "\"" => METERS_PER_INCH,
        "ft" | "foot" | "feet" | "'" => METERS_PER_FOOT,
        "yd" | "yard" | "yards" => METERS_PER_YARD,
        "mi" | "mile" | "miles" => METERS_PER_MILE,
        _ => return None,
    };
    Some(factor)
}

fn trim_decimals(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(UnitSystem::Metric))
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_single_units() {
        assert!(approx(Quantity::parse("1.7m").unwrap().meters(), 1.7));
        assert!(approx(Quantity::parse("1mm").unwrap().meters(), 0.001));
        assert!(approx(Quantity::parse("4mi").unwrap().meters(), 4.0 * 1609.344));
        assert!(approx(Quantity::parse("2").unwrap().meters(), 2.0));
        assert!(approx(Quantity::parse("3 feet").unwrap().meters(), 3.0 * 0.3048));
    }

    #[test]
    fn test_parse_compound_parts_are_summed() {
        let q = Quantity::parse("5ft 10in").unwrap();
        assert!(approx(q.meters(), 5.0 * 0.3048 + 10.0 * 0.0254));
        let q = Quantity::parse("5'10\"").unwrap();
        assert!(approx(q.meters(), 5.0 * 0.3048 + 10.0 * 0.0254));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Quantity::parse("").is_err());
        assert!(Quantity::parse("tall").is_err());
        assert!(Quantity::parse("5 parsecs").is_err());
        assert!(Quantity::parse("-2m").is_err());
    }

    #[test]
    fn test_format_picks_unit() {
        assert_eq!(Quantity::from_meters(1.7).format(UnitSystem::Metric), "1.7m");
        assert_eq!(Quantity::from_meters(0.05).format(UnitSystem::Metric), "5cm");
        assert_eq!(Quantity::from_meters(2500.0).format(UnitSystem::Metric), "2.5km");
        assert_eq!(Quantity::from_meters(0.0005).format(UnitSystem::Metric), "0.5mm");
        assert_eq!(Quantity::from_meters(0.3048 * 6.0).format(UnitSystem::Us), "6ft");
        assert_eq!(Quantity::from_meters(1609.344).format(UnitSystem::Us), "1mi");
    }

    #[test]
    fn test_arithmetic_and_ordering() {
        let a = Quantity::from_meters(1.0);
        let b = Quantity::from_meters(2.0);
        assert!(a < b);
        assert_eq!(a + b, Quantity::from_meters(3.0));
        assert_eq!(b - a, a);
        assert_eq!(a * 4.0, Quantity::from_meters(4.0));
    }
}
