//! # Exact arithmetic calculator kernel
//!
//! Calculator transparently supports operations with different types of
//! exact numbers, converting to the appropriate type when it is needed.
//! Nothing is ever rounded: `1/3 + 1/6` is exactly `1/2`.
//!
//! If two numbers have different types, they are converted to the highest
//! type and then the result is calculated. The list of number types starting
//! from the highest:
//! * Rational intervals - `1/2:3/4`, `1.5[+-0.2]`
//! * Rational numbers - `3/4`, `2..3/4`, `1.25`, `0.1#6`
//! * Big integer numbers
//!
//! Two unreduced fractions (`Fraction`) stay fractions, mixed with anything
//! else a fraction acts as a rational number.
//!
//! Note: higher types are converted to lower ones after every operation.
//! Examples:
//! * `1/2 + 1/2` -> `1` - half and half is an integer one
//! * `(1:2) - (1:2) + 1` -> `0:2` - intervals collapse only to a single point
//! * `2:2` - an interval written explicitly is never collapsed
//!
//! Supported literals:
//! * integer `-42`
//! * fraction `3/4` and mixed number `2..3/4`
//! * decimal `1.25` and repeating decimal `0.12#45` (`#0` marks a terminating one)
//! * uncertain decimal `1.5[+-0.2]`, `1.5[+0.3,-0.1]`, `1.5[3,7]`
//! * interval `a:b` where `a` and `b` are any of the forms above
//! * exponent suffix `1.5E3`
//!
//! Operators (starting from highest priority):
//! * `^` - power, `**` - repeated self multiplication in interval form
//! * `!`, `!!` - factorial and double factorial
//! * `-` - unary minus
//! * `*`, `/`, `E` - multiplication, division, `x E n` is `x * 10^n`
//! * `+`, `-` - addition, subtraction
//!
//! Note: `**` and `^` differ for intervals: `(-1:1)^2` is `0:1` because one
//! number is squared, while `(-1:1)**2` is `-1:1`, a product of two numbers
//! taken independently from the interval

pub mod errors;
pub mod fraction;
pub mod integer;
pub mod interval;
pub mod parse;
pub mod rational;
pub mod value;

#[cfg(test)]
mod proptests;

pub use errors::{CalcError, CalcResult, ErrorKind};
pub use fraction::{Fraction, FractionInterval};
pub use integer::Integer;
pub use interval::RationalInterval;
pub use parse::{parse, parse_with, ParseOptions};
pub use rational::{Rational, RepeatingDecimal, DEFAULT_DECIMAL_DIGITS};
pub use value::Value;
