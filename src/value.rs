use num_bigint::BigInt;
use std::fmt;

use crate::errors::*;
use crate::fraction::{Fraction, FractionInterval};
use crate::integer::Integer;
use crate::interval::RationalInterval;
use crate::rational::{Rational, RepeatingDecimal};

/// Supported value types, from the narrowest one
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// Big integer number
    Int(Integer),
    /// Rational number in lowest terms
    Ratio(Rational),
    /// Closed interval with rational endpoints
    Interval(RationalInterval),
    /// Unreduced fraction
    Fraction(Fraction),
    /// Interval with unreduced fraction endpoints
    FractionInterval(FractionInterval),
}

// both operands converted to their common type
enum Pair {
    Ints(Integer, Integer),
    Ratios(Rational, Rational),
    Intervals(RationalInterval, RationalInterval),
    Fractions(Fraction, Fraction),
}

// Two fractions stay fractions. Everything else widens to the higher of
// integer, rational and interval; a fraction counts as a rational number
// and a fraction interval as an interval
fn coerce(lhs: &Value, rhs: &Value) -> Pair {
    match (lhs, rhs) {
        (Value::Fraction(a), Value::Fraction(b)) => Pair::Fractions(a.clone(), b.clone()),
        (Value::Int(a), Value::Int(b)) => Pair::Ints(a.clone(), b.clone()),
        _ => match (lhs.widen_to_rational(), rhs.widen_to_rational()) {
            (Some(a), Some(b)) => Pair::Ratios(a, b),
            _ => Pair::Intervals(lhs.to_interval(), rhs.to_interval()),
        },
    }
}

macro_rules! basic_op {
    ($id:ident, $method:ident) => {
        pub fn $id(&self, rhs: &Value) -> CalcResult {
            match coerce(self, rhs) {
                Pair::Ints(a, b) => Ok(Value::Int(a.$method(&b))),
                Pair::Ratios(a, b) => Ok(Value::Ratio(a.$method(&b))),
                Pair::Intervals(a, b) => Ok(Value::Interval(a.$method(&b))),
                Pair::Fractions(a, b) => Ok(Value::Fraction(a.$method(&b)?)),
            }
        }
    };
}

impl Default for Value {
    fn default() -> Value {
        Value::Int(Integer::zero())
    }
}

impl Value {
    pub fn new() -> Self {
        Default::default()
    }

    // None for interval types: widening never narrows a value
    fn widen_to_rational(&self) -> Option<Rational> {
        match self {
            Value::Int(i) => Some(i.to_rational()),
            Value::Ratio(r) => Some(r.clone()),
            Value::Fraction(f) => Some(f.to_rational()),
            Value::Interval(..) | Value::FractionInterval(..) => None,
        }
    }

    /// Converts any value to an interval, numbers become point intervals
    pub fn to_interval(&self) -> RationalInterval {
        match self {
            Value::Int(i) => RationalInterval::point(i.to_rational()),
            Value::Ratio(r) => RationalInterval::point(r.clone()),
            Value::Interval(i) => i.clone(),
            Value::Fraction(f) => RationalInterval::point(f.to_rational()),
            Value::FractionInterval(fi) => fi.to_rational_interval(),
        }
    }

    /// Returns the exact integer the value is equal to, if any
    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Value::Int(i) => Some(i.clone()),
            Value::Ratio(r) => r.to_integer(),
            Value::Fraction(f) => f.to_rational().to_integer(),
            Value::Interval(..) | Value::FractionInterval(..) => {
                let i = self.to_interval();
                if i.is_point() {
                    i.low().to_integer()
                } else {
                    None
                }
            }
        }
    }

    /// Returns true if the value is exactly zero
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(i) => i.is_zero(),
            Value::Ratio(r) => r.is_zero(),
            Value::Fraction(f) => f.is_zero(),
            Value::Interval(..) | Value::FractionInterval(..) => {
                let i = self.to_interval();
                i.is_point() && i.low().is_zero()
            }
        }
    }

    /// Collapses the value to the narrowest type that represents it exactly:
    /// a point interval becomes a rational number, a rational number with
    /// denominator 1 becomes an integer. Fractions are never collapsed
    pub fn promote(self) -> Value {
        match self {
            Value::Interval(i) if i.is_point() => Value::Ratio(i.low().clone()).promote(),
            Value::Ratio(r) => match r.to_integer() {
                Some(i) => Value::Int(i),
                None => Value::Ratio(r),
            },
            v => v,
        }
    }

    basic_op!(addition, add);
    basic_op!(subtract, subtract);

    pub fn multiply(&self, rhs: &Value) -> CalcResult {
        match coerce(self, rhs) {
            Pair::Ints(a, b) => Ok(Value::Int(a.multiply(&b))),
            Pair::Ratios(a, b) => Ok(Value::Ratio(a.multiply(&b))),
            Pair::Intervals(a, b) => Ok(Value::Interval(a.multiply(&b))),
            Pair::Fractions(a, b) => Ok(Value::Fraction(a.multiply(&b))),
        }
    }

    /// Integer division gives an integer only when it is exact
    pub fn divide(&self, rhs: &Value) -> CalcResult {
        match coerce(self, rhs) {
            Pair::Ints(a, b) => a.divide(&b),
            Pair::Ratios(a, b) => Ok(Value::Ratio(a.divide(&b)?)),
            Pair::Intervals(a, b) => Ok(Value::Interval(a.divide(&b)?)),
            Pair::Fractions(a, b) => Ok(Value::Fraction(a.divide(&b)?)),
        }
    }

    /// Inverts the sign of the value
    pub fn negate(&self) -> CalcResult {
        match self {
            Value::Int(i) => Ok(Value::Int(i.negate())),
            Value::Ratio(r) => Ok(Value::Ratio(r.negate())),
            Value::Interval(i) => Ok(Value::Interval(i.negate())),
            Value::Fraction(f) => Ok(Value::Fraction(f.negate())),
            Value::FractionInterval(fi) => Ok(Value::Interval(fi.to_rational_interval().negate())),
        }
    }

    /// Raises the value to an integer power. For intervals the result is
    /// the range of `x^exp` for one `x` from the interval
    pub fn power(&self, exp: &BigInt) -> CalcResult {
        match self {
            Value::Int(i) => i.pow(exp),
            Value::Ratio(r) => Ok(Value::Ratio(r.pow(exp)?)),
            Value::Interval(i) => Ok(Value::Interval(i.pow(exp)?)),
            Value::Fraction(f) => Ok(Value::Fraction(f.pow(exp)?)),
            Value::FractionInterval(fi) => Ok(Value::Interval(fi.to_rational_interval().pow(exp)?)),
        }
    }

    /// Multiplies the value by itself `exp` times in interval form
    pub fn mpower(&self, exp: &BigInt) -> CalcResult {
        Ok(Value::Interval(self.to_interval().mpow(exp)?))
    }

    fn integer_for_factorial(&self) -> Result<Integer, CalcError> {
        match self.as_integer() {
            Some(i) => Ok(i),
            None => Err(CalcError::UndefinedFactorial(format!("non-integer {}", self))),
        }
    }

    /// Returns factorial of a number.
    /// Only exact non-negative integers are supported
    pub fn fact(&self) -> CalcResult {
        let i = self.integer_for_factorial()?;
        Ok(Value::Int(i.factorial()?))
    }

    pub fn double_fact(&self) -> CalcResult {
        let i = self.integer_for_factorial()?;
        Ok(Value::Int(i.double_factorial()?))
    }

    /// `value E exp` - multiplies by `10^exp`, `exp` must be an integer
    pub fn e_notation(&self, exp: &Value) -> CalcResult {
        let exp = match exp.as_integer() {
            Some(i) => i,
            None => return Err(CalcError::Syntax(format!("E exponent {} is not an integer", exp))),
        };
        let scale = Rational::one().e_notation(exp.value());
        self.multiply(&Value::Ratio(scale))
    }

    //---------------------------------------------

    pub fn to_decimal(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Ratio(r) => r.to_decimal(),
            Value::Interval(i) => i.to_decimal(),
            Value::Fraction(f) => f.to_rational().to_decimal(),
            Value::FractionInterval(fi) => fi.to_rational_interval().to_decimal(),
        }
    }

    /// For intervals both endpoints are expanded, the period is the longer one
    pub fn to_repeating_decimal_with_period(&self) -> RepeatingDecimal {
        let interval = match self {
            Value::Int(i) => {
                return RepeatingDecimal {
                    decimal: i.to_string(),
                    period: 0,
                }
            }
            Value::Ratio(r) => return r.to_repeating_decimal_with_period(),
            Value::Fraction(f) => return f.to_rational().to_repeating_decimal_with_period(),
            Value::Interval(i) => i.clone(),
            Value::FractionInterval(fi) => fi.to_rational_interval(),
        };
        let lo = interval.low().to_repeating_decimal_with_period();
        let hi = interval.high().to_repeating_decimal_with_period();
        RepeatingDecimal {
            decimal: format!("{}:{}", lo.decimal, hi.decimal),
            period: lo.period.max(hi.period),
        }
    }

    pub fn to_mixed_string(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Ratio(r) => r.to_mixed_string(),
            Value::Interval(i) => i.to_mixed_string(),
            Value::Fraction(f) => f.to_rational().to_mixed_string(),
            Value::FractionInterval(fi) => fi.to_rational_interval().to_mixed_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Ratio(r) => write!(f, "{}", r),
            Value::Interval(i) => write!(f, "{}", i),
            Value::Fraction(fr) => write!(f, "{}", fr),
            Value::FractionInterval(fi) => write!(f, "{}", fi),
        }
    }
}

impl From<Integer> for Value {
    fn from(i: Integer) -> Self {
        Value::Int(i)
    }
}

impl From<Rational> for Value {
    fn from(r: Rational) -> Self {
        Value::Ratio(r)
    }
}

impl From<RationalInterval> for Value {
    fn from(i: RationalInterval) -> Self {
        Value::Interval(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Value {
        Value::Int(Integer::from(i))
    }

    fn ratio(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d)).unwrap()
    }

    fn interval(a: (i64, i64), b: (i64, i64)) -> Value {
        Value::Interval(RationalInterval::new(ratio(a.0, a.1), ratio(b.0, b.1)))
    }

    fn frac(n: i64, d: i64) -> Value {
        Value::Fraction(Fraction::new(BigInt::from(n), BigInt::from(d)).unwrap())
    }

    #[test]
    fn test_add() {
        let r = int(3).addition(&int(4));
        assert_eq!(r, Ok(int(7)));
        let r = int(3).addition(&Value::Ratio(ratio(4, 5)));
        assert_eq!(r, Ok(Value::Ratio(ratio(19, 5))));
        let r = Value::Ratio(ratio(1, 2)).addition(&interval((1, 1), (2, 1)));
        assert_eq!(r, Ok(interval((3, 2), (5, 2))));
        let r = frac(1, 4).addition(&frac(2, 4));
        assert_eq!(r, Ok(frac(3, 4)));
        let r = frac(1, 2).addition(&int(1));
        assert_eq!(r, Ok(Value::Ratio(ratio(3, 2))));
        assert!(frac(1, 2).addition(&frac(1, 3)).is_err());
    }

    #[test]
    fn test_sub() {
        let r = int(3).subtract(&int(4));
        assert_eq!(r, Ok(int(-1)));
        let r = int(3).subtract(&interval((1, 1), (2, 1)));
        assert_eq!(r, Ok(interval((1, 1), (2, 1))));
    }

    #[test]
    fn test_mul() {
        let r = int(3).multiply(&Value::Ratio(ratio(4, 5)));
        assert_eq!(r, Ok(Value::Ratio(ratio(12, 5))));
        let r = interval((-1, 1), (2, 1)).multiply(&int(-2));
        assert_eq!(r, Ok(interval((-4, 1), (2, 1))));
        let r = frac(1, 2).multiply(&frac(2, 4));
        assert_eq!(r, Ok(frac(2, 8)));
    }

    #[test]
    fn test_div() {
        assert_eq!(int(12).divide(&int(4)), Ok(int(3)));
        assert_eq!(int(3).divide(&int(4)), Ok(Value::Ratio(ratio(3, 4))));
        let r = int(3).divide(&Value::Ratio(ratio(4, 5)));
        assert_eq!(r, Ok(Value::Ratio(ratio(15, 4))));
        let e = int(1).divide(&interval((-1, 1), (1, 1))).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::DivisionByZero);
        assert!(Value::Ratio(ratio(1, 2)).divide(&int(0)).is_err());
    }

    #[test]
    fn test_promote() {
        let v = interval((3, 1), (3, 1)).promote();
        assert_eq!(v, int(3));
        let v = interval((1, 2), (1, 2)).promote();
        assert_eq!(v, Value::Ratio(ratio(1, 2)));
        assert_eq!(v.clone().promote(), v);
        let v = frac(4, 2).promote();
        assert_eq!(v, frac(4, 2));
        let v = interval((1, 2), (1, 1));
        assert_eq!(v.clone().promote(), v);
    }

    #[test]
    fn test_power() {
        assert_eq!(int(2).power(&BigInt::from(10)), Ok(int(1024)));
        assert_eq!(int(2).power(&BigInt::from(-1)), Ok(Value::Ratio(ratio(1, 2))));
        let s = interval((-1, 1), (1, 1));
        assert_eq!(s.power(&BigInt::from(2)), Ok(interval((0, 1), (1, 1))));
        assert_eq!(s.mpower(&BigInt::from(2)), Ok(s.clone()));
        assert_eq!(int(2).mpower(&BigInt::from(3)), Ok(interval((8, 1), (8, 1))));
        assert_eq!(int(0).power(&BigInt::from(0)).unwrap_err().kind(), ErrorKind::UndefinedPower);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(int(5).fact(), Ok(int(120)));
        assert_eq!(int(5).double_fact(), Ok(int(15)));
        assert_eq!(interval((4, 1), (4, 1)).fact(), Ok(int(24)));
        assert_eq!(
            Value::Ratio(ratio(1, 2)).fact().unwrap_err().kind(),
            ErrorKind::UndefinedFactorial
        );
        assert_eq!(int(-1).fact().unwrap_err().kind(), ErrorKind::UndefinedFactorial);
    }

    #[test]
    fn test_e_notation() {
        let r = Value::Ratio(ratio(3, 2)).e_notation(&int(3));
        assert_eq!(r.map(Value::promote), Ok(int(1500)));
        let r = int(15).e_notation(&int(-1));
        assert_eq!(r, Ok(Value::Ratio(ratio(3, 2))));
        assert!(int(1).e_notation(&Value::Ratio(ratio(1, 2))).is_err());
    }

    #[test]
    fn test_to_str() {
        assert_eq!(int(-42).to_string(), "-42");
        assert_eq!(Value::Ratio(ratio(-3, 4)).to_string(), "-3/4");
        assert_eq!(interval((1, 2), (3, 4)).to_string(), "1/2:3/4");
        assert_eq!(frac(2, 4).to_string(), "2/4");
        assert_eq!(Value::Ratio(ratio(1, 8)).to_decimal(), "0.125");
        assert_eq!(Value::Ratio(ratio(11, 4)).to_mixed_string(), "2..3/4");
        let rd = interval((1, 3), (1, 2)).to_repeating_decimal_with_period();
        assert_eq!(rd.decimal, "0.#3:0.5#0");
        assert_eq!(rd.period, 1);
        let rd = int(7).to_repeating_decimal_with_period();
        assert_eq!(rd.decimal, "7");
    }
}
