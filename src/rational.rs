use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use crate::errors::*;
use crate::integer::{big_pow, Integer};

/// Number of fractional digits `to_decimal` produces before truncating
pub const DEFAULT_DECIMAL_DIGITS: usize = 20;

lazy_static! {
    static ref INTEGER_RE: Regex = Regex::new(r"^-?\d+$").unwrap();
    static ref FRACTION_RE: Regex = Regex::new(r"^(-?\d+)/(-?\d+)$").unwrap();
    static ref DECIMAL_RE: Regex = Regex::new(r"^(-?)(\d+)\.(\d+)$").unwrap();
    static ref REPEATING_RE: Regex = Regex::new(r"^(-?)(\d+)\.(\d*)#(\d+)$").unwrap();
    static ref MIXED_RE: Regex = Regex::new(r"^(-?)(\d+)\.\.(\d+)/(\d+)$").unwrap();
}

/// Decimal expansion in `int.nonrepeating#repeating` form and the length of
/// its repeating block (0 for terminating expansions and integers)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepeatingDecimal {
    pub decimal: String,
    pub period: usize,
}

/// Exact fraction kept in lowest terms with a positive denominator.
/// Zero is always `0/1`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rational(BigRational);

// empty string is zero: "5.#3" has no non-repeating digits
fn digits_to_big(s: &str) -> Result<BigInt, CalcError> {
    if s.is_empty() {
        return Ok(BigInt::zero());
    }
    match BigInt::parse_bytes(s.as_bytes(), 10) {
        Some(i) => Ok(i),
        None => Err(CalcError::Format(format!("'{}' is not a digit sequence", s))),
    }
}

fn ten_pow(exp: usize) -> BigInt {
    big_pow(&BigInt::from(10), &BigInt::from(exp))
}

fn capture<'t>(c: &Captures<'t>, idx: usize) -> &'t str {
    c.get(idx).map_or("", |m| m.as_str())
}

impl Rational {
    /// Creates a normalized rational number. Zero denominator is an error
    pub fn new(numerator: BigInt, denominator: BigInt) -> Result<Rational, CalcError> {
        if denominator.is_zero() {
            return Err(CalcError::DividedByZero(format!("{}/0", numerator)));
        }
        Ok(Rational(BigRational::new(numerator, denominator)))
    }

    pub fn from_integer(i: &Integer) -> Rational {
        Rational(BigRational::from_integer(i.value().clone()))
    }

    pub fn from_bigint(i: BigInt) -> Rational {
        Rational(BigRational::from_integer(i))
    }

    pub fn zero() -> Rational {
        Rational(BigRational::zero())
    }

    pub fn one() -> Rational {
        Rational(BigRational::one())
    }

    pub(crate) fn from_ratio(r: BigRational) -> Rational {
        Rational(r)
    }

    /// `[-]int.frac`, both parts are plain digit strings
    pub(crate) fn from_decimal_parts(negative: bool, int_part: &str, frac: &str) -> Result<Rational, CalcError> {
        let mut num = digits_to_big(int_part)? * ten_pow(frac.len()) + digits_to_big(frac)?;
        if negative {
            num = -num;
        }
        Rational::new(num, ten_pow(frac.len()))
    }

    /// `[-]int.nonrep#rep`; the repeating block `0` makes a terminating decimal
    pub(crate) fn from_repeating_parts(
        negative: bool,
        int_part: &str,
        nonrep: &str,
        rep: &str,
    ) -> Result<Rational, CalcError> {
        if rep.is_empty() {
            return Err(CalcError::Format(format!("{}.{}# has no repeating digits", int_part, nonrep)));
        }
        let head = Rational::from_decimal_parts(false, int_part, nonrep)?;
        let period = ten_pow(rep.len()) - BigInt::one();
        let tail = Rational::new(digits_to_big(rep)?, ten_pow(nonrep.len()) * period)?;
        let res = head.add(&tail);
        Ok(if negative { res.negate() } else { res })
    }

    /// `[-]whole..num/den`, the sign applies to the whole number
    pub(crate) fn from_mixed_parts(negative: bool, whole: &str, num: &str, den: &str) -> Result<Rational, CalcError> {
        let frac = Rational::new(digits_to_big(num)?, digits_to_big(den)?)?;
        let res = Rational::from_bigint(digits_to_big(whole)?).add(&frac);
        Ok(if negative { res.negate() } else { res })
    }

    /// Parses the output of `to_repeating_decimal` back: integers, plain
    /// decimals and `int.nonrepeating#repeating`
    pub fn from_repeating_decimal(s: &str) -> Result<Rational, CalcError> {
        let s = s.trim();
        if INTEGER_RE.is_match(s) {
            return Ok(Rational::from_bigint(digits_to_big(s)?));
        }
        if let Some(c) = REPEATING_RE.captures(s) {
            return Rational::from_repeating_parts(
                !capture(&c, 1).is_empty(),
                capture(&c, 2),
                capture(&c, 3),
                capture(&c, 4),
            );
        }
        if let Some(c) = DECIMAL_RE.captures(s) {
            return Rational::from_decimal_parts(!capture(&c, 1).is_empty(), capture(&c, 2), capture(&c, 3));
        }
        Err(CalcError::Format(format!("'{}' is not a repeating decimal", s)))
    }

    pub fn numerator(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denominator(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn inner(&self) -> &BigRational {
        &self.0
    }

    pub fn into_inner(self) -> BigRational {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn to_integer(&self) -> Option<Integer> {
        if self.is_integer() {
            Some(Integer::new(self.0.numer().clone()))
        } else {
            None
        }
    }

    pub fn floor(&self) -> Integer {
        Integer::new(self.0.floor().to_integer())
    }

    pub fn ceil(&self) -> Integer {
        Integer::new(self.0.ceil().to_integer())
    }

    pub fn negate(&self) -> Rational {
        Rational(-&self.0)
    }

    pub fn abs(&self) -> Rational {
        Rational(self.0.abs())
    }

    pub fn add(&self, rhs: &Rational) -> Rational {
        Rational(&self.0 + &rhs.0)
    }

    pub fn subtract(&self, rhs: &Rational) -> Rational {
        Rational(&self.0 - &rhs.0)
    }

    pub fn multiply(&self, rhs: &Rational) -> Rational {
        Rational(&self.0 * &rhs.0)
    }

    pub fn divide(&self, rhs: &Rational) -> Result<Rational, CalcError> {
        if rhs.is_zero() {
            return Err(CalcError::DividedByZero(format!("{}", self)));
        }
        Ok(Rational(&self.0 / &rhs.0))
    }

    pub fn reciprocal(&self) -> Result<Rational, CalcError> {
        if self.is_zero() {
            return Err(CalcError::DividedByZero("reciprocal of 0".to_string()));
        }
        Ok(Rational(self.0.recip()))
    }

    /// Raises to an integer power: numerator and denominator are raised
    /// independently, negative powers go through the reciprocal
    pub fn pow(&self, exp: &BigInt) -> Result<Rational, CalcError> {
        if self.is_zero() && !exp.is_positive() {
            if exp.is_zero() {
                return Err(CalcError::UndefinedPower("0^0".to_string()));
            }
            return Err(CalcError::UndefinedPower(format!("0^{}", exp)));
        }
        if exp.is_negative() {
            return self.reciprocal()?.pow(&-exp);
        }
        // powers of coprime numbers stay coprime, no reduction needed
        let num = big_pow(self.0.numer(), exp);
        let den = big_pow(self.0.denom(), exp);
        Ok(Rational(BigRational::new_raw(num, den)))
    }

    /// `(a+c)/(b+d)` for `a/b` and `c/d`
    pub fn mediant(&self, other: &Rational) -> Rational {
        let num = self.0.numer() + other.0.numer();
        let den = self.0.denom() + other.0.denom();
        Rational(BigRational::new(num, den))
    }

    /// Multiplies by `10^exp`
    pub fn e_notation(&self, exp: &BigInt) -> Rational {
        let scale = BigRational::from_integer(big_pow(&BigInt::from(10), &exp.abs()));
        if exp.is_negative() {
            Rational(&self.0 / scale)
        } else {
            Rational(&self.0 * scale)
        }
    }

    /// Decimal representation with at most 20 fractional digits. Longer
    /// expansions are truncated, not rounded
    pub fn to_decimal(&self) -> String {
        self.to_decimal_with_precision(DEFAULT_DECIMAL_DIGITS)
    }

    pub fn to_decimal_with_precision(&self, precision: usize) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.numer().abs();
        let den = self.0.denom();
        let int_part = &num / den;
        let mut rem = &num % den;
        let ten = BigInt::from(10);
        let mut digits = String::new();
        for _ in 0..precision {
            if rem.is_zero() {
                break;
            }
            rem *= &ten;
            digits.push_str(&(&rem / den).to_string());
            rem %= den;
        }
        if digits.is_empty() {
            if int_part.is_zero() {
                return "0".to_string();
            }
            return format!("{}{}", sign, int_part);
        }
        format!("{}{}.{}", sign, int_part, digits)
    }

    pub fn to_repeating_decimal(&self) -> String {
        self.to_repeating_decimal_with_period().decimal
    }

    /// Exact decimal expansion. Long division stops either on zero
    /// remainder (the expansion terminates and gets the `#0` marker) or on
    /// a remainder seen before: its first position starts the cycle
    pub fn to_repeating_decimal_with_period(&self) -> RepeatingDecimal {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.numer().abs();
        let den = self.0.denom();
        let int_part = &num / den;
        let mut rem = &num % den;
        if rem.is_zero() {
            return RepeatingDecimal {
                decimal: format!("{}", self.0.numer()),
                period: 0,
            };
        }

        let ten = BigInt::from(10);
        let mut seen: HashMap<BigInt, usize> = HashMap::new();
        let mut digits = String::new();
        loop {
            if rem.is_zero() {
                return RepeatingDecimal {
                    decimal: format!("{}{}.{}#0", sign, int_part, digits),
                    period: 0,
                };
            }
            if let Some(&start) = seen.get(&rem) {
                let (head, cycle) = digits.split_at(start);
                return RepeatingDecimal {
                    decimal: format!("{}{}.{}#{}", sign, int_part, head, cycle),
                    period: cycle.len(),
                };
            }
            seen.insert(rem.clone(), digits.len());
            rem *= &ten;
            digits.push_str(&(&rem / den).to_string());
            rem %= den;
        }
    }

    /// `whole..num/den` for improper fractions, `num/den` for proper ones
    pub fn to_mixed_string(&self) -> String {
        if self.is_integer() {
            return format!("{}", self.0.numer());
        }
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.0.numer().abs();
        let den = self.0.denom();
        let whole = &num / den;
        if whole.is_zero() {
            return format!("{}", self);
        }
        format!("{}{}..{}/{}", sign, whole, &num % den, den)
    }
}

impl From<i64> for Rational {
    fn from(v: i64) -> Self {
        Rational(BigRational::from_integer(BigInt::from(v)))
    }
}

impl From<Integer> for Rational {
    fn from(v: Integer) -> Self {
        Rational(BigRational::from_integer(v.into_inner()))
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.denom().is_one() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl FromStr for Rational {
    type Err = CalcError;

    /// Supported formats:
    /// * Integer number - `-12`
    /// * Fraction - `3/4`, `-3/4`
    /// * Decimal number - `1.25`
    /// * Mixed number - `2..3/4` = two and three quarters, `-2..3/4` is
    ///   minus two and three quarters
    /// * Repeating decimal - `0.1#6` = `1/6`
    fn from_str(st: &str) -> Result<Self, CalcError> {
        let s = st.trim();
        if INTEGER_RE.is_match(s) {
            return Rational::from_repeating_decimal(s);
        }
        if let Some(c) = MIXED_RE.captures(s) {
            return Rational::from_mixed_parts(
                !capture(&c, 1).is_empty(),
                capture(&c, 2),
                capture(&c, 3),
                capture(&c, 4),
            );
        }
        if s.contains("..") {
            return Err(CalcError::Format(format!("invalid mixed number '{}'", s)));
        }
        if REPEATING_RE.is_match(s) || DECIMAL_RE.is_match(s) {
            return Rational::from_repeating_decimal(s);
        }
        if s.matches('.').count() > 1 {
            return Err(CalcError::Format(format!("multiple decimal points in '{}'", s)));
        }
        if let Some(c) = FRACTION_RE.captures(s) {
            return Rational::new(digits_to_big(capture(&c, 1))?, digits_to_big(capture(&c, 2))?);
        }
        Err(CalcError::Format(format!("'{}' is not a rational number", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d)).unwrap()
    }

    #[test]
    fn test_normalize() {
        let r = ratio(6, -8);
        assert_eq!(r.numerator(), &BigInt::from(-3));
        assert_eq!(r.denominator(), &BigInt::from(4));
        let z = ratio(0, -5);
        assert_eq!(z.numerator(), &BigInt::zero());
        assert_eq!(z.denominator(), &BigInt::one());
        let e = Rational::new(BigInt::one(), BigInt::zero()).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_ratio_str() {
        assert_eq!("3/4".parse::<Rational>(), Ok(ratio(3, 4)));
        assert_eq!("-6/8".parse::<Rational>(), Ok(ratio(-3, 4)));
        assert_eq!("3/-4".parse::<Rational>(), Ok(ratio(-3, 4)));
        assert_eq!("42".parse::<Rational>(), Ok(ratio(42, 1)));
        assert_eq!("1.25".parse::<Rational>(), Ok(ratio(5, 4)));
        assert_eq!("-0.5".parse::<Rational>(), Ok(ratio(-1, 2)));
        assert_eq!("2..3/4".parse::<Rational>(), Ok(ratio(11, 4)));
        assert_eq!("-2..3/4".parse::<Rational>(), Ok(ratio(-11, 4)));
        assert_eq!("0.1#6".parse::<Rational>(), Ok(ratio(1, 6)));
        assert_eq!("0.#3".parse::<Rational>(), Ok(ratio(1, 3)));
        assert_eq!("1.5#0".parse::<Rational>(), Ok(ratio(3, 2)));
    }

    #[test]
    fn test_ratio_str_errors() {
        let e = "2...3/4".parse::<Rational>().unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Format);
        let e = "1.2.3".parse::<Rational>().unwrap_err();
        assert_eq!(e, CalcError::Format("multiple decimal points in '1.2.3'".to_string()));
        assert_eq!("1x".parse::<Rational>().unwrap_err().kind(), ErrorKind::Format);
        assert_eq!("1/0".parse::<Rational>().unwrap_err().kind(), ErrorKind::DivisionByZero);
        assert_eq!("2..3/0".parse::<Rational>().unwrap_err().kind(), ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_arith() {
        assert_eq!(ratio(1, 2).add(&ratio(1, 3)), ratio(5, 6));
        assert_eq!(ratio(1, 2).subtract(&ratio(1, 3)), ratio(1, 6));
        assert_eq!(ratio(2, 3).multiply(&ratio(3, 4)), ratio(1, 2));
        assert_eq!(ratio(2, 3).divide(&ratio(4, 3)), Ok(ratio(1, 2)));
        assert!(ratio(2, 3).divide(&Rational::zero()).is_err());
        assert_eq!(ratio(-2, 3).reciprocal(), Ok(ratio(-3, 2)));
        assert!(Rational::zero().reciprocal().is_err());
        assert_eq!(ratio(-2, 3).abs(), ratio(2, 3));
        assert_eq!(-ratio(2, 3), ratio(-2, 3));
    }

    #[test]
    fn test_power() {
        assert_eq!(ratio(2, 3).pow(&BigInt::from(2)), Ok(ratio(4, 9)));
        assert_eq!(ratio(-2, 3).pow(&BigInt::from(3)), Ok(ratio(-8, 27)));
        assert_eq!(ratio(-2, 3).pow(&BigInt::from(-2)), Ok(ratio(9, 4)));
        assert_eq!(ratio(2, 3).pow(&BigInt::from(0)), Ok(Rational::one()));
        assert_eq!(Rational::zero().pow(&BigInt::from(0)).unwrap_err().kind(), ErrorKind::UndefinedPower);
        assert_eq!(Rational::zero().pow(&BigInt::from(-1)).unwrap_err().kind(), ErrorKind::UndefinedPower);
    }

    #[test]
    fn test_order() {
        assert!(ratio(1, 3) < ratio(1, 2));
        assert!(ratio(-1, 2) < ratio(-1, 3));
        assert_eq!(ratio(7, 2).floor(), Integer::from(3));
        assert_eq!(ratio(-7, 2).floor(), Integer::from(-4));
        assert_eq!(ratio(-7, 2).ceil(), Integer::from(-3));
        assert_eq!(ratio(1, 2).mediant(&ratio(2, 3)), ratio(3, 5));
    }

    #[test]
    fn test_e_notation() {
        assert_eq!(ratio(3, 2).e_notation(&BigInt::from(3)), ratio(1500, 1));
        assert_eq!(ratio(3, 2).e_notation(&BigInt::from(-2)), ratio(3, 200));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(ratio(1, 4).to_decimal(), "0.25");
        assert_eq!(ratio(-1, 4).to_decimal(), "-0.25");
        assert_eq!(ratio(5, 1).to_decimal(), "5");
        assert_eq!(ratio(1, 3).to_decimal(), "0.33333333333333333333");
        assert_eq!(ratio(2, 3).to_decimal(), "0.66666666666666666666");
        assert_eq!(ratio(2, 3).to_decimal_with_precision(3), "0.666");
        assert_eq!(Rational::zero().to_decimal(), "0");
    }

    #[test]
    fn test_repeating() {
        let r = ratio(1, 30).to_repeating_decimal_with_period();
        assert_eq!(r.decimal, "0.0#3");
        assert_eq!(r.period, 1);
        let r = ratio(1, 7).to_repeating_decimal_with_period();
        assert_eq!(r.decimal, "0.#142857");
        assert_eq!(r.period, 6);
        let r = ratio(-5, 4).to_repeating_decimal_with_period();
        assert_eq!(r.decimal, "-1.25#0");
        assert_eq!(r.period, 0);
        assert_eq!(ratio(-7, 1).to_repeating_decimal(), "-7");
        assert_eq!(ratio(41, 333).to_repeating_decimal(), "0.#123");
        assert_eq!(ratio(1, 6).to_repeating_decimal(), "0.1#6");
    }

    #[test]
    fn test_repeating_roundtrip() {
        for r in [ratio(1, 30), ratio(-22, 7), ratio(5, 4), ratio(9, 1), ratio(-1, 3)].iter() {
            let s = r.to_repeating_decimal();
            assert_eq!(Rational::from_repeating_decimal(&s).as_ref(), Ok(r));
        }
        assert!(Rational::from_repeating_decimal("1/2").is_err());
    }

    #[test]
    fn test_mixed_string() {
        assert_eq!(ratio(11, 4).to_mixed_string(), "2..3/4");
        assert_eq!(ratio(-11, 4).to_mixed_string(), "-2..3/4");
        assert_eq!(ratio(3, 4).to_mixed_string(), "3/4");
        assert_eq!(ratio(-3, 4).to_mixed_string(), "-3/4");
        assert_eq!(ratio(8, 4).to_mixed_string(), "2");
    }

    #[test]
    fn test_to_str() {
        assert_eq!(ratio(-3, 4).to_string(), "-3/4");
        assert_eq!(ratio(8, 4).to_string(), "2");
    }
}
