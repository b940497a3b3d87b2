use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use crate::errors::*;
use crate::rational::Rational;
use crate::value::Value;

/// Exact arbitrary precision whole number
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Integer(BigInt);

/// Raises `base` to a non-negative power using binary exponentiation.
/// A negative `exp` is treated as zero, callers check the sign beforehand
pub(crate) fn big_pow(base: &BigInt, exp: &BigInt) -> BigInt {
    let mut res = BigInt::one();
    if !exp.is_positive() {
        return res;
    }
    let two = BigInt::from(2);
    let mut pow = exp.clone();
    let mut base = base.clone();
    while pow > BigInt::zero() {
        if pow.clone() % &two == BigInt::zero() {
            pow /= &two;
            base = &base * &base;
        } else {
            pow -= BigInt::one();
            res *= &base;
        }
    }
    res
}

/// Greatest common divisor of absolute values, Euclid's algorithm
pub(crate) fn big_gcd(a: &BigInt, b: &BigInt) -> BigInt {
    let mut v1 = a.abs();
    let mut v2 = b.abs();
    loop {
        if v1.is_zero() {
            return v2;
        }
        if v2.is_zero() {
            return v1;
        }
        if v1 < v2 {
            std::mem::swap(&mut v1, &mut v2);
        }
        let m = v1 % &v2;
        v1 = v2;
        v2 = m;
    }
}

pub(crate) fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

impl Integer {
    pub fn new(value: BigInt) -> Self {
        Integer(value)
    }

    pub fn zero() -> Self {
        Integer(BigInt::zero())
    }

    pub fn one() -> Self {
        Integer(BigInt::one())
    }

    pub fn value(&self) -> &BigInt {
        &self.0
    }

    pub fn into_inner(self) -> BigInt {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Returns -1, 0 or 1
    pub fn signum(&self) -> i8 {
        if self.0.is_zero() {
            0
        } else if self.0.is_negative() {
            -1
        } else {
            1
        }
    }

    pub fn abs(&self) -> Integer {
        Integer(self.0.abs())
    }

    pub fn negate(&self) -> Integer {
        Integer(-&self.0)
    }

    pub fn add(&self, rhs: &Integer) -> Integer {
        Integer(&self.0 + &rhs.0)
    }

    pub fn subtract(&self, rhs: &Integer) -> Integer {
        Integer(&self.0 - &rhs.0)
    }

    pub fn multiply(&self, rhs: &Integer) -> Integer {
        Integer(&self.0 * &rhs.0)
    }

    /// Exact quotient as an integer when `rhs` divides `self`, otherwise
    /// the quotient is returned as a rational number
    pub fn divide(&self, rhs: &Integer) -> CalcResult {
        if rhs.is_zero() {
            return Err(CalcError::DividedByZero(format!("{}", self)));
        }
        if (&self.0 % &rhs.0).is_zero() {
            return Ok(Value::Int(Integer(&self.0 / &rhs.0)));
        }
        let r = Rational::new(self.0.clone(), rhs.0.clone())?;
        Ok(Value::Ratio(r))
    }

    /// Remainder of truncated division, it has the sign of `self`
    pub fn modulo(&self, rhs: &Integer) -> Result<Integer, CalcError> {
        if rhs.is_zero() {
            return Err(CalcError::DividedByZero(format!("{} modulo 0", self)));
        }
        Ok(Integer(&self.0 % &rhs.0))
    }

    /// Raises the number to an integer power.
    /// A negative power produces a rational number `1/self^|exp|`
    pub fn pow(&self, exp: &BigInt) -> CalcResult {
        if self.is_zero() && !exp.is_positive() {
            if exp.is_zero() {
                return Err(CalcError::UndefinedPower("0^0".to_string()));
            }
            return Err(CalcError::UndefinedPower(format!("0^{}", exp)));
        }
        if exp.is_negative() {
            let den = big_pow(&self.0, &-exp);
            let r = Rational::new(BigInt::one(), den)?;
            return Ok(Value::Ratio(r));
        }
        Ok(Value::Int(Integer(big_pow(&self.0, exp))))
    }

    /// Greatest common divisor, always non-negative
    pub fn gcd(&self, rhs: &Integer) -> Integer {
        Integer(big_gcd(&self.0, &rhs.0))
    }

    /// Least common multiple, `lcm(0, x) == 0`
    pub fn lcm(&self, rhs: &Integer) -> Integer {
        if self.is_zero() || rhs.is_zero() {
            return Integer::zero();
        }
        let gcd = big_gcd(&self.0, &rhs.0);
        Integer(self.0.abs() / gcd * rhs.0.abs())
    }

    pub fn factorial(&self) -> Result<Integer, CalcError> {
        self.step_product(1)
    }

    /// `n!! = n * (n-2) * (n-4) * ...`
    pub fn double_factorial(&self) -> Result<Integer, CalcError> {
        self.step_product(2)
    }

    fn step_product(&self, step: u32) -> Result<Integer, CalcError> {
        if self.is_negative() {
            return Err(CalcError::UndefinedFactorial(format!("negative number {}", self)));
        }
        let step = BigInt::from(step);
        let mut res = BigInt::one();
        let mut cnt = self.0.clone();
        while cnt > BigInt::one() {
            res *= &cnt;
            cnt -= &step;
        }
        Ok(Integer(res))
    }

    pub fn to_rational(&self) -> Rational {
        Rational::from_integer(self)
    }
}

impl From<BigInt> for Integer {
    fn from(v: BigInt) -> Self {
        Integer(v)
    }
}

impl From<i64> for Integer {
    fn from(v: i64) -> Self {
        Integer(BigInt::from(v))
    }
}

impl Neg for Integer {
    type Output = Integer;
    fn neg(self) -> Integer {
        Integer(-self.0)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Integer {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, CalcError> {
        let s = s.trim();
        let digits = s.strip_prefix('-').unwrap_or(s);
        if !is_digits(digits) {
            return Err(CalcError::Format(format!("'{}' is not an integer", s)));
        }
        match BigInt::from_str(s) {
            Ok(i) => Ok(Integer(i)),
            Err(..) => Err(CalcError::Format(format!("'{}' is not an integer", s))),
        }
    }
}
