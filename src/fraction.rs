use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;

use crate::errors::*;
use crate::integer::{big_gcd, big_pow};
use crate::interval::RationalInterval;
use crate::rational::Rational;

/// Numerator and denominator pair that is never reduced automatically:
/// `2/4` and `1/2` are different fractions with the same value. Mediants
/// depend on the exact pair, so reduction is left to `reduce`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: BigInt,
    denominator: BigInt,
}

impl Fraction {
    /// The sign is moved to the numerator, the pair is not reduced
    pub fn new(numerator: BigInt, denominator: BigInt) -> Result<Fraction, CalcError> {
        if denominator.is_zero() {
            return Err(CalcError::DividedByZero(format!("{}/0", numerator)));
        }
        if denominator.is_negative() {
            return Ok(Fraction {
                numerator: -numerator,
                denominator: -denominator,
            });
        }
        Ok(Fraction { numerator, denominator })
    }

    pub fn from_rational(r: &Rational) -> Fraction {
        Fraction {
            numerator: r.numerator().clone(),
            denominator: r.denominator().clone(),
        }
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn to_rational(&self) -> Rational {
        Rational::from_ratio(BigRational::new(self.numerator.clone(), self.denominator.clone()))
    }

    /// Same value in lowest terms
    pub fn reduce(&self) -> Fraction {
        let gcd = big_gcd(&self.numerator, &self.denominator);
        if gcd.is_zero() || gcd.is_one() {
            return self.clone();
        }
        Fraction {
            numerator: &self.numerator / &gcd,
            denominator: &self.denominator / &gcd,
        }
    }

    fn check_same_denominator(&self, rhs: &Fraction, op: &str) -> Result<(), CalcError> {
        if self.denominator != rhs.denominator {
            return Err(CalcError::InvalidArgument(
                op.to_string(),
                format!("{} and {} have different denominators", self, rhs),
            ));
        }
        Ok(())
    }

    /// Adds numerators, both fractions must share the denominator
    pub fn add(&self, rhs: &Fraction) -> Result<Fraction, CalcError> {
        self.check_same_denominator(rhs, "fraction add")?;
        Ok(Fraction {
            numerator: &self.numerator + &rhs.numerator,
            denominator: self.denominator.clone(),
        })
    }

    pub fn subtract(&self, rhs: &Fraction) -> Result<Fraction, CalcError> {
        self.check_same_denominator(rhs, "fraction subtract")?;
        Ok(Fraction {
            numerator: &self.numerator - &rhs.numerator,
            denominator: self.denominator.clone(),
        })
    }

    pub fn multiply(&self, rhs: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &rhs.numerator,
            denominator: &self.denominator * &rhs.denominator,
        }
    }

    pub fn divide(&self, rhs: &Fraction) -> Result<Fraction, CalcError> {
        if rhs.is_zero() {
            return Err(CalcError::DividedByZero(format!("{}", self)));
        }
        Fraction::new(&self.numerator * &rhs.denominator, &self.denominator * &rhs.numerator)
    }

    pub fn negate(&self) -> Fraction {
        Fraction {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }

    pub fn pow(&self, exp: &BigInt) -> Result<Fraction, CalcError> {
        if self.is_zero() && !exp.is_positive() {
            return Err(CalcError::UndefinedPower(format!("0^{}", exp)));
        }
        if exp.is_negative() {
            let inv = Fraction::new(self.denominator.clone(), self.numerator.clone())?;
            return inv.pow(&-exp);
        }
        Ok(Fraction {
            numerator: big_pow(&self.numerator, exp),
            denominator: big_pow(&self.denominator, exp),
        })
    }

    /// `(a+c)/(b+d)` computed on the stored pairs
    pub fn mediant(&self, other: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator + &other.numerator,
            denominator: &self.denominator + &other.denominator,
        }
    }

    /// Compares values by cross multiplication, `1/2` equals `2/4` here
    pub fn cmp_value(&self, other: &Fraction) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Interval between two unreduced fractions, used for Stern-Brocot style
/// bisection
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FractionInterval {
    low: Fraction,
    high: Fraction,
}

impl FractionInterval {
    pub fn new(a: Fraction, b: Fraction) -> FractionInterval {
        if a.cmp_value(&b) == Ordering::Greater {
            FractionInterval { low: b, high: a }
        } else {
            FractionInterval { low: a, high: b }
        }
    }

    pub fn from_rational_interval(i: &RationalInterval) -> FractionInterval {
        FractionInterval {
            low: Fraction::from_rational(i.low()),
            high: Fraction::from_rational(i.high()),
        }
    }

    pub fn low(&self) -> &Fraction {
        &self.low
    }

    pub fn high(&self) -> &Fraction {
        &self.high
    }

    pub fn to_rational_interval(&self) -> RationalInterval {
        RationalInterval::new(self.low.to_rational(), self.high.to_rational())
    }

    /// Splits the interval at the mediant of its endpoints
    pub fn mediant_split(&self) -> (FractionInterval, FractionInterval) {
        let mid = self.low.mediant(&self.high);
        (
            FractionInterval {
                low: self.low.clone(),
                high: mid.clone(),
            },
            FractionInterval {
                low: mid,
                high: self.high.clone(),
            },
        )
    }

    /// Bisects `depth` times, returns `2^depth` adjacent intervals
    pub fn partition_with_mediants(&self, depth: usize) -> Vec<FractionInterval> {
        let mut parts = vec![self.clone()];
        for _ in 0..depth {
            let mut next = Vec::with_capacity(parts.len() * 2);
            for p in &parts {
                let (left, right) = p.mediant_split();
                next.push(left);
                next.push(right);
            }
            parts = next;
        }
        parts
    }

    /// Cuts the interval at the points returned by `cuts`. Points must lie
    /// strictly inside the interval; they are sorted and duplicates by
    /// value are dropped
    pub fn partition_with<F>(&self, cuts: F) -> Result<Vec<FractionInterval>, CalcError>
    where
        F: FnOnce(&Fraction, &Fraction) -> Vec<Fraction>,
    {
        let mut points = cuts(&self.low, &self.high);
        for p in &points {
            if p.cmp_value(&self.low) != Ordering::Greater || p.cmp_value(&self.high) != Ordering::Less {
                return Err(CalcError::InvalidArgument(
                    "partition_with".to_string(),
                    format!("{} is not strictly inside {}", p, self),
                ));
            }
        }
        points.sort_by(|a, b| a.cmp_value(b));
        points.dedup_by(|a, b| a.cmp_value(b) == Ordering::Equal);

        let mut parts = Vec::with_capacity(points.len() + 1);
        let mut start = self.low.clone();
        for p in points {
            parts.push(FractionInterval {
                low: start,
                high: p.clone(),
            });
            start = p;
        }
        parts.push(FractionInterval {
            low: start,
            high: self.high.clone(),
        });
        Ok(parts)
    }
}

impl fmt::Display for FractionInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i64, d: i64) -> Fraction {
        Fraction::new(BigInt::from(n), BigInt::from(d)).unwrap()
    }

    #[test]
    fn test_unreduced() {
        let f = frac(2, 4);
        assert_eq!(f.numerator(), &BigInt::from(2));
        assert_eq!(f.denominator(), &BigInt::from(4));
        assert_ne!(f, frac(1, 2));
        assert_eq!(f.cmp_value(&frac(1, 2)), Ordering::Equal);
        assert_eq!(f.reduce(), frac(1, 2));
        assert_eq!(frac(3, -4), frac(-3, 4));
        assert_eq!(Fraction::new(BigInt::one(), BigInt::zero()).unwrap_err().kind(), ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_arith() {
        assert_eq!(frac(1, 4).add(&frac(2, 4)), Ok(frac(3, 4)));
        assert_eq!(frac(1, 4).subtract(&frac(2, 4)), Ok(frac(-1, 4)));
        let e = frac(1, 2).add(&frac(1, 3)).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        assert!(frac(1, 2).subtract(&frac(2, 4)).is_err());
        assert_eq!(frac(1, 2).multiply(&frac(2, 3)), frac(2, 6));
        assert_eq!(frac(1, 2).divide(&frac(-2, 3)), Ok(frac(-3, 4)));
        assert!(frac(1, 2).divide(&frac(0, 3)).is_err());
        assert_eq!(frac(2, 4).pow(&BigInt::from(2)), Ok(frac(4, 16)));
        assert_eq!(frac(2, 4).pow(&BigInt::from(-1)), Ok(frac(4, 2)));
        assert!(frac(0, 4).pow(&BigInt::from(0)).is_err());
    }

    #[test]
    fn test_rational_conversion() {
        let f = frac(6, 8);
        let r = f.to_rational();
        assert_eq!(r.to_string(), "3/4");
        assert_eq!(Fraction::from_rational(&r), frac(3, 4));
    }

    #[test]
    fn test_mediant_split() {
        let i = FractionInterval::new(frac(1, 1), frac(0, 1));
        assert_eq!(i.low(), &frac(0, 1));
        let (l, r) = i.mediant_split();
        assert_eq!(l.high(), &frac(1, 2));
        assert_eq!(r.low(), &frac(1, 2));
        let parts = i.partition_with_mediants(2);
        let cuts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        assert_eq!(cuts, vec!["0/1:1/3", "1/3:1/2", "1/2:2/3", "2/3:1/1"]);
        assert_eq!(i.partition_with_mediants(0), vec![i.clone()]);
    }

    #[test]
    fn test_partition_with() {
        let i = FractionInterval::new(frac(0, 1), frac(1, 1));
        let parts = i
            .partition_with(|_, _| vec![frac(3, 4), frac(1, 4), frac(2, 8)])
            .unwrap();
        let cuts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        assert_eq!(cuts, vec!["0/1:1/4", "1/4:3/4", "3/4:1/1"]);

        let e = i.partition_with(|_, high| vec![high.clone()]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        assert!(i.partition_with(|_, _| vec![frac(-1, 2)]).is_err());
        assert_eq!(i.partition_with(|_, _| Vec::new()), Ok(vec![i.clone()]));
    }

    #[test]
    fn test_interval_conversion() {
        let i = FractionInterval::new(frac(2, 4), frac(3, 4));
        let r = i.to_rational_interval();
        assert_eq!(r.to_string(), "1/2:3/4");
        assert_eq!(FractionInterval::from_rational_interval(&r).to_string(), "1/2:3/4");
    }
}
