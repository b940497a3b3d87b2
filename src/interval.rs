use num_bigint::BigInt;
use num_rational::BigRational;
use num_integer::Integer as _;
use num_traits::{One, Signed, Zero};
use rand::Rng;
use std::fmt;

use crate::errors::*;
use crate::integer::big_gcd;
use crate::rational::Rational;

/// Closed interval `[low, high]` with exact rational endpoints, `low <= high`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RationalInterval {
    low: Rational,
    high: Rational,
}

fn hull(values: [Rational; 4]) -> RationalInterval {
    let mut low = values[0].clone();
    let mut high = values[0].clone();
    for v in values.iter().skip(1) {
        if *v < low {
            low = v.clone();
        }
        if *v > high {
            high = v.clone();
        }
    }
    RationalInterval { low, high }
}

// exact decimal text: plain digits when the expansion terminates,
// `int.nonrep#rep` otherwise
fn exact_decimal(r: &Rational) -> String {
    terminating_decimal(r).unwrap_or_else(|| r.to_repeating_decimal())
}

fn terminating_decimal(r: &Rational) -> Option<String> {
    let rd = r.to_repeating_decimal_with_period();
    if rd.period != 0 {
        return None;
    }
    Some(rd.decimal.trim_end_matches("#0").to_string())
}

impl RationalInterval {
    /// Creates an interval, endpoints are swapped if needed
    pub fn new(a: Rational, b: Rational) -> Self {
        if a <= b {
            RationalInterval { low: a, high: b }
        } else {
            RationalInterval { low: b, high: a }
        }
    }

    pub fn point(r: Rational) -> Self {
        RationalInterval {
            low: r.clone(),
            high: r,
        }
    }

    pub fn low(&self) -> &Rational {
        &self.low
    }

    pub fn high(&self) -> &Rational {
        &self.high
    }

    pub fn is_point(&self) -> bool {
        self.low == self.high
    }

    pub fn contains_zero(&self) -> bool {
        !self.low.is_positive() && !self.high.is_negative()
    }

    /// True if zero is strictly inside the interval
    pub fn straddles_zero(&self) -> bool {
        self.low.is_negative() && self.high.is_positive()
    }

    pub fn negate(&self) -> Self {
        RationalInterval {
            low: self.high.negate(),
            high: self.low.negate(),
        }
    }

    pub fn add(&self, rhs: &RationalInterval) -> Self {
        RationalInterval {
            low: self.low.add(&rhs.low),
            high: self.high.add(&rhs.high),
        }
    }

    pub fn subtract(&self, rhs: &RationalInterval) -> Self {
        RationalInterval {
            low: self.low.subtract(&rhs.high),
            high: self.high.subtract(&rhs.low),
        }
    }

    pub fn multiply(&self, rhs: &RationalInterval) -> Self {
        hull([
            self.low.multiply(&rhs.low),
            self.low.multiply(&rhs.high),
            self.high.multiply(&rhs.low),
            self.high.multiply(&rhs.high),
        ])
    }

    /// Fails if the divisor contains zero, `[0, 0]` included
    pub fn divide(&self, rhs: &RationalInterval) -> Result<Self, CalcError> {
        if rhs.contains_zero() {
            return Err(CalcError::DividedByZero(format!("{} / ({})", self, rhs)));
        }
        Ok(hull([
            self.low.divide(&rhs.low)?,
            self.low.divide(&rhs.high)?,
            self.high.divide(&rhs.low)?,
            self.high.divide(&rhs.high)?,
        ]))
    }

    pub fn reciprocate(&self) -> Result<Self, CalcError> {
        if self.contains_zero() {
            return Err(CalcError::DividedByZero(format!("1 / ({})", self)));
        }
        Ok(RationalInterval {
            low: self.high.reciprocal()?,
            high: self.low.reciprocal()?,
        })
    }

    /// Range of `x^exp` for a single `x` drawn from the interval
    pub fn pow(&self, exp: &BigInt) -> Result<Self, CalcError> {
        if exp.is_zero() {
            if (self.is_point() && self.low.is_zero()) || self.straddles_zero() {
                return Err(CalcError::UndefinedPower(format!("({})^0", self)));
            }
            return Ok(RationalInterval::point(Rational::one()));
        }
        if exp.is_negative() {
            if self.contains_zero() {
                return Err(CalcError::UndefinedPower(format!("({})^{}", self, exp)));
            }
            let p = self.pow(&-exp)?;
            return Ok(RationalInterval {
                low: p.high.reciprocal()?,
                high: p.low.reciprocal()?,
            });
        }

        let lo = self.low.pow(exp)?;
        let hi = self.high.pow(exp)?;
        if exp.is_odd() {
            return Ok(RationalInterval { low: lo, high: hi });
        }
        if self.straddles_zero() {
            let high = if lo > hi { lo } else { hi };
            Ok(RationalInterval {
                low: Rational::zero(),
                high,
            })
        } else if !self.high.is_positive() {
            Ok(RationalInterval { low: hi, high: lo })
        } else {
            Ok(RationalInterval { low: lo, high: hi })
        }
    }

    /// Multiplies the interval by itself `exp` times. Every factor ranges
    /// over the whole interval independently, so the result is usually
    /// wider than `pow`: `[-1,1]*[-1,1] = [-1,1]`
    pub fn mpow(&self, exp: &BigInt) -> Result<Self, CalcError> {
        if exp.is_zero() {
            return self.pow(exp);
        }
        if exp.is_negative() {
            return self.reciprocate()?.mpow(&-exp);
        }
        let mut res = self.clone();
        let mut cnt = BigInt::one();
        while &cnt < exp {
            res = res.multiply(self);
            cnt += BigInt::one();
        }
        Ok(res)
    }

    pub fn overlaps(&self, other: &RationalInterval) -> bool {
        self.low <= other.high && other.low <= self.high
    }

    pub fn contains(&self, other: &RationalInterval) -> bool {
        self.low <= other.low && other.high <= self.high
    }

    pub fn contains_value(&self, v: &Rational) -> bool {
        self.low <= *v && *v <= self.high
    }

    pub fn intersection(&self, other: &RationalInterval) -> Option<RationalInterval> {
        if !self.overlaps(other) {
            return None;
        }
        let low = if self.low > other.low { &self.low } else { &other.low };
        let high = if self.high < other.high { &self.high } else { &other.high };
        Some(RationalInterval {
            low: low.clone(),
            high: high.clone(),
        })
    }

    /// Union of overlapping intervals or intervals whose endpoints are
    /// exactly one apart (`1:2` and `3:4`). None for other disjoint pairs
    pub fn union(&self, other: &RationalInterval) -> Option<RationalInterval> {
        let one = Rational::one();
        let adjacent = other.low == self.high.add(&one) || self.low == other.high.add(&one);
        if !self.overlaps(other) && !adjacent {
            return None;
        }
        let low = if self.low < other.low { &self.low } else { &other.low };
        let high = if self.high > other.high { &self.high } else { &other.high };
        Some(RationalInterval {
            low: low.clone(),
            high: high.clone(),
        })
    }

    pub fn width(&self) -> Rational {
        self.high.subtract(&self.low)
    }

    pub fn midpoint(&self) -> Rational {
        Rational::from_ratio((self.low.inner() + self.high.inner()) / BigRational::from_integer(BigInt::from(2)))
    }

    /// Mediant of the endpoint fractions, always inside the interval
    pub fn mediant(&self) -> Rational {
        self.low.mediant(&self.high)
    }

    /// Returns the number with the smallest power-of-`base` denominator
    /// inside the interval, e.g. `0.4` for `1/3:2/3` and base 10.
    /// A point interval whose value has no finite expansion in `base` gives None
    pub fn shortest_decimal(&self, base: u32) -> Result<Option<Rational>, CalcError> {
        if base < 2 {
            return Err(CalcError::InvalidArgument(
                "shortest_decimal".to_string(),
                format!("base {}", base),
            ));
        }
        Ok(self.decimal_in_range(&BigInt::from(base), None))
    }

    // Increases the power of `base` until some numerator fits the interval.
    // Picks the smallest numerator, or the one closest to `target`
    fn decimal_in_range(&self, base: &BigInt, target: Option<&Rational>) -> Option<Rational> {
        let width = self.width();
        // every prime factor is at least 2
        let max_steps = self.low.denominator().bits() + 1;
        let half = Rational::from_ratio(BigRational::new(BigInt::one(), BigInt::from(2)));
        let mut den = BigInt::one();
        let mut step = 0u64;
        loop {
            let scale = Rational::from_bigint(den.clone());
            let first = self.low.multiply(&scale).ceil().into_inner();
            let last = self.high.multiply(&scale).floor().into_inner();
            if first <= last {
                let num = match target {
                    Some(t) => {
                        let nearest = t.multiply(&scale).add(&half).floor().into_inner();
                        nearest.max(first).min(last)
                    }
                    None => first,
                };
                return Some(Rational::from_ratio(BigRational::new(num, den)));
            }
            // once 1/den <= width some numerator always fits
            if width.is_zero() && step >= max_steps {
                return None;
            }
            den *= base;
            step += 1;
        }
    }

    /// Picks a rational `n/d` from the interval with `d <= max_denominator`.
    /// Each distinct fraction has the same chance to be chosen
    pub fn random_rational<R: Rng + ?Sized>(&self, rng: &mut R, max_denominator: u64) -> Result<Rational, CalcError> {
        if max_denominator == 0 {
            return Err(CalcError::InvalidArgument(
                "random_rational".to_string(),
                "max denominator must be positive".to_string(),
            ));
        }
        let mut candidates = Vec::new();
        for d in 1..=max_denominator {
            let den = BigInt::from(d);
            let den_r = Rational::from_bigint(den.clone());
            let mut n = self.low.multiply(&den_r).ceil().into_inner();
            let last = self.high.multiply(&den_r).floor().into_inner();
            while n <= last {
                if big_gcd(&n, &den).is_one() {
                    candidates.push(Rational::new(n.clone(), den.clone())?);
                }
                n += BigInt::one();
            }
        }
        if candidates.is_empty() {
            return Err(CalcError::InvalidArgument(
                "random_rational".to_string(),
                format!("no fraction with denominator up to {} in {}", max_denominator, self),
            ));
        }
        let idx = rng.gen_range(0..candidates.len());
        tracing::debug!(candidates = candidates.len(), index = idx, "random rational selected");
        Ok(candidates.swap_remove(idx))
    }

    pub fn to_decimal(&self) -> String {
        format!("{}:{}", self.low.to_decimal(), self.high.to_decimal())
    }

    pub fn to_mixed_string(&self) -> String {
        format!("{}:{}", self.low.to_mixed_string(), self.high.to_mixed_string())
    }

    /// Writes the shared decimal prefix once and the differing tails in
    /// brackets: `1.53:1.57` becomes `1.5[3,7]`. Intervals without such a
    /// prefix are written as `low:high` decimals
    pub fn to_compact_decimal(&self) -> String {
        let fallback = || format!("{}:{}", exact_decimal(&self.low), exact_decimal(&self.high));
        if self.is_point() {
            return exact_decimal(&self.low);
        }
        let (lo, hi) = match (terminating_decimal(&self.low), terminating_decimal(&self.high)) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => return fallback(),
        };
        let (lo_int, lo_frac) = match lo.find('.') {
            Some(p) => (&lo[..p], lo[p + 1..].to_string()),
            None => (lo.as_str(), String::new()),
        };
        let (hi_int, hi_frac) = match hi.find('.') {
            Some(p) => (&hi[..p], hi[p + 1..].to_string()),
            None => (hi.as_str(), String::new()),
        };
        if lo_int != hi_int {
            return fallback();
        }
        let len = lo_frac.len().max(hi_frac.len());
        let lo_frac = format!("{:0<width$}", lo_frac, width = len);
        let hi_frac = format!("{:0<width$}", hi_frac, width = len);
        let shared = lo_frac
            .chars()
            .zip(hi_frac.chars())
            .take_while(|(a, b)| a == b)
            .count();
        if shared == 0 || shared == len {
            return fallback();
        }
        format!(
            "{}.{}[{},{}]",
            lo_int,
            &lo_frac[..shared],
            &lo_frac[shared..],
            &hi_frac[shared..]
        )
    }

    /// Writes the interval as a short decimal near its midpoint with the
    /// distances to the endpoints: `1.5[+-0.2]`, `1.5[+0.3,-0.1]`
    pub fn to_relative_decimal(&self) -> String {
        if self.is_point() {
            return exact_decimal(&self.low);
        }
        let mid = self.midpoint();
        let quarter = Rational::from_ratio(self.width().into_inner() / BigRational::from_integer(BigInt::from(4)));
        let near = RationalInterval::new(mid.subtract(&quarter), mid.add(&quarter));
        let center = near.decimal_in_range(&BigInt::from(10), Some(&mid)).unwrap_or(mid);
        let plus = self.high.subtract(&center);
        let minus = center.subtract(&self.low);
        let texts = (
            terminating_decimal(&center),
            terminating_decimal(&plus),
            terminating_decimal(&minus),
        );
        let (c, p, m) = match texts {
            (Some(c), Some(p), Some(m)) => (c, p, m),
            _ => return self.to_compact_decimal(),
        };
        if plus == minus {
            return format!("{}[+-{}]", c, p);
        }
        // a leading minus negates the whole uncertainty literal, offsets swap
        if center.is_negative() {
            format!("{}[+{},-{}]", c, m, p)
        } else {
            format!("{}[+{},-{}]", c, p, m)
        }
    }
}

impl From<Rational> for RationalInterval {
    fn from(r: Rational) -> Self {
        RationalInterval::point(r)
    }
}

impl fmt::Display for RationalInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}
