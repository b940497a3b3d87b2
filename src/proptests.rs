//! Property-based tests for exact arithmetic and the parser.

use num_bigint::BigInt;
use proptest::prelude::*;

use crate::integer::big_gcd;
use crate::{parse, Integer, Rational, RationalInterval, Value};

// Strategy for generating small integers
fn small_int() -> impl Strategy<Value = i64> {
    -1000i64..1000i64
}

// Strategy for generating non-zero integers
fn non_zero_int() -> impl Strategy<Value = i64> {
    prop_oneof![(-1000i64..=-1i64), (1i64..=1000i64)]
}

fn rational() -> impl Strategy<Value = Rational> {
    (small_int(), non_zero_int()).prop_map(|(n, d)| Rational::new(BigInt::from(n), BigInt::from(d)).unwrap())
}

fn interval() -> impl Strategy<Value = RationalInterval> {
    (rational(), rational()).prop_map(|(a, b)| RationalInterval::new(a, b))
}

proptest! {
    #[test]
    fn rational_is_normalized(n in small_int(), d in non_zero_int()) {
        let r = Rational::new(BigInt::from(n), BigInt::from(d)).unwrap();
        prop_assert!(r.denominator() > &BigInt::from(0));
        let gcd = big_gcd(r.numerator(), r.denominator());
        prop_assert_eq!(gcd, BigInt::from(1));
    }

    #[test]
    fn interval_is_ordered(a in rational(), b in rational()) {
        let i = RationalInterval::new(a.clone(), b.clone());
        prop_assert!(i.low() <= i.high());
        prop_assert_eq!(i, RationalInterval::new(b, a));
    }

    #[test]
    fn parse_round_trip(r in rational()) {
        let expected = Value::Ratio(r.clone()).promote();
        prop_assert_eq!(parse(&r.to_string()), Ok(expected));
    }

    #[test]
    fn parse_interval_round_trip(i in interval()) {
        let v = parse(&i.to_string()).unwrap();
        prop_assert_eq!(v.to_interval(), i);
    }

    #[test]
    fn promote_is_idempotent(i in interval()) {
        let once = Value::Interval(i).promote();
        prop_assert_eq!(once.clone().promote(), once);
    }

    #[test]
    fn divide_then_multiply(a in rational(), b in rational()) {
        prop_assume!(!b.is_zero());
        let back = a.divide(&b).unwrap().multiply(&b);
        prop_assert_eq!(back, a);
    }

    #[test]
    fn value_divide_then_multiply(a in small_int(), b in non_zero_int()) {
        let a = Value::Int(Integer::from(a));
        let b = Value::Int(Integer::from(b));
        let back = a.divide(&b).unwrap().multiply(&b).unwrap().promote();
        prop_assert_eq!(back, a);
    }

    #[test]
    fn contains_points_between_endpoints(i in interval(), k in 0i64..=10) {
        let t = Rational::new(BigInt::from(k), BigInt::from(10)).unwrap();
        let p = i.low().add(&i.width().multiply(&t));
        prop_assert!(i.contains_value(&p));
    }

    #[test]
    fn interval_ops_enclose_point_results(a in interval(), b in interval(), k in 0i64..=4) {
        let t = Rational::new(BigInt::from(k), BigInt::from(4)).unwrap();
        let x = a.low().add(&a.width().multiply(&t));
        let y = b.high().subtract(&b.width().multiply(&t));
        prop_assert!(a.add(&b).contains_value(&x.add(&y)));
        prop_assert!(a.subtract(&b).contains_value(&x.subtract(&y)));
        prop_assert!(a.multiply(&b).contains_value(&x.multiply(&y)));
    }

    #[test]
    fn repeating_decimal_round_trip(r in rational()) {
        let s = r.to_repeating_decimal();
        prop_assert_eq!(Rational::from_repeating_decimal(&s), Ok(r));
    }
}
