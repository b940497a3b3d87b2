use num_bigint::BigInt;
use std::cmp;
use tracing::{debug, trace};

use crate::errors::*;
use crate::integer::{is_digits, Integer};
use crate::interval::RationalInterval;
use crate::rational::Rational;
use crate::value::*;

// whitespace followed by `E`: the E operator, never a literal suffix
const E_OPERATOR: char = '\u{E000}';
// `/` followed by whitespace: always division, never a fraction bar
const DIV_OPERATOR: char = '\u{E001}';

/// Parser settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Collapse results to the narrowest exact type after every operation.
    /// When disabled nothing is collapsed and the result is always an
    /// interval
    pub type_aware: bool,
}

impl Default for ParseOptions {
    fn default() -> ParseOptions {
        ParseOptions { type_aware: true }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_type_aware(mut self, type_aware: bool) -> Self {
        self.type_aware = type_aware;
        self
    }
}

// A value with the flags that survive arithmetic: an explicitly written
// interval `a:b` and a result of `**` are never collapsed
#[derive(Clone, Debug)]
struct Operand {
    value: Value,
    explicit: bool,
    skip_promotion: bool,
}

impl Operand {
    fn number(value: Value) -> Operand {
        Operand {
            value,
            explicit: false,
            skip_promotion: false,
        }
    }

    fn interval(value: Value) -> Operand {
        Operand {
            value,
            explicit: true,
            skip_promotion: false,
        }
    }

    fn negated(self) -> Result<Operand, CalcError> {
        Ok(Operand {
            value: self.value.negate()?,
            ..self
        })
    }
}

fn preprocess(expr: &str) -> Vec<char> {
    let chars: Vec<char> = expr.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut idx = 0;
    while idx < chars.len() {
        if !chars[idx].is_whitespace() {
            out.push(chars[idx]);
            idx += 1;
            continue;
        }
        while idx < chars.len() && chars[idx].is_whitespace() {
            idx += 1;
        }
        if out.last() == Some(&'/') {
            out.pop();
            out.push(DIV_OPERATOR);
        } else if idx < chars.len() && chars[idx] == 'E' && !out.is_empty() {
            out.push(E_OPERATOR);
            idx += 1;
        }
    }
    out
}

// turns sentinels back into the characters a user typed
fn restore(chars: &[char]) -> String {
    let mut s = String::with_capacity(chars.len());
    for &c in chars {
        match c {
            E_OPERATOR => s.push_str(" E"),
            DIV_OPERATOR => s.push_str("/ "),
            _ => s.push(c),
        }
    }
    s
}

fn hull(a: &RationalInterval, b: &RationalInterval) -> RationalInterval {
    RationalInterval::new(
        cmp::min(a.low(), b.low()).clone(),
        cmp::max(a.high(), b.high()).clone(),
    )
}

// offsets inside `[...]` are unsigned numbers in any rational notation
fn offset(s: &str, body: &str) -> Result<Rational, CalcError> {
    if !s.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(CalcError::Format(format!("invalid uncertainty '[{}]'", body)));
    }
    s.parse::<Rational>()
}

struct Parser<'a> {
    buf: &'a [char],
    pos: usize,
    type_aware: bool,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, shift: usize) -> Option<char> {
        self.buf.get(self.pos + shift).copied()
    }

    fn next_is_digit(&self) -> bool {
        self.peek().map_or(false, |c| c.is_ascii_digit())
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn eat_str(&mut self, s: &str) -> bool {
        let cnt = s.chars().count();
        if self.pos + cnt > self.buf.len() {
            return false;
        }
        if self.buf[self.pos..self.pos + cnt].iter().copied().eq(s.chars()) {
            self.pos += cnt;
            return true;
        }
        false
    }

    fn digits(&mut self) -> String {
        let start = self.pos;
        while self.next_is_digit() {
            self.pos += 1;
        }
        self.buf[start..self.pos].iter().collect()
    }

    fn rest(&self) -> String {
        restore(&self.buf[self.pos..])
    }

    fn settle(&self, mut op: Operand) -> Operand {
        if self.type_aware && !op.explicit && !op.skip_promotion {
            op.value = op.value.promote();
        }
        op
    }

    fn reduce<F>(&self, name: &str, lhs: Operand, rhs: Operand, f: F) -> Result<Operand, CalcError>
    where
        F: Fn(&Value, &Value) -> CalcResult,
    {
        trace!(op = name, lhs = %lhs.value, rhs = %rhs.value, "reduce");
        let value = f(&lhs.value, &rhs.value)?;
        Ok(self.settle(Operand {
            value,
            explicit: lhs.explicit || rhs.explicit,
            skip_promotion: lhs.skip_promotion || rhs.skip_promotion,
        }))
    }

    fn run(&mut self) -> CalcResult {
        let res = self.expression()?;
        if self.pos < self.buf.len() {
            return Err(CalcError::Syntax(format!("unexpected '{}'", self.rest())));
        }
        if self.type_aware {
            Ok(res.value)
        } else {
            Ok(Value::Interval(res.value.to_interval()))
        }
    }

    fn expression(&mut self) -> Result<Operand, CalcError> {
        let mut lhs = self.term()?;
        loop {
            if self.eat('+') {
                let rhs = self.term()?;
                lhs = self.reduce("+", lhs, rhs, Value::addition)?;
            } else if self.eat('-') {
                let rhs = self.term()?;
                lhs = self.reduce("-", lhs, rhs, Value::subtract)?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn term(&mut self) -> Result<Operand, CalcError> {
        let mut lhs = self.factor()?;
        loop {
            match self.peek() {
                // `**` belongs to postfix and is never a product
                Some('*') if self.peek_at(1) == Some('*') => return Ok(lhs),
                Some('*') => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    lhs = self.reduce("*", lhs, rhs, Value::multiply)?;
                }
                Some('/') | Some(DIV_OPERATOR) => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    lhs = self.reduce("/", lhs, rhs, Value::divide)?;
                }
                Some('E') | Some(E_OPERATOR) => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    lhs = self.reduce("E", lhs, rhs, Value::e_notation)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn factor(&mut self) -> Result<Operand, CalcError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.expression()?;
                if !self.eat(')') {
                    return Err(CalcError::Syntax("missing closing parenthesis".to_string()));
                }
                self.postfix(inner)
            }
            Some('-') => {
                self.pos += 1;
                if self.next_is_digit() {
                    let save = self.pos;
                    let (lit, is_interval) = self.literal(false)?;
                    if is_interval {
                        // the minus of `-1:2` belongs to the first endpoint only
                        self.pos = save;
                        let (lit, _) = self.literal(true)?;
                        return self.postfix(lit);
                    }
                    let lit = self.postfix(lit)?;
                    return Ok(self.settle(lit.negated()?));
                }
                let inner = self.factor()?;
                Ok(self.settle(inner.negated()?))
            }
            Some(c) if c.is_ascii_digit() => {
                let (lit, _) = self.literal(false)?;
                self.postfix(lit)
            }
            Some(c) => Err(CalcError::Syntax(format!("unexpected '{}'", restore(&[c])))),
            None => Err(CalcError::Syntax("unexpected end of expression".to_string())),
        }
    }

    fn postfix(&mut self, op: Operand) -> Result<Operand, CalcError> {
        let mut op = op;
        if self.eat_str("!!") {
            op.value = op.value.double_fact()?;
        } else if self.eat('!') {
            op.value = op.value.fact()?;
        }
        if self.eat_str("**") {
            let exp = self.exponent()?;
            trace!(base = %op.value, exp = %exp, "mpower");
            op.value = op.value.mpower(&exp)?;
            op.skip_promotion = true;
        } else if self.eat('^') {
            let exp = self.exponent()?;
            trace!(base = %op.value, exp = %exp, "power");
            op.value = op.value.power(&exp)?;
        }
        Ok(self.settle(op))
    }

    fn exponent(&mut self) -> Result<BigInt, CalcError> {
        let negative = self.eat('-');
        let digits = self.digits();
        if digits.is_empty() {
            return Err(CalcError::Syntax(format!("Invalid exponent '{}'", self.rest())));
        }
        let exp = digits.parse::<Integer>()?.into_inner();
        Ok(if negative { -exp } else { exp })
    }

    // Returns the literal and whether it was written as an interval `a:b`
    fn literal(&mut self, negative: bool) -> Result<(Operand, bool), CalcError> {
        let first = self.endpoint(negative)?;
        if !self.eat(':') {
            return Ok((self.settle(Operand::number(first)), false));
        }
        let negative = self.eat('-');
        if !self.next_is_digit() {
            return Err(CalcError::Format(format!("incomplete interval before '{}'", self.rest())));
        }
        let second = self.endpoint(negative)?;
        let value = Value::Interval(hull(&first.to_interval(), &second.to_interval()));
        Ok((Operand::interval(value), true))
    }

    // A single number with an optional `E` suffix. Uncertain decimals
    // produce intervals
    fn endpoint(&mut self, negative: bool) -> Result<Value, CalcError> {
        let int_part = self.digits();
        let value = match self.peek() {
            Some('.') if self.peek_at(1) == Some('.') => {
                self.pos += 2;
                self.mixed(negative, &int_part)?
            }
            Some('.') => {
                self.pos += 1;
                self.decimal(negative, &int_part)?
            }
            Some('/') if self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) => {
                self.fraction(negative, &int_part)?
            }
            Some('[') => self.uncertainty(negative, &int_part, None)?,
            _ => {
                let i = int_part.parse::<Integer>()?;
                Value::Int(if negative { i.negate() } else { i })
            }
        };
        self.e_suffix(value)
    }

    fn mixed(&mut self, negative: bool, whole: &str) -> Result<Value, CalcError> {
        let num = self.digits();
        let den = if self.eat('/') { self.digits() } else { String::new() };
        if num.is_empty() || den.is_empty() {
            return Err(CalcError::Format(format!(
                "invalid mixed number '{}..{}', expected whole..num/den",
                whole, num
            )));
        }
        Ok(Value::Ratio(Rational::from_mixed_parts(negative, whole, &num, &den)?))
    }

    fn decimal(&mut self, negative: bool, int_part: &str) -> Result<Value, CalcError> {
        let frac = self.digits();
        if self.eat('#') {
            let rep = self.digits();
            let r = Rational::from_repeating_parts(negative, int_part, &frac, &rep)?;
            if self.peek() == Some('.') {
                return Err(CalcError::Format(format!("multiple decimal points after {}.{}#{}", int_part, frac, rep)));
            }
            return Ok(Value::Ratio(r));
        }
        if frac.is_empty() {
            return Err(CalcError::Format(format!("no digits after decimal point in '{}.'", int_part)));
        }
        match self.peek() {
            Some('.') => Err(CalcError::Format(format!("multiple decimal points after {}.{}", int_part, frac))),
            Some('[') => self.uncertainty(negative, int_part, Some(frac.as_str())),
            _ => Ok(Value::Ratio(Rational::from_decimal_parts(negative, int_part, &frac)?)),
        }
    }

    // `n/d` is a fraction literal unless the denominator continues as a
    // decimal: then `/` is the division operator
    fn fraction(&mut self, negative: bool, num: &str) -> Result<Value, CalcError> {
        let save = self.pos;
        self.pos += 1;
        let den = self.digits();
        if let Some('.') | Some('#') | Some('[') = self.peek() {
            self.pos = save;
            let i = num.parse::<Integer>()?;
            return Ok(Value::Int(if negative { i.negate() } else { i }));
        }
        let num = num.parse::<Integer>()?.into_inner();
        let den = den.parse::<Integer>()?.into_inner();
        let r = Rational::new(if negative { -num } else { num }, den)?;
        Ok(Value::Ratio(r))
    }

    // `base[+-off]`, `base[+up,-down]`, `base[-down,+up]` or `base[lo,hi]`
    // where `lo` and `hi` are extra decimal digits of the base
    fn uncertainty(&mut self, negative: bool, int_part: &str, frac: Option<&str>) -> Result<Value, CalcError> {
        self.pos += 1;
        let start = self.pos;
        while self.peek().map_or(false, |c| c != ']') {
            self.pos += 1;
        }
        if !self.eat(']') {
            return Err(CalcError::Format(format!("missing ']' in uncertainty '[{}'", self.rest())));
        }
        let body: String = self.buf[start..self.pos - 1].iter().collect();
        let base = Rational::from_decimal_parts(negative, int_part, frac.unwrap_or(""))?;

        if let Some(off) = body.strip_prefix("+-").or_else(|| body.strip_prefix("-+")) {
            let off = offset(off, &body)?;
            return Ok(Value::Interval(RationalInterval::new(base.subtract(&off), base.add(&off))));
        }

        let mut parts = body.splitn(2, ',');
        let (first, second) = match (parts.next(), parts.next()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(CalcError::Format(format!("invalid uncertainty '[{}]'", body))),
        };
        let signed = match (first.strip_prefix('+'), second.strip_prefix('-')) {
            (Some(up), Some(down)) => Some((up, down)),
            _ => match (first.strip_prefix('-'), second.strip_prefix('+')) {
                (Some(down), Some(up)) => Some((up, down)),
                _ => None,
            },
        };
        if let Some((up, down)) = signed {
            let up = offset(up, &body)?;
            let down = offset(down, &body)?;
            return Ok(Value::Interval(RationalInterval::new(base.subtract(&down), base.add(&up))));
        }

        let frac = match frac {
            Some(f) => f,
            None => {
                return Err(CalcError::Format(format!(
                    "range uncertainty '[{}]' needs a decimal base, got {}",
                    body, int_part
                )))
            }
        };
        if !is_digits(first) || !is_digits(second) {
            return Err(CalcError::Format(format!("invalid uncertainty '[{}]'", body)));
        }
        let lo = Rational::from_decimal_parts(negative, int_part, &format!("{}{}", frac, first))?;
        let hi = Rational::from_decimal_parts(negative, int_part, &format!("{}{}", frac, second))?;
        Ok(Value::Interval(RationalInterval::new(lo, hi)))
    }

    // `E` right after a number is a part of the literal when it is
    // followed by an exponent, otherwise it is left for the E operator
    fn e_suffix(&mut self, value: Value) -> Result<Value, CalcError> {
        if self.peek() != Some('E') {
            return Ok(value);
        }
        let has_exp = match self.peek_at(1) {
            Some('-') => self.peek_at(2).map_or(false, |c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        };
        if !has_exp {
            return Ok(value);
        }
        self.pos += 1;
        let exp = self.exponent()?;
        value.e_notation(&Value::Int(Integer::new(exp)))
    }
}

/// Evaluates an expression with default options
pub fn parse(expr: &str) -> CalcResult {
    parse_with(expr, &ParseOptions::default())
}

/// Evaluates an expression and returns either the result or the first error.
///
/// Supported literals:
/// * integer `-42`, fraction `3/4`, mixed number `2..3/4`
/// * decimal `1.25`, repeating decimal `0.12#45` (`#0` marks a terminating one)
/// * uncertain decimal `1.5[+-0.2]`, `1.5[+0.3,-0.1]`, `1.5[3,7]`
/// * interval `1/2:3/4`, either side may be any of the forms above
/// * any number may have an exponent suffix `1.5E3`
///
/// Operators from the lowest priority: `+ -`, `* / E`, unary `-`, postfix
/// `!` and `!!`, `^` and `**`
pub fn parse_with(expr: &str, options: &ParseOptions) -> CalcResult {
    trace!(expr, type_aware = options.type_aware, "parse");
    let buf = preprocess(expr);
    if buf.is_empty() {
        return Err(CalcError::EmptyExpression);
    }
    let mut parser = Parser {
        buf: &buf,
        pos: 0,
        type_aware: options.type_aware,
    };
    let res = parser.run();
    if let Err(ref e) = res {
        debug!(expr, error = %e, "parse failed");
    }
    res
}
