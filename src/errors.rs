use thiserror::Error;

use crate::value::Value;

/// Expression calculation result: either value or error
pub type CalcResult = Result<Value, CalcError>;

/// Stable classification of a `CalcError`, independent of the message text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    DivisionByZero,
    UndefinedPower,
    UndefinedFactorial,
    Syntax,
    InvalidArgument,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Malformed literal: bad mixed-number separator, multiple decimal points,
    /// non-digit characters, mismatched uncertainty brackets
    #[error("Invalid number format: {0}")]
    Format(String),
    /// Exact zero divisor or an interval divisor containing zero
    #[error("Division by zero: {0}")]
    DividedByZero(String),
    /// `0^0`, `0^negative`, zero-spanning interval to the zeroth power
    #[error("Undefined power: {0}")]
    UndefinedPower(String),
    #[error("Factorial is not defined for {0}")]
    UndefinedFactorial(String),
    /// Trailing characters, missing closing parenthesis, invalid exponent
    #[error("Syntax error: {0}")]
    Syntax(String),
    #[error("Invalid argument for '{0}': {1}")]
    InvalidArgument(String, String),
    #[error("Nothing to calculate")]
    EmptyExpression,
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::Format(..) => ErrorKind::Format,
            CalcError::DividedByZero(..) => ErrorKind::DivisionByZero,
            CalcError::UndefinedPower(..) => ErrorKind::UndefinedPower,
            CalcError::UndefinedFactorial(..) => ErrorKind::UndefinedFactorial,
            CalcError::Syntax(..) | CalcError::EmptyExpression => ErrorKind::Syntax,
            CalcError::InvalidArgument(..) => ErrorKind::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = CalcError::DividedByZero("1/0".to_string());
        assert_eq!(e.to_string(), "Division by zero: 1/0");
        assert_eq!(e.kind(), ErrorKind::DivisionByZero);
        let e = CalcError::UndefinedFactorial("-3".to_string());
        assert_eq!(e.to_string(), "Factorial is not defined for -3");
        assert_eq!(CalcError::EmptyExpression.kind(), ErrorKind::Syntax);
        let e = CalcError::InvalidArgument("shortest_decimal".to_string(), "base 1".to_string());
        assert_eq!(e.to_string(), "Invalid argument for 'shortest_decimal': base 1");
    }
}
