use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while validating or solving a loan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanError {
    /// The supplied parameters do not describe a solvable request.
    ///
    /// Every rejection shares the same user-facing message; `reason` is only
    /// meant for logs and tests.
    #[error("Incorrect parameters")]
    InvalidParameters { reason: &'static str },

    /// The monthly payment does not even cover the first month's interest,
    /// so the loan is never repaid.
    #[error("A monthly payment of {payment} never repays a principal of {principal}")]
    Unsolvable { payment: Decimal, principal: Decimal },

    /// An intermediate value left the decimal range, e.g. the compound factor
    /// of a very long loan at a high rate.
    #[error("Arithmetic overflow while computing {context}")]
    Overflow { context: &'static str },
}

impl LoanError {
    pub(crate) fn invalid(reason: &'static str) -> Self {
        LoanError::InvalidParameters { reason }
    }

    pub(crate) fn overflow(context: &'static str) -> Self {
        LoanError::Overflow { context }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
