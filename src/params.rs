use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, Result};

/// Fewest parameters (out of principal, payment, periods, interest and type)
/// that can describe a solvable loan.
pub const MIN_SUPPLIED_PARAMETERS: usize = 4;

/// Amortization policy of the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanType {
    /// Fixed monthly payment.
    #[serde(rename = "annuity")]
    Annuity,
    /// Fixed principal share, so payments decline month by month.
    #[serde(rename = "diff")]
    Differentiated,
}

impl FromStr for LoanType {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "annuity" => Ok(LoanType::Annuity),
            "diff" => Ok(LoanType::Differentiated),
            _ => Err(LoanError::invalid("unknown loan type")),
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanType::Annuity => f.write_str("annuity"),
            LoanType::Differentiated => f.write_str("diff"),
        }
    }
}

/// A loan request exactly as supplied by the caller.
///
/// `None` means the parameter was not given at all; an explicit zero marks the
/// value to solve for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Option<Decimal>,
    pub payment: Option<Decimal>,
    pub periods: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub loan_type: Option<String>,
}

impl LoanRequest {
    /// Number of parameters the caller actually supplied.
    pub fn supplied(&self) -> usize {
        [
            self.principal.is_some(),
            self.payment.is_some(),
            self.periods.is_some(),
            self.interest.is_some(),
            self.loan_type.is_some(),
        ]
        .into_iter()
        .filter(|given| *given)
        .count()
    }

    /// Checks the request and works out which value has to be solved for.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::InvalidParameters`] when fewer than
    /// [`MIN_SUPPLIED_PARAMETERS`] were supplied, when any number is negative,
    /// when the loan type is unknown, or when the values do not leave exactly
    /// one unknown for the chosen loan type.
    pub fn validate(&self) -> Result<Calculation> {
        let result = self.classify();
        match &result {
            Ok(calculation) => debug!("validated loan request: {calculation:?}"),
            Err(LoanError::InvalidParameters { reason }) => warn!("rejected loan request: {reason}"),
            Err(e) => warn!("rejected loan request: {e}"),
        }
        result
    }

    fn classify(&self) -> Result<Calculation> {
        if self.supplied() < MIN_SUPPLIED_PARAMETERS {
            return Err(LoanError::invalid("fewer than four parameters supplied"));
        }

        let params = LoanParameters {
            principal: self.principal.unwrap_or_default(),
            payment: self.payment.unwrap_or_default(),
            periods: self.periods.unwrap_or_default(),
            interest: self.interest.unwrap_or_default(),
        };
        if params.has_negative() {
            return Err(LoanError::invalid("negative parameter"));
        }

        let loan_type: LoanType = self.loan_type.as_deref().unwrap_or_default().parse()?;
        params.into_calculation(loan_type)
    }
}

/// The four numeric loan parameters. Zero marks the unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Loan amount.
    pub principal: Decimal,
    /// Monthly payment.
    pub payment: Decimal,
    /// Number of monthly payments.
    pub periods: Decimal,
    /// Annual interest rate as a percentage (e.g., 12 for 12%).
    pub interest: Decimal,
}

impl LoanParameters {
    pub fn has_negative(&self) -> bool {
        [self.principal, self.payment, self.periods, self.interest]
            .iter()
            .any(|value| *value < Decimal::ZERO)
    }

    /// Picks the calculation matching the loan type and the zero-valued unknown.
    pub fn into_calculation(self, loan_type: LoanType) -> Result<Calculation> {
        debug!("checking {loan_type} loan parameters");
        match loan_type {
            LoanType::Annuity => self.annuity_calculation(),
            LoanType::Differentiated => self.differentiated_calculation(),
        }
    }

    fn annuity_calculation(self) -> Result<Calculation> {
        if self.interest.is_zero() {
            return Err(LoanError::invalid("annuity loans need a nonzero interest rate"));
        }

        let unknowns = [self.principal, self.payment, self.periods]
            .iter()
            .filter(|value| value.is_zero())
            .count();
        if unknowns != 1 {
            return Err(LoanError::invalid(
                "annuity loans need exactly one of principal, payment and periods set to zero",
            ));
        }

        if self.principal.is_zero() {
            Ok(Calculation::Principal {
                payment: self.payment,
                term_months: whole_months(self.periods)?,
                interest: self.interest,
            })
        } else if self.payment.is_zero() {
            Ok(Calculation::Payment {
                principal: self.principal,
                term_months: whole_months(self.periods)?,
                interest: self.interest,
            })
        } else {
            Ok(Calculation::Term {
                principal: self.principal,
                payment: self.payment,
                interest: self.interest,
            })
        }
    }

    fn differentiated_calculation(self) -> Result<Calculation> {
        if !self.payment.is_zero() {
            return Err(LoanError::invalid("differentiated loans compute their own payments"));
        }
        if self.principal.is_zero() || self.periods.is_zero() {
            return Err(LoanError::invalid("differentiated loans need a principal and periods"));
        }

        Ok(Calculation::Differentiated {
            principal: self.principal,
            term_months: whole_months(self.periods)?,
            interest: self.interest,
        })
    }
}

/// A validated request, tagged with the value being solved for.
///
/// `interest` is always the annual percentage rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "solve", rename_all = "snake_case")]
pub enum Calculation {
    /// Annuity loan, principal unknown.
    Principal {
        payment: Decimal,
        term_months: u32,
        interest: Decimal,
    },
    /// Annuity loan, monthly payment unknown.
    Payment {
        principal: Decimal,
        term_months: u32,
        interest: Decimal,
    },
    /// Annuity loan, term unknown.
    Term {
        principal: Decimal,
        payment: Decimal,
        interest: Decimal,
    },
    /// Differentiated loan; the whole payment schedule is unknown.
    Differentiated {
        principal: Decimal,
        term_months: u32,
        interest: Decimal,
    },
}

fn whole_months(periods: Decimal) -> Result<u32> {
    if !periods.fract().is_zero() {
        return Err(LoanError::invalid("periods must be a whole number of months"));
    }
    periods
        .to_u32()
        .ok_or(LoanError::invalid("periods does not fit in a month count"))
}
