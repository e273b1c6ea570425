//! Annuity (fixed payment) formulas.
//!
//! All three solvers share the monthly rate `i = annual / 1200` and the
//! compound factor `(1 + i)^n`.

use std::fmt;

use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, Result};

/// Converts an annual percentage rate to a monthly decimal rate.
///
/// 12 (% per year) becomes 0.01 per month. No compounding is involved.
pub fn monthly_rate(annual_interest_percent: Decimal) -> Decimal {
    annual_interest_percent / dec!(1200)
}

fn compound_factor(monthly_rate: Decimal, term_months: u32) -> Result<Decimal> {
    (dec!(1) + monthly_rate)
        .checked_powu(term_months.into())
        .ok_or(LoanError::overflow("compound factor"))
}

/// A repayment term split into whole years and remaining months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerm {
    pub years: u32,
    pub months: u32,
}

impl LoanTerm {
    pub fn from_months(total_months: u32) -> Self {
        LoanTerm {
            years: total_months / 12,
            months: total_months % 12,
        }
    }

    pub fn total_months(&self) -> u32 {
        self.years * 12 + self.months
    }
}

impl fmt::Display for LoanTerm {
    /// Writes e.g. `8 years and 2 months`, `1 year` or `11 months`, leaving
    /// out zero components.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let years = match self.years {
            0 => None,
            1 => Some("1 year".to_string()),
            n => Some(format!("{n} years")),
        };
        let months = match self.months {
            0 => None,
            1 => Some("1 month".to_string()),
            n => Some(format!("{n} months")),
        };

        match (years, months) {
            (Some(y), Some(m)) => write!(f, "{y} and {m}"),
            (Some(y), None) => f.write_str(&y),
            (None, Some(m)) => f.write_str(&m),
            (None, None) => f.write_str("0 months"),
        }
    }
}

/// Loan principal together with the overpayment over the whole term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalSolution {
    pub principal: Decimal,
    pub overpayment: Decimal,
}

/// Repayment term together with the overpayment over that term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSolution {
    pub term: LoanTerm,
    pub overpayment: Decimal,
}

/// Solves for the principal a fixed payment repays.
///
/// The formula is: P = A * [(1 + i)^n - 1] / [i(1 + i)^n], rounded to the
/// nearest whole unit (halves away from zero).
///
/// # Errors
///
/// Returns an error if `term_months` is zero or any intermediate value overflows.
pub fn calculate_principal(
    payment: Decimal,
    term_months: u32,
    annual_interest_percent: Decimal,
) -> Result<PrincipalSolution> {
    if term_months == 0 {
        return Err(LoanError::invalid("term must be at least one month"));
    }

    let i = monthly_rate(annual_interest_percent);
    let factor = compound_factor(i, term_months)?;
    let principal = payment
        .checked_mul(factor - dec!(1))
        .zip(i.checked_mul(factor))
        .and_then(|(numerator, denominator)| numerator.checked_div(denominator))
        .ok_or(LoanError::overflow("loan principal"))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let overpayment = payment
        .checked_mul(Decimal::from(term_months))
        .and_then(|total_paid| total_paid.checked_sub(principal))
        .ok_or(LoanError::overflow("overpayment"))?;
    debug!("principal for payment {payment} over {term_months} months: {principal}");

    Ok(PrincipalSolution {
        principal,
        overpayment,
    })
}

/// Solves for the fixed monthly payment.
///
/// The formula is: A = P * [i(1 + i)^n] / [(1 + i)^n - 1], rounded up so the
/// payment is never underestimated.
///
/// # Errors
///
/// Returns an error if `term_months` is zero or any intermediate value overflows.
pub fn calculate_monthly_payment(
    principal: Decimal,
    term_months: u32,
    annual_interest_percent: Decimal,
) -> Result<Decimal> {
    if term_months == 0 {
        return Err(LoanError::invalid("term must be at least one month"));
    }

    let i = monthly_rate(annual_interest_percent);
    let factor = compound_factor(i, term_months)?;
    let payment = i
        .checked_mul(factor)
        .and_then(|growth| principal.checked_mul(growth))
        .and_then(|numerator| numerator.checked_div(factor - dec!(1)))
        .ok_or(LoanError::overflow("monthly payment"))?
        .ceil();
    debug!("payment for principal {principal} over {term_months} months: {payment}");

    Ok(payment)
}

/// Solves for the number of months a fixed payment needs to repay the loan.
///
/// The formula is: n = ln(A / (A - iP)) / ln(1 + i), rounded up to whole months.
///
/// # Errors
///
/// Returns [`LoanError::Unsolvable`] when the payment does not exceed the
/// monthly interest on the principal, and [`LoanError::Overflow`] when the
/// term does not fit in a month count.
pub fn calculate_term(
    principal: Decimal,
    payment: Decimal,
    annual_interest_percent: Decimal,
) -> Result<TermSolution> {
    let i = monthly_rate(annual_interest_percent);
    let amortized = i
        .checked_mul(principal)
        .and_then(|interest| payment.checked_sub(interest))
        .ok_or(LoanError::overflow("first month's interest"))?;
    if amortized <= Decimal::ZERO {
        return Err(LoanError::Unsolvable { payment, principal });
    }

    let ratio = payment
        .checked_div(amortized)
        .and_then(|quotient| quotient.checked_ln())
        .ok_or(LoanError::overflow("term logarithm"))?;
    let growth = (dec!(1) + i)
        .checked_ln()
        .ok_or(LoanError::overflow("term logarithm"))?;
    let total_months = ratio
        .checked_div(growth)
        .and_then(|months| months.ceil().to_u32())
        .ok_or(LoanError::overflow("term in months"))?;

    let term = LoanTerm::from_months(total_months);
    let overpayment = payment
        .checked_mul(Decimal::from(term.total_months()))
        .and_then(|total_paid| total_paid.checked_sub(principal))
        .ok_or(LoanError::overflow("overpayment"))?;
    debug!("term for principal {principal} at payment {payment}: {total_months} months");

    Ok(TermSolution { term, overpayment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
    }

    #[rstest]
    #[case(dec!(100000), 120, dec!(12), dec!(1435))]
    #[case(dec!(1000000), 60, dec!(10), dec!(21248))]
    #[case(dec!(500000), 8, dec!(7.8), dec!(64342))]
    fn test_calculate_monthly_payment(
        #[case] principal: Decimal,
        #[case] term_months: u32,
        #[case] interest: Decimal,
        #[case] expected: Decimal,
    ) {
        let payment = calculate_monthly_payment(principal, term_months, interest).unwrap();
        assert_eq!(payment, expected);
        assert!(payment * Decimal::from(term_months) >= principal);
    }

    #[rstest]
    #[case(dec!(8721.8), 120, dec!(5.6), dec!(800000), dec!(246616))]
    #[case(dec!(1000), 12, dec!(12), dec!(11255), dec!(745))]
    fn test_calculate_principal(
        #[case] payment: Decimal,
        #[case] term_months: u32,
        #[case] interest: Decimal,
        #[case] principal: Decimal,
        #[case] overpayment: Decimal,
    ) {
        let solution = calculate_principal(payment, term_months, interest).unwrap();
        assert_eq!(solution.principal, principal);
        assert_eq!(solution.overpayment, overpayment);
    }

    #[rstest]
    #[case(dec!(8721.8), 120, dec!(5.6))]
    #[case(dec!(1435), 120, dec!(12))]
    #[case(dec!(250), 36, dec!(3.5))]
    fn test_principal_round_trips_to_payment(
        #[case] payment: Decimal,
        #[case] term_months: u32,
        #[case] interest: Decimal,
    ) {
        let solution = calculate_principal(payment, term_months, interest).unwrap();
        let derived = calculate_monthly_payment(solution.principal, term_months, interest).unwrap();
        assert!((derived - payment).abs() <= dec!(1), "{derived} vs {payment}");
    }

    #[rstest]
    #[case(dec!(500000), dec!(23000), dec!(7.8), LoanTerm { years: 2, months: 0 }, dec!(52000))]
    #[case(dec!(1000000), dec!(15000), dec!(10), LoanTerm { years: 8, months: 2 }, dec!(470000))]
    #[case(dec!(1000000), dec!(104000), dec!(10), LoanTerm { years: 0, months: 11 }, dec!(144000))]
    #[case(dec!(100000), dec!(1000), dec!(1), LoanTerm { years: 8, months: 9 }, dec!(5000))]
    fn test_calculate_term(
        #[case] principal: Decimal,
        #[case] payment: Decimal,
        #[case] interest: Decimal,
        #[case] term: LoanTerm,
        #[case] overpayment: Decimal,
    ) {
        let solution = calculate_term(principal, payment, interest).unwrap();
        assert_eq!(solution.term, term);
        assert_eq!(solution.overpayment, overpayment);
    }

    #[rstest]
    #[case(dec!(500000), dec!(1000), dec!(12))]
    #[case(dec!(100000), dec!(1000), dec!(12))]
    fn test_calculate_term_payment_below_interest(
        #[case] principal: Decimal,
        #[case] payment: Decimal,
        #[case] interest: Decimal,
    ) {
        assert_eq!(
            calculate_term(principal, payment, interest),
            Err(LoanError::Unsolvable { payment, principal })
        );
    }

    #[test]
    fn test_zero_term_error() {
        assert!(calculate_monthly_payment(dec!(1000), 0, dec!(10)).is_err());
        assert!(calculate_principal(dec!(100), 0, dec!(10)).is_err());
    }

    #[test]
    fn test_compound_factor_overflow() {
        assert_eq!(
            calculate_monthly_payment(dec!(1000), 100_000, dec!(120)),
            Err(LoanError::Overflow { context: "compound factor" })
        );
    }

    // 200 years at 30%: the compound factor still fits, the products do not.
    #[rstest]
    #[case(dec!(1000000), 2400, dec!(30))]
    #[case(dec!(1000000000), 1200, dec!(60))]
    fn test_long_high_rate_loan_overflows(
        #[case] amount: Decimal,
        #[case] term_months: u32,
        #[case] interest: Decimal,
    ) {
        assert!(compound_factor(monthly_rate(interest), term_months).is_ok());
        assert!(matches!(
            calculate_monthly_payment(amount, term_months, interest),
            Err(LoanError::Overflow { .. })
        ));
        assert!(matches!(
            calculate_principal(amount, term_months, interest),
            Err(LoanError::Overflow { .. })
        ));
    }

    #[test]
    fn test_calculate_term_interest_overflow() {
        let principal = Decimal::MAX;
        assert_eq!(
            calculate_term(principal, dec!(1000), dec!(2400)),
            Err(LoanError::Overflow { context: "first month's interest" })
        );
    }

    #[rstest]
    #[case(1, "1 month")]
    #[case(11, "11 months")]
    #[case(12, "1 year")]
    #[case(13, "1 year and 1 month")]
    #[case(24, "2 years")]
    #[case(98, "8 years and 2 months")]
    fn test_loan_term_display(#[case] months: u32, #[case] expected: &str) {
        let term = LoanTerm::from_months(months);
        assert_eq!(term.to_string(), expected);
        assert_eq!(term.total_months(), months);
    }
}
