use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::annuity::monthly_rate;
use crate::error::{LoanError, Result};

/// Payment due in a single month of a differentiated schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based month number.
    pub month: u32,
    /// Payment for the month, rounded up to a whole unit.
    pub payment: Decimal,
}

/// Month-by-month payments of a differentiated loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferentiatedSchedule {
    pub payments: Vec<AmortizationEntry>,
    /// Sum of every scheduled payment minus the principal.
    pub overpayment: Decimal,
}

/// Builds the payment schedule of a differentiated loan.
///
/// Each month repays `principal / n` plus interest on the balance still owed:
///
/// D_k = P/n + i * (P - P(k - 1)/n)
///
/// Every payment is rounded up on its own, so the overpayment includes the
/// accumulated rounding.
///
/// # Errors
///
/// Returns an error if `term_months` is zero or a payment leaves the decimal
/// range.
pub fn calculate_differentiated_schedule(
    principal: Decimal,
    term_months: u32,
    annual_interest_percent: Decimal,
) -> Result<DifferentiatedSchedule> {
    if term_months == 0 {
        return Err(LoanError::invalid("term must be at least one month"));
    }

    let i = monthly_rate(annual_interest_percent);
    let months = Decimal::from(term_months);
    let fixed_amortization = principal / months;

    let mut total_paid = dec!(0);
    let mut payments = Vec::with_capacity(term_months as usize);

    for month in 1..=term_months {
        let payment = principal
            .checked_mul(Decimal::from(month - 1))
            .and_then(|scaled| scaled.checked_div(months))
            .and_then(|repaid| i.checked_mul(principal - repaid))
            .and_then(|interest| fixed_amortization.checked_add(interest))
            .ok_or(LoanError::overflow("differentiated payment"))?
            .ceil();
        total_paid = total_paid
            .checked_add(payment)
            .ok_or(LoanError::overflow("total paid"))?;
        payments.push(AmortizationEntry { month, payment });
    }

    let overpayment = total_paid - principal;
    debug!("differentiated schedule over {term_months} months, overpayment {overpayment}");

    Ok(DifferentiatedSchedule {
        payments,
        overpayment,
    })
}
