//! `loan_calculator` is a Rust library for solving simple consumer loans.
//!
//! Given three of the four loan parameters (principal, monthly payment, number of
//! months and annual interest rate) it computes the missing one, using one of two
//! amortization systems:
//! - **Annuity**: fixed monthly payments. Any one of principal, payment or term
//!   can be solved for.
//! - **Differentiated**: a fixed share of the principal is repaid each month plus
//!   interest on the outstanding balance, leading to decreasing payments over time.
//!
//! Every result also reports the overpayment: everything paid minus the principal.
//!
//! ## Usage
//!
//! Build a [`LoanRequest`] with the known values, mark the unknown with zero and
//! call [`calculate_loan`]:
//!
//! ```rust
//! use loan_calculator::{calculate_loan, LoanRequest, LoanResult};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let request = LoanRequest {
//!         principal: Some(dec!(100_000)),
//!         payment: Some(dec!(0)),
//!         periods: Some(dec!(120)),
//!         interest: Some(dec!(12)),
//!         loan_type: Some("annuity".to_string()),
//!     };
//!
//!     match calculate_loan(&request) {
//!         Ok(result) => {
//!             assert_eq!(result, LoanResult::Payment { payment: dec!(1435) });
//!             for line in result.lines() {
//!                 println!("{line}");
//!             }
//!         }
//!         Err(e) => {
//!             eprintln!("{e}");
//!         }
//!     }
//! }
//! ```

pub mod annuity;
pub mod differentiated;
pub mod error;
pub mod params;
pub mod report;

pub use annuity::{LoanTerm, PrincipalSolution, TermSolution};
pub use differentiated::{AmortizationEntry, DifferentiatedSchedule};
pub use error::{LoanError, Result};
pub use params::{Calculation, LoanParameters, LoanRequest, LoanType};
pub use report::LoanResult;

/// Validates a loan request and solves for its unknown.
///
/// This is the main entry point of the library.
///
/// # Errors
///
/// Returns [`LoanError::InvalidParameters`] for requests that cannot be solved
/// as given, and [`LoanError::Unsolvable`] when an annuity payment never covers
/// the interest.
pub fn calculate_loan(request: &LoanRequest) -> Result<LoanResult> {
    let calculation = request.validate()?;
    solve(calculation)
}

/// Runs the formula matching an already validated calculation.
pub fn solve(calculation: Calculation) -> Result<LoanResult> {
    match calculation {
        Calculation::Principal {
            payment,
            term_months,
            interest,
        } => {
            let solution = annuity::calculate_principal(payment, term_months, interest)?;
            Ok(LoanResult::Principal {
                principal: solution.principal,
                overpayment: solution.overpayment,
            })
        }
        Calculation::Payment {
            principal,
            term_months,
            interest,
        } => {
            let payment = annuity::calculate_monthly_payment(principal, term_months, interest)?;
            Ok(LoanResult::Payment { payment })
        }
        Calculation::Term {
            principal,
            payment,
            interest,
        } => {
            let solution = annuity::calculate_term(principal, payment, interest)?;
            Ok(LoanResult::Term {
                term: solution.term,
                overpayment: solution.overpayment,
            })
        }
        Calculation::Differentiated {
            principal,
            term_months,
            interest,
        } => {
            let schedule =
                differentiated::calculate_differentiated_schedule(principal, term_months, interest)?;
            Ok(LoanResult::Differentiated {
                payments: schedule.payments,
                overpayment: schedule.overpayment,
            })
        }
    }
}
